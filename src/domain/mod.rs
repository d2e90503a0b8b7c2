// Domain layer - resource models and pure view logic
pub mod cost;
pub mod dashboard;
pub mod format;
pub mod resources;
