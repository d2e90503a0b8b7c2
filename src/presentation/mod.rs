// Presentation layer - HTTP handlers and the terminal dashboard
pub mod app_state;
pub mod handlers;
pub mod input;
pub mod router;
pub mod terminal;
pub mod ui;
