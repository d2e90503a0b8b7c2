// Application layer - Use cases, dashboard state and ports
pub mod actions;
pub mod charts;
pub mod cloud_api;
pub mod counters;
pub mod dashboard_service;
pub mod filter;
pub mod inventory_repository;
pub mod inventory_service;
pub mod modal;
pub mod widgets;
