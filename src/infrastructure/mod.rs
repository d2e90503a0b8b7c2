// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod http_api_client;
pub mod snapshot_repository;
