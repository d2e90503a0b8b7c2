// Application state for HTTP handlers
use crate::application::inventory_service::InventoryService;

#[derive(Clone)]
pub struct AppState {
    pub inventory_service: InventoryService,
}
