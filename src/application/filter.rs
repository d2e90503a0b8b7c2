// Granularity filter bar for the cost widget
use crate::domain::resources::Granularity;

#[derive(Debug, Clone)]
pub struct FilterBar {
    buttons: Vec<Granularity>,
    active: Granularity,
}

impl FilterBar {
    pub fn new(active: Granularity) -> Self {
        Self {
            buttons: Granularity::ALL.to_vec(),
            active,
        }
    }

    /// Make `granularity` the active button; the previous one is deactivated
    pub fn select(&mut self, granularity: Granularity) {
        self.active = granularity;
    }

    pub fn active(&self) -> Granularity {
        self.active
    }

    pub fn is_active(&self, granularity: Granularity) -> bool {
        self.active == granularity
    }

    pub fn buttons(&self) -> &[Granularity] {
        &self.buttons
    }
}

impl Default for FilterBar {
    fn default() -> Self {
        Self::new(Granularity::Daily)
    }
}
