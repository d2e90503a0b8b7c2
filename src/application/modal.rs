// Shared detail modal
use crate::domain::dashboard::{DetailRow, DetailTable};

/// Where a pointer click landed while the modal is visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Backdrop,
    Panel,
}

/// The single detail panel; opening replaces whatever it showed before
#[derive(Debug, Default)]
pub struct Modal {
    visible: bool,
    title: String,
    body: Option<DetailTable>,
    selected: usize,
}

impl Modal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, title: impl Into<String>, body: DetailTable) {
        self.title = title.into();
        self.body = Some(body);
        self.selected = 0;
        self.visible = true;
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    pub fn is_open(&self) -> bool {
        self.visible
    }

    /// Click-outside-to-close
    pub fn on_click(&mut self, target: ClickTarget) {
        if self.visible && target == ClickTarget::Backdrop {
            self.close();
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> Option<&DetailTable> {
        self.body.as_ref()
    }

    pub fn body_mut(&mut self) -> Option<&mut DetailTable> {
        self.body.as_mut()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_row(&self) -> Option<&DetailRow> {
        self.body.as_ref().and_then(|b| b.rows.get(self.selected))
    }

    pub fn select_next(&mut self) {
        let rows = self.row_count();
        if rows > 0 {
            self.selected = (self.selected + 1).min(rows - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn row_count(&self) -> usize {
        self.body.as_ref().map(|b| b.rows.len()).unwrap_or(0)
    }
}
