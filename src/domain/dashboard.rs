// Dashboard view models - widgets, KPI elements, detail tables
use super::resources::{ActionRequest, InstanceAction};
use std::fmt;

/// KPI element identifiers exposed by the dashboard layout
pub mod kpi {
    pub const COST_ANOMALIES: &str = "cost-anomalies";
    pub const EC2_TOTAL: &str = "ec2-total";
    pub const EC2_RUNNING: &str = "ec2-running";
    pub const EC2_STOPPED: &str = "ec2-stopped";
    pub const S3_TOTAL: &str = "s3-total";
    pub const S3_PRIVATE: &str = "s3-private";
    pub const S3_PUBLIC: &str = "s3-public";
    pub const IAM_TOTAL: &str = "iam-total";
    pub const IAM_MFA: &str = "iam-mfa";
    pub const IAM_NO_MFA: &str = "iam-no-mfa";

    pub const ALL: [&str; 10] = [
        COST_ANOMALIES,
        EC2_TOTAL,
        EC2_RUNNING,
        EC2_STOPPED,
        S3_TOTAL,
        S3_PRIVATE,
        S3_PUBLIC,
        IAM_TOTAL,
        IAM_MFA,
        IAM_NO_MFA,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WidgetKind {
    Cost,
    Compute,
    Storage,
    Identity,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 4] = [
        WidgetKind::Cost,
        WidgetKind::Compute,
        WidgetKind::Storage,
        WidgetKind::Identity,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            WidgetKind::Cost => "Cost Trend",
            WidgetKind::Compute => "EC2 Instances",
            WidgetKind::Storage => "S3 Buckets",
            WidgetKind::Identity => "IAM Users",
        }
    }

    /// Endpoint path relative to the API base, without query string
    pub fn endpoint(&self) -> &'static str {
        match self {
            WidgetKind::Cost => "cost-data",
            WidgetKind::Compute => "ec2-summary",
            WidgetKind::Storage => "s3-summary",
            WidgetKind::Identity => "iam-summary",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// 24-bit color used by chart datasets and status indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub mod palette {
    use super::Rgb;

    pub const GREEN: Rgb = Rgb(0x22, 0xc5, 0x5e);
    pub const SLATE: Rgb = Rgb(0x64, 0x74, 0x8b);
    pub const RED: Rgb = Rgb(0xef, 0x44, 0x44);
    pub const SKY: Rgb = Rgb(0x0e, 0xa5, 0xe9);
    pub const BORDER: Rgb = Rgb(0x1f, 0x29, 0x37);
}

/// Colored dot shown next to a detail-table cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIndicator {
    Green,
    Gray,
    Red,
}

impl StatusIndicator {
    pub fn color(&self) -> Rgb {
        match self {
            StatusIndicator::Green => palette::GREEN,
            StatusIndicator::Gray => palette::SLATE,
            StatusIndicator::Red => palette::RED,
        }
    }
}

/// A start/stop control bound to one table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowAction {
    pub request: ActionRequest,
    pub enabled: bool,
    pub pending: bool,
}

impl RowAction {
    pub fn new(action: InstanceAction, instance_id: impl Into<String>, enabled: bool) -> Self {
        Self {
            request: ActionRequest::new(action, instance_id),
            enabled,
            pending: false,
        }
    }

    pub fn label(&self) -> &'static str {
        if self.pending {
            "Working..."
        } else {
            self.request.action.label()
        }
    }

    pub fn is_available(&self) -> bool {
        self.enabled && !self.pending
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailRow {
    pub cells: Vec<String>,
    /// Indicator and the column it decorates
    pub status: Option<(usize, StatusIndicator)>,
    pub actions: Vec<RowAction>,
}

impl DetailRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self {
            cells,
            status: None,
            actions: Vec::new(),
        }
    }

    pub fn with_status(mut self, column: usize, indicator: StatusIndicator) -> Self {
        self.status = Some((column, indicator));
        self
    }

    pub fn with_actions(mut self, actions: Vec<RowAction>) -> Self {
        self.actions = actions;
        self
    }

    #[cfg(test)]
    pub fn indicator(&self) -> Option<StatusIndicator> {
        self.status.map(|(_, indicator)| indicator)
    }

    pub fn action(&self, action: InstanceAction) -> Option<&RowAction> {
        self.actions.iter().find(|a| a.request.action == action)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailTable {
    pub headers: Vec<String>,
    pub rows: Vec<DetailRow>,
}

impl DetailTable {
    pub fn new(headers: &[&str], rows: Vec<DetailRow>) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    /// Mark the control for `request` as pending: disabled, with a working label
    pub fn mark_pending(&mut self, request: &ActionRequest) -> bool {
        let control = self
            .rows
            .iter_mut()
            .flat_map(|row| row.actions.iter_mut())
            .find(|a| &a.request == request);

        match control {
            Some(control) => {
                control.pending = true;
                control.enabled = false;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

/// Blocking acknowledgment shown after an instance action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_pending_disables_matching_control_only() {
        let mut table = DetailTable::new(
            &["Name", "Actions"],
            vec![
                DetailRow::new(vec!["a".into(), String::new()]).with_actions(vec![
                    RowAction::new(InstanceAction::Start, "i-1", false),
                    RowAction::new(InstanceAction::Stop, "i-1", true),
                ]),
                DetailRow::new(vec!["b".into(), String::new()]).with_actions(vec![
                    RowAction::new(InstanceAction::Start, "i-2", true),
                    RowAction::new(InstanceAction::Stop, "i-2", false),
                ]),
            ],
        );

        assert!(table.mark_pending(&ActionRequest::new(InstanceAction::Stop, "i-1")));

        let stop = table.rows[0].action(InstanceAction::Stop).unwrap();
        assert!(stop.pending);
        assert!(!stop.is_available());
        assert_eq!(stop.label(), "Working...");
        assert!(table.rows[1].action(InstanceAction::Start).unwrap().is_available());

        assert!(!table.mark_pending(&ActionRequest::new(InstanceAction::Stop, "i-404")));
    }
}
