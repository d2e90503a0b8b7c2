// Widget contract - map a fetched summary to KPIs, a chart and a detail table
use crate::application::charts::{build_categorical_chart_config, build_cost_chart_config, ChartConfig};
use crate::application::cloud_api::{ApiError, CloudApi};
use crate::domain::dashboard::{
    kpi, palette, DetailRow, DetailTable, RowAction, StatusIndicator, WidgetKind,
};
use crate::domain::format::{format_bytes, format_cost, format_percent};
use crate::domain::resources::{
    CostSeries, Ec2Summary, Granularity, IamSummary, InstanceAction, S3Summary,
};
use std::collections::HashMap;
use std::sync::Arc;

/// One widget's fetched summary
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetPayload {
    Cost(CostSeries),
    Compute(Ec2Summary),
    Storage(S3Summary),
    Identity(IamSummary),
}

/// How a summary record is shown on the dashboard
pub trait SummaryView {
    /// KPI element id and target value pairs
    fn kpis(&self) -> Vec<(&'static str, u64)>;

    fn chart(&self) -> ChartConfig;

    /// Modal title and full item table
    fn detail_view(&self) -> (String, DetailTable);
}

impl SummaryView for CostSeries {
    fn kpis(&self) -> Vec<(&'static str, u64)> {
        vec![(kpi::COST_ANOMALIES, self.anomaly_count() as u64)]
    }

    fn chart(&self) -> ChartConfig {
        build_cost_chart_config(self)
    }

    fn detail_view(&self) -> (String, DetailTable) {
        let rows = self
            .labels
            .iter()
            .zip(self.values())
            .zip(self.aligned_anomalies())
            .map(|((label, cost), anomalous)| {
                let (status, indicator) = if anomalous {
                    ("Anomaly", StatusIndicator::Red)
                } else {
                    ("Normal", StatusIndicator::Green)
                };
                DetailRow::new(vec![label.clone(), format_cost(*cost), status.to_string()])
                    .with_status(2, indicator)
            })
            .collect();

        (
            "Cost Breakdown".to_string(),
            DetailTable::new(&["Period", "Cost", "Status"], rows),
        )
    }
}

impl SummaryView for Ec2Summary {
    fn kpis(&self) -> Vec<(&'static str, u64)> {
        vec![
            (kpi::EC2_TOTAL, self.total),
            (kpi::EC2_RUNNING, self.running),
            (kpi::EC2_STOPPED, self.stopped),
        ]
    }

    fn chart(&self) -> ChartConfig {
        build_categorical_chart_config(
            ["Running", "Stopped"],
            [self.running, self.stopped],
            [palette::GREEN, palette::SLATE],
        )
    }

    fn detail_view(&self) -> (String, DetailTable) {
        let rows = self
            .instances
            .iter()
            .map(|instance| {
                let running = instance.state.is_running();
                let indicator = if running {
                    StatusIndicator::Green
                } else {
                    StatusIndicator::Gray
                };
                let cpu = if running {
                    format_percent(instance.cpu_avg_24h)
                } else {
                    "N/A".to_string()
                };

                DetailRow::new(vec![
                    instance.name.clone(),
                    instance.instance_id.clone(),
                    instance.instance_type.clone(),
                    cpu,
                    String::new(),
                ])
                .with_status(0, indicator)
                .with_actions(vec![
                    RowAction::new(InstanceAction::Start, &instance.instance_id, !running),
                    RowAction::new(InstanceAction::Stop, &instance.instance_id, running),
                ])
            })
            .collect();

        (
            "All EC2 Instances".to_string(),
            DetailTable::new(&["Name", "ID", "Type", "CPU (24h Avg)", "Actions"], rows),
        )
    }
}

impl SummaryView for S3Summary {
    fn kpis(&self) -> Vec<(&'static str, u64)> {
        vec![
            (kpi::S3_TOTAL, self.total),
            (kpi::S3_PRIVATE, self.private),
            (kpi::S3_PUBLIC, self.public),
        ]
    }

    fn chart(&self) -> ChartConfig {
        build_categorical_chart_config(
            ["Private", "Potentially Public"],
            [self.private, self.public],
            [palette::GREEN, palette::RED],
        )
    }

    fn detail_view(&self) -> (String, DetailTable) {
        let rows = self
            .buckets
            .iter()
            .map(|bucket| {
                let indicator = if bucket.is_public {
                    StatusIndicator::Red
                } else {
                    StatusIndicator::Green
                };
                DetailRow::new(vec![bucket.name.clone(), format_bytes(bucket.size_bytes)])
                    .with_status(0, indicator)
            })
            .collect();

        (
            "S3 Bucket Security Details".to_string(),
            DetailTable::new(&["Bucket Name", "Size"], rows),
        )
    }
}

impl SummaryView for IamSummary {
    fn kpis(&self) -> Vec<(&'static str, u64)> {
        vec![
            (kpi::IAM_TOTAL, self.total),
            (kpi::IAM_MFA, self.mfa_enabled),
            (kpi::IAM_NO_MFA, self.no_mfa),
        ]
    }

    fn chart(&self) -> ChartConfig {
        build_categorical_chart_config(
            ["MFA Enabled", "No MFA"],
            [self.mfa_enabled, self.no_mfa],
            [palette::SKY, palette::RED],
        )
    }

    fn detail_view(&self) -> (String, DetailTable) {
        let rows = self
            .users
            .iter()
            .map(|user| {
                let (label, indicator) = if user.mfa_enabled {
                    ("Enabled", StatusIndicator::Green)
                } else {
                    ("Disabled", StatusIndicator::Red)
                };
                DetailRow::new(vec![
                    user.user_name.clone(),
                    label.to_string(),
                    user.key_status.clone(),
                ])
                .with_status(1, indicator)
            })
            .collect();

        (
            "IAM User Details".to_string(),
            DetailTable::new(&["User Name", "MFA Status", "Access Key Use"], rows),
        )
    }
}

impl WidgetPayload {
    pub fn kind(&self) -> WidgetKind {
        match self {
            WidgetPayload::Cost(_) => WidgetKind::Cost,
            WidgetPayload::Compute(_) => WidgetKind::Compute,
            WidgetPayload::Storage(_) => WidgetKind::Storage,
            WidgetPayload::Identity(_) => WidgetKind::Identity,
        }
    }

    fn view(&self) -> &dyn SummaryView {
        match self {
            WidgetPayload::Cost(s) => s,
            WidgetPayload::Compute(s) => s,
            WidgetPayload::Storage(s) => s,
            WidgetPayload::Identity(s) => s,
        }
    }
}

impl SummaryView for WidgetPayload {
    fn kpis(&self) -> Vec<(&'static str, u64)> {
        self.view().kpis()
    }

    fn chart(&self) -> ChartConfig {
        self.view().chart()
    }

    fn detail_view(&self) -> (String, DetailTable) {
        self.view().detail_view()
    }
}

/// Fetch one widget's summary; `granularity` only applies to the cost widget
pub async fn fetch_payload(
    api: &dyn CloudApi,
    kind: WidgetKind,
    granularity: Granularity,
) -> Result<WidgetPayload, ApiError> {
    Ok(match kind {
        WidgetKind::Cost => WidgetPayload::Cost(api.cost_data(granularity).await?),
        WidgetKind::Compute => WidgetPayload::Compute(api.ec2_summary().await?),
        WidgetKind::Storage => WidgetPayload::Storage(api.s3_summary().await?),
        WidgetKind::Identity => WidgetPayload::Identity(api.iam_summary().await?),
    })
}

/// Latest immutable snapshot per widget, read by the view-details command.
/// Binding a new snapshot discards the previous one.
#[derive(Debug, Default)]
pub struct DetailBindings {
    snapshots: HashMap<WidgetKind, Arc<WidgetPayload>>,
}

impl DetailBindings {
    pub fn bind(&mut self, payload: Arc<WidgetPayload>) {
        self.snapshots.insert(payload.kind(), payload);
    }

    pub fn latest(&self, kind: WidgetKind) -> Option<Arc<WidgetPayload>> {
        self.snapshots.get(&kind).cloned()
    }
}
