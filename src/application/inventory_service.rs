// Inventory service - Use cases behind the summary and action endpoints
use crate::application::inventory_repository::InventoryRepository;
use crate::domain::cost::{detect_anomalies, most_recent, roll_up_weekly, roll_up_yearly, CostRecord};
use crate::domain::resources::{
    ActionRequest, ActionResponse, CostDataset, CostSeries, Ec2Summary, Granularity, IamSummary,
    InstanceState, S3Summary,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct InventoryService {
    repository: Arc<dyn InventoryRepository>,
    daily_window: usize,
}

impl InventoryService {
    pub fn new(repository: Arc<dyn InventoryRepository>, daily_window: usize) -> Self {
        Self {
            repository,
            daily_window,
        }
    }

    pub async fn cost_data(&self, granularity: Granularity) -> CostSeries {
        let (records, anomalies) = match granularity {
            Granularity::Daily => {
                // Newest days, not the oldest ones a plain ascending limit would keep
                let records = most_recent(self.repository.daily_costs().await, self.daily_window);
                let anomalies = detect_anomalies(&records);
                (records, anomalies)
            }
            Granularity::Weekly => {
                let daily = most_recent(self.repository.daily_costs().await, usize::MAX);
                (roll_up_weekly(&daily), Vec::new())
            }
            Granularity::Monthly => (
                most_recent(self.repository.monthly_costs().await, usize::MAX),
                Vec::new(),
            ),
            Granularity::Yearly => (roll_up_yearly(&self.repository.monthly_costs().await), Vec::new()),
        };

        tracing::debug!("Serving {} {} cost points", records.len(), granularity);
        cost_series(granularity, records, anomalies)
    }

    pub async fn ec2_summary(&self) -> Ec2Summary {
        let instances = self.repository.instances().await;
        tracing::info!("Found {} EC2 instances", instances.len());

        let count = |state: InstanceState| instances.iter().filter(|i| i.state == state).count() as u64;
        Ec2Summary {
            total: instances.len() as u64,
            running: count(InstanceState::Running),
            stopped: count(InstanceState::Stopped),
            instances,
        }
    }

    pub async fn s3_summary(&self) -> S3Summary {
        let buckets = self.repository.buckets().await;
        tracing::info!("Found {} S3 buckets", buckets.len());

        let public = buckets.iter().filter(|b| b.is_public).count() as u64;
        S3Summary {
            total: buckets.len() as u64,
            private: buckets.len() as u64 - public,
            public,
            buckets,
        }
    }

    pub async fn iam_summary(&self) -> IamSummary {
        let users = self.repository.users().await;
        tracing::info!("Found {} IAM users", users.len());

        let mfa_enabled = users.iter().filter(|u| u.mfa_enabled).count() as u64;
        IamSummary {
            total: users.len() as u64,
            mfa_enabled,
            no_mfa: users.len() as u64 - mfa_enabled,
            users,
        }
    }

    pub async fn perform_action(&self, request: &ActionRequest) -> ActionResponse {
        tracing::info!("{} instance: {}", request.action.label(), request.instance_id);

        match self
            .repository
            .control_instance(&request.instance_id, request.action)
            .await
        {
            Ok(()) => ActionResponse::succeeded(format!(
                "Successfully initiated {} for {}",
                request.action, request.instance_id
            )),
            Err(e) => {
                tracing::error!(
                    "Error performing action {} on {}: {}",
                    request.action,
                    request.instance_id,
                    e
                );
                ActionResponse::failed(e.to_string())
            }
        }
    }
}

fn cost_series(granularity: Granularity, records: Vec<CostRecord>, anomalies: Vec<bool>) -> CostSeries {
    let (labels, data): (Vec<String>, Vec<f64>) = records.into_iter().map(|r| (r.date, r.cost)).unzip();

    CostSeries {
        labels,
        datasets: vec![CostDataset {
            label: format!("{} AWS Cost ($)", granularity.label()),
            data,
            border_color: Some("#0ea5e9".to_string()),
            background_color: Some("rgba(14, 165, 233, 0.1)".to_string()),
            fill: Some(true),
            tension: Some(0.3),
        }],
        anomalies,
    }
}
