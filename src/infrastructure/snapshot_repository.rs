// JSON snapshot repository implementation
use crate::application::inventory_repository::{InventoryError, InventoryRepository};
use crate::domain::cost::CostRecord;
use crate::domain::resources::{Bucket, Ec2Instance, IamUser, InstanceAction, InstanceState};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::RwLock;

/// Inventory as exported by the collector
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub daily_costs: Vec<CostRecord>,
    #[serde(default)]
    pub monthly_costs: Vec<CostRecord>,
    #[serde(default)]
    pub instances: Vec<Ec2Instance>,
    #[serde(default)]
    pub buckets: Vec<Bucket>,
    #[serde(default)]
    pub users: Vec<IamUser>,
}

/// Serves a snapshot from memory. Instance state changes are not written back.
#[derive(Debug, Default)]
pub struct SnapshotRepository {
    data: RwLock<Snapshot>,
}

impl SnapshotRepository {
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            data: RwLock::new(snapshot),
        }
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;

        tracing::info!(
            "Loaded snapshot: {} daily costs, {} monthly costs, {} instances, {} buckets, {} users",
            snapshot.daily_costs.len(),
            snapshot.monthly_costs.len(),
            snapshot.instances.len(),
            snapshot.buckets.len(),
            snapshot.users.len()
        );
        Ok(Self::from_snapshot(snapshot))
    }
}

#[async_trait]
impl InventoryRepository for SnapshotRepository {
    async fn daily_costs(&self) -> Vec<CostRecord> {
        self.data.read().await.daily_costs.clone()
    }

    async fn monthly_costs(&self) -> Vec<CostRecord> {
        self.data.read().await.monthly_costs.clone()
    }

    async fn instances(&self) -> Vec<Ec2Instance> {
        self.data.read().await.instances.clone()
    }

    async fn buckets(&self) -> Vec<Bucket> {
        self.data.read().await.buckets.clone()
    }

    async fn users(&self) -> Vec<IamUser> {
        self.data.read().await.users.clone()
    }

    async fn control_instance(
        &self,
        instance_id: &str,
        action: InstanceAction,
    ) -> Result<(), InventoryError> {
        let mut data = self.data.write().await;
        let instance = data
            .instances
            .iter_mut()
            .find(|i| i.instance_id == instance_id)
            .ok_or_else(|| InventoryError::UnknownInstance(instance_id.to_string()))?;

        match action {
            InstanceAction::Start => instance.state = InstanceState::Running,
            InstanceAction::Stop => {
                instance.state = InstanceState::Stopped;
                instance.cpu_avg_24h = 0.0;
            }
        }
        tracing::debug!("Instance {} is now {:?}", instance_id, instance.state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_snapshot_file() {
        let path = std::env::temp_dir().join(format!("cloud-dashboard-snapshot-{}.json", std::process::id()));
        let json = r#"{
            "daily_costs": [{"Date": "2024-01-01", "Cost": 1.5}],
            "instances": [{"Name": "web", "InstanceId": "i-1", "InstanceType": "t3.micro", "State": "stopped"}]
        }"#;
        tokio::fs::write(&path, json).await.unwrap();

        let repository = SnapshotRepository::load(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(repository.daily_costs().await, vec![CostRecord::new("2024-01-01", 1.5)]);
        assert!(repository.monthly_costs().await.is_empty());
        assert_eq!(repository.instances().await[0].state, InstanceState::Stopped);
    }

    #[tokio::test]
    async fn test_load_missing_file_reports_path() {
        let err = SnapshotRepository::load(Path::new("/nonexistent/snapshot.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/snapshot.json"));
    }

    #[tokio::test]
    async fn test_control_instance_changes_state() {
        let repository = SnapshotRepository::from_snapshot(Snapshot {
            instances: vec![Ec2Instance {
                name: "web".into(),
                instance_id: "i-1".into(),
                instance_type: "t3.micro".into(),
                state: InstanceState::Running,
                cpu_avg_24h: 33.0,
            }],
            ..Default::default()
        });

        repository.control_instance("i-1", InstanceAction::Stop).await.unwrap();
        let instance = repository.instances().await.remove(0);
        assert_eq!(instance.state, InstanceState::Stopped);
        assert_eq!(instance.cpu_avg_24h, 0.0);

        repository.control_instance("i-1", InstanceAction::Start).await.unwrap();
        assert!(repository.instances().await[0].state.is_running());

        let err = repository
            .control_instance("i-2", InstanceAction::Start)
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::UnknownInstance(id) if id == "i-2"));
    }
}
