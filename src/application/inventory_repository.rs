// Repository trait for cloud inventory data access
use crate::domain::cost::CostRecord;
use crate::domain::resources::{Bucket, Ec2Instance, IamUser, InstanceAction};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("The instance ID '{0}' does not exist")]
    UnknownInstance(String),
}

#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Daily cost records in storage order
    async fn daily_costs(&self) -> Vec<CostRecord>;

    /// Monthly cost records in storage order
    async fn monthly_costs(&self) -> Vec<CostRecord>;

    async fn instances(&self) -> Vec<Ec2Instance>;

    async fn buckets(&self) -> Vec<Bucket>;

    async fn users(&self) -> Vec<IamUser>;

    /// Apply a start/stop command to one instance
    async fn control_instance(
        &self,
        instance_id: &str,
        action: InstanceAction,
    ) -> Result<(), InventoryError>;
}
