// Cloud API trait - the dashboard's view of the summary backend
use crate::domain::resources::{
    ActionRequest, ActionResponse, CostSeries, Ec2Summary, Granularity, IamSummary, S3Summary,
};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("could not decode {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait CloudApi: Send + Sync {
    /// Cost time series for the given bucket size
    async fn cost_data(&self, granularity: Granularity) -> Result<CostSeries, ApiError>;

    async fn ec2_summary(&self) -> Result<Ec2Summary, ApiError>;

    async fn s3_summary(&self) -> Result<S3Summary, ApiError>;

    async fn iam_summary(&self) -> Result<IamSummary, ApiError>;

    /// Submit a start/stop command; a decoded `success: false` body is `Ok`
    async fn ec2_action(&self, request: &ActionRequest) -> Result<ActionResponse, ApiError>;
}
