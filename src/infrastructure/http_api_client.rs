// HTTP implementation of the cloud summary API
use crate::application::cloud_api::{ApiError, CloudApi};
use crate::domain::resources::{
    ActionRequest, ActionResponse, CostSeries, Ec2Summary, Granularity, IamSummary, S3Summary,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpCloudApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpCloudApi {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    fn cost_endpoint(granularity: Granularity) -> String {
        format!("cost-data?granularity={}", urlencoding::encode(granularity.as_str()))
    }

    /// GET `endpoint` and decode the JSON body; non-2xx is an error
    async fn fetch_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let url = self.build_url(endpoint);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        decode(endpoint, &body)
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|source| ApiError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

#[async_trait]
impl CloudApi for HttpCloudApi {
    async fn cost_data(&self, granularity: Granularity) -> Result<CostSeries, ApiError> {
        self.fetch_json(&Self::cost_endpoint(granularity)).await
    }

    async fn ec2_summary(&self) -> Result<Ec2Summary, ApiError> {
        self.fetch_json("ec2-summary").await
    }

    async fn s3_summary(&self) -> Result<S3Summary, ApiError> {
        self.fetch_json("s3-summary").await
    }

    async fn iam_summary(&self) -> Result<IamSummary, ApiError> {
        self.fetch_json("iam-summary").await
    }

    async fn ec2_action(&self, request: &ActionRequest) -> Result<ActionResponse, ApiError> {
        let endpoint = "ec2-action";
        let url = self.build_url(endpoint);
        tracing::info!("POST {} {} {}", url, request.action, request.instance_id);

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // The backend reports failures in the body, with a 4xx/5xx status
        match decode::<ActionResponse>(endpoint, &body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            }),
            Err(e) => Err(e),
        }
    }
}
