// Cloud resource domain models - wire shapes of the summary endpoints
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Time bucket used by the cost endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Granularity {
    pub const ALL: [Granularity; 4] = [
        Granularity::Daily,
        Granularity::Weekly,
        Granularity::Monthly,
        Granularity::Yearly,
    ];

    /// Query-string form, e.g. `DAILY`
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "DAILY",
            Granularity::Weekly => "WEEKLY",
            Granularity::Monthly => "MONTHLY",
            Granularity::Yearly => "YEARLY",
        }
    }

    /// Human form, e.g. `Daily`
    pub fn label(&self) -> &'static str {
        match self {
            Granularity::Daily => "Daily",
            Granularity::Weekly => "Weekly",
            Granularity::Monthly => "Monthly",
            Granularity::Yearly => "Yearly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Granularity::Daily),
            "WEEKLY" => Ok(Granularity::Weekly),
            "MONTHLY" => Ok(Granularity::Monthly),
            "YEARLY" => Ok(Granularity::Yearly),
            other => Err(format!("unknown granularity: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostDataset {
    pub label: String,
    #[serde(default)]
    pub data: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
}

/// Payload of `GET /api/cost-data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSeries {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub datasets: Vec<CostDataset>,
    #[serde(default)]
    pub anomalies: Vec<bool>,
}

impl CostSeries {
    /// Values of the first (and only charted) dataset
    pub fn values(&self) -> &[f64] {
        self.datasets.first().map(|d| d.data.as_slice()).unwrap_or(&[])
    }

    /// Anomaly flags aligned index-for-index with `values()`.
    ///
    /// Non-daily views come back with an empty flag list; missing flags read as
    /// `false` and surplus flags are dropped.
    pub fn aligned_anomalies(&self) -> Vec<bool> {
        (0..self.values().len())
            .map(|i| self.anomalies.get(i).copied().unwrap_or(false))
            .collect()
    }

    pub fn anomaly_count(&self) -> usize {
        self.aligned_anomalies().into_iter().filter(|a| *a).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceState {
    Running,
    Stopped,
    Pending,
    Stopping,
    #[serde(other)]
    Unknown,
}

impl InstanceState {
    pub fn is_running(&self) -> bool {
        matches!(self, InstanceState::Running)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ec2Instance {
    #[serde(rename = "Name", default = "unnamed")]
    pub name: String,
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
    #[serde(rename = "InstanceType", default)]
    pub instance_type: String,
    #[serde(rename = "State")]
    pub state: InstanceState,
    #[serde(rename = "CPU_Avg_24h", default)]
    pub cpu_avg_24h: f64,
}

fn unnamed() -> String {
    "N/A".to_string()
}

/// Payload of `GET /api/ec2-summary`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ec2Summary {
    pub total: u64,
    pub running: u64,
    pub stopped: u64,
    #[serde(default)]
    pub instances: Vec<Ec2Instance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "SizeBytes", default)]
    pub size_bytes: f64,
    #[serde(rename = "IsPublic", default)]
    pub is_public: bool,
}

/// Payload of `GET /api/s3-summary`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Summary {
    pub total: u64,
    pub private: u64,
    pub public: u64,
    #[serde(default)]
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IamUser {
    #[serde(rename = "UserName")]
    pub user_name: String,
    #[serde(rename = "MfaEnabled", default)]
    pub mfa_enabled: bool,
    #[serde(rename = "KeyStatus", default = "no_keys")]
    pub key_status: String,
}

fn no_keys() -> String {
    "No Keys".to_string()
}

/// Payload of `GET /api/iam-summary`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IamSummary {
    pub total: u64,
    pub mfa_enabled: u64,
    pub no_mfa: u64,
    #[serde(default)]
    pub users: Vec<IamUser>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceAction {
    Start,
    Stop,
}

impl InstanceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceAction::Start => "start",
            InstanceAction::Stop => "stop",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InstanceAction::Start => "Start",
            InstanceAction::Stop => "Stop",
        }
    }
}

impl fmt::Display for InstanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstanceAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(InstanceAction::Start),
            "stop" => Ok(InstanceAction::Stop),
            other => Err(format!("unknown action: {}", other)),
        }
    }
}

/// Body of `POST /api/ec2-action`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: InstanceAction,
    pub instance_id: String,
}

impl ActionRequest {
    pub fn new(action: InstanceAction, instance_id: impl Into<String>) -> Self {
        Self {
            action,
            instance_id: instance_id.into(),
        }
    }
}

/// Response of `POST /api/ec2-action`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResponse {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}
