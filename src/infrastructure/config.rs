// Configuration loading - defaults, settings file and environment layers
use crate::domain::resources::Granularity;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub dashboard: DashboardSettings,
    pub server: ServerSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    /// Unset means requests run to completion or failure
    pub request_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    pub counter_duration_ms: u64,
    pub action_refresh_delay_ms: u64,
    pub frame_interval_ms: u64,
    pub default_granularity: Granularity,
}

impl DashboardSettings {
    pub fn counter_duration(&self) -> Duration {
        Duration::from_millis(self.counter_duration_ms)
    }

    pub fn action_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.action_refresh_delay_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            counter_duration_ms: 1200,
            action_refresh_delay_ms: 3000,
            frame_interval_ms: 33,
            default_granularity: Granularity::Daily,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
    pub snapshot: String,
    /// Number of most recent days served by the daily cost view
    pub daily_window: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    /// Log file used by the terminal dashboard
    pub file: String,
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    let dashboard = DashboardSettings::default();
    config::Config::builder()
        .set_default("api.base_url", "http://127.0.0.1:5000/api")?
        .set_default("dashboard.counter_duration_ms", dashboard.counter_duration_ms as i64)?
        .set_default("dashboard.action_refresh_delay_ms", dashboard.action_refresh_delay_ms as i64)?
        .set_default("dashboard.frame_interval_ms", dashboard.frame_interval_ms as i64)?
        .set_default("dashboard.default_granularity", dashboard.default_granularity.as_str())?
        .set_default("server.bind", "127.0.0.1:5000")?
        .set_default("server.snapshot", "data/snapshot.json")?
        .set_default("server.daily_window", 30)?
        .set_default("logging.level", "info")?
        .set_default("logging.file", "cloud-dashboard.log")
}

/// Load settings from built-in defaults, `config/dashboard.*` (or `path` when
/// given, which must then exist) and `CLOUD_DASHBOARD__*` environment variables.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name("config/dashboard").required(false),
    };

    let settings = defaults()?
        .add_source(file)
        .add_source(Environment::with_prefix("CLOUD_DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_defaults() {
        let settings: Settings = defaults().unwrap().build().unwrap().try_deserialize().unwrap();

        assert_eq!(settings.api.base_url, "http://127.0.0.1:5000/api");
        assert_eq!(settings.api.request_timeout_ms, None);
        assert_eq!(settings.dashboard.action_refresh_delay(), Duration::from_secs(3));
        assert_eq!(settings.dashboard.counter_duration(), Duration::from_millis(1200));
        assert_eq!(settings.dashboard.default_granularity, Granularity::Daily);
        assert_eq!(settings.server.daily_window, 30);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let toml = r#"
            [api]
            base_url = "http://10.0.0.5:8080/api/"
            request_timeout_ms = 2500

            [dashboard]
            default_granularity = "MONTHLY"
            action_refresh_delay_ms = 500
        "#;
        let settings: Settings = defaults()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.api.base_url, "http://10.0.0.5:8080/api/");
        assert_eq!(settings.api.request_timeout_ms, Some(2500));
        assert_eq!(settings.dashboard.default_granularity, Granularity::Monthly);
        assert_eq!(settings.dashboard.action_refresh_delay_ms, 500);
        assert_eq!(settings.dashboard.counter_duration_ms, 1200);
    }
}
