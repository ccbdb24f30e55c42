use navigator_shared::Masked;
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Client configuration. Every key is optional: a missing store endpoint,
/// tracking id or push key only switches the matching feature off.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub url: Option<String>,
    pub access_key: Option<Masked<String>>,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 { 10 }

impl Default for StoreConfig {
    fn default() -> Self {
        Self { url: None, access_key: None, timeout_seconds: default_timeout() }
    }
}

impl StoreConfig {
    /// Endpoint and key, when both are present and non-blank.
    pub fn endpoint(&self) -> Option<(&str, &Masked<String>)> {
        let url = self.url.as_deref().map(str::trim).filter(|url| !url.is_empty())?;
        let key = self.access_key.as_ref().filter(|key| !key.expose().trim().is_empty())?;
        Some((url, key))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalyticsConfig {
    pub tracking_id: Option<String>,
    #[serde(default = "default_analytics_endpoint")]
    pub endpoint: String,
}

fn default_analytics_endpoint() -> String {
    "https://www.google-analytics.com/mp/collect".to_string()
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self { tracking_id: None, endpoint: default_analytics_endpoint() }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PushConfig {
    pub public_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshConfig {
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
    /// Keep polling the tracker while no search has been issued.
    #[serde(default)]
    pub poll_idle_tracker: bool,
    /// Keep polling the dashboard while nobody is signed in.
    #[serde(default)]
    pub poll_signed_out_dashboard: bool,
}

fn default_interval() -> u64 { 30 }

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval(),
            poll_idle_tracker: false,
            poll_signed_out_dashboard: false,
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds.max(1))
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. NAVIGATOR__STORE__URL=https://project.example.co
            .add_source(
                config::Environment::with_prefix("NAVIGATOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }

    pub fn from_toml(contents: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_degrades_everything() {
        let config = Config::from_toml("").unwrap();
        assert!(config.store.endpoint().is_none());
        assert!(config.analytics.tracking_id.is_none());
        assert!(config.push.public_key.is_none());
        assert_eq!(config.refresh.interval(), Duration::from_secs(30));
        assert!(!config.refresh.poll_idle_tracker);
    }

    #[test]
    fn test_store_endpoint_requires_url_and_key() {
        let config = Config::from_toml(
            r#"
            [store]
            url = "https://demo.example.co"
            access_key = "anon-key"
            timeout_seconds = 3

            [refresh]
            interval_seconds = 15
            poll_signed_out_dashboard = true
            "#,
        )
        .unwrap();
        let (url, key) = config.store.endpoint().unwrap();
        assert_eq!(url, "https://demo.example.co");
        assert_eq!(key.expose(), "anon-key");
        assert_eq!(format!("{:?}", config.store.access_key), "Some(********)");
        assert_eq!(config.store.timeout(), Duration::from_secs(3));
        assert_eq!(config.refresh.interval(), Duration::from_secs(15));
        assert!(config.refresh.poll_signed_out_dashboard);

        let half = Config::from_toml("[store]\nurl = \"https://demo.example.co\"\naccess_key = \"  \"").unwrap();
        assert!(half.store.endpoint().is_none());
    }
}
