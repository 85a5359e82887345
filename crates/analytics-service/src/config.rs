use anyhow::{Context, Result};
use common::validation::validate_range;
use crowd_analytics::AnalyticsConfig;
use std::env;
use std::path::Path;

/// Largest accepted request body; sized for a full-length detection batch
const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to bind the HTTP server to
    pub bind_addr: String,

    /// Node ID for this analytics service instance
    pub node_id: String,

    /// Maximum request body size in bytes
    pub max_body_bytes: usize,

    pub analytics: AnalyticsConfig,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr =
            env::var("ANALYTICS_SERVICE_ADDR").unwrap_or_else(|_| "0.0.0.0:8090".to_string());

        let node_id = env::var("NODE_ID").unwrap_or_else(|_| {
            format!(
                "analytics-service-{}",
                hostname::get()
                    .ok()
                    .and_then(|h| h.into_string().ok())
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
            )
        });

        let max_body_bytes: usize = match env::var("ANALYTICS_MAX_BODY_BYTES") {
            Ok(raw) => raw.parse().context("Invalid ANALYTICS_MAX_BODY_BYTES")?,
            Err(_) => DEFAULT_MAX_BODY_BYTES,
        };
        validate_range(max_body_bytes, 1024, 1024 * 1024 * 1024, "ANALYTICS_MAX_BODY_BYTES")?;

        let base = match env::var("ANALYTICS_CONFIG_PATH") {
            Ok(path) => load_analytics_config(Path::new(&path))?,
            Err(_) => AnalyticsConfig::default(),
        };
        let analytics = base.with_overrides(|key| env::var(key).ok());
        analytics
            .validate()
            .context("Invalid analytics configuration")?;

        Ok(Self {
            bind_addr,
            node_id,
            max_body_bytes,
            analytics,
        })
    }
}

/// Read an `AnalyticsConfig` from a JSON file; omitted fields keep their defaults
pub fn load_analytics_config(path: &Path) -> Result<AnalyticsConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read analytics config {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse analytics config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_analytics_config_from_file() {
        let path = env::temp_dir().join(format!("analytics-config-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"{"visualization": {"interval_seconds": 30.0}}"#).unwrap();

        let config = load_analytics_config(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.visualization.interval_seconds, 30.0);
        assert_eq!(config.bottleneck.threshold_multiplier, 1.5);
    }

    #[test]
    fn test_load_analytics_config_missing_file() {
        let err = load_analytics_config(Path::new("/nonexistent/analytics.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read analytics config"));
    }
}
