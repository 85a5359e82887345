use crate::error::{ensure_non_negative, ensure_positive, AnalyticsError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Tunable constants for the analytics engine.
///
/// Every threshold and weight below was chosen empirically; they are exposed
/// here so deployments can recalibrate without code changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub spatial: SpatialConfig,

    #[serde(default)]
    pub bottleneck: BottleneckConfig,

    #[serde(default)]
    pub flow: FlowConfig,

    #[serde(default)]
    pub visualization: VisualizationConfig,

    /// Maximum number of recommended actions in a report
    #[serde(default = "default_max_actions")]
    pub max_actions: usize,

    /// Number of busiest frames listed in a report
    #[serde(default = "default_peak_frame_count")]
    pub peak_frame_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialConfig {
    /// Share of all boxes (percent) at which a zone becomes a hotspot
    #[serde(default = "default_hotspot_threshold")]
    pub hotspot_threshold_percent: f64,

    /// Share (percent) a single zone must exceed to be "concentrated"
    #[serde(default = "default_concentration_threshold")]
    pub concentration_threshold_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckConfig {
    /// Multiple of the mean count above which a frame is congested
    #[serde(default = "default_threshold_multiplier")]
    pub threshold_multiplier: f64,

    /// Shorter congested runs are treated as noise
    #[serde(default = "default_min_duration_frames")]
    pub min_duration_frames: usize,

    /// Duration at which the duration factor saturates
    #[serde(default = "default_duration_saturation")]
    pub duration_saturation_seconds: f64,

    #[serde(default = "default_duration_weight")]
    pub duration_weight: f64,

    #[serde(default = "default_intensity_weight")]
    pub intensity_weight: f64,

    #[serde(default = "default_consistency_weight")]
    pub consistency_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Slopes within +/- this band (people/second) count as stable
    #[serde(default = "default_trend_band")]
    pub trend_band: f64,

    /// Coefficient of variation at which variability becomes moderate
    #[serde(default = "default_moderate_cv")]
    pub moderate_variability_cv: f64,

    /// Coefficient of variation above which variability is high
    #[serde(default = "default_high_cv")]
    pub high_variability_cv: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationConfig {
    /// Width of each chart bucket in seconds
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: f64,
}

fn default_max_actions() -> usize {
    5
}

fn default_peak_frame_count() -> usize {
    5
}

fn default_hotspot_threshold() -> f64 {
    15.0
}

fn default_concentration_threshold() -> f64 {
    50.0
}

fn default_threshold_multiplier() -> f64 {
    1.5
}

fn default_min_duration_frames() -> usize {
    3
}

fn default_duration_saturation() -> f64 {
    10.0
}

fn default_duration_weight() -> f64 {
    30.0
}

fn default_intensity_weight() -> f64 {
    40.0
}

fn default_consistency_weight() -> f64 {
    30.0
}

fn default_trend_band() -> f64 {
    0.1
}

fn default_moderate_cv() -> f64 {
    0.3
}

fn default_high_cv() -> f64 {
    0.5
}

fn default_interval_seconds() -> f64 {
    10.0
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            spatial: SpatialConfig::default(),
            bottleneck: BottleneckConfig::default(),
            flow: FlowConfig::default(),
            visualization: VisualizationConfig::default(),
            max_actions: default_max_actions(),
            peak_frame_count: default_peak_frame_count(),
        }
    }
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            hotspot_threshold_percent: default_hotspot_threshold(),
            concentration_threshold_percent: default_concentration_threshold(),
        }
    }
}

impl Default for BottleneckConfig {
    fn default() -> Self {
        Self {
            threshold_multiplier: default_threshold_multiplier(),
            min_duration_frames: default_min_duration_frames(),
            duration_saturation_seconds: default_duration_saturation(),
            duration_weight: default_duration_weight(),
            intensity_weight: default_intensity_weight(),
            consistency_weight: default_consistency_weight(),
        }
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            trend_band: default_trend_band(),
            moderate_variability_cv: default_moderate_cv(),
            high_variability_cv: default_high_cv(),
        }
    }
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
        }
    }
}

impl AnalyticsConfig {
    /// Defaults overridden by `CROWD_*` environment variables
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from a key lookup; unparsable values are ignored
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
            let raw = lookup(key)?;
            match raw.trim().parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(key, value = %raw, "ignoring unparsable analytics override");
                    None
                }
            }
        }

        if let Some(v) = parsed(&lookup, "CROWD_HOTSPOT_THRESHOLD_PERCENT") {
            self.spatial.hotspot_threshold_percent = v;
        }
        if let Some(v) = parsed(&lookup, "CROWD_BOTTLENECK_MULTIPLIER") {
            self.bottleneck.threshold_multiplier = v;
        }
        if let Some(v) = parsed(&lookup, "CROWD_MIN_BOTTLENECK_FRAMES") {
            self.bottleneck.min_duration_frames = v;
        }
        if let Some(v) = parsed(&lookup, "CROWD_TREND_BAND") {
            self.flow.trend_band = v;
        }
        if let Some(v) = parsed(&lookup, "CROWD_CHART_INTERVAL_SECONDS") {
            self.visualization.interval_seconds = v;
        }
        if let Some(v) = parsed(&lookup, "CROWD_MAX_ACTIONS") {
            self.max_actions = v;
        }
        if let Some(v) = parsed(&lookup, "CROWD_PEAK_FRAMES") {
            self.peak_frame_count = v;
        }

        self
    }

    /// Reject values that would make the analysis meaningless
    pub fn validate(&self) -> Result<()> {
        ensure_positive(self.spatial.hotspot_threshold_percent, "hotspot_threshold_percent")?;
        ensure_positive(
            self.spatial.concentration_threshold_percent,
            "concentration_threshold_percent",
        )?;
        ensure_positive(self.bottleneck.threshold_multiplier, "threshold_multiplier")?;
        ensure_positive(
            self.bottleneck.duration_saturation_seconds,
            "duration_saturation_seconds",
        )?;
        ensure_non_negative(self.bottleneck.duration_weight, "duration_weight")?;
        ensure_non_negative(self.bottleneck.intensity_weight, "intensity_weight")?;
        ensure_non_negative(self.bottleneck.consistency_weight, "consistency_weight")?;
        ensure_non_negative(self.flow.trend_band, "trend_band")?;
        let moderate_cv =
            ensure_positive(self.flow.moderate_variability_cv, "moderate_variability_cv")?;
        let high_cv = ensure_positive(self.flow.high_variability_cv, "high_variability_cv")?;
        if high_cv < moderate_cv {
            return Err(AnalyticsError::invalid_configuration(
                "high_variability_cv",
                high_cv,
            ));
        }
        ensure_positive(self.visualization.interval_seconds, "interval_seconds")?;
        if self.max_actions == 0 {
            return Err(AnalyticsError::invalid_configuration("max_actions", 0.0));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_defaults() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.spatial.hotspot_threshold_percent, 15.0);
        assert_eq!(config.bottleneck.threshold_multiplier, 1.5);
        assert_eq!(config.bottleneck.min_duration_frames, 3);
        assert_eq!(config.bottleneck.duration_weight, 30.0);
        assert_eq!(config.bottleneck.intensity_weight, 40.0);
        assert_eq!(config.bottleneck.consistency_weight, 30.0);
        assert_eq!(config.flow.trend_band, 0.1);
        assert_eq!(config.visualization.interval_seconds, 10.0);
        assert_eq!(config.max_actions, 5);
        assert_eq!(config.peak_frame_count, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AnalyticsConfig = serde_json::from_value(serde_json::json!({
            "bottleneck": { "threshold_multiplier": 2.0 },
            "max_actions": 3
        }))
        .unwrap();

        assert_eq!(config.bottleneck.threshold_multiplier, 2.0);
        assert_eq!(config.bottleneck.min_duration_frames, 3);
        assert_eq!(config.spatial.hotspot_threshold_percent, 15.0);
        assert_eq!(config.max_actions, 3);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("CROWD_BOTTLENECK_MULTIPLIER", "2.0"),
            ("CROWD_MIN_BOTTLENECK_FRAMES", "5"),
            ("CROWD_PEAK_FRAMES", "10"),
            ("CROWD_CHART_INTERVAL_SECONDS", "not-a-number"),
        ]);

        let config = AnalyticsConfig::default()
            .with_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.bottleneck.threshold_multiplier, 2.0);
        assert_eq!(config.bottleneck.min_duration_frames, 5);
        assert_eq!(config.peak_frame_count, 10);
        assert_eq!(config.visualization.interval_seconds, 10.0);
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = AnalyticsConfig::default();
        config.visualization.interval_seconds = 0.0;
        assert!(config.validate().is_err());

        let mut config = AnalyticsConfig::default();
        config.bottleneck.threshold_multiplier = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_distorting_values() {
        let mut config = AnalyticsConfig::default();
        config.max_actions = 0;
        assert_eq!(
            config.validate(),
            Err(AnalyticsError::invalid_configuration("max_actions", 0.0))
        );

        let mut config = AnalyticsConfig::default();
        config.flow.trend_band = -0.1;
        assert_eq!(
            config.validate(),
            Err(AnalyticsError::invalid_configuration("trend_band", -0.1))
        );

        let mut config = AnalyticsConfig::default();
        config.bottleneck.intensity_weight = -40.0;
        assert_eq!(
            config.validate(),
            Err(AnalyticsError::invalid_configuration("intensity_weight", -40.0))
        );

        let mut config = AnalyticsConfig::default();
        config.flow.moderate_variability_cv = 0.6;
        config.flow.high_variability_cv = 0.4;
        assert_eq!(
            config.validate(),
            Err(AnalyticsError::invalid_configuration("high_variability_cv", 0.4))
        );
    }

    #[test]
    fn test_validate_accepts_zero_band_and_weight() {
        let mut config = AnalyticsConfig::default();
        config.flow.trend_band = 0.0;
        config.bottleneck.consistency_weight = 0.0;
        config.flow.moderate_variability_cv = 0.5;
        config.flow.high_variability_cv = 0.5;
        assert!(config.validate().is_ok());
    }
}
