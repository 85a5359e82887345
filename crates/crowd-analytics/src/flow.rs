use crate::config::FlowConfig;
use crate::stats::{mean, ols_slope, std_dev, to_f64};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowTrend {
    Increasing,
    Stable,
    Decreasing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variability {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowMetricsResult {
    /// Least-squares rate of change in people per second
    pub flow_rate: f64,
    pub trend: FlowTrend,
    pub coefficient_of_variation: f64,
    pub variability: Variability,
    pub average_count: f64,
    pub std_deviation: f64,
}

impl FlowMetricsResult {
    pub fn empty() -> Self {
        Self {
            flow_rate: 0.0,
            trend: FlowTrend::Stable,
            coefficient_of_variation: 0.0,
            variability: Variability::Low,
            average_count: 0.0,
            std_deviation: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FlowMetricsAnalyzer {
    config: FlowConfig,
}

impl FlowMetricsAnalyzer {
    pub fn new(config: FlowConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, counts: &[u32], timestamps: &[f64]) -> FlowMetricsResult {
        let values = to_f64(counts);
        let (Some(average), Some(std_deviation)) = (mean(&values), std_dev(&values)) else {
            return FlowMetricsResult::empty();
        };

        let flow_rate = ols_slope(timestamps, &values).unwrap_or(0.0);
        let coefficient_of_variation = if average > 0.0 {
            std_deviation / average
        } else {
            0.0
        };

        FlowMetricsResult {
            flow_rate,
            trend: self.trend(flow_rate),
            coefficient_of_variation,
            variability: self.variability(coefficient_of_variation),
            average_count: average,
            std_deviation,
        }
    }

    fn trend(&self, flow_rate: f64) -> FlowTrend {
        if flow_rate > self.config.trend_band {
            FlowTrend::Increasing
        } else if flow_rate < -self.config.trend_band {
            FlowTrend::Decreasing
        } else {
            FlowTrend::Stable
        }
    }

    /// Low below the moderate cutoff, High strictly above the high cutoff
    fn variability(&self, cv: f64) -> Variability {
        if cv > self.config.high_variability_cv {
            Variability::High
        } else if cv >= self.config.moderate_variability_cv {
            Variability::Moderate
        } else {
            Variability::Low
        }
    }
}
