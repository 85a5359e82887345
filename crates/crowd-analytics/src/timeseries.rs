//! Chart-ready aggregation of the count series into fixed-width time buckets

use crate::config::VisualizationConfig;
use crate::error::{ensure_positive, Result};
use crate::stats::{format_range, mean, std_dev, to_f64};
use serde::{Deserialize, Serialize};

/// Upper bound on emitted buckets; later samples land in the last bucket
const MAX_BUCKETS: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesBucket {
    /// 1-based position of the bucket
    pub interval_index: usize,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub time_range: String,
    /// `None` for buckets without samples
    pub average: Option<f64>,
    pub min: Option<u32>,
    pub max: Option<u32>,
    pub sample_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub overall_average: f64,
    pub overall_min: u32,
    pub overall_max: u32,
    pub std_deviation: f64,
    pub total_samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationSeries {
    pub interval_seconds: f64,
    pub buckets: Vec<SeriesBucket>,
    pub summary: SeriesSummary,
}

#[derive(Debug, Clone, Default)]
pub struct TimeSeriesAggregator {
    config: VisualizationConfig,
}

impl TimeSeriesAggregator {
    pub fn new(config: VisualizationConfig) -> Self {
        Self { config }
    }

    /// Bucket `counts` by timestamp over `[0, duration_seconds)`.
    ///
    /// Buckets without samples are still emitted. When a sample lies at or past
    /// the nominal duration the series is extended to include it.
    pub fn bucket(
        &self,
        counts: &[u32],
        timestamps: &[f64],
        duration_seconds: f64,
    ) -> Result<VisualizationSeries> {
        let interval = ensure_positive(self.config.interval_seconds, "interval_seconds")?;

        let samples: Vec<(usize, u32)> = counts
            .iter()
            .zip(timestamps)
            .map(|(&count, &ts)| (bucket_index(ts, interval), count))
            .collect();

        let nominal = if duration_seconds.is_finite() && duration_seconds > 0.0 {
            ((duration_seconds / interval).ceil() as usize).min(MAX_BUCKETS)
        } else {
            0
        };
        let needed = samples.iter().map(|&(i, _)| i + 1).max().unwrap_or(0);
        let bucket_count = nominal.max(needed);

        let mut grouped: Vec<Vec<u32>> = vec![Vec::new(); bucket_count];
        for &(index, count) in &samples {
            grouped[index].push(count);
        }

        let buckets = grouped
            .iter()
            .enumerate()
            .map(|(i, group)| {
                let start_seconds = i as f64 * interval;
                let end_seconds = start_seconds + interval;
                SeriesBucket {
                    interval_index: i + 1,
                    start_seconds,
                    end_seconds,
                    time_range: format_range(start_seconds, end_seconds),
                    average: mean(&to_f64(group)),
                    min: group.iter().copied().min(),
                    max: group.iter().copied().max(),
                    sample_count: group.len(),
                }
            })
            .collect();

        let bucketed: Vec<u32> = samples.iter().map(|&(_, count)| count).collect();
        Ok(VisualizationSeries {
            interval_seconds: interval,
            buckets,
            summary: summarize(&bucketed),
        })
    }
}

fn bucket_index(timestamp: f64, interval: f64) -> usize {
    let index = (timestamp / interval).floor();
    if index.is_nan() || index <= 0.0 {
        return 0;
    }
    (index as usize).min(MAX_BUCKETS - 1)
}

fn summarize(counts: &[u32]) -> SeriesSummary {
    let values = to_f64(counts);
    SeriesSummary {
        overall_average: mean(&values).unwrap_or(0.0),
        overall_min: counts.iter().copied().min().unwrap_or(0),
        overall_max: counts.iter().copied().max().unwrap_or(0),
        std_deviation: std_dev(&values).unwrap_or(0.0),
        total_samples: counts.len(),
    }
}
