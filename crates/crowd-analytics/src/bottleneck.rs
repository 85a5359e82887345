//! Congestion ("bottleneck") detection over the person-count series
//!
//! A bottleneck is a contiguous run of samples whose count stays strictly above
//! a dynamic threshold (a multiple of the series mean) for at least a minimum
//! number of samples. Each surviving run is scored on three factors:
//! 1. Duration: how long the run lasts, saturating at a configured length
//! 2. Intensity: how far the peak overshoots the threshold
//! 3. Consistency: how close the run's average stays to its peak

use crate::config::BottleneckConfig;
use crate::error::{ensure_positive, Result};
use crate::stats::{format_range, mean, to_f64};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Scores are clamped to this range
const MAX_SEVERITY_SCORE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BottleneckSeverity {
    Low,
    Moderate,
    High,
    Critical,
}

impl BottleneckSeverity {
    /// Critical >80, High (60, 80], Moderate (40, 60], Low otherwise
    pub fn from_score(score: f64) -> Self {
        if score > 80.0 {
            Self::Critical
        } else if score > 60.0 {
            Self::High
        } else if score > 40.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Whether the period calls for a staffing review
    pub fn is_urgent(&self) -> bool {
        *self >= Self::High
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckPeriod {
    /// Position of the first congested sample in the series
    pub start_frame: usize,
    /// Position of the last congested sample (inclusive)
    pub end_frame: usize,
    /// Video frame number of the first congested sample; equals `start_frame`
    /// until the report maps positions back to `Detection::frame_index`
    pub start_frame_index: u64,
    pub end_frame_index: u64,
    pub start_time: f64,
    pub end_time: f64,
    /// `MM:SS - MM:SS` label for reports
    pub time_range: String,
    pub frame_count: usize,
    pub duration_seconds: f64,
    pub peak_count: u32,
    pub average_count: f64,
    pub severity: BottleneckSeverity,
    pub severity_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckAnalysisResult {
    pub threshold_used: f64,
    pub average_count: f64,
    pub max_count: u32,
    /// Periods ordered by `start_frame`
    pub periods: Vec<BottleneckPeriod>,
    pub total_duration_seconds: f64,
}

impl BottleneckAnalysisResult {
    pub fn empty() -> Self {
        Self {
            threshold_used: 0.0,
            average_count: 0.0,
            max_count: 0,
            periods: Vec::new(),
            total_duration_seconds: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BottleneckDetector {
    config: BottleneckConfig,
}

impl BottleneckDetector {
    pub fn new(config: BottleneckConfig) -> Self {
        Self { config }
    }

    /// Find congested periods in `counts`.
    ///
    /// `timestamps[i]` is the time of `counts[i]`; missing timestamps fall back
    /// to `i / fps`.
    pub fn detect(
        &self,
        counts: &[u32],
        timestamps: &[f64],
        fps: f64,
    ) -> Result<BottleneckAnalysisResult> {
        let fps = ensure_positive(fps, "fps")?;
        let multiplier = ensure_positive(self.config.threshold_multiplier, "threshold_multiplier")?;

        let values = to_f64(counts);
        let Some(average) = mean(&values) else {
            return Ok(BottleneckAnalysisResult::empty());
        };
        let threshold = average * multiplier;
        let min_len = self.config.min_duration_frames.max(1);

        let periods: Vec<BottleneckPeriod> = congested_runs(counts, threshold)
            .into_iter()
            .filter(|run| run.len() >= min_len)
            .map(|run| self.build_period(counts, timestamps, fps, threshold, run))
            .collect();

        let total_duration_seconds = periods.iter().map(|p| p.duration_seconds).sum();

        for period in &periods {
            tracing::debug!(
                start_frame = period.start_frame,
                end_frame = period.end_frame,
                peak = period.peak_count,
                score = period.severity_score,
                severity = period.severity.as_str(),
                "bottleneck period detected"
            );
        }

        Ok(BottleneckAnalysisResult {
            threshold_used: threshold,
            average_count: average,
            max_count: counts.iter().copied().max().unwrap_or(0),
            periods,
            total_duration_seconds,
        })
    }

    fn build_period(
        &self,
        counts: &[u32],
        timestamps: &[f64],
        fps: f64,
        threshold: f64,
        run: Range<usize>,
    ) -> BottleneckPeriod {
        let samples = &counts[run.clone()];
        let peak_count = samples.iter().copied().max().unwrap_or(0);
        let average_count = mean(&to_f64(samples)).unwrap_or(0.0);
        let duration_seconds = samples.len() as f64 / fps;

        let time_at = |i: usize| timestamps.get(i).copied().unwrap_or(i as f64 / fps);
        let (start_frame, end_frame) = (run.start, run.end - 1);
        let (start_time, end_time) = (time_at(start_frame), time_at(end_frame));

        let severity_score = self.severity_score(duration_seconds, peak_count, average_count, threshold);

        BottleneckPeriod {
            start_frame,
            end_frame,
            start_frame_index: start_frame as u64,
            end_frame_index: end_frame as u64,
            start_time,
            end_time,
            time_range: format_range(start_time, end_time),
            frame_count: samples.len(),
            duration_seconds,
            peak_count,
            average_count,
            severity: BottleneckSeverity::from_score(severity_score),
            severity_score,
        }
    }

    /// Weighted sum of duration, intensity and consistency factors in [0, 100]
    fn severity_score(&self, duration_seconds: f64, peak: u32, average: f64, threshold: f64) -> f64 {
        let cfg = &self.config;
        let peak = f64::from(peak);

        let duration_factor =
            (duration_seconds / cfg.duration_saturation_seconds).min(1.0) * cfg.duration_weight;
        let intensity_factor = if threshold > 0.0 {
            ((peak / threshold - 1.0) * cfg.intensity_weight).clamp(0.0, cfg.intensity_weight.max(0.0))
        } else {
            0.0
        };
        let consistency_factor = if peak > 0.0 {
            average / peak * cfg.consistency_weight
        } else {
            0.0
        };

        (duration_factor + intensity_factor + consistency_factor).clamp(0.0, MAX_SEVERITY_SCORE)
    }
}

/// Maximal runs of consecutive samples strictly above `threshold`
fn congested_runs(counts: &[u32], threshold: f64) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = None;

    for (i, &count) in counts.iter().enumerate() {
        let over = f64::from(count) > threshold;
        match (over, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(s..counts.len());
    }

    runs
}
