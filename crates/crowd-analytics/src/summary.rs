//! Whole-video person-count statistics and the busiest sampled frames

use crate::stats::{format_clock, mean, std_dev, to_f64};
use common::detections::Detection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountStatistics {
    pub total_frames: usize,
    /// Sum of person counts over every sampled frame
    pub total_detections: u64,
    pub average_count: f64,
    pub median_count: f64,
    pub min_count: u32,
    pub max_count: u32,
    pub std_deviation: f64,
}

impl CountStatistics {
    pub fn from_counts(counts: &[u32]) -> Self {
        let values = to_f64(counts);
        Self {
            total_frames: counts.len(),
            total_detections: counts.iter().map(|&c| u64::from(c)).sum(),
            average_count: mean(&values).unwrap_or(0.0),
            median_count: median(counts),
            min_count: counts.iter().copied().min().unwrap_or(0),
            max_count: counts.iter().copied().max().unwrap_or(0),
            std_deviation: std_dev(&values).unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakFrame {
    pub frame_index: u64,
    pub timestamp_seconds: f64,
    /// `MM:SS`
    pub timestamp_label: String,
    pub person_count: u32,
}

/// The `limit` frames with the most people, busiest first.
///
/// Frames with equal counts keep their input order.
pub fn peak_frames(detections: &[Detection], limit: usize) -> Vec<PeakFrame> {
    let mut ranked: Vec<&Detection> = detections.iter().collect();
    ranked.sort_by(|a, b| b.person_count.cmp(&a.person_count));

    ranked
        .into_iter()
        .take(limit)
        .map(|d| PeakFrame {
            frame_index: d.frame_index,
            timestamp_seconds: d.timestamp_seconds,
            timestamp_label: format_clock(d.timestamp_seconds),
            person_count: d.person_count,
        })
        .collect()
}

/// Middle value, or the mean of the two middle values; 0 when empty
fn median(counts: &[u32]) -> f64 {
    let mut sorted = counts.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    match sorted.len() {
        0 => 0.0,
        n if n % 2 == 1 => f64::from(sorted[mid]),
        _ => (f64::from(sorted[mid - 1]) + f64::from(sorted[mid])) / 2.0,
    }
}
