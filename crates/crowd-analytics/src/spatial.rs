//! Spatial distribution of detections over the 3x3 frame grid

use crate::config::SpatialConfig;
use crate::density::DensityLevel;
use crate::zone_grid::{zone_of, Zone};
use common::detections::{Detection, VideoContext};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const NO_DETECTIONS: &str = "No detections";

/// Per-zone breakdown, one entry per grid cell in row-major order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSummary {
    pub zone: Zone,
    pub row: usize,
    pub col: usize,
    pub detection_count: u32,
    pub percentage: f64,
    /// How large this zone's share of all detections is
    pub share_level: DensityLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialDistributionResult {
    /// Number of boxes across all frames
    pub total_boxes: u32,
    pub zone_counts: BTreeMap<Zone, u32>,
    pub zone_percentages: BTreeMap<Zone, f64>,
    /// Hotspot zones, largest share first
    pub hotspots: Vec<Zone>,
    pub pattern_description: String,
    pub zones: Vec<ZoneSummary>,
}

impl SpatialDistributionResult {
    /// Result for a run without any boxes
    pub fn empty() -> Self {
        Self::from_histogram([0; 9], &SpatialConfig::default())
    }

    fn from_histogram(histogram: [u32; 9], config: &SpatialConfig) -> Self {
        let total_boxes: u32 = histogram.iter().sum();
        let percentage_of = |count: u32| {
            if total_boxes == 0 {
                0.0
            } else {
                f64::from(count) / f64::from(total_boxes) * 100.0
            }
        };

        let zones: Vec<ZoneSummary> = Zone::ALL
            .iter()
            .zip(histogram)
            .map(|(&zone, count)| {
                let percentage = percentage_of(count);
                ZoneSummary {
                    zone,
                    row: zone.row(),
                    col: zone.col(),
                    detection_count: count,
                    percentage,
                    share_level: share_level(percentage),
                }
            })
            .collect();

        let mut hotspots: Vec<&ZoneSummary> = zones
            .iter()
            .filter(|z| total_boxes > 0 && z.percentage >= config.hotspot_threshold_percent)
            .collect();
        // stable sort keeps row-major order between equal shares
        hotspots.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
        let hotspots: Vec<Zone> = hotspots.into_iter().map(|z| z.zone).collect();

        let dominant = zones
            .iter()
            .find(|z| total_boxes > 0 && z.percentage > config.concentration_threshold_percent)
            .map(|z| z.zone);

        Self {
            total_boxes,
            zone_counts: zones.iter().map(|z| (z.zone, z.detection_count)).collect(),
            zone_percentages: zones.iter().map(|z| (z.zone, z.percentage)).collect(),
            pattern_description: describe_pattern(total_boxes, dominant, &hotspots),
            hotspots,
            zones,
        }
    }
}

fn describe_pattern(total_boxes: u32, dominant: Option<Zone>, hotspots: &[Zone]) -> String {
    if total_boxes == 0 {
        return NO_DETECTIONS.to_string();
    }
    if let Some(zone) = dominant {
        return format!("Concentrated in {}", zone);
    }
    match hotspots.len() {
        0 => "Evenly distributed".to_string(),
        n if n >= 3 => "Widely distributed".to_string(),
        _ => {
            let names: Vec<&str> = hotspots.iter().map(Zone::label).collect();
            format!("Distributed across {}", names.join(", "))
        }
    }
}

/// Grade a zone's share of detections
fn share_level(percentage: f64) -> DensityLevel {
    if percentage > 20.0 {
        DensityLevel::VeryHigh
    } else if percentage > 15.0 {
        DensityLevel::High
    } else if percentage > 10.0 {
        DensityLevel::Moderate
    } else if percentage > 5.0 {
        DensityLevel::Low
    } else {
        DensityLevel::VeryLow
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpatialDistributionAnalyzer {
    config: SpatialConfig,
}

impl SpatialDistributionAnalyzer {
    pub fn new(config: SpatialConfig) -> Self {
        Self { config }
    }

    /// Bin every box center of every frame into the zone grid
    pub fn analyze(
        &self,
        detections: &[Detection],
        context: &VideoContext,
    ) -> SpatialDistributionResult {
        let width = f64::from(context.frame_width);
        let height = f64::from(context.frame_height);

        let mut histogram = [0u32; 9];
        for bbox in detections.iter().flat_map(|d| d.boxes.iter()) {
            let (center_x, center_y) = bbox.center();
            let zone = zone_of(center_x, center_y, width, height);
            histogram[zone as usize] += 1;
        }

        let result = SpatialDistributionResult::from_histogram(histogram, &self.config);
        tracing::debug!(
            total_boxes = result.total_boxes,
            hotspots = result.hotspots.len(),
            pattern = %result.pattern_description,
            "spatial distribution analyzed"
        );
        result
    }
}
