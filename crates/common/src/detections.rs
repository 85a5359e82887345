//! Detection contracts shared between the analytics engine and its callers.
//!
//! An external frame sampler and person detector produces one [`Detection`] per
//! sampled frame. The ordered sequence for a single video, together with its
//! [`VideoContext`], is the unit of analysis.

use serde::{Deserialize, Serialize};

/// Person bounding box in pixel coordinates (top-left / bottom-right corners)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Center point of the box
    pub fn center(&self) -> (f64, f64) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }
}

/// Detector output for one sampled frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Frame number in the source video
    pub frame_index: u64,

    /// Position of the frame in the video, in seconds
    pub timestamp_seconds: f64,

    /// Number of people the detector counted in this frame
    pub person_count: u32,

    /// Person boxes (may be empty when the detector only reports counts)
    #[serde(default)]
    pub boxes: Vec<BoundingBox>,
}

impl Detection {
    pub fn new(frame_index: u64, timestamp_seconds: f64, person_count: u32) -> Self {
        Self {
            frame_index,
            timestamp_seconds,
            person_count,
            boxes: Vec::new(),
        }
    }

    pub fn with_boxes(mut self, boxes: Vec<BoundingBox>) -> Self {
        self.boxes = boxes;
        self
    }
}

/// Per-video configuration for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoContext {
    /// Frame width in pixels
    pub frame_width: u32,

    /// Frame height in pixels
    pub frame_height: u32,

    /// Source frame rate
    pub fps: f64,

    /// Total video duration in seconds
    pub duration_seconds: f64,

    /// Floor area covered by the camera, in square meters
    #[serde(default = "default_monitored_area")]
    pub monitored_area_sqm: f64,
}

fn default_monitored_area() -> f64 {
    100.0
}

impl Default for VideoContext {
    fn default() -> Self {
        Self {
            frame_width: 1920,
            frame_height: 1080,
            fps: 30.0,
            duration_seconds: 0.0,
            monitored_area_sqm: default_monitored_area(),
        }
    }
}

/// Extract the count and timestamp series, in input order
pub fn count_series(detections: &[Detection]) -> (Vec<u32>, Vec<f64>) {
    detections
        .iter()
        .map(|d| (d.person_count, d.timestamp_seconds))
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_center() {
        let bbox = BoundingBox::new(100.0, 200.0, 150.0, 300.0);
        assert_eq!(bbox.center(), (125.0, 250.0));
    }

    #[test]
    fn test_detection_deserialization_without_boxes() {
        let json = r#"{"frame_index": 30, "timestamp_seconds": 1.0, "person_count": 4}"#;
        let detection: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(detection.frame_index, 30);
        assert_eq!(detection.person_count, 4);
        assert!(detection.boxes.is_empty());
    }

    #[test]
    fn test_video_context_default_area() {
        let json = r#"{"frame_width": 640, "frame_height": 480, "fps": 25.0, "duration_seconds": 12.0}"#;
        let context: VideoContext = serde_json::from_str(json).unwrap();
        assert_eq!(context.monitored_area_sqm, 100.0);
        assert_eq!(context.frame_width, 640);
    }

    #[test]
    fn test_count_series() {
        let detections = vec![
            Detection::new(0, 0.0, 3),
            Detection::new(30, 1.0, 5),
            Detection::new(60, 2.0, 4),
        ];

        let (counts, timestamps) = count_series(&detections);
        assert_eq!(counts, vec![3, 5, 4]);
        assert_eq!(timestamps, vec![0.0, 1.0, 2.0]);
    }
}
