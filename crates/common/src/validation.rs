//! Input validation for analysis requests
//!
//! Guards the service boundary against unbounded payloads and nonsensical
//! numeric configuration before anything reaches the analytics engine.

use anyhow::{anyhow, Result};

use crate::detections::{Detection, VideoContext};

// ============================================================================
// CONSTANTS: Input Size Limits
// ============================================================================

/// Maximum number of sampled frames accepted in one request
pub const MAX_DETECTIONS: usize = 100_000;

/// Maximum number of person boxes accepted for a single frame
pub const MAX_BOXES_PER_FRAME: usize = 2_048;

/// Maximum accepted frame dimension in pixels
pub const MAX_FRAME_DIMENSION: u32 = 16_384;

// ============================================================================
// Numeric Validation
// ============================================================================

/// Validate that a value is finite and not negative
pub fn validate_non_negative(value: f64, field_name: &str) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(anyhow!("{} must not be negative, got {}", field_name, value));
    }
    Ok(())
}

/// Validate value is within range
pub fn validate_range<T: PartialOrd + std::fmt::Display>(
    value: T,
    min: T,
    max: T,
    field_name: &str,
) -> Result<()> {
    if value < min || value > max {
        return Err(anyhow!(
            "{} must be between {} and {}, got {}",
            field_name,
            min,
            max,
            value
        ));
    }
    Ok(())
}

// ============================================================================
// Request Validation
// ============================================================================

/// Validate frame geometry of a video context
///
/// Numeric analysis parameters (area, fps) are checked by the engine itself so
/// that its error taxonomy stays authoritative; this only bounds the frame size.
pub fn validate_video_context(context: &VideoContext) -> Result<()> {
    validate_range(context.frame_width, 1, MAX_FRAME_DIMENSION, "frame_width")?;
    validate_range(context.frame_height, 1, MAX_FRAME_DIMENSION, "frame_height")?;
    validate_non_negative(context.duration_seconds, "duration_seconds")?;
    Ok(())
}

/// Validate the size and shape of a detection batch
pub fn validate_detections(detections: &[Detection]) -> Result<()> {
    if detections.len() > MAX_DETECTIONS {
        return Err(anyhow!(
            "detections exceeds maximum of {} frames (got {})",
            MAX_DETECTIONS,
            detections.len()
        ));
    }

    for detection in detections {
        if !detection.timestamp_seconds.is_finite() {
            return Err(anyhow!(
                "frame {} has a non-finite timestamp",
                detection.frame_index
            ));
        }
        if detection.boxes.len() > MAX_BOXES_PER_FRAME {
            return Err(anyhow!(
                "frame {} exceeds maximum of {} boxes (got {})",
                detection.frame_index,
                MAX_BOXES_PER_FRAME,
                detection.boxes.len()
            ));
        }
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detections::BoundingBox;

    #[test]
    fn test_validate_range() {
        assert!(validate_range(5, 1, 10, "value").is_ok());
        assert!(validate_range(1, 1, 10, "value").is_ok());
        assert!(validate_range(0, 1, 10, "value").is_err());
        assert!(validate_range(11, 1, 10, "value").is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative(0.0, "duration_seconds").is_ok());
        assert!(validate_non_negative(-0.5, "duration_seconds").is_err());
        assert!(validate_non_negative(f64::INFINITY, "duration_seconds").is_err());
    }

    #[test]
    fn test_validate_video_context() {
        assert!(validate_video_context(&VideoContext::default()).is_ok());

        let zero_width = VideoContext {
            frame_width: 0,
            ..VideoContext::default()
        };
        assert!(validate_video_context(&zero_width).is_err());

        let negative_duration = VideoContext {
            duration_seconds: -1.0,
            ..VideoContext::default()
        };
        assert!(validate_video_context(&negative_duration).is_err());
    }

    #[test]
    fn test_validate_detections() {
        let ok = vec![Detection::new(0, 0.0, 1)
            .with_boxes(vec![BoundingBox::new(0.0, 0.0, 10.0, 10.0)])];
        assert!(validate_detections(&ok).is_ok());
        assert!(validate_detections(&[]).is_ok());

        let bad_timestamp = vec![Detection::new(0, f64::NAN, 1)];
        assert!(validate_detections(&bad_timestamp).is_err());

        let crowded = vec![Detection::new(0, 0.0, 1)
            .with_boxes(vec![BoundingBox::new(0.0, 0.0, 1.0, 1.0); MAX_BOXES_PER_FRAME + 1])];
        assert!(validate_detections(&crowded).is_err());
    }
}
