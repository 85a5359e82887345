use crate::error::{ensure_positive, Result};
use serde::{Deserialize, Serialize};

/// Lower bound (people per square meter) of each level above `VeryLow`
pub const LOW_DENSITY: f64 = 0.1;
pub const MODERATE_DENSITY: f64 = 0.2;
pub const HIGH_DENSITY: f64 = 0.3;
pub const VERY_HIGH_DENSITY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityLevel {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl DensityLevel {
    pub fn from_density(density: f64) -> Self {
        if density >= VERY_HIGH_DENSITY {
            Self::VeryHigh
        } else if density >= HIGH_DENSITY {
            Self::High
        } else if density >= MODERATE_DENSITY {
            Self::Moderate
        } else if density >= LOW_DENSITY {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    /// Severity from 1 (very low) to 5 (very high)
    pub fn severity_score(&self) -> u8 {
        match self {
            Self::VeryLow => 1,
            Self::Low => 2,
            Self::Moderate => 3,
            Self::High => 4,
            Self::VeryHigh => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityResult {
    pub person_count: u32,
    pub area_sqm: f64,
    pub density_per_sqm: f64,
    pub level: DensityLevel,
    pub severity_score: u8,
}

/// Classify how crowded `area_sqm` is with `person_count` people in it
pub fn classify(person_count: u32, area_sqm: f64) -> Result<DensityResult> {
    let area_sqm = ensure_positive(area_sqm, "monitored_area_sqm")?;
    let density = f64::from(person_count) / area_sqm;
    let level = DensityLevel::from_density(density);

    Ok(DensityResult {
        person_count,
        area_sqm,
        density_per_sqm: density,
        level,
        severity_score: level.severity_score(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;

    #[test]
    fn test_classify_high_at_lower_bound() {
        let result = classify(30, 100.0).unwrap();
        assert_eq!(result.density_per_sqm, 0.3);
        assert_eq!(result.level, DensityLevel::High);
        assert_eq!(result.severity_score, 4);
    }

    #[test]
    fn test_classify_levels() {
        let cases = [
            (0, DensityLevel::VeryLow, 1),
            (5, DensityLevel::VeryLow, 1),
            (10, DensityLevel::Low, 2),
            (19, DensityLevel::Low, 2),
            (20, DensityLevel::Moderate, 3),
            (29, DensityLevel::Moderate, 3),
            (49, DensityLevel::High, 4),
            (50, DensityLevel::VeryHigh, 5),
            (400, DensityLevel::VeryHigh, 5),
        ];

        for (count, level, severity) in cases {
            let result = classify(count, 100.0).unwrap();
            assert_eq!(result.level, level, "count {}", count);
            assert_eq!(result.severity_score, severity, "count {}", count);
        }
    }

    #[test]
    fn test_classify_rejects_non_positive_area() {
        assert_eq!(
            classify(10, 0.0),
            Err(AnalyticsError::invalid_configuration("monitored_area_sqm", 0.0))
        );
        assert!(classify(10, -25.0).is_err());
    }

    #[test]
    fn test_level_ordering() {
        assert!(DensityLevel::VeryHigh > DensityLevel::High);
        assert!(DensityLevel::Moderate < DensityLevel::High);
        assert_eq!(DensityLevel::VeryLow.label(), "Very Low");
    }
}
