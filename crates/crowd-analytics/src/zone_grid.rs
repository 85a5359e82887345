use serde::{Deserialize, Serialize};
use std::fmt;

/// Cells per axis; the frame is split into a 3x3 grid
pub const GRID_DIVISIONS: usize = 3;

/// One cell of the 3x3 frame grid, ordered row-major from the top-left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Zone {
    #[serde(rename = "Top-Left")]
    TopLeft,
    #[serde(rename = "Top-Center")]
    TopCenter,
    #[serde(rename = "Top-Right")]
    TopRight,
    #[serde(rename = "Middle-Left")]
    MiddleLeft,
    #[serde(rename = "Middle-Center")]
    MiddleCenter,
    #[serde(rename = "Middle-Right")]
    MiddleRight,
    #[serde(rename = "Bottom-Left")]
    BottomLeft,
    #[serde(rename = "Bottom-Center")]
    BottomCenter,
    #[serde(rename = "Bottom-Right")]
    BottomRight,
}

impl Zone {
    pub const ALL: [Zone; 9] = [
        Zone::TopLeft,
        Zone::TopCenter,
        Zone::TopRight,
        Zone::MiddleLeft,
        Zone::MiddleCenter,
        Zone::MiddleRight,
        Zone::BottomLeft,
        Zone::BottomCenter,
        Zone::BottomRight,
    ];

    /// Zone at a grid cell; indices past the last cell clamp to the edge
    pub fn from_cell(row: usize, col: usize) -> Self {
        let row = row.min(GRID_DIVISIONS - 1);
        let col = col.min(GRID_DIVISIONS - 1);
        Self::ALL[row * GRID_DIVISIONS + col]
    }

    pub fn row(&self) -> usize {
        *self as usize / GRID_DIVISIONS
    }

    pub fn col(&self) -> usize {
        *self as usize % GRID_DIVISIONS
    }

    pub fn label(&self) -> &'static str {
        match self {
            Zone::TopLeft => "Top-Left",
            Zone::TopCenter => "Top-Center",
            Zone::TopRight => "Top-Right",
            Zone::MiddleLeft => "Middle-Left",
            Zone::MiddleCenter => "Middle-Center",
            Zone::MiddleRight => "Middle-Right",
            Zone::BottomLeft => "Bottom-Left",
            Zone::BottomCenter => "Bottom-Center",
            Zone::BottomRight => "Bottom-Right",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a point to its grid zone.
///
/// Total over all inputs: points outside the frame clamp to the nearest edge
/// cell, and a degenerate frame extent falls back to the first cell.
pub fn zone_of(center_x: f64, center_y: f64, width: f64, height: f64) -> Zone {
    Zone::from_cell(cell_index(center_y, height), cell_index(center_x, width))
}

fn cell_index(position: f64, extent: f64) -> usize {
    let index = (position * GRID_DIVISIONS as f64 / extent).floor();
    if index.is_nan() {
        return 0;
    }
    index.clamp(0.0, (GRID_DIVISIONS - 1) as f64) as usize
}
