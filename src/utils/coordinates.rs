use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{DEFAULT_GRID_SIZE, QUANTIZE_DECIMALS};

/// Round `value` to `decimals` places, halves away from zero.
///
/// Magnitudes too large to scale are returned unchanged; they carry no
/// fractional digits at that size anyway.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// Snap a coordinate onto the nearest multiple of `grid`, kept to two decimals.
///
/// Both the cell index and the final two-decimal rounding use `f64::round`,
/// so a value exactly half a cell away from two grid lines snaps away from zero.
/// `grid` must be finite and positive; use [`GridQuantizer`] to enforce that.
/// Values too large to divide into cells are returned as they are.
///
/// # Examples
/// ```
/// use envmon_processor::utils::quantize;
///
/// assert_eq!(quantize(-25.4966884, 0.05), -25.5);
/// assert_eq!(quantize(0.125, 0.25), 0.25);
/// ```
pub fn quantize(value: f64, grid: f64) -> f64 {
    let snapped = grid * (value / grid).round();
    if !snapped.is_finite() {
        return value;
    }
    round_to(snapped, QUANTIZE_DECIMALS)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantizedLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Quantizer with a validated grid size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridQuantizer {
    grid: f64,
}

impl GridQuantizer {
    pub fn new(grid: f64) -> Result<Self> {
        if !grid.is_finite() || grid <= 0.0 {
            return Err(ProcessingError::InvalidGridSize(grid));
        }
        Ok(Self { grid })
    }

    pub fn grid(&self) -> f64 {
        self.grid
    }

    pub fn quantize(&self, value: f64) -> f64 {
        quantize(value, self.grid)
    }

    pub fn location(&self, latitude: f64, longitude: f64) -> QuantizedLocation {
        QuantizedLocation {
            latitude: self.quantize(latitude),
            longitude: self.quantize(longitude),
        }
    }
}

impl Default for GridQuantizer {
    fn default() -> Self {
        Self {
            grid: DEFAULT_GRID_SIZE,
        }
    }
}
