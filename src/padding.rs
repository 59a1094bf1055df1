//! Padding cell generators.
//!
//! Padding cells extend the regular core grid outward so that the model
//! boundaries sit far from the stations. Each generator returns a one-sided
//! sequence of `num_cells` strictly increasing values measured from the edge
//! of the core grid; the caller mirrors the sequence onto both sides.
//!
//! # Available Strategies
//!
//! - [`PadMethod::Extent1`] ([`padding_cells`]): exponential growth towards a
//!   target distance, never slower than a geometric series.
//! - [`PadMethod::Extent2`] ([`padding_cells_to_extent`]): log-spaced lines
//!   between the core edge and the target distance.
//! - [`PadMethod::Stretch`] ([`padding_from_stretch`]): fixed stretch ratio,
//!   no target distance.
//!
//! All outputs are rounded to the nearest hundred metres.
//!
//! # Example
//!
//! ```
//! use modem_mesh::padding::padding_cells;
//!
//! let pad = padding_cells(500.0, 50_000.0, 7, 1.2).unwrap();
//! assert_eq!(pad.len(), 7);
//! assert!(pad.windows(2).all(|w| w[1] > w[0]));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MeshError, Result};
use crate::numeric::{logspace_between, round_hundreds};

/// Padding strategy selected by configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PadMethod {
    /// Distance driven: [`padding_cells`].
    #[default]
    Extent1,
    /// Anchor + target driven: [`padding_cells_to_extent`].
    Extent2,
    /// Ratio driven: [`padding_from_stretch`].
    Stretch,
}

impl PadMethod {
    /// Name used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            PadMethod::Extent1 => "extent1",
            PadMethod::Extent2 => "extent2",
            PadMethod::Stretch => "stretch",
        }
    }
}

impl fmt::Display for PadMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PadMethod {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "extent1" => Ok(PadMethod::Extent1),
            "extent2" => Ok(PadMethod::Extent2),
            "stretch" => Ok(PadMethod::Stretch),
            other => Err(MeshError::config(format!(
                "unknown padding method '{}' (expected extent1, extent2 or stretch)",
                other
            ))),
        }
    }
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MeshError::config(format!(
            "{} must be positive and finite, got {}",
            name, value
        )))
    }
}

// =============================================================================
// extent1
// =============================================================================

/// Padding that grows exponentially to `max_distance`.
///
/// With base width `w·s` and scale factor `k = (D / (w·s))^(1/(N-1))`, the
/// i-th value is the larger of the exponential term `w·s·k^i` and the
/// geometric series `w·s·(1 - s^(i+1)) / (1 - s)`, each rounded to hundreds.
/// The geometric term keeps growth going when `k` is small.
///
/// # Arguments
///
/// * `cell_width` - Core cell width (m)
/// * `max_distance` - One-sided distance the padding should reach (m)
/// * `num_cells` - Number of padding values (at least 2)
/// * `stretch` - Base geometric factor (positive, not 1)
pub fn padding_cells(
    cell_width: f64,
    max_distance: f64,
    num_cells: usize,
    stretch: f64,
) -> Result<Vec<f64>> {
    check_positive("cell width", cell_width)?;
    check_positive("padding distance", max_distance)?;
    check_positive("padding stretch", stretch)?;
    if stretch == 1.0 {
        return Err(MeshError::config("padding stretch must differ from 1"));
    }
    if num_cells < 2 {
        return Err(MeshError::config(format!(
            "extent padding needs at least 2 cells, got {}",
            num_cells
        )));
    }

    let base = cell_width * stretch;
    let scaling = (max_distance / base).powf(1.0 / (num_cells - 1) as f64);

    let padding = (0..num_cells)
        .map(|ii| {
            let exp_pad = round_hundreds(base * scaling.powi(ii as i32));
            let mult_pad =
                round_hundreds(base * ((1.0 - stretch.powi(ii as i32 + 1)) / (1.0 - stretch)));
            exp_pad.max(mult_pad)
        })
        .collect();

    Ok(padding)
}

// =============================================================================
// extent2
// =============================================================================

/// Padding from log-spaced lines between the core edge and a target.
///
/// Takes `num_cells` log-spaced samples between `core_max` and
/// `max(cell_width·num_cells, max_distance)`, rounds them to hundreds and
/// subtracts `core_max`, so the sequence starts near zero.
pub fn padding_cells_to_extent(
    cell_width: f64,
    core_max: f64,
    max_distance: f64,
    num_cells: usize,
) -> Result<Vec<f64>> {
    check_positive("cell width", cell_width)?;
    check_positive("core grid edge", core_max)?;
    if num_cells < 2 {
        return Err(MeshError::config(format!(
            "extent padding needs at least 2 cells, got {}",
            num_cells
        )));
    }

    let max_distance = max_distance.max(cell_width * num_cells as f64);
    if max_distance <= core_max {
        return Err(MeshError::config(format!(
            "padding extent {} does not reach beyond the core grid edge {}",
            max_distance, core_max
        )));
    }

    Ok(logspace_between(core_max, max_distance, num_cells)
        .into_iter()
        .map(|line| round_hundreds(line) - core_max)
        .collect())
}

// =============================================================================
// stretch
// =============================================================================

/// Padding from a fixed stretch ratio.
///
/// Raw widths are `round(w·s^i, -2)`. The return value is their running sum,
/// i.e. the offset of each padding line from the core edge, not the widths
/// themselves.
pub fn padding_from_stretch(cell_width: f64, pad_stretch: f64, num_cells: usize) -> Result<Vec<f64>> {
    check_positive("cell width", cell_width)?;
    check_positive("padding stretch", pad_stretch)?;
    if num_cells == 0 {
        return Err(MeshError::config("stretch padding needs at least 1 cell"));
    }

    let mut offset = 0.0;
    Ok((0..num_cells)
        .map(|ii| {
            offset += round_hundreds(cell_width * pad_stretch.powi(ii as i32));
            offset
        })
        .collect())
}

/// Convert cumulative padding offsets into per-cell widths.
///
/// The result has one element fewer than the input.
pub fn offsets_to_widths(offsets: &[f64]) -> Vec<f64> {
    offsets.windows(2).map(|w| w[1] - w[0]).collect()
}
