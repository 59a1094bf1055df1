//! Elevation interpolation onto grid cell centres.
//!
//! The interpolator samples an [`ElevationSurface`] at the horizontal cell
//! centres of a grid and returns a `(north, east)` array:
//!
//! 1. Elevations above `elevation_max` are clipped.
//! 2. Values are interpolated linearly on a triangulation of the samples, or
//!    taken from the nearest sample. Centres outside the triangulation get
//!    the mean of the clipped samples.
//! 3. The outer `pad` rows and columns are overwritten with the nearest
//!    interior row/column, which flattens the topography under the padding.
//!
//! # Example
//!
//! ```
//! use modem_mesh::interp::{CoordinateKind, ElevationInterpolator, ElevationSurface, InterpolationMethod};
//! use ndarray::array;
//!
//! let surface = ElevationSurface::from_axes(
//!     vec![-1000.0, 1000.0],
//!     vec![-1000.0, 1000.0],
//!     array![[0.0, 200.0], [0.0, 200.0]],
//!     CoordinateKind::Projected,
//! )
//! .unwrap();
//!
//! let elevation = ElevationInterpolator::new(InterpolationMethod::Linear)
//!     .interpolate(&surface, &[-500.0, 0.0, 500.0], &[0.0])
//!     .unwrap();
//! assert_eq!(elevation.dim(), (1, 3));
//! assert!((elevation[[0, 1]] - 100.0).abs() < 1e-9);
//! ```

use std::fmt;
use std::str::FromStr;

use log::debug;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::surface::{CoordinateKind, ElevationSurface};
use super::triangulation::{point_index, Triangulation};
use crate::error::{MeshError, Result};
use crate::io::CoordinateProjection;
use crate::mesh::{Grid, MeshConfig, StationSet};
use crate::types::Axis;

/// Interpolation scheme for elevation surfaces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    /// Barycentric interpolation on a triangulation.
    Linear,
    /// Value of the closest sample.
    #[default]
    Nearest,
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InterpolationMethod::Linear => "linear",
            InterpolationMethod::Nearest => "nearest",
        })
    }
}

impl FromStr for InterpolationMethod {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(InterpolationMethod::Linear),
            "nearest" => Ok(InterpolationMethod::Nearest),
            other => Err(MeshError::config(format!(
                "unknown interpolation method '{}' (expected linear or nearest)",
                other
            ))),
        }
    }
}

/// Samples elevation surfaces at grid cell centres.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElevationInterpolator {
    method: InterpolationMethod,
    elevation_max: Option<f64>,
    pad: usize,
}

impl ElevationInterpolator {
    pub fn new(method: InterpolationMethod) -> Self {
        Self {
            method,
            elevation_max: None,
            pad: 0,
        }
    }

    /// Interpolator using the method, clipping and padding of a config.
    pub fn from_config(config: &MeshConfig) -> Self {
        Self {
            method: config.interp_method,
            elevation_max: config.elevation_max,
            pad: config.elevation_pad,
        }
    }

    /// Clip source elevations above `max`.
    pub fn with_elevation_max(mut self, max: f64) -> Self {
        self.elevation_max = Some(max);
        self
    }

    /// Overwrite `pad` edge rows/columns with the nearest interior values.
    pub fn with_pad(mut self, pad: usize) -> Self {
        self.pad = pad;
        self
    }

    pub fn method(&self) -> InterpolationMethod {
        self.method
    }

    /// Elevation at every `(north, east)` pair of the given centres.
    ///
    /// The surface must be in projected coordinates in the same frame as the
    /// centres.
    pub fn interpolate(
        &self,
        surface: &ElevationSurface,
        east: &[f64],
        north: &[f64],
    ) -> Result<Array2<f64>> {
        if surface.kind() != CoordinateKind::Projected {
            return Err(MeshError::config(
                "geodetic elevation surfaces need a projection before interpolation",
            ));
        }
        if east.is_empty() || north.is_empty() {
            return Err(MeshError::domain("no cell centres to interpolate onto"));
        }
        if self.pad > 0 && (2 * self.pad >= east.len() || 2 * self.pad >= north.len()) {
            return Err(MeshError::config(format!(
                "edge pad {} leaves no interior in a {} x {} array",
                self.pad,
                north.len(),
                east.len()
            )));
        }

        let clipped;
        let surface = match self.elevation_max {
            Some(max) => {
                clipped = surface.clipped(max);
                &clipped
            }
            None => surface,
        };
        let fill = surface.mean_elevation();
        let values = surface.elevation();
        let points = surface.points();

        let mut out = Array2::from_elem((north.len(), east.len()), fill);
        match self.method {
            InterpolationMethod::Linear => {
                let triangulation = match surface.raster_shape() {
                    Some((rows, cols)) => Triangulation::structured(points, rows, cols),
                    None => Triangulation::delaunay(points),
                };
                let mut outside = 0usize;
                for (i, &n) in north.iter().enumerate() {
                    for (j, &e) in east.iter().enumerate() {
                        match triangulation.interpolate(values, [e, n]) {
                            Some(z) => out[[i, j]] = z,
                            None => outside += 1,
                        }
                    }
                }
                debug!(
                    "linear elevation: {} triangles, {} of {} centres outside filled with {:.2}",
                    triangulation.n_triangles(),
                    outside,
                    out.len(),
                    fill
                );
            }
            InterpolationMethod::Nearest => {
                let tree = point_index(&points);
                for (i, &n) in north.iter().enumerate() {
                    for (j, &e) in east.iter().enumerate() {
                        if let Some(sample) = tree.nearest_neighbor(&[e, n]) {
                            out[[i, j]] = values[sample.index];
                        }
                    }
                }
            }
        }

        extend_edges(&mut out, self.pad)?;
        Ok(out)
    }

    /// Elevation at the horizontal cell centres of `grid`.
    ///
    /// `origin` is the real-world position of the grid frame origin (see
    /// [`StationSet::model_origin`]); it is added to the centres so they
    /// line up with the surface coordinates.
    pub fn interpolate_to_grid(
        &self,
        surface: &ElevationSurface,
        grid: &Grid,
        origin: (f64, f64),
    ) -> Result<Array2<f64>> {
        let east: Vec<f64> = grid.centers(Axis::East).iter().map(|c| c + origin.0).collect();
        let north: Vec<f64> = grid.centers(Axis::North).iter().map(|c| c + origin.1).collect();
        self.interpolate(surface, &east, &north)
    }

    /// Project a geodetic surface and sample it at the grid's cell centres.
    pub fn interpolate_geodetic<P: CoordinateProjection>(
        &self,
        surface: &ElevationSurface,
        projection: &P,
        grid: &Grid,
        origin: (f64, f64),
    ) -> Result<Array2<f64>> {
        self.interpolate_to_grid(&surface.to_projected(projection), grid, origin)
    }
}

/// Copy the nearest interior row/column into the outer `pad` rows and
/// columns.
pub fn extend_edges(values: &mut Array2<f64>, pad: usize) -> Result<()> {
    if pad == 0 {
        return Ok(());
    }
    let (rows, cols) = values.dim();
    if 2 * pad >= rows || 2 * pad >= cols {
        return Err(MeshError::config(format!(
            "edge pad {} leaves no interior in a {} x {} array",
            pad, rows, cols
        )));
    }

    for i in 0..pad {
        let first = values.row(pad).to_owned();
        values.row_mut(i).assign(&first);
        let last = values.row(rows - pad - 1).to_owned();
        values.row_mut(rows - 1 - i).assign(&last);
    }
    for j in 0..pad {
        let first = values.column(pad).to_owned();
        values.column_mut(j).assign(&first);
        let last = values.column(cols - pad - 1).to_owned();
        values.column_mut(cols - 1 - j).assign(&last);
    }
    Ok(())
}

/// Cells whose centre lies closer than `buffer` metres to any station.
///
/// Returns a `(north, east)` mask.
pub fn station_buffer(
    east_centers: &[f64],
    north_centers: &[f64],
    stations: &StationSet,
    buffer: f64,
) -> Array2<bool> {
    let buffer_2 = buffer * buffer;
    let mut mask = Array2::from_elem((north_centers.len(), east_centers.len()), false);
    for station in stations.iter() {
        for (i, &n) in north_centers.iter().enumerate() {
            let dn = n - station.rel_north;
            for (j, &e) in east_centers.iter().enumerate() {
                let de = e - station.rel_east;
                if de * de + dn * dn < buffer_2 {
                    mask[[i, j]] = true;
                }
            }
        }
    }
    mask
}
