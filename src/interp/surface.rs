//! Elevation surfaces to be draped onto a grid.
//!
//! A surface is a set of elevation samples (positive up, metres) with
//! horizontal coordinates. Samples either come from a logically rectangular
//! raster (regular axes or 2-D curvilinear coordinate arrays) or are
//! scattered points. Coordinates are geodetic (longitude, latitude) or
//! already projected (east, north in metres).

use ndarray::Array2;

use crate::error::{MeshError, Result};
use crate::io::CoordinateProjection;
use crate::numeric::mean;

/// Meaning of a surface's x/y coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordinateKind {
    /// x = longitude, y = latitude (degrees).
    Geodetic,
    /// x = easting, y = northing (metres).
    Projected,
}

/// Elevation samples with horizontal coordinates.
///
/// ```
/// use modem_mesh::interp::{CoordinateKind, ElevationSurface};
/// use ndarray::array;
///
/// // Rows run south to north, columns west to east
/// let surface = ElevationSurface::from_axes(
///     vec![0.0, 100.0, 200.0],
///     vec![0.0, 100.0],
///     array![[10.0, 20.0, 30.0], [40.0, 50.0, 60.0]],
///     CoordinateKind::Projected,
/// )
/// .unwrap();
/// assert_eq!(surface.len(), 6);
/// assert_eq!(surface.raster_shape(), Some((2, 3)));
/// assert_eq!(surface.mean_elevation(), 35.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ElevationSurface {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    /// (rows, cols) when samples are stored row-major on a raster.
    raster: Option<(usize, usize)>,
    kind: CoordinateKind,
}

impl ElevationSurface {
    /// Raster with regular axes. `elevation` is `(y.len(), x.len())`.
    pub fn from_axes(
        x: Vec<f64>,
        y: Vec<f64>,
        elevation: Array2<f64>,
        kind: CoordinateKind,
    ) -> Result<Self> {
        let (rows, cols) = elevation.dim();
        if rows != y.len() || cols != x.len() {
            return Err(MeshError::domain(format!(
                "elevation shape ({}, {}) does not match axes ({} y, {} x)",
                rows,
                cols,
                y.len(),
                x.len()
            )));
        }

        let mut xs = Vec::with_capacity(rows * cols);
        let mut ys = Vec::with_capacity(rows * cols);
        for &yy in &y {
            for &xx in &x {
                xs.push(xx);
                ys.push(yy);
            }
        }
        Self::build(xs, ys, elevation.iter().copied().collect(), Some((rows, cols)), kind)
    }

    /// Raster with curvilinear coordinates; all three arrays share a shape.
    pub fn from_grid(
        x: Array2<f64>,
        y: Array2<f64>,
        elevation: Array2<f64>,
        kind: CoordinateKind,
    ) -> Result<Self> {
        let shape = elevation.dim();
        if x.dim() != shape || y.dim() != shape {
            return Err(MeshError::domain(format!(
                "coordinate arrays {:?} / {:?} do not match elevation shape {:?}",
                x.dim(),
                y.dim(),
                shape
            )));
        }
        Self::build(
            x.iter().copied().collect(),
            y.iter().copied().collect(),
            elevation.iter().copied().collect(),
            Some(shape),
            kind,
        )
    }

    /// Scattered samples.
    pub fn from_points(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>, kind: CoordinateKind) -> Result<Self> {
        if x.len() != y.len() || x.len() != z.len() {
            return Err(MeshError::domain(format!(
                "scattered samples need equal lengths, got x {}, y {}, z {}",
                x.len(),
                y.len(),
                z.len()
            )));
        }
        Self::build(x, y, z, None, kind)
    }

    fn build(
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
        raster: Option<(usize, usize)>,
        kind: CoordinateKind,
    ) -> Result<Self> {
        if z.is_empty() {
            return Err(MeshError::domain("elevation surface has no samples"));
        }
        Ok(Self {
            x,
            y,
            z,
            raster,
            kind,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.z.len()
    }

    /// Always false; surfaces hold at least one sample.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }

    #[inline]
    pub fn kind(&self) -> CoordinateKind {
        self.kind
    }

    /// `(rows, cols)` for raster surfaces, `None` for scattered samples.
    #[inline]
    pub fn raster_shape(&self) -> Option<(usize, usize)> {
        self.raster
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn elevation(&self) -> &[f64] {
        &self.z
    }

    /// Sample locations as `[x, y]` pairs.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.x.iter().zip(&self.y).map(|(&x, &y)| [x, y]).collect()
    }

    pub fn mean_elevation(&self) -> f64 {
        mean(&self.z)
    }

    pub fn min_elevation(&self) -> f64 {
        self.z.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max_elevation(&self) -> f64 {
        self.z.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Copy with elevations above `max` set to `max`.
    pub fn clipped(&self, max: f64) -> Self {
        Self {
            z: self.z.iter().map(|&v| v.min(max)).collect(),
            ..self.clone()
        }
    }

    /// Copy in projected metres.
    ///
    /// Geodetic surfaces are run through `projection`; projected ones are
    /// returned unchanged.
    pub fn to_projected<P: CoordinateProjection>(&self, projection: &P) -> Self {
        match self.kind {
            CoordinateKind::Projected => self.clone(),
            CoordinateKind::Geodetic => {
                let (x, y) = self
                    .x
                    .iter()
                    .zip(&self.y)
                    .map(|(&lon, &lat)| projection.geo_to_xy(lat, lon))
                    .unzip();
                Self {
                    x,
                    y,
                    kind: CoordinateKind::Projected,
                    ..self.clone()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::LocalProjection;
    use ndarray::array;

    #[test]
    fn test_axes_shape_mismatch() {
        let result = ElevationSurface::from_axes(
            vec![0.0, 1.0],
            vec![0.0],
            array![[1.0, 2.0, 3.0]],
            CoordinateKind::Projected,
        );
        assert!(matches!(result, Err(MeshError::Domain(_))));
    }

    #[test]
    fn test_raster_is_row_major() {
        let surface = ElevationSurface::from_axes(
            vec![0.0, 10.0],
            vec![5.0, 15.0],
            array![[1.0, 2.0], [3.0, 4.0]],
            CoordinateKind::Projected,
        )
        .unwrap();
        assert_eq!(surface.points()[1], [10.0, 5.0]);
        assert_eq!(surface.points()[2], [0.0, 15.0]);
        assert_eq!(surface.elevation()[2], 3.0);
    }

    #[test]
    fn test_clipping() {
        let surface = ElevationSurface::from_points(
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![100.0, 5000.0],
            CoordinateKind::Projected,
        )
        .unwrap()
        .clipped(1000.0);
        assert_eq!(surface.max_elevation(), 1000.0);
        assert_eq!(surface.min_elevation(), 100.0);
    }

    #[test]
    fn test_geodetic_projection() {
        let surface = ElevationSurface::from_points(
            vec![10.0],
            vec![60.0],
            vec![0.0],
            CoordinateKind::Geodetic,
        )
        .unwrap();
        let projected = surface.to_projected(&LocalProjection::new(60.0, 10.0));
        assert_eq!(projected.kind(), CoordinateKind::Projected);
        assert!(projected.x()[0].abs() < 1e-6);
        assert!(projected.y()[0].abs() < 1e-6);
    }
}
