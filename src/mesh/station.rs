//! Survey stations.
//!
//! Stations are located in the grid frame by their relative (east, north)
//! coordinates. When absolute projected coordinates are known as well, the
//! set can recover where the grid frame sits in real-world metres.

use serde::{Deserialize, Serialize};

use crate::error::{MeshError, Result};
use crate::numeric::median;
use crate::types::Extent2D;

/// A single survey station.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    /// East offset in the grid frame (m).
    pub rel_east: f64,
    /// North offset in the grid frame (m).
    pub rel_north: f64,
    /// Absolute projected easting (m), if known.
    #[serde(default)]
    pub east: Option<f64>,
    /// Absolute projected northing (m), if known.
    #[serde(default)]
    pub north: Option<f64>,
}

impl Station {
    /// Station with grid-relative coordinates only.
    pub fn new(name: impl Into<String>, rel_east: f64, rel_north: f64) -> Self {
        Self {
            name: name.into(),
            rel_east,
            rel_north,
            east: None,
            north: None,
        }
    }

    /// Attach absolute projected coordinates.
    pub fn with_absolute(mut self, east: f64, north: f64) -> Self {
        self.east = Some(east);
        self.north = Some(north);
        self
    }
}

/// Ordered, non-empty set of stations.
///
/// ```
/// use modem_mesh::mesh::{Station, StationSet};
///
/// let stations = StationSet::new(vec![
///     Station::new("MT01", -1000.0, 0.0).with_absolute(501_000.0, 7_000_000.0),
///     Station::new("MT02", 1000.0, 0.0).with_absolute(503_000.0, 7_000_000.0),
/// ])
/// .unwrap();
///
/// assert_eq!(stations.len(), 2);
/// assert_eq!(stations.model_origin(), Some((502_000.0, 7_000_000.0)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct StationSet {
    stations: Vec<Station>,
}

impl StationSet {
    /// Build a station set. Empty sets and non-finite coordinates are
    /// rejected.
    pub fn new(stations: Vec<Station>) -> Result<Self> {
        if stations.is_empty() {
            return Err(MeshError::config("station set is empty"));
        }
        if let Some(s) = stations
            .iter()
            .find(|s| !(s.rel_east.is_finite() && s.rel_north.is_finite()))
        {
            return Err(MeshError::config(format!(
                "station '{}' has non-finite coordinates",
                s.name
            )));
        }
        Ok(Self { stations })
    }

    /// Stations from `(east, north)` pairs, named `S000`, `S001`, ...
    pub fn from_relative(points: &[(f64, f64)]) -> Result<Self> {
        Self::new(
            points
                .iter()
                .enumerate()
                .map(|(i, &(e, n))| Station::new(format!("S{:03}", i), e, n))
                .collect(),
        )
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    pub fn as_slice(&self) -> &[Station] {
        &self.stations
    }

    /// Relative east coordinates in station order.
    pub fn rel_east(&self) -> Vec<f64> {
        self.stations.iter().map(|s| s.rel_east).collect()
    }

    /// Relative north coordinates in station order.
    pub fn rel_north(&self) -> Vec<f64> {
        self.stations.iter().map(|s| s.rel_north).collect()
    }

    /// Bounding box of the relative coordinates.
    pub fn extent(&self) -> Extent2D {
        let points: Vec<(f64, f64)> = self
            .stations
            .iter()
            .map(|s| (s.rel_east, s.rel_north))
            .collect();
        // Non-empty by construction
        Extent2D::from_points(&points).unwrap_or(Extent2D::new(0.0, 0.0, 0.0, 0.0))
    }

    /// Real-world position of the grid-frame origin as (east, north).
    ///
    /// Median of absolute minus relative coordinates over stations that
    /// carry absolute coordinates; `None` when none do.
    pub fn model_origin(&self) -> Option<(f64, f64)> {
        let (de, dn): (Vec<f64>, Vec<f64>) = self
            .stations
            .iter()
            .filter_map(|s| match (s.east, s.north) {
                (Some(e), Some(n)) => Some((e - s.rel_east, n - s.rel_north)),
                _ => None,
            })
            .unzip();
        if de.is_empty() {
            None
        } else {
            Some((median(&de), median(&dn)))
        }
    }

    /// Copy with relative coordinates rotated by `angle` degrees clockwise
    /// from north.
    pub fn rotated(&self, angle: f64) -> Self {
        let (sin, cos) = angle.to_radians().sin_cos();
        let stations = self
            .stations
            .iter()
            .map(|s| Station {
                rel_east: cos * s.rel_east + sin * s.rel_north,
                rel_north: -sin * s.rel_east + cos * s.rel_north,
                ..s.clone()
            })
            .collect();
        Self { stations }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_empty_set_rejected() {
        assert!(matches!(
            StationSet::new(Vec::new()),
            Err(MeshError::Configuration(_))
        ));
        assert!(StationSet::from_relative(&[(f64::NAN, 0.0)]).is_err());
    }

    #[test]
    fn test_extent() {
        let set = StationSet::from_relative(&[(-1750.0, 500.0), (2250.0, -250.0)]).unwrap();
        let extent = set.extent();
        assert_eq!(extent.east_min, -1750.0);
        assert_eq!(extent.north_max, 500.0);
        assert_eq!(set.as_slice()[1].name, "S001");
    }

    #[test]
    fn test_model_origin_without_absolute() {
        let set = StationSet::from_relative(&[(0.0, 0.0)]).unwrap();
        assert_eq!(set.model_origin(), None);
    }

    #[test]
    fn test_rotation_quarter_turn() {
        let set = StationSet::from_relative(&[(0.0, 1000.0)]).unwrap();
        let rotated = set.rotated(90.0);
        let s = &rotated.as_slice()[0];
        assert!((s.rel_east - 1000.0).abs() < TOL);
        assert!(s.rel_north.abs() < TOL);
    }
}
