//! Horizontal extents of station sets and grids.

use std::fmt;

use crate::numeric::round_hundreds;

/// Rectangular horizontal extent in grid coordinates (m).
///
/// Unlike a model domain, an extent may be degenerate: a single station
/// spans zero width in both directions.
///
/// # Example
///
/// ```
/// use modem_mesh::types::Extent2D;
///
/// let extent = Extent2D::from_points(&[(-1750.0, -1000.0), (2250.0, 1500.0)]).unwrap();
/// assert_eq!(extent.width(), 4000.0);
/// assert_eq!(extent.height(), 2500.0);
///
/// let padded = extent.expanded(1500.0, 1500.0).rounded_to_hundreds();
/// assert_eq!(padded.east_min, -3200.0);
/// assert_eq!(padded.east_max, 3800.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent2D {
    /// Western edge
    pub east_min: f64,
    /// Eastern edge
    pub east_max: f64,
    /// Southern edge
    pub north_min: f64,
    /// Northern edge
    pub north_max: f64,
}

impl Extent2D {
    /// Extent from explicit edges.
    pub fn new(east_min: f64, east_max: f64, north_min: f64, north_max: f64) -> Self {
        Self {
            east_min,
            east_max,
            north_min,
            north_max,
        }
    }

    /// Smallest extent holding every `(east, north)` point, `None` if empty.
    pub fn from_points(points: &[(f64, f64)]) -> Option<Self> {
        let (&(e0, n0), rest) = points.split_first()?;
        let mut extent = Self::new(e0, e0, n0, n0);
        for &(e, n) in rest {
            extent.east_min = extent.east_min.min(e);
            extent.east_max = extent.east_max.max(e);
            extent.north_min = extent.north_min.min(n);
            extent.north_max = extent.north_max.max(n);
        }
        Some(extent)
    }

    /// East-west size.
    #[inline]
    pub fn width(&self) -> f64 {
        self.east_max - self.east_min
    }

    /// North-south size.
    #[inline]
    pub fn height(&self) -> f64 {
        self.north_max - self.north_min
    }

    /// Centre point as (east, north).
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (
            (self.east_min + self.east_max) / 2.0,
            (self.north_min + self.north_max) / 2.0,
        )
    }

    /// Inclusive point test.
    #[inline]
    pub fn contains(&self, east: f64, north: f64) -> bool {
        east >= self.east_min
            && east <= self.east_max
            && north >= self.north_min
            && north <= self.north_max
    }

    /// Grow each side by a margin (east-west, north-south).
    pub fn expanded(&self, margin_east: f64, margin_north: f64) -> Self {
        Self::new(
            self.east_min - margin_east,
            self.east_max + margin_east,
            self.north_min - margin_north,
            self.north_max + margin_north,
        )
    }

    /// Every edge rounded to the nearest hundred metres (ties to even).
    pub fn rounded_to_hundreds(&self) -> Self {
        Self::new(
            round_hundreds(self.east_min),
            round_hundreds(self.east_max),
            round_hundreds(self.north_min),
            round_hundreds(self.north_max),
        )
    }
}

impl fmt::Display for Extent2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "east [{:.1}, {:.1}] m, north [{:.1}, {:.1}] m",
            self.east_min, self.east_max, self.north_min, self.north_max
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_point_is_degenerate() {
        let extent = Extent2D::from_points(&[(10.0, 20.0)]).unwrap();
        assert_eq!(extent.width(), 0.0);
        assert_eq!(extent.height(), 0.0);
        assert!(extent.contains(10.0, 20.0));
    }

    #[test]
    fn test_empty_points() {
        assert!(Extent2D::from_points(&[]).is_none());
    }

    #[test]
    fn test_rounding_ties_to_even() {
        let extent = Extent2D::new(-3250.0, 3750.0, -2250.0, 2750.0).rounded_to_hundreds();
        assert_eq!(extent.east_min, -3200.0);
        assert_eq!(extent.east_max, 3800.0);
        assert_eq!(extent.north_min, -2200.0);
        assert_eq!(extent.north_max, 2800.0);
    }
}
