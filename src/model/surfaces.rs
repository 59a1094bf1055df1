//! Named elevation surfaces aligned with the grid.

use std::collections::BTreeMap;

use ndarray::Array2;

use crate::error::{MeshError, Result};

/// Name of the surface that drives air layers and sea classification.
pub const TOPOGRAPHY: &str = "topography";

/// Elevation arrays `(north, east)` keyed by surface name.
///
/// Elevations are positive up. Every array matches the horizontal node
/// counts of the grid it was interpolated onto.
///
/// ```
/// use modem_mesh::model::SurfaceMap;
/// use ndarray::Array2;
///
/// let mut surfaces = SurfaceMap::new();
/// surfaces.insert("basement", Array2::from_elem((2, 2), -1500.0));
/// assert!(surfaces.contains("basement"));
/// assert!(surfaces.get("moho").is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceMap {
    surfaces: BTreeMap<String, Array2<f64>>,
}

impl SurfaceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a surface, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, elevation: Array2<f64>) -> Option<Array2<f64>> {
        self.surfaces.insert(name.into(), elevation)
    }

    /// Look up a surface; unknown names are a domain error.
    pub fn get(&self, name: &str) -> Result<&Array2<f64>> {
        self.surfaces
            .get(name)
            .ok_or_else(|| MeshError::domain(format!("unknown surface '{}'", name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.surfaces.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Array2<f64>> {
        self.surfaces.remove(name)
    }

    /// The topography surface, if one has been added.
    pub fn topography(&self) -> Option<&Array2<f64>> {
        self.surfaces.get(TOPOGRAPHY)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.surfaces.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_surface_is_domain_error() {
        let surfaces = SurfaceMap::new();
        assert!(matches!(surfaces.get(TOPOGRAPHY), Err(MeshError::Domain(_))));
        assert!(surfaces.topography().is_none());
    }

    #[test]
    fn test_insert_replaces() {
        let mut surfaces = SurfaceMap::new();
        assert!(surfaces
            .insert(TOPOGRAPHY, Array2::zeros((1, 1)))
            .is_none());
        assert!(surfaces
            .insert(TOPOGRAPHY, Array2::ones((1, 1)))
            .is_some());
        assert_eq!(surfaces.get(TOPOGRAPHY).unwrap()[[0, 0]], 1.0);
        assert_eq!(surfaces.names().collect::<Vec<_>>(), vec![TOPOGRAPHY]);
    }
}
