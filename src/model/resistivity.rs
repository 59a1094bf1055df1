//! Cell resistivities.

use ndarray::{s, Array3, ArrayView3, ArrayViewMut3};

use crate::error::{MeshError, Result};
use crate::mesh::Grid;

/// Linear resistivity (Ohm·m) per cell, indexed `[north, east, depth]`.
///
/// ```
/// use modem_mesh::model::ResistivityVolume;
///
/// let mut volume = ResistivityVolume::filled((2, 3, 4), 100.0);
/// volume.set(1, 2, 3, 1e12);
/// assert_eq!(volume.shape(), (2, 3, 4));
/// assert_eq!(volume.get(1, 2, 3), 1e12);
/// assert_eq!(volume.get(0, 0, 0), 100.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ResistivityVolume {
    values: Array3<f64>,
}

impl ResistivityVolume {
    /// Volume with every cell set to `value`.
    pub fn filled(shape: (usize, usize, usize), value: f64) -> Self {
        Self {
            values: Array3::from_elem(shape, value),
        }
    }

    /// Wrap an existing array.
    pub fn from_array(values: Array3<f64>) -> Self {
        Self { values }
    }

    /// Starting volume matching a grid.
    pub fn for_grid(grid: &Grid, value: f64) -> Self {
        Self::filled(grid.shape(), value)
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize, usize) {
        self.values.dim()
    }

    #[inline]
    pub fn get(&self, north: usize, east: usize, depth: usize) -> f64 {
        self.values[[north, east, depth]]
    }

    #[inline]
    pub fn set(&mut self, north: usize, east: usize, depth: usize, value: f64) {
        self.values[[north, east, depth]] = value;
    }

    pub fn view(&self) -> ArrayView3<'_, f64> {
        self.values.view()
    }

    pub fn view_mut(&mut self) -> ArrayViewMut3<'_, f64> {
        self.values.view_mut()
    }

    pub fn into_array(self) -> Array3<f64> {
        self.values
    }

    /// Volume with `extra` new top layers set to `value` and this volume
    /// below them.
    pub fn with_layers_on_top(&self, extra: usize, value: f64) -> Self {
        let (nn, ne, nz) = self.shape();
        let mut values = Array3::from_elem((nn, ne, nz + extra), value);
        values.slice_mut(s![.., .., extra..]).assign(&self.values);
        Self { values }
    }

    /// Error unless the shape equals the grid's node counts.
    pub fn check_matches(&self, grid: &Grid) -> Result<()> {
        if self.shape() != grid.shape() {
            return Err(MeshError::domain(format!(
                "resistivity volume shape {:?} does not match grid shape {:?}",
                self.shape(),
                grid.shape()
            )));
        }
        Ok(())
    }

    /// Number of cells holding exactly `value`.
    pub fn count_equal(&self, value: f64) -> usize {
        self.values.iter().filter(|&&v| v == value).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layers_on_top_keep_old_values_below() {
        let mut volume = ResistivityVolume::filled((2, 2, 3), 100.0);
        volume.set(0, 1, 0, 5.0);

        let grown = volume.with_layers_on_top(2, 1e12);
        assert_eq!(grown.shape(), (2, 2, 5));
        assert_eq!(grown.get(0, 0, 0), 1e12);
        assert_eq!(grown.get(0, 0, 1), 1e12);
        assert_eq!(grown.get(0, 1, 2), 5.0);
        assert_eq!(grown.get(1, 1, 4), 100.0);
        assert_eq!(grown.count_equal(1e12), 8);
    }

    #[test]
    fn test_shape_check() {
        let grid = Grid::from_nodes(&[1.0; 2], &[1.0; 3], &[1.0; 4]).unwrap();
        assert!(ResistivityVolume::for_grid(&grid, 1.0)
            .check_matches(&grid)
            .is_ok());
        assert!(matches!(
            ResistivityVolume::filled((2, 3, 5), 1.0).check_matches(&grid),
            Err(MeshError::Domain(_))
        ));
    }
}
