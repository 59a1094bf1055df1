//! Draping topography and surfaces onto the resistivity volume.
//!
//! Two operations:
//!
//! - **Air layers.** The depth axis starts at sea level. To hold topography
//!   above it, log-increasing layers spanning the relief of the survey core
//!   are stacked on top and the depth axis is shifted up to the highest core
//!   elevation.
//! - **Surface assignment.** Cells above or below a named elevation surface
//!   get a fixed resistivity. Assigning above the topography turns cells into
//!   air and the water column between bathymetry and sea level into sea.
//!
//! Both return new snapshots; the inputs are never modified.

use std::fmt;

use log::{debug, warn};
use ndarray::Array2;

use super::resistivity::ResistivityVolume;
use super::surfaces::{SurfaceMap, TOPOGRAPHY};
use crate::error::{MeshError, Result};
use crate::mesh::{Grid, MeshConfig};
use crate::numeric::{cumsum_with_zero, round_decimals};
use crate::types::Axis;
use crate::vertical::LogLayering;

/// Shrink factor for air layer widths.
const AIR_INCREMENT_FACTOR: f64 = 0.999;

/// Side of a surface a resistivity assignment applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Where {
    /// Between the upper bound and the surface.
    Above,
    /// Strictly below the surface.
    Below,
}

impl fmt::Display for Where {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Where::Above => "above",
            Where::Below => "below",
        })
    }
}

/// Air layer and surface assignment settings.
#[derive(Clone, Debug, PartialEq)]
pub struct TopographyEmbedder {
    pub n_air_layers: usize,
    pub z1_layer: f64,
    pub res_starting_value: f64,
    pub sea_resistivity: f64,
}

impl TopographyEmbedder {
    pub fn from_config(config: &MeshConfig) -> Self {
        Self {
            n_air_layers: config.n_air_layers,
            z1_layer: config.z1_layer,
            res_starting_value: config.res_starting_value,
            sea_resistivity: config.sea_resistivity,
        }
    }

    /// Stack air layers above the grid.
    ///
    /// `topography` is `(north, east)` elevation and `core` marks the cells
    /// whose elevation sets the relief (typically the station buffer). New
    /// cells are filled with the starting resistivity; the old volume moves
    /// down below them.
    ///
    /// With zero air layers the inputs are returned unchanged.
    pub fn add_air_layers(
        &self,
        grid: &Grid,
        volume: &ResistivityVolume,
        topography: &Array2<f64>,
        core: &Array2<bool>,
    ) -> Result<(Grid, ResistivityVolume)> {
        volume.check_matches(grid)?;
        let (nn, ne, _) = grid.shape();
        check_surface_shape("topography", topography, (nn, ne))?;
        if core.dim() != (nn, ne) {
            return Err(MeshError::domain(format!(
                "core mask shape {:?} does not match grid ({}, {})",
                core.dim(),
                nn,
                ne
            )));
        }

        if self.n_air_layers == 0 {
            warn!("no air layers requested; topography is not added to the depth axis");
            return Ok((grid.clone(), volume.clone()));
        }

        let core_elevation: Vec<f64> = topography
            .iter()
            .zip(core.iter())
            .filter(|(_, &in_core)| in_core)
            .map(|(&z, _)| z)
            .collect();
        if core_elevation.is_empty() {
            return Err(MeshError::domain("no topography cells inside the station core"));
        }
        let core_max = core_elevation.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let core_min = core_elevation.iter().copied().fold(f64::INFINITY, f64::min);
        let relief = core_max - core_min;

        let offsets = self.air_offsets(relief, core_max)?;
        let (shift, top) = match offsets.split_last() {
            Some((&last, top)) => (last, top),
            None => return Err(MeshError::domain("air layering produced no offsets")),
        };

        let mut depth: Vec<f64> = top.to_vec();
        depth.extend(grid.lines(Axis::Depth).iter().map(|z| z + shift));

        let mut new_grid = grid.clone();
        new_grid.set_lines(Axis::Depth, depth)?;
        new_grid.center.depth = new_grid.lines(Axis::Depth)[0];

        let added = top.len();
        let new_volume = volume.with_layers_on_top(added, self.res_starting_value);

        debug!(
            "added {} air layers over {:.1} m of core relief, model top at {:.1} m",
            added,
            relief,
            new_grid.center.depth
        );
        Ok((new_grid, new_volume))
    }

    /// Rounded depth offsets of the air layer lines, top first.
    ///
    /// The last offset is the shift applied to the existing depth axis. When
    /// the relief is too small for `n_air_layers` whole-metre layers, fewer
    /// layers are used. Without usable relief no layers are added and only
    /// the depth axis moves up to the highest core elevation.
    fn air_offsets(&self, relief: f64, core_max: f64) -> Result<Vec<f64>> {
        let mut n_layers = self.n_air_layers;
        let mut offsets = vec![round_decimals(-core_max, 0)];

        while relief >= 1.0 {
            let layers = LogLayering::new(self.z1_layer, relief, n_layers + 1)
                .with_increment_factor(AIR_INCREMENT_FACTOR)
                .compute()?;
            let mut widths = layers.widths;
            widths.reverse();

            let candidate: Vec<f64> = cumsum_with_zero(&widths)
                .into_iter()
                .map(|o| round_decimals(o - core_max, 0))
                .collect();
            if candidate.windows(2).all(|w| w[1] > w[0]) {
                offsets = candidate;
                break;
            }
            if n_layers == 0 {
                break;
            }
            n_layers -= 1;
        }

        let added = offsets.len() - 1;
        if added < self.n_air_layers + 1 {
            warn!(
                "{:.1} m of core relief fits {} of {} requested air layers",
                relief,
                added.saturating_sub(1),
                self.n_air_layers
            );
        }
        Ok(offsets)
    }

    /// Set cells above or below surface `name` to `value`.
    ///
    /// Depths are compared at cell centres with `surface = -elevation`. For
    /// [`Where::Above`] the cells lie between an upper bound and the surface:
    /// the topography when another surface is assigned, one metre above the
    /// highest point when the topography itself is assigned, and the model
    /// top otherwise. Assigning the topography also fills the water column
    /// between sea level and the sea floor with sea resistivity.
    pub fn assign_resistivity(
        &self,
        grid: &Grid,
        volume: &ResistivityVolume,
        surfaces: &SurfaceMap,
        name: &str,
        value: f64,
        position: Where,
    ) -> Result<ResistivityVolume> {
        volume.check_matches(grid)?;
        let (nn, ne, _) = grid.shape();
        let elevation = surfaces.get(name)?;
        check_surface_shape(name, elevation, (nn, ne))?;

        let is_topography = name == TOPOGRAPHY;
        let topography = surfaces.topography();
        if let Some(t) = topography {
            check_surface_shape(TOPOGRAPHY, t, (nn, ne))?;
        }

        let centers = grid.centers(Axis::Depth);
        let model_top = grid.lines(Axis::Depth)[0];
        let highest = if is_topography {
            elevation
                .iter()
                .map(|&z| -z)
                .fold(f64::INFINITY, f64::min)
                - 1.0
        } else {
            model_top
        };

        let mut out = volume.clone();
        let mut assigned = 0usize;
        let mut sea = 0usize;
        for i in 0..nn {
            for j in 0..ne {
                let surface = -elevation[[i, j]];
                let top = match (is_topography, topography) {
                    (true, _) => highest,
                    (false, Some(t)) => -t[[i, j]],
                    (false, None) => model_top,
                };
                for (k, &cz) in centers.iter().enumerate() {
                    let hit = match position {
                        Where::Above => cz <= surface && cz > top,
                        Where::Below => cz > surface,
                    };
                    if hit {
                        out.set(i, j, k, value);
                        assigned += 1;
                    }
                    if is_topography && cz <= surface && cz > 0.0 {
                        out.set(i, j, k, self.sea_resistivity);
                        sea += 1;
                    }
                }
            }
        }

        debug!(
            "surface '{}': {} cells {} set to {}, {} sea cells",
            name, assigned, position, value, sea
        );
        Ok(out)
    }
}

fn check_surface_shape(name: &str, surface: &Array2<f64>, expected: (usize, usize)) -> Result<()> {
    if surface.dim() != expected {
        return Err(MeshError::domain(format!(
            "surface '{}' has shape {:?}, grid needs {:?}",
            name,
            surface.dim(),
            expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_grid() -> Grid {
        Grid::from_nodes(&[100.0; 3], &[100.0; 4], &[10.0, 10.0, 20.0, 40.0, 80.0]).unwrap()
    }

    fn embedder(n_air: usize) -> TopographyEmbedder {
        TopographyEmbedder {
            n_air_layers: n_air,
            z1_layer: 10.0,
            res_starting_value: 100.0,
            sea_resistivity: 0.3,
        }
    }

    #[test]
    fn test_flat_topography_above_leaves_volume_unchanged() {
        let grid = small_grid();
        let volume = ResistivityVolume::for_grid(&grid, 100.0);
        let mut surfaces = SurfaceMap::new();
        surfaces.insert(TOPOGRAPHY, Array2::zeros((3, 4)));

        let out = embedder(0)
            .assign_resistivity(&grid, &volume, &surfaces, TOPOGRAPHY, 1e12, Where::Above)
            .unwrap();
        assert_eq!(out, volume);
    }

    #[test]
    fn test_bathymetry_becomes_sea() {
        let grid = small_grid();
        let volume = ResistivityVolume::for_grid(&grid, 100.0);
        let mut surfaces = SurfaceMap::new();
        // 25 m of water everywhere
        surfaces.insert(TOPOGRAPHY, Array2::from_elem((3, 4), -25.0));

        let out = embedder(0)
            .assign_resistivity(&grid, &volume, &surfaces, TOPOGRAPHY, 1e12, Where::Above)
            .unwrap();
        // Centres at 5 and 15 m are water, 30 m is rock
        assert_eq!(out.get(0, 0, 0), 0.3);
        assert_eq!(out.get(2, 3, 1), 0.3);
        assert_eq!(out.get(1, 1, 2), 100.0);
        assert_eq!(out.count_equal(1e12), 0);
    }

    #[test]
    fn test_assign_below_named_surface() {
        let grid = small_grid();
        let volume = ResistivityVolume::for_grid(&grid, 100.0);
        let mut surfaces = SurfaceMap::new();
        surfaces.insert("basement", Array2::from_elem((3, 4), -50.0));

        let out = embedder(0)
            .assign_resistivity(&grid, &volume, &surfaces, "basement", 1000.0, Where::Below)
            .unwrap();
        // Centres: 5, 15, 30, 60, 120
        assert_eq!(out.get(0, 0, 2), 100.0);
        assert_eq!(out.get(0, 0, 3), 1000.0);
        assert_eq!(out.get(2, 3, 4), 1000.0);
        assert_eq!(out.count_equal(1000.0), 3 * 4 * 2);
    }

    #[test]
    fn test_assign_above_named_surface_without_topography() {
        let grid = small_grid();
        let volume = ResistivityVolume::for_grid(&grid, 100.0);
        let mut surfaces = SurfaceMap::new();
        surfaces.insert("sediment_base", Array2::from_elem((3, 4), -20.0));

        let out = embedder(0)
            .assign_resistivity(&grid, &volume, &surfaces, "sediment_base", 10.0, Where::Above)
            .unwrap();
        assert_eq!(out.count_equal(10.0), 3 * 4 * 2);
    }

    #[test]
    fn test_unknown_surface_and_shape_mismatch() {
        let grid = small_grid();
        let volume = ResistivityVolume::for_grid(&grid, 100.0);
        let mut surfaces = SurfaceMap::new();
        let e = embedder(0);

        assert!(matches!(
            e.assign_resistivity(&grid, &volume, &surfaces, "moho", 1.0, Where::Below),
            Err(MeshError::Domain(_))
        ));

        surfaces.insert("moho", Array2::zeros((2, 2)));
        assert!(matches!(
            e.assign_resistivity(&grid, &volume, &surfaces, "moho", 1.0, Where::Below),
            Err(MeshError::Domain(_))
        ));
    }

    #[test]
    fn test_air_layers_shift_depth_axis() {
        let grid = small_grid();
        let volume = ResistivityVolume::for_grid(&grid, 100.0);
        let mut topography = Array2::from_elem((3, 4), 100.0);
        topography[[1, 1]] = 400.0;
        let core = Array2::from_elem((3, 4), true);

        let (new_grid, new_volume) = embedder(3)
            .add_air_layers(&grid, &volume, &topography, &core)
            .unwrap();

        // n_air + 1 new cells on top of the 5 existing ones
        let depth = new_grid.lines(Axis::Depth);
        assert_eq!(depth.len(), 6 + 4);
        assert_eq!(depth[0], -400.0);
        assert_eq!(new_grid.center.depth, -400.0);
        assert!(depth.windows(2).all(|w| w[1] > w[0]));
        // Old lines keep their spacing
        let n = depth.len();
        assert!((depth[n - 1] - depth[n - 2] - 80.0).abs() < 1e-9);

        assert_eq!(new_volume.shape(), (3, 4, 5 + 4));
        assert_eq!(new_volume.get(0, 0, 0), 100.0);
    }

    #[test]
    fn test_air_layers_reduced_for_small_relief() {
        let grid = small_grid();
        let volume = ResistivityVolume::for_grid(&grid, 100.0);
        let mut topography = Array2::from_elem((3, 4), 100.0);
        topography[[0, 2]] = 120.0;
        let core = Array2::from_elem((3, 4), true);

        let (new_grid, new_volume) = embedder(5)
            .add_air_layers(&grid, &volume, &topography, &core)
            .unwrap();

        let depth = new_grid.lines(Axis::Depth);
        assert_eq!(depth[0], -120.0);
        assert!(depth.windows(2).all(|w| w[1] > w[0]));
        let added = depth.len() - grid.lines(Axis::Depth).len();
        assert!(added >= 1 && added < 6, "{} air cells", added);
        assert_eq!(new_volume.shape(), (3, 4, 5 + added));
    }

    #[test]
    fn test_air_layers_without_relief() {
        let grid = small_grid();
        let volume = ResistivityVolume::for_grid(&grid, 100.0);
        let flat = Array2::from_elem((3, 4), 100.0);
        let core = Array2::from_elem((3, 4), true);
        // No relief: no air cells, the axis moves up to the surface
        let (g, v) = embedder(3)
            .add_air_layers(&grid, &volume, &flat, &core)
            .unwrap();
        assert_eq!(g.lines(Axis::Depth)[0], -100.0);
        assert_eq!(g.center.depth, -100.0);
        assert_eq!(g.nodes(Axis::Depth), grid.nodes(Axis::Depth));
        assert_eq!(v, volume);

        // Zero air layers is a no-op
        let (g, v) = embedder(0)
            .add_air_layers(&grid, &volume, &flat, &core)
            .unwrap();
        assert_eq!(g, grid);
        assert_eq!(v, volume);
    }
}
