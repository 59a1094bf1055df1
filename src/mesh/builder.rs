//! Mesh construction from station locations.
//!
//! The builder lays a regular core of cells over the stations, pads it
//! outward with growing cells, and adds a log-increasing depth axis:
//!
//! 1. Station extents grow by `pad_num · 1.5` cells per side and are rounded
//!    to hundreds of metres.
//! 2. The core grid covers that box with whole cells, plus one extra cell on
//!    each side.
//! 3. Padding cells from the configured [`PadMethod`] are mirrored onto both
//!    sides of the core.
//! 4. Grid lines that fall within 2% of a cell width of a station are nudged
//!    away, so no station sits on a cell boundary.
//! 5. Depth nodes come from [`depth_nodes`].
//!
//! # Example
//!
//! ```
//! use modem_mesh::mesh::{MeshBuilder, MeshConfig, StationSet};
//!
//! let stations =
//!     StationSet::from_relative(&[(-1000.0, -500.0), (0.0, 0.0), (1500.0, 500.0)]).unwrap();
//! let model = MeshBuilder::new(MeshConfig::default())
//!     .with_stations(stations)
//!     .build()
//!     .unwrap();
//!
//! let (nn, ne, nz) = model.grid.shape();
//! assert_eq!(ne, 16 + 2 * 7);
//! assert_eq!(model.resistivity.shape(), (nn, ne, nz));
//! ```

use std::fmt;

use log::{debug, info};

use super::config::MeshConfig;
use super::grid::{grid_from_nodes, Grid, GridCenter, Origin};
use super::station::StationSet;
use crate::error::{MeshError, Result};
use crate::model::Model;
use crate::numeric::{arange, mean, round_decimals};
use crate::padding::{padding_cells, padding_cells_to_extent, padding_from_stretch, PadMethod};
use crate::types::{Axis, Extent2D};
use crate::vertical::depth_nodes;

/// Fraction of a cell width a grid line must keep from any station.
pub const COLLISION_FRACTION: f64 = 0.02;

/// Horizontal parameters of one axis.
#[derive(Clone, Copy, Debug)]
struct AxisLayout {
    axis: Axis,
    cell_size: f64,
    pad_cells: usize,
    extent: f64,
}

/// Builds a [`Model`] from a [`MeshConfig`] and a [`StationSet`].
#[derive(Clone, Debug)]
pub struct MeshBuilder {
    config: MeshConfig,
    stations: Option<StationSet>,
}

impl MeshBuilder {
    pub fn new(config: MeshConfig) -> Self {
        Self {
            config,
            stations: None,
        }
    }

    /// Set the stations the mesh is laid around.
    pub fn with_stations(mut self, stations: StationSet) -> Self {
        self.stations = Some(stations);
        self
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    /// Build the grid and a starting resistivity model.
    ///
    /// With a non-zero `mesh_rotation_angle` the stations are rotated into
    /// the mesh frame first; the grid itself stays axis aligned.
    pub fn build(&self) -> Result<Model> {
        self.config.validate()?;
        let stations = self
            .stations
            .as_ref()
            .ok_or_else(|| MeshError::config("no stations set on the mesh builder"))?;

        let stations = if self.config.mesh_rotation_angle != 0.0 {
            stations.rotated(self.config.mesh_rotation_angle)
        } else {
            stations.clone()
        };

        let config = &self.config;
        let east_coords = stations.rel_east();
        let north_coords = stations.rel_north();

        let allowance_east = config.pad_num as f64 * 1.5 * config.cell_size_east;
        let allowance_north = config.pad_num as f64 * 1.5 * config.cell_size_north;
        let bounds = stations
            .extent()
            .expanded(allowance_east, allowance_north)
            .rounded_to_hundreds();

        let east_layout = AxisLayout {
            axis: Axis::East,
            cell_size: config.cell_size_east,
            pad_cells: config.pad_east,
            extent: config.ew_ext,
        };
        let north_layout = AxisLayout {
            axis: Axis::North,
            cell_size: config.cell_size_north,
            pad_cells: config.pad_north,
            extent: config.ns_ext,
        };

        let mut east = horizontal_lines(bounds.east_min, bounds.east_max, &east_layout, config)?;
        let mut north =
            horizontal_lines(bounds.north_min, bounds.north_max, &north_layout, config)?;

        avoid_station_collisions(&mut east, &east_coords, config.cell_size_east);
        avoid_station_collisions(&mut north, &north_coords, config.cell_size_north);

        let depth = grid_from_nodes(&depth_nodes(config)?, Origin::FromZero);

        let center = GridCenter::new(
            round_decimals(min_value(&north) - mean(&north), -1),
            round_decimals(min_value(&east) - mean(&east), -1),
            0.0,
        );

        let mut grid = Grid::from_lines(north, east, depth).map_err(|e| {
            MeshError::config(format!("mesh parameters produce an invalid grid: {}", e))
        })?;
        grid.center = center;
        grid.rotation_angle = config.mesh_rotation_angle;

        let summary = MeshSummary::new(&grid, stations.len());
        info!("{}", summary);

        Ok(Model::new(grid, config.clone()).with_stations(stations))
    }
}

/// Core plus padding grid lines for one horizontal axis.
///
/// `lower`/`upper` are the rounded, expanded station edges.
fn horizontal_lines(
    lower: f64,
    upper: f64,
    layout: &AxisLayout,
    config: &MeshConfig,
) -> Result<Vec<f64>> {
    let cell = layout.cell_size;

    // Centre the whole cells between the rounded edges
    let add = ((upper - lower) % cell) / 2.0;
    let inner = arange(lower + add - cell, upper - add + 2.0 * cell, cell);
    let (inner_min, inner_max) = match (inner.first(), inner.last()) {
        (Some(&a), Some(&b)) => (a, b),
        _ => {
            return Err(MeshError::config(format!(
                "{} core grid is empty",
                layout.axis
            )))
        }
    };

    let padding = match config.pad_method {
        PadMethod::Extent1 => padding_cells(
            cell,
            layout.extent / 2.0 - upper,
            layout.pad_cells,
            config.pad_stretch_h,
        )?,
        PadMethod::Extent2 => {
            let offsets =
                padding_cells_to_extent(cell, inner_max, layout.extent / 2.0, layout.pad_cells)?;
            // The first log-spaced line rounds onto (or inside) the core edge
            let (kept, dropped): (Vec<f64>, Vec<f64>) =
                offsets.into_iter().partition(|&p| p > 0.0);
            if !dropped.is_empty() {
                debug!(
                    "{} axis: dropped {} extent2 padding lines at the core edge",
                    layout.axis,
                    dropped.len()
                );
            }
            kept
        }
        PadMethod::Stretch => {
            padding_from_stretch(cell, config.pad_stretch_h, layout.pad_cells)?
        }
    };

    debug!(
        "{} axis: {} core lines [{:.1}, {:.1}], {} padding cells per side ({})",
        layout.axis,
        inner.len(),
        inner_min,
        inner_max,
        padding.len(),
        config.pad_method
    );

    let mut lines = Vec::with_capacity(inner.len() + 2 * padding.len());
    lines.extend(padding.iter().rev().map(|p| inner_min - p));
    lines.extend_from_slice(&inner);
    lines.extend(padding.iter().map(|p| inner_max + p));
    Ok(lines)
}

/// Nudge grid lines away from station coordinates.
///
/// Stations are visited in ascending order. The first line closer than
/// `0.02 · cell_size` to a station moves by that distance away from it
/// (down when the station sits exactly on the line).
///
/// A nudge can land a line on a neighbouring station. Lines still in
/// conflict after the pass move past the whole cluster of nearby stations,
/// to whichever side is closer.
pub fn avoid_station_collisions(lines: &mut [f64], stations: &[f64], cell_size: f64) {
    let tolerance = COLLISION_FRACTION * cell_size;
    let mut sorted = stations.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    for &station in &sorted {
        if let Some(line) = lines.iter_mut().find(|g| (station - **g).abs() < tolerance) {
            if station - *line >= 0.0 {
                *line -= tolerance;
            } else {
                *line += tolerance;
            }
        }
    }

    for line in lines.iter_mut() {
        if !sorted.iter().any(|s| (s - *line).abs() < tolerance) {
            continue;
        }
        let below = clear_of_stations(*line, &sorted, tolerance, Direction::Down);
        let above = clear_of_stations(*line, &sorted, tolerance, Direction::Up);
        let moved = if *line - below <= above - *line { below } else { above };
        debug!("grid line {:.1} moved to {:.1} past a station cluster", line, moved);
        *line = moved;
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Down,
    Up,
}

/// Walk from `start` until no station is within `tolerance`.
fn clear_of_stations(start: f64, sorted: &[f64], tolerance: f64, direction: Direction) -> f64 {
    let mut position = start;
    for _ in 0..=sorted.len() {
        let mut near = sorted.iter().filter(|s| (**s - position).abs() < tolerance);
        let next = match direction {
            Direction::Down => near.next().map(|s| s - tolerance),
            Direction::Up => near.last().map(|s| s + tolerance),
        };
        match next {
            Some(p) if (p - position).abs() > 0.0 => position = p,
            _ => break,
        }
    }
    position
}

fn min_value(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Short description of a built mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshSummary {
    pub n_stations: usize,
    /// Grid line counts (north, east, depth).
    pub n_lines: (usize, usize, usize),
    pub horizontal: Extent2D,
    pub depth: f64,
    pub rotation_angle: f64,
}

impl MeshSummary {
    pub fn new(grid: &Grid, n_stations: usize) -> Self {
        Self {
            n_stations,
            n_lines: (
                grid.lines(Axis::North).len(),
                grid.lines(Axis::East).len(),
                grid.lines(Axis::Depth).len(),
            ),
            horizontal: grid.horizontal_extent(),
            depth: grid.extent(Axis::Depth),
            rotation_angle: grid.rotation_angle,
        }
    }
}

impl fmt::Display for MeshSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mesh for {} stations: {} north x {} east x {} depth lines, {}, depth {:.1} m, rotation {:.1} deg",
            self.n_stations,
            self.n_lines.0,
            self.n_lines.1,
            self.n_lines.2,
            self.horizontal,
            self.depth,
            self.rotation_angle
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_a() -> StationSet {
        StationSet::from_relative(&[(-1000.0, -500.0), (0.0, 0.0), (1500.0, 500.0)]).unwrap()
    }

    #[test]
    fn test_missing_stations_is_configuration_error() {
        let err = MeshBuilder::new(MeshConfig::default()).build().unwrap_err();
        assert!(matches!(err, MeshError::Configuration(_)));
    }

    #[test]
    fn test_core_east_lines() {
        let model = MeshBuilder::new(MeshConfig::default())
            .with_stations(scenario_a())
            .build()
            .unwrap();
        let east = model.grid.lines(Axis::East);

        // 7 padding lines, 17 core lines, 7 padding lines
        assert_eq!(east.len(), 31);
        assert_eq!(east[7], -3700.0);
        assert_eq!(east[23], 4300.0);
        for w in east[7..=23].windows(2) {
            assert_eq!(w[1] - w[0], 500.0);
        }
    }

    #[test]
    fn test_collision_nudge_direction() {
        let mut lines = vec![0.0, 100.0, 200.0];
        avoid_station_collisions(&mut lines, &[101.0, 199.0], 100.0);
        assert_eq!(lines, vec![0.0, 98.0, 202.0]);

        // Exact hit moves the line down
        let mut lines = vec![0.0, 100.0, 200.0];
        avoid_station_collisions(&mut lines, &[100.0], 100.0);
        assert_eq!(lines[1], 98.0);

        // Nothing nearby: untouched
        let mut lines = vec![0.0, 100.0];
        avoid_station_collisions(&mut lines, &[50.0], 100.0);
        assert_eq!(lines, vec![0.0, 100.0]);
    }

    #[test]
    fn test_collision_with_stations_straddling_a_line() {
        // 295 pushes the line to 310, 312 pushes it back to 300
        let mut lines = vec![-200.0, 300.0, 800.0];
        avoid_station_collisions(&mut lines, &[312.0, 295.0], 500.0);
        assert_eq!(lines, vec![-200.0, 285.0, 800.0]);

        // Clearing 99.5 downwards lands next to 97, so the line walks on
        let mut lines = vec![0.0, 100.0, 200.0];
        avoid_station_collisions(&mut lines, &[99.5, 103.0, 97.0], 100.0);
        assert!((lines[1] - 95.0).abs() < 1e-9, "line at {}", lines[1]);
    }

    #[test]
    fn test_grid_center_rounded_to_tens() {
        let model = MeshBuilder::new(MeshConfig::default())
            .with_stations(scenario_a())
            .build()
            .unwrap();
        let center = model.grid.center;
        assert_eq!(center.depth, 0.0);
        assert_eq!(center.east % 10.0, 0.0);
        assert!(center.east < 0.0);
        assert!(center.north < 0.0);
    }
}
