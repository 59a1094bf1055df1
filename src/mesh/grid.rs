//! Rectilinear 3D grid.
//!
//! The grid is stored as three arrays of grid lines (cell boundaries). Node
//! widths are derived from the lines on demand, and setting node widths
//! regenerates the lines, so the two views can never disagree.
//!
//! Horizontal lines are centred on zero when built from nodes; depth lines
//! start at zero (the model top) and are positive down.
//!
//! # Example
//!
//! ```
//! use modem_mesh::mesh::{grid_from_nodes, nodes_from_grid, Grid, Origin};
//! use modem_mesh::types::Axis;
//!
//! let lines = grid_from_nodes(&[100.0, 200.0, 100.0], Origin::Centered);
//! assert_eq!(lines, vec![-200.0, -100.0, 100.0, 200.0]);
//! assert_eq!(nodes_from_grid(&lines), vec![100.0, 200.0, 100.0]);
//!
//! let grid = Grid::from_nodes(&[100.0; 4], &[50.0; 6], &[10.0, 20.0]).unwrap();
//! assert_eq!(grid.shape(), (4, 6, 2));
//! assert_eq!(grid.lines(Axis::Depth), &[0.0, 10.0, 30.0]);
//! ```

use std::fmt;

use crate::error::{MeshError, Result};
use crate::types::{Axis, Extent2D};

/// Where regenerated grid lines start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Lines run from `-sum/2` to `sum/2` (horizontal axes).
    Centered,
    /// Lines run from `0` to `sum` (depth axis).
    FromZero,
}

impl Origin {
    /// Default origin for an axis.
    pub fn for_axis(axis: Axis) -> Self {
        if axis.is_horizontal() {
            Origin::Centered
        } else {
            Origin::FromZero
        }
    }
}

/// Node widths between consecutive grid lines.
pub fn nodes_from_grid(lines: &[f64]) -> Vec<f64> {
    lines.windows(2).map(|w| (w[1] - w[0]).abs()).collect()
}

/// Grid lines from node widths.
///
/// Returns `nodes.len() + 1` lines. For [`Origin::Centered`] the last line is
/// set to exactly `sum/2`.
pub fn grid_from_nodes(nodes: &[f64], origin: Origin) -> Vec<f64> {
    let total: f64 = nodes.iter().sum();
    let start = match origin {
        Origin::Centered => -total / 2.0,
        Origin::FromZero => 0.0,
    };

    let mut lines = Vec::with_capacity(nodes.len() + 1);
    let mut acc = start;
    lines.push(acc);
    for &dz in nodes {
        acc += dz;
        lines.push(acc);
    }
    if origin == Origin::Centered {
        if let Some(last) = lines.last_mut() {
            *last = total / 2.0;
        }
    }
    lines
}

/// Cell centres (midpoints of consecutive grid lines).
pub fn cell_centers(lines: &[f64]) -> Vec<f64> {
    lines.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
}

fn check_lines(axis: Axis, lines: &[f64]) -> Result<()> {
    if lines.len() < 2 {
        return Err(MeshError::domain(format!(
            "{} axis needs at least 2 grid lines, got {}",
            axis,
            lines.len()
        )));
    }
    if lines.iter().any(|v| !v.is_finite()) {
        return Err(MeshError::domain(format!(
            "{} grid lines must be finite",
            axis
        )));
    }
    if let Some(i) = lines.windows(2).position(|w| w[1] <= w[0]) {
        return Err(MeshError::domain(format!(
            "{} grid lines must increase strictly (line {} = {}, line {} = {})",
            axis,
            i,
            lines[i],
            i + 1,
            lines[i + 1]
        )));
    }
    Ok(())
}

/// Anchor of the grid in the station frame (m).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GridCenter {
    pub north: f64,
    pub east: f64,
    pub depth: f64,
}

impl GridCenter {
    pub fn new(north: f64, east: f64, depth: f64) -> Self {
        Self { north, east, depth }
    }
}

/// Rectilinear 3D finite-difference grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    north: Vec<f64>,
    east: Vec<f64>,
    depth: Vec<f64>,
    /// Grid centre (south-west top corner of the core in ModEM's convention).
    pub center: GridCenter,
    /// Station frame rotation, degrees clockwise from north.
    pub rotation_angle: f64,
}

impl Grid {
    /// Grid from explicit grid lines.
    ///
    /// Each axis needs at least two strictly increasing, finite lines.
    pub fn from_lines(north: Vec<f64>, east: Vec<f64>, depth: Vec<f64>) -> Result<Self> {
        check_lines(Axis::North, &north)?;
        check_lines(Axis::East, &east)?;
        check_lines(Axis::Depth, &depth)?;
        Ok(Self {
            north,
            east,
            depth,
            center: GridCenter::default(),
            rotation_angle: 0.0,
        })
    }

    /// Grid from node widths: horizontal lines centred, depth from zero.
    pub fn from_nodes(north: &[f64], east: &[f64], depth: &[f64]) -> Result<Self> {
        Self::from_lines(
            grid_from_nodes(north, Origin::Centered),
            grid_from_nodes(east, Origin::Centered),
            grid_from_nodes(depth, Origin::FromZero),
        )
    }

    /// Grid lines along an axis.
    #[inline]
    pub fn lines(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::North => &self.north,
            Axis::East => &self.east,
            Axis::Depth => &self.depth,
        }
    }

    /// Node widths along an axis.
    pub fn nodes(&self, axis: Axis) -> Vec<f64> {
        nodes_from_grid(self.lines(axis))
    }

    /// Cell centres along an axis.
    pub fn centers(&self, axis: Axis) -> Vec<f64> {
        cell_centers(self.lines(axis))
    }

    /// Number of nodes (cells) along an axis.
    #[inline]
    pub fn n_nodes(&self, axis: Axis) -> usize {
        self.lines(axis).len() - 1
    }

    /// Node counts as (north, east, depth).
    #[inline]
    pub fn shape(&self) -> (usize, usize, usize) {
        (
            self.n_nodes(Axis::North),
            self.n_nodes(Axis::East),
            self.n_nodes(Axis::Depth),
        )
    }

    /// Total length of an axis.
    pub fn extent(&self, axis: Axis) -> f64 {
        let lines = self.lines(axis);
        lines[lines.len() - 1] - lines[0]
    }

    /// Horizontal extent of the grid lines.
    pub fn horizontal_extent(&self) -> Extent2D {
        Extent2D::new(
            self.east[0],
            self.east[self.east.len() - 1],
            self.north[0],
            self.north[self.north.len() - 1],
        )
    }

    /// Replace the lines of an axis.
    pub fn set_lines(&mut self, axis: Axis, lines: Vec<f64>) -> Result<()> {
        check_lines(axis, &lines)?;
        match axis {
            Axis::North => self.north = lines,
            Axis::East => self.east = lines,
            Axis::Depth => self.depth = lines,
        }
        Ok(())
    }

    /// Replace the nodes of an axis, regenerating its lines.
    ///
    /// Horizontal lines are re-centred on zero and depth lines restart at
    /// zero.
    pub fn set_nodes(&mut self, axis: Axis, nodes: &[f64]) -> Result<()> {
        self.set_lines(axis, grid_from_nodes(nodes, Origin::for_axis(axis)))
    }

    /// Shift every line of an axis by `delta`.
    pub fn shift(&mut self, axis: Axis, delta: f64) {
        let lines = match axis {
            Axis::North => &mut self.north,
            Axis::East => &mut self.east,
            Axis::Depth => &mut self.depth,
        };
        for line in lines.iter_mut() {
            *line += delta;
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (nn, ne, nz) = self.shape();
        writeln!(f, "Grid {} x {} x {} (north x east x depth)", nn, ne, nz)?;
        for axis in Axis::ALL {
            let lines = self.lines(axis);
            writeln!(
                f,
                "  {:<5} [{:>12.1}, {:>12.1}] m",
                axis.name(),
                lines[0],
                lines[lines.len() - 1]
            )?;
        }
        write!(
            f,
            "  centre ({:.1}, {:.1}, {:.1}), rotation {:.1} deg",
            self.center.north, self.center.east, self.center.depth, self.rotation_angle
        )
    }
}
