//! Mesh construction.
//!
//! Provides the rectilinear grid of a ModEM model and its construction
//! from station locations:
//! - [`MeshConfig`]: cell sizes, padding, vertical layering and defaults
//! - [`StationSet`]: station positions relative to the model centre
//! - [`Grid`]: grid lines and node widths for north, east and depth
//! - [`MeshBuilder`]: core grid, padding, station collision avoidance and
//!   depth layering

mod builder;
mod config;
mod grid;
mod station;

pub use builder::{avoid_station_collisions, MeshBuilder, MeshSummary, COLLISION_FRACTION};
pub use config::{MeshConfig, AIR_RESISTIVITY, SEA_RESISTIVITY};
pub use grid::{cell_centers, grid_from_nodes, nodes_from_grid, Grid, GridCenter, Origin};
pub use station::{Station, StationSet};
