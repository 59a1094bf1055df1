//! Elevation surfaces and their interpolation onto grid cell centres.
//!
//! - [`ElevationSurface`]: raster or scattered elevation samples, geodetic
//!   or projected
//! - [`Triangulation`]: raster splitting and Delaunay triangulation with an
//!   R-tree for point location
//! - [`ElevationInterpolator`]: linear or nearest sampling with clipping and
//!   edge extension
//! - [`station_buffer`]: cells close to stations, the "core" of a survey

mod elevation;
mod surface;
mod triangulation;

pub use elevation::{extend_edges, station_buffer, ElevationInterpolator, InterpolationMethod};
pub use surface::{CoordinateKind, ElevationSurface};
pub use triangulation::Triangulation;
