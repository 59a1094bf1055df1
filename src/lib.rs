//! # modem-mesh
//!
//! Finite-difference meshes for 3D magnetotelluric inversion with ModEM.
//!
//! This crate provides the building blocks for a starting model:
//! - Horizontal grids around a station set (core cells and padding)
//! - Log-increasing depth layers with vertical padding
//! - Elevation surfaces interpolated onto cell centres
//! - Air layers and air/sea/subsurface resistivity from topography
//! - ModEM model files, ESRI ASCII and GeoTIFF elevation rasters
//!
//! # Example
//!
//! ```no_run
//! use modem_mesh::interp::CoordinateKind;
//! use modem_mesh::io::{read_surface_ascii, LocalProjection};
//! use modem_mesh::{MeshBuilder, MeshConfig, StationSet};
//!
//! let stations = StationSet::from_relative(&[(-4000.0, 1000.0), (2500.0, -1500.0)])?;
//! let config = MeshConfig::default()
//!     .with_cell_size(250.0, 250.0)
//!     .with_air_layers(10);
//! let mut model = MeshBuilder::new(config).with_stations(stations).build()?;
//!
//! let dem = read_surface_ascii("dem.asc", CoordinateKind::Geodetic)?;
//! let projected = dem.to_projected(&LocalProjection::new(-30.0, 138.5));
//! model.add_topography(&projected)?;
//! model.write_model_file("start.rho")?;
//! # Ok::<(), modem_mesh::MeshError>(())
//! ```

pub mod error;
pub mod interp;
pub mod io;
pub mod mesh;
pub mod model;
pub mod numeric;
pub mod padding;
pub mod types;
pub mod vertical;

pub use error::{MeshError, Result};
pub use interp::{ElevationInterpolator, ElevationSurface, InterpolationMethod};
pub use io::ResScale;
pub use mesh::{Grid, MeshBuilder, MeshConfig, StationSet};
pub use model::{Model, ResistivityVolume, Where};
pub use padding::PadMethod;
