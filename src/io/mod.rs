//! File formats and coordinate projections.
//!
//! This module provides:
//! - **Model files**: ModEM resistivity models (fixed-width text, LOGE,
//!   LOG10 or LINEAR resistivities)
//! - **ESRI ASCII grids**: elevation rasters with a six-line header
//! - **GeoTIFF rasters**: elevation rasters georeferenced by tags (requires
//!   the `geotiff` feature)
//! - **Coordinate projections**: geodetic to projected metres
//!
//! # Example
//!
//! ```no_run
//! use modem_mesh::interp::CoordinateKind;
//! use modem_mesh::io::{read_model_file, read_surface_ascii};
//!
//! let model = read_model_file("inversion/start.rho").unwrap();
//! println!("{}: {:?} cells", model.title, model.grid.shape());
//!
//! let dem = read_surface_ascii("topo/dem.asc", CoordinateKind::Geodetic).unwrap();
//! println!("{} elevation samples", dem.len());
//! ```

mod ascii_grid;
#[cfg(feature = "geotiff")]
mod geotiff;
mod model_file;
mod projection;

pub use ascii_grid::{parse_ascii_grid, read_ascii_grid, read_surface_ascii, AsciiGrid};
#[cfg(feature = "geotiff")]
pub use geotiff::{read_geotiff_surface, GeoTiffError, GeoTiffRaster};
pub use model_file::{
    format_model, parse_model, read_model_file, write_model_file, ModelFile, ModelFileInfo,
    ResScale,
};
pub use projection::{CoordinateProjection, LocalProjection, UtmProjection};
