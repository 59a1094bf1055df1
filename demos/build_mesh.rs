//! Build a ModEM starting model with topography.
//!
//! Lays a mesh over a small synthetic survey, drapes an elevation surface
//! onto it and writes the model file.
//!
//! ## Run
//!
//! ```bash
//! cargo run --example build_mesh
//! cargo run --example build_mesh -- mesh.json data/dem.asc
//! ```
//!
//! The optional JSON file overrides any [`MeshConfig`] field. The optional
//! DEM is an ESRI ASCII grid in degrees, projected around its centre.
//! Without one a synthetic ridge is used.

use std::env;
use std::fs;
use std::path::Path;

use log::info;
use ndarray::Array2;

use modem_mesh::interp::{CoordinateKind, ElevationSurface};
use modem_mesh::io::{read_ascii_grid, LocalProjection};
use modem_mesh::mesh::{MeshBuilder, MeshConfig, StationSet};
use modem_mesh::types::Axis;

fn init_logging() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
}

/// Two crossing profiles, 1 km station spacing.
fn synthetic_survey() -> modem_mesh::Result<StationSet> {
    let mut points: Vec<(f64, f64)> = (-6..=6).map(|i| (1_000.0 * i as f64, 0.0)).collect();
    points.extend((-4..=4).filter(|&i| i != 0).map(|i| (0.0, 1_000.0 * i as f64)));
    StationSet::from_relative(&points)
}

/// A ridge striking north-east, sea to the south-east.
fn synthetic_ridge() -> modem_mesh::Result<ElevationSurface> {
    let x: Vec<f64> = (0..81).map(|i| -120_000.0 + 3_000.0 * i as f64).collect();
    let y = x.clone();
    let z = Array2::from_shape_fn((81, 81), |(r, c)| {
        let along = (x[c] - y[r]) / std::f64::consts::SQRT_2;
        600.0 * (-(along / 8_000.0).powi(2)).exp() - along / 100.0
    });
    ElevationSurface::from_axes(x, y, z, CoordinateKind::Projected)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let args: Vec<String> = env::args().skip(1).collect();

    let config = match args.first() {
        Some(path) => MeshConfig::from_json_file(path)?,
        None => MeshConfig::default()
            .with_cell_size(250.0, 250.0)
            .with_air_layers(10)
            .with_title("synthetic ridge survey"),
    };

    let mut model = MeshBuilder::new(config)
        .with_stations(synthetic_survey()?)
        .build()?;

    let surface = match args.get(1) {
        Some(path) => {
            let grid = read_ascii_grid(path)?;
            let (x, y) = (grid.x(), grid.y());
            let projection = LocalProjection::new(
                (y[0] + y[y.len() - 1]) / 2.0,
                (x[0] + x[x.len() - 1]) / 2.0,
            );
            grid.into_surface(CoordinateKind::Geodetic)?
                .to_projected(&projection)
        }
        None => synthetic_ridge()?,
    };
    info!(
        "elevation surface: {} samples, {:.0} to {:.0} m",
        surface.len(),
        surface.min_elevation(),
        surface.max_elevation()
    );

    model.add_topography(&surface)?;

    let out_dir = Path::new("output");
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join("ModEM_Model_File.rho");
    model.write_model_file(&path)?;

    println!("{}", serde_json::to_string_pretty(&model.parameters())?);
    println!(
        "model top at {:.1} m, {} depth cells, written to {}",
        model.grid.lines(Axis::Depth)[0],
        model.grid.n_nodes(Axis::Depth),
        path.display()
    );
    Ok(())
}
