//! Resistivity models: a grid, its cell resistivities and named surfaces.
//!
//! A [`Model`] is produced by [`MeshBuilder::build`] or read from a model
//! file, and then carried through the topography stages:
//!
//! ```
//! use modem_mesh::interp::{CoordinateKind, ElevationSurface};
//! use modem_mesh::mesh::{MeshBuilder, MeshConfig, StationSet};
//! use ndarray::Array2;
//!
//! let stations = StationSet::from_relative(&[(-1000.0, 0.0), (1500.0, 500.0)]).unwrap();
//! let config = MeshConfig::default().with_air_layers(5);
//! let mut model = MeshBuilder::new(config).with_stations(stations).build().unwrap();
//!
//! // A hill rising towards the east
//! let x: Vec<f64> = (0..41).map(|i| -100_000.0 + 5_000.0 * i as f64).collect();
//! let y = x.clone();
//! let z = Array2::from_shape_fn((41, 41), |(_, c)| 200.0 + x[c] / 100.0);
//! let surface = ElevationSurface::from_axes(x, y, z, CoordinateKind::Projected).unwrap();
//!
//! let n_depth = model.grid.shape().2;
//! model.add_topography(&surface).unwrap();
//! assert_eq!(model.grid.shape().2, n_depth + 6);
//! assert!(model.grid.center.depth < 0.0);
//! ```
//!
//! [`MeshBuilder::build`]: crate::mesh::MeshBuilder::build

mod resistivity;
mod surfaces;
mod topography;

pub use resistivity::ResistivityVolume;
pub use surfaces::{SurfaceMap, TOPOGRAPHY};
pub use topography::{TopographyEmbedder, Where};

use std::path::Path;

use log::info;
use ndarray::Array2;
use serde_json::json;

use crate::error::{MeshError, Result};
use crate::interp::{station_buffer, ElevationInterpolator, ElevationSurface};
use crate::io::{self, CoordinateProjection, ModelFile};
use crate::mesh::{Grid, MeshConfig, StationSet};
use crate::types::Axis;

/// Grid, resistivities and surfaces of one model.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    pub grid: Grid,
    pub resistivity: ResistivityVolume,
    pub surfaces: SurfaceMap,
    pub stations: Option<StationSet>,
    pub config: MeshConfig,
}

impl Model {
    /// Model over `grid` filled with the configured starting resistivity.
    pub fn new(grid: Grid, config: MeshConfig) -> Self {
        let resistivity = ResistivityVolume::for_grid(&grid, config.res_starting_value);
        Self {
            grid,
            resistivity,
            surfaces: SurfaceMap::new(),
            stations: None,
            config,
        }
    }

    /// Attach the stations the model was built around.
    pub fn with_stations(mut self, stations: StationSet) -> Self {
        self.stations = Some(stations);
        self
    }

    /// Real-world position of the grid origin, `(0, 0)` when unknown.
    pub fn origin(&self) -> (f64, f64) {
        self.stations
            .as_ref()
            .and_then(StationSet::model_origin)
            .unwrap_or((0.0, 0.0))
    }

    /// Interpolate a projected surface onto the cell centres and store it
    /// under `name`.
    pub fn interpolate_surface(&mut self, name: &str, surface: &ElevationSurface) -> Result<()> {
        let elevation = ElevationInterpolator::from_config(&self.config).interpolate_to_grid(
            surface,
            &self.grid,
            self.origin(),
        )?;
        self.surfaces.insert(name, elevation);
        Ok(())
    }

    /// Project a geodetic surface, then store it under `name`.
    pub fn interpolate_geodetic_surface<P: CoordinateProjection>(
        &mut self,
        name: &str,
        surface: &ElevationSurface,
        projection: &P,
    ) -> Result<()> {
        self.interpolate_surface(name, &surface.to_projected(projection))
    }

    /// Set cells above or below surface `name` to `value` (Ohm·m).
    pub fn assign_resistivity_from_surface(
        &mut self,
        name: &str,
        value: f64,
        position: Where,
    ) -> Result<()> {
        self.resistivity = TopographyEmbedder::from_config(&self.config).assign_resistivity(
            &self.grid,
            &self.resistivity,
            &self.surfaces,
            name,
            value,
            position,
        )?;
        Ok(())
    }

    /// Drape a projected elevation surface onto the model.
    ///
    /// Interpolates the surface, adds air layers sized by the relief near
    /// the stations, then sets air and sea resistivities.
    pub fn add_topography(&mut self, surface: &ElevationSurface) -> Result<()> {
        let elevation = ElevationInterpolator::from_config(&self.config).interpolate_to_grid(
            surface,
            &self.grid,
            self.origin(),
        )?;
        self.add_topography_array(elevation)
    }

    /// Drape an elevation array already aligned with the cell centres.
    pub fn add_topography_array(&mut self, elevation: Array2<f64>) -> Result<()> {
        let (nn, ne, _) = self.grid.shape();
        if elevation.dim() != (nn, ne) {
            return Err(MeshError::domain(format!(
                "topography shape {:?} does not match grid ({}, {})",
                elevation.dim(),
                nn,
                ne
            )));
        }

        let core = self.core_mask();
        let embedder = TopographyEmbedder::from_config(&self.config);
        let (grid, resistivity) =
            embedder.add_air_layers(&self.grid, &self.resistivity, &elevation, &core)?;
        self.grid = grid;
        self.resistivity = resistivity;
        self.surfaces.insert(TOPOGRAPHY, elevation);

        self.resistivity = embedder.assign_resistivity(
            &self.grid,
            &self.resistivity,
            &self.surfaces,
            TOPOGRAPHY,
            self.config.air_resistivity,
            Where::Above,
        )?;

        info!(
            "topography added: {} depth cells, {} air cells, {} sea cells",
            self.grid.n_nodes(Axis::Depth),
            self.resistivity.count_equal(self.config.air_resistivity),
            self.resistivity.count_equal(self.config.sea_resistivity)
        );
        Ok(())
    }

    /// Cells within `5 · sqrt(cell_e² + cell_n²)` of a station; every cell
    /// when the stations are unknown.
    fn core_mask(&self) -> Array2<bool> {
        let (nn, ne, _) = self.grid.shape();
        match &self.stations {
            Some(stations) => {
                let buffer = 5.0
                    * (self.config.cell_size_east.powi(2) + self.config.cell_size_north.powi(2))
                        .sqrt();
                station_buffer(
                    &self.grid.centers(Axis::East),
                    &self.grid.centers(Axis::North),
                    stations,
                    buffer,
                )
            }
            None => Array2::from_elem((nn, ne), true),
        }
    }

    /// Write the grid and resistivities as a model file.
    pub fn write_model_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        io::write_model_file(
            path,
            &self.grid,
            &self.resistivity,
            &self.config.title,
            self.config.res_scale,
        )
    }

    /// Read a model file.
    ///
    /// The configuration is the default one with the title, scale, cell
    /// sizes and padding counts recovered from the file.
    pub fn read_model_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from(io::read_model_file(path)?))
    }

    /// Summary of the model parameters as JSON.
    pub fn parameters(&self) -> serde_json::Value {
        let (nn, ne, nz) = self.grid.shape();
        json!({
            "title": self.config.title,
            "shape": [nn, ne, nz],
            "cell_size_east": self.config.cell_size_east,
            "cell_size_north": self.config.cell_size_north,
            "pad_east": self.config.pad_east,
            "pad_north": self.config.pad_north,
            "pad_method": self.config.pad_method.to_string(),
            "z1_layer": self.config.z1_layer,
            "z_target_depth": self.config.z_target_depth,
            "z_bottom": self.config.z_bottom,
            "n_air_layers": self.config.n_air_layers,
            "res_scale": self.config.res_scale.label(),
            "grid_center": [self.grid.center.north, self.grid.center.east, self.grid.center.depth],
            "rotation_angle": self.grid.rotation_angle,
            "surfaces": self.surfaces.names().collect::<Vec<_>>(),
            "n_stations": self.stations.as_ref().map_or(0, StationSet::len),
        })
    }
}

impl From<ModelFile> for Model {
    fn from(file: ModelFile) -> Self {
        let mut config = MeshConfig::default()
            .with_title(file.title)
            .with_res_scale(file.res_scale);
        if let Some(cell) = file.info.cell_size_east {
            config.cell_size_east = cell;
        }
        if let Some(cell) = file.info.cell_size_north {
            config.cell_size_north = cell;
        }
        config.pad_east = file.info.pad_east;
        config.pad_north = file.info.pad_north;

        Self {
            grid: file.grid,
            resistivity: file.resistivity,
            surfaces: SurfaceMap::new(),
            stations: None,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshBuilder;

    fn built() -> Model {
        let stations =
            StationSet::from_relative(&[(-1000.0, -500.0), (0.0, 0.0), (1500.0, 500.0)]).unwrap();
        MeshBuilder::new(MeshConfig::default())
            .with_stations(stations)
            .build()
            .unwrap()
    }

    #[test]
    fn test_starting_resistivity() {
        let model = built();
        assert_eq!(model.resistivity.shape(), model.grid.shape());
        assert_eq!(model.resistivity.get(0, 0, 0), 100.0);
        assert_eq!(model.origin(), (0.0, 0.0));
    }

    #[test]
    fn test_topography_shape_mismatch() {
        let mut model = built();
        let err = model.add_topography_array(Array2::zeros((2, 2))).unwrap_err();
        assert!(matches!(err, MeshError::Domain(_)));
    }

    #[test]
    fn test_parameters_json() {
        let model = built();
        let params = model.parameters();
        assert_eq!(params["pad_method"], "extent1");
        assert_eq!(params["res_scale"], "LOGE");
        assert_eq!(params["n_stations"], 3);
    }
}
