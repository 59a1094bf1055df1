//! Mesh construction parameters.
//!
//! A single [`MeshConfig`] carries every option of the pipeline: horizontal
//! cells and padding, vertical layering, starting and fixed resistivities,
//! topography draping and the model file scale. Defaults give a 500 m core
//! with 100 km of padding and a 300 km deep model.
//!
//! Configurations can be built in code with `with_*` setters or loaded from
//! JSON; missing JSON keys fall back to the defaults.
//!
//! ```
//! use modem_mesh::mesh::MeshConfig;
//! use modem_mesh::padding::PadMethod;
//!
//! let config = MeshConfig::default()
//!     .with_cell_size(250.0, 250.0)
//!     .with_pad_method(PadMethod::Stretch)
//!     .with_air_layers(10);
//! assert!(config.validate().is_ok());
//!
//! let config = MeshConfig::from_json_str(r#"{ "n_layers": 40, "pad_method": "extent2" }"#).unwrap();
//! assert_eq!(config.n_layers, 40);
//! assert_eq!(config.pad_method, PadMethod::Extent2);
//! assert_eq!(config.cell_size_east, 500.0);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MeshError, Result};
use crate::interp::InterpolationMethod;
use crate::io::ResScale;
use crate::padding::PadMethod;

/// Air resistivity assigned above topography (Ohm·m).
pub const AIR_RESISTIVITY: f64 = 1e12;

/// Seawater resistivity assigned between bathymetry and sea level (Ohm·m).
pub const SEA_RESISTIVITY: f64 = 0.3;

/// Parameters for mesh construction and topography draping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Core cell width east-west (m).
    pub cell_size_east: f64,
    /// Core cell width north-south (m).
    pub cell_size_north: f64,
    /// Padding cells on each side, east-west.
    pub pad_east: usize,
    /// Padding cells on each side, north-south.
    pub pad_north: usize,
    /// Vertical padding values below the core layers.
    pub pad_z: usize,
    /// Core cells between the outermost station and the padding.
    pub pad_num: usize,
    /// Total east-west model extent (m).
    pub ew_ext: f64,
    /// Total north-south model extent (m).
    pub ns_ext: f64,
    /// Horizontal padding stretch factor.
    pub pad_stretch_h: f64,
    /// Vertical padding stretch factor.
    pub pad_stretch_v: f64,
    /// Horizontal padding strategy.
    pub pad_method: PadMethod,
    /// First layer thickness (m).
    pub z1_layer: f64,
    /// Depth the core layers should reach (m).
    pub z_target_depth: f64,
    /// Bottom of the model (m).
    pub z_bottom: f64,
    /// Total number of vertical layers requested, core plus padding.
    pub n_layers: usize,
    /// Station frame rotation (degrees clockwise from north).
    pub mesh_rotation_angle: f64,
    /// Starting resistivity of the subsurface (Ohm·m).
    pub res_starting_value: f64,
    /// Scale used when writing resistivity values.
    pub res_scale: ResScale,
    /// Model file title.
    pub title: String,
    /// Air layers inserted above the grid when topography is added.
    pub n_air_layers: usize,
    /// Resistivity assigned above topography (Ohm·m).
    pub air_resistivity: f64,
    /// Resistivity assigned between bathymetry and sea level (Ohm·m).
    pub sea_resistivity: f64,
    /// Elevation interpolation method.
    pub interp_method: InterpolationMethod,
    /// Elevations above this value are clipped before interpolation.
    pub elevation_max: Option<f64>,
    /// Edge rows/columns overwritten with the nearest interior values.
    pub elevation_pad: usize,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            cell_size_east: 500.0,
            cell_size_north: 500.0,
            pad_east: 7,
            pad_north: 7,
            pad_z: 4,
            pad_num: 3,
            ew_ext: 100_000.0,
            ns_ext: 100_000.0,
            pad_stretch_h: 1.2,
            pad_stretch_v: 1.2,
            pad_method: PadMethod::Extent1,
            z1_layer: 10.0,
            z_target_depth: 50_000.0,
            z_bottom: 300_000.0,
            n_layers: 30,
            mesh_rotation_angle: 0.0,
            res_starting_value: 100.0,
            res_scale: ResScale::LogE,
            title: "Model File written by modem-mesh".to_string(),
            n_air_layers: 0,
            air_resistivity: AIR_RESISTIVITY,
            sea_resistivity: SEA_RESISTIVITY,
            interp_method: InterpolationMethod::Nearest,
            elevation_max: None,
            elevation_pad: 0,
        }
    }
}

impl MeshConfig {
    /// Parse a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MeshConfig = serde_json::from_str(json)
            .map_err(|e| MeshError::config(format!("invalid mesh configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MeshError::config(format!("cannot serialize configuration: {}", e)))
    }

    // =========================================================================
    // Builder-style setters
    // =========================================================================

    /// Set core cell widths (east, north).
    pub fn with_cell_size(mut self, east: f64, north: f64) -> Self {
        self.cell_size_east = east;
        self.cell_size_north = north;
        self
    }

    /// Set horizontal padding cell counts (east, north).
    pub fn with_padding(mut self, pad_east: usize, pad_north: usize) -> Self {
        self.pad_east = pad_east;
        self.pad_north = pad_north;
        self
    }

    /// Set the number of core cells between stations and padding.
    pub fn with_pad_num(mut self, pad_num: usize) -> Self {
        self.pad_num = pad_num;
        self
    }

    /// Set total horizontal model extents (east-west, north-south).
    pub fn with_extent(mut self, ew_ext: f64, ns_ext: f64) -> Self {
        self.ew_ext = ew_ext;
        self.ns_ext = ns_ext;
        self
    }

    /// Set the horizontal padding strategy.
    pub fn with_pad_method(mut self, method: PadMethod) -> Self {
        self.pad_method = method;
        self
    }

    /// Set padding stretch factors (horizontal, vertical).
    pub fn with_pad_stretch(mut self, horizontal: f64, vertical: f64) -> Self {
        self.pad_stretch_h = horizontal;
        self.pad_stretch_v = vertical;
        self
    }

    /// Set the vertical layering.
    pub fn with_vertical(
        mut self,
        z1_layer: f64,
        z_target_depth: f64,
        z_bottom: f64,
        n_layers: usize,
        pad_z: usize,
    ) -> Self {
        self.z1_layer = z1_layer;
        self.z_target_depth = z_target_depth;
        self.z_bottom = z_bottom;
        self.n_layers = n_layers;
        self.pad_z = pad_z;
        self
    }

    /// Set the station frame rotation angle (degrees).
    pub fn with_rotation(mut self, angle: f64) -> Self {
        self.mesh_rotation_angle = angle;
        self
    }

    /// Set the starting resistivity (Ohm·m).
    pub fn with_starting_resistivity(mut self, value: f64) -> Self {
        self.res_starting_value = value;
        self
    }

    /// Set the model file scale.
    pub fn with_res_scale(mut self, scale: ResScale) -> Self {
        self.res_scale = scale;
        self
    }

    /// Set the model file title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the number of air layers added with topography.
    pub fn with_air_layers(mut self, n_air_layers: usize) -> Self {
        self.n_air_layers = n_air_layers;
        self
    }

    /// Set the elevation interpolation method.
    pub fn with_interp_method(mut self, method: InterpolationMethod) -> Self {
        self.interp_method = method;
        self
    }

    /// Clip elevations above `max` before interpolation.
    pub fn with_elevation_max(mut self, max: f64) -> Self {
        self.elevation_max = Some(max);
        self
    }

    /// Set the number of edge rows/columns copied from the interior.
    pub fn with_elevation_pad(mut self, pad: usize) -> Self {
        self.elevation_pad = pad;
        self
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("cell_size_east", self.cell_size_east),
            ("cell_size_north", self.cell_size_north),
            ("ew_ext", self.ew_ext),
            ("ns_ext", self.ns_ext),
            ("pad_stretch_h", self.pad_stretch_h),
            ("pad_stretch_v", self.pad_stretch_v),
            ("z1_layer", self.z1_layer),
            ("z_target_depth", self.z_target_depth),
            ("z_bottom", self.z_bottom),
            ("res_starting_value", self.res_starting_value),
            ("air_resistivity", self.air_resistivity),
            ("sea_resistivity", self.sea_resistivity),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(MeshError::config(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        if !self.mesh_rotation_angle.is_finite() {
            return Err(MeshError::config("mesh_rotation_angle must be finite"));
        }
        if self.pad_z < 2 {
            return Err(MeshError::config(format!(
                "pad_z must be at least 2, got {}",
                self.pad_z
            )));
        }
        if self.n_layers <= self.pad_z {
            return Err(MeshError::config(format!(
                "n_layers ({}) must exceed pad_z ({})",
                self.n_layers, self.pad_z
            )));
        }
        if self.z_target_depth <= self.z1_layer {
            return Err(MeshError::config(format!(
                "z_target_depth ({}) must exceed z1_layer ({})",
                self.z_target_depth, self.z1_layer
            )));
        }
        if self.z_bottom <= self.z_target_depth {
            return Err(MeshError::config(format!(
                "z_bottom ({}) must exceed z_target_depth ({})",
                self.z_bottom, self.z_target_depth
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = MeshConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cell_size_east, 500.0);
        assert_eq!(config.pad_z, 4);
        assert_eq!(config.n_layers, 30);
        assert_eq!(config.res_scale, ResScale::LogE);
        assert_eq!(config.air_resistivity, 1e12);
    }

    #[test]
    fn test_validate_rejects_bad_layering() {
        let config = MeshConfig::default().with_vertical(10.0, 50_000.0, 300_000.0, 4, 4);
        assert!(matches!(config.validate(), Err(MeshError::Configuration(_))));

        let config = MeshConfig::default().with_cell_size(0.0, 500.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_pad_method_in_json() {
        let err = MeshConfig::from_json_str(r#"{ "pad_method": "extent9" }"#).unwrap_err();
        assert!(matches!(err, MeshError::Configuration(_)));
    }

    #[test]
    fn test_json_file_round_trip() {
        let config = MeshConfig::default()
            .with_cell_size(200.0, 300.0)
            .with_elevation_max(4_000.0)
            .with_res_scale(ResScale::Log10);

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(config.to_json_string().unwrap().as_bytes())
            .unwrap();
        file.flush().unwrap();

        let loaded = MeshConfig::from_json_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }
}
