//! GeoTIFF elevation rasters.
//!
//! The georeference comes from the ModelPixelScale (33550) and
//! ModelTiepoint (33922) tags. A GDAL_NODATA (42113) tag, when present,
//! marks cells that are filled with the lowest valid elevation.
//!
//! ```ignore
//! use modem_mesh::interp::CoordinateKind;
//! use modem_mesh::io::read_geotiff_surface;
//!
//! let dem = read_geotiff_surface("data/dem.tif", CoordinateKind::Geodetic)?;
//! println!("{} samples, max {} m", dem.len(), dem.max_elevation());
//! ```

use std::fs::File;
use std::path::Path;

use log::debug;
use ndarray::Array2;
use thiserror::Error;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use crate::error::MeshError;
use crate::interp::{CoordinateKind, ElevationSurface};
use crate::types::Extent2D;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GDAL_NODATA: u16 = 42113;

/// Error type for GeoTIFF operations.
#[derive(Debug, Error)]
pub enum GeoTiffError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TIFF error: {0}")]
    Tiff(String),

    /// Missing or invalid georeference tags
    #[error("Missing geotransform: {0}")]
    MissingGeotransform(String),

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),
}

impl From<tiff::TiffError> for GeoTiffError {
    fn from(e: tiff::TiffError) -> Self {
        GeoTiffError::Tiff(e.to_string())
    }
}

impl From<GeoTiffError> for MeshError {
    fn from(e: GeoTiffError) -> Self {
        match e {
            GeoTiffError::Io(io) => MeshError::Io(io),
            other => MeshError::format(0, other.to_string()),
        }
    }
}

/// Elevation raster decoded from a GeoTIFF.
#[derive(Clone, Debug)]
pub struct GeoTiffRaster {
    /// Pixel-centre coordinates, west to east.
    pub x: Vec<f64>,
    /// Pixel-centre coordinates, south to north.
    pub y: Vec<f64>,
    /// `(height, width)`, row 0 is the southernmost.
    pub elevation: Array2<f64>,
    pub nodata: Option<f64>,
}

impl GeoTiffRaster {
    /// Decode a GeoTIFF file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GeoTiffError> {
        let file = File::open(&path)?;
        let mut decoder = Decoder::new(file)?;
        let (width, height) = decoder.dimensions()?;
        let (width, height) = (width as usize, height as usize);

        let scale = decoder
            .get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE))
            .map_err(|_| GeoTiffError::MissingGeotransform("no ModelPixelScale tag".into()))?;
        let tiepoint = decoder
            .get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_TIEPOINT))
            .map_err(|_| GeoTiffError::MissingGeotransform("no ModelTiepoint tag".into()))?;
        if scale.len() < 2 || tiepoint.len() < 6 {
            return Err(GeoTiffError::MissingGeotransform(format!(
                "expected 3 scale and 6 tiepoint values, got {} and {}",
                scale.len(),
                tiepoint.len()
            )));
        }
        let nodata = decoder
            .get_tag_ascii_string(Tag::from_u16_exhaustive(GDAL_NODATA))
            .ok()
            .and_then(|s| s.trim_matches(char::from(0)).trim().parse::<f64>().ok());

        // Tiepoint: [I, J, K, X, Y, Z] with (X, Y) at the top-left corner
        let (dx, dy) = (scale[0], scale[1]);
        let x_origin = tiepoint[3] - tiepoint[0] * dx;
        let y_top = tiepoint[4] + tiepoint[1] * dy;

        let samples: Vec<f64> = match decoder.read_image()? {
            DecodingResult::U8(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::U16(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::U32(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::I8(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::I16(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::I32(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::F32(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::F64(data) => data,
            DecodingResult::U64(_) | DecodingResult::I64(_) => {
                return Err(GeoTiffError::UnsupportedDataType(
                    "64-bit integer samples".into(),
                ))
            }
        };
        if samples.len() < width * height {
            return Err(GeoTiffError::UnsupportedDataType(format!(
                "expected {} single-band samples, got {}",
                width * height,
                samples.len()
            )));
        }

        // TIFF rows run north to south
        let elevation =
            Array2::from_shape_fn((height, width), |(r, c)| samples[(height - 1 - r) * width + c]);
        let x = (0..width).map(|c| x_origin + (c as f64 + 0.5) * dx).collect();
        let y = (0..height)
            .map(|r| y_top - (height as f64 - r as f64 - 0.5) * dy)
            .collect();

        debug!(
            "decoded GeoTIFF {} ({} x {} pixels, nodata {:?})",
            path.as_ref().display(),
            width,
            height,
            nodata
        );
        Ok(Self {
            x,
            y,
            elevation,
            nodata,
        })
    }

    /// Pixel-centre extent.
    pub fn bounds(&self) -> Option<Extent2D> {
        let (x0, x1) = (self.x.first()?, self.x.last()?);
        let (y0, y1) = (self.y.first()?, self.y.last()?);
        Some(Extent2D::new(*x0, *x1, *y0, *y1))
    }

    /// Replace nodata cells with the lowest valid elevation.
    pub fn fill_nodata(&mut self) {
        let Some(nodata) = self.nodata else {
            return;
        };
        let min_valid = self
            .elevation
            .iter()
            .copied()
            .filter(|&v| v != nodata && v.is_finite())
            .fold(f64::INFINITY, f64::min);
        if min_valid.is_finite() {
            self.elevation
                .mapv_inplace(|v| if v == nodata || !v.is_finite() { min_valid } else { v });
        }
    }

    pub fn into_surface(mut self, kind: CoordinateKind) -> crate::Result<ElevationSurface> {
        self.fill_nodata();
        ElevationSurface::from_axes(self.x, self.y, self.elevation, kind)
    }
}

/// Read a GeoTIFF as an elevation surface.
pub fn read_geotiff_surface<P: AsRef<Path>>(
    path: P,
    kind: CoordinateKind,
) -> crate::Result<ElevationSurface> {
    GeoTiffRaster::load(path)?.into_surface(kind)
}
