//! ESRI ASCII elevation grids.
//!
//! ```text
//! ncols         3
//! nrows         2
//! xllcorner     10.5
//! yllcorner     60.0
//! cellsize      0.01
//! NODATA_value  -9999
//! 120 130 -9999
//! 100 110 115
//! ```
//!
//! The first data row is the northernmost one. Header keys are matched
//! without regard to case.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::debug;
use ndarray::Array2;

use crate::error::{MeshError, Result};
use crate::interp::{CoordinateKind, ElevationSurface};

const HEADER_LINES: usize = 6;

/// Raster read from an ESRI ASCII grid.
#[derive(Clone, Debug, PartialEq)]
pub struct AsciiGrid {
    pub x_lower_left: f64,
    pub y_lower_left: f64,
    pub cell_size: f64,
    pub nodata: f64,
    /// `(nrows, ncols)`, row 0 is the southernmost.
    pub elevation: Array2<f64>,
}

impl AsciiGrid {
    pub fn n_cols(&self) -> usize {
        self.elevation.ncols()
    }

    pub fn n_rows(&self) -> usize {
        self.elevation.nrows()
    }

    /// Column coordinates, west to east.
    pub fn x(&self) -> Vec<f64> {
        (0..self.n_cols())
            .map(|i| self.x_lower_left + self.cell_size * i as f64)
            .collect()
    }

    /// Row coordinates, south to north.
    pub fn y(&self) -> Vec<f64> {
        (0..self.n_rows())
            .map(|i| self.y_lower_left + self.cell_size * i as f64)
            .collect()
    }

    /// Surface with the given coordinate interpretation.
    pub fn into_surface(self, kind: CoordinateKind) -> Result<ElevationSurface> {
        let (x, y) = (self.x(), self.y());
        ElevationSurface::from_axes(x, y, self.elevation, kind)
    }
}

fn header_value(header: &HashMap<String, (f64, usize)>, key: &str) -> Result<(f64, usize)> {
    header
        .get(key)
        .copied()
        .ok_or_else(|| MeshError::format(HEADER_LINES, format!("missing header key '{}'", key)))
}

fn header_count(header: &HashMap<String, (f64, usize)>, key: &str) -> Result<usize> {
    let (value, line_num) = header_value(header, key)?;
    if value < 1.0 || value.fract() != 0.0 {
        return Err(MeshError::format(
            line_num,
            format!("{} must be a positive integer, got {}", key, value),
        ));
    }
    Ok(value as usize)
}

/// Parse ESRI ASCII grid contents.
pub fn parse_ascii_grid(content: &str) -> Result<AsciiGrid> {
    let mut lines = content.lines().enumerate();

    let mut header = HashMap::new();
    for _ in 0..HEADER_LINES {
        let (idx, line) = lines
            .next()
            .ok_or_else(|| MeshError::format(header.len() + 1, "truncated header"))?;
        let line_num = idx + 1;
        let mut fields = line.split_whitespace();
        let (key, value) = match (fields.next(), fields.next()) {
            (Some(k), Some(v)) => (k, v),
            _ => return Err(MeshError::format(line_num, "expected 'key value'")),
        };
        let value: f64 = value
            .parse()
            .map_err(|_| MeshError::format(line_num, format!("invalid value '{}'", value)))?;
        header.insert(key.to_ascii_lowercase(), (value, line_num));
    }

    let n_cols = header_count(&header, "ncols")?;
    let n_rows = header_count(&header, "nrows")?;
    let (x_lower_left, _) = header_value(&header, "xllcorner")?;
    let (y_lower_left, _) = header_value(&header, "yllcorner")?;
    let (cell_size, _) = header_value(&header, "cellsize")?;
    let (nodata, _) = header_value(&header, "nodata_value")?;

    let mut elevation = Array2::<f64>::zeros((n_rows, n_cols));
    let mut row = 0;
    for (idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let line_num = idx + 1;
        if row == n_rows {
            return Err(MeshError::format(
                line_num,
                format!("more than {} data rows", n_rows),
            ));
        }
        let values: Vec<f64> = line
            .split_whitespace()
            .map(|t| {
                t.parse::<f64>()
                    .map_err(|_| MeshError::format(line_num, format!("invalid number '{}'", t)))
            })
            .collect::<Result<_>>()?;
        if values.len() != n_cols {
            return Err(MeshError::format(
                line_num,
                format!("expected {} values, found {}", n_cols, values.len()),
            ));
        }
        // File rows run north to south
        let target = n_rows - 1 - row;
        for (col, v) in values.into_iter().enumerate() {
            elevation[[target, col]] = v;
        }
        row += 1;
    }
    if row != n_rows {
        return Err(MeshError::format(
            HEADER_LINES + row + 1,
            format!("expected {} data rows, found {}", n_rows, row),
        ));
    }

    let min_valid = elevation
        .iter()
        .copied()
        .filter(|&v| v != nodata)
        .fold(f64::INFINITY, f64::min);
    if min_valid.is_finite() {
        let filled = elevation.iter().filter(|&&v| v == nodata).count();
        elevation.mapv_inplace(|v| if v == nodata { min_valid } else { v });
        debug!("replaced {} nodata cells with {}", filled, min_valid);
    }

    Ok(AsciiGrid {
        x_lower_left,
        y_lower_left,
        cell_size,
        nodata,
        elevation,
    })
}

/// Read an ESRI ASCII grid.
pub fn read_ascii_grid<P: AsRef<Path>>(path: P) -> Result<AsciiGrid> {
    let content = fs::read_to_string(path)?;
    parse_ascii_grid(&content)
}

/// Read an ESRI ASCII grid as an elevation surface.
pub fn read_surface_ascii<P: AsRef<Path>>(path: P, kind: CoordinateKind) -> Result<ElevationSurface> {
    read_ascii_grid(path)?.into_surface(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    const SAMPLE: &str = "\
ncols         3
nrows         2
XLLCORNER     10.5
yllcorner     60.0
cellsize      0.5
NODATA_value  -9999
120 130 -9999
100 110 115
";

    #[test]
    fn test_parse_header_and_rows() {
        let grid = parse_ascii_grid(SAMPLE).unwrap();
        assert_eq!(grid.n_cols(), 3);
        assert_eq!(grid.n_rows(), 2);
        assert_eq!(grid.x(), vec![10.5, 11.0, 11.5]);
        assert_eq!(grid.y(), vec![60.0, 60.5]);

        // Southern row first
        assert_eq!(grid.elevation[[0, 0]], 100.0);
        assert_eq!(grid.elevation[[1, 1]], 130.0);
    }

    #[test]
    fn test_nodata_replaced_by_minimum() {
        let grid = parse_ascii_grid(SAMPLE).unwrap();
        assert!((grid.elevation[[1, 2]] - 100.0).abs() < TOL);
    }

    #[test]
    fn test_into_surface() {
        let surface = parse_ascii_grid(SAMPLE)
            .unwrap()
            .into_surface(CoordinateKind::Geodetic)
            .unwrap();
        assert_eq!(surface.len(), 6);
        assert_eq!(surface.raster_shape(), Some((2, 3)));
        assert_eq!(surface.kind(), CoordinateKind::Geodetic);
    }

    #[test]
    fn test_short_data() {
        let content = SAMPLE.lines().take(7).collect::<Vec<_>>().join("\n");
        match parse_ascii_grid(&content) {
            Err(MeshError::FileFormat { line, .. }) => assert_eq!(line, 8),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bad_row_width() {
        let content = SAMPLE.replace("100 110 115", "100 110");
        match parse_ascii_grid(&content) {
            Err(MeshError::FileFormat { line, .. }) => assert_eq!(line, 8),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_key() {
        let content = SAMPLE.replace("cellsize", "cellwidth");
        assert!(matches!(
            parse_ascii_grid(&content),
            Err(MeshError::FileFormat { .. })
        ));
    }
}
