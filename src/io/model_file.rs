//! ModEM model files.
//!
//! # File Format
//!
//! ```text
//! # MODEL TITLE
//!     3    2    2    0 LOGE
//!      500.000     500.000     500.000
//!      500.000     500.000
//!       10.000      20.000
//!
//!   4.60517E+00  4.60517E+00  4.60517E+00
//!   4.60517E+00  4.60517E+00  4.60517E+00
//!
//!   4.60517E+00  4.60517E+00  4.60517E+00
//!   4.60517E+00  4.60517E+00  4.60517E+00
//!
//!        -750.000        -500.000           0.000
//!     0.000
//! ```
//!
//! - Line 2 holds the node counts (north, east, depth), a zero and the
//!   resistivity scale (`LOGE`, `LOG10` or `LINEAR`).
//! - Lines 3-5 hold the node widths of each axis.
//! - Each depth layer is a block of one line per east index, listing the
//!   north values from north to south. Blocks are separated by blank lines.
//! - Trailing lines hold the grid centre (north, east, depth) and the
//!   rotation angle. Both are optional on read.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::{debug, info};
use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::error::{MeshError, Result};
use crate::mesh::{Grid, GridCenter};
use crate::model::ResistivityVolume;
use crate::numeric::mode;
use crate::types::Axis;

/// Scale of resistivity values in a model file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResScale {
    /// Natural logarithm.
    #[default]
    #[serde(rename = "loge")]
    LogE,
    /// Base-10 logarithm.
    #[serde(alias = "log")]
    Log10,
    /// Linear Ohm·m.
    Linear,
}

impl ResScale {
    /// Label written on line 2 of a model file.
    pub fn label(&self) -> &'static str {
        match self {
            ResScale::LogE => "LOGE",
            ResScale::Log10 => "LOG10",
            ResScale::Linear => "LINEAR",
        }
    }

    /// Linear resistivity to file value.
    #[inline]
    pub fn to_file(&self, value: f64) -> f64 {
        match self {
            ResScale::LogE => value.ln(),
            ResScale::Log10 => value.log10(),
            ResScale::Linear => value,
        }
    }

    /// File value to linear resistivity.
    #[inline]
    pub fn from_file(&self, value: f64) -> f64 {
        match self {
            ResScale::LogE => value.exp(),
            ResScale::Log10 => 10f64.powf(value),
            ResScale::Linear => value,
        }
    }
}

impl FromStr for ResScale {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "loge" => Ok(ResScale::LogE),
            "log10" | "log" => Ok(ResScale::Log10),
            "linear" => Ok(ResScale::Linear),
            other => Err(MeshError::config(format!(
                "unknown resistivity scale '{}' (expected LOGE, LOG10 or LINEAR)",
                other
            ))),
        }
    }
}

/// Mesh parameters recovered from the node widths of a model file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelFileInfo {
    /// Most common east node width.
    pub cell_size_east: Option<f64>,
    /// Most common north node width.
    pub cell_size_north: Option<f64>,
    /// Leading east nodes differing from the core width.
    pub pad_east: usize,
    /// Leading north nodes differing from the core width.
    pub pad_north: usize,
}

impl ModelFileInfo {
    fn from_nodes(north: &[f64], east: &[f64]) -> Self {
        let cell_size_north = mode(north);
        let cell_size_east = mode(east);
        Self {
            cell_size_east,
            cell_size_north,
            pad_east: leading_padding(east, cell_size_east),
            pad_north: leading_padding(north, cell_size_north),
        }
    }
}

fn leading_padding(nodes: &[f64], cell: Option<f64>) -> usize {
    match cell {
        Some(cell) => nodes.iter().take_while(|&&n| n != cell).count(),
        None => 0,
    }
}

/// Contents of a model file.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelFile {
    pub title: String,
    pub grid: Grid,
    /// Linear resistivities.
    pub resistivity: ResistivityVolume,
    pub res_scale: ResScale,
    pub info: ModelFileInfo,
}

// =============================================================================
// Writing
// =============================================================================

/// `{:>13.5E}` with a signed two-digit exponent.
fn format_sci(value: f64) -> String {
    if !value.is_finite() {
        return format!("{:>13}", value);
    }
    let raw = format!("{:.5E}", value);
    let (mantissa, exponent) = raw.split_once('E').unwrap_or((raw.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!(
        "{:>13}",
        format!("{}E{}{:02}", mantissa, sign, exponent.abs())
    )
}

/// Render a model file.
pub fn format_model(
    grid: &Grid,
    volume: &ResistivityVolume,
    title: &str,
    scale: ResScale,
) -> Result<String> {
    volume.check_matches(grid)?;
    Ok(ModelText {
        grid,
        volume,
        title,
        scale,
    }
    .to_string())
}

/// Model file text for a grid and a volume of matching shape.
struct ModelText<'a> {
    grid: &'a Grid,
    volume: &'a ResistivityVolume,
    title: &'a str,
    scale: ResScale,
}

impl fmt::Display for ModelText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grid = self.grid;
        let (nn, ne, nz) = grid.shape();

        writeln!(f, "# {}", self.title.to_uppercase())?;
        writeln!(f, "{:>5}{:>5}{:>5}{:>5} {}", nn, ne, nz, 0, self.scale.label())?;

        for axis in Axis::ALL {
            for node in grid.nodes(axis) {
                write!(f, "{:>12.3}", node.abs())?;
            }
            writeln!(f)?;
        }

        let values = self.volume.view();
        for k in 0..nz {
            writeln!(f)?;
            for j in 0..ne {
                for i in (0..nn).rev() {
                    f.write_str(&format_sci(self.scale.to_file(values[[i, j, k]])))?;
                }
                writeln!(f)?;
            }
        }

        let center = grid.center;
        writeln!(
            f,
            "\n{:>16.3}{:>16.3}{:>16.3}",
            center.north, center.east, center.depth
        )?;
        writeln!(f, "{:>9.3}", grid.rotation_angle)
    }
}

/// Write a model file.
///
/// `volume` holds linear resistivities; `scale` is applied on output.
pub fn write_model_file<P: AsRef<Path>>(
    path: P,
    grid: &Grid,
    volume: &ResistivityVolume,
    title: &str,
    scale: ResScale,
) -> Result<()> {
    let content = format_model(grid, volume, title, scale)?;
    fs::write(path.as_ref(), content)?;
    info!(
        "wrote model file {} ({:?} cells, {})",
        path.as_ref().display(),
        grid.shape(),
        scale.label()
    );
    Ok(())
}

// =============================================================================
// Reading
// =============================================================================

fn parse_values(line: &str, line_num: usize) -> Result<Vec<f64>> {
    line.split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| {
                MeshError::format(line_num, format!("invalid number '{}'", token))
            })
        })
        .collect()
}

fn parse_count(token: Option<&str>, name: &str, line_num: usize) -> Result<usize> {
    let token = token.ok_or_else(|| MeshError::format(line_num, format!("missing {}", name)))?;
    match token.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(MeshError::format(
            line_num,
            format!("invalid {} '{}'", name, token),
        )),
    }
}

fn parse_nodes(lines: &[&str], index: usize, expected: usize, axis: Axis) -> Result<Vec<f64>> {
    let line_num = index + 1;
    let line = lines.get(index).ok_or_else(|| {
        MeshError::format(line_num, format!("missing {} node widths", axis))
    })?;
    let nodes = parse_values(line, line_num)?;
    if nodes.len() != expected {
        return Err(MeshError::format(
            line_num,
            format!(
                "expected {} {} node widths, found {}",
                expected,
                axis,
                nodes.len()
            ),
        ));
    }
    if nodes.iter().any(|&n| !(n.is_finite() && n > 0.0)) {
        return Err(MeshError::format(
            line_num,
            format!("{} node widths must be positive", axis),
        ));
    }
    Ok(nodes)
}

/// Parse model file contents.
pub fn parse_model(content: &str) -> Result<ModelFile> {
    let lines: Vec<&str> = content.lines().collect();

    let title = lines
        .first()
        .ok_or_else(|| MeshError::format(1, "empty model file"))?
        .trim()
        .trim_start_matches('#')
        .trim()
        .to_string();

    let header = lines
        .get(1)
        .ok_or_else(|| MeshError::format(2, "missing dimension line"))?;
    let mut tokens = header.split_whitespace();
    let nn = parse_count(tokens.next(), "north node count", 2)?;
    let ne = parse_count(tokens.next(), "east node count", 2)?;
    let nz = parse_count(tokens.next(), "depth node count", 2)?;
    let _ = tokens.next();
    let res_scale: ResScale = tokens
        .next()
        .ok_or_else(|| MeshError::format(2, "missing resistivity scale"))?
        .parse()
        .map_err(|e: MeshError| MeshError::format(2, e.to_string()))?;

    let nodes_north = parse_nodes(&lines, 2, nn, Axis::North)?;
    let nodes_east = parse_nodes(&lines, 3, ne, Axis::East)?;
    let nodes_depth = parse_nodes(&lines, 4, nz, Axis::Depth)?;

    let mut values = Array3::<f64>::zeros((nn, ne, nz));
    let mut index = 5;
    for k in 0..nz {
        while lines.get(index).is_some_and(|l| l.trim().is_empty()) {
            index += 1;
        }
        for j in 0..ne {
            let line_num = index + 1;
            let line = match lines.get(index) {
                Some(l) if !l.trim().is_empty() => *l,
                _ => {
                    return Err(MeshError::format(
                        line_num,
                        format!("expected resistivity row {} of layer {}", j + 1, k + 1),
                    ))
                }
            };
            let row = parse_values(line, line_num)?;
            if row.len() != nn {
                return Err(MeshError::format(
                    line_num,
                    format!("expected {} values, found {}", nn, row.len()),
                ));
            }
            // Rows list north values from north to south
            for (i, &v) in row.iter().enumerate() {
                values[[nn - 1 - i, j, k]] = res_scale.from_file(v);
            }
            index += 1;
        }
    }

    let mut center = None;
    let mut rotation = 0.0;
    for (offset, line) in lines.iter().enumerate().skip(index) {
        let line_num = offset + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.len() {
            3 => {
                let v = parse_values(line, line_num)?;
                center = Some(GridCenter::new(v[0], v[1], v[2]));
            }
            1 => {
                rotation = parse_values(line, line_num)?[0];
            }
            _ => {}
        }
    }

    let sum_north: f64 = nodes_north.iter().sum();
    let sum_east: f64 = nodes_east.iter().sum();
    let center = center.unwrap_or(GridCenter::new(-sum_north / 2.0, -sum_east / 2.0, 0.0));

    let mut grid = Grid::from_nodes(&nodes_north, &nodes_east, &nodes_depth)
        .map_err(|e| MeshError::format(3, e.to_string()))?;
    grid.shift(Axis::North, center.north + sum_north / 2.0);
    grid.shift(Axis::East, center.east + sum_east / 2.0);
    grid.shift(Axis::Depth, center.depth);
    grid.center = center;
    grid.rotation_angle = rotation;

    let info = ModelFileInfo::from_nodes(&nodes_north, &nodes_east);
    debug!(
        "parsed model '{}': {} x {} x {} cells, {}, core cells {:?} x {:?}",
        title,
        nn,
        ne,
        nz,
        res_scale.label(),
        info.cell_size_north,
        info.cell_size_east
    );

    Ok(ModelFile {
        title,
        grid,
        resistivity: ResistivityVolume::from_array(values),
        res_scale,
        info,
    })
}

/// Read a model file.
pub fn read_model_file<P: AsRef<Path>>(path: P) -> Result<ModelFile> {
    let content = fs::read_to_string(path)?;
    parse_model(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-3;

    const SMALL_MODEL: &str = "\
# SMALL TEST
    2    3    1    0 LOGE
     200.000     500.000
     500.000     500.000     800.000
      10.000

  4.60517E+00  2.30259E+00
  4.60517E+00  2.30259E+00
  4.60517E+00  2.30259E+00

        -350.000        -900.000           0.000
   15.000
";

    #[test]
    fn test_format_sci() {
        assert_eq!(format_sci(4.605170186), "  4.60517E+00");
        assert_eq!(format_sci(-0.001234), " -1.23400E-03");
        assert_eq!(format_sci(1e12), "  1.00000E+12");
        assert_eq!(format_sci(0.0), "  0.00000E+00");
    }

    #[test]
    fn test_parse_small_model() {
        let model = parse_model(SMALL_MODEL).unwrap();
        assert_eq!(model.title, "SMALL TEST");
        assert_eq!(model.res_scale, ResScale::LogE);
        assert_eq!(model.grid.shape(), (2, 3, 1));

        // First value in a row is the northernmost cell
        assert!((model.resistivity.get(1, 0, 0) - 100.0).abs() < TOL);
        assert!((model.resistivity.get(0, 2, 0) - 10.0).abs() < TOL);

        assert_eq!(model.grid.center, GridCenter::new(-350.0, -900.0, 0.0));
        assert_eq!(model.grid.rotation_angle, 15.0);
        assert_eq!(model.grid.lines(Axis::North), &[-350.0, -150.0, 350.0]);
        assert_eq!(model.grid.lines(Axis::East), &[-900.0, -400.0, 100.0, 900.0]);

        assert_eq!(model.info.cell_size_east, Some(500.0));
        assert_eq!(model.info.pad_east, 0);
    }

    #[test]
    fn test_missing_center_defaults_to_centered_grid() {
        let content = "# T\n 1 2 1 0 LINEAR\n 100.0\n 50.0 50.0\n 10.0\n\n 1.0\n 2.0\n";
        let model = parse_model(content).unwrap();
        assert_eq!(model.grid.lines(Axis::North), &[-50.0, 50.0]);
        assert_eq!(model.grid.lines(Axis::East), &[-50.0, 0.0, 50.0]);
        assert_eq!(model.resistivity.get(0, 1, 0), 2.0);
        assert_eq!(model.grid.rotation_angle, 0.0);
    }

    #[test]
    fn test_log_scale_alias() {
        let content = "# T\n 1 1 1 0 LOG\n 100.0\n 100.0\n 10.0\n\n 2.0\n";
        let model = parse_model(content).unwrap();
        assert_eq!(model.res_scale, ResScale::Log10);
        assert!((model.resistivity.get(0, 0, 0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let bad_count = "# T\n 2 1 1 0 LOGE\n 100.0\n 100.0\n 10.0\n";
        match parse_model(bad_count) {
            Err(MeshError::FileFormat { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected {:?}", other),
        }

        let bad_value = "# T\n 1 1 1 0 LOGE\n 100.0\n 100.0\n 10.0\n\n abc\n";
        match parse_model(bad_value) {
            Err(MeshError::FileFormat { line, .. }) => assert_eq!(line, 7),
            other => panic!("unexpected {:?}", other),
        }

        let bad_scale = "# T\n 1 1 1 0 LOGX\n";
        match parse_model(bad_scale) {
            Err(MeshError::FileFormat { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {:?}", other),
        }

        let truncated = "# T\n 1 2 1 0 LOGE\n 100.0\n 100.0 100.0\n 10.0\n\n 1.0\n";
        match parse_model(truncated) {
            Err(MeshError::FileFormat { line, .. }) => assert_eq!(line, 8),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_res_scale_parse() {
        assert_eq!("LOGE".parse::<ResScale>().unwrap(), ResScale::LogE);
        assert_eq!("log10".parse::<ResScale>().unwrap(), ResScale::Log10);
        assert_eq!("Linear".parse::<ResScale>().unwrap(), ResScale::Linear);
        assert!("ln".parse::<ResScale>().is_err());
    }
}
