//! Integration tests for mesh construction.
//!
//! These tests verify:
//! - Core grid coverage and spacing around a station set
//! - Padding growth for every padding strategy
//! - Grid lines never sitting on a station
//! - Depth axis layering
//! - Configuration from JSON

use modem_mesh::mesh::{
    grid_from_nodes, nodes_from_grid, MeshBuilder, MeshConfig, Origin, StationSet,
    COLLISION_FRACTION,
};
use modem_mesh::types::Axis;
use modem_mesh::{MeshError, Model, PadMethod};

const TOL: f64 = 1e-9;

fn survey() -> StationSet {
    StationSet::from_relative(&[(-1000.0, -500.0), (0.0, 0.0), (1500.0, 500.0)]).unwrap()
}

fn build(config: MeshConfig, stations: StationSet) -> Model {
    MeshBuilder::new(config).with_stations(stations).build().unwrap()
}

/// Index range of the core lines: the run of lines spaced exactly one cell.
fn core_range(lines: &[f64], cell: f64) -> (usize, usize) {
    let widths = nodes_from_grid(lines);
    let first = widths.iter().position(|&w| (w - cell).abs() < TOL).unwrap();
    let last = widths.iter().rposition(|&w| (w - cell).abs() < TOL).unwrap();
    (first, last + 1)
}

#[test]
fn test_core_grid_covers_stations() {
    let model = build(MeshConfig::default(), survey());
    let east = model.grid.lines(Axis::East);
    let (lo, hi) = core_range(east, 500.0);

    // Stations plus pad_num * 1.5 cells on each side
    assert!(east[lo] <= -1000.0 - 2250.0);
    assert!(east[hi] >= 1500.0 + 2250.0);
    for w in east[lo..=hi].windows(2) {
        assert!((w[1] - w[0] - 500.0).abs() < TOL);
    }
}

#[test]
fn test_padding_grows_outward() {
    for method in [PadMethod::Extent1, PadMethod::Extent2, PadMethod::Stretch] {
        let model = build(MeshConfig::default().with_pad_method(method), survey());
        for axis in [Axis::East, Axis::North] {
            let lines = model.grid.lines(axis);
            assert!(
                lines.windows(2).all(|w| w[1] > w[0]),
                "{} lines not increasing with {}",
                axis,
                method
            );

            let nodes = model.grid.nodes(axis);
            let n = nodes.len();
            // extent2 loses the line that rounds onto the core edge
            let pad = if method == PadMethod::Extent2 { 6 } else { 7 };
            assert!(
                nodes[..pad].windows(2).all(|w| w[0] >= w[1]),
                "{} west/south padding shrinks outward with {}",
                axis,
                method
            );
            assert!(
                nodes[n - pad..].windows(2).all(|w| w[1] >= w[0]),
                "{} east/north padding shrinks outward with {}",
                axis,
                method
            );
        }
    }
}

#[test]
fn test_extent1_reaches_requested_extent() {
    let model = build(MeshConfig::default(), survey());
    let east = model.grid.lines(Axis::East);
    let extent = east[east.len() - 1] - east[0];
    // Padding aims at half the extent beyond the core on each side
    assert!(extent >= 100_000.0 * 0.9, "extent {}", extent);
}

#[test]
fn test_no_line_within_tolerance_of_a_station() {
    // The station at east = 300 falls exactly on a core line
    let stations =
        StationSet::from_relative(&[(-1000.0, -500.0), (300.0, 0.0), (1500.0, 500.0)]).unwrap();
    let model = build(MeshConfig::default(), stations.clone());
    let tolerance = COLLISION_FRACTION * 500.0;

    let east = model.grid.lines(Axis::East);
    assert!(east.contains(&290.0));
    assert!(!east.contains(&300.0));

    for (axis, coords) in [
        (Axis::East, stations.rel_east()),
        (Axis::North, stations.rel_north()),
    ] {
        for station in coords {
            for &line in model.grid.lines(axis) {
                assert!(
                    (station - line).abs() >= tolerance - TOL,
                    "{} line {} too close to station {}",
                    axis,
                    line,
                    station
                );
            }
        }
    }
}

#[test]
fn test_stations_straddling_a_line_stay_clear() {
    // 295 and 312 sit either side of the core line at east = 300
    let stations = StationSet::from_relative(&[
        (-1000.0, -500.0),
        (295.0, 0.0),
        (312.0, 250.0),
        (1500.0, 500.0),
    ])
    .unwrap();
    let model = build(MeshConfig::default(), stations.clone());
    let tolerance = COLLISION_FRACTION * 500.0;

    let east = model.grid.lines(Axis::East);
    assert!(east.contains(&285.0));
    assert!(east.windows(2).all(|w| w[1] > w[0]));
    for station in stations.rel_east() {
        for &line in east {
            assert!(
                (station - line).abs() >= tolerance - TOL,
                "east line {} too close to station {}",
                line,
                station
            );
        }
    }
}

#[test]
fn test_node_grid_conversions_agree() {
    let model = build(MeshConfig::default(), survey());

    let depth = model.grid.lines(Axis::Depth);
    let rebuilt = grid_from_nodes(&model.grid.nodes(Axis::Depth), Origin::FromZero);
    assert_eq!(rebuilt.len(), depth.len());
    for (a, b) in rebuilt.iter().zip(depth) {
        assert!((a - b).abs() < 1e-6);
    }

    let east = model.grid.nodes(Axis::East);
    let centered = grid_from_nodes(&east, Origin::Centered);
    let total: f64 = east.iter().sum();
    assert!((centered[0] + total / 2.0).abs() < 1e-6);
    assert!((nodes_from_grid(&centered)[3] - east[3]).abs() < 1e-6);
}

#[test]
fn test_depth_axis() {
    let model = build(MeshConfig::default(), survey());
    let depth = model.grid.lines(Axis::Depth);
    let nodes = model.grid.nodes(Axis::Depth);

    assert_eq!(depth[0], 0.0);
    assert_eq!(nodes[0], 10.0);
    assert!(nodes.windows(2).all(|w| w[1] > w[0]));
    assert!(depth[depth.len() - 1] >= 50_000.0);
    assert_eq!(model.resistivity.shape().2, nodes.len());
}

#[test]
fn test_rotation_is_recorded() {
    let config = MeshConfig::default().with_rotation(30.0);
    let model = build(config, survey());

    assert_eq!(model.grid.rotation_angle, 30.0);
    let rotated = model.stations.as_ref().unwrap().rel_east();
    assert!((rotated[2] - 1500.0).abs() > 1.0);
}

#[test]
fn test_config_from_json() {
    let config = MeshConfig::from_json_str(
        r#"{ "cell_size_east": 250.0, "cell_size_north": 250.0, "pad_method": "stretch" }"#,
    )
    .unwrap();
    assert_eq!(config.pad_method, PadMethod::Stretch);
    assert_eq!(config.pad_east, 7);

    let model = build(config, survey());
    let east = model.grid.lines(Axis::East);
    let (lo, hi) = core_range(east, 250.0);
    assert_eq!((lo, hi), (7, 27));
    // Stretch widths round to hundreds: 250 -> 200
    assert_eq!(model.grid.nodes(Axis::East)[6], 200.0);
}

#[test]
fn test_invalid_configuration() {
    let err = MeshBuilder::new(MeshConfig::default().with_cell_size(-500.0, 500.0))
        .with_stations(survey())
        .build()
        .unwrap_err();
    assert!(matches!(err, MeshError::Configuration(_)));

    assert!(matches!(
        MeshConfig::from_json_str(r#"{ "pad_method": "extent9" }"#),
        Err(MeshError::Configuration(_))
    ));
}
