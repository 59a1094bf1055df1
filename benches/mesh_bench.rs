//! Benchmarks for mesh construction and topography draping.
//!
//! Run with: `cargo bench --bench mesh_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use modem_mesh::interp::{CoordinateKind, ElevationInterpolator, ElevationSurface, InterpolationMethod};
use modem_mesh::io::format_model;
use modem_mesh::mesh::{MeshBuilder, MeshConfig, StationSet};
use modem_mesh::{Model, ResScale};
use ndarray::Array2;

/// Stations on a jittered square array, `n` per side, 2 km apart.
fn station_array(n: usize) -> StationSet {
    let mut points = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            let jitter = ((i * 7 + j * 13) % 11) as f64 * 37.0;
            points.push((
                -1_000.0 * n as f64 + 2_000.0 * j as f64 + jitter,
                -1_000.0 * n as f64 + 2_000.0 * i as f64 - jitter,
            ));
        }
    }
    StationSet::from_relative(&points).unwrap()
}

/// Rolling hills on a regular raster, `n` × `n` samples over ±100 km.
fn hills(n: usize) -> ElevationSurface {
    let step = 200_000.0 / (n - 1) as f64;
    let x: Vec<f64> = (0..n).map(|i| -100_000.0 + step * i as f64).collect();
    let y = x.clone();
    let z = Array2::from_shape_fn((n, n), |(r, c)| {
        400.0 + 300.0 * (x[c] / 15_000.0).sin() * (y[r] / 22_000.0).cos()
    });
    ElevationSurface::from_axes(x, y, z, CoordinateKind::Projected).unwrap()
}

fn build(stations: &StationSet, config: &MeshConfig) -> Model {
    MeshBuilder::new(config.clone())
        .with_stations(stations.clone())
        .build()
        .unwrap()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("mesh_build");
    let config = MeshConfig::default().with_cell_size(250.0, 250.0);

    for n in [4, 8, 16] {
        let stations = station_array(n);
        group.bench_with_input(BenchmarkId::new("stations", n * n), &stations, |b, s| {
            b.iter(|| build(black_box(s), &config))
        });
    }
    group.finish();
}

fn bench_interpolation(c: &mut Criterion) {
    let mut group = c.benchmark_group("elevation_interpolation");
    let model = build(&station_array(8), &MeshConfig::default().with_cell_size(250.0, 250.0));
    let surface = hills(201);

    for method in [InterpolationMethod::Nearest, InterpolationMethod::Linear] {
        let interpolator = ElevationInterpolator::new(method);
        group.bench_function(method.to_string(), |b| {
            b.iter(|| {
                interpolator
                    .interpolate_to_grid(black_box(&surface), &model.grid, (0.0, 0.0))
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_topography(c: &mut Criterion) {
    let config = MeshConfig::default().with_air_layers(10);
    let model = build(&station_array(8), &config);
    let surface = hills(101);

    c.bench_function("add_topography", |b| {
        b.iter(|| {
            let mut m = model.clone();
            m.add_topography(black_box(&surface)).unwrap();
            m
        })
    });
}

fn bench_format(c: &mut Criterion) {
    let model = build(&station_array(8), &MeshConfig::default());

    c.bench_function("format_model_loge", |b| {
        b.iter(|| {
            format_model(
                black_box(&model.grid),
                &model.resistivity,
                "bench",
                ResScale::LogE,
            )
            .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_build,
    bench_interpolation,
    bench_topography,
    bench_format
);
criterion_main!(benches);
