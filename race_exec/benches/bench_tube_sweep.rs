//! # Tube Sweep Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use nalgebra::Vector3;
use race_lib::{
    traj::Waypoints,
    tube::{proximity_radii, sweep, ProfileParams, TubeRadius},
};

fn tube_sweep_benchmark(c: &mut Criterion) {
    // ---- Build a dummy helix centreline ----

    let num_samples = 5000;
    let t_s: Vec<f64> = (0..num_samples).map(|i| i as f64 * 0.002).collect();
    let positions: Vec<Vector3<f64>> = t_s
        .iter()
        .map(|t| Vector3::new(5.0 * t.cos(), 5.0 * t.sin(), 0.5 * t))
        .collect();

    // One waypoint every second along the helix
    let wps_t: Vec<f64> = (0..=10).map(|i| i as f64).collect();
    let waypoints = Waypoints::new(
        wps_t
            .iter()
            .map(|t| Vector3::new(5.0 * t.cos(), 5.0 * t.sin(), 0.5 * t))
            .collect(),
        wps_t.clone(),
    )
    .unwrap();

    let profile = ProfileParams {
        inner_radius_m: 0.3,
        outer_radius_m: 1.5,
        rate: 4.0,
        bias_m: 1.0,
        scale: 1.0,
    };

    c.bench_function("sweep::constant", |b| {
        b.iter(|| sweep(&positions, &TubeRadius::Constant(1.0), 20).unwrap())
    });

    c.bench_function("proximity_radii", |b| {
        b.iter(|| proximity_radii(&t_s, &positions, &waypoints, &profile).unwrap())
    });

    let radii = proximity_radii(&t_s, &positions, &waypoints, &profile).unwrap();
    let radius = TubeRadius::PerSample(radii);

    c.bench_function("sweep::profile", |b| {
        b.iter(|| sweep(&positions, &radius, 20).unwrap())
    });
}

criterion_group!(benches, tube_sweep_benchmark);
criterion_main!(benches);
