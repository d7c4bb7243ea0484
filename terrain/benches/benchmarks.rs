use criterion::{criterion_group, criterion_main, Criterion};
use terrain::{
    geo::geometry::Coord, math::sample_points, trimmed_range, ElevationSource, Profile,
    RayRequest,
};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

/// Synthetic terrain so the benchmark measures the pipeline, not I/O.
struct Sine;

impl ElevationSource for Sine {
    fn resolve(&self, coord: Coord<f64>) -> Option<f64> {
        Some((coord.x * 50.0).sin() * 1_000.0 + coord.y)
    }

    fn name(&self) -> &str {
        "sine"
    }
}

fn ray_profile(c: &mut Criterion) {
    let mut group = c.benchmark_group("Ray Profile");

    let origin = Coord { x: -80.0, y: 8.5 };
    let request = RayRequest::builder()
        .origin(origin)
        .bearing(90.0)
        .start_distance(10_000.0)
        .end_distance(50_000.0)
        .step(30.0)
        .build()
        .unwrap();
    let distances = request.distances();

    group.bench_function("sample_points", |b| {
        b.iter(|| sample_points(origin, 90.0, &distances))
    });

    group.bench_function("profile", |b| {
        b.iter(|| Profile::builder().request(request).build(&Sine).unwrap())
    });

    let profile = Profile::builder().request(request).build(&Sine).unwrap();
    group.bench_function("trimmed_range", |b| {
        b.iter(|| trimmed_range(profile.samples().iter().map(|s| s.elevation_m)))
    });
}

criterion_group!(benches, ray_profile);
criterion_main!(benches);
