//! Benchmarks des opérateurs principaux

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use geo::Coord;
use geochain::{
    minimum_enclosing_circle, project, Buffer, GeodesicBuffer, Geometry, ProjectionTransformation,
    RandomPoints, SpatialReference,
};

/// Polygone étoilé de `n` sommets autour de (x, y)
fn star(x: f64, y: f64, radius: f64, n: usize) -> Geometry {
    let mut ring: Vec<Coord> = (0..n)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / n as f64;
            let r = if i % 2 == 0 { radius } else { radius * 0.6 };
            Coord {
                x: x + r * angle.cos(),
                y: y + r * angle.sin(),
            }
        })
        .collect();
    ring.push(ring[0]);
    Geometry::polygon(ring, vec![])
}

fn bench_project(c: &mut Criterion) {
    let wgs84 = SpatialReference::wgs84();
    let lambert93 = SpatialReference::from_code(2154).unwrap();
    let transform = ProjectionTransformation::new(&wgs84, &lambert93);

    let mut group = c.benchmark_group("project");
    for n in [64usize, 1024, 16384] {
        let polygon = star(2.35, 48.85, 0.1, n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &polygon, |b, g| {
            b.iter(|| black_box(project(black_box(g), &transform, None).unwrap()))
        });
    }
    group.finish();
}

fn bench_buffer(c: &mut Criterion) {
    let lambert93 = SpatialReference::from_code(2154).unwrap();
    let wgs84 = SpatialReference::wgs84();

    let mut group = c.benchmark_group("buffer");
    group.sample_size(20);
    let polygon = star(652_000.0, 6_862_000.0, 500.0, 64);
    group.bench_function("planar_star_64", |b| {
        b.iter(|| black_box(Buffer::local().execute(&polygon, Some(&lambert93), 25.0, None).unwrap()))
    });
    let point = Geometry::point(2.35, 48.85);
    group.bench_function("geodesic_point", |b| {
        b.iter(|| {
            black_box(
                GeodesicBuffer::local()
                    .execute(&point, &wgs84, 10_000.0, None, None)
                    .unwrap(),
            )
        })
    });
    group.finish();
}

fn bench_random_points(c: &mut Criterion) {
    let wgs84 = SpatialReference::wgs84();
    let polygon = star(2.35, 48.85, 0.5, 32);

    let mut group = c.benchmark_group("random_points");
    group.sample_size(10);
    for density in [0.1, 1.0] {
        group.bench_with_input(BenchmarkId::from_parameter(density), &density, |b, &d| {
            b.iter(|| {
                black_box(
                    RandomPoints::local()
                        .execute(&polygon, d, 1977, Some(&wgs84), None)
                        .unwrap(),
                )
            })
        });
    }
    group.finish();
}

fn bench_enclosing_circle(c: &mut Criterion) {
    let points: Vec<Coord> = star(0.0, 0.0, 100.0, 10_000).vertices();

    c.bench_function("minimum_enclosing_circle_10k", |b| {
        b.iter(|| black_box(minimum_enclosing_circle(black_box(&points), 1977)))
    });
}

criterion_group!(
    benches,
    bench_project,
    bench_buffer,
    bench_random_points,
    bench_enclosing_circle
);
criterion_main!(benches);
