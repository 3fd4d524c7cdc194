//! # Containment Test Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use comms_if::eqpt::gps::GpsFix;
use gov_lib::areas::Area;
use gov_lib::geometry;
use nalgebra::Point2;

/// An irregular 20-sided ring around the origin.
fn test_area(reversed: bool) -> Area {
    let boundary = (0..20)
        .map(|i| {
            let angle = (i as f64) * std::f64::consts::TAU / 20.0;
            let radius = 5.0 + (i % 3) as f64;
            Point2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect();

    Area {
        id: String::from("bench"),
        label: String::from("bench_area"),
        kind: String::new(),
        boundary,
        reversed,
        slowing_factor: 3,
        disables_inputs: false,
    }
}

fn affects_benchmark(c: &mut Criterion) {
    let area = test_area(false);
    let inside = GpsFix {
        lat_deg: 0.5,
        lon_deg: 0.5,
        alt: 0.0,
    };
    let outside = GpsFix {
        lat_deg: 50.0,
        lon_deg: 50.0,
        alt: 0.0,
    };

    c.bench_function("affects inside", |b| {
        b.iter(|| geometry::affects(&area, &inside).unwrap())
    });

    c.bench_function("affects outside", |b| {
        b.iter(|| geometry::affects(&area, &outside).unwrap())
    });

    c.bench_function("distance to boundary", |b| {
        b.iter(|| geometry::distance_to_boundary(&area, &outside).unwrap())
    });
}

criterion_group!(benches, affects_benchmark);
criterion_main!(benches);
