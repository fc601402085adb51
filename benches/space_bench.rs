//! Benchmarks for pivot2d
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pivot2d::{
    BroadPhaseAlg, Float, Material, RigidBody, RigidBodyInit, RigidBodyType, Shape, Space, Vector2,
};

const DT: Float = 1.0 / 60.0;

fn pyramid_space(rows: usize, alg: BroadPhaseAlg) -> Space {
    let mut space = Space::new();
    space.set_broadphase(alg);
    space.set_gravity(Vector2::new(0.0, -10.0));

    let mut ground = RigidBody::new(RigidBodyInit::default());
    ground.add_shape(Shape::rect(200.0, 1.0, Vector2::ZERO).unwrap());
    space.add_rigidbody(ground).unwrap();

    let material = Material::new(1.0, 0.0, 0.5);
    for row in 0..rows {
        let count = rows - row;
        let y = 1.0 + row as Float;
        for column in 0..count {
            let x = column as Float - count as Float * 0.5 + 0.5;
            let mut body = RigidBody::new(RigidBodyInit {
                body_type: RigidBodyType::Dynamic,
                position: Vector2::new(x, y),
                material,
                ..Default::default()
            });
            body.add_shape(Shape::rect(1.0, 1.0, Vector2::ZERO).unwrap());
            space.add_rigidbody(body).unwrap();
        }
    }
    space
}

// ============================================================================
// Step benchmarks
// ============================================================================

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");

    group.bench_function("pyramid_6_rows_60_steps", |b| {
        b.iter(|| {
            let mut space = pyramid_space(6, BroadPhaseAlg::BruteForce);
            for _ in 0..60 {
                space.step(black_box(DT));
            }
            space.bodies().len()
        });
    });

    group.bench_function("free_bodies_100_60_steps", |b| {
        b.iter(|| {
            let mut space = Space::new();
            space.set_gravity(Vector2::ZERO);
            for i in 0..100 {
                let mut body = RigidBody::new(RigidBodyInit {
                    body_type: RigidBodyType::Dynamic,
                    position: Vector2::new((i % 10) as Float * 3.0, (i / 10) as Float * 3.0),
                    ..Default::default()
                });
                body.add_shape(Shape::circle(Vector2::ZERO, 1.0));
                space.add_rigidbody(body).unwrap();
            }
            for _ in 0..60 {
                space.step(black_box(DT));
            }
            space.bodies().len()
        });
    });

    group.finish();
}

// ============================================================================
// Broad-phase comparison
// ============================================================================

fn bench_broadphase(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadphase");

    for (name, alg) in [
        ("brute_force", BroadPhaseAlg::BruteForce),
        ("spatial_hash_grid", BroadPhaseAlg::SpatialHashGrid),
        ("bvh", BroadPhaseAlg::Bvh),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut space = pyramid_space(10, alg);
                for _ in 0..10 {
                    space.step(black_box(DT));
                }
                space.contact_pairs().count()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_step, bench_broadphase);
criterion_main!(benches);
