//! Integration tests for pivot2d
//!
//! End-to-end scenarios exercised through the public API only: free
//! fall, resting contacts, stack stability, joints, collision filtering
//! and contact persistence. All tests are deterministic.

use pivot2d::{
    ConstraintKind, DistanceJoint, Float, Material, RigidBody, RigidBodyInit, RigidBodyType,
    Shape, Space, Vector2,
};

const DT: Float = 1.0 / 60.0;

// ============================================================================
// Helpers
// ============================================================================

fn run(space: &mut Space, steps: usize) {
    for _ in 0..steps {
        space.step(DT);
    }
}

fn dynamic_body(position: Vector2, material: Material) -> RigidBody {
    RigidBody::new(RigidBodyInit {
        body_type: RigidBodyType::Dynamic,
        position,
        material,
        ..Default::default()
    })
}

fn static_ground(width: Float, height: Float, position: Vector2) -> RigidBody {
    let mut ground = RigidBody::new(RigidBodyInit {
        position,
        ..Default::default()
    });
    ground.add_shape(Shape::rect(width, height, Vector2::ZERO).unwrap());
    ground
}

// ============================================================================
// Scenario 1 — gravity free fall
// ============================================================================

/// One dynamic circle falling for a second lands where symplectic Euler
/// puts it: `10 - g * dt^2 * n(n+1)/2`, a hair below the analytic 5.095.
#[test]
fn test_free_fall_trajectory() {
    let mut space = Space::new();
    space.set_gravity(Vector2::new(0.0, -9.81));

    let mut ball = dynamic_body(Vector2::new(0.0, 10.0), Material::BASIC);
    ball.add_shape(Shape::circle(Vector2::ZERO, 1.0));
    let id = space.add_rigidbody(ball).unwrap();

    run(&mut space, 60);

    let y = space.body(id).unwrap().position().y;
    let expected = 10.0 - 9.81 * DT * DT * (60.0 * 61.0 / 2.0);
    assert!(
        (y - expected).abs() < 0.02,
        "free fall ended at y = {y}, expected {expected}"
    );
    // And within the coarse analytic band
    assert!(y > 4.9 && y < 5.2);
}

// ============================================================================
// Scenario 2 — box at rest on the ground
// ============================================================================

#[test]
fn test_box_comes_to_rest_on_ground() {
    let mut space = Space::new();
    space.set_gravity(Vector2::new(0.0, -10.0));

    let material = Material::new(1.0, 0.0, 0.5);
    space
        .add_rigidbody(static_ground(100.0, 1.0, Vector2::ZERO))
        .unwrap();

    let mut falling = dynamic_body(Vector2::new(0.0, 2.0), material);
    falling.add_shape(Shape::rect(1.0, 1.0, Vector2::ZERO).unwrap());
    let id = space.add_rigidbody(falling).unwrap();

    run(&mut space, 300);

    let body = space.body(id).unwrap();
    assert!(
        body.linear_velocity().y.abs() < 0.01,
        "still moving: vy = {}",
        body.linear_velocity().y
    );
    // Resting height: ground top (0.5) + half extent (0.5), give or take
    // the penetration slop
    let rest_error = (body.position().y - 1.0).abs();
    assert!(
        rest_error < space.settings.penetration_slop + 0.01,
        "rest height off by {rest_error}"
    );
}

// ============================================================================
// Scenario 3 — pyramid stack stability
// ============================================================================

#[test]
fn test_pyramid_stays_standing() {
    let mut space = Space::new();
    space.set_gravity(Vector2::new(0.0, -10.0));

    space
        .add_rigidbody(static_ground(200.0, 1.0, Vector2::ZERO))
        .unwrap();

    let material = Material::new(1.0, 0.0, 0.5);
    let rows = 10;
    let size = 1.0;
    let mut ids = Vec::new();
    for row in 0..rows {
        let count = rows - row;
        let y = 0.5 + size * 0.5 + size * row as Float;
        for column in 0..count {
            let x = (column as Float - count as Float * 0.5 + 0.5) * size;
            let mut body = dynamic_body(Vector2::new(x, y), material);
            body.add_shape(Shape::rect(size, size, Vector2::ZERO).unwrap());
            ids.push(space.add_rigidbody(body).unwrap());
        }
    }

    run(&mut space, 600);

    let mut max_horizontal: Float = 0.0;
    for id in ids {
        let body = space.body(id).expect("pyramid body fell out of bounds");
        max_horizontal = max_horizontal.max(body.linear_velocity().x.abs());
    }
    assert!(
        max_horizontal < 0.5,
        "pyramid is sliding: max |vx| = {max_horizontal}"
    );
}

// ============================================================================
// Scenario 4 — distance joint holds its length
// ============================================================================

#[test]
fn test_distance_joint_keeps_length() {
    let mut space = Space::new();
    space.set_gravity(Vector2::ZERO);

    let mut a = dynamic_body(Vector2::new(-1.0, 0.0), Material::BASIC);
    a.add_shape(Shape::circle(Vector2::ZERO, 0.5));
    a.set_mass(1.0).unwrap();
    a.set_linear_velocity(Vector2::new(1.0, 0.0));

    let mut b = dynamic_body(Vector2::new(1.0, 0.0), Material::BASIC);
    b.add_shape(Shape::circle(Vector2::ZERO, 0.5));
    b.set_mass(1.0).unwrap();
    b.set_linear_velocity(Vector2::new(-1.0, 0.0));

    let id_a = space.add_rigidbody(a).unwrap();
    let id_b = space.add_rigidbody(b).unwrap();
    space.add_constraint(ConstraintKind::Distance(DistanceJoint::new(
        id_a,
        Some(id_b),
        Vector2::ZERO,
        Vector2::ZERO,
        2.0,
    )));

    for _ in 0..120 {
        space.step(DT);
        let pa = space.body(id_a).unwrap().position();
        let pb = space.body(id_b).unwrap().position();
        let error = (pa.distance_to(pb) - 2.0).abs();
        assert!(error < 0.05, "joint length drifted by {error}");
    }
}

// ============================================================================
// Scenario 5 — collision group filtering
// ============================================================================

#[test]
fn test_collision_group_suppresses_and_releases() {
    let mut space = Space::new();
    space.set_gravity(Vector2::ZERO);

    let mut a = dynamic_body(Vector2::new(0.0, 0.0), Material::BASIC);
    a.add_shape(Shape::circle(Vector2::ZERO, 1.0));
    a.set_collision_group(7);
    let mut b = dynamic_body(Vector2::new(1.5, 0.0), Material::BASIC);
    b.add_shape(Shape::circle(Vector2::ZERO, 1.0));
    b.set_collision_group(7);

    let id_a = space.add_rigidbody(a).unwrap();
    space.add_rigidbody(b).unwrap();

    run(&mut space, 10);
    assert_eq!(
        space.contact_pairs().count(),
        0,
        "same non-zero group must never produce a contact pair"
    );

    // Releasing one body from the group lets the pair form on the next
    // step
    space.body_mut(id_a).unwrap().set_collision_group(0);
    space.step(DT);
    assert_eq!(space.contact_pairs().count(), 1);
}

// ============================================================================
// Scenario 6 — contact persistence and warm-started impulses
// ============================================================================

#[test]
fn test_sustained_contact_is_persisted_with_positive_impulse() {
    let mut space = Space::new();
    space.set_gravity(Vector2::new(0.0, -10.0));

    space
        .add_rigidbody(static_ground(100.0, 1.0, Vector2::ZERO))
        .unwrap();
    // Start just barely penetrating so the pair exists from step 1
    let mut resting = dynamic_body(Vector2::new(0.0, 0.99), Material::new(1.0, 0.0, 0.5));
    resting.add_shape(Shape::rect(1.0, 1.0, Vector2::ZERO).unwrap());
    space.add_rigidbody(resting).unwrap();

    space.step(DT);
    // First step: contact exists but is fresh
    assert_eq!(space.contact_pairs().count(), 1);

    for step in 2..=10 {
        space.step(DT);
        let pcp = space.contact_pairs().next().unwrap();
        assert!(pcp.shape_a < pcp.shape_b);
        assert!(
            pcp.contacts[0].is_persisted,
            "contact not persisted at step {step}"
        );
        assert!(
            pcp.contacts[0].solver_info.normal_impulse > 0.0,
            "no support impulse at step {step}"
        );
        // Invariant: warm-started impulses stay inside the friction cone
        for contact in pcp.active_contacts() {
            assert!(contact.solver_info.normal_impulse >= 0.0);
            assert!(
                contact.solver_info.tangent_impulse.abs()
                    <= pcp.friction * contact.solver_info.normal_impulse + 1e-5
            );
        }
    }
}

// ============================================================================
// Momentum conservation
// ============================================================================

/// Frictionless, restitution-1 head-on impact between identical disks:
/// linear momentum is preserved within solver tolerance.
#[test]
fn test_momentum_preserved_in_elastic_impact() {
    let mut space = Space::new();
    space.set_gravity(Vector2::ZERO);
    space.use_kill_bounds = false;

    let material = Material::new(1.0, 1.0, 0.0);
    let mut a = dynamic_body(Vector2::new(-1.2, 0.0), material);
    a.add_shape(Shape::circle(Vector2::ZERO, 1.0));
    a.set_linear_velocity(Vector2::new(3.0, 0.0));
    let mut b = dynamic_body(Vector2::new(1.2, 0.0), material);
    b.add_shape(Shape::circle(Vector2::ZERO, 1.0));
    b.set_linear_velocity(Vector2::new(-3.0, 0.0));

    let id_a = space.add_rigidbody(a).unwrap();
    let id_b = space.add_rigidbody(b).unwrap();

    let mass = space.body(id_a).unwrap().mass();
    let before = mass * 3.0 + mass * -3.0;

    run(&mut space, 30);

    let after = mass * space.body(id_a).unwrap().linear_velocity().x
        + mass * space.body(id_b).unwrap().linear_velocity().x;
    assert!(
        (after - before).abs() < 1e-3,
        "momentum drifted from {before} to {after}"
    );
    // The impact actually happened and reversed the motion
    assert!(space.body(id_a).unwrap().linear_velocity().x < 0.0);
    assert!(space.body(id_b).unwrap().linear_velocity().x > 0.0);
}

// ============================================================================
// Broad-phase algorithms agree end-to-end
// ============================================================================

#[test]
fn test_broadphase_algorithms_settle_identically() {
    use pivot2d::BroadPhaseAlg;

    let simulate = |alg: BroadPhaseAlg| -> Vector2 {
        let mut space = Space::new();
        space.set_broadphase(alg);
        space.set_gravity(Vector2::new(0.0, -10.0));
        space
            .add_rigidbody(static_ground(50.0, 1.0, Vector2::ZERO))
            .unwrap();
        let mut box_body = dynamic_body(Vector2::new(0.1, 3.0), Material::new(1.0, 0.0, 0.5));
        box_body.add_shape(Shape::rect(1.0, 1.0, Vector2::ZERO).unwrap());
        let id = space.add_rigidbody(box_body).unwrap();
        for _ in 0..240 {
            space.step(DT);
        }
        space.body(id).unwrap().position()
    };

    let brute = simulate(BroadPhaseAlg::BruteForce);
    let shg = simulate(BroadPhaseAlg::SpatialHashGrid);
    let bvh = simulate(BroadPhaseAlg::Bvh);

    assert!((brute.y - shg.y).abs() < 1e-4, "{brute:?} vs {shg:?}");
    assert!((brute.y - bvh.y).abs() < 1e-4, "{brute:?} vs {bvh:?}");
}

// ============================================================================
// Contact events
// ============================================================================

mod listener {
    use super::*;
    use pivot2d::{ContactEvent, ContactListener};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Counts {
        began: usize,
        persisted: usize,
        removed: usize,
    }

    struct Recorder(Rc<RefCell<Counts>>);

    impl ContactListener for Recorder {
        fn on_contact_began(&mut self, _event: &ContactEvent) {
            self.0.borrow_mut().began += 1;
        }
        fn on_contact_persisted(&mut self, _event: &ContactEvent) {
            self.0.borrow_mut().persisted += 1;
        }
        fn on_contact_removed(&mut self, _event: &ContactEvent) {
            self.0.borrow_mut().removed += 1;
        }
    }

    #[test]
    fn test_began_persisted_removed_lifecycle() {
        let counts = Rc::new(RefCell::new(Counts::default()));

        let mut space = Space::new();
        space.set_gravity(Vector2::ZERO);
        space.set_contact_listener(Box::new(Recorder(counts.clone())));

        // Overlapping disks drifting apart
        let mut a = dynamic_body(Vector2::new(0.0, 0.0), Material::BASIC);
        a.add_shape(Shape::circle(Vector2::ZERO, 1.0));
        a.set_linear_velocity(Vector2::new(-4.0, 0.0));
        let mut b = dynamic_body(Vector2::new(1.5, 0.0), Material::BASIC);
        b.add_shape(Shape::circle(Vector2::ZERO, 1.0));
        b.set_linear_velocity(Vector2::new(4.0, 0.0));
        space.add_rigidbody(a).unwrap();
        space.add_rigidbody(b).unwrap();

        space.step(DT);
        assert_eq!(counts.borrow().began, 1, "contact should begin on step 1");

        space.step(DT);
        assert!(counts.borrow().persisted >= 1, "contact should persist");

        // Let them separate fully
        for _ in 0..60 {
            space.step(DT);
        }
        assert_eq!(counts.borrow().removed, 1, "separation should fire removal");
        assert_eq!(space.contact_pairs().count(), 0);
    }
}

// ============================================================================
// Determinism across runs
// ============================================================================

#[test]
fn test_full_scene_determinism() {
    let simulate = || -> Vec<Vector2> {
        let mut space = Space::new();
        space.set_gravity(Vector2::new(0.0, -9.81));
        space
            .add_rigidbody(static_ground(60.0, 1.0, Vector2::ZERO))
            .unwrap();

        let mut ids = Vec::new();
        for i in 0..12 {
            let mut body = dynamic_body(
                Vector2::new((i % 4) as Float * 1.1 - 2.0, 2.0 + (i / 4) as Float * 1.2),
                Material::new(1.0, 0.2, 0.4),
            );
            if i % 2 == 0 {
                body.add_shape(Shape::rect(1.0, 1.0, Vector2::ZERO).unwrap());
            } else {
                body.add_shape(Shape::circle(Vector2::ZERO, 0.5));
            }
            ids.push(space.add_rigidbody(body).unwrap());
        }

        for _ in 0..180 {
            space.step(DT);
        }
        ids.iter()
            .map(|&id| space.body(id).unwrap().position())
            .collect()
    };

    assert_eq!(simulate(), simulate());
}
