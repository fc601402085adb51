//! Contact Constraint Solver
//!
//! Sequential-impulse velocity solver for the persistent contact pairs:
//! presolve computes effective masses and the restitution/Baumgarte bias,
//! warmstart re-applies the previous step's accumulated impulses, and the
//! velocity solve clamps accumulated normal impulses to be repulsive and
//! friction impulses to the Coulomb cone.
//!
//! When NGS position correction is selected, penetration is resolved
//! after integration by re-colliding each pair and applying positional
//! pseudo-impulses directly to the poses.

use crate::body::RigidBody;
use crate::collision::collide;
use crate::contact::PersistentContactPair;
use crate::math::{clamp, Float, Vector2};
use crate::settings::{ContactPositionCorrection, SpaceSettings};
use crate::space::Space;

/// Borrow two distinct bodies mutably.
pub(crate) fn body_pair_mut(
    bodies: &mut [RigidBody],
    i: usize,
    j: usize,
) -> (&mut RigidBody, &mut RigidBody) {
    debug_assert!(i != j);
    if i < j {
        let (left, right) = bodies.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = bodies.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

/// Velocity of the contact point on `body` at offset `r` from its COM.
#[inline]
fn point_velocity(body: &RigidBody, r: Vector2) -> Vector2 {
    body.linear_velocity() + Vector2::cross_scalar(body.angular_velocity(), r)
}

/// Relative velocity of the contact point, B relative to A.
#[inline]
fn relative_velocity(a: &RigidBody, b: &RigidBody, r_a: Vector2, r_b: Vector2) -> Vector2 {
    point_velocity(b, r_b) - point_velocity(a, r_a)
}

// ============================================================================
// Presolve
// ============================================================================

pub(crate) fn presolve(space: &mut Space, inv_dt: Float) {
    let Space {
        bodies,
        contacts,
        settings,
        ..
    } = space;

    for pcp in contacts.values_mut() {
        if pcp.contact_count == 0 {
            continue;
        }
        let (a, b) = body_pair_mut(bodies, pcp.index_a, pcp.index_b);
        presolve_pair(pcp, a, b, settings, inv_dt);
    }
}

fn presolve_pair(
    pcp: &mut PersistentContactPair,
    a: &RigidBody,
    b: &RigidBody,
    settings: &SpaceSettings,
    inv_dt: Float,
) {
    let normal = pcp.normal;
    let tangent = normal.perp();
    let restitution = pcp.restitution;

    for contact in &mut pcp.contacts[..pcp.contact_count] {
        let r_a = contact.anchor_a;
        let r_b = contact.anchor_b;

        let kn = a.invmass()
            + b.invmass()
            + a.invinertia() * r_a.cross(normal) * r_a.cross(normal)
            + b.invinertia() * r_b.cross(normal) * r_b.cross(normal);
        contact.solver_info.normal_mass = if kn > 0.0 { 1.0 / kn } else { 0.0 };

        let kt = a.invmass()
            + b.invmass()
            + a.invinertia() * r_a.cross(tangent) * r_a.cross(tangent)
            + b.invinertia() * r_b.cross(tangent) * r_b.cross(tangent);
        contact.solver_info.tangent_mass = if kt > 0.0 { 1.0 / kt } else { 0.0 };

        // Restitution only for impacts faster than the threshold
        let vn = relative_velocity(a, b, r_a, r_b).dot(normal);
        let mut bias = -restitution * Float::min(0.0, vn + settings.restitution_threshold);

        if settings.contact_position_correction == ContactPositionCorrection::Baumgarte {
            bias += settings.baumgarte
                * inv_dt
                * Float::max(0.0, -contact.separation - settings.penetration_slop);
        }
        contact.solver_info.velocity_bias = bias;
    }
}

// ============================================================================
// Warmstart
// ============================================================================

pub(crate) fn warmstart(space: &mut Space) {
    let Space {
        bodies,
        contacts,
        settings,
        ..
    } = space;

    for pcp in contacts.values_mut() {
        if pcp.contact_count == 0 {
            continue;
        }
        let (a, b) = body_pair_mut(bodies, pcp.index_a, pcp.index_b);
        let normal = pcp.normal;
        let tangent = normal.perp();

        for contact in &mut pcp.contacts[..pcp.contact_count] {
            if settings.warmstarting && contact.is_persisted {
                let impulse = normal * contact.solver_info.normal_impulse
                    + tangent * contact.solver_info.tangent_impulse;
                a.apply_impulse(-impulse, contact.anchor_a);
                b.apply_impulse(impulse, contact.anchor_b);
            } else {
                contact.solver_info.normal_impulse = 0.0;
                contact.solver_info.tangent_impulse = 0.0;
            }
        }
    }
}

// ============================================================================
// Velocity solve
// ============================================================================

/// One velocity iteration over every contact: friction first against the
/// accumulated normal impulse, then the normal row.
pub(crate) fn solve_velocity(space: &mut Space) {
    let Space {
        bodies, contacts, ..
    } = space;

    for pcp in contacts.values_mut() {
        if pcp.contact_count == 0 {
            continue;
        }
        let (a, b) = body_pair_mut(bodies, pcp.index_a, pcp.index_b);
        let normal = pcp.normal;
        let tangent = normal.perp();
        let friction = pcp.friction;

        for contact in &mut pcp.contacts[..pcp.contact_count] {
            let r_a = contact.anchor_a;
            let r_b = contact.anchor_b;
            let info = &mut contact.solver_info;

            // Friction, clamped to the cone of the accumulated normal
            // impulse at the start of this iteration
            let vt = relative_velocity(a, b, r_a, r_b).dot(tangent);
            let lambda = -vt * info.tangent_mass;
            let max_friction = friction * info.normal_impulse;
            let new_tangent = clamp(
                info.tangent_impulse + lambda,
                -max_friction,
                max_friction,
            );
            let delta = new_tangent - info.tangent_impulse;
            info.tangent_impulse = new_tangent;

            let impulse = tangent * delta;
            a.apply_impulse(-impulse, r_a);
            b.apply_impulse(impulse, r_b);

            // Normal, accumulated impulse kept repulsive
            let vn = relative_velocity(a, b, r_a, r_b).dot(normal);
            let lambda = -(vn - info.velocity_bias) * info.normal_mass;
            let new_normal = Float::max(0.0, info.normal_impulse + lambda);
            let delta = new_normal - info.normal_impulse;
            info.normal_impulse = new_normal;

            let impulse = normal * delta;
            a.apply_impulse(-impulse, r_a);
            b.apply_impulse(impulse, r_b);
        }
    }
}

// ============================================================================
// NGS position solve
// ============================================================================

/// One NGS iteration: re-collide each pair and push the poses apart with
/// positional pseudo-impulses. Pairs with no contacts are skipped.
pub(crate) fn solve_position(space: &mut Space) {
    let Space {
        bodies,
        contacts,
        settings,
        ..
    } = space;

    for pcp in contacts.values_mut() {
        if pcp.contact_count == 0 {
            continue;
        }
        let (a, b) = body_pair_mut(bodies, pcp.index_a, pcp.index_b);

        let Some(shape_a) = a.shapes().iter().find(|s| s.id() == pcp.shape_a) else {
            continue;
        };
        let Some(shape_b) = b.shapes().iter().find(|s| s.id() == pcp.shape_b) else {
            continue;
        };

        let manifold = collide(shape_a, a.transform(), shape_b, b.transform());
        let normal = manifold.normal;

        for point in &manifold.points[..manifold.count] {
            let correction = clamp(
                settings.baumgarte * (point.separation + settings.penetration_slop),
                -settings.max_linear_correction,
                0.0,
            );
            if correction == 0.0 {
                continue;
            }

            let r_a = point.position - a.position();
            let r_b = point.position - b.position();

            let k = a.invmass()
                + b.invmass()
                + a.invinertia() * r_a.cross(normal) * r_a.cross(normal)
                + b.invinertia() * r_b.cross(normal) * r_b.cross(normal);
            if k <= 0.0 {
                continue;
            }

            let impulse = normal * (-correction / k);
            a.apply_position_correction(-impulse * a.invmass(), -a.invinertia() * r_a.cross(impulse));
            b.apply_position_correction(impulse * b.invmass(), b.invinertia() * r_b.cross(impulse));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::body::{RigidBodyInit, RigidBodyType};
    use crate::broadphase;
    use crate::narrowphase;
    use crate::shape::Shape;

    fn collision_pass(space: &mut Space) {
        broadphase::brute_force(space);
        narrowphase::narrow_phase(space);
    }

    fn moving_circle(x: Float, vx: Float) -> crate::body::RigidBody {
        let mut body = crate::body::RigidBody::new(RigidBodyInit {
            body_type: RigidBodyType::Dynamic,
            position: Vector2::new(x, 0.0),
            linear_velocity: Vector2::new(vx, 0.0),
            ..Default::default()
        });
        body.add_shape(Shape::circle(Vector2::ZERO, 1.0));
        body
    }

    #[test]
    fn test_body_pair_mut_both_orders() {
        let mut bodies = [
            moving_circle(0.0, 0.0),
            moving_circle(5.0, 0.0),
            moving_circle(10.0, 0.0),
        ];
        let (a, b) = body_pair_mut(&mut bodies, 0, 2);
        assert_eq!(a.position().x, 0.0);
        assert_eq!(b.position().x, 10.0);

        let (a, b) = body_pair_mut(&mut bodies, 2, 0);
        assert_eq!(a.position().x, 10.0);
        assert_eq!(b.position().x, 0.0);
    }

    #[test]
    fn test_presolve_computes_masses_and_bias() {
        let mut space = Space::new();
        space.add_rigidbody(moving_circle(0.0, 1.0)).unwrap();
        space.add_rigidbody(moving_circle(1.5, -1.0)).unwrap();
        collision_pass(&mut space);
        presolve(&mut space, 60.0);

        let pcp = space.contacts.values().next().unwrap();
        let info = &pcp.contacts[0].solver_info;
        // Two unit-density circles of radius 1: m = pi each, kn = 2/pi
        assert!((info.normal_mass - crate::math::PI / 2.0).abs() < 1e-4);
        assert!(info.tangent_mass > 0.0);
        // Penetration of 0.5 with slop 0.05 gives a Baumgarte push
        assert!(info.velocity_bias > 0.0);
    }

    #[test]
    fn test_velocity_solve_stops_approach() {
        let mut space = Space::new();
        space.add_rigidbody(moving_circle(0.0, 1.0)).unwrap();
        space.add_rigidbody(moving_circle(1.5, -1.0)).unwrap();
        collision_pass(&mut space);
        presolve(&mut space, 60.0);
        warmstart(&mut space);
        for _ in 0..8 {
            solve_velocity(&mut space);
        }

        // The bodies must no longer be approaching each other
        let va = space.bodies[0].linear_velocity().x;
        let vb = space.bodies[1].linear_velocity().x;
        assert!(vb >= va - 1e-4);

        // Accumulated impulses respect their clamps
        let pcp = space.contacts.values().next().unwrap();
        let info = &pcp.contacts[0].solver_info;
        assert!(info.normal_impulse >= 0.0);
        assert!(info.tangent_impulse.abs() <= pcp.friction * info.normal_impulse + 1e-6);
    }

    #[test]
    fn test_momentum_conserved_head_on() {
        let mut space = Space::new();
        space.set_gravity(Vector2::ZERO);
        space.add_rigidbody(moving_circle(0.0, 2.0)).unwrap();
        space.add_rigidbody(moving_circle(1.5, -2.0)).unwrap();
        collision_pass(&mut space);
        presolve(&mut space, 60.0);
        warmstart(&mut space);
        for _ in 0..8 {
            solve_velocity(&mut space);
        }

        let mass = crate::math::PI;
        let momentum = space.bodies[0].linear_velocity().x * mass
            + space.bodies[1].linear_velocity().x * mass;
        assert!(momentum.abs() < 1e-3);
    }

    #[test]
    fn test_warmstart_disabled_zeroes_accumulators() {
        let mut space = Space::new();
        space.settings.warmstarting = false;
        space.add_rigidbody(moving_circle(0.0, 1.0)).unwrap();
        space.add_rigidbody(moving_circle(1.5, -1.0)).unwrap();
        collision_pass(&mut space);

        {
            let pcp = space.contacts.values_mut().next().unwrap();
            pcp.contacts[0].solver_info.normal_impulse = 10.0;
        }
        warmstart(&mut space);
        let pcp = space.contacts.values().next().unwrap();
        assert_eq!(pcp.contacts[0].solver_info.normal_impulse, 0.0);
    }

    #[test]
    fn test_ngs_reduces_penetration() {
        let mut space = Space::new();
        space.settings.contact_position_correction = ContactPositionCorrection::Ngs;
        space.add_rigidbody(moving_circle(0.0, 0.0)).unwrap();
        space.add_rigidbody(moving_circle(1.0, 0.0)).unwrap();
        collision_pass(&mut space);

        let before = space.bodies[1].position().x - space.bodies[0].position().x;
        for _ in 0..8 {
            solve_position(&mut space);
        }
        let after = space.bodies[1].position().x - space.bodies[0].position().x;
        assert!(after > before, "penetration did not shrink: {} -> {}", before, after);
    }
}
