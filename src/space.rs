//! Space — Simulation Container and Step Driver
//!
//! A [`Space`] owns every body, constraint and persistent contact, and
//! advances them through the fixed-substep pipeline: integrate
//! accelerations, broad-phase, narrow-phase, presolve and warm-start,
//! iterative velocity solving with contacts and joints interleaved,
//! velocity integration, and optional NGS position correction.
//!
//! Bodies and constraints are transferred into the space by value;
//! `remove_*` hands them back. Removal triggered inside a step (kill
//! bounds) is deferred to the end of the current substep.

use crate::body::{BodyId, RigidBody};
use crate::broadphase::{self, BroadPhaseAlg};
use crate::constraint::{Constraint, ConstraintId, ConstraintKind};
use crate::contact::{ContactKey, PersistentContactPair};
use crate::contact_solver;
use crate::error::PhysicsError;
use crate::event::{ContactEvent, ContactListener};
use crate::math::{Aabb, Float, Vector2};
use crate::narrowphase;
use crate::profiling::{Profiler, Stopwatch};
use crate::settings::{ContactPositionCorrection, SpaceSettings};

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::collections::BTreeMap;

/// Standard gravity of Earth in m/s^2.
pub const GRAV_EARTH: Float = 9.81;
/// Gravity of the Moon in m/s^2.
pub const GRAV_MOON: Float = 1.62;
/// Gravity of Mars in m/s^2.
pub const GRAV_MARS: Float = 3.7;
/// Gravity of Jupiter in m/s^2.
pub const GRAV_JUPITER: Float = 24.5;
/// Gravity at the surface of the Sun in m/s^2.
pub const GRAV_SUN: Float = 275.0;
/// Zero gravity.
pub const GRAV_VOID: Float = 0.0;

/// The simulation container.
pub struct Space {
    pub(crate) bodies: Vec<RigidBody>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) contacts: BTreeMap<ContactKey, PersistentContactPair>,
    pub(crate) broadphase_pairs: Vec<broadphase::BroadPhasePair>,
    pub(crate) listener: Option<Box<dyn ContactListener>>,

    /// Simulation settings, freely readable and writable.
    pub settings: SpaceSettings,
    /// Boundary outside which bodies are removed at the end of the
    /// substep, when `use_kill_bounds` is set.
    pub kill_bounds: Aabb,
    /// Whether the kill boundary is enforced. On by default.
    pub use_kill_bounds: bool,

    gravity: Vector2,
    broadphase_algorithm: BroadPhaseAlg,
    id_counter: u64,
    constraint_id_counter: u64,
    removal_queue: Vec<BodyId>,
    profiler: Profiler,
}

impl Space {
    /// Create an empty space with Earth gravity pointing down.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            constraints: Vec::new(),
            contacts: BTreeMap::new(),
            broadphase_pairs: Vec::new(),
            listener: None,
            settings: SpaceSettings::default(),
            kill_bounds: Aabb::new(-1e4, -1e4, 1e4, 1e4),
            use_kill_bounds: true,
            gravity: Vector2::new(0.0, -GRAV_EARTH),
            broadphase_algorithm: BroadPhaseAlg::BruteForce,
            id_counter: 0,
            constraint_id_counter: 0,
            removal_queue: Vec::new(),
            profiler: Profiler::default(),
        }
    }

    /// Global gravity vector.
    #[inline]
    #[must_use]
    pub fn gravity(&self) -> Vector2 {
        self.gravity
    }

    /// Set the global gravity vector.
    #[inline]
    pub fn set_gravity(&mut self, gravity: Vector2) {
        self.gravity = gravity;
    }

    /// Currently selected broad-phase algorithm.
    #[inline]
    #[must_use]
    pub fn broadphase(&self) -> BroadPhaseAlg {
        self.broadphase_algorithm
    }

    /// Select the broad-phase algorithm.
    #[inline]
    pub fn set_broadphase(&mut self, algorithm: BroadPhaseAlg) {
        self.broadphase_algorithm = algorithm;
    }

    /// Install the contact event listener, replacing any previous one.
    pub fn set_contact_listener(&mut self, listener: Box<dyn ContactListener>) {
        self.listener = Some(listener);
    }

    /// Remove and return the installed contact listener.
    pub fn take_contact_listener(&mut self) -> Option<Box<dyn ContactListener>> {
        self.listener.take()
    }

    /// Timings of the last step.
    #[inline]
    #[must_use]
    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }

    // ========================================================================
    // Bodies
    // ========================================================================

    /// Transfer a body into the space. Assigns and returns its id.
    ///
    /// Fails with [`PhysicsError::AlreadyAdded`] when given a body that
    /// still carries space residency (e.g. a clone of a body inside a
    /// space).
    pub fn add_rigidbody(&mut self, mut body: RigidBody) -> Result<BodyId, PhysicsError> {
        if body.in_space {
            return Err(PhysicsError::AlreadyAdded);
        }
        let id = self.id_counter;
        self.id_counter += 1;
        body.id = id;
        body.in_space = true;
        self.bodies.push(body);
        Ok(id)
    }

    /// Remove a body and hand ownership back to the caller.
    ///
    /// Persistent contacts involving the body are dropped (with removal
    /// events); constraints referencing it stay in the space but sit out
    /// the solve until re-pointed or removed.
    pub fn remove_rigidbody(&mut self, id: BodyId) -> Result<RigidBody, PhysicsError> {
        let index = self
            .bodies
            .iter()
            .position(|body| body.id() == id)
            .ok_or(PhysicsError::NotFound)?;

        self.prune_body_contacts(index);
        let mut body = self.bodies.remove(index);
        body.in_space = false;
        Ok(body)
    }

    /// Look up a body by id.
    #[must_use]
    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.iter().find(|body| body.id() == id)
    }

    /// Look up a body by id, mutably.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.iter_mut().find(|body| body.id() == id)
    }

    /// All bodies in insertion order.
    #[inline]
    #[must_use]
    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    /// All bodies in insertion order, mutably.
    #[inline]
    pub fn bodies_mut(&mut self) -> &mut [RigidBody] {
        &mut self.bodies
    }

    // ========================================================================
    // Constraints
    // ========================================================================

    /// Add a constraint to the space and return its id.
    pub fn add_constraint(&mut self, kind: ConstraintKind) -> ConstraintId {
        let id = self.constraint_id_counter;
        self.constraint_id_counter += 1;
        self.constraints.push(Constraint { id, kind });
        id
    }

    /// Remove a constraint and hand it back to the caller.
    pub fn remove_constraint(&mut self, id: ConstraintId) -> Result<Constraint, PhysicsError> {
        let index = self
            .constraints
            .iter()
            .position(|constraint| constraint.id() == id)
            .ok_or(PhysicsError::NotFound)?;
        Ok(self.constraints.remove(index))
    }

    /// Look up a constraint by id.
    #[must_use]
    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.id() == id)
    }

    /// Look up a constraint by id, mutably.
    pub fn constraint_mut(&mut self, id: ConstraintId) -> Option<&mut Constraint> {
        self.constraints.iter_mut().find(|c| c.id() == id)
    }

    /// All constraints in insertion order.
    #[inline]
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    // ========================================================================
    // Contacts
    // ========================================================================

    /// All persistent contact pairs, ordered by shape-pair key.
    pub fn contact_pairs(&self) -> impl Iterator<Item = &PersistentContactPair> {
        self.contacts.values()
    }

    /// Look up the persistent contact pair for two shape ids, in either
    /// order.
    #[must_use]
    pub fn contact_pair(&self, shape_a: u32, shape_b: u32) -> Option<&PersistentContactPair> {
        self.contacts.get(&broadphase::ordered_key(shape_a, shape_b))
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Empty every collection and reset the id counters.
    ///
    /// With `free_all` the owned objects are dropped and the returned
    /// vectors are empty; otherwise ownership of the bodies and
    /// constraints returns to the caller.
    pub fn clear(&mut self, free_all: bool) -> (Vec<RigidBody>, Vec<Constraint>) {
        self.contacts.clear();
        self.broadphase_pairs.clear();
        self.removal_queue.clear();
        self.id_counter = 0;
        self.constraint_id_counter = 0;

        let mut bodies = core::mem::take(&mut self.bodies);
        let constraints = core::mem::take(&mut self.constraints);

        for body in &mut bodies {
            body.in_space = false;
        }

        if free_all {
            (Vec::new(), Vec::new())
        } else {
            (bodies, constraints)
        }
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Advance the simulation by `dt` seconds.
    ///
    /// A zero `dt` or zero `settings.substeps` is a no-op. The step is
    /// deterministic for identical initial state on the same platform.
    pub fn step(&mut self, dt: Float) {
        if dt <= 0.0 || self.settings.substeps == 0 {
            return;
        }

        let step_watch = Stopwatch::start();
        self.profiler.reset();

        let substeps = self.settings.substeps;
        let velocity_iterations = self.settings.velocity_iterations;
        let position_iterations = self.settings.position_iterations;
        let h = dt / substeps as Float;
        let inv_h = 1.0 / h;

        for _ in 0..substeps {
            self.substep(h, inv_h, velocity_iterations, position_iterations);
        }

        self.profiler.step = step_watch.elapsed();
    }

    fn substep(
        &mut self,
        h: Float,
        inv_h: Float,
        velocity_iterations: u32,
        position_iterations: u32,
    ) {
        // Integrate accelerations and reset pose caches
        let watch = Stopwatch::start();
        let gravity = self.gravity;
        let linear_damping = self.settings.linear_damping;
        let angular_damping = self.settings.angular_damping;
        for body in &mut self.bodies {
            body.invalidate_caches();
            body.integrate_accelerations(gravity, linear_damping, angular_damping, h);
        }
        self.profiler.integrate_accelerations += watch.elapsed();

        // Broad phase
        let watch = Stopwatch::start();
        match self.broadphase_algorithm {
            BroadPhaseAlg::BruteForce => broadphase::brute_force(self),
            BroadPhaseAlg::SpatialHashGrid => broadphase::spatial_hash_grid(self),
            BroadPhaseAlg::Bvh => broadphase::bvh(self),
        }
        self.profiler.broadphase += watch.elapsed();

        // Narrow phase
        let watch = Stopwatch::start();
        narrowphase::narrow_phase(self);
        self.profiler.narrowphase += watch.elapsed();

        // Presolve and warm-start, joints first, then contacts
        let watch = Stopwatch::start();
        let index_of: BTreeMap<BodyId, usize> = self
            .bodies
            .iter()
            .enumerate()
            .map(|(index, body)| (body.id(), index))
            .collect();
        {
            let Space {
                bodies,
                constraints,
                settings,
                ..
            } = self;
            for constraint in constraints.iter_mut() {
                constraint.presolve(bodies, &index_of, settings, h, inv_h);
            }
            for constraint in constraints.iter_mut() {
                constraint.warmstart(bodies, settings);
            }
        }
        contact_solver::presolve(self, inv_h);
        contact_solver::warmstart(self);
        self.profiler.presolve += watch.elapsed();

        // Iterative velocity solve, joints and contacts interleaved
        let watch = Stopwatch::start();
        for _ in 0..velocity_iterations {
            {
                let Space {
                    bodies,
                    constraints,
                    ..
                } = self;
                for constraint in constraints.iter_mut() {
                    constraint.solve(bodies);
                }
            }
            contact_solver::solve_velocity(self);
        }
        self.profiler.solve_velocities += watch.elapsed();

        // Integrate velocities and collect out-of-bounds bodies
        let watch = Stopwatch::start();
        for body in &mut self.bodies {
            body.integrate_velocities(h);
        }
        if self.use_kill_bounds {
            let bounds = self.kill_bounds;
            let mut doomed: Vec<BodyId> = Vec::new();
            for body in &mut self.bodies {
                if !bounds.contains(body.aabb()) {
                    doomed.push(body.id());
                }
            }
            self.removal_queue.extend(doomed);
        }
        self.profiler.integrate_velocities += watch.elapsed();

        // NGS position correction
        if self.settings.contact_position_correction == ContactPositionCorrection::Ngs {
            let watch = Stopwatch::start();
            for _ in 0..position_iterations {
                contact_solver::solve_position(self);
            }
            self.profiler.solve_positions += watch.elapsed();
        }

        self.flush_removals();
    }

    fn flush_removals(&mut self) {
        if self.removal_queue.is_empty() {
            return;
        }
        let mut queue = core::mem::take(&mut self.removal_queue);
        queue.sort_unstable();
        queue.dedup();
        for id in queue {
            // Already-removed ids are fine to skip
            let _ = self.remove_rigidbody(id);
        }
    }

    /// Drop every persistent contact involving the body at `index`,
    /// emitting removal events for contacts that have not reported one.
    fn prune_body_contacts(&mut self, index: usize) {
        let ids: Vec<u32> = self.bodies[index]
            .shapes()
            .iter()
            .map(|shape| shape.id())
            .collect();
        let keys: Vec<ContactKey> = self
            .contacts
            .keys()
            .copied()
            .filter(|(a, b)| ids.contains(a) || ids.contains(b))
            .collect();

        let mut listener = self.listener.take();
        for key in keys {
            if let Some(mut pcp) = self.contacts.remove(&key) {
                if let Some(sink) = listener.as_deref_mut() {
                    let position_a = self
                        .bodies
                        .iter()
                        .find(|body| body.id() == pcp.body_a)
                        .map(|body| body.position())
                        .unwrap_or(Vector2::ZERO);
                    for contact in &mut pcp.contacts[..pcp.contact_count] {
                        if contact.remove_invoked {
                            continue;
                        }
                        sink.on_contact_removed(&ContactEvent {
                            body_a: pcp.body_a,
                            body_b: pcp.body_b,
                            shape_a: pcp.shape_a,
                            shape_b: pcp.shape_b,
                            normal: pcp.normal,
                            penetration: contact.separation,
                            position: position_a + contact.anchor_a,
                            normal_impulse: contact.solver_info.normal_impulse,
                            friction_impulse: contact.solver_info.tangent_impulse,
                            id: contact.id,
                        });
                        contact.remove_invoked = true;
                    }
                }
            }
        }
        self.listener = listener;
    }
}

impl Default for Space {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Space {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Space")
            .field("bodies", &self.bodies.len())
            .field("constraints", &self.constraints.len())
            .field("contacts", &self.contacts.len())
            .field("gravity", &self.gravity)
            .field("broadphase", &self.broadphase_algorithm)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::body::{RigidBodyInit, RigidBodyType};
    use crate::shape::Shape;

    fn dynamic_ball(x: Float, y: Float) -> RigidBody {
        let mut body = RigidBody::new(RigidBodyInit {
            body_type: RigidBodyType::Dynamic,
            position: Vector2::new(x, y),
            ..Default::default()
        });
        body.add_shape(Shape::circle(Vector2::ZERO, 1.0));
        body
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut space = Space::new();
        let a = space.add_rigidbody(dynamic_ball(0.0, 0.0)).unwrap();
        let b = space.add_rigidbody(dynamic_ball(5.0, 0.0)).unwrap();
        let c = space.add_rigidbody(dynamic_ball(10.0, 0.0)).unwrap();
        assert_eq!((a, b, c), (0, 1, 2));
    }

    #[test]
    fn test_add_remove_round_trip() {
        let mut space = Space::new();
        let id = space.add_rigidbody(dynamic_ball(0.0, 0.0)).unwrap();
        assert_eq!(space.bodies().len(), 1);

        let body = space.remove_rigidbody(id).unwrap();
        assert!(space.bodies().is_empty());

        // Re-adding the same body succeeds and gets a fresh id
        let new_id = space.add_rigidbody(body).unwrap();
        assert_ne!(new_id, id);
    }

    #[test]
    fn test_already_added_detected() {
        let mut space = Space::new();
        let id = space.add_rigidbody(dynamic_ball(0.0, 0.0)).unwrap();
        let clone = space.body(id).unwrap().clone();
        assert_eq!(space.add_rigidbody(clone), Err(PhysicsError::AlreadyAdded));
    }

    #[test]
    fn test_remove_missing_fails() {
        let mut space = Space::new();
        assert_eq!(
            space.remove_rigidbody(42).err(),
            Some(PhysicsError::NotFound)
        );
    }

    #[test]
    fn test_clear_resets_counter() {
        let mut space = Space::new();
        space.add_rigidbody(dynamic_ball(0.0, 0.0)).unwrap();
        space.add_rigidbody(dynamic_ball(5.0, 0.0)).unwrap();

        let (bodies, constraints) = space.clear(true);
        assert!(bodies.is_empty());
        assert!(constraints.is_empty());
        assert!(space.bodies().is_empty());
        assert_eq!(space.contact_pairs().count(), 0);

        let id = space.add_rigidbody(dynamic_ball(0.0, 0.0)).unwrap();
        assert_eq!(id, 0);
    }

    #[test]
    fn test_clear_without_freeing_returns_objects() {
        let mut space = Space::new();
        space.add_rigidbody(dynamic_ball(0.0, 0.0)).unwrap();
        let (bodies, _) = space.clear(false);
        assert_eq!(bodies.len(), 1);
        assert!(!bodies[0].in_space);
    }

    #[test]
    fn test_step_zero_dt_is_noop() {
        let mut space = Space::new();
        let id = space.add_rigidbody(dynamic_ball(0.0, 10.0)).unwrap();
        space.step(0.0);
        assert_eq!(space.body(id).unwrap().position(), Vector2::new(0.0, 10.0));
    }

    #[test]
    fn test_step_zero_substeps_is_noop() {
        let mut space = Space::new();
        space.settings.substeps = 0;
        let id = space.add_rigidbody(dynamic_ball(0.0, 10.0)).unwrap();
        space.step(1.0 / 60.0);
        assert_eq!(space.body(id).unwrap().position(), Vector2::new(0.0, 10.0));
    }

    #[test]
    fn test_gravity_accelerates_bodies() {
        let mut space = Space::new();
        space.set_gravity(Vector2::new(0.0, -10.0));
        let id = space.add_rigidbody(dynamic_ball(0.0, 100.0)).unwrap();
        space.step(1.0 / 60.0);
        let body = space.body(id).unwrap();
        assert!(body.linear_velocity().y < 0.0);
        assert!(body.position().y < 100.0);
    }

    #[test]
    fn test_kill_bounds_remove_escapees() {
        let mut space = Space::new();
        space.set_gravity(Vector2::ZERO);
        space.kill_bounds = Aabb::new(-10.0, -10.0, 10.0, 10.0);
        let runaway = {
            let mut body = dynamic_ball(0.0, 0.0);
            body.set_linear_velocity(Vector2::new(10_000.0, 0.0));
            body
        };
        let id = space.add_rigidbody(runaway).unwrap();
        space.step(1.0 / 60.0);
        assert!(space.body(id).is_none());
    }

    #[test]
    fn test_kill_bounds_disabled_keeps_bodies() {
        let mut space = Space::new();
        space.set_gravity(Vector2::ZERO);
        space.kill_bounds = Aabb::new(-10.0, -10.0, 10.0, 10.0);
        space.use_kill_bounds = false;
        let runaway = {
            let mut body = dynamic_ball(0.0, 0.0);
            body.set_linear_velocity(Vector2::new(10_000.0, 0.0));
            body
        };
        let id = space.add_rigidbody(runaway).unwrap();
        space.step(1.0 / 60.0);
        assert!(space.body(id).is_some());
    }

    #[test]
    fn test_constraint_add_remove() {
        let mut space = Space::new();
        let a = space.add_rigidbody(dynamic_ball(0.0, 0.0)).unwrap();
        let b = space.add_rigidbody(dynamic_ball(3.0, 0.0)).unwrap();

        let id = space.add_constraint(ConstraintKind::Distance(
            crate::constraint::DistanceJoint::new(a, Some(b), Vector2::ZERO, Vector2::ZERO, 2.0),
        ));
        assert_eq!(space.constraints().len(), 1);
        assert!(space.constraint(id).is_some());

        let removed = space.remove_constraint(id).unwrap();
        assert!(removed.references(a));
        assert!(space.constraints().is_empty());
        assert_eq!(
            space.remove_constraint(id).err(),
            Some(PhysicsError::NotFound)
        );
    }

    #[test]
    fn test_step_is_deterministic() {
        let simulate = || -> Vector2 {
            let mut space = Space::new();
            space.set_gravity(Vector2::new(0.0, -9.81));
            let mut ground = RigidBody::new(RigidBodyInit::default());
            ground.add_shape(Shape::rect(50.0, 1.0, Vector2::ZERO).unwrap());
            space.add_rigidbody(ground).unwrap();

            let mut stack_ids = Vec::new();
            for row in 0..4 {
                let mut body = RigidBody::new(RigidBodyInit {
                    body_type: RigidBodyType::Dynamic,
                    position: Vector2::new(0.01 * row as Float, 1.0 + 1.05 * row as Float),
                    ..Default::default()
                });
                body.add_shape(Shape::rect(1.0, 1.0, Vector2::ZERO).unwrap());
                stack_ids.push(space.add_rigidbody(body).unwrap());
            }

            for _ in 0..120 {
                space.step(1.0 / 60.0);
            }
            space.body(stack_ids[3]).unwrap().position()
        };

        let first = simulate();
        let second = simulate();
        assert_eq!(first, second);
    }

    #[test]
    fn test_static_bodies_unmoved_after_step() {
        let mut space = Space::new();
        let mut ground = RigidBody::new(RigidBodyInit::default());
        ground.add_shape(Shape::rect(50.0, 1.0, Vector2::ZERO).unwrap());
        let ground_id = space.add_rigidbody(ground).unwrap();
        space.add_rigidbody(dynamic_ball(0.0, 1.4)).unwrap();

        for _ in 0..60 {
            space.step(1.0 / 60.0);
        }

        let ground = space.body(ground_id).unwrap();
        assert_eq!(ground.position(), Vector2::ZERO);
        assert_eq!(ground.linear_velocity(), Vector2::ZERO);
    }

    #[test]
    fn test_removing_body_drops_its_contacts() {
        let mut space = Space::new();
        space.set_gravity(Vector2::ZERO);
        let a = space.add_rigidbody(dynamic_ball(0.0, 0.0)).unwrap();
        space.add_rigidbody(dynamic_ball(1.5, 0.0)).unwrap();
        space.step(1.0 / 60.0);
        assert_eq!(space.contact_pairs().count(), 1);

        space.remove_rigidbody(a).unwrap();
        assert_eq!(space.contact_pairs().count(), 0);
    }
}
