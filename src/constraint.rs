//! Joint Constraints
//!
//! Sequential-impulse constraints between two bodies (or a body and a
//! fixed world anchor): rigid distance joints, soft spring joints, hinges
//! with optional angle limits, and a spline follower that keeps an anchor
//! on a smooth curve through user control points.
//!
//! Each constraint exposes the same three hooks the step pipeline calls:
//! `presolve` (effective masses and bias terms), `warmstart` (re-apply
//! accumulated impulses) and `solve` (one velocity iteration).

use crate::body::{BodyId, RigidBody};
use crate::math::{Float, Mat2, Vector2, INF};
use crate::settings::SpaceSettings;

#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::collections::BTreeMap;

/// Unique identifier of a constraint within a
/// [`Space`](crate::space::Space).
pub type ConstraintId = u64;

/// Samples taken per spline segment when projecting the anchor onto the
/// curve.
const SPLINE_SAMPLES: usize = 24;

/// A joint constraint owned by a space.
#[derive(Clone, Debug)]
pub struct Constraint {
    pub(crate) id: ConstraintId,
    /// Joint payload.
    pub kind: ConstraintKind,
}

impl Constraint {
    /// Id assigned when the constraint was added to a space.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ConstraintId {
        self.id
    }

    /// Whether this constraint references the given body.
    #[must_use]
    pub fn references(&self, body: BodyId) -> bool {
        let (a, b) = match &self.kind {
            ConstraintKind::Distance(j) => (j.body_a, j.body_b),
            ConstraintKind::Spring(j) => (j.body_a, j.body_b),
            ConstraintKind::Hinge(j) => (j.body_a, j.body_b),
            ConstraintKind::Spline(j) => (j.body_a, None),
        };
        a == body || b == Some(body)
    }

    pub(crate) fn presolve(
        &mut self,
        bodies: &[RigidBody],
        index_of: &BTreeMap<BodyId, usize>,
        settings: &SpaceSettings,
        dt: Float,
        inv_dt: Float,
    ) {
        match &mut self.kind {
            ConstraintKind::Distance(j) => j.presolve(bodies, index_of, settings, dt, inv_dt),
            ConstraintKind::Spring(j) => j.presolve(bodies, index_of, dt),
            ConstraintKind::Hinge(j) => j.presolve(bodies, index_of, settings, inv_dt),
            ConstraintKind::Spline(j) => j.presolve(bodies, index_of, dt),
        }
    }

    pub(crate) fn warmstart(&mut self, bodies: &mut [RigidBody], settings: &SpaceSettings) {
        match &mut self.kind {
            ConstraintKind::Distance(j) => j.warmstart(bodies, settings),
            ConstraintKind::Spring(j) => j.warmstart(bodies, settings),
            ConstraintKind::Hinge(j) => j.warmstart(bodies, settings),
            ConstraintKind::Spline(j) => j.warmstart(bodies, settings),
        }
    }

    pub(crate) fn solve(&mut self, bodies: &mut [RigidBody]) {
        match &mut self.kind {
            ConstraintKind::Distance(j) => j.solve(bodies),
            ConstraintKind::Spring(j) => j.solve(bodies),
            ConstraintKind::Hinge(j) => j.solve(bodies),
            ConstraintKind::Spline(j) => j.solve(bodies),
        }
    }
}

/// Joint payload variants.
#[derive(Clone, Debug)]
pub enum ConstraintKind {
    /// Rigid distance joint.
    Distance(DistanceJoint),
    /// Soft distance joint with stiffness and damping.
    Spring(SpringJoint),
    /// Revolute joint pinning two anchors together, with optional angle
    /// limits.
    Hinge(HingeJoint),
    /// Soft constraint keeping an anchor on a spline curve.
    Spline(SplineJoint),
}

// ============================================================================
// Shared scratch
// ============================================================================

/// Per-step solver scratch for single-axis joints.
#[derive(Clone, Copy, Debug, Default)]
struct AxisScratch {
    index_a: usize,
    index_b: Option<usize>,
    r_a: Vector2,
    r_b: Vector2,
    axis: Vector2,
    position_error: Float,
    mass: Float,
    gamma: Float,
    bias_rate: Float,
    active: bool,
}

/// Resolve both body indices; returns `None` when a referenced body has
/// left the space (the constraint then sits out the step).
fn resolve_indices(
    body_a: BodyId,
    body_b: Option<BodyId>,
    index_of: &BTreeMap<BodyId, usize>,
) -> Option<(usize, Option<usize>)> {
    let index_a = *index_of.get(&body_a)?;
    match body_b {
        Some(id) => Some((index_a, Some(*index_of.get(&id)?))),
        None => Some((index_a, None)),
    }
}

/// Compute the axis scratch shared by distance-like joints: world
/// anchors, unit axis, position error and effective mass.
fn axis_presolve(
    bodies: &[RigidBody],
    index_a: usize,
    index_b: Option<usize>,
    anchor_a: Vector2,
    anchor_b: Vector2,
    rest_length: Float,
) -> AxisScratch {
    let a = &bodies[index_a];
    let r_a = anchor_a.rotated(a.angle());
    let world_a = a.position() + r_a;

    let (r_b, world_b, invmass_b, invinertia_b) = match index_b {
        Some(ib) => {
            let b = &bodies[ib];
            let r_b = anchor_b.rotated(b.angle());
            (r_b, b.position() + r_b, b.invmass(), b.invinertia())
        }
        None => (Vector2::ZERO, anchor_b, 0.0, 0.0),
    };

    let delta = world_b - world_a;
    let dist = delta.length();
    let axis = if dist == 0.0 {
        Vector2::UNIT_Y
    } else {
        delta / dist
    };

    let k = a.invmass()
        + invmass_b
        + a.invinertia() * r_a.cross(axis) * r_a.cross(axis)
        + invinertia_b * r_b.cross(axis) * r_b.cross(axis);

    AxisScratch {
        index_a,
        index_b,
        r_a,
        r_b,
        axis,
        position_error: dist - rest_length,
        mass: k,
        gamma: 0.0,
        bias_rate: 0.0,
        active: true,
    }
}

/// Apply `impulse` along the scratch axis: positive pulls B toward the
/// constraint direction, A the opposite way.
fn apply_axis_impulse(bodies: &mut [RigidBody], scratch: &AxisScratch, impulse: Float) {
    let p = scratch.axis * impulse;
    bodies[scratch.index_a].apply_impulse(-p, scratch.r_a);
    if let Some(index_b) = scratch.index_b {
        bodies[index_b].apply_impulse(p, scratch.r_b);
    }
}

/// Relative velocity of the two anchor points along the scratch axis.
fn axis_velocity(bodies: &[RigidBody], scratch: &AxisScratch) -> Float {
    let a = &bodies[scratch.index_a];
    let velocity_a =
        a.linear_velocity() + Vector2::cross_scalar(a.angular_velocity(), scratch.r_a);
    let velocity_b = match scratch.index_b {
        Some(ib) => {
            let b = &bodies[ib];
            b.linear_velocity() + Vector2::cross_scalar(b.angular_velocity(), scratch.r_b)
        }
        None => Vector2::ZERO,
    };
    (velocity_b - velocity_a).dot(scratch.axis)
}

/// One soft-constraint velocity iteration shared by every single-axis
/// joint: `lambda = -(Cdot + bias_rate * C + gamma * accum) / (K + gamma)`.
fn axis_solve(bodies: &mut [RigidBody], scratch: &AxisScratch, accumulated: &mut Float) {
    if !scratch.active || scratch.mass + scratch.gamma <= 0.0 {
        return;
    }
    let cdot = axis_velocity(bodies, scratch);
    let lambda = -(cdot + scratch.bias_rate * scratch.position_error + scratch.gamma * *accumulated)
        / (scratch.mass + scratch.gamma);
    *accumulated += lambda;
    apply_axis_impulse(bodies, scratch, lambda);
}

fn axis_warmstart(
    bodies: &mut [RigidBody],
    scratch: &AxisScratch,
    accumulated: &mut Float,
    settings: &SpaceSettings,
) {
    if !scratch.active {
        return;
    }
    if settings.warmstarting {
        apply_axis_impulse(bodies, scratch, *accumulated);
    } else {
        *accumulated = 0.0;
    }
}

// ============================================================================
// Distance joint
// ============================================================================

/// Rigid distance joint: keeps `|anchor_a - anchor_b| = length`, with
/// Baumgarte stabilization against drift.
#[derive(Clone, Debug)]
pub struct DistanceJoint {
    /// First body.
    pub body_a: BodyId,
    /// Second body, or `None` to anchor to a fixed world point.
    pub body_b: Option<BodyId>,
    /// Anchor on body A, local to its center of mass.
    pub anchor_a: Vector2,
    /// Anchor on body B local to its COM, or a world point when
    /// `body_b` is `None`.
    pub anchor_b: Vector2,
    /// Rest length in meters.
    pub length: Float,

    impulse: Float,
    scratch: AxisScratch,
}

impl DistanceJoint {
    /// Create a rigid distance joint.
    #[must_use]
    pub fn new(
        body_a: BodyId,
        body_b: Option<BodyId>,
        anchor_a: Vector2,
        anchor_b: Vector2,
        length: Float,
    ) -> Self {
        Self {
            body_a,
            body_b,
            anchor_a,
            anchor_b,
            length,
            impulse: 0.0,
            scratch: AxisScratch::default(),
        }
    }

    fn presolve(
        &mut self,
        bodies: &[RigidBody],
        index_of: &BTreeMap<BodyId, usize>,
        settings: &SpaceSettings,
        dt: Float,
        _inv_dt: Float,
    ) {
        let Some((index_a, index_b)) = resolve_indices(self.body_a, self.body_b, index_of) else {
            self.scratch.active = false;
            return;
        };
        self.scratch = axis_presolve(
            bodies,
            index_a,
            index_b,
            self.anchor_a,
            self.anchor_b,
            self.length,
        );
        self.scratch.bias_rate = settings.baumgarte / dt;
    }

    fn warmstart(&mut self, bodies: &mut [RigidBody], settings: &SpaceSettings) {
        axis_warmstart(bodies, &self.scratch, &mut self.impulse, settings);
    }

    fn solve(&mut self, bodies: &mut [RigidBody]) {
        axis_solve(bodies, &self.scratch, &mut self.impulse);
    }
}

// ============================================================================
// Spring joint
// ============================================================================

/// Soft distance joint with stiffness and damping, solved with the
/// soft-constraint parameters `beta = h*k / (d + h*k)` and
/// `gamma = 1 / ((d + h*k) * h)`.
#[derive(Clone, Debug)]
pub struct SpringJoint {
    /// First body.
    pub body_a: BodyId,
    /// Second body, or `None` to anchor to a fixed world point.
    pub body_b: Option<BodyId>,
    /// Anchor on body A, local to its center of mass.
    pub anchor_a: Vector2,
    /// Anchor on body B local to its COM, or a world point when
    /// `body_b` is `None`.
    pub anchor_b: Vector2,
    /// Rest length in meters.
    pub rest_length: Float,
    /// Spring stiffness (N/m).
    pub stiffness: Float,
    /// Damping coefficient.
    pub damping: Float,

    impulse: Float,
    scratch: AxisScratch,
}

impl SpringJoint {
    /// Create a spring joint.
    #[must_use]
    pub fn new(
        body_a: BodyId,
        body_b: Option<BodyId>,
        anchor_a: Vector2,
        anchor_b: Vector2,
        rest_length: Float,
        stiffness: Float,
        damping: Float,
    ) -> Self {
        Self {
            body_a,
            body_b,
            anchor_a,
            anchor_b,
            rest_length,
            stiffness,
            damping,
            impulse: 0.0,
            scratch: AxisScratch::default(),
        }
    }

    fn presolve(&mut self, bodies: &[RigidBody], index_of: &BTreeMap<BodyId, usize>, dt: Float) {
        let Some((index_a, index_b)) = resolve_indices(self.body_a, self.body_b, index_of) else {
            self.scratch.active = false;
            return;
        };
        self.scratch = axis_presolve(
            bodies,
            index_a,
            index_b,
            self.anchor_a,
            self.anchor_b,
            self.rest_length,
        );

        let soft = self.damping + dt * self.stiffness;
        if soft > 0.0 {
            let beta = dt * self.stiffness / soft;
            self.scratch.gamma = 1.0 / (soft * dt);
            self.scratch.bias_rate = beta / dt;
        }
    }

    fn warmstart(&mut self, bodies: &mut [RigidBody], settings: &SpaceSettings) {
        axis_warmstart(bodies, &self.scratch, &mut self.impulse, settings);
    }

    fn solve(&mut self, bodies: &mut [RigidBody]) {
        axis_solve(bodies, &self.scratch, &mut self.impulse);
    }
}

// ============================================================================
// Hinge joint
// ============================================================================

#[derive(Clone, Copy, Debug, Default)]
struct HingeScratch {
    index_a: usize,
    index_b: Option<usize>,
    r_a: Vector2,
    r_b: Vector2,
    k: Mat2,
    bias: Vector2,
    angular_mass: Float,
    lower_bias: Float,
    upper_bias: Float,
    active: bool,
}

/// Revolute joint: pins an anchor of body A to an anchor of body B (2-DoF
/// point constraint solved as a 2x2 block), with optional limits on the
/// relative angle.
#[derive(Clone, Debug)]
pub struct HingeJoint {
    /// First body.
    pub body_a: BodyId,
    /// Second body, or `None` to hinge against a fixed world point.
    pub body_b: Option<BodyId>,
    /// Anchor on body A, local to its center of mass.
    pub anchor_a: Vector2,
    /// Anchor on body B local to its COM, or a world point when
    /// `body_b` is `None`.
    pub anchor_b: Vector2,
    /// Relative angle treated as zero.
    pub reference_angle: Float,
    /// Whether the angle limits are enforced.
    pub limits_enabled: bool,
    /// Smallest allowed relative angle.
    pub lower_limit: Float,
    /// Largest allowed relative angle.
    pub upper_limit: Float,

    impulse: Vector2,
    lower_impulse: Float,
    upper_impulse: Float,
    scratch: HingeScratch,
}

impl HingeJoint {
    /// Create a hinge joint from COM-local anchors.
    #[must_use]
    pub fn new(
        body_a: BodyId,
        body_b: Option<BodyId>,
        anchor_a: Vector2,
        anchor_b: Vector2,
    ) -> Self {
        Self {
            body_a,
            body_b,
            anchor_a,
            anchor_b,
            reference_angle: 0.0,
            limits_enabled: false,
            lower_limit: 0.0,
            upper_limit: 0.0,
            impulse: Vector2::ZERO,
            lower_impulse: 0.0,
            upper_impulse: 0.0,
            scratch: HingeScratch::default(),
        }
    }

    /// Enable angle limits on the relative rotation.
    #[must_use]
    pub fn with_limits(mut self, lower: Float, upper: Float) -> Self {
        self.limits_enabled = true;
        self.lower_limit = lower;
        self.upper_limit = upper;
        self
    }

    fn presolve(
        &mut self,
        bodies: &[RigidBody],
        index_of: &BTreeMap<BodyId, usize>,
        settings: &SpaceSettings,
        inv_dt: Float,
    ) {
        let Some((index_a, index_b)) = resolve_indices(self.body_a, self.body_b, index_of) else {
            self.scratch.active = false;
            return;
        };

        let a = &bodies[index_a];
        let r_a = self.anchor_a.rotated(a.angle());
        let world_a = a.position() + r_a;

        let (r_b, world_b, invmass_b, invinertia_b, angle_b) = match index_b {
            Some(ib) => {
                let b = &bodies[ib];
                let r_b = self.anchor_b.rotated(b.angle());
                (
                    r_b,
                    b.position() + r_b,
                    b.invmass(),
                    b.invinertia(),
                    b.angle(),
                )
            }
            None => (Vector2::ZERO, self.anchor_b, 0.0, 0.0, 0.0),
        };

        // Effective mass block of the point constraint
        let im = a.invmass() + invmass_b;
        let ii_a = a.invinertia();
        let ii_b = invinertia_b;
        let k11 = im + ii_a * r_a.y * r_a.y + ii_b * r_b.y * r_b.y;
        let k12 = -ii_a * r_a.x * r_a.y - ii_b * r_b.x * r_b.y;
        let k22 = im + ii_a * r_a.x * r_a.x + ii_b * r_b.x * r_b.x;

        let angle = angle_b - a.angle() - self.reference_angle;
        self.scratch = HingeScratch {
            index_a,
            index_b,
            r_a,
            r_b,
            k: Mat2::from_columns(Vector2::new(k11, k12), Vector2::new(k12, k22)),
            bias: (world_b - world_a) * (settings.baumgarte * inv_dt),
            angular_mass: ii_a + ii_b,
            // Violations push back (Baumgarte-scaled); slack releases the
            // accumulated impulse so the limit never brakes inside range
            lower_bias: inv_dt
                * (settings.baumgarte * Float::min(0.0, angle - self.lower_limit)
                    + Float::max(0.0, angle - self.lower_limit)),
            upper_bias: inv_dt
                * (settings.baumgarte * Float::min(0.0, self.upper_limit - angle)
                    + Float::max(0.0, self.upper_limit - angle)),
            active: true,
        };
    }

    fn warmstart(&mut self, bodies: &mut [RigidBody], settings: &SpaceSettings) {
        if !self.scratch.active {
            return;
        }
        if !settings.warmstarting {
            self.impulse = Vector2::ZERO;
            self.lower_impulse = 0.0;
            self.upper_impulse = 0.0;
            return;
        }

        let axial = self.lower_impulse - self.upper_impulse;
        self.apply_point_impulse(bodies, self.impulse);
        self.apply_angular_impulse(bodies, axial);
    }

    fn solve(&mut self, bodies: &mut [RigidBody]) {
        if !self.scratch.active {
            return;
        }

        // Angle limits first so the point constraint dominates
        if self.limits_enabled && self.scratch.angular_mass > 0.0 {
            let mass = 1.0 / self.scratch.angular_mass;

            // Lower limit keeps angle - lower >= 0
            {
                let cdot = self.relative_angular_velocity(bodies);
                let lambda = -(cdot + self.scratch.lower_bias) * mass;
                let new_impulse = Float::max(0.0, self.lower_impulse + lambda);
                let delta = new_impulse - self.lower_impulse;
                self.lower_impulse = new_impulse;
                self.apply_angular_impulse(bodies, delta);
            }

            // Upper limit keeps upper - angle >= 0
            {
                let cdot = -self.relative_angular_velocity(bodies);
                let lambda = -(cdot + self.scratch.upper_bias) * mass;
                let new_impulse = Float::max(0.0, self.upper_impulse + lambda);
                let delta = new_impulse - self.upper_impulse;
                self.upper_impulse = new_impulse;
                self.apply_angular_impulse(bodies, -delta);
            }
        }

        // Point constraint: 2x2 block solve
        let cdot = self.relative_point_velocity(bodies);
        let lambda = self.scratch.k.solve(-(cdot + self.scratch.bias));
        self.impulse += lambda;
        self.apply_point_impulse(bodies, lambda);
    }

    fn relative_point_velocity(&self, bodies: &[RigidBody]) -> Vector2 {
        let a = &bodies[self.scratch.index_a];
        let velocity_a =
            a.linear_velocity() + Vector2::cross_scalar(a.angular_velocity(), self.scratch.r_a);
        let velocity_b = match self.scratch.index_b {
            Some(ib) => {
                let b = &bodies[ib];
                b.linear_velocity()
                    + Vector2::cross_scalar(b.angular_velocity(), self.scratch.r_b)
            }
            None => Vector2::ZERO,
        };
        velocity_b - velocity_a
    }

    fn relative_angular_velocity(&self, bodies: &[RigidBody]) -> Float {
        let w_a = bodies[self.scratch.index_a].angular_velocity();
        let w_b = match self.scratch.index_b {
            Some(ib) => bodies[ib].angular_velocity(),
            None => 0.0,
        };
        w_b - w_a
    }

    fn apply_point_impulse(&self, bodies: &mut [RigidBody], impulse: Vector2) {
        bodies[self.scratch.index_a].apply_impulse(-impulse, self.scratch.r_a);
        if let Some(ib) = self.scratch.index_b {
            bodies[ib].apply_impulse(impulse, self.scratch.r_b);
        }
    }

    fn apply_angular_impulse(&self, bodies: &mut [RigidBody], impulse: Float) {
        let a = &mut bodies[self.scratch.index_a];
        a.set_angular_velocity(a.angular_velocity() - a.invinertia() * impulse);
        if let Some(ib) = self.scratch.index_b {
            let b = &mut bodies[ib];
            b.set_angular_velocity(b.angular_velocity() + b.invinertia() * impulse);
        }
    }
}

// ============================================================================
// Spline joint
// ============================================================================

/// Soft constraint keeping a body anchor on a Catmull-Rom spline through
/// the given control points.
///
/// Every presolve projects the anchor to the nearest sampled curve
/// parameter, then the solver pulls the anchor toward that point like a
/// stiff spring.
#[derive(Clone, Debug)]
pub struct SplineJoint {
    /// Constrained body.
    pub body_a: BodyId,
    /// Anchor on the body, local to its center of mass.
    pub anchor_a: Vector2,
    /// Spring stiffness of the curve attraction.
    pub stiffness: Float,
    /// Damping coefficient of the curve attraction.
    pub damping: Float,

    control_points: Vec<Vector2>,
    impulse: Float,
    scratch: AxisScratch,
}

impl SplineJoint {
    /// Create a spline joint. The constraint stays inactive until at
    /// least four control points are set.
    #[must_use]
    pub fn new(body_a: BodyId, anchor_a: Vector2, stiffness: Float, damping: Float) -> Self {
        Self {
            body_a,
            anchor_a,
            stiffness,
            damping,
            control_points: Vec::new(),
            impulse: 0.0,
            scratch: AxisScratch::default(),
        }
    }

    /// Replace the curve's control points (world space).
    pub fn set_control_points(&mut self, points: &[Vector2]) {
        self.control_points.clear();
        self.control_points.extend_from_slice(points);
    }

    /// Current control points.
    #[must_use]
    pub fn control_points(&self) -> &[Vector2] {
        &self.control_points
    }

    /// Catmull-Rom evaluation on segment `(p1, p2)` with neighbors `p0`,
    /// `p3` at parameter `t` in `[0, 1]`.
    fn catmull_rom(p0: Vector2, p1: Vector2, p2: Vector2, p3: Vector2, t: Float) -> Vector2 {
        let t2 = t * t;
        let t3 = t2 * t;
        (p1 * 2.0
            + (p2 - p0) * t
            + (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * t2
            + (p3 - p0 + (p1 - p2) * 3.0) * t3)
            * 0.5
    }

    /// Nearest sampled point on the whole curve to `target`.
    fn nearest_point(&self, target: Vector2) -> Option<Vector2> {
        if self.control_points.len() < 4 {
            return None;
        }

        let mut best = self.control_points[1];
        let mut best_dist = INF;

        for segment in 0..self.control_points.len() - 3 {
            let p0 = self.control_points[segment];
            let p1 = self.control_points[segment + 1];
            let p2 = self.control_points[segment + 2];
            let p3 = self.control_points[segment + 3];

            for sample in 0..=SPLINE_SAMPLES {
                let t = sample as Float / SPLINE_SAMPLES as Float;
                let point = Self::catmull_rom(p0, p1, p2, p3, t);
                let dist = (point - target).length_squared();
                if dist < best_dist {
                    best_dist = dist;
                    best = point;
                }
            }
        }

        Some(best)
    }

    fn presolve(&mut self, bodies: &[RigidBody], index_of: &BTreeMap<BodyId, usize>, dt: Float) {
        let Some(&index_a) = index_of.get(&self.body_a) else {
            self.scratch.active = false;
            return;
        };

        let a = &bodies[index_a];
        let r_a = self.anchor_a.rotated(a.angle());
        let world_anchor = a.position() + r_a;

        let Some(target) = self.nearest_point(world_anchor) else {
            self.scratch.active = false;
            return;
        };

        // Soft zero-length distance constraint toward the curve point
        self.scratch = axis_presolve(bodies, index_a, None, self.anchor_a, target, 0.0);

        let soft = self.damping + dt * self.stiffness;
        if soft > 0.0 {
            let beta = dt * self.stiffness / soft;
            self.scratch.gamma = 1.0 / (soft * dt);
            self.scratch.bias_rate = beta / dt;
        }
    }

    fn warmstart(&mut self, bodies: &mut [RigidBody], settings: &SpaceSettings) {
        axis_warmstart(bodies, &self.scratch, &mut self.impulse, settings);
    }

    fn solve(&mut self, bodies: &mut [RigidBody]) {
        axis_solve(bodies, &self.scratch, &mut self.impulse);
    }
}

// ============================================================================
// Tests
// ============================================================================
