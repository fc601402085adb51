//! Rigid Bodies
//!
//! A rigid body aggregates one or more shapes and carries motion state,
//! mass properties, material, collision filtering and force accumulators.
//! Mass, center of mass and moment of inertia are recomputed from the
//! attached shapes (uniform density) whenever a shape is added, unless the
//! caller overrides them.
//!
//! `position` is the world location of the center of mass; `origin` is the
//! world location of the body-local frame the shape vertices are expressed
//! in. The two are related by `origin = position - rotate(com, angle)`.

use crate::error::PhysicsError;
use crate::material::Material;
use crate::math::{powf, Aabb, Float, Transform2, Vector2};
use crate::shape::Shape;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Unique identifier of a body within a [`Space`](crate::space::Space).
pub type BodyId = u64;

/// Motion type of a rigid body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RigidBodyType {
    /// Never moves. Behaves as if it had infinite mass.
    #[default]
    Static,
    /// Fully simulated: affected by forces, gravity and collisions.
    Dynamic,
    /// Moved only by its user-set velocities; pushes dynamic bodies but
    /// is not affected by them.
    Kinematic,
}

/// Initializer for [`RigidBody::new`]. Can be reused for several bodies.
#[derive(Clone, Copy, Debug)]
pub struct RigidBodyInit {
    /// Motion type.
    pub body_type: RigidBodyType,
    /// Initial center-of-mass position.
    pub position: Vector2,
    /// Initial angle in radians.
    pub angle: Float,
    /// Initial linear velocity.
    pub linear_velocity: Vector2,
    /// Initial angular velocity.
    pub angular_velocity: Float,
    /// Surface material.
    pub material: Material,
}

impl Default for RigidBodyInit {
    fn default() -> Self {
        Self {
            body_type: RigidBodyType::Static,
            position: Vector2::ZERO,
            angle: 0.0,
            linear_velocity: Vector2::ZERO,
            angular_velocity: 0.0,
            material: Material::BASIC,
        }
    }
}

/// A rigid body in 2D space.
#[derive(Clone, Debug)]
pub struct RigidBody {
    pub(crate) id: BodyId,
    pub(crate) in_space: bool,

    body_type: RigidBodyType,

    position: Vector2,
    angle: Float,
    origin: Vector2,

    linear_velocity: Vector2,
    angular_velocity: Float,

    force: Vector2,
    torque: Float,

    mass: Float,
    inertia: Float,
    invmass: Float,
    invinertia: Float,
    com: Vector2,

    material: Material,

    linear_damping_scale: Float,
    angular_damping_scale: Float,
    gravity_scale: Float,

    shapes: Vec<Shape>,

    collision_enabled: bool,
    collision_group: u32,
    collision_category: u32,
    collision_mask: u32,

    pub(crate) cache_aabb: bool,
    pub(crate) cache_transform: bool,
    cached_aabb: Aabb,
}

impl RigidBody {
    /// Create a new body from an initializer. The body has no shapes and
    /// therefore no mass until [`RigidBody::add_shape`] is called.
    #[must_use]
    pub fn new(init: RigidBodyInit) -> Self {
        Self {
            id: 0,
            in_space: false,
            body_type: init.body_type,
            position: init.position,
            angle: init.angle,
            origin: init.position,
            linear_velocity: init.linear_velocity,
            angular_velocity: init.angular_velocity,
            force: Vector2::ZERO,
            torque: 0.0,
            mass: 0.0,
            inertia: 0.0,
            invmass: 0.0,
            invinertia: 0.0,
            com: Vector2::ZERO,
            material: init.material,
            linear_damping_scale: 1.0,
            angular_damping_scale: 1.0,
            gravity_scale: 1.0,
            shapes: Vec::new(),
            collision_enabled: true,
            collision_group: 0,
            collision_category: u32::MAX,
            collision_mask: u32::MAX,
            cache_aabb: false,
            cache_transform: false,
            cached_aabb: Aabb::default(),
        }
    }

    /// Unique id assigned when the body was added to a space.
    #[inline]
    #[must_use]
    pub fn id(&self) -> BodyId {
        self.id
    }

    /// Motion type.
    #[inline]
    #[must_use]
    pub fn body_type(&self) -> RigidBodyType {
        self.body_type
    }

    /// Change the motion type and refresh the inverse mass properties.
    pub fn set_body_type(&mut self, body_type: RigidBodyType) {
        self.body_type = body_type;
        self.update_inverses();
    }

    /// Center-of-mass world position.
    #[inline]
    #[must_use]
    pub fn position(&self) -> Vector2 {
        self.position
    }

    /// Teleport the center of mass. Prefer forces for dynamic bodies.
    pub fn set_position(&mut self, position: Vector2) {
        self.position = position;
        self.origin = position - self.com.rotated(self.angle);
        self.invalidate_caches();
    }

    /// Rotation angle in radians.
    #[inline]
    #[must_use]
    pub fn angle(&self) -> Float {
        self.angle
    }

    /// Set the rotation angle. Prefer torques for dynamic bodies.
    pub fn set_angle(&mut self, angle: Float) {
        self.angle = angle;
        self.origin = self.position - self.com.rotated(angle);
        self.invalidate_caches();
    }

    /// World location of the body-local frame origin.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> Vector2 {
        self.origin
    }

    /// Transform mapping body-local coordinates to world space.
    #[inline]
    #[must_use]
    pub fn transform(&self) -> Transform2 {
        Transform2::new(self.origin, self.angle)
    }

    /// Linear velocity.
    #[inline]
    #[must_use]
    pub fn linear_velocity(&self) -> Vector2 {
        self.linear_velocity
    }

    /// Set linear velocity, bypassing integration.
    #[inline]
    pub fn set_linear_velocity(&mut self, velocity: Vector2) {
        self.linear_velocity = velocity;
    }

    /// Angular velocity in radians per second.
    #[inline]
    #[must_use]
    pub fn angular_velocity(&self) -> Float {
        self.angular_velocity
    }

    /// Set angular velocity, bypassing integration.
    #[inline]
    pub fn set_angular_velocity(&mut self, velocity: Float) {
        self.angular_velocity = velocity;
    }

    /// Per-body scale on the space's linear damping. 1.0 leaves it as-is.
    #[inline]
    #[must_use]
    pub fn linear_damping_scale(&self) -> Float {
        self.linear_damping_scale
    }

    /// Set the linear damping scale.
    #[inline]
    pub fn set_linear_damping_scale(&mut self, scale: Float) {
        self.linear_damping_scale = scale;
    }

    /// Per-body scale on the space's angular damping.
    #[inline]
    #[must_use]
    pub fn angular_damping_scale(&self) -> Float {
        self.angular_damping_scale
    }

    /// Set the angular damping scale.
    #[inline]
    pub fn set_angular_damping_scale(&mut self, scale: Float) {
        self.angular_damping_scale = scale;
    }

    /// Per-body scale on the space's gravity. 1.0 means full gravity.
    #[inline]
    #[must_use]
    pub fn gravity_scale(&self) -> Float {
        self.gravity_scale
    }

    /// Set the gravity scale.
    #[inline]
    pub fn set_gravity_scale(&mut self, scale: Float) {
        self.gravity_scale = scale;
    }

    /// Surface material.
    #[inline]
    #[must_use]
    pub fn material(&self) -> Material {
        self.material
    }

    /// Change the material and recompute mass from the new density.
    pub fn set_material(&mut self, material: Material) {
        self.material = material;
        self.calculate_mass();
    }

    /// Mass in kilograms. Zero for static bodies and shapeless bodies.
    #[inline]
    #[must_use]
    pub fn mass(&self) -> Float {
        self.mass
    }

    /// Override the mass computed from shapes.
    ///
    /// The inertia is rescaled to preserve the mass distribution. Fails
    /// with [`PhysicsError::InvalidArgument`] for a non-positive mass on
    /// a dynamic body.
    pub fn set_mass(&mut self, mass: Float) -> Result<(), PhysicsError> {
        if self.body_type == RigidBodyType::Dynamic && mass <= 0.0 {
            return Err(PhysicsError::InvalidArgument {
                reason: "dynamic body mass must be positive",
            });
        }
        if self.mass > 0.0 {
            self.inertia *= mass / self.mass;
        }
        self.mass = mass;
        self.update_inverses();
        Ok(())
    }

    /// Moment of inertia about the center of mass.
    #[inline]
    #[must_use]
    pub fn inertia(&self) -> Float {
        self.inertia
    }

    /// Override the inertia computed from shapes. Zero disables rotation.
    pub fn set_inertia(&mut self, inertia: Float) {
        self.inertia = inertia;
        self.update_inverses();
    }

    /// Inverse mass; zero for static, kinematic and shapeless bodies.
    #[inline]
    #[must_use]
    pub fn invmass(&self) -> Float {
        self.invmass
    }

    /// Inverse inertia; zero for static and kinematic bodies.
    #[inline]
    #[must_use]
    pub fn invinertia(&self) -> Float {
        self.invinertia
    }

    /// Body-local centroid of the attached shapes.
    #[inline]
    #[must_use]
    pub fn com(&self) -> Vector2 {
        self.com
    }

    /// Attached shapes, in insertion order.
    #[inline]
    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Mutable access to the attached shapes (used by the collision
    /// pipeline to refresh world-vertex caches).
    #[inline]
    pub(crate) fn shapes_mut(&mut self) -> &mut [Shape] {
        &mut self.shapes
    }

    /// Attach a shape and recompute mass, inertia and center of mass from
    /// the union of all shapes at uniform density.
    ///
    /// The body origin stays fixed; the center of mass (and therefore
    /// `position`) moves to the new centroid.
    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
        self.calculate_mass();
        self.invalidate_caches();
    }

    /// Whether this body participates in collision detection at all.
    #[inline]
    #[must_use]
    pub fn collision_enabled(&self) -> bool {
        self.collision_enabled
    }

    /// Enable collision detection for this body.
    #[inline]
    pub fn enable_collisions(&mut self) {
        self.collision_enabled = true;
    }

    /// Disable collision detection for this body entirely.
    #[inline]
    pub fn disable_collisions(&mut self) {
        self.collision_enabled = false;
    }

    /// Collision group. Bodies sharing the same non-zero group never
    /// collide.
    #[inline]
    #[must_use]
    pub fn collision_group(&self) -> u32 {
        self.collision_group
    }

    /// Set the collision group.
    #[inline]
    pub fn set_collision_group(&mut self, group: u32) {
        self.collision_group = group;
    }

    /// Category bitmask of this body.
    #[inline]
    #[must_use]
    pub fn collision_category(&self) -> u32 {
        self.collision_category
    }

    /// Set the category bitmask.
    #[inline]
    pub fn set_collision_category(&mut self, category: u32) {
        self.collision_category = category;
    }

    /// Mask of categories this body collides with.
    #[inline]
    #[must_use]
    pub fn collision_mask(&self) -> u32 {
        self.collision_mask
    }

    /// Set the collision mask. A mask of 0 never collides.
    #[inline]
    pub fn set_collision_mask(&mut self, mask: u32) {
        self.collision_mask = mask;
    }

    /// Accumulate a force through the center of mass.
    pub fn apply_force(&mut self, force: Vector2) {
        if self.body_type != RigidBodyType::Dynamic {
            return;
        }
        self.force += force;
    }

    /// Accumulate a force at a point given relative to the center of mass
    /// in world orientation, producing torque as well.
    pub fn apply_force_at(&mut self, force: Vector2, point: Vector2) {
        if self.body_type != RigidBodyType::Dynamic {
            return;
        }
        self.force += force;
        self.torque += point.cross(force);
    }

    /// Accumulate a pure torque.
    pub fn apply_torque(&mut self, torque: Float) {
        if self.body_type != RigidBodyType::Dynamic {
            return;
        }
        self.torque += torque;
    }

    /// Apply an impulse at a point relative to the center of mass,
    /// changing velocities immediately.
    pub fn apply_impulse(&mut self, impulse: Vector2, point: Vector2) {
        if self.body_type != RigidBodyType::Dynamic {
            return;
        }
        self.linear_velocity += impulse * self.invmass;
        self.angular_velocity += self.invinertia * point.cross(impulse);
    }

    /// Zero all velocities and pending forces.
    pub fn reset_velocities(&mut self) {
        self.linear_velocity = Vector2::ZERO;
        self.angular_velocity = 0.0;
        self.force = Vector2::ZERO;
        self.torque = 0.0;
    }

    /// World AABB enclosing every attached shape. Cached until the body
    /// moves.
    pub fn aabb(&mut self) -> Aabb {
        if self.cache_aabb {
            return self.cached_aabb;
        }

        let xform = Transform2::new(self.origin, self.angle);
        let mut merged: Option<Aabb> = None;
        for shape in &mut self.shapes {
            let shape_aabb = shape.aabb(xform);
            merged = Some(match merged {
                Some(aabb) => aabb.merge(shape_aabb),
                None => shape_aabb,
            });
        }

        let aabb = merged.unwrap_or(Aabb::new(
            self.position.x,
            self.position.y,
            self.position.x,
            self.position.y,
        ));
        self.cached_aabb = aabb;
        self.cache_aabb = true;
        aabb
    }

    /// Translational kinetic energy, `0.5 * m * |v|^2`, in joules.
    #[must_use]
    pub fn kinetic_energy(&self) -> Float {
        0.5 * self.mass * self.linear_velocity.length_squared()
    }

    /// Rotational kinetic energy, `0.5 * I * w^2`, in joules.
    #[must_use]
    pub fn rotational_energy(&self) -> Float {
        0.5 * self.inertia * self.angular_velocity * self.angular_velocity
    }

    /// Integrate applied forces and gravity into velocities, apply
    /// damping, then clear the accumulators. No-op for non-dynamic bodies.
    pub fn integrate_accelerations(
        &mut self,
        gravity: Vector2,
        linear_damping: Float,
        angular_damping: Float,
        dt: Float,
    ) {
        if self.body_type != RigidBodyType::Dynamic {
            return;
        }

        self.linear_velocity +=
            (self.force * self.invmass + gravity * self.gravity_scale) * dt;
        self.angular_velocity += self.invinertia * self.torque * dt;

        self.linear_velocity = self.linear_velocity
            * powf(1.0 - linear_damping, dt * self.linear_damping_scale);
        self.angular_velocity *=
            powf(1.0 - angular_damping, dt * self.angular_damping_scale);

        self.force = Vector2::ZERO;
        self.torque = 0.0;
    }

    /// Integrate velocities into the pose and refresh `origin`. Static
    /// bodies never move.
    pub fn integrate_velocities(&mut self, dt: Float) {
        if self.body_type == RigidBodyType::Static {
            return;
        }

        self.position += self.linear_velocity * dt;
        self.angle += self.angular_velocity * dt;
        self.origin = self.position - self.com.rotated(self.angle);
        self.invalidate_caches();
    }

    pub(crate) fn invalidate_caches(&mut self) {
        self.cache_aabb = false;
        self.cache_transform = false;
    }

    /// Nudge the pose directly during NGS position correction,
    /// bypassing velocities.
    pub(crate) fn apply_position_correction(&mut self, delta: Vector2, delta_angle: Float) {
        if self.body_type != RigidBodyType::Dynamic {
            return;
        }
        self.position += delta;
        self.angle += delta_angle;
        self.origin = self.position - self.com.rotated(self.angle);
        self.invalidate_caches();
    }

    /// Recompute mass, inertia and center of mass from the attached
    /// shapes, keeping the body origin fixed.
    fn calculate_mass(&mut self) {
        let density = self.material.density;
        let mut mass = 0.0;
        let mut weighted_centroid = Vector2::ZERO;
        let mut inertia_about_origin = 0.0;

        for shape in &self.shapes {
            let (m, centroid, i_origin) = shape.mass_properties(density);
            mass += m;
            weighted_centroid += centroid * m;
            inertia_about_origin += i_origin;
        }

        if mass > 0.0 {
            self.com = weighted_centroid / mass;
            // Parallel axis: shift the summed origin moment to the COM
            self.inertia = inertia_about_origin - mass * self.com.length_squared();
        } else {
            self.com = Vector2::ZERO;
            self.inertia = 0.0;
        }
        self.mass = mass;

        self.position = self.origin + self.com.rotated(self.angle);
        self.update_inverses();
    }

    fn update_inverses(&mut self) {
        if self.body_type == RigidBodyType::Dynamic {
            self.invmass = if self.mass > 0.0 { 1.0 / self.mass } else { 0.0 };
            self.invinertia = if self.inertia > 0.0 {
                1.0 / self.inertia
            } else {
                0.0
            };
        } else {
            self.invmass = 0.0;
            self.invinertia = 0.0;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
