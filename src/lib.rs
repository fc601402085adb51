//! pivot2d: Deterministic 2D Rigid-Body Physics Engine
//!
//! A simulation core built around a [`Space`] that advances bodies,
//! shapes and constraints under gravity and contact interactions through
//! a fixed-substep pipeline: broad-phase pair generation, narrow-phase
//! contact manifolds persisted across steps, sequential-impulse solving
//! with warm-starting and Baumgarte (or NGS) stabilization, and
//! symplectic integration.
//!
//! # Features
//!
//! - **Persistent contacts**: manifolds matched across steps by feature
//!   id carry accumulated impulses for warm-starting
//! - **Sequential impulses**: iterative velocity solver with accumulated
//!   clamping for contacts, friction and joints
//! - **Three broad-phases**: brute force, spatial hash grid, and BVH
//!   behind one contract
//! - **Joint constraints**: distance, spring, hinge with limits, and a
//!   spline follower
//! - **Configurable precision**: `f32` scalars by default, `f64` with
//!   the `f64` feature
//! - **`no_std` support**: disable default features and enable `libm`
//!
//! # Example
//!
//! ```
//! use pivot2d::{Material, RigidBody, RigidBodyInit, RigidBodyType, Shape, Space, Vector2};
//!
//! let mut space = Space::new();
//! space.set_gravity(Vector2::new(0.0, -9.81));
//!
//! let mut ball = RigidBody::new(RigidBodyInit {
//!     body_type: RigidBodyType::Dynamic,
//!     position: Vector2::new(0.0, 10.0),
//!     material: Material::RUBBER,
//!     ..Default::default()
//! });
//! ball.add_shape(Shape::circle(Vector2::ZERO, 0.5));
//! let ball_id = space.add_rigidbody(ball).unwrap();
//!
//! for _ in 0..60 {
//!     space.step(1.0 / 60.0);
//! }
//! assert!(space.body(ball_id).unwrap().position().y < 10.0);
//! ```
//!
//! # Determinism
//!
//! A step is deterministic for identical initial state and identical
//! platform floating-point behavior: bodies and constraints iterate in
//! insertion order, and the contact store is an ordered map keyed by
//! shape-id pairs, never a randomized hash table. The optional
//! `parallel` broad-phase re-sorts its pair list so even the threaded
//! sweep keeps a stable order.
//!
//! # Modules
//!
//! - [`math`]: scalar selection, vectors, transforms, AABBs
//! - [`shape`]: circle and convex polygon shapes
//! - [`material`]: surface materials and coefficient mixing
//! - [`body`]: rigid bodies, mass properties, integration
//! - [`broadphase`]: candidate pair generation
//! - [`contact`]: persistent contact manifolds
//! - [`constraint`]: distance, spring, hinge and spline joints
//! - [`settings`]: simulation tuning parameters
//! - [`event`]: contact lifecycle listener
//! - [`error`]: unified error type
//! - [`profiling`]: per-stage step timings
//! - [`space`]: the simulation container and step driver

#![warn(missing_docs)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod body;
pub mod broadphase;
mod collision;
pub mod constraint;
pub mod contact;
mod contact_solver;
pub mod error;
pub mod event;
pub mod material;
pub mod math;
mod narrowphase;
pub mod profiling;
pub mod settings;
pub mod shape;
pub mod space;

pub use body::{BodyId, RigidBody, RigidBodyInit, RigidBodyType};
pub use broadphase::BroadPhaseAlg;
pub use constraint::{
    Constraint, ConstraintId, ConstraintKind, DistanceJoint, HingeJoint, SplineJoint, SpringJoint,
};
pub use contact::{Contact, ContactKey, ContactSolverInfo, PersistentContactPair};
pub use error::PhysicsError;
pub use event::{ContactEvent, ContactListener};
pub use material::{CoefficientMix, Material};
pub use math::{Aabb, Float, Mat2, Transform2, Vector2};
pub use profiling::Profiler;
pub use settings::{ContactPositionCorrection, SpaceSettings};
pub use shape::{Shape, ShapeKind, POLYGON_MAX_VERTICES};
pub use space::{
    Space, GRAV_EARTH, GRAV_JUPITER, GRAV_MARS, GRAV_MOON, GRAV_SUN, GRAV_VOID,
};
