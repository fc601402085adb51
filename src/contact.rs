//! Persistent Contact Manifolds
//!
//! A [`PersistentContactPair`] is the contact manifold between two shapes
//! plus the solver state that survives across steps. Contacts are matched
//! frame-to-frame by feature id so accumulated impulses can warm-start the
//! next solve.

use crate::body::BodyId;
use crate::math::{Float, Vector2};

/// Key of a persistent contact pair: the two shape ids, ordered so the
/// smaller id comes first.
pub type ContactKey = (u32, u32);

/// Accumulated impulses and effective masses of a single contact point.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContactSolverInfo {
    /// Accumulated impulse along the contact normal. Never negative.
    pub normal_impulse: Float,
    /// Accumulated impulse along the contact tangent.
    pub tangent_impulse: Float,
    /// Effective mass of the normal constraint row.
    pub normal_mass: Float,
    /// Effective mass of the tangent constraint row.
    pub tangent_mass: Float,
    /// Restitution (plus optional Baumgarte) bias velocity.
    pub velocity_bias: Float,
}

/// One contact point of a manifold.
#[derive(Clone, Copy, Debug, Default)]
pub struct Contact {
    /// Contact point relative to body A's center of mass, world-aligned.
    pub anchor_a: Vector2,
    /// Contact point relative to body B's center of mass, world-aligned.
    pub anchor_b: Vector2,
    /// Signed distance along the normal; negative when penetrating.
    pub separation: Float,
    /// Packed feature-pair id used to match contacts across steps.
    pub id: u32,
    /// Solver scratch state carried across steps for warm-starting.
    pub solver_info: ContactSolverInfo,
    /// Whether this contact was matched to one from the previous step.
    pub is_persisted: bool,
    /// Whether the removal event for this contact has already fired.
    pub remove_invoked: bool,
}

/// Persistent contact manifold between two shapes of two bodies.
///
/// At most two contact points. The normal is a unit vector pointing from
/// shape A toward shape B, where A is the shape with the smaller id.
#[derive(Clone, Copy, Debug)]
pub struct PersistentContactPair {
    /// Id of the first shape (`shape_a < shape_b`).
    pub shape_a: u32,
    /// Id of the second shape.
    pub shape_b: u32,
    /// Id of the body owning shape A.
    pub body_a: BodyId,
    /// Id of the body owning shape B.
    pub body_b: BodyId,
    /// Index of body A in the space's body list, refreshed every step.
    pub(crate) index_a: usize,
    /// Index of body B in the space's body list, refreshed every step.
    pub(crate) index_b: usize,
    /// Unit contact normal from A toward B.
    pub normal: Vector2,
    /// Number of active contact points (0, 1 or 2).
    pub contact_count: usize,
    /// Contact point storage.
    pub contacts: [Contact; 2],
    /// Mixed friction coefficient for this pair.
    pub friction: Float,
    /// Mixed restitution coefficient for this pair.
    pub restitution: Float,
}

impl PersistentContactPair {
    /// Map key for this pair.
    #[inline]
    #[must_use]
    pub fn key(&self) -> ContactKey {
        (self.shape_a, self.shape_b)
    }

    /// Whether any contact point is actually penetrating.
    #[must_use]
    pub fn penetrating(&self) -> bool {
        self.contacts[..self.contact_count]
            .iter()
            .any(|c| c.separation < 0.0)
    }

    /// Active contact points.
    #[inline]
    #[must_use]
    pub fn active_contacts(&self) -> &[Contact] {
        &self.contacts[..self.contact_count]
    }
}

// ============================================================================
// Tests
// ============================================================================
