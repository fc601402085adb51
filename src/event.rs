//! Contact Events
//!
//! The space reports contact lifecycle transitions to a user-installed
//! [`ContactListener`]: a contact began (new penetrating pair), persisted
//! (matched to the previous step by feature id) or was removed (the pair's
//! AABBs separated, or a body left the space).
//!
//! Listeners observe intermediate state between pipeline phases. They hold
//! their own state and must not attempt to mutate the space; structural
//! changes belong after [`Space::step`](crate::space::Space::step) returns.

use crate::body::BodyId;
use crate::math::{Float, Vector2};

/// Snapshot describing one contact point transition.
#[derive(Clone, Copy, Debug)]
pub struct ContactEvent {
    /// Id of the body owning shape A.
    pub body_a: BodyId,
    /// Id of the body owning shape B.
    pub body_b: BodyId,
    /// Id of shape A (the smaller shape id of the pair).
    pub shape_a: u32,
    /// Id of shape B.
    pub shape_b: u32,
    /// Unit contact normal from A toward B.
    pub normal: Vector2,
    /// Signed separation; negative when penetrating.
    pub penetration: Float,
    /// World-space contact position.
    pub position: Vector2,
    /// Accumulated normal impulse at event time.
    pub normal_impulse: Float,
    /// Accumulated friction impulse at event time.
    pub friction_impulse: Float,
    /// Feature-pair id of the contact point.
    pub id: u32,
}

/// Receiver for contact lifecycle events.
///
/// All methods have empty default bodies so implementors only override
/// what they need.
pub trait ContactListener {
    /// A new penetrating contact pair was registered this step.
    fn on_contact_began(&mut self, event: &ContactEvent) {
        let _ = event;
    }

    /// A contact point survived from the previous step.
    fn on_contact_persisted(&mut self, event: &ContactEvent) {
        let _ = event;
    }

    /// A contact pair was removed.
    fn on_contact_removed(&mut self, event: &ContactEvent) {
        let _ = event;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    struct Counter {
        began: usize,
        removed: usize,
    }

    impl ContactListener for Counter {
        fn on_contact_began(&mut self, _event: &ContactEvent) {
            self.began += 1;
        }

        fn on_contact_removed(&mut self, _event: &ContactEvent) {
            self.removed += 1;
        }
    }

    #[test]
    fn test_default_methods_are_noops() {
        struct Silent;
        impl ContactListener for Silent {}

        let event = ContactEvent {
            body_a: 0,
            body_b: 1,
            shape_a: 0,
            shape_b: 1,
            normal: Vector2::UNIT_Y,
            penetration: -0.1,
            position: Vector2::ZERO,
            normal_impulse: 0.0,
            friction_impulse: 0.0,
            id: 0,
        };

        let mut listener = Silent;
        listener.on_contact_began(&event);
        listener.on_contact_persisted(&event);
        listener.on_contact_removed(&event);
    }

    #[test]
    fn test_listener_dispatch() {
        let event = ContactEvent {
            body_a: 0,
            body_b: 1,
            shape_a: 0,
            shape_b: 1,
            normal: Vector2::UNIT_Y,
            penetration: -0.1,
            position: Vector2::ZERO,
            normal_impulse: 0.0,
            friction_impulse: 0.0,
            id: 7,
        };

        let mut counter = Counter { began: 0, removed: 0 };
        counter.on_contact_began(&event);
        counter.on_contact_began(&event);
        counter.on_contact_removed(&event);
        assert_eq!(counter.began, 2);
        assert_eq!(counter.removed, 1);
    }
}
