//! Narrow Phase
//!
//! Runs the collision routines for every broad-phase pair, expresses the
//! resulting contact anchors relative to each body's center of mass, and
//! updates the persistent contact store. New contacts are matched to the
//! previous step's contacts by feature id; matched contacts keep their
//! accumulated impulses so the solver can warm-start.

use crate::collision::collide;
use crate::contact::{Contact, ContactSolverInfo, PersistentContactPair};
use crate::event::{ContactEvent, ContactListener};
use crate::material::mix_coefficients;
use crate::math::Vector2;
use crate::space::Space;

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;

pub(crate) fn narrow_phase(space: &mut Space) {
    let mut listener = space.listener.take();

    for pair_index in 0..space.broadphase_pairs.len() {
        let pair = space.broadphase_pairs[pair_index];
        let shapes_a = space.bodies[pair.a].shapes().len();
        let shapes_b = space.bodies[pair.b].shapes().len();

        for shape_a in 0..shapes_a {
            for shape_b in 0..shapes_b {
                process_shape_pair(space, &mut listener, pair.a, pair.b, shape_a, shape_b);
            }
        }
    }

    space.listener = listener;
}

/// Collide one shape pair and merge the result into the contact store.
///
/// Shapes are ordered by id so the stored pair always satisfies
/// `shape_a.id < shape_b.id` regardless of body order.
fn process_shape_pair(
    space: &mut Space,
    listener: &mut Option<Box<dyn ContactListener>>,
    body_a: usize,
    body_b: usize,
    shape_a: usize,
    shape_b: usize,
) {
    let id_a = space.bodies[body_a].shapes()[shape_a].id();
    let id_b = space.bodies[body_b].shapes()[shape_b].id();

    let ((i1, s1), (i2, s2)) = if id_a < id_b {
        ((body_a, shape_a), (body_b, shape_b))
    } else {
        ((body_b, shape_b), (body_a, shape_a))
    };

    let manifold = {
        let first = &space.bodies[i1];
        let second = &space.bodies[i2];
        collide(
            &first.shapes()[s1],
            first.transform(),
            &second.shapes()[s2],
            second.transform(),
        )
    };

    let position_a = space.bodies[i1].position();
    let position_b = space.bodies[i2].position();
    let material_a = space.bodies[i1].material();
    let material_b = space.bodies[i2].material();

    let mut pcp = PersistentContactPair {
        shape_a: space.bodies[i1].shapes()[s1].id(),
        shape_b: space.bodies[i2].shapes()[s2].id(),
        body_a: space.bodies[i1].id(),
        body_b: space.bodies[i2].id(),
        index_a: i1,
        index_b: i2,
        normal: manifold.normal,
        contact_count: manifold.count,
        contacts: [Contact::default(); 2],
        friction: mix_coefficients(
            material_a.friction,
            material_b.friction,
            space.settings.friction_mix,
        ),
        restitution: mix_coefficients(
            material_a.restitution,
            material_b.restitution,
            space.settings.restitution_mix,
        ),
    };

    for (contact, point) in pcp
        .contacts
        .iter_mut()
        .zip(manifold.points.iter())
        .take(manifold.count)
    {
        *contact = Contact {
            anchor_a: point.position - position_a,
            anchor_b: point.position - position_b,
            separation: point.separation,
            id: point.id,
            solver_info: ContactSolverInfo::default(),
            is_persisted: false,
            remove_invoked: false,
        };
    }

    let key = pcp.key();

    if let Some(old) = space.contacts.get(&key) {
        // Match against the previous step's contacts for warm-starting
        let old_contacts: [Contact; 2] = old.contacts;
        let old_count = old.contact_count;

        for contact in &mut pcp.contacts[..pcp.contact_count] {
            for old_contact in &old_contacts[..old_count] {
                if old_contact.id == contact.id {
                    contact.is_persisted = true;
                    if space.settings.warmstarting {
                        contact.solver_info = old_contact.solver_info;
                    }
                }
            }
        }

        emit_update_events(&pcp, position_a, listener);
        space.contacts.insert(key, pcp);
    } else if pcp.penetrating() {
        emit_began_events(&pcp, position_a, listener);
        space.contacts.insert(key, pcp);
    }
}

fn emit_began_events(
    pcp: &PersistentContactPair,
    position_a: Vector2,
    listener: &mut Option<Box<dyn ContactListener>>,
) {
    let Some(sink) = listener.as_deref_mut() else {
        return;
    };
    for contact in pcp.active_contacts() {
        if contact.separation < 0.0 {
            sink.on_contact_began(&event_for(pcp, position_a, contact));
        }
    }
}

fn emit_update_events(
    pcp: &PersistentContactPair,
    position_a: Vector2,
    listener: &mut Option<Box<dyn ContactListener>>,
) {
    let Some(sink) = listener.as_deref_mut() else {
        return;
    };
    for contact in pcp.active_contacts() {
        if contact.separation >= 0.0 {
            continue;
        }
        let event = event_for(pcp, position_a, contact);
        if contact.is_persisted {
            sink.on_contact_persisted(&event);
        } else {
            sink.on_contact_began(&event);
        }
    }
}

fn event_for(
    pcp: &PersistentContactPair,
    position_a: Vector2,
    contact: &Contact,
) -> ContactEvent {
    ContactEvent {
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
    }
}

// ============================================================================
// Tests
// ============================================================================
