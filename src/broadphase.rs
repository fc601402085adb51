//! Broad-Phase Pair Generation
//!
//! The broad phase fills the space's candidate pair list with body pairs
//! whose AABBs overlap, and prunes persistent contact pairs whose AABBs
//! have separated (emitting removal events once per contact).
//!
//! Three interchangeable algorithms share that contract: the mandatory
//! brute-force sweep, a spatial hash grid, and a per-step rebuilt BVH.
//! With the `parallel` feature the brute-force sweep is partitioned
//! across rayon workers; the pair list is mutex-guarded and re-sorted by
//! ordered body index so results stay deterministic.

use crate::body::{RigidBody, RigidBodyType};
use crate::contact::ContactKey;
use crate::event::ContactEvent;
use crate::math::{floor, Aabb, Vector2, INF};
use crate::space::Space;

#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "parallel")]
use std::sync::Mutex;

/// Broad-phase algorithm selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BroadPhaseAlg {
    /// Check every body pair. O(n^2) but exact and allocation-light.
    #[default]
    BruteForce,
    /// Hash body AABBs into a uniform grid and only test bucket-mates.
    SpatialHashGrid,
    /// Rebuild a bounding volume hierarchy each step and query it per
    /// body.
    Bvh,
}

/// A candidate pair of body indices, `a < b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct BroadPhasePair {
    pub a: usize,
    pub b: usize,
}

/// Early-out filter chain shared by every algorithm. Returns `true` when
/// the pair cannot collide.
pub(crate) fn early_out(a: &RigidBody, b: &RigidBody) -> bool {
    if a.id() >= b.id() {
        return true;
    }
    if !a.collision_enabled() || !b.collision_enabled() {
        return true;
    }
    if a.body_type() == RigidBodyType::Static && b.body_type() == RigidBodyType::Static {
        return true;
    }
    if a.collision_group() == b.collision_group() && a.collision_group() != 0 {
        return true;
    }
    if (a.collision_mask() & b.collision_category()) == 0
        || (b.collision_mask() & a.collision_category()) == 0
    {
        return true;
    }
    false
}

/// Ordered contact-map key for two shape ids.
#[inline]
pub(crate) fn ordered_key(a: u32, b: u32) -> ContactKey {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

// ============================================================================
// Brute force
// ============================================================================

#[cfg(not(feature = "parallel"))]
pub(crate) fn brute_force(space: &mut Space) {
    space.broadphase_pairs.clear();
    let n = space.bodies.len();

    for i in 0..n {
        let abox = space.bodies[i].aabb();

        for j in (i + 1)..n {
            if early_out(&space.bodies[i], &space.bodies[j]) {
                continue;
            }

            let bbox = space.bodies[j].aabb();

            let mut one_aabb = false;
            if abox.overlaps(bbox) {
                one_aabb = any_shape_aabb_overlap(space, i, j);
            }

            if one_aabb {
                space.broadphase_pairs.push(BroadPhasePair { a: i, b: j });
            } else {
                prune_pair_contacts(space, i, j);
            }
        }
    }
}

#[cfg(feature = "parallel")]
pub(crate) fn brute_force(space: &mut Space) {
    space.broadphase_pairs.clear();
    prune_separated_contacts(space);

    let n = space.bodies.len();
    let aabbs: Vec<Aabb> = space.bodies.iter_mut().map(RigidBody::aabb).collect();
    let bodies = &space.bodies;

    let pair_map: Mutex<Vec<(usize, usize)>> = Mutex::new(Vec::new());
    (0..n).into_par_iter().for_each(|i| {
        let mut local: Vec<(usize, usize)> = Vec::new();
        for j in (i + 1)..n {
            if early_out(&bodies[i], &bodies[j]) {
                continue;
            }
            if aabbs[i].overlaps(aabbs[j]) {
                local.push((i, j));
            }
        }
        if !local.is_empty() {
            pair_map.lock().unwrap().extend(local);
        }
    });

    let mut candidates = pair_map.into_inner().unwrap();
    candidates.sort_unstable();
    candidates.dedup();

    for (i, j) in candidates {
        if any_shape_aabb_overlap(space, i, j) {
            space.broadphase_pairs.push(BroadPhasePair { a: i, b: j });
        }
    }
}

// ============================================================================
// Spatial hash grid
// ============================================================================

pub(crate) fn spatial_hash_grid(space: &mut Space) {
    space.broadphase_pairs.clear();
    prune_separated_contacts(space);

    let cell = space.settings.spatial_hash_cell_size.max(1e-3);
    let aabbs: Vec<Aabb> = space.bodies.iter_mut().map(RigidBody::aabb).collect();

    let mut grid: BTreeMap<(i64, i64), Vec<usize>> = BTreeMap::new();
    for (index, aabb) in aabbs.iter().enumerate() {
        let x0 = floor(aabb.min_x / cell) as i64;
        let x1 = floor(aabb.max_x / cell) as i64;
        let y0 = floor(aabb.min_y / cell) as i64;
        let y1 = floor(aabb.max_y / cell) as i64;
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                grid.entry((cx, cy)).or_default().push(index);
            }
        }
    }

    let mut candidates: Vec<(usize, usize)> = Vec::new();
    for bucket in grid.values() {
        for (slot, &i) in bucket.iter().enumerate() {
            for &j in &bucket[slot + 1..] {
                candidates.push((i, j));
            }
        }
    }
    candidates.sort_unstable();
    candidates.dedup();

    for (i, j) in candidates {
        if early_out(&space.bodies[i], &space.bodies[j]) {
            continue;
        }
        if !aabbs[i].overlaps(aabbs[j]) {
            continue;
        }
        if any_shape_aabb_overlap(space, i, j) {
            space.broadphase_pairs.push(BroadPhasePair { a: i, b: j });
        }
    }
}

// ============================================================================
// BVH
// ============================================================================

const NO_NODE: usize = usize::MAX;

struct BvhNode {
    aabb: Aabb,
    left: usize,
    right: usize,
    /// Body index for leaves, `NO_NODE` for internal nodes.
    body: usize,
}

fn build_bvh(nodes: &mut Vec<BvhNode>, items: &mut [(usize, Aabb, Vector2)]) -> usize {
    let mut bounds = Aabb::new(INF, INF, -INF, -INF);
    for (_, aabb, _) in items.iter() {
        bounds = bounds.merge(*aabb);
    }

    // Leaf threshold of one body per leaf
    if items.len() == 1 {
        nodes.push(BvhNode {
            aabb: bounds,
            left: NO_NODE,
            right: NO_NODE,
            body: items[0].0,
        });
        return nodes.len() - 1;
    }

    // Median split along the longest axis of the centers
    let split_x = (bounds.max_x - bounds.min_x) >= (bounds.max_y - bounds.min_y);
    items.sort_unstable_by(|lhs, rhs| {
        let (a, b) = if split_x {
            (lhs.2.x, rhs.2.x)
        } else {
            (lhs.2.y, rhs.2.y)
        };
        a.partial_cmp(&b).unwrap_or(core::cmp::Ordering::Equal)
    });

    let mid = items.len() / 2;
    let (left_items, right_items) = items.split_at_mut(mid);
    let left = build_bvh(nodes, left_items);
    let right = build_bvh(nodes, right_items);

    nodes.push(BvhNode {
        aabb: bounds,
        left,
        right,
        body: NO_NODE,
    });
    nodes.len() - 1
}

fn query_bvh(nodes: &[BvhNode], root: usize, aabb: Aabb, out: &mut Vec<usize>) {
    let mut stack: Vec<usize> = Vec::with_capacity(16);
    stack.push(root);
    while let Some(index) = stack.pop() {
        let node = &nodes[index];
        if !node.aabb.overlaps(aabb) {
            continue;
        }
        if node.body != NO_NODE {
            out.push(node.body);
        } else {
            stack.push(node.left);
            stack.push(node.right);
        }
    }
}

pub(crate) fn bvh(space: &mut Space) {
    space.broadphase_pairs.clear();
    prune_separated_contacts(space);

    let n = space.bodies.len();
    if n == 0 {
        return;
    }
    let aabbs: Vec<Aabb> = space.bodies.iter_mut().map(RigidBody::aabb).collect();

    let mut items: Vec<(usize, Aabb, Vector2)> = aabbs
        .iter()
        .enumerate()
        .map(|(index, aabb)| (index, *aabb, aabb.center()))
        .collect();
    let mut nodes: Vec<BvhNode> = Vec::with_capacity(2 * n);
    let root = build_bvh(&mut nodes, &mut items);

    let mut hits: Vec<usize> = Vec::new();
    for i in 0..n {
        hits.clear();
        query_bvh(&nodes, root, aabbs[i], &mut hits);
        hits.sort_unstable();

        for &j in &hits {
            if j <= i {
                continue;
            }
            if early_out(&space.bodies[i], &space.bodies[j]) {
                continue;
            }
            if any_shape_aabb_overlap(space, i, j) {
                space.broadphase_pairs.push(BroadPhasePair { a: i, b: j });
            }
        }
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Whether any shape AABB of body `i` overlaps any shape AABB of body
/// `j`. Requires `i < j`.
fn any_shape_aabb_overlap(space: &mut Space, i: usize, j: usize) -> bool {
    let (left, right) = space.bodies.split_at_mut(j);
    let a = &mut left[i];
    let b = &mut right[0];
    let xform_a = a.transform();
    let xform_b = b.transform();

    for shape_a in a.shapes_mut() {
        let abox = shape_a.aabb(xform_a);
        for shape_b in b.shapes_mut() {
            if abox.overlaps(shape_b.aabb(xform_b)) {
                return true;
            }
        }
    }
    false
}

/// Remove every persistent contact between bodies `i` and `j`, emitting
/// removal events for contacts that have not reported one yet.
pub(crate) fn prune_pair_contacts(space: &mut Space, i: usize, j: usize) {
    let ids_a: Vec<u32> = space.bodies[i].shapes().iter().map(|s| s.id()).collect();
    let ids_b: Vec<u32> = space.bodies[j].shapes().iter().map(|s| s.id()).collect();

    let mut listener = space.listener.take();
    for &sa in &ids_a {
        for &sb in &ids_b {
            let key = ordered_key(sa, sb);
            if let Some(mut pcp) = space.contacts.remove(&key) {
                if let Some(sink) = listener.as_deref_mut() {
                    let position_a = if pcp.body_a == space.bodies[i].id() {
                        space.bodies[i].position()
                    } else {
                        space.bodies[j].position()
                    };
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
    }
    space.listener = listener;
}

/// Pass over the whole contact map removing pairs whose AABBs no longer
/// overlap. Used by the algorithms that do not visit every body pair.
pub(crate) fn prune_separated_contacts(space: &mut Space) {
    let index_of: BTreeMap<u64, usize> = space
        .bodies
        .iter()
        .enumerate()
        .map(|(index, body)| (body.id(), index))
        .collect();

    let keys: Vec<ContactKey> = space.contacts.keys().copied().collect();
    for key in keys {
        let (body_a, body_b) = {
            let pcp = &space.contacts[&key];
            (pcp.body_a, pcp.body_b)
        };

        let (Some(&ia), Some(&ib)) = (index_of.get(&body_a), index_of.get(&body_b)) else {
            // Owning body left the space; the removal path already
            // reported the event
            space.contacts.remove(&key);
            continue;
        };
        let (i, j) = if ia < ib { (ia, ib) } else { (ib, ia) };

        if early_out(&space.bodies[i], &space.bodies[j]) {
            continue;
        }

        let abox = space.bodies[i].aabb();
        let bbox = space.bodies[j].aabb();
        if abox.overlaps(bbox) && any_shape_aabb_overlap(space, i, j) {
            continue;
        }

        prune_pair_contacts(space, i, j);
    }
}

// ============================================================================
// Tests
// ============================================================================
