//! Narrow-Phase Collision Routines
//!
//! Pure geometric tests producing contact manifolds: up to two contact
//! points plus a shared normal. Dispatch covers circle-circle,
//! circle-polygon (Voronoi regions) and polygon-polygon (SAT with
//! incident-face clipping).
//!
//! Every manifold point carries a packed feature id identifying the
//! reference/incident features that produced it, so the narrow phase can
//! match points across steps for warm-starting.

use crate::math::{Float, Transform2, Vector2, INF};
use crate::shape::{Polygon, Shape, ShapeKind, POLYGON_MAX_VERTICES};

/// Tolerance favoring the previous separating axis when two axes are
/// nearly tied, which keeps the reference face stable across steps.
const AXIS_TOLERANCE: Float = 1e-4;

/// Feature tag for a contact generated against a polygon vertex.
const FEATURE_VERTEX: u32 = 0x100;
/// Feature tag for a contact generated against a polygon face.
const FEATURE_FACE: u32 = 0x200;

/// One candidate contact point of a manifold.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ManifoldPoint {
    /// World-space contact position.
    pub position: Vector2,
    /// Signed separation along the manifold normal; negative when
    /// penetrating.
    pub separation: Float,
    /// Packed feature-pair id.
    pub id: u32,
}

/// Contact manifold between two shapes.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Manifold {
    /// Unit normal pointing from the first shape toward the second.
    pub normal: Vector2,
    /// Number of valid points (0, 1 or 2).
    pub count: usize,
    /// Point storage.
    pub points: [ManifoldPoint; 2],
}

/// Compute the contact manifold between two shapes. The normal points
/// from `shape_a` toward `shape_b`.
pub(crate) fn collide(
    shape_a: &Shape,
    xform_a: Transform2,
    shape_b: &Shape,
    xform_b: Transform2,
) -> Manifold {
    match (&shape_a.kind, &shape_b.kind) {
        (ShapeKind::Circle(ca), ShapeKind::Circle(cb)) => {
            circle_x_circle(xform_a.apply(ca.center), ca.radius, xform_b.apply(cb.center), cb.radius)
        }
        (ShapeKind::Circle(circle), ShapeKind::Polygon(polygon)) => {
            let mut manifold =
                polygon_x_circle(polygon, xform_b, xform_a.apply(circle.center), circle.radius);
            manifold.normal = -manifold.normal;
            manifold
        }
        (ShapeKind::Polygon(polygon), ShapeKind::Circle(circle)) => {
            polygon_x_circle(polygon, xform_a, xform_b.apply(circle.center), circle.radius)
        }
        (ShapeKind::Polygon(pa), ShapeKind::Polygon(pb)) => {
            polygon_x_polygon(pa, xform_a, pb, xform_b)
        }
    }
}

// ============================================================================
// Circle x circle
// ============================================================================

fn circle_x_circle(pa: Vector2, ra: Float, pb: Vector2, rb: Float) -> Manifold {
    let delta = pb - pa;
    let dist_sq = delta.length_squared();

    // Coincident centers get an arbitrary but deterministic normal
    let (normal, dist) = if dist_sq == 0.0 {
        (Vector2::UNIT_Y, 0.0)
    } else {
        let dist = crate::math::sqrt(dist_sq);
        (delta / dist, dist)
    };

    let mut manifold = Manifold {
        normal,
        count: 1,
        points: [ManifoldPoint::default(); 2],
    };
    manifold.points[0] = ManifoldPoint {
        position: pa + normal * ra,
        separation: dist - (ra + rb),
        id: 0,
    };
    manifold
}

// ============================================================================
// Polygon x circle
// ============================================================================

/// World-space polygon scratch data.
struct WorldPoly {
    count: usize,
    verts: [Vector2; POLYGON_MAX_VERTICES],
    normals: [Vector2; POLYGON_MAX_VERTICES],
}

fn world_poly(polygon: &Polygon, xform: Transform2) -> WorldPoly {
    let (s, c) = crate::math::sin_cos(xform.angle);
    let mut verts = [Vector2::ZERO; POLYGON_MAX_VERTICES];
    let mut normals = [Vector2::ZERO; POLYGON_MAX_VERTICES];
    for i in 0..polygon.count {
        let v = polygon.vertices[i];
        verts[i] = Vector2::new(
            xform.position.x + c * v.x - s * v.y,
            xform.position.y + s * v.x + c * v.y,
        );
        let n = polygon.normals[i];
        normals[i] = Vector2::new(c * n.x - s * n.y, s * n.x + c * n.y);
    }
    WorldPoly {
        count: polygon.count,
        verts,
        normals,
    }
}

/// Polygon vs circle. The returned normal points from the polygon toward
/// the circle.
fn polygon_x_circle(
    polygon: &Polygon,
    poly_xform: Transform2,
    center: Vector2,
    radius: Float,
) -> Manifold {
    let poly = world_poly(polygon, poly_xform);

    // Edge whose outward normal maximizes the support of the center
    let mut best = -INF;
    let mut best_edge = 0;
    for i in 0..poly.count {
        let d = poly.normals[i].dot(center - poly.verts[i]);
        if d > best {
            best = d;
            best_edge = i;
        }
    }

    if best > radius {
        return Manifold::default();
    }

    let v1 = poly.verts[best_edge];
    let v2 = poly.verts[(best_edge + 1) % poly.count];

    // Center inside the polygon: face contact straight along the edge
    // normal
    if best <= 0.0 {
        let normal = poly.normals[best_edge];
        let mut manifold = Manifold {
            normal,
            count: 1,
            points: [ManifoldPoint::default(); 2],
        };
        manifold.points[0] = ManifoldPoint {
            position: center - normal * best,
            separation: best - radius,
            id: FEATURE_FACE | best_edge as u32,
        };
        return manifold;
    }

    // Voronoi region of the edge
    let edge = v2 - v1;
    let t = (center - v1).dot(edge) / edge.length_squared();

    if t < 0.0 {
        vertex_contact(center, radius, v1, best_edge as u32)
    } else if t > 1.0 {
        vertex_contact(center, radius, v2, ((best_edge + 1) % poly.count) as u32)
    } else {
        let dist = best;
        if dist > radius {
            return Manifold::default();
        }
        let normal = poly.normals[best_edge];
        let mut manifold = Manifold {
            normal,
            count: 1,
            points: [ManifoldPoint::default(); 2],
        };
        manifold.points[0] = ManifoldPoint {
            position: center - normal * dist,
            separation: dist - radius,
            id: FEATURE_FACE | best_edge as u32,
        };
        manifold
    }
}

fn vertex_contact(center: Vector2, radius: Float, vertex: Vector2, index: u32) -> Manifold {
    let delta = center - vertex;
    let dist = delta.length();
    if dist > radius {
        return Manifold::default();
    }
    let normal = if dist == 0.0 {
        Vector2::UNIT_Y
    } else {
        delta / dist
    };
    let mut manifold = Manifold {
        normal,
        count: 1,
        points: [ManifoldPoint::default(); 2],
    };
    manifold.points[0] = ManifoldPoint {
        position: vertex,
        separation: dist - radius,
        id: FEATURE_VERTEX | index,
    };
    manifold
}

// ============================================================================
// Polygon x polygon (SAT + incident face clipping)
// ============================================================================

#[derive(Clone, Copy, Default)]
struct ClipVertex {
    v: Vector2,
    id: u32,
}

/// Pack the features that produced a contact into a stable id:
/// flip flag, reference edge index, and incident vertex (or clip-plane)
/// tag.
fn pack_feature_id(flip: bool, reference_edge: usize, incident: u32) -> u32 {
    ((flip as u32) << 31) | ((reference_edge as u32 & 0xFF) << 8) | (incident & 0xFF)
}

/// Find the edge of `a` with the greatest separation relative to `b`.
fn max_separation(a: &WorldPoly, b: &WorldPoly) -> (usize, Float) {
    let mut best_edge = 0;
    let mut best_separation = -INF;

    for i in 0..a.count {
        let n = a.normals[i];
        let v = a.verts[i];

        let mut min_support = INF;
        for &vb in &b.verts[..b.count] {
            let d = n.dot(vb - v);
            if d < min_support {
                min_support = d;
            }
        }

        if min_support > best_separation {
            best_separation = min_support;
            best_edge = i;
        }
    }

    (best_edge, best_separation)
}

/// Clip a segment to the half-plane `dot(normal, v) - offset <= 0`,
/// tagging interpolated points with `clip_id`.
fn clip_segment(
    input: [ClipVertex; 2],
    normal: Vector2,
    offset: Float,
    clip_id: u32,
) -> Option<[ClipVertex; 2]> {
    let d0 = normal.dot(input[0].v) - offset;
    let d1 = normal.dot(input[1].v) - offset;

    let mut out = [ClipVertex::default(); 2];
    let mut count = 0;

    if d0 <= 0.0 {
        out[count] = input[0];
        count += 1;
    }
    if d1 <= 0.0 {
        out[count] = input[1];
        count += 1;
    }

    // Segment crosses the plane: add the intersection point
    if d0 * d1 < 0.0 {
        let t = d0 / (d0 - d1);
        out[count] = ClipVertex {
            v: input[0].v.lerp(input[1].v, t),
            id: clip_id,
        };
        count += 1;
    }

    if count < 2 {
        None
    } else {
        Some(out)
    }
}

fn polygon_x_polygon(
    pa: &Polygon,
    xform_a: Transform2,
    pb: &Polygon,
    xform_b: Transform2,
) -> Manifold {
    let wa = world_poly(pa, xform_a);
    let wb = world_poly(pb, xform_b);

    let (edge_a, separation_a) = max_separation(&wa, &wb);
    let (edge_b, separation_b) = max_separation(&wb, &wa);

    if separation_a > 0.0 || separation_b > 0.0 {
        return Manifold::default();
    }

    // Reference face belongs to whichever polygon owns the better axis
    let (reference, incident, ref_edge, flip) = if separation_b > separation_a + AXIS_TOLERANCE {
        (&wb, &wa, edge_b, true)
    } else {
        (&wa, &wb, edge_a, false)
    };

    let v1 = reference.verts[ref_edge];
    let v2 = reference.verts[(ref_edge + 1) % reference.count];
    let ref_normal = reference.normals[ref_edge];
    let tangent = (v2 - v1).normalized();

    // Incident edge: the one most anti-parallel to the reference normal
    let mut inc_edge = 0;
    let mut min_dot = INF;
    for i in 0..incident.count {
        let d = ref_normal.dot(incident.normals[i]);
        if d < min_dot {
            min_dot = d;
            inc_edge = i;
        }
    }
    let i1 = inc_edge;
    let i2 = (inc_edge + 1) % incident.count;

    let segment = [
        ClipVertex {
            v: incident.verts[i1],
            id: pack_feature_id(flip, ref_edge, i1 as u32),
        },
        ClipVertex {
            v: incident.verts[i2],
            id: pack_feature_id(flip, ref_edge, i2 as u32),
        },
    ];

    // Clip against the two side planes of the reference edge
    let side1 = clip_segment(
        segment,
        -tangent,
        -tangent.dot(v1),
        pack_feature_id(flip, ref_edge, 0x10),
    );
    let Some(clipped1) = side1 else {
        return Manifold::default();
    };
    let side2 = clip_segment(
        clipped1,
        tangent,
        tangent.dot(v2),
        pack_feature_id(flip, ref_edge, 0x11),
    );
    let Some(clipped2) = side2 else {
        return Manifold::default();
    };

    // Keep clipped points behind the reference face
    let front = ref_normal.dot(v1);
    let mut manifold = Manifold {
        normal: if flip { -ref_normal } else { ref_normal },
        count: 0,
        points: [ManifoldPoint::default(); 2],
    };

    for clip_vertex in &clipped2 {
        let separation = ref_normal.dot(clip_vertex.v) - front;
        if separation <= 0.0 {
            manifold.points[manifold.count] = ManifoldPoint {
                position: clip_vertex.v,
                separation,
                id: clip_vertex.id,
            };
            manifold.count += 1;
        }
    }

    manifold
}

// ============================================================================
// Tests
// ============================================================================
