//! Collision Shapes
//!
//! A [`Shape`] is a circle or a convex polygon, expressed in body-local
//! coordinates. Polygons hold at most [`POLYGON_MAX_VERTICES`] vertices in
//! counter-clockwise winding together with precomputed outward face
//! normals and a cache of world-transformed vertices. The cache is only
//! valid immediately after a [`Shape::transform`] call.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::error::PhysicsError;
use crate::math::{Aabb, Float, Transform2, Vector2, INF, PI};

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Maximum number of vertices a convex polygon shape may have.
pub const POLYGON_MAX_VERTICES: usize = 16;

static ID_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Circle payload: a center offset in body space and a radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    /// Center in body-local coordinates.
    pub center: Vector2,
    /// Radius in meters.
    pub radius: Float,
}

/// Convex polygon payload with fixed-capacity vertex storage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Polygon {
    /// Number of vertices in use (3..=16).
    pub count: usize,
    /// Vertices in body-local coordinates, CCW winding.
    pub vertices: [Vector2; POLYGON_MAX_VERTICES],
    /// World-space vertices, valid only right after [`Shape::transform`].
    pub world_vertices: [Vector2; POLYGON_MAX_VERTICES],
    /// Outward unit normal of edge `(v[i], v[(i + 1) % count])`.
    pub normals: [Vector2; POLYGON_MAX_VERTICES],
}

/// Shape payload variants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShapeKind {
    /// Circle shape.
    Circle(Circle),
    /// Convex polygon shape.
    Polygon(Polygon),
}

/// A collision shape attached to a rigid body.
///
/// Shape ids are assigned monotonically at construction and are unique for
/// the lifetime of the process; the contact store keys persistent contact
/// pairs by ordered shape id.
#[derive(Clone, Debug)]
pub struct Shape {
    id: u32,
    /// Geometry payload.
    pub kind: ShapeKind,
}

impl Shape {
    /// Create a circle shape with a body-local center offset.
    #[must_use]
    pub fn circle(center: Vector2, radius: Float) -> Self {
        Self {
            id: ID_COUNTER.fetch_add(1, Ordering::Relaxed),
            kind: ShapeKind::Circle(Circle { center, radius }),
        }
    }

    /// Create a convex polygon shape.
    ///
    /// Vertices are offset by `offset` at construction. The winding is
    /// normalized to counter-clockwise. Fails with
    /// [`PhysicsError::InvalidShape`] when given fewer than 3 or more than
    /// [`POLYGON_MAX_VERTICES`] vertices, or a zero-area vertex set.
    pub fn polygon(vertices: &[Vector2], offset: Vector2) -> Result<Self, PhysicsError> {
        if vertices.len() < 3 {
            return Err(PhysicsError::InvalidShape {
                reason: "polygon needs at least 3 vertices",
            });
        }
        if vertices.len() > POLYGON_MAX_VERTICES {
            return Err(PhysicsError::InvalidShape {
                reason: "polygon exceeds maximum vertex count",
            });
        }

        let count = vertices.len();
        let mut verts = [Vector2::ZERO; POLYGON_MAX_VERTICES];
        for (i, v) in vertices.iter().enumerate() {
            verts[i] = *v + offset;
        }

        if signed_area(&verts[..count]) == 0.0 {
            return Err(PhysicsError::InvalidShape {
                reason: "polygon has zero area",
            });
        }

        // Normalize to CCW winding
        if signed_area(&verts[..count]) < 0.0 {
            verts[..count].reverse();
        }

        let mut normals = [Vector2::ZERO; POLYGON_MAX_VERTICES];
        for i in 0..count {
            let edge = verts[(i + 1) % count] - verts[i];
            normals[i] = edge.perp_right().normalized();
        }

        Ok(Self {
            id: ID_COUNTER.fetch_add(1, Ordering::Relaxed),
            kind: ShapeKind::Polygon(Polygon {
                count,
                vertices: verts,
                world_vertices: [Vector2::ZERO; POLYGON_MAX_VERTICES],
                normals,
            }),
        })
    }

    /// Create an axis-aligned rectangle polygon centered on `offset`.
    pub fn rect(width: Float, height: Float, offset: Vector2) -> Result<Self, PhysicsError> {
        let w = width * 0.5;
        let h = height * 0.5;
        let vertices = [
            Vector2::new(-w, -h),
            Vector2::new(w, -h),
            Vector2::new(w, h),
            Vector2::new(-w, h),
        ];
        Self::polygon(&vertices, offset)
    }

    /// Create a regular n-gon polygon centered on `offset`.
    pub fn ngon(n: usize, radius: Float, offset: Vector2) -> Result<Self, PhysicsError> {
        if n < 3 {
            return Err(PhysicsError::InvalidShape {
                reason: "polygon needs at least 3 vertices",
            });
        }
        if n > POLYGON_MAX_VERTICES {
            return Err(PhysicsError::InvalidShape {
                reason: "polygon exceeds maximum vertex count",
            });
        }

        let mut vertices = [Vector2::ZERO; POLYGON_MAX_VERTICES];
        let mut arm = Vector2::new(radius * 0.5, 0.0);
        let turn = 2.0 * PI / n as Float;
        for vertex in vertices.iter_mut().take(n) {
            *vertex = arm;
            arm = arm.rotated(turn);
        }

        Self::polygon(&vertices[..n], offset)
    }

    /// Create a convex polygon from the convex hull of an arbitrary point
    /// cloud.
    ///
    /// The hull is re-centered so its centroid sits at the body-local
    /// origin before the offset is applied. Fails when the hull has fewer
    /// than 3 or more than [`POLYGON_MAX_VERTICES`] vertices.
    pub fn convex_hull(points: &[Vector2], offset: Vector2) -> Result<Self, PhysicsError> {
        if points.len() < 3 {
            return Err(PhysicsError::InvalidShape {
                reason: "polygon needs at least 3 vertices",
            });
        }

        let hull = monotone_chain_hull(points);
        if hull.len() < 3 {
            return Err(PhysicsError::InvalidShape {
                reason: "points are collinear",
            });
        }
        if hull.len() > POLYGON_MAX_VERTICES {
            return Err(PhysicsError::InvalidShape {
                reason: "convex hull exceeds maximum vertex count",
            });
        }

        let centroid = polygon_centroid(&hull);
        let recentered: Vec<Vector2> = hull.iter().map(|&v| v - centroid).collect();
        Self::polygon(&recentered, offset)
    }

    /// Unique shape id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Write world-space vertices for the given transform into the
    /// polygon's cache. No-op for circles.
    pub fn transform(&mut self, xform: Transform2) {
        if let ShapeKind::Polygon(polygon) = &mut self.kind {
            let (s, c) = crate::math::sin_cos(xform.angle);
            for i in 0..polygon.count {
                let v = polygon.vertices[i];
                polygon.world_vertices[i] = Vector2::new(
                    xform.position.x + c * v.x - s * v.y,
                    xform.position.y + s * v.x + c * v.y,
                );
            }
        }
    }

    /// World-space AABB of this shape under the given transform.
    ///
    /// For polygons this refreshes the world-vertex cache.
    pub fn aabb(&mut self, xform: Transform2) -> Aabb {
        if let ShapeKind::Circle(circle) = &self.kind {
            let circle = *circle;
            let p = xform.apply(circle.center);
            return Aabb::new(
                p.x - circle.radius,
                p.y - circle.radius,
                p.x + circle.radius,
                p.y + circle.radius,
            );
        }

        self.transform(xform);
        let mut aabb = Aabb::new(INF, INF, -INF, -INF);
        if let ShapeKind::Polygon(polygon) = &self.kind {
            for v in &polygon.world_vertices[..polygon.count] {
                if v.x < aabb.min_x {
                    aabb.min_x = v.x;
                }
                if v.x > aabb.max_x {
                    aabb.max_x = v.x;
                }
                if v.y < aabb.min_y {
                    aabb.min_y = v.y;
                }
                if v.y > aabb.max_y {
                    aabb.max_y = v.y;
                }
            }
        }
        aabb
    }

    /// Mass, body-local centroid, and second moment of area about the
    /// body-local origin, for a uniform density.
    #[must_use]
    pub fn mass_properties(&self, density: Float) -> (Float, Vector2, Float) {
        match &self.kind {
            ShapeKind::Circle(circle) => {
                let mass = density * PI * circle.radius * circle.radius;
                // Parallel axis: I_origin = I_com + m * |c|^2
                let inertia = 0.5 * mass * circle.radius * circle.radius
                    + mass * circle.center.length_squared();
                (mass, circle.center, inertia)
            }
            ShapeKind::Polygon(polygon) => {
                let verts = &polygon.vertices[..polygon.count];
                let area = signed_area(verts);
                let mass = density * area;
                let centroid = polygon_centroid(verts);

                let mut numerator = 0.0;
                for i in 0..verts.len() {
                    let a = verts[i];
                    let b = verts[(i + 1) % verts.len()];
                    numerator += a.cross(b) * (a.dot(a) + a.dot(b) + b.dot(b));
                }
                let inertia = density * numerator / 12.0;
                (mass, centroid, inertia)
            }
        }
    }
}

/// Signed area of a polygon via the shoelace formula. Positive for CCW
/// winding.
fn signed_area(verts: &[Vector2]) -> Float {
    let mut area = 0.0;
    for i in 0..verts.len() {
        let a = verts[i];
        let b = verts[(i + 1) % verts.len()];
        area += a.cross(b);
    }
    area * 0.5
}

/// Area-weighted centroid of a polygon.
fn polygon_centroid(verts: &[Vector2]) -> Vector2 {
    let mut centroid = Vector2::ZERO;
    let mut area = 0.0;
    for i in 0..verts.len() {
        let a = verts[i];
        let b = verts[(i + 1) % verts.len()];
        let cross = a.cross(b);
        area += cross;
        centroid += (a + b) * cross;
    }
    if area == 0.0 {
        return Vector2::ZERO;
    }
    centroid / (3.0 * area)
}

/// Andrew's monotone chain convex hull. Returns hull vertices in CCW
/// order without the duplicated endpoint.
fn monotone_chain_hull(points: &[Vector2]) -> Vec<Vector2> {
    let mut sorted: Vec<Vector2> = points.to_vec();
    sorted.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(core::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(core::cmp::Ordering::Equal))
    });
    sorted.dedup();

    if sorted.len() < 3 {
        return sorted;
    }

    let mut hull: Vec<Vector2> = Vec::with_capacity(sorted.len() * 2);

    // Lower hull
    for &p in &sorted {
        while hull.len() >= 2 {
            let a = hull[hull.len() - 2];
            let b = hull[hull.len() - 1];
            if (b - a).cross(p - a) <= 0.0 {
                hull.pop();
            } else {
                break;
            }
        }
        hull.push(p);
    }

    // Upper hull
    let lower_len = hull.len() + 1;
    for &p in sorted.iter().rev().skip(1) {
        while hull.len() >= lower_len {
            let a = hull[hull.len() - 2];
            let b = hull[hull.len() - 1];
            if (b - a).cross(p - a) <= 0.0 {
                hull.pop();
            } else {
                break;
            }
        }
        hull.push(p);
    }

    hull.pop();
    hull
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn test_shape_ids_monotonic() {
        let a = Shape::circle(Vector2::ZERO, 1.0);
        let b = Shape::circle(Vector2::ZERO, 1.0);
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_polygon_vertex_count_bounds() {
        let tri = [
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
        ];
        assert!(Shape::polygon(&tri, Vector2::ZERO).is_ok());
        assert!(Shape::polygon(&tri[..2], Vector2::ZERO).is_err());

        // Exactly 16 vertices constructs successfully; 17 is rejected
        assert!(Shape::ngon(16, 1.0, Vector2::ZERO).is_ok());
        assert!(Shape::ngon(17, 1.0, Vector2::ZERO).is_err());
    }

    #[test]
    fn test_polygon_winding_normalized() {
        // Clockwise input gets reversed to CCW
        let cw = [
            Vector2::new(0.0, 1.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 0.0),
        ];
        let shape = Shape::polygon(&cw, Vector2::ZERO).unwrap();
        let ShapeKind::Polygon(poly) = &shape.kind else {
            panic!("expected polygon");
        };
        assert!(signed_area(&poly.vertices[..poly.count]) > 0.0);
    }

    #[test]
    fn test_polygon_zero_area_rejected() {
        let line = [
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(2.0, 2.0),
        ];
        assert!(Shape::polygon(&line, Vector2::ZERO).is_err());
    }

    #[test]
    fn test_rect_normals_outward() {
        let shape = Shape::rect(2.0, 2.0, Vector2::ZERO).unwrap();
        let ShapeKind::Polygon(poly) = &shape.kind else {
            panic!("expected polygon");
        };
        assert_eq!(poly.count, 4);
        // Every normal must point away from the centroid
        for i in 0..poly.count {
            let mid = (poly.vertices[i] + poly.vertices[(i + 1) % poly.count]) * 0.5;
            assert!(mid.dot(poly.normals[i]) > 0.0, "normal {} points inward", i);
        }
    }

    #[test]
    fn test_circle_aabb() {
        let mut shape = Shape::circle(Vector2::new(1.0, 0.0), 2.0);
        let aabb = shape.aabb(Transform2::new(Vector2::new(0.0, 5.0), 0.0));
        assert_eq!(aabb, Aabb::new(-1.0, 3.0, 3.0, 7.0));
    }

    #[test]
    fn test_polygon_aabb_rotated() {
        let mut shape = Shape::rect(2.0, 2.0, Vector2::ZERO).unwrap();
        let aabb = shape.aabb(Transform2::new(Vector2::ZERO, PI / 4.0));
        let half_diag = crate::math::sqrt(2.0);
        assert!((aabb.max_x - half_diag).abs() < 1e-5);
        assert!((aabb.max_y - half_diag).abs() < 1e-5);
    }

    #[test]
    fn test_transform_writes_world_vertices() {
        let mut shape = Shape::rect(2.0, 2.0, Vector2::ZERO).unwrap();
        shape.transform(Transform2::new(Vector2::new(10.0, 10.0), 0.0));
        let ShapeKind::Polygon(poly) = &shape.kind else {
            panic!("expected polygon");
        };
        assert_eq!(poly.world_vertices[0], Vector2::new(9.0, 9.0));
        assert_eq!(poly.world_vertices[2], Vector2::new(11.0, 11.0));
    }

    #[test]
    fn test_circle_mass_properties() {
        let shape = Shape::circle(Vector2::ZERO, 1.0);
        let (mass, com, inertia) = shape.mass_properties(1.0);
        assert!((mass - PI).abs() < 1e-5);
        assert_eq!(com, Vector2::ZERO);
        assert!((inertia - 0.5 * PI).abs() < 1e-5);
    }

    #[test]
    fn test_rect_mass_properties() {
        let shape = Shape::rect(2.0, 4.0, Vector2::ZERO).unwrap();
        let (mass, com, inertia) = shape.mass_properties(1.0);
        assert!((mass - 8.0).abs() < 1e-5);
        assert!(com.length() < 1e-6);
        // I = m * (w^2 + h^2) / 12 for a centered rectangle
        assert!((inertia - 8.0 * (4.0 + 16.0) / 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_offset_shifts_centroid() {
        let offset = Vector2::new(3.0, 0.0);
        let shape = Shape::rect(2.0, 2.0, offset).unwrap();
        let (_, com, _) = shape.mass_properties(1.0);
        assert!((com.x - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_convex_hull_drops_interior_points() {
        let points = [
            Vector2::new(0.0, 0.0),
            Vector2::new(4.0, 0.0),
            Vector2::new(4.0, 4.0),
            Vector2::new(0.0, 4.0),
            Vector2::new(2.0, 2.0), // interior
            Vector2::new(1.0, 2.0), // interior
        ];
        let shape = Shape::convex_hull(&points, Vector2::ZERO).unwrap();
        let ShapeKind::Polygon(poly) = &shape.kind else {
            panic!("expected polygon");
        };
        assert_eq!(poly.count, 4);
        // Hull is re-centered on its centroid
        let centroid = polygon_centroid(&poly.vertices[..poly.count]);
        assert!(centroid.length() < 1e-5);
    }

    #[test]
    fn test_convex_hull_collinear_rejected() {
        let points = [
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(2.0, 0.0),
        ];
        assert!(Shape::convex_hull(&points, Vector2::ZERO).is_err());
    }
}
