//! 2D Math Primitives
//!
//! Scalar precision is selected at compile time: [`Float`] is `f32` by
//! default and `f64` with the `f64` feature. All other types in the crate
//! are built on these primitives.
//!
//! # Types
//!
//! - [`Vector2`]: 2D vector with full operator overloading
//! - [`Mat2`]: 2x2 matrix for block-solving two-row constraints
//! - [`Transform2`]: rigid transform (position + angle)
//! - [`Aabb`]: axis-aligned bounding box

use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

#[cfg(all(not(feature = "std"), not(feature = "libm")))]
compile_error!("pivot2d requires either the `std` or the `libm` feature for scalar math.");

/// Scalar type used throughout the engine.
#[cfg(feature = "f64")]
pub type Float = f64;

/// Scalar type used throughout the engine.
#[cfg(not(feature = "f64"))]
pub type Float = f32;

/// Positive infinity in the chosen scalar precision.
pub const INF: Float = Float::INFINITY;

/// Machine epsilon in the chosen scalar precision.
pub const EPSILON: Float = Float::EPSILON;

/// Archimedes' constant in the chosen scalar precision.
pub const PI: Float = core::f64::consts::PI as Float;

// ============================================================================
// Scalar functions
// ============================================================================

/// Square root.
#[inline]
pub fn sqrt(x: Float) -> Float {
    #[cfg(feature = "std")]
    {
        x.sqrt()
    }
    #[cfg(not(feature = "std"))]
    {
        #[cfg(feature = "f64")]
        {
            libm::sqrt(x)
        }
        #[cfg(not(feature = "f64"))]
        {
            libm::sqrtf(x)
        }
    }
}

/// Simultaneous sine and cosine.
#[inline]
pub fn sin_cos(x: Float) -> (Float, Float) {
    #[cfg(feature = "std")]
    {
        x.sin_cos()
    }
    #[cfg(not(feature = "std"))]
    {
        #[cfg(feature = "f64")]
        {
            (libm::sin(x), libm::cos(x))
        }
        #[cfg(not(feature = "f64"))]
        {
            (libm::sinf(x), libm::cosf(x))
        }
    }
}

/// `base` raised to the power `exp`.
#[inline]
pub fn powf(base: Float, exp: Float) -> Float {
    #[cfg(feature = "std")]
    {
        base.powf(exp)
    }
    #[cfg(not(feature = "std"))]
    {
        #[cfg(feature = "f64")]
        {
            libm::pow(base, exp)
        }
        #[cfg(not(feature = "f64"))]
        {
            libm::powf(base, exp)
        }
    }
}

/// Largest integer value not greater than `x`.
#[inline]
pub fn floor(x: Float) -> Float {
    #[cfg(feature = "std")]
    {
        x.floor()
    }
    #[cfg(not(feature = "std"))]
    {
        #[cfg(feature = "f64")]
        {
            libm::floor(x)
        }
        #[cfg(not(feature = "f64"))]
        {
            libm::floorf(x)
        }
    }
}

/// Absolute value.
#[inline]
#[must_use]
pub fn abs(x: Float) -> Float {
    if x < 0.0 {
        -x
    } else {
        x
    }
}

/// Clamp `x` to `[lo, hi]`.
#[inline]
#[must_use]
pub fn clamp(x: Float, lo: Float, hi: Float) -> Float {
    if x < lo {
        lo
    } else if x > hi {
        hi
    } else {
        x
    }
}

// ============================================================================
// Vector2
// ============================================================================

/// 2D vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Vector2 {
    /// X component
    pub x: Float,
    /// Y component
    pub y: Float,
}

impl Vector2 {
    /// Zero vector (0, 0)
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Unit X vector (1, 0)
    pub const UNIT_X: Self = Self { x: 1.0, y: 0.0 };

    /// Unit Y vector (0, 1)
    pub const UNIT_Y: Self = Self { x: 0.0, y: 1.0 };

    /// Create a new vector.
    #[inline]
    #[must_use]
    pub const fn new(x: Float, y: Float) -> Self {
        Self { x, y }
    }

    /// Squared length (avoids sqrt).
    #[inline]
    #[must_use]
    pub fn length_squared(self) -> Float {
        self.x * self.x + self.y * self.y
    }

    /// Length (magnitude).
    #[inline]
    #[must_use]
    pub fn length(self) -> Float {
        sqrt(self.length_squared())
    }

    /// Normalize to unit length. Returns `ZERO` for zero-length vectors.
    #[inline]
    #[must_use]
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            Self::ZERO
        } else {
            self / len
        }
    }

    /// Dot product.
    #[inline]
    #[must_use]
    pub fn dot(self, rhs: Self) -> Float {
        self.x * rhs.x + self.y * rhs.y
    }

    /// 2D cross product: `a.x * b.y - a.y * b.x`.
    ///
    /// The z-component of the 3D cross product when both vectors are
    /// embedded in the XY plane.
    #[inline]
    #[must_use]
    pub fn cross(self, rhs: Self) -> Float {
        self.x * rhs.y - self.y * rhs.x
    }

    /// Cross product of a scalar angular velocity with this vector:
    /// `(-w * y, w * x)`.
    #[inline]
    #[must_use]
    pub fn cross_scalar(w: Float, v: Self) -> Self {
        Self {
            x: -w * v.y,
            y: w * v.x,
        }
    }

    /// Rotate by an angle in radians, counter-clockwise.
    #[must_use]
    pub fn rotated(self, angle: Float) -> Self {
        let (s, c) = sin_cos(angle);
        Self {
            x: c * self.x - s * self.y,
            y: s * self.x + c * self.y,
        }
    }

    /// Perpendicular vector rotated 90 degrees counter-clockwise: `(-y, x)`.
    #[inline]
    #[must_use]
    pub fn perp(self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }

    /// Perpendicular vector rotated 90 degrees clockwise: `(y, -x)`.
    #[inline]
    #[must_use]
    pub fn perp_right(self) -> Self {
        Self {
            x: self.y,
            y: -self.x,
        }
    }

    /// Distance to another point.
    #[inline]
    #[must_use]
    pub fn distance_to(self, other: Self) -> Float {
        (other - self).length()
    }

    /// Linear interpolation: `self + (other - self) * t`.
    #[inline]
    #[must_use]
    pub fn lerp(self, other: Self, t: Float) -> Self {
        self + (other - self) * t
    }
}

impl Add for Vector2 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl AddAssign for Vector2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl SubAssign for Vector2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<Float> for Vector2 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Float) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl Div<Float> for Vector2 {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Float) -> Self {
        Self {
            x: self.x / rhs,
            y: self.y / rhs,
        }
    }
}

impl Neg for Vector2 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

// ============================================================================
// Mat2
// ============================================================================

/// 2x2 matrix, column-major, used as the effective-mass block of two-row
/// constraints (e.g. the hinge point constraint).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Mat2 {
    /// First column
    pub col1: Vector2,
    /// Second column
    pub col2: Vector2,
}

impl Mat2 {
    /// Create from columns.
    #[inline]
    #[must_use]
    pub const fn from_columns(col1: Vector2, col2: Vector2) -> Self {
        Self { col1, col2 }
    }

    /// Multiply by a vector.
    #[inline]
    #[must_use]
    pub fn mul_vec(self, v: Vector2) -> Vector2 {
        Vector2 {
            x: self.col1.x * v.x + self.col2.x * v.y,
            y: self.col1.y * v.x + self.col2.y * v.y,
        }
    }

    /// Solve `M * x = b` for `x`. Returns `ZERO` for a singular matrix.
    #[must_use]
    pub fn solve(self, b: Vector2) -> Vector2 {
        let a11 = self.col1.x;
        let a12 = self.col2.x;
        let a21 = self.col1.y;
        let a22 = self.col2.y;

        let det = a11 * a22 - a12 * a21;
        if det == 0.0 {
            return Vector2::ZERO;
        }
        let inv_det = 1.0 / det;

        Vector2 {
            x: inv_det * (a22 * b.x - a12 * b.y),
            y: inv_det * (a11 * b.y - a21 * b.x),
        }
    }
}

// ============================================================================
// Transform2
// ============================================================================

/// Rigid transform: a translation and a rotation angle in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform2 {
    /// Translation
    pub position: Vector2,
    /// Rotation angle (counter-clockwise, radians)
    pub angle: Float,
}

impl Transform2 {
    /// Identity transform.
    pub const IDENTITY: Self = Self {
        position: Vector2::ZERO,
        angle: 0.0,
    };

    /// Create a new transform.
    #[inline]
    #[must_use]
    pub const fn new(position: Vector2, angle: Float) -> Self {
        Self { position, angle }
    }

    /// Transform a local-space point to world space.
    #[inline]
    #[must_use]
    pub fn apply(self, local: Vector2) -> Vector2 {
        self.position + local.rotated(self.angle)
    }
}

// ============================================================================
// Aabb
// ============================================================================

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    /// Minimum X extent
    pub min_x: Float,
    /// Minimum Y extent
    pub min_y: Float,
    /// Maximum X extent
    pub max_x: Float,
    /// Maximum Y extent
    pub max_y: Float,
}

impl Aabb {
    /// Create a new AABB from extents.
    #[inline]
    #[must_use]
    pub const fn new(min_x: Float, min_y: Float, max_x: Float, max_y: Float) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Standard interval overlap test.
    #[inline]
    #[must_use]
    pub fn overlaps(self, other: Self) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Whether `other` lies entirely inside this box.
    #[inline]
    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.min_x <= other.min_x
            && self.min_y <= other.min_y
            && self.max_x >= other.max_x
            && self.max_y >= other.max_y
    }

    /// Smallest box enclosing both operands.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            min_x: if self.min_x < other.min_x {
                self.min_x
            } else {
                other.min_x
            },
            min_y: if self.min_y < other.min_y {
                self.min_y
            } else {
                other.min_y
            },
            max_x: if self.max_x > other.max_x {
                self.max_x
            } else {
                other.max_x
            },
            max_y: if self.max_y > other.max_y {
                self.max_y
            } else {
                other.max_y
            },
        }
    }

    /// Box center point.
    #[inline]
    #[must_use]
    pub fn center(self) -> Vector2 {
        Vector2::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }
}

/// Distance from a point to a line segment, and the closest point on it.
pub fn point_segment_distance(point: Vector2, a: Vector2, b: Vector2) -> (Float, Vector2) {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return (point.distance_to(a), a);
    }
    let t = clamp((point - a).dot(ab) / len_sq, 0.0, 1.0);
    let closest = a + ab * t;
    (point.distance_to(closest), closest)
}

// ============================================================================
// Tests
// ============================================================================
