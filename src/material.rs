//! Surface Materials and Coefficient Mixing
//!
//! A material carries the density used for mass computation and the
//! restitution/friction coefficients used by the contact solver. When two
//! bodies touch, their coefficients are combined with the space's
//! configured [`CoefficientMix`] rule.

use crate::math::{sqrt, Float};

/// Physical surface properties of a rigid body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Mass per unit area, used when computing mass from shapes.
    pub density: Float,
    /// Coefficient of restitution (bounciness, 0..1).
    pub restitution: Float,
    /// Coulomb friction coefficient.
    pub friction: Float,
}

impl Material {
    /// General-purpose default material.
    pub const BASIC: Self = Self {
        density: 1.0,
        restitution: 0.1,
        friction: 0.4,
    };

    /// Steel: heavy, barely bouncy.
    pub const STEEL: Self = Self {
        density: 7.8,
        restitution: 0.43,
        friction: 0.45,
    };

    /// Wood: light and grippy.
    pub const WOOD: Self = Self {
        density: 1.5,
        restitution: 0.37,
        friction: 0.52,
    };

    /// Rubber: very bouncy, very grippy.
    pub const RUBBER: Self = Self {
        density: 1.0,
        restitution: 0.82,
        friction: 0.92,
    };

    /// Ice: slides on everything.
    pub const ICE: Self = Self {
        density: 0.92,
        restitution: 0.05,
        friction: 0.02,
    };

    /// Create a new material.
    #[inline]
    #[must_use]
    pub const fn new(density: Float, restitution: Float, friction: Float) -> Self {
        Self {
            density,
            restitution,
            friction,
        }
    }
}

impl Default for Material {
    #[inline]
    fn default() -> Self {
        Self::BASIC
    }
}

/// Method used to combine the two bodies' restitution or friction
/// coefficients into a single per-pair value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CoefficientMix {
    /// `(a + b) / 2`
    Average,
    /// `a * b`
    Multiply,
    /// `sqrt(a * b)`
    #[default]
    Sqrt,
    /// `min(a, b)`
    Min,
    /// `max(a, b)`
    Max,
}

/// Mix two coefficient values.
#[inline]
#[must_use]
pub fn mix_coefficients(a: Float, b: Float, mix: CoefficientMix) -> Float {
    match mix {
        CoefficientMix::Average => (a + b) * 0.5,
        CoefficientMix::Multiply => a * b,
        CoefficientMix::Sqrt => sqrt(a * b),
        CoefficientMix::Min => {
            if a < b {
                a
            } else {
                b
            }
        }
        CoefficientMix::Max => {
            if a > b {
                a
            } else {
                b
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
