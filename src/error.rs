//! Physics Error Types
//!
//! Unified error type for the engine. Fallible operations (shape
//! construction, space membership changes, mass overrides) return
//! `Result<T, PhysicsError>` instead of panicking; the space never aborts
//! or unwinds on a caller mistake.

use core::fmt;

/// Unified error type for physics operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PhysicsError {
    /// A polygon shape was given fewer than 3 or more than 16 vertices,
    /// or its vertices are degenerate (zero area).
    InvalidShape {
        /// Human-readable description of the problem
        reason: &'static str,
    },
    /// A body that already belongs to a space was added again.
    AlreadyAdded,
    /// A remove targeted a body or constraint not present in the space.
    NotFound,
    /// An invalid parameter was supplied.
    InvalidArgument {
        /// Human-readable description of the problem
        reason: &'static str,
    },
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidShape { reason } => write!(f, "invalid shape: {reason}"),
            Self::AlreadyAdded => write!(f, "body already belongs to this space"),
            Self::NotFound => write!(f, "object not found in this space"),
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PhysicsError {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = PhysicsError::InvalidShape {
            reason: "fewer than 3 vertices",
        };
        let s = format!("{}", e);
        assert!(s.contains("fewer than 3"));

        let e = PhysicsError::AlreadyAdded;
        assert!(format!("{}", e).contains("already"));
    }

    #[test]
    fn test_error_variants_distinct() {
        let e1 = PhysicsError::AlreadyAdded;
        let e2 = PhysicsError::NotFound;
        let e3 = PhysicsError::InvalidArgument {
            reason: "mass must be positive",
        };
        assert_ne!(e1, e2);
        assert_ne!(e2, e3);
    }

    #[test]
    fn test_error_debug() {
        let e = PhysicsError::NotFound;
        assert!(format!("{:?}", e).contains("NotFound"));
    }
}
