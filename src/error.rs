//! Physics Error Types
//!
//! Unified error type for the engine. Functions that can fail (configuration
//! validation, joint registration, body construction) return
//! `Result<T, PhysicsError>` instead of raw booleans or panicking. Internal
//! invariant breaks (a tree node whose AABB is not the union of its children)
//! are bugs, not user errors, and are checked with `debug_assert!` instead.

use core::fmt;

use crate::body::BodyId;

/// Unified error type for physics operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhysicsError {
    /// A configuration or construction parameter is out of range.
    InvalidConfiguration {
        /// Human-readable description of the problem
        reason: &'static str,
    },
    /// A joint references a body that is not owned by the world.
    DanglingReference {
        /// The body id that could not be resolved
        body: BodyId,
    },
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration { reason } => {
                write!(f, "invalid configuration: {reason}")
            }
            Self::DanglingReference { body } => {
                write!(f, "joint references unknown body {body}")
            }
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
        let e = PhysicsError::InvalidConfiguration {
            reason: "fixed_delta_time must be positive",
        };
        let s = format!("{}", e);
        assert!(s.contains("fixed_delta_time"), "Should contain the reason");
    }

    #[test]
    fn test_dangling_reference_display() {
        let e = PhysicsError::DanglingReference { body: 7 };
        let s = format!("{}", e);
        assert!(s.contains("7"), "Should contain the body id");
    }

    #[test]
    fn test_error_variants_distinct() {
        let e1 = PhysicsError::InvalidConfiguration { reason: "a" };
        let e2 = PhysicsError::DanglingReference { body: 0 };
        assert_ne!(e1, e2);
    }
}
