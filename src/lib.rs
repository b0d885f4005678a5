//! impulse2d: 2D Rigid-Body Physics Core
//!
//! A 2D physics engine core built around two tightly-coupled subsystems: a
//! dynamic AABB tree broad phase and a sequential-impulse constraint solver.
//! Bodies advance in fixed time steps; collisions are resolved and
//! user-declared joints are maintained within numerical tolerances.
//!
//! # Features
//!
//! - **Dynamic AABB tree**: SAH insertion with best-first pruned search,
//!   local rotations, fat margins, point/region queries, and unique pair
//!   enumeration
//! - **Sequential impulses**: a uniform velocity-level constraint contract
//!   (`prepare` / `solve` / apply impulse) shared by contacts and joints
//! - **Warm starting**: accumulated impulses carried across ticks, keyed by
//!   contact feature identity
//! - **Soft constraints**: spring-damper (frequency, damping ratio) reduced
//!   to Baumgarte bias and softness terms
//! - **`no_std` support**: enable the `libm` feature on targets without std
//!
//! # Example
//!
//! ```rust
//! use impulse2d::{RigidBody, Shape, Vec2, World, WorldConfig};
//!
//! let mut world = World::new(WorldConfig::default()).unwrap();
//!
//! // A ball falling onto a static floor
//! world.add(RigidBody::new_static(
//!     Vec2::new(0.0, -0.5),
//!     Shape::rect(Vec2::new(10.0, 0.5)),
//! ));
//! let ball = world.add(
//!     RigidBody::new_dynamic(Vec2::new(0.0, 5.0), 1.0, Shape::circle(0.5)).unwrap(),
//! );
//!
//! for _ in 0..120 {
//!     world.step(1.0 / 60.0);
//! }
//! assert!(world.body(ball).unwrap().position.y < 5.0);
//! ```
//!
//! # Modules
//!
//! - [`math`]: `f64` vectors and small matrices, float intrinsic shims
//! - [`aabb`]: axis-aligned bounding boxes
//! - [`shape`]: circle and convex polygon shapes with inertia
//! - [`body`]: rigid body state with cached inverse mass/inertia
//! - [`tree`]: dynamic AABB tree (arena nodes, SAH insert, rotations)
//! - [`narrow`]: built-in manifold provider (replaceable)
//! - [`contact`]: contact constraints with friction and restitution
//! - [`contact_cache`]: cross-tick impulse store for warm starting
//! - [`joint`]: distance, grab, weld, line, and prismatic joints
//! - [`world`]: ownership and the fixed-timestep pipeline
//! - [`error`]: unified error type
//!
//! # Determinism & threading
//!
//! The step is single-threaded and synchronous; within a tick the phase
//! order is fixed (broad phase, narrow phase, prepare, iterate, integrate).
//! Iteration counts bound the work per step; there is no convergence test
//! and no partial-tick rollback.

#![warn(missing_docs)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod aabb;
pub mod body;
pub mod contact;
pub mod contact_cache;
pub mod error;
pub mod joint;
pub mod math;
pub mod narrow;
pub mod shape;
pub mod tree;
pub mod world;

// Re-export commonly used types
pub use aabb::Aabb;
pub use body::{BodyId, BodyType, RigidBody};
pub use contact::{ContactConstraint, ContactPointState};
pub use contact_cache::{BodyPairKey, ContactCache};
pub use error::PhysicsError;
pub use joint::{
    DistanceJoint, GrabJoint, Joint, LineJoint, PrismaticJoint, Softness, WeldJoint,
};
pub use math::{Mat2, Mat3, Vec2, Vec3};
pub use narrow::{ContactPoint, FeaturePair, Manifold};
pub use shape::Shape;
pub use tree::{AabbTree, NULL_NODE};
pub use world::{JointId, StepStats, World, WorldConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::aabb::Aabb;
    pub use crate::body::{BodyId, BodyType, RigidBody};
    pub use crate::error::PhysicsError;
    pub use crate::joint::{
        DistanceJoint, GrabJoint, Joint, LineJoint, PrismaticJoint, Softness, WeldJoint,
    };
    pub use crate::math::{Mat2, Mat3, Vec2, Vec3};
    pub use crate::narrow::{ContactPoint, FeaturePair, Manifold};
    pub use crate::shape::Shape;
    pub use crate::tree::AabbTree;
    pub use crate::world::{JointId, StepStats, World, WorldConfig};
}

#[cfg(test)]
mod compile_smoke_tests {
    //! Verify that core types from the prelude and key modules are
    //! accessible. These tests catch accidental breakage of public
    //! re-exports.

    use super::*;

    #[test]
    fn test_prelude_types_accessible() {
        let _ = Vec2::ZERO;
        let _ = Vec3::ZERO;
        let _ = Mat2::IDENTITY;
        let _ = Mat3::IDENTITY;
        let _ = WorldConfig::default();
        let _ = AabbTree::new();
        let _ = ContactCache::new();
    }

    #[test]
    fn test_error_type_accessible() {
        let e = PhysicsError::DanglingReference { body: 0 };
        let _ = format!("{}", e);
    }

    #[test]
    fn test_world_round_trip() {
        let mut world = World::new(WorldConfig::default()).unwrap();
        let id = world.add(
            RigidBody::new_dynamic(Vec2::ZERO, 1.0, Shape::circle(1.0)).unwrap(),
        );
        world.step(1.0 / 60.0);
        assert!(world.body(id).is_some());
    }
}
