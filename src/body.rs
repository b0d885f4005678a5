//! Rigid Body State
//!
//! Pose, velocity, and mass data for a single 2D rigid body. Mass and
//! rotational inertia are stored together with their cached inverses; the
//! two are only ever written through [`RigidBody::set_mass`] and
//! [`RigidBody::set_inertia`] so the pair can never go stale. Static bodies
//! hold zero inverses and are never integrated.

use crate::aabb::Aabb;
use crate::error::PhysicsError;
use crate::math::Vec2;
use crate::shape::Shape;

/// Stable numeric body identifier handed out by the world.
pub type BodyId = u32;

/// Type of rigid body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum BodyType {
    /// Moved by physics (gravity, constraints, impulses)
    Dynamic = 0,
    /// Never moves
    Static = 1,
}

/// 2D rigid body with position, orientation, velocity, and shape.
#[derive(Clone, Debug)]
pub struct RigidBody {
    /// World-space position of the center of mass.
    pub position: Vec2,
    /// Orientation angle in radians (counter-clockwise from +X).
    pub rotation: f64,
    /// Linear velocity.
    pub velocity: Vec2,
    /// Angular velocity (radians per second, positive = CCW).
    pub angular_velocity: f64,
    /// Coefficient of restitution (bounciness, 0..1).
    pub restitution: f64,
    /// Friction coefficient (0..1).
    pub friction: f64,
    /// Baumgarte position-correction factor for contacts (0..1).
    pub contact_beta: f64,
    /// Body type.
    pub body_type: BodyType,
    /// Collision shape.
    pub shape: Shape,
    /// Accumulated external force, cleared after each substep.
    pub(crate) force: Vec2,
    /// Accumulated external torque, cleared after each substep.
    pub(crate) torque: f64,
    /// Weak back-pointer to this body's leaf in the AABB tree.
    pub(crate) node: Option<u32>,
    mass: f64,
    inv_mass: f64,
    inertia: f64,
    inv_inertia: f64,
}

impl RigidBody {
    /// Create a dynamic body.
    ///
    /// Rotational inertia is derived from the shape. Fails with
    /// [`PhysicsError::InvalidConfiguration`] when `mass` is not a positive
    /// finite number.
    pub fn new_dynamic(position: Vec2, mass: f64, shape: Shape) -> Result<Self, PhysicsError> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "dynamic body mass must be positive and finite",
            });
        }
        if !position.is_finite() {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "body position must be finite",
            });
        }
        let inertia = shape.inertia(mass);
        let inv_inertia = if inertia > 0.0 { 1.0 / inertia } else { 0.0 };
        Ok(Self {
            position,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            restitution: 0.2,
            friction: 0.3,
            contact_beta: 0.2,
            body_type: BodyType::Dynamic,
            shape,
            force: Vec2::ZERO,
            torque: 0.0,
            node: None,
            mass,
            inv_mass: 1.0 / mass,
            inertia,
            inv_inertia,
        })
    }

    /// Create a static (immovable) body. Static bodies have zero inverse
    /// mass and inverse inertia and are never integrated.
    #[must_use]
    pub fn new_static(position: Vec2, shape: Shape) -> Self {
        Self {
            position,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            restitution: 0.2,
            friction: 0.5,
            contact_beta: 0.2,
            body_type: BodyType::Static,
            shape,
            force: Vec2::ZERO,
            torque: 0.0,
            node: None,
            mass: 0.0,
            inv_mass: 0.0,
            inertia: 0.0,
            inv_inertia: 0.0,
        }
    }

    /// Mass. Zero for static bodies.
    #[inline]
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Cached inverse mass. Zero for static bodies.
    #[inline]
    #[must_use]
    pub fn inv_mass(&self) -> f64 {
        self.inv_mass
    }

    /// Rotational inertia. Zero for static bodies.
    #[inline]
    #[must_use]
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Cached inverse rotational inertia. Zero for static bodies.
    #[inline]
    #[must_use]
    pub fn inv_inertia(&self) -> f64 {
        self.inv_inertia
    }

    /// Set the mass, recomputing the cached inverse atomically. Ignored for
    /// static bodies. Fails on non-positive or non-finite input.
    pub fn set_mass(&mut self, mass: f64) -> Result<(), PhysicsError> {
        if self.body_type == BodyType::Static {
            return Ok(());
        }
        if !(mass.is_finite() && mass > 0.0) {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "dynamic body mass must be positive and finite",
            });
        }
        self.mass = mass;
        self.inv_mass = 1.0 / mass;
        Ok(())
    }

    /// Set the rotational inertia, recomputing the cached inverse atomically.
    /// Ignored for static bodies. Fails on negative or non-finite input;
    /// zero means "no rotation" (infinite inertia).
    pub fn set_inertia(&mut self, inertia: f64) -> Result<(), PhysicsError> {
        if self.body_type == BodyType::Static {
            return Ok(());
        }
        if !(inertia.is_finite() && inertia >= 0.0) {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "rotational inertia must be non-negative and finite",
            });
        }
        self.inertia = inertia;
        self.inv_inertia = if inertia > 0.0 { 1.0 / inertia } else { 0.0 };
        Ok(())
    }

    /// Check if body is static.
    #[inline]
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    /// Check if body is dynamic.
    #[inline]
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.body_type == BodyType::Dynamic
    }

    /// Transform a local-space point to world space using the current pose.
    ///
    /// Recomputed from `(position, rotation)` on every call; the transform
    /// must never be cached across a step boundary.
    #[must_use]
    pub fn world_point(&self, local: Vec2) -> Vec2 {
        self.position + local.rotate(self.rotation)
    }

    /// Transform a world-space point to local space using the current pose.
    #[must_use]
    pub fn local_point(&self, world: Vec2) -> Vec2 {
        (world - self.position).rotate(-self.rotation)
    }

    /// Apply a force at the center of mass, integrated at the next substep.
    #[inline]
    pub fn apply_force(&mut self, force: Vec2) {
        if self.body_type == BodyType::Dynamic {
            self.force = self.force + force;
        }
    }

    /// Apply a torque, integrated at the next substep.
    #[inline]
    pub fn apply_torque(&mut self, torque: f64) {
        if self.body_type == BodyType::Dynamic {
            self.torque += torque;
        }
    }

    /// Apply a linear impulse at the center of mass (immediate velocity change).
    #[inline]
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        if self.body_type == BodyType::Dynamic {
            self.velocity = self.velocity + impulse * self.inv_mass;
        }
    }

    /// Apply a linear impulse at a world-space point, generating both linear
    /// and angular velocity change.
    pub fn apply_impulse_at(&mut self, impulse: Vec2, world_point: Vec2) {
        if self.body_type != BodyType::Dynamic {
            return;
        }
        self.velocity = self.velocity + impulse * self.inv_mass;
        let r = world_point - self.position;
        self.angular_velocity += r.cross(impulse) * self.inv_inertia;
    }

    /// Velocity change from an impulse whose application point was captured
    /// as an offset `r` from the center of mass at prepare time.
    #[inline]
    pub(crate) fn apply_impulse_with_offset(&mut self, impulse: Vec2, r: Vec2) {
        self.velocity = self.velocity + impulse * self.inv_mass;
        self.angular_velocity += r.cross(impulse) * self.inv_inertia;
    }

    /// World-space AABB of the shape at the current pose.
    #[must_use]
    pub fn compute_aabb(&self) -> Aabb {
        match &self.shape {
            Shape::Circle { radius } => {
                let r = Vec2::new(*radius, *radius);
                Aabb::new(self.position - r, self.position + r)
            }
            Shape::Polygon { vertices } => {
                let mut min = Vec2::new(f64::INFINITY, f64::INFINITY);
                let mut max = Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
                for v in vertices {
                    let w = self.world_point(*v);
                    min = min.min(w);
                    max = max.max(w);
                }
                Aabb::new(min, max)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::abs;

    #[test]
    fn test_dynamic_body_mass_caches() {
        let mut body =
            RigidBody::new_dynamic(Vec2::ZERO, 2.0, Shape::circle(1.0)).unwrap();
        assert_eq!(body.mass(), 2.0);
        assert_eq!(body.inv_mass(), 0.5);
        assert!(body.inv_inertia() > 0.0);

        body.set_mass(4.0).unwrap();
        assert_eq!(body.inv_mass(), 0.25, "inverse must track mass atomically");

        body.set_inertia(0.0).unwrap();
        assert_eq!(body.inv_inertia(), 0.0, "zero inertia means no rotation");
    }

    #[test]
    fn test_invalid_mass_rejected() {
        assert!(RigidBody::new_dynamic(Vec2::ZERO, 0.0, Shape::circle(1.0)).is_err());
        assert!(RigidBody::new_dynamic(Vec2::ZERO, -1.0, Shape::circle(1.0)).is_err());
        assert!(RigidBody::new_dynamic(Vec2::ZERO, f64::NAN, Shape::circle(1.0)).is_err());
    }

    #[test]
    fn test_static_body_zero_inverses() {
        let body = RigidBody::new_static(Vec2::ZERO, Shape::circle(1.0));
        assert_eq!(body.inv_mass(), 0.0);
        assert_eq!(body.inv_inertia(), 0.0);
        assert!(body.is_static());
    }

    #[test]
    fn test_world_local_round_trip() {
        let mut body =
            RigidBody::new_dynamic(Vec2::new(3.0, -2.0), 1.0, Shape::circle(1.0)).unwrap();
        body.rotation = 0.7;
        let local = Vec2::new(1.5, 0.25);
        let back = body.local_point(body.world_point(local));
        assert!(abs(back.x - local.x) < 1e-12);
        assert!(abs(back.y - local.y) < 1e-12);
    }

    #[test]
    fn test_impulse_at_point_spins() {
        let mut body =
            RigidBody::new_dynamic(Vec2::ZERO, 1.0, Shape::circle(1.0)).unwrap();
        // Impulse along +Y at a point to the right of the center spins CCW
        body.apply_impulse_at(Vec2::UNIT_Y, Vec2::UNIT_X);
        assert!(body.angular_velocity > 0.0);
        assert!(body.velocity.y > 0.0);
    }

    #[test]
    fn test_static_body_ignores_impulses() {
        let mut body = RigidBody::new_static(Vec2::ZERO, Shape::circle(1.0));
        body.apply_impulse(Vec2::UNIT_X);
        body.apply_impulse_at(Vec2::UNIT_Y, Vec2::UNIT_X);
        assert_eq!(body.velocity, Vec2::ZERO);
        assert_eq!(body.angular_velocity, 0.0);
    }

    #[test]
    fn test_compute_aabb_rotated_box() {
        let mut body =
            RigidBody::new_dynamic(Vec2::ZERO, 1.0, Shape::rect(Vec2::new(1.0, 1.0))).unwrap();
        body.rotation = core::f64::consts::FRAC_PI_4;
        let aabb = body.compute_aabb();
        // A unit half-extent box rotated 45 degrees spans sqrt(2) half-extents
        let expect = core::f64::consts::SQRT_2;
        assert!(abs(aabb.max.x - expect) < 1e-9, "got {}", aabb.max.x);
        assert!(abs(aabb.max.y - expect) < 1e-9);
    }
}
