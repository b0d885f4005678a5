//! Contact Constraints
//!
//! Velocity-level non-penetration and friction constraints built from
//! narrow-phase manifolds. Each contact point contributes one normal row
//! and one tangent row:
//!
//! - normal row `[-n, -(ra x n), n, (rb x n)]` with the accumulated impulse
//!   clamped to be non-negative (unilateral constraint)
//! - tangent row with `t = perp(n)` and the accumulated impulse clamped to
//!   the Coulomb cone `|λt| <= μ·λn`, μ the geometric mean of the two
//!   bodies' friction coefficients
//!
//! Restitution enters as a velocity bias measured from the approach speed
//! at prepare time; penetration beyond the linear slop is bled off with a
//! Baumgarte bias when position correction is enabled.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::body::{BodyId, RigidBody};
use crate::math::{cross_sv, sqrt, Vec2};
use crate::narrow::{FeaturePair, Manifold};
use crate::world::WorldConfig;

/// Per-point solver state within a contact constraint.
#[derive(Clone, Copy, Debug)]
pub struct ContactPointState {
    /// World-space contact point
    pub point: Vec2,
    /// Penetration depth at prepare time
    pub penetration: f64,
    /// Feature identity for warm starting
    pub feature: FeaturePair,
    /// Accumulated normal impulse (clamped >= 0)
    pub normal_impulse: f64,
    /// Accumulated tangent impulse (clamped to the friction cone)
    pub tangent_impulse: f64,
    r_a: Vec2,
    r_b: Vec2,
    normal_mass: f64,
    tangent_mass: f64,
    /// Target separating speed (restitution + penetration bias)
    velocity_bias: f64,
}

/// Contact constraint between two bodies, one normal/tangent row pair per
/// manifold point.
#[derive(Clone, Debug)]
pub struct ContactConstraint {
    /// First body (the manifold normal points away from it)
    pub body_a: BodyId,
    /// Second body
    pub body_b: BodyId,
    /// Contact normal, from body A toward body B
    pub normal: Vec2,
    /// Combined friction: geometric mean of the two bodies'
    pub friction: f64,
    /// Combined restitution: the bouncier body wins
    pub restitution: f64,
    /// Combined Baumgarte factor: the softer body wins
    pub beta: f64,
    /// Solver state per manifold point
    pub points: Vec<ContactPointState>,
}

impl ContactConstraint {
    /// Build a constraint from a narrow-phase manifold. Accumulated
    /// impulses start at zero; the world seeds them from the contact cache
    /// before `prepare` when warm starting is enabled.
    #[must_use]
    pub fn new(body_a: BodyId, body_b: BodyId, manifold: &Manifold, a: &RigidBody, b: &RigidBody) -> Self {
        let points = manifold
            .points
            .iter()
            .map(|p| ContactPointState {
                point: p.point,
                penetration: p.penetration,
                feature: p.feature,
                normal_impulse: 0.0,
                tangent_impulse: 0.0,
                r_a: Vec2::ZERO,
                r_b: Vec2::ZERO,
                normal_mass: 0.0,
                tangent_mass: 0.0,
                velocity_bias: 0.0,
            })
            .collect();
        Self {
            body_a,
            body_b,
            normal: manifold.normal,
            friction: sqrt(a.friction * b.friction),
            restitution: a.restitution.max(b.restitution),
            beta: a.contact_beta.min(b.contact_beta),
            points,
        }
    }

    /// Assemble Jacobians and effective masses at the current pose, compute
    /// the velocity bias, and apply the warm-start impulse.
    pub fn prepare(&mut self, a: &mut RigidBody, b: &mut RigidBody, h: f64, config: &WorldConfig) {
        let normal = self.normal;
        let tangent = normal.perp();

        for p in &mut self.points {
            p.r_a = p.point - a.position;
            p.r_b = p.point - b.position;

            let rn_a = p.r_a.cross(normal);
            let rn_b = p.r_b.cross(normal);
            let k_n = a.inv_mass()
                + b.inv_mass()
                + a.inv_inertia() * rn_a * rn_a
                + b.inv_inertia() * rn_b * rn_b;
            p.normal_mass = if k_n > 0.0 { 1.0 / k_n } else { 0.0 };

            let rt_a = p.r_a.cross(tangent);
            let rt_b = p.r_b.cross(tangent);
            let k_t = a.inv_mass()
                + b.inv_mass()
                + a.inv_inertia() * rt_a * rt_a
                + b.inv_inertia() * rt_b * rt_b;
            p.tangent_mass = if k_t > 0.0 { 1.0 / k_t } else { 0.0 };

            // Restitution: measured from the approach speed before solving
            let rv = b.velocity + cross_sv(b.angular_velocity, p.r_b)
                - a.velocity
                - cross_sv(a.angular_velocity, p.r_a);
            let approach = -rv.dot(normal);
            let mut bias = 0.0;
            if approach > config.restitution_slop {
                bias = self.restitution * (approach - config.restitution_slop);
            }
            if config.position_correction {
                let pen = (p.penetration - config.linear_slop).max(0.0);
                // Restitution and penetration bias do not stack; the larger
                // target separating speed wins
                bias = bias.max(self.beta / h * pen);
            }
            p.velocity_bias = bias;

            if config.warm_starting {
                let impulse = normal * p.normal_impulse + tangent * p.tangent_impulse;
                a.apply_impulse_with_offset(-impulse, p.r_a);
                b.apply_impulse_with_offset(impulse, p.r_b);
            } else {
                p.normal_impulse = 0.0;
                p.tangent_impulse = 0.0;
            }
        }
    }

    /// One Gauss-Seidel sweep over this constraint's rows.
    pub fn solve(&mut self, a: &mut RigidBody, b: &mut RigidBody) {
        let normal = self.normal;
        let tangent = normal.perp();

        for p in &mut self.points {
            // Normal row
            let rv = b.velocity + cross_sv(b.angular_velocity, p.r_b)
                - a.velocity
                - cross_sv(a.angular_velocity, p.r_a);
            let vn = rv.dot(normal);
            let lambda = -p.normal_mass * (vn - p.velocity_bias);

            let new_impulse = (p.normal_impulse + lambda).max(0.0);
            let delta = new_impulse - p.normal_impulse;
            p.normal_impulse = new_impulse;

            let impulse = normal * delta;
            a.apply_impulse_with_offset(-impulse, p.r_a);
            b.apply_impulse_with_offset(impulse, p.r_b);

            // Tangent row, clamped to the friction cone of the accumulated
            // normal impulse
            let rv = b.velocity + cross_sv(b.angular_velocity, p.r_b)
                - a.velocity
                - cross_sv(a.angular_velocity, p.r_a);
            let vt = rv.dot(tangent);
            let lambda = -p.tangent_mass * vt;

            let max_friction = self.friction * p.normal_impulse;
            let new_impulse = (p.tangent_impulse + lambda).clamp(-max_friction, max_friction);
            let delta = new_impulse - p.tangent_impulse;
            p.tangent_impulse = new_impulse;

            let impulse = tangent * delta;
            a.apply_impulse_with_offset(-impulse, p.r_a);
            b.apply_impulse_with_offset(impulse, p.r_b);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
