//! Joint Constraints
//!
//! Velocity-level joints solved with sequential impulses. Every joint
//! follows the same contract:
//!
//! - `prepare(h)`: assemble the Jacobian at the current pose, build the
//!   effective mass `(J M⁻¹ Jᵀ + γI)⁻¹`, compute the bias `(β/h)·C`, and
//!   apply the warm-start impulse
//! - `solve()`: `λ = M_eff · -(Jv + bias + γ·λ_acc)`, apply, accumulate
//!
//! # Joint Types
//!
//! - [`DistanceJoint`]: keep two anchor points a fixed distance apart (1 row)
//! - [`GrabJoint`]: drag one body's anchor toward a world target (2 rows)
//! - [`WeldJoint`]: lock relative position and angle (3 rows)
//! - [`LineJoint`]: forbid lateral motion of anchor B relative to the
//!   anchor-to-anchor axis (1 row)
//! - [`PrismaticJoint`]: line row plus a relative-angle lock (2 rows)
//!
//! # Softness
//!
//! A joint built plain is rigid (β = 0.2, γ = 0). With a [`Softness`]
//! attached, β and γ are derived from a spring-damper each `prepare`:
//! ω = 2πf, d = 2mζω, k = mω², β = hk/(d+hk), γ = 1/((d+hk)·h).

use core::f64::consts::TAU;

use crate::body::{BodyId, RigidBody};
use crate::math::{cross_sv, Mat2, Mat3, Vec2, Vec3};
use crate::world::WorldConfig;

/// Baumgarte bias factor used by joints without an attached [`Softness`].
const RIGID_BETA: f64 = 0.2;

/// Frequencies below this are clamped up; a zero frequency would degenerate
/// the spring-damper reduction.
const MIN_FREQUENCY: f64 = 0.01;

/// Guard against division by a zero anchor separation.
const MIN_AXIS_LENGTH: f64 = 1e-9;

// ============================================================================
// Softness
// ============================================================================

/// Spring-damper parameterization of a soft joint.
#[derive(Clone, Copy, Debug)]
pub struct Softness {
    /// Oscillation frequency in Hz (clamped to at least 0.01).
    pub frequency: f64,
    /// Damping ratio, clamped to `[0, 1]`. 1 = critically damped.
    pub damping_ratio: f64,
    /// Effective mass for the spring; defaults to body B's mass.
    pub mass_override: Option<f64>,
}

impl Softness {
    /// Create a softness parameter set with the default effective mass.
    #[must_use]
    pub fn new(frequency: f64, damping_ratio: f64) -> Self {
        Self {
            frequency,
            damping_ratio,
            mass_override: None,
        }
    }

    /// Reduce the spring-damper to `(β, γ)` for timestep `h`.
    ///
    /// Every joint kind resolves its bias and softness through this one
    /// function, so the `1/((d + h·k)·h)` time dependence of γ cannot
    /// drift between kinds.
    fn resolve(&self, h: f64, default_mass: f64) -> (f64, f64) {
        let f = self.frequency.max(MIN_FREQUENCY);
        let zeta = self.damping_ratio.clamp(0.0, 1.0);
        let m = match self.mass_override {
            Some(m) if m > 0.0 => m,
            _ => {
                if default_mass > 0.0 {
                    default_mass
                } else {
                    1.0
                }
            }
        };
        let omega = TAU * f;
        let d = 2.0 * m * zeta * omega;
        let k = m * omega * omega;
        let beta = h * k / (d + h * k);
        let gamma = 1.0 / ((d + h * k) * h);
        (beta, gamma)
    }
}

/// β and γ for a joint: spring-damper reduction when soft, the fixed
/// Baumgarte default when rigid.
#[inline]
fn resolve_softness(softness: &Option<Softness>, h: f64, default_mass: f64) -> (f64, f64) {
    match softness {
        Some(s) => s.resolve(h, default_mass),
        None => (RIGID_BETA, 0.0),
    }
}

// ============================================================================
// DistanceJoint
// ============================================================================

/// Keeps two anchor points a fixed distance apart.
///
/// Jacobian `[-n, -(ra x n), n, (rb x n)]` with `n` the unit anchor-to-anchor
/// direction; position error `C = |pb - pa| - length`.
#[derive(Clone, Debug)]
pub struct DistanceJoint {
    /// First body
    pub body_a: BodyId,
    /// Second body
    pub body_b: BodyId,
    /// Anchor in body A's local space
    pub local_anchor_a: Vec2,
    /// Anchor in body B's local space
    pub local_anchor_b: Vec2,
    /// Rest length between the anchors
    pub length: f64,
    /// Optional spring-damper softness
    pub softness: Option<Softness>,
    normal: Vec2,
    r_a: Vec2,
    r_b: Vec2,
    mass: f64,
    bias: f64,
    gamma: f64,
    impulse: f64,
}

impl DistanceJoint {
    /// Create a rigid distance joint.
    #[must_use]
    pub fn new(
        body_a: BodyId,
        body_b: BodyId,
        local_anchor_a: Vec2,
        local_anchor_b: Vec2,
        length: f64,
    ) -> Self {
        Self {
            body_a,
            body_b,
            local_anchor_a,
            local_anchor_b,
            length,
            softness: None,
            normal: Vec2::UNIT_X,
            r_a: Vec2::ZERO,
            r_b: Vec2::ZERO,
            mass: 0.0,
            bias: 0.0,
            gamma: 0.0,
            impulse: 0.0,
        }
    }

    /// Attach spring-damper softness.
    #[must_use]
    pub fn with_softness(mut self, softness: Softness) -> Self {
        self.softness = Some(softness);
        self
    }

    fn prepare(&mut self, a: &mut RigidBody, b: &mut RigidBody, h: f64, config: &WorldConfig) {
        let pa = a.world_point(self.local_anchor_a);
        let pb = b.world_point(self.local_anchor_b);
        let delta = pb - pa;
        let dist = delta.length();
        self.normal = if dist > MIN_AXIS_LENGTH {
            delta / dist
        } else {
            Vec2::UNIT_Y
        };
        self.r_a = pa - a.position;
        self.r_b = pb - b.position;

        let (beta, gamma) = resolve_softness(&self.softness, h, b.mass());
        self.gamma = gamma;

        let rn_a = self.r_a.cross(self.normal);
        let rn_b = self.r_b.cross(self.normal);
        let k = a.inv_mass()
            + b.inv_mass()
            + a.inv_inertia() * rn_a * rn_a
            + b.inv_inertia() * rn_b * rn_b
            + gamma;
        self.mass = if k > 0.0 { 1.0 / k } else { 0.0 };

        let c = dist - self.length;
        self.bias = if config.position_correction {
            beta / h * c
        } else {
            0.0
        };

        if config.warm_starting {
            let impulse = self.normal * self.impulse;
            a.apply_impulse_with_offset(-impulse, self.r_a);
            b.apply_impulse_with_offset(impulse, self.r_b);
        } else {
            self.impulse = 0.0;
        }
    }

    fn solve(&mut self, a: &mut RigidBody, b: &mut RigidBody) {
        let rv = b.velocity + cross_sv(b.angular_velocity, self.r_b)
            - a.velocity
            - cross_sv(a.angular_velocity, self.r_a);
        let jv = rv.dot(self.normal);
        let lambda = -self.mass * (jv + self.bias + self.gamma * self.impulse);

        let impulse = self.normal * lambda;
        a.apply_impulse_with_offset(-impulse, self.r_a);
        b.apply_impulse_with_offset(impulse, self.r_b);
        self.impulse += lambda;
    }
}

// ============================================================================
// GrabJoint
// ============================================================================

/// Drags one body's anchor toward a world-space target (mouse picking).
///
/// Jacobian `[I, skew(r)]`; position error `C = p_world - target`.
#[derive(Clone, Debug)]
pub struct GrabJoint {
    /// The grabbed body
    pub body: BodyId,
    /// Grip point in the body's local space
    pub local_anchor: Vec2,
    /// World-space target the anchor is pulled toward
    pub target: Vec2,
    /// Optional spring-damper softness
    pub softness: Option<Softness>,
    r: Vec2,
    mass: Mat2,
    bias: Vec2,
    gamma: f64,
    impulse: Vec2,
}

impl GrabJoint {
    /// Create a rigid grab joint.
    #[must_use]
    pub fn new(body: BodyId, local_anchor: Vec2, target: Vec2) -> Self {
        Self {
            body,
            local_anchor,
            target,
            softness: None,
            r: Vec2::ZERO,
            mass: Mat2::ZERO,
            bias: Vec2::ZERO,
            gamma: 0.0,
            impulse: Vec2::ZERO,
        }
    }

    /// Attach spring-damper softness.
    #[must_use]
    pub fn with_softness(mut self, softness: Softness) -> Self {
        self.softness = Some(softness);
        self
    }

    fn prepare(&mut self, body: &mut RigidBody, h: f64, config: &WorldConfig) {
        let p = body.world_point(self.local_anchor);
        self.r = p - body.position;

        let (beta, gamma) = resolve_softness(&self.softness, h, body.mass());
        self.gamma = gamma;

        let im = body.inv_mass();
        let ii = body.inv_inertia();
        let r = self.r;
        // K = im·I + ii·[ry², -rx·ry; -rx·ry, rx²], softened on the diagonal
        let k = Mat2::new(
            im + ii * r.y * r.y + gamma,
            -ii * r.x * r.y,
            -ii * r.x * r.y,
            im + ii * r.x * r.x + gamma,
        );
        self.mass = k.inverse();

        let c = p - self.target;
        self.bias = if config.position_correction {
            c * (beta / h)
        } else {
            Vec2::ZERO
        };

        if config.warm_starting {
            body.apply_impulse_with_offset(self.impulse, self.r);
        } else {
            self.impulse = Vec2::ZERO;
        }
    }

    fn solve(&mut self, body: &mut RigidBody) {
        let jv = body.velocity + cross_sv(body.angular_velocity, self.r);
        let rhs = -(jv + self.bias + self.impulse * self.gamma);
        let lambda = self.mass.mul_vec(rhs);

        body.apply_impulse_with_offset(lambda, self.r);
        self.impulse = self.impulse + lambda;
    }
}

// ============================================================================
// WeldJoint
// ============================================================================

/// Locks two bodies' relative position and angle.
///
/// Rows: `[-I, -skew(ra), I, skew(rb)]` for the anchors plus `[0, -1, 0, 1]`
/// for the angle; position error `C = (pb - pa; θb - θa - θ0)`.
#[derive(Clone, Debug)]
pub struct WeldJoint {
    /// First body
    pub body_a: BodyId,
    /// Second body
    pub body_b: BodyId,
    /// Anchor in body A's local space
    pub local_anchor_a: Vec2,
    /// Anchor in body B's local space
    pub local_anchor_b: Vec2,
    /// Relative angle maintained by the weld
    pub reference_angle: f64,
    /// Optional spring-damper softness
    pub softness: Option<Softness>,
    r_a: Vec2,
    r_b: Vec2,
    mass: Mat3,
    bias: Vec3,
    gamma: f64,
    impulse: Vec3,
}

impl WeldJoint {
    /// Create a rigid weld joint.
    #[must_use]
    pub fn new(
        body_a: BodyId,
        body_b: BodyId,
        local_anchor_a: Vec2,
        local_anchor_b: Vec2,
        reference_angle: f64,
    ) -> Self {
        Self {
            body_a,
            body_b,
            local_anchor_a,
            local_anchor_b,
            reference_angle,
            softness: None,
            r_a: Vec2::ZERO,
            r_b: Vec2::ZERO,
            mass: Mat3::ZERO,
            bias: Vec3::ZERO,
            gamma: 0.0,
            impulse: Vec3::ZERO,
        }
    }

    /// Attach spring-damper softness.
    #[must_use]
    pub fn with_softness(mut self, softness: Softness) -> Self {
        self.softness = Some(softness);
        self
    }

    fn apply(&self, a: &mut RigidBody, b: &mut RigidBody, lambda: Vec3) {
        let p = lambda.xy();
        a.velocity = a.velocity - p * a.inv_mass();
        a.angular_velocity -= a.inv_inertia() * (self.r_a.cross(p) + lambda.z);
        b.velocity = b.velocity + p * b.inv_mass();
        b.angular_velocity += b.inv_inertia() * (self.r_b.cross(p) + lambda.z);
    }

    fn prepare(&mut self, a: &mut RigidBody, b: &mut RigidBody, h: f64, config: &WorldConfig) {
        let pa = a.world_point(self.local_anchor_a);
        let pb = b.world_point(self.local_anchor_b);
        self.r_a = pa - a.position;
        self.r_b = pb - b.position;

        let (beta, gamma) = resolve_softness(&self.softness, h, b.mass());
        self.gamma = gamma;

        let (im_a, im_b) = (a.inv_mass(), b.inv_mass());
        let (ii_a, ii_b) = (a.inv_inertia(), b.inv_inertia());
        let (ra, rb) = (self.r_a, self.r_b);

        let k00 = im_a + im_b + ii_a * ra.y * ra.y + ii_b * rb.y * rb.y + gamma;
        let k01 = -ii_a * ra.x * ra.y - ii_b * rb.x * rb.y;
        let k02 = -ii_a * ra.y - ii_b * rb.y;
        let k11 = im_a + im_b + ii_a * ra.x * ra.x + ii_b * rb.x * rb.x + gamma;
        let k12 = ii_a * ra.x + ii_b * rb.x;
        let k22 = ii_a + ii_b + gamma;
        self.mass = Mat3::from_rows([k00, k01, k02], [k01, k11, k12], [k02, k12, k22]).inverse();

        let c = Vec3::new(
            pb.x - pa.x,
            pb.y - pa.y,
            b.rotation - a.rotation - self.reference_angle,
        );
        self.bias = if config.position_correction {
            c * (beta / h)
        } else {
            Vec3::ZERO
        };

        if config.warm_starting {
            let impulse = self.impulse;
            self.apply(a, b, impulse);
        } else {
            self.impulse = Vec3::ZERO;
        }
    }

    fn solve(&mut self, a: &mut RigidBody, b: &mut RigidBody) {
        let rv = b.velocity + cross_sv(b.angular_velocity, self.r_b)
            - a.velocity
            - cross_sv(a.angular_velocity, self.r_a);
        let jv = Vec3::new(rv.x, rv.y, b.angular_velocity - a.angular_velocity);
        let rhs = -(jv + self.bias + self.impulse * self.gamma);
        let lambda = self.mass.mul_vec(rhs);

        self.apply(a, b, lambda);
        self.impulse = self.impulse + lambda;
    }
}

// ============================================================================
// LineJoint
// ============================================================================

/// Forbids lateral motion of anchor B relative to the anchor-to-anchor axis.
///
/// With `u = (pb - pa)/|pb - pa|` and `t = perp(u)`, the single row is
/// `[-t, -(ra + u) x t, t, rb x t]`. The axis is re-derived from the current
/// anchors every `prepare`, so the position error `u·t` is identically zero
/// and the constraint acts purely at the velocity level.
#[derive(Clone, Debug)]
pub struct LineJoint {
    /// First body
    pub body_a: BodyId,
    /// Second body
    pub body_b: BodyId,
    /// Anchor in body A's local space
    pub local_anchor_a: Vec2,
    /// Anchor in body B's local space
    pub local_anchor_b: Vec2,
    /// Optional spring-damper softness
    pub softness: Option<Softness>,
    t: Vec2,
    s_a: f64,
    s_b: f64,
    mass: f64,
    bias: f64,
    gamma: f64,
    impulse: f64,
}

impl LineJoint {
    /// Create a rigid line joint.
    #[must_use]
    pub fn new(body_a: BodyId, body_b: BodyId, local_anchor_a: Vec2, local_anchor_b: Vec2) -> Self {
        Self {
            body_a,
            body_b,
            local_anchor_a,
            local_anchor_b,
            softness: None,
            t: Vec2::UNIT_Y,
            s_a: 0.0,
            s_b: 0.0,
            mass: 0.0,
            bias: 0.0,
            gamma: 0.0,
            impulse: 0.0,
        }
    }

    /// Attach spring-damper softness.
    #[must_use]
    pub fn with_softness(mut self, softness: Softness) -> Self {
        self.softness = Some(softness);
        self
    }

    /// Shared row assembly for line and prismatic joints. Returns
    /// `(u, t, s_a, s_b)`.
    fn line_row(
        a: &RigidBody,
        b: &RigidBody,
        local_anchor_a: Vec2,
        local_anchor_b: Vec2,
    ) -> (Vec2, Vec2, f64, f64) {
        let pa = a.world_point(local_anchor_a);
        let pb = b.world_point(local_anchor_b);
        let delta = pb - pa;
        let len = delta.length();
        let u = if len > MIN_AXIS_LENGTH {
            delta / len
        } else {
            Vec2::UNIT_X
        };
        let t = u.perp();
        let r_a = pa - a.position;
        let r_b = pb - b.position;
        let s_a = (r_a + u).cross(t);
        let s_b = r_b.cross(t);
        (u, t, s_a, s_b)
    }

    fn apply(&self, a: &mut RigidBody, b: &mut RigidBody, lambda: f64) {
        let p = self.t * lambda;
        a.velocity = a.velocity - p * a.inv_mass();
        a.angular_velocity -= a.inv_inertia() * self.s_a * lambda;
        b.velocity = b.velocity + p * b.inv_mass();
        b.angular_velocity += b.inv_inertia() * self.s_b * lambda;
    }

    fn prepare(&mut self, a: &mut RigidBody, b: &mut RigidBody, h: f64, config: &WorldConfig) {
        let (u, t, s_a, s_b) = Self::line_row(a, b, self.local_anchor_a, self.local_anchor_b);
        self.t = t;
        self.s_a = s_a;
        self.s_b = s_b;

        let (beta, gamma) = resolve_softness(&self.softness, h, b.mass());
        self.gamma = gamma;

        let k = a.inv_mass()
            + b.inv_mass()
            + a.inv_inertia() * s_a * s_a
            + b.inv_inertia() * s_b * s_b
            + gamma;
        self.mass = if k > 0.0 { 1.0 / k } else { 0.0 };

        let c = u.dot(t);
        self.bias = if config.position_correction {
            beta / h * c
        } else {
            0.0
        };

        if config.warm_starting {
            let impulse = self.impulse;
            self.apply(a, b, impulse);
        } else {
            self.impulse = 0.0;
        }
    }

    fn solve(&mut self, a: &mut RigidBody, b: &mut RigidBody) {
        let jv = self.t.dot(b.velocity) + self.s_b * b.angular_velocity
            - self.t.dot(a.velocity)
            - self.s_a * a.angular_velocity;
        let lambda = -self.mass * (jv + self.bias + self.gamma * self.impulse);
        self.apply(a, b, lambda);
        self.impulse += lambda;
    }
}

// ============================================================================
// PrismaticJoint
// ============================================================================

/// Line joint plus a relative-angle lock: body B may only translate along
/// the anchor axis.
///
/// Rows: the line row and `[0, -1, 0, 1]`; position error
/// `C = (u·t; θb - θa - θ0)`.
#[derive(Clone, Debug)]
pub struct PrismaticJoint {
    /// First body
    pub body_a: BodyId,
    /// Second body
    pub body_b: BodyId,
    /// Anchor in body A's local space
    pub local_anchor_a: Vec2,
    /// Anchor in body B's local space
    pub local_anchor_b: Vec2,
    /// Relative angle maintained by the angular row
    pub reference_angle: f64,
    /// Optional spring-damper softness
    pub softness: Option<Softness>,
    t: Vec2,
    s_a: f64,
    s_b: f64,
    mass: Mat2,
    bias: Vec2,
    gamma: f64,
    impulse: Vec2,
}

impl PrismaticJoint {
    /// Create a rigid prismatic joint.
    #[must_use]
    pub fn new(
        body_a: BodyId,
        body_b: BodyId,
        local_anchor_a: Vec2,
        local_anchor_b: Vec2,
        reference_angle: f64,
    ) -> Self {
        Self {
            body_a,
            body_b,
            local_anchor_a,
            local_anchor_b,
            reference_angle,
            softness: None,
            t: Vec2::UNIT_Y,
            s_a: 0.0,
            s_b: 0.0,
            mass: Mat2::ZERO,
            bias: Vec2::ZERO,
            gamma: 0.0,
            impulse: Vec2::ZERO,
        }
    }

    /// Attach spring-damper softness.
    #[must_use]
    pub fn with_softness(mut self, softness: Softness) -> Self {
        self.softness = Some(softness);
        self
    }

    fn apply(&self, a: &mut RigidBody, b: &mut RigidBody, lambda: Vec2) {
        let p = self.t * lambda.x;
        a.velocity = a.velocity - p * a.inv_mass();
        a.angular_velocity -= a.inv_inertia() * (self.s_a * lambda.x + lambda.y);
        b.velocity = b.velocity + p * b.inv_mass();
        b.angular_velocity += b.inv_inertia() * (self.s_b * lambda.x + lambda.y);
    }

    fn prepare(&mut self, a: &mut RigidBody, b: &mut RigidBody, h: f64, config: &WorldConfig) {
        let (u, t, s_a, s_b) =
            LineJoint::line_row(a, b, self.local_anchor_a, self.local_anchor_b);
        self.t = t;
        self.s_a = s_a;
        self.s_b = s_b;

        let (beta, gamma) = resolve_softness(&self.softness, h, b.mass());
        self.gamma = gamma;

        let (im_a, im_b) = (a.inv_mass(), b.inv_mass());
        let (ii_a, ii_b) = (a.inv_inertia(), b.inv_inertia());
        let k11 = im_a + im_b + ii_a * s_a * s_a + ii_b * s_b * s_b + gamma;
        let k12 = ii_a * s_a + ii_b * s_b;
        let k22 = ii_a + ii_b + gamma;
        self.mass = Mat2::new(k11, k12, k12, k22).inverse();

        let c = Vec2::new(
            u.dot(t),
            b.rotation - a.rotation - self.reference_angle,
        );
        self.bias = if config.position_correction {
            c * (beta / h)
        } else {
            Vec2::ZERO
        };

        if config.warm_starting {
            let impulse = self.impulse;
            self.apply(a, b, impulse);
        } else {
            self.impulse = Vec2::ZERO;
        }
    }

    fn solve(&mut self, a: &mut RigidBody, b: &mut RigidBody) {
        let line_jv = self.t.dot(b.velocity) + self.s_b * b.angular_velocity
            - self.t.dot(a.velocity)
            - self.s_a * a.angular_velocity;
        let jv = Vec2::new(line_jv, b.angular_velocity - a.angular_velocity);
        let rhs = -(jv + self.bias + self.impulse * self.gamma);
        let lambda = self.mass.mul_vec(rhs);
        self.apply(a, b, lambda);
        self.impulse = self.impulse + lambda;
    }
}

// ============================================================================
// Joint enum
// ============================================================================

/// Closed set of joint kinds stored by the world.
///
/// The solver iteration order is centrally controlled, so dispatch is a
/// small match rather than an open trait object.
#[derive(Clone, Debug)]
pub enum Joint {
    /// Distance joint (1 row)
    Distance(DistanceJoint),
    /// Grab joint (2 rows, one body)
    Grab(GrabJoint),
    /// Weld joint (3 rows)
    Weld(WeldJoint),
    /// Line joint (1 row)
    Line(LineJoint),
    /// Prismatic joint (2 rows)
    Prismatic(PrismaticJoint),
}

impl Joint {
    /// The bodies this joint references. Grab joints have no second body.
    #[must_use]
    pub fn bodies(&self) -> (BodyId, Option<BodyId>) {
        match self {
            Joint::Distance(j) => (j.body_a, Some(j.body_b)),
            Joint::Grab(j) => (j.body, None),
            Joint::Weld(j) => (j.body_a, Some(j.body_b)),
            Joint::Line(j) => (j.body_a, Some(j.body_b)),
            Joint::Prismatic(j) => (j.body_a, Some(j.body_b)),
        }
    }

    /// `true` when this joint references `body`.
    #[must_use]
    pub fn references(&self, body: BodyId) -> bool {
        let (a, b) = self.bodies();
        a == body || b == Some(body)
    }

    pub(crate) fn prepare_two(
        &mut self,
        a: &mut RigidBody,
        b: &mut RigidBody,
        h: f64,
        config: &WorldConfig,
    ) {
        match self {
            Joint::Distance(j) => j.prepare(a, b, h, config),
            Joint::Weld(j) => j.prepare(a, b, h, config),
            Joint::Line(j) => j.prepare(a, b, h, config),
            Joint::Prismatic(j) => j.prepare(a, b, h, config),
            Joint::Grab(_) => {}
        }
    }

    pub(crate) fn solve_two(&mut self, a: &mut RigidBody, b: &mut RigidBody) {
        match self {
            Joint::Distance(j) => j.solve(a, b),
            Joint::Weld(j) => j.solve(a, b),
            Joint::Line(j) => j.solve(a, b),
            Joint::Prismatic(j) => j.solve(a, b),
            Joint::Grab(_) => {}
        }
    }

    pub(crate) fn prepare_one(&mut self, body: &mut RigidBody, h: f64, config: &WorldConfig) {
        if let Joint::Grab(j) = self {
            j.prepare(body, h, config);
        }
    }

    pub(crate) fn solve_one(&mut self, body: &mut RigidBody) {
        if let Joint::Grab(j) = self {
            j.solve(body);
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
    use crate::shape::Shape;

    fn unit_body(x: f64, y: f64) -> RigidBody {
        RigidBody::new_dynamic(Vec2::new(x, y), 1.0, Shape::circle(0.5)).unwrap()
    }

    fn rigid_config() -> WorldConfig {
        WorldConfig::default()
    }

    fn run_joint_two(
        joint: &mut Joint,
        a: &mut RigidBody,
        b: &mut RigidBody,
        steps: usize,
        config: &WorldConfig,
    ) {
        let h = config.fixed_delta_time;
        for _ in 0..steps {
            joint.prepare_two(a, b, h, config);
            for _ in 0..config.velocity_iterations {
                joint.solve_two(a, b);
            }
            a.position = a.position + a.velocity * h;
            a.rotation += a.angular_velocity * h;
            b.position = b.position + b.velocity * h;
            b.rotation += b.angular_velocity * h;
        }
    }

    #[test]
    fn test_softness_reduction() {
        // Hand-checked spring-damper reduction for f = 1 Hz, ζ = 1, m = 1,
        // h = 1/60
        let s = Softness::new(1.0, 1.0);
        let h = 1.0 / 60.0;
        let (beta, gamma) = s.resolve(h, 1.0);
        let omega = TAU;
        let d = 2.0 * omega;
        let k = omega * omega;
        assert!(abs(beta - h * k / (d + h * k)) < 1e-12);
        assert!(abs(gamma - 1.0 / ((d + h * k) * h)) < 1e-12);
        assert!(beta > 0.0 && beta < 1.0);
        assert!(gamma > 0.0);
    }

    #[test]
    fn test_softness_clamps() {
        let s = Softness::new(0.0, 5.0);
        let (beta, _gamma) = s.resolve(1.0 / 60.0, 1.0);
        // Frequency clamps up to 0.01, damping down to 1: still finite
        assert!(beta.is_finite() && beta > 0.0);
    }

    #[test]
    fn test_distance_joint_settles_to_length() {
        let mut a = unit_body(0.0, 0.0);
        let mut b = unit_body(10.0, 0.0);
        let mut joint = Joint::Distance(DistanceJoint::new(
            0,
            1,
            Vec2::ZERO,
            Vec2::ZERO,
            5.0,
        ));
        let config = rigid_config();
        run_joint_two(&mut joint, &mut a, &mut b, 120, &config);

        let separation = (b.position - a.position).length();
        assert!(
            abs(separation - 5.0) < 1e-3,
            "distance joint should settle at rest length, got {}",
            separation
        );
        // Symmetric pull: the midpoint stays put
        let mid = (a.position + b.position) * 0.5;
        assert!(abs(mid.x - 5.0) < 1e-6);
    }

    #[test]
    fn test_distance_joint_static_anchor() {
        let mut anchor = RigidBody::new_static(Vec2::ZERO, Shape::circle(0.1));
        let mut b = unit_body(8.0, 0.0);
        let mut joint = Joint::Distance(DistanceJoint::new(
            0,
            1,
            Vec2::ZERO,
            Vec2::ZERO,
            3.0,
        ));
        let config = rigid_config();
        run_joint_two(&mut joint, &mut anchor, &mut b, 120, &config);

        assert_eq!(anchor.position, Vec2::ZERO, "static body never moves");
        assert!(abs(b.position.length() - 3.0) < 1e-3);
    }

    #[test]
    fn test_grab_joint_pulls_to_target() {
        let mut body = unit_body(0.0, 0.0);
        let mut joint = Joint::Grab(
            GrabJoint::new(0, Vec2::ZERO, Vec2::new(5.0, 0.0))
                .with_softness(Softness::new(2.0, 1.0)),
        );
        let config = rigid_config();
        let h = config.fixed_delta_time;
        for _ in 0..60 {
            joint.prepare_one(&mut body, h, &config);
            for _ in 0..config.velocity_iterations {
                joint.solve_one(&mut body);
            }
            body.position = body.position + body.velocity * h;
            body.rotation += body.angular_velocity * h;
        }

        // One second of a critically damped 2 Hz spring: close and slow
        assert!(
            (body.position - Vec2::new(5.0, 0.0)).length() < 0.1,
            "grab target not reached: {:?}",
            body.position
        );
        assert!(body.velocity.length() < 0.1, "residual speed too high");
    }

    #[test]
    fn test_weld_joint_locks_pose() {
        let mut a = unit_body(0.0, 0.0);
        let mut b = unit_body(2.0, 0.0);
        b.velocity = Vec2::new(0.0, 3.0);
        b.angular_velocity = 2.0;

        let mut joint = Joint::Weld(WeldJoint::new(
            0,
            1,
            Vec2::new(1.0, 0.0),
            Vec2::new(-1.0, 0.0),
            0.0,
        ));
        let config = rigid_config();
        run_joint_two(&mut joint, &mut a, &mut b, 180, &config);

        let pa = a.world_point(Vec2::new(1.0, 0.0));
        let pb = b.world_point(Vec2::new(-1.0, 0.0));
        assert!(
            (pb - pa).length() < 1e-2,
            "weld anchors must coincide, gap = {}",
            (pb - pa).length()
        );
        assert!(
            abs(b.rotation - a.rotation) < 1e-2,
            "weld must lock relative angle"
        );
    }

    #[test]
    fn test_line_joint_kills_lateral_velocity() {
        let mut a = RigidBody::new_static(Vec2::ZERO, Shape::circle(0.1));
        let mut b = unit_body(4.0, 0.0);
        // Velocity with both axial and lateral parts w.r.t. the X axis
        b.velocity = Vec2::new(1.0, 2.0);

        let mut joint = Joint::Line(LineJoint::new(0, 1, Vec2::ZERO, Vec2::ZERO));
        let config = rigid_config();
        let h = config.fixed_delta_time;
        joint.prepare_two(&mut a, &mut b, h, &config);
        for _ in 0..config.velocity_iterations {
            joint.solve_two(&mut a, &mut b);
        }

        // t = perp(u) with u ~ +X, so the lateral (Y) velocity vanishes
        assert!(abs(b.velocity.y) < 1e-9, "lateral velocity must be removed");
        assert!(abs(b.velocity.x - 1.0) < 1e-9, "axial velocity untouched");
    }

    #[test]
    fn test_prismatic_joint_locks_rotation() {
        let mut a = RigidBody::new_static(Vec2::ZERO, Shape::circle(0.1));
        let mut b = unit_body(3.0, 0.0);
        b.velocity = Vec2::new(0.5, 1.5);
        b.angular_velocity = 4.0;

        let mut joint = Joint::Prismatic(PrismaticJoint::new(0, 1, Vec2::ZERO, Vec2::ZERO, 0.0));
        let config = rigid_config();
        let h = config.fixed_delta_time;
        joint.prepare_two(&mut a, &mut b, h, &config);
        for _ in 0..config.velocity_iterations {
            joint.solve_two(&mut a, &mut b);
        }

        assert!(abs(b.angular_velocity) < 1e-9, "spin must be removed");
        assert!(abs(b.velocity.y) < 1e-9, "lateral velocity must be removed");
        assert!(abs(b.velocity.x - 0.5) < 1e-9, "axial slide is free");
    }

    #[test]
    fn test_matched_softness_same_steady_state_error() {
        // A soft distance joint and a soft grab joint with the same (f, ζ)
        // and matched geometry must settle to comparable residual errors:
        // the γ time dependence is shared across joint kinds.
        let config = rigid_config();
        let soft = Softness::new(4.0, 1.0);

        let mut anchor = RigidBody::new_static(Vec2::ZERO, Shape::circle(0.1));
        let mut da = unit_body(2.0, 0.0);
        let mut dist = Joint::Distance(
            DistanceJoint::new(0, 1, Vec2::ZERO, Vec2::ZERO, 1.0).with_softness(soft),
        );
        run_joint_two(&mut dist, &mut anchor, &mut da, 600, &config);
        let dist_err = abs(da.position.length() - 1.0);

        let mut gb = unit_body(2.0, 0.0);
        let mut grab = Joint::Grab(GrabJoint::new(0, Vec2::ZERO, Vec2::new(1.0, 0.0)).with_softness(soft));
        let h = config.fixed_delta_time;
        for _ in 0..600 {
            grab.prepare_one(&mut gb, h, &config);
            for _ in 0..config.velocity_iterations {
                grab.solve_one(&mut gb);
            }
            gb.position = gb.position + gb.velocity * h;
        }
        let grab_err = (gb.position - Vec2::new(1.0, 0.0)).length();

        assert!(dist_err < 1e-2, "soft distance joint residual {}", dist_err);
        assert!(grab_err < 1e-2, "soft grab joint residual {}", grab_err);
    }

    #[test]
    fn test_joint_references() {
        let j = Joint::Distance(DistanceJoint::new(3, 7, Vec2::ZERO, Vec2::ZERO, 1.0));
        assert!(j.references(3));
        assert!(j.references(7));
        assert!(!j.references(5));

        let g = Joint::Grab(GrabJoint::new(4, Vec2::ZERO, Vec2::ZERO));
        assert!(g.references(4));
        assert!(!g.references(0));
    }
}
