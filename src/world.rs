//! Physics World
//!
//! Owns all bodies and joints, the broad-phase tree, and the contact cache,
//! and drives the fixed-timestep pipeline:
//!
//! `integrate forces → refresh tree → broad phase → narrow phase → prepare
//! constraints (joints, then contacts) → N velocity iterations → integrate
//! poses`.
//!
//! `step(dt)` accumulates real elapsed time and runs whole substeps of
//! `fixed_delta_time`; a step is synchronous and completes in full. Within a
//! tick, constraints mutate velocities only; poses change only in the final
//! integration phase.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::mem;

use crate::aabb::Aabb;
use crate::body::{BodyId, RigidBody};
use crate::contact::ContactConstraint;
use crate::contact_cache::{BodyPairKey, ContactCache};
use crate::error::PhysicsError;
use crate::joint::Joint;
use crate::math::Vec2;
use crate::narrow;
use crate::tree::AabbTree;

/// Stable numeric joint identifier handed out by the world.
pub type JointId = u32;

// ============================================================================
// Configuration
// ============================================================================

/// World-global solver configuration.
#[derive(Clone, Copy, Debug)]
pub struct WorldConfig {
    /// Gravitational acceleration applied to every dynamic body.
    pub gravity: Vec2,
    /// Solver timestep in seconds (> 0). `step` consumes real time in whole
    /// multiples of this.
    pub fixed_delta_time: f64,
    /// Gauss-Seidel velocity iterations per substep (>= 1).
    pub velocity_iterations: u32,
    /// When false, every constraint's position bias is zeroed at prepare
    /// time and drift is not corrected.
    pub position_correction: bool,
    /// When false, accumulated impulses are neither applied at prepare time
    /// nor carried across ticks.
    pub warm_starting: bool,
    /// Enlargement margin for dynamic leaves in the AABB tree (>= 0).
    pub aabb_margin: f64,
    /// Approach speeds below this produce no restitution (>= 0).
    pub restitution_slop: f64,
    /// Penetration below this produces no position bias (>= 0).
    pub linear_slop: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -10.0),
            fixed_delta_time: 1.0 / 60.0,
            velocity_iterations: 10,
            position_correction: true,
            warm_starting: true,
            aabb_margin: 0.05,
            restitution_slop: 0.01,
            linear_slop: 0.005,
        }
    }
}

impl WorldConfig {
    /// Check every parameter range. The world refuses construction on the
    /// first violation.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !(self.fixed_delta_time > 0.0 && self.fixed_delta_time.is_finite()) {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "fixed_delta_time must be positive and finite",
            });
        }
        if self.velocity_iterations == 0 {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "velocity_iterations must be at least 1",
            });
        }
        if !(self.aabb_margin >= 0.0) {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "aabb_margin must be non-negative",
            });
        }
        if !(self.restitution_slop >= 0.0) {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "restitution_slop must be non-negative",
            });
        }
        if !(self.linear_slop >= 0.0) {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "linear_slop must be non-negative",
            });
        }
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "gravity must be finite",
            });
        }
        Ok(())
    }
}

// ============================================================================
// Step statistics
// ============================================================================

/// Per-substep counters, overwritten each substep.
#[derive(Clone, Copy, Debug, Default)]
pub struct StepStats {
    /// Candidate pairs emitted by the broad phase
    pub broadphase_pairs: u32,
    /// Narrow-phase tests actually run (static-static pairs are skipped)
    pub narrowphase_tests: u32,
    /// Contact points fed to the solver
    pub contacts: u32,
    /// Joints fed to the solver
    pub joints: u32,
    /// Velocity iterations run
    pub solver_iterations: u32,
    /// Summed node area of the AABB tree after the substep
    pub tree_cost: f64,
}

// ============================================================================
// World
// ============================================================================

struct JointEntry {
    id: JointId,
    joint: Joint,
}

/// The physics world: bodies, joints, broad phase, and the step driver.
pub struct World {
    /// Solver configuration. May be tuned between steps; never during one.
    pub config: WorldConfig,
    bodies: Vec<Option<RigidBody>>,
    free_bodies: Vec<BodyId>,
    tree: AabbTree,
    joints: Vec<JointEntry>,
    next_joint_id: JointId,
    cache: ContactCache,
    accumulator: f64,
    stats: StepStats,
}

impl World {
    /// Create a world. Fails if the configuration is out of range.
    pub fn new(config: WorldConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        Ok(Self {
            config,
            bodies: Vec::new(),
            free_bodies: Vec::new(),
            tree: AabbTree::new(),
            joints: Vec::new(),
            next_joint_id: 0,
            cache: ContactCache::new(),
            accumulator: 0.0,
            stats: StepStats::default(),
        })
    }

    /// Add a body; its tree leaf is created immediately. Returns the body's
    /// stable id.
    pub fn add(&mut self, mut body: RigidBody) -> BodyId {
        let id = match self.free_bodies.pop() {
            Some(id) => id,
            None => {
                self.bodies.push(None);
                (self.bodies.len() - 1) as BodyId
            }
        };
        let margin = if body.is_dynamic() {
            self.config.aabb_margin
        } else {
            0.0
        };
        let fat = body.compute_aabb().enlarged(margin);
        body.node = Some(self.tree.insert(fat, id));
        self.bodies[id as usize] = Some(body);
        id
    }

    /// Remove a body. Its tree leaf is destroyed, every joint referencing it
    /// is dropped, and its cached contact impulses are purged. Returns the
    /// body, or `None` for an unknown id.
    pub fn remove(&mut self, id: BodyId) -> Option<RigidBody> {
        let mut body = self.bodies.get_mut(id as usize)?.take()?;
        if let Some(node) = body.node.take() {
            self.tree.remove(node);
        }
        self.joints.retain(|e| !e.joint.references(id));
        self.cache.remove_body(id);
        self.free_bodies.push(id);
        Some(body)
    }

    /// Borrow a body.
    #[inline]
    #[must_use]
    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(id as usize)?.as_ref()
    }

    /// Mutably borrow a body.
    #[inline]
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(id as usize)?.as_mut()
    }

    /// Number of live bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.iter().filter(|s| s.is_some()).count()
    }

    /// Register a joint. Fails with [`PhysicsError::DanglingReference`] when
    /// a referenced body is unknown and with
    /// [`PhysicsError::InvalidConfiguration`] when every referenced body is
    /// static; on failure the world is unchanged.
    pub fn add_joint(&mut self, joint: Joint) -> Result<JointId, PhysicsError> {
        let (a_id, b_id) = joint.bodies();
        let a = self
            .body(a_id)
            .ok_or(PhysicsError::DanglingReference { body: a_id })?;
        match b_id {
            Some(b_id) => {
                let b = self
                    .body(b_id)
                    .ok_or(PhysicsError::DanglingReference { body: b_id })?;
                if a.is_static() && b.is_static() {
                    return Err(PhysicsError::InvalidConfiguration {
                        reason: "joint between two static bodies",
                    });
                }
            }
            None => {
                if a.is_static() {
                    return Err(PhysicsError::InvalidConfiguration {
                        reason: "grab joint requires a dynamic body",
                    });
                }
            }
        }
        let id = self.next_joint_id;
        self.next_joint_id += 1;
        self.joints.push(JointEntry { id, joint });
        Ok(id)
    }

    /// Remove a joint by id. Returns it, or `None` for an unknown id.
    pub fn remove_joint(&mut self, id: JointId) -> Option<Joint> {
        let pos = self.joints.iter().position(|e| e.id == id)?;
        Some(self.joints.remove(pos).joint)
    }

    /// Borrow a joint.
    #[must_use]
    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.iter().find(|e| e.id == id).map(|e| &e.joint)
    }

    /// Mutably borrow a joint (e.g. to move a grab target).
    pub fn joint_mut(&mut self, id: JointId) -> Option<&mut Joint> {
        self.joints
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| &mut e.joint)
    }

    /// Number of live joints.
    #[inline]
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// All bodies whose (fat) leaf AABB contains `p`.
    #[must_use]
    pub fn query_point(&self, p: Vec2) -> Vec<BodyId> {
        self.tree.query_point(p)
    }

    /// All bodies whose (fat) leaf AABB overlaps `region`.
    #[must_use]
    pub fn query_region(&self, region: Aabb) -> Vec<BodyId> {
        self.tree.query_region(region)
    }

    /// Candidate overlapping pairs from the broad phase, each at most once.
    #[must_use]
    pub fn collision_pairs(&self) -> Vec<(BodyId, BodyId)> {
        self.tree.collision_pairs()
    }

    /// Diagnostic: summed node area of the broad-phase tree.
    #[inline]
    #[must_use]
    pub fn tree_cost(&self) -> f64 {
        self.tree.cost()
    }

    /// Counters from the most recent substep.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &StepStats {
        &self.stats
    }

    /// Advance the simulation by `dt` seconds of real time, running whole
    /// substeps of `fixed_delta_time` and banking the remainder.
    pub fn step(&mut self, dt: f64) {
        let h = self.config.fixed_delta_time;
        if !(h > 0.0) || !(dt >= 0.0) || !dt.is_finite() {
            return;
        }
        self.accumulator += dt;
        while self.accumulator >= h {
            self.substep(h);
            self.accumulator -= h;
        }
    }

    fn substep(&mut self, h: f64) {
        let mut stats = StepStats::default();
        let config = self.config;

        // 1. Integrate external forces (gravity + accumulated force/torque)
        // into velocities; position integration waits for the solver.
        for slot in &mut self.bodies {
            if let Some(body) = slot {
                if body.is_dynamic() {
                    let accel = config.gravity + body.force * body.inv_mass();
                    body.velocity = body.velocity + accel * h;
                    body.angular_velocity += body.torque * body.inv_inertia() * h;
                }
                body.force = Vec2::ZERO;
                body.torque = 0.0;
            }
        }

        // 2. Refresh tree leaves whose body escaped the fat bounds
        // (remove + insert inside `update`)
        for i in 0..self.bodies.len() {
            let (node, tight, margin) = match &self.bodies[i] {
                Some(body) => match body.node {
                    Some(node) => (
                        node,
                        body.compute_aabb(),
                        if body.is_dynamic() {
                            config.aabb_margin
                        } else {
                            0.0
                        },
                    ),
                    None => continue,
                },
                None => continue,
            };
            self.tree.update(node, &tight, tight.enlarged(margin));
        }

        // 3. Broad phase
        let pairs = self.tree.collision_pairs();
        stats.broadphase_pairs = pairs.len() as u32;

        // 4. Narrow phase; contact constraints are rebuilt each tick but
        // inherit accumulated impulses by feature identity
        self.cache.begin_frame();
        let mut contacts: Vec<ContactConstraint> = Vec::new();
        for (pa, pb) in pairs {
            let (id_a, id_b) = if pa <= pb { (pa, pb) } else { (pb, pa) };
            let a = match self.body(id_a) {
                Some(a) => a,
                None => continue,
            };
            let b = match self.body(id_b) {
                Some(b) => b,
                None => continue,
            };
            if a.is_static() && b.is_static() {
                continue;
            }
            stats.narrowphase_tests += 1;
            if let Some(manifold) = narrow::collide(a, b) {
                let mut constraint = ContactConstraint::new(id_a, id_b, &manifold, a, b);
                if config.warm_starting {
                    let key = BodyPairKey::new(id_a, id_b);
                    for p in &mut constraint.points {
                        if let Some((ln, lt)) = self.cache.lookup(key, p.feature) {
                            p.normal_impulse = ln;
                            p.tangent_impulse = lt;
                        }
                    }
                }
                stats.contacts += constraint.points.len() as u32;
                contacts.push(constraint);
            }
        }
        stats.joints = self.joints.len() as u32;

        // 5. Prepare: joints in insertion order, then contacts in
        // enumeration order
        let mut joints = mem::take(&mut self.joints);
        for entry in &mut joints {
            match entry.joint.bodies() {
                (a_id, Some(b_id)) => {
                    if let Some((a, b)) = body_pair_mut(&mut self.bodies, a_id, b_id) {
                        entry.joint.prepare_two(a, b, h, &config);
                    }
                }
                (a_id, None) => {
                    if let Some(body) =
                        self.bodies.get_mut(a_id as usize).and_then(|s| s.as_mut())
                    {
                        entry.joint.prepare_one(body, h, &config);
                    }
                }
            }
        }
        for c in &mut contacts {
            if let Some((a, b)) = body_pair_mut(&mut self.bodies, c.body_a, c.body_b) {
                c.prepare(a, b, h, &config);
            }
        }

        // 6. Velocity iterations, same order as preparation
        for _ in 0..config.velocity_iterations {
            for entry in &mut joints {
                match entry.joint.bodies() {
                    (a_id, Some(b_id)) => {
                        if let Some((a, b)) = body_pair_mut(&mut self.bodies, a_id, b_id) {
                            entry.joint.solve_two(a, b);
                        }
                    }
                    (a_id, None) => {
                        if let Some(body) =
                            self.bodies.get_mut(a_id as usize).and_then(|s| s.as_mut())
                        {
                            entry.joint.solve_one(body);
                        }
                    }
                }
            }
            for c in &mut contacts {
                if let Some((a, b)) = body_pair_mut(&mut self.bodies, c.body_a, c.body_b) {
                    c.solve(a, b);
                }
            }
        }
        stats.solver_iterations = config.velocity_iterations;
        self.joints = joints;

        // 7. Integrate velocities into poses
        for slot in &mut self.bodies {
            if let Some(body) = slot {
                if body.is_dynamic() {
                    body.position = body.position + body.velocity * h;
                    body.rotation += body.angular_velocity * h;
                }
            }
        }

        // 8. Persist accumulated impulses for next tick's warm start
        if config.warm_starting {
            for c in &contacts {
                let key = BodyPairKey::new(c.body_a, c.body_b);
                for p in &c.points {
                    self.cache
                        .store(key, p.feature, p.normal_impulse, p.tangent_impulse);
                }
            }
        }
        self.cache.end_frame();

        stats.tree_cost = self.tree.cost();
        self.stats = stats;
    }
}

/// Disjoint mutable borrows of two body slots, in the requested order.
fn body_pair_mut(
    bodies: &mut [Option<RigidBody>],
    a: BodyId,
    b: BodyId,
) -> Option<(&mut RigidBody, &mut RigidBody)> {
    let (a_idx, b_idx) = (a as usize, b as usize);
    if a_idx == b_idx || a_idx >= bodies.len() || b_idx >= bodies.len() {
        return None;
    }
    if a_idx < b_idx {
        let (left, right) = bodies.split_at_mut(b_idx);
        match (left[a_idx].as_mut(), right[0].as_mut()) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    } else {
        let (left, right) = bodies.split_at_mut(a_idx);
        match (right[0].as_mut(), left[b_idx].as_mut()) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
