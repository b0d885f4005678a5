//! Contact Impulse Cache (Warm Starting)
//!
//! Accumulated contact impulses survive across ticks keyed by contact
//! identity: the canonical body pair plus the [`FeaturePair`] that produced
//! the point. A contact point whose feature pair persists inherits its
//! previous accumulated impulses, which lets the iterative solver start near
//! last tick's solution instead of from zero.
//!
//! Entries not refreshed for a few frames are pruned.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

#[cfg(feature = "std")]
use std::collections::HashMap;

use crate::body::BodyId;
use crate::narrow::FeaturePair;

/// Canonical body pair key (smaller id first).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyPairKey {
    /// The smaller body id
    pub a: BodyId,
    /// The larger body id
    pub b: BodyId,
}

impl BodyPairKey {
    /// Create a canonical body pair key (ensures `a <= b`).
    #[inline]
    #[must_use]
    pub fn new(a: BodyId, b: BodyId) -> Self {
        if a <= b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }
}

/// A cached contact point: feature identity plus accumulated impulses.
#[derive(Clone, Copy, Debug)]
struct CachedContact {
    feature: FeaturePair,
    normal_impulse: f64,
    tangent_impulse: f64,
    /// Frames since this point was last stored
    stale_frames: u32,
}

/// Cached manifold for one body pair.
#[derive(Clone, Debug)]
struct CachedManifold {
    pair: BodyPairKey,
    points: Vec<CachedContact>,
}

/// Cross-tick store of accumulated contact impulses.
pub struct ContactCache {
    manifolds: Vec<CachedManifold>,
    /// O(1) pair lookup (std only; no_std falls back to a linear scan)
    #[cfg(feature = "std")]
    pair_index: HashMap<BodyPairKey, usize>,
    /// Frames a point may go unrefreshed before it is dropped
    pub max_stale_frames: u32,
}

impl ContactCache {
    /// Create a new empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            manifolds: Vec::new(),
            #[cfg(feature = "std")]
            pair_index: HashMap::new(),
            max_stale_frames: 2,
        }
    }

    /// Number of cached body pairs.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.manifolds.len()
    }

    /// `true` when nothing is cached.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.manifolds.is_empty()
    }

    /// Age every cached point by one frame. Call at the start of a substep.
    pub fn begin_frame(&mut self) {
        for manifold in &mut self.manifolds {
            for point in &mut manifold.points {
                point.stale_frames += 1;
            }
        }
    }

    /// Drop points that were not refreshed recently and pairs left empty.
    /// Call at the end of a substep.
    pub fn end_frame(&mut self) {
        let max_stale = self.max_stale_frames;
        for manifold in &mut self.manifolds {
            manifold.points.retain(|p| p.stale_frames <= max_stale);
        }
        self.manifolds.retain(|m| !m.points.is_empty());
        self.rebuild_index();
    }

    /// Fetch the warm-start impulses for a persisting contact point.
    #[must_use]
    pub fn lookup(&self, pair: BodyPairKey, feature: FeaturePair) -> Option<(f64, f64)> {
        let manifold = self.find(pair)?;
        manifold
            .points
            .iter()
            .find(|p| p.feature == feature)
            .map(|p| (p.normal_impulse, p.tangent_impulse))
    }

    /// Store a point's accumulated impulses, creating the manifold entry on
    /// first sight and resetting the point's staleness.
    pub fn store(
        &mut self,
        pair: BodyPairKey,
        feature: FeaturePair,
        normal_impulse: f64,
        tangent_impulse: f64,
    ) {
        let manifold = self.get_or_create(pair);
        if let Some(point) = manifold.points.iter_mut().find(|p| p.feature == feature) {
            point.normal_impulse = normal_impulse;
            point.tangent_impulse = tangent_impulse;
            point.stale_frames = 0;
        } else {
            manifold.points.push(CachedContact {
                feature,
                normal_impulse,
                tangent_impulse,
                stale_frames: 0,
            });
        }
    }

    /// Forget every pair involving `body`. Called when a body is destroyed
    /// so a recycled id can never inherit a stranger's impulses.
    pub fn remove_body(&mut self, body: BodyId) {
        self.manifolds
            .retain(|m| m.pair.a != body && m.pair.b != body);
        self.rebuild_index();
    }

    // =========== Internal methods ===========

    fn find(&self, pair: BodyPairKey) -> Option<&CachedManifold> {
        #[cfg(feature = "std")]
        {
            self.pair_index.get(&pair).map(|&i| &self.manifolds[i])
        }
        #[cfg(not(feature = "std"))]
        {
            self.manifolds.iter().find(|m| m.pair == pair)
        }
    }

    fn get_or_create(&mut self, pair: BodyPairKey) -> &mut CachedManifold {
        #[cfg(feature = "std")]
        let pos = self.pair_index.get(&pair).copied();
        #[cfg(not(feature = "std"))]
        let pos = self.manifolds.iter().position(|m| m.pair == pair);

        if let Some(idx) = pos {
            &mut self.manifolds[idx]
        } else {
            let idx = self.manifolds.len();
            self.manifolds.push(CachedManifold {
                pair,
                points: Vec::new(),
            });
            #[cfg(feature = "std")]
            self.pair_index.insert(pair, idx);
            &mut self.manifolds[idx]
        }
    }

    fn rebuild_index(&mut self) {
        #[cfg(feature = "std")]
        {
            self.pair_index.clear();
            for (i, m) in self.manifolds.iter().enumerate() {
                self.pair_index.insert(m.pair, i);
            }
        }
    }
}

impl Default for ContactCache {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const F: FeaturePair = FeaturePair { a: 2, b: 0 };

    #[test]
    fn test_pair_key_canonical() {
        assert_eq!(BodyPairKey::new(5, 2), BodyPairKey::new(2, 5));
        let k = BodyPairKey::new(9, 3);
        assert!(k.a <= k.b);
    }

    #[test]
    fn test_store_and_lookup() {
        let mut cache = ContactCache::new();
        let pair = BodyPairKey::new(0, 1);
        cache.store(pair, F, 1.5, -0.25);

        assert_eq!(cache.lookup(pair, F), Some((1.5, -0.25)));
        assert_eq!(
            cache.lookup(pair, FeaturePair { a: 4, b: 0 }),
            None,
            "different feature must not warm start"
        );
        assert_eq!(cache.lookup(BodyPairKey::new(0, 2), F), None);
    }

    #[test]
    fn test_store_updates_existing_point() {
        let mut cache = ContactCache::new();
        let pair = BodyPairKey::new(0, 1);
        cache.store(pair, F, 1.0, 0.0);
        cache.store(pair, F, 2.0, 0.5);
        assert_eq!(cache.lookup(pair, F), Some((2.0, 0.5)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_stale_points_pruned() {
        let mut cache = ContactCache::new();
        let pair = BodyPairKey::new(0, 1);
        cache.store(pair, F, 1.0, 0.0);

        // Refreshing each frame keeps the point alive
        for _ in 0..5 {
            cache.begin_frame();
            cache.store(pair, F, 1.0, 0.0);
            cache.end_frame();
        }
        assert!(cache.lookup(pair, F).is_some());

        // Going unrefreshed past the threshold drops it
        for _ in 0..=cache.max_stale_frames {
            cache.begin_frame();
            cache.end_frame();
        }
        assert!(cache.lookup(pair, F).is_none());
        assert!(cache.is_empty(), "empty manifolds are dropped");
    }

    #[test]
    fn test_remove_body_purges_pairs() {
        let mut cache = ContactCache::new();
        cache.store(BodyPairKey::new(0, 1), F, 1.0, 0.0);
        cache.store(BodyPairKey::new(1, 2), F, 2.0, 0.0);
        cache.store(BodyPairKey::new(2, 3), F, 3.0, 0.0);

        cache.remove_body(1);
        assert!(cache.lookup(BodyPairKey::new(0, 1), F).is_none());
        assert!(cache.lookup(BodyPairKey::new(1, 2), F).is_none());
        assert_eq!(cache.lookup(BodyPairKey::new(2, 3), F), Some((3.0, 0.0)));
    }
}
