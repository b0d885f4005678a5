//! Axis-Aligned Bounding Boxes
//!
//! The broad phase reasons exclusively in terms of [`Aabb`]s: conservative
//! rectangles with `min.x <= max.x` and `min.y <= max.y`. User-supplied
//! rectangles (region queries) are repaired with [`Aabb::fixed`] before use.

use crate::math::Vec2;

/// Axis-aligned bounding box with `min` and `max` corners.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    /// Lower-left corner
    pub min: Vec2,
    /// Upper-right corner
    pub max: Vec2,
}

impl Aabb {
    /// Create a new AABB. The corners are stored as given; call
    /// [`Aabb::fixed`] if the input may be inverted.
    #[inline]
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Restore the `min <= max` invariant component-wise. Arbitrary corner
    /// pairs become a well-formed box covering the same region.
    #[inline]
    #[must_use]
    pub fn fixed(self) -> Self {
        Self {
            min: self.min.min(self.max),
            max: self.min.max(self.max),
        }
    }

    /// Surface area (in 2D: the rectangle area).
    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        (self.max.x - self.min.x) * (self.max.y - self.min.y)
    }

    /// Smallest AABB containing both `self` and `other`.
    #[inline]
    #[must_use]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Overlap test (closed intervals: touching boxes overlap).
    #[inline]
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Point containment test (boundary inclusive).
    #[inline]
    #[must_use]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// `true` when `other` lies entirely inside `self`.
    #[inline]
    #[must_use]
    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
    }

    /// Grow the box by `margin` in every direction.
    #[inline]
    #[must_use]
    pub fn enlarged(&self, margin: f64) -> Aabb {
        let m = Vec2::new(margin, margin);
        Aabb {
            min: self.min - m,
            max: self.max + m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_restores_invariant() {
        let inverted = Aabb::new(Vec2::new(3.0, -1.0), Vec2::new(1.0, 2.0)).fixed();
        assert_eq!(inverted.min, Vec2::new(1.0, -1.0));
        assert_eq!(inverted.max, Vec2::new(3.0, 2.0));
        assert!(inverted.min.x <= inverted.max.x && inverted.min.y <= inverted.max.y);
    }

    #[test]
    fn test_area_and_union() {
        let a = Aabb::new(Vec2::ZERO, Vec2::new(2.0, 3.0));
        assert_eq!(a.area(), 6.0);

        let b = Aabb::new(Vec2::new(-1.0, 1.0), Vec2::new(1.0, 4.0));
        let u = a.union(&b);
        assert_eq!(u.min, Vec2::new(-1.0, 0.0));
        assert_eq!(u.max, Vec2::new(2.0, 4.0));
    }

    #[test]
    fn test_overlap() {
        let a = Aabb::new(Vec2::ZERO, Vec2::ONE);
        let b = Aabb::new(Vec2::new(0.5, 0.5), Vec2::new(2.0, 2.0));
        let c = Aabb::new(Vec2::new(1.5, 1.5), Vec2::new(2.0, 2.0));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        // Touching edges count as overlap
        let d = Aabb::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0));
        assert!(a.overlaps(&d));
    }

    #[test]
    fn test_contains_point() {
        let a = Aabb::new(Vec2::ZERO, Vec2::ONE);
        assert!(a.contains_point(Vec2::new(0.5, 0.5)));
        assert!(a.contains_point(Vec2::new(1.0, 1.0)), "boundary is inside");
        assert!(!a.contains_point(Vec2::new(1.1, 0.5)));
    }

    #[test]
    fn test_contains_and_enlarged() {
        let a = Aabb::new(Vec2::ZERO, Vec2::ONE);
        let fat = a.enlarged(0.5);
        assert!(fat.contains(&a));
        assert!(!a.contains(&fat));
        assert_eq!(fat.min, Vec2::new(-0.5, -0.5));
    }
}
