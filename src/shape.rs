//! Collision Shapes
//!
//! Minimal 2D shape set consumed by the narrow phase and by AABB
//! construction. Shapes are defined in body-local space relative to the
//! center of mass.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(not(feature = "std"))]
use alloc::vec;

use crate::aabb::Aabb;
use crate::math::{sqrt, Vec2};

/// 2D collision shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Circle defined by its radius.
    Circle {
        /// Radius of the circle.
        radius: f64,
    },
    /// Convex polygon defined by vertices in CCW winding order.
    Polygon {
        /// Vertices in counter-clockwise order. Must form a convex hull.
        vertices: Vec<Vec2>,
    },
}

impl Shape {
    /// Create a circle shape.
    #[inline]
    #[must_use]
    pub fn circle(radius: f64) -> Self {
        Self::Circle { radius }
    }

    /// Create an axis-aligned rectangle (in local space) from half-extents.
    #[must_use]
    pub fn rect(half_extents: Vec2) -> Self {
        let h = half_extents;
        Self::Polygon {
            vertices: vec![
                Vec2::new(-h.x, -h.y),
                Vec2::new(h.x, -h.y),
                Vec2::new(h.x, h.y),
                Vec2::new(-h.x, h.y),
            ],
        }
    }

    /// Rotational inertia about the center of mass for the given mass.
    #[must_use]
    pub fn inertia(&self, mass: f64) -> f64 {
        match self {
            Self::Circle { radius } => {
                // I = 0.5 * m * r^2
                mass * radius * radius * 0.5
            }
            Self::Polygon { vertices } => {
                if vertices.len() < 3 {
                    return 0.0;
                }
                let n = vertices.len();
                let mut numerator = 0.0;
                let mut denominator = 0.0;
                for i in 0..n {
                    let a = vertices[i];
                    let b = vertices[(i + 1) % n];
                    let cross = crate::math::abs(a.cross(b));
                    numerator += cross * (a.dot(a) + a.dot(b) + b.dot(b));
                    denominator += cross;
                }
                if denominator == 0.0 {
                    return 0.0;
                }
                mass * numerator / (denominator * 6.0)
            }
        }
    }

    /// Local-space bounding box at zero rotation.
    #[must_use]
    pub fn local_extents(&self) -> Aabb {
        match self {
            Self::Circle { radius } => Aabb::new(
                Vec2::new(-radius, -radius),
                Vec2::new(*radius, *radius),
            ),
            Self::Polygon { vertices } => {
                let mut min = Vec2::new(f64::INFINITY, f64::INFINITY);
                let mut max = Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
                for v in vertices {
                    min = min.min(*v);
                    max = max.max(*v);
                }
                Aabb::new(min, max)
            }
        }
    }

    /// Radius of the smallest circle centered at the origin containing the
    /// shape. Used for rotation-independent conservative bounds.
    #[must_use]
    pub fn bounding_radius(&self) -> f64 {
        match self {
            Self::Circle { radius } => *radius,
            Self::Polygon { vertices } => {
                let mut max_sq = 0.0f64;
                for v in vertices {
                    max_sq = max_sq.max(v.length_squared());
                }
                sqrt(max_sq)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::abs;

    #[test]
    fn test_circle_inertia() {
        // I = 0.5 * m * r^2
        let s = Shape::circle(2.0);
        assert!(abs(s.inertia(3.0) - 6.0) < 1e-12);
    }

    #[test]
    fn test_rect_inertia_matches_closed_form() {
        // Box inertia: I = m * (w^2 + h^2) / 12 with w = 2a, h = 2b
        let s = Shape::rect(Vec2::new(1.0, 2.0));
        let expected = 1.0 * (4.0 + 16.0) / 12.0;
        assert!(
            abs(s.inertia(1.0) - expected) < 1e-9,
            "polygon formula should reduce to the box formula, got {}",
            s.inertia(1.0)
        );
    }

    #[test]
    fn test_degenerate_polygon_inertia() {
        let s = Shape::Polygon {
            vertices: vec![Vec2::ZERO, Vec2::UNIT_X],
        };
        assert_eq!(s.inertia(1.0), 0.0);
    }

    #[test]
    fn test_local_extents() {
        let c = Shape::circle(1.5);
        let e = c.local_extents();
        assert_eq!(e.min, Vec2::new(-1.5, -1.5));

        let r = Shape::rect(Vec2::new(2.0, 1.0));
        let e = r.local_extents();
        assert_eq!(e.max, Vec2::new(2.0, 1.0));
    }

    #[test]
    fn test_bounding_radius() {
        let r = Shape::rect(Vec2::new(3.0, 4.0));
        assert!(abs(r.bounding_radius() - 5.0) < 1e-12);
    }
}
