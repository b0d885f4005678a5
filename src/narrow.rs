//! Narrow-Phase Contact Generation
//!
//! Built-in manifold provider for the shipped shape set: analytic
//! circle-circle, Voronoi-region circle-polygon, and SAT polygon-polygon.
//! The solver consumes only the [`Manifold`] contract, so an external
//! narrow phase can replace this module wholesale.
//!
//! Every contact point carries a [`FeaturePair`] naming the shape features
//! (edge or vertex indices) that produced it. Points whose feature pair
//! persists across ticks inherit their accumulated impulses through the
//! contact cache (warm starting).

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::body::RigidBody;
use crate::math::{sqrt, Vec2};
use crate::shape::Shape;

/// Identifies the pair of shape features (edge/vertex indices) that
/// generated a contact point. Circles always report feature `0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeaturePair {
    /// Feature index on body A's shape
    pub a: u32,
    /// Feature index on body B's shape
    pub b: u32,
}

/// A single contact point produced by the narrow phase.
#[derive(Clone, Copy, Debug)]
pub struct ContactPoint {
    /// World-space contact point
    pub point: Vec2,
    /// Penetration depth (positive means overlapping)
    pub penetration: f64,
    /// Stable feature identity for warm starting
    pub feature: FeaturePair,
}

/// Contact manifold between two bodies.
#[derive(Clone, Debug)]
pub struct Manifold {
    /// Contact normal, pointing from body A toward body B
    pub normal: Vec2,
    /// Contact points (currently a single deepest point)
    pub points: Vec<ContactPoint>,
}

/// Generate a contact manifold for two bodies, or `None` when separated.
///
/// The normal always points from `body_a` toward `body_b`.
#[must_use]
pub fn collide(body_a: &RigidBody, body_b: &RigidBody) -> Option<Manifold> {
    match (&body_a.shape, &body_b.shape) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(body_a.position, *ra, body_b.position, *rb)
        }
        (Shape::Circle { radius }, Shape::Polygon { vertices }) => {
            // Polygon-space result has its normal pointing at the circle
            // (B -> A); flip it into the A -> B convention.
            circle_polygon(body_a.position, *radius, body_b, vertices).map(
                |(normal, point, penetration, poly_feature)| Manifold {
                    normal: -normal,
                    points: vec1(ContactPoint {
                        point,
                        penetration,
                        feature: FeaturePair {
                            a: 0,
                            b: poly_feature,
                        },
                    }),
                },
            )
        }
        (Shape::Polygon { vertices }, Shape::Circle { radius }) => {
            circle_polygon(body_b.position, *radius, body_a, vertices).map(
                |(normal, point, penetration, poly_feature)| Manifold {
                    normal,
                    points: vec1(ContactPoint {
                        point,
                        penetration,
                        feature: FeaturePair {
                            a: poly_feature,
                            b: 0,
                        },
                    }),
                },
            )
        }
        (Shape::Polygon { vertices: va }, Shape::Polygon { vertices: vb }) => {
            polygon_polygon(body_a, va, body_b, vb)
        }
    }
}

#[inline]
fn vec1(p: ContactPoint) -> Vec<ContactPoint> {
    let mut v = Vec::with_capacity(1);
    v.push(p);
    v
}

/// Circle vs circle collision test.
fn circle_circle(pos_a: Vec2, radius_a: f64, pos_b: Vec2, radius_b: f64) -> Option<Manifold> {
    let delta = pos_b - pos_a;
    let dist_sq = delta.length_squared();
    let sum_r = radius_a + radius_b;

    if dist_sq > sum_r * sum_r {
        return None;
    }

    let dist = sqrt(dist_sq);
    let normal = if dist == 0.0 {
        Vec2::UNIT_Y
    } else {
        delta / dist
    };

    let penetration = sum_r - dist;
    let point = pos_a + normal * (radius_a - penetration * 0.5);

    Some(Manifold {
        normal,
        points: vec1(ContactPoint {
            point,
            penetration,
            feature: FeaturePair { a: 0, b: 0 },
        }),
    })
}

/// Transform polygon vertices from local space to world space.
fn transform_vertices(body: &RigidBody, local_verts: &[Vec2]) -> Vec<Vec2> {
    local_verts.iter().map(|v| body.world_point(*v)).collect()
}

/// Circle vs convex polygon using the closest edge's Voronoi regions.
///
/// Returns `(normal pointing from polygon toward circle, contact point,
/// penetration, polygon feature id)`. Edge regions report feature `2*i`,
/// vertex regions `2*i + 1` for vertex `i`.
fn circle_polygon(
    circle_pos: Vec2,
    circle_radius: f64,
    poly_body: &RigidBody,
    poly_verts: &[Vec2],
) -> Option<(Vec2, Vec2, f64, u32)> {
    if poly_verts.len() < 3 {
        return None;
    }

    let world_verts = transform_vertices(poly_body, poly_verts);
    let n = world_verts.len();

    // Most-separating edge
    let mut best_dist = f64::NEG_INFINITY;
    let mut best_normal = Vec2::ZERO;
    let mut best_idx = 0;

    for i in 0..n {
        let a = world_verts[i];
        let b = world_verts[(i + 1) % n];
        let edge = b - a;
        // Outward normal for CCW winding
        let normal = Vec2::new(edge.y, -edge.x).normalize();
        let d = (circle_pos - a).dot(normal);
        if d > best_dist {
            best_dist = d;
            best_normal = normal;
            best_idx = i;
        }
    }

    if best_dist > circle_radius {
        return None;
    }

    // Voronoi region of the best edge: vertex or edge contact
    let a = world_verts[best_idx];
    let b = world_verts[(best_idx + 1) % n];
    let edge = b - a;
    let edge_len_sq = edge.length_squared();
    let t = if edge_len_sq == 0.0 {
        0.0
    } else {
        (circle_pos - a).dot(edge) / edge_len_sq
    };

    if t < 0.0 {
        let delta = circle_pos - a;
        let dist = delta.length();
        if dist > circle_radius || dist == 0.0 {
            return None;
        }
        let normal = delta / dist;
        Some((
            normal,
            a,
            circle_radius - dist,
            2 * best_idx as u32 + 1,
        ))
    } else if t > 1.0 {
        let delta = circle_pos - b;
        let dist = delta.length();
        if dist > circle_radius || dist == 0.0 {
            return None;
        }
        let normal = delta / dist;
        Some((
            normal,
            b,
            circle_radius - dist,
            2 * (((best_idx + 1) % n) as u32) + 1,
        ))
    } else {
        let penetration = circle_radius - best_dist;
        if penetration < 0.0 {
            return None;
        }
        let point = circle_pos - best_normal * best_dist;
        Some((best_normal, point, penetration, 2 * best_idx as u32))
    }
}

/// Convex polygon vs convex polygon using SAT (Separating Axis Theorem).
fn polygon_polygon(
    body_a: &RigidBody,
    verts_a: &[Vec2],
    body_b: &RigidBody,
    verts_b: &[Vec2],
) -> Option<Manifold> {
    if verts_a.len() < 3 || verts_b.len() < 3 {
        return None;
    }

    let world_a = transform_vertices(body_a, verts_a);
    let world_b = transform_vertices(body_b, verts_b);

    let (depth_a, normal_a, edge_a) = sat_test_axes(&world_a, &world_b)?;
    let (depth_b, normal_b, edge_b) = sat_test_axes(&world_b, &world_a)?;

    let (mut normal, penetration) = if depth_a < depth_b {
        (normal_a, depth_a)
    } else {
        (normal_b, depth_b)
    };

    // Ensure the normal points from A to B
    let center_a = polygon_centroid(&world_a);
    let center_b = polygon_centroid(&world_b);
    if (center_b - center_a).dot(normal) < 0.0 {
        normal = -normal;
    }

    let point = (center_a + center_b) * 0.5;

    Some(Manifold {
        normal,
        points: vec1(ContactPoint {
            point,
            penetration,
            feature: FeaturePair {
                a: edge_a as u32,
                b: edge_b as u32,
            },
        }),
    })
}

/// Test all edge normals of `poly_ref` as separating axes against
/// `poly_test`. Returns the minimum overlap depth, its normal, and the
/// reference edge index, or `None` if a separating axis is found.
fn sat_test_axes(poly_ref: &[Vec2], poly_test: &[Vec2]) -> Option<(f64, Vec2, usize)> {
    let n = poly_ref.len();
    let mut min_depth = f64::INFINITY;
    let mut best_normal = Vec2::ZERO;
    let mut best_edge = 0;

    for i in 0..n {
        let a = poly_ref[i];
        let b = poly_ref[(i + 1) % n];
        let edge = b - a;
        let normal = Vec2::new(edge.y, -edge.x).normalize();

        let (min_a, max_a) = project_polygon(poly_ref, normal);
        let (min_b, max_b) = project_polygon(poly_test, normal);

        if max_a < min_b || max_b < min_a {
            return None;
        }

        let overlap1 = max_a - min_b;
        let overlap2 = max_b - min_a;
        let depth = overlap1.min(overlap2);

        if depth < min_depth {
            min_depth = depth;
            best_normal = normal;
            best_edge = i;
        }
    }

    Some((min_depth, best_normal, best_edge))
}

/// Project a polygon onto an axis and return (min, max) projections.
fn project_polygon(verts: &[Vec2], axis: Vec2) -> (f64, f64) {
    let mut min_proj = verts[0].dot(axis);
    let mut max_proj = min_proj;
    for v in verts.iter().skip(1) {
        let p = v.dot(axis);
        min_proj = min_proj.min(p);
        max_proj = max_proj.max(p);
    }
    (min_proj, max_proj)
}

/// Centroid of a polygon (vertex average).
fn polygon_centroid(verts: &[Vec2]) -> Vec2 {
    let mut sum = Vec2::ZERO;
    for v in verts {
        sum = sum + *v;
    }
    sum / verts.len() as f64
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::abs;

    fn circle_at(x: f64, y: f64, radius: f64) -> RigidBody {
        RigidBody::new_dynamic(Vec2::new(x, y), 1.0, Shape::circle(radius)).unwrap()
    }

    fn rect_at(x: f64, y: f64, hx: f64, hy: f64) -> RigidBody {
        RigidBody::new_dynamic(Vec2::new(x, y), 1.0, Shape::rect(Vec2::new(hx, hy))).unwrap()
    }

    #[test]
    fn test_circle_circle_overlap() {
        let a = circle_at(0.0, 0.0, 1.0);
        let b = circle_at(1.5, 0.0, 1.0);
        let m = collide(&a, &b).expect("overlapping circles must collide");
        assert!(abs(m.normal.x - 1.0) < 1e-12, "normal points A toward B");
        assert!(abs(m.points[0].penetration - 0.5) < 1e-12);
    }

    #[test]
    fn test_circle_circle_separated() {
        let a = circle_at(0.0, 0.0, 1.0);
        let b = circle_at(3.0, 0.0, 1.0);
        assert!(collide(&a, &b).is_none());
    }

    #[test]
    fn test_circle_polygon_edge_contact() {
        let poly = rect_at(0.0, 0.0, 1.0, 1.0);
        let circle = circle_at(0.0, 1.5, 0.6);
        // Circle above the box, overlapping the top edge by 0.1
        let m = collide(&circle, &poly).expect("must collide");
        assert!(
            abs(m.normal.y + 1.0) < 1e-9,
            "normal from circle (A) toward box (B) is -Y, got {:?}",
            m.normal
        );
        assert!(abs(m.points[0].penetration - 0.1) < 1e-9);
        // Swapped order flips the normal
        let m2 = collide(&poly, &circle).expect("must collide");
        assert!(abs(m2.normal.y - 1.0) < 1e-9);
    }

    #[test]
    fn test_circle_polygon_vertex_contact() {
        let poly = rect_at(0.0, 0.0, 1.0, 1.0);
        let circle = circle_at(1.3, 1.3, 0.5);
        let m = collide(&poly, &circle).expect("corner contact");
        // Normal points from box toward circle: along the (1,1) diagonal
        assert!(m.normal.x > 0.0 && m.normal.y > 0.0);
        // Vertex features are odd-coded
        assert_eq!(m.points[0].feature.a % 2, 1);
    }

    #[test]
    fn test_polygon_polygon_sat() {
        let a = rect_at(0.0, 0.0, 1.0, 1.0);
        let b = rect_at(1.5, 0.0, 1.0, 1.0);
        let m = collide(&a, &b).expect("overlapping boxes must collide");
        assert!(abs(m.normal.x - 1.0) < 1e-9, "normal A toward B is +X");
        assert!(abs(m.points[0].penetration - 0.5) < 1e-9);

        let c = rect_at(5.0, 0.0, 1.0, 1.0);
        assert!(collide(&a, &c).is_none(), "separated boxes");
    }

    #[test]
    fn test_feature_pair_stable_across_small_motion() {
        let poly = rect_at(0.0, 0.0, 1.0, 1.0);
        let circle1 = circle_at(0.0, 1.5, 0.6);
        let circle2 = circle_at(0.05, 1.49, 0.6);
        let f1 = collide(&poly, &circle1).unwrap().points[0].feature;
        let f2 = collide(&poly, &circle2).unwrap().points[0].feature;
        assert_eq!(f1, f2, "sliding contact keeps its feature identity");
    }
}
