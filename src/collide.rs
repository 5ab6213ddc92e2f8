//! Collision Detection using GJK and EPA
//!
//! Convex intersection and penetration queries over world-space shapes.
//!
//! # Algorithms
//!
//! - **GJK (Gilbert-Johnson-Keerthi)**: determines whether two convex shapes
//!   intersect, returning the terminating simplex on a hit
//! - **EPA (Expanding Polytope Algorithm)**: computes penetration depth and
//!   direction given a containing simplex
//!
//! Both are stateless pure functions. The [`CollisionBackend`] trait is the
//! seam the world steps through, so tests can substitute mock geometry.

use glam::{vec2, Vec2};

use crate::shape::TransformedShape;

/// Iteration cap for the GJK refinement loop.
const GJK_MAX_ITERATIONS: usize = 32;
/// Iteration cap for EPA polytope expansion.
const EPA_MAX_ITERATIONS: usize = 48;
/// EPA convergence threshold on the support/edge distance gap.
const EPA_EPSILON: f32 = 1e-4;
/// Squared length below which a search direction counts as degenerate.
const DEGENERATE_SQ: f32 = 1e-10;

// ============================================================================
// Simplex
// ============================================================================

/// GJK simplex (up to 3 points in 2D).
///
/// New points are pushed at index 0; older points shift toward the back.
#[derive(Clone, Copy, Debug)]
pub struct Simplex2 {
    points: [Vec2; 3],
    len: usize,
}

impl Simplex2 {
    fn new() -> Self {
        Self {
            points: [Vec2::ZERO; 3],
            len: 0,
        }
    }

    fn push(&mut self, point: Vec2) {
        self.points[2] = self.points[1];
        self.points[1] = self.points[0];
        self.points[0] = point;
        self.len = (self.len + 1).min(3);
    }

    fn set(&mut self, points: &[Vec2]) {
        for (i, &p) in points.iter().enumerate().take(3) {
            self.points[i] = p;
        }
        self.len = points.len().min(3);
    }

    /// Append a point at the back without evicting (used to pad degenerate
    /// simplices before EPA).
    fn append(&mut self, point: Vec2) {
        if self.len < 3 {
            self.points[self.len] = point;
            self.len += 1;
        }
    }

    /// Active points.
    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points[..self.len]
    }

    /// Number of active points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no points are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

// ============================================================================
// Penetration
// ============================================================================

/// Penetration query result.
#[derive(Clone, Copy, Debug)]
pub struct Penetration {
    /// Unit direction pointing from shape B toward shape A.
    pub normal: Vec2,
    /// Penetration depth (non-negative).
    pub distance: f32,
}

// ============================================================================
// CollisionBackend
// ============================================================================

/// Geometry seam consumed by the world.
///
/// The default implementation is [`GjkEpa`]; tests may inject mocks.
pub trait CollisionBackend {
    /// Discrete convex intersection test. `Some` carries the terminating
    /// simplex for a follow-up penetration query.
    fn intersect(
        &self,
        a: &TransformedShape,
        b: &TransformedShape,
    ) -> Option<Simplex2>;

    /// Penetration depth and direction for a confirmed intersection.
    fn penetration(
        &self,
        a: &TransformedShape,
        b: &TransformedShape,
        simplex: &Simplex2,
    ) -> Penetration;
}

/// Default backend: GJK intersection + EPA penetration.
#[derive(Clone, Copy, Debug, Default)]
pub struct GjkEpa;

impl CollisionBackend for GjkEpa {
    fn intersect(
        &self,
        a: &TransformedShape,
        b: &TransformedShape,
    ) -> Option<Simplex2> {
        intersect_gjk(a, b)
    }

    fn penetration(
        &self,
        a: &TransformedShape,
        b: &TransformedShape,
        simplex: &Simplex2,
    ) -> Penetration {
        penetration_epa(a, b, simplex)
    }
}

// ============================================================================
// GJK
// ============================================================================

/// Minkowski difference support point (A - B).
#[inline]
fn minkowski_support(a: &TransformedShape, b: &TransformedShape, direction: Vec2) -> Vec2 {
    a.support_point(direction) - b.support_point(-direction)
}

/// GJK intersection test.
///
/// Returns the terminating simplex when the shapes overlap, `None` otherwise.
pub fn intersect_gjk(a: &TransformedShape, b: &TransformedShape) -> Option<Simplex2> {
    let mut direction = b.centroid() - a.centroid();
    if direction.length_squared() < DEGENERATE_SQ {
        direction = Vec2::X;
    }

    let mut simplex = Simplex2::new();
    simplex.push(minkowski_support(a, b, direction));
    direction = -simplex.points[0];

    for _ in 0..GJK_MAX_ITERATIONS {
        if direction.length_squared() < DEGENERATE_SQ {
            // Origin sits on the simplex boundary: touching contact.
            pad_simplex(a, b, &mut simplex);
            return Some(simplex);
        }

        let point = minkowski_support(a, b, direction);
        if point.dot(direction) < 0.0 {
            // The support point never crossed the origin: separated.
            return None;
        }
        simplex.push(point);

        if advance_simplex(&mut simplex, &mut direction) {
            pad_simplex(a, b, &mut simplex);
            return Some(simplex);
        }
    }

    None
}

/// Evolve the simplex toward the origin. Returns `true` when it is enclosed.
fn advance_simplex(simplex: &mut Simplex2, direction: &mut Vec2) -> bool {
    match simplex.len {
        2 => advance_line(simplex, direction),
        3 => advance_triangle(simplex, direction),
        _ => false,
    }
}

fn advance_line(simplex: &mut Simplex2, direction: &mut Vec2) -> bool {
    let a = simplex.points[0];
    let b = simplex.points[1];
    let ab = b - a;
    let ao = -a;

    if ab.dot(ao) > 0.0 {
        // Origin is beside the segment: search perpendicular, origin side.
        let perp = vec2(-ab.y, ab.x);
        *direction = if perp.dot(ao) >= 0.0 { perp } else { -perp };
    } else {
        simplex.set(&[a]);
        *direction = ao;
    }
    false
}

fn advance_triangle(simplex: &mut Simplex2, direction: &mut Vec2) -> bool {
    let a = simplex.points[0];
    let b = simplex.points[1];
    let c = simplex.points[2];

    let ab = b - a;
    let ac = c - a;
    let ao = -a;

    // Edge normals oriented away from the opposite vertex.
    let mut ab_perp = vec2(-ab.y, ab.x);
    if ab_perp.dot(ac) > 0.0 {
        ab_perp = -ab_perp;
    }
    let mut ac_perp = vec2(-ac.y, ac.x);
    if ac_perp.dot(ab) > 0.0 {
        ac_perp = -ac_perp;
    }

    if ab_perp.dot(ao) > 0.0 {
        simplex.set(&[a, b]);
        *direction = ab_perp;
        return false;
    }
    if ac_perp.dot(ao) > 0.0 {
        simplex.set(&[a, c]);
        *direction = ac_perp;
        return false;
    }

    // Origin is inside the triangle.
    true
}

/// Grow a degenerate terminating simplex to 3 points so EPA can seed its
/// polytope. Touching contacts can end GJK with one or two points.
fn pad_simplex(a: &TransformedShape, b: &TransformedShape, simplex: &mut Simplex2) {
    const DIRS: [Vec2; 4] = [Vec2::X, Vec2::Y, Vec2::NEG_X, Vec2::NEG_Y];
    let mut i = 0;
    while simplex.len() < 3 && i < DIRS.len() {
        let p = minkowski_support(a, b, DIRS[i]);
        i += 1;
        let duplicate = simplex
            .points()
            .iter()
            .any(|&q| (q - p).length_squared() < DEGENERATE_SQ);
        if !duplicate {
            simplex.append(p);
        }
    }
}

// ============================================================================
// EPA
// ============================================================================

/// EPA penetration query.
///
/// Expands the terminating GJK simplex into a polytope hugging the Minkowski
/// difference boundary until the closest edge converges. The returned normal
/// points from B toward A (the direction along which A must translate by
/// `distance` to separate).
pub fn penetration_epa(
    a: &TransformedShape,
    b: &TransformedShape,
    simplex: &Simplex2,
) -> Penetration {
    let mut polytope: Vec<Vec2> = simplex.points().to_vec();

    // Fallback direction for fully degenerate polytopes (coincident shapes).
    let fallback = (a.centroid() - b.centroid())
        .try_normalize()
        .unwrap_or(Vec2::X);
    if polytope.len() < 3 {
        return Penetration {
            normal: fallback,
            distance: 0.0,
        };
    }

    // Ensure counter-clockwise winding so edge normals face outward.
    let area = (polytope[1] - polytope[0]).perp_dot(polytope[2] - polytope[0]);
    if area < 0.0 {
        polytope.swap(1, 2);
    }

    let mut closest_normal = fallback;
    let mut closest_distance = 0.0;

    for _ in 0..EPA_MAX_ITERATIONS {
        let Some((index, normal, distance)) = closest_edge(&polytope) else {
            return Penetration {
                normal: fallback,
                distance: 0.0,
            };
        };
        closest_normal = normal;
        closest_distance = distance;

        let support = minkowski_support(a, b, normal);
        let support_distance = support.dot(normal);

        if support_distance - distance < EPA_EPSILON {
            break;
        }
        polytope.insert(index + 1, support);
    }

    // The polytope is A - B, so A separates by moving against the outward
    // edge normal. Flip it to the B-toward-A convention.
    Penetration {
        normal: -closest_normal,
        distance: closest_distance,
    }
}

/// Find the polytope edge closest to the origin: `(index, outward normal,
/// distance)`. `None` if every edge is degenerate.
fn closest_edge(polytope: &[Vec2]) -> Option<(usize, Vec2, f32)> {
    let n = polytope.len();
    let mut best: Option<(usize, Vec2, f32)> = None;

    for i in 0..n {
        let v0 = polytope[i];
        let v1 = polytope[(i + 1) % n];
        let edge = v1 - v0;

        let Some(mut normal) = vec2(edge.y, -edge.x).try_normalize() else {
            continue;
        };
        let mut distance = normal.dot(v0);
        if distance < 0.0 {
            // Winding slipped on a near-degenerate polytope; re-orient.
            normal = -normal;
            distance = -distance;
        }

        if best.map_or(true, |(_, _, d)| distance < d) {
            best = Some((i, normal, distance));
        }
    }

    best
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Shape, Transform2};

    fn circle_at(x: f32, y: f32, radius: f32) -> TransformedShape {
        Shape::Circle { radius }.transformed(&Transform2::from_translation(vec2(x, y)))
    }

    fn box_at(x: f32, y: f32, hx: f32, hy: f32) -> TransformedShape {
        Shape::Box {
            half_extents: vec2(hx, hy),
        }
        .transformed(&Transform2::from_translation(vec2(x, y)))
    }

    #[test]
    fn test_gjk_circles_overlapping() {
        let a = circle_at(0.0, 0.0, 1.0);
        let b = circle_at(1.5, 0.0, 1.0);
        assert!(intersect_gjk(&a, &b).is_some(), "Overlapping circles must hit");
    }

    #[test]
    fn test_gjk_circles_separated() {
        let a = circle_at(0.0, 0.0, 1.0);
        let b = circle_at(5.0, 0.0, 1.0);
        assert!(intersect_gjk(&a, &b).is_none(), "Separated circles must miss");
    }

    #[test]
    fn test_gjk_boxes_overlapping() {
        let a = box_at(0.0, 0.0, 1.0, 1.0);
        let b = box_at(1.5, 0.5, 1.0, 1.0);
        assert!(intersect_gjk(&a, &b).is_some());
    }

    #[test]
    fn test_gjk_box_circle_separated_diagonal() {
        let a = box_at(0.0, 0.0, 1.0, 1.0);
        let b = circle_at(3.0, 3.0, 1.0);
        assert!(intersect_gjk(&a, &b).is_none());
    }

    #[test]
    fn test_epa_circle_depth_and_direction() {
        let a = circle_at(0.0, 0.0, 1.0);
        let b = circle_at(1.5, 0.0, 1.0);
        let simplex = intersect_gjk(&a, &b).expect("circles overlap");
        let pen = penetration_epa(&a, &b, &simplex);

        // Overlap = r_a + r_b - distance = 0.5
        assert!(
            (pen.distance - 0.5).abs() < 0.05,
            "depth should be ~0.5, got {}",
            pen.distance
        );
        // Normal points from B toward A: -X
        assert!(
            pen.normal.x < -0.9,
            "normal should point from B toward A, got {:?}",
            pen.normal
        );
    }

    #[test]
    fn test_epa_box_box_axis_depth() {
        let a = box_at(0.0, 0.0, 1.0, 1.0);
        let b = box_at(1.6, 0.0, 1.0, 1.0);
        let simplex = intersect_gjk(&a, &b).expect("boxes overlap");
        let pen = penetration_epa(&a, &b, &simplex);
        assert!(
            (pen.distance - 0.4).abs() < 0.01,
            "axis overlap is 0.4, got {}",
            pen.distance
        );
        assert!(pen.normal.x < -0.99, "minimum axis is -X, got {:?}", pen.normal);
    }

    #[test]
    fn test_backend_trait_dispatch() {
        let backend = GjkEpa;
        let a = circle_at(0.0, 0.0, 1.0);
        let b = circle_at(0.5, 0.0, 1.0);
        let simplex = backend.intersect(&a, &b).expect("deep overlap");
        let pen = backend.penetration(&a, &b, &simplex);
        assert!(pen.distance > 1.0, "deep overlap, got {}", pen.distance);
    }

    #[test]
    fn test_simplex_push_evicts_oldest() {
        let mut s = Simplex2::new();
        s.push(vec2(1.0, 0.0));
        s.push(vec2(2.0, 0.0));
        s.push(vec2(3.0, 0.0));
        s.push(vec2(4.0, 0.0));
        assert_eq!(s.len(), 3);
        assert_eq!(s.points()[0], vec2(4.0, 0.0), "newest point sits at the front");
    }
}
