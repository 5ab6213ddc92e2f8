//! Collision Shapes, Transforms, and Bounding Boxes
//!
//! All shapes are defined in local space relative to the body's center of
//! mass. World-space queries go through [`Shape::transformed`], which bakes a
//! [`Transform2`] into a [`TransformedShape`] exposing the convex support
//! queries the narrow phase consumes.

use glam::{vec2, Vec2};

// ============================================================================
// Transform2
// ============================================================================

/// Rigid 2D transform: translation plus rotation. No scale during simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2 {
    /// World-space translation.
    pub translation: Vec2,
    /// Orientation angle in radians (counter-clockwise from +X).
    pub rotation: f32,
}

impl Transform2 {
    /// Identity transform (no translation, no rotation).
    pub const IDENTITY: Self = Self {
        translation: Vec2::ZERO,
        rotation: 0.0,
    };

    /// Create a transform from a translation and a rotation angle.
    #[inline]
    #[must_use]
    pub const fn new(translation: Vec2, rotation: f32) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Translation-only transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(translation: Vec2) -> Self {
        Self {
            translation,
            rotation: 0.0,
        }
    }

    /// Transform a local-space point to world space.
    #[inline]
    #[must_use]
    pub fn apply(&self, point: Vec2) -> Vec2 {
        self.translation + Vec2::from_angle(self.rotation).rotate(point)
    }
}

impl Default for Transform2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ============================================================================
// Aabb
// ============================================================================

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec2,
    /// Maximum corner.
    pub max: Vec2,
}

impl Aabb {
    /// Create an AABB from min and max corners.
    #[inline]
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create an AABB from a center point and half-extents.
    #[inline]
    #[must_use]
    pub fn from_center_half(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// World-space AABB of a local AABB under a rigid transform.
    ///
    /// Transforms all four corners and re-bounds them, which is conservative
    /// under rotation.
    #[must_use]
    pub fn from_local(local: &Aabb, transform: &Transform2) -> Self {
        let corners = local.corners();
        let first = transform.apply(corners[0]);
        let mut min = first;
        let mut max = first;
        for &corner in &corners[1..] {
            let p = transform.apply(corner);
            min = min.min(p);
            max = max.max(p);
        }
        Self { min, max }
    }

    /// Expand into the swept volume covering this box and a displaced copy.
    #[inline]
    #[must_use]
    pub fn expanded(&self, displacement: Vec2) -> Self {
        Self {
            min: self.min + displacement.min(Vec2::ZERO),
            max: self.max + displacement.max(Vec2::ZERO),
        }
    }

    /// Overlap test against another AABB (boundary contact counts).
    #[inline]
    #[must_use]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Union of two AABBs.
    #[inline]
    #[must_use]
    pub fn union(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// The four corners, counter-clockwise starting at `min`.
    #[inline]
    #[must_use]
    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            vec2(self.max.x, self.min.y),
            self.max,
            vec2(self.min.x, self.max.y),
        ]
    }

    /// Center point.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

// ============================================================================
// Shape
// ============================================================================

/// Local-space collision shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Circle centered on the body origin.
    Circle {
        /// Radius of the circle.
        radius: f32,
    },
    /// Oriented box centered on the body origin.
    Box {
        /// Half-extents along the local axes.
        half_extents: Vec2,
    },
    /// Convex polygon. Vertices in counter-clockwise winding order.
    Polygon {
        /// Vertices in CCW order; must form a convex hull.
        vertices: Vec<Vec2>,
    },
    /// Axis-aligned box that never rotates with the body.
    Aabb {
        /// Half-extents along the world axes.
        half_extents: Vec2,
    },
}

impl Shape {
    /// Local-space AABB. Computed once per body at creation and cached.
    #[must_use]
    pub fn local_aabb(&self) -> Aabb {
        match self {
            Self::Circle { radius } => {
                Aabb::from_center_half(Vec2::ZERO, Vec2::splat(*radius))
            }
            Self::Box { half_extents } | Self::Aabb { half_extents } => {
                Aabb::from_center_half(Vec2::ZERO, *half_extents)
            }
            Self::Polygon { vertices } => {
                let mut min = Vec2::MAX;
                let mut max = Vec2::MIN;
                for &v in vertices {
                    min = min.min(v);
                    max = max.max(v);
                }
                Aabb::new(min, max)
            }
        }
    }

    /// Bake a transform into a world-space shape instance.
    ///
    /// The `Aabb` variant translates but never rotates.
    #[must_use]
    pub fn transformed(&self, transform: &Transform2) -> TransformedShape {
        match self {
            Self::Circle { radius } => TransformedShape::Circle {
                center: transform.translation,
                radius: *radius,
            },
            Self::Box { half_extents } => {
                let h = *half_extents;
                let corners = [
                    vec2(h.x, -h.y),
                    vec2(h.x, h.y),
                    vec2(-h.x, h.y),
                    vec2(-h.x, -h.y),
                ];
                TransformedShape::Hull {
                    vertices: corners.iter().map(|&c| transform.apply(c)).collect(),
                }
            }
            Self::Polygon { vertices } => TransformedShape::Hull {
                vertices: vertices.iter().map(|&v| transform.apply(v)).collect(),
            },
            Self::Aabb { half_extents } => {
                let h = *half_extents;
                let c = transform.translation;
                TransformedShape::Hull {
                    vertices: vec![
                        c + vec2(h.x, -h.y),
                        c + vec2(h.x, h.y),
                        c + vec2(-h.x, h.y),
                        c + vec2(-h.x, -h.y),
                    ],
                }
            }
        }
    }
}

// ============================================================================
// TransformedShape — world-space support queries
// ============================================================================

/// World-space shape instance with convex support queries.
#[derive(Clone, Debug, PartialEq)]
pub enum TransformedShape {
    /// Circle at a world-space center.
    Circle {
        /// World-space center.
        center: Vec2,
        /// Radius.
        radius: f32,
    },
    /// Convex hull with world-space vertices in CCW order.
    Hull {
        /// World-space vertices.
        vertices: Vec<Vec2>,
    },
}

impl TransformedShape {
    /// Furthest point on the shape in the given direction.
    #[must_use]
    pub fn support_point(&self, direction: Vec2) -> Vec2 {
        match self {
            Self::Circle { center, radius } => {
                *center + direction.normalize_or_zero() * *radius
            }
            Self::Hull { vertices } => {
                let mut best = vertices[0];
                let mut best_dot = best.dot(direction);
                for &v in &vertices[1..] {
                    let d = v.dot(direction);
                    if d > best_dot {
                        best = v;
                        best_dot = d;
                    }
                }
                best
            }
        }
    }

    /// Furthest edge in the given direction, as `(v0, v1)` in winding order.
    ///
    /// Circles have no edges and return a degenerate pair of the support
    /// point; callers must handle zero-length edges.
    #[must_use]
    pub fn support_edge(&self, direction: Vec2) -> (Vec2, Vec2) {
        match self {
            Self::Circle { .. } => {
                let p = self.support_point(direction);
                (p, p)
            }
            Self::Hull { vertices } => hull_support_edge(vertices, direction),
        }
    }

    /// Geometric center (circle center, or hull vertex mean).
    #[must_use]
    pub fn centroid(&self) -> Vec2 {
        match self {
            Self::Circle { center, .. } => *center,
            Self::Hull { vertices } => {
                let mut sum = Vec2::ZERO;
                for &v in vertices {
                    sum += v;
                }
                sum / vertices.len() as f32
            }
        }
    }
}

/// Pick the hull edge whose outward normal best aligns with `direction`.
fn hull_support_edge(vertices: &[Vec2], direction: Vec2) -> (Vec2, Vec2) {
    let n = vertices.len();
    if n < 2 {
        return (vertices[0], vertices[0]);
    }

    let mut best = 0;
    let mut best_dot = vertices[0].dot(direction);
    for (i, &v) in vertices.iter().enumerate().skip(1) {
        let d = v.dot(direction);
        if d > best_dot {
            best = i;
            best_dot = d;
        }
    }

    let prev = (best + n - 1) % n;
    let next = (best + 1) % n;

    // Outward normal of a CCW edge (v0 -> v1) is (dy, -dx).
    let e_in = vertices[best] - vertices[prev];
    let e_out = vertices[next] - vertices[best];
    let n_in = vec2(e_in.y, -e_in.x).normalize_or_zero();
    let n_out = vec2(e_out.y, -e_out.x).normalize_or_zero();

    if n_in.dot(direction) > n_out.dot(direction) {
        (vertices[prev], vertices[best])
    } else {
        (vertices[best], vertices[next])
    }
}

// ============================================================================
// Tests
// ============================================================================
