//! Narrow Phase — Discrete and Continuous Detection, Manifold Construction
//!
//! For each broad-phase candidate pair, decides whether (and where) the
//! bodies touch within the step and materializes a [`ContactManifold`].
//!
//! Pairs at rest relative to each other take the discrete path: one
//! intersection test at the current transforms. Moving pairs take a
//! bisection search over the step's time fraction — a fixed-iteration
//! conservative-advancement approximation, not a root finder. Its acceptance
//! thresholds live in [`CcdConfig`] and are tunables, not physical
//! invariants.

use glam::{vec2, Vec2};

use crate::body::Body;
use crate::collide::{CollisionBackend, Penetration};
use crate::pool::BodyId;
use crate::shape::{Transform2, TransformedShape};

/// Squared length below which a support edge counts as degenerate.
const DEGENERATE_EDGE_SQ: f32 = 1e-10;

// ============================================================================
// CcdConfig
// ============================================================================

/// Tuning knobs for the continuous-detection bisection.
#[derive(Clone, Copy, Debug)]
pub struct CcdConfig {
    /// Accept a bisection sample once its penetration depth drops below this
    /// (world units).
    pub accept_distance: f32,
    /// Accept any intersecting sample once the bisection range has shrunk
    /// below this floor.
    pub min_range: f32,
    /// Hard cap on bisection iterations.
    pub max_iterations: usize,
}

impl Default for CcdConfig {
    fn default() -> Self {
        Self {
            accept_distance: 1.0,
            min_range: 0.0625,
            max_iterations: 32,
        }
    }
}

// ============================================================================
// ContactManifold
// ============================================================================

/// A single contact between two bodies.
#[derive(Clone, Copy, Debug)]
pub struct ContactManifold {
    /// The "A" side (canonically the lower-indexed body of the pair).
    pub body_a: BodyId,
    /// The "B" side.
    pub body_b: BodyId,
    /// Unit normal pointing from B toward A along the minimum-separation
    /// axis.
    pub normal: Vec2,
    /// Representative contact point on body A.
    pub position: Vec2,
    /// Normal-projected gap between the contact point and B's reference
    /// edge. Negative when penetrating.
    pub signed_distance: f32,
}

impl ContactManifold {
    /// Whether this contact still overlaps.
    #[inline]
    #[must_use]
    pub fn is_penetrating(&self) -> bool {
        self.signed_distance < 0.0
    }

    /// Same contact viewed with A and B exchanged.
    #[must_use]
    pub fn swapped(&self) -> Self {
        Self {
            body_a: self.body_b,
            body_b: self.body_a,
            normal: -self.normal,
            position: self.position,
            signed_distance: self.signed_distance,
        }
    }
}

// ============================================================================
// Detection
// ============================================================================

/// Detect a contact for one candidate pair within this step.
///
/// Dispatches to the discrete test when the pair has no relative linear
/// velocity, and to the bisection search otherwise. `None` is the expected
/// steady state for pairs that never touch.
pub fn detect(
    a: &Body,
    b: &Body,
    dt: f32,
    backend: &dyn CollisionBackend,
    ccd: &CcdConfig,
) -> Option<ContactManifold> {
    let relative_velocity = a.linear_velocity - b.linear_velocity;
    if relative_velocity == Vec2::ZERO {
        detect_discrete(a, b, backend)
    } else {
        detect_continuous(a, b, dt, backend, ccd)
    }
}

/// One intersection test at the bodies' current transforms.
pub fn detect_discrete(
    a: &Body,
    b: &Body,
    backend: &dyn CollisionBackend,
) -> Option<ContactManifold> {
    let shape_a = a.shape.transformed(&a.transform);
    let shape_b = b.shape.transformed(&b.transform);
    let simplex = backend.intersect(&shape_a, &shape_b)?;
    let penetration = backend.penetration(&shape_a, &shape_b, &simplex);
    Some(build_manifold(a.id, b.id, &shape_a, &shape_b, &penetration))
}

/// Bisection search over the step's time fraction `[0, 1]`.
///
/// Starts at the end of the step and walks the fraction backward while the
/// sample penetrates too deeply, forward after overshooting into empty
/// space. A non-intersecting sample at fraction 1 means the bodies never
/// touch this step.
pub fn detect_continuous(
    a: &Body,
    b: &Body,
    dt: f32,
    backend: &dyn CollisionBackend,
    ccd: &CcdConfig,
) -> Option<ContactManifold> {
    let mut fraction = 1.0f32;
    let mut range = 2.0f32;

    for _ in 0..ccd.max_iterations {
        let t = dt * fraction;
        let shape_a = a.shape.transformed(&transform_at(a, t));
        let shape_b = b.shape.transformed(&transform_at(b, t));

        if let Some(simplex) = backend.intersect(&shape_a, &shape_b) {
            let penetration = backend.penetration(&shape_a, &shape_b, &simplex);
            if penetration.distance < ccd.accept_distance || range < ccd.min_range {
                return Some(build_manifold(a.id, b.id, &shape_a, &shape_b, &penetration));
            }
            // Too deep: the first contact happened earlier in the step.
            range *= 0.5;
            fraction -= range * 0.5;
        } else {
            if fraction == 1.0 {
                // Never touches within the frame.
                return None;
            }
            // Overshot into empty space: search later in time.
            range *= 0.5;
            fraction += range * 0.5;
        }
    }

    None
}

/// Predict a body's transform `t` seconds into the step.
fn transform_at(body: &Body, t: f32) -> Transform2 {
    Transform2 {
        translation: body.transform.translation + body.linear_velocity * t,
        rotation: body.transform.rotation + body.angular_velocity * t,
    }
}

/// Materialize a manifold from a confirmed intersection.
///
/// The coarse EPA normal is refined against B's support edge: for shapes
/// with a real edge the perpendicular of the edge direction is the true
/// face normal. Degenerate edges (circles) keep the EPA normal.
fn build_manifold(
    body_a: BodyId,
    body_b: BodyId,
    shape_a: &TransformedShape,
    shape_b: &TransformedShape,
    penetration: &Penetration,
) -> ContactManifold {
    let (edge_v0, edge_v1) = shape_b.support_edge(penetration.normal);
    let edge = edge_v1 - edge_v0;

    let normal = if edge.length_squared() > DEGENERATE_EDGE_SQ {
        let mut face_normal = vec2(edge.y, -edge.x).normalize_or_zero();
        if face_normal.dot(penetration.normal) < 0.0 {
            face_normal = -face_normal;
        }
        face_normal
    } else {
        penetration.normal
    };

    let position = shape_a.support_point(-normal);
    let signed_distance = (position - edge_v0).dot(normal);

    ContactManifold {
        body_a,
        body_b,
        normal,
        position,
        signed_distance,
    }
}

// ============================================================================
// Tests
// ============================================================================
