//! Rigid Body State
//!
//! The per-object physical record: transform, velocities, accelerations,
//! damping, motion type, and the owned collision shape with its cached
//! local-space AABB. The world-space AABB is refreshed every step and may be
//! expanded into a swept volume for continuous collision detection.

use glam::Vec2;

use crate::pool::BodyId;
use crate::shape::{Aabb, Shape, Transform2};

// ============================================================================
// MotionType
// ============================================================================

/// How a body participates in simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionType {
    /// Never moves. Collides with dynamic bodies but never integrates.
    Static,
    /// Moved by user code only; never integrates under forces.
    Kinematic,
    /// Fully simulated: integrates and receives positional correction.
    Dynamic,
}

// ============================================================================
// BodyDesc
// ============================================================================

/// Creation descriptor for a body.
#[derive(Clone, Debug)]
pub struct BodyDesc {
    /// Collision shape (local space).
    pub shape: Shape,
    /// Initial transform.
    pub transform: Transform2,
    /// Motion type.
    pub motion_type: MotionType,
    /// Initial linear velocity.
    pub linear_velocity: Vec2,
    /// Constant linear acceleration (e.g. gravity).
    pub linear_acceleration: Vec2,
    /// Initial angular velocity (radians per second).
    pub angular_velocity: f32,
    /// Constant angular acceleration.
    pub angular_acceleration: f32,
    /// Linear velocity attenuation per step, in `[0, 1)`.
    pub linear_damping: f32,
}

impl BodyDesc {
    /// Descriptor with zero motion state.
    #[must_use]
    pub fn new(shape: Shape, transform: Transform2, motion_type: MotionType) -> Self {
        Self {
            shape,
            transform,
            motion_type,
            linear_velocity: Vec2::ZERO,
            linear_acceleration: Vec2::ZERO,
            angular_velocity: 0.0,
            angular_acceleration: 0.0,
            linear_damping: 0.0,
        }
    }
}

// ============================================================================
// Body
// ============================================================================

/// A rigid body owned by the world's pool.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    /// Pool handle, assigned at creation. Immutable afterwards.
    pub id: BodyId,
    /// Motion type.
    pub motion_type: MotionType,
    /// Current transform.
    pub transform: Transform2,
    /// Linear velocity.
    pub linear_velocity: Vec2,
    /// Constant linear acceleration.
    pub linear_acceleration: Vec2,
    /// Angular velocity (radians per second, positive = CCW).
    pub angular_velocity: f32,
    /// Constant angular acceleration.
    pub angular_acceleration: f32,
    /// Linear velocity attenuation per step, in `[0, 1)`.
    pub linear_damping: f32,
    /// Collision shape (local space).
    pub shape: Shape,
    /// Local-space AABB of `shape`, computed once at creation.
    pub shape_aabb: Aabb,
    /// World-space AABB, refreshed every step. During the collide phase of a
    /// step this is the swept (displacement-expanded) box for dynamic bodies.
    pub body_aabb: Aabb,
}

impl Body {
    /// Build a body from a descriptor. The pool stamps `id` on allocation.
    #[must_use]
    pub fn from_desc(desc: BodyDesc) -> Self {
        let shape_aabb = desc.shape.local_aabb();
        let body_aabb = Aabb::from_local(&shape_aabb, &desc.transform);
        Self {
            id: BodyId::INVALID,
            motion_type: desc.motion_type,
            transform: desc.transform,
            linear_velocity: desc.linear_velocity,
            linear_acceleration: desc.linear_acceleration,
            angular_velocity: desc.angular_velocity,
            angular_acceleration: desc.angular_acceleration,
            linear_damping: desc.linear_damping,
            shape: desc.shape,
            shape_aabb,
            body_aabb,
        }
    }

    /// A body is valid exactly when its handle is.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.id.is_valid()
    }

    /// Whether this body integrates and receives corrections.
    #[inline]
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.motion_type == MotionType::Dynamic
    }

    /// Refresh the world-space AABB from the cached local AABB and the
    /// current transform (resting box, no sweep expansion).
    #[inline]
    pub fn update_world_aabb(&mut self) {
        self.body_aabb = Aabb::from_local(&self.shape_aabb, &self.transform);
    }

    /// Predicted displacement over one step: `(v + a * dt) * dt`.
    #[inline]
    #[must_use]
    pub fn predicted_displacement(&self, dt: f32) -> Vec2 {
        (self.linear_velocity + self.linear_acceleration * dt) * dt
    }
}

// ============================================================================
// Tests
// ============================================================================
