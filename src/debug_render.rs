//! Debug Visualization API
//!
//! Abstract debug rendering interface for visualizing world state. The world
//! hands each body's shape and transform, and each manifold's contact data,
//! to a [`DebugRenderer`]; any graphics backend can implement the trait.
//! Rendering is purely informational and never mutates simulation state.

use glam::Vec2;

use crate::shape::{Shape, Transform2};

// ============================================================================
// DebugColor
// ============================================================================

/// RGBA color for debug rendering (0-255 per channel).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebugColor {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl DebugColor {
    /// Create a new color
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Red — contact manifolds.
    pub const RED: Self = Self::new(255, 50, 50, 255);
    /// Green — dynamic bodies.
    pub const GREEN: Self = Self::new(50, 255, 50, 255);
    /// Cyan — kinematic bodies.
    pub const CYAN: Self = Self::new(50, 255, 255, 255);
    /// Gray — static bodies.
    pub const GRAY: Self = Self::new(128, 128, 128, 255);
    /// White
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
}

// ============================================================================
// DebugRenderer
// ============================================================================

/// Receiver for per-frame debug geometry.
pub trait DebugRenderer {
    /// Draw a body's shape at its transform.
    fn draw_shape(&mut self, shape: &Shape, color: DebugColor, transform: &Transform2);

    /// Draw one contact manifold.
    fn draw_manifold(&mut self, position: Vec2, normal: Vec2, signed_distance: f32);
}

// ============================================================================
// DebugDrawData — geometry collector
// ============================================================================

/// A recorded shape draw.
#[derive(Clone, Debug)]
pub struct DebugShape {
    /// Shape in local space.
    pub shape: Shape,
    /// Draw color.
    pub color: DebugColor,
    /// World transform.
    pub transform: Transform2,
}

/// A recorded manifold draw.
#[derive(Clone, Copy, Debug)]
pub struct DebugManifold {
    /// Contact point on body A.
    pub position: Vec2,
    /// Contact normal (B toward A).
    pub normal: Vec2,
    /// Signed separation; negative = penetrating.
    pub signed_distance: f32,
}

/// Backend-agnostic geometry collector. Useful for tests and for renderers
/// that want to batch.
#[derive(Clone, Debug, Default)]
pub struct DebugDrawData {
    /// Shapes drawn this frame.
    pub shapes: Vec<DebugShape>,
    /// Manifolds drawn this frame.
    pub manifolds: Vec<DebugManifold>,
}

impl DebugDrawData {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all collected geometry.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.manifolds.clear();
    }
}

impl DebugRenderer for DebugDrawData {
    fn draw_shape(&mut self, shape: &Shape, color: DebugColor, transform: &Transform2) {
        self.shapes.push(DebugShape {
            shape: shape.clone(),
            color,
            transform: *transform,
        });
    }

    fn draw_manifold(&mut self, position: Vec2, normal: Vec2, signed_distance: f32) {
        self.manifolds.push(DebugManifold {
            position,
            normal,
            signed_distance,
        });
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;

    #[test]
    fn test_collector_records_draws() {
        let mut data = DebugDrawData::new();
        data.draw_shape(
            &Shape::Circle { radius: 1.0 },
            DebugColor::GREEN,
            &Transform2::IDENTITY,
        );
        data.draw_manifold(vec2(1.0, 0.0), vec2(-1.0, 0.0), -0.25);

        assert_eq!(data.shapes.len(), 1);
        assert_eq!(data.manifolds.len(), 1);
        assert_eq!(data.shapes[0].color, DebugColor::GREEN);

        data.clear();
        assert!(data.shapes.is_empty() && data.manifolds.is_empty());
    }
}
