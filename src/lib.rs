//! # ALICE-World2D
//!
//! **2D Rigid-Body Simulation Core**
//!
//! A self-contained simulation world: uniform sector broad phase, GJK/EPA
//! narrow phase with conservative-advancement continuous collision
//! detection, push-out positional resolution, semi-implicit Euler
//! integration, and a bounded record/playback step history.
//!
//! ## Pipeline
//!
//! | Stage | Responsibility |
//! |-------|----------------|
//! | **Broad phase** | swept AABBs + sector grid -> deduplicated candidate pairs |
//! | **Narrow phase** | discrete or bisection CCD -> contact manifolds |
//! | **Solve** | shallow-first positional correction, integration, re-sectoring |
//! | **History** | per-step snapshots, time-travel playback |
//!
//! ## Design Principles
//!
//! - **Single-threaded by contract**: one `step()` at a time, no internal
//!   parallelism, no locking
//! - **Handles, not pointers**: bodies live in a generation-checked pool;
//!   a `BodyId` is a weak reference validated on every lookup
//! - **Injected geometry**: the GJK/EPA backend sits behind a trait so the
//!   world is testable with mock geometry
//! - **Displacement resolution only**: no impulses, no friction, no
//!   restitution — penetrating bodies are pushed out along the contact
//!   normal
//!
//! ## Quick Start
//!
//! ```rust
//! use alice_world2d::prelude::*;
//! use glam::vec2;
//!
//! let mut world = World::default();
//!
//! // A falling circle above a static floor
//! let mut desc = BodyDesc::new(
//!     Shape::Circle { radius: 1.0 },
//!     Transform2::from_translation(vec2(0.0, 10.0)),
//!     MotionType::Dynamic,
//! );
//! desc.linear_acceleration = vec2(0.0, -10.0);
//! let ball = world.create_body(desc);
//!
//! world.create_body(BodyDesc::new(
//!     Shape::Box { half_extents: vec2(20.0, 1.0) },
//!     Transform2::from_translation(vec2(0.0, -2.0)),
//!     MotionType::Static,
//! ));
//!
//! for _ in 0..120 {
//!     world.step(1.0 / 60.0);
//! }
//! assert!(world.body(ball).transform.translation.y < 10.0);
//! ```
//!
//! ## Time Travel
//!
//! ```rust
//! use alice_world2d::prelude::*;
//! use glam::vec2;
//!
//! let mut world = World::default();
//! let mut desc = BodyDesc::new(
//!     Shape::Circle { radius: 1.0 },
//!     Transform2::IDENTITY,
//!     MotionType::Dynamic,
//! );
//! desc.linear_velocity = vec2(1.0, 0.0);
//! world.create_body(desc);
//!
//! world.begin_history_recording().unwrap();
//! for _ in 0..30 {
//!     world.step(1.0 / 60.0);
//! }
//! world.end_history_recording();
//!
//! world.begin_history_playing().unwrap();
//! world.step(1.0 / 60.0);  // forward through the recording
//! world.step(-1.0);        // and back again
//! world.end_history_playing();
//! ```

pub mod body;
pub mod broad_phase;
pub mod collide;
pub mod debug_render;
pub mod error;
pub mod history;
pub mod narrow_phase;
pub mod pool;
pub mod sector;
pub mod shape;
pub mod stats;
pub mod world;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::body::{Body, BodyDesc, MotionType};
    pub use crate::broad_phase::{BodyPair, PairSet};
    pub use crate::collide::{CollisionBackend, GjkEpa, Penetration, Simplex2};
    pub use crate::debug_render::{DebugColor, DebugDrawData, DebugRenderer};
    pub use crate::error::WorldError;
    pub use crate::history::{
        BodySnapshot, StepSnapshot, WorldHistory, WORLD_HISTORY_CAPACITY,
    };
    pub use crate::narrow_phase::{CcdConfig, ContactManifold};
    pub use crate::pool::{BodyId, BodyPool};
    pub use crate::sector::{Sector, SectorGrid, TESSELLATION_PER_SIDE};
    pub use crate::shape::{Aabb, Shape, Transform2, TransformedShape};
    pub use crate::stats::StepStats;
    pub use crate::world::{World, WorldConfig};
}

// Re-export main types at crate root
pub use prelude::*;

// ============================================================================
// Crate-Level Tests
// ============================================================================
