//! The World — Simulation Orchestrator
//!
//! Owns the body pool, the sector grid, the broad-phase pair set, the
//! per-step manifold map, and the step history. One `step()` call runs
//! broad phase, narrow phase, and solve serially — single-threaded,
//! synchronous, non-reentrant. While history playback is active, `step()`
//! replays snapshots instead of simulating.
//!
//! # Step pipeline
//!
//! ```text
//! step(dt)
//!  ├─ playing?  -> advance cursor, restore snapshot, return
//!  ├─ collide:     refresh + sweep AABBs -> sector pairs -> manifolds
//!  ├─ solve:       resolve (shallow first) -> integrate -> re-sector
//!  └─ recording? -> snapshot all bodies + manifolds
//! ```
//!
//! Author: Moroya Sakamoto

use std::collections::BTreeMap;

use glam::Vec2;

use crate::body::{Body, BodyDesc, MotionType};
use crate::broad_phase::{self, PairSet};
use crate::collide::{CollisionBackend, GjkEpa};
use crate::debug_render::{DebugColor, DebugRenderer};
use crate::error::WorldError;
use crate::history::{BodySnapshot, StepSnapshot, WorldHistory, WORLD_HISTORY_CAPACITY};
use crate::narrow_phase::{self, CcdConfig, ContactManifold};
use crate::pool::{BodyId, BodyPool};
use crate::sector::SectorGrid;
use crate::stats::StepStats;

// ============================================================================
// WorldConfig
// ============================================================================

/// World construction parameters.
///
/// The bounds are a starting region, not a limit: they grow (and never
/// shrink) as bodies move or are created outside them.
#[derive(Clone, Copy, Debug)]
pub struct WorldConfig {
    /// Initial lower-left corner of the world region.
    pub world_min: Vec2,
    /// Initial upper-right corner of the world region.
    pub world_max: Vec2,
    /// Sector grid depth: `TESSELLATION_PER_SIDE^(1 + depth)` cells per side.
    pub depth: u32,
    /// Continuous-detection tuning.
    pub ccd: CcdConfig,
    /// Snapshot ring capacity for history recording.
    pub history_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_min: Vec2::splat(-64.0),
            world_max: Vec2::splat(64.0),
            depth: 1,
            ccd: CcdConfig::default(),
            history_capacity: WORLD_HISTORY_CAPACITY,
        }
    }
}

// ============================================================================
// World
// ============================================================================

/// The 2D rigid-body simulation world.
pub struct World {
    pool: BodyPool,
    world_min: Vec2,
    world_max: Vec2,
    grid: SectorGrid,
    pairs: PairSet,
    /// Manifolds of the current step, keyed by the "A" body's raw slot
    /// index. A body colliding with several others holds several entries.
    manifolds: BTreeMap<u32, Vec<ContactManifold>>,
    history: WorldHistory,
    backend: Box<dyn CollisionBackend>,
    ccd: CcdConfig,
    total_step_count: u64,
    stats: StepStats,
}

impl World {
    /// Create a world with the default GJK/EPA geometry backend.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self::with_backend(config, Box::new(GjkEpa))
    }

    /// Create a world with an injected geometry backend (mockable seam).
    #[must_use]
    pub fn with_backend(config: WorldConfig, backend: Box<dyn CollisionBackend>) -> Self {
        assert!(
            config.world_min.x < config.world_max.x && config.world_min.y < config.world_max.y,
            "world_min must lie strictly below world_max"
        );
        assert!(config.history_capacity > 0, "history capacity must be non-zero");
        Self {
            pool: BodyPool::new(),
            world_min: config.world_min,
            world_max: config.world_max,
            grid: SectorGrid::new(config.depth, config.world_min, config.world_max),
            pairs: PairSet::new(),
            manifolds: BTreeMap::new(),
            history: WorldHistory::new(config.history_capacity),
            backend,
            ccd: config.ccd,
            total_step_count: 0,
            stats: StepStats::default(),
        }
    }

    // ------------------------------------------------------------------
    // Bodies
    // ------------------------------------------------------------------

    /// Create a body and register it with the sector grid.
    pub fn create_body(&mut self, desc: BodyDesc) -> BodyId {
        debug_assert!(
            (0.0..1.0).contains(&desc.linear_damping),
            "linear_damping must be in [0, 1)"
        );
        let body = Body::from_desc(desc);
        let translation = body.transform.translation;
        let aabb = body.body_aabb;
        let id = self.pool.allocate(body);

        self.grow_bounds(translation);
        self.grid.update_bounds(self.world_min, self.world_max);
        self.grid.assign(id, &aabb);
        id
    }

    /// Borrow a body. Panics on an invalid handle.
    #[must_use]
    pub fn body(&self, id: BodyId) -> &Body {
        match self.pool.get(id) {
            Some(body) => body,
            None => panic!("invalid body handle (slot {})", id.index()),
        }
    }

    /// Mutably borrow a body. Panics on an invalid handle.
    #[must_use]
    pub fn body_mut(&mut self, id: BodyId) -> &mut Body {
        match self.pool.get_mut(id) {
            Some(body) => body,
            None => panic!("invalid body handle (slot {})", id.index()),
        }
    }

    /// Borrow a body, or `None` for a stale handle.
    #[must_use]
    pub fn get_body(&self, id: BodyId) -> Option<&Body> {
        self.pool.get(id)
    }

    /// Mutably borrow a body, or `None` for a stale handle.
    #[must_use]
    pub fn get_body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.pool.get_mut(id)
    }

    /// Borrow a body, with the failure as a typed error.
    pub fn try_body(&self, id: BodyId) -> Result<&Body, WorldError> {
        self.pool
            .get(id)
            .ok_or(WorldError::InvalidBody { index: id.index() })
    }

    /// Number of live bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.pool.len()
    }

    /// Iterate live bodies.
    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.pool.iter()
    }

    // ------------------------------------------------------------------
    // Stepping
    // ------------------------------------------------------------------

    /// Advance the simulation by `dt` seconds, or — while playback is
    /// active — move through recorded snapshots instead (`dt >= 0` steps
    /// forward, negative steps backward, both wrapping).
    pub fn step(&mut self, dt: f32) {
        if self.history.is_playing() {
            self.step_playback(dt >= 0.0);
            return;
        }

        self.step_collide(dt);
        self.step_solve(dt);

        if self.history.is_recording() {
            self.record_snapshot();
        }
        self.total_step_count += 1;
    }

    /// Broad phase + narrow phase: refresh AABBs, generate candidate pairs,
    /// materialize manifolds.
    fn step_collide(&mut self, dt: f32) {
        self.stats = StepStats::default();

        // Refresh world AABBs; dynamic bodies get the swept expansion so a
        // fast mover's whole path participates in pairing. A resting dynamic
        // body keeps its unexpanded box but can still be the passive side of
        // another body's swept test.
        for body in self.pool.iter_mut() {
            body.update_world_aabb();
            if body.motion_type == MotionType::Dynamic {
                let displacement = body.predicted_displacement(dt);
                body.body_aabb = body.body_aabb.expanded(displacement);
            }
        }

        broad_phase::collect_pairs(&self.grid, &self.pool, &mut self.pairs);
        self.stats.broad_pairs = self.pairs.len();

        self.manifolds.clear();
        let pairs = &self.pairs;
        let pool = &self.pool;
        let backend = self.backend.as_ref();
        for pair in pairs.pairs() {
            let (Some(a), Some(b)) = (pool.get(pair.a), pool.get(pair.b)) else {
                continue;
            };
            if a.linear_velocity != b.linear_velocity {
                self.stats.ccd_tests += 1;
            }
            if let Some(manifold) = narrow_phase::detect(a, b, dt, backend, &self.ccd) {
                self.manifolds
                    .entry(pair.a.index())
                    .or_default()
                    .push(manifold);
                self.stats.manifolds += 1;
            }
        }
    }

    /// Resolve manifolds, integrate dynamic bodies, re-sector everything.
    fn step_solve(&mut self, dt: f32) {
        self.resolve_manifolds();
        self.integrate(dt);
        self.reassign_sectors();
    }

    /// Apply positional corrections, shallowest penetration first.
    ///
    /// Resolving shallow contacts before deep ones keeps early corrections
    /// from being immediately invalidated by larger ones on the same body.
    fn resolve_manifolds(&mut self) {
        for list in self.manifolds.values_mut() {
            list.sort_by(|x, y| {
                x.signed_distance.abs().total_cmp(&y.signed_distance.abs())
            });
        }

        let keys: Vec<u32> = self.manifolds.keys().copied().collect();
        for key in keys {
            let list = self.manifolds[&key].clone();
            for manifold in &list {
                self.resolve_manifold(manifold);
            }
        }
    }

    /// Resolve a single contact by displacing its dynamic side.
    fn resolve_manifold(&mut self, manifold: &ContactManifold) {
        let a_dynamic = self
            .pool
            .get(manifold.body_a)
            .is_some_and(|b| b.is_dynamic());
        let b_dynamic = self
            .pool
            .get(manifold.body_b)
            .is_some_and(|b| b.is_dynamic());

        if a_dynamic && b_dynamic {
            panic!("dynamic-vs-dynamic resolution is not implemented");
        }
        if !a_dynamic && !b_dynamic {
            return;
        }

        // View the contact with the dynamic body on the "A" side.
        let oriented = if a_dynamic {
            *manifold
        } else {
            manifold.swapped()
        };

        // Separated contacts never trigger a correction.
        if oriented.signed_distance >= 0.0 {
            return;
        }

        // Corrections earlier in this loop may have moved the body since
        // detection; prefer a fresh discrete manifold at the current
        // transforms. A CCD manifold from mid-step keeps its stored values
        // when the bodies do not overlap yet at solve time.
        let fresh = {
            let (Some(a), Some(b)) = (
                self.pool.get(oriented.body_a),
                self.pool.get(oriented.body_b),
            ) else {
                return;
            };
            narrow_phase::detect_discrete(a, b, self.backend.as_ref())
        };
        let resolved = fresh.unwrap_or(oriented);
        if resolved.signed_distance >= 0.0 {
            return;
        }

        let correction = resolved.normal * -resolved.signed_distance;
        if let Some(body) = self.pool.get_mut(oriented.body_a) {
            body.transform.translation += correction;
            self.stats.corrections += 1;
        }
    }

    /// Semi-implicit Euler for dynamic bodies, then AABB + bounds refresh.
    fn integrate(&mut self, dt: f32) {
        for body in self.pool.iter_mut() {
            if body.motion_type == MotionType::Dynamic {
                body.linear_velocity += body.linear_acceleration * dt;
                body.angular_velocity += body.angular_acceleration * dt;
                body.transform.translation += body.linear_velocity * dt;
                body.transform.rotation += body.angular_velocity * dt;
                body.linear_velocity *= 1.0 - body.linear_damping;
            }
            body.update_world_aabb();
        }

        for body in self.pool.iter() {
            let translation = body.transform.translation;
            self.world_min = self.world_min.min(translation);
            self.world_max = self.world_max.max(translation);
        }
    }

    /// Rebuild every sector's body list from the post-integration AABBs.
    fn reassign_sectors(&mut self) {
        self.grid.update_bounds(self.world_min, self.world_max);
        self.grid.clear();
        let grid = &mut self.grid;
        for body in self.pool.iter() {
            grid.assign(body.id, &body.body_aabb);
        }
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Start recording snapshots of every following live step. Flushes any
    /// previously recorded history.
    pub fn begin_history_recording(&mut self) -> Result<(), WorldError> {
        self.history.begin_recording()
    }

    /// Stop recording. Recorded snapshots remain available for playback.
    pub fn end_history_recording(&mut self) {
        self.history.end_recording()
    }

    /// Enter playback at the oldest retained snapshot and restore it.
    ///
    /// Fails without state change while recording or with no snapshots.
    pub fn begin_history_playing(&mut self) -> Result<(), WorldError> {
        self.history.begin_playing()?;
        if let Some(snapshot) = self.history.current().cloned() {
            self.apply_snapshot(&snapshot);
        }
        Ok(())
    }

    /// Leave playback and resume live simulation from the restored state.
    pub fn end_history_playing(&mut self) {
        self.history.end_playing()
    }

    /// Number of retained snapshots.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Drop all recorded snapshots (and playback, if active).
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Recorded history ring, for inspection.
    #[must_use]
    pub fn history(&self) -> &WorldHistory {
        &self.history
    }

    /// The step index a caller can correlate with the timeline: the last
    /// live step while simulating, or the shown snapshot's recorded index
    /// while playing.
    #[must_use]
    pub fn current_step_index(&self) -> u64 {
        match self.history.current() {
            Some(snapshot) => snapshot.step_index,
            None => self.total_step_count.saturating_sub(1),
        }
    }

    /// Total number of live steps taken.
    #[must_use]
    pub fn total_step_count(&self) -> u64 {
        self.total_step_count
    }

    /// One playback step: move the cursor, restore the snapshot. No
    /// collision or solve work runs.
    fn step_playback(&mut self, forward: bool) {
        let Some(snapshot) = self.history.advance(forward).cloned() else {
            return;
        };
        self.apply_snapshot(&snapshot);
    }

    /// Overwrite live body state (and the render-only manifold map) from a
    /// snapshot.
    fn apply_snapshot(&mut self, snapshot: &StepSnapshot) {
        self.manifolds.clear();
        for entry in &snapshot.bodies {
            if let Some(body) = self.pool.get_mut(entry.body.id) {
                *body = entry.body.clone();
            }
            if !entry.manifolds.is_empty() {
                self.manifolds
                    .insert(entry.body.id.index(), entry.manifolds.clone());
            }
        }
    }

    /// Snapshot every valid body and its manifolds for the step that just
    /// solved.
    fn record_snapshot(&mut self) {
        let mut bodies = Vec::with_capacity(self.pool.len());
        for body in self.pool.iter() {
            let manifolds = self
                .manifolds
                .get(&body.id.index())
                .cloned()
                .unwrap_or_default();
            bodies.push(BodySnapshot {
                body: body.clone(),
                manifolds,
            });
        }
        self.history.record(StepSnapshot {
            step_index: self.total_step_count,
            bodies,
        });
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Manifolds of the current step, keyed by the "A" body's slot index.
    #[must_use]
    pub fn manifolds(&self) -> &BTreeMap<u32, Vec<ContactManifold>> {
        &self.manifolds
    }

    /// Broad-phase pairs of the current step.
    #[must_use]
    pub fn broad_phase_pairs(&self) -> &PairSet {
        &self.pairs
    }

    /// The sector grid.
    #[must_use]
    pub fn sector_grid(&self) -> &SectorGrid {
        &self.grid
    }

    /// Current lower-left world bound (never shrinks).
    #[must_use]
    pub fn world_min(&self) -> Vec2 {
        self.world_min
    }

    /// Current upper-right world bound (never shrinks).
    #[must_use]
    pub fn world_max(&self) -> Vec2 {
        self.world_max
    }

    /// Counters for the most recent live step.
    #[must_use]
    pub fn stats(&self) -> StepStats {
        self.stats
    }

    /// Hand every body and manifold to a debug renderer.
    pub fn debug_draw(&self, renderer: &mut dyn DebugRenderer) {
        for body in self.pool.iter() {
            let color = match body.motion_type {
                MotionType::Static => DebugColor::GRAY,
                MotionType::Kinematic => DebugColor::CYAN,
                MotionType::Dynamic => DebugColor::GREEN,
            };
            renderer.draw_shape(&body.shape, color, &body.transform);
        }
        for list in self.manifolds.values() {
            for manifold in list {
                renderer.draw_manifold(
                    manifold.position,
                    manifold.normal,
                    manifold.signed_distance,
                );
            }
        }
    }

    /// Grow the world region to include a point. Bounds never shrink within
    /// a session.
    fn grow_bounds(&mut self, point: Vec2) {
        self.world_min = self.world_min.min(point);
        self.world_max = self.world_max.max(point);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl core::fmt::Debug for World {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("World")
            .field("bodies", &self.pool.len())
            .field("total_step_count", &self.total_step_count)
            .field("recording", &self.history.is_recording())
            .field("playing", &self.history.is_playing())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Shape, Transform2};
    use glam::vec2;

    fn dynamic_circle(x: f32, y: f32) -> BodyDesc {
        BodyDesc::new(
            Shape::Circle { radius: 1.0 },
            Transform2::from_translation(vec2(x, y)),
            MotionType::Dynamic,
        )
    }

    fn static_box(x: f32, y: f32, hx: f32, hy: f32) -> BodyDesc {
        BodyDesc::new(
            Shape::Box {
                half_extents: vec2(hx, hy),
            },
            Transform2::from_translation(vec2(x, y)),
            MotionType::Static,
        )
    }

    #[test]
    fn test_create_and_access_body() {
        let mut world = World::default();
        let id = world.create_body(dynamic_circle(1.0, 2.0));
        assert!(id.is_valid());
        assert_eq!(world.body(id).transform.translation, vec2(1.0, 2.0));
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    #[should_panic(expected = "invalid body handle")]
    fn test_invalid_handle_panics() {
        let world = World::default();
        let _ = world.body(BodyId::INVALID);
    }

    #[test]
    fn test_try_body_reports_error() {
        let world = World::default();
        assert_eq!(
            world.try_body(BodyId::INVALID),
            Err(WorldError::InvalidBody { index: u32::MAX })
        );
    }

    #[test]
    fn test_static_bodies_never_integrate() {
        let mut world = World::default();
        let id = world.create_body(static_box(0.0, 0.0, 1.0, 1.0));
        world.body_mut(id).linear_acceleration = vec2(0.0, -10.0);
        for _ in 0..10 {
            world.step(1.0 / 60.0);
        }
        assert_eq!(world.body(id).transform.translation, vec2(0.0, 0.0));
    }

    #[test]
    fn test_kinematic_bodies_never_integrate() {
        let mut world = World::default();
        let mut desc = dynamic_circle(0.0, 0.0);
        desc.motion_type = MotionType::Kinematic;
        desc.linear_velocity = vec2(5.0, 0.0);
        let id = world.create_body(desc);
        world.step(1.0);
        assert_eq!(
            world.body(id).transform.translation,
            vec2(0.0, 0.0),
            "only dynamic bodies move under the integrator"
        );
    }

    #[test]
    fn test_integration_semi_implicit_euler() {
        let mut world = World::default();
        let mut desc = dynamic_circle(0.0, 0.0);
        desc.linear_acceleration = vec2(0.0, -10.0);
        let id = world.create_body(desc);

        world.step(0.1);
        let body = world.body(id);
        // v = a * dt first, then x += v * dt
        assert!((body.linear_velocity.y + 1.0).abs() < 1e-5);
        assert!((body.transform.translation.y + 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_linear_damping_attenuates_velocity() {
        let mut world = World::default();
        let mut desc = dynamic_circle(0.0, 0.0);
        desc.linear_velocity = vec2(10.0, 0.0);
        desc.linear_damping = 0.5;
        let id = world.create_body(desc);

        world.step(1.0);
        assert!(
            (world.body(id).linear_velocity.x - 5.0).abs() < 1e-5,
            "damping multiplies velocity by (1 - damping) after integration"
        );
    }

    #[test]
    fn test_world_bounds_grow_never_shrink() {
        let mut world = World::default();
        let mut desc = dynamic_circle(0.0, 0.0);
        desc.linear_velocity = vec2(100.0, 0.0);
        world.create_body(desc);

        let initial_max = world.world_max();
        for _ in 0..60 {
            world.step(1.0 / 30.0);
        }
        let grown_max = world.world_max();
        assert!(grown_max.x > initial_max.x, "bounds must grow with motion");

        for _ in 0..10 {
            world.step(1.0 / 30.0);
        }
        assert!(world.world_max().x >= grown_max.x, "bounds never shrink");
    }

    #[test]
    fn test_resting_contact_is_pushed_out() {
        let mut world = World::default();
        // Circle overlapping the box's left face by 0.2, both at rest.
        let a = world.create_body(dynamic_circle(0.0, 0.0));
        world.create_body(static_box(1.8, 0.0, 1.0, 1.0));

        world.step(1.0 / 60.0);
        let x = world.body(a).transform.translation.x;
        assert!(
            x < -0.15,
            "penetrating circle must be pushed out along -X, got x = {x}"
        );
    }

    #[test]
    fn test_separated_touching_bodies_unmoved() {
        let mut world = World::default();
        // Gap of 0.1 between circle edge and box face; zero velocity.
        let a = world.create_body(dynamic_circle(0.0, 0.0));
        world.create_body(static_box(2.1, 0.0, 1.0, 1.0));

        world.step(1.0 / 60.0);
        assert_eq!(
            world.body(a).transform.translation,
            vec2(0.0, 0.0),
            "no penetration, no correction"
        );
    }

    #[test]
    #[should_panic(expected = "dynamic-vs-dynamic")]
    fn test_dynamic_vs_dynamic_is_fatal() {
        let mut world = World::default();
        world.create_body(dynamic_circle(0.0, 0.0));
        world.create_body(dynamic_circle(1.0, 0.0));
        world.step(1.0 / 60.0);
    }

    #[test]
    fn test_step_counter_advances_only_live() {
        let mut world = World::default();
        world.create_body(dynamic_circle(0.0, 0.0));
        assert_eq!(world.current_step_index(), 0, "before any step");

        world.step(1.0 / 60.0);
        world.step(1.0 / 60.0);
        assert_eq!(world.total_step_count(), 2);
        assert_eq!(world.current_step_index(), 1);
    }

    #[test]
    fn test_debug_draw_covers_bodies_and_manifolds() {
        use crate::debug_render::DebugDrawData;

        let mut world = World::default();
        world.create_body(dynamic_circle(0.0, 0.0));
        world.create_body(static_box(1.8, 0.0, 1.0, 1.0));
        world.step(1.0 / 60.0);

        let mut data = DebugDrawData::new();
        world.debug_draw(&mut data);
        assert_eq!(data.shapes.len(), 2);
        assert_eq!(
            data.manifolds.len(),
            world.manifolds().values().map(Vec::len).sum::<usize>()
        );
    }

    #[test]
    fn test_mock_backend_injection() {
        use crate::collide::{Penetration, Simplex2};
        use crate::shape::TransformedShape;

        /// Backend that never reports a hit.
        struct NeverHit;
        impl CollisionBackend for NeverHit {
            fn intersect(
                &self,
                _a: &TransformedShape,
                _b: &TransformedShape,
            ) -> Option<Simplex2> {
                None
            }
            fn penetration(
                &self,
                _a: &TransformedShape,
                _b: &TransformedShape,
                _s: &Simplex2,
            ) -> Penetration {
                Penetration {
                    normal: Vec2::X,
                    distance: 0.0,
                }
            }
        }

        let mut world = World::with_backend(WorldConfig::default(), Box::new(NeverHit));
        let a = world.create_body(dynamic_circle(0.0, 0.0));
        world.create_body(static_box(0.5, 0.0, 1.0, 1.0));
        world.step(1.0 / 60.0);

        assert!(world.manifolds().is_empty(), "mock geometry sees no contacts");
        assert_eq!(world.body(a).transform.translation, vec2(0.0, 0.0));
    }
}
