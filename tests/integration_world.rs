//! Integration tests for ALICE-World2D
//!
//! End-to-end behaviour of the simulation core through the public API:
//! sector coverage, pair canonicalization, continuous collision detection,
//! resolution, and history record/playback.

use alice_world2d::prelude::*;
use glam::{vec2, Vec2};

// ============================================================================
// Helpers
// ============================================================================

fn dynamic_circle(x: f32, y: f32, radius: f32) -> BodyDesc {
    BodyDesc::new(
        Shape::Circle { radius },
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

fn run(world: &mut World, steps: usize, dt: f32) {
    for _ in 0..steps {
        world.step(dt);
    }
}

// ============================================================================
// Test 1 — Sector coverage invariant
// ============================================================================

/// After a step, every valid body is listed in the sector of each of its
/// AABB corners, and no sector lists the same body twice.
#[test]
fn test_sector_coverage_invariant() {
    let mut world = World::default();
    for i in 0..6 {
        let mut desc = dynamic_circle(i as f32 * 3.0 - 8.0, (i % 3) as f32 * 4.0, 1.0);
        desc.linear_velocity = vec2(1.0, -0.5);
        world.create_body(desc);
    }
    // Keep pairs dynamic-vs-static only so resolution stays in its
    // implemented path.
    world.create_body(static_box(0.0, -6.0, 12.0, 1.0));

    run(&mut world, 5, 1.0 / 60.0);

    let grid = world.sector_grid();
    for body in world.bodies() {
        for corner in body.body_aabb.corners() {
            let index = grid.sector_index_of(corner);
            let hits = grid
                .sector(index)
                .bodies
                .iter()
                .filter(|id| id.index() == body.id.index())
                .count();
            assert_eq!(
                hits, 1,
                "body {} must appear exactly once in sector {index}",
                body.id.index()
            );
        }
    }
}

// ============================================================================
// Test 2 — Pair canonicalization
// ============================================================================

/// Broad-phase pairs always have `a.index < b.index` and are unique, even
/// when both bodies co-occupy several sectors.
#[test]
fn test_pair_canonicalization_and_uniqueness() {
    let mut world = World::default();
    // A cluster of overlapping bodies straddling sector boundaries.
    world.create_body(static_box(-0.5, 0.0, 1.5, 1.5));
    world.create_body(static_box(0.5, 0.5, 1.5, 1.5));
    let mut desc = dynamic_circle(0.0, 0.0, 2.0);
    desc.linear_velocity = vec2(0.5, 0.5);
    world.create_body(desc);

    world.step(1.0 / 60.0);

    let pairs = world.broad_phase_pairs().pairs();
    assert!(!pairs.is_empty(), "cluster must produce candidate pairs");

    let mut seen = std::collections::HashSet::new();
    for pair in pairs {
        assert!(
            pair.a.index() < pair.b.index(),
            "pair ({}, {}) is not canonical",
            pair.a.index(),
            pair.b.index()
        );
        assert!(
            seen.insert((pair.a.index(), pair.b.index())),
            "duplicate pair ({}, {})",
            pair.a.index(),
            pair.b.index()
        );
    }
}

// ============================================================================
// Test 3 — Static bodies never pair
// ============================================================================

/// Two static bodies overlapping in world space never produce a broad-phase
/// pair or a manifold, across any number of steps.
#[test]
fn test_overlapping_statics_never_pair() {
    let mut world = World::default();
    let a = world.create_body(static_box(0.0, 0.0, 2.0, 2.0));
    let b = world.create_body(static_box(1.0, 1.0, 2.0, 2.0));
    // A distant dynamic body keeps the simulation non-trivial.
    world.create_body(dynamic_circle(30.0, 30.0, 1.0));

    for _ in 0..10 {
        world.step(1.0 / 60.0);
        let forbidden = BodyPair::new(a, b);
        assert!(
            !world.broad_phase_pairs().contains(&forbidden),
            "static-static pair must never be generated"
        );
        assert!(world.manifolds().is_empty());
    }
}

// ============================================================================
// Test 4 — CCD anti-tunneling scenario
// ============================================================================

/// Body A: dynamic circle r=1 at the origin, vx=10. Body B: static 2x2 box
/// at (5, 0). With a dt whose end-of-step position overlaps the box, the
/// continuous path must find the first contact instead of tunneling, store
/// a manifold for the pair, and displace A along the contact normal by the
/// penetration during the solve.
#[test]
fn test_ccd_scenario_fast_circle_vs_static_box() {
    let mut world = World::default();
    let mut desc = dynamic_circle(0.0, 0.0, 1.0);
    desc.linear_velocity = vec2(10.0, 0.0);
    let a = world.create_body(desc);
    world.create_body(static_box(5.0, 0.0, 1.0, 1.0));

    let dt = 0.55; // free flight would end at x = 5.5, inside the box
    world.step(dt);

    let manifolds = world
        .manifolds()
        .get(&a.index())
        .expect("CCD must record a manifold for the pair");
    assert_eq!(manifolds.len(), 1);
    let manifold = &manifolds[0];

    assert!(manifold.signed_distance < 0.0, "first contact is penetrating");
    assert!(
        manifold.signed_distance.abs() < 1.0,
        "depth must stay inside the CCD accept band, got {}",
        manifold.signed_distance
    );
    assert!(
        manifold.normal.x < -0.9,
        "normal points from the box toward the circle"
    );

    // Solve displaced A along the stored normal by |signed_distance| before
    // integration carried it forward.
    let expected = 10.0 * dt + manifold.normal.x * -manifold.signed_distance;
    let x = world.body(a).transform.translation.x;
    assert!(
        (x - expected).abs() < 1e-3,
        "expected x = {expected}, got {x}"
    );
    assert!(x < 10.0 * dt, "the correction must push against the motion");
}

// ============================================================================
// Test 5 — Resolution idempotence on separated bodies
// ============================================================================

/// A separated pair (no penetration) never receives a positional
/// correction, no matter how often it is stepped.
#[test]
fn test_resolution_idempotent_when_separated() {
    let mut world = World::default();
    let a = world.create_body(dynamic_circle(0.0, 0.0, 1.0));
    world.create_body(static_box(2.5, 0.0, 1.0, 1.0)); // gap of 0.5

    for _ in 0..30 {
        world.step(1.0 / 60.0);
        assert_eq!(
            world.body(a).transform.translation,
            Vec2::ZERO,
            "separated bodies must not be corrected"
        );
    }
    assert_eq!(world.stats().corrections, 0);
}

// ============================================================================
// Test 6 — History capacity
// ============================================================================

/// Recording N > capacity steps retains exactly `capacity` snapshots, and
/// the oldest retained snapshot's step index is `N - capacity`.
#[test]
fn test_history_capacity_and_eviction() {
    let capacity = 16;
    let mut world = World::new(WorldConfig {
        history_capacity: capacity,
        ..WorldConfig::default()
    });
    let mut desc = dynamic_circle(0.0, 0.0, 1.0);
    desc.linear_velocity = vec2(1.0, 0.0);
    world.create_body(desc);

    world.begin_history_recording().unwrap();
    let total = 50u64;
    run(&mut world, total as usize, 1.0 / 60.0);
    world.end_history_recording();

    assert_eq!(world.history_len(), capacity);
    assert_eq!(
        world.history().oldest().unwrap().step_index,
        total - capacity as u64
    );
}

// ============================================================================
// Test 7 — Playback determinism
// ============================================================================

/// Replaying a recorded session reproduces the captured transform and
/// velocity fields exactly, and the step-index correlation holds at every
/// playback position.
#[test]
fn test_playback_reproduces_recording_exactly() {
    let mut world = World::default();
    let mut desc = dynamic_circle(0.0, 5.0, 1.0);
    desc.linear_velocity = vec2(3.0, 0.0);
    desc.linear_acceleration = vec2(0.0, -10.0);
    desc.linear_damping = 0.02;
    let id = world.create_body(desc);
    world.create_body(static_box(0.0, -2.0, 40.0, 1.0));

    world.begin_history_recording().unwrap();
    let steps = 40;
    let mut captured = Vec::new();
    for _ in 0..steps {
        world.step(1.0 / 60.0);
        let body = world.body(id);
        captured.push((
            world.current_step_index(),
            body.transform.translation,
            body.linear_velocity,
        ));
    }
    world.end_history_recording();

    world.begin_history_playing().unwrap();
    assert_eq!(world.current_step_index(), captured[0].0);
    assert_eq!(world.body(id).transform.translation, captured[0].1);

    for expected in &captured[1..] {
        world.step(1.0 / 60.0);
        assert_eq!(world.current_step_index(), expected.0);
        assert_eq!(world.body(id).transform.translation, expected.1);
        assert_eq!(world.body(id).linear_velocity, expected.2);
    }
    world.end_history_playing();
}

// ============================================================================
// Test 8 — Playback wrapping and reverse stepping
// ============================================================================

/// Forward playback wraps to the oldest snapshot past the end; negative
/// `dt` rewinds and wraps to the newest.
#[test]
fn test_playback_wraps_both_ways() {
    let mut world = World::default();
    let mut desc = dynamic_circle(0.0, 0.0, 1.0);
    desc.linear_velocity = vec2(1.0, 0.0);
    world.create_body(desc);

    world.begin_history_recording().unwrap();
    run(&mut world, 3, 1.0 / 60.0);
    world.end_history_recording();

    world.begin_history_playing().unwrap();
    assert_eq!(world.current_step_index(), 0);

    world.step(1.0 / 60.0);
    world.step(1.0 / 60.0);
    assert_eq!(world.current_step_index(), 2);

    world.step(1.0 / 60.0);
    assert_eq!(world.current_step_index(), 0, "forward wraps past the end");

    world.step(-1.0);
    assert_eq!(world.current_step_index(), 2, "backward wraps to the last entry");
}

// ============================================================================
// Test 9 — History state machine exclusions
// ============================================================================

/// Recording and playing are mutually exclusive; playback needs snapshots.
#[test]
fn test_history_state_machine_guards() {
    let mut world = World::default();
    world.create_body(dynamic_circle(0.0, 0.0, 1.0));

    assert_eq!(
        world.begin_history_playing(),
        Err(WorldError::HistoryEmpty),
        "no snapshots, no playback"
    );

    world.begin_history_recording().unwrap();
    world.step(1.0 / 60.0);
    assert_eq!(
        world.begin_history_playing(),
        Err(WorldError::HistoryRecordingActive)
    );
    world.end_history_recording();

    world.begin_history_playing().unwrap();
    assert_eq!(
        world.begin_history_recording(),
        Err(WorldError::HistoryPlaybackActive)
    );
    world.end_history_playing();
}

// ============================================================================
// Test 10 — Playback does not simulate
// ============================================================================

/// While playing, `step()` must not run collision or solve: the live step
/// counter freezes and bodies follow the recording only.
#[test]
fn test_playback_freezes_live_clock() {
    let mut world = World::default();
    let mut desc = dynamic_circle(0.0, 0.0, 1.0);
    desc.linear_velocity = vec2(1.0, 0.0);
    world.create_body(desc);

    world.begin_history_recording().unwrap();
    run(&mut world, 5, 1.0 / 60.0);
    world.end_history_recording();
    let live_steps = world.total_step_count();

    world.begin_history_playing().unwrap();
    run(&mut world, 7, 1.0 / 60.0);
    world.end_history_playing();

    assert_eq!(
        world.total_step_count(),
        live_steps,
        "playback steps must not advance the live counter"
    );
}
