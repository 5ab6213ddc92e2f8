//! Falling bodies demo
//!
//! Drops a row of circles onto a static floor, records the session, then
//! replays it backwards. Run with:
//! `cargo run --example falling_bodies`

use alice_world2d::prelude::*;
use glam::vec2;

fn main() {
    let mut world = World::default();

    // Static floor
    world.create_body(BodyDesc::new(
        Shape::Box {
            half_extents: vec2(30.0, 1.0),
        },
        Transform2::from_translation(vec2(0.0, -2.0)),
        MotionType::Static,
    ));

    // A row of falling circles
    let mut balls = Vec::new();
    for i in 0..5 {
        let mut desc = BodyDesc::new(
            Shape::Circle { radius: 1.0 },
            Transform2::from_translation(vec2(i as f32 * 4.0 - 8.0, 8.0 + i as f32)),
            MotionType::Dynamic,
        );
        desc.linear_acceleration = vec2(0.0, -10.0);
        desc.linear_damping = 0.01;
        balls.push(world.create_body(desc));
    }

    // Simulate and record two seconds
    world.begin_history_recording().expect("fresh world can record");
    let dt = 1.0 / 60.0;
    for _ in 0..120 {
        world.step(dt);
    }
    world.end_history_recording();

    println!("after {} live steps:", world.total_step_count());
    for &id in &balls {
        let body = world.body(id);
        println!(
            "  ball {:>2}: pos = ({:>6.2}, {:>6.2}), vel = ({:>6.2}, {:>6.2})",
            id.index(),
            body.transform.translation.x,
            body.transform.translation.y,
            body.linear_velocity.x,
            body.linear_velocity.y,
        );
    }
    println!(
        "last step produced {} broad-phase pairs, {} manifolds",
        world.stats().broad_pairs,
        world.stats().manifolds,
    );

    // Rewind the recording from its start, backwards (wraps to the end)
    world.begin_history_playing().expect("recording exists");
    for _ in 0..30 {
        world.step(-1.0);
    }
    println!(
        "rewound playback now showing recorded step {}",
        world.current_step_index()
    );
    world.end_history_playing();
}
