//! Fuzz target: step a world of arbitrary bodies.
//!
//! One dynamic probe body against a soup of static shapes. Exercises the
//! whole pipeline — sectoring, pairing, discrete + continuous detection,
//! resolution, integration — and checks that stepping neither panics nor
//! produces non-finite state.

#![no_main]

use arbitrary::Arbitrary;
use glam::vec2;
use libfuzzer_sys::fuzz_target;

use alice_world2d::prelude::*;

#[derive(Arbitrary, Debug)]
struct FuzzBody {
    x: i16,
    y: i16,
    kind: u8,
    extent: u8,
}

#[derive(Arbitrary, Debug)]
struct FuzzCase {
    probe_x: i16,
    probe_y: i16,
    velocity_x: i8,
    velocity_y: i8,
    statics: Vec<FuzzBody>,
    steps: u8,
}

fn shape_for(kind: u8, extent: u8) -> Shape {
    let size = 0.25 + f32::from(extent) / 32.0;
    match kind % 3 {
        0 => Shape::Circle { radius: size },
        1 => Shape::Box {
            half_extents: vec2(size, size * 0.5),
        },
        _ => Shape::Aabb {
            half_extents: vec2(size * 0.5, size),
        },
    }
}

fuzz_target!(|case: FuzzCase| {
    let mut world = World::default();

    let mut desc = BodyDesc::new(
        Shape::Circle { radius: 0.5 },
        Transform2::from_translation(vec2(
            f32::from(case.probe_x) / 16.0,
            f32::from(case.probe_y) / 16.0,
        )),
        MotionType::Dynamic,
    );
    desc.linear_velocity = vec2(f32::from(case.velocity_x), f32::from(case.velocity_y));
    let probe = world.create_body(desc);

    for body in case.statics.iter().take(32) {
        world.create_body(BodyDesc::new(
            shape_for(body.kind, body.extent),
            Transform2::from_translation(vec2(
                f32::from(body.x) / 16.0,
                f32::from(body.y) / 16.0,
            )),
            MotionType::Static,
        ));
    }

    for _ in 0..case.steps.min(16) {
        world.step(1.0 / 60.0);
        let translation = world.body(probe).transform.translation;
        assert!(
            translation.is_finite(),
            "probe translation went non-finite: {translation:?}"
        );
    }
});
