//! Fuzz target: GJK/EPA on arbitrary shape pairs.
//!
//! Whatever the relative pose, `intersect_gjk` must terminate without
//! panicking, and a reported hit must yield a finite, non-negative
//! penetration with a roughly unit normal.

#![no_main]

use arbitrary::Arbitrary;
use glam::vec2;
use libfuzzer_sys::fuzz_target;

use alice_world2d::collide::{intersect_gjk, penetration_epa};
use alice_world2d::prelude::*;

#[derive(Arbitrary, Debug)]
struct FuzzPair {
    ax: i16,
    ay: i16,
    bx: i16,
    by: i16,
    rotation_a: i8,
    rotation_b: i8,
    kind_a: u8,
    kind_b: u8,
    extent_a: u8,
    extent_b: u8,
}

fn shape_for(kind: u8, extent: u8) -> Shape {
    let size = 0.25 + f32::from(extent) / 32.0;
    match kind % 3 {
        0 => Shape::Circle { radius: size },
        1 => Shape::Box {
            half_extents: vec2(size, size * 0.75),
        },
        _ => Shape::Polygon {
            vertices: vec![
                vec2(size, 0.0),
                vec2(0.0, size),
                vec2(-size, 0.0),
                vec2(0.0, -size),
            ],
        },
    }
}

fuzz_target!(|pair: FuzzPair| {
    let a = shape_for(pair.kind_a, pair.extent_a).transformed(&Transform2::new(
        vec2(f32::from(pair.ax) / 64.0, f32::from(pair.ay) / 64.0),
        f32::from(pair.rotation_a) / 16.0,
    ));
    let b = shape_for(pair.kind_b, pair.extent_b).transformed(&Transform2::new(
        vec2(f32::from(pair.bx) / 64.0, f32::from(pair.by) / 64.0),
        f32::from(pair.rotation_b) / 16.0,
    ));

    if let Some(simplex) = intersect_gjk(&a, &b) {
        let penetration = penetration_epa(&a, &b, &simplex);
        assert!(penetration.distance.is_finite());
        assert!(penetration.distance >= 0.0);
        assert!(penetration.normal.is_finite());
        let len = penetration.normal.length();
        assert!(
            (0.5..=1.5).contains(&len),
            "normal should be roughly unit length, got {len}"
        );
    }
});
