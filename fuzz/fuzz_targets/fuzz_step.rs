#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use impulse2d::{RigidBody, Shape, Vec2, World, WorldConfig};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    /// Body positions (i8 keeps everything near the origin so collisions
    /// actually happen)
    positions: Vec<(i8, i8)>,
    /// Mass numerators (> 0 after clamping)
    masses: Vec<u8>,
    /// Steps to run
    steps: u8,
}

// Step a randomized world. Must never panic, even with heavily overlapping
// bodies, and must never produce a non-finite pose.
fuzz_target!(|input: FuzzInput| {
    let mut world = match World::new(WorldConfig::default()) {
        Ok(w) => w,
        Err(_) => return,
    };

    let count = input.positions.len().min(16);
    for (i, &(x, y)) in input.positions.iter().take(count).enumerate() {
        let mass = 1.0 + f64::from(*input.masses.get(i).unwrap_or(&0)) / 32.0;
        let body = RigidBody::new_dynamic(
            Vec2::new(f64::from(x) / 4.0, f64::from(y) / 4.0),
            mass,
            Shape::circle(0.5),
        )
        .expect("mass is always positive");
        world.add(body);
    }

    let steps = (input.steps as usize).min(64);
    for _ in 0..steps {
        world.step(1.0 / 60.0);
    }

    for id in 0..count as u32 {
        if let Some(body) = world.body(id) {
            assert!(body.position.is_finite(), "pose must stay finite");
        }
    }
});
