//! Headless dam-break run printing per-frame field statistics.

use glam::{Quat, Vec3};
use sph3d::{Collider, ColliderSet, OrientedBox, SphParams, SphSimulation3D};

fn main() {
    println!("=== DAM BREAK DIAGNOSTIC ===\n");

    let params = SphParams::default();
    let mut sim = SphSimulation3D::new(params).expect("default params are valid");

    let mut colliders = ColliderSet::new();
    colliders.push(Collider::Box(OrientedBox::from_transform(
        Vec3::new(16.0, 4.0, 16.0),
        Quat::from_rotation_z(0.3),
        Vec3::new(6.0, 2.0, 10.0),
    )));
    sim.reset((8, 14, 8), Vec3::new(2.0, 2.0, 12.0), Vec3::splat(0.55), colliders);

    println!("Particles: {}", sim.particles().len());
    println!(
        "Bounds: {:?} .. {:?}\n",
        sim.params().bounds_min,
        sim.params().bounds_max
    );

    let dt = 1.0 / 120.0;
    for frame in 0..600 {
        sim.update(dt);

        if frame % 60 == 0 {
            let stats = sim.stats();
            let max_speed = sim
                .particles()
                .list
                .iter()
                .map(|p| p.velocity.length())
                .fold(0.0f32, f32::max);
            let min_y = sim
                .particles()
                .list
                .iter()
                .map(|p| p.position.y)
                .fold(f32::MAX, f32::min);

            println!(
                "F{:3}: meanRho={:7.4}, meanP={:8.4}, |v|max={:7.3}, minY={:6.3}",
                frame, stats.mean_density, stats.mean_pressure, max_speed, min_y
            );
        }
    }

    let nan_count = sim
        .particles()
        .list
        .iter()
        .filter(|p| !p.position.is_finite() || !p.velocity.is_finite())
        .count();
    println!("\nDone. Non-finite particles: {}", nan_count);
}
