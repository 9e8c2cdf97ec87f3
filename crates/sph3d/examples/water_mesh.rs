//! Mesh a randomly jittered splash and print surface statistics per frame.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use sph3d::{ColliderSet, Emitter, SphParams, SphSimulation3D, SurfaceMesher};

fn main() {
    println!("=== WATER MESH DIAGNOSTIC ===\n");

    let mut sim = SphSimulation3D::new(SphParams::default()).expect("default params are valid");
    sim.reset((6, 6, 6), Vec3::new(13.0, 4.0, 13.0), Vec3::splat(0.6), ColliderSet::new());

    // Droplet stream falling into the pool, with jittered spawn velocity.
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    sim.push_emitter(Emitter::new(
        Vec3::new(16.0, 28.0, 16.0),
        Vec3::new(rng.gen_range(-0.5..0.5), -4.0, rng.gen_range(-0.5..0.5)),
        0.05,
    ));
    sim.set_particle_budget(400);

    let mut mesher = SurfaceMesher::new(48).expect("resolution is above the minimum");
    let (min, max) = (sim.params().bounds_min, sim.params().bounds_max);

    let dt = 1.0 / 120.0;
    for frame in 0..480 {
        sim.update(dt);

        if frame % 60 == 0 {
            let mesh = mesher.build_mesh(sim.particles(), min, max);
            println!(
                "F{:3}: particles={:4}, triangles={:5}, vertices={:5}",
                frame,
                sim.particles().len(),
                mesh.triangle_count(),
                mesh.vertices.len()
            );
        }
    }

    let mesh = mesher.build_mesh(sim.particles(), min, max);
    println!(
        "\nFinal mesh: {} triangles, {} vertices",
        mesh.triangle_count(),
        mesh.vertices.len()
    );
}
