//! Collider response scenarios
//!
//! Drives single particles through the full pipeline against each shape
//! and checks the reflected velocity, the positional snap-back, and the
//! one-way quirks of each shape.

use glam::{Quat, Vec3};
use sph3d::{
    Collider, ColliderSet, InnerBox, ObstacleGrid, OrientedBox, SphParams, SphSimulation3D,
    SphereShell,
};

fn quiet_params() -> SphParams {
    SphParams {
        gravity: Vec3::ZERO,
        ..Default::default()
    }
}

#[test]
fn test_box_reflects_and_snaps_back() {
    let mut sim = SphSimulation3D::new(quiet_params()).unwrap();
    let mut colliders = ColliderSet::new();
    colliders.push(Collider::Box(OrientedBox::from_transform(
        Vec3::new(12.0, 16.0, 16.0),
        Quat::IDENTITY,
        Vec3::new(2.0, 8.0, 8.0),
    )));
    *sim.colliders_mut() = colliders;

    let start = Vec3::new(10.0, 16.0, 16.0);
    sim.particles_mut().spawn(start, Vec3::new(10.0, 0.0, 0.0));

    // One step carries the particle across the x = 11 face.
    sim.update(0.2);

    let p = &sim.particles().list[0];
    assert_eq!(p.position, start, "hit must snap to the pre-step position");
    assert!(p.velocity.x < 0.0, "x velocity must reflect, got {:?}", p.velocity);
    // Elasticity halves the reflected speed.
    assert!((p.velocity.x + 5.0).abs() < 1e-3, "{:?}", p.velocity);
}

#[test]
fn test_box_ignores_passes_beside_it() {
    let mut sim = SphSimulation3D::new(quiet_params()).unwrap();
    sim.colliders_mut().push(Collider::Box(OrientedBox::from_transform(
        Vec3::new(12.0, 16.0, 16.0),
        Quat::IDENTITY,
        Vec3::splat(2.0),
    )));

    // Same x sweep but offset in y, clear of the box.
    let start = Vec3::new(10.0, 22.0, 16.0);
    sim.particles_mut().spawn(start, Vec3::new(10.0, 0.0, 0.0));
    sim.update(0.2);

    let p = &sim.particles().list[0];
    assert!(p.position.x > start.x, "free particle must keep moving");
    assert!(p.velocity.x > 0.0);
}

#[test]
fn test_shell_blocks_entry_from_outside() {
    let mut sim = SphSimulation3D::new(quiet_params()).unwrap();
    sim.colliders_mut().push(Collider::Sphere(SphereShell::new(
        Vec3::splat(16.0),
        5.0,
        1.0,
    )));

    // Just outside the inner radius 4, stepping across it.
    let start = Vec3::new(11.95, 16.0, 16.0);
    sim.particles_mut().spawn(start, Vec3::new(1.0, 0.0, 0.0));
    sim.update(0.2);

    let p = &sim.particles().list[0];
    assert_eq!(p.position, start);
    assert!(p.velocity.x < 0.0, "entry must reflect, got {:?}", p.velocity);
}

/// The shell is one-way: a particle leaving from the inside crosses the
/// wall untouched. Pinned so fluid poured in is the only handled case.
#[test]
fn test_shell_lets_inside_particles_leave() {
    let mut sim = SphSimulation3D::new(quiet_params()).unwrap();
    sim.colliders_mut().push(Collider::Sphere(SphereShell::new(
        Vec3::splat(16.0),
        5.0,
        1.0,
    )));

    let start = Vec3::new(14.0, 16.0, 16.0); // 2 units from center, inside
    sim.particles_mut().spawn(start, Vec3::new(31.0, 0.0, 0.0));
    sim.update(0.2);

    let p = &sim.particles().list[0];
    assert!(
        p.position.distance(Vec3::splat(16.0)) > 4.0,
        "inside-to-outside must pass through, ended at {:?}",
        p.position
    );
    assert!(p.velocity.x > 0.0);
}

#[test]
fn test_inner_box_floor_bounces_top_open() {
    let params = SphParams::default(); // gravity on
    let center = Vec3::splat(16.0);
    let make_sim = |velocity: Vec3, start: Vec3| {
        let mut sim = SphSimulation3D::new(params).unwrap();
        sim.colliders_mut()
            .push(Collider::InnerBox(InnerBox::new(center, Vec3::splat(4.0))));
        sim.particles_mut().spawn(start, velocity);
        sim
    };

    // Falling onto the floor at y = 12.
    let mut sim = make_sim(Vec3::new(0.0, -8.0, 0.0), Vec3::new(16.0, 12.5, 16.0));
    sim.update(0.2);
    let p = &sim.particles().list[0];
    assert!(p.position.y >= 12.0, "floor must hold, got {:?}", p.position);
    assert!(p.velocity.y > 0.0, "floor hit must reflect upward");

    // Launched out the open top.
    let mut sim = make_sim(Vec3::new(0.0, 8.0, 0.0), Vec3::new(16.0, 19.5, 16.0));
    sim.update(0.2);
    let p = &sim.particles().list[0];
    assert!(p.position.y > 20.0, "the +Y face is open, got {:?}", p.position);
}

/// Registration order decides which hit the integrator sees: the box
/// reports a crossing parameter, the inner box always reports zero.
#[test]
fn test_collider_set_order_decides_response() {
    let center = Vec3::splat(16.0);
    let slab = Collider::Box(OrientedBox::from_transform(
        Vec3::new(20.0, 16.0, 16.0),
        Quat::IDENTITY,
        Vec3::new(4.0, 8.0, 8.0),
    ));
    let walls = Collider::InnerBox(InnerBox::new(center, Vec3::splat(2.0)));

    let start = Vec3::new(17.5, 16.0, 16.0);
    let end = Vec3::new(19.5, 16.0, 16.0);

    let box_first = ColliderSet::from_colliders(vec![slab, walls]);
    let hit = box_first.test_collision(start, end).expect("box must hit");
    assert!(hit.ratio > 0.0);

    let walls_first = ColliderSet::from_colliders(vec![walls, slab]);
    let hit = walls_first.test_collision(start, end).expect("walls must hit");
    assert_eq!(hit.ratio, 0.0);
}

#[test]
fn test_obstacle_grid_wall_reflects_axis() {
    let mut sim = SphSimulation3D::new(quiet_params()).unwrap();
    let mut obstacles = ObstacleGrid::new(Vec3::ZERO, 1.0, glam::IVec3::splat(32));
    for y in 0..32 {
        for z in 0..32 {
            obstacles.mark_solid(glam::IVec3::new(20, y, z));
        }
    }
    sim.set_obstacles(Some(obstacles));

    sim.particles_mut()
        .spawn(Vec3::new(19.5, 16.0, 16.0), Vec3::new(5.0, 0.0, 0.0));
    sim.update(0.2);

    let p = &sim.particles().list[0];
    assert!(p.position.x < 20.0, "solid cells must not be entered, got {:?}", p.position);
    assert!(p.velocity.x < 0.0, "crossing axis must reflect, got {:?}", p.velocity);
}
