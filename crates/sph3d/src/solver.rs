//! The per-substep solver phases: density/pressure, forces, integration.
//!
//! Every phase is a data-parallel pass over particle slots. The density
//! and force phases read a frozen snapshot of the whole array and write
//! only slot i's own fields, so parallel and sequential execution produce
//! the same result. The caller refreshes the snapshot between phases.

use glam::Vec3;
use rayon::prelude::*;

use crate::collider::ColliderSet;
use crate::constants::{DENSITY_FLOOR, VELOCITY_EPSILON_SQ};
use crate::kernels;
use crate::obstacle::ObstacleGrid;
use crate::params::{KernelCoefficients, SphParams};
use crate::particle::{Particle3D, Particles3D};
use crate::spatial_hash::SpatialHashGrid;

/// Phase 2: kernel-summed density and equation-of-state pressure.
///
/// The self term (j = i) is included; pairs at exactly the support radius
/// contribute nothing (strict `r2 < h2`). Pressure may go negative and is
/// never clamped.
pub fn compute_density_pressure(
    particles: &mut Particles3D,
    snapshot: &[Particle3D],
    grid: &SpatialHashGrid,
    params: &SphParams,
    coeffs: &KernelCoefficients,
) {
    debug_assert_eq!(particles.len(), snapshot.len());
    let mass = params.particle_mass;

    particles.list.par_iter_mut().for_each(|p| {
        let mut density = 0.0;
        grid.for_each_neighbor(p.position, |j| {
            let r2 = p.position.distance_squared(snapshot[j].position);
            density += mass * kernels::poly6(r2, coeffs.h2, coeffs.poly6);
        });
        p.density = density;
        p.pressure = params.gas_constant * (density - params.rest_density);
    });
}

/// Phase 3: pressure, viscosity and gravity forces.
///
/// Reads position, velocity, density and pressure from the snapshot (the
/// density phase has already run, so the snapshot must be refreshed before
/// this call). Writes only `force`.
pub fn compute_forces(
    particles: &mut Particles3D,
    snapshot: &[Particle3D],
    grid: &SpatialHashGrid,
    params: &SphParams,
    coeffs: &KernelCoefficients,
) {
    debug_assert_eq!(particles.len(), snapshot.len());
    let mass = params.particle_mass;

    particles
        .list
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, p)| {
            let mut pressure_force = Vec3::ZERO;
            let mut viscosity_force = Vec3::ZERO;

            grid.for_each_neighbor(p.position, |j| {
                if j == i {
                    return;
                }
                let other = &snapshot[j];
                let delta = other.position - p.position;
                let r2 = delta.length_squared();
                if r2 >= coeffs.h2 {
                    return;
                }
                let r = r2.sqrt();
                let density_j = other.density.max(DENSITY_FLOOR);

                // Coincident pairs have no direction; only viscosity acts.
                let dir = delta.normalize_or_zero();
                pressure_force += -dir
                    * mass
                    * (p.pressure + other.pressure)
                    / (2.0 * density_j)
                    * kernels::spiky_grad(r, coeffs.h, coeffs.spiky_grad);

                viscosity_force += params.viscosity
                    * mass
                    * (other.velocity - p.velocity)
                    / density_j
                    * kernels::viscosity_laplacian(r, coeffs.h, coeffs.visc_laplacian);
            });

            p.force = pressure_force + viscosity_force + params.gravity * p.density;
        });
}

/// Phase 4: semi-implicit Euler step, collider response, obstacle-grid
/// response, boundary clamp.
///
/// Needs no snapshot: each slot reads and writes only itself.
pub fn integrate(
    particles: &mut Particles3D,
    dt: f32,
    params: &SphParams,
    colliders: &ColliderSet,
    obstacles: Option<&ObstacleGrid>,
) {
    let eps = params.smoothing_radius;
    let min = params.bounds_min;
    let max = params.bounds_max;

    particles.list.par_iter_mut().for_each(|p| {
        p.velocity += dt * p.force / p.density.max(DENSITY_FLOOR);

        let start = p.position;
        let mut end = start + dt * p.velocity;

        // Near-stationary particles skip the direction-dependent shape
        // tests.
        if p.velocity.length_squared() >= VELOCITY_EPSILON_SQ {
            if let Some(hit) = colliders.test_collision(start, end) {
                p.velocity = reflect(p.velocity, hit.normal) * params.collision_elasticity;
                end = start;
            }
        }

        if let Some(grid) = obstacles {
            if let Some((pos, vel)) = grid.resolve(start, end, p.velocity) {
                end = pos;
                p.velocity = vel;
            }
        }

        // Per-axis damped reflection keeps every particle strictly inside
        // the bounds.
        for axis in 0..3 {
            if end[axis] < min[axis] + eps {
                p.velocity[axis] *= params.bound_damping;
                end[axis] = min[axis] + eps;
            } else if end[axis] > max[axis] - eps {
                p.velocity[axis] *= params.bound_damping;
                end[axis] = max[axis] - eps;
            }
        }

        p.position = end;
    });
}

#[inline]
fn reflect(v: Vec3, normal: Vec3) -> Vec3 {
    v - 2.0 * v.dot(normal) * normal
}

/// Mean density and pressure over the live set, for diagnostics and
/// kernel-normalization regression tests.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldStats {
    pub mean_density: f32,
    pub mean_pressure: f32,
}

impl FieldStats {
    pub fn measure(particles: &Particles3D) -> Self {
        if particles.is_empty() {
            return Self::default();
        }
        let n = particles.len() as f32;
        let (density_sum, pressure_sum) = particles
            .list
            .iter()
            .fold((0.0_f32, 0.0_f32), |(d, p), particle| {
                (d + particle.density, p + particle.pressure)
            });
        Self {
            mean_density: density_sum / n,
            mean_pressure: pressure_sum / n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collider::ColliderSet;

    fn density_pass(particles: &mut Particles3D, params: &SphParams) {
        let coeffs = params.kernel_coefficients();
        let mut grid = SpatialHashGrid::new(params.smoothing_radius);
        grid.build(particles);
        let snapshot = particles.list.clone();
        compute_density_pressure(particles, &snapshot, &grid, params, &coeffs);
    }

    #[test]
    fn test_isolated_particle_density_is_self_term() {
        let params = SphParams::default();
        let coeffs = params.kernel_coefficients();
        let mut particles = Particles3D::new();
        particles.spawn_at(Vec3::splat(10.0));

        density_pass(&mut particles, &params);

        let expected = params.particle_mass * kernels::poly6(0.0, coeffs.h2, coeffs.poly6);
        let got = particles.list[0].density;
        assert!((got - expected).abs() < 1e-6 * expected, "{} vs {}", got, expected);
    }

    #[test]
    fn test_pair_at_support_radius_contributes_nothing() {
        let params = SphParams::default();
        let h = params.smoothing_radius;
        let mut particles = Particles3D::new();
        particles.spawn_at(Vec3::ZERO);
        particles.spawn_at(Vec3::new(h, 0.0, 0.0));

        density_pass(&mut particles, &params);

        // Each particle sees only its own self term.
        assert_eq!(particles.list[0].density, particles.list[1].density);
        let mut lone = Particles3D::new();
        lone.spawn_at(Vec3::ZERO);
        density_pass(&mut lone, &params);
        assert_eq!(particles.list[0].density, lone.list[0].density);
    }

    #[test]
    fn test_symmetric_pair_forces_oppose() {
        let params = SphParams {
            gravity: Vec3::ZERO,
            ..Default::default()
        };
        let coeffs = params.kernel_coefficients();
        let mut particles = Particles3D::new();
        particles.spawn_at(Vec3::new(-0.2, 0.0, 0.0));
        particles.spawn_at(Vec3::new(0.2, 0.0, 0.0));

        let mut grid = SpatialHashGrid::new(params.smoothing_radius);
        grid.build(&particles);
        let snapshot = particles.list.clone();
        compute_density_pressure(&mut particles, &snapshot, &grid, &params, &coeffs);
        let snapshot = particles.list.clone();
        compute_forces(&mut particles, &snapshot, &grid, &params, &coeffs);

        let f0 = particles.list[0].force;
        let f1 = particles.list[1].force;
        assert!((f0 + f1).length() < 1e-4, "forces must be equal and opposite: {:?} {:?}", f0, f1);
        assert!(f0.x.abs() > 0.0, "pair must interact");
    }

    #[test]
    fn test_integrate_clamps_to_bounds() {
        let params = SphParams::default();
        let mut particles = Particles3D::new();
        particles.spawn(Vec3::new(1.5, 1.5, 1.5), Vec3::new(-100.0, 0.0, 0.0));
        particles.list[0].density = 1.0;

        integrate(&mut particles, 0.1, &params, &ColliderSet::new(), None);

        let p = &particles.list[0];
        assert_eq!(p.position.x, params.bounds_min.x + params.smoothing_radius);
        // Damping negates and halves the offending component.
        assert!(p.velocity.x > 0.0);
    }

    #[test]
    fn test_slow_particle_skips_collider_tests() {
        // A particle moving slower than the epsilon must not consult
        // colliders at all.
        let params = SphParams {
            gravity: Vec3::ZERO,
            ..Default::default()
        };
        let mut colliders = ColliderSet::new();
        colliders.push(crate::collider::Collider::Sphere(
            crate::collider::SphereShell::new(Vec3::splat(16.0), 5.0, 1.0),
        ));

        let mut particles = Particles3D::new();
        particles.spawn(Vec3::new(12.0, 16.0, 16.0), Vec3::new(0.05, 0.0, 0.0));
        particles.list[0].density = 1.0;

        integrate(&mut particles, 1.0, &params, &colliders, None);
        // Velocity unchanged: no reflection happened.
        assert_eq!(particles.list[0].velocity, Vec3::new(0.05, 0.0, 0.0));
    }

    #[test]
    fn test_field_stats_empty_set() {
        assert_eq!(FieldStats::measure(&Particles3D::new()), FieldStats::default());
    }
}
