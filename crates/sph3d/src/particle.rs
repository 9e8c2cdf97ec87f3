//! Particle representation for the 3D SPH simulation.

use glam::Vec3;

/// A single SPH particle.
///
/// All fields are mutated in place by the solver phases: density and
/// pressure by the density phase, force by the force phase, velocity and
/// position by the integration phase.
#[derive(Clone, Copy, Debug, Default)]
pub struct Particle3D {
    /// World position
    pub position: Vec3,
    /// Current velocity
    pub velocity: Vec3,
    /// Force accumulated this tick, applied at integration
    pub force: Vec3,
    /// Kernel-summed density
    pub density: f32,
    /// Equation-of-state pressure (may be negative)
    pub pressure: f32,
}

impl Particle3D {
    /// Create a new particle at the given position with initial velocity.
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            velocity,
            force: Vec3::ZERO,
            density: 0.0,
            pressure: 0.0,
        }
    }

    /// Create a stationary particle at the given position.
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Vec3::ZERO)
    }
}

/// Collection of particles. The simulation owns exactly one.
pub struct Particles3D {
    pub list: Vec<Particle3D>,
}

impl Particles3D {
    /// Create an empty particle collection.
    pub fn new() -> Self {
        Self { list: Vec::new() }
    }

    /// Create with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            list: Vec::with_capacity(capacity),
        }
    }

    /// Add a particle with the given position and velocity.
    pub fn spawn(&mut self, position: Vec3, velocity: Vec3) {
        self.list.push(Particle3D::new(position, velocity));
    }

    /// Add a stationary particle.
    pub fn spawn_at(&mut self, position: Vec3) {
        self.list.push(Particle3D::at(position));
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Clear all particles.
    pub fn clear(&mut self) {
        self.list.clear();
    }

    /// Discard all particles and reseed a regular `size` lattice starting at
    /// `origin` with per-axis `spacing`.
    pub fn reseed_grid(&mut self, size: (usize, usize, usize), origin: Vec3, spacing: Vec3) {
        self.list.clear();
        self.list.reserve(size.0 * size.1 * size.2);
        for x in 0..size.0 {
            for y in 0..size.1 {
                for z in 0..size.2 {
                    let offset = spacing * Vec3::new(x as f32, y as f32, z as f32);
                    self.list.push(Particle3D::at(origin + offset));
                }
            }
        }
    }
}

impl Default for Particles3D {
    fn default() -> Self {
        Self::new()
    }
}
