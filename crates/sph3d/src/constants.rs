//! Physical and numerical constants for the SPH solver.

use glam::Vec3;

/// Gravity acceleration (m/s^2) - negative Y direction
pub const GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

/// Minimum density used as divisor in the force and integration phases.
/// Densities below this are floored so an isolated particle never produces
/// non-finite velocities.
pub const DENSITY_FLOOR: f32 = 1e-6;

/// Squared speed below which direction-dependent collision tests are
/// skipped. Avoids normalizing a near-zero velocity.
pub const VELOCITY_EPSILON_SQ: f32 = 0.01;

/// Default damping applied to a velocity component reflected by the
/// boundary clamp. Negative: the component is negated and scaled.
pub const BOUND_DAMPING: f32 = -0.5;
