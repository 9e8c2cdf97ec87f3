//! Solver parameters, validation and precomputed kernel coefficients.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{BOUND_DAMPING, GRAVITY};
use crate::kernels;
use crate::serde_utils::{deserialize_vec3, serialize_vec3};

/// Configuration rejected at construction time.
#[derive(Debug, Error)]
pub enum SphError {
    #[error("smoothing radius must be positive, got {0}")]
    InvalidSmoothingRadius(f32),
    #[error("particle mass must be positive, got {0}")]
    InvalidMass(f32),
    #[error("rest density must be positive, got {0}")]
    InvalidRestDensity(f32),
    #[error("bounds min {min:?} must be strictly below bounds max {max:?} on every axis")]
    InvalidBounds { min: Vec3, max: Vec3 },
    #[error("voxel resolution {0} is below the minimum of {1} needed for corner clamping")]
    ResolutionTooSmall(usize, usize),
}

/// Numeric configuration of the SPH solver.
///
/// Defaults give a water-like rest density with a stiff equation of
/// state.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SphParams {
    /// Kernel support radius h. Pairs at distance >= h do not interact.
    pub smoothing_radius: f32,
    /// Per-particle mass (all particles share it).
    pub particle_mass: f32,
    /// Density at which pressure is zero.
    pub rest_density: f32,
    /// Equation-of-state stiffness: pressure = gas_constant * (rho - rho0).
    pub gas_constant: f32,
    /// Viscosity coefficient.
    pub viscosity: f32,
    /// Scale applied to a velocity reflected off a collider.
    pub collision_elasticity: f32,
    /// Negate-and-scale factor for the boundary clamp (negative).
    pub bound_damping: f32,
    /// Gravity acceleration.
    #[serde(serialize_with = "serialize_vec3", deserialize_with = "deserialize_vec3")]
    pub gravity: Vec3,
    /// Lower corner of the simulated region.
    #[serde(serialize_with = "serialize_vec3", deserialize_with = "deserialize_vec3")]
    pub bounds_min: Vec3,
    /// Upper corner of the simulated region.
    #[serde(serialize_with = "serialize_vec3", deserialize_with = "deserialize_vec3")]
    pub bounds_max: Vec3,
}

impl Default for SphParams {
    fn default() -> Self {
        Self {
            smoothing_radius: 1.0,
            particle_mass: 0.65,
            rest_density: 1.0,
            gas_constant: 2.0,
            viscosity: 0.25,
            collision_elasticity: 0.5,
            bound_damping: BOUND_DAMPING,
            gravity: GRAVITY,
            bounds_min: Vec3::ZERO,
            bounds_max: Vec3::splat(32.0),
        }
    }
}

impl SphParams {
    /// Check the configuration, returning a descriptive error for values
    /// that would corrupt the solver.
    pub fn validate(&self) -> Result<(), SphError> {
        if !(self.smoothing_radius > 0.0) || !self.smoothing_radius.is_finite() {
            return Err(SphError::InvalidSmoothingRadius(self.smoothing_radius));
        }
        if !(self.particle_mass > 0.0) {
            return Err(SphError::InvalidMass(self.particle_mass));
        }
        if !(self.rest_density > 0.0) {
            return Err(SphError::InvalidRestDensity(self.rest_density));
        }
        if self.bounds_min.cmpge(self.bounds_max).any() {
            return Err(SphError::InvalidBounds {
                min: self.bounds_min,
                max: self.bounds_max,
            });
        }
        Ok(())
    }

    /// Precompute the kernel normalization constants for this radius.
    pub fn kernel_coefficients(&self) -> KernelCoefficients {
        KernelCoefficients::new(self.smoothing_radius)
    }
}

/// Kernel constants precomputed once per parameter set so the per-pair hot
/// path never calls `powi`.
#[derive(Clone, Copy, Debug)]
pub struct KernelCoefficients {
    /// Support radius h
    pub h: f32,
    /// h * h
    pub h2: f32,
    /// 315 / (64 pi h^9)
    pub poly6: f32,
    /// -45 / (pi h^6)
    pub spiky_grad: f32,
    /// 45 / (pi h^6)
    pub visc_laplacian: f32,
}

impl KernelCoefficients {
    pub fn new(h: f32) -> Self {
        Self {
            h,
            h2: h * h,
            poly6: kernels::poly6_coefficient(h),
            spiky_grad: kernels::spiky_grad_coefficient(h),
            visc_laplacian: kernels::viscosity_laplacian_coefficient(h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_valid() {
        assert!(SphParams::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_radius() {
        let params = SphParams {
            smoothing_radius: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(SphError::InvalidSmoothingRadius(_))
        ));
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let params = SphParams {
            bounds_min: Vec3::splat(10.0),
            bounds_max: Vec3::splat(5.0),
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(SphError::InvalidBounds { .. })));
    }

    #[test]
    fn test_error_message_is_descriptive() {
        let err = SphError::InvalidRestDensity(-1.0);
        assert!(err.to_string().contains("rest density"));
    }

    #[test]
    fn test_kernel_coefficients_signs() {
        let coeffs = SphParams::default().kernel_coefficients();
        assert!(coeffs.poly6 > 0.0);
        assert!(coeffs.spiky_grad < 0.0);
        assert!(coeffs.visc_laplacian > 0.0);
        assert_eq!(coeffs.h2, coeffs.h * coeffs.h);
    }
}
