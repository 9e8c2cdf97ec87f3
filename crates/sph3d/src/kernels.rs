//! SPH smoothing kernels (poly6, spiky gradient, viscosity laplacian).
//!
//! Coefficients are precomputed once per parameter set; the hot-path
//! functions take them as arguments so no `powi` runs per pair.

use std::f32::consts::PI;

/// Poly6 normalization: 315 / (64 pi h^9).
#[inline]
pub fn poly6_coefficient(h: f32) -> f32 {
    315.0 / (64.0 * PI * h.powi(9))
}

/// Spiky gradient normalization: -45 / (pi h^6).
#[inline]
pub fn spiky_grad_coefficient(h: f32) -> f32 {
    -45.0 / (PI * h.powi(6))
}

/// Viscosity laplacian normalization: 45 / (pi h^6).
#[inline]
pub fn viscosity_laplacian_coefficient(h: f32) -> f32 {
    45.0 / (PI * h.powi(6))
}

/// Poly6 kernel evaluated on squared distance.
/// Zero at and beyond the support radius (strict `r2 < h2` inside).
#[inline]
pub fn poly6(r2: f32, h2: f32, coeff: f32) -> f32 {
    if r2 >= h2 {
        return 0.0;
    }
    let term = h2 - r2;
    coeff * term * term * term
}

/// Scalar part of the spiky kernel gradient: coeff * (h - r)^2.
/// Zero at and beyond the support radius.
#[inline]
pub fn spiky_grad(r: f32, h: f32, coeff: f32) -> f32 {
    if r >= h {
        return 0.0;
    }
    let term = h - r;
    coeff * term * term
}

/// Viscosity laplacian: coeff * (h - r). Zero at and beyond the support
/// radius.
#[inline]
pub fn viscosity_laplacian(r: f32, h: f32, coeff: f32) -> f32 {
    if r >= h {
        return 0.0;
    }
    coeff * (h - r)
}
