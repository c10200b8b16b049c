//! Polarised emissivity from energy conservation.
//!
//! For an opaque lower medium, Kirchhoff's law gives e_p = 1 − Γ_p with
//! the reflectivity split into a coherent (specular) part and the
//! incoherent power scattered over the upper hemisphere:
//!
//! $$e_p(\theta) = 1 - |R_p(\theta)|^2 e^{-(2k\sigma\cos\theta)^2}
//!   - \frac{1}{4\pi\cos\theta}\int_0^{2\pi}\int_0^{\pi/2}
//!     \left[\sigma^0_{pp} + \sigma^0_{qp}\right] \sin\theta_s\,
//!     d\theta_s\, d\phi_s$$
//!
//! The integrand is even in φs, so only [0, π] is integrated. The
//! hemispherical integral runs on its own [`IntegratorConfig`], separate
//! from the cross-polarised one.

use std::f64::consts::{FRAC_PI_2, PI};

use super::copol;
use super::kernels::{clamp_polar, Angles};
use super::Scene;
use crate::fresnel::FresnelCoefficients;
use crate::model::ModelError;
use crate::quadrature::{integrate_2d_vec, IntegratorConfig};
use crate::types::{validate_polar_angle, ElectricalParameters, EmissivityResult, SurfaceParameters};

/// Violation of [0, 1] tolerated silently before the clamp is logged.
pub const CLAMP_TOLERANCE: f64 = 1.0e-6;

/// V and H emissivity at observation angle `theta` (rad).
pub fn emissivity(
    surface: &SurfaceParameters,
    electrical: &ElectricalParameters,
    theta: f64,
    hemisphere: &IntegratorConfig,
) -> Result<EmissivityResult, ModelError> {
    validate_polar_angle("observation", theta)?;
    let scene = Scene::new(surface, electrical)?;

    let theta = clamp_polar(theta);
    let cs = theta.cos();
    let fresnel = FresnelCoefficients::new(theta, scene.permittivity);
    let coherence = (-(2.0 * scene.ks() * cs).powi(2)).exp();
    let coherent = fresnel.reflectivity().map(|g| g * coherence);

    let outcome = integrate_2d_vec(
        |theta_s, phi_s| {
            let angles = Angles::new(theta, theta_s, phi_s);
            let c = copol::evaluate(&scene, &fresnel, &angles, 1.0);
            let jacobian = theta_s.sin();
            [(c.vv + c.hv) * jacobian, (c.hh + c.vh) * jacobian]
        },
        (0.0, FRAC_PI_2),
        (0.0, PI),
        hemisphere,
    );
    if !outcome.converged {
        log::warn!(
            "hemispherical integral did not converge in {} evaluations (errors {:.2e}, {:.2e})",
            outcome.evaluations,
            outcome.errors[0],
            outcome.errors[1]
        );
    }

    let normalisation = 1.0 / (2.0 * PI * cs);
    let scattered = outcome.values.map(|v| v * normalisation);
    let v = clamp_unit("V", 1.0 - coherent[0] - scattered[0]);
    let h = clamp_unit("H", 1.0 - coherent[1] - scattered[1]);

    log::debug!(
        "emissivity at {:.2}°: eV = {v:.4}, eH = {h:.4} ({} evaluations)",
        theta.to_degrees(),
        outcome.evaluations
    );

    Ok(EmissivityResult {
        v,
        h,
        coherent_reflectivity: coherent,
        scattered_reflectivity: scattered,
        quadrature: [outcome.component(0), outcome.component(1)],
    })
}

fn clamp_unit(polarisation: &str, e: f64) -> f64 {
    if !e.is_finite() {
        log::warn!("{polarisation} emissivity is not finite; reporting 0");
        return 0.0;
    }
    if e < -CLAMP_TOLERANCE || e > 1.0 + CLAMP_TOLERANCE {
        log::warn!("{polarisation} emissivity {e:.6} outside [0, 1]; clamping");
    }
    e.clamp(0.0, 1.0)
}
