//! Depolarised (VH) backscatter.
//!
//! The single-scattering cross-polarised term vanishes in backscatter, so
//! VH comes from the multiple-scattering part of the I2EM. After the
//! azimuthal reduction it is a double integral over the normalised
//! transverse spectral radius r ∈ [0.1, 1] and azimuth φ ∈ [0, π]:
//!
//! $$\sigma^0_{vh} = \int_{0.1}^{1}\int_0^\pi
//!   \frac{e^{-2(k\sigma\cos\theta)^2}}{4\pi}
//!   \left|F_{vh}(r, \phi)\right|^2 S(r)\, r
//!   \left[\sum_n \frac{x^n}{n!} k^2 W^{(n)}(K_-)\right]
//!   \left[\sum_m \frac{x^m}{m!} k^2 W^{(m)}(K_+)\right] d\phi\, dr$$
//!
//! with $x = (k\sigma\cos\theta)^2$ and $K_\mp = k\,|(r\cos\phi \mp
//! \sin\theta,\ r\sin\phi)|$. The double spectral sum factorises, so each
//! integrand evaluation costs two single series.

use std::f64::consts::PI;

use super::kernels::{clamp_polar, cross_pol_shadowing};
use super::Scene;
use crate::fresnel::FresnelCoefficients;
use crate::model::{ModelError, TermSelection};
use crate::quadrature::integrate_2d;
use crate::series::{select_term_count, SeriesTerms, TruncationPolicy};
use crate::tuning::TuningConfig;
use crate::types::{validate_polar_angle, CrossPolResult, ElectricalParameters, SurfaceParameters};

/// Lower end of the spectral radius.
const R_MIN: f64 = 0.1;
const R_MAX: f64 = 1.0;

/// Keeps the vertical wavenumber √(1 − r²) away from zero at r = 1.
const VERTICAL_GUARD: f64 = 1.0e-4;

/// Series power $(k\sigma)^2 (2\cos\theta)^2$ that drives term selection.
fn selection_power(ks: f64, cos_theta: f64) -> f64 {
    (ks * 2.0 * cos_theta).powi(2)
}

/// Number of spectral terms for one evaluation.
pub fn term_count(ks: f64, theta: f64, selection: TermSelection, epsilon: f64) -> usize {
    match selection {
        TermSelection::Fixed(n) => n.max(1),
        TermSelection::Auto => select_term_count(
            selection_power(ks, clamp_polar(theta).cos()),
            &TruncationPolicy::with_epsilon(epsilon),
        ),
    }
}

/// VH backscatter at incidence `theta` (rad), scaled by `tuning.vh_scale`.
///
/// Exhausting the integrator budget is a soft failure: the estimate is
/// returned with `quadrature.converged == false` and a warning is logged.
pub fn cross_pol(
    surface: &SurfaceParameters,
    electrical: &ElectricalParameters,
    theta: f64,
    selection: TermSelection,
    tuning: &TuningConfig,
) -> Result<CrossPolResult, ModelError> {
    validate_polar_angle("incidence", theta)?;
    tuning.validate()?;
    let scene = Scene::new(surface, electrical)?;

    let theta = clamp_polar(theta);
    let (s, cs) = theta.sin_cos();
    let k = scene.k;
    let er = scene.permittivity;
    let ks2 = scene.ks() * scene.ks();
    let terms = term_count(scene.ks(), theta, selection, tuning.auto_select_epsilon);

    let fresnel = FresnelCoefficients::new(theta, er);
    let rvh = (fresnel.rv - fresnel.rh) * 0.5;
    let rp = 1.0 + rvh;
    let rm = 1.0 - rvh;
    let attenuation = (-2.0 * ks2 * cs * cs).exp() / (16.0 * PI);
    let x = ks2 * cs * cs;

    let spectral_sum = |wavenumber: f64| -> f64 {
        SeriesTerms::new(x)
            .take(terms)
            .map(|(n, weight)| {
                weight * k * k * scene.correlation.spectrum(n, wavenumber, scene.length)
            })
            .sum()
    };

    let integrand = |r: f64, phi: f64| -> f64 {
        let (sp, cp) = phi.sin_cos();
        let rx = r * cp;
        let ry = r * sp;

        let q = (1.0 + VERTICAL_GUARD - r * r).sqrt();
        let qt = (er - r * r).sqrt();
        let a = rp / q;
        let b = rm / q;
        let c = rp / qt;
        let d = rm / qt;
        let geometry = rx * ry / cs;
        let f1 = (b - c) * (1.0 - 3.0 * rvh) - (b - c / er) * rp;
        let f2 = (a - d) * (1.0 + 3.0 * rvh) - (a - d * er) * rm;
        let fvh: f64 = ((f1 + f2) * geometry).norm_sqr();
        if fvh == 0.0 {
            return 0.0;
        }

        let shadow = cross_pol_shadowing(q, r, scene.rms_slope);
        let minus = k * (rx - s).hypot(ry);
        let plus = k * (rx + s).hypot(ry);
        let value = 4.0 * attenuation * fvh * spectral_sum(minus) * spectral_sum(plus) * r * shadow;
        if value.is_finite() {
            value
        } else {
            0.0
        }
    };

    let outcome = integrate_2d(integrand, (R_MIN, R_MAX), (0.0, PI), &tuning.integrator);
    if !outcome.converged {
        log::warn!(
            "cross-pol integral did not converge in {} evaluations (estimate {:.4e}, error {:.2e}); returning best estimate",
            outcome.evaluations,
            outcome.value,
            outcome.error
        );
    }
    log::debug!(
        "cross-pol at {:.2}°: {} terms, {} evaluations",
        theta.to_degrees(),
        terms,
        outcome.evaluations
    );

    let unscaled = outcome.value.max(0.0);
    Ok(CrossPolResult {
        vh: tuning.vh_scale * unscaled,
        unscaled,
        terms,
        quadrature: outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::CorrelationFunction;
    use approx::assert_abs_diff_eq;
    use num_complex::Complex64;

    fn soil() -> ElectricalParameters {
        ElectricalParameters::new(3.0, Complex64::new(11.3, 1.5)).unwrap()
    }

    #[test]
    fn test_reference_level_and_term_count() {
        let surface = SurfaceParameters::new(0.0025, 0.10, CorrelationFunction::Gaussian).unwrap();
        let out = cross_pol(
            &surface,
            &soil(),
            30f64.to_radians(),
            TermSelection::Auto,
            &TuningConfig::DEFAULT,
        )
        .unwrap();
        assert_eq!(out.terms, 6);
        assert!(out.quadrature.converged);
        assert_abs_diff_eq!(out.db(), -71.75, epsilon = 0.2);
    }

    #[test]
    fn test_vh_scale_is_linear() {
        let surface = SurfaceParameters::new(0.008, 0.05, CorrelationFunction::Exponential).unwrap();
        let base = cross_pol(&surface, &soil(), 0.5, TermSelection::Auto, &TuningConfig::DEFAULT)
            .unwrap();
        let tuning = TuningConfig {
            vh_scale: 4.0,
            ..TuningConfig::DEFAULT
        };
        let scaled = cross_pol(&surface, &soil(), 0.5, TermSelection::Auto, &tuning).unwrap();
        assert_eq!(scaled.unscaled, base.unscaled);
        assert_abs_diff_eq!(scaled.db() - base.db(), 10.0 * 4f64.log10(), epsilon = 1e-9);
    }

    #[test]
    fn test_fixed_selection_uses_requested_terms() {
        let surface = SurfaceParameters::new(0.008, 0.05, CorrelationFunction::Exponential).unwrap();
        let out = cross_pol(
            &surface,
            &soil(),
            0.5,
            TermSelection::from_flag(false),
            &TuningConfig::DEFAULT,
        )
        .unwrap();
        assert_eq!(out.terms, TermSelection::DEFAULT_FIXED_TERMS);
        assert!(out.vh > 0.0);
    }

    #[test]
    fn test_starved_integrator_is_soft_failure() {
        let surface = SurfaceParameters::new(0.008, 0.05, CorrelationFunction::Exponential).unwrap();
        let mut tuning = TuningConfig::DEFAULT;
        tuning.integrator.max_evaluations = 17;
        tuning.integrator.relative_tolerance = 1e-12;
        let out = cross_pol(&surface, &soil(), 0.5, TermSelection::Auto, &tuning).unwrap();
        assert!(!out.quadrature.converged);
        assert!(out.vh.is_finite() && out.vh >= 0.0);
        assert!(matches!(
            out.require_converged(),
            Err(ModelError::NonConvergence { .. })
        ));
    }

    #[test]
    fn test_term_count_respects_selection() {
        assert_eq!(term_count(0.5, 0.3, TermSelection::Fixed(7), 1e-8), 7);
        assert_eq!(term_count(0.5, 0.3, TermSelection::Fixed(0), 1e-8), 1);
        let tight = term_count(0.5, 0.3, TermSelection::Auto, 1e-10);
        let loose = term_count(0.5, 0.3, TermSelection::Auto, 1e-4);
        assert!(loose <= tight);
    }
}
