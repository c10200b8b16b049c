//! Special functions used by the roughness spectrum engine.
//!
//! Gamma and error functions come from `statrs`; this module adds the two
//! Bessel functions the non-closed-form spectra need:
//!
//! - $J_0(x)$, the kernel of the zero-order Hankel transform used by the
//!   x-exponential spectrum.
//! - $z^p K_\nu(z)$ for real order, evaluated through the integral
//!   representation $K_\nu(z) = \int_0^\infty e^{-z\cosh t}\cosh(\nu t)\,dt$
//!   in log space so that large orders underflow to zero instead of NaN.
//!
//! # Reference
//! Press, W. H. et al., *Numerical Recipes in C*, 2nd ed., §6.5 (J0);
//! Abramowitz, M. and Stegun, I. A., *Handbook of Mathematical Functions*,
//! eq. 9.6.24 (integral form of K).

use crate::quadrature::{integrate_1d, IntegratorConfig};

/// Bessel function of the first kind, order zero.
///
/// Rational approximation for |x| < 8, asymptotic form beyond. Absolute
/// error is below 1e-8 everywhere.
pub fn bessel_j0(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 8.0 {
        let y = x * x;
        let num = 57_568_490_574.0
            + y * (-13_362_590_354.0
                + y * (651_619_640.7
                    + y * (-11_214_424.18 + y * (77_392.330_17 + y * (-184.905_245_6)))));
        let den = 57_568_490_411.0
            + y * (1_029_532_985.0
                + y * (9_494_680.718 + y * (59_272.648_53 + y * (267.853_271_2 + y))));
        num / den
    } else {
        let z = 8.0 / ax;
        let y = z * z;
        let xx = ax - 0.785_398_164;
        let p = 1.0
            + y * (-0.109_862_862_7e-2
                + y * (0.273_451_040_7e-4 + y * (-0.207_337_063_9e-5 + y * 0.209_388_721_1e-6)));
        let q = -0.156_249_999_5e-1
            + y * (0.143_048_876_5e-3
                + y * (-0.691_114_765_1e-5 + y * (0.762_109_516_1e-6 - y * 0.934_935_152e-7)));
        (0.636_619_772 / ax).sqrt() * (xx.cos() * p - z * xx.sin() * q)
    }
}

/// Log-space integrand decay (in nepers) below the peak at which the
/// K-integral is truncated.
const K_TAIL_DECAY: f64 = 46.0;

/// Hard stop for the truncation search; cosh overflows shortly after.
const K_MAX_ARGUMENT: f64 = 700.0;

const K_QUADRATURE: IntegratorConfig = IntegratorConfig {
    max_evaluations: 4_000,
    relative_tolerance: 1.0e-10,
    absolute_tolerance: 0.0,
};

/// $\ln\cosh(y)$ without overflow.
fn ln_cosh(y: f64) -> f64 {
    let a = y.abs();
    a + (-2.0 * a).exp().ln_1p() - std::f64::consts::LN_2
}

/// Evaluate $e^{c}\, z^{p}\, K_\nu(z)$ for real order ν and z > 0.
///
/// The prefactor `ln_prefactor` = c is folded into the exponent before any
/// exponentiation, which keeps products like $z^\nu K_\nu(z)/\Gamma(\nu+1)$
/// finite for large ν. Returns 0 when the result underflows and for
/// non-positive or non-finite z.
pub fn scaled_bessel_k(order: f64, power: f64, z: f64, ln_prefactor: f64) -> f64 {
    if !(z.is_finite() && z > 0.0) || !order.is_finite() {
        return 0.0;
    }
    let nu = order.abs();
    let offset = ln_prefactor + power * z.ln();
    let log_integrand = |t: f64| offset - z * t.cosh() + ln_cosh(nu * t);

    // sinh(t*) = ν / z at the peak of the log-integrand
    let t_peak = (nu / z).asinh();
    let peak = log_integrand(t_peak);
    if !peak.is_finite() || peak < -745.0 {
        return 0.0;
    }

    let mut t_max = t_peak + 1.0;
    while log_integrand(t_max) > peak - K_TAIL_DECAY && t_max < K_MAX_ARGUMENT {
        t_max += 1.0;
    }

    let integrand = |t: f64| log_integrand(t).exp();
    let mut total = 0.0;
    if t_peak > 0.0 {
        total += integrate_1d(&integrand, 0.0, t_peak, &K_QUADRATURE).value;
    }
    total += integrate_1d(&integrand, t_peak, t_max, &K_QUADRATURE).value;

    if total.is_finite() {
        total
    } else {
        0.0
    }
}

/// Modified Bessel function of the second kind, $K_\nu(z)$.
pub fn bessel_k(order: f64, z: f64) -> f64 {
    scaled_bessel_k(order, 0.0, z, 0.0)
}
