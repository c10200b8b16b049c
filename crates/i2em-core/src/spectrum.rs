//! Roughness spectrum engine.
//!
//! For a surface with correlation function ρ(r), the n-th order roughness
//! spectrum is the 2-D Fourier transform of ρⁿ:
//!
//! $$W^{(n)}(K) = \ell^2 \int_0^\infty \rho^n(u\ell)\, J_0(K\ell u)\, u\, du$$
//!
//! | Family | ρ(r) | W⁽ⁿ⁾(K) |
//! |---|---|---|
//! | Exponential | $e^{-r/\ell}$ | $(\ell/n)^2 \left[1 + (K\ell/n)^2\right]^{-3/2}$ |
//! | Gaussian | $e^{-(r/\ell)^2}$ | $\frac{\ell^2}{2n} e^{-(K\ell)^2 / 4n}$ |
//! | Power-law | $\left[1 + (r/\ell)^2\right]^{-x}$ | $\ell^2 \frac{(K\ell)^{xn-1} K_{xn-1}(K\ell)}{2^{xn-1}\Gamma(xn)}$ |
//! | x-exponential | $e^{-(r/\ell)^x}$ | Hankel transform, evaluated numerically |
//!
//! All spectra are in m² for ℓ in m and K in rad/m, and are non-negative.
//! Orders whose value underflows return 0.

use serde::{Deserialize, Serialize};
use statrs::function::gamma::ln_gamma;

use crate::model::ModelError;
use crate::quadrature::{integrate_1d, IntegratorConfig};
use crate::special::{bessel_j0, scaled_bessel_k};

/// Smallest Kℓ passed to the power-law kernel.
const MIN_SPECTRAL_ARGUMENT: f64 = 1.0e-6;

/// Neper decay of exp(-n uˣ) at which the Hankel integral is truncated.
const HANKEL_TAIL_DECAY: f64 = 46.0;

const HANKEL_QUADRATURE: IntegratorConfig = IntegratorConfig {
    max_evaluations: 30_000,
    relative_tolerance: 1.0e-8,
    absolute_tolerance: 1.0e-14,
};

/// Surface correlation function family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CorrelationFunction {
    Exponential,
    Gaussian,
    /// $[1 + (r/\ell)^2]^{-x}$, x > 0.
    PowerLaw { exponent: f64 },
    /// $\exp[-(r/\ell)^x]$, 0 < x ≤ 2.
    XExponential { exponent: f64 },
}

impl CorrelationFunction {
    /// Decode the integer convention 1 = exponential, 2 = Gaussian,
    /// 3 = power-law, 4 = x-exponential. The exponent only reaches the
    /// last two.
    pub fn from_code(code: i32, exponent: f64) -> Result<Self, ModelError> {
        let correlation = match code {
            1 => Self::Exponential,
            2 => Self::Gaussian,
            3 => Self::PowerLaw { exponent },
            4 => Self::XExponential { exponent },
            other => {
                return Err(ModelError::InvalidArgument(format!(
                    "correlation code must be 1 (exponential), 2 (gaussian), \
                     3 (power-law) or 4 (x-exponential), got {other}"
                )))
            }
        };
        correlation.validate()?;
        Ok(correlation)
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::Exponential => 1,
            Self::Gaussian => 2,
            Self::PowerLaw { .. } => 3,
            Self::XExponential { .. } => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Exponential => "exponential",
            Self::Gaussian => "gaussian",
            Self::PowerLaw { .. } => "power-law",
            Self::XExponential { .. } => "x-exponential",
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        match *self {
            Self::Exponential | Self::Gaussian => Ok(()),
            Self::PowerLaw { exponent } => {
                if exponent.is_finite() && exponent > 0.0 {
                    Ok(())
                } else {
                    Err(ModelError::InvalidArgument(format!(
                        "power-law exponent must be positive, got {exponent}"
                    )))
                }
            }
            Self::XExponential { exponent } => {
                if exponent.is_finite() && exponent > 0.0 && exponent <= 2.0 {
                    Ok(())
                } else {
                    Err(ModelError::InvalidArgument(format!(
                        "x-exponential exponent must lie in (0, 2], got {exponent}"
                    )))
                }
            }
        }
    }

    /// n-th order roughness spectrum $W^{(n)}(K)$ (m²).
    ///
    /// # Arguments
    /// * `order` - Scattering order n ≥ 1
    /// * `wavenumber` - Transverse wavenumber K (rad/m)
    /// * `length` - Correlation length ℓ (m)
    pub fn spectrum(&self, order: usize, wavenumber: f64, length: f64) -> f64 {
        if order == 0 {
            return 0.0;
        }
        let n = order as f64;
        let kl = wavenumber.abs() * length;
        let w = match *self {
            Self::Exponential => {
                let r = kl / n;
                (length / n).powi(2) * (1.0 + r * r).powf(-1.5)
            }
            Self::Gaussian => length * length / (2.0 * n) * (-(kl * kl) / (4.0 * n)).exp(),
            Self::PowerLaw { exponent } => length * length * power_law_kernel(exponent * n - 1.0, kl),
            Self::XExponential { exponent } => {
                length * length * x_exponential_kernel(exponent, n, kl)
            }
        };
        if w.is_finite() && w > 0.0 {
            w
        } else {
            0.0
        }
    }

    /// Spectra for orders 1..=terms at one wavenumber.
    pub fn spectrum_series(&self, terms: usize, wavenumber: f64, length: f64) -> Vec<f64> {
        (1..=terms)
            .map(|n| self.spectrum(n, wavenumber, length))
            .collect()
    }

    /// RMS slope used by the shadowing function.
    ///
    /// The exponential surface is not differentiable at the origin; the
    /// conventional σ/ℓ is used for it and for x-exponential surfaces with
    /// x < 2.
    pub fn rms_slope(&self, rms_height: f64, length: f64) -> f64 {
        let ratio = rms_height / length;
        match *self {
            Self::Exponential => ratio,
            Self::Gaussian => std::f64::consts::SQRT_2 * ratio,
            Self::PowerLaw { exponent } => (2.0 * exponent).sqrt() * ratio,
            Self::XExponential { exponent } => {
                if exponent >= 2.0 {
                    std::f64::consts::SQRT_2 * ratio
                } else {
                    ratio
                }
            }
        }
    }
}

/// Dimensionless power-law spectrum $z^\nu K_\nu(z) / (2^\nu \Gamma(\nu+1))$.
fn power_law_kernel(nu: f64, z: f64) -> f64 {
    if z == 0.0 && nu > 0.0 {
        // z^ν K_ν(z) → 2^{ν-1} Γ(ν)
        return 1.0 / (2.0 * nu);
    }
    let z = z.max(MIN_SPECTRAL_ARGUMENT);
    let ln_prefactor = -nu * std::f64::consts::LN_2 - ln_gamma(nu + 1.0);
    scaled_bessel_k(nu, nu, z, ln_prefactor)
}

/// Dimensionless x-exponential spectrum $\int_0^\infty u J_0(z u) e^{-n u^x} du$.
fn x_exponential_kernel(exponent: f64, n: f64, z: f64) -> f64 {
    let upper = (HANKEL_TAIL_DECAY / n).powf(1.0 / exponent);
    let outcome = integrate_1d(
        |u| u * bessel_j0(z * u) * (-n * u.powf(exponent)).exp(),
        0.0,
        upper,
        &HANKEL_QUADRATURE,
    );
    if !outcome.converged {
        log::debug!(
            "x-exponential spectrum (x = {exponent}, n = {n}, Kl = {z:.3}) stopped after {} evaluations, error {:.2e}",
            outcome.evaluations,
            outcome.error
        );
    }
    outcome.value
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_from_code_round_trip_and_rejects_unknown() {
        for code in 1..=4 {
            let c = CorrelationFunction::from_code(code, 1.5).unwrap();
            assert_eq!(c.code(), code);
        }
        assert!(CorrelationFunction::from_code(0, 1.0).is_err());
        assert!(CorrelationFunction::from_code(5, 1.0).is_err());
        assert!(CorrelationFunction::from_code(3, 0.0).is_err());
        assert!(CorrelationFunction::from_code(4, 2.5).is_err());
        // exponent is ignored by the closed-form families
        assert!(CorrelationFunction::from_code(1, -3.0).is_ok());
    }

    #[test]
    fn test_closed_forms_at_zero_wavenumber() {
        let l = 0.1;
        assert_relative_eq!(
            CorrelationFunction::Exponential.spectrum(2, 0.0, l),
            l * l / 4.0,
            max_relative = 1e-14
        );
        assert_relative_eq!(
            CorrelationFunction::Gaussian.spectrum(2, 0.0, l),
            l * l / 4.0,
            max_relative = 1e-14
        );
    }

    #[test]
    fn test_spectra_decay_with_wavenumber() {
        let l = 0.05;
        for corr in [
            CorrelationFunction::Exponential,
            CorrelationFunction::Gaussian,
            CorrelationFunction::PowerLaw { exponent: 1.5 },
        ] {
            let w: Vec<f64> = [0.0, 20.0, 60.0, 120.0]
                .iter()
                .map(|&k| corr.spectrum(1, k, l))
                .collect();
            assert!(w.windows(2).all(|p| p[0] > p[1]), "{corr:?}: {w:?}");
        }
    }

    #[test]
    fn test_power_law_half_order_closed_form() {
        // x = 1.5, n = 1: ν = 1/2 reduces to ℓ² e^{-Kℓ}
        let l = 0.1;
        let corr = CorrelationFunction::PowerLaw { exponent: 1.5 };
        for &k in &[5.0, 20.0, 60.0] {
            let z: f64 = k * l;
            let exact = l * l * (-z).exp();
            assert_relative_eq!(corr.spectrum(1, k, l), exact, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_power_law_zero_wavenumber_limit() {
        let l = 0.1;
        let corr = CorrelationFunction::PowerLaw { exponent: 2.0 };
        // ν = 3 for n = 2
        assert_relative_eq!(corr.spectrum(2, 0.0, l), l * l / 6.0, max_relative = 1e-12);
        assert_relative_eq!(corr.spectrum(2, 1e-3, l), l * l / 6.0, max_relative = 1e-5);
    }

    #[test]
    fn test_x_exponential_reduces_to_closed_forms() {
        let l = 0.08;
        let xexp1 = CorrelationFunction::XExponential { exponent: 1.0 };
        let xexp2 = CorrelationFunction::XExponential { exponent: 2.0 };
        for &(n, k) in &[(1, 5.0), (2, 20.0), (3, 40.0)] {
            assert_relative_eq!(
                xexp1.spectrum(n, k, l),
                CorrelationFunction::Exponential.spectrum(n, k, l),
                max_relative = 1e-5
            );
            assert_relative_eq!(
                xexp2.spectrum(n, k, l),
                CorrelationFunction::Gaussian.spectrum(n, k, l),
                max_relative = 1e-5
            );
        }
    }

    #[test]
    fn test_high_orders_underflow_to_zero_not_nan() {
        let w = CorrelationFunction::Gaussian.spectrum(1, 1.0e4, 1.0);
        assert_eq!(w, 0.0);
        let w = CorrelationFunction::PowerLaw { exponent: 3.0 }.spectrum(200, 1.0e5, 1.0);
        assert!(w.is_finite() && w >= 0.0);
        assert_eq!(CorrelationFunction::Exponential.spectrum(0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_rms_slope_per_family() {
        let (s, l) = (0.01, 0.1);
        assert_abs_diff_eq!(CorrelationFunction::Exponential.rms_slope(s, l), 0.1, epsilon = 1e-15);
        assert_abs_diff_eq!(
            CorrelationFunction::Gaussian.rms_slope(s, l),
            0.1 * 2f64.sqrt(),
            epsilon = 1e-15
        );
        assert_abs_diff_eq!(
            CorrelationFunction::PowerLaw { exponent: 2.0 }.rms_slope(s, l),
            0.2,
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_serde_tagged_representation() {
        let c: CorrelationFunction =
            serde_json::from_str(r#"{"kind":"power_law","exponent":1.5}"#).unwrap();
        assert_eq!(c, CorrelationFunction::PowerLaw { exponent: 1.5 });
        let c: CorrelationFunction = serde_json::from_str(r#"{"kind":"gaussian"}"#).unwrap();
        assert_eq!(c, CorrelationFunction::Gaussian);
    }
}
