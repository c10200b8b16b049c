//! Fresnel reflection at a planar air/dielectric interface.
//!
//! For incidence angle θ and relative permittivity εr (μr = 1):
//!
//! $$R_v = \frac{\epsilon_r\cos\theta - \sqrt{\epsilon_r - \sin^2\theta}}
//!              {\epsilon_r\cos\theta + \sqrt{\epsilon_r - \sin^2\theta}}, \qquad
//!   R_h = \frac{\cos\theta - \sqrt{\epsilon_r - \sin^2\theta}}
//!              {\cos\theta + \sqrt{\epsilon_r - \sin^2\theta}}$$
//!
//! The principal complex square root is used, which keeps the transmitted
//! wave decaying into a lossy medium.

use num_complex::Complex64;

/// V and H Fresnel amplitude reflection coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FresnelCoefficients {
    pub rv: Complex64,
    pub rh: Complex64,
}

impl FresnelCoefficients {
    /// Coefficients at incidence angle `theta` (rad).
    pub fn new(theta: f64, permittivity: Complex64) -> Self {
        let (sin_t, cos_t) = theta.sin_cos();
        let root = (permittivity - sin_t * sin_t).sqrt();
        let rv = (permittivity * cos_t - root) / (permittivity * cos_t + root);
        let rh = (cos_t - root) / (cos_t + root);
        Self { rv, rh }
    }

    /// Power reflectivities `[|Rv|², |Rh|²]`.
    pub fn reflectivity(&self) -> [f64; 2] {
        [self.rv.norm_sqr(), self.rh.norm_sqr()]
    }
}

/// Normal-incidence coefficient $R_0 = (\sqrt{\epsilon_r} - 1)/(\sqrt{\epsilon_r} + 1)$.
///
/// At nadir the two polarisations coincide up to sign: Rv(0) = R0 and
/// Rh(0) = −R0.
pub fn normal_incidence(permittivity: Complex64) -> Complex64 {
    let n = permittivity.sqrt();
    (n - 1.0) / (n + 1.0)
}

/// Power reflectivities `[ΓV, ΓH]` at incidence angle `theta`.
pub fn reflectivity(theta: f64, permittivity: Complex64) -> [f64; 2] {
    FresnelCoefficients::new(theta, permittivity).reflectivity()
}
