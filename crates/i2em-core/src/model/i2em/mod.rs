//! Improved Integral Equation Model (I2EM).
//!
//! The I2EM evaluates the single-scattering field of a randomly rough
//! dielectric surface as a Kirchhoff (tangent-plane) term plus a
//! complementary-field correction, both expanded in a series of roughness
//! spectra. This module implements:
//!
//! 1. **Co-polarised bistatic scattering** ([`copol`]) for any (θi, θs, φs),
//!    with transition reflection coefficients and, in backscatter, Smith
//!    shadowing.
//! 2. **Depolarised backscatter** ([`crosspol`]) as a multiple-scattering
//!    double integral over the spectral plane.
//! 3. **Emissivity** ([`emissivity`]) from energy conservation over the
//!    bistatic pattern.
//!
//! # Reference
//! Fung, A. K., Liu, W. Y., Chen, K. S. and Tsay, M. K., "An improved IEM
//! model for bistatic scattering from rough surfaces", J. Electromagn.
//! Waves Appl. 16, 689–702 (2002).

pub mod copol;
pub mod crosspol;
pub mod emissivity;
pub(crate) mod kernels;

use num_complex::Complex64;

use super::{ModelError, ScatteringModel, TermSelection};
use crate::spectrum::CorrelationFunction;
use crate::tuning::{self, TuningConfig};
use crate::types::{
    Backscatter, BistaticCoefficients, CrossPolResult, ElectricalParameters, EmissivityResult,
    Geometry, SurfaceParameters,
};

/// Quantities derived once per call from the surface and the medium.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scene {
    /// Free-space wavenumber (rad/m).
    pub k: f64,
    /// RMS height (m).
    pub sigma: f64,
    /// Correlation length (m).
    pub length: f64,
    pub correlation: CorrelationFunction,
    pub permittivity: Complex64,
    pub rms_slope: f64,
}

impl Scene {
    pub(crate) fn new(
        surface: &SurfaceParameters,
        electrical: &ElectricalParameters,
    ) -> Result<Self, ModelError> {
        surface.validate()?;
        electrical.validate()?;
        Ok(Self {
            k: electrical.wavenumber(),
            sigma: surface.rms_height,
            length: surface.correlation_length,
            correlation: surface.correlation,
            permittivity: electrical.permittivity,
            rms_slope: surface.rms_slope(),
        })
    }

    /// Normalised roughness kσ.
    pub(crate) fn ks(&self) -> f64 {
        self.k * self.sigma
    }
}

/// I2EM surface model carrying an explicit numerical configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct I2emModel {
    pub tuning: TuningConfig,
}

impl I2emModel {
    pub fn new(tuning: TuningConfig) -> Self {
        Self { tuning }
    }

    /// Model bound to a snapshot of the process-wide tuning state.
    pub fn from_global() -> Self {
        Self::new(tuning::global())
    }
}

impl ScatteringModel for I2emModel {
    fn bistatic(
        &self,
        surface: &SurfaceParameters,
        electrical: &ElectricalParameters,
        geometry: &Geometry,
    ) -> Result<BistaticCoefficients, ModelError> {
        copol::bistatic(surface, electrical, geometry)
    }

    fn backscatter(
        &self,
        surface: &SurfaceParameters,
        electrical: &ElectricalParameters,
        theta_i: f64,
    ) -> Result<Backscatter, ModelError> {
        let c = copol::bistatic(surface, electrical, &Geometry::monostatic(theta_i))?;
        Ok(Backscatter {
            vv: c.vv,
            hh: c.hh,
            terms: c.terms,
        })
    }

    fn cross_pol(
        &self,
        surface: &SurfaceParameters,
        electrical: &ElectricalParameters,
        theta_i: f64,
        selection: TermSelection,
    ) -> Result<CrossPolResult, ModelError> {
        crosspol::cross_pol(surface, electrical, theta_i, selection, &self.tuning)
    }

    fn emissivity(
        &self,
        surface: &SurfaceParameters,
        electrical: &ElectricalParameters,
        theta: f64,
    ) -> Result<EmissivityResult, ModelError> {
        emissivity::emissivity(surface, electrical, theta, &self.tuning.hemisphere)
    }

    fn method_name(&self) -> &str {
        "I2EM"
    }
}
