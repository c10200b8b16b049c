//! Core types shared across the I2EM workspace.
//!
//! This module defines the parameter bundles consumed by the scattering
//! models (surface statistics, electrical properties, observation geometry)
//! and the result containers they produce. Angles are radians throughout;
//! the degree convention lives only in [`crate::api`].

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::model::ModelError;
use crate::quadrature::QuadratureOutcome;
use crate::spectrum::CorrelationFunction;

/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Smallest linear power converted to decibels. Anything below maps to
/// [`MIN_DB`] instead of `-inf`.
pub const MIN_LINEAR_POWER: f64 = 1.0e-30;

/// Decibel floor corresponding to [`MIN_LINEAR_POWER`].
pub const MIN_DB: f64 = -300.0;

/// Convert a linear power ratio to decibels, guarding the zero-power limit.
pub fn to_db(linear: f64) -> f64 {
    if linear.is_finite() && linear > MIN_LINEAR_POWER {
        10.0 * linear.log10()
    } else if linear.is_finite() || linear.is_nan() {
        MIN_DB
    } else {
        // +inf stays +inf so callers notice the overflow
        f64::INFINITY
    }
}

/// Statistical description of the rough surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceParameters {
    /// RMS height σ (m).
    pub rms_height: f64,
    /// Correlation length ℓ (m).
    pub correlation_length: f64,
    /// Surface correlation function family.
    pub correlation: CorrelationFunction,
}

impl SurfaceParameters {
    /// Build and validate a surface description.
    pub fn new(
        rms_height: f64,
        correlation_length: f64,
        correlation: CorrelationFunction,
    ) -> Result<Self, ModelError> {
        let surface = Self {
            rms_height,
            correlation_length,
            correlation,
        };
        surface.validate()?;
        Ok(surface)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if !(self.rms_height.is_finite() && self.rms_height > 0.0) {
            return Err(ModelError::InvalidArgument(format!(
                "rms height must be positive and finite, got {}",
                self.rms_height
            )));
        }
        if !(self.correlation_length.is_finite() && self.correlation_length > 0.0) {
            return Err(ModelError::InvalidArgument(format!(
                "correlation length must be positive and finite, got {}",
                self.correlation_length
            )));
        }
        self.correlation.validate()
    }

    /// RMS slope of the surface for this correlation family.
    pub fn rms_slope(&self) -> f64 {
        self.correlation
            .rms_slope(self.rms_height, self.correlation_length)
    }
}

/// Frequency and dielectric properties of the lower medium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElectricalParameters {
    /// Frequency (GHz).
    pub frequency_ghz: f64,
    /// Complex relative permittivity $\epsilon_r = \epsilon' + i\epsilon''$.
    pub permittivity: Complex64,
}

impl ElectricalParameters {
    pub fn new(frequency_ghz: f64, permittivity: Complex64) -> Result<Self, ModelError> {
        let electrical = Self {
            frequency_ghz,
            permittivity,
        };
        electrical.validate()?;
        Ok(electrical)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if !(self.frequency_ghz.is_finite() && self.frequency_ghz > 0.0) {
            return Err(ModelError::InvalidArgument(format!(
                "frequency must be positive and finite, got {} GHz",
                self.frequency_ghz
            )));
        }
        if !self.permittivity.is_finite() {
            return Err(ModelError::InvalidArgument(format!(
                "permittivity must be finite, got {}",
                self.permittivity
            )));
        }
        if self.permittivity.im < 0.0 {
            return Err(ModelError::InvalidArgument(format!(
                "permittivity imaginary part must be non-negative, got {}",
                self.permittivity.im
            )));
        }
        Ok(())
    }

    /// Free-space wavenumber $k = 2\pi f / c$ (rad/m).
    pub fn wavenumber(&self) -> f64 {
        2.0 * std::f64::consts::PI * self.frequency_ghz * 1.0e9 / SPEED_OF_LIGHT
    }
}

/// Observation geometry. The incident wave travels in the φ = 0 plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Incidence angle θi (rad).
    pub theta_i: f64,
    /// Scattering angle θs (rad).
    pub theta_s: f64,
    /// Scattering azimuth φs relative to the incidence plane (rad).
    pub phi_s: f64,
}

impl Geometry {
    /// Angular slack (radians) within which a geometry counts as backscatter.
    pub const MONOSTATIC_TOLERANCE: f64 = 1.0e-9;

    /// Monostatic backscatter: θs = θi, φs = π.
    pub fn monostatic(theta_i: f64) -> Self {
        Self {
            theta_i,
            theta_s: theta_i,
            phi_s: std::f64::consts::PI,
        }
    }

    pub fn bistatic(theta_i: f64, theta_s: f64, phi_s: f64) -> Self {
        Self {
            theta_i,
            theta_s,
            phi_s,
        }
    }

    pub fn from_degrees(theta_i_deg: f64, theta_s_deg: f64, phi_s_deg: f64) -> Self {
        Self::bistatic(
            theta_i_deg.to_radians(),
            theta_s_deg.to_radians(),
            phi_s_deg.to_radians(),
        )
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        validate_polar_angle("incidence", self.theta_i)?;
        validate_polar_angle("scattering", self.theta_s)?;
        if !self.phi_s.is_finite() {
            return Err(ModelError::InvalidArgument(format!(
                "scattering azimuth must be finite, got {}",
                self.phi_s
            )));
        }
        Ok(())
    }

    /// True when the geometry is the backscatter direction, to within
    /// [`Self::MONOSTATIC_TOLERANCE`].
    pub fn is_monostatic(&self) -> bool {
        let tol = Self::MONOSTATIC_TOLERANCE;
        let dphi = (self.phi_s - std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI);
        (self.theta_s - self.theta_i).abs() < tol
            && (dphi < tol || 2.0 * std::f64::consts::PI - dphi < tol)
    }
}

/// Check that a polar angle lies in [0, π/2).
pub fn validate_polar_angle(name: &str, theta: f64) -> Result<(), ModelError> {
    if theta.is_finite() && (0.0..std::f64::consts::FRAC_PI_2).contains(&theta) {
        Ok(())
    } else {
        Err(ModelError::InvalidArgument(format!(
            "{} angle must lie in [0, 90) degrees, got {:.4} degrees",
            name,
            theta.to_degrees()
        )))
    }
}

/// Linear bistatic scattering coefficients at one geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BistaticCoefficients {
    pub vv: f64,
    pub hh: f64,
    /// Single-scattering cross-polarised term. Zero in the plane of incidence.
    pub hv: f64,
    pub vh: f64,
    /// Number of spectral terms retained in the series.
    pub terms: usize,
}

/// Monostatic co-polarised backscatter (linear power ratios).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Backscatter {
    pub vv: f64,
    pub hh: f64,
    pub terms: usize,
}

impl Backscatter {
    /// `[VV, HH]` in decibels.
    pub fn to_db(&self) -> [f64; 2] {
        [to_db(self.vv), to_db(self.hh)]
    }
}

/// Depolarised (VH) backscatter and the diagnostics of its integration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossPolResult {
    /// VH after the configured power-domain scale (linear).
    pub vh: f64,
    /// VH before scaling (linear).
    pub unscaled: f64,
    /// Spectral terms retained per series.
    pub terms: usize,
    /// Outcome of the adaptive integration.
    pub quadrature: QuadratureOutcome,
}

impl CrossPolResult {
    pub fn db(&self) -> f64 {
        to_db(self.vh)
    }

    /// Reject the result if the integration ran out of budget.
    pub fn require_converged(&self) -> Result<f64, ModelError> {
        if self.quadrature.converged {
            Ok(self.vh)
        } else {
            Err(ModelError::NonConvergence {
                evaluations: self.quadrature.evaluations,
                error: self.quadrature.error,
                value: self.quadrature.value,
            })
        }
    }
}

/// Co- and cross-polarised monostatic backscatter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FullBackscatter {
    pub co_pol: Backscatter,
    pub cross_pol: CrossPolResult,
}

impl FullBackscatter {
    /// `[VV, HH, VH]` in decibels.
    pub fn to_db(&self) -> [f64; 3] {
        let [vv, hh] = self.co_pol.to_db();
        [vv, hh, self.cross_pol.db()]
    }
}

/// Polarised emissivity and its energy budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissivityResult {
    /// Vertical emissivity, in [0, 1].
    pub v: f64,
    /// Horizontal emissivity, in [0, 1].
    pub h: f64,
    /// Coherent (specular) reflectivity `[V, H]`.
    pub coherent_reflectivity: [f64; 2],
    /// Incoherent reflectivity integrated over the hemisphere `[V, H]`.
    pub scattered_reflectivity: [f64; 2],
    /// Outcome of the hemispherical integration per polarisation `[V, H]`,
    /// before normalisation.
    pub quadrature: [QuadratureOutcome; 2],
}

impl EmissivityResult {
    /// `[eV, eH]`.
    pub fn as_array(&self) -> [f64; 2] {
        [self.v, self.h]
    }
}
