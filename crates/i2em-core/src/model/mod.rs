//! Scattering model abstraction and implementations.
//!
//! The [`ScatteringModel`] trait defines the interface every rough-surface
//! model implements. The improved Integral Equation Model ([`i2em`]) is the
//! only implementation; the CLI and the primitive [`crate::api`] layer only
//! see the trait.

pub mod i2em;

use crate::types::{
    Backscatter, BistaticCoefficients, CrossPolResult, ElectricalParameters, EmissivityResult,
    FullBackscatter, Geometry, SurfaceParameters,
};
use thiserror::Error;

/// Errors that can occur while evaluating a scattering model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(
        "Integration did not converge after {evaluations} evaluations \
         (estimate {value:.4e}, error {error:.2e})"
    )]
    NonConvergence {
        evaluations: usize,
        error: f64,
        value: f64,
    },
}

/// How many spectral terms the depolarised series keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermSelection {
    /// Pick the count from the series convergence rule.
    Auto,
    /// Use exactly this many terms.
    Fixed(usize),
}

impl TermSelection {
    /// Term count used when automatic selection is switched off.
    pub const DEFAULT_FIXED_TERMS: usize = 15;

    pub fn from_flag(auto_select: bool) -> Self {
        if auto_select {
            Self::Auto
        } else {
            Self::Fixed(Self::DEFAULT_FIXED_TERMS)
        }
    }
}

/// The core trait that all rough-surface scattering models implement.
///
/// Angles are radians. Scattering coefficients are linear power ratios;
/// conversion to decibels happens in the result types.
pub trait ScatteringModel {
    /// Bistatic co- and single-scatter cross-polarised coefficients.
    fn bistatic(
        &self,
        surface: &SurfaceParameters,
        electrical: &ElectricalParameters,
        geometry: &Geometry,
    ) -> Result<BistaticCoefficients, ModelError>;

    /// Monostatic co-polarised backscatter at incidence `theta_i`.
    fn backscatter(
        &self,
        surface: &SurfaceParameters,
        electrical: &ElectricalParameters,
        theta_i: f64,
    ) -> Result<Backscatter, ModelError>;

    /// Depolarised (VH) monostatic backscatter.
    fn cross_pol(
        &self,
        surface: &SurfaceParameters,
        electrical: &ElectricalParameters,
        theta_i: f64,
        selection: TermSelection,
    ) -> Result<CrossPolResult, ModelError>;

    /// Co- and cross-polarised backscatter in one call.
    ///
    /// Default implementation combines [`Self::backscatter`] and
    /// [`Self::cross_pol`], so the co-pol part is identical to a direct
    /// monostatic evaluation.
    fn full_backscatter(
        &self,
        surface: &SurfaceParameters,
        electrical: &ElectricalParameters,
        theta_i: f64,
        selection: TermSelection,
    ) -> Result<FullBackscatter, ModelError> {
        let co_pol = self.backscatter(surface, electrical, theta_i)?;
        let cross_pol = self.cross_pol(surface, electrical, theta_i, selection)?;
        Ok(FullBackscatter { co_pol, cross_pol })
    }

    /// V and H emissivity at observation angle `theta`.
    fn emissivity(
        &self,
        surface: &SurfaceParameters,
        electrical: &ElectricalParameters,
        theta: f64,
    ) -> Result<EmissivityResult, ModelError>;

    /// Human-readable name of the model.
    fn method_name(&self) -> &str;
}
