//! Primitive-parameter entry points.
//!
//! Flat functions for hosts that speak in plain numbers: frequency in GHz,
//! lengths in metres, angles in degrees, permittivity as (real, imaginary),
//! correlation family as an integer code (1 = exponential, 2 = Gaussian,
//! 3 = power-law, 4 = x-exponential) and scattering coefficients in dB.
//! VV always precedes HH.
//!
//! Every call snapshots the process-wide [`crate::tuning`] state once, so
//! the `set_*` functions re-exported here affect all subsequent calls.

use num_complex::Complex64;

use crate::model::i2em::I2emModel;
use crate::model::{ModelError, ScatteringModel, TermSelection};
use crate::spectrum::CorrelationFunction;
use crate::types::{
    to_db, validate_polar_angle, ElectricalParameters, Geometry, SurfaceParameters,
};

pub use crate::tuning::{set_auto_select_epsilon, set_integrator, set_vh_scale};

/// Shape exponent used when the caller does not give one.
pub const DEFAULT_SHAPE_EXPONENT: f64 = 1.0;

/// Reference scenario: 3 GHz, σ = 2.5 mm, ℓ = 10 cm, 30°, εr = 11.3 + 1.5i,
/// Gaussian correlation.
pub const REFERENCE_SCENARIO: Scenario = Scenario {
    frequency_ghz: 3.0,
    rms_height: 0.0025,
    correlation_length: 0.10,
    theta_deg: 30.0,
    permittivity: (11.3, 1.5),
    correlation_code: 2,
};

/// A complete parameter set in boundary units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scenario {
    pub frequency_ghz: f64,
    pub rms_height: f64,
    pub correlation_length: f64,
    pub theta_deg: f64,
    pub permittivity: (f64, f64),
    pub correlation_code: i32,
}

fn build(
    fr: f64,
    sig: f64,
    l: f64,
    el: f64,
    ei: f64,
    sp: i32,
    xcoeff: f64,
) -> Result<(SurfaceParameters, ElectricalParameters), ModelError> {
    let correlation = CorrelationFunction::from_code(sp, xcoeff)?;
    let surface = SurfaceParameters::new(sig, l, correlation)?;
    let electrical = ElectricalParameters::new(fr, Complex64::new(el, ei))?;
    Ok((surface, electrical))
}

fn radians(name: &str, degrees: f64) -> Result<f64, ModelError> {
    let theta = degrees.to_radians();
    validate_polar_angle(name, theta)?;
    Ok(theta)
}

/// `[eV, eH]` for exponential (`sp = 1`) or Gaussian (`sp = 2`) surfaces.
///
/// Index 0 is always vertical. For [`REFERENCE_SCENARIO`] this gives
/// `[0.7503, 0.6467]`: V exceeds H off nadir. Hosts written against a
/// convention that lists the reference pair as `[0.6467, 0.7503]` must swap
/// the two entries.
pub fn emissivity(
    fr: f64,
    sig: f64,
    l: f64,
    theta_d: f64,
    el: f64,
    ei: f64,
    sp: i32,
) -> Result<[f64; 2], ModelError> {
    if !matches!(sp, 1 | 2) {
        return Err(ModelError::InvalidArgument(format!(
            "emissivity supports correlation codes 1 (exponential) and 2 (gaussian), got {sp}"
        )));
    }
    let (surface, electrical) = build(fr, sig, l, el, ei, sp, DEFAULT_SHAPE_EXPONENT)?;
    let theta = radians("observation", theta_d)?;
    let e = I2emModel::from_global().emissivity(&surface, &electrical, theta)?;
    Ok(e.as_array())
}

/// `[σ⁰VV, σ⁰HH]` in dB at θs = θi, φs = 180°.
#[allow(clippy::too_many_arguments)]
pub fn monostatic_backscatter(
    fr: f64,
    sig: f64,
    l: f64,
    theta_d: f64,
    el: f64,
    ei: f64,
    sp: i32,
    xcoeff: f64,
) -> Result<[f64; 2], ModelError> {
    let (surface, electrical) = build(fr, sig, l, el, ei, sp, xcoeff)?;
    let theta = radians("incidence", theta_d)?;
    let b = I2emModel::from_global().backscatter(&surface, &electrical, theta)?;
    Ok(b.to_db())
}

/// `σ⁰VH` in dB, after the configured VH scale.
#[allow(clippy::too_many_arguments)]
pub fn cross_pol_backscatter(
    fr: f64,
    sig: f64,
    l: f64,
    theta_d: f64,
    el: f64,
    ei: f64,
    sp: i32,
    xcoeff: f64,
    auto_select: bool,
) -> Result<f64, ModelError> {
    let (surface, electrical) = build(fr, sig, l, el, ei, sp, xcoeff)?;
    let theta = radians("incidence", theta_d)?;
    let vh = I2emModel::from_global().cross_pol(
        &surface,
        &electrical,
        theta,
        TermSelection::from_flag(auto_select),
    )?;
    Ok(vh.db())
}

/// `[σ⁰VV, σ⁰HH, σ⁰VH]` in dB.
#[allow(clippy::too_many_arguments)]
pub fn full_backscatter(
    fr: f64,
    sig: f64,
    l: f64,
    theta_d: f64,
    el: f64,
    ei: f64,
    sp: i32,
    xcoeff: f64,
    auto_select: bool,
) -> Result<[f64; 3], ModelError> {
    let (surface, electrical) = build(fr, sig, l, el, ei, sp, xcoeff)?;
    let theta = radians("incidence", theta_d)?;
    let full = I2emModel::from_global().full_backscatter(
        &surface,
        &electrical,
        theta,
        TermSelection::from_flag(auto_select),
    )?;
    Ok(full.to_db())
}

/// Bistatic `[σ⁰VV, σ⁰HH]` in dB at (θi, θs, φs) in degrees.
#[allow(clippy::too_many_arguments)]
pub fn bistatic(
    fr: f64,
    sig: f64,
    l: f64,
    theta_i_d: f64,
    theta_s_d: f64,
    phi_s_d: f64,
    el: f64,
    ei: f64,
    sp: i32,
    xcoeff: f64,
) -> Result<[f64; 2], ModelError> {
    let (surface, electrical) = build(fr, sig, l, el, ei, sp, xcoeff)?;
    let geometry = Geometry::from_degrees(theta_i_d, theta_s_d, phi_s_d);
    let c = I2emModel::from_global().bistatic(&surface, &electrical, &geometry)?;
    Ok([to_db(c.vv), to_db(c.hh)])
}

/// Emissivity `[eV, eH]` of [`REFERENCE_SCENARIO`].
pub fn reference_emissivity() -> Result<[f64; 2], ModelError> {
    let s = REFERENCE_SCENARIO;
    emissivity(
        s.frequency_ghz,
        s.rms_height,
        s.correlation_length,
        s.theta_deg,
        s.permittivity.0,
        s.permittivity.1,
        s.correlation_code,
    )
}
