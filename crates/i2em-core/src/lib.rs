//! # I2EM Core
//!
//! The numerical backbone of the I2EM workspace. This crate implements the
//! improved Integral Equation Model for electromagnetic scattering and
//! emission from randomly rough surfaces (bare soil, ocean, snow).
//!
//! ## Architecture
//!
//! All surface models implement the [`model::ScatteringModel`] trait, which
//! provides a uniform interface for bistatic and monostatic scattering
//! coefficients, the depolarised (VH) backscatter and the polarised
//! emissivity. The only implementation is [`model::i2em::I2emModel`].
//!
//! ## Modules
//!
//! - [`types`]: Surface, electrical and geometry parameters; result containers.
//! - [`spectrum`]: Roughness spectra for the supported correlation families.
//! - [`fresnel`]: Air/dielectric Fresnel reflection coefficients.
//! - [`series`]: Convergence-driven truncation of the spectral series.
//! - [`special`]: Bessel functions needed by the spectrum engine.
//! - [`quadrature`]: Adaptive 1-D and 2-D numerical integration.
//! - [`model`]: Scattering model trait and the I2EM implementation.
//! - [`tuning`]: Numerical tuning state (integrator, auto-select, VH scale).
//! - [`api`]: Primitive-parameter entry points (degrees in, dB out).
//!
//! # Reference
//! Ulaby, F. T. and Long, D. G., *Microwave Radar and Radiometric Remote
//! Sensing*, The University of Michigan Press (2014), chapter 10.

pub mod api;
pub mod fresnel;
pub mod model;
pub mod quadrature;
pub mod series;
pub mod special;
pub mod spectrum;
pub mod tuning;
pub mod types;
