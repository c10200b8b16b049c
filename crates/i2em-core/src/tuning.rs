//! Numerical tuning state.
//!
//! [`TuningConfig`] bundles the knobs of the numerical engine: the
//! cross-polarised integrator, the auto-select threshold of its spectral
//! series, the VH calibration scale and the hemispherical (emissivity)
//! integrator. Models take it as an explicit value.
//!
//! The primitive [`crate::api`] entry points read a process-wide instance
//! instead. It starts at [`TuningConfig::DEFAULT`], changes only through
//! the `set_*` functions below, and is snapshotted once per call so a
//! single evaluation never sees a half-applied update.

use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::model::ModelError;
use crate::quadrature::IntegratorConfig;

/// Numerical configuration of the scattering engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    /// Cross-polarised (VH) double integral.
    pub integrator: IntegratorConfig,
    /// Relative threshold for automatic term-count selection in the VH series.
    pub auto_select_epsilon: f64,
    /// Linear-power multiplier applied to VH before the dB conversion.
    pub vh_scale: f64,
    /// Hemispherical integral of the emissivity model.
    pub hemisphere: IntegratorConfig,
}

impl TuningConfig {
    pub const DEFAULT: TuningConfig = TuningConfig {
        integrator: IntegratorConfig::CROSS_POL,
        auto_select_epsilon: 1.0e-8,
        vh_scale: 1.0,
        hemisphere: IntegratorConfig::HEMISPHERE,
    };

    pub fn validate(&self) -> Result<(), ModelError> {
        check_positive("auto-select epsilon", self.auto_select_epsilon)?;
        check_positive("VH scale", self.vh_scale)
    }
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn check_positive(name: &str, value: f64) -> Result<(), ModelError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidArgument(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

/// Mutex-guarded [`TuningConfig`] with copy-out reads.
#[derive(Debug)]
pub struct TuningStore {
    inner: Mutex<TuningConfig>,
}

impl TuningStore {
    pub const fn new(config: TuningConfig) -> Self {
        Self {
            inner: Mutex::new(config),
        }
    }

    // A panic while holding the lock cannot leave a Copy value torn, so a
    // poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, TuningConfig> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> TuningConfig {
        *self.lock()
    }

    /// Overwrite integrator fields; negative arguments keep the current value.
    pub fn set_integrator(
        &self,
        max_evaluations: i64,
        relative_tolerance: f64,
        absolute_tolerance: f64,
    ) {
        let mut cfg = self.lock();
        cfg.integrator =
            cfg.integrator
                .with_overrides(max_evaluations, relative_tolerance, absolute_tolerance);
        log::debug!("cross-pol integrator set to {:?}", cfg.integrator);
    }

    pub fn set_auto_select_epsilon(&self, epsilon: f64) -> Result<(), ModelError> {
        check_positive("auto-select epsilon", epsilon)?;
        self.lock().auto_select_epsilon = epsilon;
        Ok(())
    }

    pub fn set_vh_scale(&self, scale: f64) -> Result<(), ModelError> {
        check_positive("VH scale", scale)?;
        self.lock().vh_scale = scale;
        Ok(())
    }

    pub fn replace(&self, config: TuningConfig) -> Result<(), ModelError> {
        config.validate()?;
        *self.lock() = config;
        Ok(())
    }
}

static GLOBAL: TuningStore = TuningStore::new(TuningConfig::DEFAULT);

/// Snapshot of the process-wide tuning state.
pub fn global() -> TuningConfig {
    GLOBAL.snapshot()
}

/// Configure the cross-polarised integrator process-wide.
///
/// # Arguments
/// * `max_evaluations` - Evaluation budget, or negative to keep
/// * `relative_tolerance` - Relative tolerance, or negative to keep
/// * `absolute_tolerance` - Absolute tolerance, or negative to keep
pub fn set_integrator(max_evaluations: i64, relative_tolerance: f64, absolute_tolerance: f64) {
    GLOBAL.set_integrator(max_evaluations, relative_tolerance, absolute_tolerance);
}

/// Set the auto-select threshold process-wide. Must be positive.
pub fn set_auto_select_epsilon(epsilon: f64) -> Result<(), ModelError> {
    GLOBAL.set_auto_select_epsilon(epsilon)
}

/// Set the VH power scale process-wide. Must be positive.
pub fn set_vh_scale(scale: f64) -> Result<(), ModelError> {
    GLOBAL.set_vh_scale(scale)
}

/// Replace the whole process-wide state.
pub fn set_global(config: TuningConfig) -> Result<(), ModelError> {
    GLOBAL.replace(config)
}

/// Restore the process-wide defaults.
pub fn reset() {
    *GLOBAL.lock() = TuningConfig::DEFAULT;
}
