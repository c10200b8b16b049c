//! Integration tests for the process-wide tuning state.
//!
//! Every test here mutates the global state, so they run one at a time
//! behind `SERIAL` and restore the defaults before releasing it.

use std::sync::{Mutex, MutexGuard};

use approx::assert_abs_diff_eq;

use i2em_core::api;
use i2em_core::model::ModelError;
use i2em_core::tuning::{self, TuningConfig};

static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    let guard = SERIAL.lock().unwrap_or_else(|p| p.into_inner());
    tuning::reset();
    guard
}

fn vh_db() -> f64 {
    api::cross_pol_backscatter(3.0, 0.008, 0.05, 30.0, 11.3, 1.5, 1, 1.0, true).unwrap()
}

#[test]
fn test_vh_scale_adds_its_decibels() {
    let _guard = serial();
    let base = vh_db();
    for scale in [0.5, 2.0, 10.0] {
        api::set_vh_scale(scale).unwrap();
        let scaled = vh_db();
        eprintln!("scale {scale}: {base:.4} → {scaled:.4} dB");
        assert_abs_diff_eq!(scaled, base + 10.0 * scale.log10(), epsilon = 1e-9);
    }
    // co-pol channels ignore the VH scale
    let full = api::full_backscatter(3.0, 0.008, 0.05, 30.0, 11.3, 1.5, 1, 1.0, true).unwrap();
    api::set_vh_scale(1.0).unwrap();
    let mono = api::monostatic_backscatter(3.0, 0.008, 0.05, 30.0, 11.3, 1.5, 1, 1.0).unwrap();
    assert_eq!(full[0], mono[0]);
    assert_eq!(full[1], mono[1]);
    tuning::reset();
}

#[test]
fn test_invalid_settings_leave_state_unchanged() {
    let _guard = serial();
    assert!(matches!(
        api::set_vh_scale(0.0),
        Err(ModelError::InvalidArgument(_))
    ));
    assert!(matches!(
        api::set_auto_select_epsilon(-1e-8),
        Err(ModelError::InvalidArgument(_))
    ));
    assert_eq!(tuning::global(), TuningConfig::DEFAULT);
}

#[test]
fn test_set_integrator_negative_means_keep() {
    let _guard = serial();
    api::set_integrator(5_000, -1.0, -1.0);
    let cfg = tuning::global();
    assert_eq!(cfg.integrator.max_evaluations, 5_000);
    assert_eq!(
        cfg.integrator.relative_tolerance,
        TuningConfig::DEFAULT.integrator.relative_tolerance
    );

    api::set_integrator(-1, 1e-3, 1e-20);
    let cfg = tuning::global();
    assert_eq!(cfg.integrator.max_evaluations, 5_000);
    assert_eq!(cfg.integrator.relative_tolerance, 1e-3);
    assert_eq!(cfg.integrator.absolute_tolerance, 1e-20);
    tuning::reset();
}

#[test]
fn test_starved_integrator_still_returns_estimate() {
    let _guard = serial();
    let reference = vh_db();
    api::set_integrator(17, 1e-12, 0.0);
    let starved = vh_db();
    eprintln!("full budget {reference:.3} dB, 17 evaluations {starved:.3} dB");
    assert!(starved.is_finite());
    assert!(starved > -300.0);
    tuning::reset();
}

#[test]
fn test_auto_select_epsilon_is_read_by_cross_pol() {
    let _guard = serial();
    api::set_auto_select_epsilon(1e-6).unwrap();
    let loose = vh_db();
    api::set_auto_select_epsilon(1e-10).unwrap();
    let tight = vh_db();
    assert_abs_diff_eq!(loose, tight, epsilon = 0.5);
    assert_eq!(tuning::global().auto_select_epsilon, 1e-10);
    tuning::reset();
}
