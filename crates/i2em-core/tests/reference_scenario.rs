//! Integration tests for the co-polarised and emission paths.
//!
//! - Reference emissivity scenario (3 GHz, Gaussian, 30°)
//! - Emissivity bounds over a spread of surfaces and angles
//! - Monostatic backscatter equals the co-pol part of full backscatter
//! - VV/HH degeneracy near nadir
//! - VH for the numerically transformed x-exponential spectrum
//! - Input validation at the primitive boundary

use approx::assert_abs_diff_eq;
use num_complex::Complex64;

use i2em_core::api;
use i2em_core::model::i2em::I2emModel;
use i2em_core::model::{ModelError, ScatteringModel, TermSelection};
use i2em_core::spectrum::CorrelationFunction;
use i2em_core::types::{ElectricalParameters, SurfaceParameters};

// ─────────────────────────────────────────────────────────────
// Emissivity
// ─────────────────────────────────────────────────────────────

#[test]
fn test_reference_emissivity() {
    let [ev, eh] = api::reference_emissivity().expect("reference scenario is valid");
    eprintln!("reference emissivity: eV = {ev:.4}, eH = {eh:.4}");
    assert_abs_diff_eq!(ev, 0.7503, epsilon = 0.01);
    assert_abs_diff_eq!(eh, 0.6467, epsilon = 0.01);
    // vertical emits more than horizontal away from nadir
    assert!(ev > eh);
}

#[test]
fn test_emissivity_stays_in_unit_interval() {
    let cases = [
        // (GHz, σ m, ℓ m, θ deg, ε', ε'', sp)
        (1.4, 0.01, 0.10, 60.0, 11.3, 1.5, 2),
        (5.0, 0.02, 0.05, 40.0, 15.0, 3.0, 1),
        (10.0, 0.01, 0.03, 10.0, 5.0, 0.5, 1),
        (3.0, 0.005, 0.08, 85.0, 20.0, 6.0, 2),
    ];
    for (fr, sig, l, theta, el, ei, sp) in cases {
        let [ev, eh] = api::emissivity(fr, sig, l, theta, el, ei, sp).unwrap();
        eprintln!("{fr} GHz σ={sig} ℓ={l} θ={theta}°: eV={ev:.4} eH={eh:.4}");
        assert!((0.0..=1.0).contains(&ev));
        assert!((0.0..=1.0).contains(&eh));
    }
}

#[test]
fn test_emissivity_diagnostics_expose_energy_split() {
    let surface = SurfaceParameters::new(0.01, 0.10, CorrelationFunction::Gaussian).unwrap();
    let electrical = ElectricalParameters::new(1.4, Complex64::new(11.3, 1.5)).unwrap();
    let e = I2emModel::default()
        .emissivity(&surface, &electrical, 60f64.to_radians())
        .unwrap();
    assert!(e.quadrature.iter().all(|q| q.evaluations > 0));
    assert!(e.coherent_reflectivity[1] > e.coherent_reflectivity[0]);
    assert!(e.scattered_reflectivity.iter().all(|&s| s >= 0.0));
}

// ─────────────────────────────────────────────────────────────
// Backscatter
// ─────────────────────────────────────────────────────────────

#[test]
fn test_monostatic_matches_full_backscatter_copol() {
    for (sp, xcoeff) in [(1, 1.0), (2, 1.0), (3, 1.5)] {
        let mono = api::monostatic_backscatter(3.0, 0.008, 0.05, 40.0, 15.0, 3.0, sp, xcoeff)
            .unwrap();
        let full = api::full_backscatter(3.0, 0.008, 0.05, 40.0, 15.0, 3.0, sp, xcoeff, true)
            .unwrap();
        eprintln!("sp={sp}: VV={:.3} HH={:.3} VH={:.3} dB", full[0], full[1], full[2]);
        assert_eq!(mono[0], full[0]);
        assert_eq!(mono[1], full[1]);
        assert!(full[2] < full[0]);
    }
}

#[test]
fn test_near_nadir_vv_equals_hh() {
    let [vv, hh] = api::monostatic_backscatter(3.0, 0.0025, 0.10, 0.1, 11.3, 1.5, 2, 1.0).unwrap();
    eprintln!("θ=0.1°: VV={vv:.4} dB, HH={hh:.4} dB");
    assert_abs_diff_eq!(vv, hh, epsilon = 0.01);
}

#[test]
fn test_backscatter_falls_off_with_angle_for_smooth_gaussian() {
    let levels: Vec<f64> = [10.0, 20.0, 30.0, 40.0]
        .iter()
        .map(|&t| api::monostatic_backscatter(3.0, 0.0025, 0.10, t, 11.3, 1.5, 2, 1.0).unwrap()[0])
        .collect();
    assert!(levels.windows(2).all(|w| w[0] > w[1]), "{levels:?}");
}

#[test]
fn test_linear_powers_are_non_negative() {
    let model = I2emModel::default();
    let electrical = ElectricalParameters::new(5.0, Complex64::new(8.0, 2.0)).unwrap();
    for correlation in [
        CorrelationFunction::Exponential,
        CorrelationFunction::Gaussian,
        CorrelationFunction::PowerLaw { exponent: 1.5 },
        CorrelationFunction::XExponential { exponent: 1.5 },
    ] {
        let surface = SurfaceParameters::new(0.01, 0.06, correlation).unwrap();
        let b = model.backscatter(&surface, &electrical, 0.6).unwrap();
        eprintln!("{}: {:?}", correlation.name(), b.to_db());
        assert!(b.vv >= 0.0 && b.hh >= 0.0);
        assert!(b.to_db().iter().all(|v| v.is_finite()));
    }
    for correlation in [CorrelationFunction::Exponential, CorrelationFunction::Gaussian] {
        let surface = SurfaceParameters::new(0.01, 0.06, correlation).unwrap();
        let full = model
            .full_backscatter(&surface, &electrical, 0.6, TermSelection::Auto)
            .unwrap();
        assert!(full.cross_pol.vh >= 0.0);
        assert!(full.to_db().iter().all(|v| v.is_finite()));
    }
}

#[test]
fn test_x_exponential_cross_pol_is_finite_and_converged() {
    let model = I2emModel::default();
    let electrical = ElectricalParameters::new(5.0, Complex64::new(8.0, 2.0)).unwrap();
    let surface = SurfaceParameters::new(
        0.01,
        0.06,
        CorrelationFunction::XExponential { exponent: 1.5 },
    )
    .unwrap();
    let vh = model
        .cross_pol(&surface, &electrical, 0.6, TermSelection::Auto)
        .unwrap();
    eprintln!(
        "x-exponential 1.5: VH = {:.3} dB ({} terms, {} evaluations)",
        vh.db(),
        vh.terms,
        vh.quadrature.evaluations
    );
    assert!(vh.vh >= 0.0);
    assert!(vh.db().is_finite() && vh.db() > -300.0);
    assert!(vh.quadrature.converged);

    let db = api::cross_pol_backscatter(5.0, 0.01, 0.06, 0.6f64.to_degrees(), 8.0, 2.0, 4, 1.5, true)
        .unwrap();
    assert_abs_diff_eq!(db, vh.db(), epsilon = 1e-3);
}

// ─────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────

#[test]
fn test_non_positive_roughness_is_invalid_argument() {
    for (sig, l) in [(0.0, 0.1), (-0.01, 0.1), (0.01, 0.0), (0.01, -1.0)] {
        let err = api::monostatic_backscatter(3.0, sig, l, 30.0, 11.3, 1.5, 2, 1.0).unwrap_err();
        assert!(matches!(err, ModelError::InvalidArgument(_)), "{err}");
        let err = api::cross_pol_backscatter(3.0, sig, l, 30.0, 11.3, 1.5, 1, 1.0, true).unwrap_err();
        assert!(matches!(err, ModelError::InvalidArgument(_)), "{err}");
        let err = api::emissivity(3.0, sig, l, 30.0, 11.3, 1.5, 2).unwrap_err();
        assert!(matches!(err, ModelError::InvalidArgument(_)), "{err}");
    }
}

#[test]
fn test_unknown_correlation_code_is_invalid_argument() {
    let err = api::full_backscatter(3.0, 0.01, 0.1, 30.0, 11.3, 1.5, 9, 1.0, true).unwrap_err();
    assert!(matches!(err, ModelError::InvalidArgument(_)));
}
