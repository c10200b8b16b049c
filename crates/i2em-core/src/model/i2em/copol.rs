//! Co-polarised bistatic scattering coefficients.
//!
//! $$\sigma^0_{pp} = \frac{k^2}{2} e^{-\sigma^2(k_z^2 + k_{sz}^2)}
//!   \sum_{n=1}^{N} \frac{\sigma^{2n}}{n!} \left|I^n_{pp}\right|^2 W^{(n)}(K)$$
//!
//! with $I^n_{pp}$ the Kirchhoff term $(k_z + k_{sz})^n f_{pp}
//! e^{-\sigma^2 k_z k_{sz}}$ plus four complementary-field terms. The
//! series length N follows the built-in co-polarised truncation policy on
//! $x = (k\sigma)^2(\cos\theta_i + \cos\theta_s)^2$. In the backscatter
//! direction the result is multiplied by the Smith shadowing factor.
//!
//! Each term is accumulated as $\left|\sigma^n I^n_{pp} / \sqrt{n!}\right|^2$
//! through a recursion whose starting values already carry the square root
//! of the exponential prefactor, so the amplitudes peak near 1 and very
//! rough surfaces stay clear of overflow.

use num_complex::Complex64;

use super::kernels::{
    backscatter_shadowing, complementary, kirchhoff, transition_coefficients, Angles, Direction,
    Side,
};
use super::Scene;
use crate::fresnel::FresnelCoefficients;
use crate::model::ModelError;
use crate::series::{select_term_count, TruncationPolicy};
use crate::types::{BistaticCoefficients, ElectricalParameters, Geometry, SurfaceParameters};

/// Bistatic VV, HH and single-scatter HV/VH coefficients (linear).
pub fn bistatic(
    surface: &SurfaceParameters,
    electrical: &ElectricalParameters,
    geometry: &Geometry,
) -> Result<BistaticCoefficients, ModelError> {
    geometry.validate()?;
    let scene = Scene::new(surface, electrical)?;
    let angles = Angles::new(geometry.theta_i, geometry.theta_s, geometry.phi_s);
    let shadow = if geometry.is_monostatic() {
        backscatter_shadowing(angles.theta_i, scene.rms_slope)
    } else {
        1.0
    };
    let fresnel = FresnelCoefficients::new(angles.theta_i, scene.permittivity);
    let coefficients = evaluate(&scene, &fresnel, &angles, shadow);
    log::debug!(
        "bistatic ({:.2}°, {:.2}°, {:.2}°): {} terms, shadow {:.4}",
        geometry.theta_i.to_degrees(),
        geometry.theta_s.to_degrees(),
        geometry.phi_s.to_degrees(),
        coefficients.terms,
        shadow
    );
    Ok(coefficients)
}

/// Core evaluation shared with the emissivity integrand.
///
/// `fresnel` must be the coefficients at `angles.theta_i`; `shadow`
/// multiplies every coefficient.
pub(crate) fn evaluate(
    scene: &Scene,
    fresnel: &FresnelCoefficients,
    angles: &Angles,
    shadow: f64,
) -> BistaticCoefficients {
    let k = scene.k;
    let sigma = scene.sigma;
    let er = scene.permittivity;
    let kz = k * angles.cs;
    let ksz = k * angles.css;
    let s2 = sigma * sigma;

    let x = (scene.ks() * (angles.cs + angles.css)).powi(2);
    let terms = select_term_count(x, &TruncationPolicy::CO_POL);
    let spectra =
        scene
            .correlation
            .spectrum_series(terms, k * angles.transverse_offset(), scene.length);

    let (rvt, rht) = transition_coefficients(fresnel, er, scene.ks(), angles, &spectra);
    let f = kirchhoff(rvt, rht, angles);

    // [up-incident, down-incident, up-scattered, down-scattered]
    let fields = [
        complementary(Direction::Up, Side::Incident, fresnel, er, k, angles),
        complementary(Direction::Down, Side::Incident, fresnel, er, k, angles),
        complementary(Direction::Up, Side::Scattered, fresnel, er, k, angles),
        complementary(Direction::Down, Side::Scattered, fresnel, er, k, angles),
    ];
    let dz = ksz - kz;
    let bases = [
        sigma * (ksz - kz),
        sigma * (ksz + kz),
        sigma * (kz + ksz),
        sigma * (kz - ksz),
    ];
    // half of the exponent of e^{-σ²(kz² + ksz²)}, applied per amplitude
    let half = -0.5 * s2 * (kz * kz + ksz * ksz);
    let mut partial = [
        (half - s2 * (kz * kz - kz * dz)).exp(),
        (half - s2 * (kz * kz + kz * dz)).exp(),
        (half - s2 * (ksz * ksz - ksz * dz)).exp(),
        (half - s2 * (ksz * ksz + ksz * dz)).exp(),
    ];
    let kirchhoff_base = sigma * (kz + ksz);
    let mut kirchhoff_term = (half - s2 * kz * ksz).exp();

    let mut sums = [0.0; 3];
    for (i, &w) in spectra.iter().enumerate() {
        let n = (i + 1) as f64;
        let root_n = n.sqrt();
        kirchhoff_term *= kirchhoff_base / root_n;
        if i > 0 {
            for (p, b) in partial.iter_mut().zip(bases) {
                *p *= b / root_n;
            }
        }

        let mut comp_vv = Complex64::new(0.0, 0.0);
        let mut comp_hh = Complex64::new(0.0, 0.0);
        for (field, &p) in fields.iter().zip(&partial) {
            comp_vv += field[0] * p;
            comp_hh += field[1] * p;
        }
        let ivv = f.vv * kirchhoff_term + comp_vv * (0.25 * sigma);
        let ihh = f.hh * kirchhoff_term + comp_hh * (0.25 * sigma);
        let ihv = f.cross * kirchhoff_term;

        sums[0] += ivv.norm_sqr() * w;
        sums[1] += ihh.norm_sqr() * w;
        sums[2] += ihv.norm_sqr() * w;
    }

    let prefactor = 0.5 * k * k * shadow;
    let [vv, hh, hv] = sums.map(|s| non_negative(s * prefactor));
    BistaticCoefficients {
        vv,
        hh,
        hv,
        vh: hv,
        terms,
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::CorrelationFunction;
    use crate::types::to_db;
    use approx::assert_abs_diff_eq;

    fn reference_case() -> (SurfaceParameters, ElectricalParameters) {
        (
            SurfaceParameters::new(0.0025, 0.10, CorrelationFunction::Gaussian).unwrap(),
            ElectricalParameters::new(3.0, Complex64::new(11.3, 1.5)).unwrap(),
        )
    }

    #[test]
    fn test_reference_backscatter_levels() {
        let (surface, electrical) = reference_case();
        let g = Geometry::monostatic(30f64.to_radians());
        let c = bistatic(&surface, &electrical, &g).unwrap();
        assert_eq!(c.terms, 6);
        assert_abs_diff_eq!(to_db(c.vv), -35.83, epsilon = 0.05);
        assert_abs_diff_eq!(to_db(c.hh), -37.81, epsilon = 0.05);
        assert!(c.vv > c.hh);
        // no single-scatter depolarisation in the plane of incidence
        assert_abs_diff_eq!(c.hv, 0.0, epsilon = 1e-30);
    }

    #[test]
    fn test_near_nadir_polarisations_coincide() {
        let (surface, electrical) = reference_case();
        let g = Geometry::monostatic(0.1f64.to_radians());
        let c = bistatic(&surface, &electrical, &g).unwrap();
        assert_abs_diff_eq!(to_db(c.vv), to_db(c.hh), epsilon = 0.01);
    }

    #[test]
    fn test_out_of_plane_cross_term_is_positive() {
        let (surface, electrical) = reference_case();
        let g = Geometry::from_degrees(30.0, 40.0, 60.0);
        let c = bistatic(&surface, &electrical, &g).unwrap();
        assert!(c.hv > 0.0);
        assert_eq!(c.hv, c.vh);
        assert!(c.vv > 0.0 && c.hh > 0.0);
    }

    #[test]
    fn test_rougher_exponential_surface_scatters_more() {
        let electrical = ElectricalParameters::new(3.0, Complex64::new(11.3, 1.5)).unwrap();
        let g = Geometry::monostatic(30f64.to_radians());
        let vv: Vec<f64> = [0.004, 0.008, 0.016]
            .iter()
            .map(|&s| {
                let surface =
                    SurfaceParameters::new(s, 0.05, CorrelationFunction::Exponential).unwrap();
                bistatic(&surface, &electrical, &g).unwrap().vv
            })
            .collect();
        assert!(vv[0] < vv[1] && vv[1] < vv[2], "{vv:?}");
        assert_abs_diff_eq!(to_db(vv[0]), -12.97, epsilon = 0.1);
    }

    #[test]
    fn test_very_rough_surface_keeps_series_past_default_cap() {
        // kσ from 6.3 to 10.5 at 10 GHz: x reaches ≈ 258
        let electrical = ElectricalParameters::new(10.0, Complex64::new(11.3, 1.5)).unwrap();
        let g = Geometry::monostatic(40f64.to_radians());
        let expected = [(0.03, 151, -17.04), (0.04, 240, -22.13), (0.05, 350, -26.23)];
        let mut previous: Option<f64> = None;
        for (sigma, terms, vv_db) in expected {
            let surface =
                SurfaceParameters::new(sigma, 0.05, CorrelationFunction::Exponential).unwrap();
            let c = bistatic(&surface, &electrical, &g).unwrap();
            eprintln!("σ = {sigma}: {} terms, VV = {:.2} dB", c.terms, to_db(c.vv));
            assert_eq!(c.terms, terms);
            assert_abs_diff_eq!(to_db(c.vv), vv_db, epsilon = 0.1);
            assert!(c.vv > c.hh);
            if let Some(prev) = previous {
                assert!((to_db(c.vv) - prev).abs() < 10.0);
            }
            previous = Some(to_db(c.vv));
        }
    }

    #[test]
    fn test_invalid_geometry_is_rejected() {
        let (surface, electrical) = reference_case();
        let g = Geometry::from_degrees(95.0, 30.0, 180.0);
        assert!(matches!(
            bistatic(&surface, &electrical, &g),
            Err(ModelError::InvalidArgument(_))
        ));
    }
}
