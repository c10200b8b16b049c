//! Field coefficients, transition reflection and shadowing.
//!
//! These are the geometry/dielectric kernels shared by the co-polarised
//! bistatic model and the emissivity integrand. The incident wave travels
//! in the φ = 0 plane, so cos φ = 1 and sin φ = 0 are folded into the
//! expressions below.

use num_complex::Complex64;
use statrs::function::erf::erfc;
use std::f64::consts::{FRAC_PI_2, PI, SQRT_2};

use crate::fresnel::{normal_incidence, FresnelCoefficients};
use crate::series::SeriesTerms;

/// Polar angles are kept this far (rad) inside (0, π/2).
pub(crate) const ANGLE_GUARD: f64 = 1.0e-4;

/// Clamp a polar angle into [ANGLE_GUARD, π/2 − ANGLE_GUARD].
pub(crate) fn clamp_polar(theta: f64) -> f64 {
    theta.clamp(ANGLE_GUARD, FRAC_PI_2 - ANGLE_GUARD)
}

/// Trigonometry of one bistatic geometry.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Angles {
    pub theta_i: f64,
    pub s: f64,
    pub cs: f64,
    pub ss: f64,
    pub css: f64,
    pub cfs: f64,
    pub sfs: f64,
}

impl Angles {
    pub(crate) fn new(theta_i: f64, theta_s: f64, phi_s: f64) -> Self {
        let theta_i = clamp_polar(theta_i);
        let (s, cs) = theta_i.sin_cos();
        let (ss, css) = clamp_polar(theta_s).sin_cos();
        let (sfs, cfs) = phi_s.sin_cos();
        Self {
            theta_i,
            s,
            cs,
            ss,
            css,
            cfs,
            sfs,
        }
    }

    /// Magnitude of the transverse wavenumber difference, |k_s − k_i|⊥ / k.
    pub(crate) fn transverse_offset(&self) -> f64 {
        let dx = self.ss * self.cfs - self.s;
        let dy = self.ss * self.sfs;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Kirchhoff (tangent-plane) field coefficients.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Kirchhoff {
    pub vv: Complex64,
    pub hh: Complex64,
    /// Identical for HV and VH.
    pub cross: Complex64,
}

pub(crate) fn kirchhoff(rv: Complex64, rh: Complex64, a: &Angles) -> Kirchhoff {
    let geo = a.s * a.ss - (1.0 + a.cs * a.css) * a.cfs;
    let scale = 2.0 / (a.cs + a.css) * geo;
    Kirchhoff {
        vv: rv * scale,
        hh: -rh * scale,
        cross: (rv - rh) * a.sfs,
    }
}

/// Whether a complementary-field term refers to the upward or downward
/// propagating spectral component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Up,
    Down,
}

impl Direction {
    fn sign(self) -> f64 {
        match self {
            Self::Up => 1.0,
            Self::Down => -1.0,
        }
    }
}

/// Which wave the complementary-field term is expanded around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Incident,
    Scattered,
}

/// Complementary field coefficient F_pp for VV and HH.
///
/// `fresnel` holds the coefficients at the incidence angle; `k` is the
/// free-space wavenumber. Returns `[F_vv, F_hh]` in units of k.
pub(crate) fn complementary(
    direction: Direction,
    side: Side,
    fresnel: &FresnelCoefficients,
    er: Complex64,
    k: f64,
    a: &Angles,
) -> [Complex64; 2] {
    let ud = direction.sign();
    let (s, cs, ss, css, cfs, sfs) = (a.s, a.cs, a.ss, a.css, a.cfs, a.sfs);
    let kz = k * cs;
    let ksz = k * css;
    // recurring geometric groups
    let dx = ss * cfs - s;
    let sfs2 = sfs * sfs;

    let (q, qt, c1, c2) = match side {
        Side::Incident => {
            let q = kz;
            let qt = k * (er - s * s).sqrt();
            let gq = ud * q;
            let gqt = qt * ud;
            let qi = ud * kz;

            let c11 = k * cfs * (ksz - qi);
            let c21 = cs * (cfs * (k * k * s * dx + gq * (k * css - qi)) + k * k * s * ss * sfs2);
            let c31 = k * s * (s * cfs * (k * css - qi) - gq * (cfs * dx + ss * sfs2));
            let c41 = k * cs * (cfs * css * (k * css - qi) + k * ss * dx);
            let c51 = gq * (cfs * css * (qi - k * css) - k * ss * dx);

            let c22 = cs * (cfs * (gqt * (k * css - qi) + k * k * s * dx) + k * k * s * ss * sfs2);
            let c32 = k * s * (s * cfs * (k * css - qi) - gqt * (cfs * dx - ss * sfs2));
            let c52 = gqt * (cfs * css * (qi - k * css) - k * ss * dx);

            (
                q,
                qt,
                [c11, c21, c31, c41, c51],
                [Complex64::from(c11), c22, c32, Complex64::from(c41), c52],
            )
        }
        Side::Scattered => {
            let q = ksz;
            let qt = k * (er - ss * ss).sqrt();
            let gq = ud * q;
            let gqt = qt * ud;
            let qs = ud * ksz;

            let c11 = k * cfs * (kz + qs);
            let bracket = cfs * (cs * (kz + qs) - k * s * dx) - k * s * ss * sfs2;
            let c21 = gq * bracket;
            let c31 = k * ss * (k * cs * dx + s * (kz + qs));
            let c41 = k * css * bracket;
            let c51 = -css * (k * k * ss * dx + gq * cfs * (kz + qs));

            let c22 = gqt * bracket;
            let c52 = -css * (gqt * cfs * (kz + qs) + k * k * ss * dx);

            (
                q,
                qt,
                [c11, c21, c31, c41, c51],
                [
                    Complex64::from(c11),
                    c22,
                    Complex64::from(c31),
                    Complex64::from(c41),
                    c52,
                ],
            )
        }
    };

    let [c11, c21, c31, c41, c51] = c1;
    let [c12, c22, c32, c42, c52] = c2;

    let r = fresnel.rv;
    let (p, m) = (1.0 + r, 1.0 - r);
    let vv = p * (-m * c11 / q + p * c12 / qt)
        + m * (m * c21 / q - p * c22 / qt)
        + p * (m * c31 / q - p * c32 / (er * qt))
        + m * (p * c41 / q - er * m * c42 / qt)
        + p * (p * c51 / q - m * c52 / qt);

    let r = fresnel.rh;
    let (p, m) = (1.0 + r, 1.0 - r);
    let hh = p * (m * c11 / q - er * p * c12 / qt)
        - m * (m * c21 / q - p * c22 / qt)
        - p * (m * c31 / q - p * c32 / qt)
        - m * (p * c41 / q - m * c42 / qt)
        - p * (p * c51 / q - m * c52 / qt);

    [vv, hh]
}

/// Transition-model reflection coefficients `(Rvt, Rht)`.
///
/// Blends the Fresnel coefficients at the incidence angle towards the
/// normal-incidence value as roughness grows. `spectra` are W⁽ⁿ⁾ at the
/// scattering geometry for n = 1..=N. Falls back to the plain Fresnel
/// coefficients when the blend factor is not finite.
pub(crate) fn transition_coefficients(
    fresnel: &FresnelCoefficients,
    er: Complex64,
    ks: f64,
    a: &Angles,
    spectra: &[f64],
) -> (Complex64, Complex64) {
    let (s, cs) = (a.s, a.cs);
    let rt = (er - s * s).sqrt();
    let rv0 = normal_incidence(er);
    let rh0 = -rv0;

    let ft = 8.0 * rv0 * rv0 * s * (cs + rt) / (cs * rt);
    let x = (ks * cs).powi(2);
    let damping = (-x).exp();

    // |Ft/2 + 2^{n+1} b|² expanded so that 2ⁿ and 4ⁿ ride in the series weights
    let half_ft = ft * 0.5;
    let b = rv0 * (damping / cs);
    let cross = 2.0 * (half_ft * b.conj()).re;
    let weights = SeriesTerms::new(x)
        .zip(SeriesTerms::new(2.0 * x))
        .zip(SeriesTerms::new(4.0 * x));

    let mut a1 = 0.0;
    let mut b1 = 0.0;
    for ((((_, w1), (_, w2)), (_, w4)), &w) in weights.zip(spectra) {
        a1 += w1 * w;
        b1 += (w1 * half_ft.norm_sqr() + 2.0 * w2 * cross + 4.0 * w4 * b.norm_sqr()) * w;
    }

    let st = 0.25 * ft.norm_sqr() * a1 / b1;
    let st0 = 1.0 / (1.0 + 8.0 * rv0 / (cs * ft)).norm_sqr();
    let tf = 1.0 - st / st0;
    if !tf.is_finite() {
        return (fresnel.rv, fresnel.rh);
    }

    (
        fresnel.rv + (rv0 - fresnel.rv) * tf,
        fresnel.rh + (rh0 - fresnel.rh) * tf,
    )
}

/// Smith shadowing exponent Λ(a) for slope parameter a = cot θ / (√2 s).
fn smith_lambda(a: f64) -> f64 {
    if !(a.is_finite() && a > 0.0) {
        return if a > 0.0 { 0.0 } else { f64::INFINITY };
    }
    0.5 * ((-a * a).exp() / (PI.sqrt() * a) - erfc(a))
}

/// Two-way shadowing factor for monostatic backscatter at angle `theta`.
pub(crate) fn backscatter_shadowing(theta: f64, rms_slope: f64) -> f64 {
    if !(rms_slope.is_finite() && rms_slope > 0.0) {
        return 1.0;
    }
    let a = 1.0 / (theta.tan() * SQRT_2 * rms_slope);
    1.0 / (1.0 + 2.0 * smith_lambda(a))
}

/// One-way shadowing factor inside the cross-polarised integrand, for a
/// direction with normalised transverse radius `r` and vertical component `q`.
pub(crate) fn cross_pol_shadowing(q: f64, r: f64, rms_slope: f64) -> f64 {
    if !(rms_slope.is_finite() && rms_slope > 0.0) {
        return 1.0;
    }
    let a = q / (r * SQRT_2 * rms_slope);
    1.0 / (1.0 + smith_lambda(a))
}
