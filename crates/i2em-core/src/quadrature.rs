//! Adaptive numerical integration.
//!
//! Two globally adaptive integrators, both pure functions of their inputs:
//!
//! - [`integrate_1d`]: Gauss–Kronrod 7/15 on intervals.
//! - [`integrate_2d`] / [`integrate_2d_vec`]: Genz–Malik degree 7/5 cubature
//!   on rectangles, for scalar or fixed-length vector integrands.
//!
//! Each keeps a max-heap of subregions keyed by their error estimate and
//! bisects the worst one until the total error satisfies
//! `error ≤ max(absolute_tolerance, relative_tolerance · |value|)` or the
//! next subdivision would exceed `max_evaluations`. Running out of budget is
//! not an error: the best estimate is returned with `converged = false`.
//!
//! # Reference
//! Genz, A. C. and Malik, A. A., "An adaptive algorithm for numerical
//! integration over an N-dimensional rectangular region", J. Comput. Appl.
//! Math. 6, 295–302 (1980). Piessens, R. et al., *QUADPACK* (1983).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

/// Budget and tolerances for one adaptive integration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegratorConfig {
    /// Maximum number of integrand evaluations.
    pub max_evaluations: usize,
    /// Relative tolerance on the integral.
    pub relative_tolerance: f64,
    /// Absolute tolerance on the integral.
    pub absolute_tolerance: f64,
}

impl IntegratorConfig {
    /// Cross-polarised integral defaults.
    pub const CROSS_POL: IntegratorConfig = IntegratorConfig {
        max_evaluations: 10_000,
        relative_tolerance: 1.0e-4,
        absolute_tolerance: 0.0,
    };

    /// Hemispherical emissivity integral defaults.
    pub const HEMISPHERE: IntegratorConfig = IntegratorConfig {
        max_evaluations: 20_000,
        relative_tolerance: 1.0e-5,
        absolute_tolerance: 1.0e-7,
    };

    /// Error target for an integral whose current estimate is `value`.
    pub fn target(&self, value: f64) -> f64 {
        self.absolute_tolerance
            .max(self.relative_tolerance * value.abs())
    }

    /// Copy with selected fields overwritten. Negative (or NaN) arguments
    /// leave the corresponding field unchanged.
    pub fn with_overrides(
        mut self,
        max_evaluations: i64,
        relative_tolerance: f64,
        absolute_tolerance: f64,
    ) -> Self {
        if max_evaluations >= 0 {
            self.max_evaluations = max_evaluations as usize;
        }
        if relative_tolerance >= 0.0 {
            self.relative_tolerance = relative_tolerance;
        }
        if absolute_tolerance >= 0.0 {
            self.absolute_tolerance = absolute_tolerance;
        }
        self
    }
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self::CROSS_POL
    }
}

/// Result of a scalar adaptive integration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadratureOutcome {
    /// Integral estimate.
    pub value: f64,
    /// Estimated absolute error.
    pub error: f64,
    /// Integrand evaluations spent.
    pub evaluations: usize,
    /// Whether the tolerance was met within the budget.
    pub converged: bool,
}

/// Result of a vector-valued adaptive cubature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubatureOutcome<const N: usize> {
    pub values: [f64; N],
    pub errors: [f64; N],
    pub evaluations: usize,
    /// True only when every component met its tolerance.
    pub converged: bool,
}

impl<const N: usize> CubatureOutcome<N> {
    /// Scalar view of component `index`.
    pub fn component(&self, index: usize) -> QuadratureOutcome {
        QuadratureOutcome {
            value: self.values[index],
            error: self.errors[index],
            evaluations: self.evaluations,
            converged: self.converged,
        }
    }
}

/// Heap entry ordered by its error estimate.
struct Region<T> {
    priority: f64,
    data: T,
}

impl<T> PartialEq for Region<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority.total_cmp(&other.priority) == Ordering::Equal
    }
}

impl<T> Eq for Region<T> {}

impl<T> PartialOrd for Region<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Region<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority.total_cmp(&other.priority)
    }
}

// ---------------------------------------------------------------------------
// 1-D Gauss–Kronrod 7/15
// ---------------------------------------------------------------------------

/// Kronrod abscissae (positive half, descending; the last is the centre).
const XGK: [f64; 8] = [
    0.991_455_371_120_812_639_206_854_697_526_329,
    0.949_107_912_342_758_524_526_189_684_047_851,
    0.864_864_423_359_769_072_789_712_788_640_926,
    0.741_531_185_599_394_439_863_864_773_280_788,
    0.586_087_235_467_691_130_294_144_845_693_013,
    0.405_845_151_377_397_166_906_606_412_076_961,
    0.207_784_955_007_898_467_600_689_403_773_245,
    0.0,
];

const WGK: [f64; 8] = [
    0.022_935_322_010_529_224_963_732_008_058_970,
    0.063_092_092_629_978_553_290_700_663_189_204,
    0.104_790_010_322_250_183_839_876_322_541_518,
    0.140_653_259_715_525_918_745_189_590_510_238,
    0.169_004_726_639_267_902_826_583_426_598_550,
    0.190_350_578_064_785_409_913_256_402_421_014,
    0.204_432_940_075_298_892_414_161_999_234_649,
    0.209_482_141_084_727_828_012_999_174_891_714,
];

/// Gauss weights for the odd-indexed Kronrod nodes (the last is the centre).
const WG: [f64; 4] = [
    0.129_484_966_168_869_693_270_611_432_679_082,
    0.279_705_391_489_276_667_901_467_771_423_780,
    0.381_830_050_505_118_944_950_369_775_488_975,
    0.417_959_183_673_469_387_755_102_040_816_327,
];

const GK_POINTS: usize = 15;

#[derive(Clone, Copy)]
struct Interval {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

fn gauss_kronrod<F: FnMut(f64) -> f64>(f: &mut F, a: f64, b: f64) -> Interval {
    let centre = 0.5 * (a + b);
    let half = 0.5 * (b - a);
    let fc = f(centre);
    let mut kronrod = WGK[7] * fc;
    let mut gauss = WG[3] * fc;
    for j in 0..7 {
        let dx = half * XGK[j];
        let pair = f(centre - dx) + f(centre + dx);
        kronrod += WGK[j] * pair;
        if j % 2 == 1 {
            gauss += WG[j / 2] * pair;
        }
    }
    Interval {
        a,
        b,
        value: kronrod * half,
        error: ((kronrod - gauss) * half).abs(),
    }
}

/// Integrate `f` over `[a, b]` with adaptive Gauss–Kronrod 7/15.
pub fn integrate_1d<F: FnMut(f64) -> f64>(
    mut f: F,
    a: f64,
    b: f64,
    config: &IntegratorConfig,
) -> QuadratureOutcome {
    if a == b {
        return QuadratureOutcome {
            value: 0.0,
            error: 0.0,
            evaluations: 0,
            converged: true,
        };
    }

    let first = gauss_kronrod(&mut f, a, b);
    let mut evaluations = GK_POINTS;
    let mut value = first.value;
    let mut error = first.error;
    let mut heap = BinaryHeap::new();
    heap.push(Region {
        priority: first.error,
        data: first,
    });

    while error > config.target(value) {
        if evaluations + 2 * GK_POINTS > config.max_evaluations {
            break;
        }
        let Some(worst) = heap.pop() else { break };
        let iv = worst.data;
        let mid = 0.5 * (iv.a + iv.b);
        let left = gauss_kronrod(&mut f, iv.a, mid);
        let right = gauss_kronrod(&mut f, mid, iv.b);
        evaluations += 2 * GK_POINTS;

        value += left.value + right.value - iv.value;
        error += left.error + right.error - iv.error;
        for half in [left, right] {
            heap.push(Region {
                priority: half.error,
                data: half,
            });
        }
    }

    // re-sum to shed the drift of the running totals
    let (value, error) = heap
        .iter()
        .fold((0.0, 0.0), |(v, e), r| (v + r.data.value, e + r.data.error));

    QuadratureOutcome {
        value,
        error,
        evaluations,
        converged: error <= config.target(value),
    }
}

// ---------------------------------------------------------------------------
// 2-D Genz–Malik 7/5
// ---------------------------------------------------------------------------

const LAMBDA2: f64 = 0.358_568_582_800_318_1; // sqrt(9/70)
const LAMBDA3: f64 = 0.948_683_298_050_513_8; // sqrt(9/10)
const LAMBDA4: f64 = 0.948_683_298_050_513_8; // sqrt(9/10)
const LAMBDA5: f64 = 0.688_247_201_611_685_3; // sqrt(9/19)

/// λ2² / λ3², used by the fourth-difference split heuristic.
const DIFF_RATIO: f64 = 1.0 / 7.0;

// Degree-7 weights for n = 2.
const W1: f64 = -3816.0 / 19683.0;
const W2: f64 = 980.0 / 6561.0;
const W3: f64 = 1020.0 / 19683.0;
const W4: f64 = 200.0 / 19683.0;
const W5: f64 = 6859.0 / 78732.0;

// Embedded degree-5 weights for n = 2.
const E1: f64 = -971.0 / 729.0;
const E2: f64 = 245.0 / 486.0;
const E3: f64 = 65.0 / 1458.0;
const E4: f64 = 25.0 / 729.0;

const GM_POINTS: usize = 17;

/// Regions per axis in the starting partition, when the budget allows it.
const INITIAL_DIVISIONS: usize = 4;

#[derive(Clone, Copy)]
struct Rectangle<const N: usize> {
    centre: [f64; 2],
    half: [f64; 2],
    values: [f64; N],
    errors: [f64; N],
    split_axis: usize,
}

fn genz_malik<const N: usize, F: FnMut(f64, f64) -> [f64; N]>(
    f: &mut F,
    centre: [f64; 2],
    half: [f64; 2],
) -> Rectangle<N> {
    let [cx, cy] = centre;
    let [hx, hy] = half;
    let f0 = f(cx, cy);

    let mut sum2 = [0.0; N];
    let mut sum3 = [0.0; N];
    let mut sum4 = [0.0; N];
    let mut sum5 = [0.0; N];
    let mut fourth_diff = [0.0; 2];

    for (axis, diff) in fourth_diff.iter_mut().enumerate() {
        let unit = if axis == 0 { [hx, 0.0] } else { [0.0, hy] };
        let p2 = f(cx + LAMBDA2 * unit[0], cy + LAMBDA2 * unit[1]);
        let m2 = f(cx - LAMBDA2 * unit[0], cy - LAMBDA2 * unit[1]);
        let p3 = f(cx + LAMBDA3 * unit[0], cy + LAMBDA3 * unit[1]);
        let m3 = f(cx - LAMBDA3 * unit[0], cy - LAMBDA3 * unit[1]);
        for k in 0..N {
            sum2[k] += p2[k] + m2[k];
            sum3[k] += p3[k] + m3[k];
            *diff += (p2[k] + m2[k] - 2.0 * f0[k] - DIFF_RATIO * (p3[k] + m3[k] - 2.0 * f0[k]))
                .abs();
        }
    }

    for (sx, sy) in [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)] {
        let p4 = f(cx + sx * LAMBDA4 * hx, cy + sy * LAMBDA4 * hy);
        let p5 = f(cx + sx * LAMBDA5 * hx, cy + sy * LAMBDA5 * hy);
        for k in 0..N {
            sum4[k] += p4[k];
            sum5[k] += p5[k];
        }
    }

    let volume = 4.0 * hx * hy;
    let mut values = [0.0; N];
    let mut errors = [0.0; N];
    for k in 0..N {
        let high = W1 * f0[k] + W2 * sum2[k] + W3 * sum3[k] + W4 * sum4[k] + W5 * sum5[k];
        let low = E1 * f0[k] + E2 * sum2[k] + E3 * sum3[k] + E4 * sum4[k];
        values[k] = volume * high;
        errors[k] = (volume * (high - low)).abs();
    }

    // ties go to the wider side
    let [d0, d1] = fourth_diff;
    let split_axis = if (d0 - d1).abs() <= 1.0e-12 * (d0 + d1) {
        usize::from(hy > hx)
    } else {
        usize::from(d1 > d0)
    };

    Rectangle {
        centre,
        half,
        values,
        errors,
        split_axis,
    }
}

fn priority<const N: usize>(rect: &Rectangle<N>) -> f64 {
    rect.errors.iter().sum()
}

fn all_within<const N: usize>(values: &[f64; N], errors: &[f64; N], config: &IntegratorConfig) -> bool {
    values
        .iter()
        .zip(errors)
        .all(|(v, e)| *e <= config.target(*v))
}

/// Integrate a vector-valued `f(x, y)` over `[x0, x1] × [y0, y1]`.
///
/// All components share the subdivision; a region's priority is the sum of
/// its component errors, and convergence requires every component to meet
/// its own tolerance.
pub fn integrate_2d_vec<const N: usize, F: FnMut(f64, f64) -> [f64; N]>(
    mut f: F,
    x_range: (f64, f64),
    y_range: (f64, f64),
    config: &IntegratorConfig,
) -> CubatureOutcome<N> {
    let (x0, x1) = x_range;
    let (y0, y1) = y_range;
    if x0 == x1 || y0 == y1 {
        return CubatureOutcome {
            values: [0.0; N],
            errors: [0.0; N],
            evaluations: 0,
            converged: true,
        };
    }

    let divisions = if config.max_evaluations >= INITIAL_DIVISIONS * INITIAL_DIVISIONS * GM_POINTS {
        INITIAL_DIVISIONS
    } else {
        1
    };
    let hx = 0.5 * (x1 - x0) / divisions as f64;
    let hy = 0.5 * (y1 - y0) / divisions as f64;

    let mut heap = BinaryHeap::new();
    let mut values = [0.0; N];
    let mut errors = [0.0; N];
    let mut evaluations = 0;
    for i in 0..divisions {
        for j in 0..divisions {
            let centre = [
                x0 + (2 * i + 1) as f64 * hx,
                y0 + (2 * j + 1) as f64 * hy,
            ];
            let rect = genz_malik(&mut f, centre, [hx, hy]);
            evaluations += GM_POINTS;
            for k in 0..N {
                values[k] += rect.values[k];
                errors[k] += rect.errors[k];
            }
            heap.push(Region {
                priority: priority(&rect),
                data: rect,
            });
        }
    }

    while !all_within(&values, &errors, config) {
        if evaluations + 2 * GM_POINTS > config.max_evaluations {
            break;
        }
        let Some(worst) = heap.pop() else { break };
        let rect = worst.data;
        let axis = rect.split_axis;
        let mut half = rect.half;
        half[axis] *= 0.5;
        let mut lo = rect.centre;
        let mut hi = rect.centre;
        lo[axis] -= half[axis];
        hi[axis] += half[axis];

        for centre in [lo, hi] {
            let child = genz_malik(&mut f, centre, half);
            for k in 0..N {
                values[k] += child.values[k];
                errors[k] += child.errors[k];
            }
            heap.push(Region {
                priority: priority(&child),
                data: child,
            });
        }
        for k in 0..N {
            values[k] -= rect.values[k];
            errors[k] -= rect.errors[k];
        }
        evaluations += 2 * GM_POINTS;
    }

    let mut values = [0.0; N];
    let mut errors = [0.0; N];
    for region in heap.iter() {
        for k in 0..N {
            values[k] += region.data.values[k];
            errors[k] += region.data.errors[k];
        }
    }

    CubatureOutcome {
        values,
        errors,
        evaluations,
        converged: all_within(&values, &errors, config),
    }
}

/// Integrate a scalar `f(x, y)` over `[x0, x1] × [y0, y1]`.
pub fn integrate_2d<F: FnMut(f64, f64) -> f64>(
    mut f: F,
    x_range: (f64, f64),
    y_range: (f64, f64),
    config: &IntegratorConfig,
) -> QuadratureOutcome {
    integrate_2d_vec(|x, y| [f(x, y)], x_range, y_range, config).component(0)
}
