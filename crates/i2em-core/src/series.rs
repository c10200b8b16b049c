//! Truncation of the spectral series.
//!
//! Every I2EM series has the shape $\sum_{n \ge 1} \frac{x^n}{n!} a_n$
//! where $x$ is a roughness-dependent power (for example $(k\sigma)^2
//! (\cos\theta_i + \cos\theta_s)^2$ for the co-polarised terms) and
//! $a_n$ is bounded. The term count is chosen from the weights
//! $x^n / n!$ alone, before any spectrum is evaluated: the series stops at
//! the first N for which the last weight is below `epsilon` times the
//! running sum of weights.

/// Lazy sequence of the weights $x^n / n!$ for n = 1, 2, ….
///
/// Yields `(n, weight)`. The recursion never forms $x^n$ or $n!$ alone.
#[derive(Debug, Clone)]
pub struct SeriesTerms {
    x: f64,
    n: usize,
    weight: f64,
}

impl SeriesTerms {
    pub fn new(x: f64) -> Self {
        Self {
            x,
            n: 0,
            weight: 1.0,
        }
    }
}

impl Iterator for SeriesTerms {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<Self::Item> {
        self.n += 1;
        self.weight *= self.x / self.n as f64;
        Some((self.n, self.weight))
    }
}

/// When to stop adding series terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruncationPolicy {
    /// Relative size of the last weight at which the series stops.
    pub epsilon: f64,
    pub min_terms: usize,
    pub max_terms: usize,
}

impl TruncationPolicy {
    /// Default cap, raised for large powers by [`Self::cap_for`].
    pub const MAX_TERMS: usize = 200;

    /// Absolute ceiling on any series length.
    pub const CEILING_TERMS: usize = 1000;

    /// Built-in policy of the co-polarised model.
    pub const CO_POL: TruncationPolicy = TruncationPolicy {
        epsilon: 1.0e-8,
        min_terms: 2,
        max_terms: Self::MAX_TERMS,
    };

    /// Policy with a caller-supplied threshold.
    pub fn with_epsilon(epsilon: f64) -> Self {
        Self {
            epsilon,
            ..Self::CO_POL
        }
    }

    /// Term cap for power `x`: at least `max_terms`, and far enough past
    /// the peak of $x^n/n!$ (near n = x) to cover its Poisson-like bulk,
    /// $x + 10\sqrt{x} + 20$, up to [`Self::CEILING_TERMS`].
    pub fn cap_for(&self, x: f64) -> usize {
        let bulk = (x + 10.0 * x.sqrt() + 20.0).ceil();
        let grown = if bulk.is_finite() && bulk > 0.0 {
            bulk.min(Self::CEILING_TERMS as f64) as usize
        } else {
            0
        };
        self.max_terms.max(grown)
    }
}

/// Number of terms to keep for the series with power `x`.
///
/// Deterministic in `(x, policy)`. Degenerate `x` (zero or non-finite)
/// gives `min_terms`. Hitting the cap of [`TruncationPolicy::cap_for`]
/// (or overflowing the weights) is logged as a warning and returns the cap.
pub fn select_term_count(x: f64, policy: &TruncationPolicy) -> usize {
    let min_terms = policy.min_terms.max(1);
    if !(x.is_finite() && x > 0.0) {
        return min_terms;
    }
    let max_terms = policy.cap_for(x).max(min_terms);

    let mut sum = 0.0;
    for (n, weight) in SeriesTerms::new(x).take(max_terms) {
        sum += weight;
        if !sum.is_finite() {
            break;
        }
        if n >= min_terms && weight <= policy.epsilon * sum {
            return n;
        }
    }
    log::warn!(
        "series with x = {x:.3e} hit the {max_terms}-term cap before reaching epsilon {:.1e}",
        policy.epsilon
    );
    max_terms
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_series_terms_are_power_over_factorial() {
        let terms: Vec<_> = SeriesTerms::new(2.0).take(4).collect();
        assert_eq!(terms[0].0, 1);
        assert_relative_eq!(terms[0].1, 2.0);
        assert_relative_eq!(terms[1].1, 2.0);
        assert_relative_eq!(terms[2].1, 8.0 / 6.0);
        assert_relative_eq!(terms[3].1, 16.0 / 24.0);
    }

    #[test]
    fn test_smooth_surface_needs_few_terms() {
        // x = 0.1: 0.1^6/6! ≈ 1.4e-9 still exceeds 1e-8 · (e^0.1 - 1)
        assert_eq!(select_term_count(0.1, &TruncationPolicy::CO_POL), 7);
    }

    #[test]
    fn test_term_count_grows_with_roughness() {
        let p = TruncationPolicy::CO_POL;
        let counts: Vec<_> = [0.01, 0.1, 1.0, 10.0, 50.0]
            .iter()
            .map(|&x| select_term_count(x, &p))
            .collect();
        assert!(counts.windows(2).all(|w| w[0] <= w[1]), "{counts:?}");
        assert!(counts[4] < TruncationPolicy::MAX_TERMS);
    }

    #[test]
    fn test_cap_grows_past_the_weight_peak() {
        let p = TruncationPolicy::CO_POL;
        assert_eq!(p.cap_for(1.0), TruncationPolicy::MAX_TERMS);
        // x ≈ 258 is (kσ)²(2 cos θ)² for kσ ≈ 10.5 at 40°
        for &x in &[150.0, 257.8, 500.0] {
            let n = select_term_count(x, &p);
            eprintln!("x = {x}: {n} terms (cap {})", p.cap_for(x));
            assert!(n > x as usize, "series stopped before the peak of xⁿ/n!");
            assert!(n < p.cap_for(x));
        }
        assert!(select_term_count(257.8, &p) > TruncationPolicy::MAX_TERMS);
    }

    #[test]
    fn test_looser_epsilon_never_needs_more_terms() {
        for &x in &[0.05, 0.5, 5.0] {
            let tight = select_term_count(x, &TruncationPolicy::with_epsilon(1e-10));
            let loose = select_term_count(x, &TruncationPolicy::with_epsilon(1e-6));
            assert!(loose <= tight);
        }
    }

    #[test]
    fn test_degenerate_inputs_and_cap() {
        let p = TruncationPolicy::CO_POL;
        assert_eq!(select_term_count(0.0, &p), 2);
        assert_eq!(select_term_count(f64::NAN, &p), 2);
        // weights overflow long before the ceiling
        assert_eq!(select_term_count(5000.0, &p), TruncationPolicy::CEILING_TERMS);
        assert_eq!(p.cap_for(f64::INFINITY), TruncationPolicy::MAX_TERMS);
    }
}
