//! One-sample Kolmogorov-Smirnov test against the standard uniform distribution
//!
//! The two-sided p-value comes from the exact finite-sample distribution of the
//! statistic when it is cheap to evaluate (Marsaglia, Tsang & Wang 2003) and
//! from the Kolmogorov limiting distribution with Stephens' correction
//! otherwise.

use ndarray::Array2;

/// Samples with `n * d^2` above this have a p-value far below any reported threshold
const EXACT_TAIL_LIMIT: f64 = 18.0;

/// Largest `floor(n * d) + 1` evaluated with the exact matrix method
const MAX_EXACT_K: usize = 100;

const SCALE: f64 = 1e140;
const SCALE_EXPONENT: i32 = 140;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsTest {
    /// Largest distance between the empirical and uniform CDFs
    pub statistic: f64,
    /// Two-sided p-value
    pub pvalue: f64,
}

impl KsTest {
    /// Result reported for an empty sample
    pub fn empty() -> Self {
        Self {
            statistic: 0.0,
            pvalue: 1.0,
        }
    }
}

/// Tests `sample` against U(0, 1)
///
/// Values outside the unit interval are compared against the clipped uniform
/// CDF. An empty sample returns [`KsTest::empty`].
pub fn ks_uniform(sample: &[f64]) -> KsTest {
    if sample.is_empty() {
        return KsTest::empty();
    }
    let mut sorted = sample.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));

    let n = sorted.len() as f64;
    let mut d_plus = 0.0f64;
    let mut d_minus = 0.0f64;
    for (i, x) in sorted.iter().enumerate() {
        let cdf = x.clamp(0.0, 1.0);
        d_plus = d_plus.max((i + 1) as f64 / n - cdf);
        d_minus = d_minus.max(cdf - i as f64 / n);
    }
    let statistic = d_plus.max(d_minus);

    KsTest {
        statistic,
        pvalue: ks_two_sided_sf(statistic, sorted.len()),
    }
}

/// Survival function of the two-sided statistic `D_n`: `P(D_n >= d)`
pub fn ks_two_sided_sf(d: f64, n: usize) -> f64 {
    if n == 0 || d.is_nan() {
        return 1.0;
    }
    let nf = n as f64;
    if d >= 1.0 {
        return 0.0;
    }
    if d <= 0.5 / nf {
        return 1.0;
    }
    if d >= 1.0 - 1.0 / nf {
        return 2.0 * (1.0 - d).powi(n as i32);
    }
    if d <= 1.0 / nf {
        let base = 2.0 * d - 1.0 / nf;
        let cdf = (1..=n).fold(1.0, |acc, i| acc * i as f64 * base);
        return (1.0 - cdf).clamp(0.0, 1.0);
    }

    let k = (nf * d).floor() as usize + 1;
    if nf * d * d < EXACT_TAIL_LIMIT && k <= MAX_EXACT_K {
        (1.0 - exact_cdf(d, n)).clamp(0.0, 1.0)
    } else {
        let sqrt_n = nf.sqrt();
        kolmogorov_sf((sqrt_n + 0.12 + 0.11 / sqrt_n) * d)
    }
}

/// Limiting survival function `2 * sum (-1)^(k-1) exp(-2 k^2 x^2)`
pub fn kolmogorov_sf(x: f64) -> f64 {
    if x < 0.2 {
        return 1.0;
    }
    let mut total = 0.0;
    for k in 1..=100 {
        let kf = k as f64;
        let term = (-2.0 * kf * kf * x * x).exp();
        if k % 2 == 1 {
            total += term;
        } else {
            total -= term;
        }
        if term < 1e-17 {
            break;
        }
    }
    (2.0 * total).clamp(0.0, 1.0)
}

/// `P(D_n < d)` by the Marsaglia-Tsang-Wang matrix method
fn exact_cdf(d: f64, n: usize) -> f64 {
    let nd = n as f64 * d;
    let k = nd.floor() as usize + 1;
    let m = 2 * k - 1;
    let h = k as f64 - nd;

    let mut hm = Array2::from_shape_fn((m, m), |(i, j)| if i + 1 >= j { 1.0 } else { 0.0 });
    for i in 0..m {
        hm[[i, 0]] -= h.powi(i as i32 + 1);
        hm[[m - 1, i]] -= h.powi((m - i) as i32);
    }
    if 2.0 * h - 1.0 > 0.0 {
        hm[[m - 1, 0]] += (2.0 * h - 1.0).powi(m as i32);
    }
    for ((i, j), value) in hm.indexed_iter_mut() {
        if i + 1 > j {
            for g in 1..=(i + 1 - j) {
                *value /= g as f64;
            }
        }
    }

    let (q, mut exponent) = matrix_power(&hm, n);
    let mut s = q[[k - 1, k - 1]];
    for i in 1..=n {
        s = s * i as f64 / n as f64;
        if s < 1.0 / SCALE {
            s *= SCALE;
            exponent -= SCALE_EXPONENT;
        }
    }
    s * 10f64.powi(exponent)
}

/// Raises `a` to `power`, returning the result scaled by `10^-exponent`
fn matrix_power(a: &Array2<f64>, power: usize) -> (Array2<f64>, i32) {
    if power == 1 {
        return (a.clone(), 0);
    }
    let (half, half_exponent) = matrix_power(a, power / 2);
    let squared = half.dot(&half);
    let mut result = if power % 2 == 0 {
        squared
    } else {
        a.dot(&squared)
    };
    let mut exponent = 2 * half_exponent;
    let center = a.nrows() / 2;
    if result[[center, center]] > SCALE {
        result.mapv_inplace(|x| x / SCALE);
        exponent += SCALE_EXPONENT;
    }
    (result, exponent)
}
