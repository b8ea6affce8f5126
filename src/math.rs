/// Guard added to the maximum before normalization
pub const NORMALIZATION_EPSILON: f64 = 1e-8;

/// Kernel half-width in units of sigma; `exp(-0.5 * 40^2)` underflows to zero
const KERNEL_RADIUS: f64 = 40.0;

/// Unnormalized gaussian bump centered on `center` and evaluated at `position`
pub fn gaussian(position: f64, center: f64, sigma: f64) -> f64 {
    let z = (position - center) / sigma;
    (-0.5 * z * z).exp()
}

/// Sums one gaussian kernel per position over a linear genome of `genome_length`
///
/// Each kernel is only evaluated within `40 * sigma` of its center, beyond
/// which it is exactly zero in `f64`. With a zero kernel width every position
/// becomes an exact spike of height 1.
pub fn kernel_density(positions: &[usize], genome_length: usize, sigma: f64) -> Vec<f64> {
    let mut density = vec![0.0; genome_length];
    if sigma <= 0.0 {
        for &idx in positions.iter().filter(|&&idx| idx < genome_length) {
            density[idx] = 1.0;
        }
        return density;
    }
    let radius = (KERNEL_RADIUS * sigma).ceil() as usize;
    for &idx in positions {
        let center = idx as f64;
        let hi = idx.saturating_add(radius).saturating_add(1).min(genome_length);
        let lo = idx.saturating_sub(radius).min(hi);
        for (p, value) in density[lo..hi].iter_mut().enumerate() {
            *value += gaussian((lo + p) as f64, center, sigma);
        }
    }
    density
}

/// Scales a profile so its maximum is 1
///
/// An all-zero profile stays all zero.
pub fn normalize_by_max(density: &mut [f64]) {
    let max = density.iter().copied().fold(0.0, f64::max);
    let scale = max + NORMALIZATION_EPSILON;
    density.iter_mut().for_each(|x| *x /= scale);
}
