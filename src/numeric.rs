//! Array helpers with numpy-compatible semantics.
//!
//! Mesh dimensions are rounded to readable values (hundreds of metres, two
//! significant figures) and the resulting numbers must be reproducible
//! exactly. That requires numpy's rounding rule: round half to even at a
//! decimal position, with negative positions rounding left of the point.

/// Round `x` to `decimals` decimal places, ties to even.
///
/// ```
/// use modem_mesh::numeric::round_decimals;
///
/// assert_eq!(round_decimals(1250.0, -2), 1200.0);
/// assert_eq!(round_decimals(1350.0, -2), 1400.0);
/// assert_eq!(round_decimals(2.5, 0), 2.0);
/// ```
#[inline]
pub fn round_decimals(x: f64, decimals: i32) -> f64 {
    if decimals >= 0 {
        let factor = 10f64.powi(decimals);
        (x * factor).round_ties_even() / factor
    } else {
        let factor = 10f64.powi(-decimals);
        (x / factor).round_ties_even() * factor
    }
}

/// Round `x` to the nearest hundred (ties to even).
#[inline]
pub fn round_hundreds(x: f64) -> f64 {
    round_decimals(x, -2)
}

/// Round `x` to `digits` significant figures.
///
/// Zero and non-finite values are returned unchanged.
pub fn round_significant(x: f64, digits: u32) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    let magnitude = x.abs().log10().floor() as i32;
    round_decimals(x, digits as i32 - 1 - magnitude)
}

/// `num` evenly spaced samples over `[start, stop]`, endpoint included.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let div = (num - 1) as f64;
            let delta = stop - start;
            let step = delta / div;
            let mut samples: Vec<f64> = (0..num)
                .map(|i| {
                    if step == 0.0 {
                        (i as f64 / div) * delta + start
                    } else {
                        i as f64 * step + start
                    }
                })
                .collect();
            samples[num - 1] = stop;
            samples
        }
    }
}

/// `num` samples spaced evenly on a log10 scale, from `10^start_exp` to
/// `10^stop_exp`.
pub fn logspace(start_exp: f64, stop_exp: f64, num: usize) -> Vec<f64> {
    linspace(start_exp, stop_exp, num)
        .into_iter()
        .map(|y| 10f64.powf(y))
        .collect()
}

/// Log-spaced samples between two positive values (inclusive).
#[inline]
pub fn logspace_between(first: f64, last: f64, num: usize) -> Vec<f64> {
    logspace(first.log10(), last.log10(), num)
}

/// Half-open range `[start, stop)` with a fixed step.
pub fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    let len = ((stop - start) / step).ceil();
    if len.is_nan() || len <= 0.0 {
        return Vec::new();
    }
    let delta = (start + step) - start;
    (0..len as usize).map(|i| start + i as f64 * delta).collect()
}

/// Running sum with a leading zero: `[0, a0, a0+a1, ...]`.
pub fn cumsum_with_zero(values: &[f64]) -> Vec<f64> {
    let mut sums = Vec::with_capacity(values.len() + 1);
    let mut acc = 0.0;
    sums.push(acc);
    for &v in values {
        acc += v;
        sums.push(acc);
    }
    sums
}

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median (average of the two middle values for even lengths); NaN if empty.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Most frequent value, smallest first on ties.
pub fn mode(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        let count = j - i;
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((sorted[i], count));
        }
        i = j;
    }
    best.map(|(v, _)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    #[test]
    fn test_round_half_to_even() {
        assert_eq!(round_decimals(-3250.0, -2), -3200.0);
        assert_eq!(round_decimals(3750.0, -2), 3800.0);
        assert_eq!(round_decimals(-1065.0, -1), -1060.0);
        assert_eq!(round_decimals(0.125, 2), 0.12);
    }

    #[test]
    fn test_round_significant() {
        assert_eq!(round_significant(1234.0, 2), 1200.0);
        assert_eq!(round_significant(10.0, 2), 10.0);
        assert_eq!(round_significant(13.48, 2), 13.0);
        assert_eq!(round_significant(0.0, 2), 0.0);
    }

    #[test]
    fn test_linspace_endpoints() {
        let s = linspace(1.0, 2.0, 5);
        assert_eq!(s.len(), 5);
        assert_eq!(s[0], 1.0);
        assert_eq!(s[4], 2.0);
        assert!((s[2] - 1.5).abs() < TOL);
    }

    #[test]
    fn test_logspace_between() {
        let s = logspace_between(10.0, 1000.0, 3);
        assert!((s[0] - 10.0).abs() < TOL);
        assert!((s[1] - 100.0).abs() < 1e-9);
        assert!((s[2] - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_arange_excludes_stop() {
        let a = arange(-3700.0, 4800.0, 500.0);
        assert_eq!(a.len(), 17);
        assert_eq!(a[0], -3700.0);
        assert_eq!(a[16], 4300.0);
        assert!(arange(1.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn test_cumsum_with_zero() {
        assert_eq!(cumsum_with_zero(&[1.0, 2.0, 3.0]), vec![0.0, 1.0, 3.0, 6.0]);
    }

    #[test]
    fn test_median_and_mode() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
        assert_eq!(mode(&[500.0, 800.0, 500.0, 1200.0]), Some(500.0));
        assert_eq!(mode(&[]), None);
    }
}
