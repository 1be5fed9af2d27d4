//! Savitzky-Golay smoothing
//!
//! Each output point is the value at that point of a least-squares
//! polynomial fitted over a sliding window. Points closer to either end than
//! half a window are evaluated on the polynomial fitted to the first or last
//! full window instead of padding the signal.

/// Window length used when none is configured
pub const DEFAULT_WINDOW: usize = 11;

/// Polynomial order used when none is configured
pub const DEFAULT_POLYORDER: usize = 2;

/// Series with this many points or fewer are left as they are
pub const MIN_POINTS: usize = 3;

/// Smoothing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmoothingParams {
    /// Preferred window length; shrunk to fit short series
    pub window: usize,

    /// Preferred polynomial order; capped below the window length
    pub polyorder: usize,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        SmoothingParams {
            window: DEFAULT_WINDOW,
            polyorder: DEFAULT_POLYORDER,
        }
    }
}

impl SmoothingParams {
    /// Window and order actually used for a series of `len` points, or
    /// `None` when the series is too short to smooth
    pub fn effective(&self, len: usize) -> Option<(usize, usize)> {
        if len <= MIN_POINTS {
            return None;
        }

        let largest_odd = if len % 2 == 0 { len - 1 } else { len };
        let mut window = self.window.min(largest_odd).max(3);
        if window % 2 == 0 {
            window -= 1;
        }
        let polyorder = self.polyorder.min(window - 1);
        Some((window, polyorder))
    }
}

/// Smooth `y` with the given parameters.
///
/// Series of three points or fewer are returned unchanged.
pub fn smooth(y: &[f64], params: SmoothingParams) -> Vec<f64> {
    match params.effective(y.len()) {
        Some((window, polyorder)) => savgol_filter(y, window, polyorder),
        None => y.to_vec(),
    }
}

/// Savitzky-Golay filter with an odd `window` no longer than `y`
pub fn savgol_filter(y: &[f64], window: usize, polyorder: usize) -> Vec<f64> {
    let n = y.len();
    if window < 1 || window > n || window % 2 == 0 || polyorder >= window {
        return y.to_vec();
    }

    let half = window / 2;
    let offsets: Vec<f64> = (0..window).map(|k| k as f64 - half as f64).collect();
    let mut out = vec![0.0; n];

    for i in half..n - half {
        let coeffs = fit_polynomial(&offsets, &y[i - half..=i + half], polyorder);
        out[i] = evaluate(&coeffs, 0.0);
    }

    let head = fit_polynomial(&offsets, &y[..window], polyorder);
    for (i, slot) in out.iter_mut().enumerate().take(half) {
        *slot = evaluate(&head, i as f64 - half as f64);
    }

    let tail = fit_polynomial(&offsets, &y[n - window..], polyorder);
    for i in n - half..n {
        let pos = (i - (n - window)) as f64 - half as f64;
        out[i] = evaluate(&tail, pos);
    }

    out
}

/// Least-squares polynomial coefficients, lowest order first
fn fit_polynomial(x: &[f64], y: &[f64], order: usize) -> Vec<f64> {
    let size = order + 1;
    let mut matrix = vec![vec![0.0; size + 1]; size];

    for (xi, yi) in x.iter().zip(y) {
        let mut powers = vec![1.0; 2 * size];
        for k in 1..powers.len() {
            powers[k] = powers[k - 1] * xi;
        }
        for row in 0..size {
            for col in 0..size {
                matrix[row][col] += powers[row + col];
            }
            matrix[row][size] += powers[row] * yi;
        }
    }

    solve(matrix)
}

/// Gaussian elimination with partial pivoting on an augmented matrix
fn solve(mut m: Vec<Vec<f64>>) -> Vec<f64> {
    let size = m.len();

    for col in 0..size {
        let pivot = (col..size)
            .max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))
            .unwrap_or(col);
        m.swap(col, pivot);

        let p = m[col][col];
        if p.abs() < f64::EPSILON {
            continue;
        }
        for row in col + 1..size {
            let factor = m[row][col] / p;
            for k in col..=size {
                m[row][k] -= factor * m[col][k];
            }
        }
    }

    let mut result = vec![0.0; size];
    for row in (0..size).rev() {
        let mut acc = m[row][size];
        for k in row + 1..size {
            acc -= m[row][k] * result[k];
        }
        result[row] = if m[row][row].abs() < f64::EPSILON {
            0.0
        } else {
            acc / m[row][row]
        };
    }
    result
}

fn evaluate(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-6, "{} != {}", x, y);
        }
    }

    #[test]
    fn test_effective_params() {
        let params = SmoothingParams::default();
        assert_eq!(params.effective(3), None);
        assert_eq!(params.effective(4), Some((3, 2)));
        assert_eq!(params.effective(5), Some((5, 2)));
        assert_eq!(params.effective(8), Some((7, 2)));
        assert_eq!(params.effective(100), Some((11, 2)));

        let linear = SmoothingParams { window: 11, polyorder: 5 };
        assert_eq!(linear.effective(4), Some((3, 2)));
    }

    #[test]
    fn test_short_series_untouched() {
        let y = [1.0, 5.0, 2.0];
        assert_eq!(smooth(&y, SmoothingParams::default()), y.to_vec());
    }

    #[test]
    fn test_matches_reference_values() {
        // savgol_filter([2, 2, 5, 2, 1, 0, 1, 4, 9], 5, 2) with interp edges
        let y = [2.0, 2.0, 5.0, 2.0, 1.0, 0.0, 1.0, 4.0, 9.0];
        let expected = [
            1.65714286, 3.17142857, 3.54285714, 2.85714286, 0.65714286,
            0.17142857, 1.0, 4.0, 9.0,
        ];
        assert_close(&savgol_filter(&y, 5, 2), &expected);
    }

    proptest! {
        #[test]
        fn prop_preserves_quadratics(a in -5.0f64..5.0, b in -5.0f64..5.0, c in -5.0f64..5.0, n in 4usize..40) {
            let y: Vec<f64> = (0..n).map(|i| {
                let x = i as f64;
                a + b * x + c * x * x
            }).collect();
            let smoothed = smooth(&y, SmoothingParams::default());
            prop_assert_eq!(smoothed.len(), y.len());
            for (s, v) in smoothed.iter().zip(&y) {
                prop_assert!((s - v).abs() < 1e-6 * (1.0 + v.abs()));
            }
        }
    }
}
