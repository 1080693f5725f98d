//! Simpson quadrature over the cell/midpoint grid.
//!
//! Each cell carries three nodes `(2i, 2i+1, 2i+2)` with the midpoint in the
//! middle, so Simpson's 1/3 rule is exact for quadratics per cell.

/// Simpson's rule across one cell of width `l`.
#[inline]
pub fn simpson(f0: f64, fm: f64, f2: f64, l: f64) -> f64 {
    l * (f0 + 4.0 * fm + f2) / 6.0
}

/// Integral of the interpolating quadratic from the cell start to its midpoint.
#[inline]
pub fn simpson_first_half(f0: f64, fm: f64, f2: f64, l: f64) -> f64 {
    l * (5.0 * f0 - f2 + 8.0 * fm) / 24.0
}

/// `∫ f w dy` over the whole grid.
///
/// `y`, `f` and `w` have `2N+1` entries.
pub fn integrate(y: &[f64], f: &[f64], w: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut i = 0;
    while i + 2 < y.len() {
        sum += simpson(f[i] * w[i], f[i + 1] * w[i + 1], f[i + 2] * w[i + 2], y[i + 2] - y[i]);
        i += 2;
    }
    sum
}

/// Running integral `∫₀^{y_k} f dy` at every node.
pub fn cumulative(y: &[f64], f: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; y.len()];
    let mut i = 0;
    while i + 2 < y.len() {
        let l = y[i + 2] - y[i];
        out[i + 1] = out[i] + simpson_first_half(f[i], f[i + 1], f[i + 2], l);
        out[i + 2] = out[i] + simpson(f[i], f[i + 1], f[i + 2], l);
        i += 2;
    }
    out
}

/// Derivative `df/dy` at every node from the quadratic through each cell.
///
/// Nodes shared by two cells take the mean of both one-sided values.
pub fn derivative(y: &[f64], f: &[f64]) -> Vec<f64> {
    let n = y.len();
    let mut out = vec![0.0; n];
    let mut count = vec![0u8; n];
    let mut i = 0;
    while i + 2 < n {
        let l = y[i + 2] - y[i];
        let (f0, fm, f2) = (f[i], f[i + 1], f[i + 2]);
        out[i] += (-3.0 * f0 + 4.0 * fm - f2) / l;
        out[i + 1] += (f2 - f0) / l;
        out[i + 2] += (f0 - 4.0 * fm + 3.0 * f2) / l;
        count[i] += 1;
        count[i + 1] += 1;
        count[i + 2] += 1;
        i += 2;
    }
    for (d, c) in out.iter_mut().zip(&count) {
        if *c > 1 {
            *d /= f64::from(*c);
        }
    }
    out
}
