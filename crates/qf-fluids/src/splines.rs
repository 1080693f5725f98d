//! Natural cubic splines of mixture properties along an isobar.
//!
//! The boundary-layer and channel solvers evaluate `v, h, μ, λ` through these
//! splines only; the mixture evaluators are called once per knot when the
//! splines are (re)built.

use crate::error::{FluidError, FluidResult};
use crate::mixture::Mixture;
use crate::model::{T_MAX, T_MIN};

/// Number of columns of a coefficient matrix row: `[x, a, b, c, d]`.
pub const COEFF_COLUMNS: usize = 5;

/// Default knot count for ideal-gas mixtures.
pub const IDEAL_GAS_POINTS: usize = 201;

/// Default knot count for real-gas mixtures.
pub const REAL_GAS_POINTS: usize = 101;

/// Solve a tridiagonal system with the Thomas algorithm.
///
/// `sub[0]` and `sup[n-1]` are ignored.
fn thomas_solve(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Vec<f64> {
    let n = rhs.len();
    let mut c = vec![0.0; n];
    let mut d = vec![0.0; n];
    c[0] = sup[0] / diag[0];
    d[0] = rhs[0] / diag[0];
    for i in 1..n {
        let den = diag[i] - sub[i] * c[i - 1];
        if i < n - 1 {
            c[i] = sup[i] / den;
        }
        d[i] = (rhs[i] - sub[i] * d[i - 1]) / den;
    }
    let mut x = vec![0.0; n];
    x[n - 1] = d[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d[i] - c[i] * x[i + 1];
    }
    x
}

/// Natural cubic spline on strictly increasing knots.
///
/// On `[x_i, x_{i+1}]` the value is `a + b·dx + c·dx² + d·dx³`.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpline {
    x: Vec<f64>,
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

impl CubicSpline {
    pub fn new(x: &[f64], y: &[f64]) -> FluidResult<Self> {
        let mut spline = Self {
            x: Vec::new(),
            a: Vec::new(),
            b: Vec::new(),
            c: Vec::new(),
            d: Vec::new(),
        };
        spline.update_data(x, y)?;
        Ok(spline)
    }

    /// Refit the spline to new knots and values.
    pub fn update_data(&mut self, x: &[f64], y: &[f64]) -> FluidResult<()> {
        let n = x.len();
        if n < 3 || y.len() != n {
            return Err(FluidError::InvalidArg {
                what: "spline needs at least three knots and matching values",
            });
        }
        if x.windows(2).any(|w| !(w[1] > w[0])) || y.iter().any(|v| !v.is_finite()) {
            return Err(FluidError::InvalidArg {
                what: "spline knots must increase strictly and values be finite",
            });
        }

        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let mut sub = vec![0.0; n];
        let mut diag = vec![1.0; n];
        let mut sup = vec![0.0; n];
        let mut rhs = vec![0.0; n];
        for i in 1..n - 1 {
            sub[i] = h[i - 1];
            diag[i] = 2.0 * (h[i - 1] + h[i]);
            sup[i] = h[i];
            rhs[i] = 3.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
        }
        let c = thomas_solve(&sub, &diag, &sup, &rhs);

        self.b = (0..n - 1)
            .map(|i| (y[i + 1] - y[i]) / h[i] - h[i] * (2.0 * c[i] + c[i + 1]) / 3.0)
            .collect();
        self.d = (0..n - 1)
            .map(|i| (c[i + 1] - c[i]) / (3.0 * h[i]))
            .collect();
        self.a = y[..n - 1].to_vec();
        self.c = c[..n - 1].to_vec();
        self.x = x.to_vec();
        // closing knot
        self.a.push(y[n - 1]);
        self.b.push(0.0);
        self.c.push(0.0);
        self.d.push(0.0);
        Ok(())
    }

    /// Rebuild from rows `[x, a, b, c, d]` as produced by `coefficients`.
    pub fn from_coefficients(rows: &[[f64; COEFF_COLUMNS]]) -> FluidResult<Self> {
        if rows.len() < 3 || rows.windows(2).any(|w| !(w[1][0] > w[0][0])) {
            return Err(FluidError::InvalidArg {
                what: "spline coefficient rows must be increasing in x",
            });
        }
        Ok(Self {
            x: rows.iter().map(|r| r[0]).collect(),
            a: rows.iter().map(|r| r[1]).collect(),
            b: rows.iter().map(|r| r[2]).collect(),
            c: rows.iter().map(|r| r[3]).collect(),
            d: rows.iter().map(|r| r[4]).collect(),
        })
    }

    /// Coefficient matrix, one row per knot; the last row closes the domain.
    pub fn coefficients(&self) -> Vec<[f64; COEFF_COLUMNS]> {
        (0..self.x.len())
            .map(|i| [self.x[i], self.a[i], self.b[i], self.c[i], self.d[i]])
            .collect()
    }

    /// Domain `[x_first, x_last]`.
    pub fn domain(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    fn segment(&self, x: f64) -> FluidResult<(usize, f64)> {
        let (lo, hi) = self.domain();
        if !(lo..=hi).contains(&x) {
            return Err(FluidError::OutOfRange {
                what: "spline argument",
                value: x,
                min: lo,
                max: hi,
            });
        }
        let last = self.x.len() - 2;
        let i = self.x.partition_point(|xi| *xi <= x).saturating_sub(1).min(last);
        Ok((i, x - self.x[i]))
    }

    pub fn eval(&self, x: f64) -> FluidResult<f64> {
        let (i, dx) = self.segment(x)?;
        Ok(self.a[i] + dx * (self.b[i] + dx * (self.c[i] + dx * self.d[i])))
    }

    /// First derivative.
    pub fn deval(&self, x: f64) -> FluidResult<f64> {
        let (i, dx) = self.segment(x)?;
        Ok(self.b[i] + dx * (2.0 * self.c[i] + 3.0 * dx * self.d[i]))
    }
}

/// Coefficient matrices of a `PropertySplines` set, for restore without resampling.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineMatrices {
    pub p: f64,
    pub v: Vec<[f64; COEFF_COLUMNS]>,
    pub h: Vec<[f64; COEFF_COLUMNS]>,
    pub mu: Vec<[f64; COEFF_COLUMNS]>,
    pub lambda: Vec<[f64; COEFF_COLUMNS]>,
}

/// `v(T), h(T), μ(T), λ(T)` at one pressure.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySplines {
    p: f64,
    v: CubicSpline,
    h: CubicSpline,
    mu: CubicSpline,
    lambda: CubicSpline,
}

impl PropertySplines {
    /// Sample the mixture at `points` uniformly spaced temperatures in
    /// `[t_lo, t_hi]` (clamped to the mixture range) along pressure `p`.
    pub fn build(mix: &Mixture, p: f64, t_lo: f64, t_hi: f64, points: usize) -> FluidResult<Self> {
        let lo = t_lo.max(T_MIN);
        let hi = t_hi.min(T_MAX);
        if !(hi > lo) || points < 3 {
            return Err(FluidError::InvalidArg {
                what: "property spline range is empty",
            });
        }
        let step = (hi - lo) / (points - 1) as f64;
        let ts: Vec<f64> = (0..points)
            .map(|i| if i + 1 == points { hi } else { lo + step * i as f64 })
            .collect();
        let mut v = Vec::with_capacity(points);
        let mut h = Vec::with_capacity(points);
        let mut mu = Vec::with_capacity(points);
        let mut lambda = Vec::with_capacity(points);
        for &t in &ts {
            let props = mix.properties(t, p)?;
            v.push(props.caloric.v);
            h.push(props.caloric.h);
            mu.push(props.transport.mu);
            lambda.push(props.transport.lambda);
        }
        Ok(Self {
            p,
            v: CubicSpline::new(&ts, &v)?,
            h: CubicSpline::new(&ts, &h)?,
            mu: CubicSpline::new(&ts, &mu)?,
            lambda: CubicSpline::new(&ts, &lambda)?,
        })
    }

    /// Default knot count for the mixture's equation of state.
    pub fn default_points(mix: &Mixture) -> usize {
        if mix.eos().is_ideal() {
            IDEAL_GAS_POINTS
        } else {
            REAL_GAS_POINTS
        }
    }

    pub fn from_matrices(m: &SplineMatrices) -> FluidResult<Self> {
        Ok(Self {
            p: m.p,
            v: CubicSpline::from_coefficients(&m.v)?,
            h: CubicSpline::from_coefficients(&m.h)?,
            mu: CubicSpline::from_coefficients(&m.mu)?,
            lambda: CubicSpline::from_coefficients(&m.lambda)?,
        })
    }

    pub fn matrices(&self) -> SplineMatrices {
        SplineMatrices {
            p: self.p,
            v: self.v.coefficients(),
            h: self.h.coefficients(),
            mu: self.mu.coefficients(),
            lambda: self.lambda.coefficients(),
        }
    }

    pub fn pressure(&self) -> f64 {
        self.p
    }

    pub fn t_range(&self) -> (f64, f64) {
        self.v.domain()
    }

    pub fn v(&self, t: f64) -> FluidResult<f64> {
        self.v.eval(t)
    }

    pub fn rho(&self, t: f64) -> FluidResult<f64> {
        Ok(1.0 / self.v.eval(t)?)
    }

    pub fn h(&self, t: f64) -> FluidResult<f64> {
        self.h.eval(t)
    }

    /// `dh/dT` of the spline.
    pub fn cp(&self, t: f64) -> FluidResult<f64> {
        self.h.deval(t)
    }

    /// `(1/v) dv/dT` of the spline.
    pub fn alpha(&self, t: f64) -> FluidResult<f64> {
        Ok(self.v.deval(t)? / self.v.eval(t)?)
    }

    pub fn mu(&self, t: f64) -> FluidResult<f64> {
        self.mu.eval(t)
    }

    pub fn dmu(&self, t: f64) -> FluidResult<f64> {
        self.mu.deval(t)
    }

    pub fn lambda(&self, t: f64) -> FluidResult<f64> {
        self.lambda.eval(t)
    }

    /// Temperature with `v(T) = v`, by safeguarded Newton on the spline.
    pub fn t_from_v(&self, v: f64) -> FluidResult<f64> {
        invert(&self.v, v, "temperature from specific volume")
    }

    /// Temperature with `h(T) = h`, by safeguarded Newton on the spline.
    pub fn t_from_h(&self, h: f64) -> FluidResult<f64> {
        invert(&self.h, h, "temperature from spline enthalpy")
    }
}

/// Invert a spline that increases monotonically over its domain.
fn invert(spline: &CubicSpline, target: f64, what: &'static str) -> FluidResult<f64> {
    let (mut lo, mut hi) = spline.domain();
    let (f_lo, f_hi) = (spline.eval(lo)?, spline.eval(hi)?);
    if !(f_lo..=f_hi).contains(&target) {
        return Err(FluidError::OutOfRange {
            what,
            value: target,
            min: f_lo,
            max: f_hi,
        });
    }
    if target == f_lo {
        return Ok(lo);
    }
    if target == f_hi {
        return Ok(hi);
    }
    let mut t = lo + (hi - lo) * (target - f_lo) / (f_hi - f_lo);
    for _ in 0..100 {
        let residual = spline.eval(t)? - target;
        if residual == 0.0 {
            return Ok(t);
        }
        let slope = spline.deval(t)?;
        if slope > 0.0 {
            let newton = t - residual / slope;
            if (newton - t).abs() <= 1e-12 * t {
                return Ok(newton.clamp(lo, hi));
            }
        }
        if residual > 0.0 {
            hi = t;
        } else {
            lo = t;
        }
        let mut next = if slope > 0.0 { t - residual / slope } else { t };
        if !(next > lo && next < hi) {
            next = 0.5 * (lo + hi);
        }
        t = next;
    }
    Err(FluidError::TooManyIterations {
        what,
        iterations: 100,
        state: format!("target={target}, T={t} K"),
    })
}
