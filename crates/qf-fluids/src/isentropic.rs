//! Inversions along isobars and isentropes.

use crate::error::{FluidError, FluidResult};
use crate::mixture::Mixture;
use crate::model::{Caloric, T_MAX, T_MIN, validation};

/// Iteration cap for the one-dimensional inversions.
pub const MAX_ITERATIONS: usize = 100;

const T_TOL: f64 = 1e-11;
const LNP_TOL: f64 = 1e-12;

impl Mixture {
    /// Safeguarded Newton for `f(T, p) = target` on `[T_MIN, T_MAX]`.
    ///
    /// `f` returns the value and its temperature slope from a caloric pack.
    fn invert_temperature(
        &self,
        what: &'static str,
        target: f64,
        p: f64,
        guess: f64,
        f: impl Fn(&Caloric) -> (f64, f64),
    ) -> FluidResult<f64> {
        let (f_lo, _) = f(&self.caloric(T_MIN, p)?);
        let (f_hi, _) = f(&self.caloric(T_MAX, p)?);
        if !(f_lo..=f_hi).contains(&target) {
            return Err(FluidError::OutOfRange {
                what,
                value: target,
                min: f_lo,
                max: f_hi,
            });
        }

        let (mut lo, mut hi) = (T_MIN, T_MAX);
        let mut t = if guess.is_finite() {
            guess.clamp(T_MIN, T_MAX)
        } else {
            0.5 * (T_MIN + T_MAX)
        };
        for _ in 0..MAX_ITERATIONS {
            let (value, slope) = f(&self.caloric(t, p)?);
            let residual = value - target;
            if residual == 0.0 {
                return Ok(t);
            }
            if slope > 0.0 {
                let newton = t - residual / slope;
                if (newton - t).abs() <= T_TOL * t {
                    return Ok(newton);
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
            iterations: MAX_ITERATIONS,
            state: format!("target={target}, p={p} Pa, T={t} K"),
        })
    }

    /// Temperature with `h(T, p) = h`.
    pub fn t_from_h(&self, h: f64, p: f64) -> FluidResult<f64> {
        self.t_from_h_near(h, p, 300.0)
    }

    /// Temperature with `h(T, p) = h`, Newton seeded at `guess`.
    pub fn t_from_h_near(&self, h: f64, p: f64, guess: f64) -> FluidResult<f64> {
        validation::validate_pressure(p)?;
        self.invert_temperature("temperature from enthalpy", h, p, guess, |c| (c.h, c.cp))
    }

    /// Temperature with `s(T, p) = s`, Newton seeded at `guess`.
    pub fn t_from_s_near(&self, s: f64, p: f64, guess: f64) -> FluidResult<f64> {
        validation::validate_pressure(p)?;
        self.invert_temperature("temperature from entropy", s, p, guess, |c| {
            (c.s, c.cp / c.t)
        })
    }

    /// Temperature reached from `(t0, p0)` at pressure `p` along an isentrope.
    pub fn isen_t(&self, t0: f64, p0: f64, p: f64) -> FluidResult<f64> {
        let c0 = self.caloric(t0, p0)?;
        let exponent = (c0.gamma() - 1.0) / c0.gamma();
        let guess = t0 * (p / p0).powf(exponent);
        self.t_from_s_near(c0.s, p, guess)
    }

    /// Pressure reached from `(t0, p0)` at temperature `t` along an isentrope.
    ///
    /// Newton in `ln p` with `(∂s/∂ln p)_T = -p v α`.
    pub fn isen_p(&self, t0: f64, p0: f64, t: f64) -> FluidResult<f64> {
        let c0 = self.caloric(t0, p0)?;
        let g = c0.gamma();
        let mut ln_p = (p0 * (t / t0).powf(g / (g - 1.0))).ln();
        for _ in 0..MAX_ITERATIONS {
            let c = self.caloric(t, ln_p.exp())?;
            let slope = -c.p * c.v * c.alpha;
            if slope >= 0.0 {
                return Err(FluidError::NonPhysical {
                    what: "entropy does not fall with pressure",
                });
            }
            let step = (-(c.s - c0.s) / slope).clamp(-1.0, 1.0);
            ln_p += step;
            if step.abs() < LNP_TOL {
                return Ok(ln_p.exp());
            }
        }
        Err(FluidError::TooManyIterations {
            what: "isentropic pressure",
            iterations: MAX_ITERATIONS,
            state: format!("T0={t0} K, p0={p0} Pa, T={t} K"),
        })
    }

    /// Total conditions `(T_t, p_t)` of a stream at `(t, p, u)`.
    ///
    /// Newton on `p_t` with `(∂h/∂p)_s = v`; the temperature follows the
    /// isentrope through the static state.
    pub fn total(&self, t: f64, p: f64, u: f64) -> FluidResult<(f64, f64)> {
        let c = self.caloric(t, p)?;
        if u == 0.0 {
            return Ok((t, p));
        }
        let h_t = c.h + 0.5 * u * u;
        let g = c.gamma();
        let ma2 = u * u / (c.c * c.c);
        let mut p_t = p * (1.0 + 0.5 * (g - 1.0) * ma2).powf(g / (g - 1.0));
        let mut t_t = t;
        for _ in 0..MAX_ITERATIONS {
            t_t = self.t_from_s_near(c.s, p_t, t_t.max(t))?;
            let ct = self.caloric(t_t, p_t)?;
            let step = (h_t - ct.h) / ct.v;
            let next = (p_t + step).max(0.5 * p_t);
            if (next - p_t).abs() <= LNP_TOL * p_t {
                return Ok((t_t, next));
            }
            p_t = next;
        }
        Err(FluidError::TooManyIterations {
            what: "total conditions",
            iterations: MAX_ITERATIONS,
            state: format!("T={t} K, p={p} Pa, u={u} m/s, p_t={p_t} Pa"),
        })
    }
}
