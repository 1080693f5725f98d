//! C¹ splice between the Helmholtz backend and its SRK alternate.
//!
//! Below `t_cross` the Helmholtz correlation is used, above `t_high` the SRK
//! cubic; in between, `v`, `h`, `s`, `μ` and `λ` follow cubic Hermite
//! polynomials matching value and slope at both ends.

use crate::composition::Composition;
use crate::coolprop::Helmholtz;
use crate::error::{FluidError, FluidResult};
use crate::model::{Caloric, EquationOfState, Transport, validation};
use crate::species::Species;
use crate::srk::Srk;
use crate::transport::mixture_transport;

/// Distance of the low splice end below the correlation limit [K].
const CROSS_MARGIN: f64 = 50.0;
/// Lowest upper splice end [K].
const T_HIGH_MIN: f64 = 1000.0;
/// Minimum splice width [K].
const MIN_WIDTH: f64 = 100.0;

/// Value and slope of a property at one splice end.
#[derive(Debug, Clone, Copy)]
struct Knot {
    f: f64,
    df: f64,
}

/// Hermite basis on `[t0, t1]`: value, first and second derivative.
fn hermite(t0: f64, t1: f64, k0: Knot, k1: Knot, t: f64) -> (f64, f64, f64) {
    let w = t1 - t0;
    let s = (t - t0) / w;
    let (s2, s3) = (s * s, s * s * s);
    let value = (2.0 * s3 - 3.0 * s2 + 1.0) * k0.f
        + (s3 - 2.0 * s2 + s) * w * k0.df
        + (-2.0 * s3 + 3.0 * s2) * k1.f
        + (s3 - s2) * w * k1.df;
    let slope = ((6.0 * s2 - 6.0 * s) * k0.f
        + (3.0 * s2 - 4.0 * s + 1.0) * w * k0.df
        + (-6.0 * s2 + 6.0 * s) * k1.f
        + (3.0 * s2 - 2.0 * s) * w * k1.df)
        / w;
    let curvature = ((12.0 * s - 6.0) * k0.f
        + (6.0 * s - 4.0) * w * k0.df
        + (-12.0 * s + 6.0) * k1.f
        + (6.0 * s - 2.0) * w * k1.df)
        / (w * w);
    (value, slope, curvature)
}

/// Helmholtz model with SRK continuation to high temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct HelmholtzSplice {
    helmholtz: Helmholtz,
    alternate: Srk,
    t_cross: f64,
    t_high: f64,
}

impl HelmholtzSplice {
    pub fn new(species: Species) -> FluidResult<Self> {
        let helmholtz = Helmholtz::new(species)?;
        let t_cross = helmholtz.t_max() - CROSS_MARGIN;
        let t_high = T_HIGH_MIN.max(t_cross + MIN_WIDTH);
        Ok(Self {
            helmholtz,
            alternate: Srk,
            t_cross,
            t_high,
        })
    }

    /// Splice window `(t_cross, t_high)` [K].
    pub fn window(&self) -> (f64, f64) {
        (self.t_cross, self.t_high)
    }

    pub fn helmholtz(&self) -> &Helmholtz {
        &self.helmholtz
    }

    fn in_window(&self, t: f64) -> bool {
        t > self.t_cross && t < self.t_high
    }

    fn ends(&self, comp: &Composition, p: f64) -> FluidResult<(Caloric, Caloric)> {
        Ok((
            self.helmholtz.caloric(comp, self.t_cross, p)?,
            self.alternate.caloric(comp, self.t_high, p)?,
        ))
    }

    /// Spliced `(v, dv/dT)` at `(t, p)` inside the window.
    fn volume_in_window(&self, comp: &Composition, t: f64, p: f64) -> FluidResult<(f64, f64)> {
        let (lo, hi) = self.ends(comp, p)?;
        let (v, dv, _) = hermite(
            self.t_cross,
            self.t_high,
            Knot {
                f: lo.v,
                df: lo.v * lo.alpha,
            },
            Knot {
                f: hi.v,
                df: hi.v * hi.alpha,
            },
            t,
        );
        Ok((v, dv))
    }

    /// Molecular transport on either side of and across the splice.
    pub fn transport(&self, comp: &Composition, t: f64, p: f64) -> FluidResult<Transport> {
        if t <= self.t_cross {
            return self.helmholtz.transport(t, p);
        }
        if t >= self.t_high {
            return Ok(mixture_transport(comp, t));
        }
        let dt = 1e-3 * self.t_cross;
        let lo = self.helmholtz.transport(self.t_cross, p)?;
        let lo_prev = self.helmholtz.transport(self.t_cross - dt, p)?;
        let hi = mixture_transport(comp, self.t_high);
        let hi_next = mixture_transport(comp, self.t_high + dt);
        let knot = |f: f64, f_other: f64, sign: f64| Knot {
            f,
            df: sign * (f - f_other) / dt,
        };
        let (mu, _, _) = hermite(
            self.t_cross,
            self.t_high,
            knot(lo.mu, lo_prev.mu, 1.0),
            knot(hi.mu, hi_next.mu, -1.0),
            t,
        );
        let (lambda, _, _) = hermite(
            self.t_cross,
            self.t_high,
            knot(lo.lambda, lo_prev.lambda, 1.0),
            knot(hi.lambda, hi_next.lambda, -1.0),
            t,
        );
        let tr = Transport { mu, lambda };
        validation::validate_transport(&tr)?;
        Ok(tr)
    }
}

impl EquationOfState for HelmholtzSplice {
    fn name(&self) -> &str {
        "helmholtz+srk"
    }

    fn supports_composition(&self, comp: &Composition) -> bool {
        self.helmholtz.supports_composition(comp)
    }

    fn caloric(&self, comp: &Composition, t: f64, p: f64) -> FluidResult<Caloric> {
        if t <= self.t_cross {
            return self.helmholtz.caloric(comp, t, p);
        }
        if t >= self.t_high {
            return self.alternate.caloric(comp, t, p);
        }
        validation::validate_pressure(p)?;

        let (lo, hi) = self.ends(comp, p)?;
        let (t0, t1) = (self.t_cross, self.t_high);
        let (v, dv, _) = hermite(
            t0,
            t1,
            Knot {
                f: lo.v,
                df: lo.v * lo.alpha,
            },
            Knot {
                f: hi.v,
                df: hi.v * hi.alpha,
            },
            t,
        );
        let (h, cp, dcp_dt) = hermite(
            t0,
            t1,
            Knot { f: lo.h, df: lo.cp },
            Knot { f: hi.h, df: hi.cp },
            t,
        );
        let (s, _, _) = hermite(
            t0,
            t1,
            Knot {
                f: lo.s,
                df: lo.cp / t0,
            },
            Knot {
                f: hi.s,
                df: hi.cp / t1,
            },
            t,
        );

        let dp = 1e-5 * p;
        let (v_hi, _) = self.volume_in_window(comp, t, p + dp)?;
        let (v_lo, _) = self.volume_in_window(comp, t, p - dp)?;
        let kappa = -(v_hi - v_lo) / (2.0 * dp * v);
        let alpha = dv / v;
        let cv = cp - t * v * alpha * alpha / kappa;

        let caloric = Caloric {
            t,
            p,
            v,
            h,
            s,
            cp,
            cv,
            dcp_dt,
            c: (cp / cv * v / kappa).sqrt(),
            alpha,
            kappa,
            r: comp.gas_constant(),
            m: comp.molar_mass(),
        };
        validation::validate_caloric(&caloric)?;
        Ok(caloric)
    }

    fn pressure(&self, comp: &Composition, v: f64, t: f64) -> FluidResult<f64> {
        if t <= self.t_cross {
            return self.helmholtz.pressure(comp, v, t);
        }
        if t >= self.t_high {
            return self.alternate.pressure(comp, v, t);
        }
        // Newton on v(T, p) in ln p, seeded by the cubic
        let mut p = self.alternate.pressure(comp, v, t)?;
        for _ in 0..50 {
            let c = self.caloric(comp, t, p)?;
            let step = (c.v - v) / (c.v * c.kappa * p);
            p *= step.clamp(-0.5, 0.5).exp();
            if step.abs() < 1e-12 {
                return Ok(p);
            }
        }
        Err(FluidError::TooManyIterations {
            what: "pressure from (v, T) in the splice window",
            iterations: 50,
            state: format!("v={v}, T={t}"),
        })
    }

    fn volume(&self, comp: &Composition, t: f64, p: f64) -> FluidResult<f64> {
        if self.in_window(t) {
            Ok(self.volume_in_window(comp, t, p)?.0)
        } else {
            Ok(self.caloric(comp, t, p)?.v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn hermite_matches_ends() {
        let k0 = Knot { f: 1.0, df: 2.0 };
        let k1 = Knot { f: 5.0, df: -1.0 };
        let (v0, d0, _) = hermite(0.0, 2.0, k0, k1, 0.0);
        let (v1, d1, _) = hermite(0.0, 2.0, k0, k1, 2.0);
        assert_relative_eq!(v0, 1.0, epsilon = 1e-14);
        assert_relative_eq!(d0, 2.0, epsilon = 1e-14);
        assert_relative_eq!(v1, 5.0, epsilon = 1e-14);
        assert_relative_eq!(d1, -1.0, epsilon = 1e-14);
    }

    #[test]
    fn hermite_reproduces_cubics() {
        let f = |x: f64| 0.5 * x * x * x - x + 3.0;
        let df = |x: f64| 1.5 * x * x - 1.0;
        let (t0, t1) = (1.0, 3.0);
        let (v, d, c) = hermite(
            t0,
            t1,
            Knot { f: f(t0), df: df(t0) },
            Knot { f: f(t1), df: df(t1) },
            2.2,
        );
        assert_relative_eq!(v, f(2.2), epsilon = 1e-12);
        assert_relative_eq!(d, df(2.2), epsilon = 1e-12);
        assert_relative_eq!(c, 3.0 * 2.2, epsilon = 1e-12);
    }
}
