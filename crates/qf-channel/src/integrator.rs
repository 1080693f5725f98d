//! Adaptive Dormand–Prince 5(4) integrator.

use crate::error::{ChannelError, ChannelResult};
use nalgebra::Vector3;

/// State vector of the channel ODE.
pub type State = Vector3<f64>;

/// First-order system `y' = f(x, y)`.
pub trait OdeSystem {
    /// Derivative at `x`. Takes `&mut self` so systems can cache between calls.
    fn rhs(&mut self, x: f64, y: &State) -> ChannelResult<State>;
}

/// Step-size control of [`Rk45`].
#[derive(Debug, Clone, PartialEq)]
pub struct Rk45Config {
    pub rtol: f64,
    pub atol: f64,
    /// First step as a fraction of the span
    pub h_init: f64,
    /// Smallest step as a fraction of the span
    pub h_min: f64,
    /// Attempted steps (accepted and rejected) per call
    pub max_substeps: usize,
}

impl Default for Rk45Config {
    fn default() -> Self {
        Self {
            rtol: 1e-8,
            atol: 1e-10,
            h_init: 0.1,
            h_min: 1e-12,
            max_substeps: 10_000,
        }
    }
}

/// Result of one [`Rk45::integrate`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct Rk45Report {
    pub y: State,
    pub accepted: usize,
    pub rejected: usize,
}

const C: [f64; 6] = [1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];

const A2: [f64; 1] = [1.0 / 5.0];
const A3: [f64; 2] = [3.0 / 40.0, 9.0 / 40.0];
const A4: [f64; 3] = [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0];
const A5: [f64; 4] = [19372.0 / 6561.0, -25360.0 / 2187.0, 64448.0 / 6561.0, -212.0 / 729.0];
const A6: [f64; 5] = [
    9017.0 / 3168.0,
    -355.0 / 33.0,
    46732.0 / 5247.0,
    49.0 / 176.0,
    -5103.0 / 18656.0,
];
/// Fifth-order weights; also the last stage row (FSAL).
const B: [f64; 6] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
];
/// Fifth minus fourth order weights.
const E: [f64; 7] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;
/// Shrink factor after a stage failed to evaluate.
const FAILED_STAGE_FACTOR: f64 = 0.25;

fn combine(y: &State, h: f64, k: &[State], w: &[f64]) -> State {
    let mut out = *y;
    for (ki, wi) in k.iter().zip(w) {
        out += ki * (h * wi);
    }
    out
}

/// Embedded Runge–Kutta pair with error control.
#[derive(Debug, Clone, Default)]
pub struct Rk45 {
    pub config: Rk45Config,
}

impl Rk45 {
    pub fn new(config: Rk45Config) -> Self {
        Self { config }
    }

    /// Integrate from `(x0, y0)` to `x1`; `x1 < x0` integrates backwards.
    pub fn integrate<S: OdeSystem + ?Sized>(
        &self,
        system: &mut S,
        x0: f64,
        y0: &State,
        x1: f64,
    ) -> ChannelResult<Rk45Report> {
        let cfg = &self.config;
        let span = x1 - x0;
        if !span.is_finite() {
            return Err(ChannelError::InvalidArg {
                what: "integration bounds must be finite",
            });
        }
        if span == 0.0 {
            return Ok(Rk45Report {
                y: *y0,
                accepted: 0,
                rejected: 0,
            });
        }
        let dir = span.signum();
        let h_min = cfg.h_min * span.abs();
        let mut h = cfg.h_init * span;
        let mut x = x0;
        let mut y = *y0;
        let mut k1 = system.rhs(x, &y)?;
        let (mut accepted, mut rejected) = (0, 0);
        let mut last_failure = None;

        for _ in 0..cfg.max_substeps {
            let last = (x + h - x1) * dir >= 0.0;
            if last {
                h = x1 - x;
            }
            match self.try_step(system, x, &y, &k1, h) {
                Ok((y_new, k7, err)) if err <= 1.0 => {
                    x = if last { x1 } else { x + h };
                    y = y_new;
                    k1 = k7;
                    accepted += 1;
                    if last {
                        return Ok(Rk45Report { y, accepted, rejected });
                    }
                    let factor = if err > 0.0 {
                        (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
                    } else {
                        MAX_FACTOR
                    };
                    h *= factor;
                }
                Ok((_, _, err)) => {
                    rejected += 1;
                    h *= (SAFETY * err.powf(-0.2)).max(MIN_FACTOR);
                }
                Err(e) => {
                    rejected += 1;
                    h *= FAILED_STAGE_FACTOR;
                    last_failure = Some(e);
                }
            }
            if h.abs() < h_min {
                return Err(last_failure.unwrap_or(ChannelError::NonPhysical {
                    what: "RK45 step size underflow",
                }));
            }
        }
        Err(ChannelError::TooManyIterations {
            what: "RK45 substeps",
            iterations: cfg.max_substeps,
            state: format!("x={x}, y=[{}, {}, {}], h={h}", y[0], y[1], y[2]),
        })
    }

    /// One trial step; returns the new state, its derivative and the scaled error.
    fn try_step<S: OdeSystem + ?Sized>(
        &self,
        system: &mut S,
        x: f64,
        y: &State,
        k1: &State,
        h: f64,
    ) -> ChannelResult<(State, State, f64)> {
        let mut k = [*k1; 7];
        k[1] = system.rhs(x + C[0] * h, &combine(y, h, &k[..1], &A2))?;
        k[2] = system.rhs(x + C[1] * h, &combine(y, h, &k[..2], &A3))?;
        k[3] = system.rhs(x + C[2] * h, &combine(y, h, &k[..3], &A4))?;
        k[4] = system.rhs(x + C[3] * h, &combine(y, h, &k[..4], &A5))?;
        k[5] = system.rhs(x + C[4] * h, &combine(y, h, &k[..5], &A6))?;
        let y_new = combine(y, h, &k[..6], &B);
        if y_new.iter().any(|v| !v.is_finite()) {
            return Err(ChannelError::NonPhysical {
                what: "non-finite RK45 stage",
            });
        }
        k[6] = system.rhs(x + C[5] * h, &y_new)?;

        let err_vec = combine(&State::zeros(), h, &k, &E);
        let mut err: f64 = 0.0;
        for i in 0..3 {
            let scale = self.config.atol + self.config.rtol * y[i].abs().max(y_new[i].abs());
            err = err.max(err_vec[i].abs() / scale);
        }
        Ok((y_new, k[6], err))
    }
}
