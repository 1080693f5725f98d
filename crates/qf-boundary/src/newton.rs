//! Damped Newton iteration on the centre state `(T̂, û)`.

use crate::error::{BoundaryError, BoundaryResult};
pub use crate::jacobian::Bounds;
use crate::jacobian::{central_difference_jacobian, min_column_norm};
use nalgebra::DVector;
use tracing::debug;

/// Outer Newton configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct OuterNewtonConfig {
    /// Maximum iterations per attempt
    pub max_iterations: usize,
    /// Tolerance on the largest balance error
    pub tol: f64,
    /// Damping of the first attempt
    pub omega: f64,
    /// Damping after reinitialisation
    pub omega_restart: f64,
    /// Largest relative change of an unknown per iteration
    pub max_relative_step: f64,
    /// Jacobian step relative to the bulk value
    pub fd_relative_step: f64,
    /// Iterations without a new best residual before the attempt stalls
    pub stall_window: usize,
    /// Column norm below which the Jacobian counts as singular
    pub singular_norm: f64,
}

impl Default for OuterNewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tol: 1e-8,
            omega: 0.5,
            omega_restart: 0.1,
            max_relative_step: 0.25,
            fd_relative_step: 1e-4,
            stall_window: 20,
            singular_norm: 1e-12,
        }
    }
}

/// Outcome of one Newton attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum NewtonOutcome {
    Converged {
        x: DVector<f64>,
        residual_norm: f64,
        iterations: usize,
    },
    /// The attempt gave up; `best` is the lowest-residual iterate seen.
    Stalled {
        best: DVector<f64>,
        residual_norm: f64,
        iterations: usize,
        reason: StallReason,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StallReason {
    NoProgress,
    SingularJacobian,
    AtBound,
    MaxIterations,
    /// A trial state failed to evaluate.
    Trial(BoundaryError),
}

fn inf_norm(r: &DVector<f64>) -> f64 {
    r.iter().fold(0.0, |m, v| m.max(v.abs()))
}

/// Run one damped Newton attempt from `x0`.
///
/// Each step is `ω J⁻¹ r`, shrunk so that no unknown changes by more than
/// `max_relative_step` of its value and the iterate stays inside `bounds`.
pub fn damped_newton<F>(
    x0: DVector<f64>,
    mut residual_fn: F,
    steps: &[f64],
    bounds: &Bounds,
    omega: f64,
    config: &OuterNewtonConfig,
) -> NewtonOutcome
where
    F: FnMut(&DVector<f64>) -> BoundaryResult<DVector<f64>>,
{
    let stalled = |best: &DVector<f64>, norm: f64, iterations: usize, reason: StallReason| {
        NewtonOutcome::Stalled {
            best: best.clone(),
            residual_norm: norm,
            iterations,
            reason,
        }
    };

    let mut x = x0;
    let mut r = match residual_fn(&x) {
        Ok(r) => r,
        Err(e) => return stalled(&x, f64::INFINITY, 0, StallReason::Trial(e)),
    };
    let mut r_norm = inf_norm(&r);
    let mut best = x.clone();
    let mut best_norm = r_norm;
    let mut since_best = 0;

    for iter in 0..config.max_iterations {
        if r_norm < config.tol {
            return NewtonOutcome::Converged {
                x,
                residual_norm: r_norm,
                iterations: iter,
            };
        }

        let jac = match central_difference_jacobian(&x, &mut residual_fn, steps, bounds) {
            Ok(j) => j,
            Err(e) => return stalled(&best, best_norm, iter, StallReason::Trial(e)),
        };
        if min_column_norm(&jac) < config.singular_norm {
            return stalled(&best, best_norm, iter, StallReason::SingularJacobian);
        }
        let Some(dx) = jac.lu().solve(&(-r.clone())) else {
            return stalled(&best, best_norm, iter, StallReason::SingularJacobian);
        };

        // damping, relative clamp, then bounds
        let mut step = dx * omega;
        let mut scale: f64 = 1.0;
        for i in 0..x.len() {
            let limit = config.max_relative_step * x[i].abs();
            if step[i].abs() > limit {
                scale = scale.min(limit / step[i].abs());
            }
        }
        step *= scale;
        let mut scale: f64 = 1.0;
        for i in 0..x.len() {
            let next = x[i] + step[i];
            if next > bounds.upper[i] {
                scale = scale.min((bounds.upper[i] - x[i]) / step[i]);
            } else if next < bounds.lower[i] {
                scale = scale.min((bounds.lower[i] - x[i]) / step[i]);
            }
        }
        if scale <= 0.0 {
            return stalled(&best, best_norm, iter, StallReason::AtBound);
        }
        let mut x_new = &x + step * scale;
        for i in 0..x_new.len() {
            x_new[i] = x_new[i].clamp(bounds.lower[i], bounds.upper[i]);
        }

        let r_new = match residual_fn(&x_new) {
            Ok(r) => r,
            Err(e) => return stalled(&best, best_norm, iter, StallReason::Trial(e)),
        };
        x = x_new;
        r = r_new;
        r_norm = inf_norm(&r);
        debug!(
            iteration = iter + 1,
            t_center = x[0],
            u_center = x.get(1).copied().unwrap_or(0.0),
            residual = r_norm,
            "outer Newton"
        );

        if r_norm < best_norm {
            best_norm = r_norm;
            best = x.clone();
            since_best = 0;
        } else {
            since_best += 1;
            if since_best >= config.stall_window {
                return stalled(&best, best_norm, iter + 1, StallReason::NoProgress);
            }
        }
    }

    if r_norm < config.tol {
        return NewtonOutcome::Converged {
            x,
            residual_norm: r_norm,
            iterations: config.max_iterations,
        };
    }
    stalled(&best, best_norm, config.max_iterations, StallReason::MaxIterations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_bounds(n: usize) -> Bounds {
        Bounds::open(n)
    }

    #[test]
    fn coupled_quadratic() {
        // x² − 4 = 0, x·y − 6 = 0 → (2, 3)
        let residual = |x: &DVector<f64>| -> BoundaryResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![x[0] * x[0] - 4.0, x[0] * x[1] - 6.0]))
        };
        let config = OuterNewtonConfig::default();
        let out = damped_newton(
            DVector::from_vec(vec![3.0, 2.5]),
            residual,
            &[1e-5, 1e-5],
            &open_bounds(2),
            config.omega,
            &config,
        );
        let NewtonOutcome::Converged { x, .. } = out else {
            panic!("not converged: {out:?}");
        };
        assert!((x[0] - 2.0).abs() < 1e-8);
        assert!((x[1] - 3.0).abs() < 1e-8);
    }

    #[test]
    fn relative_clamp_limits_steps() {
        // root far away; every iterate may move at most 25 %
        let mut seen = Vec::new();
        let residual = |x: &DVector<f64>| -> BoundaryResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] - 100.0))
        };
        let config = OuterNewtonConfig::default();
        let out = damped_newton(
            DVector::from_element(1, 1.0),
            |x: &DVector<f64>| {
                seen.push(x[0]);
                residual(x)
            },
            &[1e-6],
            &open_bounds(1),
            1.0,
            &config,
        );
        assert!(matches!(out, NewtonOutcome::Converged { .. }));
        // first accepted iterate after the two Jacobian probes
        assert!((seen[3] - 1.25).abs() < 1e-12);
    }

    #[test]
    fn singular_jacobian_stalls() {
        let residual = |x: &DVector<f64>| -> BoundaryResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![x[0] - 1.0, 2.0 * x[0] + 1.0]))
        };
        let config = OuterNewtonConfig::default();
        let out = damped_newton(
            DVector::from_vec(vec![0.0, 0.0]),
            residual,
            &[1e-4, 1e-4],
            &open_bounds(2),
            0.5,
            &config,
        );
        assert!(matches!(
            out,
            NewtonOutcome::Stalled {
                reason: StallReason::SingularJacobian,
                ..
            }
        ));
    }

    #[test]
    fn trial_errors_stall() {
        let residual = |x: &DVector<f64>| -> BoundaryResult<DVector<f64>> {
            if x[0] > 1.5 {
                Err(BoundaryError::InvalidArg { what: "probe" })
            } else {
                Ok(DVector::from_element(1, x[0] - 3.0))
            }
        };
        let config = OuterNewtonConfig::default();
        let out = damped_newton(
            DVector::from_element(1, 1.0),
            residual,
            &[1e-6],
            &open_bounds(1),
            0.5,
            &config,
        );
        assert!(matches!(
            out,
            NewtonOutcome::Stalled {
                reason: StallReason::Trial(_),
                ..
            }
        ));
    }
}
