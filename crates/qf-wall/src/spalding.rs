//! Spalding's law of the wall.
//!
//! A single formula `y⁺(f⁺)` spanning viscous sublayer, buffer layer and log
//! region. The inverse `f⁺(y⁺)` has no closed form and is found by Newton
//! iteration.

use crate::error::{WallError, WallResult};

/// Newton damping factor for the inversion.
const OMEGA: f64 = 0.99;

/// Absolute tolerance on the Newton correction.
const TOL: f64 = 2e-11;

pub const MAX_ITERATIONS: usize = 100;

/// `E = exp(-κ B)` of the log law `u⁺ = ln(y⁺)/κ + B`.
#[inline]
pub fn spalding_e(b: f64, kappa: f64) -> f64 {
    (-kappa * b).exp()
}

/// `y⁺` of the velocity `f = u⁺`.
pub fn spalding_y(_b: f64, kappa: f64, e: f64, f: f64) -> f64 {
    let kf = kappa * f;
    f + e * (kf.exp() - 1.0 - kf - kf * kf / 2.0 - kf.powi(3) / 6.0 - kf.powi(4) / 24.0)
}

/// `dy⁺/df` of [`spalding_y`]. Positive everywhere.
pub fn spalding_dydf(_b: f64, kappa: f64, e: f64, f: f64) -> f64 {
    let k2 = kappa * kappa;
    1.0 + e
        * (kappa * (kappa * f).exp()
            - kappa
            - k2 * f
            - k2 * kappa * f * f / 2.0
            - k2 * k2 * f.powi(3) / 6.0)
}

/// Invert Spalding's law: the `u⁺` whose [`spalding_y`] equals `y_plus`.
///
/// `seed` is used as the Newton start when given; otherwise the start is
/// `y⁺` in the viscous region and the log law above `y⁺ = 10`.
pub fn spalding(b: f64, kappa: f64, e: f64, y_plus: f64, seed: Option<f64>) -> WallResult<f64> {
    if !y_plus.is_finite() || y_plus < 0.0 {
        return Err(WallError::InvalidArg {
            what: "y+ must be finite and non-negative",
        });
    }
    if y_plus == 0.0 {
        return Ok(0.0);
    }
    let mut f = match seed {
        Some(f0) if f0.is_finite() && f0 > 0.0 => f0,
        _ if y_plus < 10.0 => y_plus,
        _ => y_plus.ln() / kappa + b,
    };
    for _ in 0..MAX_ITERATIONS {
        let residual = spalding_y(b, kappa, e, f) - y_plus;
        let df = -OMEGA * residual / spalding_dydf(b, kappa, e, f);
        f += df;
        if df.abs() < TOL {
            return Ok(f);
        }
    }
    Err(WallError::TooManyIterations {
        what: "Spalding inversion",
        iterations: MAX_ITERATIONS,
        state: format!("y+={y_plus}, B={b}, f={f}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qf_core::constants::{B_PLUS_SMOOTH, KARMAN};

    #[test]
    fn self_consistent_across_regions() {
        let (b, kappa) = (B_PLUS_SMOOTH, KARMAN);
        let e = spalding_e(b, kappa);
        for y_plus in [0.5, 5.0, 30.0, 100.0, 500.0] {
            let f = spalding(b, kappa, e, y_plus, None).unwrap();
            assert!((spalding_y(b, kappa, e, f) - y_plus).abs() < 1e-9, "y+ = {y_plus}");
            assert!(spalding_dydf(b, kappa, e, f) > 0.0);
        }
    }

    #[test]
    fn viscous_and_log_limits() {
        let (b, kappa) = (B_PLUS_SMOOTH, KARMAN);
        let e = spalding_e(b, kappa);
        assert_relative_eq!(spalding(b, kappa, e, 0.1, None).unwrap(), 0.1, max_relative = 1e-3);
        let f = spalding(b, kappa, e, 1e4, None).unwrap();
        assert_relative_eq!(f, (1e4f64).ln() / kappa + b, max_relative = 2e-3);
        assert_eq!(spalding(b, kappa, e, 0.0, None).unwrap(), 0.0);
    }

    #[test]
    fn derivative_matches_difference() {
        let (b, kappa) = (B_PLUS_SMOOTH, KARMAN);
        let e = spalding_e(b, kappa);
        for f in [0.5, 8.0, 15.0, 25.0] {
            let h = 1e-6;
            let fd = (spalding_y(b, kappa, e, f + h) - spalding_y(b, kappa, e, f - h)) / (2.0 * h);
            assert_relative_eq!(spalding_dydf(b, kappa, e, f), fd, max_relative = 1e-7);
        }
    }

    #[test]
    fn seed_does_not_change_result() {
        let (b, kappa) = (3.2, KARMAN);
        let e = spalding_e(b, kappa);
        let a = spalding(b, kappa, e, 42.0, None).unwrap();
        let s = spalding(b, kappa, e, 42.0, Some(a * 1.3)).unwrap();
        assert_relative_eq!(a, s, max_relative = 1e-10);
    }

    #[test]
    fn rejects_negative_y_plus() {
        let e = spalding_e(B_PLUS_SMOOTH, KARMAN);
        assert!(spalding(B_PLUS_SMOOTH, KARMAN, e, -1.0, None).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use qf_core::constants::KARMAN;

    proptest! {
        #[test]
        fn inversion_round_trips(y_plus in 1e-3f64..2e3, b in 0.0f64..5.5) {
            let e = spalding_e(b, KARMAN);
            let f = spalding(b, KARMAN, e, y_plus, None).unwrap();
            prop_assert!((spalding_y(b, KARMAN, e, f) - y_plus).abs() < 1e-8 * y_plus.max(1.0));
        }
    }
}
