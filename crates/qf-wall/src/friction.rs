//! Moody-chart friction factor.

use crate::common::{check_finite, check_positive};
use crate::error::{WallError, WallResult};
use std::f64::consts::LN_10;

/// Newton damping factor of the Colebrook–White inversion.
const OMEGA: f64 = 0.9;

const TOL: f64 = 1e-9;

pub const MAX_ITERATIONS: usize = 100;

/// Transition Reynolds number below which the laminar law applies.
pub const RE_LAMINAR: f64 = 2300.0;

/// Fanning friction coefficient `c_f = τ_w / (½ρu²)` of a duct.
///
/// Laminar flow gives `16/Re`. Turbulent flow solves Colebrook–White
///
/// ```text
/// 1/√f_D = −2 log₁₀( k/(3.7 D_h) + 2.51/(Re √f_D) )
/// ```
///
/// for `x = 1/√f_D` by damped Newton and returns `f_D/4`.
pub fn cf_moody(re: f64, d_h: f64, roughness: f64) -> WallResult<f64> {
    check_positive(re, "Reynolds number")?;
    check_positive(d_h, "hydraulic diameter")?;
    if check_finite(roughness, "roughness")? < 0.0 {
        return Err(WallError::InvalidArg {
            what: "roughness must be non-negative",
        });
    }
    if re < RE_LAMINAR {
        return Ok(16.0 / re);
    }

    let rel = roughness / (3.7 * d_h);
    let a = 2.51 / re;
    // Haaland start
    let mut x = -1.8 * ((roughness / d_h / 3.7).powf(1.11) + 6.9 / re).log10();
    for _ in 0..MAX_ITERATIONS {
        let arg = rel + a * x;
        let residual = x + 2.0 * arg.log10();
        let slope = 1.0 + 2.0 * a / (arg * LN_10);
        let dx = -OMEGA * residual / slope;
        x += dx;
        if dx.abs() < TOL * x.abs() {
            return Ok(0.25 / (x * x));
        }
    }
    Err(WallError::TooManyIterations {
        what: "Colebrook-White friction factor",
        iterations: MAX_ITERATIONS,
        state: format!("Re={re}, D_h={d_h} m, k={roughness} m, 1/sqrt(f)={x}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rough_turbulent_pipe() {
        let cf = cf_moody(1e6, 0.05, 1e-5).unwrap();
        assert!((cf - 3.671e-3).abs() < 1e-5, "cf = {cf}");
    }

    #[test]
    fn smooth_pipe_matches_blasius_range() {
        // Blasius: c_f = 0.079 Re^-0.25
        let cf = cf_moody(2e4, 0.01, 0.0).unwrap();
        assert_relative_eq!(cf, 0.079 * 2e4f64.powf(-0.25), max_relative = 0.05);
    }

    #[test]
    fn laminar_branch() {
        assert_relative_eq!(cf_moody(1000.0, 0.01, 1e-5).unwrap(), 0.016);
    }

    #[test]
    fn roughness_raises_friction() {
        let smooth = cf_moody(1e5, 0.01, 0.0).unwrap();
        let rough = cf_moody(1e5, 0.01, 1e-4).unwrap();
        assert!(rough > smooth);
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(cf_moody(-1.0, 0.01, 0.0).is_err());
        assert!(cf_moody(1e5, 0.0, 0.0).is_err());
        assert!(cf_moody(1e5, 0.01, -1e-6).is_err());
    }
}
