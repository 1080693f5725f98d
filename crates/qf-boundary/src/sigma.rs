//! Reynolds-analogy factor `σ` and recovery factor `r`.

use crate::quadrature::cumulative;
use tracing::warn;

/// Physical band for `σ` and `r`; values outside trigger the fallback.
pub const SIGMA_RECOVERY_LIMIT: f64 = 20.0;

/// Floor of `τ/τ_w` inside the `σ₁` integrand.
const TAU_FLOOR: f64 = 1e-6;

/// Analogy factor and recovery factor of one wall solve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SigmaRecovery {
    pub sigma: f64,
    pub r: f64,
    /// The Prandtl power-law substitute was used.
    pub fallback: bool,
}

impl SigmaRecovery {
    /// `r = Pr^{1/3}`, `σ = r²`.
    pub fn fallback(pr: f64) -> Self {
        let r = pr.cbrt();
        Self {
            sigma: r * r,
            r,
            fallback: true,
        }
    }

    fn in_band(&self) -> bool {
        self.sigma.is_finite()
            && self.r.is_finite()
            && self.sigma.abs() <= SIGMA_RECOVERY_LIMIT
            && self.r.abs() <= SIGMA_RECOVERY_LIMIT
    }
}

/// Petukhov closed form with `r = Pr^{1/3}` and
/// `σ = (1 + 13.6 c_f) + (11.7 + 1.8/r)(r² − 1)√(c_f/2)`.
pub fn petukhov(pr: f64, c_f: f64) -> SigmaRecovery {
    let r = pr.cbrt();
    let sigma = (1.0 + 13.6 * c_f) + (11.7 + 1.8 / r) * (r * r - 1.0) * (0.5 * c_f).sqrt();
    SigmaRecovery {
        sigma,
        r,
        fallback: false,
    }
}

/// Profile columns consumed by [`van_driest`].
pub struct ProfileSlice<'a> {
    pub y: &'a [f64],
    pub du_dy: &'a [f64],
    pub tau: &'a [f64],
    pub dtau_dy: &'a [f64],
    /// Effective Prandtl number `(μ+μ_T)c_p/(λ+λ_T)`
    pub pr: &'a [f64],
}

/// Profile integrals of van Driest:
///
/// ```text
/// σ₁(y) = ∫₀^y (1 − Pr) τ'/τ dy
/// σ     = ∫ Pr e^{−σ₁} du / û
/// r     = (2/û²) ∫ Pr e^{−σ₁} (∫₀^u e^{σ₁} du) du
/// ```
///
/// Falls back to [`SigmaRecovery::fallback`] at `pr_wall` when either
/// result leaves `[-20, 20]`.
pub fn van_driest(p: &ProfileSlice<'_>, u_center: f64, tau_wall: f64, pr_wall: f64) -> SigmaRecovery {
    let floor = TAU_FLOOR * tau_wall.abs();
    let f1: Vec<f64> = p
        .pr
        .iter()
        .zip(p.dtau_dy)
        .zip(p.tau)
        .map(|((pr, dt), t)| (1.0 - pr) * dt / t.abs().max(floor))
        .collect();
    let sigma_1 = cumulative(p.y, &f1);

    let g: Vec<f64> = sigma_1.iter().zip(p.du_dy).map(|(s, du)| s.exp() * du).collect();
    let inner = cumulative(p.y, &g);

    let weight: Vec<f64> = p
        .pr
        .iter()
        .zip(&sigma_1)
        .zip(p.du_dy)
        .map(|((pr, s), du)| pr * (-s).exp() * du)
        .collect();
    let s_int = cumulative(p.y, &weight);
    let rw: Vec<f64> = weight.iter().zip(&inner).map(|(w, i)| w * i).collect();
    let r_int = cumulative(p.y, &rw);

    let n = p.y.len();
    let out = SigmaRecovery {
        sigma: s_int[n - 1] / u_center,
        r: 2.0 * r_int[n - 1] / (u_center * u_center),
        fallback: false,
    };
    if out.in_band() {
        out
    } else {
        warn!(
            sigma = out.sigma,
            r = out.r,
            pr_wall,
            "sigma/recovery integrals out of band; using Prandtl power law"
        );
        SigmaRecovery::fallback(pr_wall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn petukhov_unit_prandtl() {
        let sr = petukhov(1.0, 4e-3);
        assert_relative_eq!(sr.r, 1.0);
        assert_relative_eq!(sr.sigma, 1.0 + 13.6 * 4e-3, max_relative = 1e-14);
    }

    #[test]
    fn petukhov_air() {
        let sr = petukhov(0.71, 4e-3);
        assert!(sr.r < 1.0 && sr.sigma < 1.0, "{sr:?}");
        assert!(sr.sigma > 0.7);
    }

    fn linear_profile(pr: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        // u = 10 y on [0, 1], τ = 1 − y
        let y: Vec<f64> = (0..=20).map(|k| k as f64 / 20.0).collect();
        let du = vec![10.0; y.len()];
        let tau: Vec<f64> = y.iter().map(|v| 1.0 - v).collect();
        let dtau = vec![-1.0; y.len()];
        let prs = vec![pr; y.len()];
        (y, du, tau, dtau, prs)
    }

    #[test]
    fn van_driest_unit_prandtl() {
        let (y, du, tau, dtau, pr) = linear_profile(1.0);
        let p = ProfileSlice {
            y: &y,
            du_dy: &du,
            tau: &tau,
            dtau_dy: &dtau,
            pr: &pr,
        };
        let sr = van_driest(&p, 10.0, 1.0, 1.0);
        assert!(!sr.fallback);
        assert_relative_eq!(sr.sigma, 1.0, max_relative = 1e-12);
        assert_relative_eq!(sr.r, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn van_driest_out_of_band_falls_back() {
        let (y, du, tau, dtau, pr) = linear_profile(1.0);
        let p = ProfileSlice {
            y: &y,
            du_dy: &du,
            tau: &tau,
            dtau_dy: &dtau,
            pr: &pr,
        };
        // centre velocity inconsistent with the profile: σ = 100
        let sr = van_driest(&p, 0.1, 1.0, 0.7);
        assert!(sr.fallback);
        assert_relative_eq!(sr.r, 0.7f64.cbrt());
        assert_relative_eq!(sr.sigma, sr.r * sr.r);
    }
}
