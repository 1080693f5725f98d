//! Turbulent Prandtl number.

use qf_core::constants::PR_T_INF;

/// Model constant `C` of the Kays–Crawford correlation.
const KC_C: f64 = 0.3;

/// Kays–Crawford turbulent Prandtl number.
///
/// With the turbulent Péclet number `Pe_t = (μ_T/μ)·Pr`:
///
/// ```text
/// 1/Pr_T = 1/(2 Pr_T∞) + C Pe_t/√Pr_T∞ − (C Pe_t)² [1 − exp(−1/(C Pe_t √Pr_T∞))]
/// ```
///
/// `Pr_T → 2 Pr_T∞` at the wall and `→ Pr_T∞` far from it.
pub fn kays_crawford(pr: f64, mu: f64, mu_t: f64, pr_t_inf: f64) -> f64 {
    let c_pe = KC_C * (mu_t / mu) * pr;
    if c_pe <= 0.0 {
        return 2.0 * pr_t_inf;
    }
    let root = pr_t_inf.sqrt();
    let inv = 0.5 / pr_t_inf + c_pe / root - c_pe * c_pe * (1.0 - (-1.0 / (c_pe * root)).exp());
    1.0 / inv
}

/// [`kays_crawford`] with the default far-field value `Pr_T∞ = 0.85`.
pub fn kays_crawford_default(pr: f64, mu: f64, mu_t: f64) -> f64 {
    kays_crawford(pr, mu, mu_t, PR_T_INF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn wall_limit() {
        assert_relative_eq!(kays_crawford_default(0.72, 2e-5, 0.0), 1.7, max_relative = 1e-14);
    }

    #[test]
    fn far_field_limit() {
        let pr_t = kays_crawford_default(0.72, 2e-5, 100.0 * 2e-5);
        assert!((pr_t - 0.85).abs() < 0.02, "Pr_T = {pr_t}");
    }

    #[test]
    fn decreases_away_from_wall() {
        let mut prev = f64::INFINITY;
        for ratio in [0.0, 0.1, 1.0, 10.0, 100.0] {
            let pr_t = kays_crawford_default(0.72, 1.0, ratio);
            assert!(pr_t < prev);
            prev = pr_t;
        }
    }
}
