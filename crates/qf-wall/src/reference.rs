//! Eckert reference-temperature correlation.

use crate::common::check_positive;
use crate::error::WallResult;
use qf_fluids::Mixture;

/// Recovery factor `r = Pr^{1/3}` of a turbulent boundary layer.
pub fn turbulent_recovery_factor(pr: f64) -> f64 {
    pr.cbrt()
}

/// Eckert reference temperature between wall and bulk stream.
///
/// ```text
/// T* = ½(T_w + T_m) + 0.22 · r u_m²/(2 c_p)
/// ```
///
/// with `r = Pr_m^{1/3}` evaluated at the bulk state. With `use_h` the
/// blend is formed on enthalpies, `h* = ½(h_w + h_m) + 0.22 r u_m²/2`, and
/// `T*` follows from inverting `h(T, p)`.
pub fn reference_temperature(
    gas: &Mixture,
    t_m: f64,
    p: f64,
    u_m: f64,
    t_w: f64,
    use_h: bool,
) -> WallResult<f64> {
    check_positive(t_m, "bulk temperature")?;
    check_positive(t_w, "wall temperature")?;
    let bulk = gas.properties(t_m, p)?;
    let r = turbulent_recovery_factor(bulk.prandtl());
    let dyn_rise = 0.22 * r * 0.5 * u_m * u_m;
    if use_h {
        let h_w = gas.enthalpy(t_w, p)?;
        let h_ref = 0.5 * (h_w + bulk.caloric.h) + dyn_rise;
        Ok(gas.t_from_h_near(h_ref, p, 0.5 * (t_w + t_m))?)
    } else {
        Ok(0.5 * (t_w + t_m) + dyn_rise / bulk.caloric.cp)
    }
}
