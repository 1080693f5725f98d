//! Closed-form wall-flux correlations: Eckert, Bartz, Pizzarelli and
//! Lebedinsky–Kalmykov.
//!
//! All of them work from the bulk state alone and return the same
//! [`WallFlux`] the profile solver produces. `q̇_w` is positive into the
//! wall.

use crate::error::{BoundaryError, BoundaryResult};
use crate::methods::PureMethane;
use crate::sigma::{SigmaRecovery, petukhov};
use qf_fluids::{FlowState, FluidError, Mixture};
use qf_wall::{cf_moody, reference_temperature};

/// Relative temperature step for the viscosity exponent of Bartz.
const VISCOSITY_EXPONENT_STEP: f64 = 0.01;

/// Iteration cap of the Lebedinsky–Kalmykov friction fixed point.
const LK_MAX_ITERATIONS: usize = 50;

/// Inputs shared by every correlation.
#[derive(Debug, Clone, Copy)]
pub struct WallInputs<'a> {
    pub gas: &'a Mixture,
    pub bulk: &'a FlowState,
    pub t_wall: f64,
    pub d_h: f64,
    /// Technical roughness `k_tech` [m]
    pub roughness: f64,
}

/// Wall fluxes of one wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallFlux {
    pub tau_wall: f64,
    pub q_wall: f64,
    pub h_wall: f64,
    pub h_recovery: f64,
    pub t_recovery: f64,
    /// `q̇_w/(T_r − T_w)`
    pub alpha: f64,
    pub sigma_recovery: SigmaRecovery,
}

impl WallInputs<'_> {
    fn p(&self) -> f64 {
        self.bulk.p
    }

    fn u(&self) -> BoundaryResult<f64> {
        let u = self.bulk.u.abs();
        if !(u > 0.0 && u.is_finite()) {
            return Err(BoundaryError::InvalidArg {
                what: "bulk velocity must be positive",
            });
        }
        Ok(u)
    }

    fn reynolds(&self) -> f64 {
        self.bulk.rho * self.bulk.u.abs() * self.d_h / self.bulk.mu
    }
}

/// Heat-transfer coefficient `q̇_w/(T_r − T_w)`, zero when the temperatures
/// coincide.
pub fn transfer_coefficient(q_wall: f64, t_recovery: f64, t_wall: f64) -> f64 {
    let dt = t_recovery - t_wall;
    if dt.abs() < 1e-9 * t_wall.abs().max(1.0) {
        0.0
    } else {
        q_wall / dt
    }
}

fn recovery_temperature(w: &WallInputs<'_>, h_recovery: f64) -> BoundaryResult<f64> {
    Ok(w.gas.t_from_h_near(h_recovery, w.p(), w.bulk.t)?)
}

/// Eckert reference-temperature method with the Moody friction factor.
pub fn eckert(w: &WallInputs<'_>) -> BoundaryResult<WallFlux> {
    let u = w.u()?;
    let p = w.p();
    let t_ref = reference_temperature(w.gas, w.bulk.t, p, u, w.t_wall, false)?;
    let star = w.gas.properties(t_ref, p)?;
    let rho_ref = star.caloric.rho();
    let re_ref = rho_ref * u * w.d_h / star.transport.mu;
    let c_f = cf_moody(re_ref, w.d_h, w.roughness)? * rho_ref / w.bulk.rho;
    let tau_wall = 0.5 * c_f * w.bulk.rho * u * u;

    let sr = petukhov(w.bulk.pr, c_f);
    let h_wall = w.gas.enthalpy(w.t_wall, p)?;
    let h_recovery = w.bulk.h + 0.5 * sr.r * u * u;
    let q_wall = tau_wall * (h_recovery - h_wall) / (sr.sigma * u);
    let t_recovery = recovery_temperature(w, h_recovery)?;
    Ok(WallFlux {
        tau_wall,
        q_wall,
        h_wall,
        h_recovery,
        t_recovery,
        alpha: transfer_coefficient(q_wall, t_recovery, w.t_wall),
        sigma_recovery: sr,
    })
}

/// Viscosity exponent `ω = d ln μ / d ln T` at the bulk temperature.
fn viscosity_exponent(gas: &Mixture, t: f64, p: f64) -> BoundaryResult<f64> {
    let (lo, hi) = (
        t * (1.0 - VISCOSITY_EXPONENT_STEP),
        t * (1.0 + VISCOSITY_EXPONENT_STEP),
    );
    let mu_lo = gas.transport(lo, p)?.mu;
    let mu_hi = gas.transport(hi, p)?.mu;
    Ok((mu_hi / mu_lo).ln() / (hi / lo).ln())
}

/// Bartz hot-gas correlation.
///
/// `geometry_factor` is `(D_t/r_c)^0.1`; the gas must be an ideal-gas
/// mixture.
pub fn bartz(w: &WallInputs<'_>, geometry_factor: Option<f64>) -> BoundaryResult<WallFlux> {
    if !w.gas.eos().is_ideal() {
        return Err(FluidError::InvalidMixture {
            what: "Bartz correlation requires an ideal-gas mixture",
        }
        .into());
    }
    let factor = geometry_factor.ok_or(BoundaryError::InvalidGeometry {
        what: "Bartz needs throat diameter and curvature radius",
    })?;
    let u = w.u()?;
    let p = w.p();
    let b = w.bulk;

    let sigma = b.pr.powf(0.6);
    let omega = viscosity_exponent(w.gas, b.t, p)?;
    let xi = (0.5 * w.t_wall / b.t + 0.5).powf(-(0.8 - 0.2 * omega))
        * (1.0 + 0.5 * (b.gamma - 1.0) * b.ma * b.ma).powf(-0.2 * omega);
    let alpha = 0.026 * b.cp / sigma * w.reynolds().powf(-0.2) * factor * b.rho * u * xi;

    let h_wall = w.gas.enthalpy(w.t_wall, p)?;
    let h_recovery = b.h + 0.5 * u * u;
    let t_recovery = recovery_temperature(w, h_recovery)?;
    let q_wall = alpha * (t_recovery - w.t_wall);
    let dh = h_recovery - h_wall;
    let tau_wall = if dh.abs() > 1e-9 * h_recovery.abs().max(1.0) {
        q_wall * sigma * u / dh
    } else {
        alpha * sigma * u / b.cp
    };
    Ok(WallFlux {
        tau_wall,
        q_wall,
        h_wall,
        h_recovery,
        t_recovery,
        alpha,
        sigma_recovery: SigmaRecovery {
            sigma,
            r: 1.0,
            fallback: false,
        },
    })
}

/// Fluxes of a correlation without recovery: `h_r = h_b`, `T_r = T_b`.
fn without_recovery(
    w: &WallInputs<'_>,
    stanton: f64,
    tau_wall: f64,
    h_wall: f64,
    sr: SigmaRecovery,
) -> WallFlux {
    let b = w.bulk;
    let q_wall = stanton * b.rho * b.u.abs() * (b.h - h_wall);
    WallFlux {
        tau_wall,
        q_wall,
        h_wall,
        h_recovery: b.h,
        t_recovery: b.t,
        alpha: transfer_coefficient(q_wall, b.t, w.t_wall),
        sigma_recovery: sr,
    }
}

/// Pizzarelli's supercritical-methane Nusselt correlation.
///
/// ```text
/// Nu = 0.0272 Re^0.8 Pr^0.34 (ρ_w/ρ_b)^0.3 (c̄_p/c_p,b)^0.35 (μ_w/μ_b)^−0.1
/// ```
///
/// with the integral-mean heat capacity `c̄_p = (h_w − h_b)/(T_w − T_b)`.
pub fn pizzarelli(w: &WallInputs<'_>) -> BoundaryResult<WallFlux> {
    PureMethane::check(w.gas)?;
    let u = w.u()?;
    let b = w.bulk;
    let wall = w.gas.properties(w.t_wall, b.p)?;
    let h_wall = wall.caloric.h;
    let cp_mean = if (w.t_wall - b.t).abs() > 1e-6 {
        (h_wall - b.h) / (w.t_wall - b.t)
    } else {
        b.cp
    };
    let re = w.reynolds();
    let nu = 0.0272
        * re.powf(0.8)
        * b.pr.powf(0.34)
        * (wall.caloric.rho() / b.rho).powf(0.3)
        * (cp_mean / b.cp).powf(0.35)
        * (wall.transport.mu / b.mu).powf(-0.1);
    let stanton = nu / (re * b.pr);
    let c_f = cf_moody(re, w.d_h, w.roughness)?;
    let tau_wall = 0.5 * c_f * b.rho * u * u;
    Ok(without_recovery(w, stanton, tau_wall, h_wall, petukhov(b.pr, c_f)))
}

/// Lebedinsky–Kalmykov methane correlation.
///
/// `Nu = 0.0185 Re^0.8 Pr^0.4 (T_b/T_w)^0.1`; the friction coefficient is
/// the fixed point of `c_f = 2 σ(c_f) St` with Petukhov's `σ`, started
/// from the Moody value.
pub fn lebedinsky_kalmykov(w: &WallInputs<'_>) -> BoundaryResult<WallFlux> {
    PureMethane::check(w.gas)?;
    let u = w.u()?;
    let b = w.bulk;
    let h_wall = w.gas.enthalpy(w.t_wall, b.p)?;
    let re = w.reynolds();
    let nu = 0.0185 * re.powf(0.8) * b.pr.powf(0.4) * (b.t / w.t_wall).powf(0.1);
    let stanton = nu / (re * b.pr);

    let mut c_f = cf_moody(re, w.d_h, w.roughness)?;
    for _ in 0..LK_MAX_ITERATIONS {
        let sr = petukhov(b.pr, c_f);
        let next = 2.0 * sr.sigma * stanton;
        if !(next.is_finite() && next > 0.0) {
            break;
        }
        let done = (next - c_f).abs() <= 1e-12 * next;
        c_f = next;
        if done {
            let tau_wall = 0.5 * c_f * b.rho * u * u;
            return Ok(without_recovery(w, stanton, tau_wall, h_wall, petukhov(b.pr, c_f)));
        }
    }
    Err(BoundaryError::TooManyIterations {
        what: "Lebedinsky-Kalmykov friction",
        iterations: LK_MAX_ITERATIONS,
        state: format!("T={} K, p={} Pa, u={} m/s, c_f={c_f}", b.t, b.p, b.u),
    })
}
