//! Soave–Redlich–Kwong cubic equation of state.
//!
//! One-fluid van der Waals mixing with the geometric-mean attraction term,
//! so that `a(T) = (Σ xᵢ √aᵢ)²`. Species without critical data (radicals)
//! contribute neither attraction nor covolume.

use crate::composition::Composition;
use crate::error::{FluidError, FluidResult};
use crate::ideal::ideal_parts;
use crate::model::{Caloric, EquationOfState, validation};
use qf_core::constants::R_UNIVERSAL;

/// SRK backend. Stateless.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Srk;

/// Mixture attraction `a` with its first two temperature derivatives and
/// the covolume `b`, all molar.
#[derive(Debug, Clone, Copy)]
struct Parameters {
    a: f64,
    da: f64,
    d2a: f64,
    b: f64,
}

fn parameters(comp: &Composition, t: f64) -> Parameters {
    let (mut q, mut dq, mut d2q, mut b) = (0.0, 0.0, 0.0, 0.0);
    for (sp, xk) in comp.species().iter().zip(comp.mole_fractions()) {
        let Some(crit) = sp.critical() else {
            continue;
        };
        let m = 0.480 + 1.574 * crit.omega - 0.176 * crit.omega * crit.omega;
        let sqrt_ac = (0.427_48 * R_UNIVERSAL * R_UNIVERSAL * crit.tc * crit.tc / crit.pc).sqrt();
        let s = (t / crit.tc).sqrt();
        q += xk * sqrt_ac * (1.0 + m * (1.0 - s));
        dq -= xk * sqrt_ac * m * s / (2.0 * t);
        d2q += xk * sqrt_ac * m * s / (4.0 * t * t);
        b += xk * 0.086_64 * R_UNIVERSAL * crit.tc / crit.pc;
    }
    Parameters {
        a: q * q,
        da: 2.0 * q * dq,
        d2a: 2.0 * (dq * dq + q * d2q),
        b,
    }
}

/// Real roots of `z³ + c2 z² + c1 z + c0`.
fn cubic_roots(c2: f64, c1: f64, c0: f64) -> Vec<f64> {
    let shift = c2 / 3.0;
    let p = c1 - c2 * c2 / 3.0;
    let q = 2.0 * c2 * c2 * c2 / 27.0 - c2 * c1 / 3.0 + c0;
    let disc = 0.25 * q * q + p * p * p / 27.0;

    let mut roots = if disc > 0.0 {
        let sq = disc.sqrt();
        vec![(-0.5 * q + sq).cbrt() + (-0.5 * q - sq).cbrt() - shift]
    } else if p == 0.0 {
        vec![-shift]
    } else {
        let r = 2.0 * (-p / 3.0).sqrt();
        let arg = (1.5 * q / p * (-3.0 / p).sqrt()).clamp(-1.0, 1.0);
        let phi = arg.acos() / 3.0;
        (0..3)
            .map(|k| r * (phi - 2.0 * std::f64::consts::PI * k as f64 / 3.0).cos() - shift)
            .collect()
    };

    // polish
    for z in roots.iter_mut() {
        for _ in 0..2 {
            let f = ((*z + c2) * *z + c1) * *z + c0;
            let df = (3.0 * *z + 2.0 * c2) * *z + c1;
            if df != 0.0 {
                *z -= f / df;
            }
        }
    }
    roots
}

/// Compressibility factor of the stable phase (lowest departure Gibbs energy).
fn stable_z(a_dimless: f64, b_dimless: f64) -> FluidResult<f64> {
    let roots = cubic_roots(
        -1.0,
        a_dimless - b_dimless - b_dimless * b_dimless,
        -a_dimless * b_dimless,
    );
    let gibbs = |z: f64| {
        z - 1.0 - (z - b_dimless).ln() - a_dimless / b_dimless * (1.0 + b_dimless / z).ln()
    };
    roots
        .into_iter()
        .filter(|z| z.is_finite() && *z > b_dimless)
        .min_by(|x, y| gibbs(*x).total_cmp(&gibbs(*y)))
        .ok_or(FluidError::NonPhysical {
            what: "SRK cubic has no root above the covolume",
        })
}

impl Srk {
    fn evaluate(&self, comp: &Composition, t: f64, p: f64) -> FluidResult<Caloric> {
        let ideal = ideal_parts(comp, t, p);
        let m = comp.molar_mass();
        let r = comp.gas_constant();
        let par = parameters(comp, t);
        if par.b <= 0.0 {
            let cv = ideal.cp - r;
            return Ok(Caloric {
                t,
                p,
                v: r * t / p,
                h: ideal.h,
                s: ideal.s,
                cp: ideal.cp,
                cv,
                dcp_dt: ideal.dcp_dt,
                c: (ideal.cp / cv * r * t).sqrt(),
                alpha: 1.0 / t,
                kappa: 1.0 / p,
                r,
                m,
            });
        }

        let rt = R_UNIVERSAL * t;
        let a_dimless = par.a * p / (rt * rt);
        let b_dimless = par.b * p / rt;
        let z = stable_z(a_dimless, b_dimless)?;
        let vm = z * rt / p;
        let log_term = (1.0 + b_dimless / z).ln();

        let h_dep = rt * (z - 1.0) + (t * par.da - par.a) / par.b * log_term;
        let s_dep = R_UNIVERSAL * (z - b_dimless).ln() + par.da / par.b * log_term;
        let cv_dep = t * par.d2a / par.b * log_term;

        let dp_dt = R_UNIVERSAL / (vm - par.b) - par.da / (vm * (vm + par.b));
        let vb = vm * (vm + par.b);
        let dp_dv = -rt / ((vm - par.b) * (vm - par.b)) + par.a * (2.0 * vm + par.b) / (vb * vb);
        if dp_dv >= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "SRK state is mechanically unstable",
            });
        }
        let kappa = -1.0 / (vm * dp_dv);
        let alpha = kappa * dp_dt;

        let cv_molar = ideal.cp * m - R_UNIVERSAL + cv_dep;
        let cp_molar = cv_molar + t * vm * alpha * alpha / kappa;
        let v = vm / m;
        let cp = cp_molar / m;
        let cv = cv_molar / m;

        Ok(Caloric {
            t,
            p,
            v,
            h: ideal.h + h_dep / m,
            s: ideal.s + s_dep / m,
            cp,
            cv,
            dcp_dt: 0.0,
            c: (cp / cv * v / kappa).sqrt(),
            alpha,
            kappa,
            r,
            m,
        })
    }
}

impl EquationOfState for Srk {
    fn name(&self) -> &str {
        "srk"
    }

    fn supports_composition(&self, _comp: &Composition) -> bool {
        true
    }

    fn caloric(&self, comp: &Composition, t: f64, p: f64) -> FluidResult<Caloric> {
        validation::validate_temperature(t)?;
        validation::validate_pressure(p)?;
        let mut caloric = self.evaluate(comp, t, p)?;
        let dt = 1e-4 * t;
        let cp_hi = self.evaluate(comp, t + dt, p)?.cp;
        let cp_lo = self.evaluate(comp, t - dt, p)?.cp;
        caloric.dcp_dt = (cp_hi - cp_lo) / (2.0 * dt);
        validation::validate_caloric(&caloric)?;
        Ok(caloric)
    }

    fn pressure(&self, comp: &Composition, v: f64, t: f64) -> FluidResult<f64> {
        validation::validate_volume(v)?;
        let par = parameters(comp, t);
        let vm = v * comp.molar_mass();
        if vm <= par.b {
            return Err(FluidError::NonPhysical {
                what: "specific volume below SRK covolume",
            });
        }
        Ok(R_UNIVERSAL * t / (vm - par.b) - par.a / (vm * (vm + par.b)))
    }
}
