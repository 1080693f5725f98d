//! Rate laws and elementary reactions.
//!
//! Units are SI with amounts in kmol: concentrations in kmol/m³, activation
//! energies in J/kmol, rates of progress in kmol/(m³ s).

use qf_core::constants::{CAL_TO_J, P_REF, R_UNIVERSAL};
use std::f64::consts::LN_10;

/// `(cm³/mol)` to `(m³/kmol)`.
const CM3_PER_MOL: f64 = 1e-3;

/// `k = A T^b exp(−E_a / (R_m T))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrhenius {
    pub a: f64,
    pub b: f64,
    pub ea: f64,
}

impl Arrhenius {
    /// From mol/cm³/s and cal/mol inputs for a rate of overall `order`.
    pub fn from_chemkin(a: f64, b: f64, ea_cal: f64, order: f64) -> Self {
        Self {
            a: a * CM3_PER_MOL.powf(order - 1.0),
            b,
            ea: ea_cal * CAL_TO_J * 1e3,
        }
    }

    pub fn rate(&self, t: f64) -> f64 {
        self.a * t.powf(self.b) * (-self.ea / (R_UNIVERSAL * t)).exp()
    }

    /// `d ln k / dT = b/T + E_a/(R_m T²)`.
    pub fn dln_rate_dt(&self, t: f64) -> f64 {
        self.b / t + self.ea / (R_UNIVERSAL * t * t)
    }
}

/// Troe broadening parameters `(α, T***, T*, T**)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Troe {
    pub alpha: f64,
    pub t3: f64,
    pub t1: f64,
    pub t2: Option<f64>,
}

impl Troe {
    /// `F_c(T)`.
    pub fn center(&self, t: f64) -> f64 {
        let mut fc = (1.0 - self.alpha) * (-t / self.t3).exp() + self.alpha * (-t / self.t1).exp();
        if let Some(t2) = self.t2 {
            fc += (-t2 / t).exp();
        }
        fc
    }

    /// `dF_c/dT`.
    pub fn center_slope(&self, t: f64) -> f64 {
        let mut slope =
            -(1.0 - self.alpha) / self.t3 * (-t / self.t3).exp() - self.alpha / self.t1 * (-t / self.t1).exp();
        if let Some(t2) = self.t2 {
            slope += t2 / (t * t) * (-t2 / t).exp();
        }
        slope
    }

    /// Broadening factor `F` at reduced pressure `pr`.
    pub fn broadening(&self, t: f64, pr: f64) -> f64 {
        self.broadening_partials(t, pr).0
    }

    /// `(F, ∂ln F/∂log₁₀ P_r, ∂ln F/∂T)` at reduced pressure `pr`.
    pub fn broadening_partials(&self, t: f64, pr: f64) -> (f64, f64, f64) {
        let fc = self.center(t).max(f64::MIN_POSITIVE);
        let log_fc = fc.ln() / LN_10;
        let dlog_fc = self.center_slope(t) / (fc * LN_10);
        let log_pr = pr.max(f64::MIN_POSITIVE).ln() / LN_10;
        let c = -0.4 - 0.67 * log_fc;
        let n = 0.75 - 1.27 * log_fc;
        let s = log_pr + c;
        let den = n - 0.14 * s;
        let f1 = s / den;
        let w = 1.0 / (1.0 + f1 * f1);
        let ln_f = LN_10 * log_fc * w;

        // ln F = ln10 log F_c w(f1), dw/df1 = −2 f1 w²
        let dw = -2.0 * f1 * w * w;
        let df1_dlog_pr = n / (den * den);
        let d_lnf_dlog_pr = LN_10 * log_fc * dw * df1_dlog_pr;
        let ds_dt = -0.67 * dlog_fc;
        let dden_dt = -1.27 * dlog_fc - 0.14 * ds_dt;
        let df1_dt = (ds_dt * den - s * dden_dt) / (den * den);
        let d_lnf_dt = LN_10 * (dlog_fc * w + log_fc * dw * df1_dt);
        (ln_f.exp(), d_lnf_dlog_pr, d_lnf_dt)
    }
}

/// Rate constant with its partials at fixed third-body concentration and
/// fixed temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSlopes {
    pub k: f64,
    /// `∂k/∂T` at constant `C_m`
    pub dk_dt: f64,
    /// `∂k/∂C_m` at constant `T`
    pub dk_dcm: f64,
}

/// Forward rate constant `k₁(T)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateLaw {
    Arrhenius(Arrhenius),
    /// `k = k_∞ X/(1+X)`, `X = k₀ C_m / k_∞`
    Lindemann { high: Arrhenius, low: Arrhenius },
    /// Lindemann times the Troe broadening factor
    Troe { high: Arrhenius, low: Arrhenius, troe: Troe },
    /// Sum of two Arrhenius expressions
    Duplicate(Arrhenius, Arrhenius),
}

impl RateLaw {
    pub fn is_falloff(&self) -> bool {
        matches!(self, RateLaw::Lindemann { .. } | RateLaw::Troe { .. })
    }

    /// `k₁` at temperature `t` and third-body concentration `c_m`.
    pub fn forward(&self, t: f64, c_m: f64) -> f64 {
        match self {
            RateLaw::Arrhenius(k) => k.rate(t),
            RateLaw::Lindemann { high, low } => falloff(high, low, t, c_m, None),
            RateLaw::Troe { high, low, troe } => falloff(high, low, t, c_m, Some(troe)),
            RateLaw::Duplicate(a, b) => a.rate(t) + b.rate(t),
        }
    }

    /// `k₁` with `∂k₁/∂T` and `∂k₁/∂C_m`.
    pub fn forward_slopes(&self, t: f64, c_m: f64) -> RateSlopes {
        match self {
            RateLaw::Arrhenius(a) => {
                let k = a.rate(t);
                RateSlopes {
                    k,
                    dk_dt: k * a.dln_rate_dt(t),
                    dk_dcm: 0.0,
                }
            }
            RateLaw::Duplicate(a, b) => {
                let (ka, kb) = (a.rate(t), b.rate(t));
                RateSlopes {
                    k: ka + kb,
                    dk_dt: ka * a.dln_rate_dt(t) + kb * b.dln_rate_dt(t),
                    dk_dcm: 0.0,
                }
            }
            RateLaw::Lindemann { high, low } => falloff_slopes(high, low, t, c_m, None),
            RateLaw::Troe { high, low, troe } => falloff_slopes(high, low, t, c_m, Some(troe)),
        }
    }
}

fn falloff(high: &Arrhenius, low: &Arrhenius, t: f64, c_m: f64, troe: Option<&Troe>) -> f64 {
    let k_inf = high.rate(t);
    if k_inf <= 0.0 {
        return 0.0;
    }
    let x = low.rate(t) * c_m / k_inf;
    let f = troe.map_or(1.0, |tr| tr.broadening(t, x));
    k_inf * x / (1.0 + x) * f
}

/// `k = k_∞ X/(1+X) F(T, X)` differentiated through `X = k₀ C_m / k_∞`.
fn falloff_slopes(high: &Arrhenius, low: &Arrhenius, t: f64, c_m: f64, troe: Option<&Troe>) -> RateSlopes {
    let k_inf = high.rate(t);
    if k_inf <= 0.0 {
        return RateSlopes {
            k: 0.0,
            dk_dt: 0.0,
            dk_dcm: 0.0,
        };
    }
    let k0 = low.rate(t);
    let x = k0 * c_m / k_inf;
    let (f, dlnf_dlog_pr, dlnf_dt) = troe.map_or((1.0, 0.0, 0.0), |tr| tr.broadening_partials(t, x));
    let blend = k_inf * x / (1.0 + x);
    let k = blend * f;

    // blend · ∂ln F/∂X is finite as X → 0
    let dk_dx = f * (k_inf / ((1.0 + x) * (1.0 + x)) + k_inf / (1.0 + x) * dlnf_dlog_pr / LN_10);
    let dx_dt = x * (low.dln_rate_dt(t) - high.dln_rate_dt(t));
    RateSlopes {
        k,
        dk_dt: k * (high.dln_rate_dt(t) + dlnf_dt) + dk_dx * dx_dt,
        dk_dcm: dk_dx * k0 / k_inf,
    }
}

/// Collision partner of a third-body or fall-off reaction.
#[derive(Debug, Clone, PartialEq)]
pub enum ThirdBody {
    /// `C_m = Σ w_j c_j`, unit efficiency unless listed
    Mixture { efficiencies: Vec<(usize, f64)> },
    /// A single named species, as in `(+AR)`
    Species(usize),
}

impl ThirdBody {
    /// `∂C_m/∂c_i` for every species.
    pub fn weights(&self, n: usize) -> Vec<f64> {
        match self {
            ThirdBody::Mixture { efficiencies } => {
                let mut w = vec![1.0; n];
                for (i, e) in efficiencies {
                    w[*i] += e - 1.0;
                }
                w
            }
            ThirdBody::Species(i) => {
                let mut w = vec![0.0; n];
                w[*i] = 1.0;
                w
            }
        }
    }

    pub fn concentration(&self, c: &[f64]) -> f64 {
        match self {
            ThirdBody::Mixture { efficiencies } => {
                let total: f64 = c.iter().sum();
                total + efficiencies.iter().map(|(i, w)| (w - 1.0) * c[*i]).sum::<f64>()
            }
            ThirdBody::Species(i) => c[*i],
        }
    }
}

/// Elementary reaction over the species of its mechanism.
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    /// Canonical equation text
    pub equation: String,
    /// Source line of the reaction
    pub line: usize,
    pub reactants: Vec<(usize, f64)>,
    pub products: Vec<(usize, f64)>,
    pub rate: RateLaw,
    pub third_body: Option<ThirdBody>,
    pub reversible: bool,
    pub active: bool,
}

impl Reaction {
    /// `Σν_e`.
    pub fn reactant_order(&self) -> f64 {
        self.reactants.iter().map(|(_, nu)| nu).sum()
    }

    /// `Σν_p − Σν_e`.
    pub fn delta_nu(&self) -> f64 {
        self.products.iter().map(|(_, nu)| nu).sum::<f64>() - self.reactant_order()
    }

    /// Net stoichiometric coefficient of species `k`.
    pub fn net_coefficient(&self, k: usize) -> f64 {
        let side = |list: &[(usize, f64)]| list.iter().filter(|(i, _)| *i == k).map(|(_, nu)| nu).sum::<f64>();
        side(&self.products) - side(&self.reactants)
    }

    /// `k₂/k₁ = (p_ref/(R_m T))^{ν_e − ν_p} · exp(ΔG/(R_m T))`; `g_rt`
    /// holds the standard-state `g°/(R_m T)` of each mechanism species.
    pub fn reverse_ratio(&self, t: f64, g_rt: &[f64]) -> f64 {
        let side = |list: &[(usize, f64)]| list.iter().map(|(i, nu)| nu * g_rt[*i]).sum::<f64>();
        let dg_rt = side(&self.products) - side(&self.reactants);
        (P_REF / (R_UNIVERSAL * t)).powf(-self.delta_nu()) * dg_rt.exp()
    }

    /// Rate of progress with its partials. `h_rt` holds `h°/(R_m T)` of
    /// each mechanism species, giving `d(g°/R_m T)/dT = −h°/(R_m T²)`.
    pub fn progress_partials(&self, t: f64, c: &[f64], g_rt: &[f64], h_rt: &[f64]) -> Progress {
        let n = c.len();
        let (c_m, weights) = match &self.third_body {
            Some(tb) => (tb.concentration(c), tb.weights(n)),
            None => (1.0, vec![0.0; n]),
        };
        let k1 = self.rate.forward_slopes(t, c_m);
        let (scale, dscale_dcm) = if self.rate.is_falloff() { (1.0, 0.0) } else { (c_m, 1.0) };

        let (psi1, dpsi1) = mass_action(&self.reactants, c);
        let mut q = k1.k * scale * psi1;
        let mut dq_dt = k1.dk_dt * scale * psi1;
        let mut dq_dcm = (k1.dk_dcm * scale + k1.k * dscale_dcm) * psi1;
        let mut dq_dc = vec![0.0; n];
        for (i, d) in dpsi1 {
            dq_dc[i] += k1.k * scale * d;
        }

        if self.reversible {
            let ratio = self.reverse_ratio(t, g_rt);
            let side = |list: &[(usize, f64)]| list.iter().map(|(i, nu)| nu * h_rt[*i]).sum::<f64>();
            let dln_ratio_dt = (self.delta_nu() - (side(&self.products) - side(&self.reactants))) / t;
            let k2 = k1.k * ratio;
            let dk2_dt = k1.dk_dt * ratio + k2 * dln_ratio_dt;
            let (psi2, dpsi2) = mass_action(&self.products, c);
            q -= k2 * scale * psi2;
            dq_dt -= dk2_dt * scale * psi2;
            dq_dcm -= (k1.dk_dcm * ratio * scale + k2 * dscale_dcm) * psi2;
            for (i, d) in dpsi2 {
                dq_dc[i] -= k2 * scale * d;
            }
        }
        if dq_dcm != 0.0 {
            for (d, w) in dq_dc.iter_mut().zip(&weights) {
                *d += dq_dcm * w;
            }
        }
        Progress { q, dq_dt, dq_dc }
    }

    /// Net rate of progress `k₁Ψ₁ − k₂Ψ₂` for concentrations `c`.
    pub fn progress(&self, t: f64, c: &[f64], g_rt: &[f64]) -> f64 {
        let c_m = self.third_body.as_ref().map_or(1.0, |tb| tb.concentration(c));
        let k1 = self.rate.forward(t, c_m);
        // fall-off reactions carry C_m inside k₁
        let scale = if self.rate.is_falloff() { 1.0 } else { c_m };
        let product = |list: &[(usize, f64)]| {
            list.iter()
                .map(|(i, nu)| c[*i].max(0.0).powf(*nu))
                .product::<f64>()
        };
        let forward = k1 * scale * product(&self.reactants);
        if !self.reversible {
            return forward;
        }
        let k2 = k1 * self.reverse_ratio(t, g_rt);
        forward - k2 * scale * product(&self.products)
    }
}

/// Rate of progress `q` [kmol/(m³ s)] with `∂q/∂T` at constant
/// concentrations and `∂q/∂c_i` at constant temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub q: f64,
    pub dq_dt: f64,
    pub dq_dc: Vec<f64>,
}

/// `Ψ = Π c_i^{ν_i}` over one side, with its non-zero partials.
fn mass_action(side: &[(usize, f64)], c: &[f64]) -> (f64, Vec<(usize, f64)>) {
    let factors: Vec<f64> = side.iter().map(|(i, nu)| c[*i].max(0.0).powf(*nu)).collect();
    let psi: f64 = factors.iter().product();
    let partials = side
        .iter()
        .enumerate()
        .filter_map(|(e, (i, nu))| {
            let ci = c[*i].max(0.0);
            if ci == 0.0 && *nu < 1.0 {
                return None;
            }
            let others: f64 = factors
                .iter()
                .enumerate()
                .filter(|(f, _)| *f != e)
                .map(|(_, v)| v)
                .product();
            Some((*i, nu * ci.powf(nu - 1.0) * others))
        })
        .collect();
    (psi, partials)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn troe_broadening_between_center_and_one(
            alpha in 0.1f64..0.9,
            t3 in 10.0f64..1000.0,
            t1 in 1000.0f64..1e5,
            t in 300.0f64..3000.0,
            log_pr in -6.0f64..6.0,
        ) {
            let troe = Troe { alpha, t3, t1, t2: None };
            let fc = troe.center(t);
            let f = troe.broadening(t, 10f64.powf(log_pr));
            prop_assert!(f <= 1.0 + 1e-12);
            prop_assert!(f >= fc * (1.0 - 1e-12));
        }

        #[test]
        fn unit_efficiencies_count_every_molecule(c in proptest::collection::vec(0.0f64..10.0, 1..8)) {
            let listed = ThirdBody::Mixture { efficiencies: vec![(0, 1.0)] };
            let total: f64 = c.iter().sum();
            prop_assert!((listed.concentration(&c) - total).abs() <= 1e-12 * total.max(1.0));
        }
    }
}
