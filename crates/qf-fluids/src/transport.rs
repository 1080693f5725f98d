//! Dilute-gas transport properties.
//!
//! Chapman–Enskog viscosity with the Neufeld collision integral, a modified
//! Eucken conductivity and Wilke's mixing rule.

use crate::composition::Composition;
use crate::ideal::species_cp;
use crate::model::Transport;
use crate::species::Species;
use qf_core::constants::R_UNIVERSAL;

/// Reduced collision integral `Ω(2,2)*` (Neufeld, Janzen and Aziz).
fn omega22(t_star: f64) -> f64 {
    1.161_45 * t_star.powf(-0.148_74)
        + 0.524_87 * (-0.773_20 * t_star).exp()
        + 2.161_78 * (-2.437_87 * t_star).exp()
}

/// Dynamic viscosity of a pure species [Pa·s].
pub fn pure_viscosity(species: Species, t: f64) -> f64 {
    let lj = species.lennard_jones();
    let omega = omega22(t / lj.epsilon_k);
    2.669_3e-6 * (species.molar_mass() * t).sqrt() / (lj.sigma * lj.sigma * omega)
}

/// Thermal conductivity of a pure species [W/(m·K)].
pub fn pure_conductivity(species: Species, t: f64) -> f64 {
    let r = R_UNIVERSAL / species.molar_mass();
    let cv = species_cp(species, t) - r;
    pure_viscosity(species, t) * (1.15 * cv + 2.03 * r)
}

/// Wilke interaction weights `Φ_ij`.
fn wilke_phi(mu_i: f64, mu_j: f64, m_i: f64, m_j: f64) -> f64 {
    let num = 1.0 + (mu_i / mu_j).sqrt() * (m_j / m_i).powf(0.25);
    num * num / (8.0 * (1.0 + m_i / m_j)).sqrt()
}

/// Mixture transport at temperature `t` (pressure independent).
pub fn mixture_transport(comp: &Composition, t: f64) -> Transport {
    let species = comp.species();
    let x = comp.mole_fractions();
    if let [sp] = species {
        return Transport {
            mu: pure_viscosity(*sp, t),
            lambda: pure_conductivity(*sp, t),
        };
    }

    let mu: Vec<f64> = species.iter().map(|s| pure_viscosity(*s, t)).collect();
    let lambda: Vec<f64> = species.iter().map(|s| pure_conductivity(*s, t)).collect();

    let mut mu_mix = 0.0;
    let mut lambda_mix = 0.0;
    for i in 0..species.len() {
        if x[i] <= 0.0 {
            continue;
        }
        let denom: f64 = (0..species.len())
            .map(|j| {
                x[j] * wilke_phi(mu[i], mu[j], species[i].molar_mass(), species[j].molar_mass())
            })
            .sum();
        mu_mix += x[i] * mu[i] / denom;
        lambda_mix += x[i] * lambda[i] / denom;
    }
    Transport {
        mu: mu_mix,
        lambda: lambda_mix,
    }
}
