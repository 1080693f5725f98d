//! Chemical equilibrium by Gibbs minimisation (element-potential method).
//!
//! Ideal-gas chemical potentials at fixed `(T, p)`; the reduced system of
//! one equation per active element plus the total-moles equation is solved
//! by damped Newton iteration in logarithmic mole numbers.

use crate::error::{FluidError, FluidResult};
use crate::species::{Element, Species};
use nalgebra::{DMatrix, DVector};
use qf_core::constants::P_REF;
use tracing::debug;

/// Iteration cap of the Newton loop.
pub const MAX_ITERATIONS: usize = 200;

/// `ln(1e-8)`: below this mole-fraction logarithm a species counts as trace.
const TRACE_LOG: f64 = -18.420_681;
/// Target logarithm for trace species entering the major set.
const TRACE_ENTRY_LOG: f64 = 9.210_340_4;
/// Convergence threshold on the weighted correction norm.
const TOL: f64 = 0.5e-5;

/// Equilibrium mole numbers [kmol/kg] of `species` carrying the element
/// amounts `b0` [kmol/kg] at `(t, p)`.
pub fn equilibrium_moles(
    species: &[Species],
    b0: &[(Element, f64)],
    t: f64,
    p: f64,
) -> FluidResult<Vec<f64>> {
    let b_max = b0.iter().map(|(_, b)| *b).fold(0.0, f64::max);
    if species.is_empty() || b_max <= 0.0 {
        return Err(FluidError::InvalidArg {
            what: "equilibrium needs species and element amounts",
        });
    }

    let elements: Vec<(Element, f64)> = b0
        .iter()
        .copied()
        .filter(|(_, b)| *b > 1e-14 * b_max)
        .collect();
    let active: Vec<usize> = (0..species.len())
        .filter(|&j| {
            species[j]
                .elements()
                .iter()
                .all(|(e, _)| elements.iter().any(|(el, _)| el == e))
        })
        .collect();
    if active.is_empty() {
        return Err(FluidError::InvalidArg {
            what: "no species can carry the given elements",
        });
    }

    let ne = elements.len();
    let ns = active.len();
    let a: Vec<Vec<f64>> = elements
        .iter()
        .map(|(e, _)| active.iter().map(|&j| species[j].atoms(*e)).collect())
        .collect();
    let g0: Vec<f64> = active
        .iter()
        .map(|&j| species[j].nasa7().g_rt(t))
        .collect();
    let ln_p = (p / P_REF).ln();

    let mut ln_n = 0.1f64.ln();
    let mut ln_nj = vec![(0.1 / ns as f64).ln(); ns];

    for iter in 0..MAX_ITERATIONS {
        let n_tot = ln_n.exp();
        let nj: Vec<f64> = ln_nj.iter().map(|v| v.exp()).collect();
        let mu: Vec<f64> = (0..ns).map(|j| g0[j] + ln_nj[j] - ln_n + ln_p).collect();

        let dim = ne + 1;
        let mut mat = DMatrix::<f64>::zeros(dim, dim);
        let mut rhs = DVector::<f64>::zeros(dim);
        for i in 0..ne {
            for k in 0..ne {
                mat[(i, k)] = (0..ns).map(|j| a[i][j] * a[k][j] * nj[j]).sum();
            }
            let b_i: f64 = (0..ns).map(|j| a[i][j] * nj[j]).sum();
            mat[(i, ne)] = b_i;
            mat[(ne, i)] = b_i;
            rhs[i] = elements[i].1 - b_i + (0..ns).map(|j| a[i][j] * nj[j] * mu[j]).sum::<f64>();
        }
        let sum_n: f64 = nj.iter().sum();
        mat[(ne, ne)] = sum_n - n_tot;
        rhs[ne] = n_tot - sum_n + (0..ns).map(|j| nj[j] * mu[j]).sum::<f64>();

        let sol = mat.lu().solve(&rhs).ok_or(FluidError::NonPhysical {
            what: "singular equilibrium matrix",
        })?;
        let d_ln_n = sol[ne];
        let d_ln_nj: Vec<f64> = (0..ns)
            .map(|j| -mu[j] + (0..ne).map(|i| a[i][j] * sol[i]).sum::<f64>() + d_ln_n)
            .collect();

        // damping
        let mut big = 5.0 * d_ln_n.abs();
        let mut lambda2 = 1.0f64;
        for j in 0..ns {
            let ln_x = ln_nj[j] - ln_n;
            if ln_x > TRACE_LOG {
                big = big.max(d_ln_nj[j].abs());
            } else if d_ln_nj[j] >= 0.0 {
                let denom = d_ln_nj[j] - d_ln_n;
                if denom.abs() > 0.0 {
                    lambda2 = lambda2.min(((-ln_x - TRACE_ENTRY_LOG) / denom).abs());
                }
            }
        }
        let lambda1 = if big > 2.0 { 2.0 / big } else { 1.0 };
        let lambda = lambda1.min(lambda2).min(1.0);

        ln_n += lambda * d_ln_n;
        for j in 0..ns {
            ln_nj[j] += lambda * d_ln_nj[j];
        }

        let weighted: f64 =
            (0..ns).map(|j| nj[j] * d_ln_nj[j].abs()).sum::<f64>() / sum_n.max(f64::MIN_POSITIVE);
        if weighted <= TOL && d_ln_n.abs() <= TOL {
            debug!(iterations = iter + 1, t, p, "equilibrium converged");
            let mut moles = vec![0.0; species.len()];
            for (jj, &j) in active.iter().enumerate() {
                moles[j] = ln_nj[jj].exp();
            }
            return Ok(moles);
        }
    }

    Err(FluidError::TooManyIterations {
        what: "chemical equilibrium",
        iterations: MAX_ITERATIONS,
        state: format!("T={t} K, p={p} Pa"),
    })
}

/// Equilibrium mass fractions for the given species, element content and state.
///
/// The result is nonnegative and normalized.
pub fn equilibrium_mass_fractions(
    species: &[Species],
    b0: &[(Element, f64)],
    t: f64,
    p: f64,
) -> FluidResult<Vec<f64>> {
    let moles = equilibrium_moles(species, b0, t, p)?;
    let mass: Vec<f64> = moles
        .iter()
        .zip(species)
        .map(|(n, s)| (n * s.molar_mass()).max(0.0))
        .collect();
    let total: f64 = mass.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(FluidError::NonPhysical {
            what: "equilibrium produced no mass",
        });
    }
    Ok(mass.into_iter().map(|m| m / total).collect())
}
