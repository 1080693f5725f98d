//! Mixture: composition bound to an equation of state.

use crate::composition::Composition;
use crate::equilibrium::equilibrium_mass_fractions;
use crate::error::{FluidError, FluidResult};
use crate::ideal::IdealGas;
use crate::model::{Caloric, EosKind, EquationOfState, Properties, Transport, validation};
use crate::species::Species;
use crate::splice::HelmholtzSplice;
use crate::srk::Srk;
use crate::transport::mixture_transport;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
enum Backend {
    Ideal(IdealGas),
    Srk(Srk),
    Helmholtz(Box<HelmholtzSplice>),
}

/// A gas mixture with its property backend.
///
/// The species list is fixed for the lifetime of the mixture. Helmholtz
/// mixtures are single-component and carry an SRK alternate for
/// temperatures beyond the correlation's range.
#[derive(Debug, Clone, PartialEq)]
pub struct Mixture {
    comp: Composition,
    eos: EosKind,
    backend: Backend,
}

impl Mixture {
    pub fn new(comp: Composition, eos: EosKind) -> FluidResult<Self> {
        let backend = match eos {
            EosKind::IdealGas => Backend::Ideal(IdealGas),
            EosKind::Srk => Backend::Srk(Srk),
            EosKind::Helmholtz => {
                let [species] = comp.species() else {
                    return Err(FluidError::InvalidMixture {
                        what: "Helmholtz mode requires exactly one component",
                    });
                };
                Backend::Helmholtz(Box::new(HelmholtzSplice::new(*species)?))
            }
        };
        Ok(Self { comp, eos, backend })
    }

    pub fn ideal(comp: Composition) -> Self {
        Self {
            comp,
            eos: EosKind::IdealGas,
            backend: Backend::Ideal(IdealGas),
        }
    }

    pub fn composition(&self) -> &Composition {
        &self.comp
    }

    pub fn eos(&self) -> EosKind {
        self.eos
    }

    pub fn species(&self) -> &[Species] {
        self.comp.species()
    }

    pub fn mass_fractions(&self) -> &[f64] {
        self.comp.mass_fractions()
    }

    pub fn mole_fractions(&self) -> &[f64] {
        self.comp.mole_fractions()
    }

    pub fn len(&self) -> usize {
        self.comp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comp.is_empty()
    }

    pub fn molar_mass(&self) -> f64 {
        self.comp.molar_mass()
    }

    pub fn gas_constant(&self) -> f64 {
        self.comp.gas_constant()
    }

    /// Splice window of a Helmholtz mixture.
    pub fn splice_window(&self) -> Option<(f64, f64)> {
        match &self.backend {
            Backend::Helmholtz(b) => Some(b.window()),
            _ => None,
        }
    }

    /// Replace mass fractions.
    pub fn remix(&mut self, y: &[f64]) -> FluidResult<()> {
        self.comp.remix(y)
    }

    /// Replace mole fractions.
    pub fn remix_molar(&mut self, x: &[f64]) -> FluidResult<()> {
        self.comp.remix_molar(x)
    }

    /// Equilibrium mass fractions at `(t, p)` without changing the mixture.
    ///
    /// Chemical potentials are ideal-gas regardless of the equation of state.
    pub fn equilibrium_mass_fractions(&self, t: f64, p: f64) -> FluidResult<Vec<f64>> {
        validation::validate_temperature(t)?;
        validation::validate_pressure(p)?;
        if self.comp.len() == 1 {
            return Ok(vec![1.0]);
        }
        equilibrium_mass_fractions(self.comp.species(), &self.comp.element_moles(), t, p)
    }

    /// Reset the mixture to its chemical-equilibrium composition at `(t, p)`.
    pub fn remix_to_equilibrium(&mut self, t: f64, p: f64) -> FluidResult<()> {
        let y = self.equilibrium_mass_fractions(t, p)?;
        debug!(t, p, "remixed to equilibrium");
        self.comp.remix(&y)
    }

    /// Index of the oxidizer species. Only O₂ is recognised.
    pub fn oxidizer_index(&self) -> FluidResult<usize> {
        self.comp
            .index_of(Species::O2)
            .ok_or(FluidError::NotSupported {
                what: "only O2 is recognised as oxidizer",
            })
    }

    /// Standard-state `g°/(R_m T)` of every species and its temperature
    /// derivative `-h°/(R_m T²)`.
    pub fn species_gibbs(&self, t: f64) -> Vec<(f64, f64)> {
        self.comp
            .species()
            .iter()
            .map(|s| {
                let n = s.nasa7();
                (n.g_rt(t), -n.h_rt(t) / t)
            })
            .collect()
    }

    /// Caloric properties at `(t, p)`.
    pub fn caloric(&self, t: f64, p: f64) -> FluidResult<Caloric> {
        match &self.backend {
            Backend::Ideal(b) => b.caloric(&self.comp, t, p),
            Backend::Srk(b) => b.caloric(&self.comp, t, p),
            Backend::Helmholtz(b) => b.caloric(&self.comp, t, p),
        }
    }

    /// Transport properties at `(t, p)`.
    pub fn transport(&self, t: f64, p: f64) -> FluidResult<Transport> {
        validation::validate_temperature(t)?;
        let tr = match &self.backend {
            Backend::Helmholtz(b) => b.transport(&self.comp, t, p)?,
            _ => mixture_transport(&self.comp, t),
        };
        validation::validate_transport(&tr)?;
        Ok(tr)
    }

    pub fn properties(&self, t: f64, p: f64) -> FluidResult<Properties> {
        Ok(Properties {
            caloric: self.caloric(t, p)?,
            transport: self.transport(t, p)?,
        })
    }

    /// Pressure from specific volume and temperature.
    pub fn pressure(&self, v: f64, t: f64) -> FluidResult<f64> {
        match &self.backend {
            Backend::Ideal(b) => b.pressure(&self.comp, v, t),
            Backend::Srk(b) => b.pressure(&self.comp, v, t),
            Backend::Helmholtz(b) => b.pressure(&self.comp, v, t),
        }
    }

    /// Specific volume at `(t, p)`.
    pub fn volume(&self, t: f64, p: f64) -> FluidResult<f64> {
        match &self.backend {
            Backend::Ideal(b) => b.volume(&self.comp, t, p),
            Backend::Srk(b) => b.volume(&self.comp, t, p),
            Backend::Helmholtz(b) => b.volume(&self.comp, t, p),
        }
    }

    pub fn enthalpy(&self, t: f64, p: f64) -> FluidResult<f64> {
        Ok(self.caloric(t, p)?.h)
    }

    pub fn entropy(&self, t: f64, p: f64) -> FluidResult<f64> {
        Ok(self.caloric(t, p)?.s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h2_o2() -> Mixture {
        Mixture::ideal(
            Composition::from_mole_fractions(vec![
                (Species::H2, 2.0),
                (Species::O2, 1.0),
                (Species::H2O, 0.0),
                (Species::OH, 0.0),
                (Species::H, 0.0),
                (Species::O, 0.0),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn helmholtz_rejects_multicomponent() {
        let comp = Composition::from_mole_fractions(vec![(Species::N2, 0.79), (Species::O2, 0.21)])
            .unwrap();
        assert!(matches!(
            Mixture::new(comp, EosKind::Helmholtz),
            Err(FluidError::InvalidMixture { .. })
        ));
    }

    #[test]
    fn equilibrium_round_trip_restores_fractions() {
        let mut mix = h2_o2();
        let y = mix.mass_fractions().to_vec();
        mix.remix(&y).unwrap();
        let before = mix.mass_fractions().to_vec();
        mix.remix_to_equilibrium(3000.0, 1e6).unwrap();
        assert_ne!(mix.mass_fractions(), &before[..]);
        mix.remix(&y).unwrap();
        assert_eq!(mix.mass_fractions(), &before[..]);
    }

    #[test]
    fn equilibrium_fractions_are_normalized() {
        let mut mix = h2_o2();
        for t in [800.0, 2000.0, 3500.0] {
            mix.remix_to_equilibrium(t, 5e5).unwrap();
            let sum: f64 = mix.mass_fractions().iter().sum();
            assert!((sum - 1.0).abs() < 1e-12);
            assert!(mix.mass_fractions().iter().all(|y| *y >= 0.0));
        }
    }

    #[test]
    fn oxidizer_is_o2_only() {
        assert_eq!(h2_o2().oxidizer_index().unwrap(), 1);
        let peroxide = Mixture::ideal(Composition::pure(Species::H2O2));
        assert!(matches!(
            peroxide.oxidizer_index(),
            Err(FluidError::NotSupported { .. })
        ));
    }

    #[test]
    fn gibbs_derivative_matches_difference() {
        let mix = h2_o2();
        let t = 1500.0;
        let g = mix.species_gibbs(t);
        let hi = mix.species_gibbs(t + 1e-3);
        let lo = mix.species_gibbs(t - 1e-3);
        for k in 0..g.len() {
            let fd = (hi[k].0 - lo[k].0) / 2e-3;
            assert!((fd - g[k].1).abs() < 1e-6 * g[k].1.abs().max(1e-3));
        }
    }

    #[test]
    fn srk_and_ideal_agree_when_dilute() {
        let comp = Composition::pure(Species::CH4);
        let ideal = Mixture::new(comp.clone(), EosKind::IdealGas).unwrap();
        let srk = Mixture::new(comp, EosKind::Srk).unwrap();
        let a = ideal.properties(600.0, 1e4).unwrap();
        let b = srk.properties(600.0, 1e4).unwrap();
        assert!((a.caloric.h - b.caloric.h).abs() < 1e-3 * a.caloric.cp * 600.0);
        assert!((a.prandtl() - b.prandtl()).abs() < 1e-3);
    }
}
