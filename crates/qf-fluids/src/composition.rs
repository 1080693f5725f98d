//! Mixture composition: an ordered species list with mass and mole fractions.

use crate::error::{FluidError, FluidResult};
use crate::species::{Element, Species};
use qf_core::constants::R_UNIVERSAL;
use qf_core::numeric::{Tolerances, nearly_equal};

/// Species and their fractions.
///
/// The species list is fixed at construction; `remix` only changes the
/// fractions. Both fraction vectors are normalized and nonnegative.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    species: Vec<Species>,
    y: Vec<f64>,
    x: Vec<f64>,
    molar_mass: f64,
}

fn normalize(values: &[f64]) -> FluidResult<Vec<f64>> {
    let mut sum = 0.0;
    for v in values {
        if !v.is_finite() {
            return Err(FluidError::NonPhysical {
                what: "non-finite fraction",
            });
        }
        if *v < 0.0 {
            return Err(FluidError::NonPhysical {
                what: "negative fraction",
            });
        }
        sum += v;
    }
    if sum <= 0.0 || !sum.is_finite() {
        return Err(FluidError::NonPhysical {
            what: "fractions sum to zero or non-finite",
        });
    }
    Ok(values.iter().map(|v| v / sum).collect())
}

fn split(items: Vec<(Species, f64)>) -> FluidResult<(Vec<Species>, Vec<f64>)> {
    if items.is_empty() {
        return Err(FluidError::InvalidArg {
            what: "empty composition",
        });
    }
    let (species, values): (Vec<Species>, Vec<f64>) = items.into_iter().unzip();
    for (i, s) in species.iter().enumerate() {
        if species[..i].contains(s) {
            return Err(FluidError::InvalidArg {
                what: "duplicate species in composition",
            });
        }
    }
    Ok((species, values))
}

impl Composition {
    /// Create a pure-species composition.
    pub fn pure(species: Species) -> Self {
        Self {
            species: vec![species],
            y: vec![1.0],
            x: vec![1.0],
            molar_mass: species.molar_mass(),
        }
    }

    /// Create a composition from mass fractions (normalized on entry).
    pub fn from_mass_fractions(items: Vec<(Species, f64)>) -> FluidResult<Self> {
        let (species, y) = split(items)?;
        let mut comp = Self {
            x: vec![0.0; species.len()],
            y: vec![0.0; species.len()],
            species,
            molar_mass: 0.0,
        };
        comp.remix(&y)?;
        Ok(comp)
    }

    /// Create a composition from mole fractions (normalized on entry).
    pub fn from_mole_fractions(items: Vec<(Species, f64)>) -> FluidResult<Self> {
        let (species, x) = split(items)?;
        let mut comp = Self {
            x: vec![0.0; species.len()],
            y: vec![0.0; species.len()],
            species,
            molar_mass: 0.0,
        };
        comp.remix_molar(&x)?;
        Ok(comp)
    }

    /// Replace the mass fractions. Mole fractions follow.
    pub fn remix(&mut self, y: &[f64]) -> FluidResult<()> {
        if y.len() != self.species.len() {
            return Err(FluidError::InvalidArg {
                what: "mass fraction count differs from species count",
            });
        }
        let y = normalize(y)?;
        let inv_m: f64 = y
            .iter()
            .zip(&self.species)
            .map(|(yk, s)| yk / s.molar_mass())
            .sum();
        self.molar_mass = 1.0 / inv_m;
        self.x = y
            .iter()
            .zip(&self.species)
            .map(|(yk, s)| yk / s.molar_mass() * self.molar_mass)
            .collect();
        self.y = y;
        Ok(())
    }

    /// Replace the mole fractions. Mass fractions follow.
    pub fn remix_molar(&mut self, x: &[f64]) -> FluidResult<()> {
        if x.len() != self.species.len() {
            return Err(FluidError::InvalidArg {
                what: "mole fraction count differs from species count",
            });
        }
        let x = normalize(x)?;
        self.molar_mass = x
            .iter()
            .zip(&self.species)
            .map(|(xk, s)| xk * s.molar_mass())
            .sum();
        self.y = x
            .iter()
            .zip(&self.species)
            .map(|(xk, s)| xk * s.molar_mass() / self.molar_mass)
            .collect();
        self.x = x;
        Ok(())
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn mass_fractions(&self) -> &[f64] {
        &self.y
    }

    pub fn mole_fractions(&self) -> &[f64] {
        &self.x
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Position of `species` in the ordered list.
    pub fn index_of(&self, species: Species) -> Option<usize> {
        self.species.iter().position(|s| *s == species)
    }

    /// Mass fraction of a species (0.0 if not present).
    pub fn mass_fraction(&self, species: Species) -> f64 {
        self.index_of(species).map(|i| self.y[i]).unwrap_or(0.0)
    }

    /// Mole fraction of a species (0.0 if not present).
    pub fn mole_fraction(&self, species: Species) -> f64 {
        self.index_of(species).map(|i| self.x[i]).unwrap_or(0.0)
    }

    /// Returns `Some(species)` for a single-component composition.
    pub fn is_pure(&self) -> Option<Species> {
        if self.species.len() == 1 {
            let tol = Tolerances {
                abs: 1e-10,
                rel: 1e-10,
            };
            if nearly_equal(self.y[0], 1.0, tol) {
                return Some(self.species[0]);
            }
        }
        None
    }

    /// Mixture molar mass [kg/kmol].
    pub fn molar_mass(&self) -> f64 {
        self.molar_mass
    }

    /// Specific gas constant [J/(kg·K)].
    pub fn gas_constant(&self) -> f64 {
        R_UNIVERSAL / self.molar_mass
    }

    /// Element amounts [kmol/kg] carried by the current mass fractions.
    pub fn element_moles(&self) -> Vec<(Element, f64)> {
        Element::ALL
            .iter()
            .map(|e| {
                let b: f64 = self
                    .species
                    .iter()
                    .zip(&self.y)
                    .map(|(s, yk)| s.atoms(*e) * yk / s.molar_mass())
                    .sum();
                (*e, b)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_composition() {
        let comp = Composition::pure(Species::O2);
        assert_eq!(comp.is_pure(), Some(Species::O2));
        assert_eq!(comp.mole_fraction(Species::O2), 1.0);
        assert_eq!(comp.mole_fraction(Species::N2), 0.0);
        assert!((comp.gas_constant() - 259.83).abs() < 0.1);
    }

    #[test]
    fn air_from_mole_fractions() {
        let air = Composition::from_mole_fractions(vec![
            (Species::N2, 0.7808),
            (Species::O2, 0.2095),
            (Species::Ar, 0.0097),
        ])
        .unwrap();
        assert!((air.molar_mass() - 28.96).abs() < 0.02);
        assert!((air.mass_fraction(Species::O2) - 0.2314).abs() < 1e-3);
        assert_eq!(air.is_pure(), None);
    }

    #[test]
    fn normalizes_non_unit_sum() {
        let comp =
            Composition::from_mass_fractions(vec![(Species::O2, 2.0), (Species::N2, 8.0)]).unwrap();
        assert!((comp.mass_fraction(Species::O2) - 0.2).abs() < 1e-15);
        let sum: f64 = comp.mole_fractions().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Composition::from_mass_fractions(vec![]).is_err());
        assert!(Composition::from_mass_fractions(vec![(Species::O2, -1.0)]).is_err());
        assert!(
            Composition::from_mass_fractions(vec![(Species::O2, 0.5), (Species::O2, 0.5)]).is_err()
        );
        let mut comp = Composition::pure(Species::H2);
        assert!(comp.remix(&[0.5, 0.5]).is_err());
    }

    #[test]
    fn zero_fraction_species_are_kept() {
        let comp = Composition::from_mass_fractions(vec![(Species::H2, 1.0), (Species::H2O, 0.0)])
            .unwrap();
        assert_eq!(comp.len(), 2);
        assert_eq!(comp.mass_fraction(Species::H2O), 0.0);
    }

    #[test]
    fn remix_is_deterministic() {
        let mut comp = Composition::from_mass_fractions(vec![
            (Species::H2, 0.1),
            (Species::O2, 0.8),
            (Species::H2O, 0.1),
        ])
        .unwrap();
        let y = comp.mass_fractions().to_vec();
        comp.remix(&[0.3, 0.3, 0.4]).unwrap();
        comp.remix(&y).unwrap();
        assert_eq!(comp.mass_fractions(), &y[..]);
    }

    #[test]
    fn element_moles_of_water() {
        let comp = Composition::pure(Species::H2O);
        let b = comp.element_moles();
        let h = b.iter().find(|(e, _)| *e == Element::H).unwrap().1;
        let o = b.iter().find(|(e, _)| *e == Element::O).unwrap().1;
        assert!((h / o - 2.0).abs() < 1e-12);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn fractions_stay_normalized(a in 0.0f64..10.0, b in 0.0f64..10.0, c in 1e-6f64..10.0) {
            let comp = Composition::from_mass_fractions(vec![
                (Species::CH4, a),
                (Species::O2, b),
                (Species::CO2, c),
            ]).unwrap();
            let sy: f64 = comp.mass_fractions().iter().sum();
            let sx: f64 = comp.mole_fractions().iter().sum();
            prop_assert!((sy - 1.0).abs() < 1e-12);
            prop_assert!((sx - 1.0).abs() < 1e-12);
            prop_assert!(comp.mass_fractions().iter().all(|v| *v >= 0.0));
        }
    }
}
