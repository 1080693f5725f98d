//! Chemical species definitions.
//!
//! Molar masses, element composition, Lennard-Jones collision parameters and
//! critical constants for the species the gas tables know about.

use crate::error::FluidError;
use crate::nasa::Nasa7;

/// Chemical elements appearing in the built-in species set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    H,
    O,
    N,
    C,
    Ar,
}

impl Element {
    pub const ALL: [Element; 5] = [Element::H, Element::O, Element::N, Element::C, Element::Ar];
}

/// Gas-phase species relevant for rocket combustion and coolant channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    /// Hydrogen (H₂)
    H2,
    /// Oxygen (O₂)
    O2,
    /// Water vapour (H₂O)
    H2O,
    /// Hydroxyl radical
    OH,
    /// Atomic hydrogen
    H,
    /// Atomic oxygen
    O,
    /// Hydroperoxyl radical
    HO2,
    /// Hydrogen peroxide
    H2O2,
    /// Nitrogen (N₂)
    N2,
    /// Argon
    Ar,
    /// Methane (CH₄)
    CH4,
    /// Carbon monoxide
    CO,
    /// Carbon dioxide
    CO2,
}

/// Lennard-Jones 12-6 parameters: well depth `ε/k` [K] and diameter `σ` [Å].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LennardJones {
    pub epsilon_k: f64,
    pub sigma: f64,
}

/// Critical constants used by the cubic equation of state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Critical {
    /// Critical temperature [K]
    pub tc: f64,
    /// Critical pressure [Pa]
    pub pc: f64,
    /// Acentric factor
    pub omega: f64,
}

impl Species {
    pub const ALL: [Species; 13] = [
        Species::H2,
        Species::O2,
        Species::H2O,
        Species::OH,
        Species::H,
        Species::O,
        Species::HO2,
        Species::H2O2,
        Species::N2,
        Species::Ar,
        Species::CH4,
        Species::CO,
        Species::CO2,
    ];

    /// Canonical label (the form `fix_label` produces).
    pub fn key(&self) -> &'static str {
        match self {
            Species::H2 => "H2",
            Species::O2 => "O2",
            Species::H2O => "H2O",
            Species::OH => "OH",
            Species::H => "H",
            Species::O => "O",
            Species::HO2 => "HO2",
            Species::H2O2 => "H2O2",
            Species::N2 => "N2",
            Species::Ar => "AR",
            Species::CH4 => "CH4",
            Species::CO => "CO",
            Species::CO2 => "CO2",
        }
    }

    /// Molar mass [kg/kmol].
    pub fn molar_mass(&self) -> f64 {
        match self {
            Species::H2 => 2.015_88,
            Species::O2 => 31.998_8,
            Species::H2O => 18.015_28,
            Species::OH => 17.007_34,
            Species::H => 1.007_94,
            Species::O => 15.999_4,
            Species::HO2 => 33.006_74,
            Species::H2O2 => 34.014_68,
            Species::N2 => 28.013_4,
            Species::Ar => 39.948,
            Species::CH4 => 16.042_46,
            Species::CO => 28.010_4,
            Species::CO2 => 44.009_8,
        }
    }

    /// Element composition (atoms per molecule).
    pub fn elements(&self) -> &'static [(Element, u8)] {
        use Element::*;
        match self {
            Species::H2 => &[(H, 2)],
            Species::O2 => &[(O, 2)],
            Species::H2O => &[(H, 2), (O, 1)],
            Species::OH => &[(O, 1), (H, 1)],
            Species::H => &[(H, 1)],
            Species::O => &[(O, 1)],
            Species::HO2 => &[(H, 1), (O, 2)],
            Species::H2O2 => &[(H, 2), (O, 2)],
            Species::N2 => &[(N, 2)],
            Species::Ar => &[(Ar, 1)],
            Species::CH4 => &[(C, 1), (H, 4)],
            Species::CO => &[(C, 1), (O, 1)],
            Species::CO2 => &[(C, 1), (O, 2)],
        }
    }

    /// Atoms of `element` in one molecule.
    pub fn atoms(&self, element: Element) -> f64 {
        self.elements()
            .iter()
            .find(|(e, _)| *e == element)
            .map(|(_, n)| f64::from(*n))
            .unwrap_or(0.0)
    }

    pub fn lennard_jones(&self) -> LennardJones {
        let (epsilon_k, sigma) = match self {
            Species::H2 => (38.0, 2.92),
            Species::O2 => (107.4, 3.458),
            Species::H2O => (572.4, 2.605),
            Species::OH => (80.0, 2.75),
            Species::H => (145.0, 2.05),
            Species::O => (80.0, 2.75),
            Species::HO2 => (107.4, 3.458),
            Species::H2O2 => (107.4, 3.458),
            Species::N2 => (97.53, 3.621),
            Species::Ar => (136.5, 3.33),
            Species::CH4 => (141.4, 3.746),
            Species::CO => (98.1, 3.65),
            Species::CO2 => (244.0, 3.763),
        };
        LennardJones { epsilon_k, sigma }
    }

    /// Critical constants; radicals have none and behave ideally in SRK.
    pub fn critical(&self) -> Option<Critical> {
        let (tc, pc_bar, omega) = match self {
            Species::H2 => (33.19, 13.13, -0.216),
            Species::O2 => (154.58, 50.43, 0.022),
            Species::H2O => (647.1, 220.64, 0.345),
            Species::N2 => (126.2, 33.98, 0.037),
            Species::Ar => (150.69, 48.63, -0.002),
            Species::CH4 => (190.56, 45.99, 0.011),
            Species::CO => (132.86, 34.94, 0.045),
            Species::CO2 => (304.13, 73.77, 0.225),
            Species::OH | Species::H | Species::O | Species::HO2 | Species::H2O2 => return None,
        };
        Some(Critical {
            tc,
            pc: pc_bar * 1.0e5,
            omega,
        })
    }

    /// NASA 7-coefficient polynomial for this species.
    pub fn nasa7(&self) -> &'static Nasa7 {
        crate::nasa::table(*self)
    }

    /// Map to rfluids Pure enum (Helmholtz backend).
    ///
    /// Returns `None` for radicals the backend does not carry.
    pub(crate) fn rfluids_pure(&self) -> Option<rfluids::substance::Pure> {
        use rfluids::substance::Pure;
        match self {
            Species::H2 => Some(Pure::Hydrogen),
            Species::O2 => Some(Pure::Oxygen),
            Species::H2O => Some(Pure::Water),
            Species::N2 => Some(Pure::Nitrogen),
            Species::Ar => Some(Pure::Argon),
            Species::CH4 => Some(Pure::Methane),
            Species::CO => Some(Pure::CarbonMonoxide),
            Species::CO2 => Some(Pure::CarbonDioxide),
            _ => None,
        }
    }

    /// Upper validity temperature of the Helmholtz correlation [K].
    pub fn helmholtz_t_max(&self) -> Option<f64> {
        match self {
            Species::H2 => Some(1000.0),
            Species::CH4 => Some(625.0),
            Species::CO => Some(500.0),
            Species::O2 | Species::H2O | Species::N2 | Species::Ar | Species::CO2 => Some(2000.0),
            _ => None,
        }
    }
}

/// Canonicalize a species label: trim, drop phase suffixes and uppercase.
pub fn fix_label(label: &str) -> String {
    let mut s: String = label.chars().filter(|c| !c.is_whitespace()).collect();
    for suffix in ["(G)", "(g)"] {
        if let Some(stripped) = s.strip_suffix(suffix) {
            s = stripped.to_string();
        }
    }
    s.to_uppercase()
}

impl std::str::FromStr for Species {
    type Err = FluidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fix_label(s).as_str() {
            "H2" | "HYDROGEN" => Ok(Species::H2),
            "O2" | "OXYGEN" => Ok(Species::O2),
            "H2O" | "WATER" => Ok(Species::H2O),
            "OH" => Ok(Species::OH),
            "H" => Ok(Species::H),
            "O" => Ok(Species::O),
            "HO2" => Ok(Species::HO2),
            "H2O2" => Ok(Species::H2O2),
            "N2" | "NITROGEN" => Ok(Species::N2),
            "AR" | "ARGON" => Ok(Species::Ar),
            "CH4" | "METHANE" => Ok(Species::CH4),
            "CO" => Ok(Species::CO),
            "CO2" => Ok(Species::CO2),
            _ => Err(FluidError::NotSupported {
                what: "unknown species label",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_canonicalize() {
        assert_eq!(fix_label(" ar "), "AR");
        assert_eq!(fix_label("h2o(g)"), "H2O");
        assert_eq!("Ar".parse::<Species>().unwrap(), Species::Ar);
        assert_eq!("methane".parse::<Species>().unwrap(), Species::CH4);
        assert!("XE".parse::<Species>().is_err());
    }

    #[test]
    fn key_roundtrip() {
        for sp in Species::ALL {
            assert_eq!(sp.key().parse::<Species>().unwrap(), sp);
        }
    }

    #[test]
    fn molar_mass_matches_elements() {
        let atomic = |e: Element| match e {
            Element::H => 1.00794,
            Element::O => 15.9994,
            Element::N => 14.0067,
            Element::C => 12.0107,
            Element::Ar => 39.948,
        };
        for sp in Species::ALL {
            let m: f64 = sp
                .elements()
                .iter()
                .map(|(e, n)| atomic(*e) * f64::from(*n))
                .sum();
            assert!((m - sp.molar_mass()).abs() < 1e-2, "{sp:?}");
        }
    }

    #[test]
    fn radicals_have_no_critical_data() {
        assert!(Species::OH.critical().is_none());
        assert!(Species::CH4.critical().is_some());
        assert!(Species::OH.rfluids_pure().is_none());
        assert!(Species::CH4.helmholtz_t_max().is_some());
    }
}
