//! Friction-method and sigma-mode selectors.

use crate::error::{BoundaryError, BoundaryResult};
use qf_fluids::{FluidError, Mixture, Species};
use std::fmt;
use std::str::FromStr;

/// Wall-flux model used by `BoundaryLayer::compute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrictionMethod {
    /// Full boundary-layer profile integration.
    #[default]
    Messe,
    /// Rocket hot-gas correlation; needs the throat geometry.
    Bartz,
    /// Reference temperature with the Moody friction factor.
    Eckert,
    /// Methane Nusselt correlation.
    Pizzarelli,
    /// Methane Nusselt correlation with a Petukhov friction iteration.
    LebedinskyKalmykov,
}

impl FrictionMethod {
    /// Pure-methane correlations.
    pub fn requires_methane(self) -> bool {
        matches!(
            self,
            FrictionMethod::Pizzarelli | FrictionMethod::LebedinskyKalmykov
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            FrictionMethod::Messe => "messe",
            FrictionMethod::Bartz => "bartz",
            FrictionMethod::Eckert => "eckert",
            FrictionMethod::Pizzarelli => "pizzarelli",
            FrictionMethod::LebedinskyKalmykov => "lebedinsky-kalmykov",
        }
    }
}

impl fmt::Display for FrictionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FrictionMethod {
    type Err = BoundaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "messe" => Ok(FrictionMethod::Messe),
            "bartz" => Ok(FrictionMethod::Bartz),
            "eckert" => Ok(FrictionMethod::Eckert),
            "pizzarelli" => Ok(FrictionMethod::Pizzarelli),
            "lebedinsky-kalmykov" | "lebedinsky_kalmykov" | "lk" => {
                Ok(FrictionMethod::LebedinskyKalmykov)
            }
            _ => Err(BoundaryError::InvalidArg {
                what: "unknown friction method",
            }),
        }
    }
}

/// Reynolds-analogy factor and recovery-factor model of the Messe method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigmaMode {
    /// Closed form from `Pr_m` and `c_f`.
    #[default]
    Petukhov,
    /// Integrals across the profile. Selected only through
    /// `BoundaryLayer::with_van_driest_sigma`.
    VanDriest,
}

impl FromStr for SigmaMode {
    type Err = BoundaryError;

    /// Only `petukhov` is accepted from text; the profile-integral mode is
    /// not offered to case files.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "petukhov" => Ok(SigmaMode::Petukhov),
            "vandriest" | "van driest" | "van-driest" => Err(BoundaryError::NotSupported {
                what: "van Driest sigma mode is not selectable from input",
            }),
            _ => Err(BoundaryError::InvalidArg {
                what: "unknown sigma mode",
            }),
        }
    }
}

/// Guard for the methane-only correlations.
pub struct PureMethane;

impl PureMethane {
    pub fn check(mix: &Mixture) -> BoundaryResult<()> {
        match mix.species() {
            [Species::CH4] => Ok(()),
            _ => Err(FluidError::InvalidMixture {
                what: "correlation is valid for pure methane only",
            }
            .into()),
        }
    }
}
