//! Finite-rate gas-phase chemistry for reacting channel flow.
//!
//! Provides:
//! - A Chemkin-style mechanism parser (`REACTIONS … END` block with
//!   `LOW/`, `TROE/`, `DUPLICATE` and third-body efficiencies)
//! - Arrhenius, Lindemann, Troe and duplicate rate laws with reverse rates
//!   from equilibrium
//! - An implicit, adiabatic constant-pressure reaction step driven by the
//!   residence time of a channel segment

pub mod error;
pub mod mechanism;
pub mod reaction;
pub mod scheme;

pub use error::{KineticsError, KineticsResult};
pub use mechanism::Mechanism;
pub use reaction::{Arrhenius, Progress, RateLaw, RateSlopes, Reaction, ThirdBody, Troe};
pub use scheme::{ReactionScheme, SchemeConfig, Sources, StepOutcome};
