//! Coles wake correction of the outer layer.

/// Wake contribution `g⁺(η) = η²[(6Π+1) − (4Π+1)η]/κ` at `η = y/R_h`.
///
/// `g⁺(0) = 0` and `dg⁺/dη(1) = -1/κ` for every `Π`, so the log law's
/// slope vanishes at the channel centre.
pub fn g_plus(kappa: f64, pi: f64, eta: f64) -> f64 {
    eta * eta * ((6.0 * pi + 1.0) - (4.0 * pi + 1.0) * eta) / kappa
}

/// `dg⁺/dη`.
pub fn dg_plus(kappa: f64, pi: f64, eta: f64) -> f64 {
    eta * ((12.0 * pi + 2.0) - (12.0 * pi + 3.0) * eta) / kappa
}
