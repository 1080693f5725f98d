//! Crocco–Busemann coupling of the velocity and density profiles.
//!
//! With `υ = u/û` the density follows
//!
//! ```text
//! ρ_w/ρ = 1 + ψυ − φυ²,    φ = 1 + ψ − ρ_w/ρ̂
//! ```
//!
//! and the van Driest transformed velocity `w = ∫₀^υ √(ρ/ρ_w) dυ` has the
//! closed inverse
//!
//! ```text
//! υ(w) = (χ sin(√φ w − β) + ψ) / (2φ),   χ = √(ψ² + 4φ),   β = asin(ψ/χ)
//! ```
//!
//! For `φ < 0` or `ψ² + 4φ < 0` the square roots and `asin` leave the real
//! axis, so the shear constant is evaluated with complex arithmetic and the
//! logarithmic form of `asin`. Profiles use the equivalent even-function
//! form `υ = w S(φw²) + ψw²/4 C(φw²)`, which is real for every sign of `φ`.

use num_complex::Complex64;

/// Magnitude below which `χ` and `√φ` count as zero.
const DEGENERATE: f64 = 1e-12;

/// Series switch for `S` and `C`.
const SERIES_LIMIT: f64 = 1e-4;

const POLISH_ITERATIONS: usize = 20;

/// `asin z = −i ln(iz + √(1 − z²))`.
pub fn casin(z: Complex64) -> Complex64 {
    let i = Complex64::i();
    -i * (i * z + (Complex64::new(1.0, 0.0) - z * z).sqrt()).ln()
}

/// Principal square root of a real number as a complex value.
fn csqrt_real(x: f64) -> Complex64 {
    if x >= 0.0 {
        Complex64::new(x.sqrt(), 0.0)
    } else {
        Complex64::new(0.0, (-x).sqrt())
    }
}

/// `sin(√z)/√z`, continued to `sinh` for `z < 0`.
fn s_fn(z: f64) -> f64 {
    if z.abs() < SERIES_LIMIT {
        1.0 - z / 6.0 + z * z / 120.0
    } else if z > 0.0 {
        let x = z.sqrt();
        x.sin() / x
    } else {
        let x = (-z).sqrt();
        x.sinh() / x
    }
}

/// `2(1 − cos√z)/z`, continued to `cosh` for `z < 0`.
fn c_fn(z: f64) -> f64 {
    if z.abs() < SERIES_LIMIT {
        1.0 - z / 12.0 + z * z / 360.0
    } else if z > 0.0 {
        2.0 * (1.0 - z.sqrt().cos()) / z
    } else {
        2.0 * ((-z).sqrt().cosh() - 1.0) / (-z)
    }
}

/// Crocco–Busemann parameters for one centre/wall state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CroccoBusemann {
    phi: f64,
    psi: f64,
    chi: Complex64,
    beta: Complex64,
    /// `w` at the centre, where `υ = 1`
    shear_constant: f64,
}

impl CroccoBusemann {
    /// Build the transform from `ψ` and the density ratio `ρ_w/ρ̂`.
    ///
    /// Returns `None` when the transform degenerates: `χ` and `√φ` both
    /// vanish, or `ρ_w/ρ` is not positive across the profile.
    pub fn new(psi: f64, density_ratio: f64) -> Option<Self> {
        if !(psi.is_finite() && density_ratio.is_finite() && density_ratio > 0.0) {
            return None;
        }
        let phi = 1.0 + psi - density_ratio;
        let chi = csqrt_real(psi * psi + 4.0 * phi);
        let sqrt_phi = csqrt_real(phi);
        if chi.norm() < DEGENERATE && sqrt_phi.norm() < DEGENERATE {
            return None;
        }
        // 1 + ψυ − φυ² must stay positive on [0, 1]
        if phi < 0.0 {
            let vertex = psi / (2.0 * phi);
            if vertex > 0.0 && vertex < 1.0 && 1.0 + 0.5 * psi * vertex <= 0.0 {
                return None;
            }
        }

        let beta = if chi.norm() < DEGENERATE {
            Complex64::new(0.0, 0.0)
        } else {
            casin(Complex64::new(psi, 0.0) / chi)
        };
        let mut cb = Self {
            phi,
            psi,
            chi,
            beta,
            shear_constant: 0.0,
        };
        cb.shear_constant = cb.solve_shear_constant(sqrt_phi)?;
        Some(cb)
    }

    fn solve_shear_constant(&self, sqrt_phi: Complex64) -> Option<f64> {
        let closed = if sqrt_phi.norm() < DEGENERATE || self.chi.norm() < DEGENERATE {
            f64::NAN
        } else {
            let z = Complex64::new(2.0 * self.phi - self.psi, 0.0) / self.chi;
            ((casin(z) + self.beta) / sqrt_phi).re
        };
        let mut w = if closed.is_finite() && closed > 0.0 {
            closed
        } else if self.psi.abs() > DEGENERATE && 1.0 + self.psi > 0.0 {
            2.0 * ((1.0 + self.psi).sqrt() - 1.0) / self.psi
        } else {
            1.0
        };
        // Newton polish on υ(w) = 1; dυ/dw = √(ρ_w/ρ)
        for _ in 0..POLISH_ITERATIONS {
            let v = self.velocity_ratio(w);
            let slope = self.wall_density_ratio(v).max(0.0).sqrt();
            if !(slope > 0.0) {
                return None;
            }
            let dw = (1.0 - v) / slope;
            w += dw;
            if dw.abs() <= 1e-15 * w.abs() {
                break;
            }
        }
        (w.is_finite() && w > 0.0).then_some(w)
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }

    pub fn psi(&self) -> f64 {
        self.psi
    }

    pub fn chi(&self) -> Complex64 {
        self.chi
    }

    pub fn beta(&self) -> Complex64 {
        self.beta
    }

    /// Transformed centre velocity `A = w(υ = 1)`.
    pub fn shear_constant(&self) -> f64 {
        self.shear_constant
    }

    /// `υ = u/û` at transformed velocity `w = u⁺ u_τ / û`.
    pub fn velocity_ratio(&self, w: f64) -> f64 {
        let z = self.phi * w * w;
        w * s_fn(z) + 0.25 * self.psi * w * w * c_fn(z)
    }

    /// `ρ_w/ρ` at velocity ratio `υ`.
    pub fn wall_density_ratio(&self, v: f64) -> f64 {
        1.0 + v * (self.psi - v * self.phi)
    }
}
