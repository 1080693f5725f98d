//! Channel geometry seen by the marching solvers.
//!
//! The solvers only read cross-section data through [`Geometry`]; contour
//! construction lives outside this crate.

use crate::error::{ChannelError, ChannelResult};
use qf_boundary::ChannelKind;
use std::f64::consts::PI;
use std::fmt::Debug;

/// Relative step of the default finite-difference derivatives.
const FD_STEP: f64 = 1e-6;

/// Cross-section data along the channel axis `x ∈ [start, start + length]`.
pub trait Geometry: Debug + Send + Sync {
    /// Axial coordinate of the inlet [m].
    fn start(&self) -> f64 {
        0.0
    }

    /// Axial length [m].
    fn length(&self) -> f64;

    /// Flow area [m²].
    fn area(&self, x: f64) -> f64;

    /// Hydraulic diameter `4A/P` [m].
    fn hydraulic_diameter(&self, x: f64) -> f64;

    /// Contour radius [m].
    fn radius(&self, x: f64) -> f64;

    /// Cross-section family handed to the boundary-layer solver.
    fn kind(&self) -> ChannelKind;

    fn end(&self) -> f64 {
        self.start() + self.length()
    }

    /// Wetted perimeter [m].
    fn perimeter(&self, x: f64) -> f64 {
        4.0 * self.area(x) / self.hydraulic_diameter(x)
    }

    fn darea_dx(&self, x: f64) -> f64 {
        central(|s| self.area(s), x, self.start(), self.end())
    }

    fn dradius_dx(&self, x: f64) -> f64 {
        central(|s| self.radius(s), x, self.start(), self.end())
    }
}

fn central<F: Fn(f64) -> f64>(f: F, x: f64, lo: f64, hi: f64) -> f64 {
    let h = FD_STEP * (hi - lo).abs().max(1e-3);
    let a = (x - h).max(lo);
    let b = (x + h).min(hi);
    (f(b) - f(a)) / (b - a)
}

/// Straight circular duct.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylindricalDuct {
    diameter: f64,
    length: f64,
}

impl CylindricalDuct {
    pub fn new(diameter: f64, length: f64) -> ChannelResult<Self> {
        if !(diameter > 0.0 && length > 0.0 && diameter.is_finite() && length.is_finite()) {
            return Err(ChannelError::InvalidGeometry {
                what: "duct diameter and length must be positive",
            });
        }
        Ok(Self { diameter, length })
    }
}

impl Geometry for CylindricalDuct {
    fn length(&self) -> f64 {
        self.length
    }

    fn area(&self, _x: f64) -> f64 {
        0.25 * PI * self.diameter * self.diameter
    }

    fn hydraulic_diameter(&self, _x: f64) -> f64 {
        self.diameter
    }

    fn radius(&self, _x: f64) -> f64 {
        0.5 * self.diameter
    }

    fn kind(&self) -> ChannelKind {
        ChannelKind::Axisymmetric
    }

    fn darea_dx(&self, _x: f64) -> f64 {
        0.0
    }

    fn dradius_dx(&self, _x: f64) -> f64 {
        0.0
    }
}

/// Straight rectangular cooling channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangularChannel {
    width: f64,
    height: f64,
    length: f64,
}

impl RectangularChannel {
    pub fn new(width: f64, height: f64, length: f64) -> ChannelResult<Self> {
        let ok = [width, height, length].iter().all(|v| v.is_finite() && *v > 0.0);
        if !ok {
            return Err(ChannelError::InvalidGeometry {
                what: "channel width, height and length must be positive",
            });
        }
        Ok(Self {
            width,
            height,
            length,
        })
    }
}

impl Geometry for RectangularChannel {
    fn length(&self) -> f64 {
        self.length
    }

    fn area(&self, _x: f64) -> f64 {
        self.width * self.height
    }

    fn hydraulic_diameter(&self, _x: f64) -> f64 {
        2.0 * self.width * self.height / (self.width + self.height)
    }

    fn radius(&self, x: f64) -> f64 {
        0.5 * self.hydraulic_diameter(x)
    }

    fn kind(&self) -> ChannelKind {
        ChannelKind::Planar
    }

    fn perimeter(&self, _x: f64) -> f64 {
        2.0 * (self.width + self.height)
    }

    fn darea_dx(&self, _x: f64) -> f64 {
        0.0
    }

    fn dradius_dx(&self, _x: f64) -> f64 {
        0.0
    }
}

/// Rotationally symmetric contour, linear between `(x, r)` points.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisymmetricContour {
    x: Vec<f64>,
    r: Vec<f64>,
}

impl AxisymmetricContour {
    pub fn new(points: &[(f64, f64)]) -> ChannelResult<Self> {
        if points.len() < 2 {
            return Err(ChannelError::InvalidGeometry {
                what: "contour needs at least two points",
            });
        }
        if points.windows(2).any(|w| !(w[1].0 > w[0].0)) {
            return Err(ChannelError::InvalidGeometry {
                what: "contour x must increase strictly",
            });
        }
        if points.iter().any(|(x, r)| !(x.is_finite() && r.is_finite() && *r > 0.0)) {
            return Err(ChannelError::InvalidGeometry {
                what: "contour radius must be positive",
            });
        }
        Ok(Self {
            x: points.iter().map(|p| p.0).collect(),
            r: points.iter().map(|p| p.1).collect(),
        })
    }

    /// Position and radius of the narrowest point.
    pub fn throat(&self) -> (f64, f64) {
        let mut best = 0;
        for i in 1..self.r.len() {
            if self.r[i] < self.r[best] {
                best = i;
            }
        }
        (self.x[best], self.r[best])
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.r.iter().copied())
    }

    fn piece(&self, x: f64) -> usize {
        let last = self.x.len() - 2;
        self.x.partition_point(|xi| *xi <= x).saturating_sub(1).min(last)
    }
}

impl Geometry for AxisymmetricContour {
    fn start(&self) -> f64 {
        self.x[0]
    }

    fn length(&self) -> f64 {
        self.x[self.x.len() - 1] - self.x[0]
    }

    fn area(&self, x: f64) -> f64 {
        let r = self.radius(x);
        PI * r * r
    }

    fn hydraulic_diameter(&self, x: f64) -> f64 {
        2.0 * self.radius(x)
    }

    fn radius(&self, x: f64) -> f64 {
        let x = x.clamp(self.start(), self.end());
        let i = self.piece(x);
        let t = (x - self.x[i]) / (self.x[i + 1] - self.x[i]);
        self.r[i] + t * (self.r[i + 1] - self.r[i])
    }

    fn kind(&self) -> ChannelKind {
        ChannelKind::Axisymmetric
    }

    fn darea_dx(&self, x: f64) -> f64 {
        2.0 * PI * self.radius(x) * self.dradius_dx(x)
    }

    fn dradius_dx(&self, x: f64) -> f64 {
        let i = self.piece(x.clamp(self.start(), self.end()));
        (self.r[i + 1] - self.r[i]) / (self.x[i + 1] - self.x[i])
    }
}

/// `n` equally spaced stations covering the geometry, ends included.
pub fn stations(geometry: &dyn Geometry, n: usize) -> Vec<f64> {
    let (a, b) = (geometry.start(), geometry.end());
    match n {
        0 => Vec::new(),
        1 => vec![a],
        _ => (0..n).map(|i| a + (b - a) * i as f64 / (n - 1) as f64).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn duct_sections() {
        let d = CylindricalDuct::new(0.004, 0.5).unwrap();
        assert_relative_eq!(d.area(0.1), PI * 4e-6);
        assert_relative_eq!(d.perimeter(0.3), PI * 0.004, max_relative = 1e-12);
        assert_eq!(d.darea_dx(0.2), 0.0);
        assert!(CylindricalDuct::new(-1.0, 0.5).is_err());
    }

    #[test]
    fn rectangular_hydraulic_diameter() {
        let c = RectangularChannel::new(0.002, 0.004, 0.3).unwrap();
        assert_relative_eq!(c.hydraulic_diameter(0.0), 4.0 * 8e-6 / 0.012);
        assert_relative_eq!(c.perimeter(0.0), 0.012);
        assert_eq!(c.kind(), ChannelKind::Planar);
    }

    #[test]
    fn contour_interpolates_and_finds_throat() {
        let c = AxisymmetricContour::new(&[(-0.1, 0.05), (0.0, 0.05), (0.1, 0.02), (0.2, 0.03)]).unwrap();
        assert_relative_eq!(c.length(), 0.3);
        assert_relative_eq!(c.radius(0.05), 0.035);
        assert_relative_eq!(c.dradius_dx(0.05), -0.3);
        assert_relative_eq!(c.darea_dx(0.05), 2.0 * PI * 0.035 * -0.3);
        assert_eq!(c.throat(), (0.1, 0.02));
        // clamped outside the contour
        assert_relative_eq!(c.radius(1.0), 0.03);
    }

    #[test]
    fn contour_rejects_bad_points() {
        assert!(AxisymmetricContour::new(&[(0.0, 0.1)]).is_err());
        assert!(AxisymmetricContour::new(&[(0.0, 0.1), (0.0, 0.2)]).is_err());
        assert!(AxisymmetricContour::new(&[(0.0, 0.1), (0.1, 0.0)]).is_err());
    }

    #[test]
    fn default_derivative_matches_slope() {
        #[derive(Debug)]
        struct Cone;
        impl Geometry for Cone {
            fn length(&self) -> f64 {
                1.0
            }
            fn area(&self, x: f64) -> f64 {
                1.0 + 2.0 * x
            }
            fn hydraulic_diameter(&self, _x: f64) -> f64 {
                1.0
            }
            fn radius(&self, x: f64) -> f64 {
                (self.area(x) / PI).sqrt()
            }
            fn kind(&self) -> ChannelKind {
                ChannelKind::Axisymmetric
            }
        }
        assert_relative_eq!(Cone.darea_dx(0.5), 2.0, max_relative = 1e-6);
        assert_relative_eq!(Cone.darea_dx(0.0), 2.0, max_relative = 1e-6);
        assert_eq!(stations(&Cone, 3), vec![0.0, 0.5, 1.0]);
    }
}
