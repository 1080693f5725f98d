//! Segments and three-node marching elements.

use crate::error::{ChannelError, ChannelResult};
use crate::geometry::Geometry;
use qf_boundary::WallState;
use qf_fluids::FlowState;

/// One station of the marching mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub x: f64,
    pub area: f64,
    pub d_h: f64,
    /// Bulk state, once the march has reached this station
    pub flow: Option<FlowState>,
    pub wall: WallState,
}

impl Segment {
    pub fn from_geometry(geometry: &dyn Geometry, x: f64) -> Self {
        Self {
            x,
            area: geometry.area(x),
            d_h: geometry.hydraulic_diameter(x),
            flow: None,
            wall: WallState::default(),
        }
    }

    /// Wetted perimeter `4A/D_h`.
    pub fn perimeter(&self) -> f64 {
        4.0 * self.area / self.d_h
    }

    pub fn flow(&self) -> ChannelResult<&FlowState> {
        self.flow.as_ref().ok_or(ChannelError::InvalidArg {
            what: "segment has no flow state yet",
        })
    }
}

/// Quadratic serendipity basis on `ξ ∈ [0, 1]`, ordered (entry, exit, mid).
pub fn shape(xi: f64) -> [f64; 3] {
    [(2.0 * xi - 3.0) * xi + 1.0, xi * (2.0 * xi - 1.0), 4.0 * xi * (1.0 - xi)]
}

/// `dN/dξ` of [`shape`].
pub fn shape_dxi(xi: f64) -> [f64; 3] {
    [4.0 * xi - 3.0, 4.0 * xi - 1.0, 4.0 - 8.0 * xi]
}

/// Three adjacent segments `(entry, exit, mid)`; entry has the smaller `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub segments: [Segment; 3],
}

impl Element {
    pub fn new(entry: Segment, exit: Segment, mid: Segment) -> ChannelResult<Self> {
        if !(entry.x < mid.x && mid.x < exit.x) {
            return Err(ChannelError::InvalidGeometry {
                what: "element nodes must be ordered entry < mid < exit",
            });
        }
        Ok(Self {
            segments: [entry, exit, mid],
        })
    }

    pub fn entry(&self) -> &Segment {
        &self.segments[0]
    }

    pub fn exit(&self) -> &Segment {
        &self.segments[1]
    }

    pub fn mid(&self) -> &Segment {
        &self.segments[2]
    }

    pub fn length(&self) -> f64 {
        self.exit().x - self.entry().x
    }

    pub fn xi(&self, x: f64) -> f64 {
        (x - self.entry().x) / self.length()
    }

    /// `N · f` at `x`.
    pub fn interpolate<F: Fn(&Segment) -> f64>(&self, x: f64, f: F) -> f64 {
        let n = shape(self.xi(x));
        self.segments.iter().zip(n).map(|(s, ni)| ni * f(s)).sum()
    }

    /// `B · f = dN/dx · f` at `x`.
    pub fn gradient<F: Fn(&Segment) -> f64>(&self, x: f64, f: F) -> f64 {
        let b = shape_dxi(self.xi(x));
        let l = self.length();
        self.segments.iter().zip(b).map(|(s, bi)| bi * f(s) / l).sum()
    }

    /// Simpson integral of `f` over the element.
    pub fn simpson<F: Fn(&Segment) -> f64>(&self, f: F) -> f64 {
        self.length() / 6.0 * (f(self.entry()) + 4.0 * f(self.mid()) + f(self.exit()))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn basis_partitions_unity(xi in 0.0f64..=1.0) {
            let n = shape(xi);
            prop_assert!((n.iter().sum::<f64>() - 1.0).abs() < 1e-12);
            prop_assert!(shape_dxi(xi).iter().sum::<f64>().abs() < 1e-12);
        }

        #[test]
        fn simpson_is_exact_for_cubics(a in -5.0f64..5.0, b in -5.0f64..5.0, c in -5.0f64..5.0) {
            let seg = |x: f64| Segment {
                x,
                area: 1.0,
                d_h: 1.0,
                flow: None,
                wall: WallState { q_wall: a * x * x * x + b * x + c, ..WallState::default() },
            };
            let e = Element::new(seg(1.0), seg(2.0), seg(1.5)).unwrap();
            let exact = a * (16.0 - 1.0) / 4.0 + b * (4.0 - 1.0) / 2.0 + c;
            prop_assert!((e.simpson(|s| s.wall.q_wall) - exact).abs() < 1e-9);
        }
    }
}
