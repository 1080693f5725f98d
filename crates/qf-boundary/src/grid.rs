//! Wall-normal grid of the half channel.
//!
//! `N` cells with geometric growth away from the wall give `M = 2N+1`
//! nodes: cell boundaries at even indices, cell midpoints at odd ones.
//! Node 0 is the wall, node `M-1` the channel centre.

use crate::error::{BoundaryError, BoundaryResult};
use std::f64::consts::PI;
use std::str::FromStr;

/// Default number of cells across the half channel.
pub const DEFAULT_CELLS: usize = 60;

/// Default geometric growth ratio of successive cells.
pub const DEFAULT_RATIO: f64 = 1.1;

/// Cross-section shape of the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelKind {
    /// Circular duct; the half width is the radius `D_h/2`.
    #[default]
    Axisymmetric,
    /// Parallel plates; the half width is `D_h/4`.
    Planar,
}

impl ChannelKind {
    /// Half width of the channel for a hydraulic diameter.
    pub fn half_width(&self, d_h: f64) -> f64 {
        match self {
            ChannelKind::Axisymmetric => 0.5 * d_h,
            ChannelKind::Planar => 0.25 * d_h,
        }
    }
}

impl FromStr for ChannelKind {
    type Err = BoundaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "axisymmetric" | "round" | "circular" => Ok(ChannelKind::Axisymmetric),
            "planar" | "plane" | "rectangular" => Ok(ChannelKind::Planar),
            _ => Err(BoundaryError::InvalidArg {
                what: "unknown channel kind",
            }),
        }
    }
}

/// Node coordinates and integration weights of the half channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    kind: ChannelKind,
    half_width: f64,
    /// Wall distance of each node [m]
    y: Vec<f64>,
    /// Area weight: `2π(R_h − y)` axisymmetric, `1` planar
    weight: Vec<f64>,
}

impl Grid {
    pub fn new(kind: ChannelKind, d_h: f64, cells: usize, ratio: f64) -> BoundaryResult<Self> {
        if !(d_h.is_finite() && d_h > 0.0) {
            return Err(BoundaryError::InvalidArg {
                what: "hydraulic diameter must be positive",
            });
        }
        if cells == 0 || !(ratio.is_finite() && ratio > 0.0) {
            return Err(BoundaryError::InvalidArg {
                what: "grid needs at least one cell and a positive ratio",
            });
        }
        let half_width = kind.half_width(d_h);
        let first = if (ratio - 1.0).abs() < 1e-12 {
            half_width / cells as f64
        } else {
            half_width * (ratio - 1.0) / (ratio.powi(cells as i32) - 1.0)
        };

        let mut y = Vec::with_capacity(2 * cells + 1);
        y.push(0.0);
        let mut width = first;
        let mut edge = 0.0;
        for i in 0..cells {
            let next = if i + 1 == cells { half_width } else { edge + width };
            y.push(0.5 * (edge + next));
            y.push(next);
            edge = next;
            width *= ratio;
        }
        let weight = y
            .iter()
            .map(|yk| match kind {
                ChannelKind::Axisymmetric => 2.0 * PI * (half_width - yk),
                ChannelKind::Planar => 1.0,
            })
            .collect();
        Ok(Self {
            kind,
            half_width,
            y,
            weight,
        })
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    pub fn half_width(&self) -> f64 {
        self.half_width
    }

    /// Number of nodes `M`.
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn cells(&self) -> usize {
        self.y.len() / 2
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn weight(&self) -> &[f64] {
        &self.weight
    }

    /// Radius (axisymmetric) or centre distance (planar) of each node.
    pub fn r(&self) -> Vec<f64> {
        self.y.iter().map(|yk| self.half_width - yk).collect()
    }

    /// Normalized wall distance `η = y/R_h`.
    pub fn eta(&self, k: usize) -> f64 {
        self.y[k] / self.half_width
    }

    /// Flow area represented by the half channel: `π R_h²` or `R_h`.
    pub fn area(&self) -> f64 {
        match self.kind {
            ChannelKind::Axisymmetric => PI * self.half_width * self.half_width,
            ChannelKind::Planar => self.half_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn nodes_span_half_width() {
        let g = Grid::new(ChannelKind::Axisymmetric, 0.01, DEFAULT_CELLS, DEFAULT_RATIO).unwrap();
        assert_eq!(g.len(), 2 * DEFAULT_CELLS + 1);
        assert_eq!(g.y()[0], 0.0);
        assert_eq!(*g.y().last().unwrap(), 0.005);
        assert!(g.y().windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn cells_grow_geometrically() {
        let g = Grid::new(ChannelKind::Planar, 0.02, 10, 1.2).unwrap();
        let y = g.y();
        let w0 = y[2] - y[0];
        let w1 = y[4] - y[2];
        assert_relative_eq!(w1 / w0, 1.2, max_relative = 1e-12);
        assert_relative_eq!(g.half_width(), 0.005);
        assert_relative_eq!(y[1], 0.5 * y[2]);
    }

    #[test]
    fn uniform_ratio_is_allowed() {
        let g = Grid::new(ChannelKind::Planar, 0.04, 4, 1.0).unwrap();
        assert_relative_eq!(g.y()[2], 0.0025);
    }

    #[test]
    fn rejects_bad_diameter() {
        assert!(Grid::new(ChannelKind::Planar, -1.0, 4, 1.1).is_err());
    }

    #[test]
    fn kind_parses() {
        assert_eq!("Planar".parse::<ChannelKind>().unwrap(), ChannelKind::Planar);
        assert!("oval".parse::<ChannelKind>().is_err());
    }
}
