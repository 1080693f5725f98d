//! Per-node wall fields exchanged with the structural side.

use crate::error::{ChannelError, ChannelResult};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Named scalar field of a wall mesh node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MeshField {
    /// Wall temperature, read by the solvers
    WallTemperature,
    /// Wall heat flux, positive into the wall
    HeatFlux,
    /// Fluid reference (recovery) temperature
    RecoveryTemperature,
    /// Heat-transfer coefficient
    Alpha,
    FluidTemperature,
    FluidPressure,
    FluidMach,
}

impl MeshField {
    pub const ALL: [MeshField; 7] = [
        MeshField::WallTemperature,
        MeshField::HeatFlux,
        MeshField::RecoveryTemperature,
        MeshField::Alpha,
        MeshField::FluidTemperature,
        MeshField::FluidPressure,
        MeshField::FluidMach,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MeshField::WallTemperature => "T",
            MeshField::HeatFlux => "dotQ",
            MeshField::RecoveryTemperature => "Tinf",
            MeshField::Alpha => "alpha",
            MeshField::FluidTemperature => "T_fluid",
            MeshField::FluidPressure => "p_fluid",
            MeshField::FluidMach => "Ma_fluid",
        }
    }
}

impl fmt::Display for MeshField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MeshField {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MeshField::ALL
            .into_iter()
            .find(|f| f.name() == s.trim())
            .ok_or(ChannelError::InvalidArg {
                what: "unknown mesh field",
            })
    }
}

/// Node-addressed field store the marchers read from and write to.
pub trait MeshFields {
    /// Number of nodes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, field: MeshField, node: usize) -> ChannelResult<f64>;

    fn set(&mut self, field: MeshField, node: usize, value: f64) -> ChannelResult<()>;
}

/// In-memory field store, one column per [`MeshField`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodeFields {
    x: Vec<f64>,
    columns: BTreeMap<MeshField, Vec<f64>>,
}

impl NodeFields {
    /// Nodes at axial positions `x`, every field zero.
    pub fn new(x: Vec<f64>) -> Self {
        let n = x.len();
        let columns = MeshField::ALL.into_iter().map(|f| (f, vec![0.0; n])).collect();
        Self { x, columns }
    }

    /// Set `field` to `value` on every node.
    pub fn with_uniform(mut self, field: MeshField, value: f64) -> Self {
        if let Some(col) = self.columns.get_mut(&field) {
            col.fill(value);
        }
        self
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn column(&self, field: MeshField) -> &[f64] {
        self.columns.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl MeshFields for NodeFields {
    fn len(&self) -> usize {
        self.x.len()
    }

    fn get(&self, field: MeshField, node: usize) -> ChannelResult<f64> {
        self.column(field).get(node).copied().ok_or(ChannelError::InvalidArg {
            what: "mesh node out of range",
        })
    }

    fn set(&mut self, field: MeshField, node: usize, value: f64) -> ChannelResult<()> {
        let slot = self
            .columns
            .get_mut(&field)
            .and_then(|c| c.get_mut(node))
            .ok_or(ChannelError::InvalidArg {
                what: "mesh node out of range",
            })?;
        *slot = value;
        Ok(())
    }
}
