//! Case file schema definitions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseFile {
    pub version: u32,
    pub name: String,
    pub fluid: FluidDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inflow: Option<InflowDef>,
    pub geometry: GeometryDef,
    pub wall: WallDef,
    #[serde(default)]
    pub boundary_layer: BoundaryLayerDef,
    #[serde(default)]
    pub marcher: MarcherDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isotropic: Option<IsotropicDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinetics: Option<KineticsDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FluidDef {
    pub composition: CompositionDef,
    /// Fractions are mole fractions unless `mass`
    #[serde(default)]
    pub basis: FractionBasis,
    /// `ideal`, `srk` or `helmholtz`
    #[serde(default = "default_eos")]
    pub eos: String,
}

fn default_eos() -> String {
    "ideal".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum CompositionDef {
    Pure { species: String },
    Mixture { fractions: Vec<(String, f64)> },
}

impl CompositionDef {
    /// `(species, fraction)` pairs; a pure fluid has fraction one.
    pub fn fractions(&self) -> Vec<(String, f64)> {
        match self {
            CompositionDef::Pure { species } => vec![(species.clone(), 1.0)],
            CompositionDef::Mixture { fractions } => fractions.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FractionBasis {
    #[default]
    Mole,
    Mass,
}

/// Bulk state at the channel entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct InflowDef {
    pub t_k: f64,
    pub p_pa: f64,
    pub u_m_s: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum GeometryDef {
    CylindricalDuct {
        diameter_m: f64,
        length_m: f64,
    },
    RectangularChannel {
        width_m: f64,
        height_m: f64,
        length_m: f64,
    },
    /// Radius contour as `(x, r)` points in metres
    AxisymmetricContour { points: Vec<(f64, f64)> },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WallDef {
    pub temperature_k: f64,
    #[serde(default)]
    pub roughness_m: f64,
    /// Opposite wall of a planar channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_temperature_k: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoundaryLayerDef {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_sigma")]
    pub sigma: String,
    /// Overrides the kind implied by the geometry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bartz: Option<BartzDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spline_points: Option<usize>,
}

fn default_method() -> String {
    "eckert".to_string()
}

fn default_sigma() -> String {
    "petukhov".to_string()
}

impl Default for BoundaryLayerDef {
    fn default() -> Self {
        Self {
            method: default_method(),
            sigma: default_sigma(),
            channel: None,
            bartz: None,
            spline_points: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BartzDef {
    pub throat_diameter_m: f64,
    pub curvature_radius_m: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DirectionDef {
    #[default]
    Forward,
    Reverse,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarcherDef {
    #[serde(default = "default_elements")]
    pub elements: usize,
    #[serde(default = "default_max_iterations")]
    pub max_element_iterations: usize,
    #[serde(default = "default_tol")]
    pub tol: f64,
    #[serde(default)]
    pub direction: DirectionDef,
    #[serde(default)]
    pub reacting: bool,
}

fn default_elements() -> usize {
    20
}

fn default_max_iterations() -> usize {
    500
}

fn default_tol() -> f64 {
    1e-6
}

impl Default for MarcherDef {
    fn default() -> Self {
        Self {
            elements: default_elements(),
            max_element_iterations: default_max_iterations(),
            tol: default_tol(),
            direction: DirectionDef::Forward,
            reacting: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IsotropicDef {
    /// `chamber` or `nozzle`
    #[serde(default = "default_strategy")]
    pub strategy: String,
    pub total_t_k: f64,
    pub total_p_pa: f64,
    #[serde(default = "default_stations")]
    pub stations: usize,
    #[serde(default)]
    pub equilibrium: bool,
    #[serde(default)]
    pub direction: DirectionDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throat_area_m2: Option<f64>,
    /// Two-column `(x, Ma)` file, relative to the case file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moc_profile: Option<String>,
}

fn default_strategy() -> String {
    "chamber".to_string()
}

fn default_stations() -> usize {
    41
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KineticsDef {
    /// Chemkin mechanism file, relative to the case file
    pub mechanism: String,
    #[serde(default = "default_steps")]
    pub steps: usize,
    #[serde(default = "default_dx")]
    pub dx_m: f64,
    /// Start from the equilibrium composition at this temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equilibrium_t_k: Option<f64>,
}

fn default_steps() -> usize {
    100
}

fn default_dx() -> f64 {
    1e-3
}
