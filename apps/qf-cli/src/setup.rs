//! Solver objects from a case file.

use crate::error::{CliError, CliResult};
use qf_boundary::{BoundaryLayer, BoundaryLayerConfig, ChannelKind, FrictionMethod, SigmaMode};
use qf_channel::{
    AxisymmetricContour, CylindricalDuct, Direction, Geometry, Inflow, IsotropicConfig, MarcherConfig,
    RectangularChannel,
};
use qf_fluids::{Composition, EosKind, FluidResult, Mixture, Species};
use qf_project::{CaseFile, DirectionDef, FluidDef, FractionBasis, GeometryDef, IsotropicDef, MarcherDef};
use std::path::{Path, PathBuf};

pub fn mixture(fluid: &FluidDef) -> CliResult<Mixture> {
    let items = fluid
        .composition
        .fractions()
        .into_iter()
        .map(|(label, fraction)| Ok((label.parse::<Species>()?, fraction)))
        .collect::<FluidResult<Vec<_>>>()?;
    let comp = match fluid.basis {
        FractionBasis::Mole => Composition::from_mole_fractions(items)?,
        FractionBasis::Mass => Composition::from_mass_fractions(items)?,
    };
    let eos: EosKind = fluid.eos.parse()?;
    Ok(Mixture::new(comp, eos)?)
}

pub fn geometry(def: &GeometryDef) -> CliResult<Box<dyn Geometry>> {
    Ok(match def {
        GeometryDef::CylindricalDuct { diameter_m, length_m } => Box::new(CylindricalDuct::new(*diameter_m, *length_m)?),
        GeometryDef::RectangularChannel {
            width_m,
            height_m,
            length_m,
        } => Box::new(RectangularChannel::new(*width_m, *height_m, *length_m)?),
        GeometryDef::AxisymmetricContour { points } => Box::new(AxisymmetricContour::new(points)?),
    })
}

/// Boundary layer for `geometry` with the wall and method settings of the case.
pub fn boundary_layer(case: &CaseFile, geometry: &dyn Geometry, gas: Mixture) -> CliResult<BoundaryLayer> {
    let def = &case.boundary_layer;
    let kind = match &def.channel {
        Some(name) => name.parse::<ChannelKind>()?,
        None => geometry.kind(),
    };
    let method: FrictionMethod = def.method.parse()?;
    let sigma: SigmaMode = def.sigma.parse()?;
    let mut bl = BoundaryLayer::new(gas, kind, method, sigma)?.with_config(BoundaryLayerConfig {
        spline_points: def.spline_points,
        ..BoundaryLayerConfig::default()
    });
    bl.set_surface_roughness(case.wall.roughness_m)?;
    bl.set_wall_temperature(case.wall.temperature_k);
    if let Some(bartz) = &def.bartz {
        bl.set_bartz_geometry_params(bartz.throat_diameter_m, bartz.curvature_radius_m)?;
    }
    Ok(bl)
}

pub fn direction(def: DirectionDef) -> Direction {
    match def {
        DirectionDef::Forward => Direction::Forward,
        DirectionDef::Reverse => Direction::Reverse,
    }
}

pub fn marcher_config(def: &MarcherDef) -> MarcherConfig {
    MarcherConfig {
        elements: def.elements,
        max_element_iterations: def.max_element_iterations,
        tol: def.tol,
        direction: direction(def.direction),
        reacting: def.reacting,
        ..MarcherConfig::default()
    }
}

pub fn isotropic_config(def: &IsotropicDef, spline_points: Option<usize>) -> IsotropicConfig {
    IsotropicConfig {
        stations: def.stations,
        equilibrium: def.equilibrium,
        direction: direction(def.direction),
        throat_area: def.throat_area_m2,
        spline_points,
    }
}

pub fn inflow(case: &CaseFile, command: &'static str) -> CliResult<Inflow> {
    let def = case.inflow.ok_or_else(|| CliError::MissingSection {
        case: case.name.clone(),
        section: "inflow",
        command,
    })?;
    Ok(Inflow {
        t: def.t_k,
        p: def.p_pa,
        u: def.u_m_s,
    })
}

/// Path named in a case file, relative to the case file's directory.
pub fn resolve(case_path: &Path, name: &str) -> PathBuf {
    let named = Path::new(name);
    if named.is_absolute() {
        return named.to_path_buf();
    }
    case_path.parent().unwrap_or_else(|| Path::new(".")).join(named)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qf_project::{BoundaryLayerDef, CompositionDef, InflowDef, WallDef};

    fn case() -> CaseFile {
        CaseFile {
            version: 1,
            name: "duct".to_string(),
            fluid: FluidDef {
                composition: CompositionDef::Mixture {
                    fractions: vec![("N2".to_string(), 0.79), ("O2".to_string(), 0.21)],
                },
                basis: FractionBasis::Mole,
                eos: "ideal".to_string(),
            },
            inflow: Some(InflowDef {
                t_k: 300.0,
                p_pa: 2e5,
                u_m_s: 30.0,
            }),
            geometry: GeometryDef::RectangularChannel {
                width_m: 0.002,
                height_m: 0.004,
                length_m: 0.3,
            },
            wall: WallDef {
                temperature_k: 500.0,
                roughness_m: 1e-6,
                second_temperature_k: None,
            },
            boundary_layer: BoundaryLayerDef::default(),
            marcher: MarcherDef {
                direction: DirectionDef::Reverse,
                ..MarcherDef::default()
            },
            isotropic: None,
            kinetics: None,
        }
    }

    #[test]
    fn builds_solvers_from_case() {
        let case = case();
        let mix = mixture(&case.fluid).unwrap();
        assert_eq!(mix.species(), &[Species::N2, Species::O2]);
        let geo = geometry(&case.geometry).unwrap();
        let bl = boundary_layer(&case, geo.as_ref(), mix).unwrap();
        assert_eq!(bl.kind(), ChannelKind::Planar);
        assert_eq!(bl.method(), FrictionMethod::Eckert);
        assert_eq!(bl.wall_temperature(), 500.0);
        assert_eq!(marcher_config(&case.marcher).direction, Direction::Reverse);
        assert_eq!(inflow(&case, "march").unwrap().p, 2e5);
    }

    #[test]
    fn unknown_names_are_errors() {
        let mut case = case();
        case.fluid.composition = CompositionDef::Pure {
            species: "XE".to_string(),
        };
        assert!(mixture(&case.fluid).is_err());

        let mut case = self::case();
        case.boundary_layer.sigma = "vandriest".to_string();
        let mix = mixture(&case.fluid).unwrap();
        let geo = geometry(&case.geometry).unwrap();
        assert!(boundary_layer(&case, geo.as_ref(), mix).is_err());
    }

    #[test]
    fn missing_inflow_is_reported() {
        let mut case = case();
        case.inflow = None;
        let err = inflow(&case, "kinetics").unwrap_err();
        assert!(err.to_string().contains("inflow"));
    }

    #[test]
    fn paths_resolve_next_to_case() {
        let p = resolve(Path::new("cases/nozzle.yaml"), "profile.moc");
        assert_eq!(p, Path::new("cases/profile.moc"));
        assert_eq!(resolve(Path::new("nozzle.yaml"), "/tmp/a.moc"), Path::new("/tmp/a.moc"));
    }
}
