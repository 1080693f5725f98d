//! Case file validation logic.

use crate::schema::{CaseFile, CompositionDef, FluidDef, GeometryDef, IsotropicDef, KineticsDef, MarcherDef};
use std::collections::HashSet;

/// Latest case file version understood by this crate.
pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate entry: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing section: {section} (needed by {context})")]
    MissingSection { section: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be positive and finite".to_string(),
        })
    }
}

fn count(field: &str, value: usize, min: usize) -> Result<(), ValidationError> {
    if value >= min {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: format!("must be at least {min}"),
        })
    }
}

/// Structural and numeric checks; option names are resolved by the solvers.
pub fn validate_case(case: &CaseFile) -> Result<(), ValidationError> {
    if case.version == 0 || case.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion { version: case.version });
    }
    if case.name.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "name".to_string(),
            value: String::new(),
            reason: "must not be empty".to_string(),
        });
    }

    validate_fluid(&case.fluid)?;

    if let Some(inflow) = &case.inflow {
        positive("inflow t_k", inflow.t_k)?;
        positive("inflow p_pa", inflow.p_pa)?;
        positive("inflow u_m_s", inflow.u_m_s)?;
    }

    validate_geometry(&case.geometry)?;

    positive("wall temperature_k", case.wall.temperature_k)?;
    if !(case.wall.roughness_m >= 0.0 && case.wall.roughness_m.is_finite()) {
        return Err(ValidationError::InvalidValue {
            field: "wall roughness_m".to_string(),
            value: case.wall.roughness_m.to_string(),
            reason: "must be non-negative and finite".to_string(),
        });
    }
    if let Some(t2) = case.wall.second_temperature_k {
        positive("wall second_temperature_k", t2)?;
    }

    if let Some(bartz) = &case.boundary_layer.bartz {
        positive("bartz throat_diameter_m", bartz.throat_diameter_m)?;
        positive("bartz curvature_radius_m", bartz.curvature_radius_m)?;
    }
    if let Some(points) = case.boundary_layer.spline_points {
        count("boundary_layer spline_points", points, 4)?;
    }

    validate_marcher(&case.marcher)?;
    if let Some(iso) = &case.isotropic {
        validate_isotropic(iso)?;
    }
    if let Some(kin) = &case.kinetics {
        validate_kinetics(kin, case)?;
    }
    Ok(())
}

fn validate_fluid(fluid: &FluidDef) -> Result<(), ValidationError> {
    if let CompositionDef::Mixture { fractions } = &fluid.composition {
        if fractions.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "fluid fractions".to_string(),
                value: "[]".to_string(),
                reason: "mixture needs at least one species".to_string(),
            });
        }
        let mut seen = HashSet::new();
        for (species, fraction) in fractions {
            if !seen.insert(species.trim().to_ascii_uppercase()) {
                return Err(ValidationError::DuplicateId {
                    id: species.clone(),
                    context: "fluid fractions".to_string(),
                });
            }
            if !(*fraction >= 0.0 && fraction.is_finite()) {
                return Err(ValidationError::InvalidValue {
                    field: format!("fraction of '{species}'"),
                    value: fraction.to_string(),
                    reason: "must be non-negative and finite".to_string(),
                });
            }
        }
        let total: f64 = fractions.iter().map(|(_, f)| f).sum();
        if total <= 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "fluid fractions".to_string(),
                value: total.to_string(),
                reason: "fractions must not all be zero".to_string(),
            });
        }
    }
    for (species, _) in fluid.composition.fractions() {
        if species.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "fluid species".to_string(),
                value: species,
                reason: "must not be empty".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_geometry(geometry: &GeometryDef) -> Result<(), ValidationError> {
    match geometry {
        GeometryDef::CylindricalDuct { diameter_m, length_m } => {
            positive("geometry diameter_m", *diameter_m)?;
            positive("geometry length_m", *length_m)?;
        }
        GeometryDef::RectangularChannel {
            width_m,
            height_m,
            length_m,
        } => {
            positive("geometry width_m", *width_m)?;
            positive("geometry height_m", *height_m)?;
            positive("geometry length_m", *length_m)?;
        }
        GeometryDef::AxisymmetricContour { points } => {
            count("geometry contour points", points.len(), 2)?;
            for (i, (x, r)) in points.iter().enumerate() {
                if !x.is_finite() {
                    return Err(ValidationError::InvalidValue {
                        field: format!("contour point {i} x"),
                        value: x.to_string(),
                        reason: "must be finite".to_string(),
                    });
                }
                positive(&format!("contour point {i} r"), *r)?;
            }
            if let Some(i) = points.windows(2).position(|w| w[1].0 <= w[0].0) {
                return Err(ValidationError::InvalidValue {
                    field: format!("contour point {} x", i + 1),
                    value: points[i + 1].0.to_string(),
                    reason: "x must increase strictly".to_string(),
                });
            }
        }
    }
    Ok(())
}

fn validate_marcher(marcher: &MarcherDef) -> Result<(), ValidationError> {
    count("marcher elements", marcher.elements, 1)?;
    count("marcher max_element_iterations", marcher.max_element_iterations, 1)?;
    positive("marcher tol", marcher.tol)
}

fn validate_isotropic(iso: &IsotropicDef) -> Result<(), ValidationError> {
    positive("isotropic total_t_k", iso.total_t_k)?;
    positive("isotropic total_p_pa", iso.total_p_pa)?;
    count("isotropic stations", iso.stations, 2)?;
    if let Some(area) = iso.throat_area_m2 {
        positive("isotropic throat_area_m2", area)?;
    }
    if let Some(path) = &iso.moc_profile
        && path.trim().is_empty()
    {
        return Err(ValidationError::InvalidValue {
            field: "isotropic moc_profile".to_string(),
            value: path.clone(),
            reason: "must name a file".to_string(),
        });
    }
    Ok(())
}

fn validate_kinetics(kin: &KineticsDef, case: &CaseFile) -> Result<(), ValidationError> {
    if kin.mechanism.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "kinetics mechanism".to_string(),
            value: kin.mechanism.clone(),
            reason: "must name a file".to_string(),
        });
    }
    count("kinetics steps", kin.steps, 1)?;
    positive("kinetics dx_m", kin.dx_m)?;
    if let Some(t) = kin.equilibrium_t_k {
        positive("kinetics equilibrium_t_k", t)?;
    }
    if case.inflow.is_none() {
        return Err(ValidationError::MissingSection {
            section: "inflow".to_string(),
            context: "kinetics".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::*;

    fn duct_case() -> CaseFile {
        CaseFile {
            version: 1,
            name: "duct".to_string(),
            fluid: FluidDef {
                composition: CompositionDef::Pure {
                    species: "N2".to_string(),
                },
                basis: FractionBasis::Mole,
                eos: "ideal".to_string(),
            },
            inflow: Some(InflowDef {
                t_k: 300.0,
                p_pa: 2e5,
                u_m_s: 30.0,
            }),
            geometry: GeometryDef::CylindricalDuct {
                diameter_m: 0.01,
                length_m: 0.5,
            },
            wall: WallDef {
                temperature_k: 500.0,
                roughness_m: 0.0,
                second_temperature_k: None,
            },
            boundary_layer: BoundaryLayerDef::default(),
            marcher: MarcherDef::default(),
            isotropic: None,
            kinetics: None,
        }
    }

    #[test]
    fn accepts_plain_duct() {
        validate_case(&duct_case()).unwrap();
    }

    #[test]
    fn rejects_future_version() {
        let mut case = duct_case();
        case.version = LATEST_VERSION + 1;
        assert!(matches!(
            validate_case(&case),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn rejects_non_monotone_contour() {
        let mut case = duct_case();
        case.geometry = GeometryDef::AxisymmetricContour {
            points: vec![(0.0, 0.04), (0.1, 0.02), (0.1, 0.03)],
        };
        let err = validate_case(&case).unwrap_err();
        assert!(err.to_string().contains("contour point 2 x"), "{err}");
    }

    #[test]
    fn rejects_duplicate_and_negative_fractions() {
        let mut case = duct_case();
        case.fluid.composition = CompositionDef::Mixture {
            fractions: vec![("N2".to_string(), 0.79), ("n2".to_string(), 0.21)],
        };
        assert!(matches!(validate_case(&case), Err(ValidationError::DuplicateId { .. })));

        case.fluid.composition = CompositionDef::Mixture {
            fractions: vec![("N2".to_string(), 1.0), ("O2".to_string(), -0.1)],
        };
        assert!(matches!(validate_case(&case), Err(ValidationError::InvalidValue { .. })));
    }

    #[test]
    fn kinetics_needs_inflow() {
        let mut case = duct_case();
        case.inflow = None;
        case.kinetics = Some(KineticsDef {
            mechanism: "h2_air.inp".to_string(),
            steps: 10,
            dx_m: 1e-3,
            equilibrium_t_k: None,
        });
        assert!(matches!(
            validate_case(&case),
            Err(ValidationError::MissingSection { .. })
        ));
    }

    #[test]
    fn rejects_zero_elements() {
        let mut case = duct_case();
        case.marcher.elements = 0;
        assert!(validate_case(&case).is_err());
    }
}
