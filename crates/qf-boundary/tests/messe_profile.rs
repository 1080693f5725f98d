//! Full profile solve (Messe method) on a cold-wall air duct.

use qf_boundary::{BoundaryLayer, ChannelKind, FrictionMethod, Parameters, SigmaMode, Slot};
use qf_fluids::{Composition, Mixture, PropertySplines, Species};

fn air() -> Mixture {
    Mixture::ideal(
        Composition::from_mole_fractions(vec![(Species::N2, 0.79), (Species::O2, 0.21)]).unwrap(),
    )
}

fn cold_wall(method: FrictionMethod) -> BoundaryLayer {
    let mut bl = BoundaryLayer::new(air(), ChannelKind::Axisymmetric, method, SigmaMode::Petukhov).unwrap();
    bl.set_hydraulic_diameter(0.01).unwrap();
    bl.set_wall_temperature(400.0);
    bl.set_flow_conditions(600.0, 1e5, 50.0, true).unwrap();
    bl
}

#[test]
fn messe_balances_mass_and_momentum() {
    let mut bl = cold_wall(FrictionMethod::Messe);
    let mut params = Parameters::new(0.0, 7.853_981_6e-5);
    bl.compute(&mut params, false).unwrap();

    assert!(params.get(Slot::ErrMass).abs() < 1e-6);
    assert!(params.get(Slot::ErrMomentum).abs() < 1e-6);
    assert!(params.get(Slot::ErrEnergy).is_finite());

    let w = params.wall();
    assert!(w.tau_wall > 0.0);
    assert!(w.q_wall > 0.0, "q = {}", w.q_wall);
    assert!(w.alpha > 0.0);
    assert!(w.y_plus_1 > 0.0 && w.y_plus_1 < 1.0);
    let u_c = params.get(Slot::UCenter);
    assert!(u_c > 50.0 && u_c < 75.0, "u_c = {u_c}");

    let profile = bl.profile().unwrap();
    let n = profile.u.len();
    assert_eq!(profile.u[0], 0.0);
    assert_eq!(profile.tau[n - 1], 0.0);
    assert!(profile.t[1] < profile.t[n - 1]);

    // same order as the reference-temperature estimate
    let mut eckert = cold_wall(FrictionMethod::Eckert);
    let mut reference = Parameters::new(0.0, 7.853_981_6e-5);
    eckert.compute(&mut reference, false).unwrap();
    let ratio = w.tau_wall / reference.get(Slot::TauWall);
    assert!(ratio > 0.5 && ratio < 2.0, "tau ratio = {ratio}");
    let q_ratio = w.q_wall / reference.get(Slot::QWall);
    assert!(q_ratio > 0.3 && q_ratio < 3.0, "q ratio = {q_ratio}");
}

#[test]
fn messe_accepts_prebuilt_splines() {
    let gas = air();
    let tables = PropertySplines::build(&gas, 1e5, 300.0, 700.0, 201).unwrap();
    let mut bl = BoundaryLayer::new(gas, ChannelKind::Axisymmetric, FrictionMethod::Messe, SigmaMode::Petukhov)
        .unwrap();
    bl.set_hydraulic_diameter(0.01).unwrap();
    bl.set_wall_temperature(400.0);
    bl.set_flow_conditions_with_splines(600.0, 1e5, 50.0, &tables.matrices())
        .unwrap();
    assert_eq!(bl.splines().unwrap().t_range(), (300.0, 700.0));

    let mut params = Parameters::new(0.0, 7.853_981_6e-5);
    bl.compute(&mut params, false).unwrap();
    // covering tables are kept
    assert_eq!(bl.splines().unwrap().t_range(), (300.0, 700.0));
    assert!(params.get(Slot::ErrMass).abs() < 1e-6);
}

#[test]
fn messe_heated_wall_stays_on_tables() {
    let mut bl = BoundaryLayer::new(air(), ChannelKind::Axisymmetric, FrictionMethod::Messe, SigmaMode::Petukhov)
        .unwrap();
    bl.set_hydraulic_diameter(0.01).unwrap();
    bl.set_wall_temperature(600.0);
    bl.set_flow_conditions(300.0, 1e5, 30.0, true).unwrap();
    let mut params = Parameters::new(0.0, 7.853_981_6e-5);
    bl.compute(&mut params, false).unwrap();

    assert!(params.get(Slot::ErrMass).abs() < 1e-6);
    assert!(params.get(Slot::ErrMomentum).abs() < 1e-6);
    let (t_lo, t_hi) = bl.splines().unwrap().t_range();
    let t_c = params.get(Slot::TCenter);
    assert!(t_c >= t_lo && t_c <= t_hi, "T_c = {t_c}");
    // hot wall: heat leaves the wall
    assert!(params.wall().q_wall < 0.0);
}

#[test]
fn messe_methane_coolant_channel() {
    let gas = qf_fluids::Mixture::new(Composition::pure(Species::CH4), qf_fluids::EosKind::Srk).unwrap();
    let mut bl = BoundaryLayer::new(gas, ChannelKind::Axisymmetric, FrictionMethod::Messe, SigmaMode::Petukhov)
        .unwrap();
    bl.set_hydraulic_diameter(0.004).unwrap();
    bl.set_surface_roughness(3.2e-6).unwrap();
    bl.set_wall_temperature(600.0);
    bl.set_flow_conditions(160.0, 120e5, 30.0, true).unwrap();
    let mut params = Parameters::new(0.0, 1.256_637e-5);
    bl.compute(&mut params, false).unwrap();

    assert!(params.get(Slot::ErrMass).abs() < 1e-6);
    let w = params.wall();
    assert!(w.tau_wall > 0.0);
    assert!(w.q_wall < 0.0, "q = {}", w.q_wall);
}
