//! Correlation methods through the `BoundaryLayer` front end.

use approx::assert_relative_eq;
use qf_boundary::{
    BoundaryError, BoundaryLayer, ChannelKind, FrictionMethod, Parameters, SigmaMode, Slot,
};
use qf_fluids::{Composition, EosKind, FluidError, Mixture, Species};

fn air() -> Mixture {
    Mixture::ideal(
        Composition::from_mole_fractions(vec![
            (Species::N2, 0.7808),
            (Species::O2, 0.2095),
            (Species::Ar, 0.0097),
        ])
        .unwrap(),
    )
}

fn srk_methane() -> Mixture {
    Mixture::new(Composition::pure(Species::CH4), EosKind::Srk).unwrap()
}

fn solver(gas: Mixture, kind: ChannelKind, method: FrictionMethod, d_h: f64, t_w: f64) -> BoundaryLayer {
    let mut bl = BoundaryLayer::new(gas, kind, method, SigmaMode::Petukhov).unwrap();
    bl.set_hydraulic_diameter(d_h).unwrap();
    bl.set_wall_temperature(t_w);
    bl
}

#[test]
fn eckert_air_duct() {
    let mut bl = solver(air(), ChannelKind::Axisymmetric, FrictionMethod::Eckert, 0.01, 350.0);
    bl.set_flow_conditions(300.0, 1e5, 30.0, false).unwrap();
    let mut params = Parameters::new(0.1, 7.853_981_6e-5);
    bl.compute(&mut params, false).unwrap();

    let w = params.wall();
    assert!(w.tau_wall > 0.0);
    // heat flows from the warm wall into the gas
    assert!(w.q_wall * (w.t_recovery - w.t_wall) > 0.0);
    assert!(w.alpha > 100.0 && w.alpha < 2000.0, "alpha = {}", w.alpha);
    let pr = params.get(Slot::PrMean);
    assert!(pr > 0.69 && pr < 0.74, "Pr = {pr}");
    assert!(w.y_plus_1 > 0.0 && w.y_plus_1 < 1.0);
    assert_relative_eq!(params.get(Slot::TCenter), 300.0);
    assert_relative_eq!(params.get(Slot::X), 0.1);
    let re = params.get(Slot::ReDh);
    assert!(re > 1.5e4 && re < 2.5e4, "Re = {re}");
}

#[test]
fn rough_wall_raises_eckert_friction() {
    let mut smooth = solver(air(), ChannelKind::Axisymmetric, FrictionMethod::Eckert, 0.01, 350.0);
    smooth.set_flow_conditions(300.0, 1e5, 30.0, false).unwrap();
    let mut rough = smooth.clone();
    rough.set_surface_roughness(10e-6).unwrap();

    let (mut a, mut b) = (Parameters::new(0.0, 0.0), Parameters::new(0.0, 0.0));
    smooth.compute(&mut a, false).unwrap();
    rough.compute(&mut b, false).unwrap();
    assert!(b.get(Slot::TauWall) > a.get(Slot::TauWall));
}

#[test]
fn bartz_hot_gas() {
    let mut bl = solver(air(), ChannelKind::Axisymmetric, FrictionMethod::Bartz, 0.05, 800.0);
    bl.set_flow_conditions(2500.0, 20e5, 400.0, false).unwrap();
    let mut params = Parameters::new(0.0, 0.0);
    assert!(matches!(
        bl.compute(&mut params, false),
        Err(BoundaryError::InvalidGeometry { .. })
    ));
    bl.set_bartz_geometry_params(0.04, 0.02).unwrap();
    bl.compute(&mut params, false).unwrap();
    let w = params.wall();
    assert!(w.q_wall > 0.0 && w.tau_wall > 0.0);
    assert!(w.alpha > 100.0, "alpha = {}", w.alpha);
    assert!(w.t_recovery > 2500.0);
}

#[test]
fn bartz_rejects_real_gas() {
    let mut bl = solver(srk_methane(), ChannelKind::Axisymmetric, FrictionMethod::Bartz, 0.004, 500.0);
    bl.set_bartz_geometry_params(0.04, 0.02).unwrap();
    bl.set_flow_conditions(300.0, 60e5, 20.0, false).unwrap();
    let mut params = Parameters::new(0.0, 0.0);
    assert!(matches!(
        bl.compute(&mut params, false),
        Err(BoundaryError::Fluid(FluidError::InvalidMixture { .. }))
    ));
}

#[test]
fn methane_correlations_heat_the_coolant() {
    for method in [FrictionMethod::Pizzarelli, FrictionMethod::LebedinskyKalmykov] {
        let mut bl = solver(srk_methane(), ChannelKind::Axisymmetric, method, 0.004, 500.0);
        bl.set_surface_roughness(3.2e-6).unwrap();
        bl.set_flow_conditions(300.0, 60e5, 20.0, false).unwrap();
        let mut params = Parameters::new(0.0, 1.2566e-5);
        bl.compute(&mut params, false).unwrap();
        let w = params.wall();
        assert!(w.tau_wall > 0.0, "{method}");
        // hot wall: heat leaves the wall
        assert!(w.q_wall < 0.0, "{method}: q = {}", w.q_wall);
        assert!(w.alpha > 0.0, "{method}");
        assert_eq!(w.t_recovery, 300.0);
        assert_eq!(params.get(Slot::ErrMass), 0.0);
    }
}

#[test]
fn second_wall_fills_upper_slots() {
    let mut bl = solver(air(), ChannelKind::Planar, FrictionMethod::Eckert, 0.02, 350.0);
    bl.set_flow_conditions(300.0, 1e5, 30.0, false).unwrap();
    let mut params = Parameters::with_second_wall(0.0, 0.005);
    bl.compute(&mut params, false).unwrap();
    let first = params.wall();
    bl.compute_second_wall(&mut params, 500.0).unwrap();

    let second = params.second_wall().unwrap();
    assert_eq!(second.t_wall, 500.0);
    assert_eq!(params.wall(), first);
    assert_eq!(bl.wall_temperature(), 350.0);
    // hotter wall, more heat into the gas
    assert!(second.q_wall < first.q_wall);
    assert_eq!(params.get(Slot::Alpha2), second.alpha);

    let mut short = Parameters::new(0.0, 0.005);
    assert!(bl.compute_second_wall(&mut short, 500.0).is_err());
}
