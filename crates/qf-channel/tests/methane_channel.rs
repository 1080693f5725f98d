//! Heated methane cooling channel, marched element by element.

use approx::assert_relative_eq;
use qf_boundary::{BoundaryLayer, ChannelKind, FrictionMethod, SigmaMode};
use qf_channel::{CylindricalDuct, Direction, Inflow, MarchSummary, Marcher, MarcherConfig, MeshField};
use qf_fluids::{Composition, EosKind, Mixture, Species};

const INFLOW: Inflow = Inflow {
    t: 160.0,
    p: 120e5,
    u: 30.0,
};

fn marcher(direction: Direction, method: FrictionMethod) -> Marcher {
    let gas = Mixture::new(Composition::pure(Species::CH4), EosKind::Srk).unwrap();
    let mut bl = BoundaryLayer::new(gas, ChannelKind::Axisymmetric, method, SigmaMode::Petukhov).unwrap();
    bl.set_surface_roughness(3.2e-6).unwrap();
    let duct = CylindricalDuct::new(4e-3, 0.5).unwrap();
    Marcher::new(
        Box::new(duct),
        bl,
        MarcherConfig {
            direction,
            ..MarcherConfig::default()
        },
    )
    .unwrap()
}

fn run(direction: Direction, method: FrictionMethod) -> (Marcher, qf_channel::NodeFields, MarchSummary) {
    let mut m = marcher(direction, method);
    let mut mesh = m.mesh(600.0);
    let summary = m.march(&mut mesh, INFLOW).unwrap();
    (m, mesh, summary)
}

#[test]
fn heated_methane_channel_balances_energy() {
    let (m, mesh, s) = run(Direction::Forward, FrictionMethod::Eckert);

    assert!(s.heat_to_fluid > 0.0, "Q = {}", s.heat_to_fluid);
    assert!(s.energy_imbalance().abs() < 0.01, "imbalance = {}", s.energy_imbalance());
    assert!(s.outlet.t > 300.0 && s.outlet.t < 500.0, "T_out = {}", s.outlet.t);
    assert!(s.outlet.p < INFLOW.p);
    assert!(s.outlet.u > INFLOW.u);
    assert!(s.outlet.ma < 1.0);
    assert_eq!(s.iterations.len(), 20);
    assert!(s.iterations.iter().all(|&i| i >= 2));

    // every station carries the same mass flow
    for seg in m.segments() {
        assert_relative_eq!(seg.flow().unwrap().mass_flow(), s.mass_flow, max_relative = 1e-5);
    }
    // the warm wall heats the fluid everywhere
    for (i, q) in mesh.column(MeshField::HeatFlux).iter().enumerate() {
        assert!(*q < 0.0, "q[{i}] = {q}");
    }
    let t = mesh.column(MeshField::FluidTemperature);
    assert!(t.windows(2).all(|w| w[1] > w[0]));
    assert_relative_eq!(t[0], INFLOW.t, max_relative = 1e-12);
}

#[test]
fn reverse_march_enters_at_the_far_end() {
    let (m, _, s) = run(Direction::Reverse, FrictionMethod::Eckert);
    let segs = m.segments();
    assert_relative_eq!(s.inlet.x, segs[segs.len() - 1].x);
    assert_relative_eq!(s.outlet.x, segs[0].x);
    assert!(s.outlet.t > INFLOW.t);
    assert!(s.outlet.p < INFLOW.p);
    assert!(s.energy_imbalance().abs() < 0.01, "imbalance = {}", s.energy_imbalance());
}

#[test]
fn heated_methane_channel_with_profile_solve() {
    let (m, mesh, s) = run(Direction::Forward, FrictionMethod::Messe);

    assert!(s.heat_to_fluid > 0.0, "Q = {}", s.heat_to_fluid);
    assert!(s.energy_imbalance().abs() < 0.01, "imbalance = {}", s.energy_imbalance());
    assert!(s.outlet.t > 300.0 && s.outlet.t < 500.0, "T_out = {}", s.outlet.t);
    assert!(s.outlet.p < INFLOW.p);
    for seg in m.segments() {
        assert_relative_eq!(seg.flow().unwrap().mass_flow(), s.mass_flow, max_relative = 1e-5);
    }
    for (i, q) in mesh.column(MeshField::HeatFlux).iter().enumerate() {
        assert!(*q < 0.0, "q[{i}] = {q}");
    }
}
