//! CSV tables printed by the commands.

use qf_boundary::{Parameters, Slot};
use qf_channel::{CriticalState, MarchSummary, Segment};
use qf_fluids::{FlowState, Species};

const STATION_HEADER: &str = "x_m,area_m2,T_K,p_Pa,u_m_s,Ma,T_wall_K,q_wall_W_m2,tau_wall_Pa,T_recovery_K,alpha_W_m2K";

fn state_line(label: &str, s: &FlowState) -> String {
    format!(
        "# {label}: T={:.3} K p={:.1} Pa u={:.3} m/s Ma={:.4} h_t={:.1} J/kg\n",
        s.t, s.p, s.u, s.ma, s.h_t
    )
}

/// One row per solved station.
pub fn stations(name: &str, segments: &[Segment]) -> String {
    let mut out = format!("# case: {name}\n{STATION_HEADER}\n");
    for seg in segments {
        let Some(flow) = &seg.flow else { continue };
        let w = &seg.wall;
        out.push_str(&format!(
            "{:.6},{:.6e},{:.3},{:.1},{:.4},{:.5},{:.3},{:.6e},{:.6e},{:.3},{:.4}\n",
            seg.x, seg.area, flow.t, flow.p, flow.u, flow.ma, w.t_wall, w.q_wall, w.tau_wall, w.t_recovery, w.alpha
        ));
    }
    out
}

pub fn march(name: &str, summary: &MarchSummary, segments: &[Segment]) -> String {
    let mut out = format!(
        "# mass_flow={:.6e} kg/s heat_to_fluid={:.6e} W energy_imbalance={:.3e}\n",
        summary.mass_flow,
        summary.heat_to_fluid,
        summary.energy_imbalance()
    );
    out.push_str(&state_line("inlet", &summary.inlet));
    out.push_str(&state_line("outlet", &summary.outlet));
    let iterations: Vec<String> = summary.iterations.iter().map(|n| n.to_string()).collect();
    out.push_str(&format!("# element iterations: {}\n", iterations.join(" ")));
    out.push_str(&stations(name, segments));
    out
}

pub fn nozzle(name: &str, critical: Option<&CriticalState>, segments: &[Segment]) -> String {
    let mut out = String::new();
    if let Some(c) = critical {
        out.push_str(&format!(
            "# critical: T={:.3} K p={:.1} Pa u={:.3} m/s area={:.6e} m2 mass_flow={:.6e} kg/s\n",
            c.t, c.p, c.u, c.area, c.mass_flow
        ));
    }
    out.push_str(&stations(name, segments));
    out
}

/// `slot,value` pairs of a parameters record.
pub fn wall(name: &str, params: &Parameters) -> String {
    let mut out = format!("# case: {name}\nslot,value\n");
    for slot in Slot::ALL.iter().take(params.len()) {
        out.push_str(&format!("{},{:.9e}\n", slot.label(), params.get(*slot)));
    }
    out
}

/// Reaction history: axial position, residence time, temperature and
/// mass fractions.
pub fn kinetics(name: &str, species: &[Species], rows: &[(f64, f64, f64, Vec<f64>)]) -> String {
    let mut out = format!("# case: {name}\nx_m,t_s,T_K");
    for s in species {
        out.push_str(&format!(",Y_{}", s.key()));
    }
    out.push('\n');
    for (x, time, t, y) in rows {
        out.push_str(&format!("{x:.6},{time:.6e},{t:.3}"));
        for yk in y {
            out.push_str(&format!(",{yk:.6e}"));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_table_lists_every_slot() {
        let mut p = Parameters::new(0.1, 2e-4);
        p.set(Slot::QWall, 1.5e6).unwrap();
        let table = wall("duct", &p);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2 + 24);
        assert_eq!(lines[1], "slot,value");
        assert!(lines.iter().any(|l| l.starts_with("q_wall_W_m2,1.5")));
        assert!(!table.contains("T_wall2_K"));
    }

    #[test]
    fn kinetics_table_has_species_columns() {
        let rows = vec![(0.0, 0.0, 2800.0, vec![0.1, 0.9]), (1e-3, 1e-5, 2810.0, vec![0.09, 0.91])];
        let table = kinetics("h2", &[Species::H2, Species::N2], &rows);
        let mut lines = table.lines().skip(1);
        assert_eq!(lines.next(), Some("x_m,t_s,T_K,Y_H2,Y_N2"));
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn stations_skip_unsolved_segments() {
        let seg = Segment {
            x: 0.0,
            area: 1e-4,
            d_h: 0.01,
            flow: None,
            wall: Default::default(),
        };
        let table = stations("empty", &[seg]);
        assert_eq!(table.lines().count(), 2);
    }
}
