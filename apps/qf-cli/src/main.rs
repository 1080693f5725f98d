use clap::{ArgAction, Parser, Subcommand};
use qf_boundary::Parameters;
use qf_channel::{IsotropicChannel, Marcher, MocProfile, Strategy};
use qf_kinetics::{Mechanism, ReactionScheme, SchemeConfig};
use qf_project::CaseFile;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{Level, error, info};

mod error;
mod report;
mod setup;

use error::{CliError, CliResult};

#[derive(Parser)]
#[command(name = "qf-cli")]
#[command(about = "QuasiFlow CLI - quasi-one-dimensional channel flow and wall heat loads", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate case file syntax and values
    Validate {
        /// Case files (YAML, or JSON by extension)
        #[arg(required = true)]
        cases: Vec<PathBuf>,
    },
    /// March a heated or cooled channel element by element
    March {
        #[arg(required = true)]
        cases: Vec<PathBuf>,
    },
    /// Wall loads of the inlet cross-section at the inflow state
    Wall {
        #[arg(required = true)]
        cases: Vec<PathBuf>,
    },
    /// Isentropic chamber or nozzle with wall loads at every station
    Nozzle {
        #[arg(required = true)]
        cases: Vec<PathBuf>,
    },
    /// Finite-rate chemistry at constant pressure along the channel axis
    Kinetics {
        #[arg(required = true)]
        cases: Vec<PathBuf>,
    },
}

type Command = fn(&Path, &CaseFile) -> CliResult<String>;

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (cases, command): (Vec<PathBuf>, Command) = match cli.command {
        Commands::Validate { cases } => (cases, cmd_validate),
        Commands::March { cases } => (cases, cmd_march),
        Commands::Wall { cases } => (cases, cmd_wall),
        Commands::Nozzle { cases } => (cases, cmd_nozzle),
        Commands::Kinetics { cases } => (cases, cmd_kinetics),
    };
    run_all(&cases, command)
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Solve every case on its own solver instances in parallel; tables are
/// printed in argument order once all cases finished.
fn run_all(paths: &[PathBuf], command: Command) -> CliResult<()> {
    let results: Vec<Result<String, String>> = paths
        .par_iter()
        .map(|path| -> Result<String, String> {
            let case = qf_project::load_case(path).map_err(|e| format!("{}: {e}", path.display()))?;
            info!(case = %case.name, path = %path.display(), "case loaded");
            command(path, &case).map_err(|e| format!("{}: {e}", path.display()))
        })
        .collect();

    let mut failed = 0;
    for result in &results {
        match result {
            Ok(table) => print!("{table}"),
            Err(message) => {
                failed += 1;
                error!("✗ {message}");
            }
        }
    }
    if failed > 0 {
        return Err(CliError::Failed {
            failed,
            total: paths.len(),
        });
    }
    Ok(())
}

fn cmd_validate(_path: &Path, case: &CaseFile) -> CliResult<String> {
    Ok(format!("✓ {} is valid\n", case.name))
}

fn cmd_march(_path: &Path, case: &CaseFile) -> CliResult<String> {
    let inflow = setup::inflow(case, "march")?;
    let geometry = setup::geometry(&case.geometry)?;
    let bl = setup::boundary_layer(case, geometry.as_ref(), setup::mixture(&case.fluid)?)?;
    let mut marcher = Marcher::new(geometry, bl, setup::marcher_config(&case.marcher))?;
    let mut mesh = marcher.mesh(case.wall.temperature_k);
    let summary = marcher.march(&mut mesh, inflow)?;
    info!(
        case = %case.name,
        mass_flow = summary.mass_flow,
        heat = summary.heat_to_fluid,
        t_out = summary.outlet.t,
        "march finished"
    );
    Ok(report::march(&case.name, &summary, marcher.segments()))
}

fn cmd_wall(_path: &Path, case: &CaseFile) -> CliResult<String> {
    let inflow = setup::inflow(case, "wall")?;
    let geometry = setup::geometry(&case.geometry)?;
    let mut bl = setup::boundary_layer(case, geometry.as_ref(), setup::mixture(&case.fluid)?)?;
    let x = geometry.start();
    bl.set_hydraulic_diameter(geometry.hydraulic_diameter(x))?;
    bl.set_flow_conditions(inflow.t, inflow.p, inflow.u, true)?;
    let mut params = match case.wall.second_temperature_k {
        Some(_) => Parameters::with_second_wall(x, geometry.area(x)),
        None => Parameters::new(x, geometry.area(x)),
    };
    bl.compute(&mut params, false)?;
    if let Some(t_w2) = case.wall.second_temperature_k {
        bl.compute_second_wall(&mut params, t_w2)?;
    }
    Ok(report::wall(&case.name, &params))
}

fn cmd_nozzle(path: &Path, case: &CaseFile) -> CliResult<String> {
    let def = case.isotropic.as_ref().ok_or_else(|| CliError::MissingSection {
        case: case.name.clone(),
        section: "isotropic",
        command: "nozzle",
    })?;
    let geometry = setup::geometry(&case.geometry)?;
    let bl = setup::boundary_layer(case, geometry.as_ref(), setup::mixture(&case.fluid)?)?;
    let strategy: Strategy = def.strategy.parse()?;
    let config = setup::isotropic_config(def, case.boundary_layer.spline_points);
    let mut channel = IsotropicChannel::new(geometry, bl, strategy, config)?;
    let mut mesh = channel.mesh(case.wall.temperature_k);
    channel.set_total(def.total_t_k, def.total_p_pa)?;
    match &def.moc_profile {
        Some(name) => {
            let profile = MocProfile::from_file(setup::resolve(path, name))?;
            channel.critical_state()?;
            channel.apply_moc(&profile)?;
            channel.build_tables(&mesh)?;
            channel.compute_walls(&mut mesh)?;
        }
        None => channel.run(&mut mesh)?,
    }
    Ok(report::nozzle(&case.name, channel.critical(), channel.segments()))
}

fn cmd_kinetics(path: &Path, case: &CaseFile) -> CliResult<String> {
    let inflow = setup::inflow(case, "kinetics")?;
    let def = case.kinetics.as_ref().ok_or_else(|| CliError::MissingSection {
        case: case.name.clone(),
        section: "kinetics",
        command: "kinetics",
    })?;
    let mut mix = setup::mixture(&case.fluid)?;
    if let Some(t_eq) = def.equilibrium_t_k {
        mix.remix_to_equilibrium(t_eq, inflow.p)?;
    }
    let mechanism = Mechanism::from_file(setup::resolve(path, &def.mechanism))?;
    let mut scheme = ReactionScheme::new(mechanism, &mix, SchemeConfig::default())?;

    let mut t = inflow.t;
    let mut rows = Vec::with_capacity(def.steps + 1);
    rows.push((0.0, 0.0, t, mix.mass_fractions().to_vec()));
    for i in 1..=def.steps {
        let step = scheme.step(&mut mix, t, inflow.p, inflow.u, def.dx_m)?;
        t = step.t;
        // the carried correction makes every step span Δx/u
        let x = i as f64 * def.dx_m;
        rows.push((x, x / inflow.u, t, step.mass_fractions));
    }
    info!(case = %case.name, steps = def.steps, t_out = t, "kinetics finished");
    Ok(report::kinetics(&case.name, mix.species(), &rows))
}
