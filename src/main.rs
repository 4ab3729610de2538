//! ----------------------
//! Author: Sang Young Noh
//! ----------------------
//!
//! ------------------------
//! Last Updated: 18/10/2026
//! ------------------------
//!

/*

Command-line runner for the reactive engine.

    reactive-md presets
    reactive-md run --preset hydrogen-combustion --steps 5000 --energy-csv energy.csv

A run places the preset inside the reactor, initializes the engine, steps it
with a progress bar and logs every change in the species list. The energy
history and the final snapshot can be written out for plotting.
*/

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use itertools::Itertools;
use kdam::{tqdm, BarExt};
use log::{error, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use reactive_md::presets::{generate_preset, PRESETS};
use reactive_md::{
    write_energy_csv, EnergyRecord, Result, SimConfig, SimConfigUpdate, SimulationEngine, Species,
};

#[derive(Parser)]
#[command(
    name = "reactive-md",
    about = "Reactive molecular dynamics for small H/C/N/O systems",
    version
)]
struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a preset mixture
    Run(RunArgs),

    /// List the available presets
    Presets,
}

#[derive(Args)]
struct RunArgs {
    /// Preset id (see `reactive-md presets`)
    #[arg(short, long)]
    preset: String,

    /// Number of steps after initialization
    #[arg(short = 'n', long, default_value_t = 2000)]
    steps: u64,

    /// JSON configuration file; missing fields take their defaults
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for placement and velocities
    #[arg(long)]
    seed: Option<u64>,

    /// Confinement radius in A
    #[arg(long)]
    radius: Option<f64>,

    /// Target temperature in K
    #[arg(long)]
    temperature: Option<f64>,

    /// Write the energy history here
    #[arg(long, value_name = "FILE")]
    energy_csv: Option<PathBuf>,

    /// Write the final snapshot here as JSON
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// No progress bar
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "reactive_md=debug" } else { "reactive_md=info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp_millis()
        .init();
}

fn describe(species: &[Species]) -> String {
    species
        .iter()
        .map(|s| format!("{} x{}", s.formula, s.count))
        .join(", ")
}

fn list_presets() {
    for preset in PRESETS {
        println!("{:<22}{:<22}{}", preset.id, preset.name, preset.description);
    }
}

fn run(args: RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SimConfig::from_json_file(path)?,
        None => SimConfig::default(),
    };
    config.apply(&SimConfigUpdate {
        seed: args.seed,
        confinement_radius: args.radius,
        target_temperature: args.temperature,
        ..Default::default()
    })?;

    let mut rng = match config.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };
    let atoms = generate_preset(&args.preset, config.confinement_radius, &mut rng)?;
    info!("{}: {} atoms, R = {} A", args.preset, atoms.len(), config.confinement_radius);

    let mut engine = SimulationEngine::init(atoms, config)?;
    let mut snapshot = engine.snapshot();
    info!("step 0: {}", describe(&snapshot.species));

    let mut records = Vec::with_capacity(args.steps as usize + 1);
    records.push(EnergyRecord::from(&snapshot));

    let mut bar = (!args.quiet).then(|| tqdm!(total = args.steps as usize, desc = "steps"));
    for _ in 0..args.steps {
        let next = engine.step();
        if next.species != snapshot.species {
            info!("step {}: {}", next.step, describe(&next.species));
        }
        records.push(EnergyRecord::from(&next));
        snapshot = next;
        if let Some(bar) = bar.as_mut() {
            bar.update(1)?;
        }
    }
    if bar.is_some() {
        eprintln!();
    }

    info!(
        "finished {} steps ({:.1} fs): T = {:.1} K, E = {:.4} eV",
        snapshot.step, snapshot.time, snapshot.temperature, snapshot.total_energy
    );

    if let Some(path) = &args.energy_csv {
        write_energy_csv(BufWriter::new(File::create(path)?), &records)?;
        info!("energy history written to {}", path.display());
    }
    if let Some(path) = &args.snapshot {
        serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), &snapshot)?;
        info!("final snapshot written to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match cli.command {
        Command::Presets => {
            list_presets();
            Ok(())
        }
        Command::Run(args) => run(args),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
