use std::path::PathBuf;

use bacon_shor::{
    error::ScheduleError,
    schedule::{parse_batch, Batch, SimulationConfig},
    Snapshot, StepReport, TimeStepController,
};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use simple_logger::SimpleLogger;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// One of off, error, warn, info, debug, trace.
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LevelFilter,

    /// Write the snapshot after every step to this file as JSON.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Runs the schedule stored in a JSON config.
    Replay {
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,
    },
    /// Runs batches given on the command line, e.g. `--step "1,2;3,4"`.
    Run {
        #[arg(long, default_value_t = 4)]
        rows: usize,

        #[arg(long, default_value_t = 4)]
        cols: usize,

        #[arg(long = "step", value_name = "BATCH")]
        steps: Vec<String>,
    },
    /// Measures randomly chosen lattice edges.
    Random {
        #[arg(long, default_value_t = 4)]
        rows: usize,

        #[arg(long, default_value_t = 4)]
        cols: usize,

        #[arg(long, default_value_t = 5)]
        steps: usize,

        /// Number of distinct edges measured per step.
        #[arg(long, default_value_t = 4)]
        per_step: usize,

        #[arg(long)]
        seed: Option<u64>,
    },
}

fn random_schedule(
    config: &SimulationConfig,
    steps: usize,
    per_step: usize,
    seed: Option<u64>,
) -> Result<Vec<Batch>, ScheduleError> {
    let lattice = config.lattice()?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let edges = lattice.edges();
    Ok((0..steps)
        .map(|_| edges.choose_multiple(&mut rng, per_step).copied().collect::<Batch>())
        .collect())
}

fn print_step(controller: &TimeStepController, report: &StepReport) {
    println!("=== Time Step {} ===", report.step);
    for ((a, b), reason) in report.rejected.iter() {
        println!("Invalid measurement ({}, {}): {}", a, b, reason);
    }
    println!("Stabilizer Generators:");
    for g in controller.current_generators() {
        println!("{}", g);
    }
}

fn main() -> Result<(), ScheduleError> {
    let cli = Cli::parse();
    SimpleLogger::new()
        .with_level(cli.log_level)
        .init()
        .expect("logger is only installed once");

    let config = match cli.command {
        Command::Replay { config } => SimulationConfig::from_file(config)?,
        Command::Run { rows, cols, steps } => SimulationConfig {
            rows,
            cols,
            steps: steps
                .iter()
                .map(|s| parse_batch(s))
                .collect::<Result<_, _>>()?,
        },
        Command::Random {
            rows,
            cols,
            steps,
            per_step,
            seed,
        } => {
            let mut config = SimulationConfig {
                rows,
                cols,
                steps: Vec::new(),
            };
            config.steps = random_schedule(&config, steps, per_step, seed)?;
            config
        }
    };

    let mut controller = TimeStepController::new(config.lattice()?);
    println!("Qubit Grid Positions:");
    print!("{}", controller.lattice());
    let mut snapshots: Vec<Snapshot> = Vec::with_capacity(config.steps.len());
    for batch in config.steps.iter() {
        let report = controller.submit(batch);
        print_step(&controller, &report);
        snapshots.push(controller.snapshot());
    }

    if let Some(path) = cli.output {
        std::fs::write(&path, serde_json::to_string_pretty(&snapshots)?)?;
        log::info!("wrote {} snapshots to {:?}", snapshots.len(), path);
    }
    Ok(())
}
