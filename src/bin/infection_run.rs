use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use infection::config::{DEFAULT_SEED, DEFAULT_STEPS};
use infection::{RunReport, SimConfig, Simulation};

/// Epidemic simulator: run headless and write daily counts as JSON.
#[derive(Parser, Debug)]
#[command(name = "infection-run", version)]
struct Cli {
    /// JSON file with configuration overrides, merged over the defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the random stream.
    #[arg(long = "random-seed", alias = "random_seed", default_value_t = DEFAULT_SEED)]
    random_seed: u64,

    /// Number of days to simulate.
    #[arg(long, default_value_t = DEFAULT_STEPS)]
    steps: usize,

    /// File to which the daily counts are written.
    #[arg(short = 'o', long = "output", default_value = "infection_output.json")]
    output: PathBuf,

    /// Also write the final agent states to this file.
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn main() -> Result<()> {
    infection::init_tracing("info");
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SimConfig::from_path(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => SimConfig::default(),
    };

    let mut sim = Simulation::new(config.clone(), cli.random_seed)
        .context("building simulation")?;
    let mut report = RunReport::new(cli.random_seed, config);
    for summary in sim.run(cli.steps) {
        report.push(summary);
    }
    info!(
        days = report.days.len(),
        peak_infected = report.peak_infected,
        peak_day = report.peak_day,
        "run finished"
    );

    write_json(&cli.output, &report)?;
    info!(path = %cli.output.display(), "wrote daily counts");

    if let Some(path) = &cli.snapshot {
        write_json(path, &sim.snapshot())?;
        info!(path = %path.display(), "wrote final snapshot");
    }
    Ok(())
}

fn write_json(path: &PathBuf, value: &impl serde::Serialize) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("writing {}", path.display()))
}
