/*
 * Boid Flocking Simulation - Headless Runner
 *
 * Builds a flock from command-line flags (optionally layered over a JSON
 * parameter file), steps it for a fixed number of ticks and prints the
 * result as JSON. With --snapshots every tick's agent state is written as
 * one JSON line, which is what an external visualiser consumes. With
 * --batch-seeds several independent runs are executed in parallel.
 */

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

use flockers::batch::run_many;
use flockers::{Flock, FlockParams};

#[derive(Parser, Debug)]
#[command(name = "flockers", version, about = "Run a boid flocking simulation without a window")]
struct Cli {
    /// JSON file with flock parameters; flags below override it
    #[arg(long)]
    params: Option<PathBuf>,

    #[arg(long)]
    population: Option<usize>,
    #[arg(long)]
    width: Option<f64>,
    #[arg(long)]
    height: Option<f64>,
    /// Wrap around the edges instead of bouncing off them (`--toroidal false` to turn off)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    toroidal: Option<bool>,
    #[arg(long)]
    speed: Option<f64>,
    #[arg(long)]
    vision: Option<f64>,
    #[arg(long)]
    minimum_separation: Option<f64>,
    #[arg(long)]
    max_separate_angle: Option<f64>,
    #[arg(long)]
    max_cohere_angle: Option<f64>,
    #[arg(long)]
    max_align_angle: Option<f64>,
    /// Leave fading trace agents behind every boid (`--trace false` to turn off)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    trace: Option<bool>,
    #[arg(long)]
    initial_age: Option<u32>,
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to run
    #[arg(long, default_value_t = 100)]
    ticks: u64,

    /// Print the full agent state after every tick (JSON lines)
    #[arg(long)]
    snapshots: bool,

    /// Run one independent flock per seed in parallel and print summaries
    #[arg(long, value_delimiter = ',')]
    batch_seeds: Vec<u64>,
}

impl Cli {
    fn flock_params(&self) -> Result<FlockParams> {
        let params = match &self.params {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading parameter file {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing parameter file {}", path.display()))?
            }
            None => FlockParams::default(),
        };

        Ok(self.overlay(params))
    }

    // Flags given on the command line win over the file or the defaults
    fn overlay(&self, mut params: FlockParams) -> FlockParams {
        if let Some(population) = self.population {
            params.population = population;
        }
        if let Some(width) = self.width {
            params.width = width;
        }
        if let Some(height) = self.height {
            params.height = height;
        }
        if let Some(toroidal) = self.toroidal {
            params.toroidal = toroidal;
        }
        if let Some(speed) = self.speed {
            params.speed = speed;
        }
        if let Some(vision) = self.vision {
            params.vision = vision;
        }
        if let Some(minimum_separation) = self.minimum_separation {
            params.minimum_separation = minimum_separation;
        }
        if let Some(angle) = self.max_separate_angle {
            params.max_separate_angle = angle;
        }
        if let Some(angle) = self.max_cohere_angle {
            params.max_cohere_angle = angle;
        }
        if let Some(angle) = self.max_align_angle {
            params.max_align_angle = angle;
        }
        if let Some(trace) = self.trace {
            params.trace_agents = trace;
        }
        if let Some(initial_age) = self.initial_age {
            params.initial_age = initial_age;
        }
        if self.seed.is_some() {
            params.seed = self.seed;
        }

        params
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let params = cli.flock_params()?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if !cli.batch_seeds.is_empty() {
        let summaries = run_many(&params, &cli.batch_seeds, cli.ticks)?;
        for summary in &summaries {
            serde_json::to_writer(&mut out, summary)?;
            writeln!(out)?;
        }
        out.flush()?;
        return Ok(());
    }

    let mut flock = Flock::new(params)?;
    info!(seed = flock.seed(), ticks = cli.ticks, "running flock");

    for _ in 0..cli.ticks {
        if !flock.step() {
            break;
        }
        if cli.snapshots {
            serde_json::to_writer(&mut out, &flock.snapshot())?;
            writeln!(out)?;
        }
    }

    let stats = flock.stats();
    info!(
        tick = stats.tick,
        polarization = stats.polarization,
        mean_nearest_distance = ?stats.mean_nearest_distance,
        "run finished"
    );
    if !cli.snapshots {
        serde_json::to_writer_pretty(&mut out, &stats)?;
        writeln!(out)?;
    }
    out.flush()?;

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}
