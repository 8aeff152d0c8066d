//! Collider CLI
//!
//! Sweeps difficulty and collision order, printing three lines per point:
//! the `d * 100 + k` key, the mean draw count and its coefficient of
//! variation.
//!
//! # Example
//!
//! ```bash
//! # Pairs and triples for d = 1..=20, 200 trials each
//! collider --diff 20 --cols 3 --iters 200
//!
//! # A single point with per-trial diagnostics
//! collider --min-diff 24 --diff 24 --min-cols 4 --cols 4 --debug
//! ```

use std::process::ExitCode;

use clap::Parser;
use collider::{Sweep, SweepConfig, SweepError};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Collider k-fold collision estimator
#[derive(Parser, Debug)]
#[command(name = "collider")]
#[command(version, about, long_about = None)]
struct Args {
    /// Largest difficulty (bits) to sweep
    #[arg(long, default_value = "32")]
    diff: u32,

    /// Largest collision order to sweep
    #[arg(long, default_value = "3")]
    cols: usize,

    /// Trials per point
    #[arg(long, default_value = "100")]
    iters: usize,

    /// Log per-trial diagnostics
    #[arg(long)]
    debug: bool,

    /// Smallest difficulty to sweep
    #[arg(long, default_value = "1")]
    min_diff: u32,

    /// Smallest collision order to sweep
    #[arg(long, default_value = "2")]
    min_cols: usize,

    /// Worker threads per trial. Defaults to the number of CPUs.
    #[arg(long)]
    workers: Option<usize>,
}

impl Args {
    fn sweep_config(&self) -> SweepConfig {
        let config = SweepConfig::new(self.diff, self.cols)
            .with_min_difficulty(self.min_diff)
            .with_min_collision_order(self.min_cols)
            .with_iterations(self.iters)
            .with_debug(self.debug);
        match self.workers {
            Some(workers) => config.with_workers(workers),
            None => config,
        }
    }
}

fn run(args: &Args) -> Result<(), SweepError> {
    let sweep = Sweep::new(args.sweep_config())?;
    info!(
        points = sweep.config().points(),
        iterations = sweep.config().iterations,
        workers = sweep.config().workers,
        "Starting sweep"
    );

    sweep.run_with(|point| {
        println!("{}", point.key);
        println!("{}", point.stats.mean);
        println!("{}", point.stats.cv);
    })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,collider=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
