//! `sim`: reads a memory image from stdin, runs it to completion on the
//! Tomasulo core, and reports the result the way the reference machine does
//! — a single decimal byte on stdout, cycle/branch statistics on stderr.

use std::io::{self, Read};
use std::process::ExitCode;

use clap::Parser;
use tomasulo_core::common::error::SimError;
use tomasulo_core::{Config, Simulator};
use tracing_subscriber::EnvFilter;

/// Command-line front end for the RV32I Tomasulo simulator.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Cycles to run before declaring the program stuck.
    #[arg(long)]
    cycle_budget: Option<u64>,

    /// Size of the backing memory, in bytes.
    #[arg(long)]
    memory_size: Option<usize>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run() {
        Ok(exit_value) => {
            println!("{exit_value}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("fatal: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<u8, SimError> {
    let args = Args::parse();
    let mut config = Config::default();
    if let Some(cycle_budget) = args.cycle_budget {
        config.cycle_budget = cycle_budget;
    }
    if let Some(memory_size) = args.memory_size {
        config.memory_size = memory_size;
    }

    let mut image = String::new();
    io::stdin().read_to_string(&mut image).map_err(|e| SimError::MalformedImage { detail: format!("failed to read stdin: {e}") })?;

    let mut sim = Simulator::new(config);
    sim.load_image(image.as_bytes())?;

    sim.run()?;
    tracing::debug!(cycles = sim.cycle_count(), "halted");

    sim.stats().report(sim.cycle_count());

    Ok((sim.register(10) & 0xff) as u8)
}
