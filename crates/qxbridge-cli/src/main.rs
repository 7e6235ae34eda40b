//! Qxbridge Command-Line Interface
//!
//! Replays allocation, gate and measurement scripts against the local
//! statevector engine through the full qubit-mapping and batching stack.
//!
//! ```text
//! qxbridge run -i bell.yaml --seed 7
//! qxbridge gates
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;
mod script;

use commands::{gates, run, version};

/// Qxbridge - qubit virtualization and batching for fixed-width simulators
#[derive(Parser)]
#[command(name = "qxbridge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a script against the statevector engine
    Run {
        /// Input script (YAML or JSON)
        #[arg(short, long)]
        input: String,

        /// RNG seed for measurement sampling and noise
        #[arg(short, long, env = "QXBRIDGE_SEED")]
        seed: Option<u64>,

        /// Largest register the engine may allocate
        #[arg(long)]
        max_slots: Option<usize>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// List the gate dispatch table
    Gates,

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Run {
            input,
            seed,
            max_slots,
            format,
        } => run::execute(&input, seed, max_slots, &format),

        Commands::Gates => {
            gates::execute();
            Ok(())
        }

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
