//! Run command implementation.

use anyhow::{Result, bail};
use console::style;

use qxbridge_adapter_sim::{DepolarizingChannel, StatevectorFactory};
use qxbridge_core::QxBackend;

use crate::script::{StepRecord, load_script};

/// Execute the run command.
pub fn execute(input: &str, seed: Option<u64>, max_slots: Option<usize>, format: &str) -> Result<()> {
    let json = match format.to_lowercase().as_str() {
        "table" => false,
        "json" => true,
        other => bail!("Unknown format: '{other}'. Available: table, json"),
    };

    let script = load_script(input)?;
    let mut engine = script.engine.clone();
    if seed.is_some() {
        engine.seed = seed;
    }
    if let Some(max_slots) = max_slots {
        engine.max_slots = max_slots;
    }

    if !json {
        println!(
            "{} Replaying {} ({} steps)",
            style("→").cyan().bold(),
            style(input).green(),
            script.steps.len()
        );
    }

    let channel = match engine.seed {
        Some(seed) => DepolarizingChannel::with_seed(seed),
        None => DepolarizingChannel::new(),
    };
    let mut backend =
        QxBackend::new(StatevectorFactory::with_config(engine)).with_noise_injector(Box::new(channel));
    backend.initialize(script.config.clone())?;

    let records = script.replay(&mut backend)?;
    let stats = backend.stats();

    if json {
        let report = serde_json::json!({
            "measurements": records,
            "stats": stats,
            "num_slots": backend.allocator().num_slots(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_records(&records);
    println!();
    println!(
        "  Slots: {}  Circuits: {}  Native ops: {}  Injected errors: {}",
        backend.allocator().num_slots(),
        stats.circuits,
        stats.native_ops,
        stats.injected_errors
    );
    println!("{} Done", style("✓").green().bold());
    Ok(())
}

fn print_records(records: &[StepRecord]) {
    if records.is_empty() {
        println!("  No measurements.");
        return;
    }
    for record in records {
        let outcomes: Vec<String> = record
            .outcomes
            .iter()
            .map(|(qubit, value)| format!("{qubit}={value}"))
            .collect();
        println!(
            "  step {:>3}: {}",
            record.step,
            style(outcomes.join(" ")).yellow()
        );
    }
}
