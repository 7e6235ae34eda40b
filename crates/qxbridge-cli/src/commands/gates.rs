//! Gates command implementation.

use console::style;

use qxbridge_core::{DEFAULT_EPSILON, GateEntry, GateMap};

/// Execute the gates command.
pub fn execute() {
    let gatemap = GateMap::qx(DEFAULT_EPSILON, true);
    println!(
        "{} Dispatch table (first match wins, epsilon = {}):\n",
        style("Qxbridge").cyan().bold(),
        gatemap.epsilon()
    );

    for (index, entry) in gatemap.entries().iter().enumerate() {
        let (pattern, native) = describe(entry);
        println!(
            "  {:>2}  {:<24} {}",
            index,
            pattern,
            style(native).yellow()
        );
    }
}

fn describe(entry: &GateEntry) -> (String, String) {
    match entry {
        GateEntry::Unitary {
            gate,
            num_controls: 0,
            native,
        } => (gate.to_string(), native.name().to_string()),
        GateEntry::Unitary {
            gate,
            num_controls,
            native,
        } => (
            format!("{gate} + {num_controls} control(s)"),
            native.name().to_string(),
        ),
        GateEntry::Measure { basis } => (format!("measure [{basis}]"), "measure".to_string()),
        GateEntry::Prep { basis } => (format!("prep [{basis}]"), "prep".to_string()),
    }
}
