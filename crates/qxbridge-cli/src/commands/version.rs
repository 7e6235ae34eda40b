//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - qubit virtualization and batching for fixed-width simulators",
        style("Qxbridge").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qxbridge-ir           Operations, matrices and native ops");
    println!("  qxbridge-hal          Engine and noise model traits");
    println!("  qxbridge-core         Qubit map, dispatch table and batching");
    println!("  qxbridge-adapter-sim  Local statevector engine");
    println!("  qxbridge-cli          Command-line interface");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
