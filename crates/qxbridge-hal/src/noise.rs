//! Noise model seam.

use qxbridge_ir::Circuit;

/// Result of passing a circuit through a noise model.
#[derive(Debug, Clone)]
pub struct NoisyCircuit {
    /// The circuit to execute in place of the original.
    pub circuit: Circuit,
    /// Number of error operations inserted.
    pub injected_errors: usize,
}

/// Transforms an ideal circuit into a noisy one.
pub trait NoiseInjector {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Return a circuit with errors inserted at rate `error_probability`.
    fn inject(&mut self, circuit: &Circuit, error_probability: f64) -> NoisyCircuit;
}
