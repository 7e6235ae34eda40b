//! Depolarizing channel noise model.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use qxbridge_hal::{NoiseInjector, NoisyCircuit};
use qxbridge_ir::{Circuit, NativeOp};

/// Inserts a uniformly random Pauli error after each unitary gate, on each
/// slot the gate touches, with the configured probability.
pub struct DepolarizingChannel {
    rng: StdRng,
}

impl DepolarizingChannel {
    /// Create an entropy-seeded channel.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a channel with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for DepolarizingChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseInjector for DepolarizingChannel {
    fn name(&self) -> &str {
        "depolarizing"
    }

    fn inject(&mut self, circuit: &Circuit, error_probability: f64) -> NoisyCircuit {
        let p = error_probability.clamp(0.0, 1.0);
        let mut noisy = Circuit::new(circuit.name(), circuit.num_slots());
        let mut injected_errors = 0;

        for op in circuit.ops() {
            noisy.push(op.clone());
            if !op.is_unitary() {
                continue;
            }
            for slot in op.slots() {
                if self.rng.r#gen::<f64>() < p {
                    let error = match self.rng.gen_range(0..3) {
                        0 => NativeOp::PauliX(slot),
                        1 => NativeOp::PauliY(slot),
                        _ => NativeOp::PauliZ(slot),
                    };
                    trace!("Inserted {} after {}", error, op);
                    noisy.push(error);
                    injected_errors += 1;
                }
            }
        }

        NoisyCircuit {
            circuit: noisy,
            injected_errors,
        }
    }
}
