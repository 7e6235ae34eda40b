//! Statevector simulation engine.

use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::time::Instant;
use tracing::{debug, instrument};

use qxbridge_hal::{EngineError, EngineFactory, EngineResult, QuantumEngine};
use qxbridge_ir::{Circuit, NativeOp, PauliBasis, SlotId};

/// Default slot ceiling: 2^24 amplitudes, 256 MiB of state.
pub const DEFAULT_MAX_SLOTS: usize = 24;

/// Settings for [`StatevectorFactory`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Largest register the factory will construct.
    pub max_slots: usize,
    /// RNG seed for measurement sampling. Entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_slots: DEFAULT_MAX_SLOTS,
            seed: None,
        }
    }
}

/// Builds [`StatevectorEngine`]s.
#[derive(Debug, Clone, Default)]
pub struct StatevectorFactory {
    config: SimulatorConfig,
}

impl StatevectorFactory {
    /// Create a factory with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a factory from explicit settings.
    pub fn with_config(config: SimulatorConfig) -> Self {
        Self { config }
    }

    /// Settings in use.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }
}

impl EngineFactory for StatevectorFactory {
    type Engine = StatevectorEngine;

    fn construct(&self, num_slots: usize) -> EngineResult<StatevectorEngine> {
        if num_slots > self.config.max_slots {
            return Err(EngineError::ResourceExhausted {
                num_slots,
                reason: format!("limit is {} slots", self.config.max_slots),
            });
        }
        StatevectorEngine::new(num_slots, self.config.seed)
    }
}

/// A statevector over a fixed register, with a per-slot measurement register.
pub struct StatevectorEngine {
    /// The state amplitudes (2^n complex numbers). Slot `k` is bit `k`.
    amplitudes: Vec<Complex64>,
    /// Number of slots.
    num_slots: usize,
    /// Latest measurement outcome per slot.
    measurements: Vec<Option<bool>>,
    rng: StdRng,
}

impl StatevectorEngine {
    /// Create a new register initialized to |0...0⟩.
    pub fn new(num_slots: usize, seed: Option<u64>) -> EngineResult<Self> {
        if num_slots >= usize::BITS as usize {
            return Err(EngineError::ResourceExhausted {
                num_slots,
                reason: "state size overflows the address space".into(),
            });
        }
        let size = 1usize << num_slots;

        let mut amplitudes = Vec::new();
        amplitudes
            .try_reserve_exact(size)
            .map_err(|e| EngineError::ResourceExhausted {
                num_slots,
                reason: e.to_string(),
            })?;
        amplitudes.resize(size, Complex64::new(0.0, 0.0));
        amplitudes[0] = Complex64::new(1.0, 0.0);

        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            amplitudes,
            num_slots,
            measurements: vec![None; num_slots],
            rng,
        })
    }

    /// State amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Probability of observing one on `slot` in the computational basis.
    pub fn probability_one(&self, slot: SlotId) -> f64 {
        let mask = slot.mask();
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum()
    }

    fn check_slots(&self, circuit: &Circuit) -> EngineResult<()> {
        if circuit.num_slots() != self.num_slots {
            return Err(EngineError::WidthMismatch {
                name: circuit.name().to_string(),
                expected: circuit.num_slots(),
                actual: self.num_slots,
            });
        }
        for op in circuit.ops() {
            if let Some(slot) = op.slots().into_iter().find(|s| s.0 >= self.num_slots) {
                return Err(EngineError::SlotOutOfRange {
                    slot: slot.0,
                    num_slots: self.num_slots,
                });
            }
        }
        Ok(())
    }

    /// Apply one native operation.
    fn apply(&mut self, op: &NativeOp) {
        match *op {
            NativeOp::Identity(_) => {}
            NativeOp::Hadamard(q) => self.apply_h(q.0),
            NativeOp::PauliX(q) => self.apply_x(q.0),
            NativeOp::PauliY(q) => self.apply_y(q.0),
            NativeOp::PauliZ(q) => self.apply_z(q.0),
            NativeOp::PhaseS(q) => self.apply_phase(q.0, PI / 2.0),
            NativeOp::SDag(q) => self.apply_phase(q.0, -PI / 2.0),
            NativeOp::T(q) => self.apply_phase(q.0, PI / 4.0),
            NativeOp::TDag(q) => self.apply_phase(q.0, -PI / 4.0),
            NativeOp::Rx(q, theta) => self.apply_rx(q.0, theta),
            NativeOp::Ry(q, theta) => self.apply_ry(q.0, theta),
            NativeOp::Rz(q, theta) => self.apply_rz(q.0, theta),
            NativeOp::Cnot { control, target } => self.apply_cx(control.0, target.0),
            NativeOp::CtrlPhaseShift {
                control,
                target,
                angle,
            } => self.apply_cp(control.0, target.0, angle),
            NativeOp::Swap(a, b) => self.apply_swap(a.0, b.0),
            NativeOp::Toffoli {
                control1,
                control2,
                target,
            } => self.apply_ccx(control1.0, control2.0, target.0),
            NativeOp::Measure { slot, basis } => {
                let outcome = self.measure(slot.0, basis);
                self.measurements[slot.0] = Some(outcome);
            }
            NativeOp::Prep { slot, basis } => self.prep(slot.0, basis),
        }
    }

    // =========================================================================
    // Single-qubit gate implementations
    // =========================================================================

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    fn apply_y(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let i_val = Complex64::new(0.0, 1.0);
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let tmp = self.amplitudes[i];
                self.amplitudes[i] = -i_val * self.amplitudes[j];
                self.amplitudes[j] = i_val * tmp;
            }
        }
    }

    fn apply_z(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp = -*amp;
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = FRAC_1_SQRT_2 * (a + b);
                self.amplitudes[j] = FRAC_1_SQRT_2 * (a - b);
            }
        }
    }

    fn apply_phase(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase = Complex64::from_polar(1.0, theta);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp *= phase;
            }
        }
    }

    fn apply_rx(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let neg_i_s = Complex64::new(0.0, -(theta / 2.0).sin());
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a + neg_i_s * b;
                self.amplitudes[j] = neg_i_s * a + c * b;
            }
        }
    }

    fn apply_ry(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - s * b;
                self.amplitudes[j] = s * a + c * b;
            }
        }
    }

    fn apply_rz(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask == 0 {
                *amp *= phase_0;
            } else {
                *amp *= phase_1;
            }
        }
    }

    // =========================================================================
    // Multi-qubit gate implementations
    // =========================================================================

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    fn apply_cp(&mut self, control: usize, target: usize, theta: f64) {
        let mask = (1 << control) | (1 << target);
        let phase = Complex64::from_polar(1.0, theta);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask == mask {
                *amp *= phase;
            }
        }
    }

    fn apply_swap(&mut self, q1: usize, q2: usize) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        for i in 0..self.amplitudes.len() {
            if (i & mask1 != 0) && (i & mask2 == 0) {
                let j = (i & !mask1) | mask2;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_ccx(&mut self, c1: usize, c2: usize, target: usize) {
        let ctrl_mask = (1 << c1) | (1 << c2);
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask == ctrl_mask) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    // =========================================================================
    // Measurement and preparation
    // =========================================================================

    /// Rotate `basis` onto the computational basis.
    fn rotate_to_z(&mut self, qubit: usize, basis: PauliBasis) {
        match basis {
            PauliBasis::Z => {}
            PauliBasis::X => self.apply_h(qubit),
            PauliBasis::Y => {
                self.apply_phase(qubit, -PI / 2.0);
                self.apply_h(qubit);
            }
        }
    }

    fn rotate_from_z(&mut self, qubit: usize, basis: PauliBasis) {
        match basis {
            PauliBasis::Z => {}
            PauliBasis::X => self.apply_h(qubit),
            PauliBasis::Y => {
                self.apply_h(qubit);
                self.apply_phase(qubit, PI / 2.0);
            }
        }
    }

    /// Projective computational-basis measurement with collapse.
    fn measure_z(&mut self, qubit: usize) -> bool {
        let p1 = self.probability_one(SlotId(qubit));
        let r: f64 = self.rng.r#gen();
        let outcome = r < p1;

        let mask = 1 << qubit;
        let mut norm_sq = 0.0;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if ((i & mask) != 0) == outcome {
                norm_sq += amp.norm_sqr();
            } else {
                *amp = Complex64::new(0.0, 0.0);
            }
        }

        let norm = norm_sq.sqrt();
        if norm > 0.0 {
            for amp in &mut self.amplitudes {
                *amp /= norm;
            }
        }
        outcome
    }

    fn measure(&mut self, qubit: usize, basis: PauliBasis) -> bool {
        self.rotate_to_z(qubit, basis);
        let outcome = self.measure_z(qubit);
        self.rotate_from_z(qubit, basis);
        outcome
    }

    fn prep(&mut self, qubit: usize, basis: PauliBasis) {
        if self.measure_z(qubit) {
            self.apply_x(qubit);
        }
        self.rotate_from_z(qubit, basis);
    }
}

impl QuantumEngine for StatevectorEngine {
    fn num_slots(&self) -> usize {
        self.num_slots
    }

    #[instrument(skip(self, circuit), fields(circuit = circuit.name(), ops = circuit.len()))]
    fn execute(&mut self, circuit: &Circuit) -> EngineResult<()> {
        self.check_slots(circuit)?;

        let start = Instant::now();
        for op in circuit.ops() {
            self.apply(op);
        }
        debug!("Executed {} in {:?}", circuit.name(), start.elapsed());
        Ok(())
    }

    fn measurement(&self, slot: SlotId) -> Option<bool> {
        self.measurements.get(slot.0).copied().flatten()
    }
}
