//! Deferred batching of native operations.
//!
//! Native ops accumulate in a pending list until something forces a
//! flush: a measurement, or an explicit drain. A flush packages the
//! pending ops into a [`Circuit`] named `circuit_<n>`, optionally runs it
//! through the noise injector, and executes it on the engine. The first
//! flush constructs the engine at the allocator's current width and freezes
//! the allocator.

use std::mem;
use std::time::Instant;

use tracing::{debug, error, info, instrument};

use qxbridge_hal::{EngineFactory, NoiseInjector, QuantumEngine};
use qxbridge_ir::{Circuit, NativeOp};

use crate::allocator::SlotAllocator;
use crate::error::{BackendError, BackendResult};

/// Where the assembler is in its accumulate/flush cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    /// Nothing pending.
    Empty,
    /// At least one op pending.
    Accumulating,
    /// A flush is in progress.
    Flushing,
}

/// Summary of one flush.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlushReport {
    /// Name of the executed circuit, `None` when nothing ran.
    pub circuit: Option<String>,
    /// Native ops submitted, before noise.
    pub num_ops: usize,
    /// Ops added by the noise injector.
    pub injected_errors: usize,
}

struct NoiseSettings {
    injector: Box<dyn NoiseInjector>,
    error_probability: f64,
}

/// Collects native ops and executes them in batches.
pub struct BatchAssembler<F: EngineFactory> {
    factory: F,
    engine: Option<F::Engine>,
    state: BatchState,
    pending: Vec<NativeOp>,
    circuit_counter: usize,
    noise: Option<NoiseSettings>,
}

impl<F: EngineFactory> BatchAssembler<F> {
    /// Create an assembler that will build its engine with `factory`.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            engine: None,
            state: BatchState::Empty,
            pending: Vec::new(),
            circuit_counter: 0,
            noise: None,
        }
    }

    /// Route every executed circuit through `injector`.
    pub fn set_noise(&mut self, injector: Box<dyn NoiseInjector>, error_probability: f64) {
        info!(
            "Enabling {} noise with p = {}",
            injector.name(),
            error_probability
        );
        self.noise = Some(NoiseSettings {
            injector,
            error_probability,
        });
    }

    /// Current state.
    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Ops waiting for the next flush.
    pub fn pending(&self) -> &[NativeOp] {
        &self.pending
    }

    /// The engine, once constructed.
    pub fn engine(&self) -> Option<&F::Engine> {
        self.engine.as_ref()
    }

    /// Number of circuits handed to the engine so far, failed ones included.
    pub fn circuit_counter(&self) -> usize {
        self.circuit_counter
    }

    /// Queue one op.
    pub fn append(&mut self, op: NativeOp) {
        debug_assert_ne!(self.state, BatchState::Flushing);
        self.pending.push(op);
        self.state = BatchState::Accumulating;
    }

    /// Queue several ops in order.
    pub fn extend(&mut self, ops: impl IntoIterator<Item = NativeOp>) {
        for op in ops {
            self.append(op);
        }
    }

    /// Execute everything pending.
    ///
    /// The pending list is empty afterwards whether or not execution
    /// succeeded. With nothing pending only engine construction happens,
    /// and not even that while the allocator has no slots.
    #[instrument(skip_all, fields(pending = self.pending.len()))]
    pub fn flush(&mut self, allocator: &mut SlotAllocator) -> BackendResult<FlushReport> {
        self.state = BatchState::Flushing;
        let ops = mem::take(&mut self.pending);
        let result = self.execute(ops, allocator);
        self.state = BatchState::Empty;
        result
    }

    fn execute(
        &mut self,
        ops: Vec<NativeOp>,
        allocator: &mut SlotAllocator,
    ) -> BackendResult<FlushReport> {
        if self.engine.is_none() {
            if ops.is_empty() && allocator.num_slots() == 0 {
                return Ok(FlushReport::default());
            }
            self.construct(allocator)?;
        }
        if ops.is_empty() {
            return Ok(FlushReport::default());
        }

        let Some(engine) = self.engine.as_mut() else {
            return Err(BackendError::InvariantViolation(
                "engine missing after construction".into(),
            ));
        };

        let name = format!("circuit_{}", self.circuit_counter);
        self.circuit_counter += 1;

        let num_ops = ops.len();
        let mut circuit = Circuit::from_ops(name.clone(), engine.num_slots(), ops);
        let mut injected_errors = 0;
        if let Some(noise) = self.noise.as_mut() {
            let noisy = noise.injector.inject(&circuit, noise.error_probability);
            debug!(
                "{} added {} errors to {}",
                noise.injector.name(),
                noisy.injected_errors,
                name
            );
            injected_errors = noisy.injected_errors;
            circuit = noisy.circuit;
        }

        let start = Instant::now();
        engine.execute(&circuit).map_err(|source| {
            error!("Execution of {} failed: {}", name, source);
            BackendError::Execution {
                circuit: name.clone(),
                source,
            }
        })?;
        debug!(
            "Executed {} ({} ops) in {:?}",
            name,
            circuit.len(),
            start.elapsed()
        );

        Ok(FlushReport {
            circuit: Some(name),
            num_ops,
            injected_errors,
        })
    }

    fn construct(&mut self, allocator: &mut SlotAllocator) -> BackendResult<()> {
        let num_slots = allocator.num_slots();
        info!("Creating quantum register of {} slots", num_slots);
        let engine = self.factory.construct(num_slots).map_err(|source| {
            error!("Engine construction failed: {}", source);
            BackendError::EngineConstruction { num_slots, source }
        })?;
        self.engine = Some(engine);
        allocator.freeze();
        Ok(())
    }
}
