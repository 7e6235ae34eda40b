//! The backend facade driven by the upstream runtime.

use serde::Serialize;
use tracing::{debug, info, instrument};

use qxbridge_hal::{EngineFactory, NoiseInjector};
use qxbridge_ir::{ArbCmd, Operation, QubitRef};

use crate::allocator::SlotAllocator;
use crate::batch::{BatchAssembler, FlushReport};
use crate::config::BackendConfig;
use crate::dispatch::GateMap;
use crate::error::{BackendError, BackendResult};
use crate::results::{MeasurementSet, collect_measurements};

/// Running totals since initialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackendStats {
    /// Gate callbacks accepted.
    pub gates: usize,
    /// Gate callbacks that were measurements.
    pub measurements: usize,
    /// Circuits executed.
    pub circuits: usize,
    /// Native ops executed, before noise.
    pub native_ops: usize,
    /// Ops added by the noise injector.
    pub injected_errors: usize,
}

impl BackendStats {
    fn record_flush(&mut self, report: &FlushReport) {
        if report.circuit.is_some() {
            self.circuits += 1;
        }
        self.native_ops += report.num_ops;
        self.injected_errors += report.injected_errors;
    }
}

/// Translates upstream callbacks into batched engine executions.
///
/// The expected call order is one [`initialize`](Self::initialize), then any
/// interleaving of [`allocate`](Self::allocate), [`free`](Self::free) and
/// [`gate`](Self::gate), and finally [`drain`](Self::drain).
pub struct QxBackend<F: EngineFactory> {
    config: Option<BackendConfig>,
    gatemap: Option<GateMap>,
    allocator: SlotAllocator,
    batch: BatchAssembler<F>,
    noise_injector: Option<Box<dyn NoiseInjector>>,
    stats: BackendStats,
}

impl<F: EngineFactory> QxBackend<F> {
    /// Create an uninitialized backend.
    pub fn new(factory: F) -> Self {
        Self {
            config: None,
            gatemap: None,
            allocator: SlotAllocator::new(),
            batch: BatchAssembler::new(factory),
            noise_injector: None,
            stats: BackendStats::default(),
        }
    }

    /// Install the noise model used when `depolarizing_channel` is enabled.
    #[must_use]
    pub fn with_noise_injector(mut self, injector: Box<dyn NoiseInjector>) -> Self {
        self.noise_injector = Some(injector);
        self
    }

    /// Apply `config` and build the dispatch table.
    pub fn initialize(&mut self, config: BackendConfig) -> BackendResult<()> {
        if self.config.is_some() {
            return Err(BackendError::AlreadyInitialized);
        }
        config.validate()?;

        if config.depolarizing_channel {
            let injector = self.noise_injector.take().ok_or_else(|| {
                BackendError::Configuration(
                    "depolarizing channel enabled without a noise injector".into(),
                )
            })?;
            self.batch.set_noise(injector, config.error_probability);
        }

        let gatemap = GateMap::from_config(&config);
        info!(
            "Initialized with {} gate map entries, epsilon = {}",
            gatemap.entries().len(),
            config.epsilon
        );
        self.gatemap = Some(gatemap);
        self.config = Some(config);
        Ok(())
    }

    /// [`initialize`](Self::initialize) from `qx` interface commands.
    pub fn initialize_from_cmds(&mut self, cmds: &[ArbCmd]) -> BackendResult<()> {
        let config = BackendConfig::from_arb_cmds(cmds)?;
        self.initialize(config)
    }

    /// Map new upstream qubits to slots.
    #[instrument(skip(self))]
    pub fn allocate(&mut self, qubits: &[QubitRef]) -> BackendResult<()> {
        self.ensure_initialized()?;
        self.allocator.allocate_all(qubits)?;
        Ok(())
    }

    /// Release upstream qubits.
    #[instrument(skip(self))]
    pub fn free(&mut self, qubits: &[QubitRef]) -> BackendResult<()> {
        self.ensure_initialized()?;
        self.allocator.free_all(qubits)?;
        Ok(())
    }

    /// Queue one operation, executing the batch if it measures.
    ///
    /// Returns the outcomes of a measurement, or an empty set.
    #[instrument(skip_all, fields(op = %op))]
    pub fn gate(&mut self, op: &Operation) -> BackendResult<MeasurementSet> {
        let gatemap = self.gatemap.as_ref().ok_or(BackendError::NotInitialized)?;
        let classification = gatemap.classify(op, self.allocator.map())?;
        let measured = if classification.is_measurement() {
            Some(classification.slots.clone())
        } else {
            None
        };

        let ops = classification.construct()?;
        debug!("Queued {} native ops", ops.len());
        self.batch.extend(ops);

        let Some(measured) = measured else {
            self.stats.gates += 1;
            return Ok(MeasurementSet::new());
        };
        // A measurement only counts once its batch has run.
        self.flush()?;
        self.stats.gates += 1;
        self.stats.measurements += 1;

        let engine = self.batch.engine().ok_or_else(|| {
            BackendError::InvariantViolation("no engine after a measurement flush".into())
        })?;
        collect_measurements(engine, &measured, self.allocator.map())
    }

    /// Execute whatever is still pending.
    pub fn drain(&mut self) -> BackendResult<()> {
        self.ensure_initialized()?;
        self.flush()?;
        info!(
            "Drained after {} circuits, {} native ops",
            self.stats.circuits, self.stats.native_ops
        );
        Ok(())
    }

    /// Totals so far.
    pub fn stats(&self) -> BackendStats {
        self.stats
    }

    /// Active configuration, once initialized.
    pub fn config(&self) -> Option<&BackendConfig> {
        self.config.as_ref()
    }

    /// The slot allocator.
    pub fn allocator(&self) -> &SlotAllocator {
        &self.allocator
    }

    /// The batch assembler.
    pub fn batch(&self) -> &BatchAssembler<F> {
        &self.batch
    }

    fn ensure_initialized(&self) -> BackendResult<()> {
        if self.config.is_none() {
            return Err(BackendError::NotInitialized);
        }
        Ok(())
    }

    fn flush(&mut self) -> BackendResult<()> {
        let report = self.batch.flush(&mut self.allocator)?;
        self.stats.record_flush(&report);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qxbridge_adapter_sim::{DepolarizingChannel, SimulatorConfig, StatevectorFactory};
    use qxbridge_ir::{PauliBasis, PredefinedGate};

    fn backend() -> QxBackend<StatevectorFactory> {
        let factory = StatevectorFactory::with_config(SimulatorConfig {
            seed: Some(1),
            ..SimulatorConfig::default()
        });
        let mut backend = QxBackend::new(factory);
        backend.initialize(BackendConfig::default()).unwrap();
        backend
    }

    #[test]
    fn test_lifecycle_errors() {
        let mut backend = QxBackend::new(StatevectorFactory::new());
        assert!(matches!(
            backend.allocate(&[QubitRef(0)]),
            Err(BackendError::NotInitialized)
        ));
        let op = Operation::measure(vec![QubitRef(0)], PauliBasis::Z).unwrap();
        assert!(matches!(backend.gate(&op), Err(BackendError::NotInitialized)));

        backend.initialize(BackendConfig::default()).unwrap();
        assert!(matches!(
            backend.initialize(BackendConfig::default()),
            Err(BackendError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_noise_requires_injector() {
        let config = BackendConfig {
            depolarizing_channel: true,
            error_probability: 0.1,
            ..BackendConfig::default()
        };

        let mut bare = QxBackend::new(StatevectorFactory::new());
        assert!(matches!(
            bare.initialize(config.clone()),
            Err(BackendError::Configuration(_))
        ));

        let mut noisy = QxBackend::new(StatevectorFactory::new())
            .with_noise_injector(Box::new(DepolarizingChannel::with_seed(3)));
        noisy.initialize(config).unwrap();
    }

    #[test]
    fn test_gates_batch_until_measure() {
        let mut backend = backend();
        backend.allocate(&[QubitRef(5)]).unwrap();

        let x = Operation::predefined(PredefinedGate::X, vec![QubitRef(5)], vec![], &[]).unwrap();
        assert!(backend.gate(&x).unwrap().is_empty());
        assert_eq!(backend.batch().pending().len(), 1);
        assert!(backend.batch().engine().is_none());

        let m = Operation::measure(vec![QubitRef(5)], PauliBasis::Z).unwrap();
        let result = backend.gate(&m).unwrap();
        assert_eq!(result.get(QubitRef(5)), Some(crate::MeasurementValue::One));
        assert!(backend.batch().pending().is_empty());

        let stats = backend.stats();
        assert_eq!(stats.gates, 2);
        assert_eq!(stats.measurements, 1);
        assert_eq!(stats.circuits, 1);
        assert_eq!(stats.native_ops, 2);
    }

    #[test]
    fn test_unsupported_gate_leaves_pending_alone() {
        let mut backend = backend();
        backend.allocate(&[QubitRef(0), QubitRef(1)]).unwrap();
        let h = Operation::predefined(PredefinedGate::H, vec![QubitRef(0)], vec![], &[]).unwrap();
        backend.gate(&h).unwrap();

        // Controlled swap is not in the catalog.
        let fredkin = Operation::controlled(
            vec![QubitRef(0), QubitRef(1)],
            vec![QubitRef(9)],
            PredefinedGate::Swap.matrix(&[]).unwrap(),
        )
        .unwrap();
        assert!(matches!(
            backend.gate(&fredkin),
            Err(BackendError::UnsupportedGate(_))
        ));
        assert_eq!(backend.batch().pending().len(), 1);
    }
}
