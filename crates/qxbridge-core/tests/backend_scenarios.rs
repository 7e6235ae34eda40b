//! End-to-end tests of the backend callback surface.
//!
//! These drive [`QxBackend`] the way an upstream runtime would and check
//! that the qubit map, the pending batch and the engine stay consistent on
//! both success and failure paths.

use std::cell::Cell;
use std::rc::Rc;

use qxbridge_adapter_sim::{DepolarizingChannel, SimulatorConfig, StatevectorFactory};
use qxbridge_core::{
    BackendConfig, BackendError, BatchState, MeasurementValue, QxBackend,
};
use qxbridge_hal::{EngineError, EngineFactory, EngineResult, QuantumEngine};
use qxbridge_ir::{Circuit, Operation, PauliBasis, PredefinedGate, QubitRef, SlotId};

fn seeded_backend() -> QxBackend<StatevectorFactory> {
    let factory = StatevectorFactory::with_config(SimulatorConfig {
        seed: Some(2024),
        ..SimulatorConfig::default()
    });
    let mut backend = QxBackend::new(factory);
    backend.initialize(BackendConfig::default()).unwrap();
    backend
}

fn gate(gate: PredefinedGate, targets: &[u64], controls: &[u64]) -> Operation {
    Operation::predefined(
        gate,
        targets.iter().copied().map(QubitRef).collect(),
        controls.iter().copied().map(QubitRef).collect(),
        &[],
    )
    .unwrap()
}

fn measure(qubits: &[u64]) -> Operation {
    Operation::measure(qubits.iter().copied().map(QubitRef).collect(), PauliBasis::Z).unwrap()
}

// ============================================================================
// Mock engines
// ============================================================================

/// Engine that counts executions and can be told to fail them.
struct ScriptedEngine {
    num_slots: usize,
    executions: Rc<Cell<usize>>,
    fail: Rc<Cell<bool>>,
}

impl QuantumEngine for ScriptedEngine {
    fn num_slots(&self) -> usize {
        self.num_slots
    }

    fn execute(&mut self, _circuit: &Circuit) -> EngineResult<()> {
        self.executions.set(self.executions.get() + 1);
        if self.fail.get() {
            return Err(EngineError::Execution("scripted failure".into()));
        }
        Ok(())
    }

    fn measurement(&self, _slot: SlotId) -> Option<bool> {
        Some(false)
    }
}

#[derive(Clone, Default)]
struct ScriptedFactory {
    executions: Rc<Cell<usize>>,
    fail_execute: Rc<Cell<bool>>,
    refuse_construct: bool,
}

impl EngineFactory for ScriptedFactory {
    type Engine = ScriptedEngine;

    fn construct(&self, num_slots: usize) -> EngineResult<ScriptedEngine> {
        if self.refuse_construct {
            return Err(EngineError::ResourceExhausted {
                num_slots,
                reason: "scripted refusal".into(),
            });
        }
        Ok(ScriptedEngine {
            num_slots,
            executions: Rc::clone(&self.executions),
            fail: Rc::clone(&self.fail_execute),
        })
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_end_to_end_scenario() {
    let mut backend = seeded_backend();

    backend.allocate(&[QubitRef(0), QubitRef(1)]).unwrap();
    assert_eq!(backend.allocator().num_slots(), 2);

    backend.gate(&gate(PredefinedGate::X, &[1], &[0])).unwrap();
    assert_eq!(backend.batch().state(), BatchState::Accumulating);
    assert_eq!(backend.batch().pending().len(), 1);
    assert!(backend.batch().engine().is_none());

    let outcomes = backend.gate(&measure(&[0])).unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes.get(QubitRef(0)).is_some());
    assert_eq!(backend.batch().engine().map(|e| e.num_slots()), Some(2));
    assert_eq!(backend.batch().circuit_counter(), 1);
    assert!(backend.allocator().is_frozen());

    backend.free(&[QubitRef(0)]).unwrap();
    backend.allocate(&[QubitRef(2)]).unwrap();
    assert_eq!(
        backend.allocator().map().lookup_forward(QubitRef(2)),
        Some(SlotId(0))
    );

    backend.drain().unwrap();
}

#[test]
fn test_measurement_round_trip() {
    let mut backend = seeded_backend();
    backend.allocate(&[QubitRef(0), QubitRef(1)]).unwrap();

    let prep = Operation::prep(vec![QubitRef(0), QubitRef(1)], PauliBasis::Z).unwrap();
    backend.gate(&prep).unwrap();
    let outcomes = backend.gate(&measure(&[0, 1])).unwrap();

    assert_eq!(
        outcomes.sorted(),
        vec![
            (QubitRef(0), MeasurementValue::Zero),
            (QubitRef(1), MeasurementValue::Zero),
        ]
    );
    assert_eq!(
        backend.allocator().map().lookup_forward(QubitRef(0)),
        Some(SlotId(0))
    );
    assert_eq!(
        backend.allocator().map().lookup_forward(QubitRef(1)),
        Some(SlotId(1))
    );
}

#[test]
fn test_bell_pair_outcomes_agree() {
    let mut backend = seeded_backend();
    backend.allocate(&[QubitRef(10), QubitRef(20)]).unwrap();

    backend.gate(&gate(PredefinedGate::H, &[10], &[])).unwrap();
    backend.gate(&gate(PredefinedGate::X, &[20], &[10])).unwrap();
    let outcomes = backend.gate(&measure(&[10, 20])).unwrap();

    assert_eq!(outcomes.get(QubitRef(10)), outcomes.get(QubitRef(20)));
}

#[test]
fn test_capacity_freezes_on_first_flush() {
    let mut backend = seeded_backend();
    backend.allocate(&[QubitRef(0), QubitRef(1), QubitRef(2)]).unwrap();
    backend.gate(&measure(&[1])).unwrap();

    let err = backend.allocate(&[QubitRef(3)]).unwrap_err();
    assert!(matches!(err, BackendError::CapacityExhausted { num_slots: 3, .. }));
    assert_eq!(backend.allocator().map().len(), 3);

    backend.free(&[QubitRef(2), QubitRef(1)]).unwrap();
    backend.allocate(&[QubitRef(3)]).unwrap();
    assert_eq!(
        backend.allocator().map().lookup_forward(QubitRef(3)),
        Some(SlotId(1))
    );
    assert_eq!(backend.allocator().num_slots(), 3);
}

#[test]
fn test_drain_flushes_pending() {
    let factory = ScriptedFactory::default();
    let executions = Rc::clone(&factory.executions);
    let mut backend = QxBackend::new(factory);
    backend.initialize(BackendConfig::default()).unwrap();
    backend.allocate(&[QubitRef(0)]).unwrap();

    backend.gate(&gate(PredefinedGate::T, &[0], &[])).unwrap();
    backend.gate(&gate(PredefinedGate::H, &[0], &[])).unwrap();
    assert_eq!(executions.get(), 0);

    backend.drain().unwrap();
    assert_eq!(executions.get(), 1);
    assert_eq!(backend.batch().state(), BatchState::Empty);
    assert_eq!(backend.stats().native_ops, 2);

    // Nothing left: draining again runs nothing.
    backend.drain().unwrap();
    assert_eq!(executions.get(), 1);
}

#[test]
fn test_failed_execution_clears_pending() {
    let factory = ScriptedFactory::default();
    let fail = Rc::clone(&factory.fail_execute);
    let mut backend = QxBackend::new(factory);
    backend.initialize(BackendConfig::default()).unwrap();
    backend.allocate(&[QubitRef(0)]).unwrap();

    fail.set(true);
    backend.gate(&gate(PredefinedGate::X, &[0], &[])).unwrap();
    let err = backend.gate(&measure(&[0])).unwrap_err();
    assert!(matches!(err, BackendError::Execution { ref circuit, .. } if circuit == "circuit_0"));
    assert!(backend.batch().pending().is_empty());
    assert_eq!(backend.batch().state(), BatchState::Empty);
    assert_eq!(backend.stats().gates, 1);
    assert_eq!(backend.stats().measurements, 0);

    fail.set(false);
    backend.gate(&gate(PredefinedGate::H, &[0], &[])).unwrap();
    assert_eq!(backend.batch().state(), BatchState::Accumulating);
    assert_eq!(backend.batch().pending().len(), 1);

    backend.drain().unwrap();
    assert_eq!(backend.batch().circuit_counter(), 2);
}

#[test]
fn test_failed_construction_leaves_capacity_open() {
    let factory = ScriptedFactory {
        refuse_construct: true,
        ..ScriptedFactory::default()
    };
    let mut backend = QxBackend::new(factory);
    backend.initialize(BackendConfig::default()).unwrap();
    backend.allocate(&[QubitRef(0)]).unwrap();

    let err = backend.gate(&measure(&[0])).unwrap_err();
    assert!(matches!(
        err,
        BackendError::EngineConstruction { num_slots: 1, .. }
    ));
    assert!(backend.batch().pending().is_empty());
    assert!(backend.batch().engine().is_none());
    assert!(!backend.allocator().is_frozen());
    assert_eq!(backend.stats().gates, 0);

    backend.allocate(&[QubitRef(1)]).unwrap();
    assert_eq!(backend.allocator().num_slots(), 2);
}

#[test]
fn test_engine_too_wide() {
    let factory = StatevectorFactory::with_config(SimulatorConfig {
        max_slots: 2,
        seed: Some(0),
    });
    let mut backend = QxBackend::new(factory);
    backend.initialize(BackendConfig::default()).unwrap();
    backend
        .allocate(&[QubitRef(0), QubitRef(1), QubitRef(2)])
        .unwrap();

    assert!(matches!(
        backend.drain(),
        Err(BackendError::EngineConstruction { num_slots: 3, .. })
    ));
}

#[test]
fn test_unsupported_descriptor_rejected() {
    let mut backend = seeded_backend();
    backend.allocate(&[QubitRef(0), QubitRef(1), QubitRef(2)]).unwrap();
    backend.gate(&gate(PredefinedGate::H, &[0], &[])).unwrap();
    let before = backend.batch().pending().len();

    // Doubly-controlled Z has no native counterpart.
    let ccz = gate(PredefinedGate::Z, &[2], &[0, 1]);
    assert!(matches!(
        backend.gate(&ccz),
        Err(BackendError::UnsupportedGate(_))
    ));
    assert_eq!(backend.batch().pending().len(), before);
    assert_eq!(backend.stats().gates, 1);
}

#[test]
fn test_unresolved_qubits() {
    let mut backend = seeded_backend();
    backend.allocate(&[QubitRef(0)]).unwrap();

    assert!(matches!(
        backend.gate(&gate(PredefinedGate::X, &[1], &[0])),
        Err(BackendError::UnresolvedQubit(QubitRef(1)))
    ));
    assert!(matches!(
        backend.free(&[QubitRef(0), QubitRef(5)]),
        Err(BackendError::UnresolvedQubit(QubitRef(5)))
    ));
    assert!(backend.batch().pending().is_empty());
    assert_eq!(
        backend.allocator().map().lookup_forward(QubitRef(0)),
        Some(SlotId(0))
    );
}

#[test]
fn test_tolerance_boundary_through_backend() {
    let mut backend = seeded_backend();
    backend.allocate(&[QubitRef(0)]).unwrap();
    let h = PredefinedGate::H.matrix(&[]).unwrap();

    let close = Operation::unitary(vec![QubitRef(0)], h.clone().perturbed(1, 1, 0.9e-6)).unwrap();
    backend.gate(&close).unwrap();

    let far = Operation::unitary(vec![QubitRef(0)], h.perturbed(1, 1, 5e-6)).unwrap();
    assert!(matches!(
        backend.gate(&far),
        Err(BackendError::UnsupportedGate(_))
    ));
    assert_eq!(backend.batch().pending().len(), 1);
}

#[test]
fn test_initialize_from_commands() {
    use qxbridge_ir::ArbCmd;
    use serde_json::json;

    let mut backend = QxBackend::new(StatevectorFactory::new())
        .with_noise_injector(Box::new(DepolarizingChannel::with_seed(9)));
    backend
        .initialize_from_cmds(&[
            ArbCmd::new("qx", "depolarizing_channel", json!(true)),
            ArbCmd::new("qx", "error_probability", json!(1.0)),
            ArbCmd::new("cqasm", "anything", json!(null)),
        ])
        .unwrap();

    backend.allocate(&[QubitRef(0), QubitRef(1)]).unwrap();
    backend.gate(&gate(PredefinedGate::X, &[1], &[0])).unwrap();
    backend.drain().unwrap();

    let stats = backend.stats();
    assert_eq!(stats.native_ops, 1);
    assert_eq!(stats.injected_errors, 2);
}
