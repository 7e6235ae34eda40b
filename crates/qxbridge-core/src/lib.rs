//! Qxbridge Core
//!
//! Adapts an upstream quantum runtime that names qubits by arbitrary,
//! ever-growing identifiers and submits gates one at a time to a simulation
//! engine that wants a fixed-width register and whole circuits.
//!
//! The pieces, bottom-up:
//!
//! - [`QubitBiMap`]: one-to-one map between upstream qubits and slots.
//! - [`SlotAllocator`]: hands out slots, growing the register until the
//!   engine exists and reusing freed slots afterwards.
//! - [`GateMap`]: ordered dispatch table that recognizes operation
//!   descriptors as native gates within a tolerance.
//! - [`BatchAssembler`]: accumulates native ops and executes them as a
//!   circuit when a measurement needs a result.
//! - [`collect_measurements`]: keys engine outcomes by upstream qubit.
//! - [`QxBackend`]: the callback surface tying it together.
//!
//! # Example
//!
//! ```rust
//! use qxbridge_adapter_sim::StatevectorFactory;
//! use qxbridge_core::{BackendConfig, MeasurementValue, QxBackend};
//! use qxbridge_ir::{Operation, PauliBasis, PredefinedGate, QubitRef};
//!
//! let mut backend = QxBackend::new(StatevectorFactory::new());
//! backend.initialize(BackendConfig::default()).unwrap();
//! backend.allocate(&[QubitRef(7), QubitRef(8)]).unwrap();
//!
//! let x = Operation::predefined(PredefinedGate::X, vec![QubitRef(7)], vec![], &[]).unwrap();
//! let cnot =
//!     Operation::predefined(PredefinedGate::X, vec![QubitRef(8)], vec![QubitRef(7)], &[]).unwrap();
//! backend.gate(&x).unwrap();
//! backend.gate(&cnot).unwrap();
//!
//! let m = Operation::measure(vec![QubitRef(7), QubitRef(8)], PauliBasis::Z).unwrap();
//! let outcomes = backend.gate(&m).unwrap();
//! assert_eq!(outcomes.get(QubitRef(8)), Some(MeasurementValue::One));
//!
//! backend.drain().unwrap();
//! ```

pub mod allocator;
pub mod backend;
pub mod batch;
pub mod bimap;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod results;

pub use allocator::SlotAllocator;
pub use backend::{BackendStats, QxBackend};
pub use batch::{BatchAssembler, BatchState, FlushReport};
pub use bimap::QubitBiMap;
pub use config::{BackendConfig, DEFAULT_EPSILON, QX_INTERFACE};
pub use dispatch::{Classification, GateEntry, GateMap, NativeKind};
pub use error::{BackendError, BackendResult};
pub use results::{MeasurementSet, MeasurementValue, collect_measurements};
