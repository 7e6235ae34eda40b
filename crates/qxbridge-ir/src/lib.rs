//! Qxbridge Intermediate Representation
//!
//! Shared vocabulary for the qubit virtualization layer: what the upstream
//! runtime sends, and what the simulation engine executes.
//!
//! # Core Components
//!
//! - **Index spaces**: [`QubitRef`] for upstream logical qubits and
//!   [`SlotId`] for the engine's physical register slots
//! - **Matrices**: [`Matrix`] with tolerance-based comparison and control
//!   reduction
//! - **Gate catalog**: [`PredefinedGate`] canonical unitaries and
//!   [`PauliBasis`] measurement/preparation bases
//! - **Descriptors**: [`Operation`] as issued upstream, with [`ArbData`]
//!   metadata and [`ArbCmd`] configuration commands
//! - **Native circuits**: [`NativeOp`] and the named [`Circuit`] unit
//!
//! # Example
//!
//! ```rust
//! use qxbridge_ir::{Operation, PauliBasis, PredefinedGate, QubitRef};
//!
//! // CNOT from upstream qubit 0 onto qubit 1
//! let cnot = Operation::predefined(
//!     PredefinedGate::X,
//!     vec![QubitRef(1)],
//!     vec![QubitRef(0)],
//!     &[],
//! ).unwrap();
//! assert_eq!(cnot.qubits(), vec![QubitRef(0), QubitRef(1)]);
//!
//! let m = Operation::measure(vec![QubitRef(0), QubitRef(1)], PauliBasis::Z).unwrap();
//! assert!(m.has_measures());
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod matrix;
pub mod operation;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{PauliBasis, PredefinedGate};
pub use instruction::NativeOp;
pub use matrix::Matrix;
pub use operation::{ArbCmd, ArbData, Operation, OperationKind};
pub use qubit::{QubitRef, SlotId};
