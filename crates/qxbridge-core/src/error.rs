//! Error types for the core crate.

use qxbridge_hal::EngineError;
use qxbridge_ir::{IrError, QubitRef};
use thiserror::Error;

/// Errors reported to the upstream runtime by the backend callbacks.
///
/// None of these are transient; every one is fatal to the request that
/// caused it and leaves the qubit map and pending batch consistent.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BackendError {
    /// Capacity is frozen and no freed slot is available.
    #[error(
        "Upstream requires too many live qubits: {requested} requested, {available} free of {num_slots} slots"
    )]
    CapacityExhausted {
        /// Number of qubits in the allocation request.
        requested: usize,
        /// Number of reusable slots.
        available: usize,
        /// Frozen register width.
        num_slots: usize,
    },

    /// A logical qubit has no current mapping.
    #[error("Failed to resolve upstream qubit {0} to a slot")]
    UnresolvedQubit(QubitRef),

    /// A logical qubit was allocated twice.
    #[error("Upstream qubit {0} is already allocated")]
    QubitInUse(QubitRef),

    /// No dispatch table entry matches the operation.
    #[error("Unsupported gate: {0}")]
    UnsupportedGate(String),

    /// A native gate constructor ran out of arguments.
    #[error("Gate '{gate}' is missing parameter #{index}")]
    MissingParameter {
        /// Native gate name.
        gate: &'static str,
        /// Zero-based parameter index.
        index: usize,
    },

    /// The simulation engine could not be constructed.
    #[error("Failed to construct a {num_slots}-slot engine")]
    EngineConstruction {
        /// Requested register width.
        num_slots: usize,
        /// Underlying engine error.
        #[source]
        source: EngineError,
    },

    /// The engine failed while executing a circuit.
    #[error("Execution of '{circuit}' failed")]
    Execution {
        /// Name of the failing circuit.
        circuit: String,
        /// Underlying engine error.
        #[source]
        source: EngineError,
    },

    /// Internal bookkeeping is inconsistent. Indicates a bug, not bad input.
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    /// A callback arrived before `initialize`.
    #[error("Backend is not initialized")]
    NotInitialized,

    /// `initialize` was called twice.
    #[error("Backend is already initialized")]
    AlreadyInitialized,

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed descriptor.
    #[error("Invalid operation: {0}")]
    Ir(#[from] IrError),
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;
