//! Error types for the IR crate.

use thiserror::Error;

/// Errors that can occur while building descriptors or native circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Matrix element count does not match the qubit count.
    #[error("Matrix for {num_qubits} qubit(s) needs {expected} elements, got {got}")]
    MatrixSize {
        /// Number of qubits the matrix was declared for.
        num_qubits: usize,
        /// Expected element count, `4^num_qubits`.
        expected: usize,
        /// Actual element count.
        got: usize,
    },

    /// Number of qubits does not match what the matrix or gate requires.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: usize,
        /// Actual number of qubits provided.
        got: usize,
    },

    /// Gate requires different number of parameters.
    #[error("Gate '{gate_name}' requires {expected} parameters, got {got}")]
    ParameterCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of parameters.
        expected: usize,
        /// Actual number of parameters provided.
        got: usize,
    },

    /// The same qubit appears twice in one operation.
    #[error("Duplicate qubit {0} in operation")]
    DuplicateQubit(String),

    /// A gate or basis name was not recognized.
    #[error("Unknown gate name: {0}")]
    UnknownGate(String),

    /// An operation must name at least one qubit.
    #[error("Operation names no qubits")]
    NoQubits,
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
