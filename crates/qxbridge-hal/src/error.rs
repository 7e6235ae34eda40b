//! Error types for the HAL crate.

use thiserror::Error;

/// Errors reported by a simulation engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The engine could not reserve resources for the requested register.
    #[error("Not enough resources for a {num_slots}-slot register: {reason}")]
    ResourceExhausted {
        /// Requested register width.
        num_slots: usize,
        /// Why construction failed.
        reason: String,
    },

    /// An operation addressed a slot outside the register.
    #[error("Slot {slot} out of range for a {num_slots}-slot register")]
    SlotOutOfRange {
        /// Offending slot index.
        slot: usize,
        /// Register width.
        num_slots: usize,
    },

    /// Circuit was assembled for a different register width.
    #[error("Circuit '{name}' expects {expected} slots, engine has {actual}")]
    WidthMismatch {
        /// Circuit name.
        name: String,
        /// Width the circuit was assembled for.
        expected: usize,
        /// Engine register width.
        actual: usize,
    },

    /// Generic execution failure.
    #[error("Execution failed: {0}")]
    Execution(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
