//! Simulation engine traits.

use qxbridge_ir::{Circuit, SlotId};

use crate::error::EngineResult;

/// A simulation engine holding quantum state for a fixed-width register.
///
/// # Contract
///
/// - The register width is fixed at construction and never changes.
/// - `execute()` runs the whole circuit synchronously before returning.
/// - `measurement()` MUST return `None` for a slot that has never been
///   measured, and the outcome of the most recent measurement otherwise.
pub trait QuantumEngine {
    /// Register width.
    fn num_slots(&self) -> usize;

    /// Execute an assembled circuit against the current state.
    fn execute(&mut self, circuit: &Circuit) -> EngineResult<()>;

    /// Most recent measurement outcome of `slot`, `true` meaning one.
    fn measurement(&self, slot: SlotId) -> Option<bool>;
}

/// Constructs engines of a fixed width.
///
/// The batching layer builds its engine on the first flush, once the
/// number of live qubits is known.
pub trait EngineFactory {
    /// The engine type produced.
    type Engine: QuantumEngine;

    /// Build an engine with `num_slots` slots, all in `|0>`.
    fn construct(&self, num_slots: usize) -> EngineResult<Self::Engine>;
}

impl<E: QuantumEngine + ?Sized> QuantumEngine for Box<E> {
    fn num_slots(&self) -> usize {
        (**self).num_slots()
    }

    fn execute(&mut self, circuit: &Circuit) -> EngineResult<()> {
        (**self).execute(circuit)
    }

    fn measurement(&self, slot: SlotId) -> Option<bool> {
        (**self).measurement(slot)
    }
}
