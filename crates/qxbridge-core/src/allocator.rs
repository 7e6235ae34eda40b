//! Slot allocation with deferred capacity commitment.
//!
//! Until the engine exists, allocating a qubit with no free slot grows the
//! register by one. Once the engine is constructed the allocator is
//! [frozen](SlotAllocator::freeze) and only slots released by
//! [`free`](SlotAllocator::free) can be handed out again, lowest index
//! first.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashSet;
use tracing::debug;

use qxbridge_ir::{QubitRef, SlotId};

use crate::bimap::QubitBiMap;
use crate::error::{BackendError, BackendResult};

/// Maps upstream qubits onto a growing, then fixed, pool of slots.
///
/// Every slot below [`num_slots`](Self::num_slots) is either mapped in
/// [`map`](Self::map) or sitting in the free heap, never both.
#[derive(Debug, Clone, Default)]
pub struct SlotAllocator {
    map: QubitBiMap,
    num_slots: usize,
    frozen: bool,
    free: BinaryHeap<Reverse<SlotId>>,
}

impl SlotAllocator {
    /// Create an allocator with zero committed slots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed register width.
    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    /// Whether capacity can no longer grow.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Number of slots below capacity with no upstream qubit.
    pub fn num_free(&self) -> usize {
        self.free.len()
    }

    /// Current qubit mapping.
    pub fn map(&self) -> &QubitBiMap {
        &self.map
    }

    /// Stop growing. Idempotent.
    pub fn freeze(&mut self) {
        if !self.frozen {
            debug!("Freezing slot capacity at {}", self.num_slots);
            self.frozen = true;
        }
    }

    /// Map one upstream qubit to a slot.
    pub fn allocate(&mut self, qubit: QubitRef) -> BackendResult<SlotId> {
        if self.map.lookup_forward(qubit).is_some() {
            return Err(BackendError::QubitInUse(qubit));
        }

        let slot = if let Some(Reverse(slot)) = self.free.pop() {
            slot
        } else if !self.frozen {
            let slot = SlotId(self.num_slots);
            self.num_slots += 1;
            slot
        } else {
            return Err(BackendError::CapacityExhausted {
                requested: 1,
                available: 0,
                num_slots: self.num_slots,
            });
        };

        self.map.map(qubit, slot);
        debug!("Allocated {} -> {}", qubit, slot);
        Ok(slot)
    }

    /// Map a batch of upstream qubits, in order.
    ///
    /// The batch is checked up front, so on error no qubit is mapped.
    pub fn allocate_all(&mut self, qubits: &[QubitRef]) -> BackendResult<Vec<SlotId>> {
        let mut seen = FxHashSet::default();
        for &qubit in qubits {
            if !seen.insert(qubit) || self.map.lookup_forward(qubit).is_some() {
                return Err(BackendError::QubitInUse(qubit));
            }
        }
        if self.frozen && qubits.len() > self.free.len() {
            return Err(BackendError::CapacityExhausted {
                requested: qubits.len(),
                available: self.free.len(),
                num_slots: self.num_slots,
            });
        }

        qubits.iter().map(|&qubit| self.allocate(qubit)).collect()
    }

    /// Release the slot held by `qubit`. Capacity never shrinks.
    pub fn free(&mut self, qubit: QubitRef) -> BackendResult<SlotId> {
        let slot = self
            .map
            .unmap_by_logical(qubit)
            .ok_or(BackendError::UnresolvedQubit(qubit))?;
        self.free.push(Reverse(slot));
        debug!("Freed {} (was {})", qubit, slot);
        Ok(slot)
    }

    /// Release a batch of upstream qubits.
    ///
    /// Every qubit must be mapped and appear once; otherwise nothing is
    /// released.
    pub fn free_all(&mut self, qubits: &[QubitRef]) -> BackendResult<Vec<SlotId>> {
        let mut seen = FxHashSet::default();
        for &qubit in qubits {
            if !seen.insert(qubit) || self.map.lookup_forward(qubit).is_none() {
                return Err(BackendError::UnresolvedQubit(qubit));
            }
        }

        qubits.iter().map(|&qubit| self.free(qubit)).collect()
    }
}
