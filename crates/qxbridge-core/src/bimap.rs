//! Bidirectional map between upstream qubits and engine slots.

use rustc_hash::FxHashMap;

use qxbridge_ir::{QubitRef, SlotId};

/// One-to-one correspondence between [`QubitRef`]s and [`SlotId`]s.
///
/// `lookup_forward(q) == Some(s)` holds exactly when
/// `lookup_reverse(s) == Some(q)`. [`map`](Self::map) is the only way to
/// add a pair and always clears stale pairs on either side first.
#[derive(Debug, Clone, Default)]
pub struct QubitBiMap {
    forward: FxHashMap<QubitRef, SlotId>,
    reverse: FxHashMap<SlotId, QubitRef>,
}

impl QubitBiMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot of an upstream qubit, if mapped.
    #[inline]
    pub fn lookup_forward(&self, upstream: QubitRef) -> Option<SlotId> {
        self.forward.get(&upstream).copied()
    }

    /// Upstream qubit occupying a slot, if any.
    #[inline]
    pub fn lookup_reverse(&self, downstream: SlotId) -> Option<QubitRef> {
        self.reverse.get(&downstream).copied()
    }

    /// Map `upstream` to `downstream`, dropping any previous pairing of
    /// either.
    pub fn map(&mut self, upstream: QubitRef, downstream: SlotId) {
        self.unmap_by_logical(upstream);
        self.unmap_by_physical(downstream);
        self.forward.insert(upstream, downstream);
        self.reverse.insert(downstream, upstream);
    }

    /// Remove the pair containing `upstream`. No-op if unmapped.
    pub fn unmap_by_logical(&mut self, upstream: QubitRef) -> Option<SlotId> {
        let downstream = self.forward.remove(&upstream)?;
        self.reverse.remove(&downstream);
        Some(downstream)
    }

    /// Remove the pair containing `downstream`. No-op if unmapped.
    pub fn unmap_by_physical(&mut self, downstream: SlotId) -> Option<QubitRef> {
        let upstream = self.reverse.remove(&downstream)?;
        self.forward.remove(&upstream);
        Some(upstream)
    }

    /// Number of mapped pairs.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Whether nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Iterate over all pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (QubitRef, SlotId)> + '_ {
        self.forward.iter().map(|(q, s)| (*q, *s))
    }
}
