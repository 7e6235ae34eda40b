//! Named execution units of native operations.

use serde::{Deserialize, Serialize};

use crate::instruction::NativeOp;
use crate::qubit::SlotId;

/// An ordered batch of native operations executed as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    name: String,
    num_slots: usize,
    ops: Vec<NativeOp>,
}

impl Circuit {
    /// Create an empty circuit over `num_slots` slots.
    pub fn new(name: impl Into<String>, num_slots: usize) -> Self {
        Self {
            name: name.into(),
            num_slots,
            ops: Vec::new(),
        }
    }

    /// Create a circuit from existing operations.
    pub fn from_ops(name: impl Into<String>, num_slots: usize, ops: Vec<NativeOp>) -> Self {
        Self {
            name: name.into(),
            num_slots,
            ops,
        }
    }

    /// Circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register width the circuit was assembled for.
    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    /// Append an operation.
    pub fn push(&mut self, op: NativeOp) {
        self.ops.push(op);
    }

    /// Operations in execution order.
    pub fn ops(&self) -> &[NativeOp] {
        &self.ops
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the circuit has no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Slots measured anywhere in the circuit, in first-measured order.
    pub fn measured_slots(&self) -> Vec<SlotId> {
        let mut out: Vec<SlotId> = Vec::new();
        for op in &self.ops {
            if let NativeOp::Measure { slot, .. } = op {
                if !out.contains(slot) {
                    out.push(*slot);
                }
            }
        }
        out
    }
}
