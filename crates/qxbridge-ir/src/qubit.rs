//! Logical qubit references and physical slot indices.
//!
//! Two index spaces meet in this crate:
//!
//! ```text
//!     .----------.  forward  .------------.
//!     | upstream |---------->| downstream |
//!     |  space   |<----------|   space    |
//!     '----------'  reverse  '------------'
//!       QubitRef                SlotId
//! ```
//!
//! Upstream ids are issued by the orchestration runtime and may be reused
//! after a free. Slots address the simulation engine's fixed register.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical qubit identifier issued by the upstream collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QubitRef(pub u64);

impl fmt::Display for QubitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u64> for QubitRef {
    fn from(id: u64) -> Self {
        QubitRef(id)
    }
}

/// Physical slot index within the simulation engine's register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(pub usize);

impl SlotId {
    /// Bit mask selecting this slot in a basis-state index.
    #[inline]
    pub fn mask(self) -> usize {
        1 << self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl From<usize> for SlotId {
    fn from(index: usize) -> Self {
        SlotId(index)
    }
}
