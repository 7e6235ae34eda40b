//! Translating engine measurement outcomes back to upstream qubits.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use qxbridge_hal::QuantumEngine;
use qxbridge_ir::{QubitRef, SlotId};

use crate::bimap::QubitBiMap;
use crate::error::{BackendError, BackendResult};

/// A classical measurement outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementValue {
    /// Outcome `0`.
    Zero,
    /// Outcome `1`.
    One,
}

impl From<bool> for MeasurementValue {
    fn from(bit: bool) -> Self {
        if bit { Self::One } else { Self::Zero }
    }
}

impl fmt::Display for MeasurementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => write!(f, "0"),
            Self::One => write!(f, "1"),
        }
    }
}

/// Outcomes of one measurement operation, keyed by upstream qubit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasurementSet {
    outcomes: FxHashMap<QubitRef, MeasurementValue>,
}

impl MeasurementSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome, replacing any earlier one for `qubit`.
    pub fn insert(&mut self, qubit: QubitRef, value: MeasurementValue) {
        self.outcomes.insert(qubit, value);
    }

    /// Outcome for `qubit`.
    pub fn get(&self, qubit: QubitRef) -> Option<MeasurementValue> {
        self.outcomes.get(&qubit).copied()
    }

    /// Number of outcomes.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Outcomes sorted by upstream qubit.
    pub fn sorted(&self) -> Vec<(QubitRef, MeasurementValue)> {
        let mut out: Vec<_> = self.outcomes.iter().map(|(q, v)| (*q, *v)).collect();
        out.sort_unstable_by_key(|(q, _)| *q);
        out
    }
}

/// Read the outcome of every slot in `measured` and key it by the upstream
/// qubit currently mapped there.
///
/// A slot without an outcome or without an upstream qubit means the
/// bookkeeping is broken.
pub fn collect_measurements<E: QuantumEngine + ?Sized>(
    engine: &E,
    measured: &[SlotId],
    map: &QubitBiMap,
) -> BackendResult<MeasurementSet> {
    let mut set = MeasurementSet::new();
    for &slot in measured {
        let qubit = map.lookup_reverse(slot).ok_or_else(|| {
            BackendError::InvariantViolation(format!("measured {slot} has no upstream qubit"))
        })?;
        let bit = engine.measurement(slot).ok_or_else(|| {
            BackendError::InvariantViolation(format!("engine reported no outcome for {slot}"))
        })?;
        set.insert(qubit, bit.into());
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qxbridge_hal::EngineResult;
    use qxbridge_ir::Circuit;

    struct FixedOutcomes(Vec<Option<bool>>);

    impl QuantumEngine for FixedOutcomes {
        fn num_slots(&self) -> usize {
            self.0.len()
        }

        fn execute(&mut self, _circuit: &Circuit) -> EngineResult<()> {
            Ok(())
        }

        fn measurement(&self, slot: SlotId) -> Option<bool> {
            self.0.get(slot.0).copied().flatten()
        }
    }

    #[test]
    fn test_keys_by_upstream_qubit() {
        let engine = FixedOutcomes(vec![Some(true), Some(false), None]);
        let mut map = QubitBiMap::new();
        map.map(QubitRef(30), SlotId(0));
        map.map(QubitRef(10), SlotId(1));

        let set = collect_measurements(&engine, &[SlotId(0), SlotId(1)], &map).unwrap();
        assert_eq!(
            set.sorted(),
            vec![
                (QubitRef(10), MeasurementValue::Zero),
                (QubitRef(30), MeasurementValue::One),
            ]
        );
    }

    #[test]
    fn test_broken_bookkeeping() {
        let engine = FixedOutcomes(vec![Some(true), None]);
        let mut map = QubitBiMap::new();
        map.map(QubitRef(1), SlotId(1));

        assert!(matches!(
            collect_measurements(&engine, &[SlotId(0)], &map),
            Err(BackendError::InvariantViolation(_))
        ));
        assert!(matches!(
            collect_measurements(&engine, &[SlotId(1)], &map),
            Err(BackendError::InvariantViolation(_))
        ));
    }
}
