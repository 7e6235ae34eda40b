//! Backend-native operations addressed by physical slot.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gate::PauliBasis;
use crate::qubit::SlotId;

/// One operation in the simulation engine's own catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeOp {
    /// Hadamard gate.
    Hadamard(SlotId),
    /// Controlled-NOT.
    Cnot {
        /// Control slot.
        control: SlotId,
        /// Target slot.
        target: SlotId,
    },
    /// Doubly-controlled NOT.
    Toffoli {
        /// First control slot.
        control1: SlotId,
        /// Second control slot.
        control2: SlotId,
        /// Target slot.
        target: SlotId,
    },
    /// Identity gate.
    Identity(SlotId),
    /// Pauli-X gate.
    PauliX(SlotId),
    /// Pauli-Y gate.
    PauliY(SlotId),
    /// Pauli-Z gate.
    PauliZ(SlotId),
    /// S gate.
    PhaseS(SlotId),
    /// S-dagger gate.
    SDag(SlotId),
    /// T gate.
    T(SlotId),
    /// T-dagger gate.
    TDag(SlotId),
    /// Controlled phase shift by `angle`.
    CtrlPhaseShift {
        /// Control slot.
        control: SlotId,
        /// Target slot.
        target: SlotId,
        /// Phase angle in radians.
        angle: f64,
    },
    /// SWAP gate.
    Swap(SlotId, SlotId),
    /// Rotation around X.
    Rx(SlotId, f64),
    /// Rotation around Y.
    Ry(SlotId, f64),
    /// Rotation around Z.
    Rz(SlotId, f64),
    /// Measure one slot in `basis`, recording the outcome.
    Measure {
        /// Measured slot.
        slot: SlotId,
        /// Measurement basis.
        basis: PauliBasis,
    },
    /// Reset one slot into the first state of `basis`.
    Prep {
        /// Prepared slot.
        slot: SlotId,
        /// Preparation basis.
        basis: PauliBasis,
    },
}

impl NativeOp {
    /// Get the name of this operation.
    pub fn name(&self) -> &'static str {
        match self {
            NativeOp::Hadamard(_) => "h",
            NativeOp::Cnot { .. } => "cnot",
            NativeOp::Toffoli { .. } => "toffoli",
            NativeOp::Identity(_) => "i",
            NativeOp::PauliX(_) => "x",
            NativeOp::PauliY(_) => "y",
            NativeOp::PauliZ(_) => "z",
            NativeOp::PhaseS(_) => "s",
            NativeOp::SDag(_) => "sdag",
            NativeOp::T(_) => "t",
            NativeOp::TDag(_) => "tdag",
            NativeOp::CtrlPhaseShift { .. } => "cr",
            NativeOp::Swap(_, _) => "swap",
            NativeOp::Rx(_, _) => "rx",
            NativeOp::Ry(_, _) => "ry",
            NativeOp::Rz(_, _) => "rz",
            NativeOp::Measure { .. } => "measure",
            NativeOp::Prep { .. } => "prep",
        }
    }

    /// Slots this operation touches, controls first.
    pub fn slots(&self) -> Vec<SlotId> {
        match *self {
            NativeOp::Hadamard(s)
            | NativeOp::Identity(s)
            | NativeOp::PauliX(s)
            | NativeOp::PauliY(s)
            | NativeOp::PauliZ(s)
            | NativeOp::PhaseS(s)
            | NativeOp::SDag(s)
            | NativeOp::T(s)
            | NativeOp::TDag(s)
            | NativeOp::Rx(s, _)
            | NativeOp::Ry(s, _)
            | NativeOp::Rz(s, _)
            | NativeOp::Measure { slot: s, .. }
            | NativeOp::Prep { slot: s, .. } => vec![s],
            NativeOp::Cnot { control, target }
            | NativeOp::CtrlPhaseShift {
                control, target, ..
            } => vec![control, target],
            NativeOp::Swap(a, b) => vec![a, b],
            NativeOp::Toffoli {
                control1,
                control2,
                target,
            } => vec![control1, control2, target],
        }
    }

    /// Whether this is a measurement.
    #[inline]
    pub fn is_measurement(&self) -> bool {
        matches!(self, NativeOp::Measure { .. })
    }

    /// Whether this is a unitary gate (neither measurement nor preparation).
    #[inline]
    pub fn is_unitary(&self) -> bool {
        !matches!(self, NativeOp::Measure { .. } | NativeOp::Prep { .. })
    }
}

impl fmt::Display for NativeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots: Vec<String> = self.slots().iter().map(ToString::to_string).collect();
        write!(f, "{} {}", self.name(), slots.join(","))?;
        match self {
            NativeOp::CtrlPhaseShift { angle, .. }
            | NativeOp::Rx(_, angle)
            | NativeOp::Ry(_, angle)
            | NativeOp::Rz(_, angle) => write!(f, " ({angle:.6})"),
            NativeOp::Measure { basis, .. } | NativeOp::Prep { basis, .. } => {
                write!(f, " [{basis}]")
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_order() {
        let op = NativeOp::Toffoli {
            control1: SlotId(2),
            control2: SlotId(0),
            target: SlotId(1),
        };
        assert_eq!(op.slots(), vec![SlotId(2), SlotId(0), SlotId(1)]);
    }

    #[test]
    fn test_classification_helpers() {
        let m = NativeOp::Measure {
            slot: SlotId(0),
            basis: PauliBasis::Z,
        };
        assert!(m.is_measurement());
        assert!(!m.is_unitary());
        assert!(NativeOp::Rx(SlotId(1), 0.5).is_unitary());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            format!("{}", NativeOp::Cnot { control: SlotId(0), target: SlotId(1) }),
            "cnot s0,s1"
        );
        assert_eq!(
            format!("{}", NativeOp::Prep { slot: SlotId(3), basis: PauliBasis::X }),
            "prep s3 [X]"
        );
    }
}
