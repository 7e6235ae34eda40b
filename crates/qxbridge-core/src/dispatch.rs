//! Gate dispatch table.
//!
//! A [`GateMap`] is an ordered list of [`GateEntry`] patterns, each bound to
//! a native constructor. [`GateMap::classify`] walks the list and the first
//! entry whose pattern matches the descriptor wins; later entries are never
//! consulted.
//!
//! Matching a unitary entry for gate `G` with `K` controls:
//!
//! 1. The descriptor may name at most `K` explicit controls. The remaining
//!    `K - explicit` controls must be encoded in the matrix as leading
//!    qubits, so the target count must be `G.num_targets() + K - explicit`.
//! 2. Those implicit controls are stripped from the matrix, which must be
//!    the identity outside the controlled block.
//! 3. Parameters of `G` are fitted from the remaining block, the canonical
//!    matrix is rebuilt from them, and the two are compared element-wise
//!    within epsilon. Global phase is ignored only when `K == 0` and the
//!    map was built with `ignore_global_phase`.
//!
//! Measurement and preparation entries match on the basis matrix, always
//! up to global phase, and expand to one native op per qubit.

use tracing::{debug, trace};

use qxbridge_ir::{
    ArbData, Matrix, NativeOp, Operation, OperationKind, PauliBasis, PredefinedGate, QubitRef,
    SlotId,
};

use crate::bimap::QubitBiMap;
use crate::config::BackendConfig;
use crate::error::{BackendError, BackendResult};

/// Native constructors a unitary entry can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeKind {
    /// `hadamard(s)`
    Hadamard,
    /// `cnot(c, t)`
    Cnot,
    /// `toffoli(c1, c2, t)`
    Toffoli,
    /// `identity(s)`
    Identity,
    /// `pauli_x(s)`
    PauliX,
    /// `pauli_y(s)`
    PauliY,
    /// `pauli_z(s)`
    PauliZ,
    /// `phase_s(s)`
    PhaseS,
    /// `s_dag(s)`
    SDag,
    /// `t(s)`
    T,
    /// `t_dag(s)`
    TDag,
    /// `ctrl_phase_shift(c, t, angle)`
    CtrlPhaseShift,
    /// `swap(a, b)`
    Swap,
    /// `rx(s, angle)`
    Rx,
    /// `ry(s, angle)`
    Ry,
    /// `rz(s, angle)`
    Rz,
}

impl NativeKind {
    /// Name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            NativeKind::Hadamard => "hadamard",
            NativeKind::Cnot => "cnot",
            NativeKind::Toffoli => "toffoli",
            NativeKind::Identity => "identity",
            NativeKind::PauliX => "pauli_x",
            NativeKind::PauliY => "pauli_y",
            NativeKind::PauliZ => "pauli_z",
            NativeKind::PhaseS => "phase_s",
            NativeKind::SDag => "s_dag",
            NativeKind::T => "t",
            NativeKind::TDag => "t_dag",
            NativeKind::CtrlPhaseShift => "ctrl_phase_shift",
            NativeKind::Swap => "swap",
            NativeKind::Rx => "rx",
            NativeKind::Ry => "ry",
            NativeKind::Rz => "rz",
        }
    }

    /// Number of slots the constructor takes.
    pub fn arity(self) -> usize {
        match self {
            NativeKind::Cnot | NativeKind::CtrlPhaseShift | NativeKind::Swap => 2,
            NativeKind::Toffoli => 3,
            _ => 1,
        }
    }

    /// Build the native op, popping angle arguments from `data` in order.
    pub fn build(self, slots: &[SlotId], data: &mut ArbData) -> BackendResult<NativeOp> {
        if slots.len() != self.arity() {
            return Err(BackendError::InvariantViolation(format!(
                "{} takes {} slots, got {}",
                self.name(),
                self.arity(),
                slots.len()
            )));
        }

        let mut angle = |index: usize| {
            data.pop_arg().ok_or(BackendError::MissingParameter {
                gate: self.name(),
                index,
            })
        };

        let op = match self {
            NativeKind::Hadamard => NativeOp::Hadamard(slots[0]),
            NativeKind::Cnot => NativeOp::Cnot {
                control: slots[0],
                target: slots[1],
            },
            NativeKind::Toffoli => NativeOp::Toffoli {
                control1: slots[0],
                control2: slots[1],
                target: slots[2],
            },
            NativeKind::Identity => NativeOp::Identity(slots[0]),
            NativeKind::PauliX => NativeOp::PauliX(slots[0]),
            NativeKind::PauliY => NativeOp::PauliY(slots[0]),
            NativeKind::PauliZ => NativeOp::PauliZ(slots[0]),
            NativeKind::PhaseS => NativeOp::PhaseS(slots[0]),
            NativeKind::SDag => NativeOp::SDag(slots[0]),
            NativeKind::T => NativeOp::T(slots[0]),
            NativeKind::TDag => NativeOp::TDag(slots[0]),
            NativeKind::CtrlPhaseShift => NativeOp::CtrlPhaseShift {
                control: slots[0],
                target: slots[1],
                angle: angle(0)?,
            },
            NativeKind::Swap => NativeOp::Swap(slots[0], slots[1]),
            NativeKind::Rx => NativeOp::Rx(slots[0], angle(0)?),
            NativeKind::Ry => NativeOp::Ry(slots[0], angle(0)?),
            NativeKind::Rz => NativeOp::Rz(slots[0], angle(0)?),
        };
        Ok(op)
    }
}

/// One pattern of the dispatch table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateEntry {
    /// A predefined gate with `num_controls` controls.
    Unitary {
        /// Gate to recognize.
        gate: PredefinedGate,
        /// Total controls, explicit or encoded in the matrix.
        num_controls: usize,
        /// Constructor to call on a match.
        native: NativeKind,
    },
    /// Measurement in a Pauli basis.
    Measure {
        /// Basis to recognize.
        basis: PauliBasis,
    },
    /// State preparation in a Pauli basis.
    Prep {
        /// Basis to recognize.
        basis: PauliBasis,
    },
}

/// Result of a successful [`GateMap::classify`].
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Matching entry.
    pub entry: GateEntry,
    /// Physical slots, controls first.
    pub slots: Vec<SlotId>,
    /// Recovered gate parameters followed by any upstream arguments.
    pub data: ArbData,
}

impl Classification {
    /// Whether the matched entry is a measurement.
    pub fn is_measurement(&self) -> bool {
        matches!(self.entry, GateEntry::Measure { .. })
    }

    /// Run the bound constructor.
    pub fn construct(mut self) -> BackendResult<Vec<NativeOp>> {
        match self.entry {
            GateEntry::Unitary { native, .. } => Ok(vec![native.build(&self.slots, &mut self.data)?]),
            GateEntry::Measure { basis } => Ok(self
                .slots
                .iter()
                .map(|&slot| NativeOp::Measure { slot, basis })
                .collect()),
            GateEntry::Prep { basis } => Ok(self
                .slots
                .iter()
                .map(|&slot| NativeOp::Prep { slot, basis })
                .collect()),
        }
    }
}

/// Ordered dispatch table.
#[derive(Debug, Clone)]
pub struct GateMap {
    entries: Vec<GateEntry>,
    epsilon: f64,
    ignore_global_phase: bool,
}

impl GateMap {
    /// Create an empty table.
    pub fn new(epsilon: f64, ignore_global_phase: bool) -> Self {
        Self {
            entries: Vec::new(),
            epsilon,
            ignore_global_phase,
        }
    }

    /// The default catalog, tuned by `config`.
    pub fn from_config(config: &BackendConfig) -> Self {
        Self::qx(config.epsilon, config.ignore_global_phase)
    }

    /// The default catalog.
    ///
    /// Order matters: `H` and the controlled-X entries are tried before the
    /// single-qubit Paulis, and the rotations last so that any matrix also
    /// matching a fixed gate maps to that gate.
    pub fn qx(epsilon: f64, ignore_global_phase: bool) -> Self {
        use NativeKind as N;
        use PredefinedGate as G;

        Self::new(epsilon, ignore_global_phase)
            .with_unitary(N::Hadamard, G::H, 0)
            .with_unitary(N::Cnot, G::X, 1)
            .with_unitary(N::Toffoli, G::X, 2)
            .with_unitary(N::Identity, G::I, 0)
            .with_unitary(N::PauliX, G::X, 0)
            .with_unitary(N::PauliY, G::Y, 0)
            .with_unitary(N::PauliZ, G::Z, 0)
            .with_unitary(N::PhaseS, G::S, 0)
            .with_unitary(N::SDag, G::SDag, 0)
            .with_unitary(N::T, G::T, 0)
            .with_unitary(N::TDag, G::TDag, 0)
            .with_unitary(N::CtrlPhaseShift, G::Phase, 1)
            .with_unitary(N::Swap, G::Swap, 0)
            .with_unitary(N::Rx, G::RX, 0)
            .with_unitary(N::Ry, G::RY, 0)
            .with_unitary(N::Rz, G::RZ, 0)
            .with_measure(PauliBasis::Z)
            .with_measure(PauliBasis::X)
            .with_measure(PauliBasis::Y)
            .with_prep(PauliBasis::Z)
            .with_prep(PauliBasis::X)
            .with_prep(PauliBasis::Y)
    }

    /// Append a unitary entry.
    #[must_use]
    pub fn with_unitary(mut self, native: NativeKind, gate: PredefinedGate, num_controls: usize) -> Self {
        self.entries.push(GateEntry::Unitary {
            gate,
            num_controls,
            native,
        });
        self
    }

    /// Append a measurement entry.
    #[must_use]
    pub fn with_measure(mut self, basis: PauliBasis) -> Self {
        self.entries.push(GateEntry::Measure { basis });
        self
    }

    /// Append a preparation entry.
    #[must_use]
    pub fn with_prep(mut self, basis: PauliBasis) -> Self {
        self.entries.push(GateEntry::Prep { basis });
        self
    }

    /// Entries in match order.
    pub fn entries(&self) -> &[GateEntry] {
        &self.entries
    }

    /// Matching tolerance.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Find the first entry matching `op`, on logical qubits.
    ///
    /// Returns the entry, the qubits in constructor order and the
    /// recovered parameters.
    pub fn detect(&self, op: &Operation) -> Option<(GateEntry, Vec<QubitRef>, Vec<f64>)> {
        self.entries.iter().find_map(|entry| {
            let (qubits, params) = self.try_entry(entry, op)?;
            trace!("{} matched {:?}", op, entry);
            Some((*entry, qubits, params))
        })
    }

    /// Classify `op` and translate its qubits through `map`.
    pub fn classify(&self, op: &Operation, map: &QubitBiMap) -> BackendResult<Classification> {
        let Some((entry, qubits, params)) = self.detect(op) else {
            debug!("No gate map entry matches {}", op);
            return Err(BackendError::UnsupportedGate(op.to_string()));
        };

        let slots = qubits
            .iter()
            .map(|&q| map.lookup_forward(q).ok_or(BackendError::UnresolvedQubit(q)))
            .collect::<BackendResult<Vec<_>>>()?;

        let mut data = ArbData::with_args(params);
        data.args.extend(op.data.args.iter().copied());
        data.json = op.data.json.clone();

        Ok(Classification {
            entry,
            slots,
            data,
        })
    }

    fn try_entry(&self, entry: &GateEntry, op: &Operation) -> Option<(Vec<QubitRef>, Vec<f64>)> {
        match (entry, &op.kind) {
            (
                GateEntry::Unitary {
                    gate,
                    num_controls,
                    ..
                },
                OperationKind::Unitary {
                    targets,
                    controls,
                    matrix,
                },
            ) => {
                let params = self.match_unitary(*gate, *num_controls, targets, controls, matrix)?;
                Some((op.qubits(), params))
            }
            (GateEntry::Measure { basis }, OperationKind::Measure { qubits, basis: given })
            | (GateEntry::Prep { basis }, OperationKind::Prep { qubits, basis: given }) => {
                given
                    .approx_eq(&basis.matrix(), self.epsilon, true)
                    .then(|| (qubits.clone(), vec![]))
            }
            _ => None,
        }
    }

    fn match_unitary(
        &self,
        gate: PredefinedGate,
        num_controls: usize,
        targets: &[QubitRef],
        controls: &[QubitRef],
        matrix: &Matrix,
    ) -> Option<Vec<f64>> {
        let implicit = num_controls.checked_sub(controls.len())?;
        if targets.len() != gate.num_targets() + implicit {
            return None;
        }

        let block = matrix.strip_controls(implicit, self.epsilon)?;
        let params = gate.fit(&block)?;
        let canonical = gate.matrix(&params).ok()?;
        let ignore_phase = self.ignore_global_phase && num_controls == 0;

        block
            .approx_eq(&canonical, self.epsilon, ignore_phase)
            .then_some(params)
    }
}
