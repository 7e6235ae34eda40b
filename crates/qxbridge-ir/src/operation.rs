//! Abstract operation descriptors as delivered by the upstream runtime.
//!
//! An [`Operation`] names logical qubits only. It is either a unitary given
//! by an explicit matrix (optionally with explicit control qubits), a
//! measurement in some basis, or a state preparation in some basis. Nothing
//! here knows about the backend's gate catalog; recognizing a descriptor as
//! a concrete gate is the dispatch table's job.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::error::{IrError, IrResult};
use crate::gate::{PauliBasis, PredefinedGate};
use crate::matrix::Matrix;
use crate::qubit::QubitRef;

/// Ordered numeric arguments attached to an operation.
///
/// The dispatch table pushes recovered gate parameters here in a fixed
/// order; native gate constructors pop them in that same order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArbData {
    /// Optional JSON payload, passed through untouched.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub json: serde_json::Value,
    /// Numeric arguments.
    #[serde(default)]
    pub args: VecDeque<f64>,
}

impl ArbData {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create metadata holding the given arguments.
    pub fn with_args(args: impl IntoIterator<Item = f64>) -> Self {
        Self {
            json: serde_json::Value::Null,
            args: args.into_iter().collect(),
        }
    }

    /// Append an argument.
    pub fn push_arg(&mut self, value: f64) {
        self.args.push_back(value);
    }

    /// Remove and return the first argument.
    pub fn pop_arg(&mut self) -> Option<f64> {
        self.args.pop_front()
    }

    /// Peek at argument `index`.
    pub fn get_arg(&self, index: usize) -> Option<f64> {
        self.args.get(index).copied()
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Whether there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// A configuration command addressed to some plugin interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbCmd {
    /// Interface name; commands for other interfaces are ignored.
    pub interface: String,
    /// Operation (option) name within the interface.
    pub operation: String,
    /// Argument value.
    #[serde(default)]
    pub value: serde_json::Value,
}

impl ArbCmd {
    /// Create a new command.
    pub fn new(
        interface: impl Into<String>,
        operation: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        Self {
            interface: interface.into(),
            operation: operation.into(),
            value,
        }
    }
}

/// The shape of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationKind {
    /// A unitary on `targets`, optionally controlled by `controls`.
    Unitary {
        /// Target qubits; `matrix` acts on these in order.
        targets: Vec<QubitRef>,
        /// Explicit control qubits.
        #[serde(default)]
        controls: Vec<QubitRef>,
        /// Matrix over the targets.
        matrix: Matrix,
    },
    /// Measure each qubit independently in `basis`.
    Measure {
        /// Measured qubits.
        qubits: Vec<QubitRef>,
        /// Basis matrix.
        basis: Matrix,
    },
    /// Prepare each qubit independently in the first state of `basis`.
    Prep {
        /// Prepared qubits.
        qubits: Vec<QubitRef>,
        /// Basis matrix.
        basis: Matrix,
    },
}

/// An abstract operation descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// What the operation does.
    pub kind: OperationKind,
    /// Attached metadata.
    #[serde(default)]
    pub data: ArbData,
}

impl Operation {
    /// Create a unitary operation on `targets`.
    pub fn unitary(targets: Vec<QubitRef>, matrix: Matrix) -> IrResult<Self> {
        Self::controlled(targets, vec![], matrix)
    }

    /// Create a unitary with explicit control qubits.
    pub fn controlled(
        targets: Vec<QubitRef>,
        controls: Vec<QubitRef>,
        matrix: Matrix,
    ) -> IrResult<Self> {
        if targets.len() != matrix.num_qubits() {
            return Err(IrError::QubitCountMismatch {
                gate_name: "unitary".into(),
                expected: matrix.num_qubits(),
                got: targets.len(),
            });
        }
        check_distinct(targets.iter().chain(&controls))?;
        Ok(Self {
            kind: OperationKind::Unitary {
                targets,
                controls,
                matrix,
            },
            data: ArbData::new(),
        })
    }

    /// Create a predefined gate on `targets`, controlled by `controls`.
    pub fn predefined(
        gate: PredefinedGate,
        targets: Vec<QubitRef>,
        controls: Vec<QubitRef>,
        params: &[f64],
    ) -> IrResult<Self> {
        let matrix = gate.matrix(params)?;
        if targets.len() != gate.num_targets() {
            return Err(IrError::QubitCountMismatch {
                gate_name: gate.name().to_string(),
                expected: gate.num_targets(),
                got: targets.len(),
            });
        }
        Self::controlled(targets, controls, matrix)
    }

    /// Create a measurement of every qubit in `basis`.
    pub fn measure(qubits: Vec<QubitRef>, basis: PauliBasis) -> IrResult<Self> {
        Self::measure_with_basis(qubits, basis.matrix())
    }

    /// Create a measurement with an explicit basis matrix.
    pub fn measure_with_basis(qubits: Vec<QubitRef>, basis: Matrix) -> IrResult<Self> {
        check_basis(&qubits, &basis)?;
        Ok(Self {
            kind: OperationKind::Measure { qubits, basis },
            data: ArbData::new(),
        })
    }

    /// Create a state preparation of every qubit in `basis`.
    pub fn prep(qubits: Vec<QubitRef>, basis: PauliBasis) -> IrResult<Self> {
        Self::prep_with_basis(qubits, basis.matrix())
    }

    /// Create a state preparation with an explicit basis matrix.
    pub fn prep_with_basis(qubits: Vec<QubitRef>, basis: Matrix) -> IrResult<Self> {
        check_basis(&qubits, &basis)?;
        Ok(Self {
            kind: OperationKind::Prep { qubits, basis },
            data: ArbData::new(),
        })
    }

    /// Attach metadata.
    #[must_use]
    pub fn with_data(mut self, data: ArbData) -> Self {
        self.data = data;
        self
    }

    /// All qubits the operation names: controls first, then targets.
    pub fn qubits(&self) -> Vec<QubitRef> {
        match &self.kind {
            OperationKind::Unitary {
                targets, controls, ..
            } => controls.iter().chain(targets).copied().collect(),
            OperationKind::Measure { qubits, .. } | OperationKind::Prep { qubits, .. } => {
                qubits.clone()
            }
        }
    }

    /// Whether executing this operation produces measurement results.
    pub fn has_measures(&self) -> bool {
        matches!(self.kind, OperationKind::Measure { .. })
    }

    /// The qubits measured by this operation.
    pub fn measures(&self) -> &[QubitRef] {
        match &self.kind {
            OperationKind::Measure { qubits, .. } => qubits,
            _ => &[],
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (label, qubits) = match &self.kind {
            OperationKind::Unitary { matrix, .. } => {
                (format!("unitary[{}q]", matrix.num_qubits()), self.qubits())
            }
            OperationKind::Measure { qubits, .. } => ("measure".to_string(), qubits.clone()),
            OperationKind::Prep { qubits, .. } => ("prep".to_string(), qubits.clone()),
        };
        let names: Vec<String> = qubits.iter().map(ToString::to_string).collect();
        write!(f, "{label} {}", names.join(", "))?;
        if !self.data.is_empty() {
            write!(f, " args={:?}", self.data.args)?;
        }
        Ok(())
    }
}

fn check_basis(qubits: &[QubitRef], basis: &Matrix) -> IrResult<()> {
    if qubits.is_empty() {
        return Err(IrError::NoQubits);
    }
    if basis.num_qubits() != 1 {
        return Err(IrError::QubitCountMismatch {
            gate_name: "basis".into(),
            expected: 1,
            got: basis.num_qubits(),
        });
    }
    check_distinct(qubits)
}

fn check_distinct<'a>(qubits: impl IntoIterator<Item = &'a QubitRef>) -> IrResult<()> {
    let mut seen = std::collections::BTreeSet::new();
    for q in qubits {
        if !seen.insert(*q) {
            return Err(IrError::DuplicateQubit(q.to_string()));
        }
    }
    Ok(())
}
