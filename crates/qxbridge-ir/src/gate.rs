//! Canonical gate catalog and Pauli bases.
//!
//! [`PredefinedGate`] lists the unitaries the dispatch table can recognize,
//! each with a canonical matrix. Parameterized gates can also recover their
//! angle from an arbitrary matrix with [`PredefinedGate::fit`]; the caller is
//! expected to rebuild the canonical matrix and compare within tolerance.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::fmt;

use crate::error::{IrError, IrResult};
use crate::matrix::Matrix;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// Gates with a known canonical matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredefinedGate {
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    #[serde(rename = "sdag")]
    SDag,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    #[serde(rename = "tdag")]
    TDag,
    /// SWAP gate.
    Swap,
    /// Phase gate `diag(1, e^{i theta})`.
    Phase,
    /// Rotation around X axis.
    RX,
    /// Rotation around Y axis.
    RY,
    /// Rotation around Z axis.
    RZ,
}

impl PredefinedGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            PredefinedGate::I => "i",
            PredefinedGate::X => "x",
            PredefinedGate::Y => "y",
            PredefinedGate::Z => "z",
            PredefinedGate::H => "h",
            PredefinedGate::S => "s",
            PredefinedGate::SDag => "sdag",
            PredefinedGate::T => "t",
            PredefinedGate::TDag => "tdag",
            PredefinedGate::Swap => "swap",
            PredefinedGate::Phase => "phase",
            PredefinedGate::RX => "rx",
            PredefinedGate::RY => "ry",
            PredefinedGate::RZ => "rz",
        }
    }

    /// Look a gate up by name. Accepts a few common aliases.
    pub fn from_name(name: &str) -> IrResult<Self> {
        let gate = match name.to_ascii_lowercase().as_str() {
            "i" | "id" => PredefinedGate::I,
            "x" => PredefinedGate::X,
            "y" => PredefinedGate::Y,
            "z" => PredefinedGate::Z,
            "h" => PredefinedGate::H,
            "s" => PredefinedGate::S,
            "sdag" | "sdg" => PredefinedGate::SDag,
            "t" => PredefinedGate::T,
            "tdag" | "tdg" => PredefinedGate::TDag,
            "swap" => PredefinedGate::Swap,
            "phase" | "p" => PredefinedGate::Phase,
            "rx" => PredefinedGate::RX,
            "ry" => PredefinedGate::RY,
            "rz" => PredefinedGate::RZ,
            _ => return Err(IrError::UnknownGate(name.to_string())),
        };
        Ok(gate)
    }

    /// Number of target qubits of the canonical matrix.
    #[inline]
    pub fn num_targets(self) -> usize {
        match self {
            PredefinedGate::Swap => 2,
            _ => 1,
        }
    }

    /// Number of angle parameters.
    #[inline]
    pub fn num_params(self) -> usize {
        match self {
            PredefinedGate::Phase | PredefinedGate::RX | PredefinedGate::RY | PredefinedGate::RZ => 1,
            _ => 0,
        }
    }

    /// Build the canonical matrix for the given parameters.
    pub fn matrix(self, params: &[f64]) -> IrResult<Matrix> {
        if params.len() != self.num_params() {
            return Err(IrError::ParameterCountMismatch {
                gate_name: self.name().to_string(),
                expected: self.num_params(),
                got: params.len(),
            });
        }

        let m = match self {
            PredefinedGate::I => Matrix::identity(1),
            PredefinedGate::X => Matrix::single(ZERO, ONE, ONE, ZERO),
            PredefinedGate::Y => Matrix::single(ZERO, -I, I, ZERO),
            PredefinedGate::Z => Matrix::single(ONE, ZERO, ZERO, -ONE),
            PredefinedGate::H => {
                let s = Complex64::new(FRAC_1_SQRT_2, 0.0);
                Matrix::single(s, s, s, -s)
            }
            PredefinedGate::S => Matrix::single(ONE, ZERO, ZERO, I),
            PredefinedGate::SDag => Matrix::single(ONE, ZERO, ZERO, -I),
            PredefinedGate::T => {
                Matrix::single(ONE, ZERO, ZERO, Complex64::from_polar(1.0, PI / 4.0))
            }
            PredefinedGate::TDag => {
                Matrix::single(ONE, ZERO, ZERO, Complex64::from_polar(1.0, -PI / 4.0))
            }
            PredefinedGate::Swap => Matrix::new(
                2,
                vec![
                    ONE, ZERO, ZERO, ZERO, //
                    ZERO, ZERO, ONE, ZERO, //
                    ZERO, ONE, ZERO, ZERO, //
                    ZERO, ZERO, ZERO, ONE,
                ],
            )?,
            PredefinedGate::Phase => {
                Matrix::single(ONE, ZERO, ZERO, Complex64::from_polar(1.0, params[0]))
            }
            PredefinedGate::RX => {
                let c = Complex64::new((params[0] / 2.0).cos(), 0.0);
                let s = Complex64::new(0.0, -(params[0] / 2.0).sin());
                Matrix::single(c, s, s, c)
            }
            PredefinedGate::RY => {
                let c = Complex64::new((params[0] / 2.0).cos(), 0.0);
                let s = Complex64::new((params[0] / 2.0).sin(), 0.0);
                Matrix::single(c, -s, s, c)
            }
            PredefinedGate::RZ => Matrix::single(
                Complex64::from_polar(1.0, -params[0] / 2.0),
                ZERO,
                ZERO,
                Complex64::from_polar(1.0, params[0] / 2.0),
            ),
        };
        Ok(m)
    }

    /// Recover the canonical parameters that best explain `matrix`.
    ///
    /// Returns an empty list for unparameterized gates and `None` when the
    /// matrix has the wrong size. The result is a candidate only. Rotation
    /// angles land in `(-2*pi, 2*pi]`, other angles in `(-pi, pi]`.
    pub fn fit(self, matrix: &Matrix) -> Option<Vec<f64>> {
        if matrix.num_qubits() != self.num_targets() {
            return None;
        }

        let theta = match self {
            PredefinedGate::Phase | PredefinedGate::RZ => {
                (matrix.get(1, 1) * matrix.get(0, 0).conj()).arg()
            }
            PredefinedGate::RX => {
                let a = matrix.get(0, 0);
                if a.norm() > f64::EPSILON {
                    let s = -(matrix.get(0, 1) * a.conj()).im / a.norm();
                    2.0 * s.atan2(a.norm())
                } else {
                    PI
                }
            }
            PredefinedGate::RY => {
                let a = matrix.get(0, 0);
                if a.norm() > f64::EPSILON {
                    let s = (matrix.get(1, 0) * a.conj()).re / a.norm();
                    2.0 * s.atan2(a.norm())
                } else {
                    PI
                }
            }
            _ => return Some(vec![]),
        };
        let theta = Matrix::normalize_angle(theta);

        // RX, RY and RZ have period 4*pi: theta and theta -/+ 2*pi differ by
        // a sign, so keep whichever candidate is in phase with `matrix`.
        if matches!(self, PredefinedGate::RX | PredefinedGate::RY | PredefinedGate::RZ) {
            let canonical = self.matrix(&[theta]).ok()?;
            let overlap: f64 = canonical
                .data()
                .iter()
                .zip(matrix.data())
                .map(|(c, m)| (c.conj() * m).re)
                .sum();
            if overlap < 0.0 {
                let shifted = if theta > 0.0 { theta - 2.0 * PI } else { theta + 2.0 * PI };
                return Some(vec![shifted]);
            }
        }

        Some(vec![theta])
    }
}

impl fmt::Display for PredefinedGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One of the three canonical measurement/preparation bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PauliBasis {
    /// Computational basis.
    Z,
    /// Hadamard basis `|+>`, `|->`.
    X,
    /// Circular basis `|+i>`, `|-i>`.
    Y,
}

impl PauliBasis {
    /// Look a basis up by name.
    pub fn from_name(name: &str) -> IrResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "z" => Ok(PauliBasis::Z),
            "x" => Ok(PauliBasis::X),
            "y" => Ok(PauliBasis::Y),
            _ => Err(IrError::UnknownGate(format!("basis {name}"))),
        }
    }

    /// Basis matrix whose columns are the `|0>`-like and `|1>`-like states.
    pub fn matrix(self) -> Matrix {
        let s = Complex64::new(FRAC_1_SQRT_2, 0.0);
        match self {
            PauliBasis::Z => Matrix::identity(1),
            PauliBasis::X => Matrix::single(s, s, s, -s),
            PauliBasis::Y => Matrix::single(s, s, I * s, -I * s),
        }
    }
}

impl fmt::Display for PauliBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PauliBasis::Z => write!(f, "Z"),
            PauliBasis::X => write!(f, "X"),
            PauliBasis::Y => write!(f, "Y"),
        }
    }
}
