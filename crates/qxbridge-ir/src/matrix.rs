//! Dense unitary matrices with tolerance-based comparison.
//!
//! Matrices are stored row-major. For a matrix acting on qubits
//! `[q0, q1, ..]`, `q0` is the most significant bit of the row/column index,
//! so the familiar CNOT matrix is written with the control first.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{IrError, IrResult};

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// A `2^n x 2^n` complex matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct Matrix {
    num_qubits: usize,
    data: Vec<Complex64>,
}

/// Unchecked wire form of [`Matrix`].
#[derive(Deserialize)]
struct RawMatrix {
    num_qubits: usize,
    data: Vec<Complex64>,
}

impl TryFrom<RawMatrix> for Matrix {
    type Error = IrError;

    fn try_from(raw: RawMatrix) -> IrResult<Self> {
        Matrix::new(raw.num_qubits, raw.data)
    }
}

impl Matrix {
    /// Create a matrix over `num_qubits` qubits from row-major elements.
    ///
    /// A width whose element count overflows `usize` reports `usize::MAX`
    /// as the expected size.
    pub fn new(num_qubits: usize, data: Vec<Complex64>) -> IrResult<Self> {
        let expected = u32::try_from(num_qubits)
            .ok()
            .and_then(|n| 1usize.checked_shl(n))
            .and_then(|dim| dim.checked_mul(dim));
        if expected != Some(data.len()) {
            return Err(IrError::MatrixSize {
                num_qubits,
                expected: expected.unwrap_or(usize::MAX),
                got: data.len(),
            });
        }
        Ok(Self { num_qubits, data })
    }

    /// Create a single-qubit matrix `[[a, b], [c, d]]`.
    pub fn single(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self {
            num_qubits: 1,
            data: vec![a, b, c, d],
        }
    }

    /// Create the identity over `num_qubits` qubits.
    pub fn identity(num_qubits: usize) -> Self {
        let dim = 1usize << num_qubits;
        let mut data = vec![ZERO; dim * dim];
        for i in 0..dim {
            data[i * dim + i] = ONE;
        }
        Self { num_qubits, data }
    }

    /// Number of qubits this matrix acts on.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Row/column dimension, `2^num_qubits`.
    #[inline]
    pub fn dim(&self) -> usize {
        1 << self.num_qubits
    }

    /// Element at (`row`, `col`).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[row * self.dim() + col]
    }

    /// Row-major elements.
    pub fn data(&self) -> &[Complex64] {
        &self.data
    }

    /// Add a real offset to a single element. Used to model imprecise
    /// upstream gate definitions.
    #[must_use]
    pub fn perturbed(mut self, row: usize, col: usize, delta: f64) -> Self {
        let dim = self.dim();
        self.data[row * dim + col] += Complex64::new(delta, 0.0);
        self
    }

    /// Compare two matrices element-wise within `epsilon`.
    ///
    /// With `ignore_global_phase`, `other` is first rotated by the phase that
    /// best aligns it with `self`.
    pub fn approx_eq(&self, other: &Matrix, epsilon: f64, ignore_global_phase: bool) -> bool {
        if self.num_qubits != other.num_qubits {
            return false;
        }

        let phase = if ignore_global_phase {
            let overlap: Complex64 = self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| b.conj() * a)
                .sum();
            if overlap.norm() > f64::EPSILON {
                overlap / overlap.norm()
            } else {
                ONE
            }
        } else {
            ONE
        };

        self.data
            .iter()
            .zip(&other.data)
            .all(|(a, b)| (a - phase * b).norm() <= epsilon)
    }

    /// Interpret the leading `num_controls` qubits as controls and return the
    /// controlled block.
    ///
    /// Returns `None` unless the matrix is the identity (up to a global
    /// phase) everywhere outside its bottom-right block.
    pub fn strip_controls(&self, num_controls: usize, epsilon: f64) -> Option<Matrix> {
        if num_controls == 0 {
            return Some(self.clone());
        }
        if num_controls >= self.num_qubits {
            return None;
        }

        let dim = self.dim();
        let sub_qubits = self.num_qubits - num_controls;
        let sub_dim = 1usize << sub_qubits;
        let offset = dim - sub_dim;

        let pivot = self.get(0, 0);
        if (pivot.norm() - 1.0).abs() > epsilon {
            return None;
        }
        let unphase = pivot.conj() / pivot.norm();

        for row in 0..dim {
            for col in 0..dim {
                if row >= offset && col >= offset {
                    continue;
                }
                let expected = if row == col { ONE } else { ZERO };
                if (self.get(row, col) * unphase - expected).norm() > epsilon {
                    return None;
                }
            }
        }

        let mut data = Vec::with_capacity(sub_dim * sub_dim);
        for row in offset..dim {
            for col in offset..dim {
                data.push(self.get(row, col) * unphase);
            }
        }
        Some(Matrix {
            num_qubits: sub_qubits,
            data,
        })
    }

    /// Build the matrix of this gate controlled by `num_controls` leading qubits.
    #[must_use]
    pub fn controlled(&self, num_controls: usize) -> Matrix {
        let mut out = Matrix::identity(self.num_qubits + num_controls);
        let dim = out.dim();
        let sub_dim = self.dim();
        let offset = dim - sub_dim;
        for row in 0..sub_dim {
            for col in 0..sub_dim {
                out.data[(offset + row) * dim + offset + col] = self.get(row, col);
            }
        }
        out
    }

    /// Normalize angles to (-pi, pi].
    pub fn normalize_angle(angle: f64) -> f64 {
        if angle.is_nan() || angle.is_infinite() {
            return 0.0;
        }
        let mut a = angle.rem_euclid(2.0 * PI);
        if a > PI {
            a -= 2.0 * PI;
        }
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Matrix {
        Matrix::single(ZERO, ONE, ONE, ZERO)
    }

    #[test]
    fn test_new_rejects_wrong_size() {
        let err = Matrix::new(1, vec![ONE; 3]).unwrap_err();
        assert!(matches!(err, IrError::MatrixSize { expected: 4, got: 3, .. }));
    }

    #[test]
    fn test_new_rejects_overflowing_width() {
        for n in [32, 64, 200] {
            let err = Matrix::new(n, vec![ONE; 4]).unwrap_err();
            assert!(matches!(err, IrError::MatrixSize { expected: usize::MAX, got: 4, .. }));
        }
    }

    #[test]
    fn test_deserialize_checks_size() {
        let ok = r#"{"num_qubits": 1, "data": [[0, 0], [1, 0], [1, 0], [0, 0]]}"#;
        let m: Matrix = serde_json::from_str(ok).unwrap();
        assert_eq!(m, x());

        let short = r#"{"num_qubits": 1, "data": [[1, 0], [0, 0], [0, 0]]}"#;
        let err = serde_json::from_str::<Matrix>(short).unwrap_err();
        assert!(err.to_string().contains("needs 4 elements, got 3"), "{err}");
    }

    #[test]
    fn test_identity() {
        let i = Matrix::identity(2);
        assert_eq!(i.dim(), 4);
        assert_eq!(i.get(3, 3), ONE);
        assert_eq!(i.get(0, 3), ZERO);
    }

    #[test]
    fn test_approx_eq_global_phase() {
        let phased = Matrix::single(
            ZERO,
            Complex64::new(0.0, 1.0),
            Complex64::new(0.0, 1.0),
            ZERO,
        );
        assert!(phased.approx_eq(&x(), 1e-9, true));
        assert!(!phased.approx_eq(&x(), 1e-9, false));
    }

    #[test]
    fn test_approx_eq_tolerance() {
        let near = x().perturbed(0, 0, 5e-7);
        let far = x().perturbed(0, 0, 5e-6);
        assert!(near.approx_eq(&x(), 1e-6, true));
        assert!(!far.approx_eq(&x(), 1e-6, true));
    }

    #[test]
    fn test_controlled_then_strip() {
        let cnot = x().controlled(1);
        assert_eq!(cnot.num_qubits(), 2);
        assert_eq!(cnot.get(2, 3), ONE);
        assert_eq!(cnot.get(0, 0), ONE);

        let block = cnot.strip_controls(1, 1e-9).unwrap();
        assert!(block.approx_eq(&x(), 1e-9, false));
    }

    #[test]
    fn test_strip_rejects_uncontrolled() {
        let h = 1.0 / 2.0_f64.sqrt();
        let hh = Matrix::new(
            2,
            vec![
                Complex64::new(h, 0.0),
                Complex64::new(h, 0.0),
                ZERO,
                ZERO,
                Complex64::new(h, 0.0),
                Complex64::new(-h, 0.0),
                ZERO,
                ZERO,
                ZERO,
                ZERO,
                Complex64::new(h, 0.0),
                Complex64::new(h, 0.0),
                ZERO,
                ZERO,
                Complex64::new(h, 0.0),
                Complex64::new(-h, 0.0),
            ],
        )
        .unwrap();
        assert!(hh.strip_controls(1, 1e-6).is_none());
        assert!(x().strip_controls(1, 1e-6).is_none());
    }

    #[test]
    fn test_normalize_angle() {
        assert!((Matrix::normalize_angle(2.5 * PI) - PI / 2.0).abs() < 1e-12);
        assert!((Matrix::normalize_angle(-PI / 2.0) + PI / 2.0).abs() < 1e-12);
        assert_eq!(Matrix::normalize_angle(f64::NAN), 0.0);
    }
}
