//! Property-based tests for matrix matching.
//!
//! Parameter fitting must recover the angle a canonical matrix was built
//! from, control stripping must undo `controlled`, and global phase must
//! only matter when it is not ignored.

use num_complex::Complex64;
use proptest::prelude::*;
use qxbridge_ir::{Matrix, PredefinedGate};

const EPS: f64 = 1e-6;

fn arb_rotation() -> impl Strategy<Value = PredefinedGate> {
    prop_oneof![
        Just(PredefinedGate::RX),
        Just(PredefinedGate::RY),
        Just(PredefinedGate::RZ),
        Just(PredefinedGate::Phase),
    ]
}

fn arb_fixed() -> impl Strategy<Value = PredefinedGate> {
    prop_oneof![
        Just(PredefinedGate::X),
        Just(PredefinedGate::Y),
        Just(PredefinedGate::Z),
        Just(PredefinedGate::H),
        Just(PredefinedGate::S),
        Just(PredefinedGate::T),
        Just(PredefinedGate::Swap),
    ]
}

fn with_phase(matrix: &Matrix, alpha: f64) -> Matrix {
    let phase = Complex64::from_polar(1.0, alpha);
    let data = matrix.data().iter().map(|c| c * phase).collect();
    Matrix::new(matrix.num_qubits(), data).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn fit_recovers_angle(gate in arb_rotation(), theta in -3.0_f64..3.0) {
        let matrix = gate.matrix(&[theta]).unwrap();
        let params = gate.fit(&matrix).unwrap();
        prop_assert_eq!(params.len(), 1);
        prop_assert!((params[0] - theta).abs() < 1e-9, "{} fitted {} for {}", gate, params[0], theta);
    }

    #[test]
    fn fit_ignores_global_phase(gate in arb_rotation(), theta in -3.0_f64..3.0, alpha in -3.0_f64..3.0) {
        let matrix = with_phase(&gate.matrix(&[theta]).unwrap(), alpha);
        let params = gate.fit(&matrix).unwrap();
        let rebuilt = gate.matrix(&params).unwrap();
        prop_assert!(matrix.approx_eq(&rebuilt, EPS, true));
    }

    #[test]
    fn strip_undoes_controlled(gate in arb_fixed(), controls in 1_usize..=2) {
        let base = gate.matrix(&[]).unwrap();
        let stripped = base.controlled(controls).strip_controls(controls, EPS).unwrap();
        prop_assert!(stripped.approx_eq(&base, EPS, false));
    }

    #[test]
    fn global_phase_only_matters_when_checked(gate in arb_fixed(), alpha in 0.01_f64..3.0) {
        let base = gate.matrix(&[]).unwrap();
        let phased = with_phase(&base, alpha);
        prop_assert!(phased.approx_eq(&base, EPS, true));
        prop_assert!(!phased.approx_eq(&base, EPS, false));
    }
}
