//! Replay scripts.
//!
//! A script is a backend configuration, an engine configuration and a list
//! of steps, each mirroring one upstream callback:
//!
//! ```yaml
//! config:
//!   epsilon: 1.0e-6
//! engine:
//!   seed: 7
//! steps:
//!   - allocate: [0, 1]
//!   - gate: { name: h, qubits: [0] }
//!   - gate: { name: cnot, qubits: [0, 1] }
//!   - gate: { name: measure, qubits: [0, 1] }
//!   - drain
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use qxbridge_adapter_sim::SimulatorConfig;
use qxbridge_core::{BackendConfig, MeasurementValue, QxBackend};
use qxbridge_hal::EngineFactory;
use qxbridge_ir::{Matrix, Operation, PauliBasis, PredefinedGate, QubitRef};

/// A complete replay script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Script {
    /// Backend options.
    #[serde(default)]
    pub config: BackendConfig,
    /// Engine options.
    #[serde(default)]
    pub engine: SimulatorConfig,
    /// Callbacks in order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One upstream callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Allocate upstream qubits.
    Allocate(Vec<QubitRef>),
    /// Free upstream qubits.
    Free(Vec<QubitRef>),
    /// Submit one operation.
    Gate(GateStep),
    /// Flush everything pending.
    Drain,
}

/// Operation description in script form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateStep {
    /// Gate name, alias, `measure`, `prep` or `unitary`.
    pub name: String,
    /// Qubits. Two- and three-qubit aliases take their controls first.
    pub qubits: Vec<QubitRef>,
    /// Extra explicit controls.
    #[serde(default)]
    pub controls: Vec<QubitRef>,
    /// Gate angles.
    #[serde(default)]
    pub params: Vec<f64>,
    /// Basis for `measure` and `prep`; Z when absent.
    #[serde(default)]
    pub basis: Option<String>,
    /// Row-major `[re, im]` elements for `unitary`.
    #[serde(default)]
    pub matrix: Option<Vec<[f64; 2]>>,
}

impl GateStep {
    /// Build the operation descriptor.
    pub fn to_operation(&self) -> Result<Operation> {
        let name = self.name.to_ascii_lowercase();
        let op = match name.as_str() {
            "measure" => Operation::measure(self.qubits.clone(), self.basis()?)?,
            "prep" => Operation::prep(self.qubits.clone(), self.basis()?)?,
            "unitary" => {
                let Some(elements) = &self.matrix else {
                    bail!("'unitary' needs a matrix");
                };
                let data = elements
                    .iter()
                    .map(|[re, im]| Complex64::new(*re, *im))
                    .collect();
                let matrix = Matrix::new(self.qubits.len(), data)?;
                Operation::controlled(self.qubits.clone(), self.controls.clone(), matrix)?
            }
            "cnot" | "cx" => self.controlled_alias(PredefinedGate::X, 1)?,
            "toffoli" | "ccx" => self.controlled_alias(PredefinedGate::X, 2)?,
            "cphase" | "cp" => self.controlled_alias(PredefinedGate::Phase, 1)?,
            other => Operation::predefined(
                PredefinedGate::from_name(other)?,
                self.qubits.clone(),
                self.controls.clone(),
                &self.params,
            )?,
        };
        Ok(op)
    }

    fn basis(&self) -> Result<PauliBasis> {
        Ok(match &self.basis {
            Some(name) => PauliBasis::from_name(name)?,
            None => PauliBasis::Z,
        })
    }

    fn controlled_alias(&self, gate: PredefinedGate, num_controls: usize) -> Result<Operation> {
        if self.qubits.len() != num_controls + gate.num_targets() {
            bail!(
                "'{}' takes {} qubits, got {}",
                self.name,
                num_controls + gate.num_targets(),
                self.qubits.len()
            );
        }
        let (controls, targets) = self.qubits.split_at(num_controls);
        let mut all_controls = self.controls.clone();
        all_controls.extend_from_slice(controls);
        Ok(Operation::predefined(
            gate,
            targets.to_vec(),
            all_controls,
            &self.params,
        )?)
    }
}

/// Outcomes of one measuring step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    /// One-based step number.
    pub step: usize,
    /// Outcomes sorted by qubit.
    pub outcomes: Vec<(QubitRef, MeasurementValue)>,
}

/// Load a script from a YAML or JSON file.
pub fn load_script(path: &str) -> Result<Script> {
    let path_obj = Path::new(path);
    if !path_obj.exists() {
        bail!("File not found: {path}");
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;
    let ext = path_obj.extension().and_then(|e| e.to_str()).unwrap_or("");

    match ext.to_lowercase().as_str() {
        "json" => serde_json::from_str(&source).with_context(|| format!("Invalid script: {path}")),
        _ => serde_yaml_ng::from_str(&source).with_context(|| format!("Invalid script: {path}")),
    }
}

impl Script {
    /// Run every step against `backend`, which must be initialized.
    ///
    /// Stops at the first failing step.
    pub fn replay<F: EngineFactory>(&self, backend: &mut QxBackend<F>) -> Result<Vec<StepRecord>> {
        let mut records = Vec::new();
        for (index, step) in self.steps.iter().enumerate() {
            let number = index + 1;
            debug!("Step {}: {:?}", number, step);
            match step {
                Step::Allocate(qubits) => backend
                    .allocate(qubits)
                    .with_context(|| format!("step {number}: allocate failed"))?,
                Step::Free(qubits) => backend
                    .free(qubits)
                    .with_context(|| format!("step {number}: free failed"))?,
                Step::Gate(gate) => {
                    let op = gate
                        .to_operation()
                        .with_context(|| format!("step {number}: invalid gate '{}'", gate.name))?;
                    let outcomes = backend
                        .gate(&op)
                        .with_context(|| format!("step {number}: gate '{}' failed", gate.name))?;
                    if op.has_measures() {
                        records.push(StepRecord {
                            step: number,
                            outcomes: outcomes.sorted(),
                        });
                    }
                }
                Step::Drain => backend
                    .drain()
                    .with_context(|| format!("step {number}: drain failed"))?,
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qxbridge_adapter_sim::StatevectorFactory;
    use std::io::Write;

    const BELL: &str = r"
engine:
  seed: 11
steps:
  - allocate: [3, 4]
  - gate: { name: h, qubits: [3] }
  - gate: { name: cnot, qubits: [3, 4] }
  - gate: { name: measure, qubits: [3, 4] }
  - free: [3]
  - allocate: [5]
  - gate: { name: x, qubits: [5] }
  - gate: { name: prep, qubits: [4], basis: x }
  - gate: { name: measure, qubits: [5] }
  - drain
";

    fn run(script: &Script) -> Result<Vec<StepRecord>> {
        let mut backend = QxBackend::new(StatevectorFactory::with_config(script.engine.clone()));
        backend.initialize(script.config.clone())?;
        script.replay(&mut backend)
    }

    #[test]
    fn test_parse_yaml() {
        let script: Script = serde_yaml_ng::from_str(BELL).unwrap();
        assert_eq!(script.steps.len(), 10);
        assert_eq!(script.engine.seed, Some(11));
        assert_eq!(script.config, BackendConfig::default());
        assert!(matches!(script.steps[9], Step::Drain));
    }

    #[test]
    fn test_replay_bell() {
        let script: Script = serde_yaml_ng::from_str(BELL).unwrap();
        let records = run(&script).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].step, 4);
        assert_eq!(records[0].outcomes.len(), 2);
        assert_eq!(records[0].outcomes[0].1, records[0].outcomes[1].1);
        // q5 reuses q3's slot without a reset, so its value depends on the
        // first outcome.
        assert_eq!(records[1].outcomes[0].0, QubitRef(5));
    }

    #[test]
    fn test_aliases() {
        let cphase = GateStep {
            name: "CP".into(),
            qubits: vec![QubitRef(0), QubitRef(1)],
            controls: vec![],
            params: vec![0.5],
            basis: None,
            matrix: None,
        };
        let op = cphase.to_operation().unwrap();
        assert_eq!(op.qubits(), vec![QubitRef(0), QubitRef(1)]);

        let short = GateStep {
            name: "toffoli".into(),
            qubits: vec![QubitRef(0), QubitRef(1)],
            ..cphase.clone()
        };
        assert!(short.to_operation().is_err());
    }

    #[test]
    fn test_unitary_matrix() {
        let step = GateStep {
            name: "unitary".into(),
            qubits: vec![QubitRef(0)],
            controls: vec![],
            params: vec![],
            basis: None,
            matrix: Some(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 0.0], [0.0, 0.0]]),
        };
        assert!(step.to_operation().is_ok());

        let bad = GateStep {
            matrix: Some(vec![[1.0, 0.0]]),
            ..step.clone()
        };
        assert!(bad.to_operation().is_err());

        let wide = GateStep {
            qubits: (0..40).map(QubitRef).collect(),
            ..step
        };
        assert!(wide.to_operation().is_err());
    }

    #[test]
    fn test_unknown_gate_reports_step() {
        let script: Script = serde_yaml_ng::from_str(
            r"
steps:
  - allocate: [0]
  - gate: { name: sqrt_x, qubits: [0] }
",
        )
        .unwrap();
        let err = run(&script).unwrap_err();
        assert!(format!("{err:#}").contains("step 2"));
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"steps": [{{"allocate": [0]}}, {{"gate": {{"name": "measure", "qubits": [0]}}}}, "drain"]}}"#
        )
        .unwrap();

        let script = load_script(file.path().to_str().unwrap()).unwrap();
        let records = run(&script).unwrap();
        assert_eq!(
            records,
            vec![StepRecord {
                step: 2,
                outcomes: vec![(QubitRef(0), MeasurementValue::Zero)],
            }]
        );
    }

    #[test]
    fn test_bundled_teleport_script() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/scripts/teleport.yaml");
        let script = load_script(path).unwrap();
        let records = run(&script).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].outcomes, vec![(QubitRef(2), MeasurementValue::One)]);
        assert_eq!(
            records[1].outcomes,
            vec![
                (QubitRef(10), MeasurementValue::Zero),
                (QubitRef(11), MeasurementValue::Zero),
            ]
        );
    }

    #[test]
    fn test_missing_file() {
        assert!(load_script("/nonexistent/script.yaml").is_err());
    }
}
