//! Backend configuration.

use serde::{Deserialize, Serialize};
use tracing::debug;

use qxbridge_ir::ArbCmd;

use crate::error::{BackendError, BackendResult};

/// Interface name under which configuration commands are accepted.
pub const QX_INTERFACE: &str = "qx";

/// Default tolerance for matrix matching.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Options chosen at initialization time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Absolute per-element tolerance when matching gate matrices.
    pub epsilon: f64,
    /// Accept uncontrolled gates that differ from the catalog only by a
    /// global phase.
    pub ignore_global_phase: bool,
    /// Route every executed circuit through the noise injector.
    pub depolarizing_channel: bool,
    /// Error probability handed to the noise injector.
    pub error_probability: f64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            ignore_global_phase: true,
            depolarizing_channel: false,
            error_probability: 0.0,
        }
    }
}

impl BackendConfig {
    /// Build a configuration from initialization commands.
    ///
    /// Commands for interfaces other than [`QX_INTERFACE`] are skipped.
    /// Unknown `qx` operations and ill-typed values are rejected.
    pub fn from_arb_cmds<'a>(cmds: impl IntoIterator<Item = &'a ArbCmd>) -> BackendResult<Self> {
        let mut config = Self::default();
        for cmd in cmds {
            if cmd.interface != QX_INTERFACE {
                debug!("Ignoring command for interface '{}'", cmd.interface);
                continue;
            }
            match cmd.operation.as_str() {
                "epsilon" => config.epsilon = number(cmd)?,
                "ignore_global_phase" => config.ignore_global_phase = flag(cmd)?,
                "depolarizing_channel" => config.depolarizing_channel = flag(cmd)?,
                "error_probability" => config.error_probability = number(cmd)?,
                other => {
                    return Err(BackendError::Configuration(format!(
                        "unknown option '{QX_INTERFACE}.{other}'"
                    )));
                }
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> BackendResult<()> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(BackendError::Configuration(format!(
                "epsilon must be a positive number, got {}",
                self.epsilon
            )));
        }
        if !(0.0..=1.0).contains(&self.error_probability) {
            return Err(BackendError::Configuration(format!(
                "error_probability must be within [0, 1], got {}",
                self.error_probability
            )));
        }
        Ok(())
    }
}

fn number(cmd: &ArbCmd) -> BackendResult<f64> {
    cmd.value.as_f64().ok_or_else(|| {
        BackendError::Configuration(format!(
            "'{}.{}' expects a number, got {}",
            cmd.interface, cmd.operation, cmd.value
        ))
    })
}

fn flag(cmd: &ArbCmd) -> BackendResult<bool> {
    cmd.value.as_bool().ok_or_else(|| {
        BackendError::Configuration(format!(
            "'{}.{}' expects a boolean, got {}",
            cmd.interface, cmd.operation, cmd.value
        ))
    })
}
