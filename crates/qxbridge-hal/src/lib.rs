//! Qxbridge Hardware Abstraction Layer
//!
//! The two downstream collaborators of the virtualization layer:
//!
//! - [`QuantumEngine`] / [`EngineFactory`]: holds quantum state for a
//!   fixed number of slots, executes assembled circuits, reports
//!   measurement outcomes per slot
//! - [`NoiseInjector`]: optionally rewrites an assembled circuit before
//!   execution and reports how many errors it inserted
//!
//! The reference implementations live in `qxbridge-adapter-sim`.

pub mod engine;
pub mod error;
pub mod noise;

pub use engine::{EngineFactory, QuantumEngine};
pub use error::{EngineError, EngineResult};
pub use noise::{NoiseInjector, NoisyCircuit};
