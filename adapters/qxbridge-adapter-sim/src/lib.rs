//! Qxbridge Local Statevector Engine
//!
//! Reference implementations of the downstream collaborators defined in
//! `qxbridge-hal`: an exact statevector [`StatevectorEngine`] and a
//! [`DepolarizingChannel`] noise model.
//!
//! # Performance
//!
//! | Slots | Memory |
//! |-------|--------|
//! | 10 | ~16 KB |
//! | 20 | ~16 MB |
//! | 24 | ~256 MB |
//! | 30+ | ~16 GB+, refused by default |
//!
//! # Example
//!
//! ```rust
//! use qxbridge_adapter_sim::{SimulatorConfig, StatevectorFactory};
//! use qxbridge_hal::{EngineFactory, QuantumEngine};
//! use qxbridge_ir::{Circuit, NativeOp, PauliBasis, SlotId};
//!
//! let factory = StatevectorFactory::with_config(SimulatorConfig {
//!     seed: Some(42),
//!     ..SimulatorConfig::default()
//! });
//! let mut engine = factory.construct(1).unwrap();
//!
//! let mut circuit = Circuit::new("circuit_0", 1);
//! circuit.push(NativeOp::PauliX(SlotId(0)));
//! circuit.push(NativeOp::Measure { slot: SlotId(0), basis: PauliBasis::Z });
//! engine.execute(&circuit).unwrap();
//!
//! assert_eq!(engine.measurement(SlotId(0)), Some(true));
//! ```

mod depolarizing;
mod statevector;

pub use depolarizing::DepolarizingChannel;
pub use statevector::{DEFAULT_MAX_SLOTS, SimulatorConfig, StatevectorEngine, StatevectorFactory};
