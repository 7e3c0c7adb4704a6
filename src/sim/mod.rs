//! Deterministic Simulation Primitives
//!
//! `TigerStyle`: Simulation-first. Every external concern of this crate -
//! the generation strategy, the evaluation strategy, and durable storage -
//! has a deterministic simulation implementation built on these primitives,
//! so behavior is reproducible from a single seed and failures can be
//! injected on purpose.
//!
//! - [`DeterministicRng`] - ChaCha20 RNG; same seed = same sequence
//! - [`FaultInjector`] / [`FaultConfig`] / [`FaultType`] - probabilistic
//!   failure injection shared across components via `Arc`

mod fault;
mod rng;

pub use fault::{FaultConfig, FaultInjector, FaultType};
pub use rng::DeterministicRng;
