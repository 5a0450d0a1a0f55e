//! Run configuration and the synchronous driver for Morpho.
//!
//! [`SimulationConfig`] collects every knob an orchestrating driver
//! sets. [`LockstepSimulation`] owns an external [`MechanicalEngine`]
//! and a [`Coupler`](morpho_coupler::Coupler) and runs them with a strict
//! barrier between phases:
//!
//! ```text
//! relax(dt) -> apply removals/divisions -> couple(tick) -> export(tick)
//! ```
//!
//! The relaxation for tick `n + 1` never starts before every agent's
//! tick-`n` target area has been written.
//!
//! [`MechanicalEngine`]: morpho_core::MechanicalEngine

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod lockstep;

pub use config::{ConfigError, SimulationConfig};
pub use lockstep::{LockstepSimulation, RunSummary, StepError, TickReport};
