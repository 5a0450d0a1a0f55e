//! Dynamical systems and fixed-step integration for Morpho.
//!
//! - [`DynamicalSystem`] is the capability an ODE model provides:
//!   dimension, initial conditions, variable metadata and right-hand side.
//! - [`advance`] / [`Rk4`] integrate any such system with classical
//!   fourth-order Runge-Kutta at a fixed step size.
//! - [`RhoGtpase`] is the three-variable activator / target-area model
//!   coupled to cell area.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod gtpase;
pub mod rk4;
pub mod system;

pub use gtpase::RhoGtpase;
pub use rk4::{advance, AdvanceReport, Rk4};
pub use system::DynamicalSystem;
