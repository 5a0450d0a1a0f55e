//! The coupling protocol between per-agent ODE state and the mechanical
//! relaxation.
//!
//! Once per global tick, after the mechanical engine has relaxed, the
//! [`Coupler`] runs three phases over every tracked agent:
//!
//! 1. **Read**: the engine's current area is pinned into the agent's
//!    mirrored-area slot.
//! 2. **Integrate**: the ODE is advanced from the agent's clock to the
//!    tick time at the configured step size, with the area held
//!    constant (zero-order hold).
//! 3. **Write**: the new target-area signal is pushed back into the
//!    engine's constraint field for the next relaxation.
//!
//! Agents never read each other's state, so phase 2 may run on the
//! rayon pool. Phases 1 and 3 touch the engine and stay sequential.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod builder;
pub mod config;
pub mod coupler;
pub mod report;

pub use builder::CouplerBuilder;
pub use config::InitialActivator;
pub use coupler::Coupler;
pub use report::CouplingReport;
