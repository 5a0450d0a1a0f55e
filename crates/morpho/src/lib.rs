//! Morpho: multi-scale coupling of per-cell reaction dynamics to a
//! vertex-model mechanical engine.
//!
//! This is the top-level facade crate that re-exports the public API of
//! every Morpho sub-crate.
//!
//! # Quick start
//!
//! ```rust
//! use morpho::prelude::*;
//! use morpho_test_utils::hex_patch;
//!
//! let config = SimulationConfig {
//!     end_time: 0.1,
//!     initial_activator: InitialActivator::Constant(1.0),
//!     record_format: RecordFormat::Csv,
//!     ..Default::default()
//! };
//! let mut sim = LockstepSimulation::new(config, hex_patch(3, 3)).unwrap();
//! let mut writer = sim.open_writer(Vec::new()).unwrap();
//! let summary = sim.run(&mut writer).unwrap();
//! assert_eq!(summary.ticks, 10);
//! assert_eq!(summary.frames, 10);
//! assert_eq!(summary.agents, 9);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `morpho-core` | IDs, geometry, agent state, engine traits, errors |
//! | [`ode`] | `morpho-ode` | Dynamical systems, the GTPase model, RK4 |
//! | [`coupler`] | `morpho-coupler` | The per-tick read / integrate / write protocol |
//! | [`export`] | `morpho-export` | Snapshots and XML / CSV frame output |
//! | [`checkpoint`] | `morpho-checkpoint` | Binary checkpoints and state hashing |
//! | [`engine`] | `morpho-engine` | Run configuration and the lockstep driver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`morpho-core`).
///
/// A mechanical engine plugs in by implementing
/// [`types::MechanicalEngine`].
pub use morpho_core as types;

/// Dynamical systems and the integrator (`morpho-ode`).
pub use morpho_ode as ode;

/// The coupling protocol (`morpho-coupler`).
pub use morpho_coupler as coupler;

/// Snapshot export (`morpho-export`).
///
/// Frames are written through [`export::SnapshotWriter`].
pub use morpho_export as export;

/// Checkpoints and state hashing (`morpho-checkpoint`).
pub use morpho_checkpoint as checkpoint;

/// Simulation drivers (`morpho-engine`).
pub use morpho_engine as engine;

/// Common imports for typical Morpho usage.
///
/// ```rust
/// use morpho::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use morpho_core::{
        AgentDynamicState, AgentGeometry, AgentId, ConstraintSink, GeometryField, GeometryFields,
        GeometrySource, MechanicalEngine, PopulationEvents, TickContext, TickId,
    };

    // Errors
    pub use morpho_core::{CouplerError, IntegrationError, SetupError};

    // ODE
    pub use morpho_ode::{advance, DynamicalSystem, RhoGtpase};

    // Coupler
    pub use morpho_coupler::{Coupler, CouplerBuilder, CouplingReport, InitialActivator};

    // Export
    pub use morpho_export::{PopulationSummary, RecordFormat, Snapshot, SnapshotWriter};

    // Checkpoint
    pub use morpho_checkpoint::{CheckpointError, CouplerCheckpoint};

    // Engine
    pub use morpho_engine::{
        ConfigError, LockstepSimulation, RunSummary, SimulationConfig, StepError, TickReport,
    };
}
