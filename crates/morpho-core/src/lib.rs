//! Core types and traits for the Morpho coupling engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other Morpho crate: agent and tick
//! identifiers, the per-agent ODE state record, geometry capabilities,
//! error types, and the traits through which an external mechanical
//! engine exposes geometry and consumes target-area constraints.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod error;
pub mod geometry;
pub mod id;
pub mod state;
pub mod traits;

pub use context::TickContext;
pub use error::{CouplerError, IntegrationError, SetupError};
pub use geometry::{
    is_sentinel_area, AgentGeometry, GeometryField, GeometryFields, NeighbourList,
    AREA_SENTINEL, HEXAGONAL_PACKING_AREA,
};
pub use id::{AgentId, TickId};
pub use state::AgentDynamicState;
pub use traits::{
    ConstraintSink, DivisionEvent, GeometrySource, MechanicalEngine, PopulationEvents,
};
