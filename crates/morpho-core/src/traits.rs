//! Interfaces between the coupling engine and the external mechanical engine.
//!
//! The mechanical relaxation, mesh maintenance, and population lifecycle
//! all live outside Morpho. They are reached only through these traits:
//! [`GeometrySource`] for reads, [`ConstraintSink`] for the target-area
//! write-back, and [`MechanicalEngine`] for advancing the tissue.

use crate::geometry::{AgentGeometry, GeometryFields};
use crate::id::AgentId;

/// Read-only access to per-agent geometry.
pub trait GeometrySource {
    /// Fields this engine exposes.
    ///
    /// Queried once at setup, never per tick.
    fn capabilities(&self) -> GeometryFields;

    /// Agents currently in the population, in a stable order.
    fn agent_ids(&self) -> Vec<AgentId>;

    /// Current geometric area of `agent`.
    ///
    /// Boundary and ghost agents report a sentinel
    /// (see [`is_sentinel_area`](crate::is_sentinel_area)). Returns `None`
    /// only if the agent is not part of the population.
    fn current_area(&self, agent: AgentId) -> Option<f64>;

    /// Full geometry of `agent`, or `None` if it is not in the population.
    fn geometry(&self, agent: AgentId) -> Option<AgentGeometry>;
}

/// Write access to the target-area constraint consumed by the force law.
pub trait ConstraintSink {
    /// Set the target area the force law uses for `agent` on the next
    /// relaxation.
    ///
    /// Returns `false` if the agent is not part of the population.
    fn set_target_area(&mut self, agent: AgentId, target_area: f64) -> bool;
}

/// A division: `parent` split and `child` is the newly created agent.
///
/// A division producing several children is reported as one event per
/// child.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DivisionEvent {
    /// The dividing agent.
    pub parent: AgentId,
    /// The new agent.
    pub child: AgentId,
}

/// Lifecycle changes produced by one mechanical relaxation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PopulationEvents {
    /// Divisions, in the order they occurred.
    pub divisions: Vec<DivisionEvent>,
    /// Agents removed from the population.
    pub removals: Vec<AgentId>,
}

impl PopulationEvents {
    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.divisions.is_empty() && self.removals.is_empty()
    }
}

/// An external mechanical relaxation engine.
///
/// # Contract
///
/// - `relax()` consumes the target areas written since the previous call
///   and produces updated geometry.
/// - Boundary agents with a sentinel area, or with a non-finite target
///   area, must be excluded from force computation by the engine itself.
pub trait MechanicalEngine: GeometrySource + ConstraintSink + Send {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Run one mechanical relaxation of length `dt`.
    fn relax(&mut self, dt: f64) -> PopulationEvents;
}
