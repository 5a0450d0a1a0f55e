//! Per-tick coupling summary.

use morpho_core::TickId;

/// What one [`couple`](crate::Coupler::couple) pass did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CouplingReport {
    /// Tick that was coupled.
    pub tick: TickId,
    /// Time every agent's state now corresponds to.
    pub time: f64,
    /// Number of agents integrated.
    pub agents: usize,
    /// Total RK4 sub-steps across all agents.
    pub substeps: u64,
    /// Agents whose activator or target-area signal is not finite.
    pub non_finite: usize,
}
