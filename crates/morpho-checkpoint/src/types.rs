//! The checkpoint record.

use morpho_core::{AgentDynamicState, AgentId, TickId};

/// Everything needed to resume a coupler exactly where it stopped.
#[derive(Clone, Debug, PartialEq)]
pub struct CouplerCheckpoint {
    /// Last tick the coupler completed.
    pub tick: TickId,
    /// Simulation time of that tick.
    pub time: f64,
    /// Integrator step size.
    pub step_size: f64,
    /// Seed of the initial-activator stream.
    pub seed: u64,
    /// Position in the initial-activator stream, in 32-bit words.
    pub rng_word_pos: u128,
    /// Reaction model parameters, in the model's own order.
    pub parameters: Vec<f64>,
    /// Per-agent state, in registration order.
    pub agents: Vec<(AgentId, AgentDynamicState)>,
}
