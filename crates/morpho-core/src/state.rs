//! The per-agent continuous state record.

/// ODE state owned by a single agent.
///
/// A flat record of four `f64`s so it can be checkpointed without any
/// knowledge of the reaction model.
///
/// # Invariants
///
/// - `mirrored_area` is only ever overwritten from outside (by the
///   coupler, before integration). It has zero derivative and never
///   evolves on its own.
/// - `internal_clock` never decreases.
/// - `activator` and `target_area_signal` change only through
///   integration or a division reset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentDynamicState {
    /// Activator concentration `G`.
    pub activator: f64,
    /// Continuous target-area output of the reaction network.
    pub target_area_signal: f64,
    /// The agent's geometric area, pinned for the current integration window.
    pub mirrored_area: f64,
    /// Time this state was last integrated to.
    pub internal_clock: f64,
}

impl AgentDynamicState {
    /// Construct a state from its four components.
    pub fn new(
        activator: f64,
        target_area_signal: f64,
        mirrored_area: f64,
        internal_clock: f64,
    ) -> Self {
        Self {
            activator,
            target_area_signal,
            mirrored_area,
            internal_clock,
        }
    }

    /// The ODE state vector `[activator, target_area_signal, mirrored_area]`.
    pub fn to_vector(&self) -> [f64; 3] {
        [self.activator, self.target_area_signal, self.mirrored_area]
    }

    /// Whether both evolving variables are finite.
    ///
    /// Boundary agents fed a sentinel area become non-finite; this is
    /// expected and is not treated as an error.
    pub fn is_finite(&self) -> bool {
        self.activator.is_finite() && self.target_area_signal.is_finite()
    }
}
