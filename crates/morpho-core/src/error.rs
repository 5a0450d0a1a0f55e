//! Error types for the Morpho coupling engine.
//!
//! Organised by when they can occur: while integrating one agent's
//! ODE ([`IntegrationError`]), while wiring the coupler to an engine
//! ([`SetupError`]), and during a per-tick coupling pass
//! ([`CouplerError`]).

use std::error::Error;
use std::fmt;

use crate::geometry::GeometryField;
use crate::id::AgentId;

/// Errors from the fixed-step integrator.
#[derive(Clone, Debug, PartialEq)]
pub enum IntegrationError {
    /// The target time lies before the start time. An ODE state can
    /// never be integrated backward; this aborts the run.
    TimeRegression {
        /// Time the state was last integrated to.
        from: f64,
        /// Requested target time.
        to: f64,
    },
    /// The start or target time is not finite.
    NonFiniteTime {
        /// Start time.
        from: f64,
        /// Target time.
        to: f64,
    },
    /// The step size is zero, negative, or not finite.
    InvalidStepSize {
        /// The rejected step size.
        step_size: f64,
    },
    /// The state slice length does not match the system dimension.
    DimensionMismatch {
        /// The system's dimension.
        expected: usize,
        /// The length of the state passed in.
        found: usize,
    },
}

impl fmt::Display for IntegrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimeRegression { from, to } => {
                write!(f, "time regression: cannot integrate from {from} back to {to}")
            }
            Self::NonFiniteTime { from, to } => {
                write!(f, "integration window [{from}, {to}] is not finite")
            }
            Self::InvalidStepSize { step_size } => {
                write!(f, "step size must be finite and positive, got {step_size}")
            }
            Self::DimensionMismatch { expected, found } => {
                write!(f, "state has {found} variables, system expects {expected}")
            }
        }
    }
}

impl Error for IntegrationError {}

/// Setup-time configuration mismatches. Always fatal.
#[derive(Clone, Debug, PartialEq)]
pub enum SetupError {
    /// The mechanical engine does not expose a field the consumer needs.
    MissingField {
        /// The missing field.
        field: GeometryField,
    },
    /// The dynamical system does not have the three-variable layout the
    /// coupler expects.
    DimensionMismatch {
        /// Required dimension.
        expected: usize,
        /// Dimension of the supplied system.
        found: usize,
    },
    /// A coupler parameter is out of range.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// The engine rejected a target-area write for an agent it does not
    /// report.
    UnknownAgent {
        /// The agent the engine does not know.
        agent: AgentId,
    },
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => {
                write!(f, "mechanical engine does not expose the '{field}' field")
            }
            Self::DimensionMismatch { expected, found } => {
                write!(f, "dynamical system has {found} variables, coupler needs {expected}")
            }
            Self::InvalidParameter { name, reason } => write!(f, "invalid {name}: {reason}"),
            Self::UnknownAgent { agent } => {
                write!(f, "mechanical engine does not know agent {agent}")
            }
        }
    }
}

impl Error for SetupError {}

/// Errors from a coupling pass or a lifecycle update.
#[derive(Clone, Debug, PartialEq)]
pub enum CouplerError {
    /// Integrating one agent's state failed.
    Integration {
        /// The agent whose state could not be advanced.
        agent: AgentId,
        /// The integrator error.
        source: IntegrationError,
    },
    /// An event or lookup named an agent the coupler does not track.
    UnknownAgent {
        /// The unknown agent.
        agent: AgentId,
    },
    /// Registration of an agent that is already tracked.
    DuplicateAgent {
        /// The duplicated agent.
        agent: AgentId,
    },
    /// The engine reported no area for a tracked agent.
    AreaUnavailable {
        /// The agent without an area.
        agent: AgentId,
    },
}

impl fmt::Display for CouplerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integration { agent, source } => {
                write!(f, "integration failed for agent {agent}: {source}")
            }
            Self::UnknownAgent { agent } => write!(f, "unknown agent {agent}"),
            Self::DuplicateAgent { agent } => write!(f, "agent {agent} is already registered"),
            Self::AreaUnavailable { agent } => {
                write!(f, "mechanical engine reported no area for agent {agent}")
            }
        }
    }
}

impl Error for CouplerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Integration { source, .. } => Some(source),
            _ => None,
        }
    }
}
