//! Simulation configuration, validation, and error types.
//!
//! [`SimulationConfig`] is the input to
//! [`LockstepSimulation::new`](crate::LockstepSimulation::new).
//! [`validate()`](SimulationConfig::validate) checks every knob once, at
//! construction; nothing is re-checked per tick.

use std::error::Error;
use std::fmt;
use std::num::NonZeroU64;

use morpho_core::{AgentId, SetupError};
use morpho_coupler::{Coupler, InitialActivator};
use morpho_export::RecordFormat;
use morpho_ode::RhoGtpase;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating a [`SimulationConfig`] or wiring it
/// to an engine.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `beta` is NaN or infinite.
    InvalidBeta {
        /// The invalid value.
        value: f64,
    },
    /// `step_size` is NaN, infinite, zero, or negative.
    InvalidStepSize {
        /// The invalid value.
        value: f64,
    },
    /// `tick_length` is NaN, infinite, zero, or negative.
    InvalidTickLength {
        /// The invalid value.
        value: f64,
    },
    /// `end_time` is NaN, infinite, or negative.
    InvalidEndTime {
        /// The invalid value.
        value: f64,
    },
    /// `initial_activator` cannot be sampled.
    InvalidInitialActivator {
        /// What is wrong with it.
        reason: String,
    },
    /// `sampling_interval` is zero.
    SamplingIntervalZero,
    /// The coupler could not be set up against the engine.
    Setup(SetupError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBeta { value } => write!(f, "beta must be finite, got {value}"),
            Self::InvalidStepSize { value } => {
                write!(f, "step_size must be finite and positive, got {value}")
            }
            Self::InvalidTickLength { value } => {
                write!(f, "tick_length must be finite and positive, got {value}")
            }
            Self::InvalidEndTime { value } => {
                write!(f, "end_time must be finite and >= 0, got {value}")
            }
            Self::InvalidInitialActivator { reason } => {
                write!(f, "invalid initial_activator: {reason}")
            }
            Self::SamplingIntervalZero => write!(f, "sampling_interval must be at least 1"),
            Self::Setup(e) => write!(f, "setup: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Setup(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SetupError> for ConfigError {
    fn from(e: SetupError) -> Self {
        Self::Setup(e)
    }
}

// ── SimulationConfig ───────────────────────────────────────────────

/// Complete configuration of one run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Bifurcation parameter of the reaction model. Default: 0.2.
    pub beta: f64,
    /// Integrator step size. Default: 0.01.
    pub step_size: f64,
    /// Length of one mechanical tick. Default: 0.01.
    pub tick_length: f64,
    /// Total simulated time. Default: 1.0.
    pub end_time: f64,
    /// Seed of the initial-activator stream. Default: 1.
    pub seed: u64,
    /// Initial activator of each agent. Default: uniform on `[0, 1)`.
    pub initial_activator: InitialActivator,
    /// Write a frame every this many ticks. Default: 1.
    pub sampling_interval: u64,
    /// Output format. Default: XML.
    pub record_format: RecordFormat,
    /// Also write a frame for the setup state (tick 0). Default: false.
    pub write_initial_frame: bool,
    /// Population size from which integration runs in parallel.
    /// Default: 256.
    pub parallel_threshold: usize,
    /// Close each frame with a population summary record. Default: false.
    pub population_summary: bool,
    /// Agent whose activator the population summary follows.
    /// Default: none.
    pub tracked_agent: Option<AgentId>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            beta: RhoGtpase::DEFAULT_BETA,
            step_size: 0.01,
            tick_length: 0.01,
            end_time: 1.0,
            seed: 1,
            initial_activator: InitialActivator::default(),
            sampling_interval: 1,
            record_format: RecordFormat::Xml,
            write_initial_frame: false,
            parallel_threshold: 256,
            population_summary: false,
            tracked_agent: None,
        }
    }
}

impl SimulationConfig {
    /// Check every knob.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.beta.is_finite() {
            return Err(ConfigError::InvalidBeta { value: self.beta });
        }
        if !(self.step_size > 0.0) || !self.step_size.is_finite() {
            return Err(ConfigError::InvalidStepSize {
                value: self.step_size,
            });
        }
        if !(self.tick_length > 0.0) || !self.tick_length.is_finite() {
            return Err(ConfigError::InvalidTickLength {
                value: self.tick_length,
            });
        }
        if !(self.end_time >= 0.0) || !self.end_time.is_finite() {
            return Err(ConfigError::InvalidEndTime {
                value: self.end_time,
            });
        }
        self.initial_activator
            .validate()
            .map_err(|reason| ConfigError::InvalidInitialActivator { reason })?;
        if self.sampling_interval == 0 {
            return Err(ConfigError::SamplingIntervalZero);
        }
        Ok(())
    }

    /// Number of ticks in the run: `round(end_time / tick_length)`.
    pub fn tick_count(&self) -> u64 {
        (self.end_time / self.tick_length).round() as u64
    }

    /// The sampling interval as a non-zero count.
    pub fn sampling(&self) -> Result<NonZeroU64, ConfigError> {
        NonZeroU64::new(self.sampling_interval).ok_or(ConfigError::SamplingIntervalZero)
    }

    /// Build the coupler this configuration describes.
    pub fn coupler(&self) -> Result<Coupler<RhoGtpase>, ConfigError> {
        self.validate()?;
        let coupler = morpho_coupler::CouplerBuilder::new(RhoGtpase::new(self.beta))
            .step_size(self.step_size)
            .initial_activator(self.initial_activator)
            .seed(self.seed)
            .parallel_threshold(self.parallel_threshold)
            .build()?;
        Ok(coupler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = SimulationConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.tick_count(), 100);
        assert_eq!(cfg.beta, 0.2);
        assert_eq!(cfg.seed, 1);
    }

    #[test]
    fn rejects_bad_knobs() {
        let bad = |f: fn(&mut SimulationConfig)| {
            let mut cfg = SimulationConfig::default();
            f(&mut cfg);
            cfg.validate().unwrap_err()
        };
        assert_eq!(
            bad(|c| c.beta = f64::NAN).to_string(),
            "beta must be finite, got NaN"
        );
        assert_eq!(
            bad(|c| c.step_size = 0.0),
            ConfigError::InvalidStepSize { value: 0.0 }
        );
        assert_eq!(
            bad(|c| c.tick_length = -1.0),
            ConfigError::InvalidTickLength { value: -1.0 }
        );
        assert!(matches!(
            bad(|c| c.end_time = f64::INFINITY),
            ConfigError::InvalidEndTime { .. }
        ));
        assert_eq!(
            bad(|c| c.sampling_interval = 0),
            ConfigError::SamplingIntervalZero
        );
        assert!(matches!(
            bad(|c| c.initial_activator = InitialActivator::Constant(f64::NAN)),
            ConfigError::InvalidInitialActivator { .. }
        ));
    }

    #[test]
    fn tick_count_rounds() {
        let cfg = SimulationConfig {
            end_time: 0.3,
            tick_length: 0.1,
            ..Default::default()
        };
        // 0.3 / 0.1 is 2.9999999999999996
        assert_eq!(cfg.tick_count(), 3);
    }

    #[test]
    fn coupler_carries_beta_and_step() {
        let cfg = SimulationConfig {
            beta: 0.35,
            step_size: 0.005,
            ..Default::default()
        };
        let c = cfg.coupler().unwrap();
        assert_eq!(c.system().beta(), 0.35);
        assert_eq!(c.step_size(), 0.005);
    }
}
