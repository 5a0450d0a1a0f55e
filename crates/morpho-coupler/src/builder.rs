//! Validating construction of a [`Coupler`].

use indexmap::{IndexMap, IndexSet};
use morpho_core::{SetupError, TickId};
use morpho_ode::gtpase::{ACTIVATOR, TARGET_AREA};
use morpho_ode::{DynamicalSystem, RhoGtpase};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::InitialActivator;
use crate::coupler::Coupler;

/// State-vector length the coupler's read/write protocol assumes:
/// activator, target-area signal, mirrored area.
pub const COUPLED_DIMENSION: usize = 3;

/// Default integrator step size.
pub const DEFAULT_STEP_SIZE: f64 = 0.01;

/// Default population size from which integration runs in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;

/// Builder for [`Coupler`].
///
/// ```
/// use morpho_coupler::{Coupler, InitialActivator};
///
/// let coupler = Coupler::builder()
///     .step_size(0.01)
///     .initial_activator(InitialActivator::Constant(0.5))
///     .build()
///     .unwrap();
/// assert!(coupler.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct CouplerBuilder<S = RhoGtpase> {
    system: S,
    step_size: f64,
    initial_activator: InitialActivator,
    seed: u64,
    parallel_threshold: usize,
}

impl Coupler<RhoGtpase> {
    /// Start building a coupler around the default [`RhoGtpase`] model.
    pub fn builder() -> CouplerBuilder<RhoGtpase> {
        CouplerBuilder::new(RhoGtpase::default())
    }
}

impl<S: DynamicalSystem> CouplerBuilder<S> {
    /// Start building a coupler around `system`.
    pub fn new(system: S) -> Self {
        Self {
            system,
            step_size: DEFAULT_STEP_SIZE,
            initial_activator: InitialActivator::default(),
            seed: 1,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Integrator step size (default 0.01). Must be finite and positive.
    pub fn step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    /// How registered agents' activators are initialised.
    pub fn initial_activator(mut self, initial_activator: InitialActivator) -> Self {
        self.initial_activator = initial_activator;
        self
    }

    /// Seed of the initial-activator stream (default 1).
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Population size from which the integrate phase runs on the rayon
    /// pool (default 256). `0` always runs in parallel, `usize::MAX`
    /// never does.
    pub fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Build the coupler.
    ///
    /// # Errors
    ///
    /// - [`SetupError::DimensionMismatch`] if the system does not have
    ///   exactly three variables, or its initial conditions have the
    ///   wrong length.
    /// - [`SetupError::InvalidParameter`] for a non-positive step size or
    ///   an unusable initial-activator setting.
    pub fn build(self) -> Result<Coupler<S>, SetupError> {
        let dimension = self.system.dimension();
        if dimension != COUPLED_DIMENSION {
            return Err(SetupError::DimensionMismatch {
                expected: COUPLED_DIMENSION,
                found: dimension,
            });
        }
        let initial = self.system.initial_conditions();
        if initial.len() != dimension {
            return Err(SetupError::DimensionMismatch {
                expected: dimension,
                found: initial.len(),
            });
        }
        if !(self.step_size > 0.0) || !self.step_size.is_finite() {
            return Err(SetupError::InvalidParameter {
                name: "step_size",
                reason: format!("must be finite and positive, got {}", self.step_size),
            });
        }
        self.initial_activator
            .validate()
            .map_err(|reason| SetupError::InvalidParameter {
                name: "initial_activator",
                reason,
            })?;

        Ok(Coupler {
            reset: [initial[ACTIVATOR], initial[TARGET_AREA]],
            system: self.system,
            step_size: self.step_size,
            initial_activator: self.initial_activator,
            seed: self.seed,
            rng: ChaCha8Rng::seed_from_u64(self.seed),
            parallel_threshold: self.parallel_threshold,
            states: IndexMap::new(),
            non_finite: IndexSet::new(),
            tick: TickId(0),
            time: 0.0,
        })
    }
}
