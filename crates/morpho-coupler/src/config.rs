//! Initial activator configuration.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// How a newly registered agent's activator is chosen.
///
/// Agents created by division never use this: they inherit the
/// dividing agent's post-reset state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InitialActivator {
    /// Every agent starts at the same value. Draws nothing from the
    /// random stream.
    Constant(f64),
    /// One draw per agent from `[low, high)`, in registration order.
    Uniform {
        /// Inclusive lower bound.
        low: f64,
        /// Exclusive upper bound.
        high: f64,
    },
}

impl Default for InitialActivator {
    fn default() -> Self {
        Self::Uniform {
            low: 0.0,
            high: 1.0,
        }
    }
}

impl InitialActivator {
    /// Check the values are usable.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Self::Constant(v) if !v.is_finite() => {
                Err(format!("constant must be finite, got {v}"))
            }
            Self::Uniform { low, high } if !(low.is_finite() && high.is_finite()) => {
                Err(format!("bounds must be finite, got [{low}, {high})"))
            }
            Self::Uniform { low, high } if !(low < high) => {
                Err(format!("low ({low}) must be below high ({high})"))
            }
            Self::Uniform { low, high } if !(high - low).is_finite() => {
                Err(format!("width of [{low}, {high}) overflows"))
            }
            _ => Ok(()),
        }
    }

    /// Produce one initial value, drawing from `rng` if needed.
    ///
    /// Callers validate first; an empty range would panic in the sampler.
    pub(crate) fn draw(&self, rng: &mut ChaCha8Rng) -> f64 {
        match *self {
            Self::Constant(v) => v,
            Self::Uniform { low, high } => rng.random_range(low..high),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn default_is_unit_interval() {
        assert_eq!(
            InitialActivator::default(),
            InitialActivator::Uniform {
                low: 0.0,
                high: 1.0
            }
        );
    }

    #[test]
    fn validation() {
        assert!(InitialActivator::Constant(0.5).validate().is_ok());
        assert!(InitialActivator::Constant(f64::NAN).validate().is_err());
        assert!(InitialActivator::Uniform { low: 1.0, high: 1.0 }
            .validate()
            .is_err());
        assert!(InitialActivator::Uniform {
            low: 0.0,
            high: f64::INFINITY
        }
        .validate()
        .is_err());
    }

    #[test]
    fn overflowing_width_is_rejected() {
        let wide = InitialActivator::Uniform {
            low: -f64::MAX,
            high: f64::MAX,
        };
        let err = wide.validate().unwrap_err();
        assert!(err.contains("overflows"), "{err}");

        let half = InitialActivator::Uniform {
            low: 0.0,
            high: f64::MAX,
        };
        assert!(half.validate().is_ok());
    }

    #[test]
    fn constant_does_not_advance_stream() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let before = rng.get_word_pos();
        assert_eq!(InitialActivator::Constant(0.3).draw(&mut rng), 0.3);
        assert_eq!(rng.get_word_pos(), before);
    }

    #[test]
    fn uniform_draws_stay_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let dist = InitialActivator::Uniform {
            low: 0.25,
            high: 0.5,
        };
        for _ in 0..1000 {
            let v = dist.draw(&mut rng);
            assert!((0.25..0.5).contains(&v));
        }
    }
}
