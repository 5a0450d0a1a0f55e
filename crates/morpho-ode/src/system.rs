//! The [`DynamicalSystem`] trait.

/// An autonomous or time-dependent ODE system `dy/dt = f(t, y)`.
///
/// # Contract
///
/// - `evaluate()` MUST be deterministic: the same `(time, y)` always
///   produces bit-identical derivatives.
/// - `&self`: a system holds parameters only. State lives in the
///   caller's vector.
///
/// # Examples
///
/// ```
/// use morpho_ode::DynamicalSystem;
///
/// struct Decay;
///
/// impl DynamicalSystem for Decay {
///     fn name(&self) -> &str { "decay" }
///     fn dimension(&self) -> usize { 1 }
///     fn initial_conditions(&self) -> Vec<f64> { vec![1.0] }
///     fn variable_names(&self) -> &[&'static str] { &["y"] }
///     fn evaluate(&self, _time: f64, y: &[f64], dy: &mut [f64]) {
///         dy[0] = -y[0];
///     }
/// }
///
/// let mut dy = [0.0];
/// Decay.evaluate(0.0, &[2.0], &mut dy);
/// assert_eq!(dy, [-2.0]);
/// ```
pub trait DynamicalSystem {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Number of state variables.
    fn dimension(&self) -> usize;

    /// Default initial conditions, of length [`dimension`](Self::dimension).
    fn initial_conditions(&self) -> Vec<f64>;

    /// Variable names, of length [`dimension`](Self::dimension).
    fn variable_names(&self) -> &[&'static str];

    /// Variable units. Default: every variable is dimensionless.
    fn variable_units(&self) -> Vec<&'static str> {
        vec!["dimensionless"; self.dimension()]
    }

    /// Model parameters, in a fixed order. Recorded in checkpoints so a
    /// state is never restored into a differently parameterised model.
    fn parameters(&self) -> Vec<f64> {
        Vec::new()
    }

    /// Write `f(time, y)` into `dy`.
    ///
    /// Both slices have length [`dimension`](Self::dimension).
    fn evaluate(&self, time: f64, y: &[f64], dy: &mut [f64]);
}
