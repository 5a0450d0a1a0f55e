//! Fixed-step classical fourth-order Runge-Kutta.
//!
//! [`advance`] integrates a [`DynamicalSystem`] from `from` to `to` in
//! `ceil((to - from) / step_size)` sub-steps. Every sub-step has length
//! `step_size` except the last, which is clipped so the state lands
//! exactly on `to`. No state is kept between calls.
//!
//! ```text
//! k1 = f(t,       y)
//! k2 = f(t + h/2, y + h/2 * k1)
//! k3 = f(t + h/2, y + h/2 * k2)
//! k4 = f(t + h,   y + h   * k3)
//! y' = y + h/6 * (k1 + 2*k2 + 2*k3 + k4)
//! ```

use morpho_core::IntegrationError;
use smallvec::{smallvec, SmallVec};

use crate::system::DynamicalSystem;

/// Slack subtracted from `span / step_size` before rounding up, so that a
/// span which is a whole number of steps up to rounding error (e.g.
/// `0.03 - 0.02`) is not given an extra, vanishingly short sub-step.
const STEP_COUNT_SLACK: f64 = 1e-9;

type Buf = SmallVec<[f64; 8]>;

/// Outcome of a successful [`advance`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdvanceReport {
    /// The time the state now corresponds to (always the requested `to`).
    pub time: f64,
    /// Number of RK4 sub-steps taken.
    pub substeps: u64,
}

/// Number of sub-steps [`advance`] takes to cover `span` at `step_size`.
///
/// Zero for an empty span.
pub fn substep_count(span: f64, step_size: f64) -> u64 {
    if span <= 0.0 {
        return 0;
    }
    let raw = span / step_size;
    ((raw - STEP_COUNT_SLACK).ceil() as u64).max(1)
}

/// Advance `state` from `from` to `to` with fixed step `step_size`.
///
/// # Errors
///
/// - [`IntegrationError::TimeRegression`] if `to < from`.
/// - [`IntegrationError::NonFiniteTime`] if either bound is not finite.
/// - [`IntegrationError::InvalidStepSize`] if `step_size` is not a
///   finite positive number.
/// - [`IntegrationError::DimensionMismatch`] if `state.len()` differs
///   from the system dimension.
///
/// On error, `state` is left untouched.
pub fn advance<S>(
    system: &S,
    state: &mut [f64],
    from: f64,
    to: f64,
    step_size: f64,
) -> Result<AdvanceReport, IntegrationError>
where
    S: DynamicalSystem + ?Sized,
{
    if !(step_size.is_finite() && step_size > 0.0) {
        return Err(IntegrationError::InvalidStepSize { step_size });
    }
    if !from.is_finite() || !to.is_finite() {
        return Err(IntegrationError::NonFiniteTime { from, to });
    }
    if to < from {
        return Err(IntegrationError::TimeRegression { from, to });
    }
    let n = system.dimension();
    if state.len() != n {
        return Err(IntegrationError::DimensionMismatch {
            expected: n,
            found: state.len(),
        });
    }

    let substeps = substep_count(to - from, step_size);
    let mut scratch = Scratch::new(n);
    for j in 0..substeps {
        let t = from + j as f64 * step_size;
        let h = if j + 1 == substeps { to - t } else { step_size };
        scratch.step(system, state, t, h);
    }

    Ok(AdvanceReport { time: to, substeps })
}

/// Stage buffers for one RK4 step, sized for the system dimension.
struct Scratch {
    k1: Buf,
    k2: Buf,
    k3: Buf,
    k4: Buf,
    tmp: Buf,
}

impl Scratch {
    fn new(n: usize) -> Self {
        Self {
            k1: smallvec![0.0; n],
            k2: smallvec![0.0; n],
            k3: smallvec![0.0; n],
            k4: smallvec![0.0; n],
            tmp: smallvec![0.0; n],
        }
    }

    fn step<S>(&mut self, system: &S, y: &mut [f64], t: f64, h: f64)
    where
        S: DynamicalSystem + ?Sized,
    {
        let n = y.len();
        let half = 0.5 * h;

        system.evaluate(t, y, &mut self.k1);

        for i in 0..n {
            self.tmp[i] = y[i] + half * self.k1[i];
        }
        system.evaluate(t + half, &self.tmp, &mut self.k2);

        for i in 0..n {
            self.tmp[i] = y[i] + half * self.k2[i];
        }
        system.evaluate(t + half, &self.tmp, &mut self.k3);

        for i in 0..n {
            self.tmp[i] = y[i] + h * self.k3[i];
        }
        system.evaluate(t + h, &self.tmp, &mut self.k4);

        let h6 = h / 6.0;
        for i in 0..n {
            y[i] += h6 * (self.k1[i] + 2.0 * self.k2[i] + 2.0 * self.k3[i] + self.k4[i]);
        }
    }
}

/// A fixed-step RK4 integrator with a validated step size.
///
/// # Examples
///
/// ```
/// use morpho_ode::{DynamicalSystem, Rk4};
///
/// struct Decay;
/// impl DynamicalSystem for Decay {
///     fn name(&self) -> &str { "decay" }
///     fn dimension(&self) -> usize { 1 }
///     fn initial_conditions(&self) -> Vec<f64> { vec![1.0] }
///     fn variable_names(&self) -> &[&'static str] { &["y"] }
///     fn evaluate(&self, _t: f64, y: &[f64], dy: &mut [f64]) { dy[0] = -y[0]; }
/// }
///
/// let rk4 = Rk4::new(0.01).unwrap();
/// let mut y = [1.0];
/// let report = rk4.advance(&Decay, &mut y, 0.0, 1.0).unwrap();
/// assert_eq!(report.substeps, 100);
/// assert!((y[0] - (-1.0f64).exp()).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rk4 {
    step_size: f64,
}

impl Rk4 {
    /// Create an integrator with the given sub-step size.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::InvalidStepSize`] if `step_size` is
    /// not finite and positive.
    pub fn new(step_size: f64) -> Result<Self, IntegrationError> {
        if !(step_size.is_finite() && step_size > 0.0) {
            return Err(IntegrationError::InvalidStepSize { step_size });
        }
        Ok(Self { step_size })
    }

    /// The sub-step size.
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Advance `state` from `from` to `to`. See [`advance`].
    pub fn advance<S>(
        &self,
        system: &S,
        state: &mut [f64],
        from: f64,
        to: f64,
    ) -> Result<AdvanceReport, IntegrationError>
    where
        S: DynamicalSystem + ?Sized,
    {
        advance(system, state, from, to, self.step_size)
    }
}
