//! Rho GTPase activator / target-area reaction model coupled to cell area.
//!
//! State vector `y = [G, T, A]`:
//!
//! ```text
//! dG/dt = 0.25 * [ (0.1 + beta * A^10/(T^10 + A^10) + 1.5 * G^4/(1 + G^4)) * (2 - G) - G ]
//! dT/dt = 0.25 * [ -0.1 * (T - 1.15 * (1 - 0.75 * G^4/(0.3^4 + G^4))) ]
//! dA/dt = 0
//! ```
//!
//! `A` is the cell's geometric area, mirrored into the state vector so
//! the right-hand side can read it. It is a forcing input held constant
//! over each integration window, never a simulated quantity.

use crate::system::DynamicalSystem;

/// Index of the activator `G`.
pub const ACTIVATOR: usize = 0;
/// Index of the target-area signal `T`.
pub const TARGET_AREA: usize = 1;
/// Index of the mirrored geometric area `A`.
pub const MIRRORED_AREA: usize = 2;

/// Initial activator concentration.
pub const INITIAL_ACTIVATOR: f64 = 1.0;
/// Initial target-area signal.
pub const INITIAL_TARGET_AREA: f64 = 0.8;
/// Initial mirrored area of the bare ODE system.
pub const INITIAL_MIRRORED_AREA: f64 = 0.8;

/// Time-scale multiplier applied to both evolving equations.
const TIME_SCALE: f64 = 0.25;
/// Basal activation rate.
const BASAL_ACTIVATION: f64 = 0.1;
/// Strength of activator self-activation.
const SELF_ACTIVATION: f64 = 1.5;
/// Total GTPase (active + inactive).
const TOTAL_GTPASE: f64 = 2.0;
/// Relaxation rate of the target-area signal.
const TARGET_RELAXATION: f64 = 0.1;
/// Target area at zero activator.
const TARGET_AREA_SCALE: f64 = 1.15;
/// Maximal fractional depression of the target area by the activator.
const TARGET_DEPRESSION: f64 = 0.75;
/// Activator level of half-maximal target depression.
const DEPRESSION_HALF_SATURATION: f64 = 0.3;

fn pow4(x: f64) -> f64 {
    let x2 = x * x;
    x2 * x2
}

fn pow10(x: f64) -> f64 {
    let x2 = x * x;
    let x4 = x2 * x2;
    let x8 = x4 * x4;
    x8 * x2
}

/// The reaction model, parameterised by the bifurcation parameter `beta`.
///
/// # Examples
///
/// ```
/// use morpho_ode::{advance, DynamicalSystem, RhoGtpase};
///
/// let model = RhoGtpase::default();
/// let mut y = model.initial_conditions();
/// advance(&model, &mut y, 0.0, 0.01, 0.01).unwrap();
/// assert!((y[0] - 0.9998751689689673).abs() < 1e-12);
/// assert_eq!(y[2], 0.8);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RhoGtpase {
    beta: f64,
}

impl RhoGtpase {
    /// Default bifurcation parameter.
    pub const DEFAULT_BETA: f64 = 0.2;

    /// Create the model with bifurcation parameter `beta`.
    pub fn new(beta: f64) -> Self {
        Self { beta }
    }

    /// The bifurcation parameter.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Area-ratio feedback `A^10 / (T^10 + A^10)`.
    ///
    /// Defined as 0 for `T = A = 0`, instead of the indeterminate `0/0`.
    /// For a finite non-zero area it is evaluated as `1 / (1 + (T/A)^10)`,
    /// which stays exact when both tenth powers underflow. A sentinel
    /// (infinite) area yields NaN, which is propagated.
    pub fn area_feedback(target_area: f64, area: f64) -> f64 {
        if area == 0.0 {
            return if target_area.is_nan() { f64::NAN } else { 0.0 };
        }
        if area.is_finite() {
            1.0 / (1.0 + pow10(target_area / area))
        } else {
            let a10 = pow10(area);
            a10 / (pow10(target_area) + a10)
        }
    }

    /// Value of `T` at which `dT/dt = 0` for activator level `activator`.
    pub fn target_area_fixed_point(activator: f64) -> f64 {
        let g4 = pow4(activator);
        TARGET_AREA_SCALE
            * (1.0 - TARGET_DEPRESSION * (g4 / (pow4(DEPRESSION_HALF_SATURATION) + g4)))
    }
}

impl Default for RhoGtpase {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BETA)
    }
}

impl DynamicalSystem for RhoGtpase {
    fn name(&self) -> &str {
        "rho_gtpase"
    }

    fn dimension(&self) -> usize {
        3
    }

    fn initial_conditions(&self) -> Vec<f64> {
        vec![INITIAL_ACTIVATOR, INITIAL_TARGET_AREA, INITIAL_MIRRORED_AREA]
    }

    fn variable_names(&self) -> &[&'static str] {
        &["G", "TARGET AREA", "AREA"]
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.beta]
    }

    fn evaluate(&self, _time: f64, y: &[f64], dy: &mut [f64]) {
        let g = y[ACTIVATOR];
        let t = y[TARGET_AREA];
        let a = y[MIRRORED_AREA];

        let g4 = pow4(g);
        let activation = BASAL_ACTIVATION
            + self.beta * Self::area_feedback(t, a)
            + SELF_ACTIVATION * (g4 / (1.0 + g4));
        dy[ACTIVATOR] = TIME_SCALE * (activation * (TOTAL_GTPASE - g) - g);

        dy[TARGET_AREA] =
            TIME_SCALE * (-TARGET_RELAXATION * (t - Self::target_area_fixed_point(g)));

        dy[MIRRORED_AREA] = 0.0;
    }
}
