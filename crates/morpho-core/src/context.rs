//! Per-tick timing context threaded through the coupler and exporter.

use crate::id::TickId;

/// Timing of one global simulation tick.
///
/// Replaces a process-wide simulation clock: every component that needs
/// the current time receives it explicitly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickContext {
    /// Number of ticks elapsed since setup.
    pub tick: TickId,
    /// Simulation time at the end of this tick.
    pub time: f64,
    /// Length of the mechanical tick.
    pub dt: f64,
}

impl TickContext {
    /// Context for tick `tick` of a run with fixed tick length `dt`
    /// starting at `start_time`.
    ///
    /// Time is computed as `start_time + tick * dt` rather than by
    /// accumulation, so it does not drift over long runs.
    pub fn at(tick: TickId, start_time: f64, dt: f64) -> Self {
        Self {
            tick,
            time: start_time + tick.0 as f64 * dt,
            dt,
        }
    }

    /// The setup context (tick 0) of a run starting at `start_time`.
    pub fn setup(start_time: f64, dt: f64) -> Self {
        Self::at(TickId(0), start_time, dt)
    }
}
