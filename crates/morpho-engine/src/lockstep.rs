//! Lockstep (synchronous) simulation driver.
//!
//! [`LockstepSimulation`] runs one tick per [`step()`](LockstepSimulation::step)
//! call: the mechanical engine relaxes, lifecycle events are applied to
//! the ODE states, and the coupler integrates every agent to the new
//! tick time and writes the target areas back. Nothing runs in the
//! background.

use std::error::Error;
use std::fmt;
use std::io::{self, Write};

use log::info;
use morpho_checkpoint::{CheckpointError, CouplerCheckpoint};
use morpho_core::{CouplerError, MechanicalEngine, SetupError, TickContext, TickId};
use morpho_coupler::{Coupler, CouplingReport};
use morpho_export::{collect_snapshots, require_export_fields, SnapshotWriter};
use morpho_ode::RhoGtpase;

use crate::config::{ConfigError, SimulationConfig};

// ── StepError ──────────────────────────────────────────────────────

/// Errors from advancing a [`LockstepSimulation`].
#[derive(Debug)]
pub enum StepError {
    /// The coupling pass or a lifecycle update failed.
    Coupler(CouplerError),
    /// Writing a frame failed.
    Export(io::Error),
    /// The engine does not expose what the exporter needs.
    Setup(SetupError),
    /// Every tick of the run has already been executed.
    Finished,
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coupler(e) => write!(f, "coupler: {e}"),
            Self::Export(e) => write!(f, "export: {e}"),
            Self::Setup(e) => write!(f, "export setup: {e}"),
            Self::Finished => write!(f, "simulation has reached its end time"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Coupler(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Setup(e) => Some(e),
            Self::Finished => None,
        }
    }
}

impl From<CouplerError> for StepError {
    fn from(e: CouplerError) -> Self {
        Self::Coupler(e)
    }
}

impl From<io::Error> for StepError {
    fn from(e: io::Error) -> Self {
        Self::Export(e)
    }
}

impl From<SetupError> for StepError {
    fn from(e: SetupError) -> Self {
        Self::Setup(e)
    }
}

// ── Reports ────────────────────────────────────────────────────────

/// Result of one [`LockstepSimulation::step()`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    /// The tick just completed.
    pub tick: TickId,
    /// Simulation time at the end of it.
    pub time: f64,
    /// Divisions applied before coupling.
    pub divisions: usize,
    /// Removals applied before coupling.
    pub removals: usize,
    /// The coupling pass.
    pub coupling: CouplingReport,
    /// Whether a frame was exported for this tick.
    pub frame_written: bool,
}

/// Result of a complete [`LockstepSimulation::run()`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    /// Ticks executed by this call.
    pub ticks: u64,
    /// Frames written by this call, including the initial frame.
    pub frames: u64,
    /// Simulation time at the end of the run.
    pub final_time: f64,
    /// Agents alive at the end of the run.
    pub agents: usize,
    /// RK4 sub-steps across all agents and ticks of this call.
    pub substeps: u64,
    /// Hash of the final ODE state.
    pub state_hash: u64,
}

// ── LockstepSimulation ─────────────────────────────────────────────

/// A mechanical engine and its coupler, stepped in lockstep.
///
/// # Examples
///
/// ```
/// use morpho_coupler::InitialActivator;
/// use morpho_core::AgentId;
/// use morpho_engine::{LockstepSimulation, SimulationConfig};
/// use morpho_test_utils::StaticTissue;
///
/// let engine = StaticTissue::new().with_area(AgentId(0), 0.8);
/// let config = SimulationConfig {
///     end_time: 0.05,
///     initial_activator: InitialActivator::Constant(1.0),
///     ..Default::default()
/// };
/// let mut sim = LockstepSimulation::new(config, engine).unwrap();
/// while !sim.is_finished() {
///     sim.step().unwrap();
/// }
/// assert_eq!(sim.tick().0, 5);
/// assert_eq!(sim.engine().relax_count(), 5);
/// ```
pub struct LockstepSimulation<E: MechanicalEngine> {
    config: SimulationConfig,
    engine: E,
    coupler: Coupler<RhoGtpase>,
    tick: TickId,
    tick_count: u64,
    export_checked: bool,
}

impl<E: MechanicalEngine> LockstepSimulation<E> {
    /// Validate `config`, build the coupler, and attach it to `engine`.
    ///
    /// Every agent the engine reports is registered and has its initial
    /// target area pushed before this returns.
    ///
    /// # Errors
    ///
    /// Any invalid knob, or [`ConfigError::Setup`] if the engine does
    /// not expose the current-area and target-area fields.
    pub fn new(config: SimulationConfig, mut engine: E) -> Result<Self, ConfigError> {
        let mut coupler = config.coupler()?;
        let agents = coupler.attach(&mut engine, 0.0)?;
        let tick_count = config.tick_count();
        info!(
            "lockstep simulation on {}: {agents} agents, {tick_count} ticks of {}, beta {}",
            engine.name(),
            config.tick_length,
            config.beta
        );
        Ok(Self {
            config,
            engine,
            coupler,
            tick: TickId(0),
            tick_count,
            export_checked: false,
        })
    }

    /// Execute one tick.
    ///
    /// # Errors
    ///
    /// [`StepError::Finished`] once every tick has run, or
    /// [`StepError::Coupler`] if a lifecycle event or the coupling pass
    /// fails. After a coupler error the run should be abandoned.
    pub fn step(&mut self) -> Result<TickReport, StepError> {
        if self.is_finished() {
            return Err(StepError::Finished);
        }
        let events = self.engine.relax(self.config.tick_length);
        self.coupler.apply_events(&events)?;

        let tick = self.tick.next();
        let ctx = TickContext::at(tick, 0.0, self.config.tick_length);
        let coupling = self.coupler.couple(&mut self.engine, &ctx)?;
        self.tick = tick;

        Ok(TickReport {
            tick,
            time: ctx.time,
            divisions: events.divisions.len(),
            removals: events.removals.len(),
            coupling,
            frame_written: false,
        })
    }

    /// Execute one tick and export it if it is a sampled tick of `writer`.
    pub fn step_with_export<W: Write>(
        &mut self,
        writer: &mut SnapshotWriter<W>,
    ) -> Result<TickReport, StepError> {
        self.check_export()?;
        let mut report = self.step()?;
        if writer.is_sampled(report.tick) {
            self.write_frame(writer)?;
            report.frame_written = true;
        }
        Ok(report)
    }

    /// Run every remaining tick, exporting sampled ticks to `writer`.
    ///
    /// Writes the setup-state frame first when `write_initial_frame` is
    /// set and no tick has run yet. The writer is not finished; call
    /// [`SnapshotWriter::finish`] afterwards.
    pub fn run<W: Write>(
        &mut self,
        writer: &mut SnapshotWriter<W>,
    ) -> Result<RunSummary, StepError> {
        self.check_export()?;
        let mut frames = 0;
        if self.config.write_initial_frame && self.tick == TickId(0) {
            self.write_frame(writer)?;
            frames += 1;
        }

        let mut ticks = 0;
        let mut substeps = 0;
        while !self.is_finished() {
            let report = self.step_with_export(writer)?;
            ticks += 1;
            substeps += report.coupling.substeps;
            frames += u64::from(report.frame_written);
        }
        writer.flush()?;

        let summary = RunSummary {
            ticks,
            frames,
            final_time: self.time(),
            agents: self.coupler.len(),
            substeps,
            state_hash: self.coupler.state_hash(),
        };
        info!(
            "run finished at t={}: {} ticks, {} frames, {} agents",
            summary.final_time, summary.ticks, summary.frames, summary.agents
        );
        Ok(summary)
    }

    /// A writer on `sink` using the configured format and sampling
    /// interval. The document header is written immediately.
    pub fn open_writer<W: Write>(&self, sink: W) -> io::Result<SnapshotWriter<W>> {
        let interval = self
            .config
            .sampling()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
        let writer =
            SnapshotWriter::new(sink, self.config.record_format)?.with_sampling_interval(interval);
        Ok(if self.config.population_summary {
            writer.with_population_summary(self.config.tracked_agent)
        } else {
            writer
        })
    }

    fn check_export(&mut self) -> Result<(), SetupError> {
        if !self.export_checked {
            require_export_fields(&self.engine)?;
            self.export_checked = true;
        }
        Ok(())
    }

    fn write_frame<W: Write>(&self, writer: &mut SnapshotWriter<W>) -> io::Result<()> {
        let snapshots = collect_snapshots(&self.engine, self.coupler.states());
        writer.write_frame(self.tick, self.time(), &snapshots)
    }

    // ── Checkpointing ──────────────────────────────────────────

    /// Checkpoint the ODE state at the current tick.
    pub fn checkpoint(&self) -> CouplerCheckpoint {
        self.coupler.checkpoint()
    }

    /// Resume the ODE state from `checkpoint`.
    ///
    /// The engine must already hold the geometry of the same tick.
    pub fn restore(&mut self, checkpoint: &CouplerCheckpoint) -> Result<(), CheckpointError> {
        self.coupler.restore(checkpoint)?;
        self.tick = checkpoint.tick;
        Ok(())
    }

    // ── Accessors ──────────────────────────────────────────────

    /// Whether the end time has been reached.
    pub fn is_finished(&self) -> bool {
        self.tick.0 >= self.tick_count
    }

    /// Last completed tick.
    pub fn tick(&self) -> TickId {
        self.tick
    }

    /// Simulation time of the last completed tick.
    pub fn time(&self) -> f64 {
        TickContext::at(self.tick, 0.0, self.config.tick_length).time
    }

    /// Total ticks in the run.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The coupler.
    pub fn coupler(&self) -> &Coupler<RhoGtpase> {
        &self.coupler
    }

    /// The mechanical engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable access to the mechanical engine, for drivers that perturb
    /// geometry between ticks.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Consume the simulation and return the engine.
    pub fn into_engine(self) -> E {
        self.engine
    }
}
