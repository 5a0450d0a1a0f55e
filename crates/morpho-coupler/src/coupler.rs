//! The [`Coupler`]: per-agent ODE state and the per-tick protocol.

use indexmap::{IndexMap, IndexSet};
use log::{debug, info, trace, warn};
use morpho_checkpoint::{state_hash, CheckpointError, CouplerCheckpoint};
use morpho_core::{
    AgentDynamicState, AgentId, ConstraintSink, CouplerError, DivisionEvent, GeometryFields,
    GeometrySource, PopulationEvents, SetupError, TickContext, TickId, HEXAGONAL_PACKING_AREA,
};
use morpho_ode::gtpase::{ACTIVATOR, TARGET_AREA};
use morpho_ode::{advance, DynamicalSystem, RhoGtpase};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::config::InitialActivator;
use crate::report::CouplingReport;

/// Owns every agent's [`AgentDynamicState`] and runs the per-tick
/// read / integrate / write protocol against a mechanical engine.
///
/// Built with [`Coupler::builder`] or
/// [`CouplerBuilder::new`](crate::CouplerBuilder::new).
///
/// # Determinism
///
/// States are kept in registration order. Initial activator draws come
/// from one seeded ChaCha8 stream in that order, and the parallel and
/// sequential integrate paths produce bit-identical results.
pub struct Coupler<S = RhoGtpase> {
    pub(crate) system: S,
    pub(crate) step_size: f64,
    pub(crate) initial_activator: InitialActivator,
    pub(crate) seed: u64,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) parallel_threshold: usize,
    /// Initial conditions of the activator and target-area signal.
    pub(crate) reset: [f64; 2],
    pub(crate) states: IndexMap<AgentId, AgentDynamicState>,
    /// Agents already reported as non-finite.
    pub(crate) non_finite: IndexSet<AgentId>,
    pub(crate) tick: TickId,
    pub(crate) time: f64,
}

impl<S: DynamicalSystem + Sync> Coupler<S> {
    // ── Setup ───────────────────────────────────────────────────

    /// Wire the coupler to an engine at time `start_time`.
    ///
    /// Checks once that the engine exposes the current-area and
    /// target-area fields, registers every agent it reports that is not
    /// already tracked, and pushes each agent's initial target area so
    /// the first relaxation has a constraint to work with.
    ///
    /// Returns the number of tracked agents.
    ///
    /// # Errors
    ///
    /// [`SetupError::MissingField`] if a required field is absent,
    /// [`SetupError::InvalidParameter`] for a non-finite `start_time`, and
    /// [`SetupError::UnknownAgent`] if the engine rejects the target area
    /// of a tracked agent it does not report.
    pub fn attach<E>(&mut self, engine: &mut E, start_time: f64) -> Result<usize, SetupError>
    where
        E: GeometrySource + ConstraintSink + ?Sized,
    {
        if let Some(field) = engine
            .capabilities()
            .first_missing(&GeometryFields::coupling())
        {
            return Err(SetupError::MissingField { field });
        }
        if !start_time.is_finite() {
            return Err(SetupError::InvalidParameter {
                name: "start_time",
                reason: format!("must be finite, got {start_time}"),
            });
        }

        self.tick = TickId(0);
        self.time = start_time;
        for id in engine.agent_ids() {
            if !self.states.contains_key(&id) {
                let state = self.new_state();
                self.states.insert(id, state);
            }
        }
        for (&id, state) in &self.states {
            if !engine.set_target_area(id, state.target_area_signal) {
                return Err(SetupError::UnknownAgent { agent: id });
            }
        }

        info!(
            "coupler attached: {} agents, model {}, step size {}, start time {}",
            self.states.len(),
            self.system.name(),
            self.step_size,
            start_time
        );
        Ok(self.states.len())
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// Track a newly born agent that did not come from a division.
    ///
    /// The activator comes from the configured [`InitialActivator`], the
    /// target-area signal from the model's initial conditions, and the
    /// mirrored area is the hexagonal packing area until the next
    /// coupling pass reads the real one.
    pub fn register_agent(&mut self, id: AgentId) -> Result<AgentDynamicState, CouplerError> {
        if self.states.contains_key(&id) {
            return Err(CouplerError::DuplicateAgent { agent: id });
        }
        let state = self.new_state();
        self.states.insert(id, state);
        debug!("registered agent {id} with activator {}", state.activator);
        Ok(state)
    }

    /// Stop tracking an agent that left the population.
    pub fn remove_agent(&mut self, id: AgentId) -> Result<AgentDynamicState, CouplerError> {
        let state = self
            .states
            .shift_remove(&id)
            .ok_or(CouplerError::UnknownAgent { agent: id })?;
        self.non_finite.shift_remove(&id);
        debug!("removed agent {id}");
        Ok(state)
    }

    /// Apply a division.
    ///
    /// The parent's activator and target-area signal return to the
    /// model's initial conditions; its mirrored area and clock are left
    /// alone. The child starts as a copy of the reset parent.
    ///
    /// Returns the child's state.
    pub fn on_division(&mut self, event: DivisionEvent) -> Result<AgentDynamicState, CouplerError> {
        if self.states.contains_key(&event.child) {
            return Err(CouplerError::DuplicateAgent { agent: event.child });
        }
        let parent = self
            .states
            .get_mut(&event.parent)
            .ok_or(CouplerError::UnknownAgent {
                agent: event.parent,
            })?;
        parent.activator = self.reset[0];
        parent.target_area_signal = self.reset[1];
        let child = *parent;

        self.non_finite.shift_remove(&event.parent);
        self.states.insert(event.child, child);
        debug!(
            "division {} -> {}: reset to activator {}, target area {}",
            event.parent, event.child, child.activator, child.target_area_signal
        );
        Ok(child)
    }

    /// Apply the removals, then the divisions, reported by one relaxation.
    pub fn apply_events(&mut self, events: &PopulationEvents) -> Result<(), CouplerError> {
        for &id in &events.removals {
            self.remove_agent(id)?;
        }
        for &event in &events.divisions {
            self.on_division(event)?;
        }
        Ok(())
    }

    fn new_state(&mut self) -> AgentDynamicState {
        let activator = self.initial_activator.draw(&mut self.rng);
        AgentDynamicState::new(activator, self.reset[1], HEXAGONAL_PACKING_AREA, self.time)
    }

    // ── Per-tick protocol ───────────────────────────────────────

    /// Run one coupling pass for tick `ctx`.
    ///
    /// Must be called after the engine's relaxation for the tick and
    /// before any export of it. Every agent is advanced from its own
    /// clock to `ctx.time`.
    ///
    /// # Errors
    ///
    /// - [`CouplerError::AreaUnavailable`] if the engine has no area for
    ///   a tracked agent. Nothing is modified.
    /// - [`CouplerError::Integration`] if `ctx.time` lies before an
    ///   agent's clock. Fatal for the run.
    /// - [`CouplerError::UnknownAgent`] if the engine rejects a
    ///   target-area write.
    pub fn couple<E>(
        &mut self,
        engine: &mut E,
        ctx: &TickContext,
    ) -> Result<CouplingReport, CouplerError>
    where
        E: GeometrySource + ConstraintSink + ?Sized,
    {
        // Read
        let areas = self
            .states
            .keys()
            .map(|&id| {
                engine
                    .current_area(id)
                    .ok_or(CouplerError::AreaUnavailable { agent: id })
            })
            .collect::<Result<Vec<f64>, CouplerError>>()?;

        // Integrate
        let system = &self.system;
        let step_size = self.step_size;
        let to = ctx.time;
        let substeps: u64 = if self.states.len() >= self.parallel_threshold {
            self.states
                .par_iter_mut()
                .zip(areas.par_iter())
                .map(|((&id, state), &area)| integrate_one(system, step_size, id, state, area, to))
                .collect::<Result<Vec<u64>, CouplerError>>()?
                .into_iter()
                .sum()
        } else {
            let mut total = 0;
            for ((&id, state), &area) in self.states.iter_mut().zip(&areas) {
                total += integrate_one(system, step_size, id, state, area, to)?;
            }
            total
        };

        // Write
        let mut non_finite = 0;
        for (&id, state) in &self.states {
            if !engine.set_target_area(id, state.target_area_signal) {
                return Err(CouplerError::UnknownAgent { agent: id });
            }
            if !state.is_finite() {
                non_finite += 1;
                if self.non_finite.insert(id) {
                    warn!(
                        "agent {id} ODE state is not finite at t={to} \
                         (area {}, G {}, target area {})",
                        state.mirrored_area, state.activator, state.target_area_signal
                    );
                }
            }
        }

        self.tick = ctx.tick;
        self.time = to;
        let report = CouplingReport {
            tick: ctx.tick,
            time: to,
            agents: self.states.len(),
            substeps,
            non_finite,
        };
        trace!(
            "coupled tick {} at t={}: {} agents, {} substeps",
            report.tick,
            report.time,
            report.agents,
            report.substeps
        );
        Ok(report)
    }

    // ── Checkpointing ───────────────────────────────────────────

    /// Capture everything needed to resume from the last coupled tick.
    pub fn checkpoint(&self) -> CouplerCheckpoint {
        CouplerCheckpoint {
            tick: self.tick,
            time: self.time,
            step_size: self.step_size,
            seed: self.seed,
            rng_word_pos: self.rng.get_word_pos(),
            parameters: self.system.parameters(),
            agents: self.states.iter().map(|(&id, &s)| (id, s)).collect(),
        }
    }

    /// Replace all tracked state with `checkpoint`.
    ///
    /// The initial-activator stream resumes at the recorded position, so
    /// agents registered after a restore draw the same values as in an
    /// uninterrupted run.
    ///
    /// # Errors
    ///
    /// [`CheckpointError::Incompatible`] if the checkpoint was taken with a
    /// different step size or model parameters. Nothing is modified.
    pub fn restore(&mut self, checkpoint: &CouplerCheckpoint) -> Result<(), CheckpointError> {
        if checkpoint.step_size.to_bits() != self.step_size.to_bits() {
            return Err(CheckpointError::Incompatible {
                detail: format!(
                    "step size {} differs from coupler step size {}",
                    checkpoint.step_size, self.step_size
                ),
            });
        }
        let parameters = self.system.parameters();
        let same = parameters.len() == checkpoint.parameters.len()
            && parameters
                .iter()
                .zip(&checkpoint.parameters)
                .all(|(a, b)| a.to_bits() == b.to_bits());
        if !same {
            return Err(CheckpointError::Incompatible {
                detail: format!(
                    "model parameters {:?} differ from {} parameters {:?}",
                    checkpoint.parameters,
                    self.system.name(),
                    parameters
                ),
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(checkpoint.seed);
        rng.set_word_pos(checkpoint.rng_word_pos);
        self.rng = rng;
        self.seed = checkpoint.seed;
        self.tick = checkpoint.tick;
        self.time = checkpoint.time;
        self.states = checkpoint.agents.iter().copied().collect();
        self.non_finite = self
            .states
            .iter()
            .filter(|(_, s)| !s.is_finite())
            .map(|(&id, _)| id)
            .collect();
        debug!(
            "restored {} agents at tick {} (t={})",
            self.states.len(),
            self.tick,
            self.time
        );
        Ok(())
    }
}

impl<S> Coupler<S> {
    // ── Accessors ───────────────────────────────────────────────

    /// State of `id`, if tracked.
    pub fn state(&self, id: AgentId) -> Option<&AgentDynamicState> {
        self.states.get(&id)
    }

    /// All tracked states, in registration order.
    pub fn states(&self) -> impl Iterator<Item = (AgentId, &AgentDynamicState)> + '_ {
        self.states.iter().map(|(&id, s)| (id, s))
    }

    /// Whether `id` is tracked.
    pub fn contains(&self, id: AgentId) -> bool {
        self.states.contains_key(&id)
    }

    /// Number of tracked agents.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` if no agents are tracked.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Last coupled tick (0 after setup).
    pub fn tick(&self) -> TickId {
        self.tick
    }

    /// Time every state has been integrated to.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// The reaction model.
    pub fn system(&self) -> &S {
        &self.system
    }

    /// Integrator step size.
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Seed of the initial-activator stream.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// FNV-1a hash of all tracked state, in registration order.
    pub fn state_hash(&self) -> u64 {
        state_hash(self.states())
    }
}

/// Advance one agent with its area pinned. `state` is only modified on
/// success.
fn integrate_one<S: DynamicalSystem + ?Sized>(
    system: &S,
    step_size: f64,
    id: AgentId,
    state: &mut AgentDynamicState,
    area: f64,
    to: f64,
) -> Result<u64, CouplerError> {
    let mut y = [state.activator, state.target_area_signal, area];
    let report = advance(system, &mut y, state.internal_clock, to, step_size)
        .map_err(|source| CouplerError::Integration { agent: id, source })?;
    state.activator = y[ACTIVATOR];
    state.target_area_signal = y[TARGET_AREA];
    state.mirrored_area = area;
    state.internal_clock = report.time;
    Ok(report.substeps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use morpho_core::{GeometryField, IntegrationError, AREA_SENTINEL};
    use morpho_test_utils::StaticTissue;

    fn constant_coupler() -> Coupler {
        Coupler::builder()
            .initial_activator(InitialActivator::Constant(1.0))
            .build()
            .unwrap()
    }

    fn tissue(areas: &[f64]) -> StaticTissue {
        let mut t = StaticTissue::new();
        for (i, &a) in areas.iter().enumerate() {
            t.insert_area(AgentId(i as u32), a);
        }
        t
    }

    #[test]
    fn attach_registers_and_pushes_initial_targets() {
        let mut engine = tissue(&[0.8, 0.9]);
        let mut c = constant_coupler();
        assert_eq!(c.attach(&mut engine, 0.0).unwrap(), 2);
        for id in [AgentId(0), AgentId(1)] {
            let s = c.state(id).unwrap();
            assert_eq!(s.to_vector(), [1.0, 0.8, HEXAGONAL_PACKING_AREA]);
            assert_eq!(s.internal_clock, 0.0);
            assert_eq!(engine.target_area(id), Some(0.8));
        }
    }

    #[test]
    fn attach_requires_area_fields() {
        for field in [GeometryField::CurrentArea, GeometryField::TargetArea] {
            let mut engine = tissue(&[0.8]).without_field(field);
            let err = constant_coupler().attach(&mut engine, 0.0).unwrap_err();
            assert_eq!(err, SetupError::MissingField { field });
        }
    }

    #[test]
    fn attach_rejects_agents_the_engine_does_not_know() {
        let mut engine = tissue(&[0.8]);
        let mut c = constant_coupler();
        c.register_agent(AgentId(99)).unwrap();
        let err = c.attach(&mut engine, 0.0).unwrap_err();
        assert_eq!(err, SetupError::UnknownAgent { agent: AgentId(99) });
    }

    #[test]
    fn export_fields_are_not_required_for_coupling() {
        let mut engine = tissue(&[0.8]).with_capabilities(GeometryFields::coupling());
        assert!(constant_coupler().attach(&mut engine, 0.0).is_ok());
    }

    #[test]
    fn one_tick_matches_regression_baseline() {
        let mut engine = tissue(&[0.8]);
        let mut c = constant_coupler();
        c.attach(&mut engine, 0.0).unwrap();
        let report = c
            .couple(&mut engine, &TickContext::at(TickId(1), 0.0, 0.01))
            .unwrap();
        assert_eq!(report.substeps, 1);
        assert_eq!(report.agents, 1);
        let s = c.state(AgentId(0)).unwrap();
        assert!((s.activator - 0.9998751689689673).abs() < 1e-14);
        assert!((s.target_area_signal - 0.7998736237560746).abs() < 1e-14);
        assert_eq!(s.mirrored_area, 0.8);
        assert_eq!(s.internal_clock, 0.01);
        assert_eq!(engine.target_area(AgentId(0)), Some(s.target_area_signal));
    }

    #[test]
    fn long_tick_uses_fixed_substeps() {
        let mut engine = tissue(&[0.8]);
        let mut c = constant_coupler();
        c.attach(&mut engine, 0.0).unwrap();
        let report = c
            .couple(&mut engine, &TickContext::at(TickId(1), 0.0, 0.05))
            .unwrap();
        assert_eq!(report.substeps, 5);
    }

    #[test]
    fn mirrored_area_follows_engine() {
        let mut engine = tissue(&[0.8]);
        let mut c = constant_coupler();
        c.attach(&mut engine, 0.0).unwrap();
        for (tick, area) in [(1, 0.7), (2, 1.3), (3, 0.9)] {
            engine.set_area(AgentId(0), area);
            c.couple(&mut engine, &TickContext::at(TickId(tick), 0.0, 0.01))
                .unwrap();
            assert_eq!(c.state(AgentId(0)).unwrap().mirrored_area, area);
        }
    }

    #[test]
    fn sentinel_area_is_propagated_not_masked() {
        let mut engine = tissue(&[0.8, AREA_SENTINEL]);
        let mut c = constant_coupler();
        c.attach(&mut engine, 0.0).unwrap();
        let report = c
            .couple(&mut engine, &TickContext::at(TickId(1), 0.0, 0.01))
            .unwrap();
        assert_eq!(report.non_finite, 1);
        let ghost = c.state(AgentId(1)).unwrap();
        assert_eq!(ghost.mirrored_area, AREA_SENTINEL);
        assert!(ghost.activator.is_nan());
        assert!(engine.target_area(AgentId(1)).unwrap().is_nan());
        assert!(c.state(AgentId(0)).unwrap().is_finite());
    }

    #[test]
    fn time_regression_is_fatal() {
        let mut engine = tissue(&[0.8]);
        let mut c = constant_coupler();
        c.attach(&mut engine, 1.0).unwrap();
        let err = c
            .couple(&mut engine, &TickContext::at(TickId(1), 0.0, 0.5))
            .unwrap_err();
        assert_eq!(
            err,
            CouplerError::Integration {
                agent: AgentId(0),
                source: IntegrationError::TimeRegression { from: 1.0, to: 0.5 },
            }
        );
        assert_eq!(c.state(AgentId(0)).unwrap().internal_clock, 1.0);
    }

    #[test]
    fn missing_area_aborts_before_integration() {
        let mut engine = tissue(&[0.8]);
        let mut c = constant_coupler();
        c.attach(&mut engine, 0.0).unwrap();
        c.register_agent(AgentId(9)).unwrap();
        let before: Vec<_> = c.states().map(|(id, s)| (id, *s)).collect();
        let err = c
            .couple(&mut engine, &TickContext::at(TickId(1), 0.0, 0.01))
            .unwrap_err();
        assert_eq!(err, CouplerError::AreaUnavailable { agent: AgentId(9) });
        let after: Vec<_> = c.states().map(|(id, s)| (id, *s)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn division_resets_parent_and_copies_child() {
        let mut engine = tissue(&[1.1]);
        let mut c = constant_coupler();
        c.attach(&mut engine, 0.0).unwrap();
        for tick in 1..=50 {
            c.couple(&mut engine, &TickContext::at(TickId(tick), 0.0, 0.01))
                .unwrap();
        }
        let before = *c.state(AgentId(0)).unwrap();
        assert_ne!(before.activator, 1.0);

        let child = c
            .on_division(DivisionEvent {
                parent: AgentId(0),
                child: AgentId(1),
            })
            .unwrap();
        let parent = *c.state(AgentId(0)).unwrap();
        assert_eq!(parent.activator, 1.0);
        assert_eq!(parent.target_area_signal, 0.8);
        assert_eq!(parent.mirrored_area, before.mirrored_area);
        assert_eq!(parent.internal_clock, before.internal_clock);
        assert_eq!(child, parent);
        assert_eq!(c.state(AgentId(1)), Some(&parent));
    }

    #[test]
    fn division_errors() {
        let mut engine = tissue(&[0.8, 0.8]);
        let mut c = constant_coupler();
        c.attach(&mut engine, 0.0).unwrap();
        assert_eq!(
            c.on_division(DivisionEvent {
                parent: AgentId(5),
                child: AgentId(6)
            }),
            Err(CouplerError::UnknownAgent { agent: AgentId(5) })
        );
        assert_eq!(
            c.on_division(DivisionEvent {
                parent: AgentId(0),
                child: AgentId(1)
            }),
            Err(CouplerError::DuplicateAgent { agent: AgentId(1) })
        );
    }

    #[test]
    fn registration_and_removal() {
        let mut c = constant_coupler();
        c.register_agent(AgentId(3)).unwrap();
        assert_eq!(
            c.register_agent(AgentId(3)),
            Err(CouplerError::DuplicateAgent { agent: AgentId(3) })
        );
        assert!(c.remove_agent(AgentId(3)).is_ok());
        assert_eq!(
            c.remove_agent(AgentId(3)),
            Err(CouplerError::UnknownAgent { agent: AgentId(3) })
        );
        assert!(c.is_empty());
    }

    #[test]
    fn new_agents_start_at_coupler_time() {
        let mut engine = tissue(&[0.8]);
        let mut c = constant_coupler();
        c.attach(&mut engine, 0.0).unwrap();
        c.couple(&mut engine, &TickContext::at(TickId(3), 0.0, 0.01))
            .unwrap();
        let s = c.register_agent(AgentId(1)).unwrap();
        assert_eq!(s.internal_clock, c.time());
        assert_eq!(s.mirrored_area, HEXAGONAL_PACKING_AREA);
    }

    #[test]
    fn seeded_draws_are_reproducible() {
        let draw = |seed| {
            let mut c = Coupler::builder().seed(seed).build().unwrap();
            (0..5)
                .map(|i| c.register_agent(AgentId(i)).unwrap().activator)
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(1), draw(1));
        assert_ne!(draw(1), draw(2));
        assert!(draw(1).iter().all(|g| (0.0..1.0).contains(g)));
    }

    #[test]
    fn restore_rejects_different_model() {
        let cp = constant_coupler().checkpoint();
        let mut other = crate::CouplerBuilder::new(RhoGtpase::new(0.3))
            .build()
            .unwrap();
        assert!(matches!(
            other.restore(&cp),
            Err(CheckpointError::Incompatible { .. })
        ));
        let mut finer = Coupler::builder().step_size(0.005).build().unwrap();
        assert!(matches!(
            finer.restore(&cp),
            Err(CheckpointError::Incompatible { .. })
        ));
    }
}
