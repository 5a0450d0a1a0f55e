//! Test utilities and mock mechanical engines for Morpho development.
//!
//! [`StaticTissue`] implements [`MechanicalEngine`] without any
//! mechanics: areas stay where the test puts them, target-area writes
//! are recorded, and lifecycle events fire on a schedule.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::BTreeMap;

use indexmap::IndexMap;
use morpho_core::{
    AgentGeometry, AgentId, ConstraintSink, DivisionEvent, GeometryField, GeometryFields,
    GeometrySource, MechanicalEngine, NeighbourList, PopulationEvents,
};

pub use fixtures::{cell_geometry, hex_patch, hexagon_perimeter};

#[derive(Clone, Debug)]
struct TissueCell {
    geometry: AgentGeometry,
    target_area: Option<f64>,
}

/// A mechanical engine whose geometry only changes when the test says so.
///
/// Every `relax()` call is numbered from 1. Events scheduled for call
/// `n` are applied to the tissue and returned by that call: removed
/// cells disappear, and each division child starts with a copy of its
/// parent's geometry.
#[derive(Clone, Debug)]
pub struct StaticTissue {
    capabilities: GeometryFields,
    cells: IndexMap<AgentId, TissueCell>,
    schedule: BTreeMap<u64, PopulationEvents>,
    relax_count: u64,
    relaxed_dts: Vec<f64>,
    target_writes: u64,
}

impl StaticTissue {
    /// An empty tissue exposing every geometry field.
    pub fn new() -> Self {
        Self {
            capabilities: GeometryFields::all(),
            cells: IndexMap::new(),
            schedule: BTreeMap::new(),
            relax_count: 0,
            relaxed_dts: Vec::new(),
            target_writes: 0,
        }
    }

    /// Replace the advertised capability set.
    pub fn with_capabilities(mut self, capabilities: GeometryFields) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Stop advertising `field`.
    pub fn without_field(mut self, field: GeometryField) -> Self {
        self.capabilities.remove(field);
        self
    }

    /// Add (or replace) a cell.
    pub fn insert(&mut self, id: AgentId, geometry: AgentGeometry) {
        self.cells.insert(
            id,
            TissueCell {
                geometry,
                target_area: None,
            },
        );
    }

    /// Add a cell with area `area` and default geometry otherwise.
    pub fn insert_area(&mut self, id: AgentId, area: f64) {
        self.insert(id, cell_geometry(id, area));
    }

    /// Builder-style [`insert_area`](Self::insert_area).
    pub fn with_area(mut self, id: AgentId, area: f64) -> Self {
        self.insert_area(id, area);
        self
    }

    /// Change a cell's current area. Returns `false` if it does not exist.
    pub fn set_area(&mut self, id: AgentId, area: f64) -> bool {
        match self.cells.get_mut(&id) {
            Some(cell) => {
                cell.geometry.area = area;
                true
            }
            None => false,
        }
    }

    /// Schedule `parent` to divide into `child` on relax call `call`.
    pub fn schedule_division(&mut self, call: u64, parent: AgentId, child: AgentId) {
        self.schedule
            .entry(call)
            .or_default()
            .divisions
            .push(DivisionEvent { parent, child });
    }

    /// Schedule `id` to be removed on relax call `call`.
    pub fn schedule_removal(&mut self, call: u64, id: AgentId) {
        self.schedule.entry(call).or_default().removals.push(id);
    }

    /// The last target area written for `id`.
    pub fn target_area(&self, id: AgentId) -> Option<f64> {
        self.cells.get(&id).and_then(|c| c.target_area)
    }

    /// Number of `relax()` calls so far.
    pub fn relax_count(&self) -> u64 {
        self.relax_count
    }

    /// `dt` passed to each `relax()` call, in order.
    pub fn relaxed_dts(&self) -> &[f64] {
        &self.relaxed_dts
    }

    /// Total number of accepted target-area writes.
    pub fn target_writes(&self) -> u64 {
        self.target_writes
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Default for StaticTissue {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometrySource for StaticTissue {
    fn capabilities(&self) -> GeometryFields {
        self.capabilities
    }

    fn agent_ids(&self) -> Vec<AgentId> {
        self.cells.keys().copied().collect()
    }

    fn current_area(&self, agent: AgentId) -> Option<f64> {
        self.cells.get(&agent).map(|c| c.geometry.area)
    }

    fn geometry(&self, agent: AgentId) -> Option<AgentGeometry> {
        self.cells.get(&agent).map(|c| c.geometry.clone())
    }
}

impl ConstraintSink for StaticTissue {
    fn set_target_area(&mut self, agent: AgentId, target_area: f64) -> bool {
        match self.cells.get_mut(&agent) {
            Some(cell) => {
                cell.target_area = Some(target_area);
                self.target_writes += 1;
                true
            }
            None => false,
        }
    }
}

impl MechanicalEngine for StaticTissue {
    fn name(&self) -> &str {
        "static_tissue"
    }

    fn relax(&mut self, dt: f64) -> PopulationEvents {
        self.relax_count += 1;
        self.relaxed_dts.push(dt);
        let events = self.schedule.remove(&self.relax_count).unwrap_or_default();

        for id in &events.removals {
            self.cells.shift_remove(id);
        }
        for event in &events.divisions {
            if let Some(parent) = self.cells.get(&event.parent) {
                let mut geometry = parent.geometry.clone();
                geometry.neighbours = NeighbourList::from_slice(&[event.parent]);
                let child = TissueCell {
                    geometry,
                    target_area: parent.target_area,
                };
                self.cells.insert(event.child, child);
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduled_events_fire_once() {
        let mut tissue = StaticTissue::new()
            .with_area(AgentId(0), 0.9)
            .with_area(AgentId(1), 0.8);
        tissue.schedule_division(2, AgentId(0), AgentId(5));
        tissue.schedule_removal(2, AgentId(1));

        assert!(tissue.relax(0.01).is_empty());
        let events = tissue.relax(0.01);
        assert_eq!(
            events.divisions,
            vec![DivisionEvent {
                parent: AgentId(0),
                child: AgentId(5)
            }]
        );
        assert_eq!(events.removals, vec![AgentId(1)]);
        assert_eq!(tissue.agent_ids(), vec![AgentId(0), AgentId(5)]);
        assert_eq!(tissue.current_area(AgentId(5)), Some(0.9));
        assert!(tissue.relax(0.01).is_empty());
        assert_eq!(tissue.relaxed_dts(), &[0.01, 0.01, 0.01]);
    }

    #[test]
    fn target_writes_are_recorded() {
        let mut tissue = StaticTissue::new().with_area(AgentId(3), 0.9);
        assert!(tissue.set_target_area(AgentId(3), 0.75));
        assert!(!tissue.set_target_area(AgentId(4), 0.75));
        assert_eq!(tissue.target_area(AgentId(3)), Some(0.75));
        assert_eq!(tissue.target_writes(), 1);
    }

    #[test]
    fn capabilities_can_be_withheld() {
        let tissue = StaticTissue::new().without_field(GeometryField::CurrentArea);
        assert_eq!(
            tissue
                .capabilities()
                .first_missing(&GeometryFields::coupling()),
            Some(GeometryField::CurrentArea)
        );
    }
}
