//! The combined geometry + ODE record written for each agent.

use morpho_core::{
    AgentDynamicState, AgentGeometry, AgentId, GeometryFields, GeometrySource, NeighbourList,
    SetupError,
};

/// Read-only view of one agent at one sampled tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// The agent.
    pub agent: AgentId,
    /// Centroid `(x, y)`.
    pub centroid: [f64; 2],
    /// Geometric area; `None` when the engine reports a sentinel.
    pub area: Option<f64>,
    /// Label flag.
    pub labelled: bool,
    /// Target-area signal, as last pushed to the engine.
    pub target_area: f64,
    /// Area the ODE was integrated with.
    pub mirrored_area: f64,
    /// Activator concentration `G`.
    pub activator: f64,
    /// Polygon perimeter.
    pub perimeter: f64,
    /// Neighbouring agents, ascending.
    pub neighbours: NeighbourList,
    /// Polygon edge count.
    pub edge_count: u32,
}

impl Snapshot {
    /// Combine an agent's geometry with its ODE state.
    pub fn from_parts(agent: AgentId, geometry: &AgentGeometry, state: &AgentDynamicState) -> Self {
        Self {
            agent,
            centroid: geometry.centroid,
            area: geometry.finite_area(),
            labelled: geometry.labelled,
            target_area: state.target_area_signal,
            mirrored_area: state.mirrored_area,
            activator: state.activator,
            perimeter: geometry.perimeter,
            neighbours: geometry.neighbours.clone(),
            edge_count: geometry.edge_count,
        }
    }

    /// Number of neighbours.
    pub fn neighbour_count(&self) -> usize {
        self.neighbours.len()
    }
}

/// Check once, at setup, that `source` exposes everything a snapshot needs.
pub fn require_export_fields(source: &(impl GeometrySource + ?Sized)) -> Result<(), SetupError> {
    match source.capabilities().first_missing(&GeometryFields::export()) {
        Some(field) => Err(SetupError::MissingField { field }),
        None => Ok(()),
    }
}

/// Build snapshots for `states`, in their iteration order.
///
/// Agents the engine no longer reports geometry for are skipped.
pub fn collect_snapshots<'a, G, I>(source: &G, states: I) -> Vec<Snapshot>
where
    G: GeometrySource + ?Sized,
    I: IntoIterator<Item = (AgentId, &'a AgentDynamicState)>,
{
    states
        .into_iter()
        .filter_map(|(id, state)| {
            source
                .geometry(id)
                .map(|geometry| Snapshot::from_parts(id, &geometry, state))
        })
        .collect()
}
