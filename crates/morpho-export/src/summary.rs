//! Per-frame population summary.
//!
//! One record per frame aggregating the snapshots of that frame. Agents
//! with a sentinel area are boundary or ghost cells: they count towards
//! `agents` and the neighbour histogram but not towards the means.

use std::collections::BTreeMap;

use morpho_core::AgentId;

use crate::snapshot::Snapshot;

/// Activator trace of one followed agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackedActivator {
    /// The followed agent.
    pub agent: AgentId,
    /// Its activator `G` in this frame.
    pub activator: f64,
}

/// Aggregate shape and signalling statistics of one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct PopulationSummary {
    /// Agents in the frame.
    pub agents: usize,
    /// Agents with a finite area.
    pub measured: usize,
    /// Mean area over measured agents; `None` if there are none.
    pub mean_area: Option<f64>,
    /// Mean perimeter over measured agents; `None` if there are none.
    pub mean_perimeter: Option<f64>,
    /// Number of agents per neighbour count, ascending by count.
    pub neighbour_histogram: BTreeMap<usize, usize>,
    /// The followed agent, when it is part of the frame.
    pub tracked: Option<TrackedActivator>,
}

impl PopulationSummary {
    /// Summarise `snapshots`, following `tracked` if given.
    pub fn from_snapshots(snapshots: &[Snapshot], tracked: Option<AgentId>) -> Self {
        let mut measured = 0;
        let mut area_sum = 0.0;
        let mut perimeter_sum = 0.0;
        let mut neighbour_histogram = BTreeMap::new();

        for s in snapshots {
            *neighbour_histogram.entry(s.neighbour_count()).or_insert(0) += 1;
            if let Some(area) = s.area {
                measured += 1;
                area_sum += area;
                perimeter_sum += s.perimeter;
            }
        }

        let mean = |sum: f64| (measured > 0).then(|| sum / measured as f64);
        let tracked = tracked.and_then(|id| {
            snapshots
                .iter()
                .find(|s| s.agent == id)
                .map(|s| TrackedActivator {
                    agent: id,
                    activator: s.activator,
                })
        });

        Self {
            agents: snapshots.len(),
            measured,
            mean_area: mean(area_sum),
            mean_perimeter: mean(perimeter_sum),
            neighbour_histogram,
            tracked,
        }
    }

    /// The histogram as comma-separated `count:agents` pairs.
    pub fn histogram_string(&self) -> String {
        self.neighbour_histogram
            .iter()
            .map(|(count, agents)| format!("{count}:{agents}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}
