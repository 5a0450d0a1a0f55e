//! End-to-end export of a small fixed tissue against a stored document.

use morpho_core::{AgentGeometry, AgentId, AREA_SENTINEL};
use morpho_coupler::InitialActivator;
use morpho_engine::{LockstepSimulation, SimulationConfig};
use morpho_test_utils::StaticTissue;
use smallvec::smallvec;

const GOLDEN_XML: &str = include_str!("golden/four_agents_two_ticks.xml");
const GOLDEN_SEED_1_XML: &str = include_str!("golden/four_agents_seed_1.xml");

fn cell(
    x: f64,
    y: f64,
    area: f64,
    perimeter: f64,
    neighbours: &[u32],
    edge_count: u32,
    labelled: bool,
) -> AgentGeometry {
    AgentGeometry {
        centroid: [x, y],
        area,
        perimeter,
        neighbours: neighbours.iter().map(|&n| AgentId(n)).collect(),
        edge_count,
        labelled,
    }
}

fn four_cell_tissue() -> StaticTissue {
    let mut tissue = StaticTissue::new();
    tissue.insert(AgentId(0), cell(0.0, 0.0, 0.7, 3.2, &[1, 2], 6, false));
    tissue.insert(AgentId(1), cell(1.0, 0.0, 0.866025, 3.4641, &[0, 2, 3], 6, true));
    tissue.insert(AgentId(2), cell(0.5, 0.866, 1.0, 3.7224, &[0, 1, 3], 5, false));
    tissue.insert(AgentId(3), cell(1.5, 0.866, AREA_SENTINEL, 4.0, &[1, 2], 4, false));
    tissue
}

fn config() -> SimulationConfig {
    SimulationConfig {
        end_time: 0.02,
        initial_activator: InitialActivator::Constant(1.0),
        ..Default::default()
    }
}

#[test]
fn four_agents_two_ticks_matches_golden_document() {
    let mut sim = LockstepSimulation::new(config(), four_cell_tissue()).unwrap();
    let mut writer = sim.open_writer(Vec::new()).unwrap();
    let summary = sim.run(&mut writer).unwrap();
    assert_eq!(summary.ticks, 2);
    assert_eq!(summary.frames, 2);
    assert_eq!(summary.agents, 4);

    let out = String::from_utf8(writer.finish().unwrap()).unwrap();
    assert_eq!(out, GOLDEN_XML);
}

#[test]
fn default_seeded_draws_match_golden_document() {
    let config = SimulationConfig {
        end_time: 0.02,
        ..Default::default()
    };
    assert_eq!(config.seed, 1);
    assert_eq!(config.initial_activator, InitialActivator::default());

    let mut sim = LockstepSimulation::new(config, four_cell_tissue()).unwrap();
    let drawn: Vec<f64> = sim.coupler().states().map(|(_, s)| s.activator).collect();
    assert_eq!(
        drawn,
        [
            0.40248566366484795,
            0.08038370892978186,
            0.5965601809348549,
            0.2193245804838,
        ]
    );

    let mut writer = sim.open_writer(Vec::new()).unwrap();
    sim.run(&mut writer).unwrap();
    let out = String::from_utf8(writer.finish().unwrap()).unwrap();
    assert_eq!(out, GOLDEN_SEED_1_XML);
}

#[test]
fn sentinel_agent_keeps_its_row_and_poisons_only_itself() {
    let mut sim = LockstepSimulation::new(config(), four_cell_tissue()).unwrap();
    let report = sim.step().unwrap();
    assert_eq!(report.coupling.non_finite, 1);

    let sentinel = sim.coupler().state(AgentId(3)).unwrap();
    assert!(sentinel.activator.is_nan());
    assert!(sentinel.target_area_signal.is_nan());
    assert!(sim.engine().target_area(AgentId(3)).unwrap().is_nan());
    for id in 0..3 {
        assert!(sim.coupler().state(AgentId(id)).unwrap().is_finite());
    }
}

#[test]
fn neighbour_lists_are_exported_in_order() {
    let mut tissue = four_cell_tissue();
    tissue.insert(
        AgentId(4),
        AgentGeometry {
            neighbours: smallvec![AgentId(0), AgentId(2), AgentId(9)],
            ..cell(2.0, 0.0, 0.9, 3.5, &[], 3, false)
        },
    );
    let mut sim = LockstepSimulation::new(
        SimulationConfig {
            end_time: 0.01,
            ..config()
        },
        tissue,
    )
    .unwrap();
    let mut writer = sim.open_writer(Vec::new()).unwrap();
    sim.run(&mut writer).unwrap();
    let out = String::from_utf8(writer.finish().unwrap()).unwrap();
    assert!(out.contains(r#"cell_id="4" "#));
    assert!(out.contains(r#"num_neighbours="3" neighbors=" 0 2 9" num_edges="3""#));
}
