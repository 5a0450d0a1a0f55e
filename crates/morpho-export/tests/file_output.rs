//! Export to a real file through `SnapshotWriter::create`.

use morpho_core::{AgentDynamicState, AgentId, TickId, AREA_SENTINEL};
use morpho_export::{collect_snapshots, RecordFormat, SnapshotWriter};
use morpho_test_utils::StaticTissue;

#[test]
fn csv_file_has_one_row_per_agent_per_frame() {
    let dir = std::env::temp_dir().join(format!("morpho-export-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("cells.csv");

    let tissue = StaticTissue::new()
        .with_area(AgentId(0), 0.8)
        .with_area(AgentId(1), AREA_SENTINEL);
    let states = [
        (AgentId(0), AgentDynamicState::new(0.5, 0.7, 0.8, 0.0)),
        (AgentId(1), AgentDynamicState::new(f64::NAN, f64::NAN, AREA_SENTINEL, 0.0)),
    ];

    let mut writer = SnapshotWriter::create(&path, RecordFormat::Csv).unwrap();
    for tick in 1..=3u64 {
        let snaps = collect_snapshots(&tissue, states.iter().map(|(id, s)| (*id, s)));
        writer.sample(TickId(tick), tick as f64 * 0.01, &snaps).unwrap();
    }
    writer.finish().unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1 + 3 * 4);
    assert!(lines[0].starts_with("cell_id,x,y,area,"));
    assert_eq!(lines[1], "# time t=0.01 tau=1");
    assert!(lines[2].starts_with("0,0,0,0.8,0,0.7,0.8,0.5,"));
    assert!(lines[3].starts_with("1,1,0,,0,NaN,inf,NaN,"));
    assert_eq!(lines[4], "# end tau=1");

    std::fs::remove_dir_all(&dir).unwrap();
}
