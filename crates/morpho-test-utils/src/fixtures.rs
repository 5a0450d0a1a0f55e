//! Reusable tissue fixtures.
//!
//! - [`hex_patch`]: a `rows x cols` honeycomb of regular hexagons at the
//!   default packing area, with lattice neighbour lists.
//! - [`cell_geometry`]: a lone regular hexagon of a given area.

use morpho_core::{AgentGeometry, AgentId, NeighbourList, HEXAGONAL_PACKING_AREA};
use smallvec::SmallVec;

use crate::StaticTissue;

/// Side length of a regular hexagon of area `area`.
fn hexagon_side(area: f64) -> f64 {
    (2.0 * area / (3.0 * 3f64.sqrt())).sqrt()
}

/// Perimeter of a regular hexagon of area `area`.
pub fn hexagon_perimeter(area: f64) -> f64 {
    6.0 * hexagon_side(area)
}

/// Geometry of a lone hexagonal cell with the given area.
///
/// The centroid is placed at `(id, 0)`. A sentinel area yields a
/// sentinel perimeter.
pub fn cell_geometry(id: AgentId, area: f64) -> AgentGeometry {
    AgentGeometry {
        centroid: [id.0 as f64, 0.0],
        area,
        perimeter: hexagon_perimeter(area),
        neighbours: NeighbourList::new(),
        edge_count: 6,
        labelled: false,
    }
}

/// A `rows x cols` honeycomb in odd-row offset layout.
///
/// Cell `(r, c)` has id `r * cols + c`. Every cell has area
/// [`HEXAGONAL_PACKING_AREA`]; interior cells have six neighbours.
pub fn hex_patch(rows: u32, cols: u32) -> StaticTissue {
    let side = hexagon_side(HEXAGONAL_PACKING_AREA);
    let width = 3f64.sqrt() * side;
    let mut tissue = StaticTissue::new();

    for r in 0..rows {
        for c in 0..cols {
            let shift = if r % 2 == 1 { 0.5 * width } else { 0.0 };
            let id = AgentId(r * cols + c);
            let mut neighbours: SmallVec<[AgentId; 8]> = lattice_neighbours(r, c, rows, cols)
                .into_iter()
                .map(|(nr, nc)| AgentId(nr * cols + nc))
                .collect();
            neighbours.sort_unstable();
            tissue.insert(
                id,
                AgentGeometry {
                    centroid: [c as f64 * width + shift, r as f64 * 1.5 * side],
                    area: HEXAGONAL_PACKING_AREA,
                    perimeter: 6.0 * side,
                    neighbours,
                    edge_count: 6,
                    labelled: false,
                },
            );
        }
    }
    tissue
}

fn lattice_neighbours(r: u32, c: u32, rows: u32, cols: u32) -> Vec<(u32, u32)> {
    let (r, c) = (r as i64, c as i64);
    let diagonals: [i64; 2] = if r % 2 == 1 { [0, 1] } else { [-1, 0] };
    let mut out = vec![(r, c - 1), (r, c + 1)];
    for dr in [-1, 1] {
        for dc in diagonals {
            out.push((r + dr, c + dc));
        }
    }
    out.into_iter()
        .filter(|&(nr, nc)| nr >= 0 && nc >= 0 && nr < rows as i64 && nc < cols as i64)
        .map(|(nr, nc)| (nr as u32, nc as u32))
        .collect()
}
