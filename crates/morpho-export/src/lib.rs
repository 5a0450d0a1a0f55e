//! Per-tick snapshot export.
//!
//! A run's output is one document holding a sequence of frames, one per
//! sampled tick. Each frame carries the simulation time and the number
//! of elapsed ticks and wraps one record per agent:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <cell_data>
//! <time t="0.01" tau="1">
//! <cell cell_id="0" x="0" y="0" area="0.8" target_area="0.79" ... />
//! </time>
//! </cell_data>
//! ```
//!
//! Formatting is a pure function of a [`Snapshot`] and a
//! [`RecordFormat`] ([`format`]); [`SnapshotWriter`] adds sampling and
//! document framing on top, and can close each frame with a
//! [`PopulationSummary`] record.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod format;
pub mod snapshot;
pub mod summary;
pub mod writer;

pub use format::{render_frame, write_frame_to, RecordFormat};
pub use snapshot::{collect_snapshots, require_export_fields, Snapshot};
pub use summary::{PopulationSummary, TrackedActivator};
pub use writer::SnapshotWriter;
