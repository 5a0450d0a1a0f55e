//! Sampled, framed snapshot stream.
//!
//! [`SnapshotWriter`] streams frames to any `Write` sink. The document
//! header is written on construction and the footer by
//! [`finish`](SnapshotWriter::finish).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::num::NonZeroU64;
use std::path::Path;

use morpho_core::{AgentId, TickId};

use crate::format::{write_frame_to, RecordFormat};
use crate::snapshot::Snapshot;
use crate::summary::PopulationSummary;

/// Writes one frame per sampled tick.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and runs can use
/// `BufWriter<File>`.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroU64;
/// use morpho_core::TickId;
/// use morpho_export::{RecordFormat, SnapshotWriter};
///
/// let mut writer = SnapshotWriter::new(Vec::new(), RecordFormat::Xml).unwrap()
///     .with_sampling_interval(NonZeroU64::new(2).unwrap());
/// for tick in 1..=4 {
///     writer.sample(TickId(tick), tick as f64 * 0.01, &[]).unwrap();
/// }
/// assert_eq!(writer.frames_written(), 2);
/// let out = String::from_utf8(writer.finish().unwrap()).unwrap();
/// assert!(out.contains("<time t=\"0.02\" tau=\"2\">"));
/// assert!(out.ends_with("</cell_data>\n"));
/// ```
pub struct SnapshotWriter<W: Write> {
    writer: W,
    format: RecordFormat,
    interval: NonZeroU64,
    frames_written: u64,
    last_tau: Option<u64>,
    /// `Some(tracked)` when every frame ends with a population summary.
    summary: Option<Option<AgentId>>,
}

impl<W: Write> SnapshotWriter<W> {
    /// Create a writer sampling every tick, immediately writing the
    /// document header.
    pub fn new(mut writer: W, format: RecordFormat) -> io::Result<Self> {
        format.write_header(&mut writer)?;
        Ok(Self {
            writer,
            format,
            interval: NonZeroU64::MIN,
            frames_written: 0,
            last_tau: None,
            summary: None,
        })
    }

    /// Sample every `interval`-th tick instead of every tick.
    pub fn with_sampling_interval(mut self, interval: NonZeroU64) -> Self {
        self.interval = interval;
        self
    }

    /// End every frame with a [`PopulationSummary`], following the
    /// activator of `tracked` if given.
    pub fn with_population_summary(mut self, tracked: Option<AgentId>) -> Self {
        self.summary = Some(tracked);
        self
    }

    /// Whether `tick` is a sampled tick.
    pub fn is_sampled(&self, tick: TickId) -> bool {
        tick.0 % self.interval.get() == 0
    }

    /// Write a frame for `tick` if it is a sampled tick.
    ///
    /// Returns whether a frame was written.
    pub fn sample(&mut self, tick: TickId, time: f64, snapshots: &[Snapshot]) -> io::Result<bool> {
        if !self.is_sampled(tick) {
            return Ok(false);
        }
        self.write_frame(tick, time, snapshots)?;
        Ok(true)
    }

    /// Write a frame for `tick` regardless of the sampling interval.
    ///
    /// Frames must be written in increasing tick order.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `tick` does not come after the last frame
    /// written, plus any error from the sink.
    pub fn write_frame(
        &mut self,
        tick: TickId,
        time: f64,
        snapshots: &[Snapshot],
    ) -> io::Result<()> {
        if let Some(last) = self.last_tau {
            if tick.0 <= last {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("frame for tick {tick} written after tick {last}"),
                ));
            }
        }
        let summary = self
            .summary
            .map(|tracked| PopulationSummary::from_snapshots(snapshots, tracked));
        write_frame_to(
            &mut self.writer,
            self.format,
            time,
            tick.0,
            snapshots,
            summary.as_ref(),
        )?;
        self.frames_written += 1;
        self.last_tau = Some(tick.0);
        Ok(())
    }

    /// The record format.
    pub fn format(&self) -> RecordFormat {
        self.format
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Write the document footer, flush, and return the sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.format.write_footer(&mut self.writer)?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl SnapshotWriter<BufWriter<File>> {
    /// Create (or truncate) the file at `path` and write the header.
    pub fn create(path: impl AsRef<Path>, format: RecordFormat) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        log::info!("{format} snapshot export started: {}", path.display());
        Self::new(BufWriter::new(file), format)
    }
}
