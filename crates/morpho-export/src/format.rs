//! Record formats.
//!
//! Numbers are written with Rust's shortest round-trip formatting, so
//! every value in the output parses back to the exact `f64` that was
//! simulated. Non-finite values appear as `NaN`, `inf` and `-inf`.

use std::fmt;
use std::io::{self, Write};

use crate::snapshot::Snapshot;
use crate::summary::PopulationSummary;

/// CSV column names, in record order.
pub const CSV_COLUMNS: [&str; 12] = [
    "cell_id",
    "x",
    "y",
    "area",
    "cell_label",
    "target_area",
    "ODE_area",
    "G",
    "perimeter",
    "num_neighbours",
    "neighbors",
    "num_edges",
];

/// Output format of a record stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RecordFormat {
    /// XML-like nested elements: `<time>` frames of `<cell/>` records.
    #[default]
    Xml,
    /// Comma-separated rows with `#` framing lines.
    Csv,
}

impl RecordFormat {
    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Csv => "csv",
        }
    }

    /// Write the document preamble.
    pub fn write_header(self, w: &mut dyn Write) -> io::Result<()> {
        match self {
            Self::Xml => w.write_all(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<cell_data>\n"),
            Self::Csv => {
                let mut csv = row_writer(w);
                csv.write_record(CSV_COLUMNS)?;
                csv.flush()
            }
        }
    }

    /// Write the end of the document.
    pub fn write_footer(self, w: &mut dyn Write) -> io::Result<()> {
        match self {
            Self::Xml => w.write_all(b"</cell_data>\n"),
            Self::Csv => Ok(()),
        }
    }

    /// Open a frame for simulation time `time` after `tau` ticks.
    pub fn write_frame_open(self, w: &mut dyn Write, time: f64, tau: u64) -> io::Result<()> {
        match self {
            Self::Xml => writeln!(w, "<time t=\"{time}\" tau=\"{tau}\">"),
            Self::Csv => writeln!(w, "# time t={time} tau={tau}"),
        }
    }

    /// Close the frame opened for `tau`.
    pub fn write_frame_close(self, w: &mut dyn Write, tau: u64) -> io::Result<()> {
        match self {
            Self::Xml => w.write_all(b"</time>\n"),
            Self::Csv => writeln!(w, "# end tau={tau}"),
        }
    }

    /// Write one agent record.
    pub fn write_snapshot(self, w: &mut dyn Write, snapshot: &Snapshot) -> io::Result<()> {
        match self {
            Self::Xml => writeln!(w, "{}", XmlCell(snapshot)),
            Self::Csv => {
                let mut csv = row_writer(w);
                csv.write_record(csv_fields(snapshot))?;
                csv.flush()
            }
        }
    }

    /// Write the population summary of a frame.
    ///
    /// XML gets a `<population .../>` element, CSV a `# population`
    /// line. Means and the tracked agent are left out when absent.
    pub fn write_summary(self, w: &mut dyn Write, summary: &PopulationSummary) -> io::Result<()> {
        let fields = summary_fields(summary);
        match self {
            Self::Xml => {
                w.write_all(b"<population ")?;
                for (name, value) in &fields {
                    write!(w, "{name}=\"{value}\" ")?;
                }
                w.write_all(b"/>\n")
            }
            Self::Csv => {
                w.write_all(b"# population")?;
                for (name, value) in &fields {
                    write!(w, " {name}={value}")?;
                }
                w.write_all(b"\n")
            }
        }
    }
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Xml => "xml",
            Self::Csv => "csv",
        })
    }
}

/// Write one complete frame: the open marker, one record per snapshot,
/// the population summary if given, and the close marker.
///
/// The close marker is written even when `snapshots` is empty.
pub fn write_frame_to(
    w: &mut dyn Write,
    format: RecordFormat,
    time: f64,
    tau: u64,
    snapshots: &[Snapshot],
    summary: Option<&PopulationSummary>,
) -> io::Result<()> {
    format.write_frame_open(w, time, tau)?;
    for snapshot in snapshots {
        format.write_snapshot(w, snapshot)?;
    }
    if let Some(summary) = summary {
        format.write_summary(w, summary)?;
    }
    format.write_frame_close(w, tau)
}

/// Render one complete frame, without a summary, into a byte buffer.
pub fn render_frame(
    format: RecordFormat,
    time: f64,
    tau: u64,
    snapshots: &[Snapshot],
) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_frame_to(&mut buf, format, time, tau, snapshots, None)?;
    Ok(buf)
}

fn row_writer(w: &mut dyn Write) -> csv::Writer<&mut dyn Write> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .buffer_capacity(512)
        .from_writer(w)
}

fn csv_fields(s: &Snapshot) -> [String; 12] {
    [
        s.agent.to_string(),
        s.centroid[0].to_string(),
        s.centroid[1].to_string(),
        s.area.map(|a| a.to_string()).unwrap_or_default(),
        u8::from(s.labelled).to_string(),
        s.target_area.to_string(),
        s.mirrored_area.to_string(),
        s.activator.to_string(),
        s.perimeter.to_string(),
        s.neighbour_count().to_string(),
        s.neighbours
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" "),
        s.edge_count.to_string(),
    ]
}

fn summary_fields(summary: &PopulationSummary) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("agents", summary.agents.to_string()),
        ("measured", summary.measured.to_string()),
    ];
    if let Some(mean) = summary.mean_area {
        fields.push(("mean_area", mean.to_string()));
    }
    if let Some(mean) = summary.mean_perimeter {
        fields.push(("mean_perimeter", mean.to_string()));
    }
    fields.push(("neighbour_counts", summary.histogram_string()));
    if let Some(tracked) = summary.tracked {
        fields.push(("tracked_cell", tracked.agent.to_string()));
        fields.push(("tracked_G", tracked.activator.to_string()));
    }
    fields
}

/// `<cell .../>` element for one snapshot. Every attribute is followed
/// by a space.
struct XmlCell<'a>(&'a Snapshot);

impl fmt::Display for XmlCell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        write!(f, "<cell cell_id=\"{}\" ", s.agent)?;
        write!(f, "x=\"{}\" y=\"{}\" ", s.centroid[0], s.centroid[1])?;
        if let Some(area) = s.area {
            write!(f, "area=\"{area}\" ")?;
        }
        if s.labelled {
            f.write_str("CellLabel=\"1\" ")?;
        }
        write!(f, "target_area=\"{}\" ", s.target_area)?;
        write!(f, "ODE_area=\"{}\" ", s.mirrored_area)?;
        write!(f, "G=\"{}\" ", s.activator)?;
        write!(f, "perimeter=\"{}\" ", s.perimeter)?;
        write!(f, "num_neighbours=\"{}\" ", s.neighbour_count())?;
        f.write_str("neighbors=\"")?;
        for n in &s.neighbours {
            write!(f, " {n}")?;
        }
        f.write_str("\" ")?;
        write!(f, "num_edges=\"{}\" ", s.edge_count)?;
        f.write_str("/>")
    }
}
