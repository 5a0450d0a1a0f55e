//! Geometry fields exposed by a mechanical engine, and per-agent geometry.
//!
//! The coupler and exporter never downcast the engine to discover what
//! it can provide. Instead the engine advertises a [`GeometryFields`]
//! capability set once, at setup, and each consumer checks that the
//! fields it needs are present.

use smallvec::SmallVec;
use std::fmt;

use crate::id::AgentId;

/// Area of a regular hexagon in the default honeycomb packing.
///
/// Newly born agents start with this as their mirrored area, before the
/// first coupling pass replaces it with the engine's reported value.
pub const HEXAGONAL_PACKING_AREA: f64 = 0.866025;

/// Area reported for boundary and ghost agents whose area is undefined.
pub const AREA_SENTINEL: f64 = f64::INFINITY;

/// Returns `true` if `area` marks an agent with undefined geometric area.
///
/// Any value that is not strictly below `f64::MAX` counts: `+inf`, NaN,
/// and `f64::MAX` itself (used by some engines as a finite stand-in).
pub fn is_sentinel_area(area: f64) -> bool {
    !(area < f64::MAX)
}

/// Neighbour list for one agent. Honeycomb tissues have about six.
pub type NeighbourList = SmallVec<[AgentId; 8]>;

/// A per-agent quantity a mechanical engine may expose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeometryField {
    /// Current geometric area, read by the coupler every tick.
    CurrentArea,
    /// Target-area constraint parameter, written by the coupler.
    TargetArea,
    /// Centroid coordinates.
    Centroid,
    /// Polygon perimeter.
    Perimeter,
    /// Neighbour topology.
    Neighbours,
    /// Polygon edge count.
    EdgeCount,
    /// Boolean label flag.
    Label,
}

impl GeometryField {
    /// Every field, in declaration order.
    pub const ALL: [GeometryField; 7] = [
        Self::CurrentArea,
        Self::TargetArea,
        Self::Centroid,
        Self::Perimeter,
        Self::Neighbours,
        Self::EdgeCount,
        Self::Label,
    ];

    fn bit(self) -> u16 {
        1u16 << (self as u16)
    }

    /// Name used in setup error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::CurrentArea => "current area",
            Self::TargetArea => "target area",
            Self::Centroid => "centroid",
            Self::Perimeter => "perimeter",
            Self::Neighbours => "neighbours",
            Self::EdgeCount => "edge count",
            Self::Label => "label",
        }
    }
}

impl fmt::Display for GeometryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of [`GeometryField`]s, stored as a bitmask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GeometryFields {
    bits: u16,
}

impl GeometryFields {
    /// The empty set.
    pub fn empty() -> Self {
        Self { bits: 0 }
    }

    /// The set of all fields.
    pub fn all() -> Self {
        GeometryField::ALL.into_iter().collect()
    }

    /// Fields the coupler needs: it reads the area and writes the target.
    pub fn coupling() -> Self {
        [GeometryField::CurrentArea, GeometryField::TargetArea]
            .into_iter()
            .collect()
    }

    /// Fields the exporter needs to build a full snapshot.
    pub fn export() -> Self {
        [
            GeometryField::CurrentArea,
            GeometryField::Centroid,
            GeometryField::Perimeter,
            GeometryField::Neighbours,
            GeometryField::EdgeCount,
            GeometryField::Label,
        ]
        .into_iter()
        .collect()
    }

    /// Insert a field.
    pub fn insert(&mut self, field: GeometryField) {
        self.bits |= field.bit();
    }

    /// Remove a field.
    pub fn remove(&mut self, field: GeometryField) {
        self.bits &= !field.bit();
    }

    /// Whether the set contains `field`.
    pub fn contains(&self, field: GeometryField) -> bool {
        self.bits & field.bit() != 0
    }

    /// Returns `true` if the set contains no fields.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// The first field of `required` missing from `self`, if any.
    ///
    /// Fields are checked in declaration order, so the reported field is
    /// stable across runs.
    pub fn first_missing(&self, required: &Self) -> Option<GeometryField> {
        GeometryField::ALL
            .into_iter()
            .find(|&f| required.contains(f) && !self.contains(f))
    }

    /// Iterate over contained fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = GeometryField> + '_ {
        GeometryField::ALL.into_iter().filter(|&f| self.contains(f))
    }
}

impl FromIterator<GeometryField> for GeometryFields {
    fn from_iter<I: IntoIterator<Item = GeometryField>>(iter: I) -> Self {
        let mut set = Self::empty();
        for field in iter {
            set.insert(field);
        }
        set
    }
}

/// Geometry of one agent as reported by the mechanical engine.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentGeometry {
    /// Centroid `(x, y)`.
    pub centroid: [f64; 2],
    /// Current area, or a sentinel (see [`is_sentinel_area`]).
    pub area: f64,
    /// Polygon perimeter.
    pub perimeter: f64,
    /// Neighbouring agents, in ascending id order.
    pub neighbours: NeighbourList,
    /// Number of polygon edges (vertices of the element).
    pub edge_count: u32,
    /// Label flag.
    pub labelled: bool,
}

impl AgentGeometry {
    /// The area, or `None` for a sentinel.
    pub fn finite_area(&self) -> Option<f64> {
        if is_sentinel_area(self.area) {
            None
        } else {
            Some(self.area)
        }
    }
}
