//! Nets and route requests.

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::grid::Vertex;

/// Refers to a terminal by its cell and its index within the cell.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalRef {
    /// The identity of the cell.
    pub cell: ArcStr,
    /// The index of the terminal in [`Cell::terminals`](crate::cell::Cell::terminals).
    pub index: usize,
}

/// Identifies one route within its net.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteKey {
    /// The identity of the net.
    pub net: ArcStr,
    /// The index of the route in [`Net::routes`].
    pub index: usize,
}

/// A request to route one segment, and its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// The identity of the net this route belongs to.
    pub net: ArcStr,
    /// The index of the sink in [`Net::sinks`] this route ends at.
    pub sink: usize,
    /// The start of the segment.
    pub start: Vertex,
    /// The end of the segment.
    pub end: Vertex,
    /// The channel width.
    pub channel_width: i64,
    /// The channel spacing.
    pub channel_spacing: i64,
    /// The realized path, filled in by the engine.
    pub waypoints: Vec<Vertex>,
}

/// A set of terminals to connect: one source and any number of sinks.
///
/// Endpoints that could not be resolved at import are [`None`];
/// they are skipped when building route requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Net {
    /// The identity of the device connection this net stands for.
    pub id: ArcStr,
    /// The source terminal.
    pub source: Option<TerminalRef>,
    /// The sink terminals, in connection order.
    pub sinks: Vec<Option<TerminalRef>>,
    /// Route requests (and, after routing, results) for this net.
    pub routes: Vec<Route>,
}

impl Net {
    /// Creates a net with no routes.
    pub fn new(
        id: impl Into<ArcStr>,
        source: Option<TerminalRef>,
        sinks: impl IntoIterator<Item = Option<TerminalRef>>,
    ) -> Self {
        Self {
            id: id.into(),
            source,
            sinks: sinks.into_iter().collect(),
            routes: Vec::new(),
        }
    }

    /// Returns `true` if the source and every sink were resolved.
    pub fn is_fully_resolved(&self) -> bool {
        self.source.is_some() && self.sinks.iter().all(Option::is_some)
    }
}
