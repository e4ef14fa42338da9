//! The placement and routing engine contract.
//!
//! The engine is opaque and synchronous: it receives the whole problem and
//! either returns a complete [`Solution`] or fails. Nothing is applied to the
//! layout unless the engine succeeds.

use arcstr::ArcStr;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::config::{BackendKind, PnrConfig};
use crate::grid::Vertex;
use crate::net::{Net, Route, RouteKey};
use crate::obstacle::Obstacle;

/// A rectangular region of the routing grid.
#[derive(Debug, Copy, Clone, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Region {
    /// The x-coordinate of the lower-left corner.
    pub x: i64,
    /// The y-coordinate of the lower-left corner.
    pub y: i64,
    /// The width.
    pub width: i64,
    /// The height.
    pub height: i64,
}

impl Region {
    /// Creates a new region.
    pub const fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A declared placement constraint, forwarded to the engine uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// The kind of constraint.
    pub kind: ArcStr,
    /// The cells the constraint applies to.
    pub cells: Vec<ArcStr>,
}

/// Everything an engine needs to place and route a device.
#[derive(Debug, Clone, Copy)]
pub struct Problem<'a> {
    /// The cells to place, keyed by identity.
    pub cells: &'a IndexMap<ArcStr, Cell>,
    /// The nets to route, keyed by identity, each holding its route requests.
    pub nets: &'a IndexMap<ArcStr, Net>,
    /// Every route request across all nets.
    pub routes: &'a [RouteKey],
    /// Regions routes must avoid.
    pub obstacles: &'a [Obstacle],
    /// Declared constraints.
    pub constraints: &'a [Constraint],
    /// The region to place and route in.
    pub region: Region,
}

impl<'a> Problem<'a> {
    /// Looks up a route request.
    pub fn route(&self, key: &RouteKey) -> Option<&'a Route> {
        self.nets.get(&key.net)?.routes.get(key.index)
    }
}

/// A solved placement and routing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
    /// Final lower-left corner of each placed cell.
    pub placements: IndexMap<ArcStr, Vertex>,
    /// Realized path of each routed request.
    pub waypoints: IndexMap<RouteKey, Vec<Vertex>>,
}

/// A failure reported by an engine.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The cells do not fit in the region.
    #[error("placement is infeasible: {0}")]
    Infeasible(String),
    /// A net could not be routed.
    #[error("could not route net `{net}`: {reason}")]
    Unroutable {
        /// The net identity.
        net: ArcStr,
        /// Why routing failed.
        reason: String,
    },
}

/// A placement and routing engine.
pub trait Engine {
    /// Solves `problem`, blocking until done.
    fn place_and_route(&mut self, problem: &Problem<'_>) -> Result<Solution, EngineError>;
}

/// Places cells left to right on a fixed pitch and does not route.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct FixedGridEngine {
    cell_size: i64,
}

impl FixedGridEngine {
    /// Creates an engine placing one cell every `cell_size` grid units.
    pub fn new(cell_size: i64) -> Self {
        Self { cell_size }
    }
}

impl Engine for FixedGridEngine {
    fn place_and_route(&mut self, problem: &Problem<'_>) -> Result<Solution, EngineError> {
        let region = problem.region;
        let needed = i64::try_from(problem.cells.len())
            .ok()
            .and_then(|n| n.checked_mul(self.cell_size));
        let fits = needed.is_some_and(|needed| needed <= region.width)
            && (problem.cells.is_empty() || self.cell_size <= region.height);
        if !fits {
            return Err(EngineError::Infeasible(format!(
                "{} cells of size {} do not fit in a {}x{} region",
                problem.cells.len(),
                self.cell_size,
                region.width,
                region.height
            )));
        }
        let placements = problem
            .cells
            .keys()
            .enumerate()
            .map(|(i, id)| {
                (
                    id.clone(),
                    Vertex::new(region.x + i as i64 * self.cell_size, region.y),
                )
            })
            .collect();
        Ok(Solution {
            placements,
            waypoints: IndexMap::new(),
        })
    }
}

/// The backend selected by a [`PnrConfig`].
pub enum Backend<'e> {
    /// A caller-supplied engine.
    External(&'e mut dyn Engine),
    /// The built-in fixed-size-cell placer.
    FixedGrid(FixedGridEngine),
}

impl<'e> Backend<'e> {
    /// Selects the backend named by `config`.
    ///
    /// Returns [`None`] if the external backend is selected but `external` is [`None`].
    pub fn from_config(config: &PnrConfig, external: Option<&'e mut dyn Engine>) -> Option<Self> {
        match config.backend {
            BackendKind::External => external.map(Self::External),
            BackendKind::FixedGrid => Some(Self::FixedGrid(FixedGridEngine::new(
                config.fixed_cell_size,
            ))),
        }
    }
}

impl Engine for Backend<'_> {
    fn place_and_route(&mut self, problem: &Problem<'_>) -> Result<Solution, EngineError> {
        match self {
            Self::External(engine) => engine.place_and_route(problem),
            Self::FixedGrid(engine) => engine.place_and_route(problem),
        }
    }
}
