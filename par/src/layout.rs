//! The layout coordinator.

use arcstr::ArcStr;
use devir::{Device, WaypointPath};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{span, Level};

use crate::cell::{Cell, Terminal};
use crate::config::PnrConfig;
use crate::engine::{Backend, Constraint, Engine, Problem, Solution};
use crate::error::{LayoutError, Result};
use crate::grid::{GridQuantizer, Vertex};
use crate::issues::ImportIssues;
use crate::net::{Net, RouteKey, TerminalRef};
use crate::obstacle::{self, Obstacle};
use crate::route::terminal_vertex;

/// Placement and routing state for one device.
///
/// A layout owns the cells and nets imported from a device. It is not shared
/// between runs; create a new one for each device.
#[derive(Debug, Clone)]
pub struct Layout {
    pub(crate) config: PnrConfig,
    pub(crate) quantizer: GridQuantizer,
    pub(crate) cells: IndexMap<ArcStr, Cell>,
    pub(crate) nets: IndexMap<ArcStr, Net>,
    constraints: Vec<Constraint>,
}

/// The bounding box of all cells, in grid units.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// The smallest cell x-coordinate.
    pub min_x: i64,
    /// The smallest cell y-coordinate.
    pub min_y: i64,
    /// The largest x-coordinate covered by a cell.
    pub max_x: i64,
    /// The largest y-coordinate covered by a cell.
    pub max_y: i64,
}

impl Bounds {
    /// Returns `true` if any cell extends below zero on either axis.
    #[inline]
    pub fn has_negative(&self) -> bool {
        self.min_x < 0 || self.min_y < 0
    }
}

/// The outcome of [`Layout::run`].
#[derive(Debug, Clone)]
pub struct LayoutReport {
    /// Issues recorded during import.
    pub issues: ImportIssues,
    /// The bounding box of the placed cells, if there are any.
    pub bounds: Option<Bounds>,
    /// The route requests handed to the engine.
    pub routes: Vec<RouteKey>,
    /// The obstacles handed to the engine.
    pub obstacles: Vec<Obstacle>,
}

impl Layout {
    /// Creates an empty layout.
    ///
    /// Fails with [`LayoutError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: PnrConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| LayoutError::InvalidConfig(format!("{e:#}")))?;
        Ok(Self {
            quantizer: GridQuantizer::new(config.lambda),
            config,
            cells: IndexMap::new(),
            nets: IndexMap::new(),
            constraints: Vec::new(),
        })
    }

    /// The configuration.
    #[inline]
    pub fn config(&self) -> &PnrConfig {
        &self.config
    }

    /// The quantizer derived from the configured scale factor.
    #[inline]
    pub fn quantizer(&self) -> GridQuantizer {
        self.quantizer
    }

    /// The imported cells, in device order.
    #[inline]
    pub fn cells(&self) -> &IndexMap<ArcStr, Cell> {
        &self.cells
    }

    /// The imported nets, in device order.
    #[inline]
    pub fn nets(&self) -> &IndexMap<ArcStr, Net> {
        &self.nets
    }

    /// Looks up a cell.
    #[inline]
    pub fn cell(&self, id: &str) -> Option<&Cell> {
        self.cells.get(id)
    }

    /// Looks up a net.
    #[inline]
    pub fn net(&self, id: &str) -> Option<&Net> {
        self.nets.get(id)
    }

    /// Looks up the terminal a [`TerminalRef`] points to.
    pub fn terminal(&self, t: &TerminalRef) -> Option<&Terminal> {
        self.cells.get(&t.cell)?.terminals.get(t.index)
    }

    /// Declares a constraint to forward to the engine.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// The declared constraints.
    #[inline]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Builds the obstacles for the current cells.
    ///
    /// Every resolved net endpoint is kept clear.
    pub fn build_obstacles(&self) -> Vec<Obstacle> {
        let endpoints = self.endpoint_vertices();
        let obstacles = obstacle::build_obstacles(self.cells.values(), &endpoints);
        tracing::debug!(
            cells = self.cells.len(),
            obstacles = obstacles.len(),
            "built obstacles"
        );
        obstacles
    }

    /// Computes the bounding box of all cells.
    ///
    /// Negative coordinates are reported with a warning but left in place.
    /// Returns [`None`] if there are no cells.
    pub fn ensure_legal_coordinates(&self) -> Option<Bounds> {
        let bounds = self.cells.values().fold(None, |acc: Option<Bounds>, cell| {
            let (x1, y1) = (cell.x + cell.x_span, cell.y + cell.y_span);
            Some(match acc {
                None => Bounds {
                    min_x: cell.x,
                    min_y: cell.y,
                    max_x: x1,
                    max_y: y1,
                },
                Some(b) => Bounds {
                    min_x: b.min_x.min(cell.x),
                    min_y: b.min_y.min(cell.y),
                    max_x: b.max_x.max(x1),
                    max_y: b.max_y.max(y1),
                },
            })
        })?;
        if bounds.has_negative() {
            tracing::warn!(?bounds, "layout has cells at negative coordinates");
        }
        Some(bounds)
    }

    /// Hands the current cells and nets to `engine` and applies its solution.
    ///
    /// The solution is validated before any of it is applied, so on error
    /// the layout is unchanged.
    pub fn place_and_route(
        &mut self,
        engine: &mut dyn Engine,
        routes: &[RouteKey],
        obstacles: &[Obstacle],
    ) -> Result<()> {
        let _guard = span!(
            Level::INFO,
            "placing and routing",
            cells = self.cells.len(),
            routes = routes.len()
        )
        .entered();
        let problem = Problem {
            cells: &self.cells,
            nets: &self.nets,
            routes,
            obstacles,
            constraints: &self.constraints,
            region: self.config.region,
        };
        let solution = engine.place_and_route(&problem).map_err(|e| {
            tracing::error!("placement and routing failed: {e}");
            LayoutError::from(e)
        })?;
        self.check_solution(&solution)?;
        self.apply_solution(solution);
        Ok(())
    }

    fn check_solution(&self, solution: &Solution) -> Result<()> {
        if let Some(id) = solution
            .placements
            .keys()
            .find(|id| !self.cells.contains_key(*id))
        {
            return Err(LayoutError::UnknownCell(id.clone()));
        }
        for key in solution.waypoints.keys() {
            let exists = self
                .nets
                .get(&key.net)
                .is_some_and(|net| key.index < net.routes.len());
            if !exists {
                return Err(LayoutError::UnknownRoute {
                    net: key.net.clone(),
                    index: key.index,
                });
            }
        }
        Ok(())
    }

    fn apply_solution(&mut self, solution: Solution) {
        for (id, origin) in solution.placements {
            if let Some(cell) = self.cells.get_mut(&id) {
                cell.x = origin.x;
                cell.y = origin.y;
            }
        }
        for (key, waypoints) in solution.waypoints {
            if let Some(route) = self
                .nets
                .get_mut(&key.net)
                .and_then(|net| net.routes.get_mut(key.index))
            {
                route.waypoints = waypoints;
            }
        }
    }

    /// Writes cell positions and routed paths back onto `device`.
    ///
    /// Positions are written in grid units. A connection's paths are replaced
    /// only if its net has at least one realized route; path `i` then belongs
    /// to sink `i`, and is empty if that sink was not routed. Applying the
    /// same layout again leaves the device unchanged.
    pub fn apply_layout(&self, device: &mut Device) -> Result<()> {
        let _guard = span!(Level::INFO, "applying layout", device = %device.name()).entered();
        if let Some(id) = self.cells.keys().find(|id| device.component(id).is_none()) {
            return Err(LayoutError::MissingComponent(id.clone()));
        }
        let paths: Vec<(&ArcStr, Vec<WaypointPath>)> = self
            .nets
            .values()
            .filter(|net| net.routes.iter().any(|r| !r.waypoints.is_empty()))
            .map(|net| {
                let mut paths = vec![WaypointPath::new(); net.sinks.len()];
                for route in net.routes.iter() {
                    if let Some(path) = paths.get_mut(route.sink) {
                        *path = route.waypoints.iter().map(|&v| v.into()).collect();
                    }
                }
                (&net.id, paths)
            })
            .collect();
        if let Some((id, _)) = paths.iter().find(|(id, _)| device.connection(id).is_none()) {
            return Err(LayoutError::MissingConnection((*id).clone()));
        }

        for cell in self.cells.values() {
            if let Some(component) = device.component_mut(&cell.id) {
                component.set_position(cell.x, cell.y);
            }
        }
        for (id, paths) in paths {
            if let Some(connection) = device.connection_mut(id) {
                connection.set_paths(paths);
            }
        }
        Ok(())
    }

    /// Runs a complete layout pass over `device`.
    ///
    /// Imports the device, builds obstacles and route requests, places and
    /// routes with the configured backend, checks coordinates and writes the
    /// result back. `external` is used when the configuration selects the
    /// external backend.
    pub fn run(
        mut self,
        device: &mut Device,
        external: Option<&mut dyn Engine>,
    ) -> Result<LayoutReport> {
        let _guard = span!(Level::INFO, "layout", device = %device.name()).entered();
        let mut backend =
            Backend::from_config(&self.config, external).ok_or(LayoutError::BackendUnavailable)?;

        let issues = self.import_without_constraints(device);
        let obstacles = self.build_obstacles();
        let routes = self.build_route_requests();
        self.place_and_route(&mut backend, &routes, &obstacles)?;
        let bounds = self.ensure_legal_coordinates();
        self.apply_layout(device)?;

        tracing::info!(
            cells = self.cells.len(),
            routes = routes.len(),
            warnings = issues.num_warnings(),
            "layout complete"
        );
        Ok(LayoutReport {
            issues,
            bounds,
            routes,
            obstacles,
        })
    }

    /// The absolute vertex of the terminal a [`TerminalRef`] points to.
    pub fn terminal_vertex(&self, t: &TerminalRef) -> Option<Vertex> {
        terminal_vertex(&self.cells, t)
    }
}
