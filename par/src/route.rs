//! Route request construction.

use arcstr::ArcStr;
use indexmap::IndexMap;
use tracing::{span, Level};

use crate::cell::Cell;
use crate::grid::Vertex;
use crate::net::{Route, RouteKey, TerminalRef};
use crate::Layout;

impl Layout {
    /// Builds one route request per resolved `(source, sink)` pair of every net.
    ///
    /// Nets without a resolved source get no requests; unresolved sinks are skipped.
    /// Existing requests are replaced. Returns every request, in net order.
    pub fn build_route_requests(&mut self) -> Vec<RouteKey> {
        let _guard = span!(Level::INFO, "building route requests").entered();
        let width = self.config.channel_width;
        let spacing = self.config.channel_spacing;

        let mut keys = Vec::new();
        for net in self.nets.values_mut() {
            net.routes.clear();
            let Some(start) = net
                .source
                .as_ref()
                .and_then(|t| terminal_vertex(&self.cells, t))
            else {
                tracing::debug!(net = %net.id, "net has no resolved source; not routing");
                continue;
            };
            for (sink, terminal) in net.sinks.iter().enumerate() {
                let Some(end) = terminal
                    .as_ref()
                    .and_then(|t| terminal_vertex(&self.cells, t))
                else {
                    continue;
                };
                keys.push(RouteKey {
                    net: net.id.clone(),
                    index: net.routes.len(),
                });
                net.routes.push(Route {
                    net: net.id.clone(),
                    sink,
                    start,
                    end,
                    channel_width: width,
                    channel_spacing: spacing,
                    waypoints: Vec::new(),
                });
            }
        }
        tracing::debug!(routes = keys.len(), "built route requests");
        keys
    }

    /// The absolute vertices of every resolved net endpoint, sources first per net.
    pub fn endpoint_vertices(&self) -> Vec<Vertex> {
        self.nets
            .values()
            .flat_map(|net| net.source.iter().chain(net.sinks.iter().flatten()))
            .filter_map(|t| terminal_vertex(&self.cells, t))
            .collect()
    }
}

pub(crate) fn terminal_vertex(cells: &IndexMap<ArcStr, Cell>, t: &TerminalRef) -> Option<Vertex> {
    cells
        .get(&t.cell)?
        .terminals
        .get(t.index)
        .map(|t| t.vertex())
}
