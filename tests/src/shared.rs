//! Fixtures shared by the integration tests.

use devir::{Component, Connection, Device, Layer, LayerKind, Netlist, Port, Target};
use indexmap::IndexMap;
use netsynth::{
    ComponentPrimitive, ConnectingOption, ConstructionGraph, ConstructionNode, NetlistPrimitive,
};
use par::engine::{Engine, EngineError, Problem, Solution};
use par::grid::Vertex;

/// An empty device with a single flow layer.
pub fn flow_device(name: &str) -> Device {
    let mut device = Device::new(name);
    device.add_layer(Layer::new("flow", LayerKind::Flow));
    device
}

/// A 1000 by 1000 I/O port with a single `out` port on its right edge.
pub fn io_port() -> ComponentPrimitive {
    ComponentPrimitive::new("PORT", "port", 1000, 1000).with_port(Port::new("out", 1000, 500))
}

fn mixer(id: &str) -> Component {
    Component::new(id, "MIXER", 2000, 1000)
        .with_port(Port::new("in", 0, 500))
        .with_port(Port::new("out", 2000, 500))
}

/// Two mixers in series, joined by an internal channel.
pub fn mixer_chain() -> NetlistPrimitive {
    NetlistPrimitive::new(Netlist {
        components: vec![mixer("mix1"), mixer("mix2")],
        connections: vec![Connection::new(
            "ch1",
            Target::new("mix1", "out"),
            [Target::new("mix2", "in")],
        )],
    })
}

/// inlet -> mixer chain -> outlet.
pub fn mixing_graph() -> ConstructionGraph {
    let mut graph = ConstructionGraph::new();
    graph.add_node(
        ConstructionNode::new("inlet")
            .with_primitive(io_port())
            .with_output(ConnectingOption::new(["out"])),
    );
    graph.add_node(
        ConstructionNode::new("mixing")
            .with_primitive(mixer_chain())
            .with_input(ConnectingOption::named("mix1", ["in"]))
            .with_output(ConnectingOption::named("mix2", ["out"])),
    );
    graph.add_node(
        ConstructionNode::new("outlet")
            .with_primitive(io_port())
            .with_input(ConnectingOption::new(["out"])),
    );
    graph.add_edge("inlet", "mixing").unwrap();
    graph.add_edge("mixing", "outlet").unwrap();
    graph
}

/// Places cells on a diagonal and routes every request as a straight segment.
#[derive(Debug, Default)]
pub struct DiagonalEngine {
    /// The distance between consecutive cells, in grid units.
    pub pitch: i64,
    /// The number of cells in the last problem.
    pub cells: usize,
    /// The number of route requests in the last problem.
    pub routes: usize,
}

impl Engine for DiagonalEngine {
    fn place_and_route(&mut self, problem: &Problem<'_>) -> Result<Solution, EngineError> {
        self.cells = problem.cells.len();
        self.routes = problem.routes.len();
        let placements = problem
            .cells
            .keys()
            .enumerate()
            .map(|(i, id)| {
                let d = i as i64 * self.pitch;
                (id.clone(), Vertex::new(d, d))
            })
            .collect();
        let mut waypoints = IndexMap::new();
        for key in problem.routes {
            let route = problem
                .route(key)
                .ok_or_else(|| EngineError::Unroutable {
                    net: key.net.clone(),
                    reason: "missing route request".into(),
                })?;
            waypoints.insert(key.clone(), vec![route.start, route.end]);
        }
        Ok(Solution {
            placements,
            waypoints,
        })
    }
}
