//! Netlist synthesis.
//!
//! Expands a [`ConstructionGraph`] into concrete components and connections
//! on a target [`Device`].
//!
//! Synthesis runs in two phases:
//! 1. Every node is expanded in depth-first preorder. Each node's bound
//!    [`Primitive`] is materialized onto the device's first layer, and the
//!    identities it produced are recorded.
//! 2. Every edge consumes one output [`ConnectingOption`] of its source node
//!    and one input option of its target node. Each option resolves to one or
//!    more [`Target`]s. Exactly one source and one target produce a device
//!    connection; any other combination is a [`SynthesisError::UnsupportedFanout`].
//!
//! All errors are fatal: a partially synthesized device is not safe to lay out.
#![warn(missing_docs)]

pub mod error;
pub mod graph;
pub mod primitive;

#[cfg(test)]
pub(crate) mod tests;

use arcstr::ArcStr;
use devir::{Connection, Device, Layer, Target};
use indexmap::IndexMap;
use tracing::{span, Level};
use uniquify::NameGenerator;

pub use error::{Fanout, OptionSide, Result, SynthesisError};
pub use graph::{ConnectingOption, ConstructionGraph, ConstructionNode};
pub use primitive::{ComponentPrimitive, Materialized, NetlistPrimitive, Primitive};

/// The base name of connections created between construction nodes.
pub const CONNECTION_BASE_NAME: &str = "channel";

/// What a synthesis run added to the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesisReport {
    /// Construction node identity -> identities of the components it produced.
    pub produced: IndexMap<ArcStr, Vec<ArcStr>>,
    /// The identities of the connections created for graph edges, in order.
    pub connections: Vec<ArcStr>,
}

/// Expands `graph` into components and connections on `device`.
///
/// Names already used by the device are reserved in `names` before expansion.
/// On error, neither `device` nor `names` is modified.
pub fn generate_device(
    graph: ConstructionGraph,
    device: &mut Device,
    names: &mut NameGenerator,
) -> Result<SynthesisReport> {
    let _guard = span!(Level::INFO, "generating device", device = %device.name()).entered();

    let mut staged = device.clone();
    let mut staged_names = names.clone();
    let report = synthesize(graph, &mut staged, &mut staged_names).map_err(|e| {
        tracing::error!("synthesis failed, device left unchanged: {e}");
        e
    })?;
    *device = staged;
    *names = staged_names;
    Ok(report)
}

fn synthesize(
    mut graph: ConstructionGraph,
    device: &mut Device,
    names: &mut NameGenerator,
) -> Result<SynthesisReport> {
    graph.ensure_acyclic()?;
    for id in device
        .components()
        .map(|c| c.id.clone())
        .chain(device.connections().map(|c| c.id.clone()))
        .collect::<Vec<_>>()
    {
        names.reserve(id);
    }

    let layer = device.first_layer()?.clone();
    let mut report = SynthesisReport::default();
    expand_nodes(&graph, device, names, &layer, &mut report)?;
    connect_edges(&mut graph, device, names, &layer, &mut report)?;
    Ok(report)
}

fn expand_nodes(
    graph: &ConstructionGraph,
    device: &mut Device,
    names: &mut NameGenerator,
    layer: &Layer,
    report: &mut SynthesisReport,
) -> Result<()> {
    let order = graph.dfs_preorder();
    let _guard = span!(Level::INFO, "expanding construction nodes", nodes = order.len()).entered();

    for node_id in order {
        let node = graph
            .node(&node_id)
            .ok_or_else(|| SynthesisError::UnknownNode(node_id.clone()))?;
        let primitive = node
            .primitive()
            .ok_or_else(|| SynthesisError::MissingPrimitive(node_id.clone()))?;

        let materialized = primitive.materialize(&node_id, names, layer);
        let ids = materialized.component_ids();
        tracing::debug!(node = %node_id, produced = ?ids, "expanded construction node");
        match materialized {
            Materialized::Component(c) => device.add_component(c)?,
            Materialized::Netlist(n) => device.merge_netlist(n)?,
        }
        report.produced.insert(node_id, ids);
    }
    Ok(())
}

fn connect_edges(
    graph: &mut ConstructionGraph,
    device: &mut Device,
    names: &mut NameGenerator,
    layer: &Layer,
    report: &mut SynthesisReport,
) -> Result<()> {
    let edges: Vec<(ArcStr, ArcStr)> = graph
        .edges()
        .map(|(s, t)| (s.clone(), t.clone()))
        .collect();
    let _guard = span!(Level::INFO, "connecting construction edges", edges = edges.len()).entered();

    for (src, dst) in edges {
        let src_option = graph
            .node_mut(&src)?
            .pop_output()
            .ok_or_else(|| SynthesisError::ExhaustedConnectingOptions {
                node: src.clone(),
                side: OptionSide::Output,
            })?;
        let dst_option = graph
            .node_mut(&dst)?
            .pop_input()
            .ok_or_else(|| SynthesisError::ExhaustedConnectingOptions {
                node: dst.clone(),
                side: OptionSide::Input,
            })?;

        let sources = resolve_targets(&src_option, &src, &report.produced, names)?;
        let targets = resolve_targets(&dst_option, &dst, &report.produced, names)?;

        let (source, target) = match (sources.as_slice(), targets.as_slice()) {
            ([source], [target]) => (source.clone(), target.clone()),
            (s, t) => {
                return Err(SynthesisError::UnsupportedFanout {
                    kind: Fanout::classify(s.len(), t.len()).unwrap_or(Fanout::Mismatched),
                    from: src,
                    to: dst,
                    sources: s.len(),
                    targets: t.len(),
                })
            }
        };
        let id = names.generate_name(CONNECTION_BASE_NAME);
        tracing::debug!(connection = %id, %source, %target, "creating device connection");
        let mut connection = Connection::new(id.clone(), source, [target]);
        connection.layer = Some(layer.id.clone());
        device.add_connection(connection)?;
        report.connections.push(id);
    }
    Ok(())
}

/// Resolves a connecting option of `node` into concrete port targets.
pub fn resolve_targets(
    option: &ConnectingOption,
    node: &ArcStr,
    produced: &IndexMap<ArcStr, Vec<ArcStr>>,
    names: &NameGenerator,
) -> Result<Vec<Target>> {
    let component = match &option.component_name {
        None => {
            let ids = produced
                .get(node)
                .ok_or_else(|| SynthesisError::UnknownNode(node.clone()))?;
            match ids.as_slice() {
                [id] => id.clone(),
                _ => {
                    return Err(SynthesisError::AmbiguousComponent {
                        node: node.clone(),
                        count: ids.len(),
                    })
                }
            }
        }
        Some(name) => {
            names
                .get_name(node, name)
                .ok_or_else(|| SynthesisError::UnresolvedName {
                    node: node.clone(),
                    name: name.clone(),
                })?
        }
    };

    Ok(option
        .ports
        .iter()
        .map(|port| Target::new(component.clone(), port.clone()))
        .collect())
}
