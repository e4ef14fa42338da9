//! Construction graphs.

use std::collections::HashMap;

use arcstr::ArcStr;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthesisError};
use crate::primitive::Primitive;

/// A consumable connection slot exposed by a construction node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectingOption {
    /// The name of a component inside the node's expanded sub-netlist.
    ///
    /// [`None`] refers to the single entity the node itself produced.
    pub component_name: Option<ArcStr>,
    /// The ports the connection attaches to, in order.
    pub ports: Vec<ArcStr>,
}

impl ConnectingOption {
    /// Creates an option referring to the node's own produced entity.
    pub fn new<P: Into<ArcStr>>(ports: impl IntoIterator<Item = P>) -> Self {
        Self {
            component_name: None,
            ports: ports.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates an option referring to a named component of an expanded sub-netlist.
    pub fn named<P: Into<ArcStr>>(
        component_name: impl Into<ArcStr>,
        ports: impl IntoIterator<Item = P>,
    ) -> Self {
        Self {
            component_name: Some(component_name.into()),
            ports: ports.into_iter().map(Into::into).collect(),
        }
    }
}

/// A structural role in a construction graph, filled by a [`Primitive`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructionNode {
    id: ArcStr,
    primitive: Option<Primitive>,
    input_options: Vec<ConnectingOption>,
    output_options: Vec<ConnectingOption>,
}

impl ConstructionNode {
    /// Creates a node with no primitive and no connecting options.
    pub fn new(id: impl Into<ArcStr>) -> Self {
        Self {
            id: id.into(),
            primitive: None,
            input_options: Vec::new(),
            output_options: Vec::new(),
        }
    }

    /// Binds `primitive` to this node.
    pub fn with_primitive(mut self, primitive: impl Into<Primitive>) -> Self {
        self.primitive = Some(primitive.into());
        self
    }

    /// Declares an input connecting option.
    pub fn with_input(mut self, option: ConnectingOption) -> Self {
        self.input_options.push(option);
        self
    }

    /// Declares an output connecting option.
    pub fn with_output(mut self, option: ConnectingOption) -> Self {
        self.output_options.push(option);
        self
    }

    /// The identity of the node.
    #[inline]
    pub fn id(&self) -> &ArcStr {
        &self.id
    }

    /// The primitive bound to this node, if any.
    #[inline]
    pub fn primitive(&self) -> Option<&Primitive> {
        self.primitive.as_ref()
    }

    /// The remaining input options.
    #[inline]
    pub fn input_options(&self) -> &[ConnectingOption] {
        &self.input_options
    }

    /// The remaining output options.
    #[inline]
    pub fn output_options(&self) -> &[ConnectingOption] {
        &self.output_options
    }

    /// Consumes the most recently declared input option.
    #[inline]
    pub(crate) fn pop_input(&mut self) -> Option<ConnectingOption> {
        self.input_options.pop()
    }

    /// Consumes the most recently declared output option.
    #[inline]
    pub(crate) fn pop_output(&mut self) -> Option<ConnectingOption> {
        self.output_options.pop()
    }
}

/// A directed graph of [`ConstructionNode`]s.
///
/// Nodes and edges are kept in insertion order.
/// Parallel edges are allowed; each consumes its own pair of connecting options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstructionGraph {
    nodes: IndexMap<ArcStr, ConstructionNode>,
    successors: IndexMap<ArcStr, Vec<ArcStr>>,
}

#[derive(Copy, Clone, Eq, PartialEq)]
enum Mark {
    Open,
    Done,
}

impl ConstructionGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a node, replacing any node with the same identity.
    pub fn add_node(&mut self, node: ConstructionNode) {
        self.successors.entry(node.id.clone()).or_default();
        self.nodes.insert(node.id.clone(), node);
    }

    /// Adds an edge from `source` to `target`.
    ///
    /// Both nodes must already be in the graph.
    pub fn add_edge(&mut self, source: &str, target: &str) -> Result<()> {
        let target = self
            .nodes
            .get_key_value(target)
            .map(|(k, _)| k.clone())
            .ok_or_else(|| SynthesisError::UnknownNode(target.into()))?;
        self.successors
            .get_mut(source)
            .ok_or_else(|| SynthesisError::UnknownNode(source.into()))?
            .push(target);
        Ok(())
    }

    /// Gets the node with the given identity.
    #[inline]
    pub fn node(&self, id: &str) -> Option<&ConstructionNode> {
        self.nodes.get(id)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: &str) -> Result<&mut ConstructionNode> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| SynthesisError::UnknownNode(id.into()))
    }

    /// Iterates over the nodes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &ConstructionNode> {
        self.nodes.values()
    }

    fn successors(&self, id: &str) -> &[ArcStr] {
        self.successors.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterates over `(source, target)` edges.
    ///
    /// Edges are grouped by source node in node insertion order,
    /// then listed in the order they were added.
    pub fn edges(&self) -> impl Iterator<Item = (&ArcStr, &ArcStr)> {
        self.successors
            .iter()
            .flat_map(|(src, dsts)| dsts.iter().map(move |dst| (src, dst)))
    }

    /// Returns every node in depth-first preorder.
    ///
    /// Roots are taken in node insertion order; each node is visited once.
    pub fn dfs_preorder(&self) -> Vec<ArcStr> {
        let mut visited = IndexSet::with_capacity(self.nodes.len());
        for root in self.nodes.keys() {
            if !visited.insert(root.clone()) {
                continue;
            }
            let mut stack = vec![(root, 0usize)];
            while let Some((node, idx)) = stack.last_mut() {
                match self.successors(node).get(*idx) {
                    Some(next) => {
                        *idx += 1;
                        if visited.insert(next.clone()) {
                            stack.push((next, 0));
                        }
                    }
                    None => {
                        stack.pop();
                    }
                }
            }
        }
        visited.into_iter().collect()
    }

    /// Checks that the graph has no directed cycles.
    ///
    /// Returns [`SynthesisError::Cycle`] naming a node on the first cycle found.
    pub fn ensure_acyclic(&self) -> Result<()> {
        let mut marks: HashMap<&ArcStr, Mark> = HashMap::with_capacity(self.nodes.len());
        for root in self.nodes.keys() {
            if marks.contains_key(root) {
                continue;
            }
            marks.insert(root, Mark::Open);
            let mut stack = vec![(root, 0usize)];
            while let Some((node, idx)) = stack.last_mut() {
                let node: &ArcStr = *node;
                match self.successors(node).get(*idx) {
                    Some(next) => {
                        *idx += 1;
                        match marks.get(next) {
                            Some(Mark::Open) => return Err(SynthesisError::Cycle(next.clone())),
                            Some(Mark::Done) => {}
                            None => {
                                marks.insert(next, Mark::Open);
                                stack.push((next, 0));
                            }
                        }
                    }
                    None => {
                        marks.insert(node, Mark::Done);
                        stack.pop();
                    }
                }
            }
        }
        Ok(())
    }
}
