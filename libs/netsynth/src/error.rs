//! Netlist synthesis error types.

use std::fmt::{Display, Formatter};

use arcstr::ArcStr;
use devir::DeviceError;

/// The [`SynthesisError`] result type.
pub type Result<T> = std::result::Result<T, SynthesisError>;

/// Which side of a construction node a connecting option was taken from.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum OptionSide {
    /// The input options of the edge's target node.
    Input,
    /// The output options of the edge's source node.
    Output,
}

impl Display for OptionSide {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Input => write!(f, "input"),
            Self::Output => write!(f, "output"),
        }
    }
}

/// The shape of an unsupported edge.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum Fanout {
    /// N sources to N targets, with N > 1.
    Bus,
    /// One source to many targets.
    OneToMany,
    /// Many sources to one target.
    ManyToOne,
    /// Unequal counts, or an option that named no ports.
    Mismatched,
}

impl Fanout {
    /// Classifies an edge with the given numbers of source and target endpoints.
    ///
    /// Returns [`None`] for the supported one-to-one case.
    pub fn classify(sources: usize, targets: usize) -> Option<Self> {
        match (sources, targets) {
            (1, 1) => None,
            (n, m) if n == m && n > 1 => Some(Self::Bus),
            (1, m) if m > 1 => Some(Self::OneToMany),
            (n, 1) if n > 1 => Some(Self::ManyToOne),
            _ => Some(Self::Mismatched),
        }
    }
}

impl Display for Fanout {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Bus => write!(f, "bus targets"),
            Self::OneToMany => write!(f, "multiple targets"),
            Self::ManyToOne => write!(f, "multiple sources"),
            Self::Mismatched => write!(f, "mismatched targets"),
        }
    }
}

/// A fatal error encountered while synthesizing a netlist.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// A construction node reached during traversal has no bound primitive.
    #[error("construction node `{0}` has no primitive")]
    MissingPrimitive(ArcStr),
    /// An edge needs a connecting option that the node no longer has.
    #[error("construction node `{node}` has no {side} connecting options left")]
    ExhaustedConnectingOptions {
        /// The construction node.
        node: ArcStr,
        /// The side the option was requested from.
        side: OptionSide,
    },
    /// A self-referencing option resolved against more than one produced entity.
    #[error("construction node `{node}` produced {count} components; cannot pick one")]
    AmbiguousComponent {
        /// The construction node.
        node: ArcStr,
        /// The number of produced entities.
        count: usize,
    },
    /// An edge did not resolve to exactly one source and one target.
    #[error("{kind} not implemented: edge `{from}` -> `{to}` resolved to {sources} source(s) and {targets} target(s)")]
    UnsupportedFanout {
        /// The unsupported edge shape.
        kind: Fanout,
        /// The edge's source node.
        from: ArcStr,
        /// The edge's target node.
        to: ArcStr,
        /// The number of resolved source endpoints.
        sources: usize,
        /// The number of resolved target endpoints.
        targets: usize,
    },
    /// The construction graph contains a cycle through the given node.
    #[error("construction graph contains a cycle through `{0}`")]
    Cycle(ArcStr),
    /// An edge or lookup referenced a node that is not in the graph.
    #[error("no construction node `{0}`")]
    UnknownNode(ArcStr),
    /// A component-name hint could not be resolved in the node's naming scope.
    #[error("could not resolve component `{name}` expanded by construction node `{node}`")]
    UnresolvedName {
        /// The construction node whose scope was searched.
        node: ArcStr,
        /// The hinted component name.
        name: ArcStr,
    },
    /// The target device rejected an entity.
    #[error(transparent)]
    Device(#[from] DeviceError),
}
