//! Primitives: the building blocks bound to construction nodes.

use std::collections::HashMap;

use arcstr::ArcStr;
use devir::{Component, Connection, Layer, Netlist, Params, Port, Target};
use serde::{Deserialize, Serialize};
use uniquify::NameGenerator;

/// A primitive that produces exactly one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentPrimitive {
    /// The entity kind of the produced component (e.g. `MIXER`).
    pub entity: ArcStr,
    /// The base name used to generate the component identity.
    pub base_name: ArcStr,
    /// The horizontal extent of the produced component.
    pub x_span: i64,
    /// The vertical extent of the produced component.
    pub y_span: i64,
    /// The ports of the produced component.
    pub ports: Vec<Port>,
    /// Parameters copied onto the produced component.
    pub params: Params,
}

impl ComponentPrimitive {
    /// Creates a primitive with no ports or parameters.
    pub fn new(
        entity: impl Into<ArcStr>,
        base_name: impl Into<ArcStr>,
        x_span: i64,
        y_span: i64,
    ) -> Self {
        Self {
            entity: entity.into(),
            base_name: base_name.into(),
            x_span,
            y_span,
            ports: Vec::new(),
            params: Params::new(),
        }
    }

    /// Adds a port to the produced component.
    pub fn with_port(mut self, port: Port) -> Self {
        self.ports.push(port);
        self
    }

    /// Instantiates the component on `layer` with a freshly generated identity.
    pub fn materialize(&self, names: &mut NameGenerator, layer: &Layer) -> Component {
        let id = names.generate_name(&self.base_name);
        let mut component = Component::new(id, self.entity.clone(), self.x_span, self.y_span);
        component.layers.push(layer.id.clone());
        component.params = self.params.clone();
        component.ports = self
            .ports
            .iter()
            .cloned()
            .map(|mut p| {
                p.layer = Some(layer.id.clone());
                p
            })
            .collect();
        component
    }
}

/// A primitive that produces a self-contained sub-netlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetlistPrimitive {
    /// The template netlist, using template-local names.
    pub template: Netlist,
}

impl NetlistPrimitive {
    /// Creates a primitive from a template netlist.
    pub fn new(template: Netlist) -> Self {
        Self { template }
    }

    /// Instantiates a renamed copy of the template on `layer`.
    ///
    /// Every component and connection gets a fresh identity; the renames are
    /// recorded in `names` under `scope` so that template-local names can be
    /// resolved later. Connection endpoints that refer to template components
    /// are rewritten to the new identities.
    pub fn materialize(&self, scope: &str, names: &mut NameGenerator, layer: &Layer) -> Netlist {
        let mut renamed: HashMap<ArcStr, ArcStr> = HashMap::new();

        let components: Vec<Component> = self
            .template
            .components
            .iter()
            .map(|c| {
                let id = names.rename(scope, &c.id, base_name(&c.id));
                renamed.insert(c.id.clone(), id.clone());
                let mut c = c.clone();
                c.id = id;
                c.layers = vec![layer.id.clone()];
                for port in c.ports.iter_mut() {
                    port.layer = Some(layer.id.clone());
                }
                c
            })
            .collect();

        let rename_target = |t: &Target| Target {
            component: renamed
                .get(&t.component)
                .cloned()
                .unwrap_or_else(|| t.component.clone()),
            port: t.port.clone(),
        };

        let connections: Vec<Connection> = self
            .template
            .connections
            .iter()
            .map(|c| {
                let mut conn = Connection::new(
                    names.rename(scope, &c.id, base_name(&c.id)),
                    rename_target(&c.source),
                    c.sinks.iter().map(rename_target),
                );
                conn.entity = c.entity.clone();
                conn.params = c.params.clone();
                conn.layer = Some(layer.id.clone());
                conn
            })
            .collect();

        Netlist {
            components,
            connections,
        }
    }
}

/// The name with any trailing digits removed, so `mixer2` renames to `mixerN`.
fn base_name(name: &str) -> &str {
    let trimmed = name.trim_end_matches(|c: char| c.is_ascii_digit());
    if trimmed.is_empty() {
        name
    } else {
        trimmed
    }
}

/// A reusable building block bound to a construction node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Primitive {
    /// Produces one component.
    Component(ComponentPrimitive),
    /// Produces a sub-netlist merged into the target device.
    Netlist(NetlistPrimitive),
}

/// The entities produced by materializing a [`Primitive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Materialized {
    /// A single component.
    Component(Component),
    /// A sub-netlist.
    Netlist(Netlist),
}

impl Materialized {
    /// The identities of the produced components, in order.
    pub fn component_ids(&self) -> Vec<ArcStr> {
        match self {
            Self::Component(c) => vec![c.id.clone()],
            Self::Netlist(n) => n.components.iter().map(|c| c.id.clone()).collect(),
        }
    }
}

impl Primitive {
    /// Instantiates the primitive on `layer`.
    ///
    /// `scope` is the identity of the construction node being expanded;
    /// it disambiguates the names of sub-netlist entities.
    pub fn materialize(&self, scope: &str, names: &mut NameGenerator, layer: &Layer) -> Materialized {
        match self {
            Self::Component(p) => Materialized::Component(p.materialize(names, layer)),
            Self::Netlist(p) => Materialized::Netlist(p.materialize(scope, names, layer)),
        }
    }
}

impl From<ComponentPrimitive> for Primitive {
    #[inline]
    fn from(value: ComponentPrimitive) -> Self {
        Self::Component(value)
    }
}

impl From<NetlistPrimitive> for Primitive {
    #[inline]
    fn from(value: NetlistPrimitive) -> Self {
        Self::Netlist(value)
    }
}
