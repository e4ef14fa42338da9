//! Microfluidic device intermediate representation (DEVIR).
//!
//! A device is a set of layers, a set of components placed on those layers,
//! and a set of connections (channels) between component ports.
//!
//! Like SCIR, the structures in this crate identify components, ports and
//! parameters by strings. Component and connection identities are unique
//! within a device; ports are identified by their label within a component.
//!
//! Positions, spans and port offsets are integers in device units.
//! Port offsets are relative to the lower-left corner of their component.
#![warn(missing_docs)]

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use arcstr::ArcStr;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{span, Level};

pub mod error;


pub use error::{DeviceError, Result};

/// The name of the parameter storing a component's position.
pub const POSITION_PARAM: &str = "position";
/// The name of the parameter storing a component's minimum spacing.
pub const COMPONENT_SPACING_PARAM: &str = "componentSpacing";

/// A parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Param {
    /// An integer parameter.
    Int(i64),
    /// A string parameter.
    String(ArcStr),
    /// A two-dimensional point parameter.
    Point(i64, i64),
}

/// A set of named parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params(HashMap<ArcStr, Param>);

impl Params {
    /// Creates an empty parameter set.
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets `name` to `value`, replacing any previous value.
    #[inline]
    pub fn set(&mut self, name: impl Into<ArcStr>, value: Param) {
        self.0.insert(name.into(), value);
    }

    /// Gets the value of `name`.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Param> {
        self.0.get(name)
    }

    /// Returns `true` if `name` is set.
    #[inline]
    pub fn exists(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Gets the value of `name` if it is an integer.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            Param::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Gets the value of `name` if it is a point.
    pub fn get_point(&self, name: &str) -> Option<(i64, i64)> {
        match self.get(name)? {
            Param::Point(x, y) => Some((*x, *y)),
            _ => None,
        }
    }
}

/// Layer kinds.
#[derive(Debug, Copy, Clone, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum LayerKind {
    /// A flow layer carrying fluid.
    #[default]
    Flow,
    /// A control layer carrying valve actuation.
    Control,
}

/// A device layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    /// The identity of the layer.
    pub id: ArcStr,
    /// The kind of the layer.
    pub kind: LayerKind,
}

impl Layer {
    /// Creates a new layer.
    pub fn new(id: impl Into<ArcStr>, kind: LayerKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

/// A port on a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// The label identifying the port within its component.
    pub label: ArcStr,
    /// The layer the port sits on.
    pub layer: Option<ArcStr>,
    /// The x-offset from the component's lower-left corner.
    pub x: i64,
    /// The y-offset from the component's lower-left corner.
    pub y: i64,
}

impl Port {
    /// Creates a new port at the given relative offset.
    pub fn new(label: impl Into<ArcStr>, x: i64, y: i64) -> Self {
        Self {
            label: label.into(),
            layer: None,
            x,
            y,
        }
    }
}

/// A device component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// The identity of the component.
    pub id: ArcStr,
    /// The kind of entity this component instantiates (e.g. `MIXER`).
    pub entity: ArcStr,
    /// The layers this component occupies.
    pub layers: Vec<ArcStr>,
    /// The horizontal extent of the component.
    pub x_span: i64,
    /// The vertical extent of the component.
    pub y_span: i64,
    /// Named parameters, including the component position.
    pub params: Params,
    /// The ports of the component.
    pub ports: Vec<Port>,
}

impl Component {
    /// Creates a component with no ports positioned at the origin.
    pub fn new(id: impl Into<ArcStr>, entity: impl Into<ArcStr>, x_span: i64, y_span: i64) -> Self {
        Self {
            id: id.into(),
            entity: entity.into(),
            layers: Vec::new(),
            x_span,
            y_span,
            params: Params::new(),
            ports: Vec::new(),
        }
    }

    /// Adds a port to the component.
    pub fn with_port(mut self, port: Port) -> Self {
        self.ports.push(port);
        self
    }

    /// Sets the position of the component.
    pub fn with_position(mut self, x: i64, y: i64) -> Self {
        self.set_position(x, y);
        self
    }

    /// The position of the component's lower-left corner.
    ///
    /// Components without a `position` parameter sit at the origin.
    pub fn position(&self) -> (i64, i64) {
        self.params.get_point(POSITION_PARAM).unwrap_or((0, 0))
    }

    /// Sets the `position` parameter.
    #[inline]
    pub fn set_position(&mut self, x: i64, y: i64) {
        self.params.set(POSITION_PARAM, Param::Point(x, y));
    }

    /// Gets a port by label.
    pub fn port(&self, label: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.label == label)
    }
}

/// A connection endpoint: a component and, optionally, one of its ports.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// The identity of the component.
    pub component: ArcStr,
    /// The label of the port, if the endpoint names one.
    pub port: Option<ArcStr>,
}

impl Target {
    /// Creates a target referring to `port` on `component`.
    pub fn new(component: impl Into<ArcStr>, port: impl Into<ArcStr>) -> Self {
        Self {
            component: component.into(),
            port: Some(port.into()),
        }
    }

    /// Creates a target referring to `component` as a whole.
    pub fn component(component: impl Into<ArcStr>) -> Self {
        Self {
            component: component.into(),
            port: None,
        }
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.port {
            Some(port) => write!(f, "{}.{}", self.component, port),
            None => write!(f, "{}", self.component),
        }
    }
}

/// An ordered sequence of `(x, y)` waypoints.
pub type WaypointPath = Vec<(i64, i64)>;

/// A connection from one source to one or more sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// The identity of the connection.
    pub id: ArcStr,
    /// The kind of entity this connection instantiates (e.g. `CHANNEL`).
    pub entity: ArcStr,
    /// The layer the connection is routed on.
    pub layer: Option<ArcStr>,
    /// The source endpoint.
    pub source: Target,
    /// The sink endpoints, in order.
    pub sinks: Vec<Target>,
    /// Named parameters.
    pub params: Params,
    paths: Vec<WaypointPath>,
}

impl Connection {
    /// Creates a connection with no routed paths.
    pub fn new(
        id: impl Into<ArcStr>,
        source: Target,
        sinks: impl IntoIterator<Item = Target>,
    ) -> Self {
        Self {
            id: id.into(),
            entity: arcstr::literal!("CHANNEL"),
            layer: None,
            source,
            sinks: sinks.into_iter().collect(),
            params: Params::new(),
            paths: Vec::new(),
        }
    }

    /// The routed waypoint paths, one per routed segment.
    #[inline]
    pub fn paths(&self) -> &[WaypointPath] {
        &self.paths
    }

    /// Replaces the routed waypoint paths.
    #[inline]
    pub fn set_paths(&mut self, paths: Vec<WaypointPath>) {
        self.paths = paths;
    }

    /// Iterates over the source followed by every sink.
    pub fn endpoints(&self) -> impl Iterator<Item = &Target> {
        std::iter::once(&self.source).chain(self.sinks.iter())
    }
}

/// A self-contained set of components and connections.
///
/// Netlists are merged into a [`Device`] with [`Device::merge_netlist`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Netlist {
    /// The components of the netlist.
    pub components: Vec<Component>,
    /// The connections of the netlist.
    pub connections: Vec<Connection>,
}

/// A microfluidic device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    name: ArcStr,
    layers: Vec<Layer>,
    components: IndexMap<ArcStr, Component>,
    connections: IndexMap<ArcStr, Connection>,
    /// Device-level parameters.
    pub params: Params,
}

impl Device {
    /// Creates a new, empty device.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            layers: Vec::new(),
            components: IndexMap::new(),
            connections: IndexMap::new(),
            params: Params::new(),
        }
    }

    /// The name of the device.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Adds a layer to the device.
    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// The layers of the device, in declaration order.
    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// The first declared layer.
    pub fn first_layer(&self) -> Result<&Layer> {
        self.layers
            .first()
            .ok_or_else(|| DeviceError::NoLayers(self.name.clone()))
    }

    /// Adds a component to the device.
    pub fn add_component(&mut self, component: Component) -> Result<()> {
        if self.components.contains_key(&component.id) {
            return Err(DeviceError::DuplicateComponent(component.id));
        }
        self.components.insert(component.id.clone(), component);
        Ok(())
    }

    /// Adds a connection to the device.
    pub fn add_connection(&mut self, connection: Connection) -> Result<()> {
        if self.connections.contains_key(&connection.id) {
            return Err(DeviceError::DuplicateConnection(connection.id));
        }
        self.connections.insert(connection.id.clone(), connection);
        Ok(())
    }

    /// Merges the given netlist into this device.
    ///
    /// Either every entity of the netlist is added, or, if any identity
    /// collides with an existing entity, none is.
    pub fn merge_netlist(&mut self, netlist: Netlist) -> Result<()> {
        let _guard = span!(
            Level::DEBUG,
            "merging netlist",
            device = %self.name,
            components = netlist.components.len(),
            connections = netlist.connections.len()
        )
        .entered();

        let mut seen = std::collections::HashSet::new();
        for c in netlist.components.iter() {
            if self.components.contains_key(&c.id) || !seen.insert(&c.id) {
                return Err(DeviceError::DuplicateComponent(c.id.clone()));
            }
        }
        let mut seen = std::collections::HashSet::new();
        for c in netlist.connections.iter() {
            if self.connections.contains_key(&c.id) || !seen.insert(&c.id) {
                return Err(DeviceError::DuplicateConnection(c.id.clone()));
            }
        }

        for c in netlist.components {
            self.components.insert(c.id.clone(), c);
        }
        for c in netlist.connections {
            self.connections.insert(c.id.clone(), c);
        }
        Ok(())
    }

    /// Gets the component with the given identity.
    #[inline]
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.get(id)
    }

    /// Gets the component with the given identity, mutably.
    #[inline]
    pub fn component_mut(&mut self, id: &str) -> Option<&mut Component> {
        self.components.get_mut(id)
    }

    /// Iterates over the components, in insertion order.
    #[inline]
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Gets the connection with the given identity.
    #[inline]
    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.connections.get(id)
    }

    /// Gets the connection with the given identity, mutably.
    #[inline]
    pub fn connection_mut(&mut self, id: &str) -> Option<&mut Connection> {
        self.connections.get_mut(id)
    }

    /// Iterates over the connections, in insertion order.
    #[inline]
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }
}
