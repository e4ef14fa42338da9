//! Place-and-route problem preparation for microfluidic devices.
//!
//! A [`Layout`] imports a [`devir::Device`] onto an integer routing grid,
//! derives obstacles and route requests, hands the problem to an
//! [`Engine`](engine::Engine), and writes the solved positions and paths
//! back onto the device.
//!
//! ```
//! use devir::{Component, Connection, Device, Port, Target};
//! use par::config::{BackendKind, PnrConfig};
//! use par::Layout;
//!
//! let mut device = Device::new("chip");
//! device
//!     .add_component(
//!         Component::new("c1", "MIXER", 2000, 1000).with_port(Port::new("out", 2000, 500)),
//!     )
//!     .unwrap();
//! device
//!     .add_component(
//!         Component::new("c2", "MIXER", 2000, 1000).with_port(Port::new("in", 0, 500)),
//!     )
//!     .unwrap();
//! device
//!     .add_connection(Connection::new(
//!         "ch1",
//!         Target::new("c1", "out"),
//!         [Target::new("c2", "in")],
//!     ))
//!     .unwrap();
//!
//! let config = PnrConfig {
//!     backend: BackendKind::FixedGrid,
//!     fixed_cell_size: 10,
//!     ..Default::default()
//! };
//! let report = Layout::new(config).unwrap().run(&mut device, None).unwrap();
//! assert!(report.issues.is_empty());
//! assert_eq!(device.component("c2").unwrap().position(), (10, 0));
//! ```
#![warn(missing_docs)]

pub mod cell;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
mod import;
pub mod issues;
mod layout;
pub mod net;
pub mod obstacle;
mod route;

pub use error::{LayoutError, Result};
pub use layout::{Bounds, Layout, LayoutReport};
