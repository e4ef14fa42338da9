//! Layout error types.

use arcstr::ArcStr;

use crate::engine::EngineError;

/// The [`LayoutError`] result type.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// A fatal layout error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A deliberately unimplemented mode was requested.
    #[error("not supported: {0}")]
    NotSupported(&'static str),
    /// The configuration is invalid.
    #[error("invalid layout configuration: {0}")]
    InvalidConfig(String),
    /// The placement and routing engine failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// The configuration selects the external engine, but none was supplied.
    #[error("the external placement and routing engine was selected but not provided")]
    BackendUnavailable,
    /// The device has no component for a placed cell.
    #[error("device has no component `{0}`")]
    MissingComponent(ArcStr),
    /// The device has no connection for a routed net.
    #[error("device has no connection `{0}`")]
    MissingConnection(ArcStr),
    /// An engine solution placed a cell that is not part of the problem.
    #[error("engine solution places unknown cell `{0}`")]
    UnknownCell(ArcStr),
    /// An engine solution routed a route that is not part of the problem.
    #[error("engine solution routes unknown route {index} of net `{net}`")]
    UnknownRoute {
        /// The net identity.
        net: ArcStr,
        /// The index of the route within the net.
        index: usize,
    },
}
