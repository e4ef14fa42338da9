//! Device IR error types.

use arcstr::ArcStr;

/// The [`DeviceError`] result type.
pub type Result<T> = std::result::Result<T, DeviceError>;

/// An error manipulating a [`Device`](crate::Device).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// A component with the same identity already exists.
    #[error("duplicate component `{0}`")]
    DuplicateComponent(ArcStr),
    /// A connection with the same identity already exists.
    #[error("duplicate connection `{0}`")]
    DuplicateConnection(ArcStr),
    /// The device has no layers, so nothing can be placed on it.
    #[error("device `{0}` has no layers")]
    NoLayers(ArcStr),
}
