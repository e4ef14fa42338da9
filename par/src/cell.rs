//! Placement cells and their terminals.

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::grid::Vertex;

/// A connection point on a cell.
///
/// Terminals are created with an offset relative to their cell and converted
/// to an absolute grid position once the cell origin is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terminal {
    /// The port label this terminal was created from.
    pub label: ArcStr,
    /// The x-coordinate, relative until made absolute.
    pub x: i64,
    /// The y-coordinate, relative until made absolute.
    pub y: i64,
    absolute: bool,
}

impl Terminal {
    /// Creates a terminal at an offset relative to its cell.
    pub fn new(label: impl Into<ArcStr>, x: i64, y: i64) -> Self {
        Self {
            label: label.into(),
            x,
            y,
            absolute: false,
        }
    }

    /// Converts the relative offset into an absolute position.
    ///
    /// Only the first call has an effect.
    pub fn compute_absolute_position(&mut self, origin: Vertex) {
        if self.absolute {
            tracing::warn!(terminal = %self.label, "terminal position is already absolute");
            return;
        }
        self.x += origin.x;
        self.y += origin.y;
        self.absolute = true;
    }

    /// Returns `true` once the position has been made absolute.
    #[inline]
    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    /// The terminal position as a grid vertex.
    #[inline]
    pub fn vertex(&self) -> Vertex {
        Vertex::new(self.x, self.y)
    }
}

/// A placement unit on the routing grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The identity of the device component this cell stands for.
    pub id: ArcStr,
    /// The x-coordinate of the lower-left corner.
    pub x: i64,
    /// The y-coordinate of the lower-left corner.
    pub y: i64,
    /// The horizontal extent.
    pub x_span: i64,
    /// The vertical extent.
    pub y_span: i64,
    /// The minimum spacing to other cells.
    pub spacing: i64,
    /// The terminals of the cell, in port order.
    pub terminals: Vec<Terminal>,
}

impl Cell {
    /// The lower-left corner of the cell.
    #[inline]
    pub fn origin(&self) -> Vertex {
        Vertex::new(self.x, self.y)
    }

    /// Finds a terminal by port label, returning its index and value.
    pub fn terminal(&self, label: &str) -> Option<(usize, &Terminal)> {
        self.terminals
            .iter()
            .enumerate()
            .find(|(_, t)| t.label == label)
    }
}
