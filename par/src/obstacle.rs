//! Placement obstacles derived from cells.

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::grid::Vertex;

/// An axis-aligned rectangle routes must avoid.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    /// The x-coordinate of the lower-left corner.
    pub x: i64,
    /// The y-coordinate of the lower-left corner.
    pub y: i64,
    /// The horizontal extent.
    pub x_span: i64,
    /// The vertical extent.
    pub y_span: i64,
}

impl Obstacle {
    /// The candidate obstacle for a cell.
    ///
    /// The origin moves up and right by one grid unit and each span shrinks
    /// by one, so the upper-right corner is unchanged.
    pub fn from_cell(cell: &Cell) -> Self {
        Self {
            x: cell.x + 1,
            y: cell.y + 1,
            x_span: cell.x_span - 1,
            y_span: cell.y_span - 1,
        }
    }

    /// Returns `true` if `v` lies in the obstacle, edges included.
    pub fn contains(&self, v: Vertex) -> bool {
        v.x >= self.x && v.x <= self.x + self.x_span && v.y >= self.y && v.y <= self.y + self.y_span
    }
}

/// Builds one obstacle per cell, skipping any that would cover an endpoint.
pub fn build_obstacles<'a>(
    cells: impl IntoIterator<Item = &'a Cell>,
    endpoints: &[Vertex],
) -> Vec<Obstacle> {
    cells
        .into_iter()
        .filter_map(|cell| {
            let obstacle = Obstacle::from_cell(cell);
            match endpoints.iter().find(|v| obstacle.contains(**v)) {
                Some(v) => {
                    tracing::debug!(cell = %cell.id, endpoint = ?v, "obstacle covers a net endpoint; skipping");
                    None
                }
                None => Some(obstacle),
            }
        })
        .collect()
}
