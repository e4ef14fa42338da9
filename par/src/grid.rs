//! Quantization of device coordinates onto the routing grid.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// An integer coordinate on the routing grid.
#[derive(
    Debug, Copy, Clone, Default, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Vertex {
    /// The x-coordinate.
    pub x: i64,
    /// The y-coordinate.
    pub y: i64,
}

impl Vertex {
    /// Creates a new [`Vertex`] from (x, y) coordinates.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add<Vertex> for Vertex {
    type Output = Self;
    fn add(self, rhs: Vertex) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl From<Vertex> for (i64, i64) {
    #[inline]
    fn from(value: Vertex) -> Self {
        (value.x, value.y)
    }
}

/// Divides device units by a fixed scale factor (`lambda`).
///
/// All arithmetic is exact integer arithmetic.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct GridQuantizer {
    lambda: i64,
}

impl GridQuantizer {
    /// Creates a quantizer with `lambda` device units per grid unit.
    ///
    /// # Panics
    ///
    /// Panics if `lambda` is not positive.
    pub fn new(lambda: i64) -> Self {
        assert!(lambda > 0, "grid scale factor must be positive");
        Self { lambda }
    }

    /// The scale factor.
    #[inline]
    pub fn lambda(&self) -> i64 {
        self.lambda
    }

    /// `value / lambda`, rounded to the nearest integer with ties to even.
    ///
    /// # Examples
    ///
    /// ```
    /// # use par::grid::GridQuantizer;
    /// let q = GridQuantizer::new(500);
    /// assert_eq!(q.round(1000), 2);
    /// assert_eq!(q.round(1250), 2);
    /// assert_eq!(q.round(1750), 4);
    /// assert_eq!(q.round(1300), 3);
    /// ```
    pub fn round(&self, value: i64) -> i64 {
        let q = value.div_euclid(self.lambda);
        let r = value.rem_euclid(self.lambda);
        match (2 * r).cmp(&self.lambda) {
            Ordering::Less => q,
            Ordering::Greater => q + 1,
            Ordering::Equal => q + (q & 1),
        }
    }

    /// `value / lambda`, rounded towards negative infinity.
    ///
    /// # Examples
    ///
    /// ```
    /// # use par::grid::GridQuantizer;
    /// let q = GridQuantizer::new(500);
    /// assert_eq!(q.floor(999), 1);
    /// assert_eq!(q.floor(-1), -1);
    /// ```
    #[inline]
    pub fn floor(&self, value: i64) -> i64 {
        value.div_euclid(self.lambda)
    }

    /// Rounds both coordinates of a point.
    #[inline]
    pub fn round_point(&self, (x, y): (i64, i64)) -> Vertex {
        Vertex::new(self.round(x), self.round(y))
    }

    /// Floors both coordinates of a point.
    #[inline]
    pub fn floor_point(&self, (x, y): (i64, i64)) -> Vertex {
        Vertex::new(self.floor(x), self.floor(y))
    }
}
