//! Position capability trait and the planar reference implementation.

use serde::{Deserialize, Serialize};

use crate::errors::{DesError, ErrorInfo};

/// Capability contract for simulation positions.
///
/// Every operation that combines positions takes and returns `Self`, so an
/// environment parameterized over `P: Position` is closed under positional
/// arithmetic regardless of the concrete space chosen by the caller.
pub trait Position: Sized + Clone + PartialEq + std::fmt::Debug + Send + Sync {
    /// Number of dimensions of the underlying space.
    fn dimensions() -> usize;

    /// Builds a position from raw coordinates.
    ///
    /// Fails when the slice length does not match [`Position::dimensions`].
    fn from_coordinates(coordinates: &[f64]) -> Result<Self, DesError>;

    /// Returns the coordinates of this position in declaration order.
    fn coordinates(&self) -> Vec<f64>;

    /// Componentwise sum with another position.
    fn plus(&self, other: &Self) -> Self;

    /// Componentwise difference with another position.
    fn minus(&self, other: &Self) -> Self;

    /// Euclidean distance to another position.
    fn distance_to(&self, other: &Self) -> f64;
}

/// Planar Euclidean position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Euclidean2D {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Euclidean2D {
    /// Creates a new planar position.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Position for Euclidean2D {
    fn dimensions() -> usize {
        2
    }

    fn from_coordinates(coordinates: &[f64]) -> Result<Self, DesError> {
        if coordinates.len() != 2 {
            return Err(DesError::Environment(
                ErrorInfo::new(
                    "position-arity",
                    "planar positions require exactly two coordinates",
                )
                .with_context("provided", coordinates.len().to_string()),
            ));
        }
        Ok(Self::new(coordinates[0], coordinates[1]))
    }

    fn coordinates(&self) -> Vec<f64> {
        vec![self.x, self.y]
    }

    fn plus(&self, other: &Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    fn minus(&self, other: &Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}
