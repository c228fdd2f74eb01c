//! World positions for waystone anchor blocks.

use crate::dimension::DimensionId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of a waystone's anchor block: dimension plus block coordinates.
///
/// Relocation is not supported; a moved waystone is a remove followed by a
/// fresh placement with a new salt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaystonePos {
    /// Dimension the anchor block lives in.
    pub dimension: DimensionId,
    /// Block X coordinate.
    pub x: i32,
    /// Block Y coordinate.
    pub y: i32,
    /// Block Z coordinate.
    pub z: i32,
}

impl WaystonePos {
    /// Create a position in the given dimension.
    pub const fn new(dimension: DimensionId, x: i32, y: i32, z: i32) -> Self {
        Self { dimension, x, y, z }
    }

    /// Squared euclidean distance to `other`, or `None` when the dimensions
    /// differ (cross-dimension distance is meaningless for cost scaling).
    pub fn distance_sq(&self, other: &WaystonePos) -> Option<f64> {
        if self.dimension != other.dimension {
            return None;
        }
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        let dz = (self.z - other.z) as f64;
        Some(dx * dx + dy * dy + dz * dz)
    }
}

impl fmt::Display for WaystonePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:({}, {}, {})", self.dimension.as_str(), self.x, self.y, self.z)
    }
}
