use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Integer grid address. Rows run along world Z, columns along world X.
///
/// Signed so that rounding a world position just outside the grid still
/// yields a representable (out-of-bounds) address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub row: i32,
    pub col: i32,
}

impl CellCoord {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Inclusive rectangle of grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRect {
    pub row_min: i32,
    pub row_max: i32,
    pub col_min: i32,
    pub col_max: i32,
}

impl CellRect {
    pub fn new(rows: (i32, i32), cols: (i32, i32)) -> Self {
        Self {
            row_min: rows.0,
            row_max: rows.1,
            col_min: cols.0,
            col_max: cols.1,
        }
    }

    pub fn contains(&self, cell: CellCoord) -> bool {
        (self.row_min..=self.row_max).contains(&cell.row)
            && (self.col_min..=self.col_max).contains(&cell.col)
    }

    /// Number of cells covered. Zero for an inverted rectangle.
    pub fn area(&self) -> usize {
        let rows = (self.row_max - self.row_min + 1).max(0) as usize;
        let cols = (self.col_max - self.col_min + 1).max(0) as usize;
        rows * cols
    }
}

/// Index of a placed entity inside its layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Unique identifier for an interactive session opened on the special entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Half-line used for picking. `direction` is expected to be normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}
