use glam::Vec3;
use neoncity_common::{CellCoord, CellRect};
use serde::{Deserialize, Serialize};

/// Errors raised while validating layout parameters. Always fatal: they are
/// reported before any placement work starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("grid must have at least one row and one column (got {rows}x{cols})")]
    EmptyGrid { rows: u32, cols: u32 },
    #[error("spacing must be a positive finite number (got {0})")]
    InvalidSpacing(f32),
    #[error("building dimensions must be positive and finite (width {width}, height {height})")]
    InvalidBuilding { width: f32, height: f32 },
    #[error("void region {region:?} lies outside the {rows}x{cols} grid")]
    VoidOutOfBounds { region: CellRect, rows: u32, cols: u32 },
    #[error("void region {0:?} is inverted")]
    VoidInverted(CellRect),
    #[error("at least one theme with at least one variant is required (got {themes} themes, {variants} variants)")]
    EmptyPalette { themes: u32, variants: u32 },
    #[error("special threshold must lie in (0, 1] (got {0})")]
    InvalidThreshold(f64),
    #[error("theme jitter must be finite and non-negative (got {0})")]
    InvalidJitter(f32),
}

/// Footprint of every placed building (all buildings share one box).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildingDims {
    pub width: f32,
    pub height: f32,
}

impl Default for BuildingDims {
    fn default() -> Self {
        Self {
            width: 6.0,
            height: 15.0,
        }
    }
}

impl BuildingDims {
    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.width / 2.0, self.height / 2.0, self.width / 2.0)
    }
}

/// Parameters for the grid layout generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub rows: u32,
    pub cols: u32,
    /// Distance between neighbouring cell centres, in world units.
    pub spacing: f32,
    /// Reserved sub-grid that receives no buildings and no collision.
    pub void_region: Option<CellRect>,
    pub theme_count: u32,
    pub variants_per_theme: u32,
    /// Column jitter span applied before mapping a column to a theme band.
    pub theme_jitter: f32,
    /// Draw budget for the special-entity search.
    pub max_attempts: u32,
    /// A candidate cell qualifies when `seed(x, z)` is strictly below this.
    pub special_threshold: f64,
    pub building: BuildingDims,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rows: 40,
            cols: 80,
            spacing: 16.0,
            void_region: Some(CellRect::new((3, 4), (7, 8))),
            theme_count: 3,
            variants_per_theme: 8,
            theme_jitter: 20.0,
            max_attempts: 1000,
            special_threshold: 0.45,
            building: BuildingDims::default(),
        }
    }
}

impl LayoutConfig {
    /// Check every parameter. Generation refuses to start on failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::EmptyGrid {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if !(self.spacing.is_finite() && self.spacing > 0.0) {
            return Err(ConfigError::InvalidSpacing(self.spacing));
        }
        let b = self.building;
        if !(b.width.is_finite() && b.width > 0.0 && b.height.is_finite() && b.height > 0.0) {
            return Err(ConfigError::InvalidBuilding {
                width: b.width,
                height: b.height,
            });
        }
        if let Some(v) = self.void_region {
            if v.row_min > v.row_max || v.col_min > v.col_max {
                return Err(ConfigError::VoidInverted(v));
            }
            if v.row_min < 0
                || v.col_min < 0
                || v.row_max >= self.rows as i32
                || v.col_max >= self.cols as i32
            {
                return Err(ConfigError::VoidOutOfBounds {
                    region: v,
                    rows: self.rows,
                    cols: self.cols,
                });
            }
        }
        if self.theme_count == 0 || self.variants_per_theme == 0 {
            return Err(ConfigError::EmptyPalette {
                themes: self.theme_count,
                variants: self.variants_per_theme,
            });
        }
        if !(self.special_threshold > 0.0 && self.special_threshold <= 1.0) {
            return Err(ConfigError::InvalidThreshold(self.special_threshold));
        }
        if !(self.theme_jitter.is_finite() && self.theme_jitter >= 0.0) {
            return Err(ConfigError::InvalidJitter(self.theme_jitter));
        }
        Ok(())
    }

    /// World X of column 0 (the grid is centred on the origin).
    pub fn start_x(&self) -> f32 {
        -((self.cols as f32 - 1.0) * self.spacing) / 2.0
    }

    /// World Z of row 0.
    pub fn start_z(&self) -> f32 {
        -((self.rows as f32 - 1.0) * self.spacing) / 2.0
    }

    /// Ground-level world position `(x, 0, z)` of a cell centre.
    pub fn cell_center(&self, cell: CellCoord) -> Vec3 {
        Vec3::new(
            self.start_x() + cell.col as f32 * self.spacing,
            0.0,
            self.start_z() + cell.row as f32 * self.spacing,
        )
    }

    /// Nearest cell to a world position, rounding half up. The result may lie
    /// outside the grid.
    pub fn nearest_cell(&self, x: f32, z: f32) -> CellCoord {
        let col = ((x - self.start_x()) / self.spacing + 0.5).floor();
        let row = ((z - self.start_z()) / self.spacing + 0.5).floor();
        CellCoord::new(row as i32, col as i32)
    }

    pub fn in_bounds(&self, cell: CellCoord) -> bool {
        (0..self.rows as i32).contains(&cell.row) && (0..self.cols as i32).contains(&cell.col)
    }

    pub fn is_void(&self, cell: CellCoord) -> bool {
        self.void_region.is_some_and(|v| v.contains(cell))
    }

    /// Number of grid cells that receive a building.
    pub fn buildable_count(&self) -> usize {
        self.cell_count() - self.void_region.map_or(0, |v| v.area())
    }

    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }
}
