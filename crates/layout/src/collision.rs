use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::layout::Layout;

/// Tunables for the positional collision pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Lowest allowed camera height.
    pub floor: f32,
    /// Buildings are only tested below `building.height + margin`.
    pub margin: f32,
    /// Extra clearance added to half the building width.
    pub buffer: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            floor: 0.2,
            margin: 2.0,
            buffer: 1.5,
        }
    }
}

/// Stateless positional correction against the static grid.
///
/// Only the building nearest to the proposed position is considered and no
/// velocity is tracked; the correction is recomputed from scratch each tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionResolver {
    config: CollisionConfig,
}

impl CollisionResolver {
    pub fn new(config: CollisionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Minimum horizontal distance kept from a building centre on each axis.
    pub fn clearance(&self, layout: &Layout) -> f32 {
        layout.config().building.width / 2.0 + self.config.buffer
    }

    /// Clamp a proposed camera position against the floor and the nearest
    /// building.
    pub fn resolve(&self, layout: &Layout, proposed: Vec3) -> Vec3 {
        let mut pos = proposed;
        if pos.y < self.config.floor {
            pos.y = self.config.floor;
        }

        let grid = layout.config();
        if pos.y >= grid.building.height + self.config.margin {
            return pos;
        }

        let cell = grid.nearest_cell(pos.x, pos.z);
        if !grid.in_bounds(cell) || grid.is_void(cell) {
            return pos;
        }

        let center = grid.cell_center(cell);
        let dx = pos.x - center.x;
        let dz = pos.z - center.z;
        let min_dist = self.clearance(layout);
        if dx.abs() >= min_dist || dz.abs() >= min_dist {
            return pos;
        }

        let penetration_x = min_dist - dx.abs();
        let penetration_z = min_dist - dz.abs();
        if penetration_x < penetration_z {
            pos.x = center.x + away(dx) * min_dist;
        } else {
            pos.z = center.z + away(dz) * min_dist;
        }
        tracing::trace!(%cell, from = ?proposed, to = ?pos, "pushed out of building");
        pos
    }
}

/// Direction away from the centre; a dead-centre offset pushes positive.
fn away(offset: f32) -> f32 {
    if offset < 0.0 { -1.0 } else { 1.0 }
}
