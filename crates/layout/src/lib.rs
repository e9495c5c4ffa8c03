//! Layout: the shared positional seed, the procedural city grid, and the
//! grid-arithmetic queries (collision, picking) that run against it.
//!
//! # Invariants
//! - `seed(x, z)` lies in `[0, 1)` for every finite input.
//! - Grid addresses are unique; the void region holds no entity.
//! - At most one entity is tagged special.
//! - A layout is immutable once generated.

pub mod collision;
mod config;
mod generator;
mod layout;
pub mod pick;
pub mod seed;

pub use collision::{CollisionConfig, CollisionResolver};
pub use config::{BuildingDims, ConfigError, LayoutConfig};
pub use generator::{find_special_cell, generate};
pub use layout::{Cell, Entity, EntityTag, Layout, LayoutError, MaterialVariant};
pub use seed::{FaceMode, seed};

pub fn crate_info() -> &'static str {
    "neoncity-layout v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("layout"));
    }
}
