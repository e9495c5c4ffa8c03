//! Shared types: grid addresses, rectangles and identifiers.
//!
//! # Invariants
//! - Grid addresses are plain integers; conversion to world space lives with
//!   the layout that owns the spacing and origin.

mod types;

pub use types::{CellCoord, CellRect, EntityId, Ray, SessionId};

pub fn crate_info() -> &'static str {
    "neoncity-common v0.1.0"
}
