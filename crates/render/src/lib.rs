//! Rendering adapter: renderer-agnostic interface plus the palette and face
//! classification every renderer shares.
//!
//! # Invariants
//! - Renderers only read the layout and the final camera pose.
//! - Face behaviour comes from the same seed function the layout generator
//!   uses, so the special entity always shows a static face.
//!
//! A debug text renderer stands in for a GPU backend; the trait is stable,
//! so a real backend can be swapped in without changing consumers.

mod palette;
mod renderer;

pub use palette::{BACKGROUND, MaterialSpec, NEON_THEMES, Palette, Rgb, SPECIAL_EDGE};
pub use renderer::{DebugTextRenderer, FaceSummary, Renderer};

pub fn crate_info() -> &'static str {
    "neoncity-render v0.1.0"
}
