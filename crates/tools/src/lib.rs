//! Developer tooling: layout and session inspectors.
//!
//! # Invariants
//! - Tools only read; they never mutate a layout or a session.

mod inspector;

pub use inspector::{CellInfo, LayoutInspector, LayoutSummary, SessionSummary};

pub fn crate_info() -> &'static str {
    "neoncity-tools v0.1.0"
}
