//! Input: raw device events queued per tick and folded into a single
//! [`InputCommand`].
//!
//! # Invariants
//! - Only one look-drag source (mouse or touch) is active at a time.
//! - Movement axes lie in `[-1, 1]`; vertical is one of `-1`, `0`, `1`.
//! - Commands are only produced while control is live; drag state is still
//!   tracked otherwise so no motion leaks across a mode change.
//! - Malformed events are dropped, never surfaced as errors.

mod aggregator;
mod command;
mod event;

pub use aggregator::{ControlConfig, InputAggregator};
pub use command::InputCommand;
pub use event::{DragPhase, InputEvent, Key};

pub fn crate_info() -> &'static str {
    "neoncity-input v0.1.0"
}
