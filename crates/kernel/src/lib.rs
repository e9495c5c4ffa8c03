//! Kernel: the camera state machine and the session that owns all per-run
//! state.
//!
//! # Invariants
//! - Modes only change through the transition table; `Reset` is accepted in
//!   every mode.
//! - The intro hands over to manual control exactly once, on its exact end
//!   pose.
//! - Tick order is fixed: input, camera machine, collision, clicks, mini game.
//! - Ticks never fail; every error surfaces at construction time.

pub mod camera;
mod config;
pub mod flight;
mod garbage;
mod machine;
pub mod mode;
mod session;

pub use camera::{CameraState, Viewport};
pub use config::{ConfigLoadError, NeonCityConfig};
pub use flight::{FlightConfig, Pose};
pub use garbage::{GarbageConfig, GarbageSession, PROGRESS_MAX};
pub use machine::CameraStateMachine;
pub use mode::{Mode, Trigger, UiVisibility};
pub use session::{Session, SessionCommand, SessionEvent};

pub fn crate_info() -> &'static str {
    "neoncity-kernel v0.1.0"
}
