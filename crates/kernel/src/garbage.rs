use neoncity_common::SessionId;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Progress is a percentage.
pub const PROGRESS_MAX: f32 = 100.0;

/// Tunables for the mini game opened by the special entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GarbageConfig {
    /// Guaranteed progress per tick.
    pub step_min: f32,
    /// Random extra progress per tick, drawn uniformly from `[0, step_span)`.
    pub step_span: f32,
}

impl Default for GarbageConfig {
    fn default() -> Self {
        Self {
            step_min: 0.15,
            step_span: 0.35,
        }
    }
}

impl GarbageConfig {
    /// First setting that would stall or reverse progress, if any.
    pub fn invalid_field(&self) -> Option<(&'static str, f32)> {
        if !(self.step_min.is_finite() && self.step_min >= 0.0) {
            return Some(("step_min", self.step_min));
        }
        if !(self.step_span.is_finite() && self.step_span >= 0.0) {
            return Some(("step_span", self.step_span));
        }
        if self.step_min + self.step_span <= 0.0 {
            return Some(("step_min + step_span", self.step_min + self.step_span));
        }
        None
    }
}

/// One run of the "garbage collection" progress bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarbageSession {
    pub id: SessionId,
    pub progress: f32,
    /// Elapsed session seconds at activation.
    pub started_at: f64,
    pub completed: bool,
    pub completed_at: Option<f64>,
}

impl GarbageSession {
    pub fn new(started_at: f64) -> Self {
        Self {
            id: SessionId::new(),
            progress: 0.0,
            started_at,
            completed: false,
            completed_at: None,
        }
    }

    /// Advance by one tick. Returns `true` on the tick that completes the run;
    /// a completed session no longer changes.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        config: &GarbageConfig,
        rng: &mut R,
        now: f64,
    ) -> bool {
        if self.completed {
            return false;
        }
        let extra = if config.step_span > 0.0 {
            rng.gen_range(0.0..config.step_span)
        } else {
            0.0
        };
        self.progress = (self.progress + config.step_min + extra).min(PROGRESS_MAX);
        if self.progress >= PROGRESS_MAX {
            self.completed = true;
            self.completed_at = Some(now);
            return true;
        }
        false
    }
}
