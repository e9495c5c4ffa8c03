use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::command::InputCommand;
use crate::event::{DragPhase, InputEvent, Key};

/// Device tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Radians per pixel of mouse drag.
    pub mouse_sensitivity: f32,
    /// Radians per pixel of touch drag.
    pub touch_sensitivity: f32,
    /// Keyboard turn rate in radians per second.
    pub turn_rate: f32,
    /// Knob travel, in pixels, that maps to full deflection.
    pub joystick_radius: f32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 0.002,
            touch_sensitivity: 0.004,
            turn_rate: 1.0,
            joystick_radius: 35.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LookSource {
    Mouse { last: Vec2 },
    Touch { id: u64, last: Vec2 },
}

/// Queues raw device events and folds them into one [`InputCommand`] per
/// tick.
#[derive(Debug, Default)]
pub struct InputAggregator {
    config: ControlConfig,
    queue: Vec<InputEvent>,
    held: HashSet<Key>,
    look: Option<LookSource>,
    /// Accumulated (yaw, pitch) rotation since the last sample.
    look_delta: Vec2,
    joystick: Vec2,
    clicks: Vec<Vec2>,
}

impl InputAggregator {
    pub fn new(config: ControlConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// Queue an event for the next [`sample`](Self::sample).
    pub fn push(&mut self, event: InputEvent) {
        self.queue.push(event);
    }

    pub fn extend<I: IntoIterator<Item = InputEvent>>(&mut self, events: I) {
        self.queue.extend(events);
    }

    /// Drain the queue and produce this tick's command.
    ///
    /// With `active == false` the queue is still applied (held keys and drag
    /// anchors stay in sync) but rotation deltas and clicks are discarded and
    /// an idle command is returned.
    pub fn sample(&mut self, active: bool, dt: f32) -> InputCommand {
        for event in std::mem::take(&mut self.queue) {
            self.apply(event);
        }

        if !active {
            self.look_delta = Vec2::ZERO;
            self.clicks.clear();
            return InputCommand::default();
        }

        let axis = |pos: bool, neg: bool| (pos as i32 - neg as i32) as f32;
        let held = |k: Key| self.held.contains(&k);

        let forward = axis(
            held(Key::W) || held(Key::ArrowUp),
            held(Key::S) || held(Key::ArrowDown),
        );
        let right = axis(
            held(Key::D) || held(Key::ArrowRight),
            held(Key::A) || held(Key::ArrowLeft),
        );
        let vertical = axis(held(Key::Space), held(Key::Shift));
        let turn = axis(held(Key::Q), held(Key::E));

        let look = std::mem::take(&mut self.look_delta);
        let command = InputCommand {
            move_forward: (forward - self.joystick.y).clamp(-1.0, 1.0),
            move_right: (right + self.joystick.x).clamp(-1.0, 1.0),
            vertical,
            yaw_delta: look.x + turn * self.config.turn_rate * dt,
            pitch_delta: look.y,
        };
        tracing::trace!(?command, "input sampled");
        command
    }

    /// Click positions collected by the last active sample, oldest first.
    pub fn take_clicks(&mut self) -> Vec<Vec2> {
        std::mem::take(&mut self.clicks)
    }

    /// Current joystick deflection, unit-clamped, screen orientation.
    pub fn joystick(&self) -> Vec2 {
        self.joystick
    }

    pub fn is_dragging(&self) -> bool {
        self.look.is_some()
    }

    /// Forget every held key and drag, e.g. after the window loses focus.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.held.clear();
        self.look = None;
        self.look_delta = Vec2::ZERO;
        self.joystick = Vec2::ZERO;
        self.clicks.clear();
    }

    fn apply(&mut self, event: InputEvent) {
        if !event.is_finite() {
            tracing::trace!(?event, "dropping event with non-finite coordinates");
            return;
        }
        match event {
            InputEvent::KeyDown(key) => {
                self.held.insert(key);
            }
            InputEvent::KeyUp(key) => {
                self.held.remove(&key);
            }
            InputEvent::PointerDrag { phase, x, y } => self.mouse_drag(phase, Vec2::new(x, y)),
            InputEvent::TouchDrag {
                id,
                phase,
                x,
                y,
                over_ui,
            } => self.touch_drag(id, phase, Vec2::new(x, y), over_ui),
            InputEvent::JoystickMove { dx, dy } => {
                let v = Vec2::new(dx, dy) / self.config.joystick_radius;
                self.joystick = if v.length() > 1.0 { v.normalize() } else { v };
            }
            InputEvent::JoystickRelease => self.joystick = Vec2::ZERO,
            InputEvent::Click { x, y } => self.clicks.push(Vec2::new(x, y)),
        }
    }

    fn mouse_drag(&mut self, phase: DragPhase, at: Vec2) {
        match (phase, self.look) {
            (DragPhase::Start, None) => self.look = Some(LookSource::Mouse { last: at }),
            (DragPhase::Move, Some(LookSource::Mouse { last })) => {
                self.rotate(at - last, self.config.mouse_sensitivity);
                self.look = Some(LookSource::Mouse { last: at });
            }
            (DragPhase::End, Some(LookSource::Mouse { .. })) => self.look = None,
            (phase, current) => {
                tracing::trace!(?phase, ?current, "mouse drag ignored");
            }
        }
    }

    fn touch_drag(&mut self, id: u64, phase: DragPhase, at: Vec2, over_ui: bool) {
        match (phase, self.look) {
            (DragPhase::Start, None) if !over_ui => {
                self.look = Some(LookSource::Touch { id, last: at });
            }
            (DragPhase::Move, Some(LookSource::Touch { id: active, last })) if active == id => {
                self.rotate(at - last, self.config.touch_sensitivity);
                self.look = Some(LookSource::Touch { id, last: at });
            }
            (DragPhase::End, Some(LookSource::Touch { id: active, .. })) if active == id => {
                self.look = None;
            }
            (phase, current) => {
                tracing::trace!(id, ?phase, over_ui, ?current, "touch ignored");
            }
        }
    }

    fn rotate(&mut self, delta: Vec2, sensitivity: f32) {
        self.look_delta.x -= delta.x * sensitivity;
        self.look_delta.y -= delta.y * sensitivity;
    }
}
