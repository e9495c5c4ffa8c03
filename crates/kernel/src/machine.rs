use glam::Vec3;
use neoncity_input::InputCommand;

use crate::camera::{CameraState, yaw_pitch_towards};
use crate::flight::{FlightConfig, Pose, ease_out_cubic};
use crate::mode::{Mode, Trigger, transition};

/// Drives the camera through loading orbit, menu orbit, the scripted intro
/// flight and manual control.
///
/// All timing is expressed in elapsed session seconds supplied by the caller,
/// so the machine itself holds no clock.
#[derive(Debug, Clone)]
pub struct CameraStateMachine {
    config: FlightConfig,
    state: CameraState,
    intro_started_at: Option<f64>,
}

impl CameraStateMachine {
    pub fn new(config: FlightConfig) -> Self {
        let orbit = config.orbit_pose(0.0);
        Self {
            config,
            state: CameraState::looking_at(orbit.position, orbit.target, Mode::Loading),
            intro_started_at: None,
        }
    }

    pub fn config(&self) -> &FlightConfig {
        &self.config
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// `LoadingComplete`. Returns the new mode if the trigger applied.
    pub fn loading_complete(&mut self) -> Option<Mode> {
        self.fire(Trigger::LoadingComplete)
    }

    /// `Start`: begins the intro flight from the menu. Ignored elsewhere.
    pub fn start(&mut self, elapsed: f64) -> Option<Mode> {
        let next = self.fire(Trigger::Start)?;
        self.intro_started_at = Some(elapsed);
        let from = self.config.intro_from;
        self.set_pose(from);
        Some(next)
    }

    /// `Reset`: back to the loading orbit from any mode.
    pub fn reset(&mut self) -> Option<Mode> {
        self.intro_started_at = None;
        self.fire(Trigger::Reset)
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut CameraState {
        &mut self.state
    }

    /// Overwrite the position, e.g. with the collision-corrected one.
    pub fn place(&mut self, position: Vec3) {
        self.state.position = position;
    }

    /// Advance one tick. Returns the new mode when the intro hands over to
    /// manual control during this call.
    pub fn update(&mut self, elapsed: f64, dt: f32, command: &InputCommand) -> Option<Mode> {
        match self.state.mode {
            Mode::Loading | Mode::Menu => {
                let orbit = self.config.orbit_pose(elapsed);
                self.set_pose(orbit);
                None
            }
            Mode::Intro => self.fly_intro(elapsed),
            Mode::Running => {
                self.steer(dt, command);
                None
            }
        }
    }

    fn fly_intro(&mut self, elapsed: f64) -> Option<Mode> {
        let started = *self.intro_started_at.get_or_insert(elapsed);
        let t = ((elapsed - started) / self.config.intro_duration as f64).clamp(0.0, 1.0) as f32;
        if t < 1.0 {
            let pose = self.config.intro_from.lerp(&self.config.intro_to, ease_out_cubic(t));
            self.set_pose(pose);
            return None;
        }

        // Snap to the exact end pose so manual yaw/pitch continue from it.
        let end = self.config.intro_to;
        self.set_pose(end);
        let next = self.fire(Trigger::IntroFinished);
        self.intro_started_at = None;
        tracing::info!(position = ?end.position, yaw = self.state.yaw, "manual control engaged");
        next
    }

    fn steer(&mut self, dt: f32, command: &InputCommand) {
        let limit = self.config.pitch_limit_degrees.to_radians();
        self.state.yaw += command.yaw_delta;
        self.state.pitch = (self.state.pitch + command.pitch_delta).clamp(-limit, limit);

        let speed = self.config.speed_at(self.state.position.y);
        let planar =
            self.state.forward() * command.move_forward + self.state.right() * command.move_right;
        self.state.position += planar * speed * dt;
        self.state.position.y += command.vertical * speed * dt;
    }

    fn set_pose(&mut self, pose: Pose) {
        self.state.position = pose.position;
        if let Some((yaw, pitch)) = yaw_pitch_towards(pose.target - pose.position) {
            self.state.yaw = yaw;
            self.state.pitch = pitch;
        }
    }

    fn fire(&mut self, trigger: Trigger) -> Option<Mode> {
        let from = self.state.mode;
        let Some(to) = transition(from, trigger) else {
            tracing::debug!(?from, ?trigger, "trigger ignored");
            return None;
        };
        self.state.mode = to;
        tracing::info!(?from, ?to, ?trigger, "mode transition");
        Some(to)
    }
}

impl Default for CameraStateMachine {
    fn default() -> Self {
        Self::new(FlightConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const IDLE: InputCommand = InputCommand {
        move_forward: 0.0,
        move_right: 0.0,
        vertical: 0.0,
        yaw_delta: 0.0,
        pitch_delta: 0.0,
    };

    fn running() -> CameraStateMachine {
        let mut m = CameraStateMachine::default();
        m.loading_complete();
        m.start(0.0);
        m.update(5.0, 0.016, &IDLE);
        assert_eq!(m.mode(), Mode::Running);
        m
    }

    #[test]
    fn orbits_while_loading_and_ignores_input() {
        let mut m = CameraStateMachine::default();
        let cmd = InputCommand {
            move_forward: 1.0,
            yaw_delta: 1.0,
            ..IDLE
        };
        m.update(0.0, 0.1, &cmd);
        assert_eq!(m.state().position, Vec3::new(0.0, 300.0, 600.0));
        m.update(5.0, 0.1, &cmd);
        let p = m.state().position;
        assert!((p.x - 0.5f32.sin() * 600.0).abs() < 1e-3);
        assert_eq!(p.y, 300.0);
        // Still facing the origin.
        let to_origin = (Vec3::ZERO - p).normalize();
        assert!(m.state().forward().abs_diff_eq(to_origin, 1e-5));
    }

    #[test]
    fn start_only_from_menu() {
        let mut m = CameraStateMachine::default();
        assert_eq!(m.start(1.0), None);
        assert_eq!(m.mode(), Mode::Loading);
        assert_eq!(m.loading_complete(), Some(Mode::Menu));
        assert_eq!(m.loading_complete(), None);
        assert_eq!(m.start(1.0), Some(Mode::Intro));
        assert_eq!(m.start(2.0), None);
    }

    #[test]
    fn intro_eases_between_poses() {
        let mut m = CameraStateMachine::default();
        m.loading_complete();
        m.start(10.0);
        assert_eq!(m.state().position, Vec3::new(0.0, 500.0, 1000.0));

        assert_eq!(m.update(12.5, 0.016, &IDLE), None);
        let eased = ease_out_cubic(0.5);
        let expected = Vec3::new(0.0, 500.0, 1000.0).lerp(Vec3::new(128.0, 2.0, 0.0), eased);
        assert!(m.state().position.abs_diff_eq(expected, 1e-3));
        assert_eq!(m.mode(), Mode::Intro);
    }

    #[test]
    fn intro_finishes_on_exact_end_pose() {
        let mut m = CameraStateMachine::default();
        m.loading_complete();
        m.start(1.0);
        assert_eq!(m.update(6.0, 0.016, &IDLE), Some(Mode::Running));
        let s = *m.state();
        assert_eq!(s.position, Vec3::new(128.0, 2.0, 0.0));
        assert!((s.yaw - FRAC_PI_2).abs() < 1e-6);
        assert!(s.pitch.abs() < 1e-6);
    }

    #[test]
    fn running_never_regresses_to_intro() {
        let mut m = running();
        let pose = *m.state();
        for i in 0..10 {
            assert_eq!(m.update(5.0 + i as f64, 0.016, &IDLE), None);
        }
        assert_eq!(m.mode(), Mode::Running);
        assert_eq!(*m.state(), pose);
    }

    #[test]
    fn late_first_update_still_snaps_once() {
        let mut m = CameraStateMachine::default();
        m.loading_complete();
        m.start(0.0);
        // A long stall jumps straight past the end of the intro.
        assert_eq!(m.update(60.0, 30.0, &IDLE), Some(Mode::Running));
        assert_eq!(m.state().position, Vec3::new(128.0, 2.0, 0.0));
    }

    #[test]
    fn manual_movement_uses_city_speed_near_ground() {
        let mut m = running();
        let cmd = InputCommand {
            move_forward: 1.0,
            ..IDLE
        };
        m.update(6.0, 1.0, &cmd);
        // Facing -X at y = 2: half speed.
        assert!(m.state().position.abs_diff_eq(Vec3::new(108.0, 2.0, 0.0), 1e-4));

        m.place(Vec3::new(0.0, 100.0, 0.0));
        let cmd = InputCommand {
            move_right: 1.0,
            ..IDLE
        };
        m.update(7.0, 0.5, &cmd);
        // Right of -X is -Z, full speed above the city.
        assert!(m.state().position.abs_diff_eq(Vec3::new(0.0, 100.0, -20.0), 1e-4));
    }

    #[test]
    fn vertical_moves_straight_up() {
        let mut m = running();
        m.place(Vec3::new(0.0, 30.0, 0.0));
        let cmd = InputCommand {
            vertical: 1.0,
            ..IDLE
        };
        m.update(6.0, 0.25, &cmd);
        assert_eq!(m.state().position, Vec3::new(0.0, 40.0, 0.0));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut m = running();
        let cmd = InputCommand {
            pitch_delta: 10.0,
            ..IDLE
        };
        m.update(6.0, 0.016, &cmd);
        assert!((m.state().pitch - 89f32.to_radians()).abs() < 1e-6);
        let cmd = InputCommand {
            pitch_delta: -20.0,
            yaw_delta: 0.25,
            ..IDLE
        };
        m.update(6.1, 0.016, &cmd);
        assert!((m.state().pitch + 89f32.to_radians()).abs() < 1e-6);
        assert!((m.state().yaw - (FRAC_PI_2 + 0.25)).abs() < 1e-6);
    }

    #[test]
    fn reset_returns_to_loading_orbit() {
        let mut m = running();
        assert_eq!(m.reset(), Some(Mode::Loading));
        m.update(0.0, 0.016, &IDLE);
        assert_eq!(m.state().position, Vec3::new(0.0, 300.0, 600.0));
        // A fresh intro after reset starts from scratch.
        m.loading_complete();
        m.start(100.0);
        assert_eq!(m.update(101.0, 0.016, &IDLE), None);
        assert_eq!(m.mode(), Mode::Intro);
    }
}
