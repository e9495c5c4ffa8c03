use glam::Vec2;
use neoncity_common::{EntityId, SessionId};
use neoncity_input::{InputAggregator, InputEvent};
use neoncity_layout::{CollisionResolver, ConfigError, Layout, generate, pick::pick_special};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::camera::{CameraState, Viewport};
use crate::config::NeonCityConfig;
use crate::garbage::{GarbageConfig, GarbageSession};
use crate::machine::CameraStateMachine;
use crate::mode::{Mode, UiVisibility};

/// Commands issued by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionCommand {
    LoadingComplete,
    Start,
    Reset,
    CloseModal,
    OpenLeaderboard,
    CloseLeaderboard,
}

/// Everything the presentation layer needs to react to, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    ModeChanged { from: Mode, to: Mode },
    SpecialActivated { entity: EntityId, session: SessionId },
    GarbageProgress { session: SessionId, progress: f32 },
    GarbageCompleted { session: SessionId, time_ms: u64 },
    ModalClosed { session: SessionId, completed: bool },
    LeaderboardOpened,
    LeaderboardClosed,
}

/// The single owner of all per-run state, threaded through every tick.
///
/// Per tick: input, then the camera machine, then collision, then clicks,
/// then mini-game progress. Nothing here can fail once constructed.
#[derive(Debug)]
pub struct Session {
    layout: Layout,
    machine: CameraStateMachine,
    input: InputAggregator,
    resolver: CollisionResolver,
    garbage_config: GarbageConfig,
    rng: ChaCha8Rng,
    viewport: Viewport,
    elapsed: f64,
    ticks: u64,
    run_started_at: Option<f64>,
    garbage: Option<GarbageSession>,
    leaderboard_open: bool,
    events: Vec<SessionEvent>,
}

impl Session {
    /// Generate the layout from `config.rng_seed` and set up a session in
    /// loading mode.
    pub fn new(config: &NeonCityConfig) -> Result<Self, ConfigError> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        let layout = generate(&config.layout, &mut rng)?;
        Ok(Self::with_layout(layout, config, rng))
    }

    /// Wrap an existing layout. `rng` drives mini-game progress.
    pub fn with_layout(layout: Layout, config: &NeonCityConfig, rng: ChaCha8Rng) -> Self {
        Self {
            layout,
            machine: CameraStateMachine::new(config.flight),
            input: InputAggregator::new(config.controls),
            resolver: CollisionResolver::new(config.collision),
            garbage_config: config.garbage,
            rng,
            viewport: Viewport::default(),
            elapsed: 0.0,
            ticks: 0,
            run_started_at: None,
            garbage: None,
            leaderboard_open: false,
            events: Vec::new(),
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn camera(&self) -> &CameraState {
        self.machine.state()
    }

    pub fn mode(&self) -> Mode {
        self.machine.mode()
    }

    pub fn ui(&self) -> UiVisibility {
        UiVisibility::for_mode(self.mode())
    }

    /// Seconds accumulated from tick deltas.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn garbage(&self) -> Option<&GarbageSession> {
        self.garbage.as_ref()
    }

    pub fn leaderboard_open(&self) -> bool {
        self.leaderboard_open
    }

    /// True while a dialog blocks world interaction.
    pub fn modal_open(&self) -> bool {
        self.garbage.is_some() || self.leaderboard_open
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Update the screen size used for picking. Degenerate sizes are ignored.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            self.viewport = Viewport { width, height };
        } else {
            tracing::trace!(width, height, "ignoring degenerate viewport");
        }
    }

    /// Run time of the completed mini game, in whole milliseconds since
    /// manual control began.
    pub fn run_time_ms(&self) -> Option<u64> {
        let garbage = self.garbage.as_ref()?;
        let done = garbage.completed_at?;
        let start = self.run_started_at.unwrap_or(garbage.started_at);
        Some(((done - start).max(0.0) * 1000.0).floor() as u64)
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    /// Advance one frame and return the pose to render.
    pub fn tick<I>(&mut self, dt: f32, events: I) -> CameraState
    where
        I: IntoIterator<Item = InputEvent>,
    {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.elapsed += dt as f64;
        self.ticks += 1;
        let _span = tracing::trace_span!("tick", tick = self.ticks, mode = ?self.mode()).entered();

        let live = self.mode() == Mode::Running && !self.modal_open();
        self.input.extend(events);
        let command = self.input.sample(live, dt);
        let clicks = self.input.take_clicks();

        let from = self.mode();
        if let Some(to) = self.machine.update(self.elapsed, dt, &command) {
            self.on_mode_change(from, to);
        }

        if self.mode() == Mode::Running {
            let resolved = self.resolver.resolve(&self.layout, self.machine.state().position);
            self.machine.place(resolved);
        }

        if live {
            for click in clicks {
                if self.click(click) {
                    break;
                }
            }
        }

        self.advance_garbage();
        *self.machine.state()
    }

    pub fn command(&mut self, command: SessionCommand) {
        tracing::debug!(?command, mode = ?self.mode(), "session command");
        let from = self.mode();
        match command {
            SessionCommand::LoadingComplete => {
                if let Some(to) = self.machine.loading_complete() {
                    self.on_mode_change(from, to);
                }
            }
            SessionCommand::Start => {
                if let Some(to) = self.machine.start(self.elapsed) {
                    self.on_mode_change(from, to);
                }
            }
            SessionCommand::Reset => self.reset(),
            SessionCommand::CloseModal => {
                let Some(garbage) = self.garbage.take() else {
                    return;
                };
                self.events.push(SessionEvent::ModalClosed {
                    session: garbage.id,
                    completed: garbage.completed,
                });
                if garbage.completed {
                    self.reset();
                }
            }
            SessionCommand::OpenLeaderboard => {
                if !self.leaderboard_open {
                    self.leaderboard_open = true;
                    self.events.push(SessionEvent::LeaderboardOpened);
                }
            }
            SessionCommand::CloseLeaderboard => {
                if self.leaderboard_open {
                    self.leaderboard_open = false;
                    self.events.push(SessionEvent::LeaderboardClosed);
                }
            }
        }
    }

    fn reset(&mut self) {
        if let Some(garbage) = self.garbage.take() {
            self.events.push(SessionEvent::ModalClosed {
                session: garbage.id,
                completed: garbage.completed,
            });
        }
        self.leaderboard_open = false;
        self.run_started_at = None;
        self.input.clear();
        let from = self.mode();
        if let Some(to) = self.machine.reset() {
            self.on_mode_change(from, to);
        }
    }

    fn on_mode_change(&mut self, from: Mode, to: Mode) {
        if to == Mode::Running {
            self.run_started_at = Some(self.elapsed);
        }
        self.events.push(SessionEvent::ModeChanged { from, to });
    }

    /// Returns `true` when the click activated the special entity.
    fn click(&mut self, screen: Vec2) -> bool {
        let ray = self.machine.state().ray_through(screen, self.viewport);
        let Some(entity) = pick_special(&self.layout, &ray) else {
            tracing::trace!(?screen, "click hit nothing interactive");
            return false;
        };
        let garbage = GarbageSession::new(self.elapsed);
        tracing::info!(
            entity = ?entity.id,
            cell = %entity.cell,
            session = ?garbage.id,
            "special entity activated"
        );
        self.events.push(SessionEvent::SpecialActivated {
            entity: entity.id,
            session: garbage.id,
        });
        self.garbage = Some(garbage);
        true
    }

    fn advance_garbage(&mut self) {
        let Some(garbage) = self.garbage.as_mut() else {
            return;
        };
        if garbage.completed {
            return;
        }
        let finished = garbage.advance(&self.garbage_config, &mut self.rng, self.elapsed);
        let (session, progress) = (garbage.id, garbage.progress);
        self.events.push(SessionEvent::GarbageProgress { session, progress });
        if finished {
            let time_ms = self.run_time_ms().unwrap_or(0);
            tracing::info!(?session, time_ms, "garbage collection complete");
            self.events.push(SessionEvent::GarbageCompleted { session, time_ms });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neoncity_input::Key;
    use neoncity_layout::LayoutConfig;

    const DT: f32 = 1.0 / 60.0;

    fn config() -> NeonCityConfig {
        NeonCityConfig::default()
    }

    fn running_session() -> Session {
        let mut s = Session::new(&config()).unwrap();
        s.tick(DT, []);
        s.command(SessionCommand::LoadingComplete);
        s.command(SessionCommand::Start);
        while s.mode() != Mode::Running {
            s.tick(0.1, []);
        }
        s.drain_events();
        s
    }

    /// Face the special entity from the street on its +X side and return
    /// the screen centre.
    fn aim_at_special(s: &mut Session) -> Vec2 {
        let special = s.layout().special().unwrap().position;
        let eye = special + glam::Vec3::new(8.0, 0.0, 0.0);
        let camera = s.machine.state_mut();
        camera.position = eye;
        camera.yaw = std::f32::consts::FRAC_PI_2;
        camera.pitch = 0.0;
        let v = s.viewport();
        Vec2::new(v.width / 2.0, v.height / 2.0)
    }

    #[test]
    fn full_flow_emits_mode_changes() {
        let mut s = Session::new(&config()).unwrap();
        assert_eq!(s.mode(), Mode::Loading);
        assert!(s.ui().loading_screen);
        s.command(SessionCommand::Start);
        assert_eq!(s.mode(), Mode::Loading);

        s.command(SessionCommand::LoadingComplete);
        s.command(SessionCommand::Start);
        for _ in 0..60 {
            s.tick(0.1, []);
        }
        assert_eq!(s.mode(), Mode::Running);
        let modes: Vec<_> = s
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                SessionEvent::ModeChanged { to, .. } => Some(to),
                _ => None,
            })
            .collect();
        assert_eq!(modes, vec![Mode::Menu, Mode::Intro, Mode::Running]);
    }

    #[test]
    fn input_ignored_until_running() {
        let mut s = Session::new(&config()).unwrap();
        s.tick(DT, [InputEvent::KeyDown(Key::W)]);
        let before = s.camera().position;
        s.tick(DT, []);
        // Orbit only: height unchanged, radius unchanged.
        assert_eq!(s.camera().position.y, before.y);
        assert!((s.camera().position.length() - before.length()).abs() < 1e-2);
    }

    #[test]
    fn running_session_moves_and_collides() {
        let mut s = running_session();
        assert_eq!(s.camera().position, glam::Vec3::new(128.0, 2.0, 0.0));
        s.tick(0.5, [InputEvent::KeyDown(Key::Shift)]);
        // Cannot sink below the floor.
        assert!((s.camera().position.y - 0.2).abs() < 1e-6);

        // Walk forward (-X) into the building at cell (20, 47), centre (120, 8).
        s.machine.place(glam::Vec3::new(128.0, 5.0, 8.0));
        s.tick(0.5, [InputEvent::KeyUp(Key::Shift), InputEvent::KeyDown(Key::W)]);
        let p = s.camera().position;
        let centre = s.layout().config().cell_center(neoncity_common::CellCoord::new(20, 47));
        assert!((p.x - centre.x).abs() >= 4.5 - 1e-4 || (p.z - centre.z).abs() >= 4.5 - 1e-4);
    }

    #[test]
    fn clicking_special_opens_garbage_session() {
        let mut s = running_session();
        let centre = aim_at_special(&mut s);
        s.tick(DT, [InputEvent::Click { x: centre.x, y: centre.y }]);
        assert!(s.garbage().is_some());
        assert!(s.modal_open());
        let events = s.drain_events();
        assert!(matches!(events[0], SessionEvent::SpecialActivated { .. }));
        assert!(matches!(events[1], SessionEvent::GarbageProgress { .. }));

        // Further clicks are ignored while the modal is open.
        let id = s.garbage().unwrap().id;
        s.tick(DT, [InputEvent::Click { x: centre.x, y: centre.y }]);
        assert_eq!(s.garbage().unwrap().id, id);
    }

    #[test]
    fn clicking_empty_sky_does_nothing() {
        let mut s = running_session();
        s.machine.state_mut().pitch = 1.5;
        s.tick(DT, [InputEvent::Click { x: 640.0, y: 360.0 }]);
        assert!(s.garbage().is_none());
    }

    #[test]
    fn clicks_outside_running_are_discarded() {
        let mut s = Session::new(&config()).unwrap();
        s.tick(DT, [InputEvent::Click { x: 640.0, y: 360.0 }]);
        assert!(s.garbage().is_none());
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn garbage_completes_with_run_time() {
        let mut s = running_session();
        let run_start = s.elapsed();
        let centre = aim_at_special(&mut s);
        s.tick(DT, [InputEvent::Click { x: centre.x, y: centre.y }]);
        let mut completed = None;
        for _ in 0..1000 {
            s.tick(DT, []);
            for e in s.drain_events() {
                if let SessionEvent::GarbageCompleted { time_ms, .. } = e {
                    completed = Some(time_ms);
                }
            }
            if completed.is_some() {
                break;
            }
        }
        let time_ms = completed.expect("mini game never completed");
        let g = s.garbage().unwrap();
        assert!(g.completed);
        assert_eq!(g.progress, 100.0);
        let expected = ((g.completed_at.unwrap() - run_start) * 1000.0).floor() as u64;
        assert_eq!(time_ms, expected);
        assert_eq!(s.run_time_ms(), Some(time_ms));

        // Closing a finished run starts over from the loading screen.
        s.command(SessionCommand::CloseModal);
        assert!(s.garbage().is_none());
        assert_eq!(s.mode(), Mode::Loading);
        let events = s.drain_events();
        assert!(matches!(events[0], SessionEvent::ModalClosed { completed: true, .. }));
    }

    #[test]
    fn closing_unfinished_modal_keeps_running() {
        let mut s = running_session();
        let centre = aim_at_special(&mut s);
        s.tick(DT, [InputEvent::Click { x: centre.x, y: centre.y }]);
        s.command(SessionCommand::CloseModal);
        assert!(s.garbage().is_none());
        assert_eq!(s.mode(), Mode::Running);
        assert!(!s.modal_open());
    }

    #[test]
    fn leaderboard_blocks_interaction() {
        let mut s = running_session();
        s.command(SessionCommand::OpenLeaderboard);
        s.command(SessionCommand::OpenLeaderboard);
        assert!(s.modal_open());
        let before = s.camera().position;
        s.tick(0.5, [InputEvent::KeyDown(Key::W)]);
        assert_eq!(s.camera().position, before);
        s.command(SessionCommand::CloseLeaderboard);
        assert_eq!(
            s.drain_events(),
            vec![SessionEvent::LeaderboardOpened, SessionEvent::LeaderboardClosed]
        );
    }

    #[test]
    fn reset_clears_everything() {
        let mut s = running_session();
        let centre = aim_at_special(&mut s);
        s.tick(DT, [InputEvent::Click { x: centre.x, y: centre.y }]);
        s.command(SessionCommand::Reset);
        assert_eq!(s.mode(), Mode::Loading);
        assert!(s.garbage().is_none());
        assert_eq!(s.run_time_ms(), None);
    }

    #[test]
    fn degenerate_dt_and_viewport_are_ignored() {
        let mut s = Session::new(&config()).unwrap();
        s.tick(f32::NAN, []);
        s.tick(-1.0, []);
        assert_eq!(s.elapsed(), 0.0);
        assert_eq!(s.ticks(), 2);
        s.set_viewport(0.0, 100.0);
        assert_eq!(s.viewport(), Viewport::default());
        s.set_viewport(800.0, 600.0);
        assert_eq!(s.viewport().width, 800.0);
    }

    #[test]
    fn invalid_layout_is_reported() {
        let config = NeonCityConfig {
            layout: LayoutConfig {
                rows: 0,
                ..LayoutConfig::default()
            },
            ..NeonCityConfig::default()
        };
        assert!(Session::new(&config).is_err());
    }
}
