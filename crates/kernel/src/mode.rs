use serde::{Deserialize, Serialize};

/// Top-level presentation mode. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    Loading,
    Menu,
    Intro,
    Running,
}

/// Anything that can move the mode forward (or back to the start).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    LoadingComplete,
    Start,
    IntroFinished,
    Reset,
}

/// The transition table. `None` means the trigger is ignored in `mode`.
pub fn transition(mode: Mode, trigger: Trigger) -> Option<Mode> {
    match (mode, trigger) {
        (_, Trigger::Reset) => Some(Mode::Loading),
        (Mode::Loading, Trigger::LoadingComplete) => Some(Mode::Menu),
        (Mode::Menu, Trigger::Start) => Some(Mode::Intro),
        (Mode::Intro, Trigger::IntroFinished) => Some(Mode::Running),
        _ => None,
    }
}

/// Which presentation layers are visible for a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiVisibility {
    pub loading_screen: bool,
    pub start_screen: bool,
    /// Dimming overlay behind the loading and start screens.
    pub overlay: bool,
    /// In-game controls: joystick, hints, leaderboard button.
    pub hud: bool,
}

impl UiVisibility {
    pub fn for_mode(mode: Mode) -> Self {
        let hidden = Self {
            loading_screen: false,
            start_screen: false,
            overlay: false,
            hud: false,
        };
        match mode {
            Mode::Loading => Self {
                loading_screen: true,
                overlay: true,
                ..hidden
            },
            Mode::Menu => Self {
                start_screen: true,
                overlay: true,
                ..hidden
            },
            Mode::Intro => hidden,
            Mode::Running => Self { hud: true, ..hidden },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Mode; 4] = [Mode::Loading, Mode::Menu, Mode::Intro, Mode::Running];

    #[test]
    fn forward_path() {
        assert_eq!(transition(Mode::Loading, Trigger::LoadingComplete), Some(Mode::Menu));
        assert_eq!(transition(Mode::Menu, Trigger::Start), Some(Mode::Intro));
        assert_eq!(transition(Mode::Intro, Trigger::IntroFinished), Some(Mode::Running));
    }

    #[test]
    fn reset_always_returns_to_loading() {
        for mode in ALL {
            assert_eq!(transition(mode, Trigger::Reset), Some(Mode::Loading));
        }
    }

    #[test]
    fn out_of_order_triggers_are_ignored() {
        for mode in [Mode::Loading, Mode::Intro, Mode::Running] {
            assert_eq!(transition(mode, Trigger::Start), None);
        }
        assert_eq!(transition(Mode::Menu, Trigger::LoadingComplete), None);
        assert_eq!(transition(Mode::Running, Trigger::IntroFinished), None);
    }

    #[test]
    fn exactly_one_screen_per_mode() {
        assert!(UiVisibility::for_mode(Mode::Loading).loading_screen);
        assert!(UiVisibility::for_mode(Mode::Menu).start_screen);
        assert!(UiVisibility::for_mode(Mode::Running).hud);
        let intro = UiVisibility::for_mode(Mode::Intro);
        assert!(!intro.overlay && !intro.hud && !intro.start_screen);
        for mode in ALL {
            let v = UiVisibility::for_mode(mode);
            let screens = [v.loading_screen, v.start_screen, v.hud];
            assert!(screens.iter().filter(|&&s| s).count() <= 1);
        }
    }
}
