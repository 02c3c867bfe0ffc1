use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use punchcard_core::AnimationKind;

use crate::app::App;

/// Input action that can be performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Start an animation unless one is already playing
    Play(AnimationKind),
    /// Restart the startup wave even if something is playing
    ForceStartup,
    Interrupt,
    FasterFps,
    SlowerFps,
    /// Put the message card back on the display
    ShowMessage,
    ToggleHelp,
    None,
}

/// Frames per second added or removed by one `+`/`-` press
pub const FPS_STEP: u32 = 5;

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent, app: &App) -> Action {
    if app.show_help {
        // Any key closes help
        return Action::ToggleHelp;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        (KeyCode::Char('s'), _) => Action::Play(AnimationKind::Startup),
        (KeyCode::Char('z'), _) => Action::Play(AnimationKind::Sleep),
        (KeyCode::Char('w'), _) => Action::Play(AnimationKind::Wake),
        (KeyCode::Char('c'), _) => Action::Play(AnimationKind::Custom(app.custom_name.clone())),
        (KeyCode::Char('!'), _) => Action::ForceStartup,
        (KeyCode::Char('x'), _) => Action::Interrupt,

        (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) => Action::FasterFps,
        (KeyCode::Char('-'), _) => Action::SlowerFps,

        (KeyCode::Char('m'), _) | (KeyCode::Enter, _) => Action::ShowMessage,
        (KeyCode::Char('?'), _) => Action::ToggleHelp,

        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use punchcard_core::AppConfig;
    use std::sync::Arc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        App::new(Arc::new(AppConfig::default()), "HELLO", "demo")
    }

    #[test]
    fn test_animation_keys() {
        let app = app();
        assert_eq!(handle_key_event(key(KeyCode::Char('s')), &app), Action::Play(AnimationKind::Startup));
        assert_eq!(handle_key_event(key(KeyCode::Char('z')), &app), Action::Play(AnimationKind::Sleep));
        assert_eq!(handle_key_event(key(KeyCode::Char('w')), &app), Action::Play(AnimationKind::Wake));
        assert_eq!(
            handle_key_event(key(KeyCode::Char('c')), &app),
            Action::Play(AnimationKind::Custom("demo".to_string()))
        );
        assert_eq!(handle_key_event(key(KeyCode::Char('!')), &app), Action::ForceStartup);
        assert_eq!(handle_key_event(key(KeyCode::Char('x')), &app), Action::Interrupt);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let app = app();
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key_event(event, &app), Action::Quit);
    }

    #[test]
    fn test_help_swallows_keys() {
        let mut app = app();
        app.show_help = true;
        assert_eq!(handle_key_event(key(KeyCode::Char('q')), &app), Action::ToggleHelp);
    }
}
