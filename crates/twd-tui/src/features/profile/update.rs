use crossterm::event::{KeyCode, KeyEvent};

use crate::effects::UiEffect;
use crate::state::TuiState;

pub fn start_sign_out(tui: &mut TuiState) -> Vec<UiEffect> {
    if tui.is_busy() {
        return vec![];
    }
    tui.notice = None;
    let task = tui.task_seq.next_id();
    tui.tasks.sign_out.mark_pending(task);
    vec![UiEffect::SignOut { task }]
}

pub fn handle_key(tui: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Char('o') => start_sign_out(tui),
        KeyCode::Char('a') if !tui.session.user.profile_image_url.is_empty() => {
            vec![UiEffect::OpenBrowser {
                url: tui.session.user.profile_image_url.clone(),
            }]
        }
        KeyCode::Esc | KeyCode::Char('q') => vec![UiEffect::Quit],
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use twd_core::auth::Phase;

    use super::*;
    use crate::common::TaskState;
    use crate::locale::EN;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn test_sign_out_key() {
        let mut tui = TuiState::new(&EN);
        tui.session.signed_in = true;
        assert!(matches!(
            handle_key(&mut tui, key('o')).as_slice(),
            [UiEffect::SignOut { .. }]
        ));

        // Pending before the runtime reports the task started.
        assert!(handle_key(&mut tui, key('o')).is_empty());

        tui.tasks.sign_out = TaskState::default();
        tui.session.phase = Phase::LoggingOut;
        assert!(handle_key(&mut tui, key('o')).is_empty());
    }

    #[test]
    fn test_open_avatar_requires_url() {
        let mut tui = TuiState::new(&EN);
        assert!(handle_key(&mut tui, key('a')).is_empty());

        tui.session.user.profile_image_url = "https://img/x.png".to_string();
        let effects = handle_key(&mut tui, key('a'));
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::OpenBrowser { url }] if url == "https://img/x.png"
        ));
    }
}
