use crossterm::event::{KeyCode, KeyEvent};

use crate::effects::UiEffect;
use crate::state::TuiState;

/// Starts a sign-in unless one is already running or a user is signed in.
pub fn start_sign_in(tui: &mut TuiState) -> Vec<UiEffect> {
    if tui.is_busy() || tui.session.signed_in {
        return vec![];
    }
    tui.notice = None;
    tui.auth_url = None;
    let task = tui.task_seq.next_id();
    tui.tasks.sign_in.mark_pending(task);
    vec![UiEffect::SignIn { task }]
}

pub fn handle_key(tui: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => start_sign_in(tui),
        KeyCode::Esc | KeyCode::Char('q') => vec![UiEffect::Quit],
        _ => vec![],
    }
}
