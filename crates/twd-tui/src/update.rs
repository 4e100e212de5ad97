//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use twd_core::auth::{Revocation, SignInOutcome};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::features::{profile, sign_in};
use crate::overlays::{AlertState, Overlay, OverlayTransition};
use crate::state::{AppState, TuiState};

pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.tui.spinner_frame = app.tui.spinner_frame.wrapping_add(1);
            vec![]
        }
        UiEvent::Terminal(Event::Key(key)) if key.kind == KeyEventKind::Press => {
            handle_key(app, key)
        }
        UiEvent::Terminal(_) => vec![],
        UiEvent::Session(snapshot) => {
            if !snapshot.is_logging_in() && !app.tui.tasks.sign_in.is_running() {
                app.tui.auth_url = None;
            }
            app.tui.session = snapshot;
            vec![]
        }
        UiEvent::AuthUrl(url) => {
            if app.tui.tasks.sign_in.is_running() {
                app.tui.auth_url = Some(url);
            }
            vec![]
        }
        UiEvent::TaskStarted { kind, started } => {
            app.tui.tasks.state_mut(kind).on_started(&started);
            vec![]
        }
        UiEvent::TaskCompleted { kind, completed } => {
            if app.tui.tasks.state_mut(kind).finish_if_active(completed.id) {
                update(app, *completed.result)
            } else {
                vec![]
            }
        }
        UiEvent::SignInFinished(result) => {
            handle_sign_in_result(app, result);
            vec![]
        }
        UiEvent::SignOutFinished(result) => {
            handle_sign_out_result(app, result);
            vec![]
        }
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');

    if let Some(overlay) = &mut app.overlay {
        if ctrl_c {
            return vec![UiEffect::Quit];
        }
        let update = overlay.handle_key(key);
        if matches!(update.transition, OverlayTransition::Close) {
            app.overlay = None;
        }
        return vec![];
    }

    // Blocking overlay: only cancellation gets through. A sign-out cannot
    // be cancelled, but Ctrl+C still quits; the session clears itself when
    // the task is dropped.
    if app.tui.is_busy() {
        if ctrl_c && !app.tui.tasks.sign_in.is_running() {
            return vec![UiEffect::Quit];
        }
        if key.code == KeyCode::Esc || ctrl_c {
            return cancel_sign_in(&app.tui);
        }
        return vec![];
    }

    if ctrl_c {
        return vec![UiEffect::Quit];
    }

    if app.tui.session.signed_in {
        profile::handle_key(&mut app.tui, key)
    } else {
        sign_in::handle_key(&mut app.tui, key)
    }
}

/// Cancels the sign-in task. Sign-out is not cancelable from the view.
pub fn cancel_sign_in(tui: &TuiState) -> Vec<UiEffect> {
    if tui.tasks.sign_in.is_running() {
        vec![UiEffect::CancelTask {
            token: tui.tasks.sign_in.cancel.clone(),
        }]
    } else {
        vec![]
    }
}

fn handle_sign_in_result(app: &mut AppState, result: Result<SignInOutcome, String>) {
    let strings = app.tui.strings;
    app.tui.auth_url = None;
    match result {
        Ok(SignInOutcome::SignedIn(_)) => app.tui.notice = None,
        Ok(SignInOutcome::Denied) => app.tui.notice = Some(strings.sign_in_denied),
        Ok(SignInOutcome::Cancelled) => app.tui.notice = Some(strings.sign_in_cancelled),
        Err(_) => app.overlay = Some(Overlay::Alert(AlertState::sign_in_error(strings))),
    }
}

fn handle_sign_out_result(app: &mut AppState, result: Result<Revocation, String>) {
    let strings = app.tui.strings;
    match result {
        Ok(Revocation::Revoked | Revocation::Skipped) => app.tui.notice = Some(strings.signed_out),
        Ok(Revocation::Failed(_)) => app.tui.notice = Some(strings.revoke_failed),
        Err(_) => app.overlay = Some(Overlay::Alert(AlertState::sign_out_error(strings))),
    }
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;
    use twd_core::api::User;
    use twd_core::auth::{Phase, SessionSnapshot};

    use super::*;
    use crate::common::{TaskCompleted, TaskId, TaskKind, TaskStarted};
    use crate::locale::{EN, PT_BR};

    fn press(code: KeyCode) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn ctrl_c() -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )))
    }

    fn start_sign_in(app: &mut AppState) -> (TaskId, CancellationToken) {
        let effects = update(app, press(KeyCode::Enter));
        let [UiEffect::SignIn { task }] = effects.as_slice() else {
            panic!("expected sign-in effect, got {effects:?}");
        };
        let token = CancellationToken::new();
        update(
            app,
            UiEvent::TaskStarted {
                kind: TaskKind::SignIn,
                started: TaskStarted {
                    id: *task,
                    cancel: Some(token.clone()),
                },
            },
        );
        update(
            app,
            UiEvent::Session(SessionSnapshot {
                phase: Phase::LoggingIn,
                ..Default::default()
            }),
        );
        (*task, token)
    }

    fn complete(app: &mut AppState, kind: TaskKind, id: TaskId, result: UiEvent) {
        update(
            app,
            UiEvent::TaskCompleted {
                kind,
                completed: TaskCompleted {
                    id,
                    result: Box::new(result),
                },
            },
        );
    }

    #[test]
    fn test_keys_blocked_while_logging_in() {
        let mut app = AppState::new(&EN);
        start_sign_in(&mut app);

        assert!(update(&mut app, press(KeyCode::Enter)).is_empty());
        assert!(update(&mut app, press(KeyCode::Char('q'))).is_empty());
        assert!(!app.tui.should_quit);
    }

    #[test]
    fn test_esc_cancels_sign_in() {
        let mut app = AppState::new(&EN);
        let (_, token) = start_sign_in(&mut app);

        let effects = update(&mut app, press(KeyCode::Esc));
        let [UiEffect::CancelTask { token: Some(sent) }] = effects.as_slice() else {
            panic!("expected cancel effect, got {effects:?}");
        };
        sent.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_ctrl_c_cancels_when_busy_and_quits_when_idle() {
        let mut app = AppState::new(&EN);
        assert!(matches!(update(&mut app, ctrl_c()).as_slice(), [UiEffect::Quit]));

        start_sign_in(&mut app);
        assert!(matches!(
            update(&mut app, ctrl_c()).as_slice(),
            [UiEffect::CancelTask { .. }]
        ));
    }

    #[test]
    fn test_double_enter_emits_one_sign_in() {
        let mut app = AppState::new(&EN);
        let first = update(&mut app, press(KeyCode::Enter));
        let second = update(&mut app, press(KeyCode::Enter));
        assert!(matches!(first.as_slice(), [UiEffect::SignIn { .. }]));
        assert!(second.is_empty());
    }

    #[test]
    fn test_ctrl_c_quits_during_sign_out() {
        let mut app = AppState::new(&EN);
        app.tui.session.signed_in = true;
        assert!(matches!(
            update(&mut app, press(KeyCode::Char('o'))).as_slice(),
            [UiEffect::SignOut { .. }]
        ));
        update(
            &mut app,
            UiEvent::Session(SessionSnapshot {
                signed_in: true,
                phase: Phase::LoggingOut,
                ..Default::default()
            }),
        );

        assert!(update(&mut app, press(KeyCode::Esc)).is_empty());
        assert!(matches!(update(&mut app, ctrl_c()).as_slice(), [UiEffect::Quit]));
    }

    #[test]
    fn test_sign_in_error_shows_generic_alert() {
        let mut app = AppState::new(&PT_BR);
        let (task, _) = start_sign_in(&mut app);
        update(&mut app, UiEvent::Session(SessionSnapshot::default()));
        complete(
            &mut app,
            TaskKind::SignIn,
            task,
            UiEvent::SignInFinished(Err("Invalid state value".to_string())),
        );

        let Some(Overlay::Alert(alert)) = &app.overlay else {
            panic!("expected alert");
        };
        assert_eq!(alert.title, "Erro SignIn");
        assert_eq!(alert.message, "Ocorreu um erro ao tentar logar no app");
        assert!(!app.tui.tasks.sign_in.is_running());

        // Enter dismisses, then Enter starts a new attempt.
        assert!(update(&mut app, press(KeyCode::Enter)).is_empty());
        assert!(app.overlay.is_none());
        assert!(matches!(
            update(&mut app, press(KeyCode::Enter)).as_slice(),
            [UiEffect::SignIn { .. }]
        ));
    }

    #[test]
    fn test_cancelled_and_denied_show_notice() {
        let mut app = AppState::new(&EN);
        let (task, _) = start_sign_in(&mut app);
        complete(
            &mut app,
            TaskKind::SignIn,
            task,
            UiEvent::SignInFinished(Ok(SignInOutcome::Cancelled)),
        );
        assert_eq!(app.tui.notice, Some(EN.sign_in_cancelled));
        assert!(app.overlay.is_none());

        update(&mut app, UiEvent::Session(SessionSnapshot::default()));
        let (task, _) = start_sign_in(&mut app);
        assert!(app.tui.notice.is_none());
        complete(
            &mut app,
            TaskKind::SignIn,
            task,
            UiEvent::SignInFinished(Ok(SignInOutcome::Denied)),
        );
        assert_eq!(app.tui.notice, Some(EN.sign_in_denied));
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut app = AppState::new(&EN);
        let (task, _) = start_sign_in(&mut app);
        complete(
            &mut app,
            TaskKind::SignIn,
            TaskId(task.0 + 100),
            UiEvent::SignInFinished(Err("late".to_string())),
        );
        assert!(app.overlay.is_none());
        assert!(app.tui.tasks.sign_in.is_running());
    }

    #[test]
    fn test_auth_url_kept_only_during_sign_in() {
        let mut app = AppState::new(&EN);
        update(&mut app, UiEvent::AuthUrl("https://stale".to_string()));
        assert!(app.tui.auth_url.is_none());

        let (task, _) = start_sign_in(&mut app);
        update(&mut app, UiEvent::AuthUrl("https://id.twitch.tv/x".to_string()));
        assert_eq!(app.tui.auth_url.as_deref(), Some("https://id.twitch.tv/x"));

        complete(
            &mut app,
            TaskKind::SignIn,
            task,
            UiEvent::SignInFinished(Ok(SignInOutcome::Cancelled)),
        );
        assert!(app.tui.auth_url.is_none());
    }

    #[test]
    fn test_signed_in_snapshot_switches_to_profile_keys() {
        let mut app = AppState::new(&EN);
        update(
            &mut app,
            UiEvent::Session(SessionSnapshot {
                user: User {
                    id: 1,
                    display_name: "Alice".to_string(),
                    ..Default::default()
                },
                signed_in: true,
                phase: Phase::Idle,
            }),
        );
        assert!(matches!(
            update(&mut app, press(KeyCode::Char('o'))).as_slice(),
            [UiEffect::SignOut { .. }]
        ));
        // Enter does not start a second sign-in.
        assert!(update(&mut app, press(KeyCode::Enter)).is_empty());
    }

    #[test]
    fn test_sign_out_results() {
        let mut app = AppState::new(&EN);
        let id = TaskId(7);
        let started = |app: &mut AppState| {
            update(
                app,
                UiEvent::TaskStarted {
                    kind: TaskKind::SignOut,
                    started: TaskStarted { id, cancel: None },
                },
            );
        };

        started(&mut app);
        complete(
            &mut app,
            TaskKind::SignOut,
            id,
            UiEvent::SignOutFinished(Ok(Revocation::Failed("HTTP 500".to_string()))),
        );
        assert_eq!(app.tui.notice, Some(EN.revoke_failed));

        started(&mut app);
        complete(
            &mut app,
            TaskKind::SignOut,
            id,
            UiEvent::SignOutFinished(Ok(Revocation::Revoked)),
        );
        assert_eq!(app.tui.notice, Some(EN.signed_out));

        started(&mut app);
        complete(
            &mut app,
            TaskKind::SignOut,
            id,
            UiEvent::SignOutFinished(Err("busy".to_string())),
        );
        assert!(matches!(app.overlay, Some(Overlay::Alert(_))));
    }

    #[test]
    fn test_tick_advances_spinner() {
        let mut app = AppState::new(&EN);
        update(&mut app, UiEvent::Tick);
        update(&mut app, UiEvent::Tick);
        assert_eq!(app.tui.spinner_frame, 2);
    }
}
