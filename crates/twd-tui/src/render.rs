//! Top-level render function.

use ratatui::Frame;

use crate::features::{profile, sign_in};
use crate::overlays::render_busy_overlay;
use crate::state::AppState;

/// Main screen by session state, then the busy overlay, then any alert.
pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let tui = &app.tui;

    if tui.session.signed_in {
        profile::render_profile(frame, area, tui);
    } else {
        sign_in::render_sign_in(frame, area, tui);
    }

    if tui.is_busy() {
        render_busy_overlay(frame, area, tui);
    }

    if let Some(overlay) = &app.overlay {
        overlay.render(frame, area, tui.strings);
    }
}
