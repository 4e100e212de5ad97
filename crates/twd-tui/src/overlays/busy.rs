//! Blocking overlay shown while a sign-in or sign-out is in flight.
//!
//! It is derived from the session snapshot, never opened or closed by hand,
//! so it cannot outlive the operation it covers.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::render_utils::{InputHint, dim_area, inner_area, render_hints, render_overlay_container};
use crate::common::spinner;
use crate::common::text::truncate_middle;
use crate::state::TuiState;

const PANEL_HEIGHT: u16 = 7;

pub fn render_busy_overlay(frame: &mut Frame, area: Rect, tui: &TuiState) {
    dim_area(frame, area);

    let strings = tui.strings;
    let logging_out = tui.session.is_logging_out();
    let title = if logging_out {
        strings.signing_out
    } else {
        strings.signing_in
    };

    let height = PANEL_HEIGHT.min(area.height);
    let width = area.width.saturating_sub(4).min(72);
    let panel = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + area.height.saturating_sub(height),
        width,
        height,
    );
    render_overlay_container(frame, panel, title, Color::Magenta);
    let inner = inner_area(panel);

    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("{} ", spinner(tui.spinner_frame)),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            if logging_out {
                strings.signing_out
            } else {
                strings.waiting_for_browser
            },
            Style::default().fg(Color::White),
        ),
    ])];
    if let Some(url) = tui.auth_url.as_deref().filter(|_| !logging_out) {
        lines.push(Line::from(Span::styled(
            strings.open_url_hint,
            Style::default().fg(Color::Gray),
        )));
        lines.push(Line::from(Span::styled(
            truncate_middle(url, usize::from(inner.width)),
            Style::default().fg(Color::DarkGray),
        )));
    }
    let body = Rect::new(inner.x, inner.y, inner.width, inner.height.saturating_sub(1));
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Left), body);

    if !logging_out {
        render_hints(
            frame,
            inner,
            &[InputHint::new("Esc", strings.hint_cancel)],
            Color::Magenta,
        );
    }
}
