use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use super::OverlayUpdate;
use super::render_utils::{
    InputHint, calculate_overlay_area, inner_area, render_hints, render_overlay_container,
};
use crate::locale::Strings;

/// A modal notice with a title and a message, dismissed with Enter or Esc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertState {
    pub title: &'static str,
    pub message: &'static str,
}

impl AlertState {
    pub fn sign_in_error(strings: &Strings) -> Self {
        Self {
            title: strings.sign_in_error_title,
            message: strings.sign_in_error_body,
        }
    }

    pub fn sign_out_error(strings: &Strings) -> Self {
        Self {
            title: strings.sign_out_error_title,
            message: strings.sign_out_error_body,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> OverlayUpdate {
        match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ' | 'q') => OverlayUpdate::close(),
            _ => OverlayUpdate::stay(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, strings: &Strings) {
        let popup = calculate_overlay_area(area, 48, 7);
        render_overlay_container(frame, popup, self.title, Color::Red);

        let inner = inner_area(popup);
        let body = Rect::new(inner.x, inner.y, inner.width, inner.height.saturating_sub(1));
        let para = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(self.message, Style::default().fg(Color::White))),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        frame.render_widget(para, body);

        render_hints(
            frame,
            inner,
            &[InputHint::new("Enter", strings.hint_dismiss)],
            Color::Red,
        );
    }
}
