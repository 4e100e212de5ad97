use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::common::spinner;
use crate::common::text::truncate_middle;
use crate::overlays::render_utils::{
    InputHint, calculate_overlay_area, inner_area, render_hints, render_overlay_container,
};
use crate::state::TuiState;

const LABEL_WIDTH: usize = 8;

pub fn render_profile(frame: &mut Frame, area: Rect, tui: &TuiState) {
    let strings = tui.strings;
    let popup = calculate_overlay_area(area, 64, 12);
    render_overlay_container(frame, popup, strings.profile_title, Color::Magenta);
    let inner = inner_area(popup);

    let lines = profile_lines(tui, usize::from(inner.width));
    let body = Rect::new(inner.x, inner.y, inner.width, inner.height.saturating_sub(1));
    frame.render_widget(Paragraph::new(lines), body);

    render_hints(
        frame,
        inner,
        &[
            InputHint::new("o", strings.hint_sign_out),
            InputHint::new("a", strings.hint_open_url),
            InputHint::new("q", strings.hint_quit),
        ],
        Color::Magenta,
    );
}

fn profile_lines(tui: &TuiState, width: usize) -> Vec<Line<'static>> {
    let strings = tui.strings;
    let user = &tui.session.user;
    let value_width = width.saturating_sub(LABEL_WIDTH + 1);
    let field = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(
                format!("{label:<width$} ", width = LABEL_WIDTH),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(
                truncate_middle(&value, value_width),
                Style::default().fg(Color::White),
            ),
        ])
    };

    let mut lines = vec![
        Line::from(""),
        field(strings.display_name, user.display_name.clone()),
        field(strings.email, user.email.clone()),
        field(strings.user_id, user.id.to_string()),
        field(strings.profile_image, user.profile_image_url.clone()),
        Line::from(""),
    ];

    let (icon, label) = if tui.session.is_logging_out() {
        (spinner(tui.spinner_frame), strings.signing_out)
    } else {
        ("⏻", strings.sign_out_button)
    };
    lines.push(Line::from(Span::styled(
        format!("{icon} {label}"),
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
    )));
    if let Some(notice) = tui.notice {
        lines.push(Line::from(Span::styled(
            notice,
            Style::default().fg(Color::Yellow),
        )));
    }
    lines
}

#[cfg(test)]
mod tests {
    use twd_core::api::User;

    use super::*;
    use crate::locale::EN;

    #[test]
    fn test_profile_lists_user_fields() {
        let mut tui = TuiState::new(&EN);
        tui.session.user = User {
            id: 141_981_764,
            display_name: "TwitchDev".to_string(),
            email: "dev@twitch.tv".to_string(),
            profile_image_url: "https://img/x.png".to_string(),
        };
        let text: Vec<String> = profile_lines(&tui, 60)
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert!(text.iter().any(|l| l.contains("TwitchDev")));
        assert!(text.iter().any(|l| l.contains("dev@twitch.tv")));
        assert!(text.iter().any(|l| l.contains("141981764")));
        assert!(text.iter().any(|l| l.contains("Sign out")));
    }
}
