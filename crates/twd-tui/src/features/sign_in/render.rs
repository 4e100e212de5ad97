use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use crate::common::spinner;
use crate::common::text::display_width;
use crate::overlays::render_utils::{InputHint, calculate_overlay_area, render_hints};
use crate::state::TuiState;

const CARD_WIDTH: u16 = 44;
const CARD_HEIGHT: u16 = 14;
const TWITCH_PURPLE: Color = Color::Rgb(145, 70, 255);
const BUTTON_ICON: &str = "◆";

pub fn render_sign_in(frame: &mut Frame, area: Rect, tui: &TuiState) {
    let strings = tui.strings;
    let card = calculate_overlay_area(area, CARD_WIDTH, CARD_HEIGHT);

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "twd",
                Style::default()
                    .fg(TWITCH_PURPLE)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", strings.partner),
                Style::default().fg(Color::Gray),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            strings.description,
            Style::default().fg(Color::White),
        )),
        Line::from(""),
    ];
    lines.extend(button_lines(tui, card.width.saturating_sub(4)));
    if let Some(notice) = tui.notice {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            notice,
            Style::default().fg(Color::Yellow),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));
    let para = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(para, card);

    render_hints(
        frame,
        area,
        &[
            InputHint::new("Enter", strings.hint_sign_in),
            InputHint::new("q", strings.hint_quit),
        ],
        TWITCH_PURPLE,
    );
}

/// The call-to-action. The icon becomes a spinner while signing in.
fn button_lines(tui: &TuiState, max_width: u16) -> Vec<Line<'static>> {
    let strings = tui.strings;
    let logging_in = tui.session.is_logging_in();
    let icon = if logging_in {
        spinner(tui.spinner_frame)
    } else {
        BUTTON_ICON
    };
    let label = if logging_in {
        strings.signing_in
    } else {
        strings.sign_in_button
    };

    let content = format!(" {icon}  {label} ");
    let width = display_width(&content).min(max_width.saturating_sub(2));
    let edge = "─".repeat(usize::from(width));
    let style = Style::default().fg(Color::White).bg(TWITCH_PURPLE);
    vec![
        Line::from(Span::styled(
            format!("╭{edge}╮"),
            Style::default().fg(TWITCH_PURPLE),
        )),
        Line::from(vec![
            Span::styled("│", Style::default().fg(TWITCH_PURPLE)),
            Span::styled(content, style.add_modifier(Modifier::BOLD)),
            Span::styled("│", Style::default().fg(TWITCH_PURPLE)),
        ]),
        Line::from(Span::styled(
            format!("╰{edge}╯"),
            Style::default().fg(TWITCH_PURPLE),
        )),
    ]
}
