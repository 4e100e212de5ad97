//! Overlay modules for the TUI.
//!
//! - `alert.rs`: modal error notice, takes over keyboard input until dismissed
//! - `busy.rs`: blocking overlay derived from the session phase
//! - `render_utils.rs`: shared rendering helpers

pub mod alert;
pub mod busy;
pub mod render_utils;

pub use alert::AlertState;
pub use busy::render_busy_overlay;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::locale::Strings;

/// Transition returned by overlay key handlers.
#[derive(Debug)]
pub enum OverlayTransition {
    Stay,
    Close,
}

#[derive(Debug)]
pub struct OverlayUpdate {
    pub transition: OverlayTransition,
}

impl OverlayUpdate {
    fn new(transition: OverlayTransition) -> Self {
        Self { transition }
    }

    pub fn stay() -> Self {
        Self::new(OverlayTransition::Stay)
    }

    pub fn close() -> Self {
        Self::new(OverlayTransition::Close)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Alert(AlertState),
}

impl Overlay {
    pub fn render(&self, frame: &mut Frame, area: Rect, strings: &Strings) {
        match self {
            Overlay::Alert(a) => a.render(frame, area, strings),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> OverlayUpdate {
        match self {
            Overlay::Alert(a) => a.handle_key(key),
        }
    }
}
