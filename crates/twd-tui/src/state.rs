//! Application state composition.
//!
//! ```text
//! AppState
//! ├── tui: TuiState
//! │   ├── session: SessionSnapshot (mirrored from the auth session)
//! │   ├── auth_url / notice        (view-only extras)
//! │   ├── task_seq, tasks          (sign-in / sign-out task lifecycle)
//! │   └── spinner_frame, should_quit
//! └── overlay: Option<Overlay>     (modal alert)
//! ```
//!
//! The view never owns credentials. Everything it knows about the session
//! comes from snapshots.

use twd_core::auth::SessionSnapshot;

use crate::common::{TaskSeq, Tasks};
use crate::locale::Strings;
use crate::overlays::Overlay;

pub struct AppState {
    pub tui: TuiState,
    pub overlay: Option<Overlay>,
}

impl AppState {
    pub fn new(strings: &'static Strings) -> Self {
        Self {
            tui: TuiState::new(strings),
            overlay: None,
        }
    }
}

pub struct TuiState {
    pub strings: &'static Strings,
    pub session: SessionSnapshot,
    /// Authorization URL of the attempt in flight, shown as a fallback.
    pub auth_url: Option<String>,
    /// One-line status under the main card.
    pub notice: Option<&'static str>,
    pub task_seq: TaskSeq,
    pub tasks: Tasks,
    pub spinner_frame: usize,
    pub should_quit: bool,
}

impl TuiState {
    pub fn new(strings: &'static Strings) -> Self {
        Self {
            strings,
            session: SessionSnapshot::default(),
            auth_url: None,
            notice: None,
            task_seq: TaskSeq::default(),
            tasks: Tasks::default(),
            spinner_frame: 0,
            should_quit: false,
        }
    }

    /// Sign-in or sign-out in flight, by snapshot or by task.
    pub fn is_busy(&self) -> bool {
        self.session.is_logging_in() || self.session.is_logging_out() || self.tasks.is_any_running()
    }
}
