//! UI events consumed by the reducer.

use crossterm::event::Event;
use twd_core::auth::{Revocation, SessionSnapshot, SignInOutcome};

use crate::common::{TaskCompleted, TaskKind, TaskStarted};

#[derive(Debug)]
pub enum UiEvent {
    /// Animation tick; the only event that triggers a redraw.
    Tick,
    Terminal(Event),
    /// The session published a new snapshot.
    Session(SessionSnapshot),
    /// The authorization URL of the attempt in flight.
    AuthUrl(String),
    TaskStarted {
        kind: TaskKind,
        started: TaskStarted,
    },
    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },
    /// Errors arrive as display text; the detail is already logged.
    SignInFinished(Result<SignInOutcome, String>),
    SignOutFinished(Result<Revocation, String>),
}
