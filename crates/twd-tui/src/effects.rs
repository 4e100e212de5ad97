//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! The reducer decides; the runtime spawns tasks, cancels tokens and opens
//! URLs.

use tokio_util::sync::CancellationToken;

use crate::common::TaskId;

#[derive(Debug)]
pub enum UiEffect {
    Quit,
    /// Run `AuthSession::sign_in` as a cancelable task.
    SignIn { task: TaskId },
    /// Run `AuthSession::sign_out`.
    SignOut { task: TaskId },
    CancelTask { token: Option<CancellationToken> },
    OpenBrowser { url: String },
}
