//! Effect handlers: async functions that drive the auth session and return
//! the `UiEvent` carrying their result.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use twd_core::auth::{AuthSession, InteractiveSession, SignInOutcome};

use crate::events::UiEvent;

/// Runs a sign-in. Cancelling the token drops the attempt, which returns
/// the session to idle.
pub async fn sign_in<S>(session: Arc<AuthSession<S>>, cancel: Option<CancellationToken>) -> UiEvent
where
    S: InteractiveSession + 'static,
{
    let attempt = session.sign_in();
    let result = match cancel {
        Some(token) => tokio::select! {
            result = attempt => result,
            () = token.cancelled() => {
                tracing::info!("Sign-in cancelled from the view");
                Ok(SignInOutcome::Cancelled)
            }
        },
        None => attempt.await,
    };
    UiEvent::SignInFinished(result.map_err(|e| e.to_string()))
}

pub async fn sign_out<S>(session: Arc<AuthSession<S>>) -> UiEvent
where
    S: InteractiveSession + 'static,
{
    let result = session.sign_out().await;
    UiEvent::SignOutFinished(result.map_err(|e| e.to_string()))
}
