//! Full-screen sign-in view for twd.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod locale;
pub mod overlays;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stderr};
use std::sync::Arc;

use anyhow::Result;
pub use runtime::TuiRuntime;
use twd_core::api::ApiClient;
use twd_core::auth::{AuthSession, AuthSettings, LoopbackSession, Revocation};
use twd_core::config::Config;

use crate::events::UiEvent;

/// Runs the sign-in view until the user quits.
///
/// A session still signed in at exit is signed out, so the token is revoked
/// rather than left valid after the process is gone.
pub async fn run_sign_in_view(config: &Config) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The sign-in view requires a terminal.\n\
             Use `twd login` for non-interactive sign-in."
        );
    }

    let settings = AuthSettings::from_config(config)?;
    let api = ApiClient::new(settings.endpoints.api_base_url.clone());

    let (inbox_tx, inbox_rx) = runtime::inbox::channel();
    let url_tx = inbox_tx.clone();
    let browser = LoopbackSession::from_config(&config.auth).with_url_hook(move |url| {
        let _ = url_tx.send(UiEvent::AuthUrl(url.to_string()));
    });
    let session = Arc::new(AuthSession::new(settings, api, browser)?);

    let strings = locale::strings(config.ui.locale);
    let mut runtime = TuiRuntime::new(Arc::clone(&session), strings, (inbox_tx, inbox_rx))?;
    let result = runtime.run();
    drop(runtime);
    result?;

    // A sign-out still in flight clears the session when its task drops.
    if session.is_signed_in() && !session.is_logging_out() {
        match session.sign_out().await {
            Ok(Revocation::Failed(reason)) => {
                tracing::warn!("Token revocation on exit failed: {reason}");
            }
            Ok(_) => tracing::info!("Signed out on exit"),
            Err(e) => tracing::warn!(error = %e, "Sign-out on exit failed"),
        }
    }

    Ok(())
}
