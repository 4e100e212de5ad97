//! Interactive authorization sessions.
//!
//! A session takes the user to the authorization URL and hands back the
//! parameters of the redirect. The manager never talks to the browser itself.

use std::future::Future;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use super::error::AuthError;
use super::loopback::LoopbackSession;
use super::request::{RedirectParams, parse_redirect_params};
use crate::config::AuthConfig;

/// How an interactive session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionResult {
    /// The provider redirected back. An `error` param may still be present.
    Success { params: RedirectParams },
    /// The session itself classified the redirect as an error.
    Error { params: RedirectParams },
    /// The user never completed the flow (window closed, timed out).
    Dismiss,
    /// The user aborted explicitly.
    Cancel,
    /// Another session already owns the redirect target.
    Locked,
}

/// Opens an authorization URL and waits for the redirect.
pub trait InteractiveSession: Send + Sync {
    /// Runs the session to completion.
    ///
    /// # Errors
    /// Returns [`AuthError::Session`] when the session cannot run at all.
    fn start(&self, auth_url: &str)
    -> impl Future<Output = Result<SessionResult, AuthError>> + Send;
}

type LineReader = Arc<dyn Fn() -> io::Result<String> + Send + Sync>;

/// Prints the URL and reads the redirected URL back from the user.
#[derive(Clone)]
pub struct PasteSession {
    read_line: LineReader,
}

impl std::fmt::Debug for PasteSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasteSession").finish_non_exhaustive()
    }
}

impl PasteSession {
    /// Reads the redirect from stdin.
    pub fn stdin() -> Self {
        Self::from_fn(|| {
            let mut input = String::new();
            io::stdin().lock().read_line(&mut input)?;
            Ok(input)
        })
    }

    pub fn from_fn(read_line: impl Fn() -> io::Result<String> + Send + Sync + 'static) -> Self {
        Self {
            read_line: Arc::new(read_line),
        }
    }
}

impl InteractiveSession for PasteSession {
    async fn start(&self, auth_url: &str) -> Result<SessionResult, AuthError> {
        eprintln!("Open this URL in a browser and authorize access:");
        eprintln!();
        eprintln!("  {auth_url}");
        eprintln!();
        eprint!("Paste the full redirect URL (or its #fragment): ");
        let _ = io::stderr().flush();

        let read_line = Arc::clone(&self.read_line);
        let input = tokio::task::spawn_blocking(move || read_line())
            .await
            .map_err(|e| AuthError::Session(format!("input task failed: {e}")))?
            .map_err(|e| AuthError::Session(format!("failed to read input: {e}")))?;

        if input.trim().is_empty() {
            return Ok(SessionResult::Cancel);
        }

        let params = parse_redirect_params(&input);
        if params.is_empty() {
            return Err(AuthError::Session(
                "input does not look like a redirect URL".to_string(),
            ));
        }
        Ok(SessionResult::Success { params })
    }
}

/// The session kind chosen from configuration and terminal capabilities.
#[derive(Debug, Clone)]
pub enum ConfiguredSession {
    Loopback(LoopbackSession),
    Paste(PasteSession),
}

impl ConfiguredSession {
    /// Loopback when `interactive`, paste otherwise.
    pub fn from_config(config: &AuthConfig, interactive: bool) -> Self {
        if interactive {
            ConfiguredSession::Loopback(LoopbackSession::from_config(config))
        } else {
            ConfiguredSession::Paste(PasteSession::stdin())
        }
    }
}

impl InteractiveSession for ConfiguredSession {
    async fn start(&self, auth_url: &str) -> Result<SessionResult, AuthError> {
        match self {
            ConfiguredSession::Loopback(session) => session.start(auth_url).await,
            ConfiguredSession::Paste(session) => session.start(auth_url).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_paste_session_parses_redirect() {
        let session = PasteSession::from_fn(|| {
            Ok("http://localhost:3000/callback#access_token=abc&state=xyz\n".to_string())
        });
        let result = session.start("https://example.com/authorize").await.unwrap();
        let SessionResult::Success { params } = result else {
            panic!("expected success, got {result:?}");
        };
        assert_eq!(params["access_token"], "abc");
        assert_eq!(params["state"], "xyz");
    }

    #[tokio::test]
    async fn test_paste_session_empty_input_cancels() {
        let session = PasteSession::from_fn(|| Ok("\n".to_string()));
        let result = session.start("https://example.com/authorize").await.unwrap();
        assert_eq!(result, SessionResult::Cancel);
    }

    #[tokio::test]
    async fn test_paste_session_garbage_is_session_error() {
        let session = PasteSession::from_fn(|| Ok("nope".to_string()));
        let err = session.start("https://example.com/authorize").await.unwrap_err();
        assert!(matches!(err, AuthError::Session(_)));
    }

    #[tokio::test]
    async fn test_paste_session_read_failure() {
        let session = PasteSession::from_fn(|| Err(io::Error::other("closed")));
        let err = session.start("https://example.com/authorize").await.unwrap_err();
        assert!(err.to_string().contains("closed"));
    }

    #[test]
    fn test_configured_session_selection() {
        let config = AuthConfig::default();
        assert!(matches!(
            ConfiguredSession::from_config(&config, true),
            ConfiguredSession::Loopback(_)
        ));
        assert!(matches!(
            ConfiguredSession::from_config(&config, false),
            ConfiguredSession::Paste(_)
        ));
    }
}
