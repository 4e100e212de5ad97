//! In-memory sign-in session.
//!
//! `AuthSession` owns the signed-in user and access token. State lives in a
//! `watch` channel so observers (the sign-in view) get every transition, and
//! phase changes are check-and-set under the channel's lock.

use reqwest::header::{AUTHORIZATION, HeaderValue};
use tokio::sync::watch;

use super::browser::{InteractiveSession, SessionResult};
use super::error::AuthError;
use super::request::{AuthorizeRequest, RedirectParams};
use super::revoke::revoke_token;
use super::Endpoints;
use crate::api::{ApiClient, BearerToken, CLIENT_ID_HEADER, DefaultHeaders, User, fetch_current_user};
use crate::config::Config;

/// Provider error code sent when the user refuses consent.
const ACCESS_DENIED: &str = "access_denied";

/// What the session is doing right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    LoggingIn,
    LoggingOut,
}

/// Observer view of the session. Never carries the token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: User,
    pub signed_in: bool,
    pub phase: Phase,
}

impl SessionSnapshot {
    pub fn is_logging_in(&self) -> bool {
        self.phase == Phase::LoggingIn
    }

    pub fn is_logging_out(&self) -> bool {
        self.phase == Phase::LoggingOut
    }
}

#[derive(Debug, Default)]
struct SessionState {
    user: User,
    token: Option<BearerToken>,
    phase: Phase,
}

impl SessionState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            user: self.user.clone(),
            signed_in: self.token.is_some(),
            phase: self.phase,
        }
    }
}

/// Receives session snapshots as they change.
#[derive(Debug, Clone)]
pub struct SessionWatcher {
    rx: watch::Receiver<SessionState>,
}

impl SessionWatcher {
    /// Waits for the next change.
    ///
    /// # Errors
    /// Returns an error once the session has been dropped.
    pub async fn changed(&mut self) -> Result<SessionSnapshot, watch::error::RecvError> {
        self.rx.changed().await?;
        Ok(self.rx.borrow_and_update().snapshot())
    }

    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Latest snapshot, marking it seen.
    pub fn snapshot(&mut self) -> SessionSnapshot {
        self.rx.borrow_and_update().snapshot()
    }
}

/// Result of a sign-in attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    SignedIn(User),
    /// The user refused consent on the provider page.
    Denied,
    /// The interactive session was dismissed, cancelled or locked.
    Cancelled,
}

/// What happened to the token on sign-out. Local state is cleared in every case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revocation {
    Revoked,
    Failed(String),
    /// No token was held.
    Skipped,
}

/// Static inputs of the sign-in flow.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub force_verify: bool,
    pub endpoints: Endpoints,
}

impl AuthSettings {
    /// Resolves settings from config and environment.
    ///
    /// # Errors
    /// Returns an error if no client id is configured or an endpoint is invalid.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            client_id: config.effective_client_id()?,
            redirect_uri: config.auth.redirect_uri(),
            scopes: config.twitch.scopes.clone(),
            force_verify: config.twitch.force_verify,
            endpoints: config.endpoints()?,
        })
    }

    /// A new authorization request with a fresh state nonce.
    pub fn authorize_request(&self) -> AuthorizeRequest {
        AuthorizeRequest::new(
            &self.client_id,
            &self.redirect_uri,
            &self.scopes,
            self.force_verify,
        )
    }
}

/// Returns the phase to idle when dropped, so an abandoned attempt never
/// leaves the session stuck. A sign-out guard also clears the credentials.
struct PhaseGuard<'a> {
    state: &'a watch::Sender<SessionState>,
    clear_headers: Option<&'a DefaultHeaders>,
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        if let Some(headers) = self.clear_headers {
            headers.remove(&AUTHORIZATION);
            self.state.send_modify(|state| {
                state.user = User::default();
                state.token = None;
                state.phase = Phase::Idle;
            });
        } else {
            self.state.send_if_modified(|state| {
                let busy = state.phase != Phase::Idle;
                state.phase = Phase::Idle;
                busy
            });
        }
    }
}

/// Twitch sign-in session manager.
#[derive(Debug)]
pub struct AuthSession<S> {
    settings: AuthSettings,
    api: ApiClient,
    browser: S,
    state: watch::Sender<SessionState>,
}

impl<S: InteractiveSession> AuthSession<S> {
    /// Creates a signed-out session and sets `Client-Id` on the shared client.
    ///
    /// # Errors
    /// Returns [`AuthError::Config`] if the client id is not a valid header value.
    pub fn new(settings: AuthSettings, api: ApiClient, browser: S) -> Result<Self, AuthError> {
        let client_id = HeaderValue::from_str(&settings.client_id)
            .map_err(|e| AuthError::Config(format!("client id: {e}")))?;
        api.default_headers().set(CLIENT_ID_HEADER, client_id);

        let (state, _) = watch::channel(SessionState::default());
        Ok(Self {
            settings,
            api,
            browser,
            state,
        })
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().snapshot()
    }

    pub fn subscribe(&self) -> SessionWatcher {
        SessionWatcher {
            rx: self.state.subscribe(),
        }
    }

    pub fn user(&self) -> User {
        self.state.borrow().user.clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.borrow().token.is_some()
    }

    pub fn is_logging_in(&self) -> bool {
        self.state.borrow().phase == Phase::LoggingIn
    }

    pub fn is_logging_out(&self) -> bool {
        self.state.borrow().phase == Phase::LoggingOut
    }

    /// Moves `Idle -> next`, rejecting re-entrant calls.
    fn begin(&self, next: Phase) -> Result<(), AuthError> {
        let mut rejection = None;
        self.state.send_if_modified(|state| {
            if state.phase != Phase::Idle {
                rejection = Some(AuthError::Busy);
                return false;
            }
            if next == Phase::LoggingIn && state.token.is_some() {
                rejection = Some(AuthError::AlreadySignedIn);
                return false;
            }
            state.phase = next;
            true
        });
        rejection.map_or(Ok(()), Err)
    }

    /// Runs the implicit-grant sign-in.
    ///
    /// Nothing is stored unless the state check and the profile fetch both
    /// succeed. The phase returns to idle on every exit path, including when
    /// the returned future is dropped.
    ///
    /// # Errors
    /// See [`AuthError`]. A refused consent or an abandoned browser session is
    /// not an error and comes back as a [`SignInOutcome`].
    pub async fn sign_in(&self) -> Result<SignInOutcome, AuthError> {
        self.begin(Phase::LoggingIn)?;
        let _guard = PhaseGuard {
            state: &self.state,
            clear_headers: None,
        };

        let result = self.run_sign_in().await;
        match &result {
            Ok(SignInOutcome::SignedIn(user)) => {
                tracing::info!(user_id = user.id, display_name = %user.display_name, "Signed in");
            }
            Ok(SignInOutcome::Denied) => tracing::info!("Sign-in denied by user"),
            Ok(SignInOutcome::Cancelled) => tracing::info!("Sign-in cancelled"),
            Err(e) => tracing::error!(error = %e, kind = ?e.kind(), "Sign-in failed"),
        }
        result
    }

    async fn run_sign_in(&self) -> Result<SignInOutcome, AuthError> {
        let request = self.settings.authorize_request();
        let auth_url = request.url(&self.settings.endpoints.authorize_url);
        tracing::debug!(redirect_uri = %request.redirect_uri(), "Starting authorization session");

        let params = match self.browser.start(&auth_url).await? {
            SessionResult::Success { params } => params,
            SessionResult::Error { params } => {
                return denied_or_provider_error(&params).map_or(Ok(SignInOutcome::Denied), Err);
            }
            SessionResult::Dismiss | SessionResult::Cancel | SessionResult::Locked => {
                return Ok(SignInOutcome::Cancelled);
            }
        };

        if params.contains_key("error") {
            return denied_or_provider_error(&params).map_or(Ok(SignInOutcome::Denied), Err);
        }

        if params.get("state").map(String::as_str) != Some(request.state()) {
            return Err(AuthError::InvalidState);
        }

        let token = params
            .get("access_token")
            .map(String::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(BearerToken::new)
            .ok_or(AuthError::MissingAccessToken)?;
        let authorization = token.header_value()?;

        let user = fetch_current_user(&self.api, Some(&token))
            .await?
            .ok_or(AuthError::EmptyProfile)?;

        self.api
            .default_headers()
            .set(AUTHORIZATION, authorization);
        self.state.send_modify(|state| {
            state.user = user.clone();
            state.token = Some(token);
            state.phase = Phase::Idle;
        });

        Ok(SignInOutcome::SignedIn(user))
    }

    /// Revokes the token (if any) and clears the session.
    ///
    /// Local state is cleared whatever happens to the revocation request,
    /// including when the future is dropped.
    ///
    /// # Errors
    /// Returns [`AuthError::Busy`] while another sign-in or sign-out runs.
    pub async fn sign_out(&self) -> Result<Revocation, AuthError> {
        self.begin(Phase::LoggingOut)?;
        let _guard = PhaseGuard {
            state: &self.state,
            clear_headers: Some(self.api.default_headers()),
        };

        let token = self.state.borrow().token.clone();
        let Some(token) = token else {
            tracing::debug!("Sign-out without a token, skipping revocation");
            return Ok(Revocation::Skipped);
        };

        let revocation = match revoke_token(
            self.api.http(),
            &self.settings.endpoints.revoke_url,
            &self.settings.client_id,
            &token,
        )
        .await
        {
            Ok(()) => {
                tracing::info!("Token revoked");
                Revocation::Revoked
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token revocation failed");
                Revocation::Failed(e.to_string())
            }
        };
        Ok(revocation)
    }
}

/// `None` for a refused consent, the provider error otherwise.
fn denied_or_provider_error(params: &RedirectParams) -> Option<AuthError> {
    let error = params.get("error").map_or("unknown_error", String::as_str);
    if error == ACCESS_DENIED {
        return None;
    }
    Some(AuthError::Provider {
        error: error.to_string(),
        description: params.get("error_description").cloned(),
    })
}
