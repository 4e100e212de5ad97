//! Twitch sign-in.
//!
//! - `request`: authorization URL, state nonce, redirect parsing
//! - `browser`: the interactive session seam and its paste fallback
//! - `loopback`: browser launch + localhost redirect capture
//! - `session`: the in-memory session manager (`AuthSession`)
//! - `revoke`: token revocation

mod error;
mod revoke;

pub mod browser;
pub mod loopback;
pub mod request;
pub mod session;

pub use browser::{ConfiguredSession, InteractiveSession, PasteSession, SessionResult};
pub use error::{AuthError, AuthErrorKind};
pub use loopback::LoopbackSession;
pub use request::{AuthorizeRequest, RedirectParams, parse_redirect_params};
pub use revoke::revoke_token;
pub use session::{
    AuthSession, AuthSettings, Phase, Revocation, SessionSnapshot, SessionWatcher, SignInOutcome,
};

/// Provider endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub authorize_url: String,
    pub revoke_url: String,
    /// Helix base URL; `/users` is resolved against it.
    pub api_base_url: String,
}
