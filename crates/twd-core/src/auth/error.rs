use std::fmt;

use crate::api::ApiError;

/// Coarse category of an [`AuthError`], for callers that only branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    Busy,
    AlreadySignedIn,
    InvalidState,
    MissingAccessToken,
    EmptyProfile,
    Provider,
    Api,
    Session,
    Config,
}

/// Sign-in / sign-out failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Another sign-in or sign-out is in flight.
    Busy,
    /// Sign-in requested while a user is signed in.
    AlreadySignedIn,
    /// Redirect `state` does not match the request (possible forgery).
    InvalidState,
    /// Redirect carried no `access_token`.
    MissingAccessToken,
    /// `/users` returned an empty list.
    EmptyProfile,
    /// The provider redirected with an `error` other than `access_denied`.
    Provider {
        error: String,
        description: Option<String>,
    },
    Api(ApiError),
    /// The interactive session could not run (bind, I/O, browser).
    Session(String),
    Config(String),
}

impl AuthError {
    pub fn kind(&self) -> AuthErrorKind {
        match self {
            AuthError::Busy => AuthErrorKind::Busy,
            AuthError::AlreadySignedIn => AuthErrorKind::AlreadySignedIn,
            AuthError::InvalidState => AuthErrorKind::InvalidState,
            AuthError::MissingAccessToken => AuthErrorKind::MissingAccessToken,
            AuthError::EmptyProfile => AuthErrorKind::EmptyProfile,
            AuthError::Provider { .. } => AuthErrorKind::Provider,
            AuthError::Api(_) => AuthErrorKind::Api,
            AuthError::Session(_) => AuthErrorKind::Session,
            AuthError::Config(_) => AuthErrorKind::Config,
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Busy => write!(f, "Another sign-in or sign-out is in progress"),
            AuthError::AlreadySignedIn => write!(f, "Already signed in"),
            AuthError::InvalidState => write!(f, "Invalid state value"),
            AuthError::MissingAccessToken => write!(f, "Redirect did not include an access token"),
            AuthError::EmptyProfile => write!(f, "Profile endpoint returned no users"),
            AuthError::Provider {
                error,
                description: Some(description),
            } => write!(f, "Provider error {error}: {description}"),
            AuthError::Provider {
                error,
                description: None,
            } => write!(f, "Provider error {error}"),
            AuthError::Api(err) => write!(f, "Profile request failed: {err}"),
            AuthError::Session(msg) => write!(f, "Authorization session failed: {msg}"),
            AuthError::Config(msg) => write!(f, "Invalid auth configuration: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        AuthError::Api(err)
    }
}
