//! Sign-in commands for the shell.

use std::io::IsTerminal;

use anyhow::{Result, bail};
use twd_core::api::{ApiClient, User};
use twd_core::auth::{AuthSession, AuthSettings, ConfiguredSession, Revocation, SignInOutcome};
use twd_core::config::Config;
use twd_core::interrupt::{self, InterruptedError};

pub struct LoginOptions {
    pub no_browser: bool,
    /// Leave the token unrevoked when the command exits.
    pub keep: bool,
}

/// Signs in once, prints the profile, then signs out unless `keep` is set.
///
/// Uses the loopback redirect when stdin is a terminal and falls back to
/// pasting the redirected URL otherwise.
pub async fn login(config: &Config, options: LoginOptions) -> Result<()> {
    let settings = AuthSettings::from_config(config)?;
    let api = ApiClient::new(settings.endpoints.api_base_url.clone());

    let interactive = std::io::stdin().is_terminal();
    tracing::debug!(interactive, no_browser = options.no_browser, "Starting login");
    let browser = match ConfiguredSession::from_config(&config.auth, interactive) {
        ConfiguredSession::Loopback(mut loopback) => {
            if options.no_browser {
                loopback = loopback.with_open_browser(false);
            }
            ConfiguredSession::Loopback(loopback.with_url_hook(|url| {
                eprintln!("Open this URL to sign in with Twitch:\n\n  {url}\n");
            }))
        }
        paste => paste,
    };

    let session = AuthSession::new(settings, api, browser)?;

    let outcome = tokio::select! {
        outcome = session.sign_in() => outcome?,
        () = interrupt::wait_for_interrupt() => return Err(InterruptedError.into()),
    };

    match outcome {
        SignInOutcome::SignedIn(user) => print_user(&user),
        SignInOutcome::Denied => bail!("Sign-in was denied on the Twitch consent page"),
        SignInOutcome::Cancelled => bail!("Sign-in was cancelled"),
    }

    if options.keep {
        eprintln!("Token kept; it is not revoked and expires on its own.");
        return Ok(());
    }

    match session.sign_out().await? {
        Revocation::Revoked => eprintln!("Signed out; token revoked."),
        Revocation::Failed(reason) => eprintln!("Signed out; token revocation failed: {reason}"),
        Revocation::Skipped => eprintln!("Signed out."),
    }
    Ok(())
}

/// Prints an authorization URL with a fresh state value.
pub fn auth_url(config: &Config) -> Result<()> {
    let settings = AuthSettings::from_config(config)?;
    let request = settings.authorize_request();
    println!("{}", request.url(&settings.endpoints.authorize_url));
    Ok(())
}

fn print_user(user: &User) {
    println!("Signed in as {}", user.display_name);
    println!("  id:     {}", user.id);
    if !user.email.is_empty() {
        println!("  email:  {}", user.email);
    }
    if !user.profile_image_url.is_empty() {
        println!("  avatar: {}", user.profile_image_url);
    }
}
