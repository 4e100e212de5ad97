//! Configuration management for twd.
//!
//! Loads configuration from ${TWD_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::Endpoints;

/// Environment variable holding the application client id.
pub const CLIENT_ID_ENV: &str = "TWD_CLIENT_ID";
const AUTHORIZE_URL_ENV: &str = "TWD_AUTHORIZE_URL";
const REVOKE_URL_ENV: &str = "TWD_REVOKE_URL";
const API_BASE_URL_ENV: &str = "TWD_API_BASE_URL";

pub const DEFAULT_AUTHORIZE_URL: &str = "https://id.twitch.tv/oauth2/authorize";
pub const DEFAULT_REVOKE_URL: &str = "https://id.twitch.tv/oauth2/revoke";
pub const DEFAULT_API_BASE_URL: &str = "https://api.twitch.tv/helix";

/// Returns the default config template with comments.
///
/// Embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for twd configuration and data directories.
    //!
    //! TWD_HOME resolution order:
    //! 1. TWD_HOME environment variable (if set)
    //! 2. ~/.config/twd (default)

    use std::path::PathBuf;

    /// Returns the twd home directory.
    pub fn twd_home() -> PathBuf {
        if let Ok(home) = std::env::var("TWD_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".twd"),
            |h| h.join(".config").join("twd"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        twd_home().join("config.toml")
    }

    /// Returns the directory that holds TUI log files.
    pub fn logs_dir() -> PathBuf {
        twd_home().join("logs")
    }
}

/// UI language for the sign-in view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "pt-BR", alias = "pt-br", alias = "pt")]
    PtBr,
}

/// Twitch application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitchConfig {
    /// Application client id. `TWD_CLIENT_ID` takes precedence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorize_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoke_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    /// Scopes requested on sign-in.
    pub scopes: Vec<String>,
    /// Ask the provider to show the consent screen every time.
    pub force_verify: bool,
}

impl Default for TwitchConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            authorize_url: None,
            revoke_url: None,
            api_base_url: None,
            scopes: ["openid", "user:read:email", "user:read:follows"]
                .into_iter()
                .map(String::from)
                .collect(),
            force_verify: true,
        }
    }
}

/// Loopback redirect settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub redirect_port: u16,
    pub callback_path: String,
    pub callback_timeout_secs: u64,
    pub open_browser: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            redirect_port: 3000,
            callback_path: "/callback".to_string(),
            callback_timeout_secs: 120,
            open_browser: true,
        }
    }
}

impl AuthConfig {
    /// Redirect URI registered with the provider.
    pub fn redirect_uri(&self) -> String {
        let path = if self.callback_path.starts_with('/') {
            self.callback_path.clone()
        } else {
            format!("/{}", self.callback_path)
        };
        format!("http://localhost:{}{}", self.redirect_port, path)
    }

    pub fn callback_timeout(&self) -> Duration {
        Duration::from_secs(self.callback_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub locale: Locale,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive when TWD_LOG is unset.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub twitch: TwitchConfig,
    pub auth: AuthConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
}

impl Config {
    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        write_config(path, default_config_template())
    }

    /// Saves only the client id to a specific config file path.
    ///
    /// Creates the file from the default template if it doesn't exist.
    /// Preserves existing fields and comments using `toml_edit`.
    ///
    /// # Errors
    /// Returns an error if the config cannot be read, parsed or written.
    pub fn save_client_id_to(path: &Path, client_id: &str) -> Result<()> {
        use toml_edit::{DocumentMut, Item, Table, value};

        let client_id = client_id.trim();
        if client_id.is_empty() {
            anyhow::bail!("Client id cannot be empty");
        }

        let contents = if path.exists() {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        if !doc.contains_table("twitch") {
            doc.insert("twitch", Item::Table(Table::new()));
        }
        doc["twitch"]["client_id"] = value(client_id);

        write_config(path, &doc.to_string())
    }

    /// Returns the client id, preferring `TWD_CLIENT_ID` over the config file.
    ///
    /// # Errors
    /// Returns an error if neither source provides a non-empty value.
    pub fn effective_client_id(&self) -> Result<String> {
        let env = std::env::var(CLIENT_ID_ENV).ok();
        resolve_value(env.as_deref(), self.twitch.client_id.as_deref()).with_context(|| {
            format!(
                "No Twitch client id configured. Set {CLIENT_ID_ENV} or run `twd config set-client-id <ID>`."
            )
        })
    }

    /// Resolves the provider endpoints (env > config > default).
    ///
    /// # Errors
    /// Returns an error if an override is not a valid URL.
    pub fn endpoints(&self) -> Result<Endpoints> {
        Ok(Endpoints {
            authorize_url: resolve_url(
                self.twitch.authorize_url.as_deref(),
                AUTHORIZE_URL_ENV,
                DEFAULT_AUTHORIZE_URL,
                "authorize",
            )?,
            revoke_url: resolve_url(
                self.twitch.revoke_url.as_deref(),
                REVOKE_URL_ENV,
                DEFAULT_REVOKE_URL,
                "revoke",
            )?,
            api_base_url: resolve_url(
                self.twitch.api_base_url.as_deref(),
                API_BASE_URL_ENV,
                DEFAULT_API_BASE_URL,
                "API base",
            )?,
        })
    }
}

fn write_config(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, contents)
        .with_context(|| format!("Failed to write config to {}", path.display()))
}

/// First non-blank value wins.
fn resolve_value(primary: Option<&str>, fallback: Option<&str>) -> Option<String> {
    [primary, fallback]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

fn resolve_url(
    config_url: Option<&str>,
    env_var: &str,
    default_url: &str,
    name: &str,
) -> Result<String> {
    let env_url = std::env::var(env_var).ok();
    let url = resolve_value(env_url.as_deref(), config_url)
        .unwrap_or_else(|| default_url.to_string());
    url::Url::parse(&url).with_context(|| format!("Invalid {name} URL: {url}"))?;
    Ok(url.trim_end_matches('/').to_string())
}
