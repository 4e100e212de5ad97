//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use twd_core::config;
use twd_core::interrupt;
use twd_core::logging::{self, LogTarget};

mod commands;

#[derive(Parser)]
#[command(name = "twd")]
#[command(version)]
#[command(about = "Sign in with Twitch from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in once from the shell and print the profile
    Login {
        /// Print the authorization URL instead of opening a browser
        #[arg(long = "no-browser")]
        no_browser: bool,

        /// Skip token revocation on exit
        #[arg(long)]
        keep: bool,
    },

    /// Print a fresh authorization URL
    AuthUrl,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Store the Twitch application client id
    SetClientId {
        #[arg(value_name = "ID")]
        client_id: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Config commands must work even when the config file is broken.
    let command = match cli.command {
        Some(Commands::Config { command }) => return config_command(command),
        command => command,
    };

    let config = config::Config::load().context("load config")?;

    // The view owns the terminal, so it logs to a file.
    let target = if command.is_none() {
        LogTarget::File(config::paths::logs_dir())
    } else {
        LogTarget::Stderr
    };
    let _log_guard = logging::init(target, &config.log.level)?;

    interrupt::init()?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(command, &config).await })
}

async fn dispatch(command: Option<Commands>, config: &config::Config) -> Result<()> {
    // default to the sign-in view
    let Some(command) = command else {
        return commands::tui::run(config).await;
    };

    match command {
        Commands::Login { no_browser, keep } => {
            commands::auth::login(config, commands::auth::LoginOptions { no_browser, keep })
                .await
        }
        Commands::AuthUrl => commands::auth::auth_url(config),
        Commands::Config { command } => config_command(command),
    }
}

fn config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Path => {
            commands::config::path();
            Ok(())
        }
        ConfigCommands::Init => commands::config::init(),
        ConfigCommands::SetClientId { client_id } => commands::config::set_client_id(&client_id),
    }
}
