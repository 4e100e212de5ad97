//! Config command handlers.

use anyhow::{Context, Result};
use twd_core::config;

pub fn path() {
    println!("{}", config::paths::config_path().display());
}

pub fn init() -> Result<()> {
    let config_path = config::paths::config_path();
    config::Config::init(&config_path)
        .with_context(|| format!("init config at {}", config_path.display()))?;
    println!("Created config at {}", config_path.display());
    Ok(())
}

pub fn set_client_id(client_id: &str) -> Result<()> {
    let config_path = config::paths::config_path();
    config::Config::save_client_id_to(&config_path, client_id)
        .with_context(|| format!("update config at {}", config_path.display()))?;
    println!("Saved client id to {}", config_path.display());
    Ok(())
}
