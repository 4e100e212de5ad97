//! Default command: the full-screen sign-in view.

use anyhow::Result;
use twd_core::config::Config;

pub async fn run(config: &Config) -> Result<()> {
    twd_tui::run_sign_in_view(config).await
}
