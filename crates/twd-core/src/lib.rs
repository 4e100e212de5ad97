//! twd core library.
//!
//! Twitch implicit-grant sign-in, the Helix client, configuration and the
//! shared logging/interrupt plumbing used by the TUI and the CLI.

pub mod api;
pub mod auth;
pub mod config;
pub mod interrupt;
pub mod logging;
