//! Sign-in screen.

mod render;
mod update;

pub use render::render_sign_in;
pub use update::{handle_key, start_sign_in};
