//! Signed-in profile screen.

mod render;
mod update;

pub use render::render_profile;
pub use update::{handle_key, start_sign_out};
