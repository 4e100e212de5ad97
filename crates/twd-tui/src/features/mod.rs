//! Screens of the view (render + key handling per screen).

pub mod profile;
pub mod sign_in;
