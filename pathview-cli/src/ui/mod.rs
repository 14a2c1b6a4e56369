//! Terminal front end for a tracking session.
//!
//! - [`ConsoleSurface`] prints what a map would draw
//! - [`TerminalPrompt`] asks for location permission

mod prompt;
mod surface;

pub use prompt::TerminalPrompt;
pub use surface::{ConsoleSurface, OutputMode};
