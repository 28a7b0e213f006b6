//! Flick gesture pill
//!
//! A floating pill that replaces the navigation bar: swipes, taps and holds
//! on the pill dispatch navigation actions, the real nav bar is hidden with
//! display overscan, and the pill hides or fades itself for fullscreen apps,
//! the keyboard and user request.
//!
//! - `input`: touch recognition and gesture-to-action mapping
//! - `shell`: pill geometry, visibility coordination and the blackout strip
//! - `system`: overscan, immersive policy and capability probes
//! - `state`: the context that owns all of the above and applies signals
//! - `backend`: headless logic loop and view thread

pub mod backend;
pub mod config;
pub mod demo;
pub mod error;
pub mod input;
pub mod reasons;
pub mod shell;
pub mod signals;
pub mod state;
pub mod system;
pub mod timers;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
pub use signals::Signal;
pub use state::{Collaborators, DisplayState, PillContext};
