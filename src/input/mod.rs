//! Input handling - touch, taps, swipes and the actions they trigger
//!
//! This module provides:
//! - The swipe/hold recognizer driven by raw touch events
//! - A tap/double-tap/long-press classifier running alongside it
//! - Gesture keys, action types and the gesture-to-action map

pub mod actions;
pub mod gestures;
pub mod tap;
pub mod touch;

pub use actions::*;
pub use gestures::*;
pub use touch::TouchEvent;
