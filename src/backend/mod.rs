//! Backends for the gesture pill
//!
//! - `headless`: stdin signal stream, logging surfaces and executors
//! - `view`: view thread that owns the overlay windows

pub mod headless;
pub mod view;
