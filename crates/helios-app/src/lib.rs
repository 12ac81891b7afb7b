//! Helios application framework.
//!
//! Provides window creation, event handling, and the main application loop.

pub mod frame_clock;
pub mod window;
