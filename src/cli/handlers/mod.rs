//! Command handlers for CLI operations
//!
//! This module contains handlers for different CLI commands,
//! separating command execution logic from parsing and validation.

pub mod forward;
pub mod push;

pub use forward::ForwardCommandHandler;
pub use push::{PushArgs, PushCommandHandler};
