//! Schema module - Grid data model and configuration for replays.

mod cell;
mod config;
mod frame;

pub use cell::*;
pub use config::*;
pub use frame::*;
