//! # spkr Common Library
//!
//! Shared code for the spkr clip playback client:
//! - Event types (SpkrEvent enum) and the EventBus
//! - Common error types
//! - TOML configuration loading
//! - Timestamp utilities

pub mod config;
pub mod error;
pub mod events;
pub mod time;

pub use error::{Error, Result};
