//! # spkr Playback Client Library (spkr-play)
//!
//! Client-side playback queue for base64-encoded audio clips delivered over a
//! server event stream.
//!
//! **Purpose:** Consume clips from a reconnecting transport, queue them in
//! arrival order, and play them back-to-back through an external media player
//! with a configurable gap before each start.
//!
//! **Architecture:** Single-task event loop (player engine) fed by tokio
//! channels from the transport and the media sink; no locks on the playback
//! path.

pub mod config;
pub mod error;
pub mod player;
pub mod state;
pub mod transport;

pub use error::{Error, Result};
