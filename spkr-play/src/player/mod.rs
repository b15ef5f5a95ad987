//! Playback queue and player engine
//!
//! `queue` holds the pending/history clip model; `engine` runs the state
//! machine that drives the media sink; `sink` is the boundary to the external
//! player.

pub mod engine;
pub mod queue;
pub mod sink;

pub use engine::{PlayerCommand, PlayerEngine, PlayerHandle};
pub use queue::{Clip, ClipQueue};
pub use sink::{MediaSink, ProcessSink, SinkEvent};
