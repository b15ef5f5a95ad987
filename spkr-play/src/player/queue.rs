//! In-memory clip queue
//!
//! Holds clips waiting to play (`pending`, FIFO in arrival order) and clips
//! already played (`history`, in play order). A clip moves from pending to
//! history at the moment it starts playing, not when it is enqueued; replay
//! reads the history tail.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use uuid::Uuid;

/// One opaque encoded audio payload received from the transport
///
/// The payload is carried verbatim; nothing in the queue or engine inspects
/// it. Only the media sink gives it meaning.
#[derive(Debug, Clone)]
pub struct Clip {
    /// Queue entry id, unique per enqueue (a replayed clip gets a fresh one)
    pub id: Uuid,
    /// Base64-encoded audio data as received
    pub data: String,
    /// When this entry was enqueued
    pub received_at: DateTime<Utc>,
}

impl Clip {
    /// Create a clip from a transport payload
    pub fn new(data: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            data,
            received_at: spkr_common::time::now(),
        }
    }

    /// Derive a fresh queue entry carrying the same payload
    ///
    /// Used by replay: the copy is a distinct entry with its own id and
    /// timestamps.
    pub fn replayed(&self) -> Self {
        Self::new(self.data.clone())
    }
}

/// Pending/history clip storage
///
/// Mutated only by the player engine, on its single task.
#[derive(Debug, Default)]
pub struct ClipQueue {
    pending: VecDeque<Clip>,
    history: Vec<Clip>,
}

impl ClipQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clip to the pending tail
    pub fn push(&mut self, clip: Clip) {
        self.pending.push_back(clip);
    }

    /// Move the oldest pending clip into history and return it
    ///
    /// Returns None when nothing is pending. The returned reference is the
    /// new history tail; callers hand its payload to the media sink.
    pub fn advance(&mut self) -> Option<&Clip> {
        let clip = self.pending.pop_front()?;
        self.history.push(clip);
        self.history.last()
    }

    /// Most recently played clip, if any
    pub fn last_played(&self) -> Option<&Clip> {
        self.history.last()
    }

    /// Number of clips waiting to play
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of clips played so far
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// True when nothing is pending
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_on_empty_queue() {
        let mut queue = ClipQueue::new();
        assert!(queue.advance().is_none());
        assert_eq!(queue.history_len(), 0);
    }

    #[test]
    fn test_advance_moves_head_to_history() {
        let mut queue = ClipQueue::new();
        queue.push(Clip::new("AAAA".to_string()));
        queue.push(Clip::new("BBBB".to_string()));

        let first = queue.advance().unwrap();
        assert_eq!(first.data, "AAAA");
        assert_eq!(queue.pending_len(), 1);
        assert_eq!(queue.history_len(), 1);

        let second = queue.advance().unwrap();
        assert_eq!(second.data, "BBBB");
        assert!(queue.is_empty());
        assert_eq!(queue.history_len(), 2);
    }

    #[test]
    fn test_enqueue_does_not_touch_history() {
        let mut queue = ClipQueue::new();
        queue.push(Clip::new("AAAA".to_string()));
        assert_eq!(queue.history_len(), 0);
        assert!(queue.last_played().is_none());
    }

    #[test]
    fn test_last_played_tracks_play_order_not_arrival_order() {
        let mut queue = ClipQueue::new();
        queue.push(Clip::new("AAAA".to_string()));
        queue.push(Clip::new("BBBB".to_string()));

        queue.advance();
        assert_eq!(queue.last_played().unwrap().data, "AAAA");

        queue.advance();
        assert_eq!(queue.last_played().unwrap().data, "BBBB");
    }

    #[test]
    fn test_replayed_clip_gets_fresh_id() {
        let clip = Clip::new("AAAA".to_string());
        let copy = clip.replayed();
        assert_eq!(copy.data, clip.data);
        assert_ne!(copy.id, clip.id);
    }

    #[test]
    fn test_replay_path_appends_to_history() {
        // history [A, B], replaying B makes it the next to play and
        // ultimately history [A, B, B]
        let mut queue = ClipQueue::new();
        queue.push(Clip::new("AAAA".to_string()));
        queue.push(Clip::new("BBBB".to_string()));
        queue.advance();
        queue.advance();

        let copy = queue.last_played().unwrap().replayed();
        queue.push(copy);
        let replayed = queue.advance().unwrap();
        assert_eq!(replayed.data, "BBBB");
        assert_eq!(queue.history_len(), 3);
        assert_eq!(queue.last_played().unwrap().data, "BBBB");
    }
}
