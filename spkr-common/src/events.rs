//! Event types for the spkr event system
//!
//! Every state change in the client is announced as a [`SpkrEvent`] on the
//! [`EventBus`] (tokio broadcast). Subscribers are the status logger in the
//! main binary and any embedding UI; emission is one-to-many and lossy for
//! slow receivers.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Player state as exposed to subscribers
///
/// `WaitingToStart` covers the configured gap between a clip becoming due and
/// its playback actually starting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Idle,
    WaitingToStart,
    Playing,
}

/// spkr event types
///
/// Events are broadcast via EventBus and can be serialized for logging or
/// forwarding. All variants carry a UTC timestamp taken at emission time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SpkrEvent {
    /// Player state machine transitioned
    PlayerStateChanged {
        old_state: PlayerState,
        new_state: PlayerState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A clip was appended to the pending queue
    ClipEnqueued {
        clip_id: Uuid,
        /// Pending queue length after the append
        pending: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A clip was handed to the media sink and playback started
    ClipStarted {
        clip_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The media sink signalled end of playback
    ClipFinished {
        clip_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A replay was requested
    ///
    /// `clip_id` is the id of the clip being replayed, or None when history
    /// was empty and the request was a no-op.
    ReplayRequested {
        clip_id: Option<Uuid>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Transport established a connection to the server stream
    TransportConnected {
        url: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Transport lost (or failed to establish) its connection
    TransportDisconnected {
        url: String,
        /// Delay before the next connection attempt
        retry_in_ms: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// One-to-many event broadcaster backed by `tokio::sync::broadcast`
pub struct EventBus {
    tx: broadcast::Sender<SpkrEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    ///
    /// `capacity` is the number of events buffered per subscriber before the
    /// oldest are dropped. 100 is plenty for this client's event rate.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<SpkrEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)`, or `Err` if no subscribers are
    /// listening.
    pub fn emit(
        &self,
        event: SpkrEvent,
    ) -> Result<usize, broadcast::error::SendError<SpkrEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the no-subscribers case
    pub fn emit_lossy(&self, event: SpkrEvent) {
        let _ = self.tx.send(event);
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            capacity: self.capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eventbus_new() {
        let bus = EventBus::new(100);
        assert_eq!(bus.capacity(), 100);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_eventbus_subscribe() {
        let bus = EventBus::new(100);
        let _rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_eventbus_emit_no_subscribers() {
        let bus = EventBus::new(100);
        let event = SpkrEvent::PlayerStateChanged {
            old_state: PlayerState::Idle,
            new_state: PlayerState::WaitingToStart,
            timestamp: chrono::Utc::now(),
        };

        // Should return error when no subscribers
        assert!(bus.emit(event).is_err());
    }

    #[tokio::test]
    async fn test_eventbus_emit_with_subscriber() {
        let bus = EventBus::new(100);
        let mut rx = bus.subscribe();

        let clip_id = Uuid::new_v4();
        let event = SpkrEvent::ClipStarted {
            clip_id,
            timestamp: chrono::Utc::now(),
        };

        assert!(bus.emit(event).is_ok());

        let received = rx.recv().await.unwrap();
        match received {
            SpkrEvent::ClipStarted { clip_id: id, .. } => assert_eq!(id, clip_id),
            _ => panic!("Wrong event type received"),
        }
    }

    #[tokio::test]
    async fn test_eventbus_emit_lossy() {
        let bus = EventBus::new(100);
        let event = SpkrEvent::ReplayRequested {
            clip_id: None,
            timestamp: chrono::Utc::now(),
        };

        // Should not panic even without subscribers
        bus.emit_lossy(event);
    }

    #[test]
    fn test_player_state_equality() {
        assert_eq!(PlayerState::Idle, PlayerState::Idle);
        assert_ne!(PlayerState::Idle, PlayerState::Playing);
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = SpkrEvent::TransportDisconnected {
            url: "http://127.0.0.1:8081/events".to_string(),
            retry_in_ms: 1000,
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"TransportDisconnected\""));
        assert!(json.contains("\"retry_in_ms\":1000"));
    }
}
