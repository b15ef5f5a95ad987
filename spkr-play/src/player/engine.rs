//! Player engine - the playback state machine
//!
//! A single task owns the queue, the state tag, and the delay timer, and is
//! driven by three external events: a command from a [`PlayerHandle`]
//! (enqueue/replay), the one-shot delay elapsing, and the sink's ended
//! signal. Each handler runs to completion on the engine task, so there is no
//! locking and no race between a firing timer and a concurrently arriving
//! ended signal.
//!
//! State machine: `Idle` (nothing pending, nothing playing) →
//! `WaitingToStart` (delay armed) → `Playing` (sink is rendering one clip) →
//! back to `Idle`. Every clip-to-clip gap is exactly one configured delay,
//! including the gap before the first clip after an idle period.

use crate::player::queue::{Clip, ClipQueue};
use crate::player::sink::{MediaSink, SinkEvent};
use spkr_common::events::{EventBus, PlayerState, SpkrEvent};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Commands accepted by the engine
#[derive(Debug)]
pub enum PlayerCommand {
    /// Append a clip payload to the pending queue
    Enqueue(String),
    /// Re-enqueue the most recently played clip, if any
    Replay,
}

/// Cloneable sender half for driving a running engine
///
/// Both operations are fire-and-forget: the engine never reports failure back
/// to the caller. If the engine is gone the command is dropped with a
/// warning.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    cmd_tx: mpsc::UnboundedSender<PlayerCommand>,
}

impl PlayerHandle {
    /// Enqueue a clip payload for playback
    pub fn enqueue(&self, data: String) {
        if self.cmd_tx.send(PlayerCommand::Enqueue(data)).is_err() {
            warn!("Player engine is gone, dropping clip");
        }
    }

    /// Request a replay of the last played clip
    pub fn replay(&self) {
        if self.cmd_tx.send(PlayerCommand::Replay).is_err() {
            warn!("Player engine is gone, dropping replay request");
        }
    }
}

/// Playback state machine and queue owner
pub struct PlayerEngine {
    /// Current state tag; all transitions go through `set_state`
    state: PlayerState,

    /// Pending/history clip storage
    queue: ClipQueue,

    /// Media sink the engine hands clips to
    sink: Box<dyn MediaSink>,

    /// Gap before first/next playback
    delay: Duration,

    /// Armed one-shot delay trigger (None when no delay is counting down)
    deadline: Option<Instant>,

    /// Command channel receiver
    cmd_rx: mpsc::UnboundedReceiver<PlayerCommand>,

    /// Sink completion events
    sink_rx: mpsc::UnboundedReceiver<SinkEvent>,

    /// Event broadcaster
    bus: EventBus,
}

impl PlayerEngine {
    /// Create an engine and the handle that drives it
    ///
    /// `sink_rx` is the receiving half of the channel the sink reports
    /// [`SinkEvent::Ended`] on.
    pub fn new(
        sink: Box<dyn MediaSink>,
        sink_rx: mpsc::UnboundedReceiver<SinkEvent>,
        delay: Duration,
        bus: EventBus,
    ) -> (Self, PlayerHandle) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let engine = Self {
            state: PlayerState::Idle,
            queue: ClipQueue::new(),
            sink,
            delay,
            deadline: None,
            cmd_rx,
            sink_rx,
            bus,
        };
        (engine, PlayerHandle { cmd_tx })
    }

    /// Run the engine until every handle is dropped
    pub async fn run(mut self) {
        debug!("Player engine started (delay {:?})", self.delay);

        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(PlayerCommand::Enqueue(data)) => self.on_enqueue(Clip::new(data)),
                    Some(PlayerCommand::Replay) => self.on_replay(),
                    None => {
                        debug!("All player handles dropped, engine stopping");
                        break;
                    }
                },
                event = self.sink_rx.recv() => match event {
                    Some(SinkEvent::Ended { clip_id }) => self.on_playback_ended(clip_id),
                    None => {
                        warn!("Sink event channel closed, engine stopping");
                        break;
                    }
                },
                _ = wait_for(self.deadline), if self.deadline.is_some() => {
                    self.on_delay_elapsed();
                }
            }
        }
    }

    /// Append a clip; arm the start delay when coming out of idle
    fn on_enqueue(&mut self, clip: Clip) {
        let clip_id = clip.id;
        debug!("Enqueued clip {} ({} bytes)", clip_id, clip.data.len());
        self.queue.push(clip);
        self.bus.emit_lossy(SpkrEvent::ClipEnqueued {
            clip_id,
            pending: self.queue.pending_len(),
            timestamp: spkr_common::time::now(),
        });

        match self.state {
            PlayerState::Idle => {
                self.set_state(PlayerState::WaitingToStart);
                self.arm_delay();
            }
            // The armed delay or the pending ended signal drives progress;
            // the clip just waits its turn
            PlayerState::WaitingToStart | PlayerState::Playing => {}
        }
    }

    /// Re-enqueue the last played clip through the normal enqueue path
    fn on_replay(&mut self) {
        match self.queue.last_played() {
            Some(last) => {
                let copy = last.replayed();
                info!("Replaying clip {} as {}", last.id, copy.id);
                self.bus.emit_lossy(SpkrEvent::ReplayRequested {
                    clip_id: Some(last.id),
                    timestamp: spkr_common::time::now(),
                });
                self.on_enqueue(copy);
            }
            None => {
                debug!("Replay requested with empty history, ignoring");
                self.bus.emit_lossy(SpkrEvent::ReplayRequested {
                    clip_id: None,
                    timestamp: spkr_common::time::now(),
                });
            }
        }
    }

    /// Delay trigger fired
    fn on_delay_elapsed(&mut self) {
        self.deadline = None;
        match self.state {
            PlayerState::WaitingToStart | PlayerState::Idle => self.advance(),
            // Stale trigger racing an ended signal; the next ended will
            // re-arm if anything is pending
            PlayerState::Playing => debug!("Delay fired during playback, ignoring"),
        }
    }

    /// Start playback of the oldest pending clip
    fn advance(&mut self) {
        let Some(clip) = self.queue.advance() else {
            debug!("Delay elapsed with an empty queue, nothing to play");
            return;
        };
        let clip_id = clip.id;

        if let Err(e) = self.sink.play(clip) {
            // The sink owns failure reporting; anything that never signals
            // Ended from here on stalls the queue
            warn!("Failed to start playback of clip {}: {}", clip_id, e);
        }

        self.set_state(PlayerState::Playing);
        self.bus.emit_lossy(SpkrEvent::ClipStarted {
            clip_id,
            timestamp: spkr_common::time::now(),
        });
    }

    /// Sink signalled end of playback
    fn on_playback_ended(&mut self, clip_id: Uuid) {
        debug!("Sink reported end of clip {}", clip_id);
        self.bus.emit_lossy(SpkrEvent::ClipFinished {
            clip_id,
            timestamp: spkr_common::time::now(),
        });

        self.set_state(PlayerState::Idle);
        if !self.queue.is_empty() {
            self.set_state(PlayerState::WaitingToStart);
            self.arm_delay();
        }
    }

    /// Arm the one-shot start delay
    fn arm_delay(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// Transition the state tag, announcing the change
    fn set_state(&mut self, new_state: PlayerState) {
        if new_state == self.state {
            return;
        }
        let old_state = self.state;
        self.state = new_state;
        debug!("Player state: {:?} -> {:?}", old_state, new_state);
        self.bus.emit_lossy(SpkrEvent::PlayerStateChanged {
            old_state,
            new_state,
            timestamp: spkr_common::time::now(),
        });
    }
}

/// Resolve when the armed deadline is reached; pend forever when none is armed
///
/// The corresponding select branch is guarded on `deadline.is_some()`, so the
/// pending case only exists to keep the future well-formed.
async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
