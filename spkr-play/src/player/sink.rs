//! Media sink boundary
//!
//! The player engine hands each clip to a [`MediaSink`] and then waits for a
//! single `Ended` signal on the sink event channel. The engine never times a
//! playback out: the ended signal is the only way a clip finishes.
//!
//! [`ProcessSink`] is the production sink. It decodes the base64 payload to a
//! temp file and runs a configured external player over it; process exit is
//! the ended signal. Any terminal failure of an attempt (undecodable payload,
//! spawn error, non-zero exit) is logged and still reported as `Ended`, so a
//! bad clip cannot wedge the session.

use crate::error::{Error, Result};
use crate::player::queue::Clip;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::io::Write;
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Events reported by a media sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    /// Playback of the given clip reached a terminal state
    Ended { clip_id: Uuid },
}

/// Something that can start playback of one clip
///
/// `play` must not block: it starts playback and returns. Completion arrives
/// as [`SinkEvent::Ended`] on the channel the sink was constructed with.
/// Callers are responsible for never starting a second clip before the first
/// one's ended signal.
pub trait MediaSink: Send {
    fn play(&mut self, clip: &Clip) -> Result<()>;
}

/// Sink that plays clips through an external player process
pub struct ProcessSink {
    player_command: Vec<String>,
    events: mpsc::UnboundedSender<SinkEvent>,
}

impl ProcessSink {
    /// Create a sink running `player_command` (argv vector, clip path appended)
    pub fn new(
        player_command: Vec<String>,
        events: mpsc::UnboundedSender<SinkEvent>,
    ) -> Result<Self> {
        if player_command.is_empty() {
            return Err(Error::Config("player command is empty".to_string()));
        }
        Ok(Self {
            player_command,
            events,
        })
    }

    /// Check whether the configured player binary is on PATH
    pub async fn check_player_available(&self) -> bool {
        let result = Command::new("which")
            .arg(&self.player_command[0])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        result.map(|status| status.success()).unwrap_or(false)
    }
}

impl MediaSink for ProcessSink {
    fn play(&mut self, clip: &Clip) -> Result<()> {
        let command = self.player_command.clone();
        let events = self.events.clone();
        let clip_id = clip.id;
        let payload = clip.data.clone();

        tokio::spawn(async move {
            if let Err(e) = run_player(&command, clip_id, &payload).await {
                warn!("Playback of clip {} failed: {}", clip_id, e);
            }
            // Terminal either way; the engine advances on Ended alone
            let _ = events.send(SinkEvent::Ended { clip_id });
        });

        Ok(())
    }
}

/// Decode the clip to a temp file and run the player over it
async fn run_player(command: &[String], clip_id: Uuid, payload: &str) -> Result<()> {
    let bytes = decode_payload(payload)?;
    debug!("Playing clip {} ({} bytes)", clip_id, bytes.len());

    let mut file = tempfile::Builder::new()
        .prefix("spkr-clip-")
        .suffix(".audio")
        .tempfile()?;
    file.write_all(&bytes)?;
    // Keep only the path; the file is removed when this guard drops
    let path = file.into_temp_path();

    let status = Command::new(&command[0])
        .args(&command[1..])
        .arg(path.as_os_str())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| Error::Sink(format!("failed to run {}: {}", command[0], e)))?;

    if !status.success() {
        return Err(Error::Sink(format!(
            "player exited with {} for clip {}",
            status, clip_id
        )));
    }

    debug!("Clip {} finished", clip_id);
    Ok(())
}

/// Decode a base64 clip payload, tolerating a `data:` URI wrapper
///
/// The wire format is bare base64, but payloads recorded from a browser
/// session arrive as `data:audio/ogg;base64,<data>`; accept both.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>> {
    let data = strip_data_uri(payload.trim());
    BASE64
        .decode(data)
        .map_err(|e| Error::Decode(e.to_string()))
}

fn strip_data_uri(payload: &str) -> &str {
    if payload.starts_with("data:") {
        match payload.split_once(',') {
            Some((_, data)) => data,
            None => payload,
        }
    } else {
        payload
    }
}
