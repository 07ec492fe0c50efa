//! Playback-related small types and handles.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Commands accepted by the audio worker thread.
#[derive(Debug)]
pub enum PlayerCmd {
    /// Tear down the current sink and start the given file from zero.
    Play { track_id: u64, path: PathBuf },
    /// Resume the paused sink in place, keeping its position.
    Resume,
    /// Pause the sink in place.
    Pause,
    /// Pause and reset the position to zero, dropping the sink.
    Stop,
    /// Rebuild the sink at the given position (clamping is the caller's job).
    SeekTo(Duration),
    /// Set the output volume in `[0, 1]`.
    SetVolume(f32),
    /// Quit the audio worker thread.
    Quit,
}

/// Lifecycle notifications from the audio worker thread.
#[derive(Debug)]
pub enum PlayerEvent {
    /// Playback started (or resumed) for this track.
    Started { track_id: u64 },
    /// The play request was refused (unreadable or undecodable file).
    Failed { track_id: u64, message: String },
    /// The current sink drained to its natural end.
    Finished { track_id: u64 },
}

/// Runtime playback information shared with the UI.
#[derive(Debug, Clone)]
pub struct PlaybackInfo {
    /// Track currently loaded into the sink (if any).
    pub track_id: Option<u64>,
    /// Elapsed playback time for the current track.
    pub elapsed: Duration,
    /// Whether playback is currently active.
    pub playing: bool,
}

impl Default for PlaybackInfo {
    fn default() -> Self {
        Self {
            track_id: None,
            elapsed: Duration::ZERO,
            playing: false,
        }
    }
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;
