use std::time::{Duration, Instant};

use crate::media::Handles;
use crate::playback::format_duration;
use crate::queue::{self, Folder};

/// Severity tag on a transient toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Saved,
    Saving,
    Error,
}

/// A transient notification with an auto-dismiss deadline.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub expires_at: Instant,
}

/// The main application model.
pub struct App {
    /// The authoritative queue: folders in order, tracks in order.
    pub folders: Vec<Folder>,
    /// Monotonic id counters; never reused, never rewound.
    pub next_item_id: u64,
    pub next_folder_id: u64,

    pub selected_id: Option<u64>,
    pub selected_folder_id: Option<u64>,
    /// Track currently loaded into the audio worker, if any.
    pub playing_id: Option<u64>,
    /// Mirror of the audio worker's paused flag.
    pub primitive_paused: bool,

    pub volume: f32,
    pub status: String,
    pub toast: Option<Toast>,

    /// Cleared for the rest of the session after the first save failure.
    pub persistence_enabled: bool,
    /// Set by every structural mutation; the event loop drains it into the
    /// autosave worker.
    pub save_dirty: bool,

    pub handles: Handles,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            folders: Vec::new(),
            next_item_id: 1,
            next_folder_id: 1,
            selected_id: None,
            selected_folder_id: None,
            playing_id: None,
            primitive_paused: true,
            volume: 1.0,
            status: "Add audio files to get started.".to_string(),
            toast: None,
            persistence_enabled: true,
            save_dirty: false,
            handles: Handles::new(),
        }
    }

    /// Flag that the queue changed and should be persisted. A no-op once
    /// persistence has been disabled for the session.
    pub fn mark_save_dirty(&mut self) {
        if self.persistence_enabled {
            self.save_dirty = true;
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind, ttl: Duration) {
        self.toast = Some(Toast {
            message: message.into(),
            kind,
            expires_at: Instant::now() + ttl,
        });
    }

    /// Drop the toast once its deadline passes.
    pub fn expire_toast(&mut self) {
        if self
            .toast
            .as_ref()
            .is_some_and(|t| Instant::now() >= t.expires_at)
        {
            self.toast = None;
        }
    }

    /// Display text of a track, if it exists.
    pub fn track_display(&self, track_id: u64) -> Option<&str> {
        queue::locate(&self.folders, track_id).map(|loc| {
            self.folders[loc.folder_index].items[loc.item_index]
                .display
                .as_str()
        })
    }

    /// Known duration (seconds) of the track loaded into the worker.
    pub fn playing_duration(&self) -> Option<f64> {
        let id = self.playing_id?;
        let loc = queue::locate(&self.folders, id)?;
        self.folders[loc.folder_index].items[loc.item_index]
            .duration_seconds
            .filter(|d| d.is_finite() && *d > 0.0)
    }

    /// True while the worker is actively producing audio.
    pub fn is_playing(&self) -> bool {
        self.playing_id.is_some() && !self.primitive_paused
    }

    pub fn has_tracks(&self) -> bool {
        queue::all_tracks(&self.folders).next().is_some()
    }

    /// "N track(s) • total duration" from the durations known so far.
    pub fn queue_summary(&self) -> String {
        let mut count = 0usize;
        let mut total = 0.0f64;
        for track in queue::all_tracks(&self.folders) {
            count += 1;
            total += track.duration_seconds.unwrap_or(0.0);
        }

        let plural = if count == 1 { "" } else { "s" };
        format!("{count} track{plural} • {}", format_duration(total))
    }

    /// The one-line now-playing text.
    pub fn now_playing_line(&self) -> String {
        let Some(name) = self.playing_id.and_then(|id| self.track_display(id)) else {
            return "Now Playing: —".to_string();
        };

        let state = if self.primitive_paused {
            "Paused"
        } else {
            "Playing"
        };
        format!("Now Playing ({state}): {name}")
    }
}
