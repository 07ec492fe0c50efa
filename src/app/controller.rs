use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::LibrarySettings;
use crate::media::{ProbeResult, collect_audio_files, is_persistable_audio_file};
use crate::playback::{PlayerCmd, PlayerEvent, PlayerPort, format_duration, parse_time_input};
use crate::queue::{self, Folder, Track};
use crate::storage::{
    AutosaveEvent, PersistedFolder, PersistedQueue, PersistedTrack, QueueStore,
};

use super::model::{App, ToastKind};

/// What happened when the user committed free-text seek input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekTextOutcome {
    /// The seek was parsed, clamped and applied; leave the edit.
    Applied,
    /// The text did not parse; stay editing with the text reverted.
    Rejected,
    /// Nothing is loaded to seek in; leave the edit untouched.
    NoTrack,
}

impl App {
    // ---- folders -----------------------------------------------------------

    pub fn default_folder_name(&self) -> String {
        format!("Act {}", self.folders.len() + 1)
    }

    /// Append a new folder and select it. Returns the new folder's id.
    pub fn create_folder(&mut self, name: Option<String>) -> u64 {
        let name = name.unwrap_or_else(|| self.default_folder_name());
        let (folder_id, next) =
            queue::create_folder(&mut self.folders, self.next_folder_id, name.clone(), true);
        self.next_folder_id = next;
        self.selected_folder_id = Some(folder_id);
        self.set_status(format!("Folder created: {name}."));
        self.mark_save_dirty();
        folder_id
    }

    /// Apply a rename: trimmed, with an empty result falling back to the
    /// folder's prior name.
    pub fn rename_folder(&mut self, folder_id: u64, raw: &str) {
        let Some(folder) = self.folders.iter_mut().find(|f| f.id == folder_id) else {
            return;
        };

        let trimmed = raw.trim();
        if !trimmed.is_empty() && trimmed != folder.name {
            folder.name = trimmed.to_string();
            self.mark_save_dirty();
        }
    }

    pub fn toggle_folder(&mut self, folder_id: u64) {
        let Some(folder) = self.folders.iter_mut().find(|f| f.id == folder_id) else {
            return;
        };
        folder.is_open = !folder.is_open;
        self.selected_folder_id = Some(folder_id);
    }

    pub fn select_folder(&mut self, folder_id: u64) {
        if self.folders.iter().any(|f| f.id == folder_id) {
            self.selected_folder_id = Some(folder_id);
        }
    }

    /// Delete a folder and everything in it. Stops playback first when the
    /// playing track lives inside, then releases the tracks' handles.
    pub fn remove_folder(&mut self, folder_id: u64, player: &impl PlayerPort) {
        let Some(index) = self.folders.iter().position(|f| f.id == folder_id) else {
            return;
        };

        let playing_inside = self
            .playing_id
            .is_some_and(|pid| self.folders[index].items.iter().any(|t| t.id == pid));
        if playing_inside {
            self.stop_playback(player);
        }

        let folder = self.folders.remove(index);
        for track in folder.items {
            if let Some(handle) = track.handle {
                self.handles.release(handle);
            }
        }

        if self
            .selected_id
            .is_some_and(|id| queue::locate(&self.folders, id).is_none())
        {
            self.selected_id = None;
        }
        if self.selected_folder_id == Some(folder_id) {
            self.selected_folder_id = self.folders.first().map(|f| f.id);
        }

        self.set_status(format!("Folder removed: {}.", folder.name));
        self.mark_save_dirty();
    }

    /// Folder receiving newly added files: the selected folder if it still
    /// exists, else the first folder, else a fresh default-named one.
    fn target_folder_for_add(&mut self) -> usize {
        if let Some(selected) = self.selected_folder_id {
            if let Some(index) = self.folders.iter().position(|f| f.id == selected) {
                return index;
            }
        }

        if self.folders.is_empty() {
            self.create_folder(None);
            return self.folders.len() - 1;
        }

        self.selected_folder_id = Some(self.folders[0].id);
        0
    }

    // ---- tracks ------------------------------------------------------------

    /// Add files and/or directories to the queue.
    ///
    /// Returns `(track_id, path)` pairs for the caller to hand to the
    /// duration probe; the add itself never waits on metadata.
    pub fn add_files(
        &mut self,
        inputs: &[PathBuf],
        library: &LibrarySettings,
    ) -> Vec<(u64, PathBuf)> {
        let files = collect_audio_files(inputs, library);
        if files.is_empty() {
            self.set_status("No audio files found.");
            return Vec::new();
        }

        let folder_index = self.target_folder_for_add();
        let folder_name = self.folders[folder_index].name.clone();

        let mut jobs = Vec::with_capacity(files.len());
        let mut first_added = None;
        for path in files {
            let id = self.next_item_id;
            self.next_item_id += 1;

            let handle = self.handles.alloc(&path);
            self.folders[folder_index]
                .items
                .push(Track::new(id, path.clone(), Some(handle)));

            first_added.get_or_insert(id);
            jobs.push((id, path));
        }

        if self.selected_id.is_none() {
            self.selected_id = first_added;
        }

        self.set_status(format!("{} file(s) added to {folder_name}.", jobs.len()));
        self.mark_save_dirty();
        jobs
    }

    pub fn select_track(&mut self, track_id: u64) {
        let Some(loc) = queue::locate(&self.folders, track_id) else {
            return;
        };
        self.selected_id = Some(track_id);
        self.selected_folder_id = Some(self.folders[loc.folder_index].id);
        let name = self.folders[loc.folder_index].items[loc.item_index]
            .display
            .clone();
        self.set_status(format!("Selected: {name}"));
    }

    /// Move the selection up/down the visible order (closed folders are
    /// skipped entirely).
    pub fn select_adjacent(&mut self, delta: i64) {
        let visible = queue::visible_track_ids(&self.folders);
        if visible.is_empty() {
            return;
        }

        let next_id = match self.selected_id {
            None => {
                if delta > 0 {
                    visible[0]
                } else {
                    visible[visible.len() - 1]
                }
            }
            Some(selected) => match visible.iter().position(|&id| id == selected) {
                None => visible[0],
                Some(pos) => {
                    let target = (pos as i64 + delta).clamp(0, visible.len() as i64 - 1) as usize;
                    if target == pos {
                        return;
                    }
                    visible[target]
                }
            },
        };

        self.select_track(next_id);
    }

    /// Reorder wrapper: after a successful move the selected folder follows
    /// the target (selection is a view concept the model knows nothing of).
    pub fn move_track_before(&mut self, source_id: u64, target_id: u64) -> bool {
        let moved = queue::move_before(&mut self.folders, source_id, target_id);
        if moved {
            self.follow_target_folder(target_id);
            self.mark_save_dirty();
        }
        moved
    }

    pub fn move_track_after(&mut self, source_id: u64, target_id: u64) -> bool {
        let moved = queue::move_after(&mut self.folders, source_id, target_id);
        if moved {
            self.follow_target_folder(target_id);
            self.mark_save_dirty();
        }
        moved
    }

    pub fn move_track_to_folder_end(&mut self, source_id: u64, folder_id: u64) -> bool {
        let moved = queue::move_to_folder_end(&mut self.folders, source_id, folder_id);
        if moved {
            self.selected_folder_id = Some(folder_id);
            self.mark_save_dirty();
        }
        moved
    }

    fn follow_target_folder(&mut self, target_id: u64) {
        if let Some(loc) = queue::locate(&self.folders, target_id) {
            self.selected_folder_id = Some(self.folders[loc.folder_index].id);
        }
    }

    /// Move the selected track one step up/down the visible order.
    pub fn move_selected(&mut self, delta: i64) {
        let Some(selected) = self.selected_id else {
            self.set_status("Select a track first.");
            return;
        };

        let visible = queue::visible_track_ids(&self.folders);
        let Some(pos) = visible.iter().position(|&id| id == selected) else {
            return;
        };

        let target = pos as i64 + delta;
        if target < 0 || target >= visible.len() as i64 {
            return;
        }

        let target_id = visible[target as usize];
        let moved = if delta > 0 {
            self.move_track_after(selected, target_id)
        } else {
            self.move_track_before(selected, target_id)
        };

        if moved {
            self.set_status("Queue order updated.");
        }
    }

    /// Send the selected track to the end of the selected folder.
    pub fn move_selected_to_folder_end(&mut self) {
        let Some(selected) = self.selected_id else {
            self.set_status("Select a track first.");
            return;
        };
        let Some(folder_id) = self.selected_folder_id else {
            return;
        };

        if self.move_track_to_folder_end(selected, folder_id) {
            self.set_status("Queue order updated.");
        }
    }

    /// Remove a single track. Playback stops before the track's resource
    /// handle is released.
    pub fn remove_track(&mut self, track_id: u64, player: &impl PlayerPort) {
        let Some(loc) = queue::locate(&self.folders, track_id) else {
            return;
        };

        let was_playing = self.playing_id == Some(track_id);
        if was_playing {
            self.stop_playback(player);
        }

        let track = self.folders[loc.folder_index].items.remove(loc.item_index);
        if let Some(handle) = track.handle {
            self.handles.release(handle);
        }

        if self.selected_id == Some(track_id) {
            self.selected_id = None;
        }
        if !was_playing {
            self.set_status(format!("Removed: {}.", track.display));
        }
        self.mark_save_dirty();
    }

    /// Drop every folder and track. Stops playback first, then releases all
    /// resource handles.
    pub fn clear_queue(&mut self, player: &impl PlayerPort) {
        if self.folders.is_empty() && !self.has_tracks() {
            return;
        }

        self.stop_playback(player);

        for track in self.folders.iter_mut().flat_map(|f| f.items.iter_mut()) {
            if let Some(handle) = track.handle.take() {
                self.handles.release(handle);
            }
        }

        self.folders.clear();
        self.selected_id = None;
        self.selected_folder_id = None;
        self.set_status("Queue cleared.");
        self.mark_save_dirty();
    }

    /// Release every live handle without touching the queue (teardown path).
    pub fn release_all_handles(&mut self) {
        for track in self.folders.iter_mut().flat_map(|f| f.items.iter_mut()) {
            if let Some(handle) = track.handle.take() {
                self.handles.release(handle);
            }
        }

        if self.handles.live_count() > 0 {
            tracing::debug!(
                live = self.handles.live_count(),
                "media handles still live after teardown"
            );
        }
    }

    // ---- playback ----------------------------------------------------------

    /// Start (or resume) playback of a track.
    pub fn play_track(&mut self, track_id: u64, library: &LibrarySettings, player: &impl PlayerPort) {
        let Some(loc) = queue::locate(&self.folders, track_id) else {
            self.set_status("Track not found.");
            return;
        };

        let (path, name) = {
            let track = &self.folders[loc.folder_index].items[loc.item_index];
            (track.path.clone(), track.display.clone())
        };

        if !is_persistable_audio_file(&path, library) {
            self.set_status(format!("Unsupported or corrupted audio file: {name}"));
            return;
        }

        self.selected_id = Some(track_id);
        self.selected_folder_id = Some(self.folders[loc.folder_index].id);

        // Same track, merely paused: resume in place, no new resource.
        if self.playing_id == Some(track_id) && self.primitive_paused {
            player.submit(PlayerCmd::Resume);
            return;
        }

        // Re-point the track at a fresh resource; the old handle is only
        // released once its replacement exists.
        let new_handle = self.handles.alloc(&path);
        let old_handle = {
            let track = &mut self.folders[loc.folder_index].items[loc.item_index];
            std::mem::replace(&mut track.handle, Some(new_handle))
        };
        if let Some(old) = old_handle {
            self.handles.release(old);
        }

        // The play request consumes the resolved resource, not the raw path.
        let Some(source) = self.handles.resolve(new_handle).map(Path::to_path_buf) else {
            return;
        };

        self.playing_id = Some(track_id);
        self.primitive_paused = false;
        player.submit(PlayerCmd::Play {
            track_id,
            path: source,
        });
    }

    fn pause_playback(&mut self, player: &impl PlayerPort) {
        player.submit(PlayerCmd::Pause);
        self.primitive_paused = true;
        let name = self
            .playing_id
            .and_then(|id| self.track_display(id))
            .map(str::to_string);
        match name {
            Some(name) => self.set_status(format!("Paused: {name}")),
            None => self.set_status("Playback paused."),
        }
    }

    /// Play/pause toggle: pause when playing, otherwise play the selection.
    pub fn toggle_play_pause(&mut self, library: &LibrarySettings, player: &impl PlayerPort) {
        if self.is_playing() {
            self.pause_playback(player);
            return;
        }

        let Some(selected) = self.selected_id else {
            self.set_status("Select a track first, then press Play.");
            return;
        };

        self.play_track(selected, library, player);
    }

    /// Enter on a track: pause it when it is the one playing, else play it.
    pub fn activate_selected(&mut self, library: &LibrarySettings, player: &impl PlayerPort) {
        let Some(selected) = self.selected_id else {
            self.set_status("Select a track first, then press Play.");
            return;
        };

        if self.playing_id == Some(selected) && !self.primitive_paused {
            self.pause_playback(player);
            return;
        }

        self.play_track(selected, library, player);
    }

    /// Stop: unconditionally pause the worker and reset its position.
    pub fn stop_playback(&mut self, player: &impl PlayerPort) {
        let was_playing = self
            .playing_id
            .and_then(|id| self.track_display(id))
            .map(str::to_string);

        player.submit(PlayerCmd::Stop);
        self.playing_id = None;
        self.primitive_paused = true;

        match was_playing {
            Some(name) => self.set_status(format!("Stopped: {name}")),
            None => self.set_status("Playback stopped."),
        }
    }

    /// React to an audio worker notification.
    pub fn handle_player_event(
        &mut self,
        event: PlayerEvent,
        library: &LibrarySettings,
        player: &impl PlayerPort,
    ) {
        match event {
            PlayerEvent::Started { track_id } => {
                self.playing_id = Some(track_id);
                self.primitive_paused = false;
                if let Some(name) = self.track_display(track_id).map(str::to_string) {
                    self.set_status(format!("Playing: {name}"));
                }
            }

            PlayerEvent::Failed { track_id, message } => {
                tracing::warn!(track = track_id, %message, "playback failed");
                self.playing_id = None;
                self.primitive_paused = true;
                let name = self.track_display(track_id).map(str::to_string);
                match name {
                    Some(name) => {
                        self.set_status(format!("Could not play {name}. Try re-adding this file."));
                    }
                    None => self.set_status("Could not play track."),
                }
            }

            PlayerEvent::Finished { .. } => {
                let Some(playing) = self.playing_id else {
                    return;
                };

                // Auto-advance walks the flattened order: a closed folder's
                // tracks still play in sequence.
                let ids = queue::flattened_track_ids(&self.folders);
                let next = ids
                    .iter()
                    .position(|&id| id == playing)
                    .and_then(|pos| ids.get(pos + 1))
                    .copied();

                match next {
                    Some(next_id) => self.play_track(next_id, library, player),
                    None => {
                        self.playing_id = None;
                        self.primitive_paused = true;
                        self.set_status("Playback finished.");
                    }
                }
            }
        }
    }

    pub fn adjust_volume(&mut self, delta: f32, player: &impl PlayerPort) {
        self.volume = (self.volume + delta).clamp(0.0, 1.0);
        player.submit(PlayerCmd::SetVolume(self.volume));
        self.set_status(format!("Volume: {}%", (self.volume * 100.0).round() as u32));
    }

    /// Absolute seek, only while a duration is known and positive.
    pub fn seek_to(&mut self, requested_seconds: f64, player: &impl PlayerPort) {
        let Some(total) = self.playing_duration() else {
            return;
        };

        let clamped = requested_seconds.clamp(0.0, total);
        player.submit(PlayerCmd::SeekTo(Duration::from_secs_f64(clamped)));
    }

    /// Commit free-text seek input (Enter in the seek field).
    pub fn commit_seek_text(&mut self, raw: &str, player: &impl PlayerPort) -> SeekTextOutcome {
        let Some(total) = self.playing_duration() else {
            self.set_status("Load and play a track before seeking.");
            return SeekTextOutcome::NoTrack;
        };

        let Some(parsed) = parse_time_input(raw) else {
            self.set_status("Invalid time format. Use ss, mm:ss, or hh:mm:ss.");
            return SeekTextOutcome::Rejected;
        };

        let clamped = parsed.clamp(0.0, total);
        player.submit(PlayerCmd::SeekTo(Duration::from_secs_f64(clamped)));
        self.set_status(format!("Seeked to {}.", format_duration(clamped)));
        SeekTextOutcome::Applied
    }

    /// Record the duration a metadata probe discovered.
    pub fn on_probe_result(&mut self, result: ProbeResult) {
        if let Some(loc) = queue::locate(&self.folders, result.track_id) {
            self.folders[loc.folder_index].items[loc.item_index].duration_seconds =
                result.duration_seconds;
        }
    }

    // ---- persistence -------------------------------------------------------

    /// The serializable subset of the current state. Tracks failing the
    /// audio-file predicate are dropped silently.
    pub fn build_snapshot(&self, library: &LibrarySettings) -> PersistedQueue {
        PersistedQueue {
            next_item_id: self.next_item_id,
            next_folder_id: self.next_folder_id,
            selected_id: self.selected_id,
            selected_folder_id: self.selected_folder_id,
            folders: self
                .folders
                .iter()
                .map(|folder| PersistedFolder {
                    id: folder.id,
                    name: folder.name.clone(),
                    is_open: folder.is_open,
                    items: folder
                        .items
                        .iter()
                        .filter(|track| is_persistable_audio_file(&track.path, library))
                        .map(|track| PersistedTrack {
                            id: track.id,
                            path: track.path.clone(),
                            duration_seconds: track.duration_seconds,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Restore the queue from the store at startup.
    ///
    /// The rebuild happens against a scratch list and is swapped in whole;
    /// a restore failure leaves the queue empty and disables persistence
    /// rather than surfacing a half-restored state.
    pub fn restore_from_store(
        &mut self,
        store: &QueueStore,
        library: &LibrarySettings,
        toast_ttl: Duration,
    ) {
        self.show_toast("Checking local storage…", ToastKind::Saving, toast_ttl);

        let saved = match store.load() {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(error = %e, "queue restore failed");
                self.persistence_enabled = false;
                self.show_toast("Local restore failed (disabled)", ToastKind::Error, toast_ttl);
                self.set_status("Could not restore saved queue.");
                return;
            }
        };

        let Some(saved) = saved else {
            return;
        };
        if saved.folders.is_empty() {
            return;
        }

        let mut folders: Vec<Folder> = Vec::new();
        for persisted in saved.folders {
            let items: Vec<Track> = persisted
                .items
                .into_iter()
                .filter(|item| is_persistable_audio_file(&item.path, library))
                .map(|item| {
                    let handle = self.handles.alloc(&item.path);
                    let mut track = Track::new(item.id, item.path, Some(handle));
                    track.duration_seconds = item.duration_seconds;
                    track
                })
                .collect();

            // Folders that lost all their tracks and have no name left are
            // not worth resurrecting.
            if items.is_empty() && persisted.name.trim().is_empty() {
                continue;
            }

            folders.push(Folder {
                id: persisted.id,
                name: persisted.name,
                is_open: persisted.is_open,
                items,
            });
        }

        if folders.is_empty() {
            return;
        }

        let max_item_id = queue::all_tracks(&folders).map(|t| t.id).max().unwrap_or(0);
        let max_folder_id = folders.iter().map(|f| f.id).max().unwrap_or(0);

        self.folders = folders;
        // Counters must clear every restored id, even if the persisted
        // counter lagged behind its own data.
        self.next_item_id = saved.next_item_id.max(max_item_id + 1).max(1);
        self.next_folder_id = saved.next_folder_id.max(max_folder_id + 1).max(1);

        self.selected_id = saved
            .selected_id
            .filter(|&id| queue::locate(&self.folders, id).is_some());
        self.selected_folder_id = match saved.selected_folder_id {
            Some(id) if self.folders.iter().any(|f| f.id == id) => Some(id),
            Some(_) => self.folders.first().map(|f| f.id),
            None => None,
        };

        let count = queue::all_tracks(&self.folders).count();
        self.show_toast("Restored from local storage", ToastKind::Saved, toast_ttl);
        self.set_status(format!("Restored {count} track(s) from local storage."));
    }

    /// React to an autosave worker notification.
    pub fn on_autosave_event(&mut self, event: AutosaveEvent, toast_ttl: Duration) {
        match event {
            AutosaveEvent::Saved => {
                tracing::debug!("queue saved");
            }
            AutosaveEvent::SaveFailed(message) => {
                tracing::warn!(%message, "disabling persistence for this session");
                self.persistence_enabled = false;
                self.save_dirty = false;
                self.show_toast(
                    "Local save disabled (storage error)",
                    ToastKind::Error,
                    toast_ttl,
                );
            }
        }
    }

    /// Explicit "forget my saved queue" action.
    pub fn reset_storage(&mut self, store: &QueueStore, toast_ttl: Duration) {
        match store.clear() {
            Ok(()) => {
                self.show_toast("Local data cleared", ToastKind::Saved, toast_ttl);
                self.set_status("Stored queue cleared.");
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not clear stored queue");
                self.show_toast("Could not clear local data", ToastKind::Error, toast_ttl);
            }
        }
    }
}
