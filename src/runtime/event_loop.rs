use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, SeekTextOutcome};
use crate::config::Settings;
use crate::media::{ProbeResult, spawn_duration_probe};
use crate::playback::{PlaybackHandle, Player, PlayerEvent, format_duration};
use crate::storage::{AutosaveEvent, AutosaveHandle, QueueStore};
use crate::ui::{self, InputMode};

/// Worker-thread endpoints the event loop drives and drains.
pub(super) struct Workers<'a> {
    pub player: &'a Player,
    pub playback: PlaybackHandle,
    pub store: Option<&'a QueueStore>,
    pub autosave: Option<&'a AutosaveHandle>,
    pub player_events: &'a Receiver<PlayerEvent>,
    pub probe_events: &'a Receiver<ProbeResult>,
    pub autosave_events: &'a Receiver<AutosaveEvent>,
    pub probe_tx: Sender<ProbeResult>,
}

/// State tracked by the runtime event loop across iterations.
pub(super) struct EventLoopState {
    /// The active input mode: normal key handling or one of the line-edit /
    /// confirmation prompts.
    pub input: InputMode,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self {
            input: InputMode::Normal,
        }
    }
}

/// Main terminal event loop: drains worker events, pushes dirty state to the
/// autosave worker, draws, and translates keys into controller calls.
/// Returns `Ok(())` when shutdown is requested.
pub(super) fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &Settings,
    app: &mut App,
    workers: &Workers<'_>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    let toast_ttl = Duration::from_millis(settings.ui.toast_ms);

    loop {
        flush_dirty_save(app, settings, workers);

        while let Ok(event) = workers.player_events.try_recv() {
            app.handle_player_event(event, &settings.library, workers.player);
        }
        while let Ok(result) = workers.probe_events.try_recv() {
            app.on_probe_result(result);
        }
        while let Ok(event) = workers.autosave_events.try_recv() {
            app.on_autosave_event(event, toast_ttl);
        }

        // Mirror the audio worker's state: pauses and track ends can
        // originate there rather than from a key press.
        let playback = workers
            .playback
            .lock()
            .map(|info| info.clone())
            .unwrap_or_default();
        if app.playing_id.is_some() && playback.track_id == app.playing_id {
            app.primitive_paused = !playback.playing;
        }

        app.expire_toast();

        terminal.draw(|f| ui::draw(f, app, &state.input, &playback, settings))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, workers, state, toast_ttl)? {
                    break;
                }
            }
        }
    }

    // Whatever changed in the final tick still reaches the worker; its quit
    // path flushes the write.
    flush_dirty_save(app, settings, workers);

    Ok(())
}

fn flush_dirty_save(app: &mut App, settings: &Settings, workers: &Workers<'_>) {
    if !app.save_dirty || !app.persistence_enabled {
        return;
    }

    if let Some(autosave) = workers.autosave {
        autosave.schedule(app.build_snapshot(&settings.library));
    }
    app.save_dirty = false;
}

fn elapsed_seconds(workers: &Workers<'_>) -> f64 {
    workers
        .playback
        .lock()
        .map(|info| info.elapsed.as_secs_f64())
        .unwrap_or(0.0)
}

fn handle_key_event(
    key: KeyEvent,
    settings: &Settings,
    app: &mut App,
    workers: &Workers<'_>,
    state: &mut EventLoopState,
    toast_ttl: Duration,
) -> Result<bool, Box<dyn std::error::Error>> {
    // Take the mode out so edit handlers can freely replace it; arms that
    // stay in their mode put it back.
    let mode = std::mem::replace(&mut state.input, InputMode::Normal);

    match mode {
        InputMode::Normal => {
            return handle_normal_key(key, settings, app, workers, state, toast_ttl);
        }

        InputMode::AddPath { mut buffer } => match key.code {
            KeyCode::Esc => {}
            KeyCode::Enter => {
                let trimmed = buffer.trim();
                if !trimmed.is_empty() {
                    let jobs = app.add_files(&[PathBuf::from(trimmed)], &settings.library);
                    spawn_duration_probe(jobs, workers.probe_tx.clone());
                }
            }
            KeyCode::Backspace => {
                buffer.pop();
                state.input = InputMode::AddPath { buffer };
            }
            KeyCode::Char(c) if !c.is_control() => {
                buffer.push(c);
                state.input = InputMode::AddPath { buffer };
            }
            _ => state.input = InputMode::AddPath { buffer },
        },

        InputMode::RenameFolder {
            folder_id,
            mut buffer,
        } => match key.code {
            // Escape cancels: the folder keeps its prior name.
            KeyCode::Esc => {}
            KeyCode::Enter => app.rename_folder(folder_id, &buffer),
            KeyCode::Backspace => {
                buffer.pop();
                state.input = InputMode::RenameFolder { folder_id, buffer };
            }
            KeyCode::Char(c) if !c.is_control() => {
                buffer.push(c);
                state.input = InputMode::RenameFolder { folder_id, buffer };
            }
            _ => state.input = InputMode::RenameFolder { folder_id, buffer },
        },

        InputMode::SeekText { mut buffer } => match key.code {
            // Escape reverts to the live position without seeking.
            KeyCode::Esc => {}
            KeyCode::Enter => match app.commit_seek_text(&buffer, workers.player) {
                SeekTextOutcome::Applied | SeekTextOutcome::NoTrack => {}
                SeekTextOutcome::Rejected => {
                    // Stay editing, text reverted to the current position.
                    state.input = InputMode::SeekText {
                        buffer: format_duration(elapsed_seconds(workers)),
                    };
                }
            },
            KeyCode::Backspace => {
                buffer.pop();
                state.input = InputMode::SeekText { buffer };
            }
            KeyCode::Char(c) if !c.is_control() => {
                buffer.push(c);
                state.input = InputMode::SeekText { buffer };
            }
            _ => state.input = InputMode::SeekText { buffer },
        },

        InputMode::ConfirmRemoveTrack { track_id } => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.remove_track(track_id, workers.player);
            }
            _ => {}
        },

        InputMode::ConfirmRemoveFolder { folder_id } => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.remove_folder(folder_id, workers.player);
            }
            _ => {}
        },

        InputMode::ConfirmClear => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.clear_queue(workers.player);
            }
            _ => {}
        },
    }

    Ok(false)
}

fn handle_normal_key(
    key: KeyEvent,
    settings: &Settings,
    app: &mut App,
    workers: &Workers<'_>,
    state: &mut EventLoopState,
    toast_ttl: Duration,
) -> Result<bool, Box<dyn std::error::Error>> {
    match key.code {
        KeyCode::Char('q') => return Ok(true),

        KeyCode::Char('j') | KeyCode::Down => app.select_adjacent(1),
        KeyCode::Char('k') | KeyCode::Up => app.select_adjacent(-1),
        KeyCode::Char('J') => app.move_selected(1),
        KeyCode::Char('K') => app.move_selected(-1),
        KeyCode::Char('m') => app.move_selected_to_folder_end(),

        KeyCode::Enter => app.activate_selected(&settings.library, workers.player),
        KeyCode::Char(' ') | KeyCode::Char('p') => {
            app.toggle_play_pause(&settings.library, workers.player);
        }
        KeyCode::Char('x') => app.stop_playback(workers.player),

        KeyCode::Left => {
            let target = elapsed_seconds(workers) - settings.controls.seek_seconds as f64;
            app.seek_to(target, workers.player);
        }
        KeyCode::Right => {
            let target = elapsed_seconds(workers) + settings.controls.seek_seconds as f64;
            app.seek_to(target, workers.player);
        }
        KeyCode::Char('t') => {
            // The edit starts from the current position, like a focused field.
            state.input = InputMode::SeekText {
                buffer: format_duration(elapsed_seconds(workers)),
            };
        }

        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.adjust_volume(settings.controls.volume_step, workers.player);
        }
        KeyCode::Char('-') => {
            app.adjust_volume(-settings.controls.volume_step, workers.player);
        }

        KeyCode::Char('[') | KeyCode::Char(']') => {
            if !app.folders.is_empty() {
                let current = app
                    .selected_folder_id
                    .and_then(|id| app.folders.iter().position(|f| f.id == id))
                    .unwrap_or(0);
                let next = if key.code == KeyCode::Char(']') {
                    (current + 1) % app.folders.len()
                } else {
                    (current + app.folders.len() - 1) % app.folders.len()
                };
                let folder_id = app.folders[next].id;
                app.select_folder(folder_id);
            }
        }

        KeyCode::Char('a') => {
            state.input = InputMode::AddPath {
                buffer: String::new(),
            };
        }
        KeyCode::Char('n') => {
            app.create_folder(None);
        }
        KeyCode::Char('o') => {
            if let Some(folder_id) = app.selected_folder_id {
                app.toggle_folder(folder_id);
            }
        }
        KeyCode::Char('r') => {
            if let Some(folder_id) = app.selected_folder_id {
                let buffer = app
                    .folders
                    .iter()
                    .find(|f| f.id == folder_id)
                    .map(|f| f.name.clone())
                    .unwrap_or_default();
                state.input = InputMode::RenameFolder { folder_id, buffer };
            }
        }

        KeyCode::Char('d') => {
            if let Some(track_id) = app.selected_id {
                state.input = InputMode::ConfirmRemoveTrack { track_id };
            }
        }
        KeyCode::Char('D') => {
            if let Some(folder_id) = app.selected_folder_id {
                state.input = InputMode::ConfirmRemoveFolder { folder_id };
            }
        }
        KeyCode::Char('c') => {
            if app.has_tracks() || !app.folders.is_empty() {
                state.input = InputMode::ConfirmClear;
            }
        }
        KeyCode::Char('R') => {
            if let Some(store) = workers.store {
                app.reset_storage(store, toast_ttl);
            }
        }

        _ => {}
    }

    Ok(false)
}
