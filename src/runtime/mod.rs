use std::env;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::media::spawn_duration_probe;
use crate::playback::{Player, PlayerEvent};
use crate::storage::{AutosaveEvent, QueueStore, spawn_autosave};

mod event_loop;
mod logging;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    logging::init();

    let (player_events_tx, player_events_rx) = mpsc::channel::<PlayerEvent>();
    let (probe_tx, probe_rx) = mpsc::channel();
    let (autosave_events_tx, autosave_events_rx) = mpsc::channel::<AutosaveEvent>();

    let player = Player::new(player_events_tx);
    let playback_handle = player.playback_handle();

    // No resolvable data dir means no persistence for this session.
    let store = settings.storage_path().map(QueueStore::new);
    if let Some(store) = &store {
        tracing::debug!(path = %store.path().display(), "queue store ready");
    }
    let autosave = store.clone().map(|store| {
        spawn_autosave(
            store,
            Duration::from_millis(settings.storage.autosave_debounce_ms),
            autosave_events_tx,
        )
    });

    let mut app = App::new();
    let toast_ttl = Duration::from_millis(settings.ui.toast_ms);

    match &store {
        Some(store) => app.restore_from_store(store, &settings.library, toast_ttl),
        None => {
            tracing::warn!("no data directory available; persistence disabled");
            app.persistence_enabled = false;
        }
    }

    // Paths given on the command line are appended behind any restored queue.
    let args: Vec<PathBuf> = env::args().skip(1).map(PathBuf::from).collect();
    if !args.is_empty() {
        let jobs = app.add_files(&args, &settings.library);
        spawn_duration_probe(jobs, probe_tx.clone());
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let workers = event_loop::Workers {
        player: &player,
        playback: playback_handle,
        store: store.as_ref(),
        autosave: autosave.as_ref(),
        player_events: &player_events_rx,
        probe_events: &probe_rx,
        autosave_events: &autosave_events_rx,
        probe_tx: probe_tx.clone(),
    };

    let mut state = event_loop::EventLoopState::new();
    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &workers, &mut state);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // The autosave worker flushes any pending snapshot on quit; handles are
    // released only after playback has fully stopped.
    if let Some(autosave) = &autosave {
        autosave.quit();
    }
    player.quit();
    app.release_all_handles();

    run_result
}
