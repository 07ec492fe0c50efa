use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Route logs to a file; the terminal belongs to the TUI.
///
/// `ATTACCA_LOG` takes the usual env-filter syntax; the default only keeps
/// warnings. Initialization failures are swallowed, the app works fine
/// without logs.
pub(super) fn init() {
    let Some(path) = default_log_path() else {
        return;
    };
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    else {
        return;
    };

    let filter = EnvFilter::try_from_env("ATTACCA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

/// `$XDG_STATE_HOME/attacca/attacca.log` or `~/.local/state/attacca/attacca.log`.
fn default_log_path() -> Option<PathBuf> {
    let state_home = if let Some(xdg) = std::env::var_os("XDG_STATE_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = std::env::var_os("HOME") {
        Some(PathBuf::from(home).join(".local").join("state"))
    } else {
        None
    };

    state_home.map(|d| d.join("attacca").join("attacca.log"))
}
