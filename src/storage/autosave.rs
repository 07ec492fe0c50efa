use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::snapshot::PersistedQueue;
use super::store::QueueStore;

/// Notifications from the autosave worker back to the event loop.
#[derive(Debug)]
pub enum AutosaveEvent {
    Saved,
    /// A save failed; the caller should stop scheduling further saves.
    SaveFailed(String),
}

enum AutosaveMsg {
    Snapshot(Box<PersistedQueue>),
    Quit,
}

/// Handle to the autosave worker thread.
pub struct AutosaveHandle {
    tx: Sender<AutosaveMsg>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AutosaveHandle {
    /// Queue the latest snapshot for a debounced write. Newer snapshots
    /// supersede older ones that have not been written yet.
    pub fn schedule(&self, snapshot: PersistedQueue) {
        let _ = self.tx.send(AutosaveMsg::Snapshot(Box::new(snapshot)));
    }

    /// Flush any pending snapshot and stop the worker.
    pub fn quit(&self) {
        let _ = self.tx.send(AutosaveMsg::Quit);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

/// Spawn the autosave worker.
///
/// Snapshots are debounced over `debounce`: a burst of mutations collapses
/// into one write once the queue has been quiet for the whole window. The
/// worker writes on its own thread, so at most one write is in progress at
/// a time; snapshots arriving mid-write coalesce into exactly one follow-up
/// write reflecting the latest state.
pub fn spawn_autosave(
    store: QueueStore,
    debounce: Duration,
    events: Sender<AutosaveEvent>,
) -> AutosaveHandle {
    let (tx, rx) = mpsc::channel::<AutosaveMsg>();
    let join = thread::spawn(move || run(store, debounce, rx, events));

    AutosaveHandle {
        tx,
        join: Mutex::new(Some(join)),
    }
}

fn run(
    store: QueueStore,
    debounce: Duration,
    rx: Receiver<AutosaveMsg>,
    events: Sender<AutosaveEvent>,
) {
    let mut pending: Option<Box<PersistedQueue>> = None;

    loop {
        let msg = if pending.is_some() {
            match rx.recv_timeout(debounce) {
                Ok(msg) => Some(msg),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match rx.recv() {
                Ok(msg) => Some(msg),
                Err(_) => break,
            }
        };

        match msg {
            Some(AutosaveMsg::Snapshot(snapshot)) => {
                // Newer state supersedes whatever was waiting.
                pending = Some(snapshot);
            }
            Some(AutosaveMsg::Quit) => {
                if let Some(snapshot) = pending.take() {
                    write(&store, &snapshot, &events);
                }
                break;
            }
            // The debounce window elapsed with nothing new.
            None => {
                if let Some(snapshot) = pending.take() {
                    write(&store, &snapshot, &events);
                }
            }
        }
    }
}

fn write(store: &QueueStore, snapshot: &PersistedQueue, events: &Sender<AutosaveEvent>) {
    match store.save(snapshot) {
        Ok(()) => {
            let _ = events.send(AutosaveEvent::Saved);
        }
        Err(e) => {
            tracing::warn!(error = %e, "queue autosave failed");
            // Drop whatever record is there rather than leaving a stale or
            // partial snapshot behind.
            if let Err(cleanup) = store.clear() {
                tracing::debug!(error = %cleanup, "cleanup after failed save also failed");
            }
            let _ = events.send(AutosaveEvent::SaveFailed(e.to_string()));
        }
    }
}
