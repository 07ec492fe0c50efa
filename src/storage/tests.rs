use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use tempfile::tempdir;

use super::*;

fn snapshot(marker: u64) -> PersistedQueue {
    PersistedQueue {
        next_item_id: marker,
        next_folder_id: 2,
        selected_id: Some(1),
        selected_folder_id: Some(1),
        folders: vec![PersistedFolder {
            id: 1,
            name: "Act 1".into(),
            is_open: true,
            items: vec![PersistedTrack {
                id: 1,
                path: PathBuf::from("/tmp/one.mp3"),
                duration_seconds: Some(12.5),
            }],
        }],
    }
}

#[test]
fn load_returns_none_before_any_save() {
    let dir = tempdir().unwrap();
    let store = QueueStore::new(dir.path().join("queue.redb"));

    assert!(store.load().unwrap().is_none());
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let store = QueueStore::new(dir.path().join("queue.redb"));

    let snap = snapshot(7);
    store.save(&snap).unwrap();

    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded, snap);
}

#[test]
fn save_overwrites_the_single_record() {
    let dir = tempdir().unwrap();
    let store = QueueStore::new(dir.path().join("queue.redb"));

    store.save(&snapshot(1)).unwrap();
    store.save(&snapshot(2)).unwrap();

    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded.next_item_id, 2);
}

#[test]
fn clear_removes_the_record_and_is_idempotent() {
    let dir = tempdir().unwrap();
    let store = QueueStore::new(dir.path().join("queue.redb"));

    store.save(&snapshot(1)).unwrap();
    store.clear().unwrap();
    assert!(store.load().unwrap().is_none());

    // Clearing an already-empty store is fine.
    store.clear().unwrap();
    assert!(store.load().unwrap().is_none());
}

#[test]
fn save_surfaces_open_failure() {
    let dir = tempdir().unwrap();
    // The parent "directory" is a plain file, so the store cannot open.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let store = QueueStore::new(blocker.join("queue.redb"));

    let err = store.save(&snapshot(1)).unwrap_err();
    assert!(matches!(err, StorageError::Open(_)));
}

#[test]
fn autosave_coalesces_a_burst_into_one_write() {
    let dir = tempdir().unwrap();
    let store = QueueStore::new(dir.path().join("queue.redb"));
    let (events_tx, events_rx) = mpsc::channel();

    let autosave = spawn_autosave(store.clone(), Duration::from_millis(200), events_tx);
    autosave.schedule(snapshot(1));
    autosave.schedule(snapshot(2));
    autosave.schedule(snapshot(3));

    match events_rx.recv_timeout(Duration::from_secs(5)).unwrap() {
        AutosaveEvent::Saved => {}
        other => panic!("unexpected event: {other:?}"),
    }

    // Only the latest snapshot made it to disk, and only once.
    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded.next_item_id, 3);
    assert!(
        events_rx.recv_timeout(Duration::from_millis(200)).is_err(),
        "burst should collapse into a single save"
    );

    autosave.quit();
}

#[test]
fn autosave_flushes_pending_snapshot_on_quit() {
    let dir = tempdir().unwrap();
    let store = QueueStore::new(dir.path().join("queue.redb"));
    let (events_tx, events_rx) = mpsc::channel();

    // A long debounce: the write only happens because quit flushes it.
    let autosave = spawn_autosave(store.clone(), Duration::from_secs(60), events_tx);
    autosave.schedule(snapshot(9));
    autosave.quit();

    match events_rx.recv_timeout(Duration::from_secs(5)).unwrap() {
        AutosaveEvent::Saved => {}
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(store.load().unwrap().unwrap().next_item_id, 9);
}

#[test]
fn autosave_reports_failure_for_an_unwritable_store() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let store = QueueStore::new(blocker.join("queue.redb"));
    let (events_tx, events_rx) = mpsc::channel();

    let autosave = spawn_autosave(store, Duration::from_millis(10), events_tx);
    autosave.schedule(snapshot(1));

    match events_rx.recv_timeout(Duration::from_secs(5)).unwrap() {
        AutosaveEvent::SaveFailed(_) => {}
        other => panic!("unexpected event: {other:?}"),
    }

    autosave.quit();
}
