use std::path::PathBuf;

use crate::media::HandleId;

/// One audio file entry in the queue.
#[derive(Debug, Clone)]
pub struct Track {
    pub id: u64,
    pub path: PathBuf,
    /// Ephemeral playable resource; regenerated on restore and released
    /// exactly once when the track goes away.
    pub handle: Option<HandleId>,
    pub duration_seconds: Option<f64>,
    pub display: String,
}

impl Track {
    /// Build a track for `path` with the file name as its display text.
    pub fn new(id: u64, path: PathBuf, handle: Option<HandleId>) -> Self {
        let display = display_name(&path);
        Self {
            id,
            path,
            handle,
            duration_seconds: None,
            display,
        }
    }
}

/// The file name shown for a queue entry.
pub fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string()
}

/// A named, collapsible group of tracks. A folder owns its tracks
/// exclusively; a track lives in exactly one folder at a time.
#[derive(Debug, Clone)]
pub struct Folder {
    pub id: u64,
    pub name: String,
    pub is_open: bool,
    pub items: Vec<Track>,
}

/// Where a track sits inside the folder list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackLocation {
    pub folder_index: usize,
    pub item_index: usize,
}

/// Find a track by id: folders in order, items in order, first match wins.
pub fn locate(folders: &[Folder], track_id: u64) -> Option<TrackLocation> {
    for (folder_index, folder) in folders.iter().enumerate() {
        if let Some(item_index) = folder.items.iter().position(|t| t.id == track_id) {
            return Some(TrackLocation {
                folder_index,
                item_index,
            });
        }
    }

    None
}

/// Iterate every track in flattened order (folder order, then item order).
pub fn all_tracks(folders: &[Folder]) -> impl Iterator<Item = &Track> {
    folders.iter().flat_map(|f| f.items.iter())
}

/// Track ids of open folders only, in flattened order. Keyboard navigation
/// walks this list, so closed folders are skipped entirely.
pub fn visible_track_ids(folders: &[Folder]) -> Vec<u64> {
    folders
        .iter()
        .filter(|f| f.is_open)
        .flat_map(|f| f.items.iter().map(|t| t.id))
        .collect()
}

/// Every track id regardless of open/closed state, in flattened order.
/// Auto-advance walks this list, so a closed folder's tracks still play.
pub fn flattened_track_ids(folders: &[Folder]) -> Vec<u64> {
    folders
        .iter()
        .flat_map(|f| f.items.iter().map(|t| t.id))
        .collect()
}

/// Append a new empty folder with id `next_folder_id`.
///
/// Returns `(folder_id, next_folder_id')` with the counter advanced.
pub fn create_folder(
    folders: &mut Vec<Folder>,
    next_folder_id: u64,
    name: String,
    is_open: bool,
) -> (u64, u64) {
    folders.push(Folder {
        id: next_folder_id,
        name,
        is_open,
        items: Vec::new(),
    });

    (next_folder_id, next_folder_id + 1)
}

/// Remove the item at `index` only if it is the track we expect to move.
///
/// Every move verifies the removal produced the intended element before
/// reinserting anywhere; a mismatch aborts the move with no state change.
fn take_expected(items: &mut Vec<Track>, index: usize, expected_id: u64) -> Option<Track> {
    if items.get(index).is_some_and(|t| t.id == expected_id) {
        Some(items.remove(index))
    } else {
        None
    }
}

/// Move the source track immediately before the target track, possibly
/// crossing into a different folder. Returns false (queue unchanged) when
/// the ids are equal or either cannot be located.
pub fn move_before(folders: &mut [Folder], source_id: u64, target_id: u64) -> bool {
    if source_id == target_id {
        return false;
    }

    let Some(source) = locate(folders, source_id) else {
        return false;
    };
    if locate(folders, target_id).is_none() {
        return false;
    }

    let Some(moved) = take_expected(
        &mut folders[source.folder_index].items,
        source.item_index,
        source_id,
    ) else {
        return false;
    };

    // The target's index may have shifted if it shared a folder with the
    // source; resolve it again before inserting.
    match locate(folders, target_id) {
        Some(target) => {
            folders[target.folder_index]
                .items
                .insert(target.item_index, moved);
            true
        }
        None => {
            restore_taken(folders, source, moved);
            false
        }
    }
}

/// Move the source track immediately after the target track. Same equal-id,
/// not-found and rollback rules as [`move_before`].
pub fn move_after(folders: &mut [Folder], source_id: u64, target_id: u64) -> bool {
    if source_id == target_id {
        return false;
    }

    let Some(source) = locate(folders, source_id) else {
        return false;
    };
    if locate(folders, target_id).is_none() {
        return false;
    }

    let Some(moved) = take_expected(
        &mut folders[source.folder_index].items,
        source.item_index,
        source_id,
    ) else {
        return false;
    };

    match locate(folders, target_id) {
        Some(target) => {
            folders[target.folder_index]
                .items
                .insert(target.item_index + 1, moved);
            true
        }
        None => {
            restore_taken(folders, source, moved);
            false
        }
    }
}

/// Move the source track to the end of the given folder, regardless of
/// where it currently lives. False when either side is missing.
pub fn move_to_folder_end(folders: &mut [Folder], source_id: u64, target_folder_id: u64) -> bool {
    let Some(source) = locate(folders, source_id) else {
        return false;
    };
    let Some(target_index) = folders.iter().position(|f| f.id == target_folder_id) else {
        return false;
    };

    let Some(moved) = take_expected(
        &mut folders[source.folder_index].items,
        source.item_index,
        source_id,
    ) else {
        return false;
    };

    folders[target_index].items.push(moved);
    true
}

/// Put a taken track back where it came from (rollback path).
fn restore_taken(folders: &mut [Folder], source: TrackLocation, moved: Track) {
    let items = &mut folders[source.folder_index].items;
    let at = source.item_index.min(items.len());
    items.insert(at, moved);
}

#[cfg(test)]
mod guard_tests {
    use super::*;

    fn t(id: u64) -> Track {
        Track::new(id, PathBuf::from(format!("/tmp/{id}.mp3")), None)
    }

    #[test]
    fn take_expected_refuses_out_of_range_index() {
        let mut items = vec![t(1), t(2)];
        assert!(take_expected(&mut items, 5, 1).is_none());
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn take_expected_refuses_mismatched_id() {
        // The index no longer points at the track the caller located; the
        // whole move must abort rather than splice the wrong element.
        let mut items = vec![t(1), t(2)];
        assert!(take_expected(&mut items, 0, 2).is_none());
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, 1);
    }

    #[test]
    fn take_expected_removes_the_intended_track() {
        let mut items = vec![t(1), t(2), t(3)];
        let taken = take_expected(&mut items, 1, 2).unwrap();
        assert_eq!(taken.id, 2);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn restore_taken_reinserts_at_original_position() {
        let mut folders = vec![Folder {
            id: 1,
            name: "Act 1".into(),
            is_open: true,
            items: vec![t(1), t(3)],
        }];
        let source = TrackLocation {
            folder_index: 0,
            item_index: 1,
        };
        restore_taken(&mut folders, source, t(2));
        let ids: Vec<u64> = folders[0].items.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
