use super::*;

fn t(id: u64) -> Track {
    Track::new(id, std::path::PathBuf::from(format!("/tmp/{id}.mp3")), None)
}

fn f(id: u64, name: &str, is_open: bool, ids: &[u64]) -> Folder {
    Folder {
        id,
        name: name.into(),
        is_open,
        items: ids.iter().map(|&i| t(i)).collect(),
    }
}

fn two_folders() -> Vec<Folder> {
    vec![
        f(1, "Act 1", true, &[10, 11, 12]),
        f(2, "Act 2", false, &[20, 21]),
    ]
}

#[test]
fn locate_finds_unique_match_and_rejects_unknown_ids() {
    let folders = two_folders();

    assert_eq!(
        locate(&folders, 11),
        Some(TrackLocation {
            folder_index: 0,
            item_index: 1
        })
    );
    assert_eq!(
        locate(&folders, 21),
        Some(TrackLocation {
            folder_index: 1,
            item_index: 1
        })
    );
    assert_eq!(locate(&folders, 999), None);
    assert_eq!(locate(&[], 10), None);
}

#[test]
fn visible_order_skips_closed_folders_flattened_does_not() {
    let folders = two_folders();

    assert_eq!(visible_track_ids(&folders), vec![10, 11, 12]);
    assert_eq!(flattened_track_ids(&folders), vec![10, 11, 12, 20, 21]);
}

#[test]
fn create_folder_appends_and_advances_counter() {
    let mut folders = Vec::new();
    let (id, next) = create_folder(&mut folders, 7, "Act 1".into(), true);

    assert_eq!(id, 7);
    assert_eq!(next, 8);
    assert_eq!(folders.len(), 1);
    assert!(folders[0].items.is_empty());
    assert!(folders[0].is_open);
}

#[test]
fn move_before_places_source_immediately_before_target() {
    let mut folders = two_folders();

    assert!(move_before(&mut folders, 12, 10));
    assert_eq!(flattened_track_ids(&folders), vec![12, 10, 11, 20, 21]);
}

#[test]
fn move_before_accounts_for_shifted_target_index() {
    // Source before target in the same folder: removing the source shifts
    // the target left by one; the move must still land directly before it.
    let mut folders = two_folders();

    assert!(move_before(&mut folders, 10, 12));
    assert_eq!(flattened_track_ids(&folders), vec![11, 10, 12, 20, 21]);
}

#[test]
fn move_before_crosses_folders_and_preserves_count() {
    let mut folders = two_folders();

    assert!(move_before(&mut folders, 21, 11));
    assert_eq!(flattened_track_ids(&folders), vec![10, 21, 11, 12, 20]);
    assert_eq!(folders[0].items.len(), 4);
    assert_eq!(folders[1].items.len(), 1);
}

#[test]
fn move_after_places_source_immediately_after_target() {
    let mut folders = two_folders();

    assert!(move_after(&mut folders, 10, 12));
    assert_eq!(flattened_track_ids(&folders), vec![11, 12, 10, 20, 21]);

    assert!(move_after(&mut folders, 20, 21));
    assert_eq!(flattened_track_ids(&folders), vec![11, 12, 10, 21, 20]);
}

#[test]
fn move_after_into_other_folder() {
    let mut folders = two_folders();

    assert!(move_after(&mut folders, 11, 20));
    assert_eq!(flattened_track_ids(&folders), vec![10, 12, 20, 11, 21]);
}

#[test]
fn moves_with_equal_ids_fail_and_change_nothing() {
    let mut folders = two_folders();
    let before = flattened_track_ids(&folders);

    assert!(!move_before(&mut folders, 10, 10));
    assert!(!move_after(&mut folders, 10, 10));
    assert_eq!(flattened_track_ids(&folders), before);
}

#[test]
fn moves_with_unknown_ids_fail_and_change_nothing() {
    let mut folders = two_folders();
    let before = flattened_track_ids(&folders);

    assert!(!move_before(&mut folders, 999, 10));
    assert!(!move_before(&mut folders, 10, 999));
    assert!(!move_after(&mut folders, 999, 10));
    assert!(!move_after(&mut folders, 10, 999));
    assert!(!move_to_folder_end(&mut folders, 999, 1));
    assert!(!move_to_folder_end(&mut folders, 10, 999));
    assert_eq!(flattened_track_ids(&folders), before);
    assert_eq!(folders[0].items.len(), 3);
    assert_eq!(folders[1].items.len(), 2);
}

#[test]
fn move_preserves_relative_order_of_untouched_tracks() {
    let mut folders = two_folders();

    assert!(move_before(&mut folders, 20, 11));

    // Everything except the moved track keeps its old relative order.
    let after: Vec<u64> = flattened_track_ids(&folders)
        .into_iter()
        .filter(|&id| id != 20)
        .collect();
    assert_eq!(after, vec![10, 11, 12, 21]);
}

#[test]
fn move_to_folder_end_appends_regardless_of_origin() {
    let mut folders = two_folders();

    // Cross-folder: 11 leaves Act 1 and lands at the end of Act 2.
    assert!(move_to_folder_end(&mut folders, 11, 2));
    assert_eq!(flattened_track_ids(&folders), vec![10, 12, 20, 21, 11]);

    // Same-folder: 20 is re-appended behind its old folder-mates.
    assert!(move_to_folder_end(&mut folders, 20, 2));
    assert_eq!(flattened_track_ids(&folders), vec![10, 12, 21, 11, 20]);
}

#[test]
fn move_into_empty_folder() {
    let mut folders = vec![f(1, "Act 1", true, &[10]), f(2, "Act 2", true, &[])];

    assert!(move_to_folder_end(&mut folders, 10, 2));
    assert!(folders[0].items.is_empty());
    assert_eq!(flattened_track_ids(&folders), vec![10]);
}
