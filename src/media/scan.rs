use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::LibrarySettings;

fn has_audio_extension(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// True when `path` points at a file we can both play and persist: it
/// exists, is non-empty and carries a configured audio extension.
///
/// Tracks failing this are excluded on add and silently dropped on both
/// save and restore.
pub fn is_persistable_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    if !has_audio_extension(path, settings) {
        return false;
    }

    fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Expand a mix of files and directories into the flat list of playable
/// audio files, preserving the input order. Directory contents are walked
/// per the library settings and sorted by path for a stable order.
pub fn collect_audio_files(inputs: &[PathBuf], settings: &LibrarySettings) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found = scan_dir(input, settings);
            found.sort();
            files.extend(found);
        } else if is_persistable_audio_file(input, settings) {
            files.push(input.clone());
        }
    }

    files
}

fn scan_dir(dir: &Path, settings: &LibrarySettings) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_persistable_audio_file(path, settings)
        {
            found.push(path.to_path_buf());
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn predicate_requires_known_extension_and_content() {
        let dir = tempdir().unwrap();
        let settings = LibrarySettings::default();

        let good = dir.path().join("song.mp3");
        fs::write(&good, b"not a real mp3").unwrap();
        assert!(is_persistable_audio_file(&good, &settings));

        let empty = dir.path().join("empty.mp3");
        fs::write(&empty, b"").unwrap();
        assert!(!is_persistable_audio_file(&empty, &settings));

        let text = dir.path().join("notes.txt");
        fs::write(&text, b"hello").unwrap();
        assert!(!is_persistable_audio_file(&text, &settings));

        let missing = dir.path().join("gone.mp3");
        assert!(!is_persistable_audio_file(&missing, &settings));
    }

    #[test]
    fn predicate_matches_extensions_case_insensitively() {
        let dir = tempdir().unwrap();
        let settings = LibrarySettings::default();

        let upper = dir.path().join("song.MP3");
        fs::write(&upper, b"not a real mp3").unwrap();
        assert!(is_persistable_audio_file(&upper, &settings));
    }

    #[test]
    fn collect_preserves_input_order_for_explicit_files() {
        let dir = tempdir().unwrap();
        let settings = LibrarySettings::default();

        let b = dir.path().join("b.mp3");
        let a = dir.path().join("a.mp3");
        fs::write(&b, b"x").unwrap();
        fs::write(&a, b"x").unwrap();

        let files = collect_audio_files(&[b.clone(), a.clone()], &settings);
        assert_eq!(files, vec![b, a]);
    }

    #[test]
    fn collect_expands_directories_and_filters_non_audio() {
        let dir = tempdir().unwrap();
        let settings = LibrarySettings::default();

        fs::write(dir.path().join("b.MP3"), b"x").unwrap();
        fs::write(dir.path().join("a.ogg"), b"x").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

        let files = collect_audio_files(&[dir.path().to_path_buf()], &settings);
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.ogg".to_string(), "b.MP3".to_string()]);
    }

    #[test]
    fn collect_respects_recursive_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.mp3"), b"x").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"x").unwrap();

        let settings = LibrarySettings {
            recursive: false,
            ..LibrarySettings::default()
        };
        let files = collect_audio_files(&[dir.path().to_path_buf()], &settings);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("root.mp3"));
    }

    #[test]
    fn collect_respects_include_hidden_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"x").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"x").unwrap();

        let settings = LibrarySettings {
            include_hidden: false,
            ..LibrarySettings::default()
        };
        let files = collect_audio_files(&[dir.path().to_path_buf()], &settings);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("visible.mp3"));
    }
}
