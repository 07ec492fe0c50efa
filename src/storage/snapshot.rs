use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The serializable subset of queue and selection state.
///
/// Playable resource handles are deliberately absent: they are ephemeral
/// and regenerated on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedQueue {
    pub next_item_id: u64,
    pub next_folder_id: u64,
    pub selected_id: Option<u64>,
    pub selected_folder_id: Option<u64>,
    pub folders: Vec<PersistedFolder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedFolder {
    pub id: u64,
    pub name: String,
    pub is_open: bool,
    pub items: Vec<PersistedTrack>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedTrack {
    pub id: u64,
    pub path: PathBuf,
    pub duration_seconds: Option<f64>,
}
