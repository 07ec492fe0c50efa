//! Media plumbing around the queue: playable resource handles, the
//! audio-file predicate used on add/save/restore, and the asynchronous
//! duration probe.

mod handles;
mod probe;
mod scan;

pub use handles::{HandleId, Handles};
pub use probe::{ProbeResult, spawn_duration_probe};
pub use scan::{collect_audio_files, is_persistable_audio_file};
