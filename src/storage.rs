//! Queue persistence: the serializable snapshot, the single-record store
//! and the autosave worker that debounces writes behind the event loop.

mod autosave;
mod snapshot;
mod store;

pub use autosave::{AutosaveEvent, AutosaveHandle, spawn_autosave};
pub use snapshot::{PersistedFolder, PersistedQueue, PersistedTrack};
pub use store::{QueueStore, StorageError};

#[cfg(test)]
mod tests;
