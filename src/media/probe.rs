use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread;

use lofty::file::AudioFile;

/// Outcome of one metadata probe.
#[derive(Debug)]
pub struct ProbeResult {
    pub track_id: u64,
    pub duration_seconds: Option<f64>,
}

/// Probe track durations off the main thread.
///
/// Adding files never waits on metadata: results trickle in over `tx` and
/// a failed probe simply reports an unknown duration.
pub fn spawn_duration_probe(jobs: Vec<(u64, PathBuf)>, tx: Sender<ProbeResult>) {
    if jobs.is_empty() {
        return;
    }

    thread::spawn(move || {
        for (track_id, path) in jobs {
            let duration_seconds = lofty::read_from_path(&path)
                .ok()
                .map(|tagged| tagged.properties().duration().as_secs_f64());

            if duration_seconds.is_none() {
                tracing::debug!(track = track_id, path = %path.display(), "duration probe failed");
            }

            // The receiver going away just means the app shut down mid-probe.
            if tx.send(ProbeResult {
                track_id,
                duration_seconds,
            })
            .is_err()
            {
                break;
            }
        }
    });
}
