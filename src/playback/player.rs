use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use super::thread::spawn_player_thread;
use super::types::{PlaybackHandle, PlaybackInfo, PlayerCmd, PlayerEvent};

/// The surface the controller drives. Production code hands the real
/// [`Player`] in; tests substitute a recording stub.
pub trait PlayerPort {
    fn submit(&self, cmd: PlayerCmd);
}

/// Handle to the audio worker thread.
pub struct Player {
    tx: Sender<PlayerCmd>,
    playback: PlaybackHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl Player {
    /// Spawn the audio worker; lifecycle events arrive on `events`.
    pub fn new(events: Sender<PlayerEvent>) -> Self {
        let (tx, rx) = mpsc::channel::<PlayerCmd>();
        let playback_info: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));

        let join = spawn_player_thread(rx, events, playback_info.clone());

        Self {
            tx,
            playback: playback_info,
            join: Mutex::new(Some(join)),
        }
    }

    pub fn playback_handle(&self) -> PlaybackHandle {
        self.playback.clone()
    }

    pub fn send(&self, cmd: PlayerCmd) -> Result<(), mpsc::SendError<PlayerCmd>> {
        self.tx.send(cmd)
    }

    /// Stop the worker and wait for it to exit.
    pub fn quit(&self) {
        let _ = self.send(PlayerCmd::Quit);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl PlayerPort for Player {
    fn submit(&self, cmd: PlayerCmd) {
        let _ = self.send(cmd);
    }
}
