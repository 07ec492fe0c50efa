use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::{OutputStreamBuilder, Sink};

use super::sink::create_sink_at;
use super::types::{PlaybackHandle, PlayerCmd, PlayerEvent};

pub(super) fn spawn_player_thread(
    rx: Receiver<PlayerCmd>,
    events: Sender<PlayerEvent>,
    playback_info: PlaybackHandle,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream =
            OutputStreamBuilder::open_default_stream().expect("ERR: No audio output device");
        // rodio logs to stderr when OutputStream is dropped. That's useful in
        // debugging, but noisy for a TUI app.
        let mut stream = stream;
        stream.log_on_drop(false);

        // The single shared sink slot: one track active at a time, full
        // teardown before the next source attaches.
        let mut sink: Option<Sink> = None;
        let mut current: Option<(u64, PathBuf)> = None;
        let mut paused = true;
        let mut volume: f32 = 1.0;

        // Track start time and accumulated elapsed while paused.
        let mut started_at: Option<Instant> = None;
        let mut accumulated = Duration::ZERO;

        loop {
            match rx.recv_timeout(Duration::from_millis(200)) {
                Ok(cmd) => match cmd {
                    PlayerCmd::Play { track_id, path } => {
                        if let Some(s) = sink.take() {
                            s.stop();
                        }

                        match create_sink_at(&stream, &path, Duration::ZERO) {
                            Ok(new_sink) => {
                                new_sink.set_volume(volume);
                                new_sink.play();
                                sink = Some(new_sink);
                                current = Some((track_id, path));
                                paused = false;
                                started_at = Some(Instant::now());
                                accumulated = Duration::ZERO;
                                publish(&playback_info, Some(track_id), Duration::ZERO, true);
                                let _ = events.send(PlayerEvent::Started { track_id });
                            }
                            Err(e) => {
                                current = None;
                                paused = true;
                                started_at = None;
                                accumulated = Duration::ZERO;
                                publish(&playback_info, None, Duration::ZERO, false);
                                let _ = events.send(PlayerEvent::Failed {
                                    track_id,
                                    message: e.to_string(),
                                });
                            }
                        }
                    }

                    PlayerCmd::Resume => {
                        if let Some(s) = sink.as_ref() {
                            if paused {
                                s.play();
                                paused = false;
                                started_at = Some(Instant::now());
                                if let Some((track_id, _)) = current {
                                    publish(&playback_info, Some(track_id), accumulated, true);
                                    let _ = events.send(PlayerEvent::Started { track_id });
                                }
                            }
                        }
                    }

                    PlayerCmd::Pause => {
                        if let Some(s) = sink.as_ref() {
                            if !paused {
                                s.pause();
                                paused = true;
                                if let Some(st) = started_at.take() {
                                    accumulated += st.elapsed();
                                }
                                if let Ok(mut info) = playback_info.lock() {
                                    info.elapsed = accumulated;
                                    info.playing = false;
                                }
                            }
                        }
                    }

                    PlayerCmd::Stop => {
                        if let Some(s) = sink.take() {
                            s.stop();
                        }
                        current = None;
                        paused = true;
                        started_at = None;
                        accumulated = Duration::ZERO;
                        publish(&playback_info, None, Duration::ZERO, false);
                    }

                    PlayerCmd::SeekTo(pos) => {
                        // Scrubbing rebuilds the sink and skips into the file.
                        let Some((track_id, path)) = current.clone() else {
                            continue;
                        };
                        if sink.is_none() {
                            continue;
                        }

                        let was_paused = paused;
                        if let Some(s) = sink.take() {
                            s.stop();
                        }

                        match create_sink_at(&stream, &path, pos) {
                            Ok(new_sink) => {
                                new_sink.set_volume(volume);
                                if !was_paused {
                                    new_sink.play();
                                }
                                sink = Some(new_sink);
                                paused = was_paused;
                                started_at = (!was_paused).then(Instant::now);
                                accumulated = pos;
                                publish(&playback_info, Some(track_id), pos, !was_paused);
                            }
                            Err(e) => {
                                current = None;
                                paused = true;
                                started_at = None;
                                accumulated = Duration::ZERO;
                                publish(&playback_info, None, Duration::ZERO, false);
                                let _ = events.send(PlayerEvent::Failed {
                                    track_id,
                                    message: e.to_string(),
                                });
                            }
                        }
                    }

                    PlayerCmd::SetVolume(v) => {
                        volume = v.clamp(0.0, 1.0);
                        if let Some(s) = sink.as_ref() {
                            s.set_volume(volume);
                        }
                    }

                    PlayerCmd::Quit => {
                        if let Some(s) = sink.take() {
                            s.stop();
                        }
                        break;
                    }
                },

                Err(RecvTimeoutError::Timeout) => {
                    // Periodic tick: refresh elapsed and detect a drained
                    // sink (the track reached its natural end).
                    if let Some(s) = sink.as_ref() {
                        if !paused && s.empty() {
                            let finished = current.take().map(|(track_id, _)| track_id);
                            sink = None;
                            paused = true;
                            started_at = None;
                            accumulated = Duration::ZERO;
                            publish(&playback_info, None, Duration::ZERO, false);
                            if let Some(track_id) = finished {
                                let _ = events.send(PlayerEvent::Finished { track_id });
                            }
                        } else if !paused {
                            let elapsed =
                                accumulated + started_at.map_or(Duration::ZERO, |st| st.elapsed());
                            if let Ok(mut info) = playback_info.lock() {
                                info.elapsed = elapsed;
                            }
                        }
                    }
                }

                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

fn publish(handle: &PlaybackHandle, track_id: Option<u64>, elapsed: Duration, playing: bool) {
    if let Ok(mut info) = handle.lock() {
        info.track_id = track_id;
        info.elapsed = elapsed;
        info.playing = playing;
    }
}
