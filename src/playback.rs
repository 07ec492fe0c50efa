//! Audio playback: the rodio worker thread, its command/event surface and
//! the timecode helpers used by the seek controls.

mod player;
mod sink;
mod thread;
mod timecode;
mod types;

pub use player::{Player, PlayerPort};
pub use sink::PlaybackError;
pub use timecode::{format_duration, parse_time_input};
pub use types::{PlaybackHandle, PlaybackInfo, PlayerCmd, PlayerEvent};
