mod app;
mod config;
mod media;
mod playback;
mod queue;
mod runtime;
mod storage;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
