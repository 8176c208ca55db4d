mod app;
mod audio;
mod config;
mod library;
mod logging;
mod runtime;
mod store;
mod ui;
mod visualizer;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
