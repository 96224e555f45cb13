mod config;
mod coordinator;
mod engine;
mod library;
mod playlist;
mod runtime;
mod session;
mod store;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
