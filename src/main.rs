mod config;
mod error;
mod jobs;
mod library;
mod registry;
mod remote;
mod runtime;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
