use std::env;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use crate::jobs::Orchestrator;
use crate::remote::HttpRemote;

mod commands;
mod event_loop;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG overrides the default filter.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    let settings = settings::load_settings();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--print-config") {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("usage: mixdesk [--print-config] [path...]\n\n{}", commands::HELP);
        return Ok(());
    }

    log::info!("using media service at {}", settings.remote.base_url);
    let remote = HttpRemote::new(&settings.remote)?;
    let mut orch = Orchestrator::new(remote, settings.downloads.clone());
    let events = orch.subscribe();

    let paths: Vec<PathBuf> = args.iter().map(PathBuf::from).collect();
    if !paths.is_empty() {
        if let Err(msg) = startup::queue_uploads(&mut orch, &paths, &settings.uploads) {
            eprintln!("mixdesk: {msg}");
        }
    }

    let lines = spawn_stdin_reader();
    event_loop::run(&mut orch, &settings, &events, &lines, &mut io::stdout())
}

/// Forward stdin lines to the event loop; the channel closes at end of input.
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("mixdesk-stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        log::error!("failed to spawn the stdin reader: {e}");
    }
    rx
}
