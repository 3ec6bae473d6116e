use std::error::Error;
use std::io::{self, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::config;
use crate::jobs::{ConvertOptions, ImageInput, Orchestrator, SessionEvent, VideoMode, format_label};
use crate::library::{MediaKind, format_time, track_summary};

use super::commands::{self, Command, HELP};
use super::startup;

/// Whether the loop should keep reading commands.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Main loop: applies worker results, reports session events and executes
/// commands read from `lines`. Returns when `quit` is entered or input ends,
/// after queued work has finished and its results were applied.
pub fn run(
    orch: &mut Orchestrator,
    settings: &config::Settings,
    events: &Receiver<SessionEvent>,
    lines: &Receiver<String>,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    loop {
        orch.pump();
        report_events(orch, events, out)?;

        match lines.recv_timeout(Duration::from_millis(50)) {
            Ok(line) => {
                let flow = match commands::parse(&line, &settings.jobs) {
                    Ok(Some(cmd)) => execute(orch, settings, cmd, out)?,
                    Ok(None) => Flow::Continue,
                    Err(msg) => {
                        writeln!(out, "error: {msg}")?;
                        Flow::Continue
                    }
                };
                if flow == Flow::Quit {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    // Queued jobs still owe their downloads; apply them before leaving.
    if orch.pending() > 0 {
        writeln!(
            out,
            "waiting for {} pending requests to finish…",
            orch.pending()
        )?;
        out.flush()?;
    }
    orch.wait_idle();
    report_events(orch, events, out)?;
    Ok(())
}

fn report_events(
    orch: &Orchestrator,
    events: &Receiver<SessionEvent>,
    out: &mut impl Write,
) -> io::Result<()> {
    for event in events.try_iter() {
        match event {
            SessionEvent::Status(line) if line.is_error => writeln!(out, "! {}", line.message)?,
            SessionEvent::Status(line) => writeln!(out, "* {}", line.message)?,
            SessionEvent::TrackAdded(id) => {
                if let Some(track) = orch.registry().find(&id) {
                    writeln!(out, "+ {}", track_summary(track))?;
                }
            }
            SessionEvent::TrackChanged(id) => {
                if let Some(track) = orch.registry().find(&id) {
                    writeln!(out, "~ {}", track_summary(track))?;
                }
            }
            SessionEvent::TrackRemoved(id) => writeln!(out, "- {id}")?,
            SessionEvent::SelectionChanged(Some(id)) => writeln!(out, "selected {id}")?,
            SessionEvent::SelectionChanged(None) => writeln!(out, "selection cleared")?,
            SessionEvent::CursorMoved(seconds) => {
                writeln!(out, "cursor at {}", format_time(seconds))?
            }
            // Already announced through the status line.
            SessionEvent::ArtifactSaved { output, path } => {
                log::debug!("artifact {output} at {}", path.display())
            }
            SessionEvent::DownloadFailed { output, error } => {
                log::debug!("artifact {output} not saved: {error}")
            }
        }
    }
    out.flush()
}

/// Run one command against the session, writing any output to `out`.
pub fn execute(
    orch: &mut Orchestrator,
    settings: &config::Settings,
    cmd: Command,
    out: &mut impl Write,
) -> io::Result<Flow> {
    match cmd {
        Command::Upload(paths) => {
            if let Err(msg) = startup::queue_uploads(orch, &paths, &settings.uploads) {
                writeln!(out, "error: {msg}")?;
            }
        }
        Command::List => list(orch, out)?,
        Command::Select(id) => {
            if let Err(e) = orch.select(&id) {
                writeln!(out, "error: {e}")?;
            }
        }
        Command::Deselect => orch.clear_selection(),
        Command::Options { track, mode } => match orch.options_for(&track, mode) {
            Ok(opts) => {
                let kind = orch
                    .registry()
                    .find(&track)
                    .map_or(MediaKind::Audio, |t| t.kind);
                print_options(&opts, kind, mode, out)?;
            }
            Err(e) => writeln!(out, "error: {e}")?,
        },
        Command::Job { track, request } => match orch.start_job(&track, request) {
            Ok(job) => writeln!(out, "started job {} on {track}", job.0)?,
            Err(e) => writeln!(out, "error: {e}")?,
        },
        Command::Delete(id) => {
            if orch.delete(&id).is_none() {
                writeln!(out, "no track with id {id}")?;
            }
        }
        Command::Dismiss(id) => {
            if let Err(e) = orch.dismiss_failure(&id) {
                writeln!(out, "error: {e}")?;
            }
        }
        Command::Seek(fraction) => orch.seek_fraction(fraction),
        Command::Wait => orch.wait_idle(),
        Command::Status => {
            let status = orch.status();
            writeln!(
                out,
                "{}{} ({} pending)",
                if status.is_error { "error: " } else { "" },
                status.message,
                orch.pending()
            )?;
        }
        Command::Config => match settings.to_toml() {
            Ok(text) => write!(out, "{text}")?,
            Err(e) => writeln!(out, "error: cannot render config: {e}")?,
        },
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

fn print_options(
    opts: &ConvertOptions,
    kind: MediaKind,
    mode: VideoMode,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out, "video modes: {}", if opts.video_modes { "yes" } else { "no" })?;
    let labels: Vec<String> = opts.formats.iter().map(|f| format_label(kind, *f)).collect();
    if labels.is_empty() {
        writeln!(out, "formats: none offered in {mode} mode")?;
    } else {
        writeln!(out, "formats: {}", labels.join(", "))?;
    }
    match opts.image_input {
        Some(ImageInput::Single) => writeln!(out, "images: exactly one")?,
        Some(ImageInput::Multiple) => writeln!(out, "images: one or more")?,
        None => {}
    }
    if opts.video_input {
        writeln!(out, "videos: one or more")?;
    }
    Ok(())
}

fn list(orch: &Orchestrator, out: &mut impl Write) -> io::Result<()> {
    let registry = orch.registry();
    if registry.is_empty() {
        return writeln!(out, "no tracks");
    }
    let selected = registry.selected().map(|t| &t.id);
    for track in registry.iter() {
        let marker = if selected == Some(&track.id) { '>' } else { ' ' };
        writeln!(out, "{marker} {}", track_summary(track))?;
    }
    writeln!(
        out,
        "{} tracks, timeline {}, cursor {} ({:.0}%)",
        registry.len(),
        format_time(registry.max_duration()),
        format_time(registry.cursor_seconds()),
        registry.cursor_fraction() * 100.0
    )
}
