//! Line commands read from stdin, parsed into explicit `Command` values.

use std::path::PathBuf;

use crate::config::JobSettings;
use crate::jobs::{EffectSettings, JobRequest, OutputFormat, VideoMode};
use crate::library::TrackId;

pub const HELP: &str = "\
commands:
  upload <path>...                       upload files (directories are expanded)
  list                                   show tracks
  select <id>    deselect                select a track or clear the selection
  options <id> [none|static|slideshow|background]
  effects <id> [volume=<0-2>] [normalize] [bass] [echo] [fade-in=<s>] [fade-out=<s>]
  convert <id> <format>
  video <id> <format> <image>            audio + still image
  slideshow <id> <format> <image>... [--seconds=<s>] [--transition=fade|none|slide]
  merge <id> <format> <video>... [--mode=loop|sequence]
  delete <id>    dismiss <id>    seek <0-1>
  wait    status    config    help    quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Upload(Vec<PathBuf>),
    List,
    Select(TrackId),
    Deselect,
    Options { track: TrackId, mode: VideoMode },
    Job { track: TrackId, request: JobRequest },
    Delete(TrackId),
    Dismiss(TrackId),
    Seek(f64),
    Wait,
    Status,
    Config,
    Help,
    Quit,
}

/// Parse one input line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse(line: &str, defaults: &JobSettings) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    if verb.starts_with('#') {
        return Ok(None);
    }
    let args: Vec<&str> = words.collect();

    let cmd = match verb {
        "upload" | "add" => {
            if args.is_empty() {
                return Err("usage: upload <path>...".to_string());
            }
            Command::Upload(args.iter().map(PathBuf::from).collect())
        }
        "list" | "ls" => Command::List,
        "select" => Command::Select(track_arg(&args, "select <id>")?),
        "deselect" => Command::Deselect,
        "options" => {
            let track = track_arg(&args, "options <id> [mode]")?;
            let mode = match args.get(1) {
                Some(m) => m.parse()?,
                None => VideoMode::None,
            };
            Command::Options { track, mode }
        }
        "effects" => {
            let track = track_arg(&args, "effects <id> [flags]")?;
            Command::Job {
                track,
                request: JobRequest::ApplyEffects(parse_effects(&args[1..])?),
            }
        }
        "convert" => {
            let (track, format, _) = job_args(&args, "convert <id> <format>")?;
            Command::Job {
                track,
                request: JobRequest::Convert { format },
            }
        }
        "video" => {
            let (track, format, rest) = job_args(&args, "video <id> <format> <image>")?;
            Command::Job {
                track,
                request: JobRequest::ImageToVideo {
                    format,
                    images: rest.iter().map(PathBuf::from).collect(),
                },
            }
        }
        "slideshow" => {
            let (track, format, rest) = job_args(&args, "slideshow <id> <format> <image>...")?;
            let mut image_seconds = defaults.slideshow_image_seconds;
            let mut transition = defaults.slideshow_transition;
            let mut images = Vec::new();
            for word in rest {
                if let Some(v) = word.strip_prefix("--seconds=") {
                    image_seconds = parse_number("--seconds", v)?;
                } else if let Some(v) = word.strip_prefix("--transition=") {
                    transition = v.parse()?;
                } else {
                    images.push(PathBuf::from(word));
                }
            }
            Command::Job {
                track,
                request: JobRequest::Slideshow {
                    format,
                    images,
                    image_seconds,
                    transition,
                },
            }
        }
        "merge" => {
            let (track, format, rest) = job_args(&args, "merge <id> <format> <video>...")?;
            let mut mode = defaults.merge_mode;
            let mut videos = Vec::new();
            for word in rest {
                if let Some(v) = word.strip_prefix("--mode=") {
                    mode = v.parse()?;
                } else {
                    videos.push(PathBuf::from(word));
                }
            }
            Command::Job {
                track,
                request: JobRequest::VideoMerge {
                    format,
                    videos,
                    mode,
                },
            }
        }
        "delete" | "rm" => Command::Delete(track_arg(&args, "delete <id>")?),
        "dismiss" => Command::Dismiss(track_arg(&args, "dismiss <id>")?),
        "seek" => {
            let value = args.first().ok_or("usage: seek <0-1>")?;
            Command::Seek(parse_number("seek", value)?)
        }
        "wait" => Command::Wait,
        "status" => Command::Status,
        "config" => Command::Config,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command `{other}`, try `help`")),
    };
    Ok(Some(cmd))
}

fn track_arg(args: &[&str], usage: &str) -> Result<TrackId, String> {
    args.first()
        .map(|id| TrackId::from(*id))
        .ok_or_else(|| format!("usage: {usage}"))
}

fn job_args<'a>(
    args: &'a [&'a str],
    usage: &str,
) -> Result<(TrackId, OutputFormat, &'a [&'a str]), String> {
    match args {
        [id, format, rest @ ..] => Ok((TrackId::from(*id), format.parse()?, rest)),
        _ => Err(format!("usage: {usage}")),
    }
}

fn parse_effects(flags: &[&str]) -> Result<EffectSettings, String> {
    let mut settings = EffectSettings::default();
    for flag in flags {
        let (key, value) = match flag.split_once('=') {
            Some((k, v)) => (k, Some(v)),
            None => (*flag, None),
        };
        match (key, value) {
            ("volume", Some(v)) => settings.volume = parse_number("volume", v)?,
            ("fade-in", Some(v)) => settings.fade_in = parse_number("fade-in", v)?,
            ("fade-out", Some(v)) => settings.fade_out = parse_number("fade-out", v)?,
            ("normalize", None) => settings.normalize = true,
            ("bass" | "bass-boost", None) => settings.bass_boost = true,
            ("echo", None) => settings.echo = true,
            _ => return Err(format!("unknown effect flag `{flag}`")),
        }
    }
    Ok(settings)
}

fn parse_number(name: &str, value: &str) -> Result<f64, String> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("{name} expects a number, got `{value}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{MergeMode, Transition};

    fn p(line: &str) -> Result<Option<Command>, String> {
        parse(line, &JobSettings::default())
    }

    fn job(line: &str) -> JobRequest {
        match p(line) {
            Ok(Some(Command::Job { request, .. })) => request,
            other => panic!("expected a job for `{line}`, got {other:?}"),
        }
    }

    #[test]
    fn blank_and_comment_lines_are_ignored() {
        assert_eq!(p("   "), Ok(None));
        assert_eq!(p("# upload later"), Ok(None));
    }

    #[test]
    fn simple_commands() {
        assert_eq!(p("list"), Ok(Some(Command::List)));
        assert_eq!(p("select f1"), Ok(Some(Command::Select(TrackId::from("f1")))));
        assert_eq!(p("deselect"), Ok(Some(Command::Deselect)));
        assert_eq!(p("seek 0.25"), Ok(Some(Command::Seek(0.25))));
        assert_eq!(p("q"), Ok(Some(Command::Quit)));
        assert_eq!(
            p("upload a.mp3 dir"),
            Ok(Some(Command::Upload(vec![
                PathBuf::from("a.mp3"),
                PathBuf::from("dir")
            ])))
        );
    }

    #[test]
    fn options_default_to_plain_conversion() {
        assert_eq!(
            p("options f1"),
            Ok(Some(Command::Options {
                track: TrackId::from("f1"),
                mode: VideoMode::None
            }))
        );
        assert_eq!(
            p("options f1 image"),
            Ok(Some(Command::Options {
                track: TrackId::from("f1"),
                mode: VideoMode::Static
            }))
        );
    }

    #[test]
    fn effects_flags() {
        let request = job("effects f1 volume=1.5 normalize echo fade-out=3");
        assert_eq!(
            request,
            JobRequest::ApplyEffects(EffectSettings {
                volume: 1.5,
                normalize: true,
                echo: true,
                fade_out: 3.0,
                ..EffectSettings::default()
            })
        );
        assert!(p("effects f1 loud").is_err());
        assert!(p("effects f1 volume=abc").is_err());
    }

    #[test]
    fn convert_accepts_dotted_formats() {
        assert_eq!(
            job("convert f1 .MP3"),
            JobRequest::Convert {
                format: OutputFormat::Mp3
            }
        );
        assert!(p("convert f1 ogg").is_err());
        assert!(p("convert f1").is_err());
    }

    #[test]
    fn slideshow_uses_configured_defaults_unless_overridden() {
        let defaults = JobSettings {
            slideshow_image_seconds: 4.0,
            slideshow_transition: Transition::Slide,
            ..JobSettings::default()
        };
        let parsed = parse("slideshow f1 mp4 a.jpg b.jpg", &defaults).unwrap();
        assert_eq!(
            parsed,
            Some(Command::Job {
                track: TrackId::from("f1"),
                request: JobRequest::Slideshow {
                    format: OutputFormat::Mp4,
                    images: vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")],
                    image_seconds: 4.0,
                    transition: Transition::Slide,
                },
            })
        );

        let request = job("slideshow f1 mkv a.jpg --seconds=2 --transition=cut");
        assert_eq!(
            request,
            JobRequest::Slideshow {
                format: OutputFormat::Mkv,
                images: vec![PathBuf::from("a.jpg")],
                image_seconds: 2.0,
                transition: Transition::None,
            }
        );
    }

    #[test]
    fn merge_mode_flag() {
        assert_eq!(
            job("merge f1 mp4 bg.mp4 --mode=once"),
            JobRequest::VideoMerge {
                format: OutputFormat::Mp4,
                videos: vec![PathBuf::from("bg.mp4")],
                mode: MergeMode::Sequence,
            }
        );
    }

    #[test]
    fn video_keeps_every_image_for_validation() {
        assert_eq!(
            job("video f1 mp4 a.png b.png"),
            JobRequest::ImageToVideo {
                format: OutputFormat::Mp4,
                images: vec![PathBuf::from("a.png"), PathBuf::from("b.png")],
            }
        );
    }

    #[test]
    fn unknown_commands_are_errors() {
        let err = p("play f1").unwrap_err();
        assert!(err.contains("unknown command"));
        assert!(p("seek").is_err());
        assert!(p("delete").is_err());
    }
}
