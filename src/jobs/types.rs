//! Job request types, option enums and the events the session emits.
//!
//! These are the command objects a front end hands to the `Orchestrator`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::library::{OutputId, TrackId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Mp3,
    Wav,
    Flac,
    M4a,
    Mp4,
    Mkv,
    Avi,
    Mov,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Flac => "flac",
            Self::M4a => "m4a",
            Self::Mp4 => "mp4",
            Self::Mkv => "mkv",
            Self::Avi => "avi",
            Self::Mov => "mov",
        }
    }

    pub fn is_audio(self) -> bool {
        matches!(self, Self::Mp3 | Self::Wav | Self::Flac | Self::M4a)
    }

    /// Upper-case label, e.g. `MP3`.
    pub fn label(self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "wav" => Ok(Self::Wav),
            "flac" => Ok(Self::Flac),
            "m4a" => Ok(Self::M4a),
            "mp4" => Ok(Self::Mp4),
            "mkv" => Ok(Self::Mkv),
            "avi" => Ok(Self::Avi),
            "mov" => Ok(Self::Mov),
            other => Err(format!("unknown format `{other}`")),
        }
    }
}

/// How an audio track is turned into a video, if at all.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum VideoMode {
    /// Plain format conversion.
    #[default]
    None,
    /// One still image for the whole track.
    Static,
    /// Several images shown in turn.
    Slideshow,
    /// Uploaded videos laid under the audio.
    Background,
}

impl VideoMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Static => "static",
            Self::Slideshow => "slideshow",
            Self::Background => "background",
        }
    }
}

impl fmt::Display for VideoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "static" | "image" => Ok(Self::Static),
            "slideshow" => Ok(Self::Slideshow),
            "background" | "video" => Ok(Self::Background),
            other => Err(format!("unknown video mode `{other}`")),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transition {
    #[default]
    Fade,
    #[serde(alias = "cut")]
    None,
    Slide,
}

impl Transition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fade => "fade",
            Self::None => "none",
            Self::Slide => "slide",
        }
    }
}

impl FromStr for Transition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fade" => Ok(Self::Fade),
            "none" | "cut" => Ok(Self::None),
            "slide" => Ok(Self::Slide),
            other => Err(format!("unknown transition `{other}`")),
        }
    }
}

/// How background videos are stretched over the audio's length.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeMode {
    /// Repeat the videos until the audio ends.
    #[default]
    Loop,
    /// Play the videos once, in order.
    #[serde(alias = "once")]
    Sequence,
}

impl MergeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loop => "loop",
            Self::Sequence => "sequence",
        }
    }
}

impl FromStr for MergeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "loop" => Ok(Self::Loop),
            "sequence" | "once" => Ok(Self::Sequence),
            other => Err(format!("unknown merge mode `{other}`")),
        }
    }
}

/// Effect settings as chosen by the user. `fadeOutStart` is derived from the
/// track's duration when the job starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSettings {
    /// Gain factor, 0.0 ..= 2.0.
    pub volume: f64,
    pub normalize: bool,
    pub bass_boost: bool,
    pub echo: bool,
    /// Seconds, 0.0 ..= 10.0.
    pub fade_in: f64,
    /// Seconds, 0.0 ..= 10.0.
    pub fade_out: f64,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            normalize: false,
            bass_boost: false,
            echo: false,
            fade_in: 0.0,
            fade_out: 0.0,
        }
    }
}

/// A job the user asked to run on one track.
#[derive(Debug, Clone, PartialEq)]
pub enum JobRequest {
    ApplyEffects(EffectSettings),
    Convert {
        format: OutputFormat,
    },
    ImageToVideo {
        format: OutputFormat,
        images: Vec<PathBuf>,
    },
    Slideshow {
        format: OutputFormat,
        images: Vec<PathBuf>,
        image_seconds: f64,
        transition: Transition,
    },
    VideoMerge {
        format: OutputFormat,
        videos: Vec<PathBuf>,
        mode: MergeMode,
    },
}

impl JobRequest {
    pub fn video_mode(&self) -> VideoMode {
        match self {
            Self::ApplyEffects(_) | Self::Convert { .. } => VideoMode::None,
            Self::ImageToVideo { .. } => VideoMode::Static,
            Self::Slideshow { .. } => VideoMode::Slideshow,
            Self::VideoMerge { .. } => VideoMode::Background,
        }
    }

    pub fn format(&self) -> Option<OutputFormat> {
        match self {
            Self::ApplyEffects(_) => None,
            Self::Convert { format }
            | Self::ImageToVideo { format, .. }
            | Self::Slideshow { format, .. }
            | Self::VideoMerge { format, .. } => Some(*format),
        }
    }
}

/// Monotonic identifier of a started job; stale results are matched against it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct JobId(pub u64);

/// The session-wide status line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusLine {
    pub message: String,
    pub is_error: bool,
}

/// Change notifications for front ends.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    TrackAdded(TrackId),
    TrackRemoved(TrackId),
    /// Status, effects or processed output of a track changed.
    TrackChanged(TrackId),
    SelectionChanged(Option<TrackId>),
    CursorMoved(f64),
    Status(StatusLine),
    ArtifactSaved { output: OutputId, path: PathBuf },
    DownloadFailed { output: OutputId, error: String },
}
