use std::fmt;

use serde::{Deserialize, Serialize};

/// Extensions the remote service treats as audio. Everything else is video.
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a", "flac", "aac"];

macro_rules! opaque_ref {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[allow(dead_code)]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

opaque_ref!(
    /// Identifier issued by the remote service on upload.
    TrackId
);
opaque_ref!(
    /// Server-side reference to an uploaded source file.
    RemoteRef
);
opaque_ref!(
    /// Server-side reference to the artifact produced by a job.
    OutputId
);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// Classify a file name by the text after its last dot (case-insensitive).
    /// Leading-dot names such as `.mp3` and bare names such as `mp3` count.
    pub fn from_name(name: &str) -> Self {
        let ext = name.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
        if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Audio
        } else {
            Self::Video
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effect parameters as sent to `/audio-effects` and remembered on the track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioEffects {
    pub volume: f64,
    pub normalize: bool,
    pub bass_boost: bool,
    pub echo: bool,
    pub fade_in: f64,
    pub fade_out: f64,
    pub fade_out_start: f64,
}

/// Per-track job state shown next to the track.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Idle,
    Running(String),
    Failed(String),
}

impl JobStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Running(msg) => write!(f, "running: {msg}"),
            Self::Failed(msg) => write!(f, "failed: {msg}"),
        }
    }
}

/// The fields a job is allowed to change. Everything else on a `Track` is
/// fixed at upload time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackState {
    pub effects: Option<AudioEffects>,
    pub processed_ref: Option<OutputId>,
    pub job_status: JobStatus,
}

/// What the remote service reports back for a successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub file_id: TrackId,
    pub original_name: String,
    pub file_path: RemoteRef,
    pub size: u64,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub remote_ref: RemoteRef,
    pub size_bytes: u64,
    pub duration_seconds: f64,
    pub kind: MediaKind,
    /// Display-only; jobs never read it.
    pub volume: f64,
    pub state: TrackState,
}

impl Track {
    pub fn from_upload(uploaded: UploadedFile) -> Self {
        let kind = MediaKind::from_name(&uploaded.original_name);
        let duration_seconds = if uploaded.duration.is_finite() {
            uploaded.duration.max(0.0)
        } else {
            0.0
        };

        Self {
            id: uploaded.file_id,
            name: uploaded.original_name,
            remote_ref: uploaded.file_path,
            size_bytes: uploaded.size,
            duration_seconds,
            kind,
            volume: 1.0,
            state: TrackState::default(),
        }
    }

    pub fn is_audio(&self) -> bool {
        self.kind == MediaKind::Audio
    }
}
