//! Local validation failures, rejected before any remote call is made.

use std::path::PathBuf;

use thiserror::Error;

use crate::jobs::{OutputFormat, VideoMode};
use crate::library::{MediaKind, TrackId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreconditionError {
    #[error("a track with id {0} already exists")]
    DuplicateId(TrackId),

    #[error("no track with id {0}")]
    NotFound(TrackId),

    #[error("a job is already running on track {0}")]
    JobInProgress(TrackId),

    #[error("{operation} needs an {expected} track, but {track} is {actual}")]
    KindMismatch {
        track: TrackId,
        operation: &'static str,
        expected: MediaKind,
        actual: MediaKind,
    },

    #[error("{format} is not offered for {kind} tracks in {mode} mode")]
    UnsupportedFormat {
        kind: MediaKind,
        mode: VideoMode,
        format: OutputFormat,
    },

    #[error("select at least one {0}")]
    MissingAsset(&'static str),

    #[error("exactly one {asset} is needed, got {given}")]
    TooManyAssets { asset: &'static str, given: usize },

    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    #[error("not a readable file: {}", .0.display())]
    MissingFile(PathBuf),
}
