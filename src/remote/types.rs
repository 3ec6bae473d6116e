//! Request payloads and the `RemoteService` seam.

use std::fs;
use std::io;
use std::path::Path;

use crate::jobs::{MergeMode, OutputFormat, Transition};
use crate::library::{AudioEffects, OutputId, RemoteRef, UploadedFile};

use super::error::RemoteResult;

/// Raw file bytes plus the file name the server should see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl FilePayload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a local file, naming the payload after its file name.
    pub fn read(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("upload")
            .to_string();
        Ok(Self { name, bytes })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideshowOptions {
    /// Seconds each image stays on screen.
    pub image_seconds: f64,
    pub transition: Transition,
}

/// The operations the remote processing service offers.
///
/// Implementations never touch session state and never retry.
pub trait RemoteService: Send + 'static {
    fn upload(&self, file: &FilePayload) -> RemoteResult<UploadedFile>;

    fn delete(&self, remote_ref: &RemoteRef) -> RemoteResult<()>;

    fn apply_effects(&self, remote_ref: &RemoteRef, effects: &AudioEffects)
    -> RemoteResult<OutputId>;

    fn convert(&self, remote_ref: &RemoteRef, format: OutputFormat) -> RemoteResult<OutputId>;

    /// Fetch the stored source file so it can be resubmitted as a payload.
    fn fetch_file(&self, remote_ref: &RemoteRef) -> RemoteResult<Vec<u8>>;

    fn image_to_video(
        &self,
        audio: &FilePayload,
        image: &FilePayload,
        format: OutputFormat,
    ) -> RemoteResult<OutputId>;

    fn slideshow(
        &self,
        audio: &FilePayload,
        images: &[FilePayload],
        options: SlideshowOptions,
        format: OutputFormat,
    ) -> RemoteResult<OutputId>;

    fn video_merge(
        &self,
        audio: &FilePayload,
        videos: &[FilePayload],
        mode: MergeMode,
        replace_audio: bool,
        format: OutputFormat,
    ) -> RemoteResult<OutputId>;

    /// Retrieve a job's output artifact.
    fn download(&self, output: &OutputId) -> RemoteResult<Vec<u8>>;
}
