//! Scripted `RemoteService` shared by the orchestrator and runtime tests.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use crate::jobs::{MergeMode, OutputFormat};
use crate::library::{AudioEffects, OutputId, RemoteRef, TrackId, UploadedFile};

use super::error::RemoteResult;
use super::types::{FilePayload, RemoteService, SlideshowOptions};

#[derive(Default)]
struct Script {
    calls: Vec<String>,
    uploads: VecDeque<RemoteResult<UploadedFile>>,
    jobs: VecDeque<RemoteResult<OutputId>>,
    downloads: VecDeque<RemoteResult<Vec<u8>>>,
    deletes: VecDeque<RemoteResult<()>>,
    next_output: u32,
}

/// Scripted `RemoteService`; unscripted calls succeed with generated values.
#[derive(Clone, Default)]
pub(crate) struct FakeRemote {
    script: Arc<Mutex<Script>>,
    gate: Arc<Mutex<Option<Receiver<()>>>>,
}

impl FakeRemote {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }

    pub(crate) fn push_upload(&self, result: RemoteResult<UploadedFile>) {
        self.script.lock().unwrap().uploads.push_back(result);
    }

    pub(crate) fn push_job(&self, result: RemoteResult<OutputId>) {
        self.script.lock().unwrap().jobs.push_back(result);
    }

    pub(crate) fn push_download(&self, result: RemoteResult<Vec<u8>>) {
        self.script.lock().unwrap().downloads.push_back(result);
    }

    pub(crate) fn push_delete(&self, result: RemoteResult<()>) {
        self.script.lock().unwrap().deletes.push_back(result);
    }

    /// Make every job submission wait for one message on the returned sender.
    pub(crate) fn hold_jobs(&self) -> Sender<()> {
        let (tx, rx) = mpsc::channel();
        *self.gate.lock().unwrap() = Some(rx);
        tx
    }

    fn record(&self, call: String) {
        self.script.lock().unwrap().calls.push(call);
    }

    fn job(&self, call: String) -> RemoteResult<OutputId> {
        self.record(call);
        if let Some(rx) = self.gate.lock().unwrap().as_ref() {
            let _ = rx.recv();
        }
        let mut script = self.script.lock().unwrap();
        match script.jobs.pop_front() {
            Some(result) => result,
            None => {
                script.next_output += 1;
                Ok(OutputId::new(format!("out-{}", script.next_output)))
            }
        }
    }
}

impl RemoteService for FakeRemote {
    fn upload(&self, file: &FilePayload) -> RemoteResult<UploadedFile> {
        self.record(format!("upload {}", file.name));
        let scripted = self.script.lock().unwrap().uploads.pop_front();
        scripted.unwrap_or_else(|| {
            Ok(UploadedFile {
                file_id: TrackId::new(format!("id-{}", file.name)),
                original_name: file.name.clone(),
                file_path: RemoteRef::new(format!("uploads/{}", file.name)),
                size: file.bytes.len() as u64,
                duration: 0.0,
            })
        })
    }

    fn delete(&self, remote_ref: &RemoteRef) -> RemoteResult<()> {
        self.record(format!("delete {remote_ref}"));
        let scripted = self.script.lock().unwrap().deletes.pop_front();
        scripted.unwrap_or(Ok(()))
    }

    fn apply_effects(&self, remote_ref: &RemoteRef, _effects: &AudioEffects) -> RemoteResult<OutputId> {
        self.job(format!("effects {remote_ref}"))
    }

    fn convert(&self, remote_ref: &RemoteRef, format: OutputFormat) -> RemoteResult<OutputId> {
        self.job(format!("convert {remote_ref} {format}"))
    }

    fn fetch_file(&self, remote_ref: &RemoteRef) -> RemoteResult<Vec<u8>> {
        self.record(format!("fetch {remote_ref}"));
        Ok(b"audio-bytes".to_vec())
    }

    fn image_to_video(
        &self,
        audio: &FilePayload,
        image: &FilePayload,
        format: OutputFormat,
    ) -> RemoteResult<OutputId> {
        self.job(format!("image-to-video {} {} {format}", audio.name, image.name))
    }

    fn slideshow(
        &self,
        audio: &FilePayload,
        images: &[FilePayload],
        options: SlideshowOptions,
        format: OutputFormat,
    ) -> RemoteResult<OutputId> {
        self.job(format!(
            "slideshow {} {} {} {} {format}",
            audio.name,
            images.len(),
            options.image_seconds,
            options.transition.as_str()
        ))
    }

    fn video_merge(
        &self,
        audio: &FilePayload,
        videos: &[FilePayload],
        mode: MergeMode,
        replace_audio: bool,
        format: OutputFormat,
    ) -> RemoteResult<OutputId> {
        self.job(format!(
            "merge {} {} {} {replace_audio} {format}",
            audio.name,
            videos.len(),
            mode.as_str()
        ))
    }

    fn download(&self, output: &OutputId) -> RemoteResult<Vec<u8>> {
        self.record(format!("download {output}"));
        let scripted = self.script.lock().unwrap().downloads.pop_front();
        scripted.unwrap_or_else(|| Ok(format!("artifact {output}").into_bytes()))
    }
}
