//! The `Orchestrator` owns the track registry and drives every track through
//! upload, jobs and artifact retrieval.
//!
//! All registry mutations happen on the caller's thread, inside the public
//! methods below and while worker results are applied by `pump` or
//! `wait_idle`. Remote I/O runs on the `JobWorker` thread. A track's
//! `JobStatus` is the only lock: a job may start only when its track is not
//! `Running`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use crate::config::DownloadSettings;
use crate::error::PreconditionError;
use crate::library::{AudioEffects, JobStatus, MediaKind, OutputId, Track, TrackId, UploadedFile};
use crate::registry::TrackRegistry;
use crate::remote::{RemoteService, SlideshowOptions};

use super::options::{ConvertOptions, convert_options};
use super::plan::{JobError, JobPlan, PlanKind};
use super::types::{
    EffectSettings, JobId, JobRequest, OutputFormat, SessionEvent, StatusLine, VideoMode,
};
use super::worker::{JobWorker, WorkerCmd, WorkerEvent};

const MAX_VOLUME: f64 = 2.0;
const MAX_FADE_SECONDS: f64 = 10.0;

struct InFlight {
    job: JobId,
    plan: JobPlan,
}

pub struct Orchestrator {
    registry: TrackRegistry,
    worker: JobWorker,
    in_flight: HashMap<TrackId, InFlight>,
    next_job: u64,
    /// Commands sent to the worker whose event has not been applied yet.
    pending: usize,
    status: StatusLine,
    subscribers: Vec<Sender<SessionEvent>>,
}

impl Orchestrator {
    pub fn new(remote: impl RemoteService, downloads: DownloadSettings) -> Self {
        Self {
            registry: TrackRegistry::new(),
            worker: JobWorker::spawn(Box::new(remote), downloads),
            in_flight: HashMap::new(),
            next_job: 1,
            pending: 0,
            status: StatusLine::default(),
            subscribers: Vec::new(),
        }
    }

    /// Read-only view of the session's tracks.
    pub fn registry(&self) -> &TrackRegistry {
        &self.registry
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    /// Number of queued or running worker commands.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Receive every `SessionEvent` emitted from now on.
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Queue one file for upload.
    pub fn upload(&mut self, path: &Path) -> Result<(), PreconditionError> {
        self.upload_batch(&[path.to_path_buf()]).map(|_| ())
    }

    /// Queue several files for upload. They are uploaded one at a time, in
    /// the given order. Nothing is queued if any path is not a file.
    pub fn upload_batch(&mut self, paths: &[PathBuf]) -> Result<usize, PreconditionError> {
        if let Some(bad) = paths.iter().find(|p| !p.is_file()) {
            return Err(PreconditionError::MissingFile(bad.clone()));
        }
        if paths.is_empty() {
            return Ok(0);
        }

        for path in paths {
            log::info!("queueing upload of {}", path.display());
            self.dispatch(WorkerCmd::Upload { path: path.clone() });
        }

        let message = match paths {
            [single] => format!("Uploading {}…", display_name(single)),
            _ => format!("Uploading {} files…", paths.len()),
        };
        self.set_status(message, false);
        Ok(paths.len())
    }

    /// Start `request` on track `id`.
    ///
    /// Every precondition is checked before anything changes; a rejected
    /// request leaves the track exactly as it was and makes no remote call.
    pub fn start_job(
        &mut self,
        id: &TrackId,
        request: JobRequest,
    ) -> Result<JobId, PreconditionError> {
        let track = self
            .registry
            .find(id)
            .ok_or_else(|| PreconditionError::NotFound(id.clone()))?;
        if track.state.job_status.is_running() {
            return Err(PreconditionError::JobInProgress(id.clone()));
        }

        let plan = plan_job(track, request)?;
        let job = JobId(self.next_job);
        self.next_job += 1;

        let message = plan.progress_message();
        self.registry
            .update(id, |s| s.job_status = JobStatus::Running(message.clone()))?;
        self.in_flight.insert(
            id.clone(),
            InFlight {
                job,
                plan: plan.clone(),
            },
        );
        self.emit(SessionEvent::TrackChanged(id.clone()));
        self.set_status(message, false);

        let sent = self.dispatch(WorkerCmd::Run {
            job,
            track: id.clone(),
            plan,
        });
        if !sent {
            self.in_flight.remove(id);
            self.fail_track(id, "the job worker is not running".to_string());
        }
        Ok(job)
    }

    /// Remove a track locally and ask the service to delete its file.
    ///
    /// The local removal is final: a failed remote delete is only reported.
    /// A result for a job still running on the track is discarded.
    pub fn delete(&mut self, id: &TrackId) -> Option<Track> {
        let was_selected = self.registry.selected_id() == Some(id);
        let track = self.registry.remove(id)?;

        if self.in_flight.remove(id).is_some() {
            log::info!("track {id} deleted while a job was running; its result will be dropped");
        }

        self.emit(SessionEvent::TrackRemoved(id.clone()));
        if was_selected {
            self.emit(SessionEvent::SelectionChanged(None));
        }

        if !track.remote_ref.as_str().is_empty() {
            self.dispatch(WorkerCmd::Delete {
                remote_ref: track.remote_ref.clone(),
            });
        }
        self.set_status(format!("{} deleted", track.name), false);
        Some(track)
    }

    pub fn select(&mut self, id: &TrackId) -> Result<(), PreconditionError> {
        self.registry.select(id)?;
        self.emit(SessionEvent::SelectionChanged(Some(id.clone())));
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        if self.registry.selected_id().is_some() {
            self.registry.clear_selection();
            self.emit(SessionEvent::SelectionChanged(None));
        }
    }

    /// Move the timeline cursor to `fraction` of the timeline extent.
    pub fn seek_fraction(&mut self, fraction: f64) {
        self.registry.seek_fraction(fraction);
        let seconds = self.registry.cursor_seconds();
        self.emit(SessionEvent::CursorMoved(seconds));
    }

    /// Clear a track's failed badge. Other states are left alone.
    pub fn dismiss_failure(&mut self, id: &TrackId) -> Result<(), PreconditionError> {
        let changed = self.registry.update(id, |s| {
            if matches!(s.job_status, JobStatus::Failed(_)) {
                s.job_status = JobStatus::Idle;
                true
            } else {
                false
            }
        })?;
        if changed {
            self.emit(SessionEvent::TrackChanged(id.clone()));
        }
        Ok(())
    }

    /// Conversion choices for a track in the given video mode.
    pub fn options_for(
        &self,
        id: &TrackId,
        mode: VideoMode,
    ) -> Result<ConvertOptions, PreconditionError> {
        let track = self
            .registry
            .find(id)
            .ok_or_else(|| PreconditionError::NotFound(id.clone()))?;
        Ok(convert_options(track.kind, mode))
    }

    /// Apply every worker result that is already available. Never blocks.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.worker.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Block until the worker has nothing left to do, applying results as
    /// they arrive. Includes downloads triggered by finishing jobs.
    pub fn wait_idle(&mut self) {
        while self.pending > 0 {
            match self.worker.recv() {
                Ok(event) => self.apply(event),
                Err(_) => {
                    log::error!("job worker stopped with {} commands pending", self.pending);
                    self.pending = 0;
                }
            }
        }
    }

    fn apply(&mut self, event: WorkerEvent) {
        self.pending = self.pending.saturating_sub(1);
        match event {
            WorkerEvent::Uploaded { name, result } => self.finish_upload(&name, result),
            WorkerEvent::JobFinished { job, track, result } => {
                self.finish_job(job, &track, result)
            }
            WorkerEvent::Downloaded { output, result } => match result {
                Ok(path) => {
                    log::info!("saved {output} to {}", path.display());
                    self.set_status(format!("Download saved to {}", path.display()), false);
                    self.emit(SessionEvent::ArtifactSaved { output, path });
                }
                Err(error) => {
                    log::warn!("download of {output} failed: {error}");
                    self.set_status(format!("Download failed: {error}"), true);
                    self.emit(SessionEvent::DownloadFailed { output, error });
                }
            },
            WorkerEvent::Deleted { remote_ref, result } => {
                if let Err(e) = result {
                    log::warn!("remote delete of {remote_ref} failed: {e}");
                }
            }
        }
    }

    fn finish_upload(&mut self, name: &str, result: Result<UploadedFile, String>) {
        let uploaded = match result {
            Ok(u) => u,
            Err(e) => {
                log::warn!("upload of {name} failed: {e}");
                self.set_status(format!("Error: upload of {name} failed: {e}"), true);
                return;
            }
        };

        let track = Track::from_upload(uploaded);
        let id = track.id.clone();
        match self.registry.add(track) {
            Ok(()) => {
                log::info!("uploaded {name} as track {id}");
                self.emit(SessionEvent::TrackAdded(id));
                self.set_status(format!("{name} uploaded"), false);
            }
            Err(e) => {
                log::warn!("discarding upload of {name}: {e}");
                self.set_status(format!("Error: {e}"), true);
            }
        }
    }

    fn finish_job(&mut self, job: JobId, id: &TrackId, result: Result<OutputId, JobError>) {
        match self.in_flight.get(id) {
            Some(current) if current.job == job => {}
            _ => {
                log::warn!("dropping stale result of job {} for track {id}", job.0);
                return;
            }
        }
        let Some(InFlight { plan, .. }) = self.in_flight.remove(id) else {
            return;
        };

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                let message = e.to_string();
                log::warn!("job {} on track {id} failed: {message}", job.0);
                self.fail_track(id, message);
                return;
            }
        };

        let effects = plan.effects().cloned();
        let applied = self.registry.update(id, |s| {
            s.processed_ref = Some(output.clone());
            if let Some(effects) = effects {
                s.effects = Some(effects);
            }
            s.job_status = JobStatus::Idle;
        });
        if let Err(e) = applied {
            log::warn!("job {} finished for a vanished track: {e}", job.0);
            return;
        }

        log::info!("job {} on track {id} produced {output}", job.0);
        self.emit(SessionEvent::TrackChanged(id.clone()));
        self.set_status(plan.success_message(), false);

        let file_name = plan.download_name();
        if !self.dispatch(WorkerCmd::Download {
            output: output.clone(),
            file_name,
        }) {
            let error = "the job worker is not running".to_string();
            self.set_status(format!("Download failed: {error}"), true);
            self.emit(SessionEvent::DownloadFailed { output, error });
        }
    }

    fn fail_track(&mut self, id: &TrackId, message: String) {
        let status = JobStatus::Failed(message.clone());
        if self.registry.update(id, |s| s.job_status = status).is_ok() {
            self.emit(SessionEvent::TrackChanged(id.clone()));
        }
        self.set_status(format!("Error: {message}"), true);
    }

    fn dispatch(&mut self, cmd: WorkerCmd) -> bool {
        match self.worker.send(cmd) {
            Ok(()) => {
                self.pending += 1;
                true
            }
            Err(e) => {
                log::error!("job worker is gone, dropping {:?}", e.0);
                false
            }
        }
    }

    fn set_status(&mut self, message: String, is_error: bool) {
        self.status = StatusLine { message, is_error };
        let status = self.status.clone();
        self.emit(SessionEvent::Status(status));
    }

    fn emit(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Validate `request` against `track` and turn it into a runnable plan.
fn plan_job(track: &Track, request: JobRequest) -> Result<JobPlan, PreconditionError> {
    let mode = request.video_mode();

    if mode != VideoMode::None {
        require_audio(track, "audio to video")?;
    }
    if let Some(format) = request.format() {
        require_format(convert_options(track.kind, mode), track.kind, mode, format)?;
    }

    let kind = match request {
        JobRequest::ApplyEffects(settings) => {
            require_audio(track, "applying effects")?;
            PlanKind::Effects(effects_for(track, &settings)?)
        }
        JobRequest::Convert { format } => PlanKind::Convert(format),
        JobRequest::ImageToVideo { format, images } => {
            let image = match images.as_slice() {
                [] => return Err(PreconditionError::MissingAsset("image")),
                [one] => one.clone(),
                many => {
                    return Err(PreconditionError::TooManyAssets {
                        asset: "image",
                        given: many.len(),
                    });
                }
            };
            require_files(std::slice::from_ref(&image))?;
            PlanKind::ImageToVideo { format, image }
        }
        JobRequest::Slideshow {
            format,
            images,
            image_seconds,
            transition,
        } => {
            if images.is_empty() {
                return Err(PreconditionError::MissingAsset("image"));
            }
            if !(image_seconds.is_finite() && image_seconds > 0.0) {
                return Err(PreconditionError::InvalidSetting(format!(
                    "image duration must be positive, got {image_seconds}"
                )));
            }
            require_files(&images)?;
            PlanKind::Slideshow {
                format,
                images,
                options: SlideshowOptions {
                    image_seconds,
                    transition,
                },
            }
        }
        JobRequest::VideoMerge {
            format,
            videos,
            mode,
        } => {
            if videos.is_empty() {
                return Err(PreconditionError::MissingAsset("video"));
            }
            require_files(&videos)?;
            PlanKind::VideoMerge {
                format,
                videos,
                mode,
            }
        }
    };

    Ok(JobPlan {
        source: track.remote_ref.clone(),
        track_name: track.name.clone(),
        kind,
    })
}

fn require_audio(track: &Track, operation: &'static str) -> Result<(), PreconditionError> {
    if track.is_audio() {
        return Ok(());
    }
    Err(PreconditionError::KindMismatch {
        track: track.id.clone(),
        operation,
        expected: MediaKind::Audio,
        actual: track.kind,
    })
}

fn require_format(
    options: ConvertOptions,
    kind: MediaKind,
    mode: VideoMode,
    format: OutputFormat,
) -> Result<(), PreconditionError> {
    if options.allows(format) {
        Ok(())
    } else {
        Err(PreconditionError::UnsupportedFormat { kind, mode, format })
    }
}

fn require_files(paths: &[PathBuf]) -> Result<(), PreconditionError> {
    match paths.iter().find(|p| !p.is_file()) {
        Some(bad) => Err(PreconditionError::MissingFile(bad.clone())),
        None => Ok(()),
    }
}

fn effects_for(track: &Track, settings: &EffectSettings) -> Result<AudioEffects, PreconditionError> {
    if !(0.0..=MAX_VOLUME).contains(&settings.volume) {
        return Err(PreconditionError::InvalidSetting(format!(
            "volume must be between 0 and {MAX_VOLUME}, got {}",
            settings.volume
        )));
    }
    for (label, value) in [("fade in", settings.fade_in), ("fade out", settings.fade_out)] {
        if !(0.0..=MAX_FADE_SECONDS).contains(&value) {
            return Err(PreconditionError::InvalidSetting(format!(
                "{label} must be between 0 and {MAX_FADE_SECONDS} seconds, got {value}"
            )));
        }
    }

    Ok(AudioEffects {
        volume: settings.volume,
        normalize: settings.normalize,
        bass_boost: settings.bass_boost,
        echo: settings.echo,
        fade_in: settings.fade_in,
        fade_out: settings.fade_out,
        fade_out_start: (track.duration_seconds - settings.fade_out).max(0.0),
    })
}

