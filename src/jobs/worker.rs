use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::config::DownloadSettings;
use crate::library::{OutputId, RemoteRef, TrackId, UploadedFile};
use crate::remote::{FilePayload, RemoteError, RemoteService};

use super::download::save_artifact;
use super::plan::{JobError, JobPlan};
use super::types::JobId;

#[derive(Debug)]
pub(crate) enum WorkerCmd {
    Upload {
        path: PathBuf,
    },
    Run {
        job: JobId,
        track: TrackId,
        plan: JobPlan,
    },
    Download {
        output: OutputId,
        file_name: String,
    },
    Delete {
        remote_ref: RemoteRef,
    },
    Quit,
}

/// Exactly one event is reported for every command except `Quit`.
#[derive(Debug)]
pub(crate) enum WorkerEvent {
    Uploaded {
        name: String,
        result: Result<UploadedFile, String>,
    },
    JobFinished {
        job: JobId,
        track: TrackId,
        result: Result<OutputId, JobError>,
    },
    Downloaded {
        output: OutputId,
        result: Result<PathBuf, String>,
    },
    Deleted {
        remote_ref: RemoteRef,
        result: Result<(), RemoteError>,
    },
}

/// Background thread that performs all remote I/O, strictly in the order the
/// commands were sent.
pub(crate) struct JobWorker {
    tx: Sender<WorkerCmd>,
    rx: Receiver<WorkerEvent>,
    join: Option<JoinHandle<()>>,
}

impl JobWorker {
    pub fn spawn(remote: Box<dyn RemoteService>, downloads: DownloadSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<WorkerCmd>();
        let (event_tx, event_rx) = mpsc::channel::<WorkerEvent>();

        let join = thread::Builder::new()
            .name("mixdesk-worker".into())
            .spawn(move || run(remote, downloads, cmd_rx, event_tx))
            .ok();
        if join.is_none() {
            log::error!("failed to spawn the job worker thread");
        }

        Self {
            tx: cmd_tx,
            rx: event_rx,
            join,
        }
    }

    pub fn send(&self, cmd: WorkerCmd) -> Result<(), mpsc::SendError<WorkerCmd>> {
        self.tx.send(cmd)
    }

    pub fn try_recv(&self) -> Result<WorkerEvent, mpsc::TryRecvError> {
        self.rx.try_recv()
    }

    pub fn recv(&self) -> Result<WorkerEvent, mpsc::RecvError> {
        self.rx.recv()
    }
}

impl Drop for JobWorker {
    fn drop(&mut self) {
        // In-flight requests are not cancelled; wait for the thread to finish
        // its queue.
        let _ = self.tx.send(WorkerCmd::Quit);
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}

fn run(
    remote: Box<dyn RemoteService>,
    downloads: DownloadSettings,
    rx: Receiver<WorkerCmd>,
    tx: Sender<WorkerEvent>,
) {
    while let Ok(cmd) = rx.recv() {
        let event = match cmd {
            WorkerCmd::Quit => break,
            WorkerCmd::Upload { path } => {
                let name = path
                    .file_name()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                let result = FilePayload::read(&path)
                    .map_err(|e| format!("cannot read {}: {e}", path.display()))
                    .and_then(|file| remote.upload(&file).map_err(|e| e.to_string()));
                WorkerEvent::Uploaded { name, result }
            }
            WorkerCmd::Run { job, track, plan } => {
                log::info!("job {} on track {track}: {}", job.0, plan.progress_message());
                let result = plan.execute(remote.as_ref());
                WorkerEvent::JobFinished { job, track, result }
            }
            WorkerCmd::Download { output, file_name } => {
                let result = remote
                    .download(&output)
                    .map_err(|e| e.to_string())
                    .and_then(|bytes| {
                        save_artifact(&downloads.dir, &file_name, &bytes, downloads.overwrite)
                            .map_err(|e| format!("cannot save {file_name}: {e}"))
                    });
                WorkerEvent::Downloaded { output, result }
            }
            WorkerCmd::Delete { remote_ref } => {
                let result = remote.delete(&remote_ref);
                WorkerEvent::Deleted { remote_ref, result }
            }
        };

        if tx.send(event).is_err() {
            // The session is gone; nobody is left to apply results.
            break;
        }
    }
}
