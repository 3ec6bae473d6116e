use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::library::{AudioEffects, OutputId, RemoteRef};
use crate::remote::{FilePayload, RemoteError, RemoteService, SlideshowOptions};

use super::types::{MergeMode, OutputFormat};

/// Why a started job ended in `Failed`.
#[derive(Error, Debug)]
pub enum JobError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("cannot read {}: {source}", path.display())]
    Asset {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlanKind {
    Effects(AudioEffects),
    Convert(OutputFormat),
    ImageToVideo {
        format: OutputFormat,
        image: PathBuf,
    },
    Slideshow {
        format: OutputFormat,
        images: Vec<PathBuf>,
        options: SlideshowOptions,
    },
    VideoMerge {
        format: OutputFormat,
        videos: Vec<PathBuf>,
        mode: MergeMode,
    },
}

/// A validated job with everything the worker needs to run it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct JobPlan {
    pub source: RemoteRef,
    pub track_name: String,
    pub kind: PlanKind,
}

impl JobPlan {
    pub fn progress_message(&self) -> String {
        match &self.kind {
            PlanKind::Effects(_) => "Applying effects…".to_string(),
            PlanKind::Convert(format) => format!("Converting to {}…", format.label()),
            PlanKind::ImageToVideo { .. } => "Creating video from image…".to_string(),
            PlanKind::Slideshow { images, .. } => {
                format!("Creating slideshow with {} images…", images.len())
            }
            PlanKind::VideoMerge { videos, .. } => {
                format!("Merging audio with {} videos…", videos.len())
            }
        }
    }

    pub fn success_message(&self) -> String {
        match &self.kind {
            PlanKind::Effects(_) => "Effects applied, downloading…".to_string(),
            PlanKind::Convert(format) => format!("Converted to {}, downloading…", format.label()),
            PlanKind::ImageToVideo { format, .. } => {
                format!("Converted to {} video, downloading…", format.label())
            }
            PlanKind::Slideshow { .. } => "Slideshow created, downloading…".to_string(),
            PlanKind::VideoMerge { .. } => "Video with audio created, downloading…".to_string(),
        }
    }

    /// File name the job's artifact is saved under.
    pub fn download_name(&self) -> String {
        let name = &self.track_name;
        match &self.kind {
            PlanKind::Effects(_) => name.clone(),
            PlanKind::Convert(format) | PlanKind::ImageToVideo { format, .. } => {
                replace_extension(name, &format!(".{format}"))
            }
            PlanKind::Slideshow { format, .. } => {
                replace_extension(name, &format!("_slideshow.{format}"))
            }
            PlanKind::VideoMerge { format, .. } => {
                replace_extension(name, &format!("_video.{format}"))
            }
        }
    }

    /// Effects to record on the track once the job succeeds.
    pub fn effects(&self) -> Option<&AudioEffects> {
        match &self.kind {
            PlanKind::Effects(effects) => Some(effects),
            _ => None,
        }
    }

    /// Run the remote calls this job needs. Blocks until the service answers.
    pub fn execute(&self, remote: &dyn RemoteService) -> Result<OutputId, JobError> {
        match &self.kind {
            PlanKind::Effects(effects) => Ok(remote.apply_effects(&self.source, effects)?),
            PlanKind::Convert(format) => Ok(remote.convert(&self.source, *format)?),
            PlanKind::ImageToVideo { format, image } => {
                let image = read_asset(image)?;
                let audio = self.fetch_source(remote)?;
                Ok(remote.image_to_video(&audio, &image, *format)?)
            }
            PlanKind::Slideshow {
                format,
                images,
                options,
            } => {
                let images = read_assets(images)?;
                let audio = self.fetch_source(remote)?;
                Ok(remote.slideshow(&audio, &images, *options, *format)?)
            }
            PlanKind::VideoMerge {
                format,
                videos,
                mode,
            } => {
                let videos = read_assets(videos)?;
                let audio = self.fetch_source(remote)?;
                Ok(remote.video_merge(&audio, &videos, *mode, true, *format)?)
            }
        }
    }

    /// The merge endpoints cannot address stored files, so the source is
    /// fetched and resubmitted as a payload.
    fn fetch_source(&self, remote: &dyn RemoteService) -> Result<FilePayload, JobError> {
        let bytes = remote.fetch_file(&self.source)?;
        Ok(FilePayload::new(self.track_name.clone(), bytes))
    }
}

fn read_asset(path: &Path) -> Result<FilePayload, JobError> {
    FilePayload::read(path).map_err(|source| JobError::Asset {
        path: path.to_path_buf(),
        source,
    })
}

fn read_assets(paths: &[PathBuf]) -> Result<Vec<FilePayload>, JobError> {
    paths.iter().map(|p| read_asset(p)).collect()
}

/// Swap the last extension of `name` for `suffix`; names without an
/// extension get `suffix` appended.
pub(crate) fn replace_extension(name: &str, suffix: &str) -> String {
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() => format!("{}{suffix}", &name[..dot]),
        _ => format!("{name}{suffix}"),
    }
}
