use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::jobs::{MergeMode, Transition};

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/mixdesk/config.toml` or `~/.config/mixdesk/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `MIXDESK__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub remote: RemoteSettings,
    pub downloads: DownloadSettings,
    pub uploads: UploadSettings,
    pub jobs: JobSettings,
}

/// Where the media service lives and how long to wait for it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Base URL every endpoint path is appended to, e.g. `http://host:3000/api`.
    pub base_url: String,
    pub connect_timeout_ms: u64,
    /// Whole-request limit. Processing requests block until the service is
    /// done, so keep this generous.
    pub request_timeout_ms: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000/api".to_string(),
            connect_timeout_ms: 5_000,
            request_timeout_ms: 300_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Directory processed artifacts are saved into. Created on demand.
    pub dir: PathBuf,
    /// Replace an existing file instead of saving as `name (1).ext`.
    pub overwrite: bool,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            overwrite: false,
        }
    }
}

/// How directories given on the command line are expanded into files.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Whether to follow symlinks while walking.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Maximum directory depth when recursive; unlimited when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    /// Extensions to pick up (case-insensitive, without dot). Empty means any file.
    pub extensions: Vec<String>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            recursive: true,
            follow_links: true,
            include_hidden: false,
            max_depth: None,
            extensions: Vec::new(),
        }
    }
}

/// Defaults for job parameters the user does not spell out.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JobSettings {
    /// Seconds each slideshow image stays on screen.
    pub slideshow_image_seconds: f64,
    pub slideshow_transition: Transition,
    pub merge_mode: MergeMode,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            slideshow_image_seconds: 5.0,
            slideshow_transition: Transition::Fade,
            merge_mode: MergeMode::Loop,
        }
    }
}
