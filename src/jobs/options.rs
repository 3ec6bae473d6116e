//! Which formats and inputs a conversion offers for a given track kind and
//! video mode. Pure functions, used both to present choices and to validate
//! a job before it starts.

use crate::library::MediaKind;

use super::types::{OutputFormat, VideoMode};

const AUDIO_FORMATS: &[OutputFormat] = &[
    OutputFormat::Mp3,
    OutputFormat::Wav,
    OutputFormat::Flac,
    OutputFormat::M4a,
];

const VIDEO_FORMATS: &[OutputFormat] = &[
    OutputFormat::Mp4,
    OutputFormat::Mkv,
    OutputFormat::Avi,
    OutputFormat::Mov,
];

/// Video tracks may also be converted down to these audio-only formats.
const VIDEO_TO_AUDIO_FORMATS: &[OutputFormat] = &[OutputFormat::Mp3, OutputFormat::Wav];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ImageInput {
    Single,
    Multiple,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Whether the audio→video modes are offered at all.
    pub video_modes: bool,
    pub formats: Vec<OutputFormat>,
    pub image_input: Option<ImageInput>,
    pub video_input: bool,
    pub slideshow_settings: bool,
    pub merge_settings: bool,
}

impl ConvertOptions {
    pub fn allows(&self, format: OutputFormat) -> bool {
        self.formats.contains(&format)
    }
}

pub fn convert_options(kind: MediaKind, mode: VideoMode) -> ConvertOptions {
    let video_modes = kind == MediaKind::Audio;

    let mut opts = ConvertOptions {
        video_modes,
        formats: Vec::new(),
        image_input: None,
        video_input: false,
        slideshow_settings: false,
        merge_settings: false,
    };

    match (kind, mode) {
        (MediaKind::Audio, VideoMode::None) => opts.formats = AUDIO_FORMATS.to_vec(),
        (MediaKind::Video, VideoMode::None) => {
            opts.formats = VIDEO_FORMATS
                .iter()
                .chain(VIDEO_TO_AUDIO_FORMATS)
                .copied()
                .collect();
        }
        // Video tracks never get the audio→video modes: nothing is offered.
        (MediaKind::Video, _) => {}
        (MediaKind::Audio, VideoMode::Static) => {
            opts.formats = VIDEO_FORMATS.to_vec();
            opts.image_input = Some(ImageInput::Single);
        }
        (MediaKind::Audio, VideoMode::Slideshow) => {
            opts.formats = VIDEO_FORMATS.to_vec();
            opts.image_input = Some(ImageInput::Multiple);
            opts.slideshow_settings = true;
        }
        (MediaKind::Audio, VideoMode::Background) => {
            opts.formats = VIDEO_FORMATS.to_vec();
            opts.video_input = true;
            opts.merge_settings = true;
        }
    }

    opts
}

/// Display label for a format in a given kind's conversion menu.
pub fn format_label(kind: MediaKind, format: OutputFormat) -> String {
    if kind == MediaKind::Video && format.is_audio() {
        format!("{} (audio only)", format.label())
    } else {
        format.label()
    }
}
