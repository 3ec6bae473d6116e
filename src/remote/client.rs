//! `RemoteService` over HTTP, backed by a blocking `reqwest` client.

use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::RemoteSettings;
use crate::jobs::{MergeMode, OutputFormat};
use crate::library::{AudioEffects, OutputId, RemoteRef, TrackId, UploadedFile};

use super::error::{RemoteError, RemoteResult};
use super::types::{FilePayload, RemoteService, SlideshowOptions};

pub struct HttpRemote {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadReply {
    file_id: String,
    original_name: String,
    file_path: String,
    size: u64,
    #[serde(default)]
    duration: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReply {
    output_id: String,
}

impl HttpRemote {
    pub fn new(settings: &RemoteSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(settings.connect_timeout_ms))
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// URL for an endpoint addressing a stored file, e.g. `file/{filePath}`.
    fn ref_url(&self, endpoint: &str, reference: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            endpoint,
            urlencoding::encode(reference)
        )
    }

    fn post_json(&self, path: &str, body: &Value) -> RemoteResult<String> {
        log::debug!("POST {path}");
        let resp = send(self.client.post(self.url(path)).json(body))?;
        resp.text()
            .map_err(|e| RemoteError::Network(format!("failed to read body: {e}")))
    }

    fn post_form(&self, path: &str, form: Form) -> RemoteResult<String> {
        log::debug!("POST {path} (multipart)");
        let resp = send(self.client.post(self.url(path)).multipart(form))?;
        resp.text()
            .map_err(|e| RemoteError::Network(format!("failed to read body: {e}")))
    }

    fn get_bytes(&self, url: &str) -> RemoteResult<Vec<u8>> {
        log::debug!("GET {url}");
        let resp = send(self.client.get(url))?;
        resp.bytes()
            .map(|b| b.to_vec())
            .map_err(|e| RemoteError::Network(format!("failed to read body: {e}")))
    }
}

impl RemoteService for HttpRemote {
    fn upload(&self, file: &FilePayload) -> RemoteResult<UploadedFile> {
        let form = Form::new().part("file", file_part(file));
        let reply: UploadReply = parse_reply(&self.post_form("upload", form)?)?;
        Ok(UploadedFile {
            file_id: TrackId::new(reply.file_id),
            original_name: reply.original_name,
            file_path: RemoteRef::new(reply.file_path),
            size: reply.size,
            duration: reply.duration.unwrap_or(0.0),
        })
    }

    fn delete(&self, remote_ref: &RemoteRef) -> RemoteResult<()> {
        let url = self.ref_url("file", remote_ref.as_str());
        log::debug!("DELETE {url}");
        send(self.client.delete(url)).map(|_| ())
    }

    fn apply_effects(
        &self,
        remote_ref: &RemoteRef,
        effects: &AudioEffects,
    ) -> RemoteResult<OutputId> {
        let body = json!({ "filePath": remote_ref, "effects": effects });
        job_output(&self.post_json("audio-effects", &body)?)
    }

    fn convert(&self, remote_ref: &RemoteRef, format: OutputFormat) -> RemoteResult<OutputId> {
        let body = json!({ "filePath": remote_ref, "format": format.as_str() });
        job_output(&self.post_json("convert", &body)?)
    }

    fn fetch_file(&self, remote_ref: &RemoteRef) -> RemoteResult<Vec<u8>> {
        self.get_bytes(&self.ref_url("file-download", remote_ref.as_str()))
    }

    fn image_to_video(
        &self,
        audio: &FilePayload,
        image: &FilePayload,
        format: OutputFormat,
    ) -> RemoteResult<OutputId> {
        let form = Form::new()
            .part("audio", file_part(audio))
            .text("format", format.as_str())
            .part("image", file_part(image));
        job_output(&self.post_form("audio-to-video", form)?)
    }

    fn slideshow(
        &self,
        audio: &FilePayload,
        images: &[FilePayload],
        options: SlideshowOptions,
        format: OutputFormat,
    ) -> RemoteResult<OutputId> {
        let form = Form::new()
            .part("audio", file_part(audio))
            .text("format", format.as_str());
        let form = file_parts(form, "images", images)
            .text("imageDuration", options.image_seconds.to_string())
            .text("transition", options.transition.as_str());
        job_output(&self.post_form("audio-to-video-slideshow", form)?)
    }

    fn video_merge(
        &self,
        audio: &FilePayload,
        videos: &[FilePayload],
        mode: MergeMode,
        replace_audio: bool,
        format: OutputFormat,
    ) -> RemoteResult<OutputId> {
        let form = Form::new()
            .part("audio", file_part(audio))
            .text("format", format.as_str());
        let form = file_parts(form, "videos", videos)
            .text("videoMode", mode.as_str())
            .text("replaceAudio", if replace_audio { "true" } else { "false" });
        job_output(&self.post_form("audio-video-merge", form)?)
    }

    fn download(&self, output: &OutputId) -> RemoteResult<Vec<u8>> {
        self.get_bytes(&self.ref_url("download", output.as_str()))
    }
}

/// Map transport failures and non-2xx statuses to `Network`, whatever the body.
fn send(request: RequestBuilder) -> RemoteResult<Response> {
    request
        .send()
        .and_then(Response::error_for_status)
        .map_err(|e| RemoteError::Network(e.to_string()))
}

fn file_part(file: &FilePayload) -> Part {
    Part::bytes(file.bytes.clone()).file_name(file.name.clone())
}

/// Append one `name` part per file, keeping their order.
fn file_parts(form: Form, name: &'static str, files: &[FilePayload]) -> Form {
    files
        .iter()
        .fold(form, |form, file| form.part(name, file_part(file)))
}

fn job_output(body: &str) -> RemoteResult<OutputId> {
    let reply: JobReply = parse_reply(body)?;
    Ok(OutputId::new(reply.output_id))
}

/// Decode a JSON reply: `success: false` is a `Remote` error, anything that
/// does not match the expected shape is a `Protocol` error.
pub(super) fn parse_reply<T: DeserializeOwned>(body: &str) -> RemoteResult<T> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| RemoteError::Protocol(format!("reply is not JSON: {e}")))?;

    match value.get("success").and_then(Value::as_bool) {
        Some(true) => {}
        Some(false) => {
            let msg = value
                .get("error")
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .unwrap_or("the server reported a failure without details");
            return Err(RemoteError::Remote(msg.to_string()));
        }
        None => {
            return Err(RemoteError::Protocol(
                "reply has no boolean `success` field".to_string(),
            ));
        }
    }

    serde_json::from_value(value).map_err(|e| RemoteError::Protocol(e.to_string()))
}
