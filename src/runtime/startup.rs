use std::path::PathBuf;

use crate::config::UploadSettings;
use crate::jobs::Orchestrator;
use crate::library::collect_uploads;

/// Expand `paths` and queue them for upload. Returns how many files were queued.
pub fn queue_uploads(
    orch: &mut Orchestrator,
    paths: &[PathBuf],
    settings: &UploadSettings,
) -> Result<usize, String> {
    let files = collect_uploads(paths, settings);
    if files.is_empty() {
        return Err("nothing to upload".to_string());
    }
    log::debug!("expanded {} paths into {} files", paths.len(), files.len());
    match files.as_slice() {
        [one] => orch.upload(one).map(|()| 1),
        many => orch.upload_batch(many),
    }
    .map_err(|e| e.to_string())
}
