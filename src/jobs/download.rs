//! Saving retrieved artifacts into the download directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Write `bytes` to `dir/file_name` and return the final path.
///
/// The data lands in a temporary file first and is renamed into place, so a
/// failed write never leaves a truncated artifact behind. Without
/// `overwrite`, an existing file is kept and ` (1)`, ` (2)`, … is inserted
/// before the extension instead.
pub fn save_artifact(
    dir: &Path,
    file_name: &str,
    bytes: &[u8],
    overwrite: bool,
) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let file_name = sanitize_file_name(file_name);
    let target = if overwrite {
        dir.join(&file_name)
    } else {
        available_path(dir, &file_name)
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;

    if overwrite {
        tmp.persist(&target).map_err(|e| e.error)?;
    } else {
        tmp.persist_noclobber(&target).map_err(|e| e.error)?;
    }
    Ok(target)
}

/// Keep only the final path component; server-provided names must not
/// escape the download directory.
fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    match base {
        "" | "." | ".." => "download".to_string(),
        other => other.to_string(),
    }
}

fn available_path(dir: &Path, file_name: &str) -> PathBuf {
    let first = dir.join(file_name);
    if !first.exists() {
        return first;
    }

    let (stem, ext) = match file_name.rfind('.') {
        Some(dot) if dot > 0 => (&file_name[..dot], &file_name[dot..]),
        _ => (file_name, ""),
    };

    (1u32..)
        .map(|n| dir.join(format!("{stem} ({n}){ext}")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}
