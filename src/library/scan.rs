use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::UploadSettings;

fn has_allowed_extension(path: &Path, settings: &UploadSettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    // No configured extensions means "anything the user picked".
    if exts.is_empty() {
        return true;
    }

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Expand the user's selection into the ordered list of files to upload.
///
/// Plain files are kept in the order given, whatever their extension.
/// Directories are walked according to `settings` and their matching files
/// are appended in file-name order. Missing paths are passed through so the
/// caller can reject them with a proper error.
pub fn collect_uploads(paths: &[PathBuf], settings: &UploadSettings) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();

    for root in paths {
        if !root.is_dir() {
            files.push(root.clone());
            continue;
        }

        let mut walker = WalkDir::new(root)
            .follow_links(settings.follow_links)
            .sort_by_file_name();

        // Non-recursive = only the directory's own entries.
        let depth_cap = if settings.recursive {
            settings.max_depth
        } else {
            Some(1)
        };
        if let Some(d) = depth_cap {
            walker = walker.max_depth(d);
        }

        for entry in walker
            .into_iter()
            .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
            .filter_map(Result::ok)
        {
            let path = entry.path();
            if path.is_file() && has_allowed_extension(path, settings) {
                files.push(path.to_path_buf());
            }
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn has_allowed_extension_accepts_everything_when_unconfigured() {
        let settings = UploadSettings::default();
        assert!(has_allowed_extension(Path::new("/tmp/a.mp3"), &settings));
        assert!(has_allowed_extension(Path::new("/tmp/a.txt"), &settings));
        assert!(has_allowed_extension(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn has_allowed_extension_matches_configured_extensions_case_insensitive() {
        let settings = UploadSettings {
            extensions: vec![".MP3".into(), "mov".into(), "  ".into()],
            ..UploadSettings::default()
        };
        assert!(has_allowed_extension(Path::new("/tmp/a.mp3"), &settings));
        assert!(has_allowed_extension(Path::new("/tmp/a.MOV"), &settings));
        assert!(!has_allowed_extension(Path::new("/tmp/a.wav"), &settings));
        assert!(!has_allowed_extension(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn collect_uploads_keeps_explicit_files_in_given_order() {
        let dir = tempdir().unwrap();
        let b = dir.path().join("b.mp3");
        let a = dir.path().join("a.mov");
        fs::write(&b, b"x").unwrap();
        fs::write(&a, b"x").unwrap();

        let files = collect_uploads(&[b.clone(), a.clone()], &UploadSettings::default());
        assert_eq!(files, vec![b, a]);
    }

    #[test]
    fn collect_uploads_walks_directories_sorted_and_skips_hidden() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.wav"), b"x").unwrap();
        fs::write(dir.path().join("a.mp3"), b"x").unwrap();
        fs::write(dir.path().join(".secret.mp3"), b"x").unwrap();

        let files = collect_uploads(&[dir.path().to_path_buf()], &UploadSettings::default());
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.mp3".to_string(), "b.wav".to_string()]);
    }

    #[test]
    fn collect_uploads_respects_recursive_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.mp3"), b"x").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"x").unwrap();

        let settings = UploadSettings {
            recursive: false,
            ..UploadSettings::default()
        };
        let files = collect_uploads(&[dir.path().to_path_buf()], &settings);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("root.mp3"));
    }

    #[test]
    fn collect_uploads_passes_missing_paths_through() {
        let missing = PathBuf::from("/definitely/not/here.mp3");
        let files = collect_uploads(&[missing.clone()], &UploadSettings::default());
        assert_eq!(files, vec![missing]);
    }
}
