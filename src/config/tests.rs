use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use crate::jobs::{MergeMode, Transition};
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_mixdesk_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("MIXDESK_CONFIG_PATH", "/tmp/mixdesk-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/mixdesk-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    assert_eq!(
        default_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("mixdesk")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("mixdesk")
            .join("config.toml")
    );
}

#[test]
fn defaults_are_valid() {
    let s = Settings::default();
    assert_eq!(s.remote.base_url, "http://127.0.0.1:3000/api");
    assert_eq!(s.downloads.dir, std::path::PathBuf::from("."));
    assert!(!s.downloads.overwrite);
    assert!(s.uploads.recursive);
    assert_eq!(s.jobs.slideshow_image_seconds, 5.0);
    assert_eq!(s.jobs.slideshow_transition, Transition::Fade);
    assert_eq!(s.jobs.merge_mode, MergeMode::Loop);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_load_from_config_file_and_parse_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[remote]
base_url = "https://media.example.test/api/"
request_timeout_ms = 1000

[downloads]
dir = "/tmp/renders"
overwrite = true

[uploads]
recursive = false
extensions = ["mp3", "mov"]
max_depth = 2

[jobs]
slideshow_image_seconds = 2.5
slideshow_transition = "cut"
merge_mode = "once"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("MIXDESK_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("MIXDESK__REMOTE__REQUEST_TIMEOUT_MS");

    let s = Settings::load().unwrap();
    assert_eq!(s.remote.base_url, "https://media.example.test/api/");
    assert_eq!(s.remote.request_timeout_ms, 1000);
    assert_eq!(s.remote.connect_timeout_ms, 5_000);
    assert_eq!(s.downloads.dir, std::path::PathBuf::from("/tmp/renders"));
    assert!(s.downloads.overwrite);
    assert!(!s.uploads.recursive);
    assert_eq!(s.uploads.extensions, vec!["mp3".to_string(), "mov".to_string()]);
    assert_eq!(s.uploads.max_depth, Some(2));
    assert_eq!(s.jobs.slideshow_image_seconds, 2.5);
    assert_eq!(s.jobs.slideshow_transition, Transition::None);
    assert_eq!(s.jobs.merge_mode, MergeMode::Sequence);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[remote]
request_timeout_ms = 1000
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("MIXDESK_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("MIXDESK__REMOTE__REQUEST_TIMEOUT_MS", "42");

    let s = Settings::load().unwrap();
    assert_eq!(s.remote.request_timeout_ms, 42);
}

#[test]
fn missing_config_file_yields_defaults() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let _g1 = EnvGuard::set("MIXDESK_CONFIG_PATH", missing.to_str().unwrap());

    let s = Settings::load().unwrap();
    assert_eq!(s.remote.base_url, RemoteSettings::default().base_url);
}

#[test]
fn validate_rejects_unusable_settings() {
    let mut s = Settings::default();
    s.remote.base_url = "  ".to_string();
    assert!(s.validate().unwrap_err().contains("base_url"));

    let mut s = Settings::default();
    s.remote.base_url = "ftp://host/api".to_string();
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.remote.connect_timeout_ms = 0;
    assert!(s.validate().unwrap_err().contains("connect_timeout_ms"));

    let mut s = Settings::default();
    s.jobs.slideshow_image_seconds = 0.0;
    assert!(s.validate().unwrap_err().contains("slideshow_image_seconds"));
}

#[test]
fn to_toml_renders_every_section() {
    let text = Settings::default().to_toml().unwrap();
    for section in ["[remote]", "[downloads]", "[uploads]", "[jobs]"] {
        assert!(text.contains(section), "missing {section} in:\n{text}");
    }
    assert!(text.contains("slideshow_transition = \"fade\""));
    assert!(!text.contains("max_depth"));
}
