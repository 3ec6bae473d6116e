use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then lets environment
/// variables (prefix `MIXDESK__`) override it; anything unset keeps its
/// struct default.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("MIXDESK")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Reject settings the session cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        let url = self.remote.base_url.trim();
        if url.is_empty() {
            return Err("remote.base_url must not be empty".to_string());
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!(
                "remote.base_url must start with http:// or https://, got `{url}`"
            ));
        }

        for (name, value) in [
            ("remote.connect_timeout_ms", self.remote.connect_timeout_ms),
            ("remote.request_timeout_ms", self.remote.request_timeout_ms),
        ] {
            if value == 0 {
                return Err(format!("{name} must be >= 1"));
            }
        }

        let seconds = self.jobs.slideshow_image_seconds;
        if !(seconds.is_finite() && seconds > 0.0) {
            return Err(format!(
                "jobs.slideshow_image_seconds must be positive, got {seconds}"
            ));
        }
        Ok(())
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Resolve the config path from `MIXDESK_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("MIXDESK_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/mixdesk/config.toml`
/// or `~/.config/mixdesk/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("mixdesk").join("config.toml"))
}
