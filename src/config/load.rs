use std::{env, path::PathBuf};

use super::schema::{MAX_SPEED, MIN_SPEED, Settings};

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then environment variables
/// (prefix `CADENZA__`), on top of struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("CADENZA")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&self.playback.speed) {
            return Err(format!(
                "playback.speed must be in [{MIN_SPEED}, {MAX_SPEED}]"
            ));
        }
        if self.playback.progress_poll_ms == 0 {
            return Err("playback.progress_poll_ms must be >= 1".to_string());
        }
        if self.session.identity.trim().is_empty() {
            return Err("session.identity must not be empty".to_string());
        }
        Ok(())
    }

    pub fn state_path(&self) -> Option<PathBuf> {
        self.storage
            .state_path
            .clone()
            .or_else(|| default_state_dir().map(|d| d.join("state.toml")))
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.log
            .file
            .clone()
            .or_else(|| default_state_dir().map(|d| d.join("cadenza.log")))
    }

    pub fn artwork_cache_dir(&self) -> Option<PathBuf> {
        self.session
            .artwork_cache_dir
            .clone()
            .or_else(|| default_cache_dir().map(|d| d.join("artwork")))
    }
}

/// Resolve the config path from `CADENZA_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("CADENZA_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// `$XDG_<var>` when set, else `~/<fallback>`.
fn xdg_dir(var: &str, fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(fallback))
    }
}

/// Compute the default config path under `$XDG_CONFIG_HOME/cadenza/config.toml`
/// or `~/.config/cadenza/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("cadenza").join("config.toml"))
}

pub fn default_state_dir() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", ".local/state").map(|d| d.join("cadenza"))
}

pub fn default_cache_dir() -> Option<PathBuf> {
    xdg_dir("XDG_CACHE_HOME", ".cache").map(|d| d.join("cadenza"))
}
