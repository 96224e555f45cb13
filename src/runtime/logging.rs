use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::Settings;

/// Send `tracing` output to the log file; the terminal belongs to the UI.
///
/// `CADENZA_LOG` overrides `log.level`. Without a writable log file the
/// subscriber is not installed and events are discarded.
pub fn init(settings: &Settings) {
    let Some(path) = settings.log_file() else {
        return;
    };
    if let Some(dir) = path.parent() {
        if fs::create_dir_all(dir).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_env("CADENZA_LOG")
        .unwrap_or_else(|_| EnvFilter::new(settings.log.level.as_str()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}
