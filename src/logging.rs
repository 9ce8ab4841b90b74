use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, EnvFilter};

/// Structured logging to a file; the terminal belongs to the TUI.
///
/// `RUST_LOG` takes precedence over `level`. Returns false when no subscriber
/// was installed (no path, unwritable file, or already initialized).
pub fn init_logging(level: &str, path: Option<&Path>) -> bool {
    let Some(path) = path else {
        return false;
    };

    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return false;
        }
    }

    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return false;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .compact()
        .try_init()
        .is_ok()
}
