//! One-time platform bootstrap.
//!
//! Configures the pluggable process-wide backends before the first renderer
//! exists: the diagnostic log sink and the file-loading root for `file://`
//! resolution. Every surface-creation path calls [`init`] defensively, so
//! initialization is guarded and idempotent; a second call (with any config)
//! is a no-op. Backend failures are not surfaced here, they defer to first
//! use.

use std::fs::File;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::config::PlatformConfig;

static PLATFORM: OnceLock<PlatformConfig> = OnceLock::new();

/// Bootstrap with the default configuration (cwd file root, `websurface.log`).
pub fn init() {
    init_with(PlatformConfig::default());
}

/// Bootstrap with an explicit configuration. First call wins.
pub fn init_with(config: PlatformConfig) {
    PLATFORM.get_or_init(|| {
        init_logger(&config);
        log::info!(
            "platform initialized, file root {}",
            config.file_root.display()
        );
        config
    });
}

/// Root directory for `file://` loads. Bootstraps with defaults if the
/// caller never did.
pub fn file_root() -> PathBuf {
    init();
    PLATFORM
        .get()
        .map(|c| c.file_root.clone())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn init_logger(config: &PlatformConfig) {
    let mut builder = env_logger::Builder::from_default_env();

    if let Some(path) = &config.log_file {
        match File::create(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                eprintln!("websurface: cannot open log file {}: {e}", path.display());
            }
        }
    }

    // Another logger may already be installed by the host process.
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
        let root = file_root();
        assert!(root.as_os_str().len() > 0);
    }

    #[test]
    fn second_config_does_not_replace_first() {
        init();
        let before = file_root();
        init_with(PlatformConfig {
            file_root: PathBuf::from("/nonexistent-root"),
            log_file: None,
        });
        assert_eq!(file_root(), before);
    }
}
