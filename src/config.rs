use std::path::PathBuf;

/// Process-wide platform settings, consumed once by [`crate::platform::init_with`].
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Root directory against which `file://` loads are resolved.
    pub file_root: PathBuf,
    /// Log file written by the bootstrap logger. `None` keeps stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            file_root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            log_file: Some(PathBuf::from("websurface.log")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewConfig {
    pub width: u32,
    pub height: u32,
    /// Flip incoming mouse y coordinates against the surface height. Hosts
    /// with a bottom-left origin (Kivy and friends) opt in here instead of
    /// translating on their side.
    pub flip_vertical: bool,
    pub user_agent: String,
}

impl ViewConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            flip_vertical: false,
            user_agent: "WebSurface/0.1".to_string(),
        }
    }
}
