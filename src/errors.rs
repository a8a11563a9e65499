pub type Result<T> = std::result::Result<T, SurfaceError>;

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("Invalid surface handle")]
    InvalidHandle,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Surface does not have input focus")]
    NotFocused,

    #[error("No bitmap available yet; render the surface first")]
    NoBitmap,

    #[error("Pixel buffer is already locked")]
    AlreadyLocked,

    #[error("Pixel buffer is not locked")]
    NotLocked,

    #[error("Renderer still has live surfaces")]
    RendererInUse,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Load error: {0}")]
    Load(String),
}
