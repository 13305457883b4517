/// Result alias that carries the custom [`PixcycleError`] type.
pub type Result<T> = std::result::Result<T, PixcycleError>;

/// Common error type for the core crate.
///
/// Only startup paths produce these. Once the playback loop is running every
/// failure is local to a single action and is logged rather than returned.
#[derive(Debug, thiserror::Error)]
pub enum PixcycleError {
    /// The playlist, day window or scheduler settings are invalid.
    #[error("configuration error: {0}")]
    Config(String),
    /// No device listed by the toolchain matched the requested name.
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    /// The device listing could not be obtained at all.
    #[error("device discovery failed: {0}")]
    Discovery(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The playlist file is not valid JSON for the expected schema.
    #[error("invalid playlist file: {0}")]
    Json(#[from] serde_json::Error),
}

impl PixcycleError {
    /// Creates a configuration error from the provided message.
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }
}
