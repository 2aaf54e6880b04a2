use thiserror::Error;

#[derive(Error, Debug)]
pub enum ActivityError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Decode error at {path}: {message}")]
    Decode { path: String, message: String },
    #[error("Encode error at {path}: {message}")]
    Encode { path: String, message: String },
    #[error("Resolution of '{id}' failed: {message}")]
    Resolution { id: String, message: String },
    #[error("JSON error: {0}")]
    Json(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, ActivityError>;

impl ActivityError {
    pub fn decode(path: impl ToString, message: impl Into<String>) -> Self {
        Self::Decode { path: path.to_string(), message: message.into() }
    }
    pub fn encode(path: impl ToString, message: impl Into<String>) -> Self {
        Self::Encode { path: path.to_string(), message: message.into() }
    }
    /// The offending property path for decode and encode failures.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Decode { path, .. } | Self::Encode { path, .. } => Some(path),
            _ => None,
        }
    }
}

// Helper conversions
impl From<serde_json::Error> for ActivityError {
    fn from(e: serde_json::Error) -> Self { Self::Json(e.to_string()) }
}
impl From<::config::ConfigError> for ActivityError {
    fn from(e: ::config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<std::io::Error> for ActivityError {
    fn from(e: std::io::Error) -> Self { Self::Io(e.to_string()) }
}
