use std::fmt;

#[derive(Debug, Clone)]
pub enum StudioError {
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl fmt::Display for StudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudioError::NotFound(msg) => write!(f, "not found: {msg}"),
            StudioError::Conflict(msg) => write!(f, "conflict: {msg}"),
            StudioError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for StudioError {}
