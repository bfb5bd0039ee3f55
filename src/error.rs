use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    // Config
    #[error("invalid source: {0}")]
    InvalidSource(String),

    #[error("group not found: {0}")]
    RootNotFound(String),

    // Values
    #[error("invalid data size: {0:?}")]
    InvalidDataSize(String),

    // Third-party extensibility
    #[error("extension error: {0}")]
    Extension(String),
}

impl SearchError {
    /// Whether the search can continue after this error.
    ///
    /// Recoverable errors (a bad threshold string, a failing extension) are
    /// logged at the entity they occurred on and the walk keeps going.
    ///
    /// Fatal errors (no source, unknown start group) stop `run()` before
    /// anything is traversed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidDataSize(_) | Self::Extension(_))
    }
}
