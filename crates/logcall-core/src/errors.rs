use logcall_core_types::ParseLevelError;
use thiserror::Error;

/// Result type alias using LogCallError
pub type Result<T> = std::result::Result<T, LogCallError>;

/// Stable classification of engine errors
///
/// Only configuration and engine-internal problems are classified here.
/// Failures of the instrumented operation itself are never wrapped: they are
/// handed back to the caller unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    InvalidLevel,
    InvalidOperationKey,
    Format,
    Sink,
    Io,
}

impl ErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Config => "ERR_CONFIG",
            ErrorKind::InvalidLevel => "ERR_INVALID_LEVEL",
            ErrorKind::InvalidOperationKey => "ERR_INVALID_OPERATION_KEY",
            ErrorKind::Format => "ERR_FORMAT",
            ErrorKind::Sink => "ERR_SINK",
            ErrorKind::Io => "ERR_IO",
        }
    }
}

/// Error returned by a [`crate::sink::LogSink`] that could not accept a message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("sink '{sink}' rejected message: {reason}")]
pub struct SinkError {
    pub sink: String,
    pub reason: String,
}

impl SinkError {
    pub fn new(sink: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            sink: sink.into(),
            reason: reason.into(),
        }
    }
}

/// Raised while building a log line; always recovered inside the interceptor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A value's `Display` implementation returned `fmt::Error`
    #[error("value rendering failed for {what}")]
    Render { what: String },

    /// Formatting panicked
    #[error("formatting panicked: {message}")]
    Panicked { message: String },
}

/// Comprehensive error taxonomy for LogCall engine operations
#[derive(Error, Debug)]
pub enum LogCallError {
    /// Configuration text could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A level name was not recognised
    #[error("Invalid level: {0}")]
    InvalidLevel(#[from] ParseLevelError),

    /// Operation keys must look like `Owner.operation`
    #[error("Invalid operation key '{key}': expected 'Owner.operation'")]
    InvalidOperationKey { key: String },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    /// Configuration file could not be read
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl LogCallError {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            LogCallError::Config(_) => ErrorKind::Config,
            LogCallError::InvalidLevel(_) => ErrorKind::InvalidLevel,
            LogCallError::InvalidOperationKey { .. } => ErrorKind::InvalidOperationKey,
            LogCallError::Format(_) => ErrorKind::Format,
            LogCallError::Sink(_) => ErrorKind::Sink,
            LogCallError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }
}
