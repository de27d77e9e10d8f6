use logcall_core::{Interceptor, MemorySink};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Interceptor writing to a fresh sink that accepts every level
#[allow(dead_code)]
pub fn capture_all() -> (Arc<MemorySink>, Interceptor) {
    with_sink(MemorySink::all())
}

#[allow(dead_code)]
pub fn with_sink(sink: MemorySink) -> (Arc<MemorySink>, Interceptor) {
    let sink = Arc::new(sink);
    let interceptor = Interceptor::with_sink(sink.clone());
    (sink, interceptor)
}

/// Error raised by the sample services in these tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub message: String,
}

#[allow(dead_code)]
impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ServiceError {}

/// Error with a two-level source chain
#[allow(dead_code)]
#[derive(Debug)]
pub struct LayeredError {
    pub inner: std::io::Error,
}

impl fmt::Display for LayeredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request failed")
    }
}

impl Error for LayeredError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.inner)
    }
}

/// Value whose `Display` always fails
#[allow(dead_code)]
pub struct BrokenDisplay;

impl fmt::Display for BrokenDisplay {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Err(fmt::Error)
    }
}

/// Value whose `Display` panics
#[allow(dead_code)]
pub struct PanickingDisplay;

impl fmt::Display for PanickingDisplay {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        panic!("display exploded")
    }
}
