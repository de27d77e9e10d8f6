//! Log sinks
//!
//! The engine only needs two things from a sink: whether a level is enabled
//! and a way to write one message at that level. Sinks are resolved per
//! owner through a [`SinkProvider`].

mod memory;
mod registry;
mod tracing_sink;

pub use memory::{MemorySink, Record};
pub use registry::SinkRegistry;
pub use tracing_sink::TracingSink;

use crate::errors::SinkError;
use logcall_core_types::LogLevel;
use std::sync::Arc;

/// Leveled destination for instrumentation messages
///
/// Implementations must tolerate concurrent `write` calls from many
/// invocations.
pub trait LogSink: Send + Sync {
    /// Gate check performed before any capture work
    fn is_enabled(&self, level: LogLevel) -> bool;

    /// Write one complete message
    ///
    /// # Errors
    ///
    /// Returns `SinkError` when the message could not be accepted. The
    /// interceptor reports it and never passes it to the instrumented caller.
    fn write(&self, level: LogLevel, message: &str) -> Result<(), SinkError>;
}

/// Resolves the sink for an owning type or module
pub trait SinkProvider: Send + Sync {
    fn sink_for(&self, owner: &str) -> Arc<dyn LogSink>;
}

/// A single sink serves every owner
impl SinkProvider for Arc<dyn LogSink> {
    fn sink_for(&self, _owner: &str) -> Arc<dyn LogSink> {
        Arc::clone(self)
    }
}
