//! LogCall Core - method-level instrumentation engine
//!
//! Wraps operation bodies and emits exactly one leveled log line per
//! invocation, including:
//! - Declarative per-operation specs (level, parameters, return value,
//!   stack traces, failure traces, custom patterns)
//! - A gate check so disabled levels cost nothing beyond one call
//! - Panic-transparent interception: outcomes and panics reach the caller
//!   unchanged
//! - Stack capture with the engine's own frames filtered out
//! - Pluggable sinks, with `tracing` forwarding and an in-memory capture
//! - A concurrent registry memoizing specs per operation, loadable from TOML

pub mod config;
pub mod context;
pub mod errors;
pub mod format;
pub mod interceptor;
pub mod logging_facility;
pub mod registry;
pub mod sink;
pub mod spec;
pub mod stack;

// Re-export commonly used types
pub use config::LogCallConfig;
pub use context::{CallSite, CapturedFailure, InvocationContext};
pub use errors::{ErrorKind, LogCallError, Result};
pub use format::MessageFormatter;
pub use interceptor::Interceptor;
pub use logcall_core_types::{LogLevel, Sensitive};
pub use registry::{InstrumentedOperation, OperationKey, OperationRegistry};
pub use sink::{LogSink, MemorySink, SinkProvider, SinkRegistry, TracingSink};
pub use spec::{FormatMode, InstrumentationSpec};
pub use stack::FrameFilter;
