//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names consistent between the sinks that
//! forward instrumentation messages and the engine's own diagnostics.

/// Target used for every message written by the tracing sink
pub const TARGET_CALLS: &str = "logcall";
/// Target used for the engine's own diagnostics (sink failures, fallbacks)
pub const TARGET_ENGINE: &str = "logcall::engine";

// Canonical field keys for structured logging
pub const FIELD_OWNER: &str = "owner";
pub const FIELD_OP: &str = "op";
pub const FIELD_MESSAGE: &str = "message";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Error fields
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_CALL: &str = "call";
pub const EVENT_FORMAT_FAILED: &str = "format_failed";
pub const EVENT_SINK_FAILED: &str = "sink_failed";
