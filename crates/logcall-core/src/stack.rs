//! Stack capture with engine frames removed
//!
//! Traces are rendered from [`std::backtrace::Backtrace`] and then filtered
//! line by line. A line naming a frame that belongs to the instrumentation
//! layer is dropped together with the `at <file>:<line>` location lines that
//! follow it, so the trace a caller sees starts at the nearest frame of
//! their own code.

use crate::context::CapturedFailure;
use std::backtrace::Backtrace;
use std::borrow::Cow;

/// Substrings identifying frames of the engine and its unwind/backtrace glue
pub const DEFAULT_FRAME_NEEDLES: &[&str] = &[
    "logcall_core::interceptor",
    "logcall_core::stack",
    "logcall_core::format",
    "std::backtrace",
    "backtrace_rs",
    "std::panicking",
    "std::panic::",
    "__rust_try",
    "core::panic::unwind_safe",
    "futures_util::future::future::catch_unwind",
];

/// Prefix of the one-line summary placed before a failure trace in patterns
pub const FAILURE_SUMMARY_PREFIX: &str = "Method raised Exception: ";

/// Configurable set of substrings marking frames to hide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameFilter {
    needles: Vec<Cow<'static, str>>,
}

impl Default for FrameFilter {
    fn default() -> Self {
        Self {
            needles: DEFAULT_FRAME_NEEDLES
                .iter()
                .map(|needle| Cow::Borrowed(*needle))
                .collect(),
        }
    }
}

impl FrameFilter {
    /// Filter hiding the engine's own frames
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter that keeps every line
    pub fn empty() -> Self {
        Self {
            needles: Vec::new(),
        }
    }

    /// Also hide frames containing `needle` (e.g. a proxy layer's module path)
    pub fn with_needle(mut self, needle: impl Into<Cow<'static, str>>) -> Self {
        let needle = needle.into();
        if !needle.is_empty() && !self.needles.contains(&needle) {
            self.needles.push(needle);
        }
        self
    }

    pub fn needles(&self) -> impl Iterator<Item = &str> {
        self.needles.iter().map(|needle| needle.as_ref())
    }

    /// Whether `line` names a hidden frame
    pub fn matches(&self, line: &str) -> bool {
        self.needles.iter().any(|needle| line.contains(needle.as_ref()))
    }

    /// Remove hidden frames from a rendered trace, keeping line order
    pub fn filter(&self, trace: &str) -> String {
        let mut kept = Vec::new();
        let mut skipping_frame = false;

        for line in trace.lines() {
            if self.matches(line) {
                skipping_frame = true;
                continue;
            }
            if skipping_frame && is_location_line(line) {
                continue;
            }
            skipping_frame = false;
            kept.push(line);
        }

        kept.join("\n")
    }
}

fn is_location_line(line: &str) -> bool {
    line.trim_start().starts_with("at ")
}

/// Render the current call stack with hidden frames removed
///
/// Captures unconditionally, independent of `RUST_BACKTRACE`.
pub fn capture_current(filter: &FrameFilter) -> String {
    filter.filter(&Backtrace::force_capture().to_string())
}

/// Render the trace of a failure observed by the interceptor
///
/// The first line is `<type>: <message>`, followed by the filtered frames
/// active where the failure was observed and one `Caused by:` line per
/// link of the source chain.
pub fn failure_trace(failure: &CapturedFailure, filter: &FrameFilter) -> String {
    let mut out = format!("{}: {}", failure.type_name(), failure.message());

    let frames = capture_current(filter);
    if !frames.is_empty() {
        out.push('\n');
        out.push_str(&frames);
    }

    for cause in failure.causes() {
        out.push_str("\nCaused by: ");
        out.push_str(cause);
    }
    out
}

/// One-line summary used ahead of failure traces in custom patterns
pub fn failure_summary(failure: &CapturedFailure) -> String {
    format!("{FAILURE_SUMMARY_PREFIX}{}", failure.message())
}
