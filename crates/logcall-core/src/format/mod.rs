//! Message building
//!
//! [`MessageFormatter`] turns an [`InstrumentationSpec`] and an
//! [`InvocationContext`] into the single line handed to a sink. Exactly one
//! builder runs per call: the custom pattern when the spec carries a
//! non-empty one, the default layout otherwise.

mod default_layout;
mod pattern;

use crate::context::InvocationContext;
use crate::errors::FormatError;
use crate::spec::{FormatMode, InstrumentationSpec};
use crate::stack::FrameFilter;

pub use pattern::{
    PLACEHOLDER_CLASS_NAME, PLACEHOLDER_EXCEPTION, PLACEHOLDER_METHOD_NAME, PLACEHOLDER_PARAMS,
    PLACEHOLDER_RETURN, PLACEHOLDER_STACKTRACE,
};

/// Builds log lines; holds no per-call state
#[derive(Debug, Clone, Default)]
pub struct MessageFormatter {
    filter: FrameFilter,
}

impl MessageFormatter {
    pub fn new(filter: FrameFilter) -> Self {
        Self { filter }
    }

    pub fn frame_filter(&self) -> &FrameFilter {
        &self.filter
    }

    /// Build the message for one call
    ///
    /// # Errors
    ///
    /// Returns `FormatError::Render` when a parameter's `Display` fails.
    pub fn format(
        &self,
        spec: &InstrumentationSpec,
        ctx: &InvocationContext<'_>,
    ) -> Result<String, FormatError> {
        match spec.format_mode() {
            FormatMode::Custom(pattern) => self.custom(pattern, ctx),
            FormatMode::Default => self.default_layout(spec, ctx),
        }
    }

    /// Minimal line used when [`MessageFormatter::format`] could not finish
    pub fn fallback(&self, ctx: &InvocationContext<'_>, err: &FormatError) -> String {
        format!(
            "Method '{}' | Duration: {}ms | Log formatting failed: {}",
            ctx.operation_name(),
            ctx.duration_millis(),
            err
        )
    }
}
