//! Declarative description of what to capture around one operation
//!
//! An [`InstrumentationSpec`] is built once when an operation is registered
//! and then shared read-only by every invocation of that operation.

use logcall_core_types::LogLevel;

/// Which message builder applies to an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatMode<'a> {
    /// Built-in `Method '...' | ... | Duration: ...ms` layout
    Default,
    /// User pattern with placeholder substitution
    Custom(&'a str),
}

/// Instrumentation settings for a single operation
///
/// # Example
///
/// ```
/// use logcall_core::spec::{FormatMode, InstrumentationSpec};
/// use logcall_core_types::LogLevel;
///
/// let spec = InstrumentationSpec::new()
///     .level(LogLevel::Info)
///     .log_parameters(true)
///     .log_return(true);
///
/// assert_eq!(spec.format_mode(), FormatMode::Default);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstrumentationSpec {
    level: LogLevel,
    log_parameters: bool,
    log_return: bool,
    log_stack_trace: bool,
    log_exception: bool,
    custom_pattern: Option<String>,
}

impl InstrumentationSpec {
    /// WARN level, nothing optional captured, default layout
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn log_parameters(mut self, enabled: bool) -> Self {
        self.log_parameters = enabled;
        self
    }

    /// Only meaningful for operations that produce a value
    pub fn log_return(mut self, enabled: bool) -> Self {
        self.log_return = enabled;
        self
    }

    /// Append the filtered call stack at the moment of logging
    pub fn log_stack_trace(mut self, enabled: bool) -> Self {
        self.log_stack_trace = enabled;
        self
    }

    /// Append the filtered failure trace when the operation fails
    pub fn log_exception(mut self, enabled: bool) -> Self {
        self.log_exception = enabled;
        self
    }

    /// Replace the default layout with a placeholder pattern
    ///
    /// An empty pattern keeps the default layout.
    pub fn custom_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.custom_pattern = Some(pattern.into());
        self
    }

    pub fn gate_level(&self) -> LogLevel {
        self.level
    }

    pub fn logs_parameters(&self) -> bool {
        self.log_parameters
    }

    pub fn logs_return(&self) -> bool {
        self.log_return
    }

    pub fn logs_stack_trace(&self) -> bool {
        self.log_stack_trace
    }

    pub fn logs_exception(&self) -> bool {
        self.log_exception
    }

    pub fn pattern(&self) -> Option<&str> {
        self.custom_pattern.as_deref()
    }

    /// Custom pattern iff the pattern is present and non-empty
    pub fn format_mode(&self) -> FormatMode<'_> {
        match self.custom_pattern.as_deref() {
            Some(pattern) if !pattern.is_empty() => FormatMode::Custom(pattern),
            _ => FormatMode::Default,
        }
    }
}
