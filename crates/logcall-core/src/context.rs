//! Per-call description and outcome records
//!
//! A [`CallSite`] is what the wrapping mechanism hands to the interceptor:
//! who is being called and with which arguments. Arguments are borrowed as
//! `&(dyn Display + Sync)` so that building a call site never formats
//! anything and a call site can be held across `.await` in `Send` futures.
//! An [`InvocationContext`] is created only after the gate check passes and
//! carries timing and outcome for the single call it describes.

use crate::errors::FormatError;
use std::any::Any;
use std::error::Error;
use std::fmt::{self, Display, Write};
use std::time::{Duration, Instant};

/// Text used for absent values
pub const NULL_TEXT: &str = "null";

/// One argument of an instrumented call
#[derive(Clone, Copy)]
pub struct Arg<'a> {
    name: Option<&'a str>,
    value: Option<&'a (dyn Display + Sync)>,
}

impl<'a> Arg<'a> {
    pub fn name(&self) -> Option<&'a str> {
        self.name
    }

    pub fn value(&self) -> Option<&'a (dyn Display + Sync)> {
        self.value
    }

    /// Render with the display rule
    ///
    /// # Errors
    ///
    /// Returns `FormatError::Render` when the value's `Display` fails.
    pub fn render(&self) -> Result<String, FormatError> {
        display_value(self.value.map(|v| v as &dyn Display)).map_err(|_| FormatError::Render {
            what: match self.name {
                Some(name) => format!("parameter '{name}'"),
                None => "positional parameter".to_string(),
            },
        })
    }
}

impl fmt::Debug for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arg")
            .field("name", &self.name)
            .field("present", &self.value.is_some())
            .finish()
    }
}

/// Identity and arguments of one call, as supplied by the wrapping mechanism
///
/// # Example
///
/// ```
/// use logcall_core::context::CallSite;
///
/// let name = "Test";
/// let count = 123;
/// let site = CallSite::new("TestService", "simple_method")
///     .arg("name", &name)
///     .arg("count", &count);
///
/// assert_eq!(site.parameter_names(), Some(vec!["name", "count"]));
/// ```
#[derive(Debug, Clone)]
pub struct CallSite<'a> {
    owner: &'a str,
    operation: &'a str,
    args: Vec<Arg<'a>>,
}

impl<'a> CallSite<'a> {
    pub fn new(owner: &'a str, operation: &'a str) -> Self {
        Self {
            owner,
            operation,
            args: Vec::new(),
        }
    }

    /// Add a named argument
    pub fn arg<T: Display + Sync>(mut self, name: &'a str, value: &'a T) -> Self {
        self.args.push(Arg {
            name: Some(name),
            value: Some(value),
        });
        self
    }

    /// Add a named argument that may be absent (renders as `null`)
    pub fn arg_opt<T: Display + Sync>(mut self, name: &'a str, value: Option<&'a T>) -> Self {
        self.args.push(Arg {
            name: Some(name),
            value: value.map(|v| v as &(dyn Display + Sync)),
        });
        self
    }

    /// Add an argument whose name is not recoverable
    pub fn positional<T: Display + Sync>(mut self, value: &'a T) -> Self {
        self.args.push(Arg {
            name: None,
            value: Some(value),
        });
        self
    }

    /// Add an unnamed argument that may be absent
    pub fn positional_opt<T: Display + Sync>(mut self, value: Option<&'a T>) -> Self {
        self.args.push(Arg {
            name: None,
            value: value.map(|v| v as &(dyn Display + Sync)),
        });
        self
    }

    pub fn owner(&self) -> &'a str {
        self.owner
    }

    pub fn operation(&self) -> &'a str {
        self.operation
    }

    pub fn args(&self) -> &[Arg<'a>] {
        &self.args
    }

    /// Parameter names, available only when every argument is named
    pub fn parameter_names(&self) -> Option<Vec<&'a str>> {
        self.args.iter().map(|arg| arg.name).collect()
    }

    /// All argument values joined with `", "`, absent ones as `null`
    ///
    /// # Errors
    ///
    /// Returns `FormatError::Render` when any value's `Display` fails.
    pub fn joined_params(&self) -> Result<String, FormatError> {
        let mut out = String::new();
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&arg.render()?);
        }
        Ok(out)
    }
}

/// Render a possibly absent value: `None` becomes `null`
///
/// # Errors
///
/// Propagates `fmt::Error` from the value's `Display` implementation.
pub fn display_value(value: Option<&dyn Display>) -> Result<String, fmt::Error> {
    match value {
        None => Ok(NULL_TEXT.to_string()),
        Some(value) => {
            let mut out = String::new();
            write!(out, "{value}")?;
            Ok(out)
        }
    }
}

/// Where a captured failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOrigin {
    /// The wrapped operation returned `Err`
    Error,
    /// The wrapped operation panicked
    Panic,
    /// The operation was dropped before it completed
    Cancelled,
}

/// What the engine records about a failed operation
///
/// The original error value is never stored here; it stays with the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFailure {
    type_name: &'static str,
    message: String,
    causes: Vec<String>,
    origin: FailureOrigin,
}

impl CapturedFailure {
    /// Describe an error value returned by the operation
    ///
    /// The `source()` chain is walked to collect cause messages.
    pub fn from_error<E: Error + 'static>(err: &E) -> Self {
        let mut causes = Vec::new();
        let mut next = err.source();
        while let Some(cause) = next {
            causes.push(cause.to_string());
            next = cause.source();
        }

        Self {
            type_name: std::any::type_name::<E>(),
            message: err.to_string(),
            causes,
            origin: FailureOrigin::Error,
        }
    }

    /// Describe a panic payload caught while running the operation
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        Self {
            type_name: "panic",
            message: panic_message(payload),
            causes: Vec::new(),
            origin: FailureOrigin::Panic,
        }
    }

    /// Describe an operation abandoned before it produced an outcome
    pub fn cancelled() -> Self {
        Self {
            type_name: "Cancelled",
            message: "operation was cancelled before completion".to_string(),
            causes: Vec::new(),
            origin: FailureOrigin::Cancelled,
        }
    }

    /// Fully qualified type name of the failure
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Last path segment of the type name with generic arguments removed
    pub fn short_type_name(&self) -> &'static str {
        short_type_name(self.type_name)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Messages of the `source()` chain, outermost first
    pub fn causes(&self) -> &[String] {
        &self.causes
    }

    pub fn origin(&self) -> FailureOrigin {
        self.origin
    }
}

/// `alloc::vec::Vec<u8>` becomes `Vec`, `std::io::error::Error` becomes `Error`
pub fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Best-effort text of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

/// Timing and outcome of one instrumented call
///
/// Owned by the interceptor frame of that call and dropped once the message
/// has been handed to the sink.
#[derive(Debug)]
pub struct InvocationContext<'a> {
    site: &'a CallSite<'a>,
    started: Instant,
    returns_value: bool,
    result: Option<String>,
    failure: Option<CapturedFailure>,
    duration_millis: u64,
}

impl<'a> InvocationContext<'a> {
    /// Start a context for `site` at `started`
    pub fn new(site: &'a CallSite<'a>, started: Instant) -> Self {
        Self {
            site,
            started,
            returns_value: true,
            result: None,
            failure: None,
            duration_millis: 0,
        }
    }

    /// Mark the operation as producing no value
    pub fn void(mut self) -> Self {
        self.returns_value = false;
        self
    }

    /// Record the rendered result of a completed call
    pub fn with_result(mut self, rendered: Option<String>) -> Self {
        self.result = rendered;
        self
    }

    /// Record a failure; any result is discarded
    pub fn with_failure(mut self, failure: CapturedFailure) -> Self {
        self.result = None;
        self.failure = Some(failure);
        self
    }

    /// Fix the duration to the time elapsed since `started`
    pub fn finish(self) -> Self {
        let elapsed = self.started.elapsed();
        self.with_duration(elapsed)
    }

    pub fn with_duration(mut self, elapsed: Duration) -> Self {
        self.duration_millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn site(&self) -> &'a CallSite<'a> {
        self.site
    }

    pub fn operation_name(&self) -> &'a str {
        self.site.operation()
    }

    pub fn owner_name(&self) -> &'a str {
        self.site.owner()
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    pub fn returns_value(&self) -> bool {
        self.returns_value
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn failure(&self) -> Option<&CapturedFailure> {
        self.failure.as_ref()
    }

    pub fn duration_millis(&self) -> u64 {
        self.duration_millis
    }
}
