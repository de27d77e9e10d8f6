//! Per-invocation orchestration
//!
//! Each call runs through the same states:
//!
//! ```text
//! IDLE -> GATE_CHECK -> SKIPPED
//!                    -> RUNNING -> COMPLETED | FAILED -> FORMATTING -> EMITTED
//! ```
//!
//! When the sink has the spec's level disabled the body runs directly and
//! nothing is timed, captured or formatted. Otherwise the outcome is
//! recorded, one message is written, and the outcome is handed back exactly
//! as the body produced it: the same `Ok` value, the same `Err` value, or
//! the same panic payload resumed.
//!
//! An async call dropped before it completes is reported as a failure of
//! type `Cancelled`; the message is written from a drop guard armed for the
//! duration of the `.await`.

use crate::context::{panic_message, CallSite, CapturedFailure, InvocationContext};
use crate::errors::{ErrorKind, FormatError};
use crate::format::{MessageFormatter, PLACEHOLDER_RETURN};
use crate::registry::InstrumentedOperation;
use crate::sink::{LogSink, SinkProvider};
use crate::spec::{FormatMode, InstrumentationSpec};
use crate::stack::FrameFilter;
use futures::FutureExt;
use logcall_core_types::schema::{EVENT_FORMAT_FAILED, EVENT_SINK_FAILED, TARGET_ENGINE};
use std::any::Any;
use std::convert::Infallible;
use std::error::Error;
use std::fmt::{self, Display};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

type PanicPayload = Box<dyn Any + Send>;

/// Wraps operation bodies with instrumentation
///
/// An interceptor is immutable once built and can be shared by any number
/// of concurrent invocations.
pub struct Interceptor {
    sinks: Arc<dyn SinkProvider>,
    formatter: MessageFormatter,
}

/// How a call ended
enum Outcome<'r, T, E> {
    Completed(&'r Result<T, E>),
    Panicked(&'r PanicPayload),
    Cancelled,
}

impl<'r, T, E> From<&'r Result<Result<T, E>, PanicPayload>> for Outcome<'r, T, E> {
    fn from(caught: &'r Result<Result<T, E>, PanicPayload>) -> Self {
        match caught {
            Ok(result) => Outcome::Completed(result),
            Err(payload) => Outcome::Panicked(payload),
        }
    }
}

/// State of a call once it has ended
struct Finished<'r, T, E> {
    started: Instant,
    elapsed: Duration,
    outcome: Outcome<'r, T, E>,
}

/// Writes the `Cancelled` message if dropped while still armed
struct CancellationGuard<'g> {
    interceptor: &'g Interceptor,
    sink: &'g dyn LogSink,
    spec: &'g InstrumentationSpec,
    site: &'g CallSite<'g>,
    started: Instant,
    armed: bool,
}

impl CancellationGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for CancellationGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let finished: Finished<'_, (), Infallible> = Finished {
            started: self.started,
            elapsed: self.started.elapsed(),
            outcome: Outcome::Cancelled,
        };
        self.interceptor
            .emit(self.sink, self.spec, self.site, true, |_: &()| Ok(None), finished);
    }
}

impl Interceptor {
    /// Resolve sinks through `sinks` and hide the default engine frames
    pub fn new(sinks: impl SinkProvider + 'static) -> Self {
        Self {
            sinks: Arc::new(sinks),
            formatter: MessageFormatter::default(),
        }
    }

    /// Send every owner's messages to `sink`
    pub fn with_sink(sink: Arc<dyn LogSink>) -> Self {
        Self::new(sink)
    }

    /// Replace the frame filter used for stack traces
    pub fn with_frame_filter(mut self, filter: FrameFilter) -> Self {
        self.formatter = MessageFormatter::new(filter);
        self
    }

    pub fn formatter(&self) -> &MessageFormatter {
        &self.formatter
    }

    /// Run an operation producing a displayable value
    ///
    /// # Errors
    ///
    /// Returns exactly the `Err` produced by `body`; the engine adds none.
    pub fn invoke<T, E, F>(
        &self,
        spec: &InstrumentationSpec,
        site: &CallSite<'_>,
        body: F,
    ) -> Result<T, E>
    where
        T: Display,
        E: Error + 'static,
        F: FnOnce() -> Result<T, E>,
    {
        self.intercept(spec, site, true, render_display::<T>, body)
    }

    /// Run an operation producing no value
    ///
    /// # Errors
    ///
    /// Returns exactly the `Err` produced by `body`.
    pub fn invoke_void<E, F>(
        &self,
        spec: &InstrumentationSpec,
        site: &CallSite<'_>,
        body: F,
    ) -> Result<(), E>
    where
        E: Error + 'static,
        F: FnOnce() -> Result<(), E>,
    {
        self.intercept(spec, site, false, |_: &()| Ok(None), body)
    }

    /// Run an operation whose value is rendered by `render`
    ///
    /// `render` is called only when the message needs the return value;
    /// returning `None` renders as `null`.
    ///
    /// # Errors
    ///
    /// Returns exactly the `Err` produced by `body`.
    pub fn invoke_with<T, E, F, R>(
        &self,
        spec: &InstrumentationSpec,
        site: &CallSite<'_>,
        render: R,
        body: F,
    ) -> Result<T, E>
    where
        E: Error + 'static,
        F: FnOnce() -> Result<T, E>,
        R: FnOnce(&T) -> Option<String>,
    {
        self.intercept(spec, site, true, |value: &T| Ok(render(value)), body)
    }

    /// Run an infallible operation
    pub fn call<T, F>(&self, spec: &InstrumentationSpec, site: &CallSite<'_>, body: F) -> T
    where
        T: Display,
        F: FnOnce() -> T,
    {
        match self.invoke(spec, site, || Ok::<T, Infallible>(body())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Run a registered operation with its registered spec
    ///
    /// # Errors
    ///
    /// Returns exactly the `Err` produced by `body`.
    pub fn invoke_registered<T, E, F>(
        &self,
        operation: &InstrumentedOperation,
        site: &CallSite<'_>,
        body: F,
    ) -> Result<T, E>
    where
        T: Display,
        E: Error + 'static,
        F: FnOnce() -> Result<T, E>,
    {
        self.invoke(operation.spec(), site, body)
    }

    /// Await an operation with the same gate, timing and outcome handling
    ///
    /// Panics while polling `future` are logged and resumed. If the returned
    /// future is dropped after the gate passed but before `future` completed,
    /// one message is written with a `Cancelled` failure.
    ///
    /// # Errors
    ///
    /// Returns exactly the `Err` produced by `future`.
    pub async fn invoke_async<T, E, Fut>(
        &self,
        spec: &InstrumentationSpec,
        site: &CallSite<'_>,
        future: Fut,
    ) -> Result<T, E>
    where
        T: Display,
        E: Error + 'static,
        Fut: Future<Output = Result<T, E>>,
    {
        let sink = self.sinks.sink_for(site.owner());
        if !sink.is_enabled(spec.gate_level()) {
            return future.await;
        }

        let started = Instant::now();
        let mut guard = CancellationGuard {
            interceptor: self,
            sink: sink.as_ref(),
            spec,
            site,
            started,
            armed: true,
        };
        let outcome = AssertUnwindSafe(future).catch_unwind().await;
        guard.disarm();
        let finished = Finished {
            started,
            elapsed: started.elapsed(),
            outcome: Outcome::from(&outcome),
        };
        self.emit(sink.as_ref(), spec, site, true, render_display::<T>, finished);

        match outcome {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    fn intercept<T, E, F, R>(
        &self,
        spec: &InstrumentationSpec,
        site: &CallSite<'_>,
        returns_value: bool,
        render: R,
        body: F,
    ) -> Result<T, E>
    where
        E: Error + 'static,
        F: FnOnce() -> Result<T, E>,
        R: FnOnce(&T) -> Result<Option<String>, FormatError>,
    {
        let sink = self.sinks.sink_for(site.owner());
        if !sink.is_enabled(spec.gate_level()) {
            return body();
        }

        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(body));
        let finished = Finished {
            started,
            elapsed: started.elapsed(),
            outcome: Outcome::from(&outcome),
        };
        self.emit(sink.as_ref(), spec, site, returns_value, render, finished);

        match outcome {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// Build and write the message; never fails and never panics outward
    fn emit<T, E, R>(
        &self,
        sink: &dyn LogSink,
        spec: &InstrumentationSpec,
        site: &CallSite<'_>,
        returns_value: bool,
        render: R,
        finished: Finished<'_, T, E>,
    ) where
        E: Error + 'static,
        R: FnOnce(&T) -> Result<Option<String>, FormatError>,
    {
        let base = || InvocationContext::new(site, finished.started).with_duration(finished.elapsed);

        let built = panic::catch_unwind(AssertUnwindSafe(|| -> Result<String, FormatError> {
            let mut ctx = base();
            if !returns_value {
                ctx = ctx.void();
            }
            let ctx = match &finished.outcome {
                Outcome::Completed(Ok(value)) if needs_return(spec) => {
                    ctx.with_result(render(value)?)
                }
                Outcome::Completed(Ok(_)) => ctx,
                Outcome::Completed(Err(err)) => ctx.with_failure(CapturedFailure::from_error(err)),
                Outcome::Panicked(payload) => {
                    ctx.with_failure(CapturedFailure::from_panic(&***payload))
                }
                Outcome::Cancelled => ctx.with_failure(CapturedFailure::cancelled()),
            };
            self.formatter.format(spec, &ctx)
        }));

        let message = match built {
            Ok(Ok(message)) => message,
            Ok(Err(err)) => self.fallback(&base(), &err),
            Err(payload) => {
                let err = FormatError::Panicked {
                    message: panic_message(&*payload),
                };
                self.fallback(&base(), &err)
            }
        };

        // field names below mirror logcall_core_types::schema
        // (FIELD_OWNER, FIELD_OP, FIELD_EVENT, FIELD_DURATION_MS, FIELD_ERR_CODE)
        let written = panic::catch_unwind(AssertUnwindSafe(|| sink.write(spec.gate_level(), &message)));
        let failure = match written {
            Ok(Ok(())) => return,
            Ok(Err(err)) => err.to_string(),
            Err(payload) => format!("sink panicked: {}", panic_message(&*payload)),
        };
        tracing::warn!(
            target: TARGET_ENGINE,
            owner = site.owner(),
            op = site.operation(),
            event = EVENT_SINK_FAILED,
            err.code = ErrorKind::Sink.code(),
            error = %failure,
            "log sink rejected instrumentation message"
        );
    }

    fn fallback(&self, ctx: &InvocationContext<'_>, err: &FormatError) -> String {
        tracing::warn!(
            target: TARGET_ENGINE,
            owner = ctx.owner_name(),
            op = ctx.operation_name(),
            event = EVENT_FORMAT_FAILED,
            duration_ms = ctx.duration_millis(),
            err.code = ErrorKind::Format.code(),
            error = %err,
            "instrumentation message could not be built"
        );
        self.formatter.fallback(ctx, err)
    }
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor")
            .field("formatter", &self.formatter)
            .finish_non_exhaustive()
    }
}

fn render_display<T: Display>(value: &T) -> Result<Option<String>, FormatError> {
    crate::context::display_value(Some(value as &dyn Display))
        .map(Some)
        .map_err(|_| FormatError::Render {
            what: "return value".to_string(),
        })
}

/// Whether the message will contain the return value
fn needs_return(spec: &InstrumentationSpec) -> bool {
    match spec.format_mode() {
        FormatMode::Default => spec.logs_return(),
        FormatMode::Custom(pattern) => pattern.contains(PLACEHOLDER_RETURN),
    }
}
