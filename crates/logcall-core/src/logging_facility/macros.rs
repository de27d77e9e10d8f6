//! Instrument a call in place
//!
//! `log_call!` stands in for the wrapper a proxy or code generator would
//! produce: it names the arguments after the identifiers passed in and
//! routes the body through [`crate::interceptor::Interceptor`].

/// Run a body through an interceptor, building the call site from identifiers
///
/// Arguments are referenced, never moved, and named with `stringify!`, so
/// `{name}` placeholders in custom patterns resolve to them.
///
/// # Example
///
/// ```
/// use logcall_core::{log_call, Interceptor, InstrumentationSpec, MemorySink};
/// use logcall_core_types::LogLevel;
/// use std::sync::Arc;
///
/// let sink = Arc::new(MemorySink::all());
/// let interceptor = Interceptor::with_sink(sink.clone());
/// let spec = InstrumentationSpec::new().level(LogLevel::Info).log_parameters(true);
///
/// let a = 2;
/// let b = 3;
/// let sum: Result<i32, std::io::Error> =
///     log_call!(interceptor, spec, "Calculator", "add", (a, b), { Ok(a + b) });
///
/// assert_eq!(sum.unwrap(), 5);
/// assert!(sink.last_message().unwrap().contains("Params: [2, 3]"));
/// ```
#[macro_export]
macro_rules! log_call {
    (@void $interceptor:expr, $spec:expr, $owner:expr, $op:expr, ($($arg:ident),* $(,)?), $body:block) => {{
        let site = $crate::context::CallSite::new($owner, $op)
            $(.arg(stringify!($arg), &$arg))*;
        $interceptor.invoke_void(&$spec, &site, || $body)
    }};
    ($interceptor:expr, $spec:expr, $owner:expr, $op:expr, ($($arg:ident),* $(,)?), $body:block) => {{
        let site = $crate::context::CallSite::new($owner, $op)
            $(.arg(stringify!($arg), &$arg))*;
        $interceptor.invoke(&$spec, &site, || $body)
    }};
}
