use super::MessageFormatter;
use crate::context::{InvocationContext, NULL_TEXT};
use crate::errors::FormatError;
use crate::spec::InstrumentationSpec;
use crate::stack;

impl MessageFormatter {
    /// `Method '<op>'[ | Params: [..]][ | Threw Exception: T| | Return: v] | Duration: Nms`
    /// followed by the optional call stack and failure trace sections.
    pub(crate) fn default_layout(
        &self,
        spec: &InstrumentationSpec,
        ctx: &InvocationContext<'_>,
    ) -> Result<String, FormatError> {
        let mut out = format!("Method '{}'", ctx.operation_name());

        let site = ctx.site();
        if spec.logs_parameters() && !site.args().is_empty() {
            out.push_str(" | Params: [");
            out.push_str(&site.joined_params()?);
            out.push(']');
        }

        // a failure always wins over the return value
        if let Some(failure) = ctx.failure() {
            out.push_str(" | Threw Exception: ");
            out.push_str(failure.short_type_name());
        } else if spec.logs_return() && ctx.returns_value() {
            out.push_str(" | Return: ");
            out.push_str(ctx.result().unwrap_or(NULL_TEXT));
        }

        out.push_str(&format!(" | Duration: {}ms", ctx.duration_millis()));

        if spec.logs_stack_trace() {
            out.push_str("\nCall Stack Trace:\n");
            out.push_str(&stack::capture_current(&self.filter));
        }

        if let Some(failure) = ctx.failure() {
            if spec.logs_exception() {
                out.push_str("\nException Stack Trace:\n");
                out.push_str(&stack::failure_trace(failure, &self.filter));
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use crate::context::{CallSite, CapturedFailure, InvocationContext};
    use crate::format::MessageFormatter;
    use crate::spec::InstrumentationSpec;
    use std::io;
    use std::time::{Duration, Instant};

    fn ctx<'a>(site: &'a CallSite<'a>) -> InvocationContext<'a> {
        InvocationContext::new(site, Instant::now()).with_duration(Duration::from_millis(7))
    }

    #[test]
    fn test_minimal_layout() {
        let site = CallSite::new("Svc", "ping");
        let msg = MessageFormatter::default()
            .format(&InstrumentationSpec::new(), &ctx(&site))
            .unwrap();
        assert_eq!(msg, "Method 'ping' | Duration: 7ms");
    }

    #[test]
    fn test_params_and_return() {
        let a = "Test";
        let b = 123;
        let site = CallSite::new("Svc", "simple_method").arg("a", &a).arg("b", &b);
        let spec = InstrumentationSpec::new().log_parameters(true).log_return(true);
        let msg = MessageFormatter::default()
            .format(&spec, &ctx(&site).with_result(Some("Processed: Test".to_string())))
            .unwrap();
        assert_eq!(
            msg,
            "Method 'simple_method' | Params: [Test, 123] | Return: Processed: Test | Duration: 7ms"
        );
    }

    #[test]
    fn test_params_omitted_when_call_has_none() {
        let site = CallSite::new("Svc", "ping");
        let spec = InstrumentationSpec::new().log_parameters(true);
        let msg = MessageFormatter::default().format(&spec, &ctx(&site)).unwrap();
        assert!(!msg.contains("Params"));
    }

    #[test]
    fn test_return_null_when_absent() {
        let site = CallSite::new("Svc", "find");
        let spec = InstrumentationSpec::new().log_return(true);
        let msg = MessageFormatter::default().format(&spec, &ctx(&site)).unwrap();
        assert_eq!(msg, "Method 'find' | Return: null | Duration: 7ms");
    }

    #[test]
    fn test_return_omitted_for_void() {
        let site = CallSite::new("Svc", "reset");
        let spec = InstrumentationSpec::new().log_return(true);
        let msg = MessageFormatter::default()
            .format(&spec, &ctx(&site).void())
            .unwrap();
        assert_eq!(msg, "Method 'reset' | Duration: 7ms");
    }

    #[test]
    fn test_failure_takes_priority_over_return() {
        let site = CallSite::new("Svc", "explode");
        let err = io::Error::new(io::ErrorKind::Other, "Test exception");
        let spec = InstrumentationSpec::new().log_return(true);
        let msg = MessageFormatter::default()
            .format(
                &spec,
                &ctx(&site)
                    .with_result(Some("ignored".to_string()))
                    .with_failure(CapturedFailure::from_error(&err)),
            )
            .unwrap();
        assert_eq!(msg, "Method 'explode' | Threw Exception: Error | Duration: 7ms");
    }

    #[test]
    fn test_exception_section_only_with_failure() {
        let site = CallSite::new("Svc", "explode");
        let spec = InstrumentationSpec::new().log_exception(true);
        let ok = MessageFormatter::default().format(&spec, &ctx(&site)).unwrap();
        assert!(!ok.contains("Exception Stack Trace:"));

        let err = io::Error::new(io::ErrorKind::Other, "Test exception");
        let failed = MessageFormatter::default()
            .format(&spec, &ctx(&site).with_failure(CapturedFailure::from_error(&err)))
            .unwrap();
        assert!(failed.contains("\nException Stack Trace:\nstd::io::error::Error: Test exception"));
    }

    #[test]
    fn test_call_stack_section_filtered() {
        let site = CallSite::new("Svc", "traced");
        let spec = InstrumentationSpec::new().log_stack_trace(true);
        let msg = MessageFormatter::default().format(&spec, &ctx(&site)).unwrap();
        let (head, trace) = msg.split_once("\nCall Stack Trace:\n").unwrap();
        assert_eq!(head, "Method 'traced' | Duration: 7ms");
        assert!(!trace.contains("logcall_core::format"));
        assert!(!trace.contains("logcall_core::stack"));
    }
}
