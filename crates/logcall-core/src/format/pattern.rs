use super::MessageFormatter;
use crate::context::{InvocationContext, NULL_TEXT};
use crate::errors::FormatError;
use crate::stack;

pub const PLACEHOLDER_METHOD_NAME: &str = "{methodName}";
pub const PLACEHOLDER_CLASS_NAME: &str = "{className}";
pub const PLACEHOLDER_PARAMS: &str = "{params}";
pub const PLACEHOLDER_RETURN: &str = "{return}";
pub const PLACEHOLDER_STACKTRACE: &str = "{stacktrace}";
pub const PLACEHOLDER_EXCEPTION: &str = "{exception}";

/// Resolves one placeholder at a time; the failure trace is built at most once
struct Resolver<'f, 'c> {
    formatter: &'f MessageFormatter,
    ctx: &'c InvocationContext<'c>,
    named: bool,
    trace: Option<String>,
}

impl Resolver<'_, '_> {
    /// Value for `placeholder` (braces included), or `None` to keep it verbatim
    ///
    /// Built-ins win over `{param[i]}`, which wins over `{<name>}`.
    fn resolve(&mut self, placeholder: &str) -> Result<Option<String>, FormatError> {
        let ctx = self.ctx;
        let value = match placeholder {
            PLACEHOLDER_METHOD_NAME => ctx.operation_name().to_string(),
            PLACEHOLDER_CLASS_NAME => ctx.owner_name().to_string(),
            PLACEHOLDER_PARAMS => ctx.site().joined_params()?,
            PLACEHOLDER_RETURN => ctx.result().unwrap_or(NULL_TEXT).to_string(),
            PLACEHOLDER_STACKTRACE => match ctx.failure() {
                Some(_) => self.failure_trace(),
                None => stack::capture_current(&self.formatter.filter),
            },
            PLACEHOLDER_EXCEPTION => match ctx.failure() {
                Some(_) => self.failure_trace(),
                None => return Ok(None),
            },
            _ => return self.parameter(&placeholder[1..placeholder.len() - 1]),
        };
        Ok(Some(value))
    }

    fn parameter(&self, token: &str) -> Result<Option<String>, FormatError> {
        let args = self.ctx.site().args();
        if let Some(index) = param_index(token) {
            return args.get(index).map(|arg| arg.render()).transpose();
        }
        if !self.named {
            return Ok(None);
        }
        args.iter()
            .find(|arg| arg.name() == Some(token))
            .map(|arg| arg.render())
            .transpose()
    }

    fn failure_trace(&mut self) -> String {
        let ctx = self.ctx;
        if self.trace.is_none() {
            self.trace = ctx.failure().map(|failure| {
                format!(
                    "{}\n{}",
                    stack::failure_summary(failure),
                    stack::failure_trace(failure, &self.formatter.filter)
                )
            });
        }
        self.trace.clone().unwrap_or_default()
    }
}

/// `param[3]` becomes `Some(3)`
fn param_index(token: &str) -> Option<usize> {
    token
        .strip_prefix("param[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}

impl MessageFormatter {
    /// Literal placeholder substitution
    ///
    /// The pattern is scanned once, left to right. Each `{token}` is replaced
    /// by its value and substituted text is never scanned again, so values
    /// containing braces come out unchanged. Unknown tokens stay verbatim.
    pub(crate) fn custom(
        &self,
        pattern: &str,
        ctx: &InvocationContext<'_>,
    ) -> Result<String, FormatError> {
        let mut resolver = Resolver {
            formatter: self,
            ctx,
            named: ctx.site().parameter_names().is_some(),
            trace: None,
        };
        let mut out = String::with_capacity(pattern.len());
        let mut rest = pattern;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            // the token ends at the next '}' unless another '{' comes first
            match tail[1..].find(['{', '}']) {
                Some(len) if tail.as_bytes()[len + 1] == b'}' => {
                    let placeholder = &tail[..len + 2];
                    match resolver.resolve(placeholder)? {
                        Some(value) => out.push_str(&value),
                        None => out.push_str(placeholder),
                    }
                    rest = &tail[len + 2..];
                }
                _ => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);

        Ok(out)
    }
}
