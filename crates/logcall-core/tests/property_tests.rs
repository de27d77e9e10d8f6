#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{capture_all, ServiceError};
use logcall_core::context::display_value;
use logcall_core::{CallSite, InstrumentationSpec, LogLevel};
use proptest::prelude::*;
use std::fmt::Display;

fn level() -> impl Strategy<Value = LogLevel> {
    prop::sample::select(LogLevel::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_display_rule(value in ".*", present in any::<bool>()) {
        let rendered = if present {
            display_value(Some(&value as &dyn Display)).unwrap()
        } else {
            display_value(None).unwrap()
        };
        if present {
            prop_assert_eq!(rendered, value);
        } else {
            prop_assert_eq!(rendered, "null");
        }
    }

    #[test]
    fn prop_params_join_in_order(values in prop::collection::vec(any::<i64>(), 0..8)) {
        let site = values
            .iter()
            .fold(CallSite::new("Svc", "op"), |site, v| site.positional(v));
        let expected = values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
        prop_assert_eq!(site.joined_params().unwrap(), expected);
    }

    #[test]
    fn prop_instrumentation_is_transparent(value in any::<i32>(), fail in any::<bool>(), lvl in level()) {
        let (_, interceptor) = capture_all();
        let spec = InstrumentationSpec::new()
            .level(lvl)
            .log_parameters(true)
            .log_return(true)
            .log_exception(true);
        let site = CallSite::new("Svc", "op").arg("value", &value);

        let body = || if fail { Err(ServiceError::new(value.to_string())) } else { Ok(value) };
        let wrapped = interceptor.invoke(&spec, &site, body);

        prop_assert_eq!(wrapped, body());
    }

    #[test]
    fn prop_gate_respects_sink_minimum(spec_level in level(), sink_level in level()) {
        let (sink, interceptor) = common::with_sink(logcall_core::MemorySink::new(sink_level));
        let spec = InstrumentationSpec::new().level(spec_level);
        let site = CallSite::new("Svc", "op");

        interceptor.call(&spec, &site, || 0);

        let expected = usize::from(spec_level >= sink_level);
        prop_assert_eq!(sink.write_count(), expected);
    }

    #[test]
    fn prop_duration_is_reported(op in "[a-z_]{1,12}") {
        let (sink, interceptor) = capture_all();
        let spec = InstrumentationSpec::new();
        let site = CallSite::new("Svc", &op);

        interceptor.call(&spec, &site, || 0);

        let message = sink.last_message().unwrap();
        let prefix = format!("Method '{op}' | Duration: ");
        prop_assert!(message.starts_with(&prefix));
        let millis = message[prefix.len()..].trim_end_matches("ms");
        prop_assert!(millis.parse::<u64>().is_ok());
    }
}
