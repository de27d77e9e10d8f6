#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::ServiceError;
use logcall_core::logging_facility::test_capture::init_test_capture;
use logcall_core::sink::{LogSink, TracingSink};
use logcall_core::{CallSite, InstrumentationSpec, Interceptor, LogLevel, MemorySink, SinkRegistry};
use logcall_core_types::schema::{
    EVENT_CALL, EVENT_SINK_FAILED, FIELD_DURATION_MS, FIELD_ERR_CODE, TARGET_CALLS, TARGET_ENGINE,
};
use std::sync::Arc;
use tracing::Level;

#[test]
fn test_tracing_sink_forwards_message_with_owner() {
    let capture = init_test_capture();
    let interceptor = Interceptor::new(TracingSink::provider());
    let spec = InstrumentationSpec::new().level(LogLevel::Info).log_parameters(true);
    let name = "Test";
    let site = CallSite::new("TracingOwner_1", "simple_method").arg("name", &name);

    let out = interceptor.invoke(&spec, &site, || Ok::<_, ServiceError>(1));
    assert_eq!(out.unwrap(), 1);

    let events = capture.events_for_owner("TracingOwner_1");
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.level, Level::INFO);
    assert_eq!(event.target, TARGET_CALLS);
    assert_eq!(event.event.as_deref(), Some(EVENT_CALL));
    assert!(event
        .message
        .as_deref()
        .unwrap()
        .starts_with("Method 'simple_method' | Params: [Test] | Duration: "));
}

#[test]
fn test_tracing_sink_levels_map_one_to_one() {
    let capture = init_test_capture();
    let sink = TracingSink::new("TracingOwner_2");

    for level in LogLevel::ALL {
        assert!(sink.is_enabled(level));
        sink.write(level, level.as_str()).unwrap();
    }

    let levels: Vec<Level> = capture
        .events_for_owner("TracingOwner_2")
        .iter()
        .map(|e| e.level)
        .collect();
    assert_eq!(
        levels,
        vec![Level::TRACE, Level::DEBUG, Level::INFO, Level::WARN, Level::ERROR]
    );
}

#[test]
fn test_sink_failure_reported_on_engine_target() {
    let capture = init_test_capture();
    let failing = Arc::new(MemorySink::all());
    failing.set_fail_writes(true);
    let interceptor = Interceptor::new(SinkRegistry::new(failing.clone()));
    let site = CallSite::new("TracingOwner_3", "op");

    let out = interceptor.invoke(&InstrumentationSpec::new(), &site, || Ok::<_, ServiceError>(5));

    assert_eq!(out.unwrap(), 5);
    let reported = capture.count_events(|e| {
        e.target == TARGET_ENGINE
            && e.owner.as_deref() == Some("TracingOwner_3")
            && e.event.as_deref() == Some(EVENT_SINK_FAILED)
            && e.level == Level::WARN
            && e.fields.get(FIELD_ERR_CODE).map(String::as_str) == Some("ERR_SINK")
    });
    assert_eq!(reported, 1);
}

#[test]
fn test_format_failure_reported_on_engine_target() {
    let capture = init_test_capture();
    let sink = Arc::new(MemorySink::all());
    let interceptor = Interceptor::with_sink(sink.clone());
    let spec = InstrumentationSpec::new().log_parameters(true);
    let broken = common::BrokenDisplay;
    let site = CallSite::new("TracingOwner_4", "fragile").arg("broken", &broken);

    interceptor.call(&spec, &site, || 0);

    capture.assert_event_exists("TracingOwner_4", "format_failed");
    let reported = capture.events_for_owner("TracingOwner_4");
    let event = reported.iter().find(|e| e.target == TARGET_ENGINE).unwrap();
    assert_eq!(event.fields.get(FIELD_ERR_CODE).unwrap(), "ERR_FORMAT");
    assert!(event.fields.contains_key(FIELD_DURATION_MS));
    assert!(sink.last_message().unwrap().contains("Log formatting failed"));
}
