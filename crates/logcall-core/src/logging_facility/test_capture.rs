//! Test capture mode for deterministic logging assertions
//!
//! Installs a global subscriber that records every event in memory, so tests
//! can assert on what [`crate::sink::TracingSink`] forwarded and on the
//! engine's own diagnostics.

use logcall_core_types::schema::{FIELD_EVENT, FIELD_MESSAGE, FIELD_OP, FIELD_OWNER};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// A captured log event with all its fields
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub owner: Option<String>,
    pub op: Option<String>,
    pub event: Option<String>,
    pub message: Option<String>,
    pub fields: HashMap<String, String>,
}

#[derive(Default)]
struct FieldVisitor {
    fields: HashMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }
}

/// Test capture layer for collecting log events
pub struct TestCaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCaptureLayer {
    pub fn new() -> (Self, TestCapture) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let layer = Self {
            events: events.clone(),
        };
        (layer, TestCapture { events })
    }
}

impl<S> Layer<S> for TestCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let field = |name: &str| visitor.fields.get(name).cloned();
        let captured = CapturedEvent {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            owner: field(FIELD_OWNER),
            op: field(FIELD_OP),
            event: field(FIELD_EVENT),
            message: field(FIELD_MESSAGE),
            fields: visitor.fields.clone(),
        };

        self.events
            .lock()
            .map(|mut events| events.push(captured))
            .ok();
    }
}

/// Handle for accessing captured events in tests
#[derive(Clone)]
pub struct TestCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCapture {
    /// Get all captured events
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events forwarded for `owner`
    pub fn events_for_owner(&self, owner: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.owner.as_deref() == Some(owner))
            .collect()
    }

    /// Assert that an event exists for the given owner and event type
    ///
    /// # Panics
    ///
    /// Panics if the event is not found
    pub fn assert_event_exists(&self, owner: &str, event: &str) {
        let events = self.events();
        let found = events
            .iter()
            .any(|e| e.owner.as_deref() == Some(owner) && e.event.as_deref() == Some(event));
        assert!(
            found,
            "Expected event owner={} event={} not found in {} captured events",
            owner,
            event,
            events.len()
        );
    }

    /// Clear all captured events
    pub fn clear(&self) {
        self.events.lock().map(|mut e| e.clear()).ok();
    }

    /// Count events matching a predicate
    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Initialize test capture mode
///
/// Returns a shared global capture instance. Events from every test in the
/// process land in the same buffer, so assertions should filter on an owner
/// unique to the test.
///
/// # Example
///
/// ```
/// use logcall_core::logging_facility::test_capture::init_test_capture;
/// use logcall_core::sink::{LogSink, TracingSink};
/// use logcall_core_types::LogLevel;
///
/// let capture = init_test_capture();
/// TracingSink::new("DocOwner").write(LogLevel::Info, "hello").unwrap();
/// capture.assert_event_exists("DocOwner", "call");
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let (layer, capture) = TestCaptureLayer::new();
            if tracing_subscriber::registry().with(layer).try_init().is_err() {
                tracing::debug!("global subscriber already installed; capture will stay empty");
            }
            capture
        })
        .clone()
}
