use super::{LogSink, SinkProvider};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

type SinkFactory = dyn Fn(&str) -> Arc<dyn LogSink> + Send + Sync;

/// Per-owner sink resolution with explicit overrides
///
/// Owners without an override get a sink from the factory on first use;
/// the result is cached so later lookups are a map read.
pub struct SinkRegistry {
    factory: Arc<SinkFactory>,
    sinks: DashMap<String, Arc<dyn LogSink>>,
}

impl SinkRegistry {
    /// Every owner without an override shares `default`
    pub fn new(default: Arc<dyn LogSink>) -> Self {
        Self::with_factory(move |_owner| Arc::clone(&default))
    }

    /// Create the sink for each new owner with `factory`
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn(&str) -> Arc<dyn LogSink> + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
            sinks: DashMap::new(),
        }
    }

    /// Route `owner` to `sink`, replacing any earlier resolution
    pub fn set_sink(&self, owner: impl Into<String>, sink: Arc<dyn LogSink>) {
        self.sinks.insert(owner.into(), sink);
    }

    /// Number of owners resolved or overridden so far
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl SinkProvider for SinkRegistry {
    fn sink_for(&self, owner: &str) -> Arc<dyn LogSink> {
        if let Some(sink) = self.sinks.get(owner) {
            return Arc::clone(sink.value());
        }
        let sink = self
            .sinks
            .entry(owner.to_string())
            .or_insert_with(|| (self.factory)(owner));
        Arc::clone(sink.value())
    }
}

impl fmt::Debug for SinkRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkRegistry")
            .field("owners", &self.sinks.len())
            .finish()
    }
}
