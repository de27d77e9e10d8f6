use super::{LogSink, SinkRegistry};
use crate::errors::SinkError;
use logcall_core_types::schema::{EVENT_CALL, TARGET_CALLS};
use logcall_core_types::LogLevel;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::Level;

/// Sink forwarding messages to the active `tracing` subscriber
///
/// Events use the `logcall` target and carry the owner as a field. The
/// subscriber filters by target and level; per-owner thresholds come from
/// [`TracingSink::with_min_level`], usually fed by the `[owners]` table of
/// [`LogCallConfig`](crate::config::LogCallConfig).
#[derive(Debug, Clone)]
pub struct TracingSink {
    owner: String,
    min_level: Option<LogLevel>,
}

impl TracingSink {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            min_level: None,
        }
    }

    /// Reject calls below `level` for this owner before asking the subscriber
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = Some(level);
        self
    }

    /// Provider creating one cached tracing sink per owner
    pub fn provider() -> SinkRegistry {
        Self::provider_with_levels(BTreeMap::new())
    }

    /// Provider whose sinks apply the minimum level listed for their owner
    pub fn provider_with_levels(levels: BTreeMap<String, LogLevel>) -> SinkRegistry {
        SinkRegistry::with_factory(move |owner| {
            let sink = TracingSink::new(owner);
            Arc::new(match levels.get(owner) {
                Some(level) => sink.with_min_level(*level),
                None => sink,
            })
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn min_level(&self) -> Option<LogLevel> {
        self.min_level
    }
}

impl LogSink for TracingSink {
    fn is_enabled(&self, level: LogLevel) -> bool {
        if self.min_level.is_some_and(|min| level < min) {
            return false;
        }
        // callsites are static, so each runtime level needs its own arm
        match level {
            LogLevel::Trace => tracing::enabled!(target: TARGET_CALLS, Level::TRACE),
            LogLevel::Debug => tracing::enabled!(target: TARGET_CALLS, Level::DEBUG),
            LogLevel::Info => tracing::enabled!(target: TARGET_CALLS, Level::INFO),
            LogLevel::Warn => tracing::enabled!(target: TARGET_CALLS, Level::WARN),
            LogLevel::Error => tracing::enabled!(target: TARGET_CALLS, Level::ERROR),
        }
    }

    fn write(&self, level: LogLevel, message: &str) -> Result<(), SinkError> {
        let owner = self.owner.as_str();
        match level {
            LogLevel::Trace => {
                tracing::trace!(target: TARGET_CALLS, owner, event = EVENT_CALL, "{message}")
            }
            LogLevel::Debug => {
                tracing::debug!(target: TARGET_CALLS, owner, event = EVENT_CALL, "{message}")
            }
            LogLevel::Info => {
                tracing::info!(target: TARGET_CALLS, owner, event = EVENT_CALL, "{message}")
            }
            LogLevel::Warn => {
                tracing::warn!(target: TARGET_CALLS, owner, event = EVENT_CALL, "{message}")
            }
            LogLevel::Error => {
                tracing::error!(target: TARGET_CALLS, owner, event = EVENT_CALL, "{message}")
            }
        }
        Ok(())
    }
}
