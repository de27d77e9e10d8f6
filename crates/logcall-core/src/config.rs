//! TOML configuration for interceptors and registered operations
//!
//! ```toml
//! default_level = "INFO"
//!
//! [filter]
//! extra_frame_prefixes = ["my_app::proxy"]
//!
//! [owners]
//! Billing = "DEBUG"
//!
//! [operations."Billing.charge"]
//! log_parameters = true
//! log_return = true
//!
//! [operations."Billing.refund"]
//! level = "ERROR"
//! custom_pattern = "{className}.{methodName} -> {return}"
//! ```

use crate::errors::{LogCallError, Result};
use crate::interceptor::Interceptor;
use crate::registry::{OperationKey, OperationRegistry};
use crate::sink::{SinkProvider, SinkRegistry, TracingSink};
use crate::spec::InstrumentationSpec;
use crate::stack::FrameFilter;
use logcall_core_types::LogLevel;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Root configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogCallConfig {
    /// Level for operations that do not set their own
    pub default_level: Option<LogLevel>,
    pub filter: FilterConfig,
    /// Minimum level per owner, applied by tracing sinks
    pub owners: BTreeMap<String, LogLevel>,
    /// Keyed by `Owner.operation`
    pub operations: BTreeMap<String, OperationConfig>,
}

/// Extra frames to hide from captured traces
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    pub extra_frame_prefixes: Vec<String>,
}

/// Per-operation settings; omitted fields take spec defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperationConfig {
    pub level: Option<LogLevel>,
    pub log_parameters: bool,
    pub log_return: bool,
    pub log_stack_trace: bool,
    pub log_exception: bool,
    #[serde(alias = "custom_log")]
    pub custom_pattern: Option<String>,
}

impl OperationConfig {
    pub fn to_spec(&self, default_level: Option<LogLevel>) -> InstrumentationSpec {
        let level = self.level.or(default_level).unwrap_or_default();
        let spec = InstrumentationSpec::new()
            .level(level)
            .log_parameters(self.log_parameters)
            .log_return(self.log_return)
            .log_stack_trace(self.log_stack_trace)
            .log_exception(self.log_exception);
        match &self.custom_pattern {
            Some(pattern) => spec.custom_pattern(pattern.clone()),
            None => spec,
        }
    }
}

impl LogCallConfig {
    /// Parse configuration text
    ///
    /// # Errors
    ///
    /// Returns `LogCallError::Config` for malformed TOML, unknown keys or
    /// unknown level names, and `LogCallError::InvalidOperationKey` when an
    /// operation key is not `Owner.operation`.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        for key in config.operations.keys() {
            parse_operation_key(key)?;
        }
        Ok(config)
    }

    /// Read and parse a configuration file
    ///
    /// # Errors
    ///
    /// Returns `LogCallError::Io` if the file cannot be read, otherwise the
    /// errors of [`LogCallConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LogCallError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Default engine filter plus the configured prefixes
    pub fn frame_filter(&self) -> FrameFilter {
        self.filter
            .extra_frame_prefixes
            .iter()
            .fold(FrameFilter::default(), |filter, prefix| {
                filter.with_needle(prefix.clone())
            })
    }

    /// Interceptor resolving sinks through `provider` with the configured filter
    pub fn interceptor(&self, provider: impl SinkProvider + 'static) -> Interceptor {
        Interceptor::new(provider).with_frame_filter(self.frame_filter())
    }

    /// Tracing sinks honouring the `[owners]` minimum levels
    pub fn tracing_sinks(&self) -> SinkRegistry {
        TracingSink::provider_with_levels(self.owners.clone())
    }

    /// Specs for every configured operation, in key order
    ///
    /// # Errors
    ///
    /// Returns `LogCallError::InvalidOperationKey` for a malformed key.
    pub fn operation_specs(&self) -> Result<Vec<(OperationKey, InstrumentationSpec)>> {
        self.operations
            .iter()
            .map(|(key, op)| Ok((parse_operation_key(key)?, op.to_spec(self.default_level))))
            .collect()
    }

    /// Register every configured operation; returns how many were added
    ///
    /// # Errors
    ///
    /// Returns `LogCallError::InvalidOperationKey` for a malformed key;
    /// nothing is registered in that case.
    pub fn populate(&self, registry: &OperationRegistry) -> Result<usize> {
        let specs = self.operation_specs()?;
        let added = registry.register_all(specs);
        tracing::debug!(
            configured = self.operations.len(),
            added,
            "populated operation registry"
        );
        Ok(added)
    }
}

/// Split `Owner.operation` at the last dot
///
/// Owners may themselves contain dots (module paths); the operation may not.
fn parse_operation_key(key: &str) -> Result<OperationKey> {
    match key.rsplit_once('.') {
        Some((owner, operation)) if !owner.is_empty() && !operation.is_empty() => {
            Ok(OperationKey::new(owner, operation))
        }
        _ => Err(LogCallError::InvalidOperationKey {
            key: key.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::spec::FormatMode;
    use tracing_subscriber::layer::SubscriberExt;

    const SAMPLE: &str = r#"
default_level = "info"

[filter]
extra_frame_prefixes = ["my_app::proxy"]

[owners]
Billing = "debug"
Audit = "ERROR"

[operations."Billing.charge"]
log_parameters = true
log_return = true

[operations."Billing.refund"]
level = "ERROR"
custom_log = "{methodName} -> {return}"
"#;

    #[test]
    fn test_parse_sample() {
        let config = LogCallConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.default_level, Some(LogLevel::Info));
        assert_eq!(config.operations.len(), 2);

        let specs = config.operation_specs().unwrap();
        let (key, charge) = &specs[0];
        assert_eq!(key.to_string(), "Billing.charge");
        assert_eq!(charge.gate_level(), LogLevel::Info);
        assert!(charge.logs_parameters());
        assert!(charge.logs_return());
        assert!(!charge.logs_exception());

        let (_, refund) = &specs[1];
        assert_eq!(refund.gate_level(), LogLevel::Error);
        assert_eq!(refund.format_mode(), FormatMode::Custom("{methodName} -> {return}"));
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = LogCallConfig::from_toml_str("").unwrap();
        assert_eq!(config, LogCallConfig::default());
        assert_eq!(config.frame_filter(), FrameFilter::default());
    }

    #[test]
    fn test_missing_level_without_default_is_warn() {
        let config = LogCallConfig::from_toml_str("[operations.\"Svc.op\"]\n").unwrap();
        let specs = config.operation_specs().unwrap();
        assert_eq!(specs[0].1, InstrumentationSpec::new());
    }

    #[test]
    fn test_unknown_level_is_config_error() {
        let err = LogCallConfig::from_toml_str("default_level = \"LOUD\"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(err.code(), "ERR_CONFIG");
    }

    #[test]
    fn test_unknown_field_is_config_error() {
        let err = LogCallConfig::from_toml_str("[operations.\"Svc.op\"]\nlog_everything = true")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_malformed_operation_keys() {
        for key in ["NoDot", ".op", "Svc.", ""] {
            let text = format!("[operations.\"{key}\"]\n");
            let err = LogCallConfig::from_toml_str(&text).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidOperationKey, "key {key:?}");
        }
    }

    #[test]
    fn test_owner_may_be_a_path() {
        let key = parse_operation_key("app::billing::Invoice.total").unwrap();
        assert_eq!(key.owner(), "app::billing::Invoice");
        assert_eq!(key.operation(), "total");
    }

    #[test]
    fn test_frame_filter_adds_prefixes() {
        let config = LogCallConfig::from_toml_str(SAMPLE).unwrap();
        let filter = config.frame_filter();
        assert!(filter.matches("  7: my_app::proxy::Handler::call"));
        assert!(filter.matches("  2: logcall_core::interceptor::Interceptor::invoke"));
    }

    #[test]
    fn test_populate_registers_all() {
        let config = LogCallConfig::from_toml_str(SAMPLE).unwrap();
        let registry = OperationRegistry::new();
        assert_eq!(config.populate(&registry).unwrap(), 2);
        assert_eq!(config.populate(&registry).unwrap(), 0);
        assert!(registry.get("Billing", "refund").is_some());
    }

    #[test]
    fn test_owner_levels_reach_tracing_sinks() {
        let config = LogCallConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.owners.get("Billing"), Some(&LogLevel::Debug));
        assert_eq!(config.owners.get("Audit"), Some(&LogLevel::Error));

        let sinks = config.tracing_sinks();
        let audit = sinks.sink_for("Audit");
        tracing::subscriber::with_default(
            tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new("logcall=info")),
            || {
                assert!(!audit.is_enabled(LogLevel::Warn));
                assert!(audit.is_enabled(LogLevel::Error));
                assert!(sinks.sink_for("Billing").is_enabled(LogLevel::Info));
                assert!(!sinks.sink_for("Billing").is_enabled(LogLevel::Debug));
            },
        );
    }

    #[test]
    fn test_unknown_owner_level_is_config_error() {
        let err = LogCallConfig::from_toml_str("[owners]\nBilling = \"LOUD\"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_from_file_missing_is_io_error() {
        let err = LogCallConfig::from_file("/nonexistent/logcall.toml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
