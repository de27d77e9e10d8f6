#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::ServiceError;
use logcall_core::{
    ErrorKind, LogCallConfig, LogLevel, MemorySink, OperationRegistry, SinkRegistry,
};
use std::sync::Arc;

const CONFIG: &str = r#"
default_level = "INFO"

[filter]
extra_frame_prefixes = ["config_tests::proxy"]

[operations."Orders.place"]
log_parameters = true
log_return = true

[operations."Orders.cancel"]
level = "DEBUG"
custom_pattern = "{className}.{methodName}({order_id})"
"#;

#[test]
fn test_config_drives_registry_and_interceptor() {
    let config = LogCallConfig::from_toml_str(CONFIG).unwrap();
    let registry = OperationRegistry::new();
    assert_eq!(config.populate(&registry).unwrap(), 2);

    let sink = Arc::new(MemorySink::new(LogLevel::Debug));
    let interceptor = config.interceptor(SinkRegistry::new(sink.clone()));

    let place = registry.get("Orders", "place").unwrap();
    let item = "book";
    let site = place.site().arg("item", &item);
    let out = interceptor.invoke_registered(&place, &site, || Ok::<_, ServiceError>(42));
    assert_eq!(out.unwrap(), 42);

    let cancel = registry.get("Orders", "cancel").unwrap();
    let order_id = 42;
    let site = cancel.site().arg("order_id", &order_id);
    let out = interceptor.invoke_registered(&cancel, &site, || Ok::<_, ServiceError>("cancelled"));
    assert_eq!(out.unwrap(), "cancelled");

    let records = sink.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].level, LogLevel::Info);
    assert!(records[0].message.starts_with("Method 'place' | Params: [book] | Return: 42 | Duration: "));
    assert_eq!(records[1].level, LogLevel::Debug);
    assert_eq!(records[1].message, "Orders.cancel(42)");
}

#[test]
fn test_config_filter_reaches_interceptor() {
    let config = LogCallConfig::from_toml_str(CONFIG).unwrap();
    let interceptor = config.interceptor(SinkRegistry::new(Arc::new(MemorySink::all())));

    let filter = interceptor.formatter().frame_filter();
    assert!(filter.matches("   4: config_tests::proxy::forward"));
    assert!(filter.matches("   5: logcall_core::interceptor::Interceptor::invoke"));
}

#[test]
fn test_config_file_round_trip() {
    let path = std::env::temp_dir().join(format!("logcall-config-{}.toml", std::process::id()));
    std::fs::write(&path, CONFIG).unwrap();

    let loaded = LogCallConfig::from_file(&path);
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.unwrap(), LogCallConfig::from_toml_str(CONFIG).unwrap());
}

#[test]
fn test_config_errors_carry_codes() {
    let bad_toml = LogCallConfig::from_toml_str("default_level = ").unwrap_err();
    assert_eq!(bad_toml.kind(), ErrorKind::Config);

    let bad_level = LogCallConfig::from_toml_str("[operations.\"A.b\"]\nlevel = \"VERBOSE\"").unwrap_err();
    assert_eq!(bad_level.code(), "ERR_CONFIG");

    let bad_key = LogCallConfig::from_toml_str("[operations.Orders]\n").unwrap_err();
    assert_eq!(bad_key.kind(), ErrorKind::InvalidOperationKey);
    assert!(bad_key.to_string().contains("'Orders'"));
}
