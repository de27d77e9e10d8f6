//! Instrumented Service Demonstration
//!
//! Runs a small payment service whose methods are instrumented in three ways:
//! 1. Through specs registered from TOML configuration
//! 2. Through the `log_call!` macro
//! 3. Through a failing call whose error is logged and still returned
//!
//! Card numbers are wrapped in `Sensitive` and never reach the log.
//!
//! Messages are forwarded to `tracing`; run with `RUST_LOG=logcall=trace` to
//! see every level.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use logcall_core::logging_facility::{init, Profile};
use logcall_core::{
    log_call, InstrumentationSpec, Interceptor, LogCallConfig, LogLevel, OperationRegistry,
    Sensitive,
};
use std::sync::Arc;
use thiserror::Error;

const CONFIG: &str = r#"
default_level = "INFO"

[owners]
PaymentService = "INFO"

[operations."PaymentService.process_data"]
log_parameters = true
log_return = true
log_exception = true

[operations."PaymentService.another_method"]
level = "WARN"
log_stack_trace = true
"#;

#[derive(Debug, Error)]
enum PaymentError {
    #[error("value must not be negative: {0}")]
    NegativeValue(i64),
}

struct PaymentService {
    interceptor: Arc<Interceptor>,
    registry: Arc<OperationRegistry>,
}

impl PaymentService {
    const OWNER: &'static str = "PaymentService";

    fn process_data(&self, name: &str, value: i64) -> Result<String, PaymentError> {
        let op = self
            .registry
            .get_or_register(Self::OWNER, "process_data", InstrumentationSpec::new);
        let site = op.site().arg("name", &name).arg("value", &value);
        self.interceptor.invoke_registered(&op, &site, || {
            println!(">>> running business logic in process_data...");
            if value < 0 {
                return Err(PaymentError::NegativeValue(value));
            }
            Ok(format!("result for {name} is {}", value * 2))
        })
    }

    fn another_method(&self) -> Result<(), PaymentError> {
        let op = self
            .registry
            .get_or_register(Self::OWNER, "another_method", InstrumentationSpec::new);
        let site = op.site();
        self.interceptor.invoke_void(op.spec(), &site, || {
            println!(">>> running another_method...");
            Ok(())
        })
    }

    fn authorize(&self, account: &str, card: &Sensitive<String>) -> Result<bool, PaymentError> {
        let spec = InstrumentationSpec::new().level(LogLevel::Info).log_parameters(true).log_return(true);
        log_call!(self.interceptor, spec, Self::OWNER, "authorize", (account, card), {
            Ok(card.expose().len() == 16)
        })
    }

    fn critical_operation(&self, amount: f64, user: &str) -> Result<(), PaymentError> {
        let spec = InstrumentationSpec::new()
            .level(LogLevel::Warn)
            .custom_pattern("Call to 'critical_operation' by {user}. Amount: {amount}. Stack:\n{stacktrace}");
        log_call!(@void self.interceptor, spec, Self::OWNER, "critical_operation", (amount, user), {
            println!(">>> running critical_operation...");
            Ok(())
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init(Profile::Development);
    println!("=== LogCall Service Demo ===\n");

    let config = LogCallConfig::from_toml_str(CONFIG)?;
    let registry = Arc::new(OperationRegistry::new());
    let registered = config.populate(&registry)?;
    println!("Registered {registered} operations from configuration\n");

    let service = PaymentService {
        interceptor: Arc::new(config.interceptor(config.tracing_sinks())),
        registry,
    };

    println!("{}", service.process_data("Test1", 100)?);
    service.another_method()?;
    service.critical_operation(123.45, "admin")?;
    let card = Sensitive::new("4111111111111111".to_string());
    println!("authorized: {}", service.authorize("acct-9", &card)?);

    match service.process_data("Test2", -5) {
        Ok(out) => println!("unexpected success: {out}"),
        Err(err) => println!(">>> error still returned to the caller: {err}"),
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
