//! Structured logging facility for LogCall
//!
//! This module provides:
//! - Single initialization point via `init(profile)`
//! - The `log_call!` macro for instrumenting a call in place
//! - Test capture mode for deterministic assertions on forwarded messages
//!
//! # Usage
//!
//! ```rust
//! use logcall_core::logging_facility::{init, Profile};
//!
//! // Initialize once at application startup
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
