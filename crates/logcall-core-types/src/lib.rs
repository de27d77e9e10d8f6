//! Core types shared across LogCall facilities
//!
//! This crate provides foundational types used by both the instrumentation
//! engine and its logging facility:
//!
//! - **Levels**: LogLevel, the gate level carried by every instrumentation spec
//! - **Sensitive data**: Sensitive<T> marker for automatic redaction
//! - **Schema constants**: Canonical field keys and event names

pub mod level;
pub mod schema;
pub mod sensitive;

pub use level::{LogLevel, ParseLevelError};
pub use sensitive::Sensitive;
