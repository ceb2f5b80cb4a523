// ABOUTME: Library root for ebpush - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod aws;
pub mod config;
pub mod credentials;
pub mod diagnostics;
pub mod error;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod platform;
pub mod storage;
