//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the voice output core:
//! - Logging and tracing infrastructure
//! - Runtime error types
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that other modules depend on. It
//! establishes the logging conventions (structured `tracing` events, optional
//! forwarding into a host [`LoggerSink`](bridge_traits::logging::LoggerSink))
//! used throughout the system.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
