//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (`core-output`, `core-runtime`). Host applications can
//! depend on `voice-output-workspace` and enable the documented features
//! without needing to wire each crate individually.

#[cfg(feature = "output")]
pub use core_output as output;
#[cfg(feature = "output")]
pub use core_runtime as runtime;
