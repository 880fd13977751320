//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform
//! running a voice output session.
//!
//! ## Overview
//!
//! This crate defines the contract between the output core and the host's audio
//! stack. Each trait represents a capability the core requires but that must be
//! implemented differently per platform. Browser globals (`AudioContext`,
//! `HTMLAudioElement`, `setSinkId`) are never reached for directly; the core only
//! talks to these traits, and tests substitute fakes.
//!
//! ## Traits
//!
//! ### Audio Graph
//! - [`AudioEngineFactory`](audio::AudioEngineFactory) - Allocates engines at a requested sample rate
//! - [`AudioEngine`](audio::AudioEngine) - Node creation, wiring, suspend/resume, processor modules
//!
//! ### Playback & Devices
//! - [`PlaybackElement`](playback::PlaybackElement) - Media element relaying a synthetic stream
//! - [`DeviceBinder`](device::DeviceBinder) - Optional output device selection
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Web      | `bridge-wasm`       | ✅ Available |
//! | Native   | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Expected
//! negative outcomes are not errors: device selection reports them through
//! [`SinkBinding`](device::SinkBinding), and feature detection through
//! [`DeviceSupport`](device::DeviceSupport).
//!
//! ## Thread Safety
//!
//! Bridge traits require `Send + Sync` on native targets and drop those bounds
//! on `wasm32`, where browser objects are single-threaded. See
//! [`platform`] for the marker traits.

pub mod audio;
pub mod device;
pub mod error;
pub mod logging;
pub mod platform;
pub mod playback;

pub use error::BridgeError;

// Re-export commonly used types
pub use audio::{
    AudioEngine, AudioEngineFactory, EngineId, EngineOptions, EngineState, MediaStreamSink,
    NodeId, StreamId,
};
pub use device::{DeviceBinder, DeviceSupport, NoDeviceSelection, SinkBinding};
pub use logging::{LogEntry, LogLevel, LoggerSink};
pub use playback::{PlaybackElement, Preload};
