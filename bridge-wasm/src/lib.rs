//! WebAssembly Bridge Implementations
//!
//! This crate provides WebAssembly-compatible implementations of the audio
//! bridge traits defined in `bridge-traits`, using the Web Audio API and
//! `HTMLAudioElement` through `web-sys`.
//!
//! # Platform Support
//!
//! This crate is designed exclusively for the `wasm32-unknown-unknown` target.
//! It compiles to nothing on native targets.
//!
//! # Implementations
//!
//! - `WebAudioEngineFactory` / `WebAudioEngine`: one `AudioContext` per engine
//! - `HtmlPlaybackElement`: detached audio element playing a `MediaStream`
//! - `WebDeviceBinder`: output device selection via `setSinkId`
//! - `JsLoggerSink`: forwards core log entries to a JS callback
//!
//! # Examples
//!
//! ```ignore
//! use bridge_wasm::build_audio_bridges;
//! use bridge_traits::EngineOptions;
//!
//! let bridges = build_audio_bridges()?;
//! let engine = bridges.engines.create_engine(EngineOptions::new(48000)).await?;
//! let gain = engine.create_gain()?;
//! engine.connect(gain, engine.destination())?;
//! ```

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

pub mod audio_context;
pub mod audio_element;
pub mod bootstrap;
pub mod device;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use audio_context::{WebAudioEngine, WebAudioEngineFactory};
pub use audio_element::HtmlPlaybackElement;
pub use bootstrap::{build_audio_bridges, WasmAudioBridgeSet};
pub use device::WebDeviceBinder;
pub use error::{WasmError, WasmResult};
pub use logging::JsLoggerSink;
