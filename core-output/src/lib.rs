//! # Voice Output Module
//!
//! Real-time playback of streamed voice audio.
//!
//! ## Overview
//!
//! This module handles:
//! - Building the `processor -> gain -> analyser -> output` graph on an engine
//! - Direct or relayed routing of the graph output
//! - Ducking (suspending the engine between utterances)
//! - Best-effort output device selection
//! - Restarting relay playback blocked by autoplay policy
//!
//! Platform capabilities come from `bridge-traits`; the browser
//! implementation lives in `bridge-wasm`.
//!
//! ## Usage
//!
//! ```ignore
//! use core_output::{FormatDescriptor, OutputBridges, OutputConfig, OutputSession, RoutingMode, SampleFormat};
//!
//! let bridges = OutputBridges::new(engines, device_binder, OutputConfig::default())?;
//! let format = FormatDescriptor::new(24000, SampleFormat::Pcm);
//! let mut session = OutputSession::create(&bridges, format, RoutingMode::Relayed).await?;
//!
//! session.enqueue_samples(&chunk)?;
//! session.ensure_audio_element_playing().await;
//! session.suspend_for_ducking().await?;
//! session.close().await?;
//! ```

pub mod config;
pub mod device;
pub mod ducking;
pub mod error;
pub mod format;
pub mod graph;
pub mod processor;
pub mod routing;
pub mod session;
pub mod watchdog;

#[cfg(test)]
mod mocks;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use config::{OutputConfig, ProcessorModule, RelayConfig};
pub use device::DeviceSelector;
pub use ducking::{DuckState, DuckingController};
pub use error::{OutputError, Result};
pub use format::{FormatDescriptor, ProcessorMessage, SampleFormat};
pub use graph::{AudioGraph, GraphOutput};
pub use processor::ProcessorLoader;
pub use routing::{RelayOutput, RoutingMode, StartOutcome};
pub use session::{OutputBridges, OutputSession};
pub use watchdog::WatchdogOutcome;
