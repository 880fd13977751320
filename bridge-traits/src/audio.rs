//! Audio engine bridge traits and graph handle types.
//!
//! An [`AudioEngine`] is the real-time processing context a host provides
//! (a Web Audio `AudioContext` in browsers). The core never touches platform
//! node objects directly; it works with small copyable handles ([`NodeId`],
//! [`StreamId`]) that the engine resolves against its own node registry. This
//! keeps graph wiring testable with in-memory fakes and lets the engine own
//! every platform resource it allocates.

use crate::{error::Result, platform::PlatformSendSync, playback::PlaybackElement};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier for a single engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineId(Uuid);

impl EngineId {
    /// Generate a new engine identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct an identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EngineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Handle to an audio node owned by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Handle to a synthetic media stream produced by a stream sink node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(pub u32);

/// A media-stream sink: the graph node audio is connected into, plus the
/// stream a playback element can consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaStreamSink {
    pub node: NodeId,
    pub stream: StreamId,
}

/// Lifecycle state reported by the engine itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Suspended,
    Running,
    Closed,
}

/// Options used when allocating an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Sample rate in hertz.
    pub sample_rate: u32,
}

impl EngineOptions {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }
}

/// Real-time audio processing context.
///
/// Node creation and wiring are synchronous (they never yield on any known
/// platform); state transitions and module registration are async because
/// hosts resolve them through promises or driver callbacks.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait AudioEngine: PlatformSendSync {
    /// Stable identifier of this engine instance.
    fn id(&self) -> EngineId;

    /// Sample rate the engine was created with.
    fn sample_rate(&self) -> u32;

    /// Current engine state as reported by the platform.
    fn state(&self) -> EngineState;

    /// Register a user-code processor module (worklet script) with the engine.
    async fn add_processor_module(&self, module_url: &str) -> Result<()>;

    /// Create a gain node with unity gain.
    fn create_gain(&self) -> Result<NodeId>;

    /// Create an analyser node.
    fn create_analyser(&self) -> Result<NodeId>;

    /// Instantiate a node backed by a previously registered processor.
    fn create_processor_node(&self, processor_name: &str) -> Result<NodeId>;

    /// Create a synthetic media-stream sink.
    fn create_media_stream_sink(&self) -> Result<MediaStreamSink>;

    /// The engine's native output destination.
    fn destination(&self) -> NodeId;

    /// Connect the output of `from` into `to`.
    fn connect(&self, from: NodeId, to: NodeId) -> Result<()>;

    /// Remove a single `from -> to` connection.
    fn disconnect(&self, from: NodeId, to: NodeId) -> Result<()>;

    /// Set the gain value of a gain node.
    fn set_gain(&self, node: NodeId, value: f32) -> Result<()>;

    /// Post an out-of-band control message to a processor node. Delivery is
    /// fire-and-forget.
    fn post_message(&self, node: NodeId, message: &serde_json::Value) -> Result<()>;

    /// Post a raw sample buffer to a processor node's queue.
    fn post_samples(&self, node: NodeId, samples: &[u8]) -> Result<()>;

    /// Create a playback element that consumes the given stream.
    ///
    /// The element only borrows the stream; closing the engine does not stop
    /// the element, callers must do that explicitly.
    fn create_playback_element(&self, stream: StreamId) -> Result<Box<dyn PlaybackElement>>;

    /// Resume audio processing.
    async fn resume(&self) -> Result<()>;

    /// Suspend audio processing, releasing the hardware device.
    async fn suspend(&self) -> Result<()>;

    /// Tear down the engine and all nodes it owns.
    async fn close(&self) -> Result<()>;
}

/// Factory for engine instances.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait AudioEngineFactory: PlatformSendSync {
    /// Allocate a new engine. Engines may start suspended.
    async fn create_engine(&self, options: EngineOptions) -> Result<Box<dyn AudioEngine>>;
}
