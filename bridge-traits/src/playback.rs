//! Playback element bridge trait.
//!
//! A playback element is the host's media player object (an `HTMLAudioElement`
//! on the web) bound to a synthetic stream. The core uses it to relay engine
//! output without claiming an output device directly, and as the target of
//! device selection.

use crate::{error::Result, platform::PlatformSendSync};
use serde::{Deserialize, Serialize};

/// Preload hint for a playback element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preload {
    /// Do not buffer ahead. Live streams have nothing to buffer.
    #[default]
    None,
    Metadata,
    Auto,
}

impl Preload {
    /// HTML attribute value for this hint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Preload::None => "none",
            Preload::Metadata => "metadata",
            Preload::Auto => "auto",
        }
    }
}

/// Host media element consuming a synthetic stream.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait PlaybackElement: PlatformSendSync {
    /// Start playback. Hosts with autoplay restrictions reject this until a
    /// user gesture has occurred; the error is returned, never panicked.
    async fn play(&self) -> Result<()>;

    /// Pause playback.
    fn pause(&self) -> Result<()>;

    /// Whether the element is currently paused.
    fn is_paused(&self) -> bool;

    /// Set the element volume (`0.0..=1.0`).
    fn set_volume(&self, volume: f64);

    /// Set the preload hint.
    fn set_preload(&self, preload: Preload);

    /// Route the element's output to a specific device.
    async fn set_sink_id(&self, device_id: &str) -> Result<()>;
}
