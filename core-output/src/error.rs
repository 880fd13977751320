//! # Output Error Types
//!
//! Error types for output session operations. Only unexpected platform
//! failures and invalid inputs surface here; expected negative outcomes
//! (unsupported device selection, blocked autoplay) are reported through
//! return values instead.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during output session operations.
#[derive(Error, Debug)]
pub enum OutputError {
    // ========================================================================
    // Input Errors
    // ========================================================================
    /// Format descriptor is not usable (zero sample rate, unknown format).
    #[error("Invalid format descriptor: {0}")]
    InvalidFormat(String),

    /// Configuration failed validation.
    #[error("Invalid output configuration: {0}")]
    Config(String),

    /// Invalid volume value (must be in range [0.0, 1.0]).
    #[error("Invalid volume: {0} (must be between 0.0 and 1.0)")]
    InvalidVolume(f32),

    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// The processor module could not be registered with the engine.
    #[error("Failed to load processor module '{module}': {source}")]
    ProcessorLoad {
        module: String,
        #[source]
        source: BridgeError,
    },

    /// Any other failure reported by the audio bridge.
    #[error("Audio bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// Serializing a control message failed.
    #[error("Failed to encode processor message: {0}")]
    MessageEncoding(#[from] serde_json::Error),
}

impl OutputError {
    /// Returns `true` if the error originated in the host platform rather
    /// than in caller input.
    pub fn is_platform_error(&self) -> bool {
        matches!(
            self,
            OutputError::ProcessorLoad { .. } | OutputError::Bridge(_)
        )
    }
}

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;
