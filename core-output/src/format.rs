//! # Format Descriptors
//!
//! The format negotiated with the audio source, and the control messages the
//! concat processor understands.

use crate::error::{OutputError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sample encoding of the raw buffers fed to the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// 16-bit signed little-endian PCM.
    Pcm,
    /// 8-bit G.711 mu-law.
    Ulaw,
}

impl SampleFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleFormat::Pcm => "pcm",
            SampleFormat::Ulaw => "ulaw",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SampleFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pcm" => Ok(SampleFormat::Pcm),
            "ulaw" => Ok(SampleFormat::Ulaw),
            other => Err(OutputError::InvalidFormat(format!(
                "unknown sample format '{}'",
                other
            ))),
        }
    }
}

/// Sample rate and encoding of the audio a session plays.
///
/// Supplied once at creation, forwarded to the processor node, and immutable
/// for the lifetime of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatDescriptor {
    /// Sample rate in hertz.
    pub sample_rate: u32,
    pub format: SampleFormat,
}

impl FormatDescriptor {
    pub fn new(sample_rate: u32, format: SampleFormat) -> Self {
        Self {
            sample_rate,
            format,
        }
    }

    /// Validate the descriptor before any engine resource is allocated.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(OutputError::InvalidFormat(
                "sample rate must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Control messages posted to the concat processor's port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProcessorMessage {
    SetFormat { format: SampleFormat },
}

impl ProcessorMessage {
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
