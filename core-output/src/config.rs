//! # Output Configuration
//!
//! Configuration types for output sessions: which processor module to load
//! into each engine, and how relay playback elements are set up.

use crate::error::{OutputError, Result};
use bridge_traits::Preload;
use serde::{Deserialize, Serialize};

/// Output session configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Processor module registered with every engine.
    #[serde(default)]
    pub processor: ProcessorModule,

    /// Relay playback element settings.
    #[serde(default)]
    pub relay: RelayConfig,
}

impl OutputConfig {
    /// Override the processor module URL.
    pub fn with_module_url(mut self, url: impl Into<String>) -> Self {
        self.processor.module_url = url.into();
        self
    }

    /// Override the relay element volume.
    pub fn with_relay_volume(mut self, volume: f64) -> Self {
        self.relay.volume = volume;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        self.processor.validate()?;
        self.relay.validate()
    }
}

/// The user-code processor that concatenates queued sample buffers into a
/// continuous signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorModule {
    /// Name the processor registers itself under.
    ///
    /// Default: `audio-concat-processor`.
    #[serde(default = "default_processor_name")]
    pub name: String,

    /// URL of the worklet script (plain, blob or data URL).
    ///
    /// Default: `audio-concat-processor.js`, resolved relative to the page.
    #[serde(default = "default_module_url")]
    pub module_url: String,
}

impl Default for ProcessorModule {
    fn default() -> Self {
        Self {
            name: default_processor_name(),
            module_url: default_module_url(),
        }
    }
}

impl ProcessorModule {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(OutputError::Config(
                "processor name must not be empty".to_string(),
            ));
        }
        if self.module_url.trim().is_empty() {
            return Err(OutputError::Config(
                "processor module_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings applied to every playback element the session creates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Element volume. Gain is controlled in the graph, so this stays at
    /// full scale unless a host needs a fixed attenuation.
    ///
    /// Default: 1.0.
    #[serde(default = "default_relay_volume")]
    pub volume: f64,

    /// Preload hint. A live stream has nothing to preload.
    ///
    /// Default: `none`.
    #[serde(default)]
    pub preload: Preload,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            volume: default_relay_volume(),
            preload: Preload::None,
        }
    }
}

impl RelayConfig {
    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(OutputError::Config(format!(
                "relay volume must be between 0.0 and 1.0, got {}",
                self.volume
            )));
        }
        Ok(())
    }
}

fn default_processor_name() -> String {
    "audio-concat-processor".to_string()
}

fn default_module_url() -> String {
    "audio-concat-processor.js".to_string()
}

fn default_relay_volume() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = OutputConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.processor.name, "audio-concat-processor");
        assert_eq!(config.relay.volume, 1.0);
        assert_eq!(config.relay.preload, Preload::None);
    }

    #[test]
    fn empty_module_url_is_rejected() {
        let config = OutputConfig::default().with_module_url("  ");
        assert!(matches!(config.validate(), Err(OutputError::Config(_))));
    }

    #[test]
    fn out_of_range_volume_is_rejected() {
        let config = OutputConfig::default().with_relay_volume(1.5);
        assert!(config.validate().is_err());

        let config = OutputConfig::default().with_relay_volume(-0.1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: OutputConfig =
            serde_json::from_str(r#"{"processor":{"module_url":"/worklets/concat.js"}}"#)
                .unwrap();
        assert_eq!(config.processor.name, "audio-concat-processor");
        assert_eq!(config.processor.module_url, "/worklets/concat.js");
        assert_eq!(config.relay, RelayConfig::default());
    }
}
