//! Output device selection capability.
//!
//! Device selection is optional on most hosts. Instead of probing for a method
//! at runtime, the core asks the [`DeviceBinder`] for [`DeviceSupport`] and
//! gets an explicit [`SinkBinding`] back from every bind attempt.

use crate::{platform::PlatformSendSync, playback::PlaybackElement};

/// Whether the host can route a playback element to a chosen device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceSupport {
    Supported,
    Unsupported,
}

/// Outcome of a bind attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkBinding {
    /// The element now plays through the requested device.
    Bound,
    /// The host has no device selection capability.
    Unsupported,
    /// The host refused the request (unknown device, permission denied).
    Rejected(String),
}

impl SinkBinding {
    pub fn is_bound(&self) -> bool {
        matches!(self, SinkBinding::Bound)
    }
}

/// Binds playback elements to physical output devices.
///
/// Device identifiers are opaque strings from the host's device enumeration
/// and are passed through unvalidated.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait DeviceBinder: PlatformSendSync {
    /// Feature detection for device selection.
    fn support(&self) -> DeviceSupport;

    /// Apply `device_id` to `element`. Never fails: every outcome is a
    /// [`SinkBinding`] variant.
    async fn bind(&self, element: &dyn PlaybackElement, device_id: &str) -> SinkBinding {
        if self.support() == DeviceSupport::Unsupported {
            return SinkBinding::Unsupported;
        }

        match element.set_sink_id(device_id).await {
            Ok(()) => SinkBinding::Bound,
            Err(err) => SinkBinding::Rejected(err.to_string()),
        }
    }
}

/// Binder for hosts without device selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDeviceSelection;

impl DeviceBinder for NoDeviceSelection {
    fn support(&self) -> DeviceSupport {
        DeviceSupport::Unsupported
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BridgeError, Result};
    use crate::playback::Preload;
    use mockall::mock;

    mock! {
        pub Element {}

        #[async_trait::async_trait]
        impl PlaybackElement for Element {
            async fn play(&self) -> Result<()>;
            fn pause(&self) -> Result<()>;
            fn is_paused(&self) -> bool;
            fn set_volume(&self, volume: f64);
            fn set_preload(&self, preload: Preload);
            async fn set_sink_id(&self, device_id: &str) -> Result<()>;
        }
    }

    struct AlwaysSupported;

    impl DeviceBinder for AlwaysSupported {
        fn support(&self) -> DeviceSupport {
            DeviceSupport::Supported
        }
    }

    #[tokio::test]
    async fn unsupported_binder_never_touches_element() {
        let mut element = MockElement::new();
        element.expect_set_sink_id().never();

        let binding = NoDeviceSelection.bind(&element, "dev-A").await;
        assert_eq!(binding, SinkBinding::Unsupported);
    }

    #[tokio::test]
    async fn default_bind_maps_success() {
        let mut element = MockElement::new();
        element
            .expect_set_sink_id()
            .withf(|id| id == "dev-A")
            .times(1)
            .returning(|_| Ok(()));

        let binding = AlwaysSupported.bind(&element, "dev-A").await;
        assert!(binding.is_bound());
    }

    #[tokio::test]
    async fn default_bind_maps_rejection() {
        let mut element = MockElement::new();
        element
            .expect_set_sink_id()
            .returning(|_| Err(BridgeError::Rejected("NotFoundError".into())));

        let binding = AlwaysSupported.bind(&element, "missing").await;
        match binding {
            SinkBinding::Rejected(reason) => assert!(reason.contains("NotFoundError")),
            other => panic!("unexpected binding: {:?}", other),
        }
    }
}
