//! Convenience helpers for wiring the wasm audio bridges together.
//!
//! Host shells can use [`build_audio_bridges`] to get every capability the
//! output core needs without writing the glue themselves.

use std::sync::Arc;

use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    AudioEngineFactory, DeviceBinder, DeviceSupport,
};
use js_sys::Reflect;
use tracing::debug;
use wasm_bindgen::JsValue;

use crate::{WebAudioEngineFactory, WebDeviceBinder};

/// Fully constructed wasm bridge objects ready for injection into the core.
#[derive(Clone)]
pub struct WasmAudioBridgeSet {
    /// Engine factory creating one `AudioContext` per session.
    pub engines: Arc<dyn AudioEngineFactory>,
    /// `setSinkId`-based device binder.
    pub device_binder: Arc<dyn DeviceBinder>,
}

impl WasmAudioBridgeSet {
    /// Convenience accessor to clone the engine factory.
    pub fn engines(&self) -> Arc<dyn AudioEngineFactory> {
        Arc::clone(&self.engines)
    }

    /// Convenience accessor to clone the device binder.
    pub fn device_binder(&self) -> Arc<dyn DeviceBinder> {
        Arc::clone(&self.device_binder)
    }
}

/// Build the browser audio bridge stack.
///
/// Fails with `BridgeError::NotAvailable` if the global scope has no
/// `AudioContext` or `AudioWorkletNode` constructor.
pub fn build_audio_bridges() -> BridgeResult<WasmAudioBridgeSet> {
    for api in ["AudioContext", "AudioWorkletNode"] {
        if !global_has(api) {
            return Err(BridgeError::NotAvailable(api.to_string()));
        }
    }

    let binder = WebDeviceBinder::detect();
    debug!(
        device_selection = binder.support() == DeviceSupport::Supported,
        "Audio bridges initialized"
    );

    Ok(WasmAudioBridgeSet {
        engines: Arc::new(WebAudioEngineFactory::new()),
        device_binder: Arc::new(binder),
    })
}

fn global_has(name: &str) -> bool {
    Reflect::has(&js_sys::global(), &JsValue::from_str(name)).unwrap_or(false)
}
