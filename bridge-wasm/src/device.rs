//! Output device selection through `HTMLMediaElement.setSinkId`.

use bridge_traits::{DeviceBinder, DeviceSupport};
use js_sys::Reflect;
use wasm_bindgen::JsValue;

/// `DeviceBinder` for browsers. Support is detected once, when the binder is
/// created.
#[derive(Debug, Clone, Copy)]
pub struct WebDeviceBinder {
    support: DeviceSupport,
}

impl WebDeviceBinder {
    /// Detect `setSinkId` support in the current global scope.
    pub fn detect() -> Self {
        let support = if sink_selection_available() {
            DeviceSupport::Supported
        } else {
            DeviceSupport::Unsupported
        };
        Self { support }
    }
}

impl Default for WebDeviceBinder {
    fn default() -> Self {
        Self::detect()
    }
}

impl DeviceBinder for WebDeviceBinder {
    fn support(&self) -> DeviceSupport {
        self.support
    }
}

/// `"setSinkId" in HTMLAudioElement.prototype`
fn sink_selection_available() -> bool {
    let global = js_sys::global();
    let Ok(constructor) = Reflect::get(&global, &JsValue::from_str("HTMLAudioElement")) else {
        return false;
    };
    if !constructor.is_function() {
        return false;
    }
    let Ok(prototype) = Reflect::get(&constructor, &JsValue::from_str("prototype")) else {
        return false;
    };
    prototype.is_object()
        && Reflect::has(&prototype, &JsValue::from_str("setSinkId")).unwrap_or(false)
}
