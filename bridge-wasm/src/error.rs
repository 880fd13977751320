//! Error types for WebAssembly bridge implementations

use bridge_traits::error::BridgeError;
use thiserror::Error;
use wasm_bindgen::JsCast;

/// Result type for WebAssembly bridge operations
pub type WasmResult<T> = Result<T, WasmError>;

/// Errors that can occur in WebAssembly bridge implementations
#[derive(Error, Debug)]
pub enum WasmError {
    /// JavaScript exception or rejected promise
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// The browser does not provide a required API
    #[error("Not available: {0}")]
    NotAvailable(String),

    /// The browser refused the request (autoplay policy, unknown device)
    #[error("Rejected by browser: {0}")]
    Rejected(String),

    /// A node handle does not belong to this context
    #[error("Unknown audio node: {0}")]
    UnknownNode(u32),

    /// A stream handle does not belong to this context
    #[error("Unknown media stream: {0}")]
    UnknownStream(u32),

    /// Converting a message for the worklet port failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl WasmError {
    /// Wrap a JavaScript exception, keeping `NotAllowedError` and
    /// `NotFoundError` distinguishable as rejections.
    pub fn from_js(context: &str, value: wasm_bindgen::JsValue) -> Self {
        let (name, message) = describe(&value);
        let message = format!("{context}: {message}");
        match name.as_deref() {
            Some("NotAllowedError") | Some("NotFoundError") | Some("SecurityError") => {
                WasmError::Rejected(message)
            }
            Some("NotSupportedError") => WasmError::NotAvailable(message),
            _ => WasmError::JavaScript(message),
        }
    }
}

impl From<WasmError> for BridgeError {
    fn from(err: WasmError) -> Self {
        match err {
            WasmError::NotAvailable(msg) => BridgeError::NotAvailable(msg),
            WasmError::Rejected(msg) => BridgeError::Rejected(msg),
            WasmError::UnknownNode(id) => BridgeError::UnknownNode(id),
            WasmError::UnknownStream(id) => BridgeError::UnknownStream(id),
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}

impl From<wasm_bindgen::JsValue> for WasmError {
    fn from(js_value: wasm_bindgen::JsValue) -> Self {
        WasmError::JavaScript(describe(&js_value).1)
    }
}

impl From<serde_wasm_bindgen::Error> for WasmError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        WasmError::Serialization(err.to_string())
    }
}

/// Exception name (for `DOMException`s and `Error`s) and message.
fn describe(value: &wasm_bindgen::JsValue) -> (Option<String>, String) {
    if let Some(text) = value.as_string() {
        (None, text)
    } else if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        let name: String = error.name().into();
        let message: String = error.message().into();
        (Some(name.clone()), format!("{name}: {message}"))
    } else {
        (None, format!("{:?}", value))
    }
}
