//! Forwarding core log entries to a JavaScript callback.

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    logging::{LogEntry, LogLevel, LoggerSink},
};
use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::JsValue;

use crate::error::WasmError;

/// `LoggerSink` calling a host function once per entry.
///
/// The callback receives a plain object:
/// `{ level, timestamp, target, message, fields, span }`, with `fields` as
/// an object of strings.
#[derive(Debug, Clone)]
pub struct JsLoggerSink {
    callback: Function,
    min_level: LogLevel,
}

impl JsLoggerSink {
    /// Wrap `callback`, dropping entries below `min_level`.
    pub fn new(callback: Function, min_level: LogLevel) -> Self {
        Self {
            callback,
            min_level,
        }
    }
}

#[async_trait(?Send)]
impl LoggerSink for JsLoggerSink {
    async fn log(&self, entry: LogEntry) -> Result<()> {
        let value = entry
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(WasmError::from)?;
        self.callback
            .call1(&JsValue::NULL, &value)
            .map_err(|e| WasmError::from_js("log callback", e))?;
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}
