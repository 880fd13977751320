//! WebAssembly bindings for core-output
//!
//! Exposes [`OutputSession`] to JavaScript as the `Output` class. Every
//! method that touches the session locks it for its whole duration, so
//! overlapping calls from JS (a duck racing a resume, say) run one after the
//! other in call order.

use crate::{
    FormatDescriptor, OutputBridges, OutputConfig, OutputError, OutputSession, RoutingMode,
    SampleFormat, WatchdogOutcome,
};
use futures::lock::Mutex;
use js_sys::Promise;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

/// Enable Rust logging to browser console
/// Call this once at startup to see tracing logs in DevTools.
///
/// `level` defaults to `"debug"`. When `sink` is given it is also called with
/// every entry at or above that level, device ids already shortened.
#[wasm_bindgen(js_name = enableConsoleLogging)]
pub fn enable_console_logging(
    level: Option<String>,
    sink: Option<js_sys::Function>,
) -> Result<(), JsValue> {
    use bridge_traits::LogLevel;
    use bridge_wasm::JsLoggerSink;
    use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
    use std::sync::Arc;

    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    let level = match level {
        Some(level) => level
            .parse::<LogLevel>()
            .map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => LogLevel::Debug,
    };

    let mut config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(level);
    if let Some(callback) = sink {
        config = config.with_logger_sink(Arc::new(JsLoggerSink::new(callback, level)));
    }

    if init_logging(config).is_ok() {
        web_sys::console::log_1(&"core-output console logging enabled".into());
    }
    Ok(())
}

fn to_js_error(err: OutputError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// JavaScript handle to a live output session.
#[wasm_bindgen(js_name = Output)]
pub struct JsOutput {
    session: Rc<Mutex<OutputSession>>,
    // Mirrors the session's ducking state so `isDucked` can answer
    // synchronously while a transition holds the lock.
    ducked: Rc<Cell<bool>>,
}

#[wasm_bindgen(js_class = Output)]
impl JsOutput {
    /// Create a session.
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Sample rate of the incoming audio in hertz
    /// * `format` - `"pcm"` or `"ulaw"`
    /// * `relayed` - Play through a managed audio element instead of the
    ///   context destination
    /// * `module_url` - Optional URL of the concat processor script
    #[wasm_bindgen(js_name = create)]
    pub async fn create(
        sample_rate: u32,
        format: String,
        relayed: bool,
        module_url: Option<String>,
    ) -> Result<JsOutput, JsValue> {
        let format: SampleFormat = format.parse().map_err(to_js_error)?;

        let mut config = OutputConfig::default();
        if let Some(url) = module_url {
            config = config.with_module_url(url);
        }

        let platform = bridge_wasm::build_audio_bridges()
            .map_err(|e| JsValue::from_str(&format!("Failed to initialize audio bridges: {}", e)))?;
        let bridges = OutputBridges::new(platform.engines, platform.device_binder, config)
            .map_err(to_js_error)?;

        let session = OutputSession::create(
            &bridges,
            FormatDescriptor::new(sample_rate, format),
            RoutingMode::from_relayed_flag(relayed),
        )
        .await
        .map_err(to_js_error)?;

        Ok(JsOutput {
            session: Rc::new(Mutex::new(session)),
            ducked: Rc::new(Cell::new(false)),
        })
    }

    /// Suspend the audio context until `resumeFromDucking` is called.
    #[wasm_bindgen(js_name = suspendForDucking)]
    pub fn suspend_for_ducking(&self) -> Promise {
        let session = Rc::clone(&self.session);
        let ducked = Rc::clone(&self.ducked);
        future_to_promise(async move {
            let mut session = session.lock().await;
            let result = session.suspend_for_ducking().await;
            ducked.set(session.is_ducked());
            result.map_err(to_js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = resumeFromDucking)]
    pub fn resume_from_ducking(&self) -> Promise {
        let session = Rc::clone(&self.session);
        let ducked = Rc::clone(&self.ducked);
        future_to_promise(async move {
            let mut session = session.lock().await;
            let result = session.resume_from_ducking().await;
            ducked.set(session.is_ducked());
            result.map_err(to_js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = isDucked)]
    pub fn is_ducked(&self) -> bool {
        self.ducked.get()
    }

    /// Resolves to `true` if output now plays through `deviceId`.
    #[wasm_bindgen(js_name = setOutputDevice)]
    pub fn set_output_device(&self, device_id: String) -> Promise {
        let session = Rc::clone(&self.session);
        future_to_promise(async move {
            let mut session = session.lock().await;
            let selected = session.set_output_device(&device_id).await;
            Ok(JsValue::from_bool(selected))
        })
    }

    /// Call on every incoming chunk. Resolves to `"notApplicable"`,
    /// `"alreadyPlaying"`, `"restarted"` or `"blocked"`.
    #[wasm_bindgen(js_name = ensureAudioElementPlaying)]
    pub fn ensure_audio_element_playing(&self) -> Promise {
        let session = Rc::clone(&self.session);
        future_to_promise(async move {
            let session = session.lock().await;
            let outcome = match session.ensure_audio_element_playing().await {
                WatchdogOutcome::NotApplicable => "notApplicable",
                WatchdogOutcome::AlreadyPlaying => "alreadyPlaying",
                WatchdogOutcome::Restarted => "restarted",
                WatchdogOutcome::Blocked(_) => "blocked",
            };
            Ok(JsValue::from_str(outcome))
        })
    }

    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, volume: f32) -> Promise {
        let session = Rc::clone(&self.session);
        future_to_promise(async move {
            session
                .lock()
                .await
                .set_volume(volume)
                .map_err(to_js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Queue raw samples (in the session's format) on the processor.
    #[wasm_bindgen(js_name = enqueueSamples)]
    pub fn enqueue_samples(&self, samples: Vec<u8>) -> Promise {
        let session = Rc::clone(&self.session);
        future_to_promise(async move {
            session
                .lock()
                .await
                .enqueue_samples(&samples)
                .map_err(to_js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    pub fn close(&self) -> Promise {
        let session = Rc::clone(&self.session);
        let ducked = Rc::clone(&self.ducked);
        future_to_promise(async move {
            let mut session = session.lock().await;
            ducked.set(false);
            session.close().await.map_err(to_js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }
}

/// Get the output module version
#[wasm_bindgen(js_name = outputVersion)]
pub fn output_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
