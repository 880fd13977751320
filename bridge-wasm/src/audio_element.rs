//! `HTMLAudioElement` implementation of the `PlaybackElement` bridge trait.

use crate::error::{WasmError, WasmResult};
use async_trait::async_trait;
use bridge_traits::{error::Result as BridgeResult, PlaybackElement, Preload};
use js_sys::{Function, Promise, Reflect};
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlAudioElement, MediaStream};

/// An audio element playing a `MediaStream`.
///
/// The element is never attached to the document. Dropping it detaches the
/// stream so the browser can release the element.
pub struct HtmlPlaybackElement {
    element: HtmlAudioElement,
}

impl HtmlPlaybackElement {
    /// Create an element whose source is `stream`.
    pub fn new(stream: &MediaStream) -> WasmResult<Self> {
        let element =
            HtmlAudioElement::new().map_err(|err| WasmError::from_js("create audio element", err))?;
        element.set_src_object(Some(stream));
        Ok(Self { element })
    }

    /// The underlying element.
    pub fn element(&self) -> &HtmlAudioElement {
        &self.element
    }
}

#[async_trait(?Send)]
impl PlaybackElement for HtmlPlaybackElement {
    async fn play(&self) -> BridgeResult<()> {
        let promise = self
            .element
            .play()
            .map_err(|err| WasmError::from_js("play", err))?;
        JsFuture::from(promise)
            .await
            .map_err(|err| WasmError::from_js("play", err))?;
        Ok(())
    }

    fn pause(&self) -> BridgeResult<()> {
        self.element
            .pause()
            .map_err(|err| WasmError::from_js("pause", err))?;
        Ok(())
    }

    fn is_paused(&self) -> bool {
        self.element.paused()
    }

    fn set_volume(&self, volume: f64) {
        self.element.set_volume(volume);
    }

    fn set_preload(&self, preload: Preload) {
        self.element.set_preload(preload.as_str());
    }

    async fn set_sink_id(&self, device_id: &str) -> BridgeResult<()> {
        // setSinkId is not in every browser's typings; call it reflectively.
        let target: &JsValue = self.element.as_ref();
        let method = Reflect::get(target, &JsValue::from_str("setSinkId"))
            .map_err(|err| WasmError::from_js("setSinkId lookup", err))?;
        let set_sink_id: Function = method
            .dyn_into()
            .map_err(|_| WasmError::NotAvailable("HTMLMediaElement.setSinkId".to_string()))?;

        let promise: Promise = set_sink_id
            .call1(target, &JsValue::from_str(device_id))
            .map_err(|err| WasmError::from_js("setSinkId", err))?
            .dyn_into()
            .map_err(|_| WasmError::JavaScript("setSinkId did not return a promise".to_string()))?;
        JsFuture::from(promise)
            .await
            .map_err(|err| WasmError::from_js("setSinkId", err))?;

        debug!("Audio element sink updated");
        Ok(())
    }
}

impl Drop for HtmlPlaybackElement {
    fn drop(&mut self) {
        let _ = self.element.pause();
        self.element.set_src_object(None);
    }
}
