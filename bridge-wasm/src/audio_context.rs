//! Web Audio implementation of the `AudioEngine` bridge trait.
//!
//! Each [`WebAudioEngine`] owns one `AudioContext`. Nodes created through the
//! trait are kept in a per-context registry and handed out as [`NodeId`]s
//! (their index in the registry). Index 0 is always the context destination.

use crate::audio_element::HtmlPlaybackElement;
use crate::error::{WasmError, WasmResult};
use async_trait::async_trait;
use bridge_traits::{
    error::Result as BridgeResult, AudioEngine, AudioEngineFactory, EngineId, EngineOptions,
    EngineState, MediaStreamSink, NodeId, PlaybackElement, StreamId,
};
use js_sys::{Object, Reflect, Uint8Array};
use serde::Serialize;
use std::cell::RefCell;
use tracing::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AnalyserNode, AudioContext, AudioContextOptions, AudioContextState, AudioDestinationNode,
    AudioNode, AudioWorkletNode, GainNode, MediaStream, MediaStreamAudioDestinationNode,
};

enum WebNode {
    Destination(AudioDestinationNode),
    Gain(GainNode),
    Analyser(AnalyserNode),
    Worklet(AudioWorkletNode),
    StreamSink(MediaStreamAudioDestinationNode),
}

impl WebNode {
    fn audio_node(&self) -> &AudioNode {
        match self {
            WebNode::Destination(node) => node.unchecked_ref(),
            WebNode::Gain(node) => node.unchecked_ref(),
            WebNode::Analyser(node) => node.unchecked_ref(),
            WebNode::Worklet(node) => node.unchecked_ref(),
            WebNode::StreamSink(node) => node.unchecked_ref(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            WebNode::Destination(_) => "destination",
            WebNode::Gain(_) => "gain",
            WebNode::Analyser(_) => "analyser",
            WebNode::Worklet(_) => "worklet",
            WebNode::StreamSink(_) => "stream-sink",
        }
    }
}

/// `AudioEngine` backed by a browser `AudioContext`.
pub struct WebAudioEngine {
    id: EngineId,
    sample_rate: u32,
    context: AudioContext,
    nodes: RefCell<Vec<WebNode>>,
    streams: RefCell<Vec<MediaStream>>,
}

impl WebAudioEngine {
    /// Create a new context running at `sample_rate`.
    pub fn new(sample_rate: u32) -> WasmResult<Self> {
        let options = AudioContextOptions::new();
        options.set_sample_rate(sample_rate as f32);
        let context = AudioContext::new_with_context_options(&options)
            .map_err(|err| WasmError::from_js("create AudioContext", err))?;

        let destination = WebNode::Destination(context.destination());
        let engine = Self {
            id: EngineId::new(),
            sample_rate,
            context,
            nodes: RefCell::new(vec![destination]),
            streams: RefCell::new(Vec::new()),
        };
        debug!(engine_id = %engine.id, sample_rate, "AudioContext created");
        Ok(engine)
    }

    /// The underlying context, for hosts that need direct access.
    pub fn context(&self) -> &AudioContext {
        &self.context
    }

    fn register(&self, node: WebNode) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(node);
        NodeId((nodes.len() - 1) as u32)
    }

    fn with_node<R>(
        &self,
        id: NodeId,
        f: impl FnOnce(&WebNode) -> WasmResult<R>,
    ) -> WasmResult<R> {
        let nodes = self.nodes.borrow();
        let node = nodes
            .get(id.0 as usize)
            .ok_or(WasmError::UnknownNode(id.0))?;
        f(node)
    }

    fn with_edge(
        &self,
        from: NodeId,
        to: NodeId,
        f: impl FnOnce(&AudioNode, &AudioNode) -> WasmResult<()>,
    ) -> WasmResult<()> {
        let nodes = self.nodes.borrow();
        let source = nodes
            .get(from.0 as usize)
            .ok_or(WasmError::UnknownNode(from.0))?;
        let target = nodes
            .get(to.0 as usize)
            .ok_or(WasmError::UnknownNode(to.0))?;
        f(source.audio_node(), target.audio_node())
    }

    fn worklet_port(&self, id: NodeId) -> WasmResult<web_sys::MessagePort> {
        self.with_node(id, |node| match node {
            WebNode::Worklet(worklet) => worklet
                .port()
                .map_err(|err| WasmError::from_js("worklet port", err)),
            other => Err(WasmError::JavaScript(format!(
                "{} has no message port (node is {})",
                id,
                other.kind()
            ))),
        })
    }

    async fn transition(
        &self,
        name: &str,
        promise: Result<js_sys::Promise, JsValue>,
    ) -> WasmResult<()> {
        let promise = promise.map_err(|err| WasmError::from_js(name, err))?;
        JsFuture::from(promise)
            .await
            .map_err(|err| WasmError::from_js(name, err))?;
        debug!(engine_id = %self.id, state = ?self.state(), "AudioContext {}", name);
        Ok(())
    }
}

#[async_trait(?Send)]
impl AudioEngine for WebAudioEngine {
    fn id(&self) -> EngineId {
        self.id
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn state(&self) -> EngineState {
        match self.context.state() {
            AudioContextState::Running => EngineState::Running,
            AudioContextState::Closed => EngineState::Closed,
            _ => EngineState::Suspended,
        }
    }

    async fn add_processor_module(&self, module_url: &str) -> BridgeResult<()> {
        let worklet = self
            .context
            .audio_worklet()
            .map_err(|err| WasmError::from_js("audioWorklet", err))?;
        let promise = worklet
            .add_module(module_url)
            .map_err(|err| WasmError::from_js("addModule", err))?;
        JsFuture::from(promise)
            .await
            .map_err(|err| WasmError::from_js("addModule", err))?;
        debug!(engine_id = %self.id, module_url, "Worklet module added");
        Ok(())
    }

    fn create_gain(&self) -> BridgeResult<NodeId> {
        let gain = self
            .context
            .create_gain()
            .map_err(|err| WasmError::from_js("createGain", err))?;
        Ok(self.register(WebNode::Gain(gain)))
    }

    fn create_analyser(&self) -> BridgeResult<NodeId> {
        let analyser = self
            .context
            .create_analyser()
            .map_err(|err| WasmError::from_js("createAnalyser", err))?;
        Ok(self.register(WebNode::Analyser(analyser)))
    }

    fn create_processor_node(&self, processor_name: &str) -> BridgeResult<NodeId> {
        let worklet = AudioWorkletNode::new(&self.context, processor_name)
            .map_err(|err| WasmError::from_js("AudioWorkletNode", err))?;
        Ok(self.register(WebNode::Worklet(worklet)))
    }

    fn create_media_stream_sink(&self) -> BridgeResult<MediaStreamSink> {
        let sink = self
            .context
            .create_media_stream_destination()
            .map_err(|err| WasmError::from_js("createMediaStreamDestination", err))?;

        let stream = {
            let mut streams = self.streams.borrow_mut();
            streams.push(sink.stream());
            StreamId((streams.len() - 1) as u32)
        };
        let node = self.register(WebNode::StreamSink(sink));
        Ok(MediaStreamSink { node, stream })
    }

    fn destination(&self) -> NodeId {
        NodeId(0)
    }

    fn connect(&self, from: NodeId, to: NodeId) -> BridgeResult<()> {
        self.with_edge(from, to, |source, target| {
            source
                .connect_with_audio_node(target)
                .map(|_| ())
                .map_err(|err| WasmError::from_js("connect", err))
        })?;
        Ok(())
    }

    fn disconnect(&self, from: NodeId, to: NodeId) -> BridgeResult<()> {
        self.with_edge(from, to, |source, target| {
            source
                .disconnect_with_audio_node(target)
                .map_err(|err| WasmError::from_js("disconnect", err))
        })?;
        Ok(())
    }

    fn set_gain(&self, node: NodeId, value: f32) -> BridgeResult<()> {
        self.with_node(node, |web_node| match web_node {
            WebNode::Gain(gain) => {
                gain.gain().set_value(value);
                Ok(())
            }
            other => Err(WasmError::JavaScript(format!(
                "{} is not a gain node (node is {})",
                node,
                other.kind()
            ))),
        })?;
        Ok(())
    }

    fn post_message(&self, node: NodeId, message: &serde_json::Value) -> BridgeResult<()> {
        let port = self.worklet_port(node)?;
        let value = message
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(WasmError::from)?;
        port.post_message(&value)
            .map_err(|err| WasmError::from_js("postMessage", err))?;
        Ok(())
    }

    fn post_samples(&self, node: NodeId, samples: &[u8]) -> BridgeResult<()> {
        let port = self.worklet_port(node)?;

        let buffer = Uint8Array::from(samples).buffer();
        let payload = Object::new();
        Reflect::set(&payload, &JsValue::from_str("type"), &JsValue::from_str("buffer"))
            .map_err(|err| WasmError::from_js("build buffer message", err))?;
        Reflect::set(&payload, &JsValue::from_str("buffer"), &buffer)
            .map_err(|err| WasmError::from_js("build buffer message", err))?;

        port.post_message(&payload)
            .map_err(|err| WasmError::from_js("postMessage", err))?;
        Ok(())
    }

    fn create_playback_element(&self, stream: StreamId) -> BridgeResult<Box<dyn PlaybackElement>> {
        let streams = self.streams.borrow();
        let media_stream = streams
            .get(stream.0 as usize)
            .ok_or(WasmError::UnknownStream(stream.0))?;
        let element = HtmlPlaybackElement::new(media_stream)?;
        Ok(Box::new(element))
    }

    async fn resume(&self) -> BridgeResult<()> {
        self.transition("resume", self.context.resume()).await?;
        Ok(())
    }

    async fn suspend(&self) -> BridgeResult<()> {
        self.transition("suspend", self.context.suspend()).await?;
        Ok(())
    }

    async fn close(&self) -> BridgeResult<()> {
        if self.context.state() == AudioContextState::Closed {
            return Ok(());
        }
        self.transition("close", self.context.close()).await?;
        Ok(())
    }
}

impl Drop for WebAudioEngine {
    fn drop(&mut self) {
        if self.context.state() != AudioContextState::Closed {
            warn!(engine_id = %self.id, "AudioContext dropped without close, closing");
            let _ = self.context.close();
        }
    }
}

/// Creates one [`WebAudioEngine`] per session.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebAudioEngineFactory;

impl WebAudioEngineFactory {
    /// Create a new factory.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl AudioEngineFactory for WebAudioEngineFactory {
    async fn create_engine(&self, options: EngineOptions) -> BridgeResult<Box<dyn AudioEngine>> {
        let engine = WebAudioEngine::new(options.sample_rate)?;
        Ok(Box::new(engine))
    }
}
