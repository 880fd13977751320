//! Stateful fakes for the audio bridges.
//!
//! The fake engine keeps the live edge set, every message posted to nodes,
//! and the state of each playback element it created, so tests can assert on
//! topology and element behaviour after driving a session.

#![allow(dead_code)]

use bridge_traits::{
    error::{BridgeError, Result},
    AudioEngine, AudioEngineFactory, DeviceBinder, DeviceSupport, EngineId, EngineOptions,
    EngineState, MediaStreamSink, NodeId, PlaybackElement, Preload, StreamId,
};
use core_output::{OutputBridges, OutputConfig};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

pub const DESTINATION: NodeId = NodeId(0);

/// Failures the fakes inject on demand.
#[derive(Debug, Clone, Default)]
pub struct Failures {
    pub create_engine: bool,
    pub module_load: bool,
    pub create_element: bool,
    pub resume: bool,
    pub suspend: bool,
    /// `play()` is refused, as under autoplay policy.
    pub block_autoplay: bool,
    /// `setSinkId` is refused.
    pub reject_sink: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Destination,
    Gain,
    Analyser,
    Processor(String),
    StreamSink(StreamId),
}

#[derive(Debug)]
pub struct ElementState {
    pub stream: StreamId,
    pub paused: bool,
    pub volume: f64,
    pub preload: Preload,
    pub sink_id: Option<String>,
    pub play_calls: usize,
    pub pause_calls: usize,
}

pub type SharedElement = Arc<Mutex<ElementState>>;

#[derive(Debug)]
pub struct EngineLog {
    pub id: EngineId,
    pub sample_rate: u32,
    pub state: EngineState,
    pub modules: Vec<String>,
    pub nodes: HashMap<NodeId, NodeKind>,
    pub edges: Vec<(NodeId, NodeId)>,
    pub messages: Vec<(NodeId, serde_json::Value)>,
    pub samples: Vec<(NodeId, Vec<u8>)>,
    pub gains: Vec<(NodeId, f32)>,
    pub elements: Vec<SharedElement>,
    pub suspend_calls: usize,
    pub resume_calls: usize,
    pub close_calls: usize,
    next_node: u32,
    next_stream: u32,
}

impl EngineLog {
    fn new(sample_rate: u32) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(DESTINATION, NodeKind::Destination);
        Self {
            id: EngineId::new(),
            sample_rate,
            state: EngineState::Suspended,
            modules: Vec::new(),
            nodes,
            edges: Vec::new(),
            messages: Vec::new(),
            samples: Vec::new(),
            gains: Vec::new(),
            elements: Vec::new(),
            suspend_calls: 0,
            resume_calls: 0,
            close_calls: 0,
            next_node: 1,
            next_stream: 1,
        }
    }

    fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(id, kind);
        id
    }

    /// First node matching `predicate`.
    pub fn find(&self, predicate: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
        let mut ids: Vec<_> = self
            .nodes
            .iter()
            .filter(|(_, kind)| predicate(kind))
            .map(|(id, _)| *id)
            .collect();
        ids.sort_by_key(|id| id.0);
        ids.first().copied()
    }

    pub fn node(&self, kind: &NodeKind) -> Option<NodeId> {
        self.find(|k| k == kind)
    }

    pub fn stream_sink(&self) -> Option<NodeId> {
        self.find(|k| matches!(k, NodeKind::StreamSink(_)))
    }

    pub fn processor(&self) -> Option<NodeId> {
        self.find(|k| matches!(k, NodeKind::Processor(_)))
    }

    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.edges.contains(&(from, to))
    }

    /// Whether anything is connected into the native destination.
    pub fn feeds_destination(&self) -> bool {
        self.edges.iter().any(|(_, to)| *to == DESTINATION)
    }

    pub fn edges_by_kind(&self) -> Vec<(NodeKind, NodeKind)> {
        self.edges
            .iter()
            .map(|(from, to)| (self.nodes[from].clone(), self.nodes[to].clone()))
            .collect()
    }
}

pub type SharedLog = Arc<Mutex<EngineLog>>;

/// Hands out [`FakeEngine`]s and remembers each one's log.
#[derive(Clone, Default)]
pub struct FakeEngineFactory {
    pub failures: Arc<Mutex<Failures>>,
    engines: Arc<Mutex<Vec<SharedLog>>>,
}

impl FakeEngineFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failures(failures: Failures) -> Self {
        Self {
            failures: Arc::new(Mutex::new(failures)),
            engines: Arc::default(),
        }
    }

    pub fn engine_count(&self) -> usize {
        self.engines.lock().len()
    }

    /// Log of the most recently created engine.
    pub fn last(&self) -> SharedLog {
        let engines = self.engines.lock();
        Arc::clone(engines.last().expect("no engine created"))
    }

    pub fn set_failures(&self, update: impl FnOnce(&mut Failures)) {
        update(&mut self.failures.lock());
    }
}

#[async_trait::async_trait]
impl AudioEngineFactory for FakeEngineFactory {
    async fn create_engine(&self, options: EngineOptions) -> Result<Box<dyn AudioEngine>> {
        if self.failures.lock().create_engine {
            return Err(BridgeError::NotAvailable("AudioContext".to_string()));
        }

        let log = EngineLog::new(options.sample_rate);
        let id = log.id;
        let log = Arc::new(Mutex::new(log));
        self.engines.lock().push(Arc::clone(&log));
        Ok(Box::new(FakeEngine {
            id,
            log,
            failures: Arc::clone(&self.failures),
        }))
    }
}

pub struct FakeEngine {
    id: EngineId,
    log: SharedLog,
    failures: Arc<Mutex<Failures>>,
}

impl FakeEngine {
    fn ensure_node(&self, log: &EngineLog, node: NodeId) -> Result<()> {
        if log.nodes.contains_key(&node) {
            Ok(())
        } else {
            Err(BridgeError::UnknownNode(node.0))
        }
    }
}

#[async_trait::async_trait]
impl AudioEngine for FakeEngine {
    fn id(&self) -> EngineId {
        self.id
    }

    fn sample_rate(&self) -> u32 {
        self.log.lock().sample_rate
    }

    fn state(&self) -> EngineState {
        self.log.lock().state
    }

    async fn add_processor_module(&self, module_url: &str) -> Result<()> {
        if self.failures.lock().module_load {
            return Err(BridgeError::OperationFailed(format!(
                "AbortError: failed to load {}",
                module_url
            )));
        }
        self.log.lock().modules.push(module_url.to_string());
        Ok(())
    }

    fn create_gain(&self) -> Result<NodeId> {
        Ok(self.log.lock().add_node(NodeKind::Gain))
    }

    fn create_analyser(&self) -> Result<NodeId> {
        Ok(self.log.lock().add_node(NodeKind::Analyser))
    }

    fn create_processor_node(&self, processor_name: &str) -> Result<NodeId> {
        let mut log = self.log.lock();
        if log.modules.is_empty() {
            return Err(BridgeError::OperationFailed(format!(
                "InvalidStateError: {} is not registered",
                processor_name
            )));
        }
        Ok(log.add_node(NodeKind::Processor(processor_name.to_string())))
    }

    fn create_media_stream_sink(&self) -> Result<MediaStreamSink> {
        let mut log = self.log.lock();
        let stream = StreamId(log.next_stream);
        log.next_stream += 1;
        let node = log.add_node(NodeKind::StreamSink(stream));
        Ok(MediaStreamSink { node, stream })
    }

    fn destination(&self) -> NodeId {
        DESTINATION
    }

    fn connect(&self, from: NodeId, to: NodeId) -> Result<()> {
        let mut log = self.log.lock();
        self.ensure_node(&log, from)?;
        self.ensure_node(&log, to)?;
        if !log.has_edge(from, to) {
            log.edges.push((from, to));
        }
        Ok(())
    }

    fn disconnect(&self, from: NodeId, to: NodeId) -> Result<()> {
        let mut log = self.log.lock();
        let before = log.edges.len();
        log.edges.retain(|edge| *edge != (from, to));
        if log.edges.len() == before {
            return Err(BridgeError::OperationFailed(
                "InvalidAccessError: nodes are not connected".to_string(),
            ));
        }
        Ok(())
    }

    fn set_gain(&self, node: NodeId, value: f32) -> Result<()> {
        let mut log = self.log.lock();
        self.ensure_node(&log, node)?;
        log.gains.push((node, value));
        Ok(())
    }

    fn post_message(&self, node: NodeId, message: &serde_json::Value) -> Result<()> {
        let mut log = self.log.lock();
        self.ensure_node(&log, node)?;
        log.messages.push((node, message.clone()));
        Ok(())
    }

    fn post_samples(&self, node: NodeId, samples: &[u8]) -> Result<()> {
        let mut log = self.log.lock();
        self.ensure_node(&log, node)?;
        log.samples.push((node, samples.to_vec()));
        Ok(())
    }

    fn create_playback_element(&self, stream: StreamId) -> Result<Box<dyn PlaybackElement>> {
        if self.failures.lock().create_element {
            return Err(BridgeError::NotAvailable("HTMLAudioElement".to_string()));
        }

        let state = Arc::new(Mutex::new(ElementState {
            stream,
            paused: true,
            volume: 0.0,
            preload: Preload::Auto,
            sink_id: None,
            play_calls: 0,
            pause_calls: 0,
        }));
        self.log.lock().elements.push(Arc::clone(&state));
        Ok(Box::new(FakeElement {
            state,
            failures: Arc::clone(&self.failures),
        }))
    }

    async fn resume(&self) -> Result<()> {
        if self.failures.lock().resume {
            return Err(BridgeError::OperationFailed(
                "InvalidStateError: cannot resume".to_string(),
            ));
        }
        let mut log = self.log.lock();
        log.resume_calls += 1;
        log.state = EngineState::Running;
        Ok(())
    }

    async fn suspend(&self) -> Result<()> {
        if self.failures.lock().suspend {
            return Err(BridgeError::OperationFailed(
                "InvalidStateError: cannot suspend".to_string(),
            ));
        }
        let mut log = self.log.lock();
        log.suspend_calls += 1;
        log.state = EngineState::Suspended;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut log = self.log.lock();
        log.close_calls += 1;
        log.state = EngineState::Closed;
        Ok(())
    }
}

pub struct FakeElement {
    state: SharedElement,
    failures: Arc<Mutex<Failures>>,
}

#[async_trait::async_trait]
impl PlaybackElement for FakeElement {
    async fn play(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.play_calls += 1;
        if self.failures.lock().block_autoplay {
            return Err(BridgeError::Rejected(
                "NotAllowedError: play() failed because the user didn't interact".to_string(),
            ));
        }
        state.paused = false;
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.pause_calls += 1;
        state.paused = true;
        Ok(())
    }

    fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    fn set_volume(&self, volume: f64) {
        self.state.lock().volume = volume;
    }

    fn set_preload(&self, preload: Preload) {
        self.state.lock().preload = preload;
    }

    async fn set_sink_id(&self, device_id: &str) -> Result<()> {
        if self.failures.lock().reject_sink {
            return Err(BridgeError::Rejected(format!(
                "NotFoundError: unknown device {}",
                device_id
            )));
        }
        self.state.lock().sink_id = Some(device_id.to_string());
        Ok(())
    }
}

/// Device binder with a fixed capability answer.
pub struct FakeDeviceBinder {
    pub support: DeviceSupport,
}

impl DeviceBinder for FakeDeviceBinder {
    fn support(&self) -> DeviceSupport {
        self.support
    }
}

pub fn bridges(factory: &FakeEngineFactory, support: DeviceSupport) -> OutputBridges {
    OutputBridges::new(
        Arc::new(factory.clone()),
        Arc::new(FakeDeviceBinder { support }),
        OutputConfig::default(),
    )
    .expect("default config is valid")
}
