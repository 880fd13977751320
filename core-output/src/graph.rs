//! # Audio Graph Builder
//!
//! Wires `processor -> gain -> analyser -> output` on an engine, where output
//! is either the native destination or the synthetic stream sink depending on
//! [`RoutingMode`]. The stream sink is created in both modes so a direct
//! session can later be rerouted for device selection without rebuilding.

use crate::error::Result;
use crate::format::{FormatDescriptor, ProcessorMessage};
use crate::processor::ProcessorLoader;
use crate::routing::RoutingMode;
use bridge_traits::{AudioEngine, MediaStreamSink, NodeId};
use tracing::{debug, warn};

/// Node the analyser currently feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphOutput {
    Destination,
    StreamSink,
}

/// Handles for every node a session owns.
#[derive(Debug, Clone)]
pub struct AudioGraph {
    processor: NodeId,
    gain: NodeId,
    analyser: NodeId,
    sink: MediaStreamSink,
    destination: NodeId,
    output: GraphOutput,
}

impl AudioGraph {
    /// Register the processor and build the graph for `routing`.
    ///
    /// The format is posted to the processor before anything is connected, so
    /// the first buffer it receives is already interpreted correctly.
    pub async fn build(
        engine: &dyn AudioEngine,
        loader: &ProcessorLoader,
        format: &FormatDescriptor,
        routing: RoutingMode,
    ) -> Result<Self> {
        loader.ensure_loaded(engine).await?;

        let gain = engine.create_gain()?;
        let analyser = engine.create_analyser()?;
        let processor = engine.create_processor_node(&loader.module().name)?;

        let set_format = ProcessorMessage::SetFormat {
            format: format.format,
        };
        engine.post_message(processor, &set_format.to_json()?)?;
        engine.connect(processor, gain)?;

        let sink = engine.create_media_stream_sink()?;
        let destination = engine.destination();

        engine.connect(gain, analyser)?;
        let output = match routing {
            RoutingMode::Relayed => {
                engine.connect(analyser, sink.node)?;
                GraphOutput::StreamSink
            }
            RoutingMode::Direct => {
                engine.connect(analyser, destination)?;
                GraphOutput::Destination
            }
        };

        debug!(%routing, ?output, "Audio graph wired");

        Ok(Self {
            processor,
            gain,
            analyser,
            sink,
            destination,
            output,
        })
    }

    pub fn processor(&self) -> NodeId {
        self.processor
    }

    pub fn gain(&self) -> NodeId {
        self.gain
    }

    pub fn analyser(&self) -> NodeId {
        self.analyser
    }

    pub fn sink(&self) -> &MediaStreamSink {
        &self.sink
    }

    pub fn output(&self) -> GraphOutput {
        self.output
    }

    /// Move the analyser output from the native destination onto the stream
    /// sink. No-op if it already feeds the sink.
    pub fn route_to_stream(&mut self, engine: &dyn AudioEngine) -> Result<()> {
        if self.output == GraphOutput::StreamSink {
            return Ok(());
        }

        engine.disconnect(self.analyser, self.destination)?;
        if let Err(err) = engine.connect(self.analyser, self.sink.node) {
            // Leave the graph audible rather than half-rerouted.
            if let Err(restore_err) = engine.connect(self.analyser, self.destination) {
                warn!(error = %restore_err, "Failed to restore destination after reroute failure");
            }
            return Err(err.into());
        }

        self.output = GraphOutput::StreamSink;
        debug!("Analyser rerouted to stream sink");
        Ok(())
    }

    /// Move the analyser output back onto the native destination. Only used
    /// to undo [`route_to_stream`](Self::route_to_stream) when no element
    /// could be attached to the stream.
    pub fn route_to_destination(&mut self, engine: &dyn AudioEngine) -> Result<()> {
        if self.output == GraphOutput::Destination {
            return Ok(());
        }

        engine.disconnect(self.analyser, self.sink.node)?;
        engine.connect(self.analyser, self.destination)?;
        self.output = GraphOutput::Destination;
        debug!("Analyser restored to native destination");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProcessorModule;
    use crate::format::SampleFormat;
    use crate::mocks::MockEngine;
    use bridge_traits::{error::BridgeError, EngineId, StreamId};
    use parking_lot::Mutex;
    use std::sync::Arc;

    const PROCESSOR: NodeId = NodeId(1);
    const GAIN: NodeId = NodeId(2);
    const ANALYSER: NodeId = NodeId(3);
    const SINK: NodeId = NodeId(4);
    const DESTINATION: NodeId = NodeId(0);

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Post(NodeId, serde_json::Value),
        Connect(NodeId, NodeId),
        Disconnect(NodeId, NodeId),
    }

    type CallLog = Arc<Mutex<Vec<Call>>>;

    /// Engine mock that records graph calls. Connecting `analyser -> sink`
    /// fails when `fail_sink_connect` is set.
    fn recording_engine(log: &CallLog, fail_sink_connect: bool) -> MockEngine {
        let mut engine = MockEngine::new();
        engine.expect_id().return_const(EngineId::new());
        engine
            .expect_add_processor_module()
            .returning(|_| Ok(()));
        engine.expect_create_gain().returning(|| Ok(GAIN));
        engine.expect_create_analyser().returning(|| Ok(ANALYSER));
        engine
            .expect_create_processor_node()
            .withf(|name| name == "audio-concat-processor")
            .returning(|_| Ok(PROCESSOR));
        engine.expect_create_media_stream_sink().returning(|| {
            Ok(MediaStreamSink {
                node: SINK,
                stream: StreamId(1),
            })
        });
        engine.expect_destination().return_const(DESTINATION);

        let posts = Arc::clone(log);
        engine.expect_post_message().returning(move |node, message| {
            posts.lock().push(Call::Post(node, message.clone()));
            Ok(())
        });
        let connects = Arc::clone(log);
        engine.expect_connect().returning(move |from, to| {
            if fail_sink_connect && from == ANALYSER && to == SINK {
                return Err(BridgeError::OperationFailed("InvalidStateError".into()));
            }
            connects.lock().push(Call::Connect(from, to));
            Ok(())
        });
        let disconnects = Arc::clone(log);
        engine.expect_disconnect().returning(move |from, to| {
            disconnects.lock().push(Call::Disconnect(from, to));
            Ok(())
        });
        engine
    }

    fn format() -> FormatDescriptor {
        FormatDescriptor::new(48000, SampleFormat::Pcm)
    }

    async fn build(engine: &MockEngine, routing: RoutingMode) -> Result<AudioGraph> {
        let loader = ProcessorLoader::new(ProcessorModule::default());
        AudioGraph::build(engine, &loader, &format(), routing).await
    }

    #[tokio::test]
    async fn set_format_is_posted_before_wiring() {
        let log = CallLog::default();
        let engine = recording_engine(&log, false);
        build(&engine, RoutingMode::Direct).await.unwrap();

        let calls = log.lock();
        assert_eq!(
            calls[0],
            Call::Post(
                PROCESSOR,
                serde_json::json!({ "type": "setFormat", "format": "pcm" })
            )
        );
        assert_eq!(calls[1], Call::Connect(PROCESSOR, GAIN));
    }

    #[tokio::test]
    async fn direct_graph_ends_at_destination() {
        let log = CallLog::default();
        let engine = recording_engine(&log, false);
        let graph = build(&engine, RoutingMode::Direct).await.unwrap();

        assert_eq!(graph.output(), GraphOutput::Destination);
        let calls = log.lock();
        assert!(calls.contains(&Call::Connect(GAIN, ANALYSER)));
        assert!(calls.contains(&Call::Connect(ANALYSER, DESTINATION)));
        assert!(!calls.contains(&Call::Connect(ANALYSER, SINK)));
    }

    #[tokio::test]
    async fn relayed_graph_never_touches_destination() {
        let log = CallLog::default();
        let engine = recording_engine(&log, false);
        let graph = build(&engine, RoutingMode::Relayed).await.unwrap();

        assert_eq!(graph.output(), GraphOutput::StreamSink);
        let calls = log.lock();
        assert!(calls.contains(&Call::Connect(ANALYSER, SINK)));
        assert!(!calls
            .iter()
            .any(|call| matches!(call, Call::Connect(_, to) if *to == DESTINATION)));
    }

    #[tokio::test]
    async fn wiring_failure_propagates() {
        let mut engine = MockEngine::new();
        engine.expect_id().return_const(EngineId::new());
        engine
            .expect_add_processor_module()
            .returning(|_| Ok(()));
        engine.expect_create_gain().returning(|| Ok(GAIN));
        engine
            .expect_create_analyser()
            .returning(|| Err(BridgeError::NotAvailable("AnalyserNode".into())));

        let result = build(&engine, RoutingMode::Direct).await;
        assert!(matches!(result, Err(crate::OutputError::Bridge(_))));
    }

    #[tokio::test]
    async fn reroute_moves_analyser_onto_sink() {
        let log = CallLog::default();
        let engine = recording_engine(&log, false);
        let mut graph = build(&engine, RoutingMode::Direct).await.unwrap();
        log.lock().clear();

        graph.route_to_stream(&engine).unwrap();
        graph.route_to_stream(&engine).unwrap();

        assert_eq!(graph.output(), GraphOutput::StreamSink);
        assert_eq!(
            *log.lock(),
            vec![
                Call::Disconnect(ANALYSER, DESTINATION),
                Call::Connect(ANALYSER, SINK)
            ]
        );
    }

    #[tokio::test]
    async fn reroute_restores_destination_when_sink_connect_fails() {
        let log = CallLog::default();
        let engine = recording_engine(&log, true);
        let mut graph = build(&engine, RoutingMode::Direct).await.unwrap();
        log.lock().clear();

        assert!(graph.route_to_stream(&engine).is_err());
        assert_eq!(graph.output(), GraphOutput::Destination);
        assert_eq!(
            *log.lock(),
            vec![
                Call::Disconnect(ANALYSER, DESTINATION),
                Call::Connect(ANALYSER, DESTINATION)
            ]
        );
    }

    #[tokio::test]
    async fn route_to_destination_undoes_reroute() {
        let log = CallLog::default();
        let engine = recording_engine(&log, false);
        let mut graph = build(&engine, RoutingMode::Direct).await.unwrap();
        graph.route_to_stream(&engine).unwrap();
        log.lock().clear();

        graph.route_to_destination(&engine).unwrap();

        assert_eq!(graph.output(), GraphOutput::Destination);
        assert_eq!(
            *log.lock(),
            vec![
                Call::Disconnect(ANALYSER, SINK),
                Call::Connect(ANALYSER, DESTINATION)
            ]
        );
    }
}
