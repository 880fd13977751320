//! `mockall` doubles for the bridge traits, shared by unit tests.

use bridge_traits::{
    error::Result, AudioEngine, EngineId, EngineState, MediaStreamSink, NodeId, PlaybackElement,
    Preload, StreamId,
};
use mockall::mock;

mock! {
    pub Engine {}

    #[async_trait::async_trait]
    impl AudioEngine for Engine {
        fn id(&self) -> EngineId;
        fn sample_rate(&self) -> u32;
        fn state(&self) -> EngineState;
        async fn add_processor_module(&self, module_url: &str) -> Result<()>;
        fn create_gain(&self) -> Result<NodeId>;
        fn create_analyser(&self) -> Result<NodeId>;
        fn create_processor_node(&self, processor_name: &str) -> Result<NodeId>;
        fn create_media_stream_sink(&self) -> Result<MediaStreamSink>;
        fn destination(&self) -> NodeId;
        fn connect(&self, from: NodeId, to: NodeId) -> Result<()>;
        fn disconnect(&self, from: NodeId, to: NodeId) -> Result<()>;
        fn set_gain(&self, node: NodeId, value: f32) -> Result<()>;
        fn post_message(&self, node: NodeId, message: &serde_json::Value) -> Result<()>;
        fn post_samples(&self, node: NodeId, samples: &[u8]) -> Result<()>;
        fn create_playback_element(&self, stream: StreamId) -> Result<Box<dyn PlaybackElement>>;
        async fn resume(&self) -> Result<()>;
        async fn suspend(&self) -> Result<()>;
        async fn close(&self) -> Result<()>;
    }
}

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
