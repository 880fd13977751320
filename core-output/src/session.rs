//! # Output Session
//!
//! The live output unit: one audio engine, the graph wired into it, the
//! optional relay element, and the ducking state.
//!
//! ## Lifecycle
//!
//! ```text
//! create ──► Active ◄──► Ducked
//!              │           │
//!              └─► close ◄─┘ ──► Closed (every operation is a no-op)
//! ```
//!
//! Operations that change state take `&mut self`, so the borrow checker
//! rules out two transitions in flight on the same session. Hosts that share
//! a session across tasks wrap it in an async mutex (see the wasm binding).

use crate::config::OutputConfig;
use crate::device::DeviceSelector;
use crate::ducking::{DuckState, DuckingController};
use crate::error::{OutputError, Result};
use crate::format::FormatDescriptor;
use crate::graph::AudioGraph;
use crate::processor::ProcessorLoader;
use crate::routing::{RelayOutput, RoutingMode};
use crate::watchdog::{self, WatchdogOutcome};
use bridge_traits::{
    AudioEngine, AudioEngineFactory, DeviceBinder, EngineId, EngineOptions, EngineState, NodeId,
};
use core_runtime::logging::redact_device_id;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Platform capabilities and configuration shared by every session a host
/// creates.
///
/// The processor loader lives here so its per-engine bookkeeping is shared
/// across sessions created from the same bridges.
#[derive(Clone)]
pub struct OutputBridges {
    pub engines: Arc<dyn AudioEngineFactory>,
    pub device_binder: Arc<dyn DeviceBinder>,
    pub loader: Arc<ProcessorLoader>,
    pub config: OutputConfig,
}

impl OutputBridges {
    /// Validate `config` and assemble the bridges.
    ///
    /// # Errors
    ///
    /// - `OutputError::Config` - the configuration failed validation
    pub fn new(
        engines: Arc<dyn AudioEngineFactory>,
        device_binder: Arc<dyn DeviceBinder>,
        config: OutputConfig,
    ) -> Result<Self> {
        config.validate()?;
        let loader = Arc::new(ProcessorLoader::new(config.processor.clone()));

        Ok(Self {
            engines,
            device_binder,
            loader,
            config,
        })
    }
}

impl fmt::Debug for OutputBridges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputBridges")
            .field("engines", &"AudioEngineFactory { ... }")
            .field("device_binder", &self.device_binder.support())
            .field("loader", &self.loader)
            .field("config", &self.config)
            .finish()
    }
}

/// A fully wired audio output.
pub struct OutputSession {
    engine: Box<dyn AudioEngine>,
    engine_id: EngineId,
    graph: AudioGraph,
    relay: RelayOutput,
    ducking: DuckingController,
    devices: DeviceSelector,
    loader: Arc<ProcessorLoader>,
    format: FormatDescriptor,
    closed: bool,
}

impl OutputSession {
    /// Allocate an engine and wire a complete output graph for `format`.
    ///
    /// This method:
    /// 1. Validates the format descriptor
    /// 2. Creates an engine at the requested sample rate
    /// 3. Registers the concat processor and builds the graph
    /// 4. In relayed mode, attaches and starts the relay element
    /// 5. Resumes the engine
    ///
    /// A blocked relay start is not an error; the watchdog retries it.
    ///
    /// # Arguments
    ///
    /// * `bridges` - Platform capabilities and configuration
    /// * `format` - Sample rate and encoding of the audio to be played
    /// * `routing` - Direct to the native destination, or relayed
    ///
    /// # Errors
    ///
    /// - `OutputError::InvalidFormat` - zero sample rate
    /// - `OutputError::ProcessorLoad` - the processor module could not be registered
    /// - `OutputError::Bridge` - the engine or graph could not be created
    ///
    /// Any failure after the engine exists releases the engine before the
    /// error is returned.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let format = FormatDescriptor::new(48000, SampleFormat::Pcm);
    /// let mut session =
    ///     OutputSession::create(&bridges, format, RoutingMode::from_relayed_flag(true)).await?;
    /// session.enqueue_samples(&chunk)?;
    /// session.close().await?;
    /// ```
    #[instrument(
        skip(bridges, format, routing),
        fields(sample_rate = format.sample_rate, format = %format.format, routing = %routing)
    )]
    pub async fn create(
        bridges: &OutputBridges,
        format: FormatDescriptor,
        routing: RoutingMode,
    ) -> Result<Self> {
        format.validate()?;

        let engine = bridges
            .engines
            .create_engine(EngineOptions::new(format.sample_rate))
            .await?;
        let engine_id = engine.id();
        debug!(%engine_id, "Audio engine created");

        let mut relay = RelayOutput::new(routing, bridges.config.relay);
        let graph = match wire(&*engine, &bridges.loader, &format, &mut relay).await {
            Ok(graph) => graph,
            Err(err) => {
                warn!(%engine_id, error = %err, "Output session setup failed, releasing engine");
                relay.stop();
                bridges.loader.forget(engine_id);
                if let Err(close_err) = engine.close().await {
                    warn!(%engine_id, error = %close_err, "Failed to close engine after setup failure");
                }
                return Err(err);
            }
        };

        info!(%engine_id, "Output session created");

        Ok(Self {
            engine,
            engine_id,
            graph,
            relay,
            ducking: DuckingController::new(),
            devices: DeviceSelector::new(Arc::clone(&bridges.device_binder)),
            loader: Arc::clone(&bridges.loader),
            format,
            closed: false,
        })
    }

    /// Suspend the engine while no speech is playing. No-op if already
    /// ducked, if the engine is not running, or after close.
    ///
    /// # Errors
    ///
    /// - `OutputError::Bridge` - the host failed to suspend; the session stays active
    pub async fn suspend_for_ducking(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.ducking.suspend(&*self.engine).await?;
        Ok(())
    }

    /// Resume an engine suspended by [`suspend_for_ducking`](Self::suspend_for_ducking).
    /// No-op if not ducked or after close.
    ///
    /// # Errors
    ///
    /// - `OutputError::Bridge` - the host failed to resume; the session stays ducked
    pub async fn resume_from_ducking(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.ducking.resume(&*self.engine).await?;
        Ok(())
    }

    pub fn is_ducked(&self) -> bool {
        self.ducking.is_ducked()
    }

    /// `Active` once the session is closed, whatever it was before.
    pub fn duck_state(&self) -> DuckState {
        self.ducking.state()
    }

    /// Route output to a specific physical device.
    ///
    /// Returns `true` only if the host bound output to `device_id`. Relayed
    /// sessions, hosts without device selection, rejected devices and closed
    /// sessions all yield `false`.
    ///
    /// The first successful call on a direct session moves output onto a
    /// playback element, which then stays for the session's lifetime. If the
    /// host blocks that element's first start, output stays silent and
    /// [`ensure_audio_element_playing`](Self::ensure_audio_element_playing)
    /// does not help (it only serves relayed sessions). Call this again from
    /// a user gesture; a repeated call restarts the paused element.
    #[instrument(skip(self, device_id), fields(device_id = %redact_device_id(device_id)))]
    pub async fn set_output_device(&mut self, device_id: &str) -> bool {
        if self.closed {
            debug!("Device selection on closed session ignored");
            return false;
        }
        self.devices
            .select(&*self.engine, &mut self.graph, &mut self.relay, device_id)
            .await
    }

    /// Restart the relay element if the host paused or blocked it. Call on
    /// every incoming chunk.
    pub async fn ensure_audio_element_playing(&self) -> WatchdogOutcome {
        if self.closed {
            return WatchdogOutcome::NotApplicable;
        }
        watchdog::ensure_playing(&self.relay).await
    }

    /// Set the output gain.
    ///
    /// # Errors
    ///
    /// - `OutputError::InvalidVolume` - `volume` outside `0.0..=1.0`
    /// - `OutputError::Bridge` - the host rejected the value
    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(OutputError::InvalidVolume(volume));
        }
        if self.closed {
            return Ok(());
        }
        self.engine.set_gain(self.graph.gain(), volume)?;
        debug!(volume, "Output volume set");
        Ok(())
    }

    /// Queue a raw buffer in the session's sample format on the processor.
    pub fn enqueue_samples(&self, samples: &[u8]) -> Result<()> {
        if self.closed || samples.is_empty() {
            return Ok(());
        }
        self.engine.post_samples(self.graph.processor(), samples)?;
        Ok(())
    }

    /// Release every resource the session owns. Idempotent.
    ///
    /// The session counts as closed even if the host fails to close the
    /// engine; the error is still returned.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        self.ducking.reset();
        self.relay.stop();
        self.loader.forget(self.engine_id);
        self.engine.close().await?;

        info!(engine_id = %self.engine_id, "Output session closed");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn routing(&self) -> RoutingMode {
        self.relay.mode()
    }

    pub fn format(&self) -> &FormatDescriptor {
        &self.format
    }

    pub fn engine_id(&self) -> EngineId {
        self.engine_id
    }

    pub fn engine_state(&self) -> EngineState {
        self.engine.state()
    }

    pub fn gain(&self) -> NodeId {
        self.graph.gain()
    }

    pub fn analyser(&self) -> NodeId {
        self.graph.analyser()
    }

    pub fn has_playback_element(&self) -> bool {
        self.relay.has_element()
    }
}

impl fmt::Debug for OutputSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSession")
            .field("engine_id", &self.engine_id)
            .field("graph", &self.graph)
            .field("relay", &self.relay)
            .field("ducking", &self.ducking)
            .field("format", &self.format)
            .field("closed", &self.closed)
            .finish()
    }
}

/// Build the graph, attach the relay element when relayed, and start the
/// engine.
async fn wire(
    engine: &dyn AudioEngine,
    loader: &ProcessorLoader,
    format: &FormatDescriptor,
    relay: &mut RelayOutput,
) -> Result<AudioGraph> {
    let graph = AudioGraph::build(engine, loader, format, relay.mode()).await?;

    if relay.mode().is_relayed() {
        relay.attach(engine, graph.sink()).await?;
    }

    engine.resume().await?;
    Ok(graph)
}
