//! # Device Selection
//!
//! Best-effort redirection of output to a specific physical device. Only a
//! playback element can be bound to a device, so a direct session grows one
//! on first use: the analyser is moved onto the stream sink and an element
//! is attached to it. That conversion is one-way for the session's lifetime.
//!
//! Selecting again on a direct session restarts that element if the host
//! paused it or blocked its first start.
//!
//! Relayed sessions refuse device selection. Their element exists to keep the
//! engine off the shared default sink and must not be moved.

use crate::graph::AudioGraph;
use crate::routing::{self, RelayOutput, StartOutcome};
use bridge_traits::{AudioEngine, DeviceBinder, DeviceSupport, SinkBinding};
use core_runtime::logging::redact_device_id;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Applies device ids to a session's playback element.
#[derive(Clone)]
pub struct DeviceSelector {
    binder: Arc<dyn DeviceBinder>,
}

impl DeviceSelector {
    pub fn new(binder: Arc<dyn DeviceBinder>) -> Self {
        Self { binder }
    }

    pub fn support(&self) -> DeviceSupport {
        self.binder.support()
    }

    /// Route output to `device_id`. Returns `true` only when the host bound
    /// the element to the device; every other outcome is logged and reported
    /// as `false`.
    pub async fn select(
        &self,
        engine: &dyn AudioEngine,
        graph: &mut AudioGraph,
        relay: &mut RelayOutput,
        device_id: &str,
    ) -> bool {
        let device = redact_device_id(device_id);

        if relay.mode().is_relayed() {
            debug!(device_id = %device, "Device selection ignored in relayed mode");
            return false;
        }

        if self.binder.support() == DeviceSupport::Unsupported {
            info!(device_id = %device, "Device selection not supported by host");
            return false;
        }

        let reused = relay.has_element();
        if !reused && !materialize(engine, graph, relay).await {
            return false;
        }

        let Some(element) = relay.element() else {
            return false;
        };

        // The watchdog skips direct sessions, so a later selection is the
        // only retry for an element whose first start was blocked.
        if reused && element.is_paused() {
            match routing::start(element).await {
                StartOutcome::Started => info!("Paused playback element restarted"),
                StartOutcome::Blocked(reason) => {
                    debug!(reason = %reason, "Playback element still blocked")
                }
            }
        }

        match self.binder.bind(element, device_id).await {
            SinkBinding::Bound => {
                info!(device_id = %device, "Output device selected");
                true
            }
            SinkBinding::Unsupported => {
                info!(device_id = %device, "Device selection not supported by host");
                false
            }
            SinkBinding::Rejected(reason) => {
                warn!(device_id = %device, reason = %reason, "Output device rejected");
                false
            }
        }
    }
}

impl fmt::Debug for DeviceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSelector")
            .field("support", &self.binder.support())
            .finish()
    }
}

/// Reroute a direct graph onto its stream sink and attach an element to it.
/// Restores the destination edge if no element could be created.
async fn materialize(
    engine: &dyn AudioEngine,
    graph: &mut AudioGraph,
    relay: &mut RelayOutput,
) -> bool {
    if let Err(err) = graph.route_to_stream(engine) {
        warn!(error = %err, "Failed to reroute output for device selection");
        return false;
    }

    let sink = *graph.sink();
    match relay.attach(engine, &sink).await {
        Ok(_) => {
            debug!("Playback element created for device selection");
            true
        }
        Err(err) => {
            warn!(error = %err, "Failed to create playback element for device selection");
            if let Err(restore_err) = graph.route_to_destination(engine) {
                warn!(error = %restore_err, "Failed to restore native destination");
            }
            false
        }
    }
}
