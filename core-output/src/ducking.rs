//! # Ducking
//!
//! Suspends the whole engine while the assistant is not speaking so the host
//! can release the output device, and resumes it when speech starts again.
//! The graph is left wired while ducked.

use crate::error::Result;
use bridge_traits::{AudioEngine, EngineState};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Ducking state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuckState {
    #[default]
    Active,
    Ducked,
}

/// Two-state machine driving engine suspend/resume.
///
/// Transitions only fire when both the controller and the engine are in the
/// expected source state; every other combination is a no-op. A platform
/// failure leaves the state untouched.
#[derive(Debug, Default)]
pub struct DuckingController {
    state: DuckState,
}

impl DuckingController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DuckState {
        self.state
    }

    pub fn is_ducked(&self) -> bool {
        self.state == DuckState::Ducked
    }

    /// Suspend `engine` if it is running and not already ducked.
    ///
    /// Returns `true` if a transition happened.
    pub async fn suspend(&mut self, engine: &dyn AudioEngine) -> Result<bool> {
        let engine_state = engine.state();
        if self.state != DuckState::Active || engine_state != EngineState::Running {
            debug!(duck_state = ?self.state, ?engine_state, "Suspend skipped");
            return Ok(false);
        }

        engine.suspend().await?;
        self.state = DuckState::Ducked;
        info!(engine_id = %engine.id(), "Output ducked");
        Ok(true)
    }

    /// Drop back to `Active` without touching the engine. Called once the
    /// engine is being torn down.
    pub fn reset(&mut self) {
        self.state = DuckState::Active;
    }

    /// Resume `engine` if it is suspended and currently ducked.
    ///
    /// Returns `true` if a transition happened.
    pub async fn resume(&mut self, engine: &dyn AudioEngine) -> Result<bool> {
        let engine_state = engine.state();
        if self.state != DuckState::Ducked || engine_state != EngineState::Suspended {
            debug!(duck_state = ?self.state, ?engine_state, "Resume skipped");
            return Ok(false);
        }

        engine.resume().await?;
        self.state = DuckState::Active;
        info!(engine_id = %engine.id(), "Output resumed from ducking");
        Ok(true)
    }
}
