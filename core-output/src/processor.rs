//! Registration of the concat processor module with audio engines.

use crate::config::ProcessorModule;
use crate::error::{OutputError, Result};
use bridge_traits::{AudioEngine, EngineId};
use parking_lot::Mutex;
use std::collections::HashSet;
use tracing::debug;

/// Makes sure the processor module is registered exactly once per engine.
///
/// Engines reject (or leak) duplicate registrations on some hosts, so the
/// loader remembers which engines already have the module. Sessions call
/// [`ProcessorLoader::forget`] when their engine is closed.
#[derive(Debug)]
pub struct ProcessorLoader {
    module: ProcessorModule,
    loaded: Mutex<HashSet<EngineId>>,
}

impl ProcessorLoader {
    pub fn new(module: ProcessorModule) -> Self {
        Self {
            module,
            loaded: Mutex::new(HashSet::new()),
        }
    }

    pub fn module(&self) -> &ProcessorModule {
        &self.module
    }

    /// Register the module with `engine` unless it already is.
    pub async fn ensure_loaded(&self, engine: &dyn AudioEngine) -> Result<()> {
        let engine_id = engine.id();
        if self.is_loaded(engine_id) {
            debug!(%engine_id, "Processor module already registered");
            return Ok(());
        }

        engine
            .add_processor_module(&self.module.module_url)
            .await
            .map_err(|source| OutputError::ProcessorLoad {
                module: self.module.module_url.clone(),
                source,
            })?;

        self.loaded.lock().insert(engine_id);
        debug!(%engine_id, module = %self.module.name, "Processor module registered");
        Ok(())
    }

    pub fn is_loaded(&self, engine_id: EngineId) -> bool {
        self.loaded.lock().contains(&engine_id)
    }

    /// Drop bookkeeping for a closed engine.
    pub fn forget(&self, engine_id: EngineId) {
        self.loaded.lock().remove(&engine_id);
    }
}
