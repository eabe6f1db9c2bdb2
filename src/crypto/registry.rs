// EB Env Backup: Encryption method registry
//
// Maps user-facing method names to engines. Built once at startup and handed
// by value to whoever selects the engine; there is no process-wide state.

use std::collections::HashMap;
use std::sync::Arc;

use super::engine::Engine;
use super::envelope::{EnvelopeEngine, KeyService};
use super::symmetric::SymmetricEngine;
use super::CryptoError;

#[derive(Debug, Default)]
pub struct MethodRegistry {
    engines: HashMap<String, Engine>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the symmetric and envelope engines under their default names.
    pub fn with_defaults(key_service: Arc<dyn KeyService>) -> Self {
        let mut registry = Self::new();
        registry.register(Engine::Symmetric(SymmetricEngine::new()));
        registry.register(Engine::Envelope(EnvelopeEngine::new(key_service)));
        registry
    }

    /// Insert `engine` under its method name. A later registration with the
    /// same name replaces the earlier one.
    pub fn register(&mut self, engine: Engine) {
        let name = engine.method_name().to_string();
        if self.engines.insert(name.clone(), engine).is_some() {
            tracing::debug!(method = %name, "Replaced registered encryption method");
        }
    }

    /// Registered names in no particular order.
    pub fn method_names(&self) -> Vec<&str> {
        self.engines.keys().map(String::as_str).collect()
    }

    /// Registered names sorted for display.
    pub fn sorted_method_names(&self) -> Vec<&str> {
        let mut names = self.method_names();
        names.sort_unstable();
        names
    }

    pub fn lookup(&self, name: &str) -> Option<&Engine> {
        self.engines.get(name)
    }

    /// Take the engine registered as `name`, consuming the registry.
    pub fn select(mut self, name: &str) -> Result<Engine, CryptoError> {
        match self.engines.remove(name) {
            Some(engine) => Ok(engine),
            None => Err(CryptoError::Configuration(format!(
                "unknown encryption method '{}'; choose between: {}",
                name,
                self.sorted_method_names().join(", ")
            ))),
        }
    }
}
