//! Award-economy engine: participant tracking, the aura ledger, daily
//! command gates, announcement de-duplication, random selection and duels.

pub mod clock;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod duel;
pub mod error;
pub mod handler;
pub mod render;
pub mod selector;

use std::sync::Mutex;

use aurabot_db::AuraStore;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub use config::EngineConfig;
pub use dispatcher::{Award, AwardOutcome};
pub use duel::DuelResolution;
pub use error::AuraError;

/// Shared engine state. Safe to call from many threads at once; every rule
/// is enforced by an atomic store operation.
pub struct Engine<S> {
    store: S,
    config: EngineConfig,
    rng: Mutex<StdRng>,
}

impl<S: AuraStore> Engine<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self::with_rng(store, config, StdRng::from_os_rng())
    }

    /// Engine with a caller-supplied RNG, for reproducible draws.
    pub fn with_rng(store: S, config: EngineConfig, rng: StdRng) -> Self {
        Self {
            store,
            config,
            rng: Mutex::new(rng),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn draw<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }
}
