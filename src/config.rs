//! Engine configuration from the environment and command line.

use std::env;
use std::path::PathBuf;

use log::warn;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::grading::history::DEFAULT_HISTORY_DIR;

pub const SEED_ENV: &str = "KARAKTER_SEED";
pub const SYNTHESIS_ENV: &str = "KARAKTER_SYNTHESIS";
pub const HISTORY_DIR_ENV: &str = "KARAKTER_HISTORY_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Seed for synthesized feedback. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Whether improvements are balanced and enriched with synthesized items.
    pub synthesis: bool,
    pub history_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            synthesis: true,
            history_dir: PathBuf::from(DEFAULT_HISTORY_DIR),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup. Unparsable values
    /// are logged and replaced by defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(SEED_ENV) {
            match raw.trim().parse() {
                Ok(seed) => config.seed = Some(seed),
                Err(_) => warn!("Ignoring {}={:?}: not a u64", SEED_ENV, raw),
            }
        }

        if let Some(raw) = lookup(SYNTHESIS_ENV) {
            match parse_switch(&raw) {
                Some(enabled) => config.synthesis = enabled,
                None => warn!("Ignoring {}={:?}: expected on or off", SYNTHESIS_ENV, raw),
            }
        }

        if let Some(dir) = lookup(HISTORY_DIR_ENV).filter(|d| !d.trim().is_empty()) {
            config.history_dir = PathBuf::from(dir);
        }

        config
    }

    /// Apply command-line values on top of this config.
    pub fn with_overrides(
        mut self,
        seed: Option<u64>,
        no_synthesis: bool,
        history_dir: Option<PathBuf>,
    ) -> Self {
        if seed.is_some() {
            self.seed = seed;
        }
        if no_synthesis {
            self.synthesis = false;
        }
        if let Some(dir) = history_dir {
            self.history_dir = dir;
        }
        self
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn parse_switch(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
