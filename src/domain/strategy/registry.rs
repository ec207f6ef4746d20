//! Strategy identifier to constructor lookup.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::clock::Clock;
use crate::domain::error::WicktraderError;
use crate::domain::strategy::wick_master::{self, WickMasterPro};
use crate::domain::strategy::{ScoringEngine, StrategyParams};

pub type StrategyFactory =
    fn(&StrategyParams, Arc<dyn Clock>) -> Result<Box<dyn ScoringEngine>, WicktraderError>;

pub struct StrategyRegistry {
    factories: BTreeMap<String, StrategyFactory>,
}

impl StrategyRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with every built-in strategy.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(wick_master::NAME, create_wick_master);
        registry
    }

    /// Registers `factory` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: &str, factory: StrategyFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn create(
        &self,
        name: &str,
        params: &StrategyParams,
        clock: Arc<dyn Clock>,
    ) -> Result<Box<dyn ScoringEngine>, WicktraderError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| WicktraderError::UnknownStrategy {
                name: name.to_string(),
            })?;
        factory(params, clock)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn create_wick_master(
    params: &StrategyParams,
    clock: Arc<dyn Clock>,
) -> Result<Box<dyn ScoringEngine>, WicktraderError> {
    params.validate()?;
    Ok(Box::new(WickMasterPro::with_clock(params.clone(), clock)))
}
