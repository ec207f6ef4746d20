//! Configuration validation.
//!
//! Validates config fields before any strategy is built or backtest runs.

use crate::domain::error::WicktraderError;
use crate::domain::strategy::StrategyRegistry;
use crate::domain::strategy::wick_master;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_STRATEGY: &str = wick_master::NAME;

pub fn validate_strategy_config(
    config: &dyn ConfigPort,
    registry: &StrategyRegistry,
) -> Result<(), WicktraderError> {
    validate_strategy_name(config, registry)?;
    validate_positive(config, "strategy", "wick_threshold", 2.0)?;
    validate_positive(config, "strategy", "volume_threshold", 1.5)?;
    validate_min_score(config)?;
    validate_timeframe(config)?;
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), WicktraderError> {
    validate_positive(config, "backtest", "initial_capital", 10_000.0)?;
    validate_positive(config, "backtest", "order_qty", 0.001)?;
    Ok(())
}

fn validate_strategy_name(
    config: &dyn ConfigPort,
    registry: &StrategyRegistry,
) -> Result<(), WicktraderError> {
    let name = config
        .get_string("strategy", "name")
        .unwrap_or_else(|| DEFAULT_STRATEGY.to_string());
    if !registry.contains(name.trim()) {
        return Err(WicktraderError::UnknownStrategy {
            name: name.trim().to_string(),
        });
    }
    Ok(())
}

/// A present-but-unparseable value is an error; `get_double` alone would
/// silently fall back to the default.
fn ensure_numeric(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), WicktraderError> {
    if let Some(raw) = config.get_string(section, key) {
        if raw.trim().parse::<f64>().is_err() {
            return Err(WicktraderError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("'{}' is not a number", raw.trim()),
            });
        }
    }
    Ok(())
}

fn validate_positive(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<(), WicktraderError> {
    ensure_numeric(config, section, key)?;
    let value = config.get_double(section, key, default);
    if !value.is_finite() || value <= 0.0 {
        return Err(WicktraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{} must be positive", key),
        });
    }
    Ok(())
}

fn validate_min_score(config: &dyn ConfigPort) -> Result<(), WicktraderError> {
    if let Some(raw) = config.get_string("strategy", "pattern_min_score") {
        if raw.trim().parse::<i64>().is_err() {
            return Err(WicktraderError::ConfigInvalid {
                section: "strategy".to_string(),
                key: "pattern_min_score".to_string(),
                reason: format!("'{}' is not an integer", raw.trim()),
            });
        }
    }
    let value = config.get_int("strategy", "pattern_min_score", 60);
    if !(0..=100).contains(&value) {
        return Err(WicktraderError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "pattern_min_score".to_string(),
            reason: "pattern_min_score must be between 0 and 100".to_string(),
        });
    }
    Ok(())
}

fn validate_timeframe(config: &dyn ConfigPort) -> Result<(), WicktraderError> {
    match config.get_string("strategy", "timeframe") {
        Some(s) if s.trim().is_empty() => Err(WicktraderError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "timeframe".to_string(),
            reason: "timeframe must not be empty".to_string(),
        }),
        _ => Ok(()),
    }
}
