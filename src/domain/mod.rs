//! Core domain types and logic.

pub mod backtest;
pub mod clock;
pub mod config_validation;
pub mod error;
pub mod history;
pub mod indicator;
pub mod ohlcv;
pub mod order_intent;
pub mod portfolio;
pub mod signal;
pub mod strategy;
