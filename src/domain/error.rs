//! Domain error types.
//!
//! Insufficient history and zero-denominator indicator cases are absorbed
//! where they occur and never show up here.

/// Top-level error type for wicktrader.
#[derive(Debug, thiserror::Error)]
pub enum WicktraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("invalid signal #{index} for {symbol}: {reason}")]
    InvalidSignal {
        index: usize,
        symbol: String,
        reason: String,
    },

    #[error("portfolio error: {reason}")]
    Portfolio { reason: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&WicktraderError> for std::process::ExitCode {
    fn from(err: &WicktraderError) -> Self {
        let code: u8 = match err {
            WicktraderError::Io(_) => 1,
            WicktraderError::ConfigParse { .. }
            | WicktraderError::ConfigMissing { .. }
            | WicktraderError::ConfigInvalid { .. } => 2,
            WicktraderError::UnknownStrategy { .. } => 3,
            WicktraderError::InvalidSignal { .. } | WicktraderError::Portfolio { .. } => 4,
            WicktraderError::DataSource { .. } => 5,
            WicktraderError::Serialization(_) => 6,
        };
        std::process::ExitCode::from(code)
    }
}
