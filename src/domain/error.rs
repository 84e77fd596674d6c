//! Domain error types.

/// Top-level error type for momtrader.
#[derive(Debug, thiserror::Error)]
pub enum MomtraderError {
    #[error("data error: {reason}")]
    Data { reason: String },

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

    #[error("missing data for {symbol}: {reason}")]
    MissingData { symbol: String, reason: String },

    #[error("insufficient data for {symbol}: have {bars} closes, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("volatility window not ready: have {have} of {capacity} samples")]
    NotReady { have: usize, capacity: usize },

    #[error("execution error: {reason}")]
    Execution { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MomtraderError {
    /// True for the conditions that make a tick skip rather than fail.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            MomtraderError::MissingData { .. } | MomtraderError::InsufficientData { .. }
        )
    }
}

impl From<&MomtraderError> for std::process::ExitCode {
    fn from(err: &MomtraderError) -> Self {
        let code: u8 = match err {
            MomtraderError::Io(_) => 1,
            MomtraderError::ConfigParse { .. }
            | MomtraderError::ConfigMissing { .. }
            | MomtraderError::ConfigInvalid { .. } => 2,
            MomtraderError::Data { .. } => 3,
            MomtraderError::Execution { .. } => 4,
            MomtraderError::MissingData { .. }
            | MomtraderError::InsufficientData { .. }
            | MomtraderError::NotReady { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
