//! Domain error types.
//!
//! Parameter and configuration problems fail fast before any computation runs.
//! Numeric edge cases inside a backtest (zero average loss, zero trade count,
//! zero return deviation) are resolved locally with defined fallbacks and never
//! surface here.

/// Top-level error type for niftytrader.
#[derive(Debug, thiserror::Error)]
pub enum NiftytraderError {
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

    #[error("invalid strategy parameter {param}: {reason}")]
    InvalidParameter { param: String, reason: String },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error("insufficient data for {ticker}: have {bars} bars, need {minimum}")]
    InsufficientData {
        ticker: String,
        bars: usize,
        minimum: usize,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&NiftytraderError> for std::process::ExitCode {
    fn from(err: &NiftytraderError) -> Self {
        let code: u8 = match err {
            NiftytraderError::Io(_) => 1,
            NiftytraderError::ConfigParse { .. }
            | NiftytraderError::ConfigMissing { .. }
            | NiftytraderError::ConfigInvalid { .. } => 2,
            NiftytraderError::Data { .. } => 3,
            NiftytraderError::InvalidParameter { .. } => 4,
            NiftytraderError::NoData { .. } | NiftytraderError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
