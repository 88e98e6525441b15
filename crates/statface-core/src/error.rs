use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("no recognizable table region found on page")]
    NoTableRegionFound,

    #[error("only {found} value column(s) detected (at least 2 required)")]
    InsufficientColumns { found: usize },

    #[error("table region detected but no amount tokens found")]
    NoAmountsFound,

    #[error("accounting identities violated beyond tolerance (best residual {residual})")]
    ValidationFailed { residual: Decimal },

    #[error("failed to load tokens: {0}")]
    TokenLoad(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to load profile from {path}: {reason}")]
    ProfileLoad { path: PathBuf, reason: String },

    #[error("invalid profile: {0}")]
    ProfileInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExtractError {
    /// True for conditions the caller is expected to recover from by routing
    /// the page to the fallback extractor instead of treating as fatal.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExtractError::NoTableRegionFound
                | ExtractError::InsufficientColumns { .. }
                | ExtractError::NoAmountsFound
                | ExtractError::ValidationFailed { .. }
        )
    }
}
