pub mod json_source;
pub mod words_xml;

use crate::error::ExtractError;
use crate::model::Token;
use serde::{Deserialize, Serialize};

/// Tokens extracted from a single page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageTokens {
    pub page_number: usize,
    pub tokens: Vec<Token>,
}

/// Trait for token dump loading backends.
///
/// Token extraction from PDF bytes happens outside this engine; a backend
/// only deserializes the dump an external text-layer reader produced.
pub trait TokenSource: Send + Sync {
    /// Parse raw dump bytes into one PageTokens per page.
    fn load_pages(&self, bytes: &[u8]) -> Result<Vec<PageTokens>, ExtractError>;

    /// Name of this token source (for diagnostics).
    fn source_name(&self) -> &str;
}
