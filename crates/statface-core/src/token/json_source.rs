use crate::error::ExtractError;
use crate::model::Token;
use crate::token::{PageTokens, TokenSource};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Token source for JSON dumps.
///
/// Accepts either the paged form:
/// `{"pages": [{"page": 6, "tokens": [{"text": "...", "x0": ..}, ..]}, ..]}`
/// or a flat token array where each token carries its own `page` field.
pub struct JsonTokenSource;

impl JsonTokenSource {
    pub fn new() -> Self {
        JsonTokenSource
    }
}

impl Default for JsonTokenSource {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DumpDef {
    Paged { pages: Vec<PageDef> },
    Flat(Vec<Token>),
}

#[derive(Debug, Deserialize)]
struct PageDef {
    page: usize,
    tokens: Vec<PageTokenDef>,
}

#[derive(Debug, Deserialize)]
struct PageTokenDef {
    text: String,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
}

impl TokenSource for JsonTokenSource {
    fn load_pages(&self, bytes: &[u8]) -> Result<Vec<PageTokens>, ExtractError> {
        let dump: DumpDef = serde_json::from_slice(bytes)
            .map_err(|e| ExtractError::TokenLoad(format!("invalid token JSON: {e}")))?;

        let pages = match dump {
            DumpDef::Paged { pages } => pages
                .into_iter()
                .map(|p| PageTokens {
                    page_number: p.page,
                    tokens: p
                        .tokens
                        .into_iter()
                        .filter(|t| !t.text.trim().is_empty())
                        .map(|t| Token {
                            text: t.text,
                            x0: t.x0,
                            y0: t.y0,
                            x1: t.x1,
                            y1: t.y1,
                            page: p.page,
                        })
                        .collect(),
                })
                .collect(),
            DumpDef::Flat(tokens) => {
                let mut by_page: BTreeMap<usize, Vec<Token>> = BTreeMap::new();
                for t in tokens {
                    if t.text.trim().is_empty() {
                        continue;
                    }
                    by_page.entry(t.page).or_default().push(t);
                }
                by_page
                    .into_iter()
                    .map(|(page_number, tokens)| PageTokens {
                        page_number,
                        tokens,
                    })
                    .collect()
            }
        };

        Ok(pages)
    }

    fn source_name(&self) -> &str {
        "json"
    }
}
