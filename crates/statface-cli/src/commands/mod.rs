pub mod extract;
pub mod inspect;
pub mod profiles;

use statface_core::error::ExtractError;
use statface_core::model::{StatementType, Token};
use statface_core::profile::schema::ProfileDef;
use statface_core::profile::{builtin, load_profile};
use statface_core::token::json_source::JsonTokenSource;
use statface_core::token::words_xml::WordsXmlSource;
use statface_core::token::{PageTokens, TokenSource};
use std::path::{Path, PathBuf};

/// Load the profile: an explicit file wins over the preset name.
pub fn resolve_profile(
    profile_file: Option<PathBuf>,
    preset: &str,
) -> Result<ProfileDef, ExtractError> {
    match profile_file {
        Some(path) => load_profile(&path),
        None => builtin::load_preset(preset),
    }
}

/// Load a token dump, picking the source by file extension.
pub fn load_token_pages(path: &Path) -> Result<Vec<PageTokens>, ExtractError> {
    let bytes = std::fs::read(path)?;
    let is_xml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("xml"))
        .unwrap_or(false);
    if is_xml {
        WordsXmlSource::new().load_pages(&bytes)
    } else {
        JsonTokenSource::new().load_pages(&bytes)
    }
}

/// Pick the requested page (or the first one) out of the dump.
pub fn select_page(pages: Vec<PageTokens>, page: Option<usize>) -> Result<Vec<Token>, ExtractError> {
    match page {
        Some(n) => pages
            .into_iter()
            .find(|p| p.page_number == n)
            .map(|p| p.tokens)
            .ok_or_else(|| ExtractError::TokenLoad(format!("page {n} not found in dump"))),
        None => pages
            .into_iter()
            .next()
            .map(|p| p.tokens)
            .ok_or_else(|| ExtractError::TokenLoad("dump contains no pages".into())),
    }
}

/// Parse the --statement flag; None means auto-detect.
pub fn parse_statement_hint(statement: Option<&str>) -> Result<Option<StatementType>, ExtractError> {
    match statement {
        None => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("auto") => Ok(None),
        Some(s) => StatementType::from_str_loose(s)
            .map(Some)
            .ok_or_else(|| {
                ExtractError::InvalidArgument(format!(
                    "unknown statement type '{s}' (expected sfp, sci, cf or soce)"
                ))
            }),
    }
}
