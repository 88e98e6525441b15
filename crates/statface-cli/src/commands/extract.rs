use crate::commands::{load_token_pages, parse_statement_hint, resolve_profile, select_page};
use crate::output;
use statface_core::error::ExtractError;
use statface_core::{extract_page, ExtractOptions};
use std::path::PathBuf;

#[allow(clippy::too_many_arguments)]
pub fn run(
    input_file: PathBuf,
    statement: Option<String>,
    page: Option<usize>,
    profile_file: Option<PathBuf>,
    preset: &str,
    output_format: &str,
    out: Option<PathBuf>,
    strict: bool,
) -> Result<(), ExtractError> {
    let profile = resolve_profile(profile_file, preset)?;
    let pages = load_token_pages(&input_file)?;
    let tokens = select_page(pages, page)?;
    let hint = parse_statement_hint(statement.as_deref())?;

    let options = ExtractOptions {
        strict_validation: strict,
    };
    let extract = extract_page(&tokens, hint, &profile, &options)?;

    match out {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&extract)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Extracted {} row(s) ({}), written to {}",
                extract.rows.len(),
                extract.statement_type,
                path.display()
            );
            for w in &extract.warnings {
                eprintln!("  warning: {}", w.message);
            }
        }
        None => match output_format {
            "json" => output::json::print(&extract)?,
            _ => output::table::print(&extract),
        },
    }

    Ok(())
}
