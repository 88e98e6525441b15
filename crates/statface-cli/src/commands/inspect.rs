use crate::commands::{load_token_pages, parse_statement_hint, resolve_profile, select_page};
use crate::output;
use statface_core::error::ExtractError;
use statface_core::inspect_page;
use std::path::PathBuf;

pub fn run(
    input_file: PathBuf,
    statement: Option<String>,
    page: Option<usize>,
    profile_file: Option<PathBuf>,
    preset: &str,
    output_format: &str,
) -> Result<(), ExtractError> {
    let profile = resolve_profile(profile_file, preset)?;
    let pages = load_token_pages(&input_file)?;
    let tokens = select_page(pages, page)?;
    let hint = parse_statement_hint(statement.as_deref())?;

    let inspection = inspect_page(&tokens, hint, &profile)?;

    match output_format {
        "json" => {
            let json = serde_json::to_string_pretty(&inspection)?;
            println!("{json}");
        }
        _ => output::table::print_inspection(&inspection),
    }

    Ok(())
}
