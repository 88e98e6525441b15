use statface_core::error::ExtractError;
use statface_core::model::TableExtract;

pub fn print(extract: &TableExtract) -> Result<(), ExtractError> {
    let json = serde_json::to_string_pretty(extract)?;
    println!("{json}");
    Ok(())
}
