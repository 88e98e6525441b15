use crate::error::ExtractError;
use crate::profile::schema::ProfileDef;

const DEFAULT_PROFILE_JSON: &str = include_str!("../../../../profiles/default.json");

/// Available built-in extraction profiles.
pub const PRESETS: &[&str] = &["default"];

/// Load a built-in profile preset by name.
pub fn load_preset(name: &str) -> Result<ProfileDef, ExtractError> {
    match name {
        "default" => {
            let profile: ProfileDef = serde_json::from_str(DEFAULT_PROFILE_JSON)?;
            crate::profile::validate_profile(&profile)?;
            Ok(profile)
        }
        _ => Err(ExtractError::ProfileInvalid(format!(
            "unknown preset '{}'. Available: {}",
            name,
            PRESETS.join(", ")
        ))),
    }
}
