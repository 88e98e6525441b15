pub mod builtin;
pub mod schema;

use crate::error::ExtractError;
use crate::model::CanonicalRole;
use schema::ProfileDef;
use std::path::Path;

/// Load an extraction profile from a JSON file.
pub fn load_profile(path: &Path) -> Result<ProfileDef, ExtractError> {
    let content = std::fs::read_to_string(path).map_err(|e| ExtractError::ProfileLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_profile(&content, path)
}

/// Parse a profile from a JSON string, keeping the file path for errors.
pub fn parse_profile(json: &str, source: &Path) -> Result<ProfileDef, ExtractError> {
    let profile: ProfileDef = serde_json::from_str(json).map_err(|e| ExtractError::ProfileLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_profile(&profile)?;
    Ok(profile)
}

/// Parse a profile from a JSON string (no file path context).
pub fn parse_profile_str(json: &str) -> Result<ProfileDef, ExtractError> {
    let profile: ProfileDef = serde_json::from_str(json).map_err(ExtractError::Json)?;
    validate_profile(&profile)?;
    Ok(profile)
}

/// Validate that a profile is well-formed.
pub fn validate_profile(profile: &ProfileDef) -> Result<(), ExtractError> {
    if profile.statements.is_empty() {
        return Err(ExtractError::ProfileInvalid(
            "statements must not be empty".into(),
        ));
    }

    for (i, sp) in profile.statements.iter().enumerate() {
        if profile.statements[..i]
            .iter()
            .any(|other| other.statement_type == sp.statement_type)
        {
            return Err(ExtractError::ProfileInvalid(format!(
                "duplicate statement profile for {}",
                sp.statement_type
            )));
        }
        if sp.title_phrases.is_empty() {
            return Err(ExtractError::ProfileInvalid(format!(
                "statement {} has no title phrases",
                sp.statement_type
            )));
        }
        if sp.start_anchors.is_empty() {
            return Err(ExtractError::ProfileInvalid(format!(
                "statement {} has no start anchors",
                sp.statement_type
            )));
        }
    }

    for role in CanonicalRole::MAIN {
        if profile.role_keywords(role).is_none() {
            return Err(ExtractError::ProfileInvalid(format!(
                "missing role keywords for '{}'",
                role
            )));
        }
    }

    for rk in &profile.roles {
        if rk.phrases.is_empty() && rk.words.is_empty() {
            return Err(ExtractError::ProfileInvalid(format!(
                "role '{}' has neither phrases nor words",
                rk.role
            )));
        }
    }

    let t = &profile.tuning;
    if t.identity_tolerance.is_sign_negative() {
        return Err(ExtractError::ProfileInvalid(
            "identity_tolerance must not be negative".into(),
        ));
    }
    if t.row_y_tolerance <= 0.0 || t.amount_gap_threshold <= 0.0 {
        return Err(ExtractError::ProfileInvalid(
            "row_y_tolerance and amount_gap_threshold must be positive".into(),
        ));
    }
    if t.year_min > t.year_max {
        return Err(ExtractError::ProfileInvalid(format!(
            "year_min {} exceeds year_max {}",
            t.year_min, t.year_max
        )));
    }

    Ok(())
}
