pub mod amount;
pub mod bands;
pub mod classify;
pub mod error;
pub mod model;
pub mod profile;
pub mod region;
pub mod rows;
pub mod token;
pub mod validate;

use bands::BandSet;
use error::ExtractError;
use model::{
    ColumnBand, EntityScope, PresentationScale, StatementType, TableExtract, TableRegion, Token,
};
use profile::schema::{ProfileDef, StatementProfileDef};
use serde::Serialize;

/// Caller-facing extraction switches.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Promote a validation that still fails after the column-shift search
    /// to `ExtractError::ValidationFailed` instead of returning the result
    /// flagged as unvalidated.
    pub strict_validation: bool,
}

/// Main API entry point: extract one statement table from one page's tokens.
///
/// Stages run strictly forward with no retry - identical input always yields
/// identical output, so a failed page should be routed to the fallback
/// extractor, not re-submitted.
pub fn extract_page(
    tokens: &[Token],
    hint: Option<StatementType>,
    profile: &ProfileDef,
    options: &ExtractOptions,
) -> Result<TableExtract, ExtractError> {
    let mut warnings = Vec::new();
    let tuning = &profile.tuning;

    let all_lines = region::group_lines(tokens, tuning.row_y_tolerance);
    let statement_type = match hint {
        Some(st) => st,
        None => region::detect_statement_type(&all_lines, profile)
            .ok_or(ExtractError::NoTableRegionFound)?,
    };
    let sp = profile.statement(statement_type).ok_or_else(|| {
        ExtractError::ProfileInvalid(format!("no statement profile for {statement_type}"))
    })?;
    let entity_scope = region::detect_entity_scope(&all_lines);
    let scale = region::detect_scale(&all_lines);

    // Two-statement pages: restrict to the half carrying this statement.
    let others: Vec<&StatementProfileDef> = profile
        .statements
        .iter()
        .filter(|s| s.statement_type != statement_type)
        .collect();
    let x_bounds = region::find_statement_half(tokens, sp, &others, tuning);
    let scoped: Vec<Token> = match x_bounds {
        Some((lo, hi)) => tokens
            .iter()
            .filter(|t| lo <= t.x_center() && t.x_center() <= hi)
            .cloned()
            .collect(),
        None => tokens.to_vec(),
    };

    let lines = region::group_lines(&scoped, tuning.row_y_tolerance);
    let mut table_region =
        region::detect_region(&lines, sp).ok_or(ExtractError::NoTableRegionFound)?;
    if let Some((lo, hi)) = x_bounds {
        table_region.x_min = Some(lo);
        table_region.x_max = Some(hi);
    }

    let (band_set, period_labels) = match statement_type {
        StatementType::Soce => {
            let (anchors, note_anchor) =
                bands::hierarchical::detect_role_anchors(&scoped, &table_region, profile, &mut warnings);
            let set = bands::hierarchical::build_hierarchical_bands(
                &scoped,
                &table_region,
                &anchors,
                note_anchor.as_ref(),
                profile,
            );
            let periods = soce_period_labels(&scoped, &table_region, profile);
            (set, periods)
        }
        _ => {
            let anchors = bands::flat::detect_year_anchors(&scoped, &table_region, profile);
            let set = bands::flat::build_flat_bands(&scoped, &table_region, &anchors, profile);
            let periods: Vec<String> = anchors.iter().map(|a| a.year.to_string()).collect();
            (set, periods)
        }
    };

    let value_count = band_set.value_bands().count();
    if value_count < 2 {
        return Err(ExtractError::InsufficientColumns { found: value_count });
    }

    let mut extracted_rows = rows::assemble_rows(&scoped, &band_set, &table_region, sp, profile);
    if extracted_rows.is_empty() {
        return Err(ExtractError::NoAmountsFound);
    }

    let mut column_keys = band_set.value_keys();
    let validation = match statement_type {
        StatementType::Soce => {
            let result = validate::resolve_column_shift(
                &mut column_keys,
                &mut extracted_rows,
                tuning.identity_tolerance,
                &mut warnings,
            );
            if !result.passed && options.strict_validation {
                let residual = result
                    .residuals
                    .get(validate::RULE_A)
                    .copied()
                    .unwrap_or_default();
                return Err(ExtractError::ValidationFailed { residual });
            }
            Some(result)
        }
        _ => {
            warnings.extend(validate::sign_sanity_warnings(&extracted_rows));
            None
        }
    };

    Ok(TableExtract {
        statement_type,
        entity_scope,
        scale,
        column_keys,
        period_labels,
        rows: extracted_rows,
        validation,
        warnings,
    })
}

/// SOCE period labels: bare year tokens in the header window, ascending.
/// Single-period faces (no year headers) get no labels.
fn soce_period_labels(tokens: &[Token], region: &TableRegion, profile: &ProfileDef) -> Vec<String> {
    let tuning = &profile.tuning;
    let mut years: Vec<u16> = Vec::new();
    for t in tokens {
        if t.y0 < region.y_top || t.y0 > region.y_top + tuning.header_window {
            continue;
        }
        if let Some(y) = amount::parse_year_token(&t.text, tuning.year_min, tuning.year_max) {
            if !years.contains(&y) {
                years.push(y);
            }
        }
    }
    years.sort_unstable();
    years.iter().map(|y| y.to_string()).collect()
}

/// Detection diagnostics for one page, produced without row extraction.
#[derive(Debug, Clone, Serialize)]
pub struct PageInspection {
    pub statement_type: StatementType,
    pub entity_scope: EntityScope,
    pub scale: PresentationScale,
    pub token_count: usize,
    pub x_bounds: Option<(f32, f32)>,
    pub region: TableRegion,
    pub bands: Vec<ColumnBand>,
}

/// Run detection only: statement type, half restriction, region and bands.
pub fn inspect_page(
    tokens: &[Token],
    hint: Option<StatementType>,
    profile: &ProfileDef,
) -> Result<PageInspection, ExtractError> {
    let tuning = &profile.tuning;
    let all_lines = region::group_lines(tokens, tuning.row_y_tolerance);
    let statement_type = match hint {
        Some(st) => st,
        None => region::detect_statement_type(&all_lines, profile)
            .ok_or(ExtractError::NoTableRegionFound)?,
    };
    let sp = profile.statement(statement_type).ok_or_else(|| {
        ExtractError::ProfileInvalid(format!("no statement profile for {statement_type}"))
    })?;

    let others: Vec<&StatementProfileDef> = profile
        .statements
        .iter()
        .filter(|s| s.statement_type != statement_type)
        .collect();
    let x_bounds = region::find_statement_half(tokens, sp, &others, tuning);
    let scoped: Vec<Token> = match x_bounds {
        Some((lo, hi)) => tokens
            .iter()
            .filter(|t| lo <= t.x_center() && t.x_center() <= hi)
            .cloned()
            .collect(),
        None => tokens.to_vec(),
    };

    let lines = region::group_lines(&scoped, tuning.row_y_tolerance);
    let mut table_region =
        region::detect_region(&lines, sp).ok_or(ExtractError::NoTableRegionFound)?;
    if let Some((lo, hi)) = x_bounds {
        table_region.x_min = Some(lo);
        table_region.x_max = Some(hi);
    }

    let band_set: BandSet = match statement_type {
        StatementType::Soce => {
            let mut warnings = Vec::new();
            let (anchors, note_anchor) =
                bands::hierarchical::detect_role_anchors(&scoped, &table_region, profile, &mut warnings);
            bands::hierarchical::build_hierarchical_bands(
                &scoped,
                &table_region,
                &anchors,
                note_anchor.as_ref(),
                profile,
            )
        }
        _ => {
            let anchors = bands::flat::detect_year_anchors(&scoped, &table_region, profile);
            bands::flat::build_flat_bands(&scoped, &table_region, &anchors, profile)
        }
    };

    Ok(PageInspection {
        statement_type,
        entity_scope: region::detect_entity_scope(&all_lines),
        scale: region::detect_scale(&all_lines),
        token_count: scoped.len(),
        x_bounds,
        region: table_region,
        bands: band_set.bands().to_vec(),
    })
}
