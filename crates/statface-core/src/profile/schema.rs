use crate::model::{CanonicalRole, StatementType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An extraction profile: the immutable keyword and threshold configuration
/// consumed by the region detector, band builders and classifier. One profile
/// per filer family; the built-in "default" preset covers common IFRS wording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    #[serde(default)]
    pub tuning: Tuning,
    /// Per-statement keyword sets. Order matters for type auto-detection.
    pub statements: Vec<StatementProfileDef>,
    /// Canonical-role header keywords, in document order of a typical SOCE.
    pub roles: Vec<RoleKeywordsDef>,
    /// Header tokens that mark the note-reference column ("Notes").
    #[serde(default = "default_note_column_keywords")]
    pub note_column_keywords: Vec<String>,
    /// Presentation-scale markers that leak into the label band and must be
    /// stripped from row labels ("Rm").
    #[serde(default)]
    pub label_noise_prefixes: Vec<String>,
    /// Words of other statements' titles; used to cap the last column band
    /// when a second statement starts further right on the same page.
    #[serde(default)]
    pub foreign_title_keywords: Vec<String>,
}

impl ProfileDef {
    pub fn statement(&self, statement_type: StatementType) -> Option<&StatementProfileDef> {
        self.statements
            .iter()
            .find(|s| s.statement_type == statement_type)
    }

    pub fn role_keywords(&self, role: CanonicalRole) -> Option<&RoleKeywordsDef> {
        self.roles.iter().find(|r| r.role == role)
    }
}

/// Keyword configuration for one statement type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementProfileDef {
    pub statement_type: StatementType,
    /// Title phrases for statement-type auto-detection.
    pub title_phrases: Vec<String>,
    /// Single words counted in the two-statement half vote.
    pub content_keywords: Vec<String>,
    /// Phrases/words whose first occurrence marks the table top.
    pub start_anchors: Vec<String>,
    /// Phrases whose last occurrence marks the table bottom.
    pub end_anchors: Vec<String>,
    /// Section-heading phrases that set row context without emitting rows.
    #[serde(default)]
    pub section_headings: Vec<SectionHeadingDef>,
    /// Phrases that clear the section context (e.g. "balance at").
    #[serde(default)]
    pub section_reset_phrases: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionHeadingDef {
    pub name: String,
    pub phrases: Vec<String>,
}

/// Header keywords for one canonical SOCE column role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleKeywordsDef {
    pub role: CanonicalRole,
    /// Whole-phrase patterns, matched first (substring, lowercased).
    pub phrases: Vec<String>,
    /// Single-word fragments for headers that wrap across visual rows.
    #[serde(default)]
    pub words: Vec<String>,
}

/// Empirically tuned heuristic thresholds. All overridable per profile;
/// the defaults come from observed filings, not from first principles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuning {
    /// y-distance within which tokens belong to the same row (pt).
    #[serde(default = "default_row_y_tolerance")]
    pub row_y_tolerance: f32,
    /// x-gap below which adjacent amount fragments concatenate (pt).
    #[serde(default = "default_amount_gap_threshold")]
    pub amount_gap_threshold: f32,
    /// Absolute tolerance for the accounting identity checks.
    #[serde(default = "default_identity_tolerance")]
    pub identity_tolerance: Decimal,
    /// Height of the header area scanned for column anchors below the
    /// table top (pt); generous to catch multi-row headers.
    #[serde(default = "default_header_window")]
    pub header_window: f32,
    /// Flat headers: how far above/below the table top year tokens may sit.
    #[serde(default = "default_year_window_above")]
    pub year_window_above: f32,
    #[serde(default = "default_year_window_below")]
    pub year_window_below: f32,
    /// Flat headers: max y-distance between a year token and the Notes/Rm
    /// marker row for the year to count as a column header.
    #[serde(default = "default_header_row_span")]
    pub header_row_span: f32,
    /// Max x-gap to a neighboring token for the "year inside prose" check.
    #[serde(default = "default_prose_gap")]
    pub prose_gap: f32,
    /// Gap between the label band's right edge and the first anchor (pt).
    #[serde(default = "default_label_gap")]
    pub label_gap: f32,
    /// Overlap past the page midline when restricting to one half (pt).
    #[serde(default = "default_half_overlap")]
    pub half_overlap: f32,
    /// Plausible range for year-shaped header tokens.
    #[serde(default = "default_year_min")]
    pub year_min: u16,
    #[serde(default = "default_year_max")]
    pub year_max: u16,
}

fn default_row_y_tolerance() -> f32 {
    5.0
}

fn default_amount_gap_threshold() -> f32 {
    15.0
}

fn default_identity_tolerance() -> Decimal {
    Decimal::ONE
}

fn default_header_window() -> f32 {
    120.0
}

fn default_year_window_above() -> f32 {
    100.0
}

fn default_year_window_below() -> f32 {
    80.0
}

fn default_header_row_span() -> f32 {
    20.0
}

fn default_prose_gap() -> f32 {
    10.0
}

fn default_label_gap() -> f32 {
    10.0
}

fn default_half_overlap() -> f32 {
    20.0
}

fn default_year_min() -> u16 {
    2015
}

fn default_year_max() -> u16 {
    2040
}

fn default_note_column_keywords() -> Vec<String> {
    vec!["notes".to_string(), "note".to_string()]
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            row_y_tolerance: default_row_y_tolerance(),
            amount_gap_threshold: default_amount_gap_threshold(),
            identity_tolerance: default_identity_tolerance(),
            header_window: default_header_window(),
            year_window_above: default_year_window_above(),
            year_window_below: default_year_window_below(),
            header_row_span: default_header_row_span(),
            prose_gap: default_prose_gap(),
            label_gap: default_label_gap(),
            half_overlap: default_half_overlap(),
            year_min: default_year_min(),
            year_max: default_year_max(),
        }
    }
}
