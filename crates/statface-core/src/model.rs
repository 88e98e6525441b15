use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A positioned text token, the engine's sole input unit.
///
/// Coordinates are in the source PDF's unit system with y growing downward.
/// Tokens are produced by an external text-layer reader and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    #[serde(default = "default_page")]
    pub page: usize,
}

fn default_page() -> usize {
    1
}

impl Token {
    pub fn new(text: impl Into<String>, x0: f32, y0: f32, x1: f32, y1: f32) -> Token {
        Token {
            text: text.into(),
            x0,
            y0,
            x1,
            y1,
            page: 1,
        }
    }

    pub fn x_center(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn y_center(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }
}

/// The four statement faces this engine parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatementType {
    Sfp,
    Sci,
    Cf,
    Soce,
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementType::Sfp => write!(f, "SFP"),
            StatementType::Sci => write!(f, "SCI"),
            StatementType::Cf => write!(f, "CF"),
            StatementType::Soce => write!(f, "SOCE"),
        }
    }
}

impl StatementType {
    pub fn from_str_loose(s: &str) -> Option<StatementType> {
        let lower = s.trim().to_lowercase();
        if lower == "sfp" || lower.contains("position") || lower.contains("balance sheet") {
            Some(StatementType::Sfp)
        } else if lower == "sci" || lower.contains("income") || lower.contains("profit") {
            Some(StatementType::Sci)
        } else if lower == "cf" || lower.contains("cash") {
            Some(StatementType::Cf)
        } else if lower == "soce" || lower.contains("equity") || lower.contains("changes") {
            Some(StatementType::Soce)
        } else {
            None
        }
    }
}

/// Whether the statement covers the group or the separate company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityScope {
    Group,
    Company,
}

impl fmt::Display for EntityScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityScope::Group => write!(f, "GROUP"),
            EntityScope::Company => write!(f, "COMPANY"),
        }
    }
}

/// Presentation scale declared on the statement face (e.g. "Rm" = millions).
/// Detected and reported only; extracted values are never rescaled here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationScale {
    #[default]
    Units,
    Thousand,
    Million,
    Billion,
}

impl PresentationScale {
    pub fn factor(&self) -> Decimal {
        match self {
            PresentationScale::Units => Decimal::ONE,
            PresentationScale::Thousand => Decimal::from(1_000),
            PresentationScale::Million => Decimal::from(1_000_000),
            PresentationScale::Billion => Decimal::from(1_000_000_000),
        }
    }
}

impl fmt::Display for PresentationScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresentationScale::Units => write!(f, "units"),
            PresentationScale::Thousand => write!(f, "thousand"),
            PresentationScale::Million => write!(f, "million"),
            PresentationScale::Billion => write!(f, "billion"),
        }
    }
}

/// Semantic tag for a changes-in-equity column, independent of the literal
/// header wording. Role assignment, not raw header text, is the unit of
/// meaning passed downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalRole {
    TotalEquity,
    NonControllingInterest,
    AttributableTotal,
    StatedCapital,
    TreasuryShares,
    OtherReserves,
    RetainedEarnings,
}

impl CanonicalRole {
    /// The three roles bound by the balance identity (Rule A).
    pub const MAIN: [CanonicalRole; 3] = [
        CanonicalRole::TotalEquity,
        CanonicalRole::NonControllingInterest,
        CanonicalRole::AttributableTotal,
    ];

    /// Component columns under the "Attributable to owners" group.
    pub const OWNER_COMPONENTS: [CanonicalRole; 4] = [
        CanonicalRole::StatedCapital,
        CanonicalRole::TreasuryShares,
        CanonicalRole::OtherReserves,
        CanonicalRole::RetainedEarnings,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            CanonicalRole::TotalEquity => "total_equity",
            CanonicalRole::NonControllingInterest => "non_controlling_interest",
            CanonicalRole::AttributableTotal => "attributable_total",
            CanonicalRole::StatedCapital => "stated_capital",
            CanonicalRole::TreasuryShares => "treasury_shares",
            CanonicalRole::OtherReserves => "other_reserves",
            CanonicalRole::RetainedEarnings => "retained_earnings",
        }
    }

    pub fn from_key(s: &str) -> Option<CanonicalRole> {
        match s {
            "total_equity" => Some(CanonicalRole::TotalEquity),
            "non_controlling_interest" => Some(CanonicalRole::NonControllingInterest),
            "attributable_total" => Some(CanonicalRole::AttributableTotal),
            "stated_capital" => Some(CanonicalRole::StatedCapital),
            "treasury_shares" => Some(CanonicalRole::TreasuryShares),
            "other_reserves" => Some(CanonicalRole::OtherReserves),
            "retained_earnings" => Some(CanonicalRole::RetainedEarnings),
            _ => None,
        }
    }

    pub fn is_owner_component(&self) -> bool {
        Self::OWNER_COMPONENTS.contains(self)
    }
}

impl fmt::Display for CanonicalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// The vertical (and optionally horizontal) extent of one table on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRegion {
    pub y_top: f32,
    pub y_bottom: f32,
    /// Horizontal bounds when the page holds two statements side by side.
    pub x_min: Option<f32>,
    pub x_max: Option<f32>,
}

impl TableRegion {
    pub fn contains(&self, token: &Token) -> bool {
        let yc = token.y_center();
        if yc < self.y_top || yc > self.y_bottom {
            return false;
        }
        let xc = token.x_center();
        if let Some(lo) = self.x_min {
            if xc < lo {
                return false;
            }
        }
        if let Some(hi) = self.x_max {
            if xc > hi {
                return false;
            }
        }
        true
    }
}

/// An x-axis range assigned a logical column meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnBand {
    pub key: String,
    pub x_start: f32,
    pub x_end: f32,
    pub x_center: f32,
    pub is_note_column: bool,
    /// Canonical role, present only for hierarchical (SOCE) headers.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<CanonicalRole>,
}

/// One extracted line item.
///
/// `values` always carries exactly the table's value-column key set;
/// a period with no amount is an explicit `None`, never a missing key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowRecord {
    pub raw_label: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub note_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub section: Option<String>,
    pub values: BTreeMap<String, Option<Decimal>>,
}

impl RowRecord {
    pub fn has_values(&self) -> bool {
        self.values.values().any(|v| v.is_some())
    }
}

/// Outcome of the statement-specific identity checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub residuals: BTreeMap<String, Decimal>,
    pub violations: Vec<String>,
}

/// Pipeline stage a warning originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    RegionDetection,
    BandConstruction,
    RowAssembly,
    Validation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Important,
}

/// A non-fatal finding surfaced for review alongside the extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractWarning {
    pub stage: Stage,
    pub severity: Severity,
    pub message: String,
}

/// The externally visible artifact of one page extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableExtract {
    pub statement_type: StatementType,
    pub entity_scope: EntityScope,
    pub scale: PresentationScale,
    pub column_keys: Vec<String>,
    pub period_labels: Vec<String>,
    pub rows: Vec<RowRecord>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub validation: Option<ValidationResult>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<ExtractWarning>,
}
