use crate::amount::parse_amount;
use crate::bands::{BandSet, LABEL_KEY};
use crate::classify::{classify_token, TokenKind};
use crate::model::{RowRecord, TableRegion, Token};
use crate::profile::schema::{ProfileDef, StatementProfileDef};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// Max x-distance between a note candidate and a label fragment for the
/// date guard (pt): a small integer next to a month name is a date part,
/// not a note reference.
const NOTE_DATE_GUARD_GAP: f32 = 50.0;

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Cluster classified tokens into data rows.
///
/// Amount tokens group by rounded y-center; label-only lines buffer as
/// pending label fragments and fold into the next amount-bearing row.
/// Within a row, tokens in the same value band recombine left to right:
/// gaps below the threshold concatenate (thousands-separator line breaks),
/// larger gaps split segments and the first numeric parse wins.
pub fn assemble_rows(
    tokens: &[Token],
    bands: &BandSet,
    region: &TableRegion,
    sp: &StatementProfileDef,
    profile: &ProfileDef,
) -> Vec<RowRecord> {
    let tol = profile.tuning.row_y_tolerance;
    let table_tokens: Vec<&Token> = tokens.iter().filter(|t| region.contains(t)).collect();

    let mut amount_tokens: Vec<&Token> = Vec::new();
    let mut note_tokens: Vec<&Token> = Vec::new();
    let mut label_tokens: Vec<&Token> = Vec::new();
    for t in &table_tokens {
        match classify_token(t, bands) {
            Some(TokenKind::Amount) => amount_tokens.push(*t),
            Some(TokenKind::NoteRef) => note_tokens.push(*t),
            Some(TokenKind::Label) => label_tokens.push(*t),
            None => {}
        }
    }

    let row_key = |t: &Token| (t.y_center() / tol).round() as i64;

    let mut amount_rows: BTreeMap<i64, Vec<&Token>> = BTreeMap::new();
    for t in &amount_tokens {
        amount_rows.entry(row_key(t)).or_default().push(*t);
    }

    let mut label_only_rows: BTreeSet<i64> = BTreeSet::new();
    for t in &label_tokens {
        let key = row_key(t);
        if !amount_rows.contains_key(&key) {
            label_only_rows.insert(key);
        }
    }

    let all_keys: BTreeSet<i64> = amount_rows
        .keys()
        .copied()
        .chain(label_only_rows.iter().copied())
        .collect();

    let value_keys = bands.value_keys();
    let mut rows: Vec<RowRecord> = Vec::new();
    let mut current_section: Option<String> = None;
    let mut pending_labels: Vec<String> = Vec::new();

    for key in all_keys {
        let row_y = key as f32 * tol;

        let mut row_labels: Vec<&Token> = label_tokens
            .iter()
            .copied()
            .filter(|t| {
                (t.y_center() - row_y).abs() <= tol
                    && bands
                        .band_for_x(t.x_center())
                        .is_some_and(|b| b.key == LABEL_KEY)
            })
            .collect();
        row_labels.sort_by(|a, b| a.x0.total_cmp(&b.x0));
        let row_label = strip_label_noise(
            &row_labels
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            &profile.label_noise_prefixes,
        );

        let Some(row_amounts) = amount_rows.get(&key) else {
            // No amounts: a section heading, or the first line of a wrapped
            // label.
            if row_label.is_empty() {
                continue;
            }
            let lower = row_label.to_lowercase();
            if is_section_reset(&lower, sp) {
                current_section = None;
                pending_labels.clear();
            } else if let Some(name) = match_section_heading(&lower, sp) {
                current_section = Some(name);
                pending_labels.clear();
            } else {
                pending_labels.push(row_label);
            }
            continue;
        };

        let mut full_label = pending_labels.join(" ");
        if !row_label.is_empty() {
            if !full_label.is_empty() {
                full_label.push(' ');
            }
            full_label.push_str(&row_label);
        }
        pending_labels.clear();
        let full_label = strip_label_noise(&full_label, &profile.label_noise_prefixes);

        // Stray numbers with no label cannot form a line item.
        if full_label.is_empty() {
            continue;
        }

        let lower = full_label.to_lowercase();
        if is_section_reset(&lower, sp) {
            current_section = None;
        } else if let Some(name) = match_section_heading(&lower, sp) {
            current_section = Some(name);
        }

        let note_reference = find_note_reference(&note_tokens, &label_tokens, row_y, tol);

        let mut by_band: BTreeMap<&str, Vec<&Token>> = BTreeMap::new();
        for t in row_amounts {
            if let Some(band) = bands.band_for_x(t.x_center()) {
                if !band.is_note_column && band.key != LABEL_KEY {
                    by_band.entry(band.key.as_str()).or_default().push(*t);
                }
            }
        }

        let mut values: BTreeMap<String, Option<Decimal>> = BTreeMap::new();
        for vk in &value_keys {
            let value = by_band
                .get(vk.as_str())
                .and_then(|ts| combine_and_parse(ts, profile.tuning.amount_gap_threshold));
            values.insert(vk.clone(), value);
        }

        if values.values().all(|v| v.is_none()) {
            continue;
        }

        rows.push(RowRecord {
            raw_label: full_label,
            note_reference,
            section: current_section.clone(),
            values,
        });
    }

    rows
}

/// Recombine a band's amount fragments and parse.
///
/// Adjacent fragments (gap below threshold) concatenate without a space so
/// "26" + "278" reads 26278; a larger gap starts a new segment and the
/// first segment that parses wins.
fn combine_and_parse(tokens: &[&Token], gap_threshold: f32) -> Option<Decimal> {
    let mut sorted: Vec<&&Token> = tokens.iter().collect();
    sorted.sort_by(|a, b| a.x0.total_cmp(&b.x0));

    let mut segments: Vec<String> = Vec::new();
    for (i, t) in sorted.iter().enumerate() {
        let adjacent = i > 0 && t.x0 - sorted[i - 1].x1 < gap_threshold;
        if adjacent {
            if let Some(last) = segments.last_mut() {
                last.push_str(t.text.trim());
                continue;
            }
        }
        segments.push(t.text.trim().to_string());
    }

    segments.iter().find_map(|s| parse_amount(s))
}

fn find_note_reference(
    note_tokens: &[&Token],
    label_tokens: &[&Token],
    row_y: f32,
    tol: f32,
) -> Option<String> {
    for candidate in note_tokens {
        if (candidate.y_center() - row_y).abs() > tol {
            continue;
        }
        // A small integer beside a month name is part of a date, whichever
        // band it drifted into.
        let next_to_month = label_tokens.iter().any(|l| {
            (l.y_center() - row_y).abs() <= tol
                && (l.x0 - candidate.x1).abs() < NOTE_DATE_GUARD_GAP
                && MONTH_NAMES.contains(&l.text.trim().to_lowercase().as_str())
        });
        if next_to_month {
            continue;
        }
        return Some(candidate.text.trim().to_string());
    }
    None
}

fn strip_label_noise(label: &str, prefixes: &[String]) -> String {
    let mut s = label.trim().to_string();
    // Markers can stack ("Rm Rm ..." on merged header fragments)
    for _ in 0..2 {
        for p in prefixes {
            if let Some(rest) = s.strip_prefix(p.as_str()) {
                if rest.starts_with(' ') {
                    s = rest.trim_start().to_string();
                }
            }
        }
    }
    s
}

fn match_section_heading(lower: &str, sp: &StatementProfileDef) -> Option<String> {
    sp.section_headings
        .iter()
        .find(|h| h.phrases.iter().any(|p| lower.contains(p.as_str())))
        .map(|h| h.name.clone())
}

fn is_section_reset(lower: &str, sp: &StatementProfileDef) -> bool {
    sp.section_reset_phrases
        .iter()
        .any(|p| lower.contains(p.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::NOTE_KEY;
    use crate::model::{ColumnBand, StatementType, TableRegion};
    use crate::profile::builtin::load_preset;
    use rust_decimal_macros::dec;

    fn bands() -> BandSet {
        let band = |key: &str, x_start: f32, x_end: f32, is_note: bool| ColumnBand {
            key: key.to_string(),
            x_start,
            x_end,
            x_center: (x_start + x_end) / 2.0,
            is_note_column: is_note,
            role: None,
        };
        BandSet::new(vec![
            band(LABEL_KEY, 0.0, 200.0, false),
            band(NOTE_KEY, 200.0, 250.0, true),
            band("2025", 250.0, 400.0, false),
            band("2024", 400.0, 9999.0, false),
        ])
    }

    fn region() -> TableRegion {
        TableRegion {
            y_top: 100.0,
            y_bottom: 700.0,
            x_min: None,
            x_max: None,
        }
    }

    fn sfp_rows(tokens: &[Token]) -> Vec<RowRecord> {
        let profile = load_preset("default").unwrap();
        let sp = profile.statement(StatementType::Sfp).unwrap();
        assemble_rows(tokens, &bands(), &region(), sp, &profile)
    }

    #[test]
    fn test_simple_row() {
        let tokens = vec![
            Token::new("Trade", 10.0, 200.0, 40.0, 210.0),
            Token::new("receivables", 44.0, 200.0, 100.0, 210.0),
            Token::new("5123", 300.0, 200.0, 330.0, 210.0),
            Token::new("4987", 450.0, 200.0, 480.0, 210.0),
        ];
        let rows = sfp_rows(&tokens);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].raw_label, "Trade receivables");
        assert_eq!(rows[0].values["2025"], Some(dec!(5123)));
        assert_eq!(rows[0].values["2024"], Some(dec!(4987)));
    }

    #[test]
    fn test_split_amount_recombined() {
        // "5 123": thousands separator split into two tokens 4pt apart
        let tokens = vec![
            Token::new("Trade", 10.0, 200.0, 40.0, 210.0),
            Token::new("receivables", 44.0, 200.0, 100.0, 210.0),
            Token::new("5", 300.0, 200.0, 306.0, 210.0),
            Token::new("123", 310.0, 200.0, 330.0, 210.0),
            Token::new("4987", 450.0, 200.0, 480.0, 210.0),
        ];
        let rows = sfp_rows(&tokens);
        assert_eq!(rows[0].values["2025"], Some(dec!(5123)));
    }

    #[test]
    fn test_distant_fragment_keeps_first_parse() {
        // Two numbers land in the same band but far apart: not a split
        // number, keep the first
        let tokens = vec![
            Token::new("Inventories", 10.0, 200.0, 80.0, 210.0),
            Token::new("123", 260.0, 200.0, 280.0, 210.0),
            Token::new("456", 370.0, 200.0, 390.0, 210.0),
            Token::new("999", 450.0, 200.0, 470.0, 210.0),
        ];
        let rows = sfp_rows(&tokens);
        assert_eq!(rows[0].values["2025"], Some(dec!(123)));
        assert_eq!(rows[0].values["2024"], Some(dec!(999)));
    }

    #[test]
    fn test_split_negative_recombined() {
        let tokens = vec![
            Token::new("Treasury", 10.0, 200.0, 60.0, 210.0),
            Token::new("shares", 64.0, 200.0, 100.0, 210.0),
            Token::new("(2", 300.0, 200.0, 312.0, 210.0),
            Token::new("624)", 316.0, 200.0, 340.0, 210.0),
            Token::new("-", 450.0, 200.0, 455.0, 210.0),
        ];
        let rows = sfp_rows(&tokens);
        assert_eq!(rows[0].values["2025"], Some(dec!(-2624)));
        assert_eq!(rows[0].values["2024"], Some(dec!(0)));
    }

    #[test]
    fn test_multiline_label_folds_into_next_row() {
        let tokens = vec![
            // Label-only line
            Token::new("Property,", 10.0, 180.0, 60.0, 190.0),
            Token::new("plant", 64.0, 180.0, 90.0, 190.0),
            // Amount-bearing continuation
            Token::new("and", 10.0, 200.0, 28.0, 210.0),
            Token::new("equipment", 32.0, 200.0, 85.0, 210.0),
            Token::new("7040", 300.0, 200.0, 330.0, 210.0),
            Token::new("6645", 450.0, 200.0, 480.0, 210.0),
        ];
        let rows = sfp_rows(&tokens);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].raw_label, "Property, plant and equipment");
    }

    #[test]
    fn test_note_reference_consumed() {
        let tokens = vec![
            Token::new("Inventories", 10.0, 200.0, 80.0, 210.0),
            Token::new("12", 215.0, 200.0, 228.0, 210.0),
            Token::new("5123", 300.0, 200.0, 330.0, 210.0),
            Token::new("4987", 450.0, 200.0, 480.0, 210.0),
        ];
        let rows = sfp_rows(&tokens);
        assert_eq!(rows[0].note_reference.as_deref(), Some("12"));
        assert_eq!(rows[0].values["2025"], Some(dec!(5123)));
    }

    #[test]
    fn test_section_heading_sets_context_without_row() {
        let tokens = vec![
            // Heading line, no amounts
            Token::new("Current", 10.0, 180.0, 50.0, 190.0),
            Token::new("assets", 54.0, 180.0, 90.0, 190.0),
            // Data row under the heading
            Token::new("Inventories", 10.0, 210.0, 80.0, 220.0),
            Token::new("5123", 300.0, 210.0, 330.0, 220.0),
            Token::new("4987", 450.0, 210.0, 480.0, 220.0),
        ];
        let rows = sfp_rows(&tokens);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].section.as_deref(), Some("Current assets"));
        assert_eq!(rows[0].raw_label, "Inventories");
    }

    #[test]
    fn test_rm_marker_stripped_from_label() {
        let tokens = vec![
            Token::new("Rm", 10.0, 200.0, 25.0, 210.0),
            Token::new("Revenue", 30.0, 200.0, 75.0, 210.0),
            Token::new("5123", 300.0, 200.0, 330.0, 210.0),
            Token::new("4987", 450.0, 200.0, 480.0, 210.0),
        ];
        let rows = sfp_rows(&tokens);
        assert_eq!(rows[0].raw_label, "Revenue");
    }

    #[test]
    fn test_date_fragment_is_not_a_note() {
        let profile = load_preset("default").unwrap();
        let sp = profile.statement(StatementType::Soce).unwrap();
        // "Balance at 1 July 2024" where "1" drifts over the note band
        let tokens = vec![
            Token::new("Balance", 10.0, 200.0, 55.0, 210.0),
            Token::new("at", 59.0, 200.0, 70.0, 210.0),
            Token::new("1", 202.0, 200.0, 208.0, 210.0),
            Token::new("July", 212.0, 200.0, 237.0, 210.0),
            Token::new("5123", 300.0, 200.0, 330.0, 210.0),
            Token::new("4987", 450.0, 200.0, 480.0, 210.0),
        ];
        let rows = assemble_rows(&tokens, &bands(), &region(), sp, &profile);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].note_reference, None);
    }

    #[test]
    fn test_every_row_has_full_key_set() {
        let tokens = vec![
            Token::new("Goodwill", 10.0, 200.0, 60.0, 210.0),
            // Only the 2025 column carries a value
            Token::new("311", 300.0, 200.0, 320.0, 210.0),
        ];
        let rows = sfp_rows(&tokens);
        assert_eq!(rows.len(), 1);
        let keys: Vec<&String> = rows[0].values.keys().collect();
        assert_eq!(keys, vec!["2024", "2025"]);
        assert_eq!(rows[0].values["2024"], None);
    }
}
