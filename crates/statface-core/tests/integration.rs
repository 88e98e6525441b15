//! End-to-end tests for extract_page() over synthetic token pages.
//!
//! Pages are built token by token with explicit geometry, so each scenario
//! controls exactly what the header rows and amount columns look like.

use rust_decimal_macros::dec;
use statface_core::error::ExtractError;
use statface_core::model::{StatementType, Token};
use statface_core::profile::builtin::load_preset;
use statface_core::profile::schema::ProfileDef;
use statface_core::{extract_page, inspect_page, ExtractOptions};
use std::collections::BTreeSet;

fn t(text: &str, x0: f32, x1: f32, y0: f32) -> Token {
    Token::new(text, x0, y0, x1, y0 + 10.0)
}

fn profile() -> ProfileDef {
    load_preset("default").unwrap()
}

/// A changes-in-equity page with a three-role header (total equity at
/// x=300, attributable at x=360, NCI at x=420) and two balance rows.
/// `swap_main` physically swaps the total-equity and attributable amounts
/// relative to their headers.
fn soce_page(swap_main: bool) -> Vec<Token> {
    let mut tokens = vec![
        // Title
        t("Consolidated", 10.0, 80.0, 30.0),
        t("statement", 84.0, 130.0, 30.0),
        t("of", 134.0, 144.0, 30.0),
        t("changes", 148.0, 190.0, 30.0),
        t("in", 194.0, 204.0, 30.0),
        t("equity", 208.0, 240.0, 30.0),
        // Column headers: "Total equity" wraps across two rows
        t("Notes", 185.0, 215.0, 80.0),
        t("Total", 282.0, 318.0, 80.0),
        t("equity", 284.0, 316.0, 92.0),
        t("Attributable", 312.0, 408.0, 80.0),
        t("Non-controlling", 372.0, 468.0, 80.0),
        t("interest", 396.0, 444.0, 92.0),
    ];

    let (c1, c2) = if swap_main {
        // total_equity and attributable amounts swapped in the stream
        ("26130", "26278")
    } else {
        ("26278", "26130")
    };
    let (p1, p2) = if swap_main { ("1000", "1010") } else { ("1010", "1000") };
    let (b1, b2) = if swap_main { ("27130", "27288") } else { ("27288", "27130") };

    // Opening balance row
    tokens.extend([
        t("Balance", 10.0, 60.0, 200.0),
        t("at", 64.0, 74.0, 200.0),
        t("1", 78.0, 84.0, 200.0),
        t("July", 88.0, 112.0, 200.0),
        t("2024", 116.0, 144.0, 200.0),
        t(c1, 270.0, 310.0, 200.0),
        t(c2, 340.0, 380.0, 200.0),
        t("148", 410.0, 430.0, 200.0),
    ]);
    // Movement row
    tokens.extend([
        t("Profit", 10.0, 44.0, 230.0),
        t("for", 48.0, 62.0, 230.0),
        t("the", 66.0, 80.0, 230.0),
        t("year", 84.0, 106.0, 230.0),
        t(p1, 275.0, 305.0, 230.0),
        t(p2, 345.0, 375.0, 230.0),
        t("10", 412.0, 426.0, 230.0),
    ]);
    // Closing balance row
    tokens.extend([
        t("Balance", 10.0, 60.0, 260.0),
        t("at", 64.0, 74.0, 260.0),
        t("30", 78.0, 90.0, 260.0),
        t("June", 94.0, 118.0, 260.0),
        t("2025", 122.0, 150.0, 260.0),
        t(b1, 270.0, 310.0, 260.0),
        t(b2, 340.0, 380.0, 260.0),
        t("158", 410.0, 430.0, 260.0),
    ]);

    tokens
}

/// A flat statement-of-financial-position page with Notes and two year
/// columns.
fn sfp_page() -> Vec<Token> {
    vec![
        // Title
        t("Consolidated", 10.0, 80.0, 30.0),
        t("statement", 84.0, 130.0, 30.0),
        t("of", 134.0, 144.0, 30.0),
        t("financial", 148.0, 196.0, 30.0),
        t("position", 200.0, 244.0, 30.0),
        // Column header row
        t("Notes", 185.0, 215.0, 90.0),
        t("2025", 286.0, 314.0, 90.0),
        t("2024", 406.0, 434.0, 90.0),
        // Table start anchor
        t("Assets", 10.0, 46.0, 120.0),
        // Data row with a thousands-separator split in the 2025 column
        t("Trade", 10.0, 40.0, 200.0),
        t("receivables", 44.0, 100.0, 200.0),
        t("12", 196.0, 210.0, 200.0),
        t("5", 292.0, 298.0, 200.0),
        t("123", 301.0, 319.0, 200.0),
        t("4", 409.0, 415.0, 200.0),
        t("987", 418.0, 436.0, 200.0),
        // Second data row
        t("Inventories", 10.0, 70.0, 230.0),
        t("2100", 290.0, 318.0, 230.0),
        t("1980", 408.0, 436.0, 230.0),
        // End anchor
        t("Total", 10.0, 40.0, 400.0),
        t("equity", 44.0, 78.0, 400.0),
        t("and", 82.0, 100.0, 400.0),
        t("liabilities", 104.0, 156.0, 400.0),
        t("30500", 286.0, 326.0, 400.0),
        t("29100", 404.0, 444.0, 400.0),
    ]
}

// ---------------------------------------------------------------------------
// Scenario 1: roles assigned by keyword, Rule A passes, no search triggered
// ---------------------------------------------------------------------------
#[test]
fn soce_roles_by_keyword_rule_a_passes() {
    let result = extract_page(
        &soce_page(false),
        Some(StatementType::Soce),
        &profile(),
        &ExtractOptions::default(),
    )
    .unwrap();

    assert_eq!(result.statement_type, StatementType::Soce);
    assert_eq!(
        result.column_keys,
        vec!["total_equity", "attributable_total", "non_controlling_interest"]
    );

    let balance = &result.rows[0];
    assert!(balance.raw_label.starts_with("Balance at"));
    assert_eq!(balance.values["total_equity"], Some(dec!(26278)));
    assert_eq!(balance.values["attributable_total"], Some(dec!(26130)));
    assert_eq!(balance.values["non_controlling_interest"], Some(dec!(148)));

    let validation = result.validation.as_ref().unwrap();
    assert!(validation.passed);
    // No permutation search ran
    assert!(!result
        .warnings
        .iter()
        .any(|w| w.message.contains("column shift")));
}

// ---------------------------------------------------------------------------
// Scenario 2: column shift — swapped amounts repaired by the resolver
// ---------------------------------------------------------------------------
#[test]
fn soce_column_shift_repaired() {
    let result = extract_page(
        &soce_page(true),
        Some(StatementType::Soce),
        &profile(),
        &ExtractOptions::default(),
    )
    .unwrap();

    let validation = result.validation.as_ref().unwrap();
    assert!(validation.passed);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.message.contains("column shift")));

    // Every row re-keyed consistently
    let balance = &result.rows[0];
    assert_eq!(balance.values["total_equity"], Some(dec!(26278)));
    assert_eq!(balance.values["attributable_total"], Some(dec!(26130)));
    let profit = &result.rows[1];
    assert_eq!(profit.values["total_equity"], Some(dec!(1010)));
    assert_eq!(profit.values["attributable_total"], Some(dec!(1000)));
    let closing = &result.rows[2];
    assert_eq!(closing.values["total_equity"], Some(dec!(27288)));
}

// ---------------------------------------------------------------------------
// Scenario 3: flat page with a split numeric token recombined
// ---------------------------------------------------------------------------
#[test]
fn sfp_split_amount_recombined() {
    let result = extract_page(
        &sfp_page(),
        Some(StatementType::Sfp),
        &profile(),
        &ExtractOptions::default(),
    )
    .unwrap();

    assert_eq!(result.column_keys, vec!["2025", "2024"]);
    assert_eq!(result.period_labels, vec!["2025", "2024"]);

    let row = result
        .rows
        .iter()
        .find(|r| r.raw_label == "Trade receivables")
        .unwrap();
    assert_eq!(row.values["2025"], Some(dec!(5123)));
    assert_eq!(row.values["2024"], Some(dec!(4987)));
    assert_eq!(row.note_reference.as_deref(), Some("12"));
}

#[test]
fn sfp_type_auto_detected_from_title() {
    let result = extract_page(&sfp_page(), None, &profile(), &ExtractOptions::default()).unwrap();
    assert_eq!(result.statement_type, StatementType::Sfp);
}

// ---------------------------------------------------------------------------
// Scenario 4: two statements sharing a page — processing restricted to the
// half carrying the requested statement
// ---------------------------------------------------------------------------

/// SOCE on the left half, cash-flow content on the right half.
fn two_statement_page() -> Vec<Token> {
    let mut tokens = vec![
        // SOCE title and headers on the left
        t("Statement", 5.0, 50.0, 30.0),
        t("of", 54.0, 62.0, 30.0),
        t("changes", 66.0, 102.0, 30.0),
        t("in", 106.0, 114.0, 30.0),
        t("equity", 118.0, 148.0, 30.0),
        t("Notes", 92.0, 108.0, 80.0),
        t("Total", 138.0, 162.0, 80.0),
        t("equity", 136.0, 164.0, 92.0),
        t("Attributable", 171.0, 219.0, 80.0),
        t("Non-controlling", 226.0, 274.0, 80.0),
        // SOCE rows
        t("Balance", 5.0, 40.0, 200.0),
        t("at", 42.0, 50.0, 200.0),
        t("30", 52.0, 62.0, 200.0),
        t("June", 64.0, 80.0, 200.0),
        t("26278", 140.0, 160.0, 200.0),
        t("26130", 185.0, 205.0, 200.0),
        t("148", 242.0, 258.0, 200.0),
        t("Treasury", 5.0, 48.0, 230.0),
        t("shares", 50.0, 80.0, 230.0),
        t("(10)", 142.0, 158.0, 230.0),
        t("(10)", 187.0, 203.0, 230.0),
        t("-", 248.0, 252.0, 230.0),
        t("Balance", 5.0, 40.0, 260.0),
        t("at", 42.0, 50.0, 260.0),
        t("29", 52.0, 62.0, 260.0),
        t("June", 64.0, 80.0, 260.0),
        t("26268", 140.0, 160.0, 260.0),
        t("26120", 185.0, 205.0, 260.0),
        t("148", 242.0, 258.0, 260.0),
    ];
    // Cash-flow content on the right half
    tokens.extend([
        t("Cash", 350.0, 374.0, 190.0),
        t("generated", 378.0, 428.0, 190.0),
        t("from", 432.0, 454.0, 190.0),
        t("operations", 458.0, 510.0, 190.0),
        t("operating", 350.0, 398.0, 210.0),
        t("investing", 404.0, 452.0, 210.0),
        t("financing", 350.0, 398.0, 230.0),
        t("generated", 404.0, 452.0, 230.0),
        t("999", 530.0, 550.0, 210.0),
        t("888", 530.0, 550.0, 230.0),
        t("777", 570.0, 590.0, 250.0),
    ]);
    tokens
}

#[test]
fn two_statement_page_restricts_to_matching_half() {
    let page = two_statement_page();
    let profile = profile();

    // SOCE resolves to the left half and right-half numbers never leak in
    let result = extract_page(
        &page,
        Some(StatementType::Soce),
        &profile,
        &ExtractOptions::default(),
    )
    .unwrap();

    let balance = &result.rows[0];
    assert_eq!(balance.values["total_equity"], Some(dec!(26278)));
    assert_eq!(balance.values["non_controlling_interest"], Some(dec!(148)));
    assert!(result.validation.as_ref().unwrap().passed);
    for row in &result.rows {
        for value in row.values.values().flatten() {
            assert_ne!(*value, dec!(999));
            assert_ne!(*value, dec!(888));
            assert_ne!(*value, dec!(777));
        }
    }

    // The CF request resolves to the right half
    let inspection = inspect_page(&page, Some(StatementType::Cf), &profile).unwrap();
    let (lo, hi) = inspection.x_bounds.expect("CF should restrict to a half");
    let width = page.iter().map(|t| t.x1).fold(0.0_f32, f32::max);
    assert!(lo > 0.0 && lo < width / 2.0);
    assert!(hi > width);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn determinism_identical_output() {
    let page = soce_page(true);
    let profile = profile();
    let a = extract_page(
        &page,
        Some(StatementType::Soce),
        &profile,
        &ExtractOptions::default(),
    )
    .unwrap();
    let b = extract_page(
        &page,
        Some(StatementType::Soce),
        &profile,
        &ExtractOptions::default(),
    )
    .unwrap();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn column_coverage_exact_key_set() {
    for page in [soce_page(false), sfp_page()] {
        let result = extract_page(&page, None, &profile(), &ExtractOptions::default()).unwrap();
        let expected: BTreeSet<&str> = result.column_keys.iter().map(|k| k.as_str()).collect();
        for row in &result.rows {
            let keys: BTreeSet<&str> = row.values.keys().map(|k| k.as_str()).collect();
            assert_eq!(keys, expected, "row '{}' key set mismatch", row.raw_label);
        }
    }
}

#[test]
fn balance_identity_holds_after_validation() {
    let result = extract_page(
        &soce_page(false),
        Some(StatementType::Soce),
        &profile(),
        &ExtractOptions::default(),
    )
    .unwrap();
    assert!(result.validation.as_ref().unwrap().passed);

    for row in &result.rows {
        let get = |k: &str| row.values.get(k).copied().flatten();
        if let (Some(te), Some(nci), Some(at)) = (
            get("total_equity"),
            get("non_controlling_interest"),
            get("attributable_total"),
        ) {
            assert!((te - (at + nci)).abs() <= dec!(1));
        }
    }
}

#[test]
fn label_completeness() {
    for page in [soce_page(false), sfp_page()] {
        let result = extract_page(&page, None, &profile(), &ExtractOptions::default()).unwrap();
        for row in &result.rows {
            assert!(row.has_values());
            assert!(!row.raw_label.is_empty());
        }
    }
}

#[test]
fn page_without_numbers_fails_with_no_amounts() {
    // Headers present (bands build), but not a single numeric token
    let tokens = vec![
        t("Consolidated", 10.0, 80.0, 30.0),
        t("statement", 84.0, 130.0, 30.0),
        t("of", 134.0, 144.0, 30.0),
        t("changes", 148.0, 190.0, 30.0),
        t("in", 194.0, 204.0, 30.0),
        t("equity", 208.0, 240.0, 30.0),
        t("Total", 282.0, 318.0, 80.0),
        t("equity", 284.0, 316.0, 92.0),
        t("Attributable", 312.0, 408.0, 80.0),
        t("Non-controlling", 372.0, 468.0, 80.0),
        t("Balance", 10.0, 60.0, 200.0),
        t("at", 64.0, 74.0, 200.0),
        t("June", 88.0, 112.0, 200.0),
    ];
    let result = extract_page(
        &tokens,
        Some(StatementType::Soce),
        &profile(),
        &ExtractOptions::default(),
    );
    assert!(matches!(result, Err(ExtractError::NoAmountsFound)));
}

#[test]
fn page_without_anchors_fails_with_no_region() {
    let tokens = vec![
        t("Directors", 10.0, 70.0, 30.0),
        t("report", 74.0, 110.0, 30.0),
        t("narrative", 10.0, 70.0, 60.0),
    ];
    let result = extract_page(
        &tokens,
        Some(StatementType::Sfp),
        &profile(),
        &ExtractOptions::default(),
    );
    assert!(matches!(result, Err(ExtractError::NoTableRegionFound)));
}

#[test]
fn single_role_header_fails_with_insufficient_columns() {
    let tokens = vec![
        t("Statement", 10.0, 60.0, 30.0),
        t("of", 64.0, 74.0, 30.0),
        t("changes", 78.0, 120.0, 30.0),
        t("in", 124.0, 134.0, 30.0),
        t("equity", 138.0, 170.0, 30.0),
        // Only one value column header
        t("Total", 282.0, 318.0, 80.0),
        t("equity", 284.0, 316.0, 92.0),
        t("Balance", 10.0, 60.0, 200.0),
        t("at", 64.0, 74.0, 200.0),
        t("26278", 280.0, 320.0, 200.0),
    ];
    let result = extract_page(
        &tokens,
        Some(StatementType::Soce),
        &profile(),
        &ExtractOptions::default(),
    );
    assert!(matches!(
        result,
        Err(ExtractError::InsufficientColumns { found: 1 })
    ));
}

#[test]
fn strict_mode_promotes_failed_validation() {
    // Identity broken beyond repair: no permutation fits 100 = 50 + 70
    let mut tokens = soce_page(false);
    for tok in tokens.iter_mut() {
        let replacement = match (tok.text.as_str(), tok.y0) {
            ("26278", _) => Some("100"),
            ("26130", _) => Some("70"),
            ("148", y) if y == 200.0 => Some("50"),
            _ => None,
        };
        if let Some(text) = replacement {
            tok.text = text.to_string();
        }
    }

    let relaxed = extract_page(
        &tokens,
        Some(StatementType::Soce),
        &profile(),
        &ExtractOptions::default(),
    )
    .unwrap();
    assert!(!relaxed.validation.as_ref().unwrap().passed);

    let strict = extract_page(
        &tokens,
        Some(StatementType::Soce),
        &profile(),
        &ExtractOptions {
            strict_validation: true,
        },
    );
    assert!(matches!(strict, Err(ExtractError::ValidationFailed { .. })));
}

#[test]
fn multiline_label_folds_across_rows() {
    let mut page = sfp_page();
    // A wrapped label: "Property, plant" on its own line, "and equipment"
    // carrying the amounts
    page.extend([
        t("Property,", 10.0, 60.0, 280.0),
        t("plant", 64.0, 90.0, 280.0),
        t("and", 10.0, 28.0, 300.0),
        t("equipment", 32.0, 84.0, 300.0),
        t("7040", 290.0, 318.0, 300.0),
        t("6645", 408.0, 436.0, 300.0),
    ]);
    let result = extract_page(
        &page,
        Some(StatementType::Sfp),
        &profile(),
        &ExtractOptions::default(),
    )
    .unwrap();
    let row = result
        .rows
        .iter()
        .find(|r| r.raw_label == "Property, plant and equipment")
        .expect("wrapped label should fold into the amount row");
    assert_eq!(row.values["2025"], Some(dec!(7040)));
}
