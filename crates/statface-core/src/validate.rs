use crate::model::{
    CanonicalRole, ExtractWarning, RowRecord, Severity, Stage, ValidationResult,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub const RULE_A: &str = "rule_a";
pub const RULE_B: &str = "rule_b";

/// All assignments of the three main roles to their three detected
/// positions. Deliberately a hard-coded enumeration, not a solver.
const MAIN_ROLE_PERMUTATIONS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

/// Apply the changes-in-equity identity checks to one row's values.
///
/// Rule A: total_equity = attributable_total + non_controlling_interest.
/// Rule B: attributable_total = sum of present owner components.
/// Rule C: treasury_shares is expected <= 0; a positive value is flagged
/// as a violation but does not fail validation.
/// Rules with missing operands pass vacuously.
pub fn validate_values(
    values: &BTreeMap<String, Option<Decimal>>,
    tolerance: Decimal,
) -> ValidationResult {
    let get = |role: CanonicalRole| values.get(role.key()).copied().flatten();

    let te = get(CanonicalRole::TotalEquity);
    let nci = get(CanonicalRole::NonControllingInterest);
    let at = get(CanonicalRole::AttributableTotal);

    let mut residuals: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut violations: Vec<String> = Vec::new();

    let mut rule_a_ok = true;
    if let (Some(te), Some(nci), Some(at)) = (te, nci, at) {
        let residual = (te - (at + nci)).abs();
        rule_a_ok = residual <= tolerance;
        residuals.insert(RULE_A.to_string(), residual);
        if !rule_a_ok {
            violations.push(format!(
                "total_equity {} != attributable_total {} + non_controlling_interest {}",
                te, at, nci
            ));
        }
    }

    let mut rule_b_ok = true;
    let components: Vec<Decimal> = CanonicalRole::OWNER_COMPONENTS
        .iter()
        .filter_map(|r| get(*r))
        .collect();
    if let Some(at) = at {
        if !components.is_empty() {
            let sum: Decimal = components.iter().copied().sum();
            let residual = (at - sum).abs();
            rule_b_ok = residual <= tolerance;
            residuals.insert(RULE_B.to_string(), residual);
            if !rule_b_ok {
                violations.push(format!(
                    "attributable_total {} != sum of owner components {}",
                    at, sum
                ));
            }
        }
    }

    if let Some(ts) = get(CanonicalRole::TreasuryShares) {
        if ts > Decimal::ZERO {
            violations.push("treasury_shares positive (expected negative)".to_string());
        }
    }

    ValidationResult {
        passed: rule_a_ok && rule_b_ok,
        residuals,
        violations,
    }
}

/// Validate the extraction and repair column-shift errors.
///
/// Evaluated on the first "Balance at" row (else the first row carrying all
/// three main roles). When Rule A fails, every assignment of the three main
/// roles to their detected positions is tried; the lowest-residual
/// assignment within tolerance wins and every row's values are re-keyed
/// under it. When none passes, the original assignment is returned with
/// `passed = false` so the caller can route to the fallback.
pub fn resolve_column_shift(
    column_keys: &mut [String],
    rows: &mut [RowRecord],
    tolerance: Decimal,
    warnings: &mut Vec<ExtractWarning>,
) -> ValidationResult {
    let Some(eval_idx) = find_evaluation_row(rows) else {
        // Nothing to check against: no row carries the main roles.
        return ValidationResult {
            passed: true,
            residuals: BTreeMap::new(),
            violations: Vec::new(),
        };
    };

    let initial = validate_values(&rows[eval_idx].values, tolerance);
    let rule_a_failed = initial
        .residuals
        .get(RULE_A)
        .is_some_and(|r| *r > tolerance);
    if !rule_a_failed {
        return initial;
    }

    let main_keys: Vec<String> = CanonicalRole::MAIN.iter().map(|r| r.key().to_string()).collect();
    let slot_values: Vec<Option<Decimal>> = main_keys
        .iter()
        .map(|k| rows[eval_idx].values.get(k).copied().flatten())
        .collect();
    let (Some(v0), Some(v1), Some(v2)) = (slot_values[0], slot_values[1], slot_values[2]) else {
        return initial;
    };
    let slots = [v0, v1, v2];

    // Rule A cannot tell the NCI and attributable columns apart (addition
    // commutes), so equal residuals break toward the assignment that moves
    // the fewest columns.
    let mut best: Option<([usize; 3], Decimal, usize)> = None;
    for perm in MAIN_ROLE_PERMUTATIONS {
        // perm[i] names which main role slot i takes
        let mut assigned = [Decimal::ZERO; 3];
        for (slot, role_idx) in perm.iter().enumerate() {
            assigned[*role_idx] = slots[slot];
        }
        let (te, nci, at) = (assigned[0], assigned[1], assigned[2]);
        let residual = (te - (at + nci)).abs();
        let fixed = perm.iter().enumerate().filter(|(i, r)| i == *r).count();
        let better = match &best {
            None => true,
            Some((_, b_res, b_fixed)) => {
                residual < *b_res || (residual == *b_res && fixed > *b_fixed)
            }
        };
        if better {
            best = Some((perm, residual, fixed));
        }
    }

    let Some((perm, residual, _)) = best else {
        return initial;
    };
    if residual > tolerance || perm == [0, 1, 2] {
        return initial;
    }

    // Re-key every row under the winning assignment.
    let mut key_map: BTreeMap<String, String> = BTreeMap::new();
    for (slot, role_idx) in perm.iter().enumerate() {
        key_map.insert(
            main_keys[slot].clone(),
            CanonicalRole::MAIN[*role_idx].key().to_string(),
        );
    }
    for row in rows.iter_mut() {
        let mut rekeyed: BTreeMap<String, Option<Decimal>> = BTreeMap::new();
        for (k, v) in row.values.iter() {
            let new_key = key_map.get(k).cloned().unwrap_or_else(|| k.clone());
            rekeyed.insert(new_key, *v);
        }
        row.values = rekeyed;
    }
    for key in column_keys.iter_mut() {
        if let Some(new_key) = key_map.get(key) {
            *key = new_key.clone();
        }
    }

    warnings.push(ExtractWarning {
        stage: Stage::Validation,
        severity: Severity::Important,
        message: format!(
            "column shift repaired: {}",
            key_map
                .iter()
                .filter(|(from, to)| from != to)
                .map(|(from, to)| format!("{from} -> {to}"))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    });

    validate_values(&rows[eval_idx].values, tolerance)
}

fn find_evaluation_row(rows: &[RowRecord]) -> Option<usize> {
    let has_main_roles = |row: &RowRecord| {
        CanonicalRole::MAIN
            .iter()
            .all(|r| row.values.get(r.key()).copied().flatten().is_some())
    };
    rows.iter()
        .position(|r| r.raw_label.to_lowercase().contains("balance at") && has_main_roles(r))
        .or_else(|| rows.iter().position(has_main_roles))
}

/// Raw-label sign checks for the flat statements. Warnings only; the labels
/// have not been canonically mapped yet, so nothing here is a hard failure.
pub fn sign_sanity_warnings(rows: &[RowRecord]) -> Vec<ExtractWarning> {
    let mut warnings = Vec::new();
    let impossible = ["total assets", "total equity", "stated capital", "share capital"];

    for row in rows {
        let label = row.raw_label.to_lowercase();
        for value in row.values.values().flatten() {
            if impossible.iter().any(|k| label.contains(k)) && *value < Decimal::ZERO {
                warnings.push(ExtractWarning {
                    stage: Stage::Validation,
                    severity: Severity::Important,
                    message: format!("'{}' is negative ({})", row.raw_label, value),
                });
            } else if (label.contains("depreciation") || label.contains("amortisation"))
                && *value > Decimal::ONE
            {
                warnings.push(ExtractWarning {
                    stage: Stage::Validation,
                    severity: Severity::Info,
                    message: format!("'{}' expected negative, got {}", row.raw_label, value),
                });
            } else if label.contains("revenue")
                && !label.contains("loss")
                && *value < Decimal::ZERO
            {
                warnings.push(ExtractWarning {
                    stage: Stage::Validation,
                    severity: Severity::Info,
                    message: format!("'{}' unexpectedly negative ({})", row.raw_label, value),
                });
            }
        }
    }

    warnings
}
