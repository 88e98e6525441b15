use statface_core::model::{Severity, TableExtract};
use statface_core::PageInspection;

const LABEL_WIDTH_CAP: usize = 44;
const VALUE_WIDTH: usize = 12;

pub fn print(extract: &TableExtract) {
    println!(
        "=== {} ({}, scale: {}) ===\n",
        extract.statement_type, extract.entity_scope, extract.scale
    );
    if !extract.period_labels.is_empty() {
        println!("Periods: {}\n", extract.period_labels.join(", "));
    }

    let label_width = extract
        .rows
        .iter()
        .map(|r| r.raw_label.len())
        .max()
        .unwrap_or(10)
        .min(LABEL_WIDTH_CAP);

    // Header line
    print!("{:<width$}  {:>4}", "", "note", width = label_width);
    for key in &extract.column_keys {
        print!("  {:>width$}", truncate(key, VALUE_WIDTH), width = VALUE_WIDTH);
    }
    println!();

    let mut current_section: Option<&str> = None;
    for row in &extract.rows {
        if row.section.as_deref() != current_section {
            current_section = row.section.as_deref();
            if let Some(section) = current_section {
                println!("--- {section} ---");
            }
        }

        print!(
            "{:<width$}  {:>4}",
            truncate(&row.raw_label, label_width),
            row.note_reference.as_deref().unwrap_or(""),
            width = label_width
        );
        for key in &extract.column_keys {
            let cell = match row.values.get(key) {
                Some(Some(v)) => v.to_string(),
                _ => "".to_string(),
            };
            print!("  {cell:>width$}", width = VALUE_WIDTH);
        }
        println!();
    }
    println!();

    if let Some(validation) = &extract.validation {
        if validation.passed {
            println!("Validation: PASS");
        } else {
            println!("Validation: FAIL");
        }
        for (rule, residual) in &validation.residuals {
            println!("  {rule}: residual {residual}");
        }
        for violation in &validation.violations {
            println!("  violation: {violation}");
        }
    }

    for w in &extract.warnings {
        let marker = match w.severity {
            Severity::Important => "!",
            Severity::Info => "-",
        };
        println!("  {marker} {}", w.message);
    }
}

pub fn print_inspection(inspection: &PageInspection) {
    println!(
        "Statement: {} ({}, scale: {})",
        inspection.statement_type, inspection.entity_scope, inspection.scale
    );
    println!("Tokens in scope: {}", inspection.token_count);
    match inspection.x_bounds {
        Some((lo, hi)) => println!("Half restriction: x in [{lo:.0}, {hi:.0}]"),
        None => println!("Half restriction: none (full page)"),
    }
    println!(
        "Region: y in [{:.0}, {:.0}]",
        inspection.region.y_top, inspection.region.y_bottom
    );
    println!("Bands:");
    for band in &inspection.bands {
        let detail = if band.is_note_column {
            "  (note column)".to_string()
        } else if let Some(role) = band.role {
            format!("  role: {role}")
        } else {
            String::new()
        };
        println!(
            "  {:<26} x [{:.0}, {:.0}]{}",
            band.key, band.x_start, band.x_end, detail
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}
