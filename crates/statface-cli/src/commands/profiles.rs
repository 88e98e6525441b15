use statface_core::error::ExtractError;
use statface_core::profile::{builtin, load_profile};
use std::path::Path;

pub fn list() -> Result<(), ExtractError> {
    for name in builtin::PRESETS {
        let profile = builtin::load_preset(name)?;
        let description = profile.description.as_deref().unwrap_or("");
        println!("{:<12} {}  (v{})", name, description, profile.version);
    }
    Ok(())
}

pub fn explain(preset: &str) -> Result<(), ExtractError> {
    let profile = builtin::load_preset(preset)?;

    println!("Profile: {} (v{})", profile.name, profile.version);
    if let Some(desc) = &profile.description {
        println!("{desc}");
    }
    println!();

    println!("Statements:");
    for sp in &profile.statements {
        println!(
            "  {:<5} titles: {}",
            sp.statement_type.to_string(),
            sp.title_phrases.join(", ")
        );
        println!(
            "        region: starts at {}; ends at {}",
            sp.start_anchors.join(" / "),
            if sp.end_anchors.is_empty() {
                "page end".to_string()
            } else {
                sp.end_anchors.join(" / ")
            }
        );
        if !sp.section_headings.is_empty() {
            let names: Vec<&str> = sp.section_headings.iter().map(|h| h.name.as_str()).collect();
            println!("        sections: {}", names.join(", "));
        }
    }
    println!();

    println!("Equity column roles (in header order):");
    for rk in &profile.roles {
        let mut hints = rk.phrases.clone();
        hints.extend(rk.words.iter().map(|w| format!("~{w}")));
        println!("  {:<26} {}", rk.role.to_string(), hints.join(", "));
    }
    println!();

    let t = &profile.tuning;
    println!("Tuning:");
    println!("  row y-tolerance        {} pt", t.row_y_tolerance);
    println!("  amount gap threshold   {} pt", t.amount_gap_threshold);
    println!("  identity tolerance     {}", t.identity_tolerance);
    println!("  header window          {} pt", t.header_window);
    println!("  year range             {}-{}", t.year_min, t.year_max);

    Ok(())
}

pub fn schema() -> Result<(), ExtractError> {
    println!(
        r#"An extraction profile is a JSON object:

{{
  "name": "my-filer-family",            // required
  "description": "optional free text",
  "version": "1.0",                     // required
  "tuning": {{                           // optional, all fields defaulted
    "row_y_tolerance": 5.0,             // same-row y distance (pt)
    "amount_gap_threshold": 15.0,       // concat gap for split numbers (pt)
    "identity_tolerance": "1.0",        // decimal string
    "header_window": 120.0,
    "year_min": 2015,
    "year_max": 2040
  }},
  "note_column_keywords": ["notes", "note"],
  "label_noise_prefixes": ["Rm"],
  "foreign_title_keywords": ["cash", "flows"],
  "statements": [                       // one entry per statement type
    {{
      "statement_type": "SOCE",         // SFP | SCI | CF | SOCE
      "title_phrases": ["changes in equity"],
      "content_keywords": ["balance", "retained"],
      "start_anchors": ["total equity"],
      "end_anchors": ["balance at"],
      "section_headings": [
        {{ "name": "Total comprehensive income",
           "phrases": ["total comprehensive"] }}
      ],
      "section_reset_phrases": ["balance at"]
    }}
  ],
  "roles": [                            // SOCE header keywords per role
    {{ "role": "total_equity",
       "phrases": ["total equity"],     // whole-phrase match, first pass
       "words": ["equity"] }}           // wrapped-header fragments
  ]
}}

The three main roles (total_equity, non_controlling_interest,
attributable_total) must all have keyword entries."#
    );
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), ExtractError> {
    let profile = load_profile(file)?;
    println!(
        "OK: profile '{}' (v{}) with {} statement(s) and {} role(s)",
        profile.name,
        profile.version,
        profile.statements.len(),
        profile.roles.len()
    );
    Ok(())
}
