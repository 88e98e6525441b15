use crate::bands::{BandSet, LABEL_KEY, NOTE_KEY};
use crate::model::{
    CanonicalRole, ColumnBand, ExtractWarning, Severity, Stage, TableRegion, Token,
};
use crate::profile::schema::ProfileDef;

/// Right edge of the last band when nothing caps it.
const RIGHT_OPEN: f32 = 9999.0;
/// Foreign statement titles only cap the band range when they start in the
/// right portion of the page (pt).
const FOREIGN_TITLE_MIN_X: f32 = 400.0;
/// Clearance kept before a foreign statement title (pt).
const FOREIGN_TITLE_MARGIN: f32 = 20.0;
/// Same-line / adjacency tolerances for the bare-"Total" lookahead (pt).
const SAME_LINE_SPAN: f32 = 3.0;
const ADJACENT_GAP: f32 = 15.0;
/// Tolerances for detecting "Total" stacked above "equity" in a wrapped
/// header (pt).
const STACKED_X_TOLERANCE: f32 = 20.0;
const STACKED_ROW_GAP: f32 = 10.0;

/// A detected canonical-role column header.
#[derive(Debug, Clone)]
pub struct RoleAnchor {
    pub role: CanonicalRole,
    pub x_center: f32,
    pub x0: f32,
    pub x1: f32,
    pub word_fallback: bool,
}

/// The note column header, when present.
#[derive(Debug, Clone)]
pub struct NoteAnchor {
    pub x_center: f32,
}

/// Scan header tokens for canonical-role anchors.
///
/// Two passes: whole-phrase patterns first, then single-word fragments in
/// x-order for headers that wrap mid-phrase across visual rows. Only the
/// first match per role is kept. A bare "Total" is taken as
/// `attributable_total` only when it sits right of the non-controlling-
/// interest anchor and is not the "Total" of a split "Total equity".
pub fn detect_role_anchors(
    tokens: &[Token],
    region: &TableRegion,
    profile: &ProfileDef,
    warnings: &mut Vec<ExtractWarning>,
) -> (Vec<RoleAnchor>, Option<NoteAnchor>) {
    let tuning = &profile.tuning;
    let mut header: Vec<&Token> = tokens
        .iter()
        .filter(|t| t.y0 >= region.y_top && t.y0 <= region.y_top + tuning.header_window)
        .collect();
    header.sort_by(|a, b| a.y0.total_cmp(&b.y0).then(a.x0.total_cmp(&b.x0)));

    let mut anchors: Vec<RoleAnchor> = Vec::new();
    let seen = |anchors: &[RoleAnchor], role: CanonicalRole| {
        anchors.iter().any(|a| a.role == role)
    };

    // Pass 1: whole phrases against individual token text (catches
    // hyphenated and unsplit headers).
    for def in &profile.roles {
        if seen(&anchors, def.role) {
            continue;
        }
        'tokens: for t in &header {
            let lower = t.text.to_lowercase();
            for phrase in &def.phrases {
                if lower.contains(phrase.as_str()) {
                    anchors.push(RoleAnchor {
                        role: def.role,
                        x_center: t.x_center(),
                        x0: t.x0,
                        x1: t.x1,
                        word_fallback: false,
                    });
                    break 'tokens;
                }
            }
        }
    }

    // Pass 2: single-word fragments, left to right, for wrapped headers
    // ("Total" / "equity" on separate rows).
    let mut by_x: Vec<&Token> = header.clone();
    by_x.sort_by(|a, b| a.x0.total_cmp(&b.x0));
    for t in &by_x {
        let word = t.text.trim().to_lowercase();
        for def in &profile.roles {
            if seen(&anchors, def.role) {
                continue;
            }
            if def.words.iter().any(|w| *w == word) {
                anchors.push(RoleAnchor {
                    role: def.role,
                    x_center: t.x_center(),
                    x0: t.x0,
                    x1: t.x1,
                    word_fallback: true,
                });
                warnings.push(ExtractWarning {
                    stage: Stage::BandConstruction,
                    severity: Severity::Info,
                    message: format!(
                        "header role '{}' matched via single-word fragment '{}'",
                        def.role, word
                    ),
                });
            }
        }
    }

    // Bare "Total" as attributable_total, position-disambiguated. Without
    // an NCI anchor there is no "right of NCI" to test, so no bare "Total"
    // is accepted at all.
    let nci_anchor_x = anchors
        .iter()
        .find(|a| a.role == CanonicalRole::NonControllingInterest)
        .map(|a| a.x_center);
    if let (false, Some(nci_x)) = (seen(&anchors, CanonicalRole::AttributableTotal), nci_anchor_x) {
        for t in &header {
            if t.text.trim().to_lowercase() != "total" || t.x_center() <= nci_x {
                continue;
            }
            // Not the "Total" of a split or wrapped "Total equity" header:
            // an adjacent "equity" on the same line, or stacked below.
            let part_of_total_equity = header.iter().any(|n| {
                let same_line = (n.y0 - t.y0).abs() < SAME_LINE_SPAN
                    && n.x0 >= t.x1
                    && n.x0 - t.x1 < ADJACENT_GAP;
                let stacked_below = (n.x_center() - t.x_center()).abs() < STACKED_X_TOLERANCE
                    && n.y0 > t.y0
                    && n.y0 - t.y1 < STACKED_ROW_GAP;
                (same_line || stacked_below) && n.text.trim().to_lowercase() == "equity"
            });
            if part_of_total_equity {
                continue;
            }
            anchors.push(RoleAnchor {
                role: CanonicalRole::AttributableTotal,
                x_center: t.x_center(),
                x0: t.x0,
                x1: t.x1,
                word_fallback: true,
            });
            warnings.push(ExtractWarning {
                stage: Stage::BandConstruction,
                severity: Severity::Important,
                message: format!(
                    "bare 'Total' at x={:.0} assigned attributable_total by position",
                    t.x_center()
                ),
            });
            break;
        }
    }

    let note_anchor = header
        .iter()
        .find(|t| {
            let lower = t.text.to_lowercase();
            profile.note_column_keywords.iter().any(|k| *k == lower)
        })
        .map(|t| NoteAnchor {
            x_center: t.x_center(),
        });

    anchors.sort_by(|a, b| a.x_center.total_cmp(&b.x_center));
    (anchors, note_anchor)
}

/// Build bands from role anchors: neighbor-midpoint boundaries, label band
/// from 0 to the first anchor, last band capped where another statement's
/// title starts (or at the region's right bound).
pub fn build_hierarchical_bands(
    tokens: &[Token],
    region: &TableRegion,
    anchors: &[RoleAnchor],
    note_anchor: Option<&NoteAnchor>,
    profile: &ProfileDef,
) -> BandSet {
    let tuning = &profile.tuning;

    struct Anchor {
        key: String,
        role: Option<CanonicalRole>,
        x_center: f32,
        is_note: bool,
    }

    let mut all: Vec<Anchor> = Vec::new();
    if let Some(n) = note_anchor {
        all.push(Anchor {
            key: NOTE_KEY.to_string(),
            role: None,
            x_center: n.x_center,
            is_note: true,
        });
    }
    for a in anchors {
        all.push(Anchor {
            key: a.role.key().to_string(),
            role: Some(a.role),
            x_center: a.x_center,
            is_note: false,
        });
    }
    all.sort_by(|a, b| a.x_center.total_cmp(&b.x_center));

    let mut right_edge = region.x_max.unwrap_or(RIGHT_OPEN);
    let header: Vec<&Token> = tokens
        .iter()
        .filter(|t| t.y0 >= region.y_top && t.y0 <= region.y_top + tuning.header_window)
        .collect();
    for t in &header {
        let lower = t.text.to_lowercase();
        if t.x0 > FOREIGN_TITLE_MIN_X
            && profile
                .foreign_title_keywords
                .iter()
                .any(|k| lower.contains(k.as_str()))
        {
            right_edge = right_edge.min(t.x0 - FOREIGN_TITLE_MARGIN);
        }
    }

    let mut bands: Vec<ColumnBand> = Vec::new();
    let first_x = all.first().map(|a| a.x_center).unwrap_or(0.0);
    let label_end = first_x - tuning.label_gap;
    bands.push(ColumnBand {
        key: LABEL_KEY.to_string(),
        x_start: 0.0,
        x_end: label_end,
        x_center: label_end / 2.0,
        is_note_column: false,
        role: None,
    });

    for (i, anchor) in all.iter().enumerate() {
        let x_start = if i == 0 {
            label_end
        } else {
            (all[i - 1].x_center + anchor.x_center) / 2.0
        };
        let x_end = if i == all.len() - 1 {
            right_edge
        } else {
            (anchor.x_center + all[i + 1].x_center) / 2.0
        };
        bands.push(ColumnBand {
            key: anchor.key.clone(),
            x_start,
            x_end,
            x_center: anchor.x_center,
            is_note_column: anchor.is_note,
            role: anchor.role,
        });
    }

    BandSet::new(bands)
}
