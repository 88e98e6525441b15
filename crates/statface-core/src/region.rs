use crate::model::{EntityScope, PresentationScale, StatementType, TableRegion, Token};
use crate::profile::schema::{ProfileDef, StatementProfileDef, Tuning};

/// Bottom used when no end anchor is found; effectively "rest of the page".
const FALLBACK_BOTTOM: f32 = 9999.0;

/// A reconstructed visual line: tokens grouped by y, joined in x-order.
/// Text is lowercased; lines exist only for phrase matching.
#[derive(Debug, Clone)]
pub struct TextLine {
    pub y_top: f32,
    pub y_bottom: f32,
    pub text: String,
}

/// Group tokens into visual lines so multi-word anchors ("total equity and
/// liabilities", "balance at 1 july 2024") can match word-granular input.
pub fn group_lines(tokens: &[Token], y_tolerance: f32) -> Vec<TextLine> {
    use std::collections::BTreeMap;

    let mut buckets: BTreeMap<i64, Vec<&Token>> = BTreeMap::new();
    for t in tokens {
        let key = (t.y_center() / y_tolerance).round() as i64;
        buckets.entry(key).or_default().push(t);
    }

    let mut lines = Vec::with_capacity(buckets.len());
    for (_, mut row) in buckets {
        row.sort_by(|a, b| a.x0.total_cmp(&b.x0));
        let y_top = row.iter().map(|t| t.y0).fold(f32::INFINITY, f32::min);
        let y_bottom = row.iter().map(|t| t.y1).fold(f32::NEG_INFINITY, f32::max);
        let text = row
            .iter()
            .map(|t| t.text.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(TextLine {
            y_top,
            y_bottom,
            text,
        });
    }
    lines
}

/// Auto-detect the statement type from title phrases in the page's upper
/// lines. Profile order decides ties.
pub fn detect_statement_type(lines: &[TextLine], profile: &ProfileDef) -> Option<StatementType> {
    let head = head_text(lines, 10);
    profile
        .statements
        .iter()
        .find(|sp| sp.title_phrases.iter().any(|p| head.contains(p.as_str())))
        .map(|sp| sp.statement_type)
}

/// Group vs separate-company scope, from the title wording.
pub fn detect_entity_scope(lines: &[TextLine]) -> EntityScope {
    let head = head_text(lines, 10);
    if head.contains("separate") || head.contains("company") {
        EntityScope::Company
    } else {
        EntityScope::Group
    }
}

/// Presentation scale from header markers (Rm, R'000, "billion").
pub fn detect_scale(lines: &[TextLine]) -> PresentationScale {
    let head = head_text(lines, 12);
    let has_word = |w: &str| head.split_whitespace().any(|t| t == w);
    if has_word("rm") || head.contains("r million") || head.contains("million") {
        PresentationScale::Million
    } else if head.contains("r'000") || head.contains("thousand") {
        PresentationScale::Thousand
    } else if head.contains("billion") {
        PresentationScale::Billion
    } else {
        PresentationScale::Units
    }
}

fn head_text(lines: &[TextLine], n: usize) -> String {
    lines
        .iter()
        .take(n)
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decide whether the page holds two statements side by side and, if so,
/// which horizontal half carries the requested one.
///
/// Majority vote of content-keyword hits per half, for the requested
/// statement AND the others: the page is only restricted when the target's
/// keywords sit on one half and some other statement's keywords majority-sit
/// on the opposite half. Returns (x_min, x_max) overlapping the midline.
pub fn find_statement_half(
    tokens: &[Token],
    target: &StatementProfileDef,
    others: &[&StatementProfileDef],
    tuning: &Tuning,
) -> Option<(f32, f32)> {
    if tokens.is_empty() {
        return None;
    }
    let page_width = tokens.iter().map(|t| t.x1).fold(0.0_f32, f32::max);
    let page_mid = page_width / 2.0;

    let target_words = keyword_words(&target.content_keywords);
    let other_words: Vec<String> = others
        .iter()
        .flat_map(|sp| keyword_words(&sp.content_keywords))
        .filter(|w| !target_words.contains(w))
        .collect();

    let mut target_left = 0usize;
    let mut target_right = 0usize;
    let mut other_left = 0usize;
    let mut other_right = 0usize;

    for t in tokens {
        let word = t
            .text
            .trim_matches(|c: char| !c.is_alphanumeric() && c != '-')
            .to_lowercase();
        if word.is_empty() {
            continue;
        }
        let left = t.x_center() < page_mid;
        if target_words.iter().any(|w| *w == word) {
            if left {
                target_left += 1;
            } else {
                target_right += 1;
            }
        }
        if other_words.iter().any(|w| *w == word) {
            if left {
                other_left += 1;
            } else {
                other_right += 1;
            }
        }
    }

    if target_left == target_right {
        return None;
    }
    let target_on_left = target_left > target_right;

    // Opposing-statement evidence must dominate the other half, otherwise
    // this is a single full-width statement and restricting would cut columns.
    let (opp_hits, same_hits) = if target_on_left {
        (other_right, other_left)
    } else {
        (other_left, other_right)
    };
    if opp_hits == 0 || opp_hits <= same_hits {
        return None;
    }

    if target_on_left {
        Some((0.0, page_mid + tuning.half_overlap))
    } else {
        Some((page_mid - tuning.half_overlap, page_width + 100.0))
    }
}

fn keyword_words(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .flat_map(|k| k.split_whitespace())
        .map(|w| w.to_lowercase())
        .collect()
}

/// Find the table's vertical extent: below the first start-anchor line,
/// down to the last end-anchor line (or the rest of the page).
pub fn detect_region(lines: &[TextLine], sp: &StatementProfileDef) -> Option<TableRegion> {
    let mut y_top: Option<f32> = None;
    let mut y_bottom: Option<f32> = None;

    for line in lines {
        if sp.start_anchors.iter().any(|a| line.text.contains(a.as_str())) {
            let candidate = line.y_bottom;
            if y_top.is_none_or(|cur| candidate < cur) {
                y_top = Some(candidate);
            }
        }
        if sp.end_anchors.iter().any(|a| line.text.contains(a.as_str())) {
            let candidate = line.y_bottom;
            if y_bottom.is_none_or(|cur| candidate > cur) {
                y_bottom = Some(candidate);
            }
        }
    }

    let y_top = y_top?;
    let y_bottom = match y_bottom {
        Some(b) if b > y_top => b,
        _ => FALLBACK_BOTTOM,
    };

    Some(TableRegion {
        y_top,
        y_bottom,
        x_min: None,
        x_max: None,
    })
}
