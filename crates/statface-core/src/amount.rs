use rust_decimal::Decimal;
use std::str::FromStr;

/// Lexical shape checks and numeric parsing for statement-face tokens.
///
/// Handles formats like:
/// - "26278" -> 26278
/// - "26 278" (space or NBSP thousands) -> 26278
/// - "1,284.5" -> 1284.5
/// - "(2 624)" -> -2624
/// - "-" / "—" / "–" -> 0 (dash-as-zero convention on statement faces)
///
/// A dash or em/en-dash standing alone in a value column means "nil".
pub fn is_dash(text: &str) -> bool {
    matches!(text.trim(), "-" | "\u{2014}" | "\u{2013}")
}

/// Parse an amount string into a Decimal. Parenthesized values are negative.
/// Returns None when the text is not a complete, well-formed amount.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let s = text.trim().replace('\u{a0}', " ");
    if is_dash(&s) {
        return Some(Decimal::ZERO);
    }

    let (negative, body) = if s.len() >= 2 && s.starts_with('(') && s.ends_with(')') {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s.as_str())
    };

    let compact: String = body.chars().filter(|c| *c != ' ' && *c != ',').collect();
    if compact.is_empty() || !compact.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let value = Decimal::from_str(&compact).ok()?;
    Some(if negative { -value } else { value })
}

/// True if the text looks like (part of) an amount.
///
/// Looser than `parse_amount`: unbalanced parenthesis fragments such as
/// "(2" or "624)" count, so that split negatives classify as amounts and
/// recombine during row assembly.
pub fn is_amount_shape(text: &str) -> bool {
    let s = text.trim().replace('\u{a0}', " ");
    if is_dash(&s) {
        return true;
    }
    let t = s.as_str();
    let t = t.strip_prefix('(').unwrap_or(t);
    let t = t.strip_suffix(')').unwrap_or(t);
    let t = t.strip_prefix('-').unwrap_or(t);
    !t.is_empty()
        && t.chars().any(|c| c.is_ascii_digit())
        && t.chars()
            .all(|c| c.is_ascii_digit() || c == ' ' || c == ',' || c == '.')
}

/// True if the text has note-reference shape: 1-3 digits, an optional
/// dotted sub-reference ("38.1") and an optional trailing letter ("5a").
pub fn is_note_shape(text: &str) -> bool {
    let t = text.trim();
    let mut chars = t.chars().peekable();

    let mut leading = 0;
    while chars.peek().is_some_and(|c| c.is_ascii_digit()) {
        chars.next();
        leading += 1;
    }
    if leading == 0 || leading > 3 {
        return false;
    }

    if chars.peek() == Some(&'.') {
        chars.next();
        let mut sub = 0;
        while chars.peek().is_some_and(|c| c.is_ascii_digit()) {
            chars.next();
            sub += 1;
        }
        if sub == 0 || sub > 2 {
            return false;
        }
    }

    if chars.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
        chars.next();
    }

    chars.next().is_none()
}

/// Parse a year-shaped header token ("2024", "2024*") within the plausible
/// range. Returns the year value.
pub fn parse_year_token(text: &str, year_min: u16, year_max: u16) -> Option<u16> {
    let t = text.trim().trim_end_matches('*');
    if t.len() != 4 || !t.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year: u16 = t.parse().ok()?;
    if (year_min..=year_max).contains(&year) {
        Some(year)
    } else {
        None
    }
}
