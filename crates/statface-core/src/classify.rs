use crate::amount::{is_amount_shape, is_note_shape};
use crate::bands::{BandSet, LABEL_KEY};
use crate::model::Token;

/// What a token inside the table region is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Label,
    NoteRef,
    Amount,
}

/// Classify one in-region token by band membership and lexical shape.
///
/// A note-shaped token whose x-range overlaps the note band is a note
/// reference even when its center drifts into the neighboring value band.
/// Numeric text in a value band is an amount; anything else in a value band
/// is a label rather than a silently miscounted number. Returns None for
/// tokens outside every band.
pub fn classify_token(token: &Token, bands: &BandSet) -> Option<TokenKind> {
    let text = token.text.trim();

    if is_note_shape(text) && bands.overlaps_note_band(token) {
        return Some(TokenKind::NoteRef);
    }

    let band = bands.band_for_x(token.x_center())?;

    if band.is_note_column {
        return Some(if is_note_shape(text) {
            TokenKind::NoteRef
        } else {
            TokenKind::Label
        });
    }

    if band.key == LABEL_KEY {
        return Some(TokenKind::Label);
    }

    Some(if is_amount_shape(text) {
        TokenKind::Amount
    } else {
        TokenKind::Label
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::NOTE_KEY;
    use crate::model::ColumnBand;

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
            band("2025", 250.0, 350.0, false),
            band("2024", 350.0, 9999.0, false),
        ])
    }

    #[test]
    fn test_amount_in_value_band() {
        let bands = bands();
        let t = Token::new("26 278", 280.0, 300.0, 330.0, 310.0);
        assert_eq!(classify_token(&t, &bands), Some(TokenKind::Amount));
    }

    #[test]
    fn test_dash_is_amount() {
        let bands = bands();
        let t = Token::new("-", 300.0, 300.0, 305.0, 310.0);
        assert_eq!(classify_token(&t, &bands), Some(TokenKind::Amount));
    }

    #[test]
    fn test_note_by_overlap_not_center() {
        let bands = bands();
        // Center at 255 (inside "2025" band), left edge overlaps note band
        let t = Token::new("12", 245.0, 300.0, 265.0, 310.0);
        assert_eq!(classify_token(&t, &bands), Some(TokenKind::NoteRef));
    }

    #[test]
    fn test_label_band_numbers_stay_labels() {
        let bands = bands();
        let t = Token::new("2024", 100.0, 300.0, 130.0, 310.0);
        assert_eq!(classify_token(&t, &bands), Some(TokenKind::Label));
    }

    #[test]
    fn test_text_in_value_band_is_label() {
        let bands = bands();
        let t = Token::new("restated", 300.0, 300.0, 340.0, 310.0);
        assert_eq!(classify_token(&t, &bands), Some(TokenKind::Label));
    }

    #[test]
    fn test_text_in_note_band_is_label() {
        let bands = bands();
        let t = Token::new("ref", 220.0, 300.0, 240.0, 310.0);
        assert_eq!(classify_token(&t, &bands), Some(TokenKind::Label));
    }

    #[test]
    fn test_outside_bands_is_none() {
        let bands = BandSet::new(vec![ColumnBand {
            key: LABEL_KEY.to_string(),
            x_start: 0.0,
            x_end: 200.0,
            x_center: 100.0,
            is_note_column: false,
            role: None,
        }]);
        let t = Token::new("stray", 300.0, 300.0, 340.0, 310.0);
        assert_eq!(classify_token(&t, &bands), None);
    }
}
