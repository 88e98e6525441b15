use crate::amount::{is_amount_shape, parse_year_token};
use crate::bands::{BandSet, LABEL_KEY, NOTE_KEY};
use crate::model::{ColumnBand, TableRegion, Token};
use crate::profile::schema::ProfileDef;

/// Right edge of the last band when the region has no x bound.
const RIGHT_OPEN: f32 = 9999.0;
/// How far right of the Notes header the note band may extend (pt);
/// note references are 1-2 digits and hug the header.
const NOTE_BAND_EXTENT: f32 = 30.0;
/// Minimum clearance between the note band and the first year column (pt).
const NOTE_BAND_YEAR_MARGIN: f32 = 20.0;
/// Label band margin before the first year column when no Notes column
/// exists (pt).
const LABEL_YEAR_MARGIN: f32 = 30.0;

/// A detected year column header.
#[derive(Debug, Clone)]
pub struct YearAnchor {
    pub year: u16,
    pub x_center: f32,
    pub x0: f32,
    pub x1: f32,
}

/// Find year-shaped column headers around the table top.
///
/// A year token counts as a column header when it sits on the Notes/Rm
/// marker row, or - with no marker row - when it is not embedded in prose
/// (tight-spaced non-numeric neighbors on both sides mean the year is part
/// of a sentence such as "for the 52 weeks ended June 2024").
pub fn detect_year_anchors(
    tokens: &[Token],
    region: &TableRegion,
    profile: &ProfileDef,
) -> Vec<YearAnchor> {
    let tuning = &profile.tuning;
    let header: Vec<&Token> = tokens
        .iter()
        .filter(|t| {
            t.y0 >= region.y_top - tuning.year_window_above
                && t.y0 <= region.y_top + tuning.year_window_below
        })
        .collect();

    let marker_y = header
        .iter()
        .find(|t| {
            let lower = t.text.to_lowercase();
            lower == "rm" || profile.note_column_keywords.iter().any(|k| *k == lower)
        })
        .map(|t| t.y0);

    let mut anchors: Vec<YearAnchor> = Vec::new();
    for (i, t) in header.iter().enumerate() {
        let Some(year) = parse_year_token(&t.text, tuning.year_min, tuning.year_max) else {
            continue;
        };

        match marker_y {
            Some(my) => {
                if (t.y0 - my).abs() > tuning.header_row_span {
                    continue;
                }
            }
            None => {
                let tight_left = header.iter().enumerate().any(|(j, n)| {
                    j != i
                        && (n.y0 - t.y0).abs() < 3.0
                        && n.x1 <= t.x0
                        && t.x0 - n.x1 < tuning.prose_gap
                        && !is_amount_shape(&n.text)
                });
                let tight_right = header.iter().enumerate().any(|(j, n)| {
                    j != i
                        && (n.y0 - t.y0).abs() < 3.0
                        && n.x0 >= t.x1
                        && n.x0 - t.x1 < tuning.prose_gap
                        && !is_amount_shape(&n.text)
                });
                if tight_left && tight_right {
                    continue;
                }
            }
        }

        if anchors.iter().any(|a| a.year == year) {
            continue;
        }
        anchors.push(YearAnchor {
            year,
            x_center: t.x_center(),
            x0: t.x0,
            x1: t.x1,
        });
    }

    anchors.sort_by(|a, b| a.x_center.total_cmp(&b.x_center));
    anchors
}

/// Build the label / optional notes / year bands from detected anchors.
pub fn build_flat_bands(
    tokens: &[Token],
    region: &TableRegion,
    anchors: &[YearAnchor],
    profile: &ProfileDef,
) -> BandSet {
    let tuning = &profile.tuning;
    let header: Vec<&Token> = tokens
        .iter()
        .filter(|t| {
            t.y0 >= region.y_top - tuning.year_window_above
                && t.y0 <= region.y_top + tuning.year_window_below
        })
        .collect();

    let notes_x = header
        .iter()
        .find(|t| {
            let lower = t.text.to_lowercase();
            profile.note_column_keywords.iter().any(|k| *k == lower)
        })
        .map(|t| t.x_center());

    let first_year_x0 = anchors.first().map(|a| a.x0).unwrap_or(300.0);

    let mut bands: Vec<ColumnBand> = Vec::new();
    let mut cursor;
    match notes_x {
        Some(nx) => {
            let label_end = nx - tuning.label_gap;
            bands.push(ColumnBand {
                key: LABEL_KEY.to_string(),
                x_start: 0.0,
                x_end: label_end,
                x_center: label_end / 2.0,
                is_note_column: false,
                role: None,
            });
            let notes_end = (nx + NOTE_BAND_EXTENT).min(first_year_x0 - NOTE_BAND_YEAR_MARGIN);
            bands.push(ColumnBand {
                key: NOTE_KEY.to_string(),
                x_start: label_end,
                x_end: notes_end,
                x_center: nx,
                is_note_column: true,
                role: None,
            });
            cursor = notes_end;
        }
        None => {
            let label_end = first_year_x0 - LABEL_YEAR_MARGIN;
            bands.push(ColumnBand {
                key: LABEL_KEY.to_string(),
                x_start: 0.0,
                x_end: label_end,
                x_center: label_end / 2.0,
                is_note_column: false,
                role: None,
            });
            cursor = label_end;
        }
    }

    let right_edge = region.x_max.unwrap_or(RIGHT_OPEN);
    for (i, anchor) in anchors.iter().enumerate() {
        let x_start = cursor;
        let x_end = if i == anchors.len() - 1 {
            right_edge
        } else {
            // Midpoint between this header's right edge and the next one's
            // left edge.
            (anchor.x1 + anchors[i + 1].x0) / 2.0
        };
        bands.push(ColumnBand {
            key: anchor.year.to_string(),
            x_start,
            x_end,
            x_center: anchor.x_center,
            is_note_column: false,
            role: None,
        });
        cursor = x_end;
    }

    BandSet::new(bands)
}
