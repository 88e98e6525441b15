pub mod flat;
pub mod hierarchical;

use crate::model::{ColumnBand, Token};

/// Key of the implicit left-most label band.
pub const LABEL_KEY: &str = "label";
/// Key of the optional note-reference band.
pub const NOTE_KEY: &str = "notes";

/// The ordered, non-overlapping column bands of one table.
///
/// Bands jointly cover the table's x-range; the label band spans from 0 to
/// the first anchor and the last band is open-ended to the table's right
/// edge. Built once per page and discarded with the extraction.
#[derive(Debug, Clone)]
pub struct BandSet {
    bands: Vec<ColumnBand>,
}

impl BandSet {
    pub fn new(mut bands: Vec<ColumnBand>) -> BandSet {
        bands.sort_by(|a, b| a.x_start.total_cmp(&b.x_start));
        BandSet { bands }
    }

    pub fn bands(&self) -> &[ColumnBand] {
        &self.bands
    }

    pub fn band_for_x(&self, x: f32) -> Option<&ColumnBand> {
        self.bands
            .iter()
            .find(|b| b.x_start <= x && x <= b.x_end)
    }

    pub fn note_band(&self) -> Option<&ColumnBand> {
        self.bands.iter().find(|b| b.is_note_column)
    }

    /// Value bands: everything except the label and note bands.
    pub fn value_bands(&self) -> impl Iterator<Item = &ColumnBand> {
        self.bands
            .iter()
            .filter(|b| b.key != LABEL_KEY && !b.is_note_column)
    }

    pub fn value_keys(&self) -> Vec<String> {
        self.value_bands().map(|b| b.key.clone()).collect()
    }

    /// A note reference may be slightly misaligned, so membership uses
    /// x-range overlap rather than the center point.
    pub fn overlaps_note_band(&self, token: &Token) -> bool {
        match self.note_band() {
            Some(nb) => token.x0 <= nb.x_end && token.x1 >= nb.x_start,
            None => false,
        }
    }
}
