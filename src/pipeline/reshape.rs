//! Wide-to-long reshaping of the normalized grid.
//!
//! The grid repeats one 12-column block per survey. Column roles inside a
//! block are fixed by [`BandSchema`], validated against the actual column
//! count before any row is produced, and the unpivot itself is a lazy
//! iterator so the band semantics stay explicit instead of going through
//! a generic matrix transform.

use crate::error::{ReefError, ReefResult};
use crate::types::{LongObservation, SurveyGrid, SIZE_BANDS};

/// Role of one column inside a survey block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BandField {
    /// Abundance for a fixed size band (midpoint in cm).
    Band(f64),
    /// Abundance for the unbounded "large" band.
    LargeAbundance,
    /// Representative size value for the large band.
    LargeSize,
}

/// Ordered column roles for one survey block.
#[derive(Debug, Clone)]
pub struct BandSchema {
    fields: Vec<BandField>,
}

impl BandSchema {
    /// The fixed survey-block layout: ten band columns, then the two
    /// large-band columns.
    pub fn standard() -> Self {
        let mut fields: Vec<BandField> = SIZE_BANDS.iter().map(|b| BandField::Band(*b)).collect();
        fields.push(BandField::LargeAbundance);
        fields.push(BandField::LargeSize);
        Self { fields }
    }

    pub fn block_width(&self) -> usize {
        self.fields.len()
    }

    /// Band midpoints with their in-block column offsets.
    pub fn band_offsets(&self) -> Vec<(usize, f64)> {
        self.fields
            .iter()
            .enumerate()
            .filter_map(|(offset, field)| match field {
                BandField::Band(midpoint) => Some((offset, *midpoint)),
                _ => None,
            })
            .collect()
    }

    fn offset_of(&self, wanted: BandField) -> usize {
        self.fields
            .iter()
            .position(|field| *field == wanted)
            .expect("standard schema carries both large-band fields")
    }

    /// Number of survey blocks in a grid `total_columns` wide.
    pub fn survey_count(&self, total_columns: usize) -> ReefResult<usize> {
        let width = self.block_width();
        if total_columns % width != 0 {
            return Err(ReefError::SchemaMismatch(format!(
                "grid has {} data columns, not a multiple of the {}-column survey block",
                total_columns, width
            )));
        }
        Ok(total_columns / width)
    }
}

/// Validate the grid against the schema and return the unpivot iterator.
///
/// Fails with `SchemaMismatch` when the column count is not divisible by
/// the block width, or when the species-label count does not match the
/// grid row count (the source data mis-binds silently in that case, so it
/// is fatal here).
pub fn reshape<'a>(
    grid: &'a SurveyGrid,
    schema: &BandSchema,
) -> ReefResult<LongObservations<'a>> {
    let survey_count = schema.survey_count(grid.col_count())?;
    if grid.species.len() != grid.row_count() {
        return Err(ReefError::SchemaMismatch(format!(
            "{} species labels for {} grid rows; positional binding would misassign",
            grid.species.len(),
            grid.row_count()
        )));
    }

    Ok(LongObservations {
        grid,
        band_offsets: schema.band_offsets(),
        large_abundance_offset: schema.offset_of(BandField::LargeAbundance),
        large_size_offset: schema.offset_of(BandField::LargeSize),
        block_width: schema.block_width(),
        survey_count,
        slot: 0,
        survey: 0,
        band: 0,
    })
}

/// Lazy unpivot: one [`LongObservation`] per (slot, survey, band), in
/// slot-major order. Cardinality is `slots × surveys × bands`.
#[derive(Debug)]
pub struct LongObservations<'a> {
    grid: &'a SurveyGrid,
    band_offsets: Vec<(usize, f64)>,
    large_abundance_offset: usize,
    large_size_offset: usize,
    block_width: usize,
    survey_count: usize,
    slot: usize,
    survey: usize,
    band: usize,
}

impl Iterator for LongObservations<'_> {
    type Item = LongObservation;

    fn next(&mut self) -> Option<LongObservation> {
        if self.slot >= self.grid.row_count() || self.survey_count == 0 {
            return None;
        }

        let row = &self.grid.values[self.slot];
        let base = self.survey * self.block_width;
        let (offset, midpoint) = self.band_offsets[self.band];
        let observation = LongObservation {
            survey: (self.survey + 1) as u32,
            slot: self.slot,
            size_band: midpoint,
            abundance: row[base + offset],
            large_abundance: row[base + self.large_abundance_offset],
            large_size: row[base + self.large_size_offset],
        };

        self.band += 1;
        if self.band == self.band_offsets.len() {
            self.band = 0;
            self.survey += 1;
            if self.survey == self.survey_count {
                self.survey = 0;
                self.slot += 1;
            }
        }
        Some(observation)
    }
}
