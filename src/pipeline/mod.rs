//! The survey-processing pipeline.
//!
//! One forward pass over three immutable source tables: normalize the
//! raw grid, unpivot it into the long band table, bind species and join
//! metadata, compute biomass, aggregate. Each step consumes one table
//! and produces the next; the only mutations are the explicit flagged-
//! cell zeroing and the large-band deduplication.

pub mod aggregate;
pub mod biomass;
pub mod merge;
pub mod normalize;
pub mod reshape;

use crate::config::PipelineConfig;
use crate::error::ReefResult;
use crate::types::{RawCell, ResultTable, SpeciesMeta, SurveyMeta};
use reshape::BandSchema;
use tracing::debug;

/// Counts reported after a run, for the CLI summary line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub surveys: usize,
    pub species_slots: usize,
    pub observations: usize,
    pub dropped_missing_reference: usize,
    pub dropped_non_positive: usize,
    pub result_rows: usize,
}

/// Run the full pipeline over in-memory source tables.
pub fn run(
    cells: &[RawCell],
    survey_meta: Vec<SurveyMeta>,
    species_meta: Vec<SpeciesMeta>,
    config: &PipelineConfig,
) -> ReefResult<(ResultTable, RunSummary)> {
    let grid = normalize::normalize_grid(cells, config);
    debug!(
        rows = grid.row_count(),
        cols = grid.col_count(),
        species = grid.species.len(),
        "normalized grid"
    );

    let schema = BandSchema::standard();
    let surveys = schema.survey_count(grid.col_count())?;
    let species_slots = grid.row_count();
    let observations = reshape::reshape(&grid, &schema)?;

    let survey_map = merge::survey_meta_map(survey_meta);
    let reference_map = merge::species_meta_map(species_meta);
    let enriched = merge::enrich(observations, &grid.species, &survey_map, &reference_map);
    let observation_count = enriched.len();

    let (records, drops) = biomass::compute(enriched);
    let table = aggregate::aggregate(records);
    debug!(
        observations = observation_count,
        dropped_missing_reference = drops.missing_reference,
        dropped_non_positive = drops.non_positive,
        result_rows = table.len(),
        "pipeline complete"
    );

    let summary = RunSummary {
        surveys,
        species_slots,
        observations: observation_count,
        dropped_missing_reference: drops.missing_reference,
        dropped_non_positive: drops.non_positive,
        result_rows: table.len(),
    };
    Ok((table, summary))
}
