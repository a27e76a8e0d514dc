//! Core records flowing through the pipeline, from raw cells to the
//! aggregated biomass table.

/// Midpoints (cm) of the ten fixed size bands, ascending.
pub const SIZE_BANDS: [f64; 10] = [
    1.25, 3.75, 6.25, 8.75, 12.5, 17.5, 25.0, 35.0, 45.0, 75.0,
];

/// Columns per survey block: ten band columns, large abundance, large size.
pub const BLOCK_WIDTH: usize = SIZE_BANDS.len() + 2;

/// A value-bearing cell from the survey sheet, absolutely addressed
/// (0-based row/col), with the fill flag already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCell {
    pub row: u32,
    pub col: u32,
    pub value: CellValue,
    pub flagged: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// Numeric reading of a cell. Text and empty cells count as zero per
    /// the malformed-cell rule; a flagged cell is zero regardless.
    pub fn as_number(&self) -> f64 {
        match self {
            CellValue::Number(n) => *n,
            CellValue::Text(_) | CellValue::Empty => 0.0,
        }
    }
}

/// The normalized survey grid: header rows and label columns stripped,
/// flagged cells zeroed, plus the ordered species-label list.
///
/// Row i of `values` and entry i of `species` describe the same species
/// slot. That parity is validated before reshaping, not here.
#[derive(Debug, Clone, Default)]
pub struct SurveyGrid {
    pub values: Vec<Vec<f64>>,
    pub species: Vec<String>,
}

impl SurveyGrid {
    pub fn row_count(&self) -> usize {
        self.values.len()
    }

    /// Width of the grid. Rows are rectangular by construction.
    pub fn col_count(&self) -> usize {
        self.values.first().map_or(0, |row| row.len())
    }
}

/// One unpivoted row: a (survey, species slot, size band) cell of the wide
/// grid, carrying the block's shared large-band fields.
#[derive(Debug, Clone, PartialEq)]
pub struct LongObservation {
    pub survey: u32,
    /// 0-based species slot, positionally bound to the species list.
    pub slot: usize,
    /// Band midpoint in cm, one of [`SIZE_BANDS`].
    pub size_band: f64,
    pub abundance: f64,
    pub large_abundance: f64,
    pub large_size: f64,
}

/// Survey metadata from the `Data` sheet. Rows without a recorded date are
/// excluded at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyMeta {
    pub survey: u32,
    pub transect: String,
    pub observer: String,
    pub area: Option<f64>,
}

/// Species reference data: diet category and length-weight coefficients.
/// The reference sheet may be stale, so lookups can legitimately miss.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesMeta {
    pub species: String,
    pub diet: String,
    pub a: Option<f64>,
    pub b: Option<f64>,
}

/// A long observation with species identity and both metadata joins
/// applied. Unmatched joins leave `None`s that later drop the row.
#[derive(Debug, Clone)]
pub struct EnrichedObservation {
    pub survey: u32,
    pub species: String,
    pub size_band: f64,
    pub abundance: f64,
    pub large_abundance: f64,
    pub large_size: f64,
    pub diet: Option<String>,
    pub observer: Option<String>,
    pub area: Option<f64>,
    pub a: Option<f64>,
    pub b: Option<f64>,
}

/// Per-band biomass, after large-band deduplication and drop rules.
#[derive(Debug, Clone, PartialEq)]
pub struct BiomassRecord {
    pub survey: u32,
    pub species: String,
    pub diet: String,
    pub observer: String,
    pub abundance: f64,
    pub biomass_kg_ha: f64,
}

/// Final aggregate: one row per (survey, species, diet, observer), summed
/// over size bands.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub survey: u32,
    pub species: String,
    pub diet: String,
    pub observer: String,
    pub abundance: f64,
    pub biomass_kg_ha: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
