//! Grid normalization: zeroing of colour-flagged cells, header/label
//! trimming and species-label collection.
//!
//! The input sheet carries two header rows (survey numbers, size classes)
//! and two label columns (row labels, species labels). Everything past
//! those is the numeric abundance grid. Flagged cells hold
//! non-instantaneous counts and read as zero whatever their value.

use crate::config::PipelineConfig;
use crate::types::{CellValue, RawCell, SurveyGrid};

/// Build the normalized numeric grid and the ordered species list from
/// the raw sheet cells.
///
/// Grid rows are not filtered by label presence; species-list/grid parity
/// is validated later, at reshape time.
pub fn normalize_grid(cells: &[RawCell], config: &PipelineConfig) -> SurveyGrid {
    let header_rows = config.header_rows;
    let label_columns = config.label_columns;
    let label_col = config.species_label_column();

    let mut max_row = None::<u32>;
    let mut max_col = None::<u32>;
    for cell in cells {
        if cell.row >= header_rows {
            max_row = Some(max_row.map_or(cell.row, |r| r.max(cell.row)));
        }
        if cell.col >= label_columns {
            max_col = Some(max_col.map_or(cell.col, |c| c.max(cell.col)));
        }
    }
    let (max_row, max_col) = match (max_row, max_col) {
        (Some(r), Some(c)) => (r, c),
        _ => return SurveyGrid::default(),
    };

    let height = (max_row - header_rows + 1) as usize;
    let width = (max_col - label_columns + 1) as usize;
    let mut values = vec![vec![0.0; width]; height];
    let mut labels: Vec<(u32, String)> = Vec::new();

    for cell in cells {
        if cell.row < header_rows {
            continue;
        }
        if cell.col == label_col {
            if let CellValue::Text(text) = &cell.value {
                let label = strip_label(text);
                if !label.is_empty() {
                    labels.push((cell.row, label));
                }
            }
            continue;
        }
        if cell.col < label_columns {
            continue;
        }
        let row = (cell.row - header_rows) as usize;
        let col = (cell.col - label_columns) as usize;
        values[row][col] = if cell.flagged {
            0.0
        } else {
            cell.value.as_number()
        };
    }

    // Cell order is whatever the reader produced; labels bind by sheet row.
    labels.sort_by_key(|(row, _)| *row);
    let species = labels.into_iter().map(|(_, label)| label).collect();

    SurveyGrid { values, species }
}

/// Species labels arrive with a leading separator artifact from the
/// source sheet; strip one leading '.' or '_' and surrounding whitespace.
fn strip_label(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = trimmed
        .strip_prefix('.')
        .or_else(|| trimmed.strip_prefix('_'))
        .unwrap_or(trimmed);
    stripped.trim().to_string()
}
