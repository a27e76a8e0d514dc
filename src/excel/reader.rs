//! Workbook readers for the three source tables: the raw survey grid,
//! survey metadata (`Data` sheet) and the species reference sheet.

use crate::config::PipelineConfig;
use crate::error::{ReefError, ReefResult};
use crate::excel::styles::SheetFlags;
use crate::types::{CellValue, RawCell, SpeciesMeta, SurveyMeta};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::path::Path;

/// Read the raw survey grid: every occupied cell of the input sheet with
/// its absolute address and resolved fill flag.
pub fn read_survey_cells(path: &Path, config: &PipelineConfig) -> ReefResult<Vec<RawCell>> {
    let flags = SheetFlags::load(path, &config.input_sheet)?;
    let range = open_sheet(path, &config.input_sheet)?;

    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut cells = Vec::new();
    for (row, col, data) in range.used_cells() {
        let row = start_row + row as u32;
        let col = start_col + col as u32;
        cells.push(RawCell {
            row,
            col,
            value: convert_cell(data),
            flagged: flags.is_flagged(row, col),
        });
    }
    Ok(cells)
}

/// Read survey metadata. The survey number is the first column; Transect,
/// Observer, Area and Date are located by header name. Rows without a
/// recorded date are not valid surveys and are excluded here.
pub fn read_survey_meta(path: &Path, sheet: &str) -> ReefResult<Vec<SurveyMeta>> {
    let range = open_sheet(path, sheet)?;
    let (height, _) = range.get_size();

    let transect_col = require_column(&range, sheet, "transect")?;
    let observer_col = require_column(&range, sheet, "observer")?;
    let area_col = require_column(&range, sheet, "area")?;
    let date_col = require_column(&range, sheet, "date")?;

    let mut rows = Vec::new();
    for row in 1..height {
        let survey = match cell_number(&range, row, 0) {
            Some(n) if n >= 0.0 => n.round() as u32,
            _ => continue,
        };
        if !cell_is_present(&range, row, date_col) {
            tracing::debug!(survey, "metadata row has no date, excluded");
            continue;
        }
        rows.push(SurveyMeta {
            survey,
            transect: cell_text(&range, row, transect_col),
            observer: cell_text(&range, row, observer_col),
            area: cell_number(&range, row, area_col),
        });
    }
    Ok(rows)
}

/// Read the species reference table from the first sheet of a workbook:
/// species name in the first column, Diet and the length-weight
/// coefficients a and b located by header name.
pub fn read_species_meta(path: &Path) -> ReefResult<Vec<SpeciesMeta>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| ReefError::Workbook(format!("failed to open {}: {}", path.display(), e)))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ReefError::Workbook(format!("{} has no sheets", path.display())))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| ReefError::Workbook(e.to_string()))?;
    let (height, _) = range.get_size();

    let diet_col = require_column(&range, &sheet, "diet")?;
    let a_col = require_column(&range, &sheet, "a")?;
    let b_col = require_column(&range, &sheet, "b")?;

    let mut rows = Vec::new();
    for row in 1..height {
        let species = cell_text(&range, row, 0);
        if species.is_empty() {
            continue;
        }
        rows.push(SpeciesMeta {
            species,
            diet: cell_text(&range, row, diet_col),
            a: cell_number(&range, row, a_col),
            b: cell_number(&range, row, b_col),
        });
    }
    Ok(rows)
}

fn open_sheet(path: &Path, sheet: &str) -> ReefResult<Range<Data>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| ReefError::Workbook(format!("failed to open {}: {}", path.display(), e)))?;
    workbook
        .worksheet_range(sheet)
        .map_err(|_| ReefError::MissingSheet(format!("{} in {}", sheet, path.display())))
}

fn convert_cell(data: &Data) -> CellValue {
    match data {
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Number(if *b { 1.0 } else { 0.0 }),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::String(s) if !s.trim().is_empty() => CellValue::Text(s.clone()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        _ => CellValue::Empty,
    }
}

/// Locate a column by case-insensitive header match in row 0.
fn find_column(range: &Range<Data>, header: &str) -> Option<usize> {
    let (_, width) = range.get_size();
    (0..width).find(|col| {
        range
            .get((0, *col))
            .map(|cell| cell.to_string().trim().eq_ignore_ascii_case(header))
            .unwrap_or(false)
    })
}

fn require_column(range: &Range<Data>, sheet: &str, header: &str) -> ReefResult<usize> {
    find_column(range, header).ok_or_else(|| {
        ReefError::SchemaMismatch(format!("sheet '{}' has no '{}' column", sheet, header))
    })
}

fn cell_number(range: &Range<Data>, row: usize, col: usize) -> Option<f64> {
    match range.get((row, col)) {
        Some(Data::Float(f)) => Some(*f),
        Some(Data::Int(i)) => Some(*i as f64),
        _ => None,
    }
}

fn cell_text(range: &Range<Data>, row: usize, col: usize) -> String {
    match range.get((row, col)) {
        Some(Data::Empty) | None => String::new(),
        Some(data) => data.to_string().trim().to_string(),
    }
}

/// A date counts as recorded when the cell holds anything non-empty.
fn cell_is_present(range: &Range<Data>, row: usize, col: usize) -> bool {
    match range.get((row, col)) {
        Some(Data::Empty) | None => false,
        Some(Data::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}
