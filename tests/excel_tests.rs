//! Workbook I/O tests: fixtures written with rust_xlsxwriter, read back
//! through the calamine readers and the style-XML fill parser.

use calamine::{open_workbook, Data, Reader, Xlsx};
use pretty_assertions::assert_eq;
use reefmetrics::config::PipelineConfig;
use reefmetrics::excel::{
    read_species_meta, read_survey_cells, read_survey_meta, ResultExporter,
};
use reefmetrics::pipeline;
use reefmetrics::types::{ResultRow, ResultTable, SIZE_BANDS};
use rust_xlsxwriter::{Color, Format, Workbook};
use std::path::Path;
use tempfile::TempDir;

// ═══════════════════════════════════════════════════════════════════════════
// FIXTURE WRITERS
// ═══════════════════════════════════════════════════════════════════════════

/// Survey fixture: one species row, one 12-column block. Band 1.25 holds
/// abundance 4; the 3.75 column holds 9 but is colour-filled (a
/// non-instantaneous count) and must read as zero.
fn write_survey_fixture(path: &Path) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("INPUT Sheet").unwrap();

    for col in 0..12u16 {
        worksheet.write_number(0, col + 2, 1.0).unwrap();
        let band = SIZE_BANDS[(col as usize).min(9)];
        worksheet.write_number(1, col + 2, band).unwrap();
    }

    worksheet.write_number(2, 0, 1.0).unwrap();
    worksheet.write_string(2, 1, ".Naso lituratus").unwrap();

    let filled = Format::new().set_background_color(Color::Yellow);
    worksheet.write_number(2, 2, 4.0).unwrap();
    worksheet.write_number_with_format(2, 3, 9.0, &filled).unwrap();
    for col in 4..14u16 {
        worksheet.write_number(2, col, 0.0).unwrap();
    }

    workbook.save(path).unwrap();
}

/// Metadata fixture: survey 1 complete, survey 2 without a date.
fn write_metadata_fixture(path: &Path) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Data").unwrap();

    let headers = ["Survey", "Transect", "Observer", "Area", "Date"];
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header).unwrap();
    }
    worksheet.write_number(1, 0, 1.0).unwrap();
    worksheet.write_string(1, 1, "T1").unwrap();
    worksheet.write_string(1, 2, "AB").unwrap();
    worksheet.write_number(1, 3, 100.0).unwrap();
    worksheet.write_string(1, 4, "2018-03-01").unwrap();

    worksheet.write_number(2, 0, 2.0).unwrap();
    worksheet.write_string(2, 1, "T2").unwrap();
    worksheet.write_string(2, 2, "CD").unwrap();
    worksheet.write_number(2, 3, 120.0).unwrap();

    workbook.save(path).unwrap();
}

fn write_reference_fixture(path: &Path) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let headers = ["Species", "Diet", "a", "b"];
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header).unwrap();
    }
    worksheet.write_string(1, 0, "Naso lituratus").unwrap();
    worksheet.write_string(1, 1, "Herbivore").unwrap();
    worksheet.write_number(1, 2, 0.01).unwrap();
    worksheet.write_number(1, 3, 3.0).unwrap();

    // Stale row: no coefficients.
    worksheet.write_string(2, 0, "Labroides dimidiatus").unwrap();
    worksheet.write_string(2, 1, "Planktivore").unwrap();

    workbook.save(path).unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════
// READER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_survey_cells_carry_fill_flags() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("survey.xlsx");
    write_survey_fixture(&path);

    let cells = read_survey_cells(&path, &PipelineConfig::default()).unwrap();

    let plain = cells.iter().find(|c| c.row == 2 && c.col == 2).unwrap();
    assert!(!plain.flagged);
    assert_eq!(plain.value.as_number(), 4.0);

    let filled = cells.iter().find(|c| c.row == 2 && c.col == 3).unwrap();
    assert!(filled.flagged);

    assert_eq!(cells.iter().filter(|c| c.flagged).count(), 1);
}

#[test]
fn test_survey_meta_excludes_dateless_rows() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("meta.xlsx");
    write_metadata_fixture(&path);

    let rows = read_survey_meta(&path, "Data").unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].survey, 1);
    assert_eq!(rows[0].transect, "T1");
    assert_eq!(rows[0].observer, "AB");
    assert_eq!(rows[0].area, Some(100.0));
}

#[test]
fn test_species_meta_reads_optional_coefficients() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("reference.xlsx");
    write_reference_fixture(&path);

    let rows = read_species_meta(&path).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].species, "Naso lituratus");
    assert_eq!(rows[0].diet, "Herbivore");
    assert_eq!(rows[0].a, Some(0.01));
    assert_eq!(rows[0].b, Some(3.0));
    assert_eq!(rows[1].species, "Labroides dimidiatus");
    assert_eq!(rows[1].a, None);
    assert_eq!(rows[1].b, None);
}

// ═══════════════════════════════════════════════════════════════════════════
// EXPORTER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_export_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("biomass.xlsx");

    let table = ResultTable {
        rows: vec![ResultRow {
            survey: 3,
            species: "Naso lituratus".to_string(),
            diet: "Herbivore".to_string(),
            observer: "AB".to_string(),
            abundance: 7.0,
            biomass_kg_ha: 1.25,
        }],
    };
    ResultExporter::new(table).export(&path).unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    let range = workbook.worksheet_range("Biomass").unwrap();

    assert_eq!(
        range.get((0, 0)),
        Some(&Data::String("survey".to_string()))
    );
    assert_eq!(
        range.get((0, 5)),
        Some(&Data::String("biomass_kg_ha".to_string()))
    );
    assert_eq!(range.get((1, 0)), Some(&Data::Float(3.0)));
    assert_eq!(
        range.get((1, 1)),
        Some(&Data::String("Naso lituratus".to_string()))
    );
    assert_eq!(range.get((1, 4)), Some(&Data::Float(7.0)));
    assert_eq!(range.get((1, 5)), Some(&Data::Float(1.25)));
}

// ═══════════════════════════════════════════════════════════════════════════
// FILE-TO-FILE PIPELINE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_full_run_from_workbooks() {
    let temp_dir = TempDir::new().unwrap();
    let survey_path = temp_dir.path().join("survey.xlsx");
    let meta_path = temp_dir.path().join("meta.xlsx");
    let reference_path = temp_dir.path().join("reference.xlsx");
    let output_path = temp_dir.path().join("out.xlsx");
    write_survey_fixture(&survey_path);
    write_metadata_fixture(&meta_path);
    write_reference_fixture(&reference_path);

    let config = PipelineConfig::default();
    let cells = read_survey_cells(&survey_path, &config).unwrap();
    let survey_meta = read_survey_meta(&meta_path, &config.metadata_sheet).unwrap();
    let species_meta = read_species_meta(&reference_path).unwrap();

    let (table, summary) = pipeline::run(&cells, survey_meta, species_meta, &config).unwrap();

    // The flagged 3.75-band count (9) is zeroed: only the 1.25-band
    // abundance of 4 survives.
    assert_eq!(summary.surveys, 1);
    assert_eq!(table.len(), 1);
    let row = &table.rows[0];
    assert_eq!(row.abundance, 4.0);
    assert!((row.biomass_kg_ha - 0.0078125).abs() < 1e-12);

    ResultExporter::new(table).export(&output_path).unwrap();
    let mut workbook: Xlsx<_> = open_workbook(&output_path).unwrap();
    let range = workbook.worksheet_range("Biomass").unwrap();
    assert_eq!(range.get((1, 4)), Some(&Data::Float(4.0)));
}
