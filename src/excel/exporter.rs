//! Result-table exporter: writes the aggregated biomass table to a
//! single-worksheet xlsx file.

use crate::error::{ReefError, ReefResult};
use crate::types::ResultTable;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

const HEADERS: [&str; 6] = [
    "survey",
    "species",
    "diet",
    "observer",
    "abundance",
    "biomass_kg_ha",
];

/// Exporter for the final (survey, species, diet, observer) table.
pub struct ResultExporter {
    table: ResultTable,
}

impl ResultExporter {
    pub fn new(table: ResultTable) -> Self {
        Self { table }
    }

    /// Write the table to `output_path` as worksheet "Biomass".
    pub fn export(&self, output_path: &Path) -> ReefResult<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name("Biomass")
            .map_err(|e| ReefError::Workbook(format!("failed to set worksheet name: {}", e)))?;

        let bold = Format::new().set_bold();
        for (col, header) in HEADERS.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, *header, &bold)
                .map_err(|e| ReefError::Workbook(format!("failed to write header: {}", e)))?;
        }

        for (idx, row) in self.table.rows.iter().enumerate() {
            let excel_row = (idx + 1) as u32;
            worksheet
                .write_number(excel_row, 0, row.survey as f64)
                .and_then(|ws| ws.write_string(excel_row, 1, &row.species))
                .and_then(|ws| ws.write_string(excel_row, 2, &row.diet))
                .and_then(|ws| ws.write_string(excel_row, 3, &row.observer))
                .and_then(|ws| ws.write_number(excel_row, 4, row.abundance))
                .and_then(|ws| ws.write_number(excel_row, 5, row.biomass_kg_ha))
                .map_err(|e| ReefError::Workbook(format!("failed to write row: {}", e)))?;
        }

        workbook
            .save(output_path)
            .map_err(|e| ReefError::Workbook(format!("failed to save {}: {}", output_path.display(), e)))?;
        Ok(())
    }
}
