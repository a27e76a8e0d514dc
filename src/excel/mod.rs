//! Workbook I/O: calamine-backed readers for the three source tables,
//! direct style-XML parsing for cell-fill flags, and the result exporter.

pub mod exporter;
pub mod reader;
pub mod styles;

pub use exporter::ResultExporter;
pub use reader::{read_species_meta, read_survey_cells, read_survey_meta};
pub use styles::{SheetFlags, StyleTable};
