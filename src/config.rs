//! Pipeline configuration.
//!
//! Everything the run depends on is carried here explicitly; there is no
//! ambient state to reset between runs.

/// Immutable configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Sheet holding the raw survey grid.
    pub input_sheet: String,
    /// Sheet holding survey metadata (transect, observer, area, date).
    pub metadata_sheet: String,
    /// Leading header rows to strip (survey-number row, size-class row).
    pub header_rows: u32,
    /// Leading label columns to strip (row labels, species labels).
    pub label_columns: u32,
}

impl PipelineConfig {
    /// 0-based index of the species-label column (the last label column).
    pub fn species_label_column(&self) -> u32 {
        self.label_columns.saturating_sub(1)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_sheet: "INPUT Sheet".to_string(),
            metadata_sheet: "Data".to_string(),
            header_rows: 2,
            label_columns: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.input_sheet, "INPUT Sheet");
        assert_eq!(config.metadata_sheet, "Data");
        assert_eq!(config.header_rows, 2);
        assert_eq!(config.label_columns, 2);
        assert_eq!(config.species_label_column(), 1);
    }
}
