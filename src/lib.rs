//! reefmetrics - underwater visual-census biomass tables
//!
//! Turns raw fish-survey workbooks (per-transect counts in fixed size
//! bands, with colour-flagged cells marking non-instantaneous
//! observations) into a per-survey-per-species abundance/biomass table.
//!
//! # Pipeline
//!
//! - Zero colour-flagged cells, strip header rows and label columns
//! - Unpivot the repeated 12-column survey blocks into a long band table
//! - Bind species positionally, left-join survey and species metadata
//! - Apply the length-weight formula `W = a * L^b`, deduplicating the
//!   catch-all "large" band, and drop rows without usable metadata
//! - Aggregate to one row per (survey, species, diet, observer)
//!
//! # Example
//!
//! ```no_run
//! use reefmetrics::config::PipelineConfig;
//! use reefmetrics::excel::{read_species_meta, read_survey_cells, read_survey_meta};
//! use reefmetrics::pipeline;
//! use std::path::Path;
//!
//! let config = PipelineConfig::default();
//! let cells = read_survey_cells(Path::new("survey.xlsx"), &config)?;
//! let surveys = read_survey_meta(Path::new("meta.xlsx"), &config.metadata_sheet)?;
//! let species = read_species_meta(Path::new("reference.xlsx"))?;
//!
//! let (table, summary) = pipeline::run(&cells, surveys, species, &config)?;
//! println!("{} result rows ({} dropped)", table.len(),
//!     summary.dropped_missing_reference + summary.dropped_non_positive);
//! # Ok::<(), reefmetrics::error::ReefError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod excel;
pub mod pipeline;
pub mod types;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use error::{ReefError, ReefResult};
pub use types::{ResultRow, ResultTable};
