use clap::{Parser, Subcommand};
use reefmetrics::cli;
use reefmetrics::config::PipelineConfig;
use reefmetrics::error::ReefResult;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reefmetrics")]
#[command(about = "Underwater visual-census processing: survey workbooks to biomass tables.")]
#[command(long_about = "reefmetrics - survey workbook processor

Turns raw fish-survey spreadsheets into per-survey-per-species
abundance/biomass tables using the length-weight formula W = a * L^b.

COMMANDS:
  process - Run the full pipeline and write the biomass table
  check   - Validate survey-sheet structure without writing

EXAMPLES:
  reefmetrics process survey.xlsx meta.xlsx reference.xlsx -o biomass.xlsx
  reefmetrics check survey.xlsx --input-sheet 'INPUT Sheet'")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Run the full pipeline.

Reads three workbooks: the raw survey grid (colour-flagged cells mark
non-instantaneous counts and are zeroed), survey metadata ('Data' sheet;
rows without a date are excluded) and the species reference table (diet,
length-weight coefficients a and b).

Rows whose species or survey has no metadata match are reported as
data-quality warnings and dropped once biomass cannot be computed; a
survey grid whose shape does not fit the 12-column block schema fails
the run.")]
    /// Run the full pipeline and write the biomass table
    Process {
        /// Survey workbook (raw grid + cell fills)
        survey: PathBuf,

        /// Survey metadata workbook
        metadata: PathBuf,

        /// Species reference workbook
        reference: PathBuf,

        /// Output .xlsx path
        #[arg(short, long)]
        output: PathBuf,

        /// Sheet holding the raw survey grid
        #[arg(long, default_value = "INPUT Sheet")]
        input_sheet: String,

        /// Sheet holding survey metadata
        #[arg(long, default_value = "Data")]
        metadata_sheet: String,

        /// Show verbose processing steps
        #[arg(short, long)]
        verbose: bool,
    },

    #[command(long_about = "Validate survey-sheet structure without writing.

Checks that the grid's data-column count is an exact multiple of the
12-column survey block and that the species-label count matches the
grid row count. Exits non-zero on a schema mismatch.")]
    /// Validate survey-sheet structure without writing
    Check {
        /// Survey workbook (raw grid + cell fills)
        survey: PathBuf,

        /// Sheet holding the raw survey grid
        #[arg(long, default_value = "INPUT Sheet")]
        input_sheet: String,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> ReefResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            survey,
            metadata,
            reference,
            output,
            input_sheet,
            metadata_sheet,
            verbose,
        } => {
            let config = PipelineConfig {
                input_sheet,
                metadata_sheet,
                ..PipelineConfig::default()
            };
            cli::process(survey, metadata, reference, output, config, verbose)
        }

        Commands::Check {
            survey,
            input_sheet,
            verbose,
        } => {
            let config = PipelineConfig {
                input_sheet,
                ..PipelineConfig::default()
            };
            cli::check(survey, config, verbose)
        }
    }
}
