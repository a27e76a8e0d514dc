use crate::config::PipelineConfig;
use crate::error::ReefResult;
use crate::excel::{read_species_meta, read_survey_cells, read_survey_meta, ResultExporter};
use crate::pipeline;
use crate::pipeline::reshape::BandSchema;
use colored::Colorize;
use std::path::PathBuf;

/// Execute the process command: full pipeline run plus export.
pub fn process(
    survey: PathBuf,
    metadata: PathBuf,
    reference: PathBuf,
    output: PathBuf,
    config: PipelineConfig,
    verbose: bool,
) -> ReefResult<()> {
    println!("{}", "🐠 reefmetrics - Processing survey".bold().green());
    println!("   Survey:    {}", survey.display());
    println!("   Metadata:  {}", metadata.display());
    println!("   Reference: {}", reference.display());
    println!();

    if verbose {
        println!("{}", "📖 Reading workbooks...".cyan());
    }
    let cells = read_survey_cells(&survey, &config)?;
    let survey_meta = read_survey_meta(&metadata, &config.metadata_sheet)?;
    let species_meta = read_species_meta(&reference)?;

    if verbose {
        let flagged = cells.iter().filter(|c| c.flagged).count();
        println!(
            "   {} cells ({} colour-flagged), {} survey metadata rows, {} reference species",
            cells.len(),
            flagged,
            survey_meta.len(),
            species_meta.len()
        );
        println!();
    }

    let (table, summary) = pipeline::run(&cells, survey_meta, species_meta, &config)?;

    ResultExporter::new(table).export(&output)?;

    println!("{}", "✅ Done".bold().green());
    println!(
        "   {} surveys × {} species slots → {} observations",
        summary.surveys, summary.species_slots, summary.observations
    );
    if summary.dropped_missing_reference > 0 {
        println!(
            "   {}",
            format!(
                "{} rows dropped: no reference data",
                summary.dropped_missing_reference
            )
            .yellow()
        );
    }
    if summary.dropped_non_positive > 0 {
        println!(
            "   {} rows dropped: zero or negative biomass",
            summary.dropped_non_positive
        );
    }
    println!(
        "   {} result rows written to {}",
        summary.result_rows.to_string().bold(),
        output.display()
    );
    Ok(())
}

/// Execute the check command: structural validation without writing.
pub fn check(survey: PathBuf, config: PipelineConfig, verbose: bool) -> ReefResult<()> {
    println!("{}", "🔍 reefmetrics - Checking survey sheet".bold().green());
    println!("   File:  {}", survey.display());
    println!("   Sheet: {}\n", config.input_sheet);

    let cells = read_survey_cells(&survey, &config)?;
    let flagged = cells.iter().filter(|c| c.flagged).count();
    let grid = pipeline::normalize::normalize_grid(&cells, &config);

    if verbose {
        println!("   {} occupied cells, {} colour-flagged", cells.len(), flagged);
    }
    println!(
        "   Grid: {} rows × {} data columns, {} species labels",
        grid.row_count(),
        grid.col_count(),
        grid.species.len()
    );

    let schema = BandSchema::standard();
    let surveys = schema.survey_count(grid.col_count())?;
    pipeline::reshape::reshape(&grid, &schema)?;

    println!(
        "\n{} {} surveys, {} species slots",
        "✅ Structure OK:".bold().green(),
        surveys,
        grid.row_count()
    );
    Ok(())
}
