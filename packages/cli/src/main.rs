#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the heating fuel map toolchain.
//!
//! Classifies raw NHGIS tract extracts into per-tract dominant-fuel tables
//! and renders them as choropleth map pairs (PNG + SVG), either through
//! subcommands or an interactive prompt flow when invoked bare.
//!
//! Uses `indicatif-log-bridge` (via [`fuel_map_cli_utils::init_logger`]) to
//! route `log` output through `indicatif::MultiProgress` so that log lines
//! and progress bars never fight for the terminal.

mod interactive;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use fuel_map_classify::{SurveyYear, TractRecord, table};
use fuel_map_cli_utils::{IndicatifProgress, MultiProgress};
use fuel_map_geography_models::fips;
use fuel_map_render::{MapArtifact, RenderOptions, StateLayer, TractLayer};

#[derive(Parser)]
#[command(name = "fuel_map_cli", about = "Heating fuel map toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a raw NHGIS extract into a per-tract dominant-fuel table
    Classify {
        /// Survey year of the extract (2015, 2020, or 2023)
        #[arg(long)]
        year: u16,
        /// Raw NHGIS CSV extract
        #[arg(long)]
        input: PathBuf,
        /// Destination for the classified CSV
        #[arg(long)]
        output: PathBuf,
    },
    /// Render one year's map pair (PNG + SVG) from a classified table
    Render {
        /// Survey year to render
        #[arg(long)]
        year: u16,
        /// Classified CSV produced by `classify`
        #[arg(long)]
        classified: PathBuf,
        /// Tract boundary GeoJSON keyed by the GISJOIN property
        #[arg(long)]
        tracts: PathBuf,
        /// State boundary GeoJSON
        #[arg(long)]
        states: PathBuf,
        /// Directory the artifacts land in
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
        /// Comma-separated state abbreviations to exclude from the map
        #[arg(long, default_value = "HI,PR")]
        exclude_states: String,
        /// Raster resolution in dots per inch
        #[arg(long, default_value_t = fuel_map_render::DEFAULT_DPI)]
        dpi: u32,
    },
    /// Render the multi-year comparison grid from classified tables
    Grid {
        /// Comma-separated survey years (e.g. "2015,2020,2023")
        #[arg(long)]
        years: String,
        /// Comma-separated classified CSVs, one per year, in year order
        #[arg(long)]
        classified: String,
        /// Comma-separated tract boundary GeoJSONs, one per year
        #[arg(long)]
        tracts: String,
        /// State boundary GeoJSON shared by all years
        #[arg(long)]
        states: PathBuf,
        /// Directory the artifacts land in
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
        /// Comma-separated state abbreviations to exclude from the map
        #[arg(long, default_value = "HI,PR")]
        exclude_states: String,
        /// Raster resolution in dots per inch
        #[arg(long, default_value_t = fuel_map_render::DEFAULT_DPI)]
        dpi: u32,
    },
    /// Classify and render every requested year, then the comparison grid
    Run {
        /// Comma-separated survey years to process
        #[arg(long, default_value = "2015,2020,2023")]
        years: String,
        /// Comma-separated raw NHGIS CSVs, one per year, in year order
        #[arg(long)]
        inputs: String,
        /// Comma-separated tract boundary GeoJSONs, one per year
        #[arg(long)]
        tracts: String,
        /// State boundary GeoJSON shared by all years
        #[arg(long)]
        states: PathBuf,
        /// Directory the artifacts land in
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
        /// Comma-separated state abbreviations to exclude from the map
        #[arg(long, default_value = "HI,PR")]
        exclude_states: String,
        /// Raster resolution in dots per inch
        #[arg(long, default_value_t = fuel_map_render::DEFAULT_DPI)]
        dpi: u32,
        /// Skip the multi-year comparison grid
        #[arg(long)]
        no_grid: bool,
    },
}

/// Everything one `run` invocation needs, shared with interactive mode.
struct RunPlan {
    years: Vec<SurveyYear>,
    /// Raw NHGIS extracts, aligned with `years`.
    inputs: Vec<PathBuf>,
    /// Tract boundary layers, aligned with `years`.
    tracts: Vec<PathBuf>,
    states: PathBuf,
    options: RenderOptions,
    grid: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = fuel_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&multi);
    };

    match command {
        Commands::Classify {
            year,
            input,
            output,
        } => {
            let year = SurveyYear::from_year(year)?;
            classify_year(year, &input, &output, &multi)?;
        }
        Commands::Render {
            year,
            classified,
            tracts,
            states,
            output_dir,
            exclude_states,
            dpi,
        } => {
            let year = SurveyYear::from_year(year)?;
            let options = RenderOptions {
                output_dir,
                exclude_states: parse_states(&exclude_states),
                dpi,
            };
            let states = fuel_map_render::load_states(&states)?;
            render_year(year, &classified, &tracts, &states, &options, &multi)?;
        }
        Commands::Grid {
            years,
            classified,
            tracts,
            states,
            output_dir,
            exclude_states,
            dpi,
        } => {
            let years = parse_years(&years)?;
            let options = RenderOptions {
                output_dir,
                exclude_states: parse_states(&exclude_states),
                dpi,
            };
            let states = fuel_map_render::load_states(&states)?;
            render_grid(
                &years,
                &parse_paths(&classified),
                &parse_paths(&tracts),
                &states,
                &options,
                &multi,
            )?;
        }
        Commands::Run {
            years,
            inputs,
            tracts,
            states,
            output_dir,
            exclude_states,
            dpi,
            no_grid,
        } => {
            let plan = RunPlan {
                years: parse_years(&years)?,
                inputs: parse_paths(&inputs),
                tracts: parse_paths(&tracts),
                states,
                options: RenderOptions {
                    output_dir,
                    exclude_states: parse_states(&exclude_states),
                    dpi,
                },
                grid: !no_grid,
            };
            run_years(&plan, &multi)?;
        }
    }

    Ok(())
}

/// Classifies one raw extract and writes the classified table.
fn classify_year(
    year: SurveyYear,
    input: &Path,
    output: &Path,
    multi: &MultiProgress,
) -> Result<Vec<TractRecord>, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let bar = IndicatifProgress::rows_bar(multi, &format!("Classifying {year}"));
    let records = fuel_map_classify::classify_file(input, year, &bar)?;
    table::write_table(output, &records)?;
    log::info!(
        "{year}: wrote {} classified rows to {} in {:.1}s",
        records.len(),
        output.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(records)
}

/// Renders one year's map pair from a classified table on disk.
fn render_year(
    year: SurveyYear,
    classified: &Path,
    tracts: &Path,
    states: &StateLayer,
    options: &RenderOptions,
    multi: &MultiProgress,
) -> Result<MapArtifact, Box<dyn std::error::Error>> {
    let records = table::read_table(classified)?;
    log::info!(
        "{year}: read {} classified rows from {}",
        records.len(),
        classified.display()
    );
    let layer = fuel_map_render::load_tracts(tracts)?;
    render_prepared(year, &records, layer, states, options, multi)
}

/// Renders one year's map pair from records already in memory.
fn render_prepared(
    year: SurveyYear,
    records: &[TractRecord],
    tracts: TractLayer,
    states: &StateLayer,
    options: &RenderOptions,
    multi: &MultiProgress,
) -> Result<MapArtifact, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let bar = IndicatifProgress::raster_bar(multi, &format!("Rendering {year}"));
    let artifact = fuel_map_render::render_year_map(year, records, tracts, states, options, &bar)?;
    bar.finish_and_clear();
    log::info!(
        "{year}: rendered {} in {:.1}s",
        artifact.stem,
        start.elapsed().as_secs_f64()
    );
    record_artifact(&options.output_dir, &artifact);
    Ok(artifact)
}

/// Renders the multi-year grid from classified tables on disk.
fn render_grid(
    years: &[SurveyYear],
    classified: &[PathBuf],
    tracts: &[PathBuf],
    states: &StateLayer,
    options: &RenderOptions,
    multi: &MultiProgress,
) -> Result<MapArtifact, Box<dyn std::error::Error>> {
    if years.len() != classified.len() || years.len() != tracts.len() {
        return Err(format!(
            "expected one classified table and one tract layer per year ({} years, {} tables, {} layers)",
            years.len(),
            classified.len(),
            tracts.len()
        )
        .into());
    }

    let mut inputs = Vec::with_capacity(years.len());
    for ((year, table_path), tract_path) in years.iter().zip(classified).zip(tracts) {
        let records = table::read_table(table_path)?;
        let layer = fuel_map_render::load_tracts(tract_path)?;
        inputs.push((*year, records, layer));
    }

    render_grid_inputs(inputs, states, options, multi)
}

/// Renders the grid from per-year inputs already in memory.
fn render_grid_inputs(
    inputs: Vec<(SurveyYear, Vec<TractRecord>, TractLayer)>,
    states: &StateLayer,
    options: &RenderOptions,
    multi: &MultiProgress,
) -> Result<MapArtifact, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let bar = IndicatifProgress::raster_bar(multi, "Rendering grid");
    let artifact = fuel_map_render::render_grid(inputs, states, options, &bar)?;
    bar.finish_and_clear();
    log::info!(
        "Rendered {} in {:.1}s",
        artifact.stem,
        start.elapsed().as_secs_f64()
    );
    record_artifact(&options.output_dir, &artifact);
    Ok(artifact)
}

/// Classifies and renders every year in the plan, then the comparison grid.
/// A failing year is logged and skipped so the remaining years still
/// render; the run as a whole fails if anything failed.
fn run_years(plan: &RunPlan, multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    if plan.years.len() != plan.inputs.len() || plan.years.len() != plan.tracts.len() {
        return Err(format!(
            "expected one raw extract and one tract layer per year ({} years, {} extracts, {} layers)",
            plan.years.len(),
            plan.inputs.len(),
            plan.tracts.len()
        )
        .into());
    }

    let start = Instant::now();
    std::fs::create_dir_all(&plan.options.output_dir)?;
    let states = fuel_map_render::load_states(&plan.states)?;

    let total = plan.years.len();
    let steps = IndicatifProgress::years_bar(multi, total as u64);

    let mut grid_inputs = Vec::new();
    let mut failures = 0usize;

    for (index, ((year, input), tract_path)) in plan
        .years
        .iter()
        .zip(&plan.inputs)
        .zip(&plan.tracts)
        .enumerate()
    {
        steps.set_message(format!("Year {}/{total}: {year}", index + 1));

        match process_year(*year, input, tract_path, plan, &states, multi) {
            Ok(Some(grid_input)) => grid_inputs.push(grid_input),
            Ok(None) => {}
            Err(e) => {
                log::error!("{year}: {e}");
                failures += 1;
            }
        }

        steps.inc(1);
    }

    steps.finish(format!("Processed {}/{total} year(s)", total - failures));

    if plan.grid {
        if grid_inputs.len() > 1 {
            if let Err(e) = render_grid_inputs(grid_inputs, &states, &plan.options, multi) {
                log::error!("Grid render failed: {e}");
                failures += 1;
            }
        } else {
            log::info!(
                "Skipping the comparison grid ({} year(s) available)",
                grid_inputs.len()
            );
        }
    }

    log::info!("Run complete in {:.1}s", start.elapsed().as_secs_f64());

    if failures > 0 {
        return Err(format!("{failures} step(s) failed").into());
    }
    Ok(())
}

/// One year of the `run` flow: classify the raw extract, render the single
/// map, and hand back the inputs the grid needs.
fn process_year(
    year: SurveyYear,
    input: &Path,
    tract_path: &Path,
    plan: &RunPlan,
    states: &StateLayer,
    multi: &MultiProgress,
) -> Result<Option<(SurveyYear, Vec<TractRecord>, TractLayer)>, Box<dyn std::error::Error>> {
    let classified = plan
        .options
        .output_dir
        .join(format!("heating_fuel_{year}_classified.csv"));
    let records = classify_year(year, input, &classified, multi)?;

    let layer = fuel_map_render::load_tracts(tract_path)?;
    let grid_copy = plan.grid.then(|| layer.clone());

    render_prepared(year, &records, layer, states, &plan.options, multi)?;

    Ok(grid_copy.map(|copy| (year, records, copy)))
}

/// Appends an artifact to the output directory's manifest. Manifest
/// trouble is never fatal; the maps are already on disk.
fn record_artifact(dir: &Path, artifact: &MapArtifact) {
    let mut manifest = fuel_map_render::load_manifest(dir).unwrap_or_default();
    manifest.record(&artifact.stem, &artifact.years, artifact.tracts);
    if let Err(e) = fuel_map_render::save_manifest(dir, &manifest) {
        log::warn!("Failed to save manifest: {e}");
    }
}

/// Parses a comma-separated year list into vintages.
fn parse_years(text: &str) -> Result<Vec<SurveyYear>, Box<dyn std::error::Error>> {
    let mut years = Vec::new();
    for part in text.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        years.push(SurveyYear::from_year(part.parse()?)?);
    }
    if years.is_empty() {
        return Err("no survey years given".into());
    }
    Ok(years)
}

fn parse_paths(text: &str) -> Vec<PathBuf> {
    text.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Parses a comma-separated exclusion list into uppercase state
/// abbreviations. Unknown abbreviations are kept but warned about, since
/// they exclude nothing.
fn parse_states(text: &str) -> Vec<String> {
    let mut states = Vec::new();
    for part in text.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if fips::by_abbr(part).is_none() {
            log::warn!("Unknown state abbreviation {part:?} in --exclude-states");
        }
        states.push(part.to_ascii_uppercase());
    }
    states
}
