//! Interactive mode for the fuel map toolchain.
//!
//! Prompts for survey years, input paths, and render options, then runs
//! the full classify + render flow for the selection. Reached by invoking
//! the binary with no subcommand.

use std::path::PathBuf;

use dialoguer::{Confirm, Input, MultiSelect};
use fuel_map_classify::SurveyYear;
use fuel_map_cli_utils::MultiProgress;
use fuel_map_geography_models::DEFAULT_EXCLUDED_STATES;
use fuel_map_render::{DEFAULT_DPI, RenderOptions};

use crate::RunPlan;

/// Runs the prompt flow and then the pipeline for the selection.
///
/// The `multi` parameter is the shared [`MultiProgress`] that is also
/// registered with the log bridge, so all `log::info!` output is
/// automatically suspended while progress bars redraw.
///
/// # Errors
///
/// Returns an error if a prompt fails or any pipeline step fails.
pub fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("Heating Fuel Map Toolchain");
    println!();

    let year_labels: Vec<String> = SurveyYear::all().iter().map(ToString::to_string).collect();
    let defaults = vec![true; year_labels.len()];

    let selected = MultiSelect::new()
        .with_prompt("Survey years (space=toggle, a=all, enter=confirm)")
        .items(&year_labels)
        .defaults(&defaults)
        .interact()?;

    if selected.is_empty() {
        println!("No years selected.");
        return Ok(());
    }

    let years: Vec<SurveyYear> = selected.iter().map(|&i| SurveyYear::all()[i]).collect();

    let mut inputs = Vec::with_capacity(years.len());
    let mut tracts = Vec::with_capacity(years.len());
    for year in &years {
        let input: String = Input::new()
            .with_prompt(format!("{year} raw NHGIS extract"))
            .default(format!("data/nhgis_{year}.csv"))
            .interact_text()?;
        inputs.push(PathBuf::from(input));

        let layer: String = Input::new()
            .with_prompt(format!("{year} tract boundary GeoJSON"))
            .default(format!("data/tracts_{year}.geojson"))
            .interact_text()?;
        tracts.push(PathBuf::from(layer));
    }

    let states: String = Input::new()
        .with_prompt("State boundary GeoJSON")
        .default("data/states.geojson".to_string())
        .interact_text()?;

    let output_dir: String = Input::new()
        .with_prompt("Output directory")
        .default("output".to_string())
        .interact_text()?;

    let exclude: String = Input::new()
        .with_prompt("States to exclude (comma-separated)")
        .default(DEFAULT_EXCLUDED_STATES.join(","))
        .allow_empty(true)
        .interact_text()?;

    let dpi_str: String = Input::new()
        .with_prompt("Raster resolution (dpi)")
        .default(DEFAULT_DPI.to_string())
        .interact_text()?;
    let dpi = dpi_str.trim().parse().unwrap_or(DEFAULT_DPI);

    let grid = if years.len() > 1 {
        Confirm::new()
            .with_prompt("Render the multi-year comparison grid?")
            .default(true)
            .interact()?
    } else {
        false
    };

    let plan = RunPlan {
        years,
        inputs,
        tracts,
        states: PathBuf::from(states),
        options: RenderOptions {
            output_dir: PathBuf::from(output_dir),
            exclude_states: crate::parse_states(&exclude),
            dpi,
        },
        grid,
    };

    crate::run_years(&plan, multi)
}
