#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Library for rendering classified heating-fuel tables as choropleth maps.
//!
//! Joins classified tract rows onto GeoJSON tract boundaries, buckets each
//! tract by its dominant fuel, and draws a CONUS panel with an Alaska inset.
//! Every map is written twice: a PNG raster produced by per-pixel
//! point-in-polygon sampling, and an SVG vector that also carries the
//! titles and legend text.
//!
//! A manifest in the output directory records what was rendered and when.

pub mod boundaries;
pub mod layout;
pub mod manifest;
pub mod prepare;
pub mod raster;
pub mod scene;
pub mod svg;

use std::path::PathBuf;
use std::sync::Arc;

use fuel_map_classify::progress::ProgressCallback;
use fuel_map_classify::{SurveyYear, TractRecord};
use thiserror::Error;

pub use crate::boundaries::{StateLayer, TractLayer, load_states, load_tracts};
pub use crate::manifest::{RunManifest, load_manifest, save_manifest};
pub use crate::prepare::{PreparedYear, prepare_year};

/// Raster resolution used when no override is given.
pub const DEFAULT_DPI: u32 = 600;

/// Error type for map rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The tract and state layers disagree on their coordinate systems.
    #[error("CRS mismatch: tracts={tracts}, states={states}")]
    CrsMismatch {
        /// CRS of the tract layer.
        tracts: String,
        /// CRS of the state layer.
        states: String,
    },
    /// No candidate state-abbreviation property exists in the state layer.
    #[error("no state-abbreviation property found (tried {tried:?}; available: {available:?})")]
    MissingStateColumn {
        /// Property names that were tried, in order.
        tried: &'static [&'static str],
        /// Property names the layer actually carries.
        available: Vec<String>,
    },
    /// The GeoJSON document is not a `FeatureCollection`.
    #[error("{layer}: expected a GeoJSON FeatureCollection")]
    NotAFeatureCollection {
        /// Which layer was being loaded.
        layer: String,
    },
    /// A grid render was requested with no survey years.
    #[error("a grid render needs at least one survey year")]
    EmptyGrid,
    /// Classification error.
    #[error("classify error: {0}")]
    Classify(#[from] fuel_map_classify::ClassifyError),
    /// GeoJSON parse error.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// PNG encoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Output settings shared by all render operations.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Directory the artifacts land in; created if missing.
    pub output_dir: PathBuf,
    /// State abbreviations to drop from the map, compared case-insensitively.
    pub exclude_states: Vec<String>,
    /// Raster resolution in dots per inch.
    pub dpi: u32,
}

/// A rendered map: the artifact stem plus both output paths.
#[derive(Debug, Clone)]
pub struct MapArtifact {
    /// File stem shared by both outputs, e.g. `heating_fuel_map_2020`.
    pub stem: String,
    pub png: PathBuf,
    pub svg: PathBuf,
    /// Survey years the artifact covers, ascending.
    pub years: Vec<u16>,
    /// Tract polygons drawn.
    pub tracts: usize,
}

/// Refuses to overlay layers whose CRS strings differ.
///
/// # Errors
///
/// * If the two layers carry different CRS names.
pub fn check_crs(tracts: &TractLayer, states: &StateLayer) -> Result<(), RenderError> {
    if tracts.crs == states.crs {
        Ok(())
    } else {
        Err(RenderError::CrsMismatch {
            tracts: tracts.crs.clone(),
            states: states.crs.clone(),
        })
    }
}

/// Renders one survey year as `heating_fuel_map_<year>.{svg,png}`.
///
/// # Errors
///
/// * If the layers disagree on CRS.
/// * If the output directory cannot be created or the files cannot be
///   written.
pub fn render_year_map(
    year: SurveyYear,
    records: &[TractRecord],
    tracts: TractLayer,
    states: &StateLayer,
    options: &RenderOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<MapArtifact, RenderError> {
    check_crs(&tracts, states)?;
    std::fs::create_dir_all(&options.output_dir)?;

    let prepared = prepare_year(year, records, tracts, &options.exclude_states);
    let scene = scene::single_map(&prepared, states);

    let stem = format!("heating_fuel_map_{year}");
    let (svg, png) = write_outputs(&scene, &stem, options, progress)?;

    Ok(MapArtifact {
        stem,
        png,
        svg,
        years: vec![year.year()],
        tracts: prepared.tract_count(),
    })
}

/// Renders a side-by-side comparison grid of several survey years as
/// `heating_fuel_grid_<min>_<max>.{svg,png}`. Years are sorted ascending
/// regardless of input order.
///
/// # Errors
///
/// * If no years are given.
/// * If any tract layer disagrees with the state layer on CRS.
/// * If the output directory cannot be created or the files cannot be
///   written.
pub fn render_grid(
    mut years: Vec<(SurveyYear, Vec<TractRecord>, TractLayer)>,
    states: &StateLayer,
    options: &RenderOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<MapArtifact, RenderError> {
    if years.is_empty() {
        return Err(RenderError::EmptyGrid);
    }
    years.sort_by_key(|(year, _, _)| year.year());
    std::fs::create_dir_all(&options.output_dir)?;

    let mut prepared = Vec::with_capacity(years.len());
    for (year, records, tracts) in years {
        check_crs(&tracts, states)?;
        prepared.push(prepare_year(year, &records, tracts, &options.exclude_states));
    }

    let scene = scene::grid_map(&prepared, states);

    let first = prepared[0].year.year();
    let last = prepared[prepared.len() - 1].year.year();
    let stem = format!("heating_fuel_grid_{first}_{last}");
    let (svg, png) = write_outputs(&scene, &stem, options, progress)?;

    Ok(MapArtifact {
        stem,
        png,
        svg,
        years: prepared.iter().map(|year| year.year.year()).collect(),
        tracts: prepared.iter().map(PreparedYear::tract_count).sum(),
    })
}

fn write_outputs(
    scene: &scene::Scene,
    stem: &str,
    options: &RenderOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<(PathBuf, PathBuf), RenderError> {
    let svg_path = options.output_dir.join(format!("{stem}.svg"));
    svg::write_svg(scene, &svg_path)?;
    log::info!("Wrote {}", svg_path.display());

    let png_path = options.output_dir.join(format!("{stem}.png"));
    progress.set_message(format!("rasterizing {stem}.png at {} dpi", options.dpi));
    raster::write_png(scene, &png_path, options.dpi, progress)?;
    log::info!("Wrote {}", png_path.display());

    Ok((svg_path, png_path))
}
