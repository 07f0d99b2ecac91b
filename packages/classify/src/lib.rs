#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dominant heating fuel classification for NHGIS tract extracts.
//!
//! Reads one raw extract per survey vintage, derives data-quality flags,
//! fuel-share percentages, and the dominant heating fuel per tract, and
//! writes the classified table the map renderer consumes.

pub mod progress;
pub mod reader;
pub mod record;
pub mod schema;
pub mod table;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use fuel_map_fuel_models::DominantFuel;
use thiserror::Error;

use crate::progress::ProgressCallback;
pub use crate::record::{FuelCounts, RawTract, TractRecord};
pub use crate::schema::SurveyYear;

/// Errors from reading and classifying raw extracts.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The requested year is not one of the supported survey vintages.
    #[error("unsupported survey year: {year}")]
    UnsupportedYear {
        /// The rejected year.
        year: u16,
    },
    /// A required raw column is absent from the extract header.
    #[error("missing column {column} in the {year} extract")]
    MissingColumn {
        /// Name of the absent column.
        column: String,
        /// The vintage whose schema required it.
        year: SurveyYear,
    },
    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Row tallies for one classified extract.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClassifySummary {
    pub rows: usize,
    pub valid: usize,
    pub insufficient: usize,
    pub ties: usize,
    /// Rows classified as the `Error` sentinel. Anything above zero points
    /// at a malformed extract and is logged at error level.
    pub errors: usize,
}

impl ClassifySummary {
    /// Tallies a classified table.
    #[must_use]
    pub fn of(records: &[TractRecord]) -> Self {
        let mut summary = Self {
            rows: records.len(),
            ..Self::default()
        };
        for record in records {
            if record.data_quality_check.is_valid() {
                summary.valid += 1;
            } else {
                summary.insufficient += 1;
            }
            match record.dom_fuel_type {
                DominantFuel::Tie => summary.ties += 1,
                DominantFuel::Error => summary.errors += 1,
                _ => {}
            }
        }
        summary
    }
}

/// Classifies already-read raw rows, reporting per-row progress.
#[must_use]
pub fn classify_rows(
    rows: Vec<RawTract>,
    progress: &Arc<dyn ProgressCallback>,
) -> Vec<TractRecord> {
    progress.set_total(rows.len() as u64);
    rows.into_iter()
        .map(|raw| {
            let record = TractRecord::classify(raw);
            progress.inc(1);
            record
        })
        .collect()
}

/// Reads one raw extract and classifies every tract row.
///
/// Read-side anomalies (malformed count cells, short geographic
/// identifiers, a skipped description row) are logged, not fatal. Rows that
/// classify to the `Error` sentinel are logged at error level and kept in
/// the output so downstream consumers can surface them.
///
/// # Errors
///
/// Fails if the extract cannot be opened, a required column for `year` is
/// absent, or the CSV itself is unreadable.
pub fn classify_file(
    input: &Path,
    year: SurveyYear,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<TractRecord>, ClassifyError> {
    log::info!("{year}: reading raw extract from {}", input.display());
    let raw = reader::read_raw_file(input, year)?;

    if raw.skipped_description_row {
        log::debug!("{year}: skipped the NHGIS description row");
    }
    if raw.malformed_cells > 0 {
        log::warn!(
            "{year}: {} count cells failed to parse and were treated as absent",
            raw.malformed_cells
        );
    }
    if raw.short_geoids > 0 {
        log::warn!(
            "{year}: {} rows carry a geographic identifier shorter than a full tract FIPS",
            raw.short_geoids
        );
    }

    let records = classify_rows(raw.rows, progress);
    let summary = ClassifySummary::of(&records);

    log::info!(
        "{year}: classified {} tracts ({} valid, {} insufficient, {} ties)",
        summary.rows,
        summary.valid,
        summary.insufficient,
        summary.ties
    );
    if summary.errors > 0 {
        log::error!(
            "{year}: {} tracts hit the Error sentinel (valid total, no usable counts)",
            summary.errors
        );
    }
    if log::log_enabled!(log::Level::Debug) {
        let mut distribution: BTreeMap<&str, usize> = BTreeMap::new();
        for record in &records {
            *distribution.entry(record.dom_fuel_type.as_ref()).or_insert(0) += 1;
        }
        log::debug!("{year}: dominant fuel distribution: {distribution:?}");
    }

    progress.finish(format!("{year}: classified {} tracts", summary.rows));

    Ok(records)
}

/// Reads one raw extract, classifies it, and writes the classified table.
///
/// # Errors
///
/// Fails if reading fails (see [`classify_file`]) or the output file cannot
/// be written.
pub fn classify_to_file(
    input: &Path,
    output: &Path,
    year: SurveyYear,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<ClassifySummary, ClassifyError> {
    let records = classify_file(input, year, progress)?;
    table::write_table(output, &records)?;
    log::info!(
        "{year}: wrote {} classified rows to {}",
        records.len(),
        output.display()
    );
    Ok(ClassifySummary::of(&records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FuelCounts;

    fn record(counts: FuelCounts) -> TractRecord {
        TractRecord::classify(RawTract {
            gisjoin: "G0100010020100".to_string(),
            year: "2011-2015".to_string(),
            stusab: "AL".to_string(),
            state: "Alabama".to_string(),
            statea: "01".to_string(),
            county: "Autauga County".to_string(),
            countya: "001".to_string(),
            tracta: "020100".to_string(),
            geoid: "14000US01001020100".to_string(),
            county_name: "Census Tract 201, Autauga County, Alabama".to_string(),
            counts,
        })
    }

    #[test]
    fn summary_tallies_every_outcome() {
        let records = vec![
            record(FuelCounts {
                total: Some(100),
                natural_gas: Some(90),
                ..FuelCounts::default()
            }),
            record(FuelCounts {
                total: Some(100),
                wood: Some(40),
                solar: Some(40),
                ..FuelCounts::default()
            }),
            record(FuelCounts::default()),
            record(FuelCounts {
                total: Some(10),
                ..FuelCounts::default()
            }),
        ];

        let summary = ClassifySummary::of(&records);
        assert_eq!(summary.rows, 4);
        assert_eq!(summary.valid, 3);
        assert_eq!(summary.insufficient, 1);
        assert_eq!(summary.ties, 1);
        assert_eq!(summary.errors, 1);
    }

    #[test]
    fn classify_rows_preserves_order() {
        let rows = vec![
            RawTract {
                gisjoin: "G0100010020100".to_string(),
                year: "2011-2015".to_string(),
                stusab: "AL".to_string(),
                state: "Alabama".to_string(),
                statea: "01".to_string(),
                county: "Autauga County".to_string(),
                countya: "001".to_string(),
                tracta: "020100".to_string(),
                geoid: "14000US01001020100".to_string(),
                county_name: "Census Tract 201".to_string(),
                counts: FuelCounts {
                    total: Some(10),
                    electricity: Some(10),
                    ..FuelCounts::default()
                },
            },
            RawTract {
                gisjoin: "G0100010020200".to_string(),
                year: "2011-2015".to_string(),
                stusab: "AL".to_string(),
                state: "Alabama".to_string(),
                statea: "01".to_string(),
                county: "Autauga County".to_string(),
                countya: "001".to_string(),
                tracta: "020200".to_string(),
                geoid: "14000US01001020200".to_string(),
                county_name: "Census Tract 202".to_string(),
                counts: FuelCounts {
                    total: Some(10),
                    wood: Some(10),
                    ..FuelCounts::default()
                },
            },
        ];

        let records = classify_rows(rows, &progress::null_progress());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].gisjoin, "G0100010020100");
        assert_eq!(records[0].dom_fuel_type, DominantFuel::Electricity);
        assert_eq!(records[1].dom_fuel_type, DominantFuel::Wood);
    }
}
