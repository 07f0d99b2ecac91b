//! Raw NHGIS extract reading.
//!
//! Projects the wide raw CSV down to the passthrough identifiers, the
//! renamed geographic columns, and the parsed fuel counts. Count cells are
//! parsed leniently: empty cells are absent estimates, and non-empty cells
//! that do not hold a non-negative integer are counted and treated as
//! absent rather than failing the whole file.

use std::io::Read;
use std::path::Path;

use fuel_map_fuel_models::FuelType;

use crate::ClassifyError;
use crate::record::{FuelCounts, RawTract};
use crate::schema::{PASSTHROUGH_COLUMNS, SurveyYear};

/// GISJOIN value of the human-readable description row some NHGIS extracts
/// carry between the header and the first data row.
const DESCRIPTION_ROW_MARKER: &str = "GIS Join Match Code";

/// Width of a full state+county+tract FIPS identifier.
const TRACT_FIPS_LEN: usize = 11;

/// One parsed count cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CountField {
    /// A usable non-negative integer count.
    Value(u32),
    /// An empty cell; the estimate is absent.
    Missing,
    /// A non-empty cell that does not hold a non-negative integer.
    Malformed,
}

impl CountField {
    fn parse(field: &str) -> Self {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            return Self::Missing;
        }
        if let Ok(value) = trimmed.parse::<u32>() {
            return Self::Value(value);
        }
        // Some exports render integer counts as floats ("123.0").
        match trimmed.parse::<f64>() {
            Ok(value)
                if value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) =>
            {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                Self::Value(value as u32)
            }
            _ => Self::Malformed,
        }
    }
}

/// Positions of every required raw column for one survey vintage.
struct ColumnIndices {
    passthrough: [usize; 8],
    geoid: usize,
    name: usize,
    total: usize,
    fuels: [usize; 9],
}

impl ColumnIndices {
    fn resolve(headers: &csv::StringRecord, year: SurveyYear) -> Result<Self, ClassifyError> {
        let find = |column: &str| -> Result<usize, ClassifyError> {
            headers
                .iter()
                .position(|header| header.trim() == column)
                .ok_or_else(|| ClassifyError::MissingColumn {
                    column: column.to_string(),
                    year,
                })
        };

        let mut passthrough = [0usize; 8];
        for (slot, column) in passthrough.iter_mut().zip(PASSTHROUGH_COLUMNS) {
            *slot = find(column)?;
        }

        let mut fuels = [0usize; 9];
        for (slot, fuel) in fuels.iter_mut().zip(FuelType::all()) {
            *slot = find(&year.fuel_column(*fuel))?;
        }

        Ok(Self {
            passthrough,
            geoid: find(year.geoid_column())?,
            name: find(year.name_column())?,
            total: find(&year.total_column())?,
            fuels,
        })
    }
}

/// One raw extract after projection, plus the read-side tallies the caller
/// reports in its summary.
#[derive(Debug, Default)]
pub struct RawTable {
    pub rows: Vec<RawTract>,
    /// Non-empty count cells that failed to parse and were treated absent.
    pub malformed_cells: usize,
    /// Rows whose geographic identifier is shorter than a full tract FIPS.
    pub short_geoids: usize,
    /// Whether a description row was present and skipped.
    pub skipped_description_row: bool,
}

fn parse_count(record: &csv::StringRecord, index: usize, malformed: &mut usize) -> Option<u32> {
    match CountField::parse(record.get(index).unwrap_or("")) {
        CountField::Value(value) => Some(value),
        CountField::Missing => None,
        CountField::Malformed => {
            *malformed += 1;
            None
        }
    }
}

/// Reads and projects one raw extract file.
///
/// # Errors
///
/// Fails if the file cannot be opened, a required column for `year` is
/// absent, or the CSV itself is unreadable.
pub fn read_raw_file(path: &Path, year: SurveyYear) -> Result<RawTable, ClassifyError> {
    let file = std::fs::File::open(path)?;
    read_raw(file, year)
}

/// Reads and projects raw extract rows from any `Read` source.
///
/// # Errors
///
/// Fails if a required column for `year` is absent from the header or the
/// CSV itself is unreadable.
pub fn read_raw(reader: impl Read, year: SurveyYear) -> Result<RawTable, ClassifyError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let indices = ColumnIndices::resolve(&headers, year)?;

    let mut table = RawTable::default();

    for (row_index, result) in csv_reader.records().enumerate() {
        let record = result?;
        let field =
            |index: usize| record.get(index).unwrap_or("").trim().to_string();

        let gisjoin = field(indices.passthrough[0]);
        if row_index == 0 && gisjoin == DESCRIPTION_ROW_MARKER {
            table.skipped_description_row = true;
            continue;
        }

        let geoid = field(indices.geoid);
        if geoid.len() < TRACT_FIPS_LEN {
            table.short_geoids += 1;
        }

        let counts = FuelCounts {
            total: parse_count(&record, indices.total, &mut table.malformed_cells),
            natural_gas: parse_count(&record, indices.fuels[0], &mut table.malformed_cells),
            propane: parse_count(&record, indices.fuels[1], &mut table.malformed_cells),
            electricity: parse_count(&record, indices.fuels[2], &mut table.malformed_cells),
            fuel_oil: parse_count(&record, indices.fuels[3], &mut table.malformed_cells),
            coal: parse_count(&record, indices.fuels[4], &mut table.malformed_cells),
            wood: parse_count(&record, indices.fuels[5], &mut table.malformed_cells),
            solar: parse_count(&record, indices.fuels[6], &mut table.malformed_cells),
            other: parse_count(&record, indices.fuels[7], &mut table.malformed_cells),
            no_fuel: parse_count(&record, indices.fuels[8], &mut table.malformed_cells),
        };

        table.rows.push(RawTract {
            gisjoin,
            year: field(indices.passthrough[1]),
            stusab: field(indices.passthrough[2]),
            state: field(indices.passthrough[3]),
            statea: field(indices.passthrough[4]),
            county: field(indices.passthrough[5]),
            countya: field(indices.passthrough[6]),
            tracta: field(indices.passthrough[7]),
            geoid,
            county_name: field(indices.name),
            counts,
        });
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER_2015: &str = "GISJOIN,YEAR,STUSAB,STATE,STATEA,COUNTY,COUNTYA,TRACTA,GEOID,NAME_E,ADQYE001,ADQYE002,ADQYE003,ADQYE004,ADQYE005,ADQYE006,ADQYE007,ADQYE008,ADQYE009,ADQYE010";

    fn row_2015(counts: &str) -> String {
        format!(
            "G3600610000100,2011-2015,NY,New York,36,New York County,061,000100,\
             14000US36061000100,\"Census Tract 1, New York County, New York\",{counts}"
        )
    }

    #[test]
    fn reads_a_minimal_extract() {
        let csv = format!(
            "{HEADER_2015}\n{}",
            row_2015("100,80,0,5,5,0,0,0,5,5")
        );
        let table = read_raw(csv.as_bytes(), SurveyYear::Y2015).unwrap();

        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.malformed_cells, 0);
        assert_eq!(table.short_geoids, 0);
        assert!(!table.skipped_description_row);

        let row = &table.rows[0];
        assert_eq!(row.gisjoin, "G3600610000100");
        assert_eq!(row.stusab, "NY");
        assert_eq!(row.geoid, "14000US36061000100");
        assert_eq!(
            row.county_name,
            "Census Tract 1, New York County, New York"
        );
        assert_eq!(row.counts.total, Some(100));
        assert_eq!(row.counts.natural_gas, Some(80));
        assert_eq!(row.counts.no_fuel, Some(5));
    }

    #[test]
    fn skips_the_description_row() {
        let description = "GIS Join Match Code,Data File Year,State Abbreviation,\
                           State Name,State Code,County Name,County Code,Census Tract Code,\
                           Geographic Identifier,Area Name,Total,Gas,Tank,Electric,Oil,Coal,\
                           Wood,Solar,Other,None";
        let csv = format!(
            "{HEADER_2015}\n{description}\n{}",
            row_2015("10,1,1,1,1,1,1,1,1,2")
        );
        let table = read_raw(csv.as_bytes(), SurveyYear::Y2015).unwrap();

        assert!(table.skipped_description_row);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].counts.no_fuel, Some(2));
    }

    #[test]
    fn missing_fuel_column_is_an_error() {
        let header = HEADER_2015.replace(",ADQYE003", "");
        let csv = format!("{header}\n");
        let err = read_raw(csv.as_bytes(), SurveyYear::Y2015).unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::MissingColumn { ref column, year }
                if column == "ADQYE003" && year == SurveyYear::Y2015
        ));
    }

    #[test]
    fn wrong_vintage_misses_its_prefix() {
        let csv = format!("{HEADER_2015}\n");
        let err = read_raw(csv.as_bytes(), SurveyYear::Y2020).unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::MissingColumn { ref column, .. } if column == "AMVDE001"
        ));
    }

    #[test]
    fn malformed_cells_are_counted_and_treated_absent() {
        let csv = format!(
            "{HEADER_2015}\n{}",
            row_2015("100,n/a,12.5,-3,80,0,0,0,0,0")
        );
        let table = read_raw(csv.as_bytes(), SurveyYear::Y2015).unwrap();

        assert_eq!(table.malformed_cells, 3);
        let counts = table.rows[0].counts;
        assert_eq!(counts.natural_gas, None);
        assert_eq!(counts.propane, None);
        assert_eq!(counts.electricity, None);
        assert_eq!(counts.fuel_oil, Some(80));
    }

    #[test]
    fn empty_cells_are_missing_not_malformed() {
        let csv = format!("{HEADER_2015}\n{}", row_2015(",,,,,,,,,"));
        let table = read_raw(csv.as_bytes(), SurveyYear::Y2015).unwrap();

        assert_eq!(table.malformed_cells, 0);
        let counts = table.rows[0].counts;
        assert_eq!(counts.total, None);
        assert_eq!(counts.natural_gas, None);
    }

    #[test]
    fn float_formatted_counts_parse_as_integers() {
        let csv = format!(
            "{HEADER_2015}\n{}",
            row_2015("100.0,80.0,0,0,0,0,0,0,0,0")
        );
        let table = read_raw(csv.as_bytes(), SurveyYear::Y2015).unwrap();

        assert_eq!(table.malformed_cells, 0);
        assert_eq!(table.rows[0].counts.total, Some(100));
        assert_eq!(table.rows[0].counts.natural_gas, Some(80));
    }

    #[test]
    fn short_geoids_are_counted_but_kept() {
        let csv = format!(
            "{HEADER_2015}\nG01,2011-2015,AL,Alabama,01,Autauga,001,020100,36061,\
             Somewhere,10,1,2,3,4,0,0,0,0,0"
        );
        let table = read_raw(csv.as_bytes(), SurveyYear::Y2015).unwrap();

        assert_eq!(table.short_geoids, 1);
        assert_eq!(table.rows[0].geoid, "36061");
    }

    #[test]
    fn the_2023_vintage_reads_geo_id() {
        let header = "GISJOIN,YEAR,STUSAB,STATE,STATEA,COUNTY,COUNTYA,TRACTA,GEO_ID,NAME_E,\
                      ASUPE001,ASUPE002,ASUPE003,ASUPE004,ASUPE005,ASUPE006,ASUPE007,\
                      ASUPE008,ASUPE009,ASUPE010";
        let csv = format!(
            "{header}\nG3600610000100,2019-2023,NY,New York,36,New York County,061,000100,\
             1400000US36061000100,\"Census Tract 1; New York County; New York\",\
             90,10,10,50,10,0,0,0,5,5"
        );
        let table = read_raw(csv.as_bytes(), SurveyYear::Y2023).unwrap();

        assert_eq!(table.rows[0].geoid, "1400000US36061000100");
        assert_eq!(table.rows[0].counts.electricity, Some(50));
    }
}
