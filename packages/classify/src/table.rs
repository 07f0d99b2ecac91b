//! Classified table persistence.
//!
//! The classified table is a plain CSV whose header comes straight from the
//! [`TractRecord`] field order, so writing and reading are thin serde
//! wrappers around the `csv` crate.

use std::io::{Read, Write};
use std::path::Path;

use crate::ClassifyError;
use crate::record::TractRecord;

/// Writes the classified table to `path`, header first.
///
/// # Errors
///
/// Fails if the file cannot be created or a row cannot be serialized.
pub fn write_table(path: &Path, records: &[TractRecord]) -> Result<(), ClassifyError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the classified table to any `Write` sink.
///
/// # Errors
///
/// Fails if a row cannot be serialized or the sink rejects a write.
pub fn write_table_to(sink: impl Write, records: &[TractRecord]) -> Result<(), ClassifyError> {
    let mut writer = csv::Writer::from_writer(sink);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a classified table back from `path`.
///
/// # Errors
///
/// Fails if the file cannot be opened or a row does not match the
/// classified schema.
pub fn read_table(path: &Path) -> Result<Vec<TractRecord>, ClassifyError> {
    let file = std::fs::File::open(path)?;
    read_table_from(file)
}

/// Reads classified rows from any `Read` source.
///
/// # Errors
///
/// Fails if a row does not match the classified schema.
pub fn read_table_from(source: impl Read) -> Result<Vec<TractRecord>, ClassifyError> {
    let mut reader = csv::Reader::from_reader(source);
    let mut records = Vec::new();
    for result in reader.deserialize::<TractRecord>() {
        records.push(result?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FuelCounts, RawTract};

    const EXPECTED_HEADER: [&str; 35] = [
        "GISJOIN",
        "YEAR",
        "STUSAB",
        "STATE",
        "STATEA",
        "COUNTY",
        "COUNTYA",
        "TRACTA",
        "GEOID",
        "County_Name",
        "Total_Housing_Units",
        "Natural_Gas",
        "Propane",
        "Electricity",
        "Fuel_Oil",
        "Coal",
        "Wood",
        "Solar",
        "Other",
        "No_Fuel",
        "FIPS_Code",
        "Data_Quality_Check",
        "Pct_Natural_Gas",
        "Pct_Propane",
        "Pct_Electricity",
        "Pct_Fuel_Oil",
        "Pct_Coal",
        "Pct_Wood",
        "Pct_Solar",
        "Pct_Other",
        "Pct_No_Fuel",
        "Has_Dom_Tie",
        "Dom_Fuel_Type",
        "Dom_Fuel_Count",
        "Dom_Fuel_Pct",
    ];

    fn sample(counts: FuelCounts) -> TractRecord {
        TractRecord::classify(RawTract {
            gisjoin: "G3600610000100".to_string(),
            year: "2011-2015".to_string(),
            stusab: "NY".to_string(),
            state: "New York".to_string(),
            statea: "36".to_string(),
            county: "New York County".to_string(),
            countya: "061".to_string(),
            tracta: "000100".to_string(),
            geoid: "14000US36061000100".to_string(),
            county_name: "Census Tract 1, New York County, New York".to_string(),
            counts,
        })
    }

    #[test]
    fn header_is_the_canonical_column_order() {
        let record = sample(FuelCounts {
            total: Some(100),
            natural_gas: Some(80),
            ..FuelCounts::default()
        });
        let mut buffer = Vec::new();
        write_table_to(&mut buffer, &[record]).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let header = text.lines().next().unwrap();
        let columns: Vec<&str> = header.split(',').collect();
        assert_eq!(columns, EXPECTED_HEADER);
    }

    #[test]
    fn roundtrip_preserves_absent_fields() {
        let records = vec![
            sample(FuelCounts {
                total: Some(100),
                natural_gas: Some(60),
                electricity: Some(40),
                ..FuelCounts::default()
            }),
            sample(FuelCounts {
                total: None,
                ..FuelCounts::default()
            }),
            sample(FuelCounts {
                total: Some(80),
                wood: Some(40),
                solar: Some(40),
                ..FuelCounts::default()
            }),
        ];

        let mut buffer = Vec::new();
        write_table_to(&mut buffer, &records).unwrap();
        let restored = read_table_from(buffer.as_slice()).unwrap();

        assert_eq!(restored, records);
        assert_eq!(restored[1].total_housing_units, None);
        assert_eq!(restored[1].dom_fuel_pct, None);
        assert!(restored[2].has_dom_tie);
    }

    #[test]
    fn quoted_names_survive_the_roundtrip() {
        let records = vec![sample(FuelCounts {
            total: Some(10),
            propane: Some(10),
            ..FuelCounts::default()
        })];

        let mut buffer = Vec::new();
        write_table_to(&mut buffer, &records).unwrap();
        let restored = read_table_from(buffer.as_slice()).unwrap();

        assert_eq!(
            restored[0].county_name,
            "Census Tract 1, New York County, New York"
        );
    }
}
