//! Tract-level record types and the per-row classification rules.
//!
//! Classification is a pure function of the raw counts: quality flagging,
//! percentage computation, and tie-aware dominant-fuel selection all live on
//! [`FuelCounts`], and [`TractRecord::classify`] assembles the full
//! 35-column classified row from one [`RawTract`].

use fuel_map_fuel_models::{DataQuality, DominantFuel, FuelType};
use fuel_map_geography_models::tract_fips;
use serde::{Deserialize, Serialize};

/// Rounds to one decimal place, ties to even.
fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Housing-unit counts for one tract: the universe total plus the nine
/// canonical fuel counts. Absent raw fields stay `None` and never default
/// to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FuelCounts {
    pub total: Option<u32>,
    pub natural_gas: Option<u32>,
    pub propane: Option<u32>,
    pub electricity: Option<u32>,
    pub fuel_oil: Option<u32>,
    pub coal: Option<u32>,
    pub wood: Option<u32>,
    pub solar: Option<u32>,
    pub other: Option<u32>,
    pub no_fuel: Option<u32>,
}

impl FuelCounts {
    /// Returns the count for one fuel.
    #[must_use]
    pub const fn get(&self, fuel: FuelType) -> Option<u32> {
        match fuel {
            FuelType::NaturalGas => self.natural_gas,
            FuelType::Propane => self.propane,
            FuelType::Electricity => self.electricity,
            FuelType::FuelOil => self.fuel_oil,
            FuelType::Coal => self.coal,
            FuelType::Wood => self.wood,
            FuelType::Solar => self.solar,
            FuelType::Other => self.other,
            FuelType::NoFuel => self.no_fuel,
        }
    }

    /// Data quality flag: valid iff the total is present and strictly
    /// positive. Gates all percentage and dominance computation.
    #[must_use]
    pub const fn quality(&self) -> DataQuality {
        match self.total {
            Some(total) if total > 0 => DataQuality::ValidData,
            _ => DataQuality::InsufficientData,
        }
    }

    /// The maximum across the nine fuel counts; absent counts do not
    /// participate. `None` when not a single count is present.
    #[must_use]
    pub fn max_value(&self) -> Option<u32> {
        FuelType::all().iter().filter_map(|fuel| self.get(*fuel)).max()
    }

    /// Number of fuels whose count equals the row maximum.
    fn tie_count(&self) -> usize {
        self.max_value().map_or(0, |max| {
            FuelType::all()
                .iter()
                .filter(|fuel| self.get(**fuel) == Some(max))
                .count()
        })
    }

    /// True iff more than one fuel shares the row maximum and the total is
    /// not zero. Zero-total rows are never flagged as ties; they resolve to
    /// `No_Data` through the quality check instead.
    #[must_use]
    pub fn has_dominance_tie(&self) -> bool {
        if matches!(self.total, Some(0)) {
            return false;
        }
        self.tie_count() > 1
    }

    /// Selects the dominant-fuel label for this row.
    ///
    /// Precedence: insufficient data -> `No_Data`; dominance tie -> `Tie`;
    /// otherwise the first fuel in canonical order whose count equals the
    /// row maximum. A valid total with no usable counts at all yields the
    /// `Error` sentinel, which callers must surface.
    #[must_use]
    pub fn dominant(&self) -> DominantFuel {
        if !self.quality().is_valid() {
            return DominantFuel::NoData;
        }
        if self.has_dominance_tie() {
            return DominantFuel::Tie;
        }
        let Some(max) = self.max_value() else {
            return DominantFuel::Error;
        };
        for fuel in FuelType::all() {
            if self.get(*fuel) == Some(max) {
                return DominantFuel::from_fuel(*fuel);
            }
        }
        DominantFuel::Error
    }

    /// Percentage of total housing units using `fuel`, rounded to one
    /// decimal. Undefined (not zero) when the quality check fails or the
    /// count is absent.
    #[must_use]
    pub fn percentage(&self, fuel: FuelType) -> Option<f64> {
        if !self.quality().is_valid() {
            return None;
        }
        let total = self.total?;
        let count = self.get(fuel)?;
        Some(round1(f64::from(count) / f64::from(total) * 100.0))
    }

    /// The winning fuel's count; undefined when the quality check fails or
    /// a tie exists.
    #[must_use]
    pub fn dominant_count(&self) -> Option<u32> {
        if self.quality().is_valid() && !self.has_dominance_tie() {
            self.max_value()
        } else {
            None
        }
    }

    /// The winning fuel's percentage; undefined when the quality check
    /// fails or a tie exists.
    #[must_use]
    pub fn dominant_pct(&self) -> Option<f64> {
        if self.quality().is_valid() && !self.has_dominance_tie() {
            let total = self.total?;
            let max = self.max_value()?;
            Some(round1(f64::from(max) / f64::from(total) * 100.0))
        } else {
            None
        }
    }
}

/// One raw extract row after column projection: the passthrough identifiers,
/// the renamed identifier/name columns, and the parsed fuel counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTract {
    pub gisjoin: String,
    pub year: String,
    pub stusab: String,
    pub state: String,
    pub statea: String,
    pub county: String,
    pub countya: String,
    pub tracta: String,
    pub geoid: String,
    pub county_name: String,
    pub counts: FuelCounts,
}

/// One classified tract row: the 35-column output record, in column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TractRecord {
    #[serde(rename = "GISJOIN")]
    pub gisjoin: String,
    #[serde(rename = "YEAR")]
    pub year: String,
    #[serde(rename = "STUSAB")]
    pub stusab: String,
    #[serde(rename = "STATE")]
    pub state: String,
    #[serde(rename = "STATEA")]
    pub statea: String,
    #[serde(rename = "COUNTY")]
    pub county: String,
    #[serde(rename = "COUNTYA")]
    pub countya: String,
    #[serde(rename = "TRACTA")]
    pub tracta: String,
    #[serde(rename = "GEOID")]
    pub geoid: String,
    #[serde(rename = "County_Name")]
    pub county_name: String,
    #[serde(rename = "Total_Housing_Units")]
    pub total_housing_units: Option<u32>,
    #[serde(rename = "Natural_Gas")]
    pub natural_gas: Option<u32>,
    #[serde(rename = "Propane")]
    pub propane: Option<u32>,
    #[serde(rename = "Electricity")]
    pub electricity: Option<u32>,
    #[serde(rename = "Fuel_Oil")]
    pub fuel_oil: Option<u32>,
    #[serde(rename = "Coal")]
    pub coal: Option<u32>,
    #[serde(rename = "Wood")]
    pub wood: Option<u32>,
    #[serde(rename = "Solar")]
    pub solar: Option<u32>,
    #[serde(rename = "Other")]
    pub other: Option<u32>,
    #[serde(rename = "No_Fuel")]
    pub no_fuel: Option<u32>,
    #[serde(rename = "FIPS_Code")]
    pub fips_code: String,
    #[serde(rename = "Data_Quality_Check")]
    pub data_quality_check: DataQuality,
    #[serde(rename = "Pct_Natural_Gas")]
    pub pct_natural_gas: Option<f64>,
    #[serde(rename = "Pct_Propane")]
    pub pct_propane: Option<f64>,
    #[serde(rename = "Pct_Electricity")]
    pub pct_electricity: Option<f64>,
    #[serde(rename = "Pct_Fuel_Oil")]
    pub pct_fuel_oil: Option<f64>,
    #[serde(rename = "Pct_Coal")]
    pub pct_coal: Option<f64>,
    #[serde(rename = "Pct_Wood")]
    pub pct_wood: Option<f64>,
    #[serde(rename = "Pct_Solar")]
    pub pct_solar: Option<f64>,
    #[serde(rename = "Pct_Other")]
    pub pct_other: Option<f64>,
    #[serde(rename = "Pct_No_Fuel")]
    pub pct_no_fuel: Option<f64>,
    #[serde(rename = "Has_Dom_Tie")]
    pub has_dom_tie: bool,
    #[serde(rename = "Dom_Fuel_Type")]
    pub dom_fuel_type: DominantFuel,
    #[serde(rename = "Dom_Fuel_Count")]
    pub dom_fuel_count: Option<u32>,
    #[serde(rename = "Dom_Fuel_Pct")]
    pub dom_fuel_pct: Option<f64>,
}

impl TractRecord {
    /// Classifies one raw tract row.
    ///
    /// Pure: the output is a function of the input row alone, and
    /// reclassifying the same counts always yields the same record.
    #[must_use]
    pub fn classify(raw: RawTract) -> Self {
        let counts = raw.counts;
        Self {
            fips_code: tract_fips(&raw.geoid).to_string(),
            data_quality_check: counts.quality(),
            pct_natural_gas: counts.percentage(FuelType::NaturalGas),
            pct_propane: counts.percentage(FuelType::Propane),
            pct_electricity: counts.percentage(FuelType::Electricity),
            pct_fuel_oil: counts.percentage(FuelType::FuelOil),
            pct_coal: counts.percentage(FuelType::Coal),
            pct_wood: counts.percentage(FuelType::Wood),
            pct_solar: counts.percentage(FuelType::Solar),
            pct_other: counts.percentage(FuelType::Other),
            pct_no_fuel: counts.percentage(FuelType::NoFuel),
            has_dom_tie: counts.has_dominance_tie(),
            dom_fuel_type: counts.dominant(),
            dom_fuel_count: counts.dominant_count(),
            dom_fuel_pct: counts.dominant_pct(),
            total_housing_units: counts.total,
            natural_gas: counts.natural_gas,
            propane: counts.propane,
            electricity: counts.electricity,
            fuel_oil: counts.fuel_oil,
            coal: counts.coal,
            wood: counts.wood,
            solar: counts.solar,
            other: counts.other,
            no_fuel: counts.no_fuel,
            gisjoin: raw.gisjoin,
            year: raw.year,
            stusab: raw.stusab,
            state: raw.state,
            statea: raw.statea,
            county: raw.county,
            countya: raw.countya,
            tracta: raw.tracta,
            geoid: raw.geoid,
            county_name: raw.county_name,
        }
    }

    /// Returns the percentage field for one fuel.
    #[must_use]
    pub const fn percentage(&self, fuel: FuelType) -> Option<f64> {
        match fuel {
            FuelType::NaturalGas => self.pct_natural_gas,
            FuelType::Propane => self.pct_propane,
            FuelType::Electricity => self.pct_electricity,
            FuelType::FuelOil => self.pct_fuel_oil,
            FuelType::Coal => self.pct_coal,
            FuelType::Wood => self.pct_wood,
            FuelType::Solar => self.pct_solar,
            FuelType::Other => self.pct_other,
            FuelType::NoFuel => self.pct_no_fuel,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn raw(counts: FuelCounts) -> RawTract {
        RawTract {
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
        }
    }

    #[test]
    fn single_dominant_fuel() {
        let counts = FuelCounts {
            total: Some(100),
            natural_gas: Some(80),
            propane: Some(0),
            electricity: Some(0),
            fuel_oil: Some(0),
            coal: Some(0),
            wood: Some(0),
            solar: Some(0),
            other: Some(0),
            no_fuel: Some(0),
        };
        let record = TractRecord::classify(raw(counts));

        assert_eq!(record.data_quality_check, DataQuality::ValidData);
        assert!(!record.has_dom_tie);
        assert_eq!(record.dom_fuel_type, DominantFuel::NaturalGas);
        assert_eq!(record.dom_fuel_count, Some(80));
        assert_eq!(record.dom_fuel_pct, Some(80.0));
        assert_eq!(record.pct_natural_gas, Some(80.0));
        assert_eq!(record.pct_no_fuel, Some(0.0));
    }

    #[test]
    fn tie_between_two_fuels() {
        // Total need not equal the sum of the fuel counts.
        let counts = FuelCounts {
            total: Some(100),
            natural_gas: Some(40),
            electricity: Some(40),
            propane: Some(0),
            fuel_oil: Some(0),
            coal: Some(0),
            wood: Some(0),
            solar: Some(0),
            other: Some(0),
            no_fuel: Some(0),
        };
        let record = TractRecord::classify(raw(counts));

        assert!(record.has_dom_tie);
        assert_eq!(record.dom_fuel_type, DominantFuel::Tie);
        assert_eq!(record.dom_fuel_count, None);
        assert_eq!(record.dom_fuel_pct, None);
        // Percentages are still defined on tied rows.
        assert_eq!(record.pct_natural_gas, Some(40.0));
    }

    #[test]
    fn zero_total_is_insufficient_not_tied() {
        let counts = FuelCounts {
            total: Some(0),
            natural_gas: Some(0),
            propane: Some(0),
            electricity: Some(0),
            fuel_oil: Some(0),
            coal: Some(0),
            wood: Some(0),
            solar: Some(0),
            other: Some(0),
            no_fuel: Some(0),
        };
        let record = TractRecord::classify(raw(counts));

        assert_eq!(record.data_quality_check, DataQuality::InsufficientData);
        assert_eq!(record.dom_fuel_type, DominantFuel::NoData);
        // All nine fields tie at 0, but zero-total rows are never flagged.
        assert!(!record.has_dom_tie);
        assert_eq!(record.pct_natural_gas, None);
        assert_eq!(record.dom_fuel_count, None);
        assert_eq!(record.dom_fuel_pct, None);
    }

    #[test]
    fn missing_total_is_insufficient_but_tie_flag_still_computes() {
        let counts = FuelCounts {
            total: None,
            natural_gas: Some(5),
            electricity: Some(5),
            ..FuelCounts::default()
        };
        let record = TractRecord::classify(raw(counts));

        assert_eq!(record.data_quality_check, DataQuality::InsufficientData);
        assert_eq!(record.dom_fuel_type, DominantFuel::NoData);
        // The tie flag only suppresses ties for a literal zero total.
        assert!(record.has_dom_tie);
        assert_eq!(record.pct_natural_gas, None);
    }

    #[test]
    fn canonical_order_breaks_nothing_on_unique_max() {
        // No_Fuel holds the unique maximum even though it is scanned last.
        let counts = FuelCounts {
            total: Some(50),
            natural_gas: Some(10),
            no_fuel: Some(30),
            ..FuelCounts::default()
        };
        let record = TractRecord::classify(raw(counts));

        assert_eq!(record.dom_fuel_type, DominantFuel::NoFuel);
        assert_eq!(record.dom_fuel_count, Some(30));
        assert_eq!(record.dom_fuel_pct, Some(60.0));
    }

    #[test]
    fn valid_total_without_counts_is_the_error_sentinel() {
        let counts = FuelCounts {
            total: Some(10),
            ..FuelCounts::default()
        };
        let record = TractRecord::classify(raw(counts));

        assert_eq!(record.data_quality_check, DataQuality::ValidData);
        assert_eq!(record.dom_fuel_type, DominantFuel::Error);
        assert!(!record.has_dom_tie);
        assert_eq!(record.dom_fuel_count, None);
        assert_eq!(record.dom_fuel_pct, None);
        assert_eq!(record.pct_natural_gas, None);
    }

    #[test]
    fn missing_individual_count_leaves_percentage_undefined() {
        let counts = FuelCounts {
            total: Some(100),
            natural_gas: Some(60),
            electricity: None,
            ..FuelCounts::default()
        };
        let record = TractRecord::classify(raw(counts));

        assert_eq!(record.pct_natural_gas, Some(60.0));
        assert_eq!(record.pct_electricity, None);
        assert_eq!(record.dom_fuel_type, DominantFuel::NaturalGas);
    }

    #[test]
    fn percentages_round_to_one_decimal() {
        let counts = FuelCounts {
            total: Some(3),
            natural_gas: Some(1),
            electricity: Some(2),
            ..FuelCounts::default()
        };
        let record = TractRecord::classify(raw(counts));

        assert_eq!(record.pct_natural_gas, Some(33.3));
        assert_eq!(record.pct_electricity, Some(66.7));
        assert_eq!(record.dom_fuel_pct, Some(66.7));
    }

    #[test]
    fn rounding_breaks_ties_to_even() {
        // 1/16 = 6.25% and 3/16 = 18.75%, both exact in binary.
        let counts = FuelCounts {
            total: Some(16),
            natural_gas: Some(1),
            electricity: Some(3),
            ..FuelCounts::default()
        };
        let record = TractRecord::classify(raw(counts));

        assert_eq!(record.pct_natural_gas, Some(6.2));
        assert_eq!(record.pct_electricity, Some(18.8));
    }

    #[test]
    fn fips_code_is_last_eleven_characters_of_geoid() {
        let record = TractRecord::classify(raw(FuelCounts::default()));
        assert_eq!(record.fips_code, "36061000100");
    }

    #[test]
    fn classification_is_idempotent() {
        let counts = FuelCounts {
            total: Some(120),
            natural_gas: Some(50),
            electricity: Some(50),
            wood: Some(20),
            ..FuelCounts::default()
        };
        let first = TractRecord::classify(raw(counts));
        let second = TractRecord::classify(raw(counts));
        assert_eq!(first, second);
    }
}
