//! Year-keyed column schemas for the raw NHGIS extracts.
//!
//! Each supported survey vintage names its geographic identifier column and
//! its fuel-count columns differently; everything else about the extracts is
//! shared. The year set is fixed and closed, so the dispatch is a plain enum
//! with per-variant lookup methods.

use fuel_map_fuel_models::FuelType;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::ClassifyError;

/// Raw columns carried through to the classified table unchanged.
pub const PASSTHROUGH_COLUMNS: &[&str] = &[
    "GISJOIN", "YEAR", "STUSAB", "STATE", "STATEA", "COUNTY", "COUNTYA", "TRACTA",
];

/// The three supported ACS 5-year survey vintages.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, AsRefStr,
)]
pub enum SurveyYear {
    /// 2011-2015 ACS 5-year estimates (NHGIS table prefix `ADQYE`)
    #[strum(serialize = "2015")]
    Y2015,
    /// 2016-2020 ACS 5-year estimates (NHGIS table prefix `AMVDE`)
    #[strum(serialize = "2020")]
    Y2020,
    /// 2019-2023 ACS 5-year estimates (NHGIS table prefix `ASUPE`)
    #[strum(serialize = "2023")]
    Y2023,
}

impl SurveyYear {
    /// Returns all supported vintages in ascending order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Y2015, Self::Y2020, Self::Y2023]
    }

    /// Resolves a numeric year to its vintage.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::UnsupportedYear`] for any year outside the
    /// supported set; never silently defaults.
    pub fn from_year(year: u16) -> Result<Self, ClassifyError> {
        match year {
            2015 => Ok(Self::Y2015),
            2020 => Ok(Self::Y2020),
            2023 => Ok(Self::Y2023),
            _ => Err(ClassifyError::UnsupportedYear { year }),
        }
    }

    /// Returns the numeric year label.
    #[must_use]
    pub const fn year(self) -> u16 {
        match self {
            Self::Y2015 => 2015,
            Self::Y2020 => 2020,
            Self::Y2023 => 2023,
        }
    }

    /// Returns the name of the full geographic identifier column.
    ///
    /// The 2023 extract names it differently from the other two.
    #[must_use]
    pub const fn geoid_column(self) -> &'static str {
        match self {
            Self::Y2015 | Self::Y2020 => "GEOID",
            Self::Y2023 => "GEO_ID",
        }
    }

    /// Returns the name of the county/place name column.
    #[must_use]
    pub const fn name_column(self) -> &'static str {
        match self {
            Self::Y2015 | Self::Y2020 | Self::Y2023 => "NAME_E",
        }
    }

    /// Returns the NHGIS table prefix for the fuel-count columns.
    #[must_use]
    pub const fn fuel_prefix(self) -> &'static str {
        match self {
            Self::Y2015 => "ADQYE",
            Self::Y2020 => "AMVDE",
            Self::Y2023 => "ASUPE",
        }
    }

    /// Returns the raw column name holding total housing units
    /// (prefix + `001`).
    #[must_use]
    pub fn total_column(self) -> String {
        format!("{}001", self.fuel_prefix())
    }

    /// Returns the raw column name holding the count for `fuel`
    /// (prefix + `002`..`010` in canonical order).
    ///
    /// # Panics
    ///
    /// Panics if `fuel` is somehow absent from the canonical ordering, which
    /// cannot happen.
    #[must_use]
    pub fn fuel_column(self, fuel: FuelType) -> String {
        let ordinal = FuelType::all()
            .iter()
            .position(|candidate| *candidate == fuel)
            .expect("fuel missing from canonical ordering");
        format!("{}{:03}", self.fuel_prefix(), ordinal + 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_year_accepts_supported_vintages() {
        assert_eq!(SurveyYear::from_year(2015).unwrap(), SurveyYear::Y2015);
        assert_eq!(SurveyYear::from_year(2020).unwrap(), SurveyYear::Y2020);
        assert_eq!(SurveyYear::from_year(2023).unwrap(), SurveyYear::Y2023);
    }

    #[test]
    fn from_year_rejects_unsupported_vintages() {
        for year in [2010, 2016, 2021, 2024] {
            let err = SurveyYear::from_year(year).unwrap_err();
            assert!(matches!(
                err,
                ClassifyError::UnsupportedYear { year: y } if y == year
            ));
        }
    }

    #[test]
    fn geoid_column_differs_in_2023() {
        assert_eq!(SurveyYear::Y2015.geoid_column(), "GEOID");
        assert_eq!(SurveyYear::Y2020.geoid_column(), "GEOID");
        assert_eq!(SurveyYear::Y2023.geoid_column(), "GEO_ID");
    }

    #[test]
    fn fuel_columns_use_zero_padded_suffixes() {
        assert_eq!(SurveyYear::Y2015.total_column(), "ADQYE001");
        assert_eq!(
            SurveyYear::Y2015.fuel_column(FuelType::NaturalGas),
            "ADQYE002"
        );
        assert_eq!(SurveyYear::Y2015.fuel_column(FuelType::NoFuel), "ADQYE010");
        assert_eq!(
            SurveyYear::Y2020.fuel_column(FuelType::Electricity),
            "AMVDE004"
        );
        assert_eq!(SurveyYear::Y2023.fuel_column(FuelType::Wood), "ASUPE007");
    }

    #[test]
    fn display_is_the_numeric_year() {
        for vintage in SurveyYear::all() {
            assert_eq!(vintage.to_string(), vintage.year().to_string());
            let parsed: SurveyYear = vintage.to_string().parse().unwrap();
            assert_eq!(parsed, *vintage);
        }
    }
}
