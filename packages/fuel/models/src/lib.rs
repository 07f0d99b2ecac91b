#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Heating fuel taxonomy types shared across the fuel-map system.
//!
//! Defines the nine canonical house-heating fuels reported by the ACS
//! housing-fuel tables, the dominant-fuel label domain produced by the
//! classifier, and the simplified display categories used for mapping.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The nine canonical heating fuel types, in canonical column order.
///
/// The declaration order is load-bearing: it is the iteration contract for
/// dominant-fuel selection (first fuel matching the row maximum wins) and
/// the column order of the classified table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum FuelType {
    /// Utility gas from underground pipes
    #[serde(rename = "Natural_Gas")]
    #[strum(serialize = "Natural_Gas")]
    NaturalGas,
    /// Bottled, tank, or LP gas
    #[serde(rename = "Propane")]
    #[strum(serialize = "Propane")]
    Propane,
    /// Electric heating
    #[serde(rename = "Electricity")]
    #[strum(serialize = "Electricity")]
    Electricity,
    /// Fuel oil, kerosene, etc.
    #[serde(rename = "Fuel_Oil")]
    #[strum(serialize = "Fuel_Oil")]
    FuelOil,
    /// Coal or coke
    #[serde(rename = "Coal")]
    #[strum(serialize = "Coal")]
    Coal,
    /// Wood heating
    #[serde(rename = "Wood")]
    #[strum(serialize = "Wood")]
    Wood,
    /// Solar energy
    #[serde(rename = "Solar")]
    #[strum(serialize = "Solar")]
    Solar,
    /// Any other fuel
    #[serde(rename = "Other")]
    #[strum(serialize = "Other")]
    Other,
    /// No fuel used
    #[serde(rename = "No_Fuel")]
    #[strum(serialize = "No_Fuel")]
    NoFuel,
}

impl FuelType {
    /// Returns all fuel types in canonical column order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::NaturalGas,
            Self::Propane,
            Self::Electricity,
            Self::FuelOil,
            Self::Coal,
            Self::Wood,
            Self::Solar,
            Self::Other,
            Self::NoFuel,
        ]
    }

    /// Returns the canonical column label for this fuel.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NaturalGas => "Natural_Gas",
            Self::Propane => "Propane",
            Self::Electricity => "Electricity",
            Self::FuelOil => "Fuel_Oil",
            Self::Coal => "Coal",
            Self::Wood => "Wood",
            Self::Solar => "Solar",
            Self::Other => "Other",
            Self::NoFuel => "No_Fuel",
        }
    }

    /// Returns the percentage column label for this fuel.
    #[must_use]
    pub const fn pct_label(self) -> &'static str {
        match self {
            Self::NaturalGas => "Pct_Natural_Gas",
            Self::Propane => "Pct_Propane",
            Self::Electricity => "Pct_Electricity",
            Self::FuelOil => "Pct_Fuel_Oil",
            Self::Coal => "Pct_Coal",
            Self::Wood => "Pct_Wood",
            Self::Solar => "Pct_Solar",
            Self::Other => "Pct_Other",
            Self::NoFuel => "Pct_No_Fuel",
        }
    }
}

/// Dominant-fuel label assigned to each classified tract.
///
/// Either one of the nine concrete fuels, or one of the outcome labels:
/// [`Tie`](Self::Tie) when multiple fuels share the row maximum,
/// [`NoData`](Self::NoData) when the tract has no usable housing-unit total,
/// and [`Error`](Self::Error), a defect sentinel that signals the maximum
/// computation found no matching fuel (a valid total with no parseable
/// counts). `Error` must always be surfaced by consumers, never dropped.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum DominantFuel {
    #[serde(rename = "Natural_Gas")]
    #[strum(serialize = "Natural_Gas")]
    NaturalGas,
    #[serde(rename = "Propane")]
    #[strum(serialize = "Propane")]
    Propane,
    #[serde(rename = "Electricity")]
    #[strum(serialize = "Electricity")]
    Electricity,
    #[serde(rename = "Fuel_Oil")]
    #[strum(serialize = "Fuel_Oil")]
    FuelOil,
    #[serde(rename = "Coal")]
    #[strum(serialize = "Coal")]
    Coal,
    #[serde(rename = "Wood")]
    #[strum(serialize = "Wood")]
    Wood,
    #[serde(rename = "Solar")]
    #[strum(serialize = "Solar")]
    Solar,
    #[serde(rename = "Other")]
    #[strum(serialize = "Other")]
    Other,
    #[serde(rename = "No_Fuel")]
    #[strum(serialize = "No_Fuel")]
    NoFuel,
    /// Multiple fuels tied for the row maximum
    #[serde(rename = "Tie")]
    #[strum(serialize = "Tie")]
    Tie,
    /// Insufficient data (missing or zero housing-unit total)
    #[serde(rename = "No_Data")]
    #[strum(serialize = "No_Data")]
    NoData,
    /// Defect sentinel: no fuel matched the computed maximum
    #[serde(rename = "Error")]
    #[strum(serialize = "Error")]
    Error,
}

impl DominantFuel {
    /// Wraps a concrete fuel as a dominant-fuel label.
    #[must_use]
    pub const fn from_fuel(fuel: FuelType) -> Self {
        match fuel {
            FuelType::NaturalGas => Self::NaturalGas,
            FuelType::Propane => Self::Propane,
            FuelType::Electricity => Self::Electricity,
            FuelType::FuelOil => Self::FuelOil,
            FuelType::Coal => Self::Coal,
            FuelType::Wood => Self::Wood,
            FuelType::Solar => Self::Solar,
            FuelType::Other => Self::Other,
            FuelType::NoFuel => Self::NoFuel,
        }
    }

    /// Returns the concrete fuel for this label, or `None` for the
    /// `Tie`/`No_Data`/`Error` outcomes.
    #[must_use]
    pub const fn fuel(self) -> Option<FuelType> {
        match self {
            Self::NaturalGas => Some(FuelType::NaturalGas),
            Self::Propane => Some(FuelType::Propane),
            Self::Electricity => Some(FuelType::Electricity),
            Self::FuelOil => Some(FuelType::FuelOil),
            Self::Coal => Some(FuelType::Coal),
            Self::Wood => Some(FuelType::Wood),
            Self::Solar => Some(FuelType::Solar),
            Self::Other => Some(FuelType::Other),
            Self::NoFuel => Some(FuelType::NoFuel),
            Self::Tie | Self::NoData | Self::Error => None,
        }
    }

    /// Returns the simplified display bucket for this label.
    ///
    /// The five common fuels pass through unchanged; rare fuels and `Tie`
    /// collapse into [`SimpleFuel::Other`]; `No_Fuel`, `No_Data`, and the
    /// `Error` sentinel collapse into [`SimpleFuel::NoFuelMissing`]. Callers
    /// that care about `Error` must count it before simplifying.
    #[must_use]
    pub const fn simplify(self) -> SimpleFuel {
        match self {
            Self::NaturalGas => SimpleFuel::NaturalGas,
            Self::Electricity => SimpleFuel::Electricity,
            Self::Propane => SimpleFuel::Propane,
            Self::FuelOil => SimpleFuel::FuelOil,
            Self::Wood => SimpleFuel::Wood,
            Self::Tie | Self::Coal | Self::Solar | Self::Other => SimpleFuel::Other,
            Self::NoFuel | Self::NoData | Self::Error => SimpleFuel::NoFuelMissing,
        }
    }
}

/// Simplified 7-bucket display categories used by the map legend.
///
/// Declared in legend order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum SimpleFuel {
    #[serde(rename = "Electricity")]
    #[strum(serialize = "Electricity")]
    Electricity,
    #[serde(rename = "Natural_Gas")]
    #[strum(serialize = "Natural_Gas")]
    NaturalGas,
    #[serde(rename = "Propane")]
    #[strum(serialize = "Propane")]
    Propane,
    #[serde(rename = "Fuel_Oil")]
    #[strum(serialize = "Fuel_Oil")]
    FuelOil,
    #[serde(rename = "Wood")]
    #[strum(serialize = "Wood")]
    Wood,
    #[serde(rename = "Other")]
    #[strum(serialize = "Other")]
    Other,
    #[serde(rename = "No_Fuel_Missing")]
    #[strum(serialize = "No_Fuel_Missing")]
    NoFuelMissing,
}

impl SimpleFuel {
    /// Returns all display buckets in legend order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Electricity,
            Self::NaturalGas,
            Self::Propane,
            Self::FuelOil,
            Self::Wood,
            Self::Other,
            Self::NoFuelMissing,
        ]
    }

    /// Returns the fixed display color (hex) for this bucket.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::NaturalGas => "#3182bd",
            Self::Electricity => "#31a354",
            Self::FuelOil => "#de2d26",
            Self::Propane => "#fd8d3c",
            Self::Wood => "#8c6d31",
            Self::Other => "#969696",
            Self::NoFuelMissing => "#f0f0f0",
        }
    }

    /// Returns the display color as an RGB triple, for raster backends
    /// that do not parse hex strings.
    #[must_use]
    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::NaturalGas => (0x31, 0x82, 0xbd),
            Self::Electricity => (0x31, 0xa3, 0x54),
            Self::FuelOil => (0xde, 0x2d, 0x26),
            Self::Propane => (0xfd, 0x8d, 0x3c),
            Self::Wood => (0x8c, 0x6d, 0x31),
            Self::Other => (0x96, 0x96, 0x96),
            Self::NoFuelMissing => (0xf0, 0xf0, 0xf0),
        }
    }

    /// Returns the human-readable legend label for this bucket.
    #[must_use]
    pub const fn legend_label(self) -> &'static str {
        match self {
            Self::Electricity => "Electricity",
            Self::NaturalGas => "Natural Gas",
            Self::Propane => "Propane",
            Self::FuelOil => "Fuel Oil",
            Self::Wood => "Wood",
            Self::Other => "Other",
            Self::NoFuelMissing => "No Fuel/Missing",
        }
    }
}

/// Row-level data quality flag on the classified table.
///
/// [`InsufficientData`](Self::InsufficientData) iff the housing-unit total is
/// missing or not strictly positive. The flag gates all percentage and
/// dominance computation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum DataQuality {
    #[serde(rename = "Valid_Data")]
    #[strum(serialize = "Valid_Data")]
    ValidData,
    #[serde(rename = "Insufficient_Data")]
    #[strum(serialize = "Insufficient_Data")]
    InsufficientData,
}

impl DataQuality {
    /// Returns `true` for [`ValidData`](Self::ValidData).
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::ValidData)
    }
}
