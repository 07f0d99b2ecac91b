//! Map preparation: joining classified records onto tract shapes.
//!
//! A left join on `GISJOIN` tags every tract polygon with its display
//! bucket. Shapes without a classified row render as `No_Fuel_Missing`,
//! excluded states drop, and Alaska splits into its inset panel. The
//! `Error` sentinel is counted here, before the bucket collapse hides it.

use std::collections::BTreeMap;

use fuel_map_classify::{SurveyYear, TractRecord};
use fuel_map_fuel_models::{DominantFuel, SimpleFuel};
use fuel_map_geography_models::ALASKA;
use geo::MultiPolygon;

use crate::boundaries::TractLayer;

/// One survey year's tract polygons, joined, bucketed, and split by panel.
pub struct PreparedYear {
    pub year: SurveyYear,
    pub conus: Vec<(MultiPolygon<f64>, SimpleFuel)>,
    pub alaska: Vec<(MultiPolygon<f64>, SimpleFuel)>,
    pub matched: usize,
    pub unmatched: usize,
    pub excluded: usize,
    /// Matched rows carrying the `Error` sentinel.
    pub error_rows: usize,
}

impl PreparedYear {
    /// Number of tract polygons that will render.
    #[must_use]
    pub fn tract_count(&self) -> usize {
        self.conus.len() + self.alaska.len()
    }
}

/// Joins classified records onto tract shapes and splits them by panel.
#[must_use]
pub fn prepare_year(
    year: SurveyYear,
    records: &[TractRecord],
    tracts: TractLayer,
    exclude: &[String],
) -> PreparedYear {
    let by_gisjoin: BTreeMap<&str, (&str, DominantFuel)> = records
        .iter()
        .map(|record| {
            (
                record.gisjoin.as_str(),
                (record.stusab.as_str(), record.dom_fuel_type),
            )
        })
        .collect();

    let shape_count = tracts.shapes.len();
    let mut prepared = PreparedYear {
        year,
        conus: Vec::new(),
        alaska: Vec::new(),
        matched: 0,
        unmatched: 0,
        excluded: 0,
        error_rows: 0,
    };

    for shape in tracts.shapes {
        let Some((stusab, dominant)) = by_gisjoin.get(shape.gisjoin.as_str()) else {
            // Unmatched shapes still draw, in the missing-data color.
            prepared.unmatched += 1;
            prepared.conus.push((shape.polygon, SimpleFuel::NoFuelMissing));
            continue;
        };

        prepared.matched += 1;
        if *dominant == DominantFuel::Error {
            prepared.error_rows += 1;
        }
        if exclude.iter().any(|excluded| excluded.eq_ignore_ascii_case(stusab)) {
            prepared.excluded += 1;
            continue;
        }

        let bucket = dominant.simplify();
        if *stusab == ALASKA {
            prepared.alaska.push((shape.polygon, bucket));
        } else {
            prepared.conus.push((shape.polygon, bucket));
        }
    }

    log::info!(
        "{year}: joined {} of {shape_count} tract shapes ({} unmatched, {} excluded, {} to the Alaska inset)",
        prepared.matched,
        prepared.unmatched,
        prepared.excluded,
        prepared.alaska.len()
    );
    if prepared.error_rows > 0 {
        log::error!(
            "{year}: {} joined rows carry the Error sentinel and render as missing",
            prepared.error_rows
        );
    }

    prepared
}
