//! GeoJSON boundary layer loading.
//!
//! Tract layers are keyed by their `GISJOIN` property; state layers by a
//! state-abbreviation property whose name varies between published
//! shapefile conversions. `Polygon` features are promoted to
//! `MultiPolygon`, and the layer CRS comes from the optional legacy `crs`
//! member (RFC 7946 files omit it and mean WGS 84).

use std::collections::BTreeSet;
use std::path::Path;

use geo::MultiPolygon;
use geojson::GeoJson;

use crate::RenderError;

/// State-abbreviation property names, tried in order.
pub const STATE_COLUMN_CANDIDATES: &[&str] = &["STUSAB", "STUSPS", "STATE_ABBR", "STATEABBR"];

/// CRS assumed when a layer carries no legacy `crs` member.
pub const DEFAULT_CRS: &str = "EPSG:4326";

/// Whether a CRS name denotes degree (geographic) coordinates rather than a
/// projected plane. Matches the codes census boundary exports actually carry:
/// WGS 84, NAD 83, and the GeoJSON-native CRS84, in both `EPSG:xxxx` and
/// `urn:ogc:def:crs:...` spellings.
#[must_use]
pub fn is_geographic_crs(crs: &str) -> bool {
    ["4326", "4269", "CRS84"]
        .iter()
        .any(|code| crs.contains(code))
}

/// One tract polygon with its join key.
#[derive(Debug, Clone)]
pub struct TractShape {
    pub gisjoin: String,
    pub polygon: MultiPolygon<f64>,
}

/// One state polygon with its postal abbreviation.
#[derive(Debug, Clone)]
pub struct StateShape {
    pub abbr: String,
    pub polygon: MultiPolygon<f64>,
}

/// A loaded tract boundary layer.
#[derive(Debug, Clone)]
pub struct TractLayer {
    pub crs: String,
    pub shapes: Vec<TractShape>,
}

/// A loaded state boundary layer.
#[derive(Debug, Clone)]
pub struct StateLayer {
    pub crs: String,
    pub shapes: Vec<StateShape>,
}

/// Loads a tract boundary layer from a GeoJSON file.
///
/// # Errors
///
/// Fails if the file cannot be read, is not valid GeoJSON, or is not a
/// `FeatureCollection`.
pub fn load_tracts(path: &Path) -> Result<TractLayer, RenderError> {
    let contents = std::fs::read_to_string(path)?;
    let layer = tracts_from_str(&contents, &path.display().to_string())?;
    log::info!(
        "{}: loaded {} tract shapes (crs {})",
        path.display(),
        layer.shapes.len(),
        layer.crs
    );
    Ok(layer)
}

/// Parses a tract boundary layer from GeoJSON text.
///
/// Features without a `GISJOIN` property or a usable polygon geometry are
/// skipped with a warning.
///
/// # Errors
///
/// Fails if the text is not a GeoJSON `FeatureCollection`.
pub fn tracts_from_str(text: &str, label: &str) -> Result<TractLayer, RenderError> {
    let collection = parse_collection(text, label)?;
    let crs = layer_crs(&collection);

    let mut shapes = Vec::with_capacity(collection.features.len());
    let mut skipped = 0usize;

    for feature in collection.features {
        let Some(gisjoin) = property_string(&feature, "GISJOIN") else {
            skipped += 1;
            continue;
        };
        let Some(polygon) = take_polygon(feature) else {
            log::warn!("skipping tract {gisjoin}: no usable polygon geometry");
            skipped += 1;
            continue;
        };
        shapes.push(TractShape { gisjoin, polygon });
    }

    if skipped > 0 {
        log::warn!("{label}: skipped {skipped} features without GISJOIN or polygon geometry");
    }

    Ok(TractLayer { crs, shapes })
}

/// Loads a state boundary layer from a GeoJSON file.
///
/// # Errors
///
/// Fails if the file cannot be read, is not a GeoJSON `FeatureCollection`,
/// or carries no recognizable state-abbreviation property.
pub fn load_states(path: &Path) -> Result<StateLayer, RenderError> {
    let contents = std::fs::read_to_string(path)?;
    let layer = states_from_str(&contents, &path.display().to_string())?;
    log::info!(
        "{}: loaded {} state shapes (crs {})",
        path.display(),
        layer.shapes.len(),
        layer.crs
    );
    Ok(layer)
}

/// Parses a state boundary layer from GeoJSON text.
///
/// # Errors
///
/// Fails if the text is not a GeoJSON `FeatureCollection` or no candidate
/// state-abbreviation property is present on any feature.
pub fn states_from_str(text: &str, label: &str) -> Result<StateLayer, RenderError> {
    let collection = parse_collection(text, label)?;
    let crs = layer_crs(&collection);
    let column = detect_state_property(&collection)?;
    log::debug!("{label}: state abbreviations come from the {column} property");

    let mut shapes = Vec::with_capacity(collection.features.len());

    for feature in collection.features {
        let Some(abbr) = property_string(&feature, column) else {
            continue;
        };
        let Some(polygon) = take_polygon(feature) else {
            log::warn!("skipping state {abbr}: no usable polygon geometry");
            continue;
        };
        shapes.push(StateShape { abbr, polygon });
    }

    Ok(StateLayer { crs, shapes })
}

fn parse_collection(text: &str, label: &str) -> Result<geojson::FeatureCollection, RenderError> {
    let geojson: GeoJson = text.parse()?;
    match geojson {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(_) | GeoJson::Geometry(_) => Err(RenderError::NotAFeatureCollection {
            layer: label.to_string(),
        }),
    }
}

/// Reads the layer CRS from the legacy `crs` foreign member.
fn layer_crs(collection: &geojson::FeatureCollection) -> String {
    collection
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("crs"))
        .and_then(|crs| crs.get("properties"))
        .and_then(|properties| properties.get("name"))
        .and_then(|name| name.as_str())
        .unwrap_or(DEFAULT_CRS)
        .to_string()
}

fn detect_state_property(
    collection: &geojson::FeatureCollection,
) -> Result<&'static str, RenderError> {
    for candidate in STATE_COLUMN_CANDIDATES {
        let present = collection.features.iter().any(|feature| {
            feature
                .properties
                .as_ref()
                .is_some_and(|properties| properties.contains_key(*candidate))
        });
        if present {
            return Ok(candidate);
        }
    }

    let available: BTreeSet<String> = collection
        .features
        .iter()
        .filter_map(|feature| feature.properties.as_ref())
        .flat_map(|properties| properties.keys().cloned())
        .collect();

    Err(RenderError::MissingStateColumn {
        tried: STATE_COLUMN_CANDIDATES,
        available: available.into_iter().collect(),
    })
}

fn property_string(feature: &geojson::Feature, key: &str) -> Option<String> {
    feature
        .properties
        .as_ref()?
        .get(key)?
        .as_str()
        .map(ToString::to_string)
}

fn take_polygon(feature: geojson::Feature) -> Option<MultiPolygon<f64>> {
    let geometry: geo::Geometry<f64> = feature.geometry?.try_into().ok()?;
    fuel_map_spatial::to_multipolygon(geometry)
}
