#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic reference data for tract-level mapping.
//!
//! State FIPS lookup tables, tract GEOID helpers, and the fixed state
//! groupings used for map extent filtering (contiguous US vs Alaska inset
//! vs excluded territories).

pub mod fips;

/// States excluded from map output by default (no panel of their own).
pub const DEFAULT_EXCLUDED_STATES: &[&str] = &["HI", "PR"];

/// State abbreviation routed to the inset panel.
pub const ALASKA: &str = "AK";

/// States outside the contiguous-US main panel.
pub const NON_CONUS_STATES: &[&str] = &["AK", "HI", "PR"];

/// Extracts the 11-character state+county+tract FIPS code from a full
/// geographic identifier (e.g. `"14000US36061000100"` -> `"36061000100"`).
///
/// Identifiers shorter than 11 characters are returned whole; callers that
/// care should detect this via [`str::len`] and surface it.
#[must_use]
pub fn tract_fips(geoid: &str) -> &str {
    geoid
        .get(geoid.len().saturating_sub(11)..)
        .unwrap_or(geoid)
}

/// Derives the two-digit state FIPS code from an 11-character tract FIPS
/// code (first 2 characters).
#[must_use]
pub fn state_fips_of_tract(fips_code: &str) -> Option<&str> {
    fips_code.get(..2)
}
