//! Run manifest.
//!
//! Records every artifact written to the output directory in
//! `manifest.json` so reruns can tell what a directory already holds and
//! when it was produced.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::RenderError;

/// Current manifest schema version. Bump this when the manifest format
/// changes in a backward-incompatible way.
const MANIFEST_VERSION: u32 = 1;

/// One artifact's provenance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestEntry {
    /// ISO 8601 timestamp of the last successful render.
    pub generated_at: String,
    /// Survey years the artifact covers.
    pub years: Vec<u16>,
    /// Classified tract rows behind the artifact.
    pub tracts: usize,
}

/// Render manifest stored at `<output dir>/manifest.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    version: u32,
    /// Map of artifact stem (no extension) to its provenance.
    outputs: BTreeMap<String, ManifestEntry>,
}

impl Default for RunManifest {
    fn default() -> Self {
        Self {
            version: MANIFEST_VERSION,
            outputs: BTreeMap::new(),
        }
    }
}

impl RunManifest {
    /// Records a successfully rendered artifact, replacing any previous
    /// entry under the same stem.
    pub fn record(&mut self, stem: &str, years: &[u16], tracts: usize) {
        self.outputs.insert(
            stem.to_string(),
            ManifestEntry {
                generated_at: chrono::Utc::now().to_rfc3339(),
                years: years.to_vec(),
                tracts,
            },
        );
    }

    #[must_use]
    pub fn entry(&self, stem: &str) -> Option<&ManifestEntry> {
        self.outputs.get(stem)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// Loads the manifest from `dir/manifest.json`.
///
/// Returns `None` if the file does not exist or cannot be parsed.
#[must_use]
pub fn load_manifest(dir: &Path) -> Option<RunManifest> {
    let path = dir.join("manifest.json");
    let Ok(contents) = std::fs::read_to_string(&path) else {
        log::info!("No existing manifest found");
        return None;
    };
    match serde_json::from_str::<RunManifest>(&contents) {
        Ok(manifest) if manifest.version == MANIFEST_VERSION => {
            log::info!("Loaded manifest from {}", path.display());
            Some(manifest)
        }
        Ok(manifest) => {
            log::warn!(
                "Ignoring manifest {} with unsupported version {}",
                path.display(),
                manifest.version
            );
            None
        }
        Err(e) => {
            log::warn!("Failed to parse manifest {}: {e}", path.display());
            None
        }
    }
}

/// Writes the manifest to `dir/manifest.json`, staging through
/// `manifest.json.tmp` and renaming into place.
///
/// # Errors
///
/// * If the file cannot be written.
pub fn save_manifest(dir: &Path, manifest: &RunManifest) -> Result<(), RenderError> {
    let path = dir.join("manifest.json");
    let tmp_path = dir.join("manifest.json.tmp");
    let contents = serde_json::to_string_pretty(manifest)?;
    std::fs::write(&tmp_path, contents)?;
    std::fs::rename(&tmp_path, &path)?;
    log::info!("Saved manifest to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_disk() {
        let tmp = std::env::temp_dir().join("fuel_map_manifest_test");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();

        let mut manifest = RunManifest::default();
        manifest.record("heating_fuel_map_2020", &[2020], 84_000);
        manifest.record("heating_fuel_grid_2015_2023", &[2015, 2020, 2023], 250_000);
        save_manifest(&tmp, &manifest).unwrap();

        let loaded = load_manifest(&tmp).unwrap();
        assert_eq!(loaded.len(), 2);
        let entry = loaded.entry("heating_fuel_grid_2015_2023").unwrap();
        assert_eq!(entry.years, vec![2015, 2020, 2023]);
        assert_eq!(entry.tracts, 250_000);
        assert!(!entry.generated_at.is_empty());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_manifest_loads_as_none() {
        let tmp = std::env::temp_dir().join("fuel_map_manifest_test_missing");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();

        assert!(load_manifest(&tmp).is_none());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn corrupt_manifest_loads_as_none() {
        let tmp = std::env::temp_dir().join("fuel_map_manifest_test_corrupt");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();
        std::fs::write(tmp.join("manifest.json"), "{ not json").unwrap();

        assert!(load_manifest(&tmp).is_none());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn future_manifest_version_loads_as_none() {
        let tmp = std::env::temp_dir().join("fuel_map_manifest_test_version");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();
        std::fs::write(
            tmp.join("manifest.json"),
            r#"{"version": 99, "outputs": {}}"#,
        )
        .unwrap();

        assert!(load_manifest(&tmp).is_none());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn recording_the_same_stem_replaces_it() {
        let mut manifest = RunManifest::default();
        manifest.record("heating_fuel_map_2015", &[2015], 10);
        manifest.record("heating_fuel_map_2015", &[2015], 20);
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.entry("heating_fuel_map_2015").unwrap().tracts, 20);
    }
}
