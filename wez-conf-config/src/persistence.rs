//! Persisted state records for the settings store.
//!
//! Two independent records live under the data directory:
//!
//! - `settings.yaml` — map of changed setting keys to their string values.
//!   Absent keys imply the schema default, so the record stays minimal and
//!   keeps working if defaults change in a later release.
//! - `mappings.yaml` — ordered list of `{mods, key, action}` objects.
//!   Session-local mapping ids are never persisted; they are regenerated on
//!   load.
//!
//! Writes are atomic (temp file + rename). An empty record removes its file.
//! Load failures degrade to empty records with a warning; persisted state is
//! a convenience, never a reason to refuse startup.

use crate::catalog::MappingFields;
use crate::error::StateError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Locations of the two state records.
///
/// Production code uses [`StorePaths::default`]; tests point this at a
/// temporary directory.
#[derive(Debug, Clone)]
pub struct StorePaths {
    data_dir: PathBuf,
}

impl StorePaths {
    /// State directory following the platform convention:
    /// `~/.local/share/wez-conf` on Unix, the local data dir on Windows.
    pub fn new() -> Self {
        #[cfg(target_os = "windows")]
        let data_dir = dirs::data_local_dir()
            .map(|d| d.join("wez-conf"))
            .unwrap_or_else(|| PathBuf::from("."));

        #[cfg(not(target_os = "windows"))]
        let data_dir = dirs::home_dir()
            .map(|h| h.join(".local").join("share").join("wez-conf"))
            .unwrap_or_else(|| PathBuf::from("."));

        Self { data_dir }
    }

    /// Use an explicit directory (tests, or `WEZ_CONF_DATA_DIR` overrides).
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: dir.into() }
    }

    pub fn settings_file(&self) -> PathBuf {
        self.data_dir.join("settings.yaml")
    }

    pub fn mappings_file(&self) -> PathBuf {
        self.data_dir.join("mappings.yaml")
    }
}

impl Default for StorePaths {
    fn default() -> Self {
        Self::new()
    }
}

/// Atomic save: write to a temp file in the same directory, then rename.
fn write_atomic(path: &Path, contents: &str) -> Result<(), StateError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("yaml.tmp");
    fs::write(&temp_path, contents)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<(), StateError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Load the changed-settings record. Missing or malformed files yield an
/// empty map.
pub(crate) fn load_settings_record(paths: &StorePaths) -> BTreeMap<String, String> {
    let path = paths.settings_file();
    if !path.exists() {
        return BTreeMap::new();
    }
    match fs::read_to_string(&path) {
        Ok(contents) => match serde_yaml_ng::from_str(&contents) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Ignoring malformed settings record {:?}: {}", path, e);
                BTreeMap::new()
            }
        },
        Err(e) => {
            log::warn!("Failed to read settings record {:?}: {}", path, e);
            BTreeMap::new()
        }
    }
}

/// Save the changed-settings record, removing the file when nothing differs
/// from defaults.
pub(crate) fn save_settings_record(
    paths: &StorePaths,
    changed: &BTreeMap<String, String>,
) -> Result<(), StateError> {
    let path = paths.settings_file();
    if changed.is_empty() {
        return remove_if_exists(&path);
    }
    let yaml = serde_yaml_ng::to_string(changed)?;
    write_atomic(&path, &yaml)
}

/// Load the mapping-list record. Missing or malformed files yield an empty
/// list.
pub(crate) fn load_mappings_record(paths: &StorePaths) -> Vec<MappingFields> {
    let path = paths.mappings_file();
    if !path.exists() {
        return Vec::new();
    }
    match fs::read_to_string(&path) {
        Ok(contents) => match serde_yaml_ng::from_str(&contents) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Ignoring malformed mappings record {:?}: {}", path, e);
                Vec::new()
            }
        },
        Err(e) => {
            log::warn!("Failed to read mappings record {:?}: {}", path, e);
            Vec::new()
        }
    }
}

/// Save the mapping-list record, removing the file when the list is empty.
pub(crate) fn save_mappings_record(
    paths: &StorePaths,
    mappings: &[MappingFields],
) -> Result<(), StateError> {
    let path = paths.mappings_file();
    if mappings.is_empty() {
        return remove_if_exists(&path);
    }
    let yaml = serde_yaml_ng::to_string(mappings)?;
    write_atomic(&path, &yaml)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_paths() -> (tempfile::TempDir, StorePaths) {
        let dir = tempfile::tempdir().unwrap();
        let paths = StorePaths::with_dir(dir.path());
        (dir, paths)
    }

    #[test]
    fn test_settings_record_roundtrip() {
        let (_dir, paths) = temp_paths();
        let mut changed = BTreeMap::new();
        changed.insert("font_size".to_string(), "14.5".to_string());
        changed.insert("enable_tab_bar".to_string(), "false".to_string());

        save_settings_record(&paths, &changed).unwrap();
        assert_eq!(load_settings_record(&paths), changed);
    }

    #[test]
    fn test_empty_settings_record_removes_file() {
        let (_dir, paths) = temp_paths();
        let mut changed = BTreeMap::new();
        changed.insert("font_size".to_string(), "14.5".to_string());
        save_settings_record(&paths, &changed).unwrap();
        assert!(paths.settings_file().exists());

        save_settings_record(&paths, &BTreeMap::new()).unwrap();
        assert!(!paths.settings_file().exists());
    }

    #[test]
    fn test_mappings_record_roundtrip() {
        let (_dir, paths) = temp_paths();
        let mappings = vec![
            MappingFields::new("CTRL|SHIFT", "c", "CopyTo"),
            MappingFields::new("", "F11", "ToggleFullScreen"),
        ];
        save_mappings_record(&paths, &mappings).unwrap();
        // Order is significant and must survive the round trip.
        assert_eq!(load_mappings_record(&paths), mappings);
    }

    #[test]
    fn test_missing_records_load_empty() {
        let (_dir, paths) = temp_paths();
        assert!(load_settings_record(&paths).is_empty());
        assert!(load_mappings_record(&paths).is_empty());
    }

    #[test]
    fn test_malformed_record_loads_empty() {
        let (_dir, paths) = temp_paths();
        fs::create_dir_all(paths.settings_file().parent().unwrap()).unwrap();
        fs::write(paths.settings_file(), "{ not yaml: [").unwrap();
        assert!(load_settings_record(&paths).is_empty());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let (_dir, paths) = temp_paths();
        let mut changed = BTreeMap::new();
        changed.insert("term".to_string(), "xterm".to_string());
        save_settings_record(&paths, &changed).unwrap();
        assert!(!paths.settings_file().with_extension("yaml.tmp").exists());
    }
}
