//! Persisted service settings
//!
//! Stored as `settings.json` inside the data directory so one volume
//! carries the whole service state. Unknown or missing fields fall back
//! to defaults, so older settings files keep working after upgrades.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Service settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seconds between sensor samples
    pub interval_seconds: u64,
    /// Pre-shared secret required by destructive endpoints
    pub http_password: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval_seconds: 300,
            http_password: "admin".to_string(),
        }
    }
}

impl Settings {
    /// Path of the settings file inside a data directory
    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join("settings.json")
    }

    /// Load settings from `path`
    ///
    /// A missing or unreadable file yields defaults; the service must
    /// come up even on a fresh or damaged volume.
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("settings file {} unreadable, using defaults: {e}", path.display());
                }
                return Self::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("settings file {} malformed, using defaults: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Persist settings, replacing the previous file atomically
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(self)?)?;
        fs::rename(&tmp, path)?;
        info!("settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(&Settings::path_in(dir.path()));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.interval_seconds, 300);
        assert_eq!(settings.http_password, "admin");
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = Settings::path_in(dir.path());

        let settings = Settings {
            interval_seconds: 60,
            http_password: "hunter2".to_string(),
        };
        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path), settings);
        // The temp file from the atomic replace is gone
        assert!(!dir.path().join("settings.json.tmp").exists());
    }

    #[test]
    fn test_malformed_file_defaults() {
        let dir = TempDir::new().unwrap();
        let path = Settings::path_in(dir.path());
        fs::write(&path, b"{not json").unwrap();

        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = Settings::path_in(dir.path());
        fs::write(&path, br#"{"interval_seconds": 60}"#).unwrap();

        let settings = Settings::load(&path);
        assert_eq!(settings.interval_seconds, 60);
        assert_eq!(settings.http_password, "admin");
    }
}
