// Application settings
// Loaded from ~/.config/gridfeed/settings.json

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Host serving the dataset API when nothing else is configured.
pub const DEFAULT_DOMAIN: &str = "www.quandl.com";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Data provider host, without scheme
    #[serde(rename = "api.domain")]
    pub domain: String,

    /// Write the column-name row before the data rows
    #[serde(rename = "import.includeHeaders")]
    pub include_headers: bool,

    /// Query parameters sent with every import (trim_start, rows, ...)
    #[serde(rename = "import.defaultParams")]
    pub default_params: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            include_headers: true,
            default_params: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        crate::config_dir().join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. A missing or unreadable file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                // Strip comments (lines starting with //)
                let cleaned: String = contents
                    .lines()
                    .filter(|line| !line.trim().starts_with("//"))
                    .collect::<Vec<_>>()
                    .join("\n");

                match serde_json::from_str(&cleaned) {
                    Ok(settings) => settings,
                    Err(e) => {
                        log::warn!("error parsing {}: {}; using default settings", path.display(), e);
                        Self::default()
                    }
                }
            }
            Err(e) => {
                log::warn!("error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Domain with any surrounding whitespace and trailing slash removed.
    pub fn effective_domain(&self) -> &str {
        let d = self.domain.trim().trim_end_matches('/');
        if d.is_empty() { DEFAULT_DOMAIN } else { d }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("settings.json"));
        assert_eq!(settings, Settings::default());
        assert!(settings.include_headers);
        assert_eq!(settings.effective_domain(), DEFAULT_DOMAIN);
    }

    #[test]
    fn test_partial_file_with_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{
    // provider
    "api.domain": "data.example.com/",
    "import.defaultParams": { "sort_order": "asc" }
}"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.effective_domain(), "data.example.com");
        assert!(settings.include_headers);
        assert_eq!(settings.default_params.get("sort_order").map(String::as_str), Some("asc"));
    }

    #[test]
    fn test_invalid_json_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_headers_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "import.includeHeaders": false, "import.defaultParams": { "rows": "10" } }"#)
            .unwrap();

        let settings = Settings::load_from(&path);
        assert!(!settings.include_headers);
        assert_eq!(settings.default_params.get("rows").map(String::as_str), Some("10"));
        assert_eq!(settings.domain, DEFAULT_DOMAIN);
    }
}
