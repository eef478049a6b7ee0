use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Overrides the home directory, mostly for tests and sandboxed agents.
pub const HOME_ENV: &str = "DRAFTSMAN_HOME";

/// Resolve the Draftsman home directory (`$DRAFTSMAN_HOME` or `~/.draftsman/`).
pub fn home_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".draftsman")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Artificial delay before each generated document, simulating model latency.
    #[serde(default)]
    pub latency_ms: u64,
    #[serde(default = "default_tags")]
    pub default_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Defaults to `<home>/documents`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,
}

fn default_tags() -> Vec<String> {
    vec!["generated".to_string()]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            latency_ms: 0,
            default_tags: default_tags(),
            author: None,
            store_dir: None,
        }
    }
}

fn settings_path(home: &Path) -> PathBuf {
    home.join("settings.json")
}

impl Settings {
    /// Missing or unreadable settings fall back to defaults.
    pub fn load(home: &Path) -> Settings {
        let path = settings_path(home);
        if !path.exists() {
            return Settings::default();
        }
        fs::read_to_string(&path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn write(&self, home: &Path) -> Result<()> {
        fs::create_dir_all(home)?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(settings_path(home), json)?;
        Ok(())
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn store_dir(&self, home: &Path) -> PathBuf {
        self.store_dir
            .clone()
            .unwrap_or_else(|| home.join("documents"))
    }
}
