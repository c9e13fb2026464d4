//! Remembers the last device a connect succeeded against.
//!
//! Stored as JSON under the user config directory, or wherever
//! `TAGLINK_CONFIG` points. Missing or unreadable settings are never an
//! error; commands simply start from defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Last device address a connect succeeded against.
    pub device: Option<DeviceAddr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAddr {
    pub host: String,
    pub port: u16,
}

pub fn settings_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("TAGLINK_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("taglink")
            .join("settings.json"),
    )
}

pub fn load() -> Settings {
    match settings_path() {
        Some(path) => load_from(&path),
        None => Settings::default(),
    }
}

pub fn store(settings: &Settings) -> std::io::Result<()> {
    match settings_path() {
        Some(path) => store_to(&path, settings),
        None => Ok(()),
    }
}

fn load_from(path: &Path) -> Settings {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => return Settings::default(),
    };
    serde_json::from_str(&text).unwrap_or_else(|err| {
        debug!(path = %path.display(), %err, "ignoring unreadable settings");
        Settings::default()
    })
}

fn store_to(path: &Path, settings: &Settings) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(settings).map_err(std::io::Error::other)?;
    fs::write(path, text)
}
