use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::io::snapshot::atomic_write;
use crate::model::config::Settings;

pub const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not parse settings.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not parse settings.toml: {0}")]
    DocumentError(#[from] toml_edit::TomlError),
}

/// Read settings from `dir`, returning both the parsed settings and the raw
/// toml_edit document for round-trip-safe editing. A missing file yields
/// defaults and an empty document.
pub fn read_settings(dir: &Path) -> Result<(Settings, toml_edit::DocumentMut), ConfigError> {
    let path = dir.join(SETTINGS_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(ConfigError::ReadError { path, source: e }),
    };
    let settings: Settings = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((settings, doc))
}

/// Write the settings document back, preserving comments and layout.
pub fn write_settings(dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    let path = dir.join(SETTINGS_FILE);
    atomic_write(&path, doc.to_string().as_bytes())
        .map_err(|e| ConfigError::WriteError { path, source: e })
}

pub fn set_spellcheck(doc: &mut toml_edit::DocumentMut, enabled: bool) {
    doc["spellcheck_enabled"] = toml_edit::value(enabled);
}

/// Set the combo for `action`, appending a `[[hotkeys]]` entry if the file
/// does not list it yet.
pub fn set_hotkey_combo(doc: &mut toml_edit::DocumentMut, action: &str, combo: &str) {
    if !doc.contains_key("hotkeys") {
        doc["hotkeys"] = toml_edit::Item::ArrayOfTables(toml_edit::ArrayOfTables::new());
    }

    if let Some(hotkeys) = doc["hotkeys"].as_array_of_tables_mut() {
        for table in hotkeys.iter_mut() {
            if table.get("action").and_then(|v| v.as_str()) == Some(action) {
                table["combo"] = toml_edit::value(combo);
                return;
            }
        }
        let mut table = toml_edit::Table::new();
        table["action"] = toml_edit::value(action);
        table["combo"] = toml_edit::value(combo);
        hotkeys.push(table);
    }
}
