//! JSON payload export.
//!
//! `export_value` overwrites a file with a serialized value;
//! `update_exported_value` merges top-level keys into whatever JSON object
//! the file already holds.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{io_err, CoreError};

/// Write `payload` as JSON to `path`, replacing any previous content.
pub fn export_value<T: Serialize + ?Sized>(path: &Path, payload: &T) -> Result<(), CoreError> {
    let json = serde_json::to_string(payload)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(path, json).map_err(|e| io_err(path, e))
}

/// Merge the keys of `data` into the JSON object stored at `path`.
///
/// A missing, unreadable, or non-object file is treated as `{}`.
pub fn update_exported_value(path: &Path, data: Map<String, Value>) -> Result<(), CoreError> {
    let mut merged = read_object(path);
    merged.extend(data);
    export_value(path, &Value::Object(merged))
}

fn read_object(path: &Path) -> Map<String, Value> {
    if !path.is_file() {
        return Map::new();
    }
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str::<Value>(&s).ok())
        .and_then(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_default()
}
