use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::normalize::first_integer;
use crate::util::{list_files_with_extension, read_json};

pub type JsonObject = Map<String, Value>;

pub fn ensure_exists(path: &Path, label: &str) -> Result<()> {
    if !path.exists() {
        bail!("{label} not found: {}", path.display());
    }
    Ok(())
}

/// Every `*.json` payload in a directory (sorted by file name), or the single
/// payload of a file.
pub fn load_json_payloads(path: &Path) -> Result<Vec<(PathBuf, Value)>> {
    if path.is_dir() {
        let files = list_files_with_extension(path, "json")?;
        debug!(dir = %path.display(), files = files.len(), "loading json directory");
        return files
            .into_iter()
            .map(|file| read_json(&file).map(|payload| (file, payload)))
            .collect();
    }

    Ok(vec![(path.to_path_buf(), read_json(path)?)])
}

/// Object entries of a list; anything that is not an object is skipped.
pub fn object_entries(items: Vec<Value>, source: &Path) -> Vec<JsonObject> {
    let mut entries = Vec::with_capacity(items.len());
    let mut skipped = 0_usize;
    for item in items {
        match item {
            Value::Object(object) => entries.push(object),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(path = %source.display(), skipped, "skipped non-object entries");
    }
    entries
}

/// Takes the list stored under the first present key of `keys`.
pub fn take_list(object: &mut JsonObject, keys: &[&str]) -> Option<Vec<Value>> {
    for key in keys {
        if matches!(object.get(*key), Some(Value::Array(_)))
            && let Some(Value::Array(items)) = object.remove(*key)
        {
            return Some(items);
        }
    }
    None
}

/// First of `page_number`, `page`, `page_id` holding an integer, or a string
/// containing one.
pub fn parse_page_number(object: &JsonObject) -> Option<i64> {
    for key in ["page_number", "page", "page_id"] {
        match object.get(key) {
            Some(Value::Number(number)) => {
                if let Some(page) = number.as_i64() {
                    return Some(page);
                }
            }
            Some(Value::String(text)) => {
                if let Some(page) = first_integer(text) {
                    return Some(page);
                }
            }
            _ => {}
        }
    }
    None
}

/// First run of digits in the file stem; `page-3.md` is page 3, not -3.
pub fn page_number_from_path(path: &Path) -> Option<i64> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| {
            stem.split(|ch: char| !ch.is_ascii_digit())
                .find(|digits| !digits.is_empty())
        })
        .and_then(|digits| digits.parse::<i64>().ok())
}

pub fn decode<T: DeserializeOwned>(value: Value, source: &Path, what: &str) -> Result<T> {
    serde_json::from_value(value)
        .with_context(|| format!("invalid {what} in {}", source.display()))
}
