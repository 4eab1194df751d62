//! Ready-made `get_config_from_file` implementations.
//!
//! Each loader parses the file with the matching serde format crate and hands
//! back the document as a `serde_json::Value`. The shape is not checked here;
//! `new_with_config` rejects anything that is not a mapping.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::trace;

use crate::error::{Error, Result};

fn read(path: &Path) -> Result<String> {
    trace!(path = %path.display(), "reading configfile");
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_yaml(path: &Path) -> Result<Value> {
    let contents = read(path)?;
    // An empty document parses to null
    serde_yaml::from_str(&contents).map_err(|source| Error::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_json(path: &Path) -> Result<Value> {
    let contents = read(path)?;
    serde_json::from_str(&contents).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_toml(path: &Path) -> Result<Value> {
    let contents = read(path)?;
    toml::from_str(&contents).map_err(|source| Error::Toml {
        path: path.to_path_buf(),
        source,
    })
}

/// Pick a loader from the file extension (`yml`, `yaml`, `json`, `toml`).
pub fn load_by_extension(path: &Path) -> Result<Value> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "yml" | "yaml" => load_yaml(path),
        "json" => load_json(path),
        "toml" => load_toml(path),
        _ => Err(Error::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}
