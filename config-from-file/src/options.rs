//! Conversions between typed values and the `Options` mapping.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::Options;

/// Serialize `value` into an options mapping. It must serialize to a map.
pub fn to_options<T: Serialize>(value: &T) -> Result<Options> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::NotAMapping(other)),
    }
}

/// Drop entries whose value is `null`.
///
/// Use on options built from optional arguments, so an unset flag does not
/// shadow the configfile's value.
pub fn prune_unset(options: Options) -> Options {
    options
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .collect()
}

/// Ordinary constructor for serde types: deserialize the merged options.
pub fn deserialize_options<T: DeserializeOwned>(options: Options) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(options))?)
}
