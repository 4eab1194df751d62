use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Failures raised by configfile resolution itself.
///
/// Everything else (loader I/O, parse failures, constructor validation) belongs
/// to the adopter's error type and passes through `new_with_config` untouched.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("get_config_from_file({}) did not return a mapping (got {value})", path.display())]
    MalformedConfigResult { path: PathBuf, value: Value },

    #[error("configfile option must be a path, number or bool (got {0})")]
    InvalidConfigfile(Value),
}

/// Error type used by the provided loaders and by derived implementations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid TOML in {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unsupported config file extension: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("expected a mapping of options (got {0})")]
    NotAMapping(Value),

    #[error("failed to construct from options: {0}")]
    Construct(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn malformed_result_names_path_and_value() {
        let err = ResolveError::MalformedConfigResult {
            path: PathBuf::from("conf/app.yml"),
            value: json!([1, 2]),
        };
        let msg = err.to_string();
        assert!(msg.contains("conf/app.yml"));
        assert!(msg.contains("[1,2]"));
    }

    #[test]
    fn resolve_error_converts_into_error() {
        let err: Error = ResolveError::InvalidConfigfile(json!([7])).into();
        assert!(matches!(err, Error::Resolve(ResolveError::InvalidConfigfile(_))));
        assert_eq!(
            err.to_string(),
            "configfile option must be a path, number or bool (got [7])"
        );
    }
}
