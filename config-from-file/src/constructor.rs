//! The `ConfigFromFile` trait and the `new_with_config` resolution sequence.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::ResolveError;
use crate::field::ConfigfileField;
use crate::Options;

/// A type that can be built from explicit options layered over a config file.
///
/// Implementors supply the loader and the ordinary constructor; everything
/// else has a working default. `new_with_config` is the entry point callers
/// should use.
pub trait ConfigFromFile: Sized {
    /// Error shared by the loader, the constructor and resolution itself.
    type Error: From<ResolveError>;

    /// Load `path` into a flat mapping of field name to value.
    ///
    /// Returning anything but `Value::Object` on success makes
    /// `new_with_config` fail with `ResolveError::MalformedConfigResult`.
    fn get_config_from_file(path: &Path) -> Result<Value, Self::Error>;

    /// The ordinary constructor the merged options are forwarded to.
    fn from_options(options: Options) -> Result<Self, Self::Error>;

    /// The configfile recorded on this instance, if any.
    fn configfile(&self) -> Option<&Path>;

    /// Configfile used when none is passed explicitly.
    fn default_configfile() -> Option<PathBuf> {
        None
    }

    /// Class-level configfile taking priority over the field default.
    fn configfile_override() -> Option<PathBuf> {
        None
    }

    fn configfile_field() -> ConfigfileField {
        ConfigfileField::new().default_fn(Self::default_configfile)
    }

    /// Build an instance from `options`, filling unset fields from the
    /// resolved configfile.
    fn new_with_config(mut options: Options) -> Result<Self, Self::Error> {
        let field = Self::configfile_field();
        let resolved = resolve_with_field::<Self>(&field, &options)?;

        let Some(resolved) = resolved else {
            trace!("no configfile resolved, constructing from options alone");
            return Self::from_options(options);
        };

        // Explicit values are rewritten in coerced form; defaults are recorded
        // only when the field takes an init arg.
        let record_under = match resolved.source {
            ConfigfileSource::Explicit => Some(field.option_key()),
            ConfigfileSource::FieldDefault => field.get_init_arg(),
            ConfigfileSource::Override => None,
        };
        if let Some(key) = record_under {
            options.insert(
                key.to_string(),
                Value::String(resolved.path.to_string_lossy().into_owned()),
            );
        }

        let loaded = match Self::get_config_from_file(&resolved.path)? {
            Value::Object(map) => map,
            other => {
                return Err(ResolveError::MalformedConfigResult {
                    path: resolved.path,
                    value: other,
                }
                .into())
            }
        };
        debug!(
            path = %resolved.path.display(),
            keys = loaded.len(),
            "loaded configfile"
        );

        Self::from_options(merge_options(loaded, options))
    }
}

/// Where a resolved configfile came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigfileSource {
    /// The caller passed it in the options.
    Explicit,
    /// `ConfigFromFile::configfile_override` returned it.
    Override,
    /// The field declaration's default produced it.
    FieldDefault,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfigfile {
    pub path: PathBuf,
    pub source: ConfigfileSource,
}

/// Work out which configfile `T::new_with_config(options)` would load.
///
/// A factory default is invoked when reached, so calling this has the same
/// side effects as the resolution step of `new_with_config`.
pub fn resolve_configfile<T: ConfigFromFile>(
    options: &Options,
) -> Result<Option<ResolvedConfigfile>, ResolveError> {
    resolve_with_field::<T>(&T::configfile_field(), options)
}

fn resolve_with_field<T: ConfigFromFile>(
    field: &ConfigfileField,
    options: &Options,
) -> Result<Option<ResolvedConfigfile>, ResolveError> {
    let explicit = match options.get(field.option_key()) {
        None | Some(Value::Null) => None,
        Some(Value::String(path)) => Some(PathBuf::from(path)),
        Some(scalar @ (Value::Number(_) | Value::Bool(_))) => {
            Some(PathBuf::from(scalar.to_string()))
        }
        Some(other) => return Err(ResolveError::InvalidConfigfile(other.clone())),
    };

    let resolved = if let Some(path) = explicit {
        Some((path, ConfigfileSource::Explicit))
    } else if let Some(path) = T::configfile_override() {
        Some((path, ConfigfileSource::Override))
    } else {
        field
            .get_default()
            .and_then(|default| default.evaluate())
            .map(|path| (path, ConfigfileSource::FieldDefault))
    };

    Ok(resolved.map(|(path, source)| {
        debug!(path = %path.display(), ?source, "resolved configfile");
        ResolvedConfigfile { path, source }
    }))
}

/// Overlay `explicit` on top of `loaded`, key by key.
pub fn merge_options(loaded: Options, explicit: Options) -> Options {
    let mut merged = loaded;
    for (key, value) in explicit {
        if merged.contains_key(&key) {
            trace!(%key, "explicit option overrides configfile value");
        }
        merged.insert(key, value);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ConfigfileField;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn options(value: Value) -> Options {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[derive(Debug)]
    struct Plain {
        configfile: Option<PathBuf>,
        seen: Options,
    }

    impl ConfigFromFile for Plain {
        type Error = crate::Error;

        fn get_config_from_file(_path: &Path) -> Result<Value, Self::Error> {
            Ok(json!({ "a": 1, "b": 2 }))
        }

        fn from_options(options: Options) -> Result<Self, Self::Error> {
            let configfile = options
                .get("configfile")
                .and_then(Value::as_str)
                .map(PathBuf::from);
            Ok(Self {
                configfile,
                seen: options,
            })
        }

        fn configfile(&self) -> Option<&Path> {
            self.configfile.as_deref()
        }
    }

    struct AllSources;

    impl ConfigFromFile for AllSources {
        type Error = crate::Error;

        fn get_config_from_file(_path: &Path) -> Result<Value, Self::Error> {
            Ok(json!({}))
        }

        fn from_options(_options: Options) -> Result<Self, Self::Error> {
            Ok(Self)
        }

        fn configfile(&self) -> Option<&Path> {
            None
        }

        fn configfile_override() -> Option<PathBuf> {
            Some(PathBuf::from("override.yml"))
        }

        fn configfile_field() -> ConfigfileField {
            ConfigfileField::new().default_value("static.yml")
        }
    }

    static FACTORY_CALLS: AtomicUsize = AtomicUsize::new(0);

    struct Counted;

    impl ConfigFromFile for Counted {
        type Error = crate::Error;

        fn get_config_from_file(_path: &Path) -> Result<Value, Self::Error> {
            Ok(json!({}))
        }

        fn from_options(_options: Options) -> Result<Self, Self::Error> {
            Ok(Self)
        }

        fn configfile(&self) -> Option<&Path> {
            None
        }

        fn default_configfile() -> Option<PathBuf> {
            FACTORY_CALLS.fetch_add(1, Ordering::SeqCst);
            Some(PathBuf::from("counted.yml"))
        }
    }

    #[test]
    fn explicit_options_override_file_values() {
        let built =
            Plain::new_with_config(options(json!({ "configfile": "x.cfg", "b": 99 }))).unwrap();
        assert_eq!(built.seen["a"], json!(1));
        assert_eq!(built.seen["b"], json!(99));
        assert_eq!(built.configfile(), Some(Path::new("x.cfg")));
    }

    #[test]
    fn null_configfile_counts_as_absent() {
        let built = Plain::new_with_config(options(json!({ "configfile": null, "b": 3 }))).unwrap();
        assert_eq!(built.seen, options(json!({ "configfile": null, "b": 3 })));
        assert_eq!(built.configfile(), None);
    }

    #[test]
    fn scalar_configfile_is_coerced_to_a_path() {
        let built = Plain::new_with_config(options(json!({ "configfile": 12 }))).unwrap();
        assert_eq!(built.seen["a"], json!(1));
        assert_eq!(built.configfile(), Some(Path::new("12")));

        let resolved = resolve_configfile::<Plain>(&options(json!({ "configfile": true })))
            .unwrap()
            .unwrap();
        assert_eq!(resolved.path, PathBuf::from("true"));
        assert_eq!(resolved.source, ConfigfileSource::Explicit);
    }

    #[test]
    fn structured_configfile_is_rejected() {
        for bad in [json!(["a.yml"]), json!({ "path": "a.yml" })] {
            let err = Plain::new_with_config(options(json!({ "configfile": bad }))).unwrap_err();
            assert!(matches!(
                err,
                crate::Error::Resolve(ResolveError::InvalidConfigfile(_))
            ));
        }
    }

    #[test]
    fn resolution_priority_order() {
        let explicit =
            resolve_configfile::<AllSources>(&options(json!({ "configfile": "explicit.yml" })))
                .unwrap()
                .unwrap();
        assert_eq!(explicit.path, PathBuf::from("explicit.yml"));
        assert_eq!(explicit.source, ConfigfileSource::Explicit);

        let overridden = resolve_configfile::<AllSources>(&Options::new())
            .unwrap()
            .unwrap();
        assert_eq!(overridden.path, PathBuf::from("override.yml"));
        assert_eq!(overridden.source, ConfigfileSource::Override);

        let field = ConfigfileField::new().default_value("static.yml");
        let defaulted = resolve_with_field::<Plain>(&field, &Options::new())
            .unwrap()
            .unwrap();
        assert_eq!(defaulted.path, PathBuf::from("static.yml"));
        assert_eq!(defaulted.source, ConfigfileSource::FieldDefault);
    }

    #[test]
    fn nothing_resolves_without_sources() {
        assert_eq!(resolve_configfile::<Plain>(&Options::new()).unwrap(), None);
    }

    #[test]
    fn factory_default_runs_once_per_call() {
        let before = FACTORY_CALLS.load(Ordering::SeqCst);
        Counted::new_with_config(Options::new()).unwrap();
        assert_eq!(FACTORY_CALLS.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn merge_is_shallow_and_explicit_wins() {
        let loaded = options(json!({ "list": [1, 2], "nested": { "x": 1, "y": 2 }, "keep": true }));
        let explicit = options(json!({ "list": [3], "nested": { "x": 9 } }));
        let merged = merge_options(loaded, explicit);
        assert_eq!(
            Value::Object(merged),
            json!({ "list": [3], "nested": { "x": 9 }, "keep": true })
        );
    }
}
