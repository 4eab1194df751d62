//! Declaration of the `configfile` field: its default and its options key.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

/// Options key used for the configfile unless the declaration renames it.
pub const CONFIGFILE_KEY: &str = "configfile";

/// Default attached to the `configfile` field declaration.
#[derive(Clone)]
pub enum ConfigfileDefault {
    /// Used as is.
    Value(PathBuf),
    /// Called at resolution time, once per `new_with_config` call.
    Factory(fn() -> Option<PathBuf>),
}

impl ConfigfileDefault {
    pub fn evaluate(&self) -> Option<PathBuf> {
        match self {
            ConfigfileDefault::Value(path) => Some(path.clone()),
            ConfigfileDefault::Factory(factory) => factory(),
        }
    }
}

impl fmt::Debug for ConfigfileDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigfileDefault::Value(path) => f.debug_tuple("Value").field(path).finish(),
            ConfigfileDefault::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// Builder describing how the `configfile` field is declared on a host type.
#[derive(Debug, Clone)]
pub struct ConfigfileField {
    default: Option<ConfigfileDefault>,
    init_arg: Option<Cow<'static, str>>,
}

impl Default for ConfigfileField {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigfileField {
    /// A field named `configfile` with no default.
    pub fn new() -> Self {
        Self {
            default: None,
            init_arg: Some(Cow::Borrowed(CONFIGFILE_KEY)),
        }
    }

    pub fn default_value(mut self, path: impl AsRef<Path>) -> Self {
        self.default = Some(ConfigfileDefault::Value(path.as_ref().to_path_buf()));
        self
    }

    pub fn default_fn(mut self, factory: fn() -> Option<PathBuf>) -> Self {
        self.default = Some(ConfigfileDefault::Factory(factory));
        self
    }

    pub fn no_default(mut self) -> Self {
        self.default = None;
        self
    }

    /// Rename the options key the configfile is read from and recorded under.
    pub fn init_arg(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.init_arg = Some(name.into());
        self
    }

    /// The field cannot be passed to the constructor; a resolved default is
    /// still loaded but not recorded on the instance.
    pub fn no_init_arg(mut self) -> Self {
        self.init_arg = None;
        self
    }

    pub fn get_default(&self) -> Option<&ConfigfileDefault> {
        self.default.as_ref()
    }

    pub fn get_init_arg(&self) -> Option<&str> {
        self.init_arg.as_deref()
    }

    /// Key probed for an explicit configfile in the caller's options.
    pub fn option_key(&self) -> &str {
        self.init_arg.as_deref().unwrap_or(CONFIGFILE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_factory() -> Option<PathBuf> {
        Some(PathBuf::from("factory.yml"))
    }

    #[test]
    fn new_field_uses_configfile_key() {
        let field = ConfigfileField::new();
        assert_eq!(field.get_init_arg(), Some("configfile"));
        assert_eq!(field.option_key(), "configfile");
        assert!(field.get_default().is_none());
    }

    #[test]
    fn renamed_init_arg_is_the_option_key() {
        let field = ConfigfileField::new().init_arg("config");
        assert_eq!(field.option_key(), "config");

        let hidden = ConfigfileField::new().no_init_arg();
        assert_eq!(hidden.get_init_arg(), None);
        assert_eq!(hidden.option_key(), "configfile");
    }

    #[test]
    fn defaults_evaluate_to_paths() {
        let value = ConfigfileField::new().default_value("static.yml");
        assert_eq!(
            value.get_default().and_then(ConfigfileDefault::evaluate),
            Some(PathBuf::from("static.yml"))
        );

        let factory = ConfigfileField::new().default_fn(from_factory);
        assert_eq!(
            factory.get_default().and_then(ConfigfileDefault::evaluate),
            Some(PathBuf::from("factory.yml"))
        );
        assert_eq!(format!("{:?}", factory.get_default().unwrap()), "Factory(..)");
    }
}
