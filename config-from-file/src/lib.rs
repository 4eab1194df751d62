// src/lib.rs for `config-from-file` crate

//! Construct types from explicit options layered over a configuration file.
//!
//! A type implementing [`ConfigFromFile`] gains [`ConfigFromFile::new_with_config`],
//! which resolves a configfile (explicit option, then the type's override hook,
//! then the field default), loads it with the type's loader, and overlays the
//! caller's options on top before handing the result to the ordinary
//! constructor. Explicit options always win.
//!
//! ```no_run
//! use std::path::PathBuf;
//! use config_from_file::ConfigFromFile;
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Debug, Deserialize, ConfigFromFile)]
//! #[configfile(default = "app.yml")]
//! struct App {
//!     configfile: Option<PathBuf>,
//!     #[serde(default)]
//!     port: u16,
//! }
//!
//! let options = json!({ "port": 8080 }).as_object().cloned().unwrap_or_default();
//! let _app = App::new_with_config(options)?;
//! # Ok::<(), config_from_file::Error>(())
//! ```

pub mod constructor;
pub mod env;
pub mod error;
pub mod field;
pub mod loader;
pub mod options;

#[cfg(feature = "cli")]
pub mod cli;

pub use constructor::{
    merge_options, resolve_configfile, ConfigFromFile, ConfigfileSource, ResolvedConfigfile,
};
pub use error::{Error, ResolveError, Result};
pub use field::{ConfigfileDefault, ConfigfileField, CONFIGFILE_KEY};

#[cfg(feature = "derive")]
pub use config_from_file_derive::ConfigFromFile;

/// Field name to value mapping accepted by `new_with_config`.
pub type Options = serde_json::Map<String, serde_json::Value>;

// Re-exported so derived impls resolve these paths through this crate.
#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
