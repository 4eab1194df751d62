//! `--configfile` flag for clap-based command lines.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::error::Result;
use crate::options::{prune_unset, to_options};
use crate::Options;

/// Flatten into a `clap::Parser` struct to accept `--configfile <PATH>`.
#[derive(Args, Debug, Clone, Default, Serialize)]
pub struct ConfigfileArg {
    /// Configuration file to read defaults from
    #[arg(long = "configfile", value_name = "PATH")]
    pub configfile: Option<PathBuf>,
}

/// Turn parsed arguments into options for `new_with_config`, leaving out
/// flags the user did not pass.
pub fn options_from_args<T: Serialize>(args: &T) -> Result<Options> {
    Ok(prune_unset(to_options(args)?))
}
