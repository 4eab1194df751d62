use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use config_from_file::cli::{options_from_args, ConfigfileArg};
use config_from_file::ConfigFromFile;
use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Serialize, Debug)]
#[command(name = "rust-cli", version, about = "Build a person from flags layered over a config file")]
struct Opts {
    #[command(flatten)]
    #[serde(flatten)]
    config: ConfigfileArg,

    #[arg(short, long)]
    first_name: Option<String>,

    #[arg(short, long)]
    last_name: Option<String>,

    #[arg(short, long)]
    age: Option<u8>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Yaml)]
    #[serde(skip)]
    format: Format,

    /// Log resolution details to stderr
    #[arg(short, long)]
    #[serde(skip)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum Format {
    #[default]
    Yaml,
    Json,
}

// RUST_CLI_CONFIGFILE supplies the configfile when --configfile is not given.
#[derive(Deserialize, Serialize, Debug, ConfigFromFile)]
#[serde(deny_unknown_fields)]
#[configfile(env_prefix = "RUST_CLI_")]
struct Person {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    configfile: Option<PathBuf>,

    #[serde(default = "default_first_name")]
    first_name: String,

    #[serde(default = "default_last_name")]
    last_name: String,

    #[serde(default = "default_age")]
    age: u8,
}

fn default_first_name() -> String {
    "John".to_string()
}

fn default_last_name() -> String {
    "Doe".to_string()
}

fn default_age() -> u8 {
    42
}

fn init_tracing(verbose: bool) {
    // RUST_LOG wins when set; --verbose only moves the fallback level.
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn main() -> eyre::Result<()> {
    let opts = Opts::parse();
    init_tracing(opts.verbose);

    let options = options_from_args(&opts)?;
    debug!(?options, "explicit options");

    let person = Person::new_with_config(options).wrap_err("failed to build configuration")?;

    let rendered = match opts.format {
        Format::Yaml => serde_yaml::to_string(&person)?,
        Format::Json => serde_json::to_string_pretty(&person)? + "\n",
    };
    print!("{rendered}");

    Ok(())
}
