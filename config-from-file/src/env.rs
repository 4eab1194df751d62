//! Environment-driven configfile defaults.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct ConfigfileEnv {
    configfile: Option<PathBuf>,
}

/// Read `<prefix>CONFIGFILE` from the environment.
///
/// Unset and empty variables yield `None`, as does a value envy cannot
/// decode (logged at warn).
pub fn configfile_from_env(prefix: &str) -> Option<PathBuf> {
    match envy::prefixed(prefix).from_env::<ConfigfileEnv>() {
        Ok(env) => env.configfile.filter(|path| !path.as_os_str().is_empty()),
        Err(err) => {
            warn!(%prefix, error = %err, "ignoring unreadable configfile environment variable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_prefixed_variable() {
        std::env::set_var("CFF_ENV_TEST_A_CONFIGFILE", "/etc/app.yml");
        assert_eq!(
            configfile_from_env("CFF_ENV_TEST_A_"),
            Some(PathBuf::from("/etc/app.yml"))
        );
    }

    #[test]
    fn unset_or_empty_is_none() {
        assert_eq!(configfile_from_env("CFF_ENV_TEST_UNSET_"), None);

        std::env::set_var("CFF_ENV_TEST_B_CONFIGFILE", "");
        assert_eq!(configfile_from_env("CFF_ENV_TEST_B_"), None);
    }
}
