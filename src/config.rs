use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable consulted when no data directory is passed.
pub const DATA_DIR_ENV: &str = "NAPLAN_DATA_DIR";
/// Used when neither an argument nor the environment names a directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding `enrolments`, `naplan_results` and `recurrent_income`.
    pub data_dir: PathBuf,
}

impl Config {
    /// Resolve from the process arguments and environment.
    pub fn from_env() -> Self {
        Self::resolve(std::env::args_os().nth(1), std::env::var_os(DATA_DIR_ENV))
    }

    /// First positional argument wins, then the environment, then the default.
    pub fn resolve(arg: Option<OsString>, env: Option<OsString>) -> Self {
        let data_dir = arg
            .or(env)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        Config { data_dir }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_beats_environment_beats_default() {
        let both = Config::resolve(Some("cli".into()), Some("env".into()));
        assert_eq!(both.data_dir, PathBuf::from("cli"));

        let env_only = Config::resolve(None, Some("env".into()));
        assert_eq!(env_only.data_dir, PathBuf::from("env"));

        assert_eq!(Config::resolve(None, None), Config::default());
        assert_eq!(Config::resolve(None, Some("".into())), Config::default());
    }
}
