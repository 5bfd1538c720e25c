//! Environment configuration for the `loot` binary.
use std::env;
use std::path::PathBuf;

/// Defaults that command-line flags override.
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    pub seed: Option<u64>,
}

impl CliConfig {
    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `LOOT_DATA_DIR` - Data directory (default: `data`)
    /// - `LOOT_SEED` - Seed for rolls without `--seed`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(dir) = read_env::<PathBuf>("LOOT_DATA_DIR") {
            config.data_dir = dir;
        }
        config.seed = read_env("LOOT_SEED");

        config
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            seed: None,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
