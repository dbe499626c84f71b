mod settings;

use config::{Config, ConfigError, Environment, File};

pub use settings::{PartialSettings, Settings};

/// Prefix of the environment variables read by `load_config`
/// (`NTFY_URL`, `NTFY_TOPIC_OUT`, `NTFY_TOPIC_IN`, `NTFY_LOG_LEVEL`).
pub const ENV_PREFIX: &str = "NTFY";

const DEFAULT_CONFIG_FILE: &str = "config/default";

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from(DEFAULT_CONFIG_FILE)
}

/// Same as `load_config` with an explicit file path (extension optional).
/// The file does not have to exist.
pub fn load_config_from(file: &str) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(file).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX));

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(partial.merge(Settings::default()))
}
