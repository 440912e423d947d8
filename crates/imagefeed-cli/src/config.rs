//! Client configuration resolution: config file, then environment.

use std::path::{Path, PathBuf};

use imagefeed_core::util::normalize_text_option;
use imagefeed_core::AuthConfiguration;

use crate::error::CliError;

const CONFIG_DIR_NAME: &str = "imagefeed";
const CONFIG_FILE_NAME: &str = "config.json";

pub const ACCESS_KEY_ENV: &str = "UNSPLASH_ACCESS_KEY";
pub const SECRET_KEY_ENV: &str = "UNSPLASH_SECRET_KEY";
pub const API_BASE_URL_ENV: &str = "UNSPLASH_API_BASE_URL";

/// Values read from the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub api_base_url: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            access_key: read_env(ACCESS_KEY_ENV),
            secret_key: read_env(SECRET_KEY_ENV),
            api_base_url: read_env(API_BASE_URL_ENV),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Resolve the configuration from `path` (or the default location) and the environment.
pub fn load_configuration(path: Option<&Path>) -> Result<AuthConfiguration, CliError> {
    let file = match path {
        Some(path) => Some(read_config_file(path)?),
        None => match default_config_path() {
            Some(path) if path.exists() => Some(read_config_file(&path)?),
            _ => None,
        },
    };
    resolve_configuration(file, EnvOverrides::from_env())
}

/// Environment values override the file; without a file both keys must come from the environment.
pub fn resolve_configuration(
    file: Option<AuthConfiguration>,
    env: EnvOverrides,
) -> Result<AuthConfiguration, CliError> {
    let mut config = match file {
        Some(config) => config,
        None => {
            let (Some(access_key), Some(secret_key)) = (env.access_key.clone(), env.secret_key.clone())
            else {
                return Err(CliError::Config(format!(
                    "No client credentials found. Create {} or set {ACCESS_KEY_ENV} and {SECRET_KEY_ENV}.",
                    default_config_path().map_or_else(
                        || "a config file".to_string(),
                        |path| path.display().to_string()
                    )
                )));
            };
            AuthConfiguration::standard(access_key, secret_key)
        }
    };

    if let Some(access_key) = env.access_key {
        config.access_key = access_key;
    }
    if let Some(secret_key) = env.secret_key {
        config.secret_key = secret_key;
    }
    if let Some(api_base_url) = env.api_base_url {
        config = config.with_api_base_url(api_base_url);
    }

    config.validate()?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<AuthConfiguration, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|error| {
        CliError::Config(format!("Failed to read config at {}: {}", path.display(), error))
    })?;
    AuthConfiguration::from_json(&raw).map_err(|error| {
        CliError::Config(format!("Failed to parse config at {}: {}", path.display(), error))
    })
}

fn read_env(name: &str) -> Option<String> {
    normalize_text_option(std::env::var(name).ok())
}
