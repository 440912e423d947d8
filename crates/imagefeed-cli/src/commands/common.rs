use std::path::Path;
use std::sync::Arc;

use imagefeed_core::transport::ReqwestTransport;
use imagefeed_core::AppContext;

use crate::auth::KeyringTokenStore;
use crate::config::load_configuration;
use crate::error::CliError;

/// Wire the core services to the keychain and a real HTTP client.
pub fn build_app(config_path: Option<&Path>) -> Result<AppContext, CliError> {
    let config = load_configuration(config_path)?;
    let transport = Arc::new(ReqwestTransport::new()?);
    let tokens = Arc::new(KeyringTokenStore::default());
    Ok(AppContext::new(config, transport, tokens)?)
}

pub fn normalize_photo_id(value: &str) -> Result<&str, CliError> {
    let value = value.trim();
    if value.is_empty() {
        Err(CliError::EmptyPhotoId)
    } else {
        Ok(value)
    }
}
