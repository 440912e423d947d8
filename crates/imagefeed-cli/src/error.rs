use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] imagefeed_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Photo ID cannot be empty")]
    EmptyPhotoId,
    #[error("{0}")]
    Reported(String),
    #[error("Not signed in. Run `imagefeed auth url`, then `imagefeed auth login <REDIRECT_URL>`.")]
    NotSignedIn,
}
