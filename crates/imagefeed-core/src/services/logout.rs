//! Sign-out.

use std::sync::Arc;

use super::photos::PhotoListService;
use super::profile::ProfileService;
use crate::auth::TokenStore;
use crate::Result;

/// Clears the stored token and every per-user cache.
#[derive(Clone)]
pub struct LogoutService {
    tokens: Arc<dyn TokenStore>,
    photos: PhotoListService,
    profile: ProfileService,
}

impl LogoutService {
    pub fn new(tokens: Arc<dyn TokenStore>, photos: PhotoListService, profile: ProfileService) -> Self {
        Self {
            tokens,
            photos,
            profile,
        }
    }

    /// Caches are reset even when the token store refuses to clear.
    pub fn logout(&self) -> Result<()> {
        self.photos.reset();
        self.profile.reset();
        self.tokens
            .clear_token()
            .inspect_err(|error| tracing::warn!("Failed to clear stored token: {}", error))?;
        tracing::info!("Signed out");
        Ok(())
    }
}
