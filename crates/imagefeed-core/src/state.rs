//! Application-scoped context shared by every host.

use std::sync::Arc;

use crate::auth::{current_token, OAuthService, TokenStore};
use crate::config::AuthConfiguration;
use crate::presenter::{ListPresenter, ListView, ProfilePresenter, ProfileView};
use crate::services::{LogoutService, PhotoListService, ProfileService, RequestOutcome};
use crate::transport::HttpTransport;
use crate::Result;

/// Which flow a host should show at launch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No token stored; start the authorization flow
    Unauthorized,
    /// A token is stored and the profile was loaded
    Authorized,
}

/// Owns the configuration, token store and one instance of each service.
///
/// Cloning shares the same services.
#[derive(Clone)]
pub struct AppContext {
    config: Arc<AuthConfiguration>,
    tokens: Arc<dyn TokenStore>,
    oauth: OAuthService,
    photos: PhotoListService,
    profile: ProfileService,
    logout: LogoutService,
}

impl AppContext {
    pub fn new(
        config: AuthConfiguration,
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self> {
        config.validate()?;
        let api_base = config.api_base()?;
        let config = Arc::new(config);

        let oauth = OAuthService::new(config.clone(), transport.clone(), tokens.clone());
        let photos = PhotoListService::new(api_base.clone(), transport.clone(), tokens.clone());
        let profile = ProfileService::new(api_base, transport, tokens.clone());
        let logout = LogoutService::new(tokens.clone(), photos.clone(), profile.clone());

        Ok(Self {
            config,
            tokens,
            oauth,
            photos,
            profile,
            logout,
        })
    }

    pub fn config(&self) -> &AuthConfiguration {
        &self.config
    }

    pub const fn oauth(&self) -> &OAuthService {
        &self.oauth
    }

    pub const fn photos(&self) -> &PhotoListService {
        &self.photos
    }

    pub const fn profile(&self) -> &ProfileService {
        &self.profile
    }

    pub const fn logout(&self) -> &LogoutService {
        &self.logout
    }

    /// Whether a bearer token is stored. An unreadable store counts as signed out.
    pub fn is_authorized(&self) -> bool {
        current_token(self.tokens.as_ref()).is_some()
    }

    /// Decide the launch flow, loading the profile and avatar when signed in.
    ///
    /// An avatar failure is logged and does not fail the bootstrap.
    pub async fn bootstrap_session(&self) -> Result<SessionState> {
        if !self.is_authorized() {
            tracing::debug!("No stored token; starting authorization flow");
            return Ok(SessionState::Unauthorized);
        }

        if let RequestOutcome::Completed(profile) = self.profile.fetch_profile().await? {
            if let Err(error) = self.profile.fetch_profile_image_url(&profile.username).await {
                tracing::warn!("Continuing without avatar: {}", error);
            }
        }
        Ok(SessionState::Authorized)
    }

    /// Exchange an authorization code, then bootstrap the signed-in session.
    pub async fn sign_in(&self, code: &str) -> Result<SessionState> {
        self.oauth.exchange(code).await?;
        self.bootstrap_session().await
    }

    pub fn list_presenter(&self, view: Arc<dyn ListView>) -> ListPresenter {
        ListPresenter::new(view, self.photos.clone())
    }

    pub fn profile_presenter(&self, view: Arc<dyn ProfileView>) -> ProfilePresenter {
        ProfilePresenter::new(view, self.profile.clone(), self.logout.clone())
    }
}
