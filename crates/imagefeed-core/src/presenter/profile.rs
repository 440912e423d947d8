//! Profile screen presenter.

use std::sync::Arc;

use url::Url;

use crate::services::{LogoutService, ProfileService, Subscription};
use crate::Result;

/// Rendering collaborator for the profile screen.
pub trait ProfileView: Send + Sync {
    fn update_profile_details(&self, name: &str, login: &str, bio: &str);
    fn update_avatar(&self, url: &Url);
    fn reset_to_default_profile_data(&self);
    /// Leave the signed-in screens and restart at the splash screen.
    fn show_splash(&self);
}

pub struct ProfilePresenter {
    view: Arc<dyn ProfileView>,
    profile: ProfileService,
    logout: LogoutService,
    _avatar_subscription: Subscription,
}

impl ProfilePresenter {
    pub fn new(view: Arc<dyn ProfileView>, profile: ProfileService, logout: LogoutService) -> Self {
        let avatar_subscription = {
            let view = view.clone();
            profile.subscribe_avatar(move |change| view.update_avatar(&change.avatar_url))
        };
        Self {
            view,
            profile,
            logout,
            _avatar_subscription: avatar_subscription,
        }
    }

    /// Push the cached profile and avatar into the view.
    pub fn view_did_load(&self) {
        let Some(profile) = self.profile.profile() else {
            tracing::warn!("Profile screen opened before the profile was loaded");
            return;
        };
        self.view.update_profile_details(
            &profile.name,
            &profile.login_name,
            profile.bio.as_deref().unwrap_or_default(),
        );

        match self.profile.avatar_url() {
            Some(url) => self.view.update_avatar(&url),
            None => tracing::debug!("No avatar URL cached yet"),
        }
    }

    /// Clear the screen, sign out and route back to the splash screen.
    pub fn logout_tapped(&self) -> Result<()> {
        self.view.reset_to_default_profile_data();
        let outcome = self.logout.logout();
        self.view.show_splash();
        outcome
    }
}
