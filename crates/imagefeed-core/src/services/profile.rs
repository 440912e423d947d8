//! Signed-in user's profile and avatar.

use std::sync::{Arc, Mutex};

use reqwest::Method;
use url::Url;

use super::flight::{FlightGuard, FlightSlot};
use super::observers::{Observers, Subscription};
use super::{endpoint, RequestOutcome};
use crate::auth::token::{require_token, TokenStore};
use crate::models::{Profile, ProfileResult, UserResult};
use crate::transport::{ApiRequest, HttpTransport};
use crate::util::lock;
use crate::Result;

/// Emitted whenever a new avatar URL is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarChanged {
    pub avatar_url: Url,
}

#[derive(Debug, Default)]
struct ProfileState {
    profile: Option<Profile>,
    avatar_url: Option<Url>,
    flight: FlightSlot,
    generation: u64,
}

/// Loads `GET /me` and the avatar from `GET /users/{username}`.
#[derive(Clone)]
pub struct ProfileService {
    api_base: Url,
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenStore>,
    state: Arc<Mutex<ProfileState>>,
    avatar_observers: Observers<AvatarChanged>,
}

impl ProfileService {
    pub fn new(api_base: Url, transport: Arc<dyn HttpTransport>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            api_base,
            transport,
            tokens,
            state: Arc::new(Mutex::new(ProfileState::default())),
            avatar_observers: Observers::default(),
        }
    }

    pub fn profile(&self) -> Option<Profile> {
        lock(&self.state).profile.clone()
    }

    pub fn avatar_url(&self) -> Option<Url> {
        lock(&self.state).avatar_url.clone()
    }

    pub fn is_request_pending(&self) -> bool {
        lock(&self.state).flight.is_active()
    }

    pub fn subscribe_avatar(
        &self,
        callback: impl Fn(&AvatarChanged) + Send + Sync + 'static,
    ) -> Subscription {
        self.avatar_observers.subscribe(callback)
    }

    pub async fn fetch_profile(&self) -> Result<RequestOutcome<Profile>> {
        let Some((id, generation)) = self.begin("profile") else {
            return Ok(RequestOutcome::Skipped);
        };
        let _guard = FlightGuard::new(&self.state, |state| &mut state.flight, id);

        let token = require_token(self.tokens.as_ref())?;
        let request = ApiRequest::new(Method::GET, endpoint(&self.api_base, &["me"])?).with_bearer(token);
        let result: ProfileResult = match self.transport.send(request).await {
            Ok(response) => response.decode(),
            Err(failure) => Err(failure.into()),
        }
        .inspect_err(|error| tracing::warn!("Failed to fetch profile: {}", error))?;

        let profile = Profile::from(result);
        let mut state = lock(&self.state);
        if state.generation == generation {
            state.profile = Some(profile.clone());
        }
        Ok(RequestOutcome::Completed(profile))
    }

    /// Fetch the small avatar of `username` and notify avatar observers.
    pub async fn fetch_profile_image_url(&self, username: &str) -> Result<RequestOutcome<Url>> {
        let Some((id, generation)) = self.begin("avatar") else {
            return Ok(RequestOutcome::Skipped);
        };
        let guard = FlightGuard::new(&self.state, |state| &mut state.flight, id);

        let token = require_token(self.tokens.as_ref())?;
        let url = endpoint(&self.api_base, &["users", username])?;
        let request = ApiRequest::new(Method::GET, url).with_bearer(token);
        let result: UserResult = match self.transport.send(request).await {
            Ok(response) => response.decode(),
            Err(failure) => Err(failure.into()),
        }
        .inspect_err(|error| tracing::warn!("Failed to fetch avatar for {}: {}", username, error))?;

        let avatar_url = result.profile_image.small;
        let stored = {
            let mut state = lock(&self.state);
            let current = state.generation == generation;
            if current {
                state.avatar_url = Some(avatar_url.clone());
            }
            current
        };
        drop(guard);

        if stored {
            self.avatar_observers.notify(&AvatarChanged {
                avatar_url: avatar_url.clone(),
            });
        }
        Ok(RequestOutcome::Completed(avatar_url))
    }

    /// Forget the cached profile and avatar.
    pub fn reset(&self) {
        let mut state = lock(&self.state);
        state.profile = None;
        state.avatar_url = None;
        state.generation += 1;
    }

    fn begin(&self, what: &str) -> Option<(u64, u64)> {
        let mut state = lock(&self.state);
        let Some(id) = state.flight.try_begin() else {
            tracing::warn!("Profile request already in flight; ignoring {} fetch", what);
            return None;
        };
        Some((id, state.generation))
    }
}
