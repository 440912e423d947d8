//! Authorization-code to bearer-token exchange.

use std::sync::{Arc, Mutex};

use reqwest::Method;
use serde::Deserialize;
use tokio::sync::oneshot;
use url::Url;

use super::token::{Token, TokenStore};
use crate::config::AuthConfiguration;
use crate::transport::{ApiRequest, HttpTransport};
use crate::util::lock;
use crate::{Error, NetworkFailure, Result};

/// Lifecycle of the most recent exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    Requesting,
    TokenStored,
    Failed,
}

struct InFlight {
    id: u64,
    code: String,
    cancel: oneshot::Sender<()>,
}

struct OAuthState {
    phase: ExchangeState,
    in_flight: Option<InFlight>,
    next_id: u64,
}

/// Exchanges authorization codes for bearer tokens.
///
/// At most one exchange is in flight: a new code cancels the running
/// exchange, while resubmitting the running code fails with
/// [`Error::DuplicateCode`].
#[derive(Clone)]
pub struct OAuthService {
    config: Arc<AuthConfiguration>,
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenStore>,
    state: Arc<Mutex<OAuthState>>,
}

impl OAuthService {
    pub fn new(
        config: Arc<AuthConfiguration>,
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            config,
            transport,
            tokens,
            state: Arc::new(Mutex::new(OAuthState {
                phase: ExchangeState::Idle,
                in_flight: None,
                next_id: 0,
            })),
        }
    }

    pub fn state(&self) -> ExchangeState {
        lock(&self.state).phase
    }

    pub fn is_exchanging(&self) -> bool {
        lock(&self.state).in_flight.is_some()
    }

    /// Exchange `code` for a token and persist it in the token store.
    pub async fn exchange(&self, code: &str) -> Result<Token> {
        let request = self.token_request(code)?;
        let (id, mut cancelled) = self.begin(code)?;
        let _guard = ExchangeGuard {
            state: &self.state,
            id,
        };

        let outcome = tokio::select! {
            biased;
            _ = &mut cancelled => {
                tracing::debug!("Token exchange {} was superseded", id);
                return Err(Error::Network(NetworkFailure::Cancelled));
            }
            response = self.transport.send(request) => self.store_token(response),
        };

        match &outcome {
            Ok(_) => self.finish(id, ExchangeState::TokenStored),
            Err(error) => {
                tracing::warn!("Token exchange failed: {}", error);
                self.finish(id, ExchangeState::Failed);
            }
        }
        outcome
    }

    fn begin(&self, code: &str) -> Result<(u64, oneshot::Receiver<()>)> {
        let mut state = lock(&self.state);
        if state
            .in_flight
            .as_ref()
            .is_some_and(|running| running.code == code)
        {
            return Err(Error::DuplicateCode);
        }

        if let Some(previous) = state.in_flight.take() {
            tracing::debug!("Cancelling token exchange {}", previous.id);
            let _ = previous.cancel.send(());
        }

        let id = state.next_id;
        state.next_id += 1;
        let (cancel, cancelled) = oneshot::channel();
        state.in_flight = Some(InFlight {
            id,
            code: code.to_string(),
            cancel,
        });
        state.phase = ExchangeState::Requesting;
        Ok((id, cancelled))
    }

    fn finish(&self, id: u64, phase: ExchangeState) {
        let mut state = lock(&self.state);
        if state.in_flight.as_ref().is_some_and(|running| running.id == id) {
            state.in_flight = None;
            state.phase = phase;
        }
    }

    fn store_token(
        &self,
        response: std::result::Result<crate::transport::ApiResponse, NetworkFailure>,
    ) -> Result<Token> {
        let body: OAuthTokenResponseBody = response?.decode()?;
        let access_token = body.access_token.trim();
        if access_token.is_empty() {
            return Err(Error::Decode(
                "token response contained an empty access_token".to_string(),
            ));
        }

        let token = Token::new(access_token);
        self.tokens.save_token(&token)?;
        tracing::info!("Stored new access token");
        Ok(token)
    }

    fn token_request(&self, code: &str) -> Result<ApiRequest> {
        let mut url = Url::parse(self.config.token_url.trim())?;
        url.query_pairs_mut()
            .clear()
            .append_pair("client_id", &self.config.access_key)
            .append_pair("client_secret", &self.config.secret_key)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("code", code)
            .append_pair("grant_type", "authorization_code");
        Ok(ApiRequest::new(Method::POST, url))
    }
}

/// Releases the in-flight slot if the exchange future is dropped early.
struct ExchangeGuard<'a> {
    state: &'a Mutex<OAuthState>,
    id: u64,
}

impl Drop for ExchangeGuard<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        if state
            .in_flight
            .as_ref()
            .is_some_and(|running| running.id == self.id)
        {
            state.in_flight = None;
            state.phase = ExchangeState::Failed;
        }
    }
}

#[derive(Debug, Deserialize)]
struct OAuthTokenResponseBody {
    access_token: String,
}
