//! Bearer token and token persistence.

use std::fmt;
use std::sync::Mutex;

use crate::util::lock;
use crate::{Error, Result};

/// Opaque OAuth bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("Token([REDACTED])")
    }
}

/// Persistence for the single per-installation bearer token.
///
/// Hosts back this with the platform secret store.
pub trait TokenStore: Send + Sync {
    fn load_token(&self) -> Result<Option<Token>>;
    fn save_token(&self, token: &Token) -> Result<()>;
    fn clear_token(&self) -> Result<()>;
}

/// Load the stored token, treating an unreadable store as signed out.
pub fn current_token(store: &dyn TokenStore) -> Option<Token> {
    match store.load_token() {
        Ok(token) => token,
        Err(error) => {
            tracing::warn!("Token store is unreadable, treating as signed out: {}", error);
            None
        }
    }
}

/// Load the stored token or fail with [`Error::MissingToken`].
pub(crate) fn require_token(store: &dyn TokenStore) -> Result<Token> {
    current_token(store).ok_or(Error::MissingToken)
}

/// In-process token store for tests and ephemeral hosts.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<Token>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(Token::new(token))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load_token(&self) -> Result<Option<Token>> {
        Ok(lock(&self.token).clone())
    }

    fn save_token(&self, token: &Token) -> Result<()> {
        if token.as_str().trim().is_empty() {
            return Err(Error::SecureStorage(
                "token value must not be empty".to_string(),
            ));
        }
        *lock(&self.token) = Some(token.clone());
        Ok(())
    }

    fn clear_token(&self) -> Result<()> {
        lock(&self.token).take();
        Ok(())
    }
}
