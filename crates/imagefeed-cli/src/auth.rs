//! Bearer token persistence in the OS keychain.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;

use imagefeed_core::auth::{Token, TokenStore};
use imagefeed_core::{Error, Result};

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "imagefeed";
const TOKEN_USERNAME: &str = "oauth_token";

#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    username: String,
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::for_user(TOKEN_USERNAME)
    }
}

impl KeyringTokenStore {
    pub fn for_user(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry(&self) -> Result<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username)
            .map_err(|error| Error::SecureStorage(error.to_string()))
    }
}

impl TokenStore for KeyringTokenStore {
    #[cfg(not(test))]
    fn load_token(&self) -> Result<Option<Token>> {
        match self.entry()?.get_password() {
            Ok(raw) => Ok(Some(Token::new(raw))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(Error::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn load_token(&self) -> Result<Option<Token>> {
        let guard = Self::test_store()
            .lock()
            .map_err(|error| Error::SecureStorage(error.to_string()))?;
        Ok(guard.get(&self.username).map(Token::new))
    }

    #[cfg(not(test))]
    fn save_token(&self, token: &Token) -> Result<()> {
        self.entry()?
            .set_password(token.as_str())
            .map_err(|error| Error::SecureStorage(error.to_string()))
    }

    #[cfg(test)]
    fn save_token(&self, token: &Token) -> Result<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::SecureStorage(error.to_string()))?;
        guard.insert(self.username.clone(), token.as_str().to_string());
        Ok(())
    }

    #[cfg(not(test))]
    fn clear_token(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(Error::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn clear_token(&self) -> Result<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::SecureStorage(error.to_string()))?;
        guard.remove(&self.username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_through_store() {
        let store = KeyringTokenStore::for_user("test-round-trip");
        assert_eq!(store.load_token().unwrap(), None);

        store.save_token(&Token::new("abc")).unwrap();
        assert_eq!(store.load_token().unwrap(), Some(Token::new("abc")));
    }

    #[test]
    fn clearing_missing_token_is_ok() {
        let store = KeyringTokenStore::for_user("test-clear-missing");
        store.clear_token().unwrap();
        store.save_token(&Token::new("abc")).unwrap();
        store.clear_token().unwrap();
        assert_eq!(store.load_token().unwrap(), None);
    }

    #[test]
    fn default_store_uses_oauth_token_entry() {
        assert_eq!(KeyringTokenStore::default().username, "oauth_token");
    }
}
