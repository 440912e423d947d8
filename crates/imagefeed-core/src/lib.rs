//! imagefeed-core - Core library for Image Feed
//!
//! This crate contains the OAuth2 sign-in flow, the paginated photo feed,
//! the profile services and the presenters used by every Image Feed host.
//! Hosts supply the platform pieces: an [`transport::HttpTransport`], an
//! [`auth::TokenStore`] and the view collaborators.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod presenter;
pub mod services;
pub mod state;
pub mod transport;
pub mod util;

#[cfg(test)]
mod testing;

pub use config::AuthConfiguration;
pub use error::{Error, NetworkFailure, Result};
pub use models::{Photo, PhotoId, Profile};
pub use state::{AppContext, SessionState};
