//! OAuth2 authorization-code sign-in.
//!
//! - [`helper`]: authorization URL construction and redirect code extraction
//! - [`token`]: the bearer token and its persistence seam
//! - [`oauth`]: the code-for-token exchange

pub mod helper;
pub mod oauth;
pub mod token;

pub use helper::{
    authorization_request, authorization_url, code_from_url, should_hide_progress, NATIVE_REDIRECT_PATH,
};
pub use oauth::{ExchangeState, OAuthService};
pub use token::{current_token, MemoryTokenStore, Token, TokenStore};
