//! Authorization URL construction and redirect handling.
//!
//! Pure functions; failures are reported as `None`.

use reqwest::Method;
use url::Url;

use crate::config::AuthConfiguration;
use crate::transport::ApiRequest;

/// Path the authorization page redirects to once the user grants access.
pub const NATIVE_REDIRECT_PATH: &str = "/oauth/authorize/native";

const PROGRESS_EPSILON: f64 = 0.0001;

/// Build the browser URL that starts the authorization-code flow.
///
/// Returns `None` only when `config.authorize_url` is not a valid URL.
pub fn authorization_url(config: &AuthConfiguration) -> Option<Url> {
    let mut url = Url::parse(config.authorize_url.trim()).ok()?;
    url.query_pairs_mut()
        .clear()
        .append_pair("client_id", &config.access_key)
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &config.access_scope);
    Some(url)
}

/// GET request for the authorization page, for hosts that embed a browser.
pub fn authorization_request(config: &AuthConfiguration) -> Option<ApiRequest> {
    authorization_url(config).map(|url| ApiRequest::new(Method::GET, url))
}

/// Extract the authorization code from a redirect URL.
///
/// Returns `None` unless the path is exactly [`NATIVE_REDIRECT_PATH`] and a
/// `code` parameter is present. An empty parameter yields `Some("")`.
pub fn code_from_url(url: &Url) -> Option<String> {
    if url.path() != NATIVE_REDIRECT_PATH {
        return None;
    }

    url.query_pairs()
        .find(|(name, _)| name == "code")
        .map(|(_, value)| value.into_owned())
}

/// Whether the page-load indicator should be hidden for `progress` in `0.0..=1.0`.
pub fn should_hide_progress(progress: f64) -> bool {
    (progress - 1.0).abs() <= PROGRESS_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> AuthConfiguration {
        AuthConfiguration::standard("access-key", "secret-key")
    }

    #[test]
    fn authorization_url_carries_client_parameters() {
        let url = authorization_url(&config()).expect("standard config builds a URL");

        assert_eq!(url.path(), "/oauth/authorize");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("client_id".to_string(), "access-key".to_string()),
                ("redirect_uri".to_string(), "urn:ietf:wg:oauth:2.0:oob".to_string()),
                ("response_type".to_string(), "code".to_string()),
                ("scope".to_string(), "public read_user write_likes".to_string()),
            ]
        );
        assert!(url.as_str().contains("scope=public+read_user+write_likes"));
    }

    #[test]
    fn authorization_url_is_none_for_malformed_endpoint() {
        let mut config = config();
        config.authorize_url = "not a url".to_string();
        assert!(authorization_url(&config).is_none());
        assert!(authorization_request(&config).is_none());
    }

    #[test]
    fn authorization_request_is_a_get() {
        let request = authorization_request(&config()).unwrap();
        assert_eq!(request.method, Method::GET);
        assert!(request.bearer.is_none());
    }

    #[test]
    fn code_is_extracted_from_native_redirect() {
        let url = Url::parse("https://unsplash.com/oauth/authorize/native?code=abc123").unwrap();
        assert_eq!(code_from_url(&url).as_deref(), Some("abc123"));

        let mut url = Url::parse("https://unsplash.com/oauth/authorize/native").unwrap();
        url.query_pairs_mut().append_pair("code", "test code");
        assert_eq!(code_from_url(&url).as_deref(), Some("test code"));
    }

    #[test]
    fn code_is_none_for_other_paths_or_missing_code() {
        let other = Url::parse("https://unsplash.com/oauth/authorize?code=abc123").unwrap();
        assert_eq!(code_from_url(&other), None);

        let missing = Url::parse("https://unsplash.com/oauth/authorize/native?state=x").unwrap();
        assert_eq!(code_from_url(&missing), None);
    }

    #[test]
    fn empty_code_parameter_is_returned_as_is() {
        let empty = Url::parse("https://unsplash.com/oauth/authorize/native?code=").unwrap();
        assert_eq!(code_from_url(&empty).as_deref(), Some(""));
    }

    #[test]
    fn authorization_url_is_not_a_redirect() {
        let url = authorization_url(&config()).unwrap();
        assert_eq!(code_from_url(&url), None);
    }

    #[test]
    fn progress_hidden_only_when_complete() {
        assert!(!should_hide_progress(0.6));
        assert!(should_hide_progress(1.0));
        assert!(should_hide_progress(0.99995));
    }
}
