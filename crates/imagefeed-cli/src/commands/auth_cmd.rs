use std::io::Write;

use imagefeed_core::auth::{authorization_url, code_from_url, NATIVE_REDIRECT_PATH};
use imagefeed_core::util::normalize_text_option;
use imagefeed_core::{AppContext, SessionState};
use url::Url;

use crate::cli::AuthCommands;
use crate::error::CliError;

pub async fn run_auth(
    command: AuthCommands,
    app: &AppContext,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        AuthCommands::Url => {
            let url = authorization_url(app.config()).ok_or_else(|| {
                CliError::Config("authorize_url is not a valid URL".to_string())
            })?;
            writeln!(out, "Open this URL, grant access, then run `imagefeed auth login <REDIRECT_URL>`:")?;
            writeln!(out, "{url}")?;
            Ok(())
        }
        AuthCommands::Login { redirect_url, code } => {
            let code = resolve_code(redirect_url.as_deref(), code)?;
            let state = app.sign_in(&code).await?;
            match (state, app.profile().profile()) {
                (SessionState::Authorized, Some(profile)) => {
                    writeln!(out, "Signed in as {}", profile.login_name)?;
                }
                _ => writeln!(out, "Signed in")?,
            }
            Ok(())
        }
        AuthCommands::Status => {
            if app.is_authorized() {
                writeln!(out, "Signed in (token stored in the system keychain)")?;
            } else {
                writeln!(out, "Not signed in.")?;
            }
            Ok(())
        }
        AuthCommands::Logout => {
            app.logout().logout()?;
            writeln!(out, "Signed out.")?;
            Ok(())
        }
    }
}

/// Take the code given by hand, or extract it from the redirect URL.
pub fn resolve_code(redirect_url: Option<&str>, code: Option<String>) -> Result<String, CliError> {
    if let Some(code) = code {
        return normalize_text_option(Some(code))
            .ok_or_else(|| CliError::Auth("Authorization code cannot be empty".to_string()));
    }

    let raw = redirect_url
        .ok_or_else(|| CliError::Auth("Provide a redirect URL or --code".to_string()))?;
    let url = Url::parse(raw.trim())
        .map_err(|error| CliError::Auth(format!("Invalid redirect URL: {error}")))?;
    let code = code_from_url(&url).ok_or_else(|| {
        CliError::Auth(format!(
            "Redirect URL must have path {NATIVE_REDIRECT_PATH} and a code parameter"
        ))
    })?;
    normalize_text_option(Some(code))
        .ok_or_else(|| CliError::Auth("Authorization code cannot be empty".to_string()))
}
