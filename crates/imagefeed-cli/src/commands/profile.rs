use std::io::Write;
use std::sync::Arc;

use imagefeed_core::{AppContext, SessionState};

use crate::error::CliError;
use crate::views::TerminalProfileView;

/// Load the profile and avatar, then render them through the profile presenter.
pub async fn run_profile<W>(app: &AppContext, out: W) -> Result<(), CliError>
where
    W: Write + Send + 'static,
{
    if app.bootstrap_session().await? == SessionState::Unauthorized {
        return Err(CliError::NotSignedIn);
    }

    let presenter = app.profile_presenter(Arc::new(TerminalProfileView::new(out)));
    presenter.view_did_load();
    Ok(())
}
