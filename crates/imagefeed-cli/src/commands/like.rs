use std::io::Write;

use imagefeed_core::services::RequestOutcome;
use imagefeed_core::{AppContext, PhotoId};

use crate::commands::common::normalize_photo_id;
use crate::error::CliError;

pub async fn run_like(
    app: &AppContext,
    id: &str,
    like: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let id = normalize_photo_id(id)?;
    match app.photos().change_like(&PhotoId::from(id), like).await? {
        RequestOutcome::Completed(()) if like => writeln!(out, "Liked {id}")?,
        RequestOutcome::Completed(()) => writeln!(out, "Removed like from {id}")?,
        RequestOutcome::Skipped => {
            return Err(CliError::Reported(
                "Another photo request is still running".to_string(),
            ));
        }
    }
    Ok(())
}
