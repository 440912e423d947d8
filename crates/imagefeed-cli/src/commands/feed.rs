use std::io::{self, Write};
use std::sync::Arc;

use imagefeed_core::AppContext;

use crate::error::CliError;
use crate::views::{format_row, FeedItem, TerminalListView};

/// Load `pages` pages through the list presenter and print its rows.
pub async fn run_feed(
    app: &AppContext,
    pages: u32,
    as_json: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if !app.is_authorized() {
        return Err(CliError::NotSignedIn);
    }

    let view = Arc::new(TerminalListView::new(io::stderr()));
    let presenter = app.list_presenter(view.clone());

    presenter.view_did_load().await;
    fail_on_alert(&view)?;
    for _ in 1..pages {
        let Some(last) = presenter.photo_count().checked_sub(1) else {
            break;
        };
        presenter.will_display_row(last).await;
        fail_on_alert(&view)?;
    }

    let rows: Vec<_> = (0..presenter.photo_count())
        .filter_map(|index| presenter.row(index))
        .collect();

    if as_json {
        let items = rows.iter().map(FeedItem::from).collect::<Vec<_>>();
        writeln!(out, "{}", serde_json::to_string_pretty(&items)?)?;
    } else if rows.is_empty() {
        writeln!(out, "No photos.")?;
    } else {
        for (index, row) in rows.iter().enumerate() {
            writeln!(out, "{}", format_row(index, row))?;
        }
    }

    Ok(())
}

fn fail_on_alert<W: Write + Send>(view: &TerminalListView<W>) -> Result<(), CliError> {
    view.take_alert().map_or(Ok(()), |alert| Err(CliError::Reported(alert)))
}
