//! Terminal renditions of the feed and profile screens.

use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

use imagefeed_core::presenter::{ListView, PhotoRow, ProfileView};
use serde::Serialize;
use url::Url;

/// Feed screen writing status lines to `W` and collecting alerts.
pub struct TerminalListView<W> {
    out: Mutex<W>,
    alerts: Mutex<Vec<String>>,
}

impl<W: Write + Send> TerminalListView<W> {
    pub const fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            alerts: Mutex::new(Vec::new()),
        }
    }

    /// The first alert shown since the last call, if any.
    pub fn take_alert(&self) -> Option<String> {
        let mut alerts = guard(&self.alerts);
        let first = alerts.first().cloned();
        alerts.clear();
        first
    }
}

impl<W: Write + Send> ListView for TerminalListView<W> {
    fn insert_rows(&self, old_count: usize, new_count: usize) {
        tracing::debug!("Feed rows {}..{} loaded", old_count, new_count);
    }

    fn reload_rows(&self, count: usize) {
        tracing::debug!("Feed reloaded with {} rows", count);
    }

    fn update_like_status(&self, index: usize, is_liked: bool) {
        let label = if is_liked { "liked" } else { "not liked" };
        let _ = writeln!(guard(&self.out), "Row {index} is now {label}");
    }

    fn show_error_alert(&self, title: &str, message: &str) {
        guard(&self.alerts).push(format!("{title}: {message}"));
    }

    fn show_blocking_progress(&self) {
        tracing::debug!("Waiting for server");
    }

    fn hide_blocking_progress(&self) {}
}

/// Profile screen writing each update as a line to `W`.
pub struct TerminalProfileView<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> TerminalProfileView<W> {
    pub const fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl<W: Write + Send> ProfileView for TerminalProfileView<W> {
    fn update_profile_details(&self, name: &str, login: &str, bio: &str) {
        let mut out = guard(&self.out);
        let _ = writeln!(out, "{name}");
        let _ = writeln!(out, "{login}");
        if !bio.is_empty() {
            let _ = writeln!(out, "{bio}");
        }
    }

    fn update_avatar(&self, url: &Url) {
        let _ = writeln!(guard(&self.out), "Avatar: {url}");
    }

    fn reset_to_default_profile_data(&self) {
        tracing::debug!("Profile view reset");
    }

    fn show_splash(&self) {
        let _ = writeln!(guard(&self.out), "Signed out.");
    }
}

#[derive(Debug, Serialize)]
pub struct FeedItem {
    pub id: String,
    pub date: Option<String>,
    pub liked: bool,
    pub width: f64,
    pub height: f64,
    pub thumb_url: String,
}

impl From<&PhotoRow> for FeedItem {
    fn from(row: &PhotoRow) -> Self {
        Self {
            id: row.id.to_string(),
            date: row.date.clone(),
            liked: row.is_liked,
            width: row.size.width,
            height: row.size.height,
            thumb_url: row.thumb_image_url.to_string(),
        }
    }
}

pub fn format_row(index: usize, row: &PhotoRow) -> String {
    let heart = if row.is_liked { "♥" } else { " " };
    let date = row.date.as_deref().unwrap_or("-");
    format!("{index:>3}  {heart}  {:<14}  {date:<18}  {}", row.id.as_str(), row.thumb_image_url)
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
