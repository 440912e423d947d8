//! Photo feed presenter.

use std::sync::{Arc, Mutex, Weak};

use chrono::DateTime;
use url::Url;

use super::EdgeInsets;
use crate::models::{Photo, PhotoId, PhotoSize};
use crate::services::{PhotoListService, RequestOutcome, Subscription};
use crate::util::lock;

/// Padding between a row's image and the table edges.
pub const ROW_INSETS: EdgeInsets = EdgeInsets {
    top: 4.0,
    left: 16.0,
    bottom: 4.0,
    right: 16.0,
};

const ERROR_TITLE: &str = "Something went wrong";
const LIKE_FAILED_MESSAGE: &str = "Could not change the like.";

/// Rendering collaborator for the feed screen.
pub trait ListView: Send + Sync {
    /// Rows `old_count..new_count` were appended to the presenter's snapshot.
    fn insert_rows(&self, old_count: usize, new_count: usize);
    /// The snapshot was replaced wholesale and now holds `count` rows.
    fn reload_rows(&self, count: usize);
    fn update_like_status(&self, index: usize, is_liked: bool);
    fn show_error_alert(&self, title: &str, message: &str);
    fn show_blocking_progress(&self);
    fn hide_blocking_progress(&self);
}

/// Display values for a single feed row.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoRow {
    pub id: PhotoId,
    pub thumb_image_url: Url,
    /// Long-form creation date, absent when the timestamp is missing or unparseable
    pub date: Option<String>,
    pub is_liked: bool,
    pub size: PhotoSize,
}

/// Mirrors the photo list into a local snapshot and drives the [`ListView`].
///
/// The snapshot grows through change notifications and is rebuilt when the
/// service list no longer starts with it, as after a reset. Like changes are
/// copied back from the service after it confirms them.
pub struct ListPresenter {
    view: Arc<dyn ListView>,
    photos: PhotoListService,
    snapshot: Arc<Mutex<Vec<Photo>>>,
    _subscription: Subscription,
}

impl ListPresenter {
    pub fn new(view: Arc<dyn ListView>, photos: PhotoListService) -> Self {
        let snapshot = Arc::new(Mutex::new(Vec::new()));
        let subscription = {
            let weak_snapshot = Arc::downgrade(&snapshot);
            let source = photos.clone();
            let view = view.clone();
            photos.subscribe(move |_| {
                sync_snapshot(&weak_snapshot, &source, view.as_ref());
            })
        };

        Self {
            view,
            photos,
            snapshot,
            _subscription: subscription,
        }
    }

    pub async fn view_did_load(&self) {
        self.fetch_next_page().await;
    }

    /// Request the next page; failures are surfaced through the view.
    pub async fn fetch_next_page(&self) {
        match self.photos.fetch_next_page().await {
            Ok(RequestOutcome::Completed(_)) => {
                sync_snapshot(&Arc::downgrade(&self.snapshot), &self.photos, self.view.as_ref());
            }
            Ok(RequestOutcome::Skipped) => {}
            Err(error) => {
                tracing::warn!("Feed page request failed: {}", error);
                self.view.show_error_alert(ERROR_TITLE, &error.to_string());
            }
        }
    }

    /// Load more when the last row becomes visible.
    pub async fn will_display_row(&self, index: usize) {
        if self.photo_count().checked_sub(1) == Some(index) {
            self.fetch_next_page().await;
        }
    }

    /// Like or unlike the photo at `index`, blocking the UI while the call runs.
    pub async fn change_like(&self, index: usize, like: bool) {
        let Some(photo) = self.photo(index) else {
            tracing::warn!("Like change for row {} outside the feed", index);
            return;
        };

        self.view.show_blocking_progress();
        let outcome = self.photos.change_like(&photo.id, like).await;
        self.view.hide_blocking_progress();

        match outcome {
            Ok(RequestOutcome::Completed(())) => {
                let is_liked = self
                    .photos
                    .photo(&photo.id)
                    .map_or(like, |confirmed| confirmed.is_liked);
                let position = {
                    let mut snapshot = lock(&self.snapshot);
                    let position = snapshot.iter().position(|row| row.id == photo.id);
                    if let Some(row) = position.and_then(|position| snapshot.get_mut(position)) {
                        row.is_liked = is_liked;
                    }
                    position
                };
                if let Some(position) = position {
                    self.view.update_like_status(position, is_liked);
                }
            }
            Ok(RequestOutcome::Skipped) => {}
            Err(error) => {
                tracing::warn!("Like change for {} failed: {}", photo.id, error);
                self.view.show_error_alert(ERROR_TITLE, LIKE_FAILED_MESSAGE);
            }
        }
    }

    /// Flip the like state of the row at `index`.
    pub async fn toggle_like(&self, index: usize) {
        if let Some(photo) = self.photo(index) {
            self.change_like(index, !photo.is_liked).await;
        }
    }

    pub fn row(&self, index: usize) -> Option<PhotoRow> {
        self.photo(index).map(|photo| PhotoRow {
            date: photo.created_at.as_deref().and_then(format_photo_date),
            id: photo.id,
            thumb_image_url: photo.thumb_image_url,
            is_liked: photo.is_liked,
            size: photo.size,
        })
    }

    /// Height of the row at `index` for a table `table_width` points wide.
    pub fn row_height(&self, index: usize, table_width: f64) -> Option<f64> {
        self.photo(index).map(|photo| row_height(photo.size, table_width))
    }

    pub fn photos(&self) -> Vec<Photo> {
        lock(&self.snapshot).clone()
    }

    pub fn photo_count(&self) -> usize {
        lock(&self.snapshot).len()
    }

    fn photo(&self, index: usize) -> Option<Photo> {
        lock(&self.snapshot).get(index).cloned()
    }
}

/// Scale the image to the inset table width and add the vertical insets.
pub fn row_height(size: PhotoSize, table_width: f64) -> f64 {
    let vertical = ROW_INSETS.top + ROW_INSETS.bottom;
    if size.width <= 0.0 {
        return vertical;
    }
    let image_width = (table_width - ROW_INSETS.left - ROW_INSETS.right).max(0.0);
    size.height * (image_width / size.width) + vertical
}

/// Render an ISO-8601 timestamp as e.g. `5 March 2024`.
pub fn format_photo_date(raw: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|date| date.format("%-d %B %Y").to_string())
}

enum SnapshotChange {
    Appended(usize, usize),
    Reloaded(usize),
}

fn sync_snapshot(snapshot: &Weak<Mutex<Vec<Photo>>>, photos: &PhotoListService, view: &dyn ListView) {
    let Some(snapshot) = snapshot.upgrade() else {
        return;
    };
    let change = {
        let mut snapshot = lock(&snapshot);
        let current = photos.photos();
        let old_count = snapshot.len();
        let is_prefix = current.len() >= old_count
            && snapshot.iter().zip(&current).all(|(row, photo)| row.id == photo.id);
        if is_prefix && current.len() == old_count {
            return;
        }
        if is_prefix {
            snapshot.extend(current.into_iter().skip(old_count));
            SnapshotChange::Appended(old_count, snapshot.len())
        } else {
            *snapshot = current;
            SnapshotChange::Reloaded(snapshot.len())
        }
    };
    match change {
        SnapshotChange::Appended(old_count, new_count) => view.insert_rows(old_count, new_count),
        SnapshotChange::Reloaded(count) => {
            tracing::debug!("Feed snapshot rebuilt with {} rows", count);
            view.reload_rows(count);
        }
    }
}
