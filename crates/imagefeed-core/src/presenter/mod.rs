//! Screen presenters.
//!
//! Presenters own a plain reference to their view collaborator and a
//! [`Subscription`](crate::services::Subscription) to the services they
//! mirror; dropping the presenter unsubscribes.

mod list;
mod profile;

pub use list::{format_photo_date, row_height, ListPresenter, ListView, PhotoRow, ROW_INSETS};
pub use profile::{ProfilePresenter, ProfileView};

/// Padding around an image row, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeInsets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}
