//! Authenticated API services.
//!
//! Each service owns its cache and allows a single request in flight; a call
//! made while another is running returns [`RequestOutcome::Skipped`] instead
//! of queueing.

mod flight;
mod logout;
mod observers;
mod photos;
mod profile;

use url::Url;

use crate::{Error, Result};

pub use logout::LogoutService;
pub use observers::{Observers, Subscription};
pub use photos::{PhotoListService, PhotosChanged, PHOTOS_PER_PAGE};
pub use profile::{AvatarChanged, ProfileService};

/// Result of a single-flight operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome<T> {
    /// The request ran to completion
    Completed(T),
    /// Another request was in flight; nothing was sent
    Skipped,
}

impl<T> RequestOutcome<T> {
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Skipped => None,
        }
    }
}

/// Append path `segments` to `base`, escaping each segment.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| Error::InvalidRequest(format!("{base} cannot be used as an API base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
