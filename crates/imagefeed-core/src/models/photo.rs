//! Photo model

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Server-assigned photo identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(String);

impl PhotoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PhotoId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Pixel dimensions of the original image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhotoSize {
    pub width: f64,
    pub height: f64,
}

impl PhotoSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width divided by height, `None` for degenerate sizes
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.width > 0.0 && self.height > 0.0).then(|| self.width / self.height)
    }
}

/// A photo in the feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    /// Unique identifier
    pub id: PhotoId,
    /// Original pixel size
    pub size: PhotoSize,
    /// ISO-8601 creation timestamp as sent by the server
    pub created_at: Option<String>,
    pub description: Option<String>,
    pub thumb_image_url: Url,
    pub large_image_url: Url,
    /// Whether the signed-in user likes this photo
    pub is_liked: bool,
}

impl From<PhotoResult> for Photo {
    fn from(result: PhotoResult) -> Self {
        Self {
            id: PhotoId::new(result.id),
            size: PhotoSize::new(result.width, result.height),
            created_at: result.created_at,
            description: result.description,
            thumb_image_url: result.urls.thumb,
            large_image_url: result.urls.full,
            is_liked: result.liked_by_user,
        }
    }
}

/// One item of the `GET /photos` response
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoResult {
    pub id: String,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub urls: UrlsResult,
    #[serde(default)]
    pub liked_by_user: bool,
}

/// Image URLs for the sizes the client uses
#[derive(Debug, Clone, Deserialize)]
pub struct UrlsResult {
    pub full: Url,
    pub thumb: Url,
    pub small: Url,
}
