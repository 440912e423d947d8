//! Data models for Image Feed

mod photo;
mod profile;

pub use photo::{Photo, PhotoId, PhotoResult, PhotoSize, UrlsResult};
pub use profile::{Profile, ProfileImage, ProfileResult, UserResult};
