//! Profile model

use serde::{Deserialize, Serialize};
use url::Url;

/// The signed-in user's profile as shown on the profile screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    /// First and last name joined by a space
    pub name: String,
    /// `@username`
    pub login_name: String,
    pub bio: Option<String>,
}

impl From<ProfileResult> for Profile {
    fn from(result: ProfileResult) -> Self {
        let name = [result.first_name, result.last_name]
            .into_iter()
            .flatten()
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let bio = result
            .bio
            .map(|bio| bio.trim().to_string())
            .filter(|bio| !bio.is_empty());

        Self {
            login_name: format!("@{}", result.username),
            username: result.username,
            name,
            bio,
        }
    }
}

/// `GET /me` response
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResult {
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// `GET /users/{username}` response, reduced to the avatar
#[derive(Debug, Clone, Deserialize)]
pub struct UserResult {
    pub profile_image: ProfileImage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileImage {
    pub small: Url,
    pub medium: Url,
    pub large: Url,
}
