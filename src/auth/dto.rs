use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::UserRecord;

/// Login form body. Missing fields deserialize as empty and fail validation.
#[derive(Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Text fields of the registration form, as submitted. Like `LoginForm` it
/// has no `Debug`, so the password cannot end up in a log line.
#[derive(Default, Clone)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub location: String,
    pub website: String,
    pub portfolio_url: String,
    pub social_links: String,
    pub date_of_birth: String,
    pub gender: String,
    pub art_styles: String,
    pub is_profile_private: String,
}

impl RegisterForm {
    /// Assign a multipart text field by name. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "username" => &mut self.username,
            "email" => &mut self.email,
            "password" => &mut self.password,
            "first_name" => &mut self.first_name,
            "last_name" => &mut self.last_name,
            "bio" => &mut self.bio,
            "location" => &mut self.location,
            "website" => &mut self.website,
            "portfolio_url" => &mut self.portfolio_url,
            "social_links" => &mut self.social_links,
            "date_of_birth" => &mut self.date_of_birth,
            "gender" => &mut self.gender,
            "art_styles" => &mut self.art_styles,
            "is_profile_private" => &mut self.is_profile_private,
            _ => return,
        };
        *slot = value;
    }
}

/// Snapshot of the user kept in the server-side session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub profile_image: Option<String>,
}

impl From<&UserRecord> for SessionUser {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            profile_image: user.profile_image.clone(),
        }
    }
}
