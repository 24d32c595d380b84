use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never exposed
    pub profile_image: Option<String>,
    #[sqlx(flatten)]
    pub profile: ProfileDetails,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Optional profile fields collected on the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ProfileDetails {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub portfolio_url: Option<String>,
    pub social_links: Option<String>,
    pub date_of_birth: Option<Date>,
    pub gender: Option<String>,
    pub art_styles: Option<String>,
    pub is_profile_private: bool,
}

/// Everything needed to insert a user. The hash is already computed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub profile_image: Option<String>,
    pub profile: ProfileDetails,
}
