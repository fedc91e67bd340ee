//! Persistence layer: users, messages and the follow/like edge tables.
//!
//! Every operation takes a borrowed `rusqlite::Connection` so the same code
//! serves request handlers (which lock the shared [`crate::db::Db`]) and
//! tests.

pub mod follows;
pub mod likes;
pub mod message;
pub mod user;

use serde::Serialize;

pub const DEFAULT_IMAGE_URL: &str = "/static/images/default-pic.png";
pub const DEFAULT_HEADER_IMAGE_URL: &str = "/static/images/warbler-hero.jpg";

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// PHC-format Argon2 hash. Never rendered.
    #[serde(skip_serializing)]
    pub password: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub is_admin: bool,
}

/// A message joined with the author fields every listing needs.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Message {
    pub id: i64,
    pub text: String,
    pub created_at: String,
    pub user_id: i64,
    pub username: String,
    pub user_image_url: String,
}

#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserStats {
    pub messages: i64,
    pub following: i64,
    pub followers: i64,
    pub likes: i64,
}

/// Partial profile update. `None` leaves the stored value untouched.
#[derive(Debug, Default, Clone)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LikeToggle {
    Liked,
    Unliked,
}

/// Current time as fixed-width RFC 3339 (microseconds, `Z`), so string order
/// matches chronological order.
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
