// Route module decomposition: one file per area of the site.
// Shared request guards and the response enum live here.

mod auth;
mod home;
mod messages;
mod system;
mod users;

// --- Re-exports (all route functions used by lib.rs mount) ---

pub use auth::{login, login_form, logout, signup, signup_form};
pub use home::homepage;
pub use messages::{create_message, delete_message, new_message_form, show_message, toggle_like};
pub use system::{health, internal_error, not_found, stats, unprocessable};
pub use users::{
    delete_user, edit_profile, edit_profile_form, follow_user, list_followers, list_following,
    list_likes, list_users, show_user, stop_following,
};

use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::response::content::RawHtml;
use rocket::response::{Flash, Redirect};

use crate::db::Db;
use crate::models::{User, user};

/// Private cookie holding the authenticated user's id.
pub const CURR_USER_KEY: &str = "curr_user";

// --- Shared request guards ---

/// The logged-in user. Forwards when there is no valid session, so handlers
/// take `Option<CurrentUser>` and decide how to reject.
pub struct CurrentUser(pub User);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(user_id) = req
            .cookies()
            .get_private(CURR_USER_KEY)
            .and_then(|c| c.value().parse::<i64>().ok())
        else {
            return Outcome::Forward(Status::Unauthorized);
        };

        let Some(db) = req.rocket().state::<Db>() else {
            return Outcome::Error((Status::InternalServerError, ()));
        };

        match user::find(&db.conn(), user_id) {
            Ok(Some(u)) => Outcome::Success(CurrentUser(u)),
            // Stale session: the account is gone
            Ok(None) => {
                req.cookies().remove_private(CURR_USER_KEY);
                Outcome::Forward(Status::Unauthorized)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load session user");
                Outcome::Error((Status::InternalServerError, ()))
            }
        }
    }
}

// --- Responses ---

/// Everything a page handler can answer with.
#[derive(rocket::Responder)]
pub enum Reply {
    Page(RawHtml<String>),
    Redirect(Redirect),
    Flash(Flash<Redirect>),
}

impl From<RawHtml<String>> for Reply {
    fn from(page: RawHtml<String>) -> Self {
        Reply::Page(page)
    }
}

impl From<Redirect> for Reply {
    fn from(r: Redirect) -> Self {
        Reply::Redirect(r)
    }
}

impl From<Flash<Redirect>> for Reply {
    fn from(f: Flash<Redirect>) -> Self {
        Reply::Flash(f)
    }
}

/// Form fields arrive as `Option<String>`; treat blank as missing.
pub(crate) fn field(v: &Option<String>) -> &str {
    v.as_deref().map(str::trim).unwrap_or("")
}
