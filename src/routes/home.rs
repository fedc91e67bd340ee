use rocket::request::FlashMessage;
use rocket::response::content::RawHtml;
use rocket::{get, State};

use super::CurrentUser;
use crate::config::AppConfig;
use crate::db::Db;
use crate::error::AppResult;
use crate::models::{likes, message, user};
use crate::views::{Views, page_context};

/// GET /: Timeline for a logged-in user, landing page otherwise
#[get("/")]
pub fn homepage(
    db: &State<Db>,
    config: &State<AppConfig>,
    views: &State<Views>,
    user: Option<CurrentUser>,
    flash: Option<FlashMessage<'_>>,
) -> AppResult<RawHtml<String>> {
    let Some(CurrentUser(me)) = user else {
        let ctx = page_context(None, flash);
        return views.render("home_anon.html", &ctx);
    };

    let conn = db.conn();
    let messages = message::timeline(&conn, me.id, config.timeline_limit)?;
    let liked_ids = likes::liked_message_ids(&conn, me.id)?;
    let stats = user::stats(&conn, me.id)?;
    drop(conn);

    let mut ctx = page_context(Some(&me), flash);
    ctx.insert("messages", &messages);
    ctx.insert("liked_ids", &liked_ids);
    ctx.insert("stats", &stats);
    views.render("home.html", &ctx)
}
