use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::Redirect;
use rocket::{get, post, State};
use serde::Serialize;

use super::{CurrentUser, Reply};
use crate::db::Db;
use crate::error::{AppError, AppResult};
use crate::models::{likes, message};
use crate::views::{Views, page_context};

#[derive(Debug, rocket::FromForm)]
pub struct MessageForm {
    text: Option<String>,
}

#[derive(Serialize)]
struct MessageEcho<'a> {
    text: &'a str,
}

/// GET /messages/new: Show the compose form
#[get("/messages/new")]
pub fn new_message_form(
    views: &State<Views>,
    user: Option<CurrentUser>,
    flash: Option<FlashMessage<'_>>,
) -> AppResult<Reply> {
    let CurrentUser(me) = user.ok_or(AppError::Unauthorized)?;
    let mut ctx = page_context(Some(&me), flash);
    ctx.insert("form", &MessageEcho { text: "" });
    ctx.insert("errors", &Vec::<String>::new());
    ctx.insert("max_len", &message::MAX_TEXT_LEN);
    Ok(views.render("messages/new.html", &ctx)?.into())
}

/// POST /messages/new: Post a message as the current user
#[post("/messages/new", data = "<form>")]
pub fn create_message(
    db: &State<Db>,
    views: &State<Views>,
    user: Option<CurrentUser>,
    form: Form<MessageForm>,
) -> AppResult<Reply> {
    let CurrentUser(me) = user.ok_or(AppError::Unauthorized)?;
    let text = form.text.as_deref().unwrap_or("");

    match message::create(&db.conn(), me.id, text) {
        Ok(_) => Ok(Redirect::to(format!("/users/{}", me.id)).into()),
        Err(AppError::Invalid(error)) => {
            let mut ctx = page_context(Some(&me), None);
            ctx.insert("form", &MessageEcho { text });
            ctx.insert("errors", &[error]);
            ctx.insert("max_len", &message::MAX_TEXT_LEN);
            Ok(views.render("messages/new.html", &ctx)?.into())
        }
        Err(e) => Err(e),
    }
}

/// GET /messages/<message_id>: Show a single message
#[get("/messages/<message_id>")]
pub fn show_message(
    db: &State<Db>,
    views: &State<Views>,
    message_id: i64,
    user: Option<CurrentUser>,
    flash: Option<FlashMessage<'_>>,
) -> AppResult<Reply> {
    let me = user.map(|CurrentUser(u)| u);

    let conn = db.conn();
    let msg = message::find(&conn, message_id)?.ok_or(AppError::NotFound)?;
    let like_count = likes::count_for_message(&conn, message_id)?;
    let liked = match &me {
        Some(u) => likes::exists(&conn, u.id, message_id)?,
        None => false,
    };
    drop(conn);

    let can_delete = me
        .as_ref()
        .is_some_and(|u| u.id == msg.user_id || u.is_admin);

    let mut ctx = page_context(me.as_ref(), flash);
    ctx.insert("message", &msg);
    ctx.insert("likes", &like_count);
    ctx.insert("liked", &liked);
    ctx.insert("can_delete", &can_delete);
    Ok(views.render("messages/show.html", &ctx)?.into())
}

/// POST /messages/<message_id>/delete: Delete a message (author or admin)
#[post("/messages/<message_id>/delete")]
pub fn delete_message(
    db: &State<Db>,
    message_id: i64,
    user: Option<CurrentUser>,
) -> AppResult<Redirect> {
    let CurrentUser(me) = user.ok_or(AppError::Unauthorized)?;
    message::delete(&db.conn(), message_id, &me)?;
    Ok(Redirect::to(format!("/users/{}", me.id)))
}

/// POST /messages/<message_id>/like: Toggle a like for the current user
#[post("/messages/<message_id>/like")]
pub fn toggle_like(
    db: &State<Db>,
    message_id: i64,
    user: Option<CurrentUser>,
) -> AppResult<Redirect> {
    let CurrentUser(me) = user.ok_or(AppError::Unauthorized)?;

    let conn = db.conn();
    let msg = message::find(&conn, message_id)?.ok_or(AppError::NotFound)?;
    // Liking your own message is not allowed
    if msg.user_id == me.id {
        return Err(AppError::Unauthorized);
    }
    likes::toggle(&conn, me.id, message_id)?;
    Ok(Redirect::to("/"))
}
