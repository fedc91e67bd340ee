use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::request::FlashMessage;
use rocket::response::content::RawHtml;
use rocket::response::{Flash, Redirect};
use rocket::{get, post, State};
use rusqlite::Connection;
use serde::Serialize;
use tera::Context;

use super::{CURR_USER_KEY, CurrentUser, Reply};
use crate::db::Db;
use crate::error::{AppError, AppResult};
use crate::models::{ProfileUpdate, User, follows, likes, message, user};
use crate::views::{Views, page_context};

#[derive(Debug, rocket::FromForm)]
pub struct ProfileForm {
    username: Option<String>,
    email: Option<String>,
    image_url: Option<String>,
    header_image_url: Option<String>,
    bio: Option<String>,
    location: Option<String>,
    password: Option<String>,
}

#[derive(Serialize)]
struct ProfileEcho<'a> {
    username: &'a str,
    email: &'a str,
    image_url: &'a str,
    header_image_url: &'a str,
    bio: &'a str,
    location: &'a str,
}

impl<'a> From<&'a User> for ProfileEcho<'a> {
    fn from(u: &'a User) -> Self {
        ProfileEcho {
            username: &u.username,
            email: &u.email,
            image_url: &u.image_url,
            header_image_url: &u.header_image_url,
            bio: u.bio.as_deref().unwrap_or(""),
            location: u.location.as_deref().unwrap_or(""),
        }
    }
}

/// Ids of users `viewer` follows, for rendering follow/unfollow buttons.
fn following_ids(conn: &Connection, viewer: Option<&User>) -> AppResult<Vec<i64>> {
    match viewer {
        Some(v) => Ok(user::following(conn, v.id)?.into_iter().map(|u| u.id).collect()),
        None => Ok(Vec::new()),
    }
}

/// Context for pages that open with a user's profile header.
fn profile_context(
    conn: &Connection,
    viewer: Option<&User>,
    flash: Option<FlashMessage<'_>>,
    user_id: i64,
) -> AppResult<Context> {
    let profile = user::find(conn, user_id)?.ok_or(AppError::NotFound)?;
    let stats = user::stats(conn, user_id)?;
    let liked_ids = match viewer {
        Some(v) => likes::liked_message_ids(conn, v.id)?,
        None => Default::default(),
    };

    let mut ctx = page_context(viewer, flash);
    ctx.insert("user", &profile);
    ctx.insert("stats", &stats);
    ctx.insert("following_ids", &following_ids(conn, viewer)?);
    ctx.insert("liked_ids", &liked_ids);
    Ok(ctx)
}

/// GET /users?q=<q>: List users, optionally filtered by username
#[get("/users?<q>")]
pub fn list_users(
    db: &State<Db>,
    views: &State<Views>,
    q: Option<&str>,
    user: Option<CurrentUser>,
    flash: Option<FlashMessage<'_>>,
) -> AppResult<RawHtml<String>> {
    let me = user.map(|CurrentUser(u)| u);
    let conn = db.conn();
    let users = user::search(&conn, q)?;
    let following = following_ids(&conn, me.as_ref())?;
    drop(conn);

    let mut ctx = page_context(me.as_ref(), flash);
    ctx.insert("q", &q.map(str::trim).unwrap_or(""));
    ctx.insert("users", &users);
    ctx.insert("following_ids", &following);
    ctx.insert("empty_text", "Sorry, no users found");
    views.render("users/index.html", &ctx)
}

/// GET /users/<user_id>: Profile and messages
#[get("/users/<user_id>")]
pub fn show_user(
    db: &State<Db>,
    views: &State<Views>,
    user_id: i64,
    user: Option<CurrentUser>,
    flash: Option<FlashMessage<'_>>,
) -> AppResult<RawHtml<String>> {
    let me = user.map(|CurrentUser(u)| u);
    let conn = db.conn();
    let mut ctx = profile_context(&conn, me.as_ref(), flash, user_id)?;
    ctx.insert("messages", &message::list_by_owner(&conn, user_id)?);
    drop(conn);
    views.render("users/show.html", &ctx)
}

/// GET /users/<user_id>/following: Users this user follows (login required)
#[get("/users/<user_id>/following")]
pub fn list_following(
    db: &State<Db>,
    views: &State<Views>,
    user_id: i64,
    user: Option<CurrentUser>,
    flash: Option<FlashMessage<'_>>,
) -> AppResult<RawHtml<String>> {
    let CurrentUser(me) = user.ok_or(AppError::Unauthorized)?;
    let conn = db.conn();
    let mut ctx = profile_context(&conn, Some(&me), flash, user_id)?;
    ctx.insert("users", &user::following(&conn, user_id)?);
    ctx.insert("empty_text", "Not following anyone yet");
    drop(conn);
    views.render("users/following.html", &ctx)
}

/// GET /users/<user_id>/followers: Users following this user (login required)
#[get("/users/<user_id>/followers")]
pub fn list_followers(
    db: &State<Db>,
    views: &State<Views>,
    user_id: i64,
    user: Option<CurrentUser>,
    flash: Option<FlashMessage<'_>>,
) -> AppResult<RawHtml<String>> {
    let CurrentUser(me) = user.ok_or(AppError::Unauthorized)?;
    let conn = db.conn();
    let mut ctx = profile_context(&conn, Some(&me), flash, user_id)?;
    ctx.insert("users", &user::followers(&conn, user_id)?);
    ctx.insert("empty_text", "No followers yet");
    drop(conn);
    views.render("users/followers.html", &ctx)
}

/// GET /users/<user_id>/likes: Messages this user liked (login required)
#[get("/users/<user_id>/likes")]
pub fn list_likes(
    db: &State<Db>,
    views: &State<Views>,
    user_id: i64,
    user: Option<CurrentUser>,
    flash: Option<FlashMessage<'_>>,
) -> AppResult<RawHtml<String>> {
    let CurrentUser(me) = user.ok_or(AppError::Unauthorized)?;
    let conn = db.conn();
    let mut ctx = profile_context(&conn, Some(&me), flash, user_id)?;
    ctx.insert("messages", &message::list_liked_by_user(&conn, user_id)?);
    drop(conn);
    views.render("users/likes.html", &ctx)
}

/// POST /users/follow/<follow_id>: Follow another user
#[post("/users/follow/<follow_id>")]
pub fn follow_user(
    db: &State<Db>,
    follow_id: i64,
    user: Option<CurrentUser>,
) -> AppResult<Redirect> {
    let CurrentUser(me) = user.ok_or(AppError::Unauthorized)?;
    follows::follow(&db.conn(), me.id, follow_id)?;
    Ok(Redirect::to(format!("/users/{}/following", me.id)))
}

/// POST /users/stop-following/<follow_id>: Unfollow a user
#[post("/users/stop-following/<follow_id>")]
pub fn stop_following(
    db: &State<Db>,
    follow_id: i64,
    user: Option<CurrentUser>,
) -> AppResult<Redirect> {
    let CurrentUser(me) = user.ok_or(AppError::Unauthorized)?;
    follows::unfollow(&db.conn(), me.id, follow_id)?;
    Ok(Redirect::to(format!("/users/{}/following", me.id)))
}

fn render_edit(
    views: &Views,
    me: &User,
    echo: ProfileEcho<'_>,
    errors: &[String],
    flash: Option<FlashMessage<'_>>,
) -> AppResult<Reply> {
    let mut ctx = page_context(Some(me), flash);
    ctx.insert("form", &echo);
    ctx.insert("errors", errors);
    Ok(views.render("users/edit.html", &ctx)?.into())
}

/// GET /users/profile: Edit form for the current user
#[get("/users/profile")]
pub fn edit_profile_form(
    views: &State<Views>,
    user: Option<CurrentUser>,
    flash: Option<FlashMessage<'_>>,
) -> AppResult<Reply> {
    let CurrentUser(me) = user.ok_or(AppError::Unauthorized)?;
    render_edit(views, &me, ProfileEcho::from(&me), &[], flash)
}

/// POST /users/profile: Update the current user; requires their password
#[post("/users/profile", data = "<form>")]
pub fn edit_profile(
    db: &State<Db>,
    views: &State<Views>,
    user: Option<CurrentUser>,
    form: Form<ProfileForm>,
) -> AppResult<Reply> {
    let CurrentUser(me) = user.ok_or(AppError::Unauthorized)?;

    let password = form.password.as_deref().unwrap_or("");
    if !user::verify_password(password, &me.password) {
        tracing::warn!(user_id = me.id, "profile edit with wrong password");
        return Ok(Flash::error(Redirect::to("/"), "Wrong password.").into());
    }

    let update = ProfileUpdate {
        username: form.username.clone(),
        email: form.email.clone(),
        image_url: form.image_url.clone(),
        header_image_url: form.header_image_url.clone(),
        bio: form.bio.clone(),
        location: form.location.clone(),
    };

    match user::update_profile(&db.conn(), me.id, &update) {
        Ok(updated) => {
            tracing::info!(user_id = updated.id, "profile updated");
            Ok(Redirect::to(format!("/users/{}", updated.id)).into())
        }
        Err(e) if e.is_user_facing() => {
            let echo = ProfileEcho {
                username: form.username.as_deref().unwrap_or(&me.username),
                email: form.email.as_deref().unwrap_or(&me.email),
                image_url: form.image_url.as_deref().unwrap_or(&me.image_url),
                header_image_url: form
                    .header_image_url
                    .as_deref()
                    .unwrap_or(&me.header_image_url),
                bio: form.bio.as_deref().unwrap_or(""),
                location: form.location.as_deref().unwrap_or(""),
            };
            render_edit(views, &me, echo, &[e.to_string()], None)
        }
        Err(e) => Err(e),
    }
}

/// POST /users/delete: Delete the current user's account and log out
#[post("/users/delete")]
pub fn delete_user(
    db: &State<Db>,
    jar: &CookieJar<'_>,
    user: Option<CurrentUser>,
) -> AppResult<Flash<Redirect>> {
    let CurrentUser(me) = user.ok_or(AppError::Unauthorized)?;
    user::delete(&db.conn(), me.id)?;
    jar.remove_private(CURR_USER_KEY);
    Ok(Flash::success(
        Redirect::to("/signup"),
        "Your account has been deleted.",
    ))
}
