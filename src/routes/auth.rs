use rocket::form::Form;
use rocket::http::{Cookie, CookieJar};
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::{get, post, State};
use serde::Serialize;

use super::{CURR_USER_KEY, CurrentUser, Reply, field};
use crate::db::Db;
use crate::error::AppResult;
use crate::models::user;
use crate::views::{Views, page_context};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, rocket::FromForm)]
pub struct SignupForm {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    image_url: Option<String>,
}

#[derive(Debug, rocket::FromForm)]
pub struct LoginForm {
    username: Option<String>,
    password: Option<String>,
}

/// Values echoed back into a re-rendered form. Never includes the password.
#[derive(Serialize, Default)]
struct FormEcho<'a> {
    username: &'a str,
    email: &'a str,
    image_url: &'a str,
}

fn log_in(jar: &CookieJar<'_>, user_id: i64) {
    jar.add_private(Cookie::new(CURR_USER_KEY, user_id.to_string()));
}

fn render_signup(
    views: &Views,
    form: FormEcho<'_>,
    errors: &[String],
    flash: Option<FlashMessage<'_>>,
) -> AppResult<Reply> {
    let mut ctx = page_context(None, flash);
    ctx.insert("form", &form);
    ctx.insert("errors", errors);
    Ok(views.render("users/signup.html", &ctx)?.into())
}

/// GET /signup: Show the signup form (logged-in users go home)
#[get("/signup")]
pub fn signup_form(
    views: &State<Views>,
    user: Option<CurrentUser>,
    flash: Option<FlashMessage<'_>>,
) -> AppResult<Reply> {
    if user.is_some() {
        return Ok(Redirect::to("/").into());
    }
    render_signup(views, FormEcho::default(), &[], flash)
}

/// POST /signup: Create the account and log it in
#[post("/signup", data = "<form>")]
pub fn signup(
    db: &State<Db>,
    views: &State<Views>,
    jar: &CookieJar<'_>,
    form: Form<SignupForm>,
) -> AppResult<Reply> {
    let username = field(&form.username);
    let email = field(&form.email);
    let password = form.password.as_deref().unwrap_or("");
    let image_url = field(&form.image_url);
    let echo = FormEcho {
        username,
        email,
        image_url,
    };

    let mut errors = Vec::new();
    if username.is_empty() {
        errors.push("Username is required".to_string());
    }
    if email.is_empty() {
        errors.push("E-mail is required".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    if !errors.is_empty() {
        return render_signup(views, echo, &errors, None);
    }

    let conn = db.conn();
    let image = (!image_url.is_empty()).then_some(image_url);
    match user::signup(&conn, username, email, password, image) {
        Ok(u) => {
            log_in(jar, u.id);
            Ok(Redirect::to("/").into())
        }
        Err(e) if e.is_user_facing() => render_signup(views, echo, &[e.to_string()], None),
        Err(e) => Err(e),
    }
}

/// GET /login: Show the login form
#[get("/login")]
pub fn login_form(
    views: &State<Views>,
    user: Option<CurrentUser>,
    flash: Option<FlashMessage<'_>>,
) -> AppResult<Reply> {
    if user.is_some() {
        return Ok(Redirect::to("/").into());
    }
    let mut ctx = page_context(None, flash);
    ctx.insert("form", &FormEcho::default());
    ctx.insert("errors", &Vec::<String>::new());
    Ok(views.render("users/login.html", &ctx)?.into())
}

/// POST /login: Authenticate and start a session
#[post("/login", data = "<form>")]
pub fn login(
    db: &State<Db>,
    views: &State<Views>,
    jar: &CookieJar<'_>,
    form: Form<LoginForm>,
) -> AppResult<Reply> {
    let username = field(&form.username);
    let password = form.password.as_deref().unwrap_or("");

    let authenticated = user::authenticate(&db.conn(), username, password)?;
    match authenticated {
        Some(u) => {
            log_in(jar, u.id);
            tracing::info!(user_id = u.id, "user logged in");
            Ok(Flash::success(Redirect::to("/"), format!("Hello, {}!", u.username)).into())
        }
        None => {
            tracing::info!(username, "failed login attempt");
            let mut ctx = page_context(None, None);
            ctx.insert(
                "form",
                &FormEcho {
                    username,
                    ..Default::default()
                },
            );
            ctx.insert("errors", &["Invalid credentials."]);
            Ok(views.render("users/login.html", &ctx)?.into())
        }
    }
}

/// GET /logout: End the session
#[get("/logout")]
pub fn logout(jar: &CookieJar<'_>, user: Option<CurrentUser>) -> Flash<Redirect> {
    if let Some(CurrentUser(u)) = user {
        tracing::info!(user_id = u.id, "user logged out");
    }
    jar.remove_private(CURR_USER_KEY);
    Flash::success(Redirect::to("/login"), "You have successfully logged out.")
}
