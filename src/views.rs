//! Server-rendered HTML. Templates are compiled into the binary so the app
//! needs no template directory at runtime.

use rocket::request::FlashMessage;
use rocket::response::content::RawHtml;
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::AppResult;
use crate::models::User;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("404.html", include_str!("../templates/404.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("home_anon.html", include_str!("../templates/home_anon.html")),
    ("messages/_list.html", include_str!("../templates/messages/_list.html")),
    ("messages/new.html", include_str!("../templates/messages/new.html")),
    ("messages/show.html", include_str!("../templates/messages/show.html")),
    ("users/_detail.html", include_str!("../templates/users/_detail.html")),
    ("users/_list.html", include_str!("../templates/users/_list.html")),
    ("users/edit.html", include_str!("../templates/users/edit.html")),
    ("users/followers.html", include_str!("../templates/users/followers.html")),
    ("users/following.html", include_str!("../templates/users/following.html")),
    ("users/index.html", include_str!("../templates/users/index.html")),
    ("users/likes.html", include_str!("../templates/users/likes.html")),
    ("users/login.html", include_str!("../templates/users/login.html")),
    ("users/show.html", include_str!("../templates/users/show.html")),
    ("users/signup.html", include_str!("../templates/users/signup.html")),
];

pub struct Views {
    tera: Tera,
}

#[derive(Serialize)]
struct Flash<'a> {
    kind: &'a str,
    message: &'a str,
}

impl Views {
    pub fn new() -> AppResult<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        Ok(Views { tera })
    }

    pub fn render(&self, name: &str, ctx: &Context) -> AppResult<RawHtml<String>> {
        Ok(RawHtml(self.tera.render(name, ctx)?))
    }
}

/// Context shared by every page: the logged-in user (if any) for the navbar
/// and the pending flash notice.
pub fn page_context(current_user: Option<&User>, flash: Option<FlashMessage<'_>>) -> Context {
    let mut ctx = Context::new();
    ctx.insert("current_user", &current_user);
    if let Some(flash) = flash {
        ctx.insert(
            "flash",
            &Flash {
                kind: flash.kind(),
                message: flash.message(),
            },
        );
    }
    ctx
}
