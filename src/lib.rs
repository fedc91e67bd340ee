pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod telemetry;
pub mod views;

use config::AppConfig;
use db::Db;
use rocket::fairing::{self, AdHoc};
use rocket::figment::Figment;
use rocket::figment::providers::Env;
use rocket::{Build, Rocket};
use views::Views;

/// Server configured from `Rocket.toml`, `ROCKET_*` variables and
/// `DATABASE_PATH`.
pub fn rocket() -> Rocket<Build> {
    let figment = rocket::Config::figment().merge(Env::raw().only(&["database_path"]));
    build(figment)
}

/// Server backed by the SQLite file at `db_path`.
pub fn rocket_with_db(db_path: &str) -> Rocket<Build> {
    build(rocket::Config::figment().merge(("database_path", db_path)))
}

fn build(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(AdHoc::try_on_ignite("SQLite Database", open_database))
        .attach(AdHoc::try_on_ignite("Templates", load_templates))
        .register(
            "/",
            rocket::catchers![routes::not_found, routes::unprocessable, routes::internal_error],
        )
        .mount(
            "/",
            rocket::routes![
                routes::homepage,
                routes::signup_form,
                routes::signup,
                routes::login_form,
                routes::login,
                routes::logout,
                routes::list_users,
                routes::show_user,
                routes::list_following,
                routes::list_followers,
                routes::list_likes,
                routes::follow_user,
                routes::stop_following,
                routes::edit_profile_form,
                routes::edit_profile,
                routes::delete_user,
                routes::new_message_form,
                routes::create_message,
                routes::show_message,
                routes::delete_message,
                routes::toggle_like,
                routes::health,
                routes::stats,
            ],
        )
}

async fn open_database(rocket: Rocket<Build>) -> fairing::Result {
    let config: AppConfig = match rocket.figment().extract() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return Err(rocket);
        }
    };

    match Db::open(&config.database_path) {
        Ok(db) => Ok(rocket.manage(db).manage(config)),
        Err(e) => {
            tracing::error!(error = %e, path = %config.database_path, "failed to open database");
            Err(rocket)
        }
    }
}

async fn load_templates(rocket: Rocket<Build>) -> fairing::Result {
    match Views::new() {
        Ok(views) => Ok(rocket.manage(views)),
        Err(e) => {
            tracing::error!(error = %e, "failed to load templates");
            Err(rocket)
        }
    }
}
