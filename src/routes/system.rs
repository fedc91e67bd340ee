use crate::db::Db;
use crate::views::{Views, page_context};
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::content::RawHtml;
use rocket::serde::json::Json;
use rocket::{catch, get, State};
use rusqlite::Connection;

#[get("/api/v1/health")]
pub fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "warbler",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn table_counts(conn: &Connection) -> rusqlite::Result<serde_json::Value> {
    let count = |table: &str| -> rusqlite::Result<i64> {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
    };
    Ok(serde_json::json!({
        "users": count("users")?,
        "messages": count("messages")?,
        "follows": count("follows")?,
        "likes": count("likes")?,
    }))
}

#[get("/api/v1/stats")]
pub fn stats(db: &State<Db>) -> Result<Json<serde_json::Value>, Status> {
    table_counts(&db.conn()).map(Json).map_err(|e| {
        tracing::error!(error = %e, "stats query failed");
        Status::InternalServerError
    })
}

#[catch(404)]
pub fn not_found(req: &Request<'_>) -> RawHtml<String> {
    req.rocket()
        .state::<Views>()
        .and_then(|views| views.render("404.html", &page_context(None, None)).ok())
        .unwrap_or_else(|| RawHtml("<h1>404 Not Found</h1>".to_string()))
}

#[catch(422)]
pub fn unprocessable() -> RawHtml<&'static str> {
    RawHtml("<h1>422 Unprocessable Entity</h1><p>The submitted form could not be read.</p>")
}

#[catch(500)]
pub fn internal_error() -> RawHtml<&'static str> {
    RawHtml("<h1>500 Internal Server Error</h1><p>Something went wrong.</p>")
}
