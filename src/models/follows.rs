use rusqlite::{Connection, params};

use crate::error::{AppError, AppResult};

pub fn exists(conn: &Connection, follower_id: i64, followed_id: i64) -> AppResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM follows WHERE user_following_id = ?1 AND user_being_followed_id = ?2",
        params![follower_id, followed_id],
        |r| r.get(0),
    )?;
    Ok(count > 0)
}

/// Record that `follower_id` follows `followed_id`. Idempotent; returns
/// whether a new edge was created.
pub fn follow(conn: &Connection, follower_id: i64, followed_id: i64) -> AppResult<bool> {
    if follower_id == followed_id {
        return Err(AppError::Invalid("You cannot follow yourself".to_string()));
    }
    if super::user::find(conn, followed_id)?.is_none() {
        return Err(AppError::NotFound);
    }

    // INSERT OR IGNORE: the composite key rejects duplicates
    let rows = conn.execute(
        "INSERT OR IGNORE INTO follows (user_being_followed_id, user_following_id) VALUES (?1, ?2)",
        params![followed_id, follower_id],
    )?;
    if rows > 0 {
        tracing::info!(follower_id, followed_id, "follow created");
    }
    Ok(rows > 0)
}

/// Remove the edge if present; returns whether one was removed.
pub fn unfollow(conn: &Connection, follower_id: i64, followed_id: i64) -> AppResult<bool> {
    let rows = conn.execute(
        "DELETE FROM follows WHERE user_being_followed_id = ?1 AND user_following_id = ?2",
        params![followed_id, follower_id],
    )?;
    if rows > 0 {
        tracing::info!(follower_id, followed_id, "follow removed");
    }
    Ok(rows > 0)
}
