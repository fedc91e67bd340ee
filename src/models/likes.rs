use rusqlite::{Connection, params};
use std::collections::HashSet;

use super::LikeToggle;
use crate::error::{AppError, AppResult};

pub fn exists(conn: &Connection, user_id: i64, message_id: i64) -> AppResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM likes WHERE user_id = ?1 AND message_id = ?2",
        params![user_id, message_id],
        |r| r.get(0),
    )?;
    Ok(count > 0)
}

/// Like the message if `user_id` hasn't yet, otherwise remove the like.
pub fn toggle(conn: &Connection, user_id: i64, message_id: i64) -> AppResult<LikeToggle> {
    let tx = conn.unchecked_transaction()?;

    let message_exists: bool = tx.query_row(
        "SELECT COUNT(*) FROM messages WHERE id = ?1",
        params![message_id],
        |r| r.get::<_, i64>(0),
    )? > 0;
    if !message_exists {
        return Err(AppError::NotFound);
    }

    let removed = tx.execute(
        "DELETE FROM likes WHERE user_id = ?1 AND message_id = ?2",
        params![user_id, message_id],
    )?;
    let outcome = if removed > 0 {
        LikeToggle::Unliked
    } else {
        tx.execute(
            "INSERT INTO likes (user_id, message_id) VALUES (?1, ?2)",
            params![user_id, message_id],
        )?;
        LikeToggle::Liked
    };
    tx.commit()?;

    tracing::debug!(user_id, message_id, ?outcome, "like toggled");
    Ok(outcome)
}

pub fn count_for_message(conn: &Connection, message_id: i64) -> AppResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM likes WHERE message_id = ?1",
        params![message_id],
        |r| r.get(0),
    )?;
    Ok(count)
}

/// Ids of every message `user_id` has liked, for marking listings.
pub fn liked_message_ids(conn: &Connection, user_id: i64) -> AppResult<HashSet<i64>> {
    let mut stmt = conn.prepare("SELECT message_id FROM likes WHERE user_id = ?1")?;
    let ids = stmt
        .query_map(params![user_id], |r| r.get(0))?
        .collect::<rusqlite::Result<HashSet<i64>>>()?;
    Ok(ids)
}
